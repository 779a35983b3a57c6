//! # Design Calculations
//!
//! Limit-state checks for reinforced concrete beams. Each check follows the
//! pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Results with intermediate values and a pass/fail verdict
//! - a pure function taking the section, materials and code tables
//!
//! ## Available Calculations
//!
//! - [`flexure`] - Limiting moment, singly/doubly reinforced design, moment of resistance
//! - [`flanged`] - T- and L-beams (Annex G)
//! - [`shear`] - Nominal shear stress and vertical stirrups
//! - [`deflection`] - Span/depth ratio and detailed deflection (Annex C)
//! - [`crack_width`] - Surface crack width (Annex F)
//! - [`serviceability`] - Combined serviceability verdict
//! - [`compliance`] - Multi-case orchestration and batch checking

pub mod compliance;
pub mod crack_width;
pub mod deflection;
pub mod flanged;
pub mod flexure;
pub mod serviceability;
pub mod shear;

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, CalcResult};

pub use compliance::{
    check_batch, check_beam, check_case, summarize, BatchSummary, BeamComplianceReport, BeamDefinition, BeamOutcome,
    CaseStage, ComplianceCaseResult, LoadCase, SubCheck, SubCheckResult,
};
pub use crack_width::{crack_width, CrackWidthInput, CrackWidthResult, ExposureClass};
pub use deflection::{
    detailed_deflection, span_depth_check, DeflectionInput, DeflectionResult, SpanDepthInput, SpanDepthResult,
    SupportCondition,
};
pub use flanged::{design_flanged_beam, design_flanged_section, FlangedBeam, FlangedFlexureResult, NeutralAxisLocation};
pub use flexure::{
    design_doubly_reinforced, design_singly_reinforced, limiting_moment, moment_of_resistance, required_tension_steel,
    FlexureResult, FlexureStatus, LimitingMoment, MomentOfResistance, ProvidedSteel, SectionClassification,
    TensionSteelDemand,
};
pub use serviceability::{check_serviceability, ServiceabilityInput, ServiceabilityResult};
pub use shear::{design_shear, nominal_shear_stress, ShearResult, ShearStatus, SpacingLimit, StirrupGeometry};

/// Factored actions at the critical section (magnitudes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignAction {
    /// Factored bending moment Mu (kN·m)
    pub moment_knm: f64,
    /// Factored shear Vu (kN)
    pub shear_kn: f64,
}

impl DesignAction {
    pub fn new(moment_knm: f64, shear_kn: f64) -> Self {
        DesignAction { moment_knm, shear_kn }
    }

    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("moment_knm", self.moment_knm)?;
        require_non_negative("shear_kn", self.shear_kn)?;
        Ok(())
    }
}

/// Root of an increasing function by bisection on [lo, hi].
///
/// Expects f(lo) ≤ 0 ≤ f(hi); outside that the nearer bound is returned.
/// Returns the midpoint of the final bracket and the iterations used.
pub(crate) fn bisect<F: Fn(f64) -> f64>(f: F, lo: f64, hi: f64, tol: f64, max_iter: u32) -> (f64, u32) {
    if f(lo) >= 0.0 {
        return (lo, 0);
    }
    if f(hi) <= 0.0 {
        return (hi, 0);
    }
    let (mut lo, mut hi) = (lo, hi);
    let mut iterations = 0;
    while iterations < max_iter && hi - lo > tol {
        let mid = 0.5 * (lo + hi);
        if f(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        iterations += 1;
    }
    (0.5 * (lo + hi), iterations)
}
