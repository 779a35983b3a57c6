//! # Crack Width (IS 456 Annex F)
//!
//! Surface crack width at the tension face, midway between two bars of the
//! bottom layer:
//!
//! ```text
//! fs   = M / (Ast·(d − x/3))
//! ε1   = (fs/Es)·(h − x)/(d − x)
//! εm   = ε1 − b·(h − x)·(a' − x) / (3·Es·As·(d − x))
//! acr  = √((s/2)² + (h − d)²) − φ/2
//! wcr  = 3·acr·εm / (1 + 2·(acr − cmin)/(h − x))
//! ```
//!
//! with x the cracked elastic neutral axis, a' = h (tension face) and cmin
//! the clear cover to the main bars, h − d − φ/2. That cover may not be less
//! than the section's stated clear cover, which is measured to the outermost
//! bar. A non-positive εm (tension stiffening covers the steel strain) means
//! no visible crack.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::deflection::cracked_section;
use crate::code_tables::clause;
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::materials::{Materials, ES_MPA};
use crate::section::Section;
use crate::units::{KnM, NMm};

/// Environmental exposure, mildest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExposureClass {
    Mild,
    Moderate,
    Severe,
    Extreme,
}

impl ExposureClass {
    pub const ALL: [ExposureClass; 4] = [
        ExposureClass::Mild,
        ExposureClass::Moderate,
        ExposureClass::Severe,
        ExposureClass::Extreme,
    ];

    /// Allowable surface crack width (mm)
    pub fn crack_width_limit_mm(&self) -> f64 {
        match self {
            ExposureClass::Mild => 0.30,
            ExposureClass::Moderate => 0.25,
            ExposureClass::Severe => 0.20,
            ExposureClass::Extreme => 0.10,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExposureClass::Mild => "Mild",
            ExposureClass::Moderate => "Moderate",
            ExposureClass::Severe => "Severe",
            ExposureClass::Extreme => "Extreme",
        }
    }
}

impl std::fmt::Display for ExposureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Inputs to the crack-width estimate.
///
/// ## JSON Example
///
/// ```json
/// {
///   "service_moment_knm": 80.0,
///   "ast_provided_mm2": 942.0,
///   "bar_diameter_mm": 20.0,
///   "bar_spacing_mm": 75.0,
///   "exposure": "Moderate"
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrackWidthInput {
    /// Service moment (kN·m)
    pub service_moment_knm: f64,
    pub ast_provided_mm2: f64,
    /// Diameter of the tension bars (mm)
    pub bar_diameter_mm: f64,
    /// Centre-to-centre spacing of the tension bars (mm)
    pub bar_spacing_mm: f64,
    pub exposure: ExposureClass,
}

impl CrackWidthInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("service_moment_knm", self.service_moment_knm)?;
        require_positive("ast_provided_mm2", self.ast_provided_mm2)?;
        require_positive("bar_diameter_mm", self.bar_diameter_mm)?;
        require_positive("bar_spacing_mm", self.bar_spacing_mm)?;
        Ok(())
    }
}

/// Result of the crack-width estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackWidthResult {
    /// Design surface crack width (mm)
    pub crack_width_mm: f64,
    /// Allowable width for the exposure class (mm)
    pub limit_mm: f64,
    pub exposure: ExposureClass,
    /// Distance from the point considered to the nearest bar surface (mm)
    pub acr_mm: f64,
    /// Clear cover to the main bars (mm)
    pub cmin_mm: f64,
    /// Cracked elastic neutral-axis depth (mm)
    pub neutral_axis_mm: f64,
    /// Service stress in tension steel (MPa)
    pub steel_stress_mpa: f64,
    /// Average strain at the tension face εm
    pub mean_strain: f64,
    pub passes: bool,
    pub remarks: String,
}

impl CrackWidthResult {
    /// w / w_lim
    pub fn utilization(&self) -> f64 {
        self.crack_width_mm / self.limit_mm
    }
}

/// Crack width at the soffit midway between bars.
pub fn crack_width(section: &Section, materials: &Materials, input: &CrackWidthInput) -> CalcResult<CrackWidthResult> {
    section.validate()?;
    materials.validate()?;
    input.validate()?;

    let h = section.overall_depth_mm;
    let d = section.effective_depth_mm;
    let b = section.width_mm;
    let phi = input.bar_diameter_mm;
    let cmin = h - d - phi / 2.0;
    if cmin <= 0.0 {
        return Err(CalcError::invalid_input(
            "bar_diameter_mm",
            phi.to_string(),
            format!("Bar does not fit below the effective depth ({} mm to the soffit)", h - d),
        ));
    }
    if cmin < section.clear_cover_mm - 1e-9 {
        return Err(CalcError::invalid_input(
            "effective_depth_mm",
            d.to_string(),
            format!(
                "Cover to the {} mm bars is {:.1} mm, less than the stated clear cover of {} mm",
                phi, cmin, section.clear_cover_mm
            ),
        ));
    }

    let cracked = cracked_section(section, materials.modular_ratio(), input.ast_provided_mm2, 0.0, 0.0);
    let x = cracked.neutral_axis_mm;
    let moment = NMm::from(KnM(input.service_moment_knm)).value();
    let ast = input.ast_provided_mm2;

    let fs = moment / (ast * (d - x / 3.0));
    let eps1 = fs / ES_MPA * (h - x) / (d - x);
    let stiffening = b * (h - x) * (h - x) / (3.0 * ES_MPA * ast * (d - x));
    let eps_m = (eps1 - stiffening).max(0.0);

    let half = input.bar_spacing_mm / 2.0;
    let acr = (half * half + (h - d).powi(2)).sqrt() - phi / 2.0;
    let wcr = 3.0 * acr * eps_m / (1.0 + 2.0 * (acr - cmin) / (h - x));
    let limit = input.exposure.crack_width_limit_mm();
    let passes = wcr <= limit;
    debug!(fs, eps_m, acr, wcr, limit, "crack width");

    let remarks = format!(
        "wcr = {:.3} mm {} {:.2} mm for {} exposure ({})",
        wcr,
        if passes { "≤" } else { ">" },
        limit,
        input.exposure,
        clause::CRACK_WIDTH
    );

    Ok(CrackWidthResult {
        crack_width_mm: wcr,
        limit_mm: limit,
        exposure: input.exposure,
        acr_mm: acr,
        cmin_mm: cmin,
        neutral_axis_mm: x,
        steel_stress_mpa: fs,
        mean_strain: eps_m,
        passes,
        remarks,
    })
}
