//! # Shear Design
//!
//! Vertical-stirrup design per IS 456 cl. 40.
//!
//! ## Procedure
//!
//! ```text
//! τv  = Vu / (b·d)
//! τc  = Table 19 (fck, pt)          τc,max = Table 20 (fck)
//! τv > τc,max  → section inadequate, stop (no spacing)
//! Vus = max(0, Vu − τc·b·d)
//! fy  = min(fy,stirrup, 415 MPa)
//! sv  = min( 0.87·fy·Asv·d / Vus,        strength
//!            0.87·fy·Asv / (0.4·b),      minimum shear reinforcement
//!            0.75·d,                     spacing limit
//!            300 mm )                    absolute limit
//! ```
//!
//! The caps always apply, so the returned spacing never exceeds the code
//! maximum even when the stirrups could carry the shear at a wider pitch.
//!
//! ## Example
//!
//! ```rust
//! use rc_core::calculations::DesignAction;
//! use rc_core::calculations::shear::{design_shear, ShearStatus, StirrupGeometry};
//! use rc_core::code_tables::CodeTables;
//! use rc_core::materials::Materials;
//! use rc_core::section::Section;
//!
//! let section = Section::rectangular(230.0, 450.0, 500.0, 25.0);
//! let mats = Materials::new(20.0, 415.0);
//! let stirrups = StirrupGeometry::new(2, 8.0, 415.0);
//!
//! let result = design_shear(
//!     &DesignAction::new(0.0, 100.0),
//!     &section,
//!     &mats,
//!     &stirrups,
//!     1.0,
//!     CodeTables::standard(),
//! ).unwrap();
//!
//! assert_eq!(result.status, ShearStatus::DesignedStirrups);
//! assert_eq!(result.spacing_mm, Some(300.0));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::DesignAction;
use crate::code_tables::{clause, CodeTables, RangeWarning};
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::materials::{bar_area_mm2, Materials};
use crate::section::Section;
use crate::units::{Kn, Newtons};

/// Absolute maximum stirrup spacing (mm)
pub const MAX_STIRRUP_SPACING_MM: f64 = 300.0;

/// Maximum stirrup spacing as a fraction of d
const DEPTH_SPACING_FACTOR: f64 = 0.75;

/// Highest stirrup yield strength credited in shear design (MPa)
pub const MAX_STIRRUP_FY_MPA: f64 = 415.0;

/// Vertical stirrups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StirrupGeometry {
    /// Number of vertical legs
    pub legs: u32,
    /// Bar diameter (mm)
    pub diameter_mm: f64,
    /// Yield strength of stirrup steel (MPa)
    pub fy_mpa: f64,
}

impl StirrupGeometry {
    pub fn new(legs: u32, diameter_mm: f64, fy_mpa: f64) -> Self {
        StirrupGeometry { legs, diameter_mm, fy_mpa }
    }

    /// Asv = legs·π·φ²/4 (mm²)
    pub fn asv_mm2(&self) -> f64 {
        self.legs as f64 * bar_area_mm2(self.diameter_mm)
    }

    /// Yield strength credited in design, capped at 415 MPa
    pub fn design_fy_mpa(&self) -> f64 {
        self.fy_mpa.min(MAX_STIRRUP_FY_MPA)
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.legs == 0 {
            return Err(CalcError::invalid_input("legs", "0", "At least one leg is required"));
        }
        require_positive("stirrup diameter_mm", self.diameter_mm)?;
        require_positive("stirrup fy_mpa", self.fy_mpa)?;
        Ok(())
    }
}

/// Outcome of a shear design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShearStatus {
    /// τc < τv ≤ τc,max: stirrups designed for Vus
    DesignedStirrups,
    /// τv ≤ τc: minimum shear reinforcement only
    MinimumReinforcement,
    /// τv > τc,max: section must be enlarged
    SectionInadequate,
}

impl ShearStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShearStatus::DesignedStirrups => "Designed stirrups",
            ShearStatus::MinimumReinforcement => "Minimum shear reinforcement",
            ShearStatus::SectionInadequate => "Section inadequate",
        }
    }
}

impl std::fmt::Display for ShearStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which rule fixed the stirrup spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpacingLimit {
    /// 0.87·fy·Asv·d / Vus
    Strength,
    /// 0.87·fy·Asv / (0.4·b)
    MinimumShearReinforcement,
    /// 0.75·d
    DepthLimit,
    /// 300 mm
    AbsoluteMaximum,
}

impl SpacingLimit {
    pub fn display_name(&self) -> &'static str {
        match self {
            SpacingLimit::Strength => "strength",
            SpacingLimit::MinimumShearReinforcement => "minimum shear reinforcement",
            SpacingLimit::DepthLimit => "0.75·d",
            SpacingLimit::AbsoluteMaximum => "300 mm",
        }
    }
}

/// Result of a shear design.
///
/// ## JSON Example
///
/// ```json
/// {
///   "tau_v_mpa": 0.966,
///   "tau_c_mpa": 0.62,
///   "tau_c_max_mpa": 2.8,
///   "vus_kn": 35.83,
///   "spacing_mm": 300.0,
///   "governing_limit": "AbsoluteMaximum",
///   "status": "DesignedStirrups",
///   "is_safe": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearResult {
    /// Nominal shear stress τv (MPa)
    pub tau_v_mpa: f64,
    /// Design shear strength of concrete τc (MPa)
    pub tau_c_mpa: f64,
    /// Maximum shear stress τc,max (MPa)
    pub tau_c_max_mpa: f64,
    /// Shear carried by stirrups Vus (kN), zero for minimum reinforcement
    pub vus_kn: f64,
    /// Stirrup area Asv (mm²)
    pub asv_mm2: f64,
    /// Stirrup yield strength used in the spacing formulas (MPa)
    pub stirrup_fy_mpa: f64,
    /// Spacing from the strength formula (mm), None when Vus = 0
    pub strength_spacing_mm: Option<f64>,
    /// Governing spacing (mm), None when the section is inadequate
    pub spacing_mm: Option<f64>,
    pub governing_limit: Option<SpacingLimit>,
    pub status: ShearStatus,
    pub is_safe: bool,
    pub remarks: String,
    pub warnings: Vec<RangeWarning>,
}

impl ShearResult {
    pub fn passes(&self) -> bool {
        self.is_safe
    }

    /// τv / τc,max
    pub fn stress_ratio(&self) -> f64 {
        self.tau_v_mpa / self.tau_c_max_mpa
    }
}

/// Nominal shear stress τv = Vu/(b·d) in MPa, b being the web width.
pub fn nominal_shear_stress(action: &DesignAction, section: &Section) -> CalcResult<f64> {
    action.validate()?;
    section.validate()?;
    Ok(Newtons::from(Kn(action.shear_kn)).value() / section.web_area_bd_mm2())
}

/// Design vertical stirrups for a factored shear.
///
/// `steel_ratio_percent` is the tension steel percentage 100·Ast/(b·d)
/// used to read τc.
pub fn design_shear(
    action: &DesignAction,
    section: &Section,
    materials: &Materials,
    stirrups: &StirrupGeometry,
    steel_ratio_percent: f64,
    tables: &CodeTables,
) -> CalcResult<ShearResult> {
    materials.validate()?;
    stirrups.validate()?;
    require_non_negative("steel_ratio_percent", steel_ratio_percent)?;
    let tau_v = nominal_shear_stress(action, section)?;

    let b = section.width_mm;
    let d = section.effective_depth_mm;
    let bd = section.web_area_bd_mm2();
    let tau_c = tables.shear_strength(materials.fck_mpa, steel_ratio_percent);
    let tau_c_max = tables.max_shear_stress(materials.fck_mpa);
    let mut warnings = tau_c.warnings;
    warnings.extend(tau_c_max.warnings);
    let asv = stirrups.asv_mm2();
    let fy_stirrup = stirrups.design_fy_mpa();
    let fy_note = if fy_stirrup < stirrups.fy_mpa {
        debug!(supplied = stirrups.fy_mpa, used = fy_stirrup, "stirrup yield strength capped");
        format!("; stirrup fy {} MPa limited to {} MPa", stirrups.fy_mpa, fy_stirrup)
    } else {
        String::new()
    };

    if tau_v > tau_c_max.value {
        warn!(tau_v, tau_c_max = tau_c_max.value, "shear stress exceeds maximum; section inadequate");
        return Ok(ShearResult {
            tau_v_mpa: tau_v,
            tau_c_mpa: tau_c.value,
            tau_c_max_mpa: tau_c_max.value,
            vus_kn: 0.0,
            asv_mm2: asv,
            stirrup_fy_mpa: fy_stirrup,
            strength_spacing_mm: None,
            spacing_mm: None,
            governing_limit: None,
            status: ShearStatus::SectionInadequate,
            is_safe: false,
            remarks: format!(
                "τv = {:.3} MPa > τc,max = {:.2} MPa; enlarge the section ({})",
                tau_v, tau_c_max.value, clause::MAX_SHEAR_STRESS
            ),
            warnings,
        });
    }

    let vus_n = ((tau_v - tau_c.value) * bd).max(0.0);
    let capacity = 0.87 * fy_stirrup * asv;
    let strength_spacing = (vus_n > 0.0).then(|| capacity * d / vus_n);

    let mut candidates = Vec::with_capacity(4);
    if let Some(s) = strength_spacing {
        candidates.push((SpacingLimit::Strength, s));
    }
    candidates.push((SpacingLimit::MinimumShearReinforcement, capacity / (0.4 * b)));
    candidates.push((SpacingLimit::DepthLimit, DEPTH_SPACING_FACTOR * d));
    candidates.push((SpacingLimit::AbsoluteMaximum, MAX_STIRRUP_SPACING_MM));

    // First listed wins ties
    let (limit, spacing) = candidates
        .into_iter()
        .fold(None, |best: Option<(SpacingLimit, f64)>, (l, s)| match best {
            Some((_, bs)) if bs <= s => best,
            _ => Some((l, s)),
        })
        .ok_or_else(|| CalcError::Internal { message: "no spacing candidates".to_string() })?;

    let (status, remarks) = if vus_n > 0.0 {
        (
            ShearStatus::DesignedStirrups,
            format!(
                "τv = {:.3} MPa > τc = {:.2} MPa; Vus = {:.1} kN, {}-legged {:.0} mm stirrups at {:.0} mm ({} governs, {}){}",
                tau_v,
                tau_c.value,
                vus_n / 1.0e3,
                stirrups.legs,
                stirrups.diameter_mm,
                spacing,
                limit.display_name(),
                clause::SHEAR_REINFORCEMENT,
                fy_note
            ),
        )
    } else {
        (
            ShearStatus::MinimumReinforcement,
            format!(
                "τv = {:.3} MPa ≤ τc = {:.2} MPa; minimum shear reinforcement at {:.0} mm ({} governs, {}){}",
                tau_v,
                tau_c.value,
                spacing,
                limit.display_name(),
                clause::MIN_SHEAR_REINFORCEMENT,
                fy_note
            ),
        )
    };
    debug!(tau_v, tau_c = tau_c.value, vus_n, spacing, status = %status, "shear design");

    Ok(ShearResult {
        tau_v_mpa: tau_v,
        tau_c_mpa: tau_c.value,
        tau_c_max_mpa: tau_c_max.value,
        vus_kn: Kn::from(Newtons(vus_n)).value(),
        asv_mm2: asv,
        stirrup_fy_mpa: fy_stirrup,
        strength_spacing_mm: strength_spacing,
        spacing_mm: Some(spacing),
        governing_limit: Some(limit),
        status,
        is_safe: true,
        remarks,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> Section {
        Section::rectangular(230.0, 450.0, 500.0, 25.0)
    }

    fn design(shear_kn: f64, pt: f64) -> ShearResult {
        design_shear(
            &DesignAction::new(0.0, shear_kn),
            &section(),
            &Materials::new(20.0, 415.0),
            &StirrupGeometry::new(2, 8.0, 415.0),
            pt,
            CodeTables::standard(),
        )
        .unwrap()
    }

    #[test]
    fn test_nominal_shear_stress() {
        let tau = nominal_shear_stress(&DesignAction::new(0.0, 100.0), &section()).unwrap();
        assert!((tau - 0.9662).abs() < 1e-3);
    }

    #[test]
    fn test_spacing_capped_at_300() {
        let result = design(100.0, 1.0);
        assert!((result.tau_c_mpa - 0.62).abs() < 1e-9);
        assert!((result.tau_c_max_mpa - 2.8).abs() < 1e-9);
        assert!((result.vus_kn - 35.83).abs() < 0.05);
        assert!((result.asv_mm2 - 100.53).abs() < 0.01);
        // Strength alone would allow ≈456 mm
        assert!(result.strength_spacing_mm.unwrap() > 450.0);
        assert_eq!(result.spacing_mm, Some(300.0));
        assert_eq!(result.governing_limit, Some(SpacingLimit::AbsoluteMaximum));
        assert_eq!(result.status, ShearStatus::DesignedStirrups);
        assert!(result.passes());
    }

    #[test]
    fn test_section_inadequate_has_no_spacing() {
        let result = design(300.0, 1.0);
        assert!(result.tau_v_mpa > 2.8);
        assert_eq!(result.status, ShearStatus::SectionInadequate);
        assert_eq!(result.spacing_mm, None);
        assert_eq!(result.strength_spacing_mm, None);
        assert!(!result.is_safe);
    }

    #[test]
    fn test_low_shear_minimum_reinforcement() {
        let result = design(50.0, 1.0);
        assert_eq!(result.status, ShearStatus::MinimumReinforcement);
        assert_eq!(result.vus_kn, 0.0);
        assert_eq!(result.spacing_mm, Some(300.0));
    }

    #[test]
    fn test_strength_governs_for_high_shear() {
        // τv = 2.0 MPa, Vus = (2.0 − 0.62)·103500 N
        let result = design(207.0, 1.0);
        assert_eq!(result.governing_limit, Some(SpacingLimit::Strength));
        let expected = 0.87 * 415.0 * result.asv_mm2 * 450.0 / (1.38 * 103_500.0);
        assert!((result.spacing_mm.unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_fe500_stirrups_limited_to_415() {
        let with = |fy: f64| {
            design_shear(
                &DesignAction::new(0.0, 207.0),
                &section(),
                &Materials::new(20.0, 415.0),
                &StirrupGeometry::new(2, 8.0, fy),
                1.0,
                CodeTables::standard(),
            )
            .unwrap()
        };
        let fe415 = with(415.0);
        let fe500 = with(500.0);
        assert_eq!(fe500.stirrup_fy_mpa, 415.0);
        assert_eq!(fe500.spacing_mm, fe415.spacing_mm);
        assert!(fe500.remarks.contains("limited to 415 MPa"));
        assert!(!fe415.remarks.contains("limited"));

        // Below the cap the supplied strength is used as is
        let fe250 = with(250.0);
        assert_eq!(fe250.stirrup_fy_mpa, 250.0);
        assert!(fe250.spacing_mm.unwrap() < fe415.spacing_mm.unwrap());
    }

    #[test]
    fn test_clamped_ratio_warns() {
        let result = design(100.0, 0.05);
        assert_eq!(result.warnings.len(), 1);
        assert!((result.tau_c_mpa - 0.28).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_stirrups_rejected() {
        let err = design_shear(
            &DesignAction::new(0.0, 100.0),
            &section(),
            &Materials::new(20.0, 415.0),
            &StirrupGeometry::new(0, 8.0, 415.0),
            1.0,
            CodeTables::standard(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
