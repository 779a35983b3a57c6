//! # Materials
//!
//! Concrete and reinforcing-steel definitions for limit-state design.
//!
//! ## Material Types
//!
//! - **Concrete**: characterised by its 28-day cube strength `fck` (MPa)
//! - **Reinforcement**: characterised by its yield/0.2 % proof stress `fy` (MPa).
//!   The three standard grades (Fe250, Fe415, Fe500) each select a fixed
//!   limiting neutral-axis ratio from the code tables.
//!
//! ## Example
//!
//! ```rust
//! use rc_core::materials::{Materials, SteelGrade};
//!
//! let mats = Materials::new(25.0, 500.0);
//! assert_eq!(mats.steel_grade(), Some(SteelGrade::Fe500));
//! println!("Ec = {:.0} MPa", mats.ec_mpa());
//! ```

pub mod rebar;

pub use rebar::{
    bar_area_mm2, bar_mass_kg_per_m, design_steel_stress, steel_strain_at_stress,
    SteelCurve, StressSolve, STANDARD_DIAMETERS_MM,
};

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, CalcError, CalcResult};

/// Elastic modulus of reinforcing steel Es (MPa)
pub const ES_MPA: f64 = 200_000.0;

/// Ultimate compressive strain of concrete in bending
pub const CONCRETE_ULTIMATE_STRAIN: f64 = 0.0035;

/// Standard reinforcing-steel grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteelGrade {
    /// Mild steel, fy = 250 MPa
    Fe250,
    /// High-yield deformed bars, fy = 415 MPa
    Fe415,
    /// High-yield deformed bars, fy = 500 MPa
    Fe500,
}

impl SteelGrade {
    /// All standard grades
    pub const ALL: [SteelGrade; 3] = [SteelGrade::Fe250, SteelGrade::Fe415, SteelGrade::Fe500];

    /// Characteristic yield strength (MPa)
    pub fn fy_mpa(&self) -> f64 {
        match self {
            SteelGrade::Fe250 => 250.0,
            SteelGrade::Fe415 => 415.0,
            SteelGrade::Fe500 => 500.0,
        }
    }

    /// Match a yield strength to a standard grade (exact match only)
    pub fn from_fy(fy_mpa: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|grade| (grade.fy_mpa() - fy_mpa).abs() < 1e-9)
    }

    /// Parse from common string representations ("Fe415", "fe 415", "415")
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_uppercase().replace([' ', '-', '_'], "").as_str() {
            "FE250" | "250" => Ok(SteelGrade::Fe250),
            "FE415" | "415" => Ok(SteelGrade::Fe415),
            "FE500" | "500" => Ok(SteelGrade::Fe500),
            _ => Err(CalcError::material_not_found(s)),
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SteelGrade::Fe250 => "Fe250",
            SteelGrade::Fe415 => "Fe415",
            SteelGrade::Fe500 => "Fe500",
        }
    }
}

impl std::fmt::Display for SteelGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Material grades for one beam.
///
/// ## JSON Example
///
/// ```json
/// { "fck_mpa": 25.0, "fy_mpa": 500.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Materials {
    /// Characteristic compressive strength of concrete (MPa)
    pub fck_mpa: f64,
    /// Characteristic yield strength of main reinforcement (MPa)
    pub fy_mpa: f64,
}

impl Materials {
    /// Create a material pair
    pub fn new(fck_mpa: f64, fy_mpa: f64) -> Self {
        Materials { fck_mpa, fy_mpa }
    }

    /// Validate strengths (both strictly positive)
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("fck_mpa", self.fck_mpa)?;
        require_positive("fy_mpa", self.fy_mpa)?;
        Ok(())
    }

    /// Standard steel grade, if `fy` is one of the tabulated grades
    pub fn steel_grade(&self) -> Option<SteelGrade> {
        SteelGrade::from_fy(self.fy_mpa)
    }

    /// Design yield stress of steel 0.87·fy (MPa)
    pub fn fyd_mpa(&self) -> f64 {
        0.87 * self.fy_mpa
    }

    /// Short-term elastic modulus of concrete Ec = 5000·√fck (MPa)
    pub fn ec_mpa(&self) -> f64 {
        5000.0 * self.fck_mpa.sqrt()
    }

    /// Flexural tensile strength fcr = 0.7·√fck (MPa)
    pub fn fcr_mpa(&self) -> f64 {
        0.7 * self.fck_mpa.sqrt()
    }

    /// Short-term modular ratio m = Es/Ec
    pub fn modular_ratio(&self) -> f64 {
        ES_MPA / self.ec_mpa()
    }

    /// Which design stress-strain curve applies to the main bars
    pub fn steel_curve(&self) -> SteelCurve {
        SteelCurve::for_fy(self.fy_mpa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steel_grade_lookup() {
        assert_eq!(SteelGrade::from_fy(415.0), Some(SteelGrade::Fe415));
        assert_eq!(SteelGrade::from_fy(450.0), None);
        assert_eq!(SteelGrade::from_str_flexible("fe 500").unwrap(), SteelGrade::Fe500);
        assert!(SteelGrade::from_str_flexible("Fe600").is_err());
    }

    #[test]
    fn test_concrete_properties() {
        let mats = Materials::new(25.0, 500.0);
        assert!((mats.ec_mpa() - 25_000.0).abs() < 1e-9);
        assert!((mats.fcr_mpa() - 3.5).abs() < 1e-9);
        assert!((mats.modular_ratio() - 8.0).abs() < 1e-9);
        assert!((mats.fyd_mpa() - 435.0).abs() < 1e-9);
    }

    #[test]
    fn test_validation() {
        assert!(Materials::new(20.0, 415.0).validate().is_ok());
        assert!(Materials::new(0.0, 415.0).validate().is_err());
        assert!(Materials::new(20.0, -415.0).validate().is_err());
    }

    #[test]
    fn test_serialization() {
        let mats = Materials::new(30.0, 415.0);
        let json = serde_json::to_string(&mats).unwrap();
        let roundtrip: Materials = serde_json::from_str(&json).unwrap();
        assert_eq!(mats, roundtrip);
        assert_eq!(serde_json::to_string(&SteelGrade::Fe415).unwrap(), "\"Fe415\"");
    }
}
