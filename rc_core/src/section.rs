//! # Beam Cross-Sections
//!
//! Geometry of rectangular and flanged (T/L) reinforced-concrete sections,
//! with validation and gross-section properties.
//!
//! ```text
//!   Rectangular                 Flanged
//!   ┌───────┐  ┬              ┌─────────────────┐ ┬ ┬ Df
//!   │       │  │              └─────┐     ┌─────┘ │ ┴
//!   │       │  │ d   D              │     │       │ d   D
//!   │ • • • │  ┴                    │ • • │       ┴
//!   └───────┘     ┴                 └─────┘          ┴
//!       b                             bw
//! ```
//!
//! ## Notation
//!
//! - `b` / `bw` = width of rectangular section / web
//! - `bf` = flange width used in design (already the effective width)
//! - `Df` = flange thickness
//! - `d` = effective depth, `D` = overall depth

use serde::{Deserialize, Serialize};

use crate::code_tables::clause;
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};

/// Flange of a T- or L-beam acting in compression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flange {
    /// Flange width used in design (mm), normally from [`effective_flange_width`]
    pub width_mm: f64,
    /// Flange thickness Df (mm)
    pub thickness_mm: f64,
}

/// Beam cross-section.
///
/// For flanged sections `width_mm` is the web width `bw`.
///
/// ## JSON Example
///
/// ```json
/// {
///   "width_mm": 230.0,
///   "effective_depth_mm": 450.0,
///   "overall_depth_mm": 500.0,
///   "clear_cover_mm": 25.0,
///   "flange": null
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Width b of a rectangular section, or web width bw of a flanged section (mm)
    pub width_mm: f64,
    /// Effective depth d to the centroid of tension steel (mm)
    pub effective_depth_mm: f64,
    /// Overall depth D (mm)
    pub overall_depth_mm: f64,
    /// Clear cover to the outermost reinforcement (mm)
    pub clear_cover_mm: f64,
    /// Compression flange, if any
    #[serde(default)]
    pub flange: Option<Flange>,
}

impl Section {
    /// Rectangular section
    pub fn rectangular(width_mm: f64, effective_depth_mm: f64, overall_depth_mm: f64, clear_cover_mm: f64) -> Self {
        Section {
            width_mm,
            effective_depth_mm,
            overall_depth_mm,
            clear_cover_mm,
            flange: None,
        }
    }

    /// Flanged section with the given (effective) flange width and thickness
    pub fn flanged(
        web_width_mm: f64,
        effective_depth_mm: f64,
        overall_depth_mm: f64,
        clear_cover_mm: f64,
        flange_width_mm: f64,
        flange_thickness_mm: f64,
    ) -> Self {
        Section {
            width_mm: web_width_mm,
            effective_depth_mm,
            overall_depth_mm,
            clear_cover_mm,
            flange: Some(Flange {
                width_mm: flange_width_mm,
                thickness_mm: flange_thickness_mm,
            }),
        }
    }

    /// Validate geometry: D > d > 0, 0 ≤ cover < D, positive widths.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("width_mm", self.width_mm)?;
        require_positive("effective_depth_mm", self.effective_depth_mm)?;
        require_positive("overall_depth_mm", self.overall_depth_mm)?;
        require_non_negative("clear_cover_mm", self.clear_cover_mm)?;

        if self.effective_depth_mm >= self.overall_depth_mm {
            return Err(CalcError::invalid_input(
                "effective_depth_mm",
                self.effective_depth_mm.to_string(),
                format!("Effective depth must be less than overall depth ({} mm)", self.overall_depth_mm),
            ));
        }
        if self.clear_cover_mm >= self.overall_depth_mm {
            return Err(CalcError::invalid_input(
                "clear_cover_mm",
                self.clear_cover_mm.to_string(),
                format!("Cover must be less than overall depth ({} mm)", self.overall_depth_mm),
            ));
        }
        if let Some(flange) = &self.flange {
            require_positive("flange.width_mm", flange.width_mm)?;
            require_positive("flange.thickness_mm", flange.thickness_mm)?;
            if flange.width_mm < self.width_mm {
                return Err(CalcError::invalid_input(
                    "flange.width_mm",
                    flange.width_mm.to_string(),
                    format!("Flange width must be at least the web width ({} mm)", self.width_mm),
                ));
            }
            if flange.thickness_mm >= self.effective_depth_mm {
                return Err(CalcError::invalid_input(
                    "flange.thickness_mm",
                    flange.thickness_mm.to_string(),
                    format!("Flange thickness must be less than effective depth ({} mm)", self.effective_depth_mm),
                ));
            }
        }
        Ok(())
    }

    /// True for T/L sections
    pub fn is_flanged(&self) -> bool {
        self.flange.is_some()
    }

    /// Width of the compression face (flange width, or b)
    pub fn compression_width_mm(&self) -> f64 {
        self.flange.map_or(self.width_mm, |f| f.width_mm)
    }

    /// b·d using the web width (basis for steel percentages and shear stress)
    pub fn web_area_bd_mm2(&self) -> f64 {
        self.width_mm * self.effective_depth_mm
    }

    /// Gross concrete area (mm²)
    pub fn gross_area_mm2(&self) -> f64 {
        match &self.flange {
            None => self.width_mm * self.overall_depth_mm,
            Some(f) => f.width_mm * f.thickness_mm + self.width_mm * (self.overall_depth_mm - f.thickness_mm),
        }
    }

    /// Depth of the gross-section centroid below the compression face (mm)
    pub fn centroid_from_top_mm(&self) -> f64 {
        match &self.flange {
            None => self.overall_depth_mm / 2.0,
            Some(f) => {
                let web_depth = self.overall_depth_mm - f.thickness_mm;
                let a_flange = f.width_mm * f.thickness_mm;
                let a_web = self.width_mm * web_depth;
                (a_flange * f.thickness_mm / 2.0 + a_web * (f.thickness_mm + web_depth / 2.0))
                    / (a_flange + a_web)
            }
        }
    }

    /// Gross moment of inertia about the centroid, reinforcement ignored (mm⁴)
    pub fn gross_moment_of_inertia_mm4(&self) -> f64 {
        match &self.flange {
            None => self.width_mm * self.overall_depth_mm.powi(3) / 12.0,
            Some(f) => {
                let y = self.centroid_from_top_mm();
                let web_depth = self.overall_depth_mm - f.thickness_mm;
                let i_flange = f.width_mm * f.thickness_mm.powi(3) / 12.0
                    + f.width_mm * f.thickness_mm * (y - f.thickness_mm / 2.0).powi(2);
                let i_web = self.width_mm * web_depth.powi(3) / 12.0
                    + self.width_mm * web_depth * (f.thickness_mm + web_depth / 2.0 - y).powi(2);
                i_flange + i_web
            }
        }
    }

    /// Distance from the gross centroid to the extreme tension fibre (mm)
    pub fn centroid_to_tension_face_mm(&self) -> f64 {
        self.overall_depth_mm - self.centroid_from_top_mm()
    }
}

// ============================================================================
// Effective Flange Width
// ============================================================================

/// Flange arrangement for the effective-width rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlangeKind {
    /// Flange on both sides of the web, cast monolithically with a slab
    TBeam,
    /// Flange on one side only
    LBeam,
    /// Isolated T-beam (flange only for the compression zone)
    IsolatedT,
    /// Isolated L-beam
    IsolatedL,
}

/// Inputs to the effective-flange-width rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlangeWidthInput {
    pub kind: FlangeKind,
    /// Distance between points of zero moment l0 (mm)
    pub zero_moment_span_mm: f64,
    /// Web width bw (mm)
    pub web_width_mm: f64,
    /// Flange thickness Df (mm)
    pub flange_thickness_mm: f64,
    /// Flange width physically available (mm), e.g. web + half clear spans
    pub actual_width_mm: f64,
}

/// Effective flange width bf (mm), never more than the actual width.
///
/// # Formulas (IS 456 cl. 23.1.2)
/// - T-beam: bf = l0/6 + bw + 6·Df
/// - L-beam: bf = l0/12 + bw + 3·Df
/// - Isolated T: bf = l0 / (l0/b + 4) + bw
/// - Isolated L: bf = 0.5·l0 / (l0/b + 4) + bw
pub fn effective_flange_width(input: &FlangeWidthInput) -> CalcResult<f64> {
    require_positive("zero_moment_span_mm", input.zero_moment_span_mm)?;
    require_positive("web_width_mm", input.web_width_mm)?;
    require_positive("flange_thickness_mm", input.flange_thickness_mm)?;
    if input.actual_width_mm < input.web_width_mm {
        return Err(CalcError::invalid_input(
            "actual_width_mm",
            input.actual_width_mm.to_string(),
            format!("Actual flange width below web width ({})", clause::EFFECTIVE_FLANGE_WIDTH),
        ));
    }

    let l0 = input.zero_moment_span_mm;
    let bw = input.web_width_mm;
    let df = input.flange_thickness_mm;
    let b = input.actual_width_mm;

    let rule = match input.kind {
        FlangeKind::TBeam => l0 / 6.0 + bw + 6.0 * df,
        FlangeKind::LBeam => l0 / 12.0 + bw + 3.0 * df,
        FlangeKind::IsolatedT => l0 / (l0 / b + 4.0) + bw,
        FlangeKind::IsolatedL => 0.5 * l0 / (l0 / b + 4.0) + bw,
    };
    Ok(rule.min(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam() -> Section {
        Section::rectangular(230.0, 450.0, 500.0, 25.0)
    }

    #[test]
    fn test_valid_rectangular() {
        assert!(beam().validate().is_ok());
        assert!(!beam().is_flanged());
        assert_eq!(beam().compression_width_mm(), 230.0);
    }

    #[test]
    fn test_invalid_geometry() {
        let mut s = beam();
        s.effective_depth_mm = 500.0;
        assert!(s.validate().is_err());

        let mut s = beam();
        s.clear_cover_mm = 500.0;
        assert!(s.validate().is_err());

        let mut s = beam();
        s.width_mm = 0.0;
        assert!(s.validate().is_err());

        let mut s = beam();
        s.effective_depth_mm = -10.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_invalid_flange() {
        let s = Section::flanged(300.0, 450.0, 500.0, 25.0, 250.0, 120.0);
        assert!(s.validate().is_err());
        let s = Section::flanged(300.0, 450.0, 500.0, 25.0, 1200.0, 460.0);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rectangular_properties() {
        let s = beam();
        // I = bD³/12 = 230·500³/12
        assert!((s.gross_moment_of_inertia_mm4() - 2.3958e9).abs() < 1e6);
        assert_eq!(s.centroid_from_top_mm(), 250.0);
    }

    #[test]
    fn test_flanged_properties() {
        let s = Section::flanged(300.0, 550.0, 600.0, 25.0, 1200.0, 120.0);
        let area = s.gross_area_mm2();
        assert!((area - (1200.0 * 120.0 + 300.0 * 480.0)).abs() < 1e-6);
        // Centroid moves up toward the flange
        assert!(s.centroid_from_top_mm() < 300.0);
        // More stiffness than the bare web
        assert!(s.gross_moment_of_inertia_mm4() > 300.0 * 600.0_f64.powi(3) / 12.0);
    }

    #[test]
    fn test_effective_flange_width_t_beam() {
        let input = FlangeWidthInput {
            kind: FlangeKind::TBeam,
            zero_moment_span_mm: 6000.0,
            web_width_mm: 300.0,
            flange_thickness_mm: 120.0,
            actual_width_mm: 3000.0,
        };
        // 6000/6 + 300 + 720 = 2020
        assert!((effective_flange_width(&input).unwrap() - 2020.0).abs() < 1e-9);
    }

    #[test]
    fn test_effective_flange_width_capped_by_actual() {
        let input = FlangeWidthInput {
            kind: FlangeKind::TBeam,
            zero_moment_span_mm: 6000.0,
            web_width_mm: 300.0,
            flange_thickness_mm: 120.0,
            actual_width_mm: 1500.0,
        };
        assert_eq!(effective_flange_width(&input).unwrap(), 1500.0);
    }

    #[test]
    fn test_effective_flange_width_l_and_isolated() {
        let l = FlangeWidthInput {
            kind: FlangeKind::LBeam,
            zero_moment_span_mm: 6000.0,
            web_width_mm: 300.0,
            flange_thickness_mm: 120.0,
            actual_width_mm: 3000.0,
        };
        // 500 + 300 + 360
        assert!((effective_flange_width(&l).unwrap() - 1160.0).abs() < 1e-9);

        let iso = FlangeWidthInput { kind: FlangeKind::IsolatedT, actual_width_mm: 1000.0, ..l };
        // 6000/(6+4) + 300 = 900
        assert!((effective_flange_width(&iso).unwrap() - 900.0).abs() < 1e-9);
    }
}
