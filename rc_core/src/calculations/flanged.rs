//! # Flanged Beams (T and L Sections)
//!
//! Flexure design of beams whose compression face is widened by a slab,
//! per IS 456 Annex G-2.2 with the effective flange width of cl. 23.1.2.
//!
//! ## Neutral-Axis Cases
//!
//! ```text
//! (a) Mu ≤ Muf                 NA inside the flange: rectangular, b = bf
//! (b) Muf < Mu ≤ Mu,lim,T      NA in the web: web block + flange block
//! (c) Mu > Mu,lim,T            compression steel at xu = xu,max
//! ```
//!
//! where Muf is the moment with the whole flange depth in compression
//! (or xu,max if that is shallower) and
//!
//! ```text
//! Mu,lim,T = 0.36·fck·bw·xu,max·(d − 0.42·xu,max) + 0.45·fck·(bf − bw)·yf·(d − yf/2)
//! yf = Df                          when Df/d ≤ 0.2
//! yf = min(0.15·xu + 0.65·Df, Df)  otherwise
//! ```
//!
//! In case (b) the neutral-axis depth is found by bisection on the
//! (monotone) moment-depth relation between Df and xu,max.
//!
//! ## Example
//!
//! ```rust
//! use rc_core::calculations::flanged::{design_flanged_beam, FlangedBeam, NeutralAxisLocation};
//! use rc_core::code_tables::CodeTables;
//! use rc_core::materials::Materials;
//! use rc_core::section::FlangeKind;
//!
//! let beam = FlangedBeam {
//!     web_width_mm: 300.0,
//!     effective_depth_mm: 550.0,
//!     overall_depth_mm: 600.0,
//!     clear_cover_mm: 25.0,
//!     flange_thickness_mm: 120.0,
//!     actual_flange_width_mm: 1500.0,
//!     kind: FlangeKind::TBeam,
//!     zero_moment_span_mm: 6000.0,
//! };
//! let mats = Materials::new(20.0, 415.0);
//!
//! let result = design_flanged_beam(&beam, &mats, 400.0, None, CodeTables::standard()).unwrap();
//! assert_eq!(result.neutral_axis_location, NeutralAxisLocation::WithinFlange);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::bisect;
use super::flexure::{
    concrete_block, design_at_limit_with_compression_steel, limiting_state, steel_limits,
    validate_compression_depth, FlexureResult, FlexureStatus, LimitingState, SectionClassification,
};
use crate::code_tables::{clause, CodeTables};
use crate::errors::{require_non_negative, CalcError, CalcResult};
use crate::materials::Materials;
use crate::section::{effective_flange_width, FlangeKind, FlangeWidthInput, Section};
use crate::units::{KnM, NMm};

const DEPTH_TOLERANCE_MM: f64 = 1e-6;
const MAX_DEPTH_ITERATIONS: u32 = 100;

/// Where the neutral axis sits in a flanged section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeutralAxisLocation {
    /// xu ≤ Df: equivalent rectangle of width bf
    WithinFlange,
    /// Df < xu ≤ xu,max, singly reinforced
    BelowFlange,
    /// Mu > Mu,lim,T: compression steel needed
    CompressionSteelRequired,
}

impl NeutralAxisLocation {
    pub fn display_name(&self) -> &'static str {
        match self {
            NeutralAxisLocation::WithinFlange => "Within flange",
            NeutralAxisLocation::BelowFlange => "Below flange",
            NeutralAxisLocation::CompressionSteelRequired => "Compression steel required",
        }
    }
}

/// Flanged beam geometry before the effective-width rule is applied.
///
/// ## JSON Example
///
/// ```json
/// {
///   "web_width_mm": 300.0,
///   "effective_depth_mm": 550.0,
///   "overall_depth_mm": 600.0,
///   "clear_cover_mm": 25.0,
///   "flange_thickness_mm": 120.0,
///   "actual_flange_width_mm": 1500.0,
///   "kind": "TBeam",
///   "zero_moment_span_mm": 6000.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlangedBeam {
    pub web_width_mm: f64,
    pub effective_depth_mm: f64,
    pub overall_depth_mm: f64,
    pub clear_cover_mm: f64,
    /// Df (mm)
    pub flange_thickness_mm: f64,
    /// Flange width physically available (mm)
    pub actual_flange_width_mm: f64,
    pub kind: FlangeKind,
    /// Distance between points of zero moment l0 (mm)
    pub zero_moment_span_mm: f64,
}

impl FlangedBeam {
    /// Effective flange width bf (mm)
    pub fn effective_flange_width_mm(&self) -> CalcResult<f64> {
        effective_flange_width(&FlangeWidthInput {
            kind: self.kind,
            zero_moment_span_mm: self.zero_moment_span_mm,
            web_width_mm: self.web_width_mm,
            flange_thickness_mm: self.flange_thickness_mm,
            actual_width_mm: self.actual_flange_width_mm,
        })
    }

    /// Design section carrying the effective flange width
    pub fn design_section(&self) -> CalcResult<Section> {
        let bf = self.effective_flange_width_mm()?;
        let section = Section::flanged(
            self.web_width_mm,
            self.effective_depth_mm,
            self.overall_depth_mm,
            self.clear_cover_mm,
            bf,
            self.flange_thickness_mm,
        );
        section.validate()?;
        Ok(section)
    }
}

/// Result of a flanged-beam design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlangedFlexureResult {
    /// Steel, neutral axis and verdict (percentages on bw·d)
    pub flexure: FlexureResult,
    pub neutral_axis_location: NeutralAxisLocation,
    /// bf used in design (mm)
    pub effective_flange_width_mm: f64,
    pub flange_thickness_mm: f64,
    /// Moment with the neutral axis at the flange soffit (kN·m)
    pub mu_flange_knm: f64,
}

impl FlangedFlexureResult {
    pub fn passes(&self) -> bool {
        self.flexure.passes()
    }
}

/// Design a flanged beam, applying the effective-width rule first.
pub fn design_flanged_beam(
    beam: &FlangedBeam,
    materials: &Materials,
    mu_knm: f64,
    d_prime_mm: Option<f64>,
    tables: &CodeTables,
) -> CalcResult<FlangedFlexureResult> {
    let section = beam.design_section()?;
    design_flanged_section(&section, materials, mu_knm, d_prime_mm, tables)
}

/// Design a section whose flange width is already the effective width.
///
/// With `d_prime_mm = None`, a moment above Mu,lim,T is reported as
/// [`FlexureStatus::ExceedsLimitingMoment`] instead of adding compression steel.
pub fn design_flanged_section(
    section: &Section,
    materials: &Materials,
    mu_knm: f64,
    d_prime_mm: Option<f64>,
    tables: &CodeTables,
) -> CalcResult<FlangedFlexureResult> {
    section.validate()?;
    materials.validate()?;
    require_non_negative("mu_knm", mu_knm)?;
    let flange = section
        .flange
        .ok_or_else(|| CalcError::invalid_input("flange", "none", "A flanged design needs a flange"))?;
    if let Some(dp) = d_prime_mm {
        validate_compression_depth(section, dp)?;
    }

    let fck = materials.fck_mpa;
    let mu_nmm = NMm::from(KnM(mu_knm)).value();
    let limit = limiting_state(section, materials, tables);
    let muf_nmm = concrete_block(section, fck, flange.thickness_mm.min(limit.xu_max_mm)).1;
    let wrap = |flexure: FlexureResult, location: NeutralAxisLocation| FlangedFlexureResult {
        flexure,
        neutral_axis_location: location,
        effective_flange_width_mm: flange.width_mm,
        flange_thickness_mm: flange.thickness_mm,
        mu_flange_knm: KnM::from(NMm(muf_nmm)).value(),
    };

    if mu_nmm <= muf_nmm {
        // Equivalent rectangle of width bf
        let (bf, d) = (flange.width_mm, section.effective_depth_mm);
        let k = 4.6 * mu_nmm / (fck * bf * d * d);
        let ast = 0.5 * (fck / materials.fy_mpa) * (1.0 - (1.0 - k).max(0.0).sqrt()) * bf * d;
        let xu = materials.fyd_mpa() * ast / (0.36 * fck * bf);
        debug!(mu_knm, ast, xu, "flanged: neutral axis within flange");
        let result = singly_result(section, materials, mu_knm, ast, xu, &limit);
        return Ok(wrap(result, NeutralAxisLocation::WithinFlange));
    }

    if mu_nmm <= limit.mu_lim_nmm {
        let moment_gap = |xu: f64| concrete_block(section, fck, xu).1 - mu_nmm;
        let (xu, iterations) = bisect(
            moment_gap,
            flange.thickness_mm,
            limit.xu_max_mm,
            DEPTH_TOLERANCE_MM,
            MAX_DEPTH_ITERATIONS,
        );
        let ast = concrete_block(section, fck, xu).0 / materials.fyd_mpa();
        debug!(mu_knm, ast, xu, iterations, "flanged: neutral axis below flange");
        let result = singly_result(section, materials, mu_knm, ast, xu, &limit);
        return Ok(wrap(result, NeutralAxisLocation::BelowFlange));
    }

    let location = NeutralAxisLocation::CompressionSteelRequired;
    match d_prime_mm {
        Some(dp) => {
            let result = design_at_limit_with_compression_steel(section, materials, mu_knm, dp, limit);
            Ok(wrap(result, location))
        }
        None => {
            let mu_lim_knm = KnM::from(NMm(limit.mu_lim_nmm)).value();
            warn!(mu_knm, mu_lim_knm, "moment exceeds flanged limiting moment");
            let (ast_min, ast_max) = steel_limits(section, materials);
            let ast = (limit.compression_n / materials.fyd_mpa()).max(ast_min);
            let result = FlexureResult {
                mu_knm,
                mu_lim_knm,
                ast_required_mm2: ast,
                asc_required_mm2: 0.0,
                ast_min_mm2: ast_min,
                ast_max_mm2: ast_max,
                steel_percentage: 100.0 * ast / section.web_area_bd_mm2(),
                compression_steel_stress_mpa: None,
                xu_mm: limit.xu_max_mm,
                xu_max_mm: limit.xu_max_mm,
                xu_max_ratio: limit.xu_max_ratio,
                classification: SectionClassification::OverReinforced,
                status: FlexureStatus::ExceedsLimitingMoment,
                minimum_steel_governs: false,
                is_safe: false,
                reason: format!(
                    "Mu = {:.1} kN·m > Mu,lim,T = {:.1} kN·m; compression steel required ({})",
                    mu_knm, mu_lim_knm, clause::FLANGED
                ),
                warnings: limit.warnings,
            };
            Ok(wrap(result, location))
        }
    }
}

/// Singly reinforced flanged result, minimum/maximum steel on the web.
fn singly_result(
    section: &Section,
    materials: &Materials,
    mu_knm: f64,
    ast_calc: f64,
    xu: f64,
    limit: &LimitingState,
) -> FlexureResult {
    let (ast_min, ast_max) = steel_limits(section, materials);
    let minimum_governs = ast_calc < ast_min;
    let ast = ast_calc.max(ast_min);
    let mu_lim_knm = KnM::from(NMm(limit.mu_lim_nmm)).value();

    let (status, reason) = if ast > ast_max {
        (
            FlexureStatus::ExceedsMaximumSteel,
            format!("Ast = {:.0} mm² exceeds the maximum {:.0} mm² ({})", ast, ast_max, clause::MAX_STEEL),
        )
    } else if minimum_governs {
        (
            FlexureStatus::MinimumSteelGoverns,
            format!(
                "Mu = {:.1} kN·m; minimum steel governs, Ast,min = {:.0} mm² ({})",
                mu_knm, ast_min, clause::MIN_TENSION_STEEL
            ),
        )
    } else {
        (
            FlexureStatus::SinglyReinforced,
            format!(
                "Mu = {:.1} kN·m ≤ Mu,lim,T = {:.1} kN·m; Ast = {:.0} mm² ({})",
                mu_knm, mu_lim_knm, ast, clause::FLANGED
            ),
        )
    };

    FlexureResult {
        mu_knm,
        mu_lim_knm,
        ast_required_mm2: ast,
        asc_required_mm2: 0.0,
        ast_min_mm2: ast_min,
        ast_max_mm2: ast_max,
        steel_percentage: 100.0 * ast / section.web_area_bd_mm2(),
        compression_steel_stress_mpa: None,
        xu_mm: xu,
        xu_max_mm: limit.xu_max_mm,
        xu_max_ratio: limit.xu_max_ratio,
        classification: SectionClassification::classify(xu, limit.xu_max_mm),
        status,
        minimum_steel_governs: minimum_governs,
        is_safe: status.is_safe(),
        reason,
        warnings: limit.warnings.clone(),
    }
}
