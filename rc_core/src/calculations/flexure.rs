//! # Flexure Design (Limit State of Collapse)
//!
//! Bending design of rectangular sections per IS 456 cl. 38.1 and Annex G,
//! using the rectangular-parabolic stress block (0.36·fck·b·xu acting at
//! 0.42·xu from the compression face).
//!
//! ## Design Routes
//!
//! | Applied moment | Route | Result status |
//! |---|---|---|
//! | Mu ≤ Mu,lim | singly reinforced, quadratic solve for Ast | `SinglyReinforced` / `MinimumSteelGoverns` |
//! | Mu > Mu,lim | compression steel added at xu = xu,max | `DoublyReinforced` |
//! | Mu > Mu,lim, singly route only | reported as over the limit | `ExceedsLimitingMoment` |
//!
//! Exceeding a limit is an ordinary outcome carried in [`FlexureResult`];
//! only impossible inputs return `Err`.
//!
//! ## Example
//!
//! ```rust
//! use rc_core::calculations::flexure::{design_singly_reinforced, SectionClassification};
//! use rc_core::code_tables::CodeTables;
//! use rc_core::materials::Materials;
//! use rc_core::section::Section;
//!
//! let section = Section::rectangular(230.0, 450.0, 500.0, 25.0);
//! let mats = Materials::new(25.0, 500.0);
//!
//! let result = design_singly_reinforced(&section, &mats, 150.0, CodeTables::standard()).unwrap();
//!
//! println!("Mu,lim = {:.1} kN·m", result.mu_lim_knm);
//! println!("Ast = {:.0} mm²", result.ast_required_mm2);
//! assert_eq!(result.classification, SectionClassification::UnderReinforced);
//! assert!(result.passes());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::bisect;
use crate::code_tables::{clause, CodeTables, RangeWarning};
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::materials::{design_steel_stress, Materials, CONCRETE_ULTIMATE_STRAIN};
use crate::section::Section;
use crate::units::{KnM, NMm};

/// Relative tolerance on xu/xu,max for a section to count as balanced
const BALANCE_TOLERANCE: f64 = 1e-3;

/// Maximum steel as a fraction of b·D (each of tension and compression)
pub const MAX_STEEL_FRACTION: f64 = 0.04;

/// Depth tolerance for neutral-axis bisection (mm)
const DEPTH_TOLERANCE_MM: f64 = 1e-6;

const MAX_DEPTH_ITERATIONS: u32 = 100;

// ============================================================================
// Types
// ============================================================================

/// Position of the actual neutral axis relative to the limiting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionClassification {
    /// xu < xu,max: tension steel yields first
    UnderReinforced,
    /// xu = xu,max
    Balanced,
    /// xu > xu,max: concrete crushes before steel yields
    OverReinforced,
}

impl SectionClassification {
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionClassification::UnderReinforced => "Under-reinforced",
            SectionClassification::Balanced => "Balanced",
            SectionClassification::OverReinforced => "Over-reinforced",
        }
    }

    /// Classify xu against xu,max
    pub fn classify(xu_mm: f64, xu_max_mm: f64) -> Self {
        if (xu_mm - xu_max_mm).abs() <= BALANCE_TOLERANCE * xu_max_mm {
            SectionClassification::Balanced
        } else if xu_mm < xu_max_mm {
            SectionClassification::UnderReinforced
        } else {
            SectionClassification::OverReinforced
        }
    }
}

impl std::fmt::Display for SectionClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Outcome of a flexure design call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlexureStatus {
    /// Closed-form tension steel above the minimum
    SinglyReinforced,
    /// Minimum tension steel governs
    MinimumSteelGoverns,
    /// Compression steel provided; Asc is always reported with this status
    DoublyReinforced,
    /// Mu > Mu,lim and no compression steel was allowed
    ExceedsLimitingMoment,
    /// Required steel beyond 4 % of b·D
    ExceedsMaximumSteel,
    /// d' ≥ xu,max, so compression bars carry no useful stress
    CompressionSteelIneffective,
}

impl FlexureStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            FlexureStatus::SinglyReinforced => "Singly reinforced",
            FlexureStatus::MinimumSteelGoverns => "Minimum steel governs",
            FlexureStatus::DoublyReinforced => "Doubly reinforced",
            FlexureStatus::ExceedsLimitingMoment => "Exceeds limiting moment",
            FlexureStatus::ExceedsMaximumSteel => "Exceeds maximum steel",
            FlexureStatus::CompressionSteelIneffective => "Compression steel ineffective",
        }
    }

    /// True for outcomes that describe a buildable section
    pub fn is_safe(&self) -> bool {
        matches!(
            self,
            FlexureStatus::SinglyReinforced
                | FlexureStatus::MinimumSteelGoverns
                | FlexureStatus::DoublyReinforced
        )
    }
}

impl std::fmt::Display for FlexureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Limiting moment of a singly reinforced section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitingMoment {
    /// Mu,lim (kN·m)
    pub mu_lim_knm: f64,
    /// xu,max (mm)
    pub xu_max_mm: f64,
    /// xu,max / d
    pub xu_max_ratio: f64,
    pub warnings: Vec<RangeWarning>,
}

/// Tension steel needed for an applied moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TensionSteelDemand {
    /// Mu ≤ Mu,lim
    Required {
        /// Steel to provide, after the minimum (mm²)
        ast_mm2: f64,
        /// Closed-form quadratic value before the minimum (mm²)
        ast_calc_mm2: f64,
        minimum_governs: bool,
    },
    /// Mu > Mu,lim: a singly reinforced section cannot carry the moment
    ExceedsLimit {
        mu_knm: f64,
        mu_lim_knm: f64,
        /// Tension steel that balances the limiting moment (mm²)
        ast_limit_mm2: f64,
    },
}

/// Steel actually provided in a section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProvidedSteel {
    /// Tension steel (mm²)
    pub ast_mm2: f64,
    /// Compression steel (mm²), zero if none
    #[serde(default)]
    pub asc_mm2: f64,
    /// Depth of compression steel centroid from the compression face d' (mm)
    #[serde(default)]
    pub compression_depth_mm: f64,
}

impl ProvidedSteel {
    /// Tension steel only
    pub fn tension_only(ast_mm2: f64) -> Self {
        ProvidedSteel { ast_mm2, asc_mm2: 0.0, compression_depth_mm: 0.0 }
    }

    pub fn validate(&self, section: &Section) -> CalcResult<()> {
        require_positive("ast_mm2", self.ast_mm2)?;
        require_non_negative("asc_mm2", self.asc_mm2)?;
        if self.asc_mm2 > 0.0 {
            require_positive("compression_depth_mm", self.compression_depth_mm)?;
            if self.compression_depth_mm >= section.effective_depth_mm {
                return Err(CalcError::invalid_input(
                    "compression_depth_mm",
                    self.compression_depth_mm.to_string(),
                    "Compression steel must lie above the tension steel",
                ));
            }
        }
        Ok(())
    }
}

/// Result of a flexure design.
///
/// ## JSON Example
///
/// ```json
/// {
///   "mu_knm": 150.0,
///   "mu_lim_knm": 155.57,
///   "ast_required_mm2": 935.9,
///   "asc_required_mm2": 0.0,
///   "status": "SinglyReinforced",
///   "classification": "UnderReinforced",
///   "is_safe": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexureResult {
    /// Applied factored moment (kN·m)
    pub mu_knm: f64,
    /// Limiting moment of the section (kN·m)
    pub mu_lim_knm: f64,

    // === Steel ===
    /// Required tension steel (mm²)
    pub ast_required_mm2: f64,
    /// Required compression steel (mm²), zero when not needed
    pub asc_required_mm2: f64,
    /// Minimum tension steel 0.85·b·d/fy (mm²)
    pub ast_min_mm2: f64,
    /// Maximum steel 0.04·b·D (mm²)
    pub ast_max_mm2: f64,
    /// Tension steel as a percentage of b·d
    pub steel_percentage: f64,
    /// Design stress in compression steel (MPa), when compression steel is used
    pub compression_steel_stress_mpa: Option<f64>,

    // === Neutral Axis ===
    pub xu_mm: f64,
    pub xu_max_mm: f64,
    pub xu_max_ratio: f64,
    pub classification: SectionClassification,

    // === Verdict ===
    pub status: FlexureStatus,
    pub minimum_steel_governs: bool,
    pub is_safe: bool,
    /// Why the section passes or fails
    pub reason: String,
    pub warnings: Vec<RangeWarning>,
}

impl FlexureResult {
    /// Check if the design is buildable
    pub fn passes(&self) -> bool {
        self.is_safe
    }

    /// Mu / Mu,lim
    pub fn limit_ratio(&self) -> f64 {
        if self.mu_lim_knm > 0.0 {
            self.mu_knm / self.mu_lim_knm
        } else {
            f64::INFINITY
        }
    }
}

/// Capacity of a section with known reinforcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentOfResistance {
    /// Mu,R (kN·m)
    pub mu_r_knm: f64,
    /// Neutral-axis depth from force equilibrium (mm)
    pub xu_mm: f64,
    pub xu_max_mm: f64,
    pub classification: SectionClassification,
    /// Tension steel stress at equilibrium (MPa)
    pub tension_steel_stress_mpa: f64,
    pub warnings: Vec<RangeWarning>,
}

// ============================================================================
// Section Mechanics (shared with the flanged solver)
// ============================================================================

/// Limiting state of a section at xu = xu,max.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LimitingState {
    pub xu_max_mm: f64,
    pub xu_max_ratio: f64,
    pub mu_lim_nmm: f64,
    /// Concrete compression at xu,max (N)
    pub compression_n: f64,
    pub warnings: Vec<RangeWarning>,
}

/// Concrete compression force (N) and its moment about the tension steel
/// (N·mm) for a neutral-axis depth `xu_mm`.
///
/// Rectangular (or neutral axis inside the flange): 0.36·fck·B·xu at
/// 0.42·xu. Below the flange, the web block plus 0.45·fck·(bf − bw)·yf with
/// yf = Df when Df/d ≤ 0.2, else min(0.15·xu + 0.65·Df, Df).
pub(crate) fn concrete_block(section: &Section, fck: f64, xu_mm: f64) -> (f64, f64) {
    let d = section.effective_depth_mm;
    match section.flange {
        Some(f) if xu_mm > f.thickness_mm => {
            let web = 0.36 * fck * section.width_mm * xu_mm;
            let yf = flange_block_depth(d, f.thickness_mm, xu_mm);
            let flange = 0.45 * fck * (f.width_mm - section.width_mm) * yf;
            (
                web + flange,
                web * (d - 0.42 * xu_mm) + flange * (d - yf / 2.0),
            )
        }
        _ => {
            let force = 0.36 * fck * section.compression_width_mm() * xu_mm;
            (force, force * (d - 0.42 * xu_mm))
        }
    }
}

fn flange_block_depth(d: f64, df: f64, xu_mm: f64) -> f64 {
    if df / d <= 0.2 {
        df
    } else {
        (0.15 * xu_mm + 0.65 * df).min(df)
    }
}

pub(crate) fn limiting_state(section: &Section, materials: &Materials, tables: &CodeTables) -> LimitingState {
    let ratio = tables.neutral_axis_limit_ratio(materials.fy_mpa);
    let xu_max = ratio.value * section.effective_depth_mm;
    let (compression, moment) = concrete_block(section, materials.fck_mpa, xu_max);
    LimitingState {
        xu_max_mm: xu_max,
        xu_max_ratio: ratio.value,
        mu_lim_nmm: moment,
        compression_n: compression,
        warnings: ratio.warnings,
    }
}

/// (Ast,min, Ast,max) in mm², both on the web width.
pub(crate) fn steel_limits(section: &Section, materials: &Materials) -> (f64, f64) {
    let ast_min = 0.85 * section.web_area_bd_mm2() / materials.fy_mpa;
    let ast_max = MAX_STEEL_FRACTION * section.width_mm * section.overall_depth_mm;
    (ast_min, ast_max)
}

/// Compression steel for the moment beyond the limiting moment.
pub(crate) struct CompressionSteel {
    pub asc_mm2: f64,
    /// Extra tension steel balancing the compression steel (mm²)
    pub ast2_mm2: f64,
    pub fsc_mpa: f64,
}

/// Asc and the balancing Ast2 for an excess moment `mu2_nmm`, or `None`
/// when the bars at depth `d_prime_mm` cannot develop useful stress.
pub(crate) fn compression_steel_for(
    section: &Section,
    materials: &Materials,
    mu2_nmm: f64,
    d_prime_mm: f64,
    xu_max_mm: f64,
) -> Option<CompressionSteel> {
    let strain = CONCRETE_ULTIMATE_STRAIN * (1.0 - d_prime_mm / xu_max_mm);
    let solve = design_steel_stress(materials.fy_mpa, strain);
    let net_stress = solve.stress_mpa - 0.446 * materials.fck_mpa;
    if strain <= 0.0 || net_stress <= 0.0 {
        return None;
    }
    debug!(strain, fsc = solve.stress_mpa, iterations = solve.iterations, "compression steel stress");
    let lever = section.effective_depth_mm - d_prime_mm;
    let asc = mu2_nmm / (net_stress * lever);
    Some(CompressionSteel {
        asc_mm2: asc,
        ast2_mm2: asc * net_stress / materials.fyd_mpa(),
        fsc_mpa: solve.stress_mpa,
    })
}

/// Design with compression steel at xu = xu,max. Shared by the rectangular
/// and flanged doubly reinforced routes.
pub(crate) fn design_at_limit_with_compression_steel(
    section: &Section,
    materials: &Materials,
    mu_knm: f64,
    d_prime_mm: f64,
    limit: LimitingState,
) -> FlexureResult {
    let mu_nmm = NMm::from(KnM(mu_knm)).value();
    let (ast_min, ast_max) = steel_limits(section, materials);
    let ast_lim = limit.compression_n / materials.fyd_mpa();
    let mu2 = mu_nmm - limit.mu_lim_nmm;
    let mu_lim_knm = KnM::from(NMm(limit.mu_lim_nmm)).value();
    let pt = |ast: f64| 100.0 * ast / section.web_area_bd_mm2();

    let base = FlexureResult {
        mu_knm,
        mu_lim_knm,
        ast_required_mm2: ast_lim.max(ast_min),
        asc_required_mm2: 0.0,
        ast_min_mm2: ast_min,
        ast_max_mm2: ast_max,
        steel_percentage: pt(ast_lim.max(ast_min)),
        compression_steel_stress_mpa: None,
        xu_mm: limit.xu_max_mm,
        xu_max_mm: limit.xu_max_mm,
        xu_max_ratio: limit.xu_max_ratio,
        classification: SectionClassification::Balanced,
        status: FlexureStatus::CompressionSteelIneffective,
        minimum_steel_governs: false,
        is_safe: false,
        reason: String::new(),
        warnings: limit.warnings,
    };

    let Some(comp) = compression_steel_for(section, materials, mu2, d_prime_mm, limit.xu_max_mm) else {
        warn!(d_prime_mm, xu_max_mm = limit.xu_max_mm, "compression steel ineffective");
        return FlexureResult {
            reason: format!(
                "Mu = {:.1} kN·m > Mu,lim = {:.1} kN·m; compression steel at d' = {:.0} mm \
                 develops no useful stress (xu,max = {:.0} mm)",
                mu_knm, mu_lim_knm, d_prime_mm, limit.xu_max_mm
            ),
            ..base
        };
    };

    let ast = (ast_lim + comp.ast2_mm2).max(ast_min);
    let asc = comp.asc_mm2;
    let within_max = ast <= ast_max && asc <= ast_max;
    let status = if within_max {
        FlexureStatus::DoublyReinforced
    } else {
        FlexureStatus::ExceedsMaximumSteel
    };
    let reason = if within_max {
        format!(
            "Mu = {:.1} kN·m > Mu,lim = {:.1} kN·m: doubly reinforced, Ast = {:.0} mm², Asc = {:.0} mm² ({})",
            mu_knm, mu_lim_knm, ast, asc, clause::FLEXURE
        )
    } else {
        warn!(ast, asc, ast_max, "doubly reinforced steel exceeds maximum");
        format!(
            "Mu = {:.1} kN·m needs Ast = {:.0} mm², Asc = {:.0} mm², beyond the maximum {:.0} mm² ({})",
            mu_knm, ast, asc, ast_max, clause::MAX_STEEL
        )
    };

    FlexureResult {
        ast_required_mm2: ast,
        asc_required_mm2: asc,
        steel_percentage: pt(ast),
        compression_steel_stress_mpa: Some(comp.fsc_mpa),
        status,
        is_safe: status.is_safe(),
        reason,
        ..base
    }
}

fn validate_inputs(section: &Section, materials: &Materials, mu_knm: f64) -> CalcResult<()> {
    section.validate()?;
    materials.validate()?;
    require_non_negative("mu_knm", mu_knm)
}

fn rectangular(section: &Section) -> Section {
    Section { flange: None, ..*section }
}

// ============================================================================
// Public Entry Points
// ============================================================================

/// Limiting moment Mu,lim = 0.36·fck·b·xu,max·(d − 0.42·xu,max).
///
/// Any flange on `section` is ignored; see
/// [`design_flanged_section`](super::flanged::design_flanged_section) for T-beams.
pub fn limiting_moment(section: &Section, materials: &Materials, tables: &CodeTables) -> CalcResult<LimitingMoment> {
    section.validate()?;
    materials.validate()?;
    let limit = limiting_state(&rectangular(section), materials, tables);
    Ok(LimitingMoment {
        mu_lim_knm: KnM::from(NMm(limit.mu_lim_nmm)).value(),
        xu_max_mm: limit.xu_max_mm,
        xu_max_ratio: limit.xu_max_ratio,
        warnings: limit.warnings,
    })
}

/// Tension steel for a singly reinforced rectangular section.
///
/// Ast = 0.5·(fck/fy)·[1 − √(1 − 4.6·Mu/(fck·b·d²))]·b·d, raised to
/// Ast,min = 0.85·b·d/fy. Returns [`TensionSteelDemand::ExceedsLimit`]
/// when Mu > Mu,lim.
pub fn required_tension_steel(
    section: &Section,
    materials: &Materials,
    mu_knm: f64,
    tables: &CodeTables,
) -> CalcResult<TensionSteelDemand> {
    validate_inputs(section, materials, mu_knm)?;
    let rect = rectangular(section);
    let limit = limiting_state(&rect, materials, tables);
    Ok(tension_demand(&rect, materials, mu_knm, &limit))
}

fn tension_demand(section: &Section, materials: &Materials, mu_knm: f64, limit: &LimitingState) -> TensionSteelDemand {
    let mu_nmm = NMm::from(KnM(mu_knm)).value();
    let mu_lim_knm = KnM::from(NMm(limit.mu_lim_nmm)).value();
    if mu_nmm > limit.mu_lim_nmm {
        return TensionSteelDemand::ExceedsLimit {
            mu_knm,
            mu_lim_knm,
            ast_limit_mm2: limit.compression_n / materials.fyd_mpa(),
        };
    }

    let b = section.width_mm;
    let d = section.effective_depth_mm;
    let (fck, fy) = (materials.fck_mpa, materials.fy_mpa);
    let k = 4.6 * mu_nmm / (fck * b * d * d);
    let ast_calc = 0.5 * (fck / fy) * (1.0 - (1.0 - k).max(0.0).sqrt()) * b * d;
    let (ast_min, _) = steel_limits(section, materials);
    let minimum_governs = ast_calc < ast_min;
    TensionSteelDemand::Required {
        ast_mm2: ast_calc.max(ast_min),
        ast_calc_mm2: ast_calc,
        minimum_governs,
    }
}

/// Depth of neutral axis at which the concrete block of a rectangular
/// section balances `mu_nmm`, capped at d.
fn neutral_axis_for_moment(section: &Section, fck: f64, mu_nmm: f64) -> f64 {
    let d = section.effective_depth_mm;
    let b = section.width_mm;
    // 0.1512·fck·b·xu² − 0.36·fck·b·d·xu + Mu = 0
    let a = 0.36 * 0.42 * fck * b;
    let bq = 0.36 * fck * b * d;
    let disc = bq * bq - 4.0 * a * mu_nmm;
    if disc < 0.0 {
        return d;
    }
    ((bq - disc.sqrt()) / (2.0 * a)).min(d)
}

/// Singly reinforced design of a rectangular section.
///
/// Applies the minimum and maximum steel limits and classifies the section
/// from the neutral-axis depth of the steel it returns. When Mu > Mu,lim
/// the result is unsafe with status
/// [`FlexureStatus::ExceedsLimitingMoment`]; the reported Ast is the
/// limiting-moment steel, not a value that ignores the excess.
pub fn design_singly_reinforced(
    section: &Section,
    materials: &Materials,
    mu_knm: f64,
    tables: &CodeTables,
) -> CalcResult<FlexureResult> {
    validate_inputs(section, materials, mu_knm)?;
    let rect = rectangular(section);
    let limit = limiting_state(&rect, materials, tables);
    Ok(singly_from_limit(&rect, materials, mu_knm, limit))
}

fn singly_from_limit(section: &Section, materials: &Materials, mu_knm: f64, limit: LimitingState) -> FlexureResult {
    let (ast_min, ast_max) = steel_limits(section, materials);
    let mu_lim_knm = KnM::from(NMm(limit.mu_lim_nmm)).value();
    let fck = materials.fck_mpa;
    let bd = section.web_area_bd_mm2();

    let (ast, xu, minimum_governs, mut status, reason) =
        match tension_demand(section, materials, mu_knm, &limit) {
            TensionSteelDemand::Required { ast_mm2, minimum_governs, .. } => {
                let xu = materials.fyd_mpa() * ast_mm2 / (0.36 * fck * section.width_mm);
                let (status, reason) = if minimum_governs {
                    (
                        FlexureStatus::MinimumSteelGoverns,
                        format!(
                            "Mu = {:.1} kN·m ≤ Mu,lim = {:.1} kN·m; minimum steel governs, Ast,min = {:.0} mm² ({})",
                            mu_knm, mu_lim_knm, ast_min, clause::MIN_TENSION_STEEL
                        ),
                    )
                } else {
                    (
                        FlexureStatus::SinglyReinforced,
                        format!(
                            "Mu = {:.1} kN·m ≤ Mu,lim = {:.1} kN·m; singly reinforced, Ast = {:.0} mm² ({})",
                            mu_knm, mu_lim_knm, ast_mm2, clause::FLEXURE
                        ),
                    )
                };
                (ast_mm2, xu, minimum_governs, status, reason)
            }
            TensionSteelDemand::ExceedsLimit { ast_limit_mm2, .. } => {
                let mu_nmm = NMm::from(KnM(mu_knm)).value();
                let xu = neutral_axis_for_moment(section, fck, mu_nmm);
                warn!(mu_knm, mu_lim_knm, "moment exceeds limiting moment of singly reinforced section");
                (
                    ast_limit_mm2.max(ast_min),
                    xu,
                    false,
                    FlexureStatus::ExceedsLimitingMoment,
                    format!(
                        "Mu = {:.1} kN·m > Mu,lim = {:.1} kN·m; compression steel or a larger section is required ({})",
                        mu_knm, mu_lim_knm, clause::FLEXURE
                    ),
                )
            }
        };

    let mut reason = reason;
    if status.is_safe() && ast > ast_max {
        warn!(ast, ast_max, "tension steel exceeds maximum");
        status = FlexureStatus::ExceedsMaximumSteel;
        reason = format!(
            "Ast = {:.0} mm² exceeds the maximum 0.04·b·D = {:.0} mm² ({})",
            ast, ast_max, clause::MAX_STEEL
        );
    }
    debug!(mu_knm, mu_lim_knm, ast, xu, status = %status, "singly reinforced design");

    FlexureResult {
        mu_knm,
        mu_lim_knm,
        ast_required_mm2: ast,
        asc_required_mm2: 0.0,
        ast_min_mm2: ast_min,
        ast_max_mm2: ast_max,
        steel_percentage: 100.0 * ast / bd,
        compression_steel_stress_mpa: None,
        xu_mm: xu,
        xu_max_mm: limit.xu_max_mm,
        xu_max_ratio: limit.xu_max_ratio,
        classification: SectionClassification::classify(xu, limit.xu_max_mm),
        status,
        minimum_steel_governs: minimum_governs,
        is_safe: status.is_safe(),
        reason,
        warnings: limit.warnings,
    }
}

/// Doubly reinforced design of a rectangular section.
///
/// When Mu ≤ Mu,lim no compression steel is needed and the singly
/// reinforced result is returned. Otherwise the excess moment
/// Mu2 = Mu − Mu,lim is carried by compression steel at depth `d_prime_mm`:
///
/// ```text
/// εsc = 0.0035·(1 − d'/xu,max)      fsc from the design stress-strain curve
/// Asc = Mu2 / ((fsc − 0.446·fck)·(d − d'))
/// Ast = Ast,lim + Asc·(fsc − 0.446·fck)/(0.87·fy)
/// ```
pub fn design_doubly_reinforced(
    section: &Section,
    materials: &Materials,
    mu_knm: f64,
    d_prime_mm: f64,
    tables: &CodeTables,
) -> CalcResult<FlexureResult> {
    validate_inputs(section, materials, mu_knm)?;
    validate_compression_depth(section, d_prime_mm)?;
    let rect = rectangular(section);
    let limit = limiting_state(&rect, materials, tables);
    if NMm::from(KnM(mu_knm)).value() <= limit.mu_lim_nmm {
        return Ok(singly_from_limit(&rect, materials, mu_knm, limit));
    }
    Ok(design_at_limit_with_compression_steel(&rect, materials, mu_knm, d_prime_mm, limit))
}

pub(crate) fn validate_compression_depth(section: &Section, d_prime_mm: f64) -> CalcResult<()> {
    require_positive("d_prime_mm", d_prime_mm)?;
    if d_prime_mm >= section.effective_depth_mm {
        return Err(CalcError::invalid_input(
            "d_prime_mm",
            d_prime_mm.to_string(),
            format!("Must be less than the effective depth ({} mm)", section.effective_depth_mm),
        ));
    }
    Ok(())
}

/// Moment of resistance of a section with the given reinforcement.
///
/// The neutral axis is found from force equilibrium by bisection, with the
/// tension and compression steel stresses read off the design curve at
/// their strains. Over-reinforced sections (xu > xu,max) are credited only
/// with the moment at xu,max. Flanges on `section` are included.
pub fn moment_of_resistance(
    section: &Section,
    materials: &Materials,
    steel: &ProvidedSteel,
    tables: &CodeTables,
) -> CalcResult<MomentOfResistance> {
    section.validate()?;
    materials.validate()?;
    steel.validate(section)?;

    let limit = limiting_state(section, materials, tables);
    let d = section.effective_depth_mm;
    let fck = materials.fck_mpa;
    let fy = materials.fy_mpa;

    let compression_steel_force = |xu: f64| -> f64 {
        if steel.asc_mm2 <= 0.0 {
            return 0.0;
        }
        let strain = CONCRETE_ULTIMATE_STRAIN * (xu - steel.compression_depth_mm) / xu;
        let fsc = design_steel_stress(fy, strain).stress_mpa;
        steel.asc_mm2 * (fsc - 0.446 * fck).max(0.0)
    };
    let tension_stress = |xu: f64| -> f64 {
        design_steel_stress(fy, CONCRETE_ULTIMATE_STRAIN * (d - xu) / xu).stress_mpa
    };
    let residual = |xu: f64| -> f64 {
        concrete_block(section, fck, xu).0 + compression_steel_force(xu) - steel.ast_mm2 * tension_stress(xu)
    };

    let (xu, iterations) = bisect(residual, DEPTH_TOLERANCE_MM * d, d, DEPTH_TOLERANCE_MM, MAX_DEPTH_ITERATIONS);
    let xu_eff = xu.min(limit.xu_max_mm);
    let lever = d - steel.compression_depth_mm;
    let mu_r = concrete_block(section, fck, xu_eff).1 + compression_steel_force(xu_eff) * lever;
    debug!(xu, iterations, mu_r_nmm = mu_r, "moment of resistance");

    Ok(MomentOfResistance {
        mu_r_knm: KnM::from(NMm(mu_r)).value(),
        xu_mm: xu,
        xu_max_mm: limit.xu_max_mm,
        classification: SectionClassification::classify(xu, limit.xu_max_mm),
        tension_steel_stress_mpa: tension_stress(xu),
        warnings: limit.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam() -> Section {
        Section::rectangular(230.0, 450.0, 500.0, 25.0)
    }

    fn tables() -> &'static CodeTables {
        CodeTables::standard()
    }

    #[test]
    fn test_limiting_moment_m25_fe500() {
        let lim = limiting_moment(&beam(), &Materials::new(25.0, 500.0), tables()).unwrap();
        assert!((lim.xu_max_ratio - 0.46).abs() < 1e-12);
        assert!((lim.xu_max_mm - 207.0).abs() < 1e-9);
        // 0.36·25·230·207·(450 − 86.94)
        assert!((lim.mu_lim_knm - 155.57).abs() < 0.05);
        assert!(lim.warnings.is_empty());
    }

    #[test]
    fn test_singly_reinforced_m25_fe500() {
        let result = design_singly_reinforced(&beam(), &Materials::new(25.0, 500.0), 150.0, tables()).unwrap();
        assert_eq!(result.status, FlexureStatus::SinglyReinforced);
        assert!((result.ast_required_mm2 - 935.9).abs() < 9.4);
        assert!((result.steel_percentage - 0.904).abs() < 0.01);
        assert_eq!(result.classification, SectionClassification::UnderReinforced);
        assert!(result.xu_mm < result.xu_max_mm);
        assert!(result.passes());
        assert_eq!(result.asc_required_mm2, 0.0);
    }

    #[test]
    fn test_minimum_steel_governs() {
        let result = design_singly_reinforced(&beam(), &Materials::new(20.0, 415.0), 5.0, tables()).unwrap();
        assert!((result.ast_required_mm2 - 212.0).abs() < 2.1);
        assert!(result.minimum_steel_governs);
        assert_eq!(result.status, FlexureStatus::MinimumSteelGoverns);
        assert!(result.reason.contains("minimum steel governs"));
    }

    #[test]
    fn test_zero_moment_returns_minimum() {
        let demand = required_tension_steel(&beam(), &Materials::new(30.0, 500.0), 0.0, tables()).unwrap();
        match demand {
            TensionSteelDemand::Required { ast_mm2, ast_calc_mm2, minimum_governs } => {
                assert!(minimum_governs);
                assert_eq!(ast_calc_mm2, 0.0);
                assert!((ast_mm2 - 0.85 * 230.0 * 450.0 / 500.0).abs() < 1e-9);
            }
            other => panic!("unexpected demand {:?}", other),
        }
    }

    #[test]
    fn test_exceeds_limit_is_signalled() {
        let mats = Materials::new(25.0, 500.0);
        let demand = required_tension_steel(&beam(), &mats, 200.0, tables()).unwrap();
        assert!(matches!(demand, TensionSteelDemand::ExceedsLimit { .. }));

        let result = design_singly_reinforced(&beam(), &mats, 200.0, tables()).unwrap();
        assert!(!result.is_safe);
        assert_eq!(result.status, FlexureStatus::ExceedsLimitingMoment);
        assert_eq!(result.classification, SectionClassification::OverReinforced);
        assert!(result.reason.contains("Mu,lim"));
    }

    #[test]
    fn test_doubly_reinforced() {
        let mats = Materials::new(25.0, 500.0);
        let result = design_doubly_reinforced(&beam(), &mats, 200.0, 50.0, tables()).unwrap();
        assert_eq!(result.status, FlexureStatus::DoublyReinforced);
        assert!(result.passes());
        assert!(result.asc_required_mm2 > 0.0);
        let fsc = result.compression_steel_stress_mpa.unwrap();
        // εsc = 0.0035·(1 − 50/207) = 0.002655 → on the knee of the Fe500 curve
        assert!(fsc > 0.8 * 435.0 && fsc < 435.0);

        let singly = design_singly_reinforced(&beam(), &mats, 200.0, tables()).unwrap();
        assert!(result.ast_required_mm2 >= singly.ast_required_mm2);

        // Force balance: extra tension equals net compression-steel force
        let ast_lim = 0.36 * 25.0 * 230.0 * 207.0 / 435.0;
        let ast2 = result.ast_required_mm2 - ast_lim;
        let net = result.asc_required_mm2 * (fsc - 0.446 * 25.0);
        assert!((ast2 * 435.0 - net).abs() < 1e-6 * net);
    }

    #[test]
    fn test_doubly_below_limit_matches_singly() {
        let mats = Materials::new(25.0, 500.0);
        let doubly = design_doubly_reinforced(&beam(), &mats, 120.0, 50.0, tables()).unwrap();
        let singly = design_singly_reinforced(&beam(), &mats, 120.0, tables()).unwrap();
        assert_eq!(doubly, singly);
    }

    #[test]
    fn test_compression_steel_too_deep() {
        let mats = Materials::new(25.0, 500.0);
        let result = design_doubly_reinforced(&beam(), &mats, 200.0, 220.0, tables()).unwrap();
        assert_eq!(result.status, FlexureStatus::CompressionSteelIneffective);
        assert!(!result.is_safe);
    }

    #[test]
    fn test_doubly_exceeds_maximum_steel() {
        let mats = Materials::new(20.0, 415.0);
        let result = design_doubly_reinforced(&beam(), &mats, 900.0, 50.0, tables()).unwrap();
        assert_eq!(result.status, FlexureStatus::ExceedsMaximumSteel);
        assert!(!result.passes());
    }

    #[test]
    fn test_moment_of_resistance_under_reinforced() {
        let mats = Materials::new(25.0, 500.0);
        // Steel from the 150 kN·m design develops ≈150 kN·m
        let design = design_singly_reinforced(&beam(), &mats, 150.0, tables()).unwrap();
        let mr = moment_of_resistance(
            &beam(),
            &mats,
            &ProvidedSteel::tension_only(design.ast_required_mm2),
            tables(),
        )
        .unwrap();
        assert!((mr.mu_r_knm - 150.0).abs() < 0.5);
        assert!((mr.tension_steel_stress_mpa - 435.0).abs() < 1e-6);
    }

    #[test]
    fn test_moment_of_resistance_over_reinforced_is_capped() {
        let mats = Materials::new(25.0, 500.0);
        let mr = moment_of_resistance(&beam(), &mats, &ProvidedSteel::tension_only(3000.0), tables()).unwrap();
        assert_eq!(mr.classification, SectionClassification::OverReinforced);
        assert!(mr.mu_r_knm <= 155.57 + 0.05);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mats = Materials::new(25.0, 500.0);
        let bad = Section::rectangular(230.0, 500.0, 450.0, 25.0);
        assert!(design_singly_reinforced(&bad, &mats, 100.0, tables()).is_err());
        assert!(design_singly_reinforced(&beam(), &mats, -1.0, tables()).is_err());
        assert!(design_doubly_reinforced(&beam(), &mats, 200.0, 460.0, tables()).is_err());
    }

    #[test]
    fn test_non_standard_grade_warns() {
        let result = design_singly_reinforced(&beam(), &Materials::new(25.0, 450.0), 100.0, tables()).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.is_safe);
    }
}
