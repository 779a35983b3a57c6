//! # Deflection Checks
//!
//! Two levels of rigor, selectable independently:
//!
//! - [`span_depth_check`]: allowable L/d built from a basic ratio and
//!   modification factors (IS 456 cl. 23.2.1). Every factor and the branch
//!   that produced it is listed in `assumptions`.
//! - [`detailed_deflection`]: curvature integrated along the span with an
//!   effective moment of inertia, plus shrinkage and creep (IS 456 Annex C).
//!
//! ## Detailed Method
//!
//! ```text
//! Ec  = 5000·√fck           fcr = 0.7·√fck           m = Es/Ec
//! Mcr = fcr·Igr / yt
//! Ieff = Icr / (1.2 − (Mcr/M)·(z/d)·(1 − x/d)·(bw/b)),  Icr ≤ Ieff ≤ Igr
//! δ   = ∫ M(x)·m̄(x) / (Ec·Ieff(x)) dx                   (Simpson's rule)
//! δcs = k3·ψcs·L²,  ψcs = k4·εcs/D
//! δcc = δperm(Ece) − δperm(Ec),  Ece = Ec/(1 + θ)
//! ```
//!
//! M(x) is the distribution of a uniformly distributed load: parabolic
//! with its peak at midspan for simple and continuous spans (m̄ from a unit
//! load at midspan), and (1 − x/L)² from the support for cantilevers (m̄
//! from a unit load at the tip). Sections with M(x) ≤ Mcr use Igr.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bisect;
use crate::code_tables::clause;
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::materials::{Materials, ES_MPA};
use crate::section::Section;
use crate::settings::ServiceabilitySettings;
use crate::units::{KnM, NMm};

/// Spans beyond this (mm) reduce the basic L/d ratio by 10/L
const LONG_SPAN_MM: f64 = 10_000.0;

const KT_MAX: f64 = 2.0;
const KC_MAX: f64 = 1.5;

// ============================================================================
// Support Conditions
// ============================================================================

/// End restraint of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportCondition {
    Cantilever,
    SimplySupported,
    /// Continuous at one end
    OneEndContinuous,
    /// Continuous at both ends
    BothEndsContinuous,
}

impl SupportCondition {
    pub const ALL: [SupportCondition; 4] = [
        SupportCondition::Cantilever,
        SupportCondition::SimplySupported,
        SupportCondition::OneEndContinuous,
        SupportCondition::BothEndsContinuous,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SupportCondition::Cantilever => "Cantilever",
            SupportCondition::SimplySupported => "Simply supported",
            SupportCondition::OneEndContinuous => "One end continuous",
            SupportCondition::BothEndsContinuous => "Both ends continuous",
        }
    }

    /// Basic span/effective-depth ratio
    pub fn basic_span_depth_ratio(&self) -> f64 {
        match self {
            SupportCondition::Cantilever => 7.0,
            SupportCondition::SimplySupported => 20.0,
            SupportCondition::OneEndContinuous | SupportCondition::BothEndsContinuous => 26.0,
        }
    }

    /// Shrinkage deflection coefficient k3
    pub fn shrinkage_coefficient(&self) -> f64 {
        match self {
            SupportCondition::Cantilever => 0.5,
            SupportCondition::SimplySupported => 0.125,
            SupportCondition::OneEndContinuous => 0.086,
            SupportCondition::BothEndsContinuous => 0.063,
        }
    }
}

// ============================================================================
// Span/Depth Check
// ============================================================================

/// Inputs to the span/depth check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanDepthInput {
    /// Effective span (mm)
    pub span_mm: f64,
    pub support: SupportCondition,
    /// Tension steel required for strength (mm²)
    pub ast_required_mm2: f64,
    /// Tension steel provided (mm²)
    pub ast_provided_mm2: f64,
    /// Compression steel provided (mm²)
    #[serde(default)]
    pub asc_provided_mm2: f64,
}

/// Result of the span/depth check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanDepthResult {
    pub basic_ratio: f64,
    /// 10/L for spans over 10 m, otherwise 1
    pub span_factor: f64,
    /// Steel service stress fs = 0.58·fy·Ast,req/Ast,prov (MPa)
    pub steel_stress_mpa: f64,
    /// Tension reinforcement factor
    pub kt: f64,
    /// Compression reinforcement factor
    pub kc: f64,
    /// Flanged-section factor
    pub kf: f64,
    pub allowable_ratio: f64,
    /// L/d of the member
    pub actual_ratio: f64,
    /// Long cantilevers are outside the rule and need a calculated deflection
    pub requires_detailed_check: bool,
    pub passes: bool,
    /// Every factor and the branch it came from
    pub assumptions: Vec<String>,
}

impl SpanDepthResult {
    /// Actual / allowable L/d
    pub fn utilization(&self) -> f64 {
        self.actual_ratio / self.allowable_ratio
    }
}

/// Span/effective-depth check.
pub fn span_depth_check(section: &Section, materials: &Materials, input: &SpanDepthInput) -> CalcResult<SpanDepthResult> {
    section.validate()?;
    materials.validate()?;
    require_positive("span_mm", input.span_mm)?;
    require_positive("ast_required_mm2", input.ast_required_mm2)?;
    require_positive("ast_provided_mm2", input.ast_provided_mm2)?;
    require_non_negative("asc_provided_mm2", input.asc_provided_mm2)?;

    let mut assumptions = Vec::new();
    let basic = input.support.basic_span_depth_ratio();
    assumptions.push(format!(
        "basic L/d = {} for {} ({})",
        basic,
        input.support.display_name(),
        clause::SPAN_DEPTH
    ));

    let long_span = input.span_mm > LONG_SPAN_MM;
    let mut requires_detailed_check = false;
    let span_factor = match (long_span, input.support) {
        (true, SupportCondition::Cantilever) => {
            requires_detailed_check = true;
            assumptions.push("cantilever over 10 m: rule not applicable, calculated deflection required".to_string());
            1.0
        }
        (true, _) => {
            let f = LONG_SPAN_MM / input.span_mm;
            assumptions.push(format!("span over 10 m: basic ratio × 10/L = {:.3}", f));
            f
        }
        (false, _) => 1.0,
    };

    let bd = section.web_area_bd_mm2();
    let pt = 100.0 * input.ast_provided_mm2 / bd;
    let fs = 0.58 * materials.fy_mpa * input.ast_required_mm2 / input.ast_provided_mm2;
    let denom = 0.225 + 0.00322 * fs - 0.625 * (1.0 / pt).log10();
    let kt = if denom > 0.0 { (1.0 / denom).min(KT_MAX) } else { KT_MAX };
    assumptions.push(format!("kt = {:.3} at fs = {:.0} MPa, pt = {:.2}% (capped at {})", kt, fs, pt, KT_MAX));

    let pc = 100.0 * input.asc_provided_mm2 / bd;
    let kc = (1.6 * pc / (pc + 0.275)).clamp(1.0, KC_MAX);
    if pc > 0.0 {
        assumptions.push(format!("kc = {:.3} at pc = {:.2}% (between 1.0 and {})", kc, pc, KC_MAX));
    } else {
        assumptions.push("kc = 1.0, no compression steel".to_string());
    }

    let kf = match section.flange {
        Some(f) => {
            let ratio = section.width_mm / f.width_mm;
            let kf = if ratio <= 0.3 { 0.8 } else { 0.8 + 0.2 * (ratio - 0.3) / 0.7 };
            assumptions.push(format!("kf = {:.3} for bw/bf = {:.2}", kf, ratio));
            kf
        }
        None => {
            assumptions.push("kf = 1.0, rectangular section".to_string());
            1.0
        }
    };

    let allowable = basic * span_factor * kt * kc * kf;
    let actual = input.span_mm / section.effective_depth_mm;
    let passes = !requires_detailed_check && actual <= allowable;
    debug!(actual, allowable, kt, kc, kf, "span/depth check");

    Ok(SpanDepthResult {
        basic_ratio: basic,
        span_factor,
        steel_stress_mpa: fs,
        kt,
        kc,
        kf,
        allowable_ratio: allowable,
        actual_ratio: actual,
        requires_detailed_check,
        passes,
        assumptions,
    })
}

// ============================================================================
// Cracked Section
// ============================================================================

/// Transformed cracked section (concrete in tension ignored).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrackedSection {
    /// Neutral-axis depth x (mm)
    pub neutral_axis_mm: f64,
    /// Icr (mm⁴)
    pub inertia_mm4: f64,
}

/// Neutral axis and Icr for modular ratio `m`, from
/// b·x²/2 + (m − 1)·Asc·(x − d') = m·Ast·(d − x), with the flange overhang
/// included when x passes below it.
pub fn cracked_section(
    section: &Section,
    modular_ratio: f64,
    ast_mm2: f64,
    asc_mm2: f64,
    d_prime_mm: f64,
) -> CrackedSection {
    let d = section.effective_depth_mm;
    let m = modular_ratio;
    let b = section.compression_width_mm();
    let overhang = |x: f64| match section.flange {
        Some(f) if x > f.thickness_mm => ((b - section.width_mm), x - f.thickness_mm),
        _ => (0.0, 0.0),
    };
    let balance = |x: f64| {
        let (wo, h) = overhang(x);
        b * x * x / 2.0 - wo * h * h / 2.0 + (m - 1.0) * asc_mm2 * (x - d_prime_mm) - m * ast_mm2 * (d - x)
    };
    let (x, _) = bisect(balance, 0.0, d, 1e-6, 100);
    let (wo, h) = overhang(x);
    let inertia = b * x.powi(3) / 3.0 - wo * h.powi(3) / 3.0
        + m * ast_mm2 * (d - x).powi(2)
        + (m - 1.0) * asc_mm2 * (x - d_prime_mm).powi(2);
    CrackedSection { neutral_axis_mm: x, inertia_mm4: inertia }
}

// ============================================================================
// Detailed Deflection
// ============================================================================

/// Inputs to the detailed deflection calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "span_mm": 6000.0,
///   "support": "SimplySupported",
///   "service_moment_knm": 80.0,
///   "permanent_moment_knm": 50.0,
///   "ast_provided_mm2": 942.0,
///   "asc_provided_mm2": 226.0,
///   "compression_depth_mm": 45.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeflectionInput {
    pub span_mm: f64,
    pub support: SupportCondition,
    /// Peak service moment, all loads (kN·m)
    pub service_moment_knm: f64,
    /// Peak service moment from permanent loads (kN·m)
    pub permanent_moment_knm: f64,
    pub ast_provided_mm2: f64,
    #[serde(default)]
    pub asc_provided_mm2: f64,
    /// d' (mm), required when compression steel is present
    #[serde(default)]
    pub compression_depth_mm: f64,
    /// Overrides the settings creep coefficient
    #[serde(default)]
    pub creep_coefficient: Option<f64>,
    /// Overrides the settings shrinkage strain
    #[serde(default)]
    pub shrinkage_strain: Option<f64>,
}

impl DeflectionInput {
    pub fn validate(&self, section: &Section) -> CalcResult<()> {
        require_positive("span_mm", self.span_mm)?;
        require_non_negative("service_moment_knm", self.service_moment_knm)?;
        require_non_negative("permanent_moment_knm", self.permanent_moment_knm)?;
        if self.permanent_moment_knm > self.service_moment_knm {
            return Err(CalcError::invalid_input(
                "permanent_moment_knm",
                self.permanent_moment_knm.to_string(),
                "Permanent moment cannot exceed the total service moment",
            ));
        }
        require_positive("ast_provided_mm2", self.ast_provided_mm2)?;
        require_non_negative("asc_provided_mm2", self.asc_provided_mm2)?;
        if self.asc_provided_mm2 > 0.0 {
            require_positive("compression_depth_mm", self.compression_depth_mm)?;
            if self.compression_depth_mm >= section.effective_depth_mm {
                return Err(CalcError::invalid_input(
                    "compression_depth_mm",
                    self.compression_depth_mm.to_string(),
                    "Compression steel must lie above the tension steel",
                ));
            }
        }
        if let Some(theta) = self.creep_coefficient {
            require_non_negative("creep_coefficient", theta)?;
        }
        if let Some(eps) = self.shrinkage_strain {
            require_non_negative("shrinkage_strain", eps)?;
        }
        Ok(())
    }
}

/// Result of the detailed deflection calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionResult {
    /// Short-term deflection under the full service moment (mm)
    pub short_term_mm: f64,
    pub shrinkage_mm: f64,
    pub creep_mm: f64,
    pub total_mm: f64,
    /// span / limit ratio (mm)
    pub allowable_mm: f64,
    pub cracking_moment_knm: f64,
    pub gross_inertia_mm4: f64,
    pub cracked_inertia_mm4: f64,
    /// Ieff at the peak service moment (mm⁴)
    pub effective_inertia_mm4: f64,
    /// Cracked neutral-axis depth (mm)
    pub neutral_axis_mm: f64,
    pub k3: f64,
    pub k4: f64,
    pub passes: bool,
    pub assumptions: Vec<String>,
}

impl DeflectionResult {
    /// Total / allowable
    pub fn utilization(&self) -> f64 {
        self.total_mm / self.allowable_mm
    }
}

/// Section stiffness data for one concrete modulus.
struct Stiffness {
    ec: f64,
    igr: f64,
    mcr_nmm: f64,
    cracked: CrackedSection,
    web_ratio: f64,
    d: f64,
}

impl Stiffness {
    fn new(section: &Section, materials: &Materials, ec: f64, input: &DeflectionInput) -> Self {
        let igr = section.gross_moment_of_inertia_mm4();
        let mcr = materials.fcr_mpa() * igr / section.centroid_to_tension_face_mm();
        let cracked = cracked_section(
            section,
            ES_MPA / ec,
            input.ast_provided_mm2,
            input.asc_provided_mm2,
            input.compression_depth_mm,
        );
        Stiffness {
            ec,
            igr,
            mcr_nmm: mcr,
            cracked,
            web_ratio: section.width_mm / section.compression_width_mm(),
            d: section.effective_depth_mm,
        }
    }

    /// Ieff at a section carrying `moment_nmm`
    fn effective_inertia(&self, moment_nmm: f64) -> f64 {
        if moment_nmm <= self.mcr_nmm {
            return self.igr;
        }
        let x = self.cracked.neutral_axis_mm;
        let icr = self.cracked.inertia_mm4;
        let z = self.d - x / 3.0;
        let denom = 1.2 - (self.mcr_nmm / moment_nmm) * (z / self.d) * (1.0 - x / self.d) * self.web_ratio;
        if denom <= 0.0 {
            return self.igr;
        }
        (icr / denom).clamp(icr.min(self.igr), self.igr)
    }
}

/// Deflection (mm) from integrating curvature for a peak moment.
fn integrate_deflection(stiffness: &Stiffness, support: SupportCondition, span: f64, peak_nmm: f64, segments: usize) -> f64 {
    if peak_nmm <= 0.0 {
        return 0.0;
    }
    let h = span / segments as f64;
    let integrand = |x: f64| {
        let (moment, unit) = match support {
            SupportCondition::Cantilever => {
                let r = 1.0 - x / span;
                (peak_nmm * r * r, span - x)
            }
            _ => {
                let moment = 4.0 * peak_nmm * x * (span - x) / (span * span);
                let unit = if x <= span / 2.0 { x / 2.0 } else { (span - x) / 2.0 };
                (moment, unit)
            }
        };
        moment * unit / (stiffness.ec * stiffness.effective_inertia(moment))
    };

    let mut sum = integrand(0.0) + integrand(span);
    for i in 1..segments {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * integrand(i as f64 * h);
    }
    sum * h / 3.0
}

/// Shrinkage coefficient k4 from pt − pc (percent).
fn shrinkage_k4(pt: f64, pc: f64) -> f64 {
    let diff = (pt - pc).max(0.0);
    if pt <= 0.0 || diff <= 0.0 {
        return 0.0;
    }
    let k4 = if diff < 1.0 { 0.72 * diff / pt.sqrt() } else { 0.65 * diff / pt.sqrt() };
    k4.min(1.0)
}

/// Short-term, shrinkage and creep deflection of a span.
pub fn detailed_deflection(
    section: &Section,
    materials: &Materials,
    input: &DeflectionInput,
    settings: &ServiceabilitySettings,
) -> CalcResult<DeflectionResult> {
    section.validate()?;
    materials.validate()?;
    settings.validate()?;
    input.validate(section)?;

    let mut assumptions = vec![format!(
        "{} load distribution, {}",
        input.support.display_name(),
        clause::DEFLECTION
    )];
    let ec = materials.ec_mpa();
    let short = Stiffness::new(section, materials, ec, input);
    let segments = settings.integration_segments;
    let span = input.span_mm;
    let m_total = NMm::from(KnM(input.service_moment_knm)).value();
    let m_perm = NMm::from(KnM(input.permanent_moment_knm)).value();

    let short_term = integrate_deflection(&short, input.support, span, m_total, segments);
    let ieff = short.effective_inertia(m_total);
    if m_total > short.mcr_nmm {
        assumptions.push(format!("cracked: M = {:.1} kN·m > Mcr = {:.1} kN·m", input.service_moment_knm, short.mcr_nmm / 1.0e6));
    } else {
        assumptions.push("uncracked: Igr used throughout".to_string());
    }

    // Shrinkage
    let bd = section.web_area_bd_mm2();
    let pt = 100.0 * input.ast_provided_mm2 / bd;
    let pc = 100.0 * input.asc_provided_mm2 / bd;
    let k3 = input.support.shrinkage_coefficient();
    let k4 = shrinkage_k4(pt, pc);
    let eps_cs = input.shrinkage_strain.unwrap_or(settings.shrinkage_strain);
    let psi = k4 * eps_cs / section.overall_depth_mm;
    let shrinkage = k3 * psi * span * span;
    assumptions.push(format!("shrinkage: k3 = {}, k4 = {:.3}, εcs = {}", k3, k4, eps_cs));

    // Creep
    let theta = input.creep_coefficient.unwrap_or(settings.creep_coefficient);
    let ece = ec / (1.0 + theta);
    let long = Stiffness::new(section, materials, ece, input);
    let creep = (integrate_deflection(&long, input.support, span, m_perm, segments)
        - integrate_deflection(&short, input.support, span, m_perm, segments))
    .max(0.0);
    assumptions.push(format!("creep: θ = {}, Ece = {:.0} MPa", theta, ece));

    let total = short_term + shrinkage + creep;
    let allowable = span / settings.deflection_limit_ratio;
    debug!(short_term, shrinkage, creep, total, allowable, "detailed deflection");

    Ok(DeflectionResult {
        short_term_mm: short_term,
        shrinkage_mm: shrinkage,
        creep_mm: creep,
        total_mm: total,
        allowable_mm: allowable,
        cracking_moment_knm: KnM::from(NMm(short.mcr_nmm)).value(),
        gross_inertia_mm4: short.igr,
        cracked_inertia_mm4: short.cracked.inertia_mm4,
        effective_inertia_mm4: ieff,
        neutral_axis_mm: short.cracked.neutral_axis_mm,
        k3,
        k4,
        passes: total <= allowable,
        assumptions,
    })
}
