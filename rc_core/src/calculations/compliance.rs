//! # Compliance Orchestrator
//!
//! Runs one beam through every load case and reduces the per-case results
//! to a single verdict.
//!
//! ## Pipeline (per load case)
//!
//! ```text
//! Flexure ──► Shear ──► Serviceability ──► Verdict
//!                  └────────(not requested)───┘
//! ```
//!
//! Each stage contributes one or more sub-check utilizations:
//!
//! | Sub-check | Utilization |
//! |-----------|-------------|
//! | Flexure | Mu / Mu,R of the provided steel |
//! | Shear | max(τv/τc,max, s_provided/s_required) |
//! | Deflection | actual / allowable |
//! | Crack width | w / w_lim |
//!
//! The governing sub-check of a case is the one with the highest
//! utilization (earlier pipeline stage on ties). The governing case of a
//! beam is the case with the highest utilization (first listed on ties).
//! A beam passes only when every case passes every requested sub-check;
//! the failure text names every failing sub-check of every case.
//!
//! Beams are independent, so [`check_batch`] maps them across threads with
//! rayon and [`summarize`] aggregates afterwards.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::flanged::{design_flanged_section, NeutralAxisLocation};
use super::flexure::{
    design_doubly_reinforced, design_singly_reinforced, moment_of_resistance, FlexureResult, MomentOfResistance,
    ProvidedSteel,
};
use super::serviceability::{check_serviceability, ServiceabilityInput, ServiceabilityResult};
use super::shear::{design_shear, ShearResult, StirrupGeometry};
use super::DesignAction;
use crate::code_tables::CodeTables;
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::materials::Materials;
use crate::section::Section;
use crate::settings::DesignSettings;

// ============================================================================
// Inputs
// ============================================================================

/// One factored load case at the critical location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    /// Case identifier, e.g. "1.5(DL+LL)"
    pub name: String,
    pub action: DesignAction,
    /// Serviceability checks for this case, if any
    #[serde(default)]
    pub serviceability: Option<ServiceabilityInput>,
}

impl LoadCase {
    pub fn new(name: impl Into<String>, moment_knm: f64, shear_kn: f64) -> Self {
        LoadCase {
            name: name.into(),
            action: DesignAction::new(moment_knm, shear_kn),
            serviceability: None,
        }
    }

    pub fn with_serviceability(mut self, input: ServiceabilityInput) -> Self {
        self.serviceability = Some(input);
        self
    }
}

/// A beam with its provided reinforcement and load cases.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "B1",
///   "section": { "width_mm": 230.0, "effective_depth_mm": 450.0,
///                "overall_depth_mm": 500.0, "clear_cover_mm": 25.0 },
///   "materials": { "fck_mpa": 25.0, "fy_mpa": 500.0 },
///   "provided": { "ast_mm2": 982.0 },
///   "stirrups": { "legs": 2, "diameter_mm": 8.0, "fy_mpa": 415.0 },
///   "stirrup_spacing_mm": 200.0,
///   "cases": [ { "name": "ULS", "action": { "moment_knm": 150.0, "shear_kn": 100.0 } } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamDefinition {
    pub id: String,
    pub section: Section,
    pub materials: Materials,
    pub provided: ProvidedSteel,
    pub stirrups: StirrupGeometry,
    /// Provided stirrup spacing (mm)
    pub stirrup_spacing_mm: f64,
    pub cases: Vec<LoadCase>,
}

impl BeamDefinition {
    pub fn validate(&self) -> CalcResult<()> {
        self.section.validate()?;
        self.materials.validate()?;
        self.provided.validate(&self.section)?;
        self.stirrups.validate()?;
        require_positive("stirrup_spacing_mm", self.stirrup_spacing_mm)?;
        if self.cases.is_empty() {
            return Err(CalcError::missing_field("cases"));
        }
        for case in &self.cases {
            case.action.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// Stages and Sub-checks
// ============================================================================

/// Stage of the per-case pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStage {
    Flexure,
    Shear,
    Serviceability,
    Verdict,
}

impl CaseStage {
    /// Next stage; serviceability is skipped when not requested.
    pub fn next(self, serviceability_requested: bool) -> Option<CaseStage> {
        match self {
            CaseStage::Flexure => Some(CaseStage::Shear),
            CaseStage::Shear if serviceability_requested => Some(CaseStage::Serviceability),
            CaseStage::Shear | CaseStage::Serviceability => Some(CaseStage::Verdict),
            CaseStage::Verdict => None,
        }
    }
}

/// Individual limit-state check, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubCheck {
    Flexure,
    Shear,
    Deflection,
    CrackWidth,
}

impl SubCheck {
    pub fn display_name(&self) -> &'static str {
        match self {
            SubCheck::Flexure => "flexure",
            SubCheck::Shear => "shear",
            SubCheck::Deflection => "deflection",
            SubCheck::CrackWidth => "crack width",
        }
    }
}

impl std::fmt::Display for SubCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Utilization and verdict of one sub-check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCheckResult {
    pub check: SubCheck,
    pub utilization: f64,
    pub passes: bool,
    pub detail: String,
}

// ============================================================================
// Results
// ============================================================================

/// Everything computed for one load case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCaseResult {
    pub case_name: String,
    /// Position in the input list
    pub case_index: usize,
    pub flexure: FlexureResult,
    /// Neutral-axis case, for flanged sections
    pub neutral_axis_location: Option<NeutralAxisLocation>,
    pub capacity: MomentOfResistance,
    pub shear: ShearResult,
    pub serviceability: Option<ServiceabilityResult>,
    /// Sub-checks in pipeline order
    pub checks: Vec<SubCheckResult>,
    pub governing_check: SubCheck,
    pub max_utilization: f64,
    pub passes: bool,
    /// Every failing sub-check, comma separated
    pub failure_reason: Option<String>,
}

impl ComplianceCaseResult {
    /// Names of failing sub-checks in pipeline order
    pub fn failing_checks(&self) -> Vec<SubCheck> {
        self.checks.iter().filter(|c| !c.passes).map(|c| c.check).collect()
    }
}

/// Verdict for one beam across all its load cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamComplianceReport {
    pub beam_id: String,
    pub cases: Vec<ComplianceCaseResult>,
    pub governing_case_index: usize,
    pub governing_case_name: String,
    pub governing_check: SubCheck,
    pub governing_utilization: f64,
    pub passes: bool,
    /// Failing sub-checks of every failing case
    pub failure_summary: Option<String>,
}

impl BeamComplianceReport {
    pub fn governing_case(&self) -> &ComplianceCaseResult {
        &self.cases[self.governing_case_index]
    }
}

// ============================================================================
// Per-case Pipeline
// ============================================================================

#[derive(Default)]
struct CaseState {
    flexure: Option<(FlexureResult, Option<NeutralAxisLocation>)>,
    capacity: Option<MomentOfResistance>,
    shear: Option<ShearResult>,
    serviceability: Option<ServiceabilityResult>,
    checks: Vec<SubCheckResult>,
}

fn design_flexure(
    beam: &BeamDefinition,
    moment_knm: f64,
    tables: &CodeTables,
) -> CalcResult<(FlexureResult, Option<NeutralAxisLocation>)> {
    let d_prime = (beam.provided.asc_mm2 > 0.0).then_some(beam.provided.compression_depth_mm);
    if beam.section.is_flanged() {
        let result = design_flanged_section(&beam.section, &beam.materials, moment_knm, d_prime, tables)?;
        return Ok((result.flexure, Some(result.neutral_axis_location)));
    }
    let result = match d_prime {
        Some(dp) => design_doubly_reinforced(&beam.section, &beam.materials, moment_knm, dp, tables)?,
        None => design_singly_reinforced(&beam.section, &beam.materials, moment_knm, tables)?,
    };
    Ok((result, None))
}

/// Ratio with 0/0 read as zero utilization
fn ratio(demand: f64, capacity: f64) -> f64 {
    if demand <= 0.0 {
        0.0
    } else if capacity <= 0.0 {
        f64::INFINITY
    } else {
        demand / capacity
    }
}

fn flexure_check(flexure: &FlexureResult, capacity: &MomentOfResistance) -> SubCheckResult {
    let utilization = ratio(flexure.mu_knm, capacity.mu_r_knm);
    let passes = flexure.is_safe && utilization <= 1.0;
    SubCheckResult {
        check: SubCheck::Flexure,
        utilization,
        passes,
        detail: format!(
            "Mu = {:.1} kN·m, Mu,R = {:.1} kN·m; {}",
            flexure.mu_knm, capacity.mu_r_knm, flexure.reason
        ),
    }
}

fn shear_check(shear: &ShearResult, provided_spacing_mm: f64) -> SubCheckResult {
    let stress = shear.stress_ratio();
    let (utilization, passes, detail) = match shear.spacing_mm {
        Some(required) => {
            let spacing = provided_spacing_mm / required;
            (
                stress.max(spacing),
                shear.is_safe && spacing <= 1.0,
                format!("sv = {:.0} mm provided, {:.0} mm allowed; {}", provided_spacing_mm, required, shear.remarks),
            )
        }
        None => (stress, false, shear.remarks.clone()),
    };
    SubCheckResult { check: SubCheck::Shear, utilization, passes, detail }
}

fn serviceability_checks(result: &ServiceabilityResult) -> Vec<SubCheckResult> {
    let mut checks = Vec::new();
    if let (Some(passes), Some(utilization)) = (result.deflection_passes, result.deflection_utilization) {
        let detail = match (&result.deflection, &result.span_depth) {
            (Some(d), _) => format!("δ = {:.1} mm, allowed {:.1} mm", d.total_mm, d.allowable_mm),
            (None, Some(s)) => format!("L/d = {:.1}, allowed {:.1}", s.actual_ratio, s.allowable_ratio),
            (None, None) => String::new(),
        };
        checks.push(SubCheckResult { check: SubCheck::Deflection, utilization, passes, detail });
    }
    if let Some(cw) = &result.crack_width {
        checks.push(SubCheckResult {
            check: SubCheck::CrackWidth,
            utilization: cw.utilization(),
            passes: cw.passes,
            detail: cw.remarks.clone(),
        });
    }
    checks
}

/// Highest utilization; the earliest sub-check wins a tie.
fn governing_sub_check(checks: &[SubCheckResult]) -> Option<&SubCheckResult> {
    checks.iter().fold(None::<&SubCheckResult>, |best, c| match best {
        Some(b) if c.utilization <= b.utilization => Some(b),
        _ => Some(c),
    })
}

/// Index of the highest case utilization; the first case wins a tie.
fn governing_case_index(cases: &[ComplianceCaseResult]) -> usize {
    let mut governing = 0;
    for (i, case) in cases.iter().enumerate().skip(1) {
        if case.max_utilization > cases[governing].max_utilization {
            governing = i;
        }
    }
    governing
}

/// Run one load case through the pipeline.
pub fn check_case(
    beam: &BeamDefinition,
    case_index: usize,
    tables: &CodeTables,
    settings: &DesignSettings,
) -> CalcResult<ComplianceCaseResult> {
    let case = beam.cases.get(case_index).ok_or_else(|| {
        CalcError::invalid_input("case_index", case_index.to_string(), "No such load case")
    })?;
    let wants_serviceability = case.serviceability.as_ref().is_some_and(|s| !s.is_empty());
    let mut state = CaseState::default();
    let mut stage = Some(CaseStage::Flexure);

    while let Some(current) = stage {
        debug!(case = %case.name, stage = ?current, "case stage");
        match current {
            CaseStage::Flexure => {
                let (flexure, location) = design_flexure(beam, case.action.moment_knm, tables)?;
                let capacity = moment_of_resistance(&beam.section, &beam.materials, &beam.provided, tables)?;
                state.checks.push(flexure_check(&flexure, &capacity));
                state.flexure = Some((flexure, location));
                state.capacity = Some(capacity);
            }
            CaseStage::Shear => {
                let pt = 100.0 * beam.provided.ast_mm2 / beam.section.web_area_bd_mm2();
                let shear = design_shear(&case.action, &beam.section, &beam.materials, &beam.stirrups, pt, tables)?;
                state.checks.push(shear_check(&shear, beam.stirrup_spacing_mm));
                state.shear = Some(shear);
            }
            CaseStage::Serviceability => {
                if let Some(input) = &case.serviceability {
                    let result = check_serviceability(&beam.section, &beam.materials, input, &settings.serviceability)?;
                    state.checks.extend(serviceability_checks(&result));
                    state.serviceability = Some(result);
                }
            }
            CaseStage::Verdict => break,
        }
        stage = current.next(wants_serviceability);
    }

    let (flexure, location) = state
        .flexure
        .ok_or_else(|| CalcError::Internal { message: "flexure stage did not run".to_string() })?;
    let capacity = state
        .capacity
        .ok_or_else(|| CalcError::Internal { message: "flexure stage did not run".to_string() })?;
    let shear = state
        .shear
        .ok_or_else(|| CalcError::Internal { message: "shear stage did not run".to_string() })?;

    let governing = governing_sub_check(&state.checks)
        .ok_or_else(|| CalcError::Internal { message: "no sub-checks ran".to_string() })?;
    let governing_check = governing.check;
    let max_utilization = governing.utilization;

    let failing: Vec<&str> = state.checks.iter().filter(|c| !c.passes).map(|c| c.check.display_name()).collect();
    let passes = failing.is_empty();
    let failure_reason = (!passes).then(|| failing.join(", "));
    if let Some(reason) = &failure_reason {
        warn!(beam = %beam.id, case = %case.name, failing = %reason, "load case fails");
    }

    Ok(ComplianceCaseResult {
        case_name: case.name.clone(),
        case_index,
        flexure,
        neutral_axis_location: location,
        capacity,
        shear,
        serviceability: state.serviceability,
        checks: state.checks,
        governing_check,
        max_utilization,
        passes,
        failure_reason,
    })
}

/// Check one beam against all of its load cases.
#[instrument(skip_all, fields(beam = %beam.id, cases = beam.cases.len()))]
pub fn check_beam(beam: &BeamDefinition, tables: &CodeTables, settings: &DesignSettings) -> CalcResult<BeamComplianceReport> {
    beam.validate()?;
    let cases = (0..beam.cases.len())
        .map(|i| check_case(beam, i, tables, settings))
        .collect::<CalcResult<Vec<_>>>()?;

    let governing_index = governing_case_index(&cases);
    let governing = &cases[governing_index];

    let failures: Vec<String> = cases
        .iter()
        .filter_map(|c| c.failure_reason.as_ref().map(|r| format!("{}: {}", c.case_name, r)))
        .collect();
    let passes = failures.is_empty();
    info!(
        governing_case = %governing.case_name,
        governing_check = %governing.governing_check,
        utilization = governing.max_utilization,
        passes,
        "beam checked"
    );

    Ok(BeamComplianceReport {
        beam_id: beam.id.clone(),
        governing_case_index: governing_index,
        governing_case_name: governing.case_name.clone(),
        governing_check: governing.governing_check,
        governing_utilization: governing.max_utilization,
        passes,
        failure_summary: (!passes).then(|| failures.join("; ")),
        cases,
    })
}

// ============================================================================
// Batch
// ============================================================================

/// Outcome of one beam in a batch: a report, or the validation error
/// that stopped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum BeamOutcome {
    Checked(BeamComplianceReport),
    Rejected { beam_id: String, error: CalcError },
}

impl BeamOutcome {
    pub fn beam_id(&self) -> &str {
        match self {
            BeamOutcome::Checked(report) => &report.beam_id,
            BeamOutcome::Rejected { beam_id, .. } => beam_id,
        }
    }
}

/// Check many beams in parallel. Output order matches input order.
#[instrument(skip_all, fields(beams = beams.len()))]
pub fn check_batch(beams: &[BeamDefinition], tables: &CodeTables, settings: &DesignSettings) -> Vec<BeamOutcome> {
    beams
        .par_iter()
        .map(|beam| match check_beam(beam, tables, settings) {
            Ok(report) => BeamOutcome::Checked(report),
            Err(error) => {
                warn!(beam = %beam.id, error = %error, "beam rejected");
                BeamOutcome::Rejected { beam_id: beam.id.clone(), error }
            }
        })
        .collect()
}

/// Aggregate statistics over a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Beams stopped by invalid input
    pub rejected: usize,
    pub failing_beam_ids: Vec<String>,
    pub rejected_beam_ids: Vec<String>,
    /// Highest governing utilization among checked beams
    pub worst_beam_id: Option<String>,
    pub worst_utilization: Option<f64>,
}

impl BatchSummary {
    pub fn all_pass(&self) -> bool {
        self.failed == 0 && self.rejected == 0
    }
}

/// Aggregate batch outcomes after all units complete.
pub fn summarize(outcomes: &[BeamOutcome]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: outcomes.len(),
        passed: 0,
        failed: 0,
        rejected: 0,
        failing_beam_ids: Vec::new(),
        rejected_beam_ids: Vec::new(),
        worst_beam_id: None,
        worst_utilization: None,
    };
    for outcome in outcomes {
        match outcome {
            BeamOutcome::Checked(report) => {
                if report.passes {
                    summary.passed += 1;
                } else {
                    summary.failed += 1;
                    summary.failing_beam_ids.push(report.beam_id.clone());
                }
                if summary.worst_utilization.map_or(true, |w| report.governing_utilization > w) {
                    summary.worst_utilization = Some(report.governing_utilization);
                    summary.worst_beam_id = Some(report.beam_id.clone());
                }
            }
            BeamOutcome::Rejected { beam_id, .. } => {
                summary.rejected += 1;
                summary.rejected_beam_ids.push(beam_id.clone());
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::crack_width::{CrackWidthInput, ExposureClass};

    fn beam(cases: Vec<LoadCase>) -> BeamDefinition {
        BeamDefinition {
            id: "B1".to_string(),
            section: Section::rectangular(230.0, 450.0, 500.0, 25.0),
            materials: Materials::new(25.0, 500.0),
            provided: ProvidedSteel::tension_only(982.0), // 2-25φ
            stirrups: StirrupGeometry::new(2, 8.0, 415.0),
            stirrup_spacing_mm: 200.0,
            cases,
        }
    }

    fn check(beam: &BeamDefinition) -> BeamComplianceReport {
        crate::logging::init_test();
        check_beam(beam, CodeTables::standard(), &DesignSettings::default()).unwrap()
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(CaseStage::Flexure.next(false), Some(CaseStage::Shear));
        assert_eq!(CaseStage::Shear.next(false), Some(CaseStage::Verdict));
        assert_eq!(CaseStage::Shear.next(true), Some(CaseStage::Serviceability));
        assert_eq!(CaseStage::Serviceability.next(true), Some(CaseStage::Verdict));
        assert_eq!(CaseStage::Verdict.next(true), None);
    }

    #[test]
    fn test_passing_beam() {
        let report = check(&beam(vec![LoadCase::new("ULS", 150.0, 100.0)]));
        assert!(report.passes);
        assert!(report.failure_summary.is_none());
        let case = report.governing_case();
        assert_eq!(case.checks.len(), 2);
        assert_eq!(case.governing_check, SubCheck::Flexure);
        assert!(case.max_utilization > 0.9 && case.max_utilization <= 1.0);
    }

    #[test]
    fn test_governing_case_is_max_utilization() {
        let report = check(&beam(vec![
            LoadCase::new("light", 60.0, 40.0),
            LoadCase::new("heavy", 140.0, 90.0),
            LoadCase::new("medium", 100.0, 70.0),
        ]));
        assert_eq!(report.governing_case_index, 1);
        assert_eq!(report.governing_case_name, "heavy");
    }

    #[test]
    fn test_ties_go_to_first_case() {
        let report = check(&beam(vec![
            LoadCase::new("first", 120.0, 80.0),
            LoadCase::new("second", 120.0, 80.0),
        ]));
        assert_eq!(report.governing_case_index, 0);
    }

    fn sub_check(check: SubCheck, utilization: f64) -> SubCheckResult {
        SubCheckResult { check, utilization, passes: utilization <= 1.0, detail: String::new() }
    }

    #[test]
    fn test_equal_sub_checks_go_to_earlier_stage() {
        let checks = vec![
            sub_check(SubCheck::Flexure, 0.8),
            sub_check(SubCheck::Shear, 0.8),
            sub_check(SubCheck::Deflection, 0.5),
        ];
        assert_eq!(governing_sub_check(&checks).unwrap().check, SubCheck::Flexure);

        let checks = vec![
            sub_check(SubCheck::Flexure, 0.3),
            sub_check(SubCheck::Shear, 0.9),
            sub_check(SubCheck::Deflection, 0.9),
            sub_check(SubCheck::CrackWidth, 0.9),
        ];
        assert_eq!(governing_sub_check(&checks).unwrap().check, SubCheck::Shear);

        // A strictly higher later check still takes over
        let checks = vec![sub_check(SubCheck::Flexure, 0.8), sub_check(SubCheck::CrackWidth, 0.81)];
        assert_eq!(governing_sub_check(&checks).unwrap().check, SubCheck::CrackWidth);
        assert!(governing_sub_check(&[]).is_none());
    }

    #[test]
    fn test_different_cases_with_equal_maximum_go_to_first() {
        // Same shear, different moments: both cases peak at the stirrup
        // spacing ratio 200/300, flexure stays well below it
        let report = check(&beam(vec![
            LoadCase::new("gravity", 10.0, 100.0),
            LoadCase::new("wind", 20.0, 100.0),
        ]));
        let (gravity, wind) = (&report.cases[0], &report.cases[1]);
        assert_eq!(gravity.governing_check, SubCheck::Shear);
        assert_eq!(wind.governing_check, SubCheck::Shear);
        assert!(wind.checks[0].utilization > gravity.checks[0].utilization);
        assert_eq!(gravity.max_utilization, wind.max_utilization);
        assert_eq!(report.governing_case_index, 0);
        assert_eq!(report.governing_case_name, "gravity");

        let report = check(&beam(vec![
            LoadCase::new("wind", 20.0, 100.0),
            LoadCase::new("gravity", 10.0, 100.0),
        ]));
        assert_eq!(report.governing_case_index, 0);
        assert_eq!(report.governing_case_name, "wind");
    }

    #[test]
    fn test_failure_text_lists_every_failing_check() {
        let mut b = beam(vec![LoadCase::new("overload", 200.0, 300.0)]);
        b.stirrup_spacing_mm = 350.0;
        let report = check(&b);
        assert!(!report.passes);
        let case = &report.cases[0];
        assert_eq!(case.failing_checks(), vec![SubCheck::Flexure, SubCheck::Shear]);
        assert_eq!(case.failure_reason.as_deref(), Some("flexure, shear"));
        assert!(report.failure_summary.as_ref().unwrap().contains("overload: flexure, shear"));
    }

    #[test]
    fn test_serviceability_stage_runs_when_requested() {
        let service = ServiceabilityInput {
            crack_width: Some(CrackWidthInput {
                service_moment_knm: 100.0,
                ast_provided_mm2: 982.0,
                bar_diameter_mm: 25.0,
                bar_spacing_mm: 130.0,
                exposure: ExposureClass::Extreme,
            }),
            ..ServiceabilityInput::default()
        };
        let report = check(&beam(vec![LoadCase::new("SLS", 150.0, 100.0).with_serviceability(service)]));
        let case = &report.cases[0];
        assert_eq!(case.checks.len(), 3);
        assert_eq!(case.checks[2].check, SubCheck::CrackWidth);
        assert!(!case.checks[2].passes);
        assert!(!report.passes);
        assert_eq!(case.failure_reason.as_deref(), Some("crack width"));
    }

    #[test]
    fn test_batch_preserves_order_and_summarizes() {
        let good = beam(vec![LoadCase::new("ULS", 100.0, 60.0)]);
        let mut bad = beam(vec![LoadCase::new("ULS", 250.0, 60.0)]);
        bad.id = "B2".to_string();
        let mut invalid = beam(vec![LoadCase::new("ULS", 100.0, 60.0)]);
        invalid.id = "B3".to_string();
        invalid.section.clear_cover_mm = 600.0;

        let outcomes = check_batch(&[good, bad, invalid], CodeTables::standard(), &DesignSettings::default());
        let ids: Vec<&str> = outcomes.iter().map(|o| o.beam_id()).collect();
        assert_eq!(ids, vec!["B1", "B2", "B3"]);

        let summary = summarize(&outcomes);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.worst_beam_id.as_deref(), Some("B2"));
        assert!(!summary.all_pass());
    }

    #[test]
    fn test_empty_cases_rejected() {
        let err = check_beam(&beam(vec![]), CodeTables::standard(), &DesignSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }
}
