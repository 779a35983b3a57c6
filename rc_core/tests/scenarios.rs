//! Worked design scenarios, checked against hand calculations to IS 456.

use rc_core::calculations::compliance::{check_beam, BeamComplianceReport, BeamDefinition, LoadCase, SubCheck};
use rc_core::calculations::flexure::{design_singly_reinforced, limiting_moment, FlexureStatus, ProvidedSteel};
use rc_core::calculations::deflection::{SpanDepthInput, SupportCondition};
use rc_core::calculations::serviceability::ServiceabilityInput;
use rc_core::calculations::shear::{design_shear, ShearStatus, SpacingLimit, StirrupGeometry};
use rc_core::calculations::DesignAction;
use rc_core::code_tables::CodeTables;
use rc_core::materials::Materials;
use rc_core::optimize::cutting::{plan_cutting, CutRequirement, CuttingRequest, PlanStrategy};
use rc_core::optimize::layout::{optimize_layout, LayoutRequest};
use rc_core::schema::ResultEnvelope;
use rc_core::section::Section;
use rc_core::settings::DesignSettings;

fn beam_section() -> Section {
    Section::rectangular(230.0, 450.0, 500.0, 25.0)
}

#[test]
fn scenario_singly_reinforced_m25_fe500() {
    let tables = CodeTables::standard();
    let materials = Materials::new(25.0, 500.0);
    let lim = limiting_moment(&beam_section(), &materials, tables).unwrap();
    assert!((lim.xu_max_ratio - 0.46).abs() < 1e-12);
    // 0.36·25·230·207·(450 − 0.416·207)
    assert!((lim.mu_lim_knm - 155.57).abs() < 0.5);

    let result = design_singly_reinforced(&beam_section(), &materials, 150.0, tables).unwrap();
    assert_eq!(result.status, FlexureStatus::SinglyReinforced);
    assert!((result.ast_required_mm2 - 935.9).abs() < 0.01 * 935.9);
    assert!((result.steel_percentage - 0.904).abs() < 0.01);
    assert!(result.passes());
}

#[test]
fn scenario_shear_governed_by_absolute_maximum() {
    let result = design_shear(
        &DesignAction::new(0.0, 100.0),
        &beam_section(),
        &Materials::new(20.0, 415.0),
        &StirrupGeometry::new(2, 8.0, 415.0),
        1.0,
        CodeTables::standard(),
    )
    .unwrap();
    assert!((result.tau_v_mpa - 0.966).abs() < 0.005);
    assert!((result.tau_c_mpa - 0.62).abs() < 1e-9);
    assert!((result.tau_c_max_mpa - 2.8).abs() < 1e-9);
    assert!(result.vus_kn > 35.0 && result.vus_kn < 36.0);
    assert!((result.asv_mm2 - 100.53).abs() < 0.01);
    assert_eq!(result.spacing_mm, Some(300.0));
    assert_eq!(result.governing_limit, Some(SpacingLimit::AbsoluteMaximum));
    assert_eq!(result.status, ShearStatus::DesignedStirrups);
}

#[test]
fn scenario_shear_section_inadequate() {
    let result = design_shear(
        &DesignAction::new(0.0, 300.0),
        &beam_section(),
        &Materials::new(20.0, 415.0),
        &StirrupGeometry::new(2, 8.0, 415.0),
        1.0,
        CodeTables::standard(),
    )
    .unwrap();
    assert!((result.tau_v_mpa - 2.899).abs() < 0.005);
    assert_eq!(result.status, ShearStatus::SectionInadequate);
    assert!(!result.is_safe);
    assert!(result.spacing_mm.is_none());
}

#[test]
fn scenario_minimum_steel_governs() {
    let result =
        design_singly_reinforced(&beam_section(), &Materials::new(20.0, 415.0), 5.0, CodeTables::standard()).unwrap();
    assert!((result.ast_required_mm2 - 212.0).abs() < 0.01 * 212.0);
    assert!(result.minimum_steel_governs);
    assert_eq!(result.status, FlexureStatus::MinimumSteelGoverns);
}

/// Design, detail, check, then plan the cutting of one beam.
#[test]
fn scenario_design_to_cutting_plan() {
    rc_core::logging::init_test();
    let settings = DesignSettings::default();
    let tables = CodeTables::standard();
    let materials = Materials::new(25.0, 500.0);

    let flexure = design_singly_reinforced(&beam_section(), &materials, 150.0, tables).unwrap();
    let outcome =
        optimize_layout(&LayoutRequest::new(flexure.ast_required_mm2, 230.0, 25.0, 8.0), &settings.layout).unwrap();
    let layout = outcome.layout().cloned().unwrap();
    assert!(layout.area_provided_mm2 >= flexure.ast_required_mm2);

    let beam = BeamDefinition {
        id: "B1".to_string(),
        section: beam_section(),
        materials,
        provided: ProvidedSteel::tension_only(layout.area_provided_mm2),
        stirrups: StirrupGeometry::new(2, 8.0, 415.0),
        stirrup_spacing_mm: 200.0,
        cases: vec![
            LoadCase::new("1.5(DL+LL)", 150.0, 100.0),
            LoadCase::new("1.5(DL+WL)", 90.0, 70.0).with_serviceability(ServiceabilityInput {
                span_depth: Some(SpanDepthInput {
                    span_mm: 5000.0,
                    support: SupportCondition::SimplySupported,
                    ast_required_mm2: flexure.ast_required_mm2,
                    ast_provided_mm2: layout.area_provided_mm2,
                    asc_provided_mm2: 0.0,
                }),
                ..ServiceabilityInput::default()
            }),
        ],
    };
    let report = check_beam(&beam, tables, &settings).unwrap();
    assert!(report.passes, "{:?}", report.failure_summary);
    assert_eq!(report.governing_case_index, 0);
    assert_eq!(report.governing_check, SubCheck::Flexure);
    assert!(report.governing_utilization <= 1.0);
    assert_eq!(report.cases[1].checks.len(), 3);
    assert_eq!(report.cases[1].checks[2].check, SubCheck::Deflection);

    let plan = plan_cutting(
        &CuttingRequest::new(
            "B1-B",
            vec![
                CutRequirement { length_mm: 4200.0, quantity: 6 },
                CutRequirement { length_mm: 2900.0, quantity: 4 },
            ],
        ),
        &settings.cutting,
    )
    .unwrap();
    assert_eq!(plan.strategy, PlanStrategy::Exact);
    assert!(plan.is_complete());
    assert!((plan.total_cut_length_mm - 36_800.0).abs() < 1e-6);
    assert!((plan.total_stock_length_mm - 39_000.0).abs() < 1e-6);
    assert!((plan.total_waste_mm - 2_200.0).abs() < 1e-6);

    let json = ResultEnvelope::new(report.clone()).to_json().unwrap();
    let back: ResultEnvelope<BeamComplianceReport> = ResultEnvelope::from_json(&json).unwrap();
    assert_eq!(back.payload.beam_id, report.beam_id);
    assert_eq!(back.payload.governing_case_name, report.governing_case_name);
    assert_eq!(back.payload.cases.len(), 2);
    assert!(back.payload.passes);
}
