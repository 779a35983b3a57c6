//! # Serviceability
//!
//! Runs whichever of the span/depth check, the detailed deflection
//! calculation and the crack-width estimate were requested, and combines
//! them into one pass/fail per limit state.
//!
//! When both deflection checks are supplied the detailed calculation
//! decides the deflection verdict; the span/depth result is still reported.

use serde::{Deserialize, Serialize};

use super::crack_width::{crack_width, CrackWidthInput, CrackWidthResult};
use super::deflection::{
    detailed_deflection, span_depth_check, DeflectionInput, DeflectionResult, SpanDepthInput, SpanDepthResult,
};
use crate::errors::CalcResult;
use crate::materials::Materials;
use crate::section::Section;
use crate::settings::ServiceabilitySettings;

/// Which serviceability checks to run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceabilityInput {
    #[serde(default)]
    pub span_depth: Option<SpanDepthInput>,
    #[serde(default)]
    pub deflection: Option<DeflectionInput>,
    #[serde(default)]
    pub crack_width: Option<CrackWidthInput>,
}

impl ServiceabilityInput {
    /// True when no check was requested
    pub fn is_empty(&self) -> bool {
        self.span_depth.is_none() && self.deflection.is_none() && self.crack_width.is_none()
    }
}

/// Combined serviceability verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceabilityResult {
    pub span_depth: Option<SpanDepthResult>,
    pub deflection: Option<DeflectionResult>,
    pub crack_width: Option<CrackWidthResult>,
    /// None when no deflection check was requested
    pub deflection_passes: Option<bool>,
    /// None when no crack-width check was requested
    pub crack_width_passes: Option<bool>,
    /// Governing actual/allowable deflection ratio
    pub deflection_utilization: Option<f64>,
    pub crack_width_utilization: Option<f64>,
    /// Assumptions of every check that ran, in order
    pub assumptions: Vec<String>,
}

impl ServiceabilityResult {
    /// Passes every requested check
    pub fn passes(&self) -> bool {
        self.deflection_passes.unwrap_or(true) && self.crack_width_passes.unwrap_or(true)
    }
}

/// Run the requested serviceability checks.
pub fn check_serviceability(
    section: &Section,
    materials: &Materials,
    input: &ServiceabilityInput,
    settings: &ServiceabilitySettings,
) -> CalcResult<ServiceabilityResult> {
    let span_depth = input
        .span_depth
        .as_ref()
        .map(|sd| span_depth_check(section, materials, sd))
        .transpose()?;
    let deflection = input
        .deflection
        .as_ref()
        .map(|di| detailed_deflection(section, materials, di, settings))
        .transpose()?;
    let crack = input
        .crack_width
        .as_ref()
        .map(|ci| crack_width(section, materials, ci))
        .transpose()?;

    let (deflection_passes, deflection_utilization) = match (&deflection, &span_depth) {
        (Some(detailed), _) => (Some(detailed.passes), Some(detailed.utilization())),
        (None, Some(fast)) => (Some(fast.passes), Some(fast.utilization())),
        (None, None) => (None, None),
    };

    let mut assumptions = Vec::new();
    if let Some(sd) = &span_depth {
        assumptions.extend(sd.assumptions.iter().cloned());
    }
    if let Some(df) = &deflection {
        assumptions.extend(df.assumptions.iter().cloned());
    }

    Ok(ServiceabilityResult {
        deflection_passes,
        deflection_utilization,
        crack_width_passes: crack.as_ref().map(|c| c.passes),
        crack_width_utilization: crack.as_ref().map(|c| c.utilization()),
        span_depth,
        deflection,
        crack_width: crack,
        assumptions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::crack_width::ExposureClass;
    use crate::calculations::deflection::SupportCondition;

    fn section() -> Section {
        Section::rectangular(230.0, 450.0, 500.0, 25.0)
    }

    #[test]
    fn test_empty_input_passes() {
        let result = check_serviceability(
            &section(),
            &Materials::new(25.0, 415.0),
            &ServiceabilityInput::default(),
            &ServiceabilitySettings::default(),
        )
        .unwrap();
        assert!(result.passes());
        assert_eq!(result.deflection_passes, None);
        assert_eq!(result.crack_width_passes, None);
    }

    #[test]
    fn test_fast_check_and_crack_width() {
        let input = ServiceabilityInput {
            span_depth: Some(SpanDepthInput {
                span_mm: 6000.0,
                support: SupportCondition::SimplySupported,
                ast_required_mm2: 900.0,
                ast_provided_mm2: 942.0,
                asc_provided_mm2: 0.0,
            }),
            deflection: None,
            crack_width: Some(CrackWidthInput {
                service_moment_knm: 80.0,
                ast_provided_mm2: 942.0,
                bar_diameter_mm: 20.0,
                bar_spacing_mm: 75.0,
                exposure: ExposureClass::Extreme,
            }),
        };
        let result = check_serviceability(
            &section(),
            &Materials::new(25.0, 415.0),
            &input,
            &ServiceabilitySettings::default(),
        )
        .unwrap();
        assert_eq!(result.deflection_passes, Some(true));
        assert_eq!(result.crack_width_passes, Some(false));
        assert!(!result.passes());
        assert!(result.crack_width_utilization.unwrap() > 1.0);
        assert!(!result.assumptions.is_empty());
    }

    #[test]
    fn test_detailed_check_governs_deflection() {
        let input = ServiceabilityInput {
            span_depth: Some(SpanDepthInput {
                span_mm: 6000.0,
                support: SupportCondition::SimplySupported,
                ast_required_mm2: 900.0,
                ast_provided_mm2: 942.0,
                asc_provided_mm2: 0.0,
            }),
            deflection: Some(DeflectionInput {
                span_mm: 6000.0,
                support: SupportCondition::SimplySupported,
                service_moment_knm: 60.0,
                permanent_moment_knm: 40.0,
                ast_provided_mm2: 942.0,
                asc_provided_mm2: 0.0,
                compression_depth_mm: 0.0,
                creep_coefficient: None,
                shrinkage_strain: None,
            }),
            crack_width: None,
        };
        let result = check_serviceability(
            &section(),
            &Materials::new(25.0, 415.0),
            &input,
            &ServiceabilitySettings::default(),
        )
        .unwrap();
        let detailed = result.deflection.as_ref().unwrap();
        assert_eq!(result.deflection_utilization, Some(detailed.utilization()));
        assert_eq!(result.deflection_passes, Some(detailed.passes));
    }
}
