//! # Code Tables
//!
//! Immutable lookup tables from IS 456:2000 used by the solvers:
//!
//! | Table | Content | Lookup policy |
//! |-------|---------|---------------|
//! | 19 | Design shear strength of concrete τc | nearest lower grade column, linear in pt |
//! | 20 | Maximum shear stress τc,max | nearest lower grade, no interpolation |
//! | cl. 38.1 | Limiting neutral-axis ratio xu,max/d | fixed constant per steel grade |
//!
//! Tables are an ordinary value ([`CodeTables`]) passed by reference to every
//! solver. [`CodeTables::standard`] hands out a shared read-only instance;
//! tests and callers with project-specific tables build their own (for
//! example with [`CodeTables::from_toml_str`]) without touching global state.
//!
//! The raw rows live in [`CodeTableData`]. A [`CodeTables`] can only be made
//! from data that passed [`CodeTableData::validate`], whether it is built in
//! code or deserialized, so every lookup indexes a non-empty, rectangular
//! table.
//!
//! Lookups never fail. An input outside a table's range is substituted by the
//! nearest defined value and the substitution is reported as a
//! [`RangeWarning`] next to the value.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{CalcError, CalcResult};
use crate::materials::{SteelGrade, CONCRETE_ULTIMATE_STRAIN, ES_MPA};

// ============================================================================
// Clause References
// ============================================================================

/// IS 456:2000 clause references quoted in remarks.
pub mod clause {
    /// Limit state of collapse: flexure
    pub const FLEXURE: &str = "IS 456 cl. 38.1";
    /// Minimum tension reinforcement in beams
    pub const MIN_TENSION_STEEL: &str = "IS 456 cl. 26.5.1.1(a)";
    /// Maximum tension/compression reinforcement in beams
    pub const MAX_STEEL: &str = "IS 456 cl. 26.5.1.1(b)";
    /// Flanged beams, limiting moment
    pub const FLANGED: &str = "IS 456 Annex G-2.2";
    /// Effective width of flange
    pub const EFFECTIVE_FLANGE_WIDTH: &str = "IS 456 cl. 23.1.2";
    /// Design shear strength of concrete
    pub const SHEAR_STRENGTH: &str = "IS 456 Table 19";
    /// Maximum shear stress
    pub const MAX_SHEAR_STRESS: &str = "IS 456 Table 20";
    /// Design of shear reinforcement
    pub const SHEAR_REINFORCEMENT: &str = "IS 456 cl. 40.4";
    /// Minimum shear reinforcement
    pub const MIN_SHEAR_REINFORCEMENT: &str = "IS 456 cl. 26.5.1.6";
    /// Maximum spacing of shear reinforcement
    pub const MAX_STIRRUP_SPACING: &str = "IS 456 cl. 26.5.1.5";
    /// Span/depth ratio control of deflection
    pub const SPAN_DEPTH: &str = "IS 456 cl. 23.2.1";
    /// Calculation of deflection
    pub const DEFLECTION: &str = "IS 456 Annex C";
    /// Calculation of crack width
    pub const CRACK_WIDTH: &str = "IS 456 Annex F";
    /// Minimum distance between individual bars
    pub const BAR_SPACING: &str = "IS 456 cl. 26.3.2";
}

// ============================================================================
// Range Warnings
// ============================================================================

/// Non-fatal note that a table input was outside the defined range and a
/// nearest value was substituted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RangeWarning {
    /// Steel percentage clamped into the tabulated pt range
    SteelRatioClamped { supplied: f64, used: f64 },
    /// Concrete grade below the lowest tabulated column
    GradeBelowTable { supplied: f64, used: f64 },
    /// Concrete grade between tabulated columns in an exact-value table
    GradeNotTabulated { supplied: f64, used: f64 },
    /// Steel yield strength is not a standard grade; xu,max/d derived from strain compatibility
    NonStandardSteelGrade { fy_mpa: f64, ratio: f64 },
}

impl RangeWarning {
    /// One-line description for remarks
    pub fn message(&self) -> String {
        match self {
            RangeWarning::SteelRatioClamped { supplied, used } => {
                format!("steel ratio {:.3}% outside table, {:.2}% used", supplied, used)
            }
            RangeWarning::GradeBelowTable { supplied, used } => {
                format!("concrete grade M{} below table, M{} column used", supplied, used)
            }
            RangeWarning::GradeNotTabulated { supplied, used } => {
                format!("concrete grade M{} not tabulated, M{} value used", supplied, used)
            }
            RangeWarning::NonStandardSteelGrade { fy_mpa, ratio } => {
                format!("fy = {} MPa is not a standard grade, xu,max/d = {:.3} derived", fy_mpa, ratio)
            }
        }
    }
}

/// A table value together with any range warnings raised while finding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    /// The looked-up value
    pub value: f64,
    /// Substitutions made during lookup (empty when the input was in range)
    pub warnings: Vec<RangeWarning>,
}

impl Lookup {
    fn exact(value: f64) -> Self {
        Lookup { value, warnings: Vec::new() }
    }

    /// True when no substitution was needed
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

// ============================================================================
// Table Data
// ============================================================================

/// Table 19: τc (MPa) indexed by [grade column][pt row]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearStrengthTable {
    /// Concrete grades (fck, MPa) of each column, ascending
    pub grades_mpa: Vec<f64>,
    /// Steel percentages of each row, ascending
    pub steel_ratios_percent: Vec<f64>,
    /// τc values, one row per grade, one entry per steel ratio
    pub tau_c_mpa: Vec<Vec<f64>>,
}

/// Table 20: τc,max (MPa) per grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxShearTable {
    /// Concrete grades (fck, MPa), ascending
    pub grades_mpa: Vec<f64>,
    /// τc,max per grade
    pub tau_c_max_mpa: Vec<f64>,
}

/// Limiting neutral-axis depth ratios for the standard steel grades
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeutralAxisLimits {
    pub fe250: f64,
    pub fe415: f64,
    pub fe500: f64,
}

/// Unvalidated table rows, as written in a TOML or JSON dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeTableData {
    pub shear_strength: ShearStrengthTable,
    pub max_shear: MaxShearTable,
    pub neutral_axis_limits: NeutralAxisLimits,
}

/// Complete immutable code-table dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CodeTableData", into = "CodeTableData")]
pub struct CodeTables {
    data: CodeTableData,
}

impl TryFrom<CodeTableData> for CodeTables {
    type Error = CalcError;

    fn try_from(data: CodeTableData) -> CalcResult<Self> {
        data.validate()?;
        Ok(CodeTables { data })
    }
}

impl From<CodeTables> for CodeTableData {
    fn from(tables: CodeTables) -> Self {
        tables.data
    }
}

static STANDARD_TABLES: Lazy<CodeTables> = Lazy::new(CodeTables::is456);

impl CodeTables {
    /// Shared read-only IS 456:2000 dataset
    pub fn standard() -> &'static CodeTables {
        &STANDARD_TABLES
    }

    /// Build the IS 456:2000 dataset
    pub fn is456() -> Self {
        CodeTables { data: CodeTableData::is456() }
    }

    /// Validate `data` and wrap it.
    pub fn new(data: CodeTableData) -> CalcResult<Self> {
        CodeTables::try_from(data)
    }

    /// Parse an alternate dataset from TOML and validate its shape.
    pub fn from_toml_str(s: &str) -> CalcResult<Self> {
        let data: CodeTableData =
            toml::from_str(s).map_err(|e| CalcError::serialization(e.to_string()))?;
        CodeTables::new(data)
    }

    /// The validated rows
    pub fn data(&self) -> &CodeTableData {
        &self.data
    }

    /// Copy of the rows, for building a modified dataset
    pub fn to_data(&self) -> CodeTableData {
        self.data.clone()
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// Design shear strength of concrete τc (MPa).
    ///
    /// `steel_ratio_percent` = 100·As/(b·d). The ratio is clamped into the
    /// tabulated range; the grade selects the nearest lower column and the
    /// value is interpolated linearly along the ratio axis.
    pub fn shear_strength(&self, fck_mpa: f64, steel_ratio_percent: f64) -> Lookup {
        let table = &self.data.shear_strength;
        let mut warnings = Vec::new();

        let (col, grade_warning) = lower_column(&table.grades_mpa, fck_mpa);
        warnings.extend(grade_warning);

        let ratios = &table.steel_ratios_percent;
        let lo = ratios[0];
        let hi = ratios[ratios.len() - 1];
        let pt = steel_ratio_percent.clamp(lo, hi);
        if (pt - steel_ratio_percent).abs() > f64::EPSILON {
            warnings.push(RangeWarning::SteelRatioClamped {
                supplied: steel_ratio_percent,
                used: pt,
            });
        }

        let row = &table.tau_c_mpa[col];
        let value = interpolate(ratios, row, pt);
        for w in &warnings {
            warn!(warning = %w.message(), "shear strength lookup substituted");
        }
        Lookup { value, warnings }
    }

    /// Maximum shear stress τc,max (MPa), exact table value per grade.
    pub fn max_shear_stress(&self, fck_mpa: f64) -> Lookup {
        let table = &self.data.max_shear;
        let (col, grade_warning) = lower_column(&table.grades_mpa, fck_mpa);
        let value = table.tau_c_max_mpa[col];
        let mut lookup = Lookup::exact(value);
        if let Some(w) = grade_warning {
            lookup.warnings.push(w);
        } else {
            let used = table.grades_mpa[col];
            let is_last = col == table.grades_mpa.len() - 1;
            if !is_last && (used - fck_mpa).abs() > 1e-9 {
                lookup.warnings.push(RangeWarning::GradeNotTabulated {
                    supplied: fck_mpa,
                    used,
                });
            }
        }
        for w in &lookup.warnings {
            warn!(warning = %w.message(), "max shear stress lookup substituted");
        }
        lookup
    }

    /// Limiting neutral-axis ratio xu,max/d for a standard steel grade
    pub fn neutral_axis_ratio_for(&self, grade: SteelGrade) -> f64 {
        let na = &self.data.neutral_axis_limits;
        match grade {
            SteelGrade::Fe250 => na.fe250,
            SteelGrade::Fe415 => na.fe415,
            SteelGrade::Fe500 => na.fe500,
        }
    }

    /// Limiting neutral-axis ratio xu,max/d for any yield strength.
    ///
    /// Standard grades return the tabulated constant. Other strengths use
    /// strain compatibility, 0.0035 / (0.0055 + 0.87·fy/Es), flagged with
    /// [`RangeWarning::NonStandardSteelGrade`].
    pub fn neutral_axis_limit_ratio(&self, fy_mpa: f64) -> Lookup {
        match SteelGrade::from_fy(fy_mpa) {
            Some(grade) => Lookup::exact(self.neutral_axis_ratio_for(grade)),
            None => {
                let ratio = CONCRETE_ULTIMATE_STRAIN
                    / (CONCRETE_ULTIMATE_STRAIN + 0.002 + 0.87 * fy_mpa / ES_MPA);
                let w = RangeWarning::NonStandardSteelGrade { fy_mpa, ratio };
                warn!(warning = %w.message(), "neutral axis limit derived");
                Lookup { value: ratio, warnings: vec![w] }
            }
        }
    }
}

impl CodeTableData {
    /// Rows of the IS 456:2000 dataset
    pub fn is456() -> Self {
        CodeTableData {
            shear_strength: ShearStrengthTable {
                grades_mpa: vec![15.0, 20.0, 25.0, 30.0, 35.0, 40.0],
                steel_ratios_percent: vec![
                    0.15, 0.25, 0.50, 0.75, 1.00, 1.25, 1.50, 1.75, 2.00, 2.25, 2.50, 2.75, 3.00,
                ],
                tau_c_mpa: vec![
                    // M15
                    vec![0.28, 0.35, 0.46, 0.54, 0.60, 0.64, 0.68, 0.71, 0.71, 0.71, 0.71, 0.71, 0.71],
                    // M20
                    vec![0.28, 0.36, 0.48, 0.56, 0.62, 0.67, 0.72, 0.75, 0.79, 0.81, 0.82, 0.82, 0.82],
                    // M25
                    vec![0.29, 0.36, 0.49, 0.57, 0.64, 0.70, 0.74, 0.78, 0.82, 0.85, 0.88, 0.90, 0.92],
                    // M30
                    vec![0.29, 0.37, 0.50, 0.59, 0.66, 0.71, 0.76, 0.80, 0.84, 0.88, 0.91, 0.94, 0.96],
                    // M35
                    vec![0.29, 0.37, 0.50, 0.59, 0.67, 0.73, 0.78, 0.82, 0.86, 0.90, 0.93, 0.96, 0.99],
                    // M40 and above
                    vec![0.30, 0.38, 0.51, 0.60, 0.68, 0.74, 0.79, 0.84, 0.88, 0.92, 0.95, 0.98, 1.01],
                ],
            },
            max_shear: MaxShearTable {
                grades_mpa: vec![15.0, 20.0, 25.0, 30.0, 35.0, 40.0],
                tau_c_max_mpa: vec![2.5, 2.8, 3.1, 3.5, 3.7, 4.0],
            },
            neutral_axis_limits: NeutralAxisLimits {
                fe250: 0.53,
                fe415: 0.48,
                fe500: 0.46,
            },
        }
    }

    /// Check that every table is rectangular and its axes ascend.
    pub fn validate(&self) -> CalcResult<()> {
        let st = &self.shear_strength;
        check_ascending("shear_strength.grades_mpa", &st.grades_mpa)?;
        check_ascending("shear_strength.steel_ratios_percent", &st.steel_ratios_percent)?;
        if st.tau_c_mpa.len() != st.grades_mpa.len() {
            return Err(CalcError::invalid_input(
                "shear_strength.tau_c_mpa",
                st.tau_c_mpa.len().to_string(),
                "Need one row per grade",
            ));
        }
        if let Some(row) = st.tau_c_mpa.iter().find(|row| row.len() != st.steel_ratios_percent.len()) {
            return Err(CalcError::invalid_input(
                "shear_strength.tau_c_mpa",
                row.len().to_string(),
                "Each row needs one value per steel ratio",
            ));
        }
        check_ascending("max_shear.grades_mpa", &self.max_shear.grades_mpa)?;
        if self.max_shear.tau_c_max_mpa.len() != self.max_shear.grades_mpa.len() {
            return Err(CalcError::invalid_input(
                "max_shear.tau_c_max_mpa",
                self.max_shear.tau_c_max_mpa.len().to_string(),
                "Need one value per grade",
            ));
        }
        let na = &self.neutral_axis_limits;
        for (field, ratio) in [("fe250", na.fe250), ("fe415", na.fe415), ("fe500", na.fe500)] {
            if !(ratio > 0.0 && ratio < 1.0) {
                return Err(CalcError::invalid_input(
                    format!("neutral_axis_limits.{}", field),
                    ratio.to_string(),
                    "Ratio must lie strictly between 0 and 1",
                ));
            }
        }
        Ok(())
    }
}

impl Default for CodeTables {
    fn default() -> Self {
        CodeTables::is456()
    }
}

fn check_ascending(field: &str, values: &[f64]) -> CalcResult<()> {
    if values.is_empty() {
        return Err(CalcError::invalid_input(field, "[]", "Table axis cannot be empty"));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CalcError::invalid_input(field, format!("{:?}", values), "Table axis must be finite"));
    }
    if values.windows(2).any(|w| w[1] <= w[0]) {
        return Err(CalcError::invalid_input(
            field,
            format!("{:?}", values),
            "Table axis must be strictly ascending",
        ));
    }
    Ok(())
}

/// Index of the largest grade ≤ fck; below the first grade uses column 0.
fn lower_column(grades: &[f64], fck_mpa: f64) -> (usize, Option<RangeWarning>) {
    if fck_mpa < grades[0] {
        return (
            0,
            Some(RangeWarning::GradeBelowTable {
                supplied: fck_mpa,
                used: grades[0],
            }),
        );
    }
    let col = grades
        .iter()
        .rposition(|&g| g <= fck_mpa + 1e-9)
        .unwrap_or(0);
    (col, None)
}

/// Piecewise-linear interpolation; `x` must already be inside `xs`.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    for i in 0..xs.len() - 1 {
        if x <= xs[i + 1] {
            let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
            return ys[i] + t * (ys[i + 1] - ys[i]);
        }
    }
    ys[ys.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shear_strength_exact_point() {
        let t = CodeTables::standard();
        let lookup = t.shear_strength(20.0, 1.0);
        assert!((lookup.value - 0.62).abs() < 1e-9);
        assert!(lookup.is_clean());
    }

    #[test]
    fn test_shear_strength_interpolates_within_row() {
        let t = CodeTables::standard();
        // M25, pt = 0.625 → halfway between 0.49 and 0.57
        let lookup = t.shear_strength(25.0, 0.625);
        assert!((lookup.value - 0.53).abs() < 1e-9);
    }

    #[test]
    fn test_shear_strength_uses_nearest_lower_grade() {
        let t = CodeTables::standard();
        // M28 reads the M25 column, no interpolation across grades
        let lookup = t.shear_strength(28.0, 1.0);
        assert!((lookup.value - 0.64).abs() < 1e-9);
        assert!(lookup.is_clean());
    }

    #[test]
    fn test_shear_strength_clamps_ratio() {
        let t = CodeTables::standard();
        let low = t.shear_strength(20.0, 0.05);
        assert!((low.value - 0.28).abs() < 1e-9);
        assert!(matches!(low.warnings[0], RangeWarning::SteelRatioClamped { used, .. } if used == 0.15));

        let high = t.shear_strength(20.0, 4.0);
        assert!((high.value - 0.82).abs() < 1e-9);
        assert_eq!(high.warnings.len(), 1);
    }

    #[test]
    fn test_shear_strength_grade_below_table_warns() {
        let t = CodeTables::standard();
        let lookup = t.shear_strength(10.0, 1.0);
        assert!((lookup.value - 0.60).abs() < 1e-9);
        assert!(matches!(lookup.warnings[0], RangeWarning::GradeBelowTable { .. }));
    }

    #[test]
    fn test_high_grade_uses_last_column_without_warning() {
        let t = CodeTables::standard();
        let lookup = t.shear_strength(60.0, 1.0);
        assert!((lookup.value - 0.68).abs() < 1e-9);
        assert!(lookup.is_clean());
        let max = t.max_shear_stress(60.0);
        assert!((max.value - 4.0).abs() < 1e-9);
        assert!(max.is_clean());
    }

    #[test]
    fn test_max_shear_stress() {
        let t = CodeTables::standard();
        assert!((t.max_shear_stress(20.0).value - 2.8).abs() < 1e-9);
        assert!((t.max_shear_stress(30.0).value - 3.5).abs() < 1e-9);

        let between = t.max_shear_stress(22.0);
        assert!((between.value - 2.8).abs() < 1e-9);
        assert!(matches!(between.warnings[0], RangeWarning::GradeNotTabulated { .. }));
    }

    #[test]
    fn test_neutral_axis_ratios() {
        let t = CodeTables::standard();
        assert_eq!(t.neutral_axis_limit_ratio(250.0).value, 0.53);
        assert_eq!(t.neutral_axis_limit_ratio(415.0).value, 0.48);
        assert_eq!(t.neutral_axis_limit_ratio(500.0).value, 0.46);

        let odd = t.neutral_axis_limit_ratio(550.0);
        assert!(odd.value > 0.40 && odd.value < 0.46);
        assert!(matches!(odd.warnings[0], RangeWarning::NonStandardSteelGrade { .. }));
    }

    #[test]
    fn test_substitute_tables_from_toml() {
        let mut data = CodeTables::standard().to_data();
        data.neutral_axis_limits.fe500 = 0.45;
        let custom = CodeTables::new(data).unwrap();
        let text = toml::to_string(&custom).unwrap();
        let parsed = CodeTables::from_toml_str(&text).unwrap();
        assert_eq!(parsed.neutral_axis_limit_ratio(500.0).value, 0.45);
        // Standard dataset untouched
        assert_eq!(CodeTables::standard().neutral_axis_limit_ratio(500.0).value, 0.46);
    }

    #[test]
    fn test_validation_rejects_ragged_table() {
        assert!(CodeTableData::is456().validate().is_ok());

        let mut broken = CodeTableData::is456();
        broken.shear_strength.tau_c_mpa[2].pop();
        assert!(broken.validate().is_err());
        assert!(CodeTables::new(broken).is_err());

        let mut unordered = CodeTableData::is456();
        unordered.max_shear.grades_mpa.swap(0, 1);
        assert!(CodeTables::new(unordered).is_err());
    }

    #[test]
    fn test_json_with_empty_axes_rejected() {
        let mut data = CodeTableData::is456();
        data.shear_strength.grades_mpa.clear();
        data.shear_strength.steel_ratios_percent.clear();
        data.shear_strength.tau_c_mpa.clear();
        let json = serde_json::to_string(&data).unwrap();
        assert!(serde_json::from_str::<CodeTables>(&json).is_err());

        let mut data = CodeTableData::is456();
        data.max_shear.tau_c_max_mpa.pop();
        let json = serde_json::to_string(&data).unwrap();
        assert!(serde_json::from_str::<CodeTables>(&json).is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_lookups() {
        let json = serde_json::to_string(CodeTables::standard()).unwrap();
        let parsed: CodeTables = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, CodeTables::standard());
        assert!((parsed.shear_strength(20.0, 1.0).value - 0.62).abs() < 1e-9);
    }
}
