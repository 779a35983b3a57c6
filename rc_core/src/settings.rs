//! # Design Settings
//!
//! Tunable defaults that are not part of a single beam's input: long-term
//! deflection parameters, detailing rules for the layout search, and the
//! stock lengths and search limits of the cutting optimizer.
//!
//! Settings serialize to TOML so a design office can keep one file per
//! project standard. Missing keys fall back to the defaults below.
//!
//! ## Example
//!
//! ```rust
//! use rc_core::settings::DesignSettings;
//!
//! let settings = DesignSettings::from_toml_str(r#"
//!     [layout]
//!     max_layers = 2
//!
//!     [cutting]
//!     stock_lengths_mm = [6000.0, 12000.0]
//! "#).unwrap();
//!
//! assert_eq!(settings.layout.max_layers, 2);
//! assert_eq!(settings.serviceability.deflection_limit_ratio, 250.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::optimize::layout::LayoutObjective;

/// Root settings container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DesignSettings {
    pub serviceability: ServiceabilitySettings,
    pub layout: LayoutSettings,
    pub cutting: CuttingSettings,
}

impl DesignSettings {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml_str(s: &str) -> CalcResult<Self> {
        let settings: DesignSettings =
            toml::from_str(s).map_err(|e| CalcError::serialization(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to TOML text.
    pub fn to_toml_string(&self) -> CalcResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalcError::serialization(e.to_string()))
    }

    /// Validate every group.
    pub fn validate(&self) -> CalcResult<()> {
        self.serviceability.validate()?;
        self.layout.validate()?;
        self.cutting.validate()?;
        Ok(())
    }
}

/// Long-term deflection parameters (IS 456 Annex C).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceabilitySettings {
    /// Ultimate shrinkage strain εcs
    pub shrinkage_strain: f64,
    /// Creep coefficient θ used when the caller gives none
    pub creep_coefficient: f64,
    /// Allowable final deflection expressed as span / ratio
    pub deflection_limit_ratio: f64,
    /// Simpson's rule segments for curvature integration (even)
    pub integration_segments: usize,
}

impl Default for ServiceabilitySettings {
    fn default() -> Self {
        ServiceabilitySettings {
            shrinkage_strain: 0.0003,
            creep_coefficient: 1.6,
            deflection_limit_ratio: 250.0,
            integration_segments: 200,
        }
    }
}

impl ServiceabilitySettings {
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("serviceability.shrinkage_strain", self.shrinkage_strain)?;
        require_non_negative("serviceability.creep_coefficient", self.creep_coefficient)?;
        require_positive("serviceability.deflection_limit_ratio", self.deflection_limit_ratio)?;
        if self.integration_segments < 2 || self.integration_segments % 2 != 0 {
            return Err(CalcError::invalid_input(
                "serviceability.integration_segments",
                self.integration_segments.to_string(),
                "Simpson's rule needs an even number of segments (≥ 2)",
            ));
        }
        Ok(())
    }
}

/// Detailing rules for the reinforcement-layout search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Diameters the search may use, in enumeration order (mm)
    pub diameters_mm: Vec<f64>,
    /// Maximum number of bar layers
    pub max_layers: u32,
    /// Nominal maximum aggregate size (mm)
    pub aggregate_size_mm: f64,
    /// Minimum clear vertical gap between layers (mm)
    pub min_layer_gap_mm: f64,
    /// Default objective when the request does not name one
    pub objective: LayoutObjective,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            diameters_mm: vec![10.0, 12.0, 16.0, 20.0, 25.0, 32.0],
            max_layers: 3,
            aggregate_size_mm: 20.0,
            min_layer_gap_mm: 25.0,
            objective: LayoutObjective::MinWeight,
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> CalcResult<()> {
        if self.diameters_mm.is_empty() {
            return Err(CalcError::invalid_input("layout.diameters_mm", "[]", "At least one diameter is required"));
        }
        for d in &self.diameters_mm {
            require_positive("layout.diameters_mm", *d)?;
        }
        if self.max_layers == 0 {
            return Err(CalcError::invalid_input("layout.max_layers", "0", "At least one layer is required"));
        }
        require_non_negative("layout.aggregate_size_mm", self.aggregate_size_mm)?;
        require_non_negative("layout.min_layer_gap_mm", self.min_layer_gap_mm)?;
        Ok(())
    }
}

/// Stock lengths and search limits for the cutting optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuttingSettings {
    /// Stock bar lengths available from the supplier (mm)
    pub stock_lengths_mm: Vec<f64>,
    /// Material lost per saw/shear cut (mm)
    pub kerf_mm: f64,
    /// Exact search is attempted only up to this many distinct cut lengths
    pub exact_max_distinct_lengths: usize,
    /// ... and up to this many pieces in total
    pub exact_max_pieces: usize,
    /// Hard cap on branch-and-bound nodes
    pub exact_node_limit: u64,
    /// Hard cap on partial patterns visited while enumerating cutting patterns
    pub exact_pattern_limit: u64,
}

impl Default for CuttingSettings {
    fn default() -> Self {
        CuttingSettings {
            stock_lengths_mm: vec![6000.0, 7500.0, 9000.0, 12000.0],
            kerf_mm: 0.0,
            exact_max_distinct_lengths: 4,
            exact_max_pieces: 60,
            exact_node_limit: 200_000,
            exact_pattern_limit: 20_000,
        }
    }
}

impl CuttingSettings {
    pub fn validate(&self) -> CalcResult<()> {
        if self.stock_lengths_mm.is_empty() {
            return Err(CalcError::invalid_input("cutting.stock_lengths_mm", "[]", "At least one stock length is required"));
        }
        for len in &self.stock_lengths_mm {
            require_positive("cutting.stock_lengths_mm", *len)?;
        }
        require_non_negative("cutting.kerf_mm", self.kerf_mm)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = DesignSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.layout.max_layers, 3);
        assert_eq!(settings.cutting.stock_lengths_mm.len(), 4);
        assert_eq!(settings.cutting.exact_pattern_limit, 20_000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = DesignSettings::from_toml_str("[serviceability]\ncreep_coefficient = 1.2\n").unwrap();
        assert_eq!(settings.serviceability.creep_coefficient, 1.2);
        assert_eq!(settings.serviceability.shrinkage_strain, 0.0003);
        assert_eq!(settings.layout, LayoutSettings::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let settings = DesignSettings::default();
        let text = settings.to_toml_string().unwrap();
        let parsed = DesignSettings::from_toml_str(&text).unwrap();
        assert_eq!(settings, parsed);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = DesignSettings::from_toml_str("[serviceability]\nintegration_segments = 7\n").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = DesignSettings::from_toml_str("[layout]\nmax_layers = 0\n").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = DesignSettings::from_toml_str("layout = 3").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
