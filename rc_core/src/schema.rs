//! # Serialized Result Envelope
//!
//! Results leave the engine wrapped in a [`ResultEnvelope`] carrying the
//! schema version, a run identifier and a timestamp. Report generators,
//! drawing exporters and dashboards check the version before reading the
//! payload, so an incompatible shape change fails loudly instead of
//! producing a silently wrong report.
//!
//! ## Example
//!
//! ```rust
//! use rc_core::schema::{ResultEnvelope, SCHEMA_VERSION};
//!
//! let envelope = ResultEnvelope::new(vec![1.0, 2.0]);
//! let json = envelope.to_json().unwrap();
//! let back: ResultEnvelope<Vec<f64>> = ResultEnvelope::from_json(&json).unwrap();
//! assert_eq!(back.schema_version, SCHEMA_VERSION);
//! ```

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};

/// Current schema version of serialized results (semver; major bumps break readers)
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Versioned wrapper around any serialized result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    /// Schema version the payload was written with
    pub schema_version: String,
    /// Unique identifier of the run that produced the payload
    pub run_id: Uuid,
    /// When the payload was produced
    pub generated_at: DateTime<Utc>,
    /// The result itself
    pub payload: T,
}

impl<T> ResultEnvelope<T> {
    /// Wrap a payload with the current schema version and a fresh run id.
    pub fn new(payload: T) -> Self {
        ResultEnvelope {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            payload,
        }
    }
}

impl<T: Serialize> ResultEnvelope<T> {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> CalcResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CalcError::serialization(e.to_string()))
    }
}

impl<T: DeserializeOwned> ResultEnvelope<T> {
    /// Parse JSON, rejecting payloads written with a different major version.
    pub fn from_json(s: &str) -> CalcResult<Self> {
        let envelope: ResultEnvelope<T> =
            serde_json::from_str(s).map_err(|e| CalcError::serialization(e.to_string()))?;
        if major(&envelope.schema_version) != major(SCHEMA_VERSION) {
            return Err(CalcError::VersionMismatch {
                found_version: envelope.schema_version,
                expected_version: SCHEMA_VERSION.to_string(),
            });
        }
        Ok(envelope)
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_roundtrip() {
        let envelope = ResultEnvelope::new("payload".to_string());
        let json = envelope.to_json().unwrap();
        assert!(json.contains("schema_version"));
        assert!(json.contains("run_id"));
        let back: ResultEnvelope<String> = ResultEnvelope::from_json(&json).unwrap();
        assert_eq!(back.payload, "payload");
        assert_eq!(back.run_id, envelope.run_id);
    }

    #[test]
    fn test_minor_version_accepted() {
        let mut envelope = ResultEnvelope::new(1u32);
        envelope.schema_version = "1.4.2".to_string();
        let json = envelope.to_json().unwrap();
        assert!(ResultEnvelope::<u32>::from_json(&json).is_ok());
    }

    #[test]
    fn test_major_version_rejected() {
        let mut envelope = ResultEnvelope::new(1u32);
        envelope.schema_version = "2.0.0".to_string();
        let json = envelope.to_json().unwrap();
        let err = ResultEnvelope::<u32>::from_json(&json).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_run_ids_unique() {
        let a = ResultEnvelope::new(());
        let b = ResultEnvelope::new(());
        assert_ne!(a.run_id, b.run_id);
    }
}
