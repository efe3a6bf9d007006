//! Configuration errors
//!
//! The simulation itself never fails a tick; anything that can go wrong is
//! caught here, once, while settings and scenes are loaded.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Reject NaN/infinite and non-positive values
pub(crate) fn require_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::invalid(field, format!("{value} is not finite")));
    }
    if value <= 0.0 {
        return Err(ConfigError::invalid(field, format!("{value} must be > 0")));
    }
    Ok(())
}
