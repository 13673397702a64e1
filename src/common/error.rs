//! Setup and configuration errors.
//!
//! Gameplay rules never fail: bad numeric input is clamped and missing
//! collaborators turn operations into no-ops. The only errors that surface are
//! configuration problems found while loading tunables or before spawning a
//! shot.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tunables: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("tunable '{name}' = {value} is outside {expected}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },
}

pub type SetupResult<T> = Result<T, SetupError>;

/// `value` must be finite and strictly positive.
pub fn require_positive(name: &'static str, value: f32) -> SetupResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SetupError::OutOfRange { name, value, expected: "(0, inf)" })
    }
}

/// `value` must be finite and not negative.
pub fn require_non_negative(name: &'static str, value: f32) -> SetupResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SetupError::OutOfRange { name, value, expected: "[0, inf)" })
    }
}
