//! Session-start error types.
//!
//! The simulation never fails mid-tick. Everything that can be wrong (bad
//! tuning values, unreadable config text) is rejected once, when a session is
//! created, and reported through [`SimError`].

use std::fmt;

/// Top-level error enum for the simulation core.
#[derive(Debug)]
pub enum SimError {
    /// A tuning or settings value is outside its accepted range.
    InvalidConfig {
        /// Name of the offending field (for logging).
        field: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },

    /// Configuration text could not be parsed.
    Parse {
        /// What was being parsed ("tuning", "settings").
        what: &'static str,
        source: serde_json::Error,
    },

    /// A lifecycle call arrived in a state that cannot honor it.
    Lifecycle {
        /// Human-readable description of the rejected transition.
        context: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidConfig {
                field,
                value,
                expected,
            } => write!(f, "config field '{}' = {} is outside {}", field, value, expected),
            SimError::Parse { what, source } => write!(f, "failed to parse {}: {}", what, source),
            SimError::Lifecycle { context } => write!(f, "invalid session transition: {}", context),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive and finite.
pub fn require_positive(field: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidConfig {
            field,
            value,
            expected: "(0, ∞)",
        })
    }
}

/// Returns an error unless `value` lies in `[0, 1]`.
pub fn require_fraction(field: &'static str, value: f32) -> SimResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidConfig {
            field,
            value,
            expected: "[0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive("x", 1.0).is_ok());
        assert!(require_positive("x", 0.0).is_err());
        assert!(require_positive("x", f32::NAN).is_err());
    }

    #[test]
    fn test_require_fraction() {
        assert!(require_fraction("x", 0.0).is_ok());
        assert!(require_fraction("x", 1.0).is_ok());
        assert!(require_fraction("x", 1.01).is_err());
    }

    #[test]
    fn test_display_mentions_field() {
        let err = require_positive("spawn_interval", -3.0).unwrap_err();
        assert!(err.to_string().contains("spawn_interval"));
    }
}
