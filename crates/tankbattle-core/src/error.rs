//! Error types for configuration and scenario loading.
//!
//! Gameplay operations never fail: a destroyed target, a failed spawn or an
//! unreachable patrol point all degrade to a no-op. Errors only exist on the
//! way in, when tuning values or scenario files are rejected before a
//! simulation is built from them.

use thiserror::Error;

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while validating configuration or parsing scenarios.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero or negative.
    #[error("{field} must be greater than zero, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A value that must be zero or positive was negative.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A value was NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The attack range reaches further than the detection range.
    #[error("attack range {attack_range} exceeds detection range {detection_range}")]
    RangeOrder {
        /// Configured attack range.
        attack_range: f32,
        /// Configured detection range.
        detection_range: f32,
    },

    /// The walkable bounds are empty or inverted.
    #[error("world bounds are empty: min {min:?}, max {max:?}")]
    EmptyBounds {
        /// Minimum corner (x, y).
        min: [f32; 2],
        /// Maximum corner (x, y).
        max: [f32; 2],
    },

    /// Scenario JSON could not be parsed.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

/// Checks that `value` is finite and not negative.
pub(crate) fn ensure_non_negative(field: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}
