//! Setup and configuration errors.
//!
//! Gameplay failures (no AP, bad target, wrong turn) are not errors: they come
//! back as [`ActionResult`](crate::action::ActionResult) values and never touch
//! state. The types here cover the few places where the host itself passed
//! something unusable.

use thiserror::Error;

use crate::unit::UnitId;

/// Rejected tuning values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Body-zone weights must sum to exactly 100.
    #[error("zone weights sum to {0}, expected 100")]
    ZoneWeights(u32),

    /// A multiplier or step that must be non-negative was negative or NaN.
    #[error("{field} must be a non-negative number, got {value}")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: f64,
    },

    /// A probability was outside `[0, 1]`.
    #[error("{field} must lie in [0, 1], got {value}")]
    Probability {
        /// Offending field.
        field: &'static str,
        /// Value supplied.
        value: f64,
    },

    /// Hit-chance clamp bounds are inverted.
    #[error("hit chance floor {min} exceeds ceiling {max}")]
    HitClamp {
        /// Floor.
        min: f64,
        /// Ceiling.
        max: f64,
    },

    /// The JSON document did not parse.
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Rejected combat setup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombatError {
    /// The roster has no combatant with this id.
    #[error("unit {0} is not in the roster")]
    UnknownUnit(UnitId),

    /// The same unit was listed twice, or on both sides.
    #[error("unit {0} is listed more than once")]
    DuplicateUnit(UnitId),

    /// A unit's owner disagrees with the side it was listed on.
    #[error("unit {0} was listed on the wrong side")]
    WrongSide(UnitId),
}

/// Result alias for combat setup.
pub type Result<T, E = CombatError> = std::result::Result<T, E>;
