//! Plain-data components carried by [`Unit`](super::Unit).

use serde::{Deserialize, Serialize};

/// Numeric combat stats.
///
/// Defaults match a basic infantry unit: attack 10, defense 0, speed 5,
/// range 1, no accuracy or evasion bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Raw damage per attack.
    pub attack: i32,
    /// Linear damage mitigation points.
    pub defense: i32,
    /// Base initiative.
    pub speed: i32,
    /// Attack range in tiles.
    pub range: i32,
    /// Hit-chance bonus in percentage points.
    pub accuracy: i32,
    /// Hit-chance penalty for attackers in percentage points.
    pub evasion: i32,
}

impl CombatStats {
    /// Creates a stat block with the four core stats and no accuracy/evasion.
    #[must_use]
    pub const fn new(attack: i32, defense: i32, speed: i32, range: i32) -> Self {
        Self {
            attack,
            defense,
            speed,
            range,
            accuracy: 0,
            evasion: 0,
        }
    }
}

impl Default for CombatStats {
    fn default() -> Self {
        Self::new(10, 0, 5, 1)
    }
}

/// Defensive stance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stance {
    /// Whether the unit is bracing.
    pub defending: bool,
    /// Incoming damage multiplier while bracing; `1.0` when not.
    pub damage_multiplier: f32,
}

impl Stance {
    /// A bracing stance with the given incoming-damage multiplier.
    #[must_use]
    pub const fn defending(damage_multiplier: f32) -> Self {
        Self {
            defending: true,
            damage_multiplier,
        }
    }
}

impl Default for Stance {
    fn default() -> Self {
        Self {
            defending: false,
            damage_multiplier: 1.0,
        }
    }
}
