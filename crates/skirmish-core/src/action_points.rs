//! Per-combatant action point pool.
//!
//! Every AP-metered combatant carries one [`ActionPoints`] value. Actions are
//! paid for up front with [`ActionPoints::spend`], which is atomic: it either
//! deducts the full effective cost or leaves the pool untouched.
//!
//! # Invariant
//!
//! `0 <= current <= maximum` after every operation, including modifier
//! changes that shrink the maximum.
//!
//! # Example
//!
//! ```
//! use skirmish_core::action_points::ActionPoints;
//!
//! let mut ap = ActionPoints::new(10, 5);
//! assert!(ap.spend(3));
//! assert_eq!(ap.current(), 7);
//!
//! ap.set_cost_multiplier(2.0);
//! assert!(!ap.can_afford(4)); // 8 > 7
//! assert_eq!(ap.current(), 7);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::ActionKind;

/// Default maximum AP for a freshly created pool.
pub const DEFAULT_MAX_AP: u32 = 8;
/// Default AP recovered at the start of each of the owner's turns.
pub const DEFAULT_RECOVERY: u32 = 5;
/// Floor for the cost multiplier.
pub const MIN_COST_MULTIPLIER: f32 = 0.1;

/// Action point pool with temporary modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPoints {
    base_max: u32,
    base_recovery: u32,
    current: u32,
    bonus_max: i32,
    bonus_recovery: i32,
    cost_multiplier: f32,
}

impl ActionPoints {
    /// Creates a full pool.
    #[must_use]
    pub fn new(max_ap: u32, recovery_per_turn: u32) -> Self {
        Self {
            base_max: max_ap,
            base_recovery: recovery_per_turn,
            current: max_ap,
            bonus_max: 0,
            bonus_recovery: 0,
            cost_multiplier: 1.0,
        }
    }

    /// Currently available AP.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum AP including bonuses, never negative.
    #[must_use]
    pub fn maximum(&self) -> u32 {
        Self::apply_bonus(self.base_max, self.bonus_max)
    }

    /// AP recovered per turn including bonuses.
    #[must_use]
    pub fn recovery(&self) -> u32 {
        Self::apply_bonus(self.base_recovery, self.bonus_recovery)
    }

    /// Current cost multiplier.
    #[must_use]
    pub const fn cost_multiplier(&self) -> f32 {
        self.cost_multiplier
    }

    /// Returns `true` when no AP is left.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Effective cost after the multiplier, truncated toward zero.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn effective_cost(&self, cost: u32) -> u32 {
        (cost as f32 * self.cost_multiplier) as u32
    }

    /// Returns `true` if `cost` (after the multiplier) can be paid.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.current >= self.effective_cost(cost)
    }

    /// Pays `cost` (after the multiplier). All-or-nothing.
    pub fn spend(&mut self, cost: u32) -> bool {
        let actual = self.effective_cost(cost);
        if self.current < actual {
            return false;
        }
        self.current -= actual;
        true
    }

    /// Recovers the per-turn amount, capped at maximum.
    pub fn recover(&mut self) {
        self.recover_by(self.recovery());
    }

    /// Recovers `amount`, capped at maximum.
    pub fn recover_by(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.maximum());
    }

    /// Clears all modifiers and refills to maximum.
    pub fn reset(&mut self) {
        self.clear_modifiers();
        self.current = self.maximum();
    }

    /// Adds (or with a negative value, removes) bonus maximum AP.
    pub fn add_bonus_max_ap(&mut self, bonus: i32) {
        self.bonus_max = self.bonus_max.saturating_add(bonus);
        self.current = self.current.min(self.maximum());
    }

    /// Adds (or removes) bonus per-turn recovery.
    pub fn add_bonus_recovery(&mut self, bonus: i32) {
        self.bonus_recovery = self.bonus_recovery.saturating_add(bonus);
    }

    /// Scales every cost; clamped to at least [`MIN_COST_MULTIPLIER`].
    pub fn set_cost_multiplier(&mut self, multiplier: f32) {
        self.cost_multiplier = if multiplier.is_nan() {
            1.0
        } else {
            multiplier.max(MIN_COST_MULTIPLIER)
        };
    }

    /// Drops all temporary modifiers. The maximum may shrink, so `current` is
    /// clamped back under it.
    pub fn clear_modifiers(&mut self) {
        self.bonus_max = 0;
        self.bonus_recovery = 0;
        self.cost_multiplier = 1.0;
        self.current = self.current.min(self.maximum());
    }

    /// Effective cost of a kind of action from the base cost table.
    #[must_use]
    pub fn get_cost(&self, kind: ActionKind) -> u32 {
        self.effective_cost(kind.base_cost())
    }

    fn apply_bonus(base: u32, bonus: i32) -> u32 {
        let total = i64::from(base) + i64::from(bonus);
        u32::try_from(total.max(0)).unwrap_or(u32::MAX)
    }
}

impl Default for ActionPoints {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AP, DEFAULT_RECOVERY)
    }
}

impl fmt::Display for ActionPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AP({}/{})", self.current, self.maximum())
    }
}
