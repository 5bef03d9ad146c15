//! Combatant identity and the capability interface the engine works through.
//!
//! The engine never owns units. It holds [`UnitId`] handles and reaches the
//! units through a [`Roster`](crate::roster::Roster), which hands out
//! `&dyn Combatant` / `&mut dyn Combatant` views. Everything the engine needs
//! from a unit is spelled out on the [`Combatant`] trait; optional capabilities
//! (action points, inventory, accuracy, evasion) have documented defaults so a
//! minimal implementation only supplies the required stats.
//!
//! The engine mutates a combatant only through [`Combatant::take_damage`],
//! [`Combatant::move_to`] and [`Combatant::set_defending`].
//!
//! # Example
//!
//! ```
//! use skirmish_core::unit::{Combatant, Side, Unit, UnitId};
//!
//! let mut grunt = Unit::new(UnitId::new(1), "Grunt", Side::Enemy).with_health(30);
//! assert!(grunt.is_alive());
//!
//! let applied = grunt.take_damage(45);
//! assert_eq!(applied, 30);
//! assert!(!grunt.is_alive());
//! ```

pub mod components;

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::action_points::ActionPoints;
use crate::item::Item;

pub use components::{CombatStats, Stance};

/// Handle for a combatant in externally-owned storage.
///
/// Ordered by numeric value so any collection keyed by `UnitId` iterates the
/// same way on every run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(u64);

impl UnitId {
    /// Creates a new `UnitId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// The side (faction/owner) a combatant fights for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Controlled by the player through the UI.
    Player,
    /// Controlled by an [`EnemyController`](crate::ai::EnemyController).
    Enemy,
}

impl Side {
    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Enemy => write!(f, "enemy"),
        }
    }
}

/// Capability interface for anything that takes part in combat.
///
/// Required methods cover identity, liveness, core stats, position and the
/// three mutators the engine uses. Optional capabilities default as follows:
///
/// | Capability        | Default                         |
/// |-------------------|---------------------------------|
/// | `action_points`   | `None` (acts for free)          |
/// | `inventory`       | empty                           |
/// | `accuracy`        | `0`                             |
/// | `evasion`         | `0`                             |
/// | `restore_health`  | no-op, returns `0`              |
pub trait Combatant {
    /// Stable handle for this combatant.
    fn id(&self) -> UnitId;

    /// Display name used in log lines.
    fn name(&self) -> &str;

    /// The side this combatant belongs to.
    fn owner(&self) -> Side;

    /// Current health.
    fn health(&self) -> i32;

    /// Maximum health.
    fn max_health(&self) -> i32;

    /// Returns `true` while the combatant can still act and be targeted.
    fn is_alive(&self) -> bool {
        self.health() > 0
    }

    /// Base attack value, used as the raw damage of an attack.
    fn attack(&self) -> i32;

    /// Defense value; each point mitigates a fixed share of incoming damage.
    fn defense(&self) -> i32;

    /// Speed, the base of turn initiative.
    fn speed(&self) -> i32;

    /// Attack range in tiles.
    fn range(&self) -> i32;

    /// World position.
    fn position(&self) -> Vec2;

    /// Applies already-mitigated damage. Returns the health actually removed.
    fn take_damage(&mut self, amount: i32) -> i32;

    /// Moves to a world position.
    fn move_to(&mut self, position: Vec2);

    /// Enters or leaves the defending stance.
    ///
    /// `multiplier` scales incoming damage while defending (0.5 halves it).
    fn set_defending(&mut self, defending: bool, multiplier: f32);

    /// Returns `true` while in the defending stance.
    fn is_defending(&self) -> bool;

    /// Damage multiplier applied while defending.
    fn defense_multiplier(&self) -> f32;

    /// Action point pool, if this combatant is AP-metered.
    fn action_points(&self) -> Option<&ActionPoints> {
        None
    }

    /// Mutable action point pool, if this combatant is AP-metered.
    fn action_points_mut(&mut self) -> Option<&mut ActionPoints> {
        None
    }

    /// Items carried into combat.
    fn inventory(&self) -> &[Arc<dyn Item>] {
        &[]
    }

    /// Accuracy bonus, one percentage point of hit chance per point.
    fn accuracy(&self) -> i32 {
        0
    }

    /// Evasion, one percentage point of hit chance removed per point.
    fn evasion(&self) -> i32 {
        0
    }

    /// Restores health, capped at maximum. Returns the amount restored.
    ///
    /// Only items call this; the engine itself never heals.
    fn restore_health(&mut self, _amount: i32) -> i32 {
        0
    }
}

/// Ready-made combatant with every optional capability filled in.
///
/// Hosts with their own entity types implement [`Combatant`] directly; `Unit`
/// covers the common case and the test suites.
#[derive(Debug, Clone)]
pub struct Unit {
    id: UnitId,
    name: String,
    owner: Side,
    health: i32,
    max_health: i32,
    stats: CombatStats,
    position: Vec2,
    stance: Stance,
    action_points: Option<ActionPoints>,
    inventory: Vec<Arc<dyn Item>>,
}

impl Unit {
    /// Creates a unit with 100 health, default stats, at the origin, with no
    /// action point pool and an empty inventory.
    #[must_use]
    pub fn new(id: UnitId, name: impl Into<String>, owner: Side) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            health: 100,
            max_health: 100,
            stats: CombatStats::default(),
            position: Vec2::ZERO,
            stance: Stance::default(),
            action_points: None,
            inventory: Vec::new(),
        }
    }

    /// Sets both current and maximum health.
    #[must_use]
    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self.max_health = health;
        self
    }

    /// Replaces the stat block.
    #[must_use]
    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    /// Places the unit at a world position.
    #[must_use]
    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Makes the unit AP-metered.
    #[must_use]
    pub fn with_action_points(mut self, action_points: ActionPoints) -> Self {
        self.action_points = Some(action_points);
        self
    }

    /// Adds an item to the inventory.
    #[must_use]
    pub fn with_item(mut self, item: Arc<dyn Item>) -> Self {
        self.inventory.push(item);
        self
    }

    /// Returns the stat block.
    #[must_use]
    pub const fn stats(&self) -> &CombatStats {
        &self.stats
    }

    /// Returns the current stance.
    #[must_use]
    pub const fn stance(&self) -> Stance {
        self.stance
    }

    /// Overrides current health without touching the maximum.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }
}

impl Combatant for Unit {
    fn id(&self) -> UnitId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> Side {
        self.owner
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn max_health(&self) -> i32 {
        self.max_health
    }

    fn attack(&self) -> i32 {
        self.stats.attack
    }

    fn defense(&self) -> i32 {
        self.stats.defense
    }

    fn speed(&self) -> i32 {
        self.stats.speed
    }

    fn range(&self) -> i32 {
        self.stats.range
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn take_damage(&mut self, amount: i32) -> i32 {
        let applied = amount.clamp(0, self.health);
        self.health -= applied;
        applied
    }

    fn move_to(&mut self, position: Vec2) {
        self.position = position;
    }

    fn set_defending(&mut self, defending: bool, multiplier: f32) {
        self.stance = if defending {
            Stance::defending(multiplier)
        } else {
            Stance::default()
        };
    }

    fn is_defending(&self) -> bool {
        self.stance.defending
    }

    fn defense_multiplier(&self) -> f32 {
        self.stance.damage_multiplier
    }

    fn action_points(&self) -> Option<&ActionPoints> {
        self.action_points.as_ref()
    }

    fn action_points_mut(&mut self) -> Option<&mut ActionPoints> {
        self.action_points.as_mut()
    }

    fn inventory(&self) -> &[Arc<dyn Item>] {
        &self.inventory
    }

    fn accuracy(&self) -> i32 {
        self.stats.accuracy
    }

    fn evasion(&self) -> i32 {
        self.stats.evasion
    }

    fn restore_health(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(self.max_health);
        self.health - before
    }
}
