//! # Skirmish Core
//!
//! Turn-based tactical combat resolution for Skirmish.
//!
//! This crate decides what happens when units fight: who acts next, what an
//! action costs, whether it hits, where, and for how much. Rendering, input
//! and the map itself live in the host; the engine reaches them only through
//! the traits below.
//!
//! ## Architecture
//!
//! - **Combatants**: anything implementing [`unit::Combatant`], looked up by
//!   [`unit::UnitId`] through a [`roster::Roster`]
//! - **Actions**: immutable [`action::CombatAction`] values that validate and
//!   execute atomically against an [`action::ActionContext`]
//! - **Resolution**: [`damage::DamageSystem`] (body zones, hit, critical,
//!   mitigation) and [`action_points::ActionPoints`]
//! - **Flow**: [`manager::CombatManager`] drives a replaceable
//!   [`turn::TurnOrder`] and [`ai::EnemyController`], and reports through
//!   [`event::CombatEvent`]
//!
//! All randomness comes from an injected [`rng::CombatRng`]; the same seed and
//! the same inputs replay the same fight.
//!
//! ## Usage
//!
//! ```
//! use glam::Vec2;
//! use skirmish_core::prelude::*;
//!
//! let mut roster = UnitRoster::new();
//! let hero = roster.spawn(|id| {
//!     Unit::new(id, "Hero", Side::Player).with_action_points(ActionPoints::default())
//! });
//! let grunt = roster.spawn(|id| Unit::new(id, "Grunt", Side::Enemy).at(Vec2::new(4.0, 0.0)));
//!
//! let mut combat = CombatManager::new(42);
//! combat.start_combat(&mut roster, &[hero], &[grunt]).unwrap();
//!
//! while combat.state() != CombatState::Ended && combat.round() < 5 {
//!     if combat.is_player_turn() {
//!         combat.skip_turn(&mut roster);
//!     } else {
//!         combat.run_enemy_turn(&mut roster);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod action_points;
pub mod ai;
pub mod board;
pub mod config;
pub mod damage;
pub mod error;
pub mod event;
pub mod item;
pub mod manager;
pub mod rng;
pub mod roster;
pub mod targeting;
pub mod turn;
pub mod unit;

pub use error::{CombatError, ConfigError, Result};

/// The types most hosts need.
pub mod prelude {
    pub use crate::action::{
        Action, ActionKind, ActionOutcome, ActionResult, Attack, CombatAction, Defend, Move, Skip,
        UseItem, Weapon,
    };
    pub use crate::action_points::ActionPoints;
    pub use crate::ai::{ApproachAndStrike, EnemyController};
    pub use crate::board::{Board, OpenBoard};
    pub use crate::config::CombatConfig;
    pub use crate::damage::{BodyZone, DamageResult, DamageSystem};
    pub use crate::event::CombatEvent;
    pub use crate::manager::{CombatManager, CombatState};
    pub use crate::rng::{CombatRng, SeededRng};
    pub use crate::roster::{Roster, UnitRoster};
    pub use crate::turn::{AlternatingTurns, TurnOrder, TurnQueue};
    pub use crate::unit::{Combatant, Side, Unit, UnitId};
}

#[cfg(test)]
mod tests;
