//! Strict role alternation.
//!
//! The player side is one AP-metered hero plus any number of free-acting
//! troops. Each round runs:
//!
//! ```text
//! Hero -> Enemy -> Troop 1 -> Enemy -> Troop 2 -> Enemy -> ... -> Troop N -> Enemy
//! ```
//!
//! after which the next round starts with the hero again. Every player turn is
//! followed by exactly one enemy turn; enemies take those turns in listed
//! order, wrapping around when there are fewer enemies than player units, and
//! the enemy cursor restarts at each new round. If the hero is dead the round
//! starts directly with the first living troop.
//!
//! The hero is the first listed player unit that carries an AP pool, unless
//! one is picked explicitly with [`AlternatingTurns::with_hero`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Lineup, TurnOrder};
use crate::rng::CombatRng;
use crate::roster::Roster;
use crate::unit::UnitId;

/// Which kind of unit is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The hero's turn.
    Hero,
    /// A troop's turn.
    Troop,
    /// An enemy's turn.
    Enemy,
    /// One side has nobody left.
    Ended,
}

/// Hero / enemy / troop / enemy alternation.
#[derive(Debug, Clone)]
pub struct AlternatingTurns {
    preferred_hero: Option<UnitId>,
    hero: Option<UnitId>,
    troops: Vec<UnitId>,
    enemies: Vec<UnitId>,
    phase: Phase,
    round: u32,
    troop_cursor: usize,
    enemy_cursor: usize,
    active: Option<UnitId>,
}

impl AlternatingTurns {
    /// Creates the policy; the hero is chosen when combat starts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preferred_hero: None,
            hero: None,
            troops: Vec::new(),
            enemies: Vec::new(),
            phase: Phase::Ended,
            round: 1,
            troop_cursor: 0,
            enemy_cursor: 0,
            active: None,
        }
    }

    /// Uses `hero` as the hero if it is on the player side.
    #[must_use]
    pub fn with_hero(mut self, hero: UnitId) -> Self {
        self.preferred_hero = Some(hero);
        self
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The hero chosen for this combat.
    #[must_use]
    pub const fn hero(&self) -> Option<UnitId> {
        self.hero
    }

    /// Troops in acting order.
    #[must_use]
    pub fn troops(&self) -> &[UnitId] {
        &self.troops
    }

    /// Returns `true` during a hero or troop turn.
    #[must_use]
    pub const fn is_player_turn(&self) -> bool {
        matches!(self.phase, Phase::Hero | Phase::Troop)
    }

    fn any_alive(units: &[UnitId], roster: &dyn Roster) -> bool {
        units.iter().any(|id| roster.is_alive(*id))
    }

    fn sides_standing(&self, roster: &dyn Roster) -> bool {
        let players = self.hero.is_some_and(|h| roster.is_alive(h))
            || Self::any_alive(&self.troops, roster);
        players && Self::any_alive(&self.enemies, roster)
    }

    fn end(&mut self) -> Option<UnitId> {
        self.phase = Phase::Ended;
        self.active = None;
        None
    }

    fn activate(&mut self, phase: Phase, unit: UnitId) -> Option<UnitId> {
        self.phase = phase;
        self.active = Some(unit);
        trace!(unit = %unit, ?phase, round = self.round, "unit activated");
        self.active
    }

    fn activate_enemy(&mut self, roster: &dyn Roster) -> Option<UnitId> {
        let count = self.enemies.len();
        for offset in 0..count {
            let slot = (self.enemy_cursor + offset) % count;
            let unit = self.enemies[slot];
            if roster.is_alive(unit) {
                self.enemy_cursor = slot;
                return self.activate(Phase::Enemy, unit);
            }
        }
        self.end()
    }

    fn activate_troop(&mut self, roster: &dyn Roster) -> Option<UnitId> {
        while let Some(&unit) = self.troops.get(self.troop_cursor) {
            if roster.is_alive(unit) {
                return self.activate(Phase::Troop, unit);
            }
            self.troop_cursor += 1;
        }
        None
    }

    fn start_round(&mut self, roster: &dyn Roster) -> Option<UnitId> {
        self.troop_cursor = 0;
        self.enemy_cursor = 0;
        if let Some(hero) = self.hero.filter(|h| roster.is_alive(*h)) {
            return self.activate(Phase::Hero, hero);
        }
        match self.activate_troop(roster) {
            Some(unit) => Some(unit),
            None => self.end(),
        }
    }
}

impl Default for AlternatingTurns {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnOrder for AlternatingTurns {
    fn start(
        &mut self,
        lineup: &Lineup,
        roster: &dyn Roster,
        _rng: &mut dyn CombatRng,
    ) -> Option<UnitId> {
        let metered = |id: &UnitId| {
            roster
                .get(*id)
                .is_some_and(|unit| unit.action_points().is_some())
        };
        self.hero = self
            .preferred_hero
            .filter(|h| lineup.players.contains(h))
            .or_else(|| lineup.players.iter().copied().find(|id| metered(id)));
        self.troops = lineup
            .players
            .iter()
            .copied()
            .filter(|id| Some(*id) != self.hero)
            .collect();
        self.enemies = lineup.enemies.clone();
        self.round = 1;

        if !self.sides_standing(roster) {
            return self.end();
        }
        self.start_round(roster)
    }

    fn active_unit(&self) -> Option<UnitId> {
        self.active
    }

    fn advance(&mut self, roster: &dyn Roster, _rng: &mut dyn CombatRng) -> Option<UnitId> {
        if !self.sides_standing(roster) {
            return self.end();
        }
        match self.phase {
            Phase::Hero => self.activate_enemy(roster),
            Phase::Troop => {
                self.troop_cursor += 1;
                self.activate_enemy(roster)
            }
            Phase::Enemy => {
                self.enemy_cursor += 1;
                if let Some(unit) = self.activate_troop(roster) {
                    return Some(unit);
                }
                self.round += 1;
                self.start_round(roster)
            }
            Phase::Ended => None,
        }
    }

    fn remove_dead(&mut self, roster: &dyn Roster) {
        if self.active.is_some_and(|unit| !roster.is_alive(unit)) {
            self.active = None;
        }
    }

    fn round(&self) -> u32 {
        self.round
    }

    fn order(&self) -> Vec<UnitId> {
        self.hero
            .iter()
            .chain(self.troops.iter())
            .chain(self.enemies.iter())
            .copied()
            .collect()
    }
}
