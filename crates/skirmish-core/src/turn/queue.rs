//! Initiative round-robin.
//!
//! Every living unit gets `speed + uniform(-jitter, jitter)` initiative and
//! the queue is sorted highest first. Units act in that order; once the last
//! one has acted a new round starts and initiative is rolled again.
//!
//! # Invariants
//!
//! - No unit appears twice.
//! - The round number never decreases.
//! - A unit removed by [`TurnQueue::remove_dead_units`] never comes back.
//!
//! # Determinism
//!
//! The sort is stable, so units with equal initiative keep the order they
//! were listed in. Given the same roster and the same RNG sequence the queue
//! always comes out the same.
//!
//! # Example
//!
//! ```
//! use skirmish_core::roster::UnitRoster;
//! use skirmish_core::rng::SeededRng;
//! use skirmish_core::turn::TurnQueue;
//! use skirmish_core::unit::{Side, Unit};
//!
//! let mut roster = UnitRoster::new();
//! let a = roster.spawn(|id| Unit::new(id, "a", Side::Player));
//! let b = roster.spawn(|id| Unit::new(id, "b", Side::Enemy));
//!
//! let mut rng = SeededRng::new(9);
//! let mut queue = TurnQueue::new().with_jitter(0);
//! queue.build_queue(&[a, b], &roster, &mut rng);
//!
//! assert_eq!(queue.active_unit(), Some(a));
//! assert_eq!(queue.next_turn(&roster, &mut rng), Some(b));
//! assert_eq!(queue.next_turn(&roster, &mut rng), Some(a));
//! assert_eq!(queue.round_number(), 2);
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Lineup, TurnOrder};
use crate::rng::CombatRng;
use crate::roster::Roster;
use crate::unit::UnitId;

/// Default initiative jitter.
pub const DEFAULT_JITTER: i32 = 2;

/// One unit's slot in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEntry {
    /// The unit.
    pub unit: UnitId,
    /// Initiative this round.
    pub initiative: i32,
    /// Round this entry belongs to.
    pub round: u32,
    /// Whether the unit has acted this round.
    pub has_acted: bool,
}

/// Initiative-ordered turn queue.
#[derive(Debug, Clone)]
pub struct TurnQueue {
    entries: Vec<TurnEntry>,
    index: usize,
    round: u32,
    jitter: i32,
}

impl TurnQueue {
    /// Empty queue with the default jitter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            round: 1,
            jitter: DEFAULT_JITTER,
        }
    }

    /// Sets the initiative jitter. Negative values are treated as zero.
    #[must_use]
    pub fn with_jitter(mut self, jitter: i32) -> Self {
        self.jitter = jitter.max(0);
        self
    }

    /// Rebuilds the queue from `units`, skipping dead or unknown ones, and
    /// returns the first to act.
    pub fn build_queue(
        &mut self,
        units: &[UnitId],
        roster: &dyn Roster,
        rng: &mut dyn CombatRng,
    ) -> Option<UnitId> {
        self.round = 1;
        self.index = 0;
        self.entries.clear();
        for &unit in units {
            if !roster.is_alive(unit) || self.entries.iter().any(|e| e.unit == unit) {
                continue;
            }
            self.entries.push(TurnEntry {
                unit,
                initiative: 0,
                round: self.round,
                has_acted: false,
            });
        }
        self.roll_initiative(roster, rng);
        self.active_unit()
    }

    /// Marks the active unit as done and moves to the next living one,
    /// starting a new round when the queue runs out.
    pub fn next_turn(&mut self, roster: &dyn Roster, rng: &mut dyn CombatRng) -> Option<UnitId> {
        if self.entries.is_empty() {
            return None;
        }
        if let Some(entry) = self.entries.get_mut(self.index) {
            entry.has_acted = true;
        }
        self.index += 1;
        while self
            .entries
            .get(self.index)
            .is_some_and(|e| !roster.is_alive(e.unit))
        {
            self.index += 1;
        }
        if self.index >= self.entries.len() {
            self.start_new_round(roster, rng);
        }
        self.active_unit()
    }

    /// Drops dead units. The active unit keeps its turn if it is still alive;
    /// otherwise the next living unit in the queue becomes active.
    pub fn remove_dead_units(&mut self, roster: &dyn Roster) {
        let active = self.active_unit();
        let survivors_before = self.entries[..self.index.min(self.entries.len())]
            .iter()
            .filter(|e| roster.is_alive(e.unit))
            .count();
        self.entries.retain(|e| roster.is_alive(e.unit));

        self.index = active
            .and_then(|unit| self.entries.iter().position(|e| e.unit == unit))
            .unwrap_or(survivors_before);
    }

    /// The unit whose turn it is.
    #[must_use]
    pub fn active_unit(&self) -> Option<UnitId> {
        self.entries.get(self.index).map(|e| e.unit)
    }

    /// Current round, starting at 1.
    #[must_use]
    pub const fn round_number(&self) -> u32 {
        self.round
    }

    /// Entries in acting order.
    #[must_use]
    pub fn entries(&self) -> &[TurnEntry] {
        &self.entries
    }

    /// `(unit, initiative, is_active)` rows for a turn-order panel.
    #[must_use]
    pub fn queue_display(&self) -> Vec<(UnitId, i32, bool)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.unit, e.initiative, i == self.index))
            .collect()
    }

    /// Entries in the queue, including any that died since the last purge.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the queue has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose unit is still alive.
    #[must_use]
    pub fn living_count(&self, roster: &dyn Roster) -> usize {
        self.entries
            .iter()
            .filter(|e| roster.is_alive(e.unit))
            .count()
    }

    fn start_new_round(&mut self, roster: &dyn Roster, rng: &mut dyn CombatRng) {
        self.entries.retain(|e| roster.is_alive(e.unit));
        self.index = 0;
        if self.entries.is_empty() {
            return;
        }
        self.round += 1;
        self.roll_initiative(roster, rng);
        trace!(round = self.round, units = self.entries.len(), "new round");
    }

    fn roll_initiative(&mut self, roster: &dyn Roster, rng: &mut dyn CombatRng) {
        let round = self.round;
        let jitter = self.jitter;
        for entry in &mut self.entries {
            let speed = roster.get(entry.unit).map_or(0, |unit| unit.speed());
            entry.initiative = speed + rng.range_inclusive(-jitter, jitter);
            entry.round = round;
            entry.has_acted = false;
        }
        self.entries.sort_by(|a, b| b.initiative.cmp(&a.initiative));
    }
}

impl Default for TurnQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnOrder for TurnQueue {
    fn start(
        &mut self,
        lineup: &Lineup,
        roster: &dyn Roster,
        rng: &mut dyn CombatRng,
    ) -> Option<UnitId> {
        let units: Vec<UnitId> = lineup.all().collect();
        self.build_queue(&units, roster, rng)
    }

    fn active_unit(&self) -> Option<UnitId> {
        TurnQueue::active_unit(self)
    }

    fn advance(&mut self, roster: &dyn Roster, rng: &mut dyn CombatRng) -> Option<UnitId> {
        self.next_turn(roster, rng)
    }

    fn remove_dead(&mut self, roster: &dyn Roster) {
        self.remove_dead_units(roster);
    }

    fn round(&self) -> u32 {
        self.round
    }

    fn order(&self) -> Vec<UnitId> {
        self.entries.iter().map(|e| e.unit).collect()
    }
}
