//! Notifications raised by the combat manager.
//!
//! The manager queues a [`CombatEvent`] for every turn change, executed
//! action, death and combat end. Presentation and AI layers drain the queue
//! with [`CombatManager::take_events`](crate::manager::CombatManager::take_events)
//! after each call. Events are recorded in the order they happen.
//!
//! [`CombatLog`] keeps the matching human-readable lines, bounded so a long
//! fight does not grow it without limit.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::action::{ActionKind, ActionResult};
use crate::unit::{Side, UnitId};

/// Something observable that happened during combat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Combat began with these units.
    CombatStarted {
        /// Player units taking part.
        players: Vec<UnitId>,
        /// Enemy units taking part.
        enemies: Vec<UnitId>,
    },
    /// A new round began.
    RoundStarted {
        /// Round number, starting at 1.
        round: u32,
    },
    /// A unit became active.
    TurnStarted {
        /// The active unit.
        unit: UnitId,
        /// Its side.
        side: Side,
        /// Current round.
        round: u32,
    },
    /// An action ran, successfully or not.
    ActionExecuted {
        /// Acting unit.
        performer: UnitId,
        /// Action kind.
        kind: ActionKind,
        /// What happened.
        result: ActionResult,
    },
    /// A unit's health reached zero.
    UnitDied {
        /// The fallen unit.
        unit: UnitId,
        /// Its side.
        side: Side,
    },
    /// A unit's turn is over.
    TurnEnded {
        /// The unit whose turn ended.
        unit: UnitId,
    },
    /// Combat is over.
    CombatEnded {
        /// Side with units still standing, if any.
        winner: Option<Side>,
    },
}

impl CombatEvent {
    /// Returns `true` for [`CombatEvent::CombatEnded`].
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::CombatEnded { .. })
    }
}

/// Bounded list of log lines, oldest dropped first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl CombatLog {
    /// Creates an empty log holding at most `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends a line, dropping the oldest if full.
    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    /// The last `n` lines, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<&str> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(String::as_str).collect()
    }

    /// All retained lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of retained lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of retained lines.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CombatLog {
    fn default() -> Self {
        Self::new(100)
    }
}
