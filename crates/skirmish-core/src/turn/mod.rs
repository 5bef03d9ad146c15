//! Turn-order policies.
//!
//! The manager never decides who acts next. It asks a [`TurnOrder`], chosen
//! when the combat is set up:
//!
//! - [`TurnQueue`] orders every living unit by initiative each round, for any
//!   mix of sides.
//! - [`AlternatingTurns`] runs a strict hero, enemy, troop, enemy, ... cycle
//!   for a player side made of one AP-metered hero and free-acting troops.
//!
//! Policies only read the roster. Turn-start bookkeeping (AP recovery,
//! dropping the defending stance) stays in the manager so both policies get
//! it for free.

mod alternating;
mod queue;

pub use alternating::{AlternatingTurns, Phase};
pub use queue::{TurnEntry, TurnQueue};

use crate::rng::CombatRng;
use crate::roster::Roster;
use crate::unit::UnitId;

/// The units taking part in one combat, split by side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineup {
    /// Player-controlled units, in the order the host listed them.
    pub players: Vec<UnitId>,
    /// Enemy units, in the order the host listed them.
    pub enemies: Vec<UnitId>,
}

impl Lineup {
    /// Creates a lineup.
    #[must_use]
    pub fn new(players: Vec<UnitId>, enemies: Vec<UnitId>) -> Self {
        Self { players, enemies }
    }

    /// Players first, then enemies.
    pub fn all(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.players.iter().chain(self.enemies.iter()).copied()
    }
}

/// Strategy deciding which unit acts next.
pub trait TurnOrder: Send {
    /// Resets all scheduling state for a new combat and returns the first
    /// unit to act.
    fn start(
        &mut self,
        lineup: &Lineup,
        roster: &dyn Roster,
        rng: &mut dyn CombatRng,
    ) -> Option<UnitId>;

    /// The unit whose turn it is.
    fn active_unit(&self) -> Option<UnitId>;

    /// Ends the active unit's turn and returns the next unit to act, or
    /// `None` when nobody can act.
    fn advance(&mut self, roster: &dyn Roster, rng: &mut dyn CombatRng) -> Option<UnitId>;

    /// Drops units that have died since the last call.
    ///
    /// If the active unit died, the policy either promotes the next unit in
    /// its place or leaves [`TurnOrder::active_unit`] empty until the next
    /// [`TurnOrder::advance`]. A promoted unit has not acted yet.
    fn remove_dead(&mut self, roster: &dyn Roster);

    /// Current round, starting at 1.
    fn round(&self) -> u32;

    /// Scheduled units in the order they will act, for display.
    fn order(&self) -> Vec<UnitId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineup_lists_players_first() {
        let lineup = Lineup::new(vec![UnitId::new(3)], vec![UnitId::new(1), UnitId::new(2)]);
        let all: Vec<_> = lineup.all().collect();
        assert_eq!(all, vec![UnitId::new(3), UnitId::new(1), UnitId::new(2)]);
    }
}
