//! Enemy decision making.
//!
//! The manager asks an [`EnemyController`] for one action at a time while an
//! enemy unit is active. Returning `None` ends that unit's turn.

use std::cmp::Ordering;

use glam::Vec2;

use crate::action::{Action, ActionOutcome, ActionView, Attack, CombatAction, Move};
use crate::targeting::{TargetQuery, TargetingSystem};
use crate::unit::{Combatant, UnitId};

/// Picks actions for enemy units.
pub trait EnemyController: Send {
    /// Next action for `unit`, or `None` to end its turn.
    fn next_action(&mut self, unit: UnitId, view: &ActionView<'_>) -> Option<CombatAction>;
}

/// Attack the nearest living opponent when it is in reach, otherwise step
/// towards it.
///
/// A step is only taken if it is affordable, lands on a free tile and gets
/// strictly closer. An opponent that is in reach but unaffordable ends the
/// turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproachAndStrike;

impl ApproachAndStrike {
    fn approach(unit: UnitId, from: Vec2, goal: Vec2, view: &ActionView<'_>) -> Option<CombatAction> {
        let current = from.distance(goal);
        let step = view
            .board
            .neighbors(from)
            .into_iter()
            .filter(|tile| !view.roster.is_occupied(*tile))
            .filter(|tile| tile.distance(goal) < current)
            .min_by(|a, b| {
                a.distance(goal)
                    .partial_cmp(&b.distance(goal))
                    .unwrap_or(Ordering::Equal)
            })?;

        let walk = Move::new(unit, step);
        walk.can_execute(view).then(|| walk.into())
    }
}

impl EnemyController for ApproachAndStrike {
    fn next_action(&mut self, unit: UnitId, view: &ActionView<'_>) -> Option<CombatAction> {
        let me = view.roster.get(unit).filter(|me| me.is_alive())?;

        let ids = view.roster.ids();
        let candidates: Vec<&dyn Combatant> =
            ids.iter().filter_map(|id| view.roster.get(*id)).collect();
        let foes =
            TargetingSystem::get_valid_targets(me, &candidates, &TargetQuery::enemies(), view.board);
        let target = TargetingSystem::get_nearest_target(me, &foes)?;

        let strike = Attack::new(unit, target.id());
        match strike.validate(view) {
            Ok(()) => Some(strike.into()),
            Err(rejection) if rejection.outcome == ActionOutcome::FailedOutOfRange => {
                Self::approach(unit, me.position(), target.position(), view)
            }
            Err(_) => None,
        }
    }
}
