//! Move action.

use glam::Vec2;
use tracing::debug;

use super::{
    check_performer, name_of, pay, Action, ActionContext, ActionKind, ActionResult, ActionView,
    Rejection,
};
use crate::unit::UnitId;

/// Step to an adjacent, empty, passable tile.
///
/// Costs the base move cost plus the destination's terrain cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    performer: UnitId,
    destination: Vec2,
}

impl Move {
    /// Creates the action.
    #[must_use]
    pub const fn new(performer: UnitId, destination: Vec2) -> Self {
        Self {
            performer,
            destination,
        }
    }

    /// Where the performer will end up.
    #[must_use]
    pub const fn destination(&self) -> Vec2 {
        self.destination
    }
}

impl Action for Move {
    fn performer(&self) -> UnitId {
        self.performer
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Move
    }

    fn cost(&self, view: &ActionView<'_>) -> u32 {
        ActionKind::Move
            .base_cost()
            .saturating_add(view.board.movement_cost(self.destination))
    }

    fn validate(&self, view: &ActionView<'_>) -> Result<(), Rejection> {
        check_performer(view, self.performer, self.cost(view))?;

        let from = view
            .roster
            .get(self.performer)
            .map(|unit| unit.position())
            .ok_or(Rejection::invalid("performer is not in the roster"))?;
        if !view.board.is_adjacent(from, self.destination) {
            return Err(Rejection::invalid("destination is not adjacent"));
        }
        if view.board.is_blocked(self.destination) {
            return Err(Rejection::invalid("destination is blocked"));
        }
        if view.roster.is_occupied(self.destination) {
            return Err(Rejection::invalid("destination is occupied"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> ActionResult {
        if let Err(rejection) = self.validate(&ctx.view()) {
            return rejection.into();
        }

        let cost = self.cost(&ctx.view());
        let spent = pay(ctx, self.performer, cost);

        if let Some(unit) = ctx.roster.get_mut(self.performer) {
            unit.move_to(self.destination);
        }
        debug!(unit = %self.performer, x = self.destination.x, y = self.destination.y, "moved");

        ActionResult::success(format!(
            "{} moves to ({}, {})",
            name_of(&*ctx.roster, self.performer),
            self.destination.x,
            self.destination.y
        ))
        .with_ap_spent(spent)
    }
}
