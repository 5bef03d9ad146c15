//! Defend action.

use tracing::debug;

use super::{
    check_performer, name_of, pay, Action, ActionContext, ActionKind, ActionResult, ActionView,
    Rejection,
};
use crate::unit::UnitId;

/// Brace against incoming damage until the performer's next turn starts.
///
/// The damage multiplier comes from
/// [`CombatConfig::defend_multiplier`](crate::config::CombatConfig::defend_multiplier).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defend {
    performer: UnitId,
}

impl Defend {
    /// Creates the action.
    #[must_use]
    pub const fn new(performer: UnitId) -> Self {
        Self { performer }
    }
}

impl Action for Defend {
    fn performer(&self) -> UnitId {
        self.performer
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Defend
    }

    fn validate(&self, view: &ActionView<'_>) -> Result<(), Rejection> {
        check_performer(view, self.performer, self.cost(view))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn execute(&self, ctx: &mut ActionContext<'_>) -> ActionResult {
        if let Err(rejection) = self.validate(&ctx.view()) {
            return rejection.into();
        }

        let cost = self.cost(&ctx.view());
        let spent = pay(ctx, self.performer, cost);

        let multiplier = ctx.config.defend_multiplier;
        if let Some(unit) = ctx.roster.get_mut(self.performer) {
            unit.set_defending(true, multiplier as f32);
        }
        debug!(unit = %self.performer, multiplier, "defending");

        let reduction = ((1.0 - multiplier) * 100.0).round();
        ActionResult::success(format!(
            "{} takes a defensive stance, incoming damage reduced {reduction}%",
            name_of(&*ctx.roster, self.performer)
        ))
        .with_ap_spent(spent)
        .with_effects(["defending"])
    }
}
