//! Skip action.

use tracing::debug;

use super::{name_of, Action, ActionContext, ActionKind, ActionResult, ActionView, Rejection};
use crate::unit::UnitId;

/// End the turn early and recover bonus AP.
///
/// Always succeeds. The bonus is
/// [`CombatConfig::skip_ap_bonus`](crate::config::CombatConfig::skip_ap_bonus),
/// capped at the pool's maximum. Ending the turn is the manager's job; the
/// action only grants the AP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skip {
    performer: UnitId,
}

impl Skip {
    /// Creates the action.
    #[must_use]
    pub const fn new(performer: UnitId) -> Self {
        Self { performer }
    }
}

impl Action for Skip {
    fn performer(&self) -> UnitId {
        self.performer
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Skip
    }

    fn validate(&self, _view: &ActionView<'_>) -> Result<(), Rejection> {
        Ok(())
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> ActionResult {
        let bonus = ctx.config.skip_ap_bonus;
        if let Some(ap) = ctx
            .roster
            .get_mut(self.performer)
            .and_then(|unit| unit.action_points_mut())
        {
            ap.recover_by(bonus);
        }
        debug!(unit = %self.performer, bonus, "turn skipped");

        ActionResult::success(format!(
            "{} skips the turn and recovers +{bonus} AP",
            name_of(&*ctx.roster, self.performer)
        ))
        .with_effects(["skip_turn".to_string(), format!("recover_{bonus}_ap")])
    }
}
