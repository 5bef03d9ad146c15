//! Use-item action.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{
    check_performer, name_of, pay, Action, ActionContext, ActionKind, ActionResult, ActionView,
    Rejection,
};
use crate::item::Item;
use crate::unit::UnitId;

/// Use an item from the performer's inventory on a target or on itself.
///
/// Costs the item's own AP cost when it has one, otherwise the base use-item
/// cost.
#[derive(Clone)]
pub struct UseItem {
    performer: UnitId,
    item: Arc<dyn Item>,
    target: Option<UnitId>,
}

impl UseItem {
    /// Uses `item` on the performer.
    #[must_use]
    pub fn new(performer: UnitId, item: Arc<dyn Item>) -> Self {
        Self {
            performer,
            item,
            target: None,
        }
    }

    /// Uses the item on another unit.
    #[must_use]
    pub fn on(mut self, target: UnitId) -> Self {
        self.target = Some(target);
        self
    }

    /// The unit the item will be applied to.
    #[must_use]
    pub fn recipient(&self) -> UnitId {
        self.target.unwrap_or(self.performer)
    }

    /// The item.
    #[must_use]
    pub fn item(&self) -> &Arc<dyn Item> {
        &self.item
    }
}

impl fmt::Debug for UseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UseItem")
            .field("performer", &self.performer)
            .field("item", &self.item.id())
            .field("target", &self.target)
            .finish()
    }
}

impl Action for UseItem {
    fn performer(&self) -> UnitId {
        self.performer
    }

    fn kind(&self) -> ActionKind {
        ActionKind::UseItem
    }

    fn cost(&self, _view: &ActionView<'_>) -> u32 {
        self.item
            .ap_cost()
            .unwrap_or_else(|| ActionKind::UseItem.base_cost())
    }

    fn validate(&self, view: &ActionView<'_>) -> Result<(), Rejection> {
        check_performer(view, self.performer, self.cost(view))?;

        let carried = view.roster.get(self.performer).is_some_and(|unit| {
            unit.inventory()
                .iter()
                .any(|held| held.id() == self.item.id())
        });
        if !carried {
            return Err(Rejection::invalid("item is not in the inventory"));
        }

        let recipient = view
            .roster
            .get(self.recipient())
            .ok_or(Rejection::NO_TARGET)?;
        if !recipient.is_alive() {
            return Err(Rejection::invalid("target is already down"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> ActionResult {
        if let Err(rejection) = self.validate(&ctx.view()) {
            return rejection.into();
        }

        let cost = self.cost(&ctx.view());
        let spent = pay(ctx, self.performer, cost);

        let effects = ctx
            .roster
            .get_mut(self.recipient())
            .map(|target| self.item.apply(target))
            .unwrap_or_default();
        debug!(
            unit = %self.performer,
            item = %self.item.id(),
            target = %self.recipient(),
            "item used"
        );

        ActionResult::success(format!(
            "{} used {}",
            name_of(&*ctx.roster, self.performer),
            self.item.name()
        ))
        .with_ap_spent(spent)
        .with_effects(effects)
    }
}
