//! Usable items.
//!
//! An [`Item`] is owned by a combatant's inventory and applied to a target
//! (possibly the user). The engine only checks that the item is carried and
//! pays its AP cost; what it does is up to the item.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::unit::Combatant;

/// Identifier for an item instance inside an inventory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new `ItemId`.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Item capability.
pub trait Item: fmt::Debug + Send + Sync {
    /// Instance id, unique within one inventory.
    fn id(&self) -> ItemId;

    /// Display name.
    fn name(&self) -> &str;

    /// AP cost override; `None` uses the use-item base cost.
    fn ap_cost(&self) -> Option<u32> {
        None
    }

    /// Applies the item to `target` and returns effect tags.
    fn apply(&self, target: &mut dyn Combatant) -> Vec<String>;
}

/// Healing consumable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumable {
    id: ItemId,
    name: String,
    heal: i32,
    ap_cost: Option<u32>,
}

impl Consumable {
    /// A consumable that restores `heal` health.
    #[must_use]
    pub fn healing(id: ItemId, name: impl Into<String>, heal: i32) -> Self {
        Self {
            id,
            name: name.into(),
            heal,
            ap_cost: None,
        }
    }

    /// Overrides the AP cost.
    #[must_use]
    pub fn with_ap_cost(mut self, cost: u32) -> Self {
        self.ap_cost = Some(cost);
        self
    }
}

impl Item for Consumable {
    fn id(&self) -> ItemId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn ap_cost(&self) -> Option<u32> {
        self.ap_cost
    }

    fn apply(&self, target: &mut dyn Combatant) -> Vec<String> {
        let restored = target.restore_health(self.heal);
        vec![format!("healed_{restored}")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Side, Unit, UnitId};

    #[test]
    fn healing_reports_amount_restored() {
        let potion = Consumable::healing(ItemId::new(1), "Potion", 30);
        let mut unit = Unit::new(UnitId::new(1), "a", Side::Player);
        unit.set_health(80);

        let effects = potion.apply(&mut unit);
        assert_eq!(effects, vec!["healed_20".to_string()]);
        assert_eq!(unit.health(), 100);
    }

    #[test]
    fn cost_override() {
        let potion = Consumable::healing(ItemId::new(1), "Potion", 30);
        assert_eq!(potion.ap_cost(), None);
        assert_eq!(potion.with_ap_cost(1).ap_cost(), Some(1));
    }
}
