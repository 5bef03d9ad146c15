//! Access to externally-owned combatants.
//!
//! The engine stores only [`UnitId`] handles. Every operation that needs a unit
//! goes through a [`Roster`], which the host implements over whatever storage
//! it already has. [`UnitRoster`] is a ready implementation for the concrete
//! [`Unit`] type.
//!
//! # Determinism
//!
//! `UnitRoster` keeps units in a `BTreeMap`, so [`Roster::ids`] always yields
//! ids in ascending order and occupancy scans visit units in the same order on
//! every run.
//!
//! # Example
//!
//! ```
//! use skirmish_core::roster::{Roster, UnitRoster};
//! use skirmish_core::unit::{Side, Unit};
//! use glam::Vec2;
//!
//! let mut roster = UnitRoster::new();
//! let hero = roster.spawn(|id| Unit::new(id, "Hero", Side::Player).at(Vec2::new(2.0, 3.0)));
//!
//! assert!(roster.is_alive(hero));
//! assert!(roster.is_occupied(Vec2::new(2.0, 3.0)));
//! ```

use std::collections::BTreeMap;

use glam::Vec2;

use crate::unit::{Combatant, Unit, UnitId};

/// Two positions closer than this are treated as the same tile.
pub const SAME_TILE_EPSILON: f32 = 1e-3;

/// Id-to-combatant lookup over storage the engine does not own.
pub trait Roster {
    /// Returns a shared view of a combatant.
    fn get(&self, id: UnitId) -> Option<&dyn Combatant>;

    /// Returns a mutable view of a combatant.
    fn get_mut(&mut self, id: UnitId) -> Option<&mut dyn Combatant>;

    /// All known ids, in a stable order.
    fn ids(&self) -> Vec<UnitId>;

    /// Returns `true` if the id resolves to a living combatant.
    fn is_alive(&self, id: UnitId) -> bool {
        self.get(id).is_some_and(|unit| unit.is_alive())
    }

    /// Returns `true` if a living combatant stands on `position`.
    fn is_occupied(&self, position: Vec2) -> bool {
        self.ids().into_iter().any(|id| {
            self.get(id).is_some_and(|unit| {
                unit.is_alive() && unit.position().distance(position) < SAME_TILE_EPSILON
            })
        })
    }
}

/// `BTreeMap`-backed store of [`Unit`]s with monotonically assigned ids.
#[derive(Debug, Clone, Default)]
pub struct UnitRoster {
    next_id: u64,
    units: BTreeMap<UnitId, Unit>,
}

impl UnitRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next id and inserts the unit built from it.
    pub fn spawn(&mut self, build: impl FnOnce(UnitId) -> Unit) -> UnitId {
        let id = UnitId::new(self.next_id);
        self.next_id += 1;
        self.units.insert(id, build(id));
        id
    }

    /// Inserts a unit under its own id, replacing any previous entry.
    ///
    /// Keeps the id counter ahead of manually chosen ids.
    pub fn insert(&mut self, unit: Unit) -> Option<Unit> {
        let id = unit.id();
        self.next_id = self.next_id.max(id.as_u64() + 1);
        self.units.insert(id, unit)
    }

    /// Removes a unit, returning it if present.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Returns the concrete unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Returns the concrete unit mutably.
    #[must_use]
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Iterates units in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Number of stored units, living or dead.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if no units are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Roster for UnitRoster {
    fn get(&self, id: UnitId) -> Option<&dyn Combatant> {
        self.units.get(&id).map(|unit| unit as &dyn Combatant)
    }

    fn get_mut(&mut self, id: UnitId) -> Option<&mut dyn Combatant> {
        self.units.get_mut(&id).map(|unit| unit as &mut dyn Combatant)
    }

    fn ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }
}
