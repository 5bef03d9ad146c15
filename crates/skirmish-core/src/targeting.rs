//! Target selection queries.
//!
//! Every function here is a pure read over combatants the caller already
//! looked up. Nothing is mutated, and results keep the candidates' input order
//! wherever the query does not impose its own ordering, so ties always resolve
//! to the earliest candidate.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use skirmish_core::board::OpenBoard;
//! use skirmish_core::targeting::{TargetQuery, TargetingSystem};
//! use skirmish_core::unit::{Combatant, Side, Unit, UnitId};
//!
//! let hero = Unit::new(UnitId::new(1), "Hero", Side::Player);
//! let near = Unit::new(UnitId::new(2), "Near", Side::Enemy).at(Vec2::new(1.0, 0.0));
//! let far = Unit::new(UnitId::new(3), "Far", Side::Enemy).at(Vec2::new(5.0, 0.0));
//! let candidates: Vec<&dyn Combatant> = vec![&far, &near];
//!
//! let in_reach = TargetingSystem::get_valid_targets(
//!     &hero,
//!     &candidates,
//!     &TargetQuery::enemies().within(2.0),
//!     &OpenBoard::new(),
//! );
//! assert_eq!(in_reach.len(), 1);
//! assert_eq!(in_reach[0].id(), UnitId::new(2));
//! ```

use std::cmp::Ordering;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::unit::Combatant;

/// Which side a target must be on, relative to the performer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetFilter {
    /// Different owner.
    #[default]
    Enemy,
    /// Same owner.
    Ally,
    /// Either.
    Any,
}

/// Filter set for [`TargetingSystem::get_valid_targets`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetQuery {
    /// Side relationship.
    pub filter: TargetFilter,
    /// Maximum Euclidean distance, if any.
    pub max_range: Option<f32>,
    /// Whether the board must report a clear line of sight.
    pub require_line_of_sight: bool,
}

impl TargetQuery {
    /// Living combatants of the opposing side, at any range.
    #[must_use]
    pub const fn enemies() -> Self {
        Self {
            filter: TargetFilter::Enemy,
            max_range: None,
            require_line_of_sight: false,
        }
    }

    /// Living combatants of the performer's side, at any range.
    #[must_use]
    pub const fn allies() -> Self {
        Self {
            filter: TargetFilter::Ally,
            max_range: None,
            require_line_of_sight: false,
        }
    }

    /// Limits the query to `range` world units.
    #[must_use]
    pub fn within(mut self, range: f32) -> Self {
        self.max_range = Some(range);
        self
    }

    /// Requires line of sight.
    #[must_use]
    pub fn with_line_of_sight(mut self) -> Self {
        self.require_line_of_sight = true;
        self
    }
}

/// Namespace for target queries.
pub struct TargetingSystem;

impl TargetingSystem {
    /// Living candidates that satisfy every filter in `query`.
    #[must_use]
    pub fn get_valid_targets<'a>(
        performer: &dyn Combatant,
        candidates: &[&'a dyn Combatant],
        query: &TargetQuery,
        board: &dyn Board,
    ) -> Vec<&'a dyn Combatant> {
        candidates
            .iter()
            .copied()
            .filter(|target| target.is_alive())
            .filter(|target| match query.filter {
                TargetFilter::Enemy => target.owner() != performer.owner(),
                TargetFilter::Ally => target.owner() == performer.owner(),
                TargetFilter::Any => true,
            })
            .filter(|target| {
                query
                    .max_range
                    .map_or(true, |range| Self::distance(performer, *target) <= range)
            })
            .filter(|target| {
                !query.require_line_of_sight
                    || board.has_line_of_sight(performer.position(), target.position())
            })
            .collect()
    }

    /// Closest living candidate.
    #[must_use]
    pub fn get_nearest_target<'a>(
        performer: &dyn Combatant,
        candidates: &[&'a dyn Combatant],
    ) -> Option<&'a dyn Combatant> {
        candidates
            .iter()
            .copied()
            .filter(|target| target.is_alive())
            .min_by(|a, b| by_distance(Self::distance(performer, *a), Self::distance(performer, *b)))
    }

    /// Living candidate with the lowest health among those at or below
    /// `health_threshold` of their maximum.
    #[must_use]
    pub fn get_weakest_target<'a>(
        candidates: &[&'a dyn Combatant],
        health_threshold: f32,
    ) -> Option<&'a dyn Combatant> {
        candidates
            .iter()
            .copied()
            .filter(|target| target.is_alive())
            .filter(|target| health_fraction(*target) <= health_threshold)
            .min_by_key(|target| target.health())
    }

    /// Living candidate with the highest attack.
    #[must_use]
    pub fn get_strongest_target<'a>(
        candidates: &[&'a dyn Combatant],
    ) -> Option<&'a dyn Combatant> {
        candidates
            .iter()
            .copied()
            .filter(|target| target.is_alive())
            .min_by(|a, b| b.attack().cmp(&a.attack()))
    }

    /// Candidates ordered by distance from `performer`. Stable for ties.
    #[must_use]
    pub fn sort_by_distance<'a>(
        performer: &dyn Combatant,
        candidates: &[&'a dyn Combatant],
        ascending: bool,
    ) -> Vec<&'a dyn Combatant> {
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|a, b| {
            let order = by_distance(Self::distance(performer, *a), Self::distance(performer, *b));
            if ascending {
                order
            } else {
                order.reverse()
            }
        });
        sorted
    }

    /// Living candidates whose position lies within `radius` of `center`.
    #[must_use]
    pub fn get_targets_in_area<'a>(
        center: Vec2,
        radius: f32,
        candidates: &[&'a dyn Combatant],
    ) -> Vec<&'a dyn Combatant> {
        candidates
            .iter()
            .copied()
            .filter(|target| target.is_alive() && target.position().distance(center) <= radius)
            .collect()
    }

    /// Euclidean distance between two combatants.
    #[must_use]
    pub fn distance(a: &dyn Combatant, b: &dyn Combatant) -> f32 {
        a.position().distance(b.position())
    }
}

fn by_distance(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[allow(clippy::cast_precision_loss)]
fn health_fraction(unit: &dyn Combatant) -> f32 {
    if unit.max_health() > 0 {
        unit.health() as f32 / unit.max_health() as f32
    } else {
        1.0
    }
}
