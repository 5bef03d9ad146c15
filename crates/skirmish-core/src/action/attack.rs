//! Attack action.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    check_performer, pay, Action, ActionContext, ActionKind, ActionResult, ActionView, Rejection,
};
use crate::damage::BodyZone;
use crate::targeting::TargetingSystem;
use crate::unit::UnitId;

/// Weapon modifiers applied to an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Weapon {
    /// Added to the attacker's attack value.
    pub damage_bonus: i32,
    /// Added to the base AP cost. The total never drops below 1.
    pub ap_cost_modifier: i32,
}

impl Weapon {
    /// Creates a weapon.
    #[must_use]
    pub const fn new(damage_bonus: i32, ap_cost_modifier: i32) -> Self {
        Self {
            damage_bonus,
            ap_cost_modifier,
        }
    }
}

/// Strike a target within range.
///
/// Base damage is the attacker's attack plus the weapon bonus (at least 1);
/// the [`DamageSystem`](crate::damage::DamageSystem) turns that into the
/// amount actually removed. A miss still costs AP and still succeeds as an
/// action.
#[derive(Debug, Clone, PartialEq)]
pub struct Attack {
    performer: UnitId,
    target: Option<UnitId>,
    weapon: Option<Weapon>,
    aimed_zone: Option<BodyZone>,
    accuracy_modifier: f64,
}

impl Attack {
    /// Unarmed attack on `target`. Pass `None` for an attack with no target,
    /// which fails validation.
    #[must_use]
    pub fn new(performer: UnitId, target: impl Into<Option<UnitId>>) -> Self {
        Self {
            performer,
            target: target.into(),
            weapon: None,
            aimed_zone: None,
            accuracy_modifier: 1.0,
        }
    }

    /// Attacks with a weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Aims at a specific zone instead of rolling one.
    #[must_use]
    pub fn aimed_at(mut self, zone: BodyZone) -> Self {
        self.aimed_zone = Some(zone);
        self
    }

    /// Scales the hit chance.
    #[must_use]
    pub fn with_accuracy(mut self, modifier: f64) -> Self {
        self.accuracy_modifier = modifier;
        self
    }

    /// The target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<UnitId> {
        self.target
    }

    fn base_damage(&self, attack: i32) -> i32 {
        let bonus = self.weapon.map_or(0, |w| w.damage_bonus);
        attack.saturating_add(bonus).max(1)
    }
}

impl Action for Attack {
    fn performer(&self) -> UnitId {
        self.performer
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Attack
    }

    fn cost(&self, _view: &ActionView<'_>) -> u32 {
        let modifier = self.weapon.map_or(0, |w| w.ap_cost_modifier);
        let cost = i64::from(ActionKind::Attack.base_cost()) + i64::from(modifier);
        u32::try_from(cost.max(1)).unwrap_or(u32::MAX)
    }

    fn validate(&self, view: &ActionView<'_>) -> Result<(), Rejection> {
        check_performer(view, self.performer, self.cost(view))?;

        let target_id = self.target.ok_or(Rejection::NO_TARGET)?;
        if target_id == self.performer {
            return Err(Rejection::invalid("cannot attack itself"));
        }
        let target = view.roster.get(target_id).ok_or(Rejection::NO_TARGET)?;
        if !target.is_alive() {
            return Err(Rejection::invalid("target is already down"));
        }

        let attacker = view
            .roster
            .get(self.performer)
            .ok_or(Rejection::invalid("performer is not in the roster"))?;
        #[allow(clippy::cast_precision_loss)]
        let reach = attacker.range() as f32 * view.config.range_scale;
        if TargetingSystem::distance(attacker, target) > reach
            || !view
                .board
                .has_line_of_sight(attacker.position(), target.position())
        {
            return Err(Rejection::OUT_OF_RANGE);
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> ActionResult {
        if let Err(rejection) = self.validate(&ctx.view()) {
            return rejection.into();
        }
        let Some(target_id) = self.target else {
            return Rejection::NO_TARGET.into();
        };

        let cost = self.cost(&ctx.view());
        let spent = pay(ctx, self.performer, cost);

        let (hit, attacker_name, target_name) = {
            let (Some(attacker), Some(target)) =
                (ctx.roster.get(self.performer), ctx.roster.get(target_id))
            else {
                return Rejection::NO_TARGET.into();
            };
            let hit = ctx.damage.calculate_damage(
                attacker,
                target,
                self.base_damage(attacker.attack()),
                self.aimed_zone,
                self.accuracy_modifier,
                &mut *ctx.rng,
            );
            (hit, attacker.name().to_string(), target.name().to_string())
        };

        let applied = if hit.is_hit {
            ctx.roster
                .get_mut(target_id)
                .map_or(0, |target| target.take_damage(hit.final_damage))
        } else {
            0
        };

        debug!(
            attacker = %self.performer,
            target = %target_id,
            zone = %hit.zone,
            damage = applied,
            critical = hit.is_critical,
            "attack resolved"
        );

        let message = if hit.is_hit {
            format!("{attacker_name} attacks {target_name}. {}", hit.message)
        } else {
            format!("{attacker_name} attacks {target_name} and misses")
        };
        ActionResult::success(message)
            .with_ap_spent(spent)
            .with_damage(applied)
            .with_effects(hit.effect_tags())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::action::fixtures::Bench;
    use crate::action::ActionOutcome;
    use crate::roster::Roster;

    fn clean_torso_hit(bench: &mut Bench) {
        bench.rng.push_ints([50]);
        bench.rng.push_units([0.0, 0.99]);
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn requires_target() {
            let mut bench = Bench::new();
            let hero = bench.hero(Vec2::ZERO);
            let attack = Attack::new(hero, None);
            assert!(!attack.can_execute(&bench.view()));
            assert_eq!(attack.validate(&bench.view()), Err(Rejection::NO_TARGET));
        }

        #[test]
        fn dead_target_is_invalid() {
            let mut bench = Bench::new();
            let hero = bench.hero(Vec2::ZERO);
            let grunt = bench.enemy(Vec2::new(1.0, 0.0));
            bench.roster.unit_mut(grunt).unwrap().set_health(0);
            let attack = Attack::new(hero, grunt);
            assert!(!attack.can_execute(&bench.view()));
        }

        #[test]
        fn out_of_range() {
            let mut bench = Bench::new();
            let hero = bench.hero(Vec2::ZERO);
            let grunt = bench.enemy(Vec2::new(3.0, 0.0));
            let attack = Attack::new(hero, grunt);
            assert_eq!(attack.validate(&bench.view()), Err(Rejection::OUT_OF_RANGE));

            bench.config.range_scale = 2.0;
            assert!(attack.can_execute(&bench.view()));
        }

        #[test]
        fn valid_with_enough_ap() {
            let mut bench = Bench::new();
            let hero = bench.hero(Vec2::ZERO);
            let grunt = bench.enemy(Vec2::new(1.0, 1.0));
            assert!(Attack::new(hero, grunt).can_execute(&bench.view()));
        }

        #[test]
        fn weapon_adjusts_cost_with_floor() {
            let bench = Bench::new();
            let view = bench.view();
            let id = UnitId::new(0);
            assert_eq!(Attack::new(id, None).cost(&view), 3);
            assert_eq!(Attack::new(id, None).with_weapon(Weapon::new(0, 2)).cost(&view), 5);
            assert_eq!(Attack::new(id, None).with_weapon(Weapon::new(0, -5)).cost(&view), 1);
        }
    }

    mod execution_tests {
        use super::*;

        #[test]
        fn hit_spends_ap_and_applies_mitigated_damage() {
            let mut bench = Bench::new();
            let hero = bench.hero(Vec2::ZERO);
            let grunt = bench.enemy(Vec2::new(1.0, 0.0));
            clean_torso_hit(&mut bench);

            let result = Attack::new(hero, grunt).execute(&mut bench.ctx());
            assert!(result.success);
            assert_eq!(result.ap_spent, 3);
            // 40 * (1 - 10 * 0.02) = 32
            assert_eq!(result.damage_dealt, 32);
            assert_eq!(bench.ap(hero), 7);
            assert_eq!(bench.roster.get(grunt).unwrap().health(), 68);
        }

        #[test]
        fn weapon_bonus_adds_to_base() {
            let mut bench = Bench::new();
            let hero = bench.hero(Vec2::ZERO);
            let grunt = bench.enemy(Vec2::new(1.0, 0.0));
            clean_torso_hit(&mut bench);

            let result = Attack::new(hero, grunt)
                .with_weapon(Weapon::new(10, 1))
                .execute(&mut bench.ctx());
            // (40 + 10) * 0.8 = 40
            assert_eq!(result.damage_dealt, 40);
            assert_eq!(result.ap_spent, 4);
        }

        #[test]
        fn miss_still_costs_ap() {
            let mut bench = Bench::new();
            let hero = bench.hero(Vec2::ZERO);
            let grunt = bench.enemy(Vec2::new(1.0, 0.0));
            bench.rng.push_ints([50]);
            bench.rng.push_units([0.99]);

            let result = Attack::new(hero, grunt).execute(&mut bench.ctx());
            assert!(result.success);
            assert_eq!(result.damage_dealt, 0);
            assert_eq!(bench.ap(hero), 7);
            assert_eq!(bench.roster.get(grunt).unwrap().health(), 100);
        }

        #[test]
        fn failure_leaves_everything_untouched() {
            let mut bench = Bench::new();
            let hero = bench.hero(Vec2::ZERO);
            let grunt = bench.enemy(Vec2::new(5.0, 0.0));
            clean_torso_hit(&mut bench);

            let result = Attack::new(hero, grunt).execute(&mut bench.ctx());
            assert_eq!(result.outcome, ActionOutcome::FailedOutOfRange);
            assert_eq!(result.ap_spent, 0);
            assert_eq!(bench.ap(hero), 10);
            assert_eq!(bench.roster.get(grunt).unwrap().health(), 100);
            assert_eq!(bench.rng.remaining(), 3);
        }

        #[test]
        fn insufficient_ap() {
            let mut bench = Bench::new();
            let hero = bench.hero(Vec2::ZERO);
            let grunt = bench.enemy(Vec2::new(1.0, 0.0));
            bench
                .roster
                .get_mut(hero)
                .and_then(|u| u.action_points_mut())
                .unwrap()
                .spend(8);

            let result = Attack::new(hero, grunt).execute(&mut bench.ctx());
            assert_eq!(result.outcome, ActionOutcome::FailedNoAp);
            assert_eq!(bench.ap(hero), 2);
        }

        #[test]
        fn free_acting_attacker_spends_nothing() {
            let mut bench = Bench::new();
            let grunt = bench.enemy(Vec2::ZERO);
            let hero = bench.hero(Vec2::new(1.0, 0.0));
            clean_torso_hit(&mut bench);

            let result = Attack::new(grunt, hero).execute(&mut bench.ctx());
            assert!(result.success);
            assert_eq!(result.ap_spent, 0);
            assert_eq!(result.damage_dealt, 10);
        }
    }
}
