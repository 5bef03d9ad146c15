//! Body-zone damage resolution.
//!
//! [`DamageSystem::calculate_damage`] turns a raw attack value into a
//! [`DamageResult`] in a fixed sequence:
//!
//! 1. Pick the zone (weighted roll unless the attacker aimed).
//! 2. Compute the hit chance from accuracy, evasion and the zone, then roll.
//! 3. On a hit, scale by the zone multiplier and roll for a critical.
//! 4. Truncate, then mitigate: defending stance first, then linear defense,
//!    then the damage floor.
//!
//! The system is stateless apart from its tuning. All randomness comes from
//! the [`CombatRng`] passed in, and the draws always happen in the order zone,
//! hit, critical, so a scripted generator can force any outcome.
//!
//! # Example
//!
//! ```
//! use skirmish_core::damage::{BodyZone, DamageSystem};
//! use skirmish_core::rng::ScriptedRng;
//! use skirmish_core::unit::{Side, Unit, UnitId};
//!
//! let system = DamageSystem::default();
//! let attacker = Unit::new(UnitId::new(1), "A", Side::Player);
//! let target = Unit::new(UnitId::new(2), "B", Side::Enemy);
//!
//! // Hit roll 0.0 always hits; crit roll 0.99 never crits.
//! let mut rng = ScriptedRng::new().with_units([0.0, 0.99]);
//! let result = system.calculate_damage(&attacker, &target, 20, Some(BodyZone::Torso), 1.0, &mut rng);
//!
//! assert!(result.is_hit);
//! assert_eq!(result.final_damage, 20);
//! ```

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::DamageTuning;
use crate::rng::CombatRng;
use crate::unit::Combatant;

/// Hit location category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyZone {
    /// Head.
    Head,
    /// Torso.
    Torso,
    /// Left arm.
    LeftArm,
    /// Right arm.
    RightArm,
    /// Left leg.
    LeftLeg,
    /// Right leg.
    RightLeg,
}

impl BodyZone {
    /// Every zone, in roll order.
    pub const ALL: [Self; 6] = [
        Self::Head,
        Self::Torso,
        Self::LeftArm,
        Self::RightArm,
        Self::LeftLeg,
        Self::RightLeg,
    ];

    /// Returns `true` for either arm.
    #[must_use]
    pub const fn is_arm(self) -> bool {
        matches!(self, Self::LeftArm | Self::RightArm)
    }

    /// Returns `true` for either leg.
    #[must_use]
    pub const fn is_leg(self) -> bool {
        matches!(self, Self::LeftLeg | Self::RightLeg)
    }

    /// Status effects a hit on this zone always carries.
    #[must_use]
    pub const fn base_effects(self) -> HitEffects {
        match self {
            Self::Head => HitEffects::DIZZY.union(HitEffects::VISION_IMPAIRED),
            Self::Torso => HitEffects::empty(),
            Self::LeftArm | Self::RightArm => HitEffects::ATTACK_PENALTY,
            Self::LeftLeg | Self::RightLeg => HitEffects::MOVEMENT_PENALTY,
        }
    }
}

impl fmt::Display for BodyZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Head => "head",
            Self::Torso => "torso",
            Self::LeftArm => "left arm",
            Self::RightArm => "right arm",
            Self::LeftLeg => "left leg",
            Self::RightLeg => "right leg",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Status effects produced by a hit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct HitEffects: u8 {
        /// Head hit.
        const DIZZY            = 1 << 0;
        /// Head hit.
        const VISION_IMPAIRED  = 1 << 1;
        /// Arm hit.
        const ATTACK_PENALTY   = 1 << 2;
        /// Leg hit.
        const MOVEMENT_PENALTY = 1 << 3;
        /// Any critical hit.
        const CRITICAL_HIT     = 1 << 4;
        /// Critical hit to the head.
        const STUNNED          = 1 << 5;
    }
}

impl HitEffects {
    /// Effect tags in a stable order: zone effects first, then critical ones.
    #[must_use]
    pub fn tags(self) -> Vec<&'static str> {
        const TAGS: [(HitEffects, &str); 6] = [
            (HitEffects::DIZZY, "dizzy"),
            (HitEffects::VISION_IMPAIRED, "vision_impaired"),
            (HitEffects::ATTACK_PENALTY, "attack_penalty"),
            (HitEffects::MOVEMENT_PENALTY, "movement_penalty"),
            (HitEffects::CRITICAL_HIT, "critical_hit"),
            (HitEffects::STUNNED, "stunned"),
        ];
        TAGS.iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, tag)| *tag)
            .collect()
    }
}

/// Outcome of one damage calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    /// Damage before any multiplier.
    pub raw_damage: i32,
    /// Damage after zone, critical and mitigation; `0` on a miss.
    pub final_damage: i32,
    /// Zone that was rolled or aimed at.
    pub zone: BodyZone,
    /// Whether the critical roll succeeded.
    pub is_critical: bool,
    /// Whether the hit roll succeeded.
    pub is_hit: bool,
    /// Status effects carried by the hit.
    pub effects: HitEffects,
    /// Human-readable summary.
    pub message: String,
}

impl DamageResult {
    fn miss(raw_damage: i32, zone: BodyZone) -> Self {
        Self {
            raw_damage,
            final_damage: 0,
            zone,
            is_critical: false,
            is_hit: false,
            effects: HitEffects::empty(),
            message: "Missed!".to_string(),
        }
    }

    /// Effect tags as owned strings.
    #[must_use]
    pub fn effect_tags(&self) -> Vec<String> {
        self.effects.tags().into_iter().map(str::to_string).collect()
    }
}

/// Stateless damage calculator.
#[derive(Debug, Clone, Default)]
pub struct DamageSystem {
    tuning: DamageTuning,
}

impl DamageSystem {
    /// Creates a calculator with the given tuning.
    #[must_use]
    pub const fn new(tuning: DamageTuning) -> Self {
        Self { tuning }
    }

    /// Returns the tuning in use.
    #[must_use]
    pub const fn tuning(&self) -> &DamageTuning {
        &self.tuning
    }

    /// Resolves one attack against `target`.
    ///
    /// `accuracy_modifier` scales the hit chance before clamping; pass `1.0`
    /// for an ordinary attack. Neither combatant is mutated.
    #[allow(clippy::cast_possible_truncation)]
    pub fn calculate_damage(
        &self,
        attacker: &dyn Combatant,
        target: &dyn Combatant,
        base_damage: i32,
        targeted_zone: Option<BodyZone>,
        accuracy_modifier: f64,
        rng: &mut dyn CombatRng,
    ) -> DamageResult {
        let zone = targeted_zone.unwrap_or_else(|| self.roll_zone(rng));

        let hit_chance = self.hit_chance(attacker, target, zone, accuracy_modifier);
        if rng.next_unit() > hit_chance {
            trace!(zone = %zone, hit_chance, "attack missed");
            return DamageResult::miss(base_damage, zone);
        }

        let mut damage = f64::from(base_damage) * self.tuning.zone_damage.get(zone);
        let is_critical = rng.next_unit() < self.tuning.critical_chance;
        if is_critical {
            damage *= self.tuning.critical_multiplier;
        }

        let final_damage = self.apply_defense(target, damage as i32);

        let mut effects = zone.base_effects();
        if is_critical {
            effects |= HitEffects::CRITICAL_HIT;
            if zone == BodyZone::Head {
                effects |= HitEffects::STUNNED;
            }
        }

        let message = if is_critical {
            format!("CRITICAL hit to the {zone}! {final_damage} damage")
        } else {
            format!("Hit to the {zone}: {final_damage} damage")
        };

        DamageResult {
            raw_damage: base_damage,
            final_damage,
            zone,
            is_critical,
            is_hit: true,
            effects,
            message,
        }
    }

    /// Weighted zone roll on `1..=100` against the cumulative weights.
    pub fn roll_zone(&self, rng: &mut dyn CombatRng) -> BodyZone {
        let roll = rng.range_inclusive(1, 100);
        let mut cumulative = 0_i64;
        for zone in BodyZone::ALL {
            cumulative += i64::from(self.tuning.zone_weights.get(zone));
            if i64::from(roll) <= cumulative {
                return zone;
            }
        }
        BodyZone::Torso
    }

    /// Hit chance against a zone, clamped to the configured bounds.
    #[must_use]
    pub fn hit_chance(
        &self,
        attacker: &dyn Combatant,
        target: &dyn Combatant,
        zone: BodyZone,
        accuracy_modifier: f64,
    ) -> f64 {
        let t = &self.tuning;
        let base = t.base_hit_chance + f64::from(attacker.accuracy()) * t.accuracy_step
            - f64::from(target.evasion()) * t.accuracy_step;
        let chance = base * t.zone_accuracy.get(zone) * accuracy_modifier;
        chance.clamp(t.min_hit_chance, t.max_hit_chance)
    }

    /// Mitigates a post-zone damage value against `target`.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn apply_defense(&self, target: &dyn Combatant, damage: i32) -> i32 {
        let mut damage = damage;
        if target.is_defending() {
            damage = (f64::from(damage) * f64::from(target.defense_multiplier())) as i32;
        }

        let reduction = (f64::from(target.defense()) * self.tuning.defense_step)
            .min(self.tuning.max_defense_reduction);
        damage = (f64::from(damage) * (1.0 - reduction)) as i32;

        damage.max(self.tuning.minimum_damage)
    }

    /// Short label for a zone, for UI panels.
    #[must_use]
    pub const fn zone_name(zone: BodyZone) -> &'static str {
        match zone {
            BodyZone::Head => "Head",
            BodyZone::Torso => "Torso",
            BodyZone::LeftArm => "L. Arm",
            BodyZone::RightArm => "R. Arm",
            BodyZone::LeftLeg => "L. Leg",
            BodyZone::RightLeg => "R. Leg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SeededRng};
    use crate::unit::{CombatStats, Side, Unit, UnitId};
    use proptest::prelude::*;

    fn attacker() -> Unit {
        Unit::new(UnitId::new(1), "attacker", Side::Player)
    }

    fn target(defense: i32) -> Unit {
        Unit::new(UnitId::new(2), "target", Side::Enemy).with_stats(CombatStats::new(10, defense, 5, 1))
    }

    /// Forces a hit with no critical.
    fn clean_hit() -> ScriptedRng {
        ScriptedRng::new().with_units([0.0, 0.99])
    }

    // =========================================================================
    // Zone Tests
    // =========================================================================

    mod zone_tests {
        use super::*;

        #[test]
        fn cumulative_boundaries() {
            let system = DamageSystem::default();
            let cases = [
                (1, BodyZone::Head),
                (10, BodyZone::Head),
                (11, BodyZone::Torso),
                (50, BodyZone::Torso),
                (51, BodyZone::LeftArm),
                (62, BodyZone::LeftArm),
                (63, BodyZone::RightArm),
                (74, BodyZone::RightArm),
                (75, BodyZone::LeftLeg),
                (87, BodyZone::LeftLeg),
                (88, BodyZone::RightLeg),
                (100, BodyZone::RightLeg),
            ];
            for (roll, expected) in cases {
                let mut rng = ScriptedRng::new().with_ints([roll]);
                assert_eq!(system.roll_zone(&mut rng), expected, "roll {roll}");
            }
        }

        #[test]
        fn frequencies_match_weights() {
            let system = DamageSystem::default();
            let mut rng = SeededRng::new(0x5EED);
            let trials = 100_000;
            let mut counts = [0_u32; 6];
            for _ in 0..trials {
                let zone = system.roll_zone(&mut rng);
                let index = BodyZone::ALL.iter().position(|z| *z == zone).unwrap();
                counts[index] += 1;
            }

            let expected = [0.10, 0.40, 0.12, 0.12, 0.13, 0.13];
            for (count, want) in counts.iter().zip(expected) {
                let observed = f64::from(*count) / f64::from(trials);
                assert!((observed - want).abs() < 0.01, "observed {observed}, expected {want}");
            }
        }

        #[test]
        fn aimed_zone_skips_roll() {
            let system = DamageSystem::default();
            let mut rng = ScriptedRng::new().with_ints([1]).with_units([0.0, 0.99]);
            let result =
                system.calculate_damage(&attacker(), &target(0), 10, Some(BodyZone::LeftLeg), 1.0, &mut rng);
            assert_eq!(result.zone, BodyZone::LeftLeg);
            // the queued int was never consumed
            assert_eq!(rng.remaining(), 1);
        }

        #[test]
        fn zone_names() {
            assert_eq!(DamageSystem::zone_name(BodyZone::Head), "Head");
            assert_eq!(DamageSystem::zone_name(BodyZone::RightLeg), "R. Leg");
            assert_eq!(BodyZone::LeftArm.to_string(), "left arm");
            assert!(BodyZone::RightArm.is_arm());
            assert!(BodyZone::LeftLeg.is_leg());
            assert!(!BodyZone::Torso.is_arm());
        }
    }

    // =========================================================================
    // Hit Chance Tests
    // =========================================================================

    mod hit_chance_tests {
        use super::*;

        #[test]
        fn base_chance_per_zone() {
            let system = DamageSystem::default();
            let a = attacker();
            let t = target(0);
            assert!((system.hit_chance(&a, &t, BodyZone::Torso, 1.0) - 0.90).abs() < 1e-9);
            assert!((system.hit_chance(&a, &t, BodyZone::Head, 1.0) - 0.63).abs() < 1e-9);
        }

        #[test]
        fn accuracy_and_evasion_shift_chance() {
            let system = DamageSystem::default();
            let a = attacker().with_stats(CombatStats {
                accuracy: 3,
                ..CombatStats::default()
            });
            let t = Unit::new(UnitId::new(2), "t", Side::Enemy).with_stats(CombatStats {
                evasion: 8,
                ..CombatStats::default()
            });
            // 0.90 + 0.03 - 0.08 = 0.85
            assert!((system.hit_chance(&a, &t, BodyZone::Torso, 1.0) - 0.85).abs() < 1e-9);
        }

        #[test]
        fn clamped_to_bounds() {
            let system = DamageSystem::default();
            let a = attacker();
            let t = target(0);
            assert!((system.hit_chance(&a, &t, BodyZone::Torso, 10.0) - 0.95).abs() < 1e-9);
            assert!((system.hit_chance(&a, &t, BodyZone::Torso, 0.0) - 0.05).abs() < 1e-9);
        }

        #[test]
        fn roll_above_chance_misses() {
            let system = DamageSystem::default();
            let mut rng = ScriptedRng::new().with_units([0.95]);
            let result =
                system.calculate_damage(&attacker(), &target(0), 20, Some(BodyZone::Torso), 1.0, &mut rng);
            assert!(!result.is_hit);
            assert_eq!(result.final_damage, 0);
            assert_eq!(result.raw_damage, 20);
            assert_eq!(result.message, "Missed!");
            assert!(result.effects.is_empty());
        }
    }

    // =========================================================================
    // Damage Tests
    // =========================================================================

    mod damage_tests {
        use super::*;

        #[test]
        fn torso_hit_no_defense() {
            let system = DamageSystem::default();
            let result = system.calculate_damage(
                &attacker(),
                &target(0),
                20,
                Some(BodyZone::Torso),
                1.0,
                &mut clean_hit(),
            );
            assert!(result.is_hit);
            assert!(!result.is_critical);
            assert_eq!(result.final_damage, 20);
            assert_eq!(result.message, "Hit to the torso: 20 damage");
        }

        #[test]
        fn linear_defense_mitigation() {
            let system = DamageSystem::default();
            let result = system.calculate_damage(
                &attacker(),
                &target(10),
                40,
                Some(BodyZone::Torso),
                1.0,
                &mut clean_hit(),
            );
            assert_eq!(result.final_damage, 32);
        }

        #[test]
        fn defense_reduction_caps_at_half() {
            let system = DamageSystem::default();
            let result = system.calculate_damage(
                &attacker(),
                &target(100),
                40,
                Some(BodyZone::Torso),
                1.0,
                &mut clean_hit(),
            );
            assert_eq!(result.final_damage, 20);
        }

        #[test]
        fn defending_stance_applies_first() {
            let system = DamageSystem::default();
            let mut t = target(10);
            t.set_defending(true, 0.5);
            // 40 * 0.5 = 20, then * 0.8 = 16
            assert_eq!(system.apply_defense(&t, 40), 16);
        }

        #[test]
        fn floor_of_one() {
            let system = DamageSystem::default();
            let result = system.calculate_damage(
                &attacker(),
                &target(25),
                1,
                Some(BodyZone::LeftArm),
                1.0,
                &mut clean_hit(),
            );
            assert_eq!(result.final_damage, 1);
        }

        #[test]
        fn head_critical_stuns() {
            let system = DamageSystem::default();
            let mut rng = ScriptedRng::new().with_units([0.0, 0.0]);
            let result =
                system.calculate_damage(&attacker(), &target(0), 10, Some(BodyZone::Head), 1.0, &mut rng);
            // 10 * 2.0 * 1.5
            assert_eq!(result.final_damage, 30);
            assert!(result.is_critical);
            assert_eq!(
                result.effect_tags(),
                vec!["dizzy", "vision_impaired", "critical_hit", "stunned"]
            );
            assert_eq!(result.message, "CRITICAL hit to the head! 30 damage");
        }

        #[test]
        fn limb_effects() {
            let system = DamageSystem::default();
            let arm = system.calculate_damage(
                &attacker(),
                &target(0),
                10,
                Some(BodyZone::RightArm),
                1.0,
                &mut clean_hit(),
            );
            assert_eq!(arm.final_damage, 7);
            assert_eq!(arm.effects, HitEffects::ATTACK_PENALTY);

            let leg = system.calculate_damage(
                &attacker(),
                &target(0),
                10,
                Some(BodyZone::LeftLeg),
                1.0,
                &mut clean_hit(),
            );
            assert_eq!(leg.final_damage, 8);
            assert_eq!(leg.effects.tags(), vec!["movement_penalty"]);
        }

        #[test]
        fn does_not_mutate_target() {
            let system = DamageSystem::default();
            let t = target(0);
            let _ = system.calculate_damage(&attacker(), &t, 50, None, 1.0, &mut SeededRng::new(3));
            assert_eq!(t.health(), 100);
        }
    }

    proptest! {
        #[test]
        fn final_damage_bounds(
            base in 1i32..200,
            defense in 0i32..60,
            seed in any::<u64>(),
            defending in any::<bool>(),
        ) {
            let system = DamageSystem::default();
            let mut t = target(defense);
            t.set_defending(defending, 0.5);
            let mut rng = SeededRng::new(seed);
            let result = system.calculate_damage(&attacker(), &t, base, None, 1.0, &mut rng);

            if result.is_hit {
                prop_assert!(result.final_damage >= 1);
                // head crit is the largest multiplier: 2.0 * 1.5
                prop_assert!(result.final_damage <= base * 3);
            } else {
                prop_assert_eq!(result.final_damage, 0);
                prop_assert!(!result.is_critical);
            }
        }
    }
}
