//! Tuning values for a combat instance.
//!
//! [`CombatConfig::default`] reproduces the stock rules exactly; hosts that
//! want different balance load a JSON document with [`CombatConfig::from_json`].
//! Missing fields fall back to the defaults, so a document only needs the
//! values it changes.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::CombatConfig;
//!
//! let config = CombatConfig::from_json(r#"{ "skip_ap_bonus": 3 }"#).unwrap();
//! assert_eq!(config.skip_ap_bonus, 3);
//! assert_eq!(config.initiative_jitter, 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::damage::BodyZone;
use crate::error::ConfigError;

/// One value per body zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneTable<T> {
    /// Head.
    pub head: T,
    /// Torso.
    pub torso: T,
    /// Left arm.
    pub left_arm: T,
    /// Right arm.
    pub right_arm: T,
    /// Left leg.
    pub left_leg: T,
    /// Right leg.
    pub right_leg: T,
}

impl<T: Copy> ZoneTable<T> {
    /// Looks up the value for a zone.
    #[must_use]
    pub fn get(&self, zone: BodyZone) -> T {
        match zone {
            BodyZone::Head => self.head,
            BodyZone::Torso => self.torso,
            BodyZone::LeftArm => self.left_arm,
            BodyZone::RightArm => self.right_arm,
            BodyZone::LeftLeg => self.left_leg,
            BodyZone::RightLeg => self.right_leg,
        }
    }

    /// Builds a table where both arms share a value and both legs share one.
    #[must_use]
    pub fn symmetric(head: T, torso: T, arms: T, legs: T) -> Self {
        Self {
            head,
            torso,
            left_arm: arms,
            right_arm: arms,
            left_leg: legs,
            right_leg: legs,
        }
    }
}

/// Numbers behind hit, zone, critical and mitigation rolls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTuning {
    /// Relative chance of each zone being hit; must sum to 100.
    pub zone_weights: ZoneTable<u32>,
    /// Damage multiplier per zone.
    pub zone_damage: ZoneTable<f64>,
    /// Hit-chance multiplier per zone.
    pub zone_accuracy: ZoneTable<f64>,
    /// Hit chance before modifiers.
    pub base_hit_chance: f64,
    /// Hit chance gained per accuracy point and lost per evasion point.
    pub accuracy_step: f64,
    /// Hit chance floor.
    pub min_hit_chance: f64,
    /// Hit chance ceiling.
    pub max_hit_chance: f64,
    /// Chance that a hit is critical.
    pub critical_chance: f64,
    /// Damage multiplier on a critical hit.
    pub critical_multiplier: f64,
    /// Share of damage removed per defense point.
    pub defense_step: f64,
    /// Cap on the share removed by defense.
    pub max_defense_reduction: f64,
    /// Damage floor for any hit.
    pub minimum_damage: i32,
}

impl Default for DamageTuning {
    fn default() -> Self {
        Self {
            zone_weights: ZoneTable::symmetric(10, 40, 12, 13),
            zone_damage: ZoneTable::symmetric(2.0, 1.0, 0.7, 0.8),
            zone_accuracy: ZoneTable::symmetric(0.7, 1.0, 0.9, 0.85),
            base_hit_chance: 0.90,
            accuracy_step: 0.01,
            min_hit_chance: 0.05,
            max_hit_chance: 0.95,
            critical_chance: 0.05,
            critical_multiplier: 1.5,
            defense_step: 0.02,
            max_defense_reduction: 0.5,
            minimum_damage: 1,
        }
    }
}

impl DamageTuning {
    /// Checks every value for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let total: u32 = BodyZone::ALL.iter().map(|z| self.zone_weights.get(*z)).sum();
        if total != 100 {
            return Err(ConfigError::ZoneWeights(total));
        }

        for zone in BodyZone::ALL {
            non_negative("zone_damage", self.zone_damage.get(zone))?;
            non_negative("zone_accuracy", self.zone_accuracy.get(zone))?;
        }
        non_negative("accuracy_step", self.accuracy_step)?;
        non_negative("critical_multiplier", self.critical_multiplier)?;
        non_negative("defense_step", self.defense_step)?;

        probability("base_hit_chance", self.base_hit_chance)?;
        probability("min_hit_chance", self.min_hit_chance)?;
        probability("max_hit_chance", self.max_hit_chance)?;
        probability("critical_chance", self.critical_chance)?;
        probability("max_defense_reduction", self.max_defense_reduction)?;

        if self.min_hit_chance > self.max_hit_chance {
            return Err(ConfigError::HitClamp {
                min: self.min_hit_chance,
                max: self.max_hit_chance,
            });
        }
        Ok(())
    }
}

/// Full tuning for one combat instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Damage resolution numbers.
    pub damage: DamageTuning,
    /// Initiative is `speed + uniform(-jitter, jitter)`.
    pub initiative_jitter: i32,
    /// AP granted by skipping a turn.
    pub skip_ap_bonus: u32,
    /// Incoming damage multiplier applied by the defend action.
    pub defend_multiplier: f64,
    /// World units per tile of attack range.
    pub range_scale: f32,
    /// Lines kept by the combat log.
    pub log_capacity: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            damage: DamageTuning::default(),
            initiative_jitter: 2,
            skip_ap_bonus: 2,
            defend_multiplier: 0.5,
            range_scale: 1.0,
            log_capacity: 100,
        }
    }
}

impl CombatConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation
    /// error from [`CombatConfig::validate`].
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.damage.validate()?;
        probability("defend_multiplier", self.defend_multiplier)?;
        non_negative("range_scale", f64::from(self.range_scale))?;
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Probability { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        CombatConfig::default().validate().unwrap();
    }

    #[test]
    fn default_zone_tables() {
        let tuning = DamageTuning::default();
        assert_eq!(tuning.zone_weights.get(BodyZone::Head), 10);
        assert_eq!(tuning.zone_weights.get(BodyZone::Torso), 40);
        assert_eq!(tuning.zone_weights.get(BodyZone::RightArm), 12);
        assert_eq!(tuning.zone_weights.get(BodyZone::LeftLeg), 13);
        assert!((tuning.zone_damage.get(BodyZone::Head) - 2.0).abs() < f64::EPSILON);
        assert!((tuning.zone_accuracy.get(BodyZone::RightLeg) - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config =
            CombatConfig::from_json(r#"{ "damage": { "critical_chance": 0.1 } }"#).unwrap();
        assert!((config.damage.critical_chance - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.damage.zone_weights.get(BodyZone::Torso), 40);
        assert_eq!(config.log_capacity, 100);
    }

    #[test]
    fn rejects_bad_zone_weights() {
        let mut config = CombatConfig::default();
        config.damage.zone_weights.head = 20;
        assert!(matches!(config.validate(), Err(ConfigError::ZoneWeights(110))));
    }

    #[test]
    fn rejects_inverted_hit_clamp() {
        let mut config = CombatConfig::default();
        config.damage.min_hit_chance = 0.9;
        config.damage.max_hit_chance = 0.1;
        assert!(matches!(config.validate(), Err(ConfigError::HitClamp { .. })));
    }

    #[test]
    fn rejects_negative_multiplier() {
        let mut config = CombatConfig::default();
        config.damage.zone_damage.torso = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "zone_damage",
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            CombatConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
