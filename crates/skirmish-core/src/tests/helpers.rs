//! Unit factories and small drivers shared by the scenario tests.

use glam::Vec2;

use crate::action::{Action, ActionKind, ActionResult, CombatAction};
use crate::action_points::ActionPoints;
use crate::manager::{CombatManager, CombatState};
use crate::roster::{Roster, UnitRoster};
use crate::unit::{CombatStats, Side, Unit, UnitId};

// =============================================================================
// Logging
// =============================================================================

/// Routes `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Unit Factories
// =============================================================================

/// AP-metered player unit: attack 40, defense 0, speed 9, range 2, 10 AP
/// recovering 5 per turn.
pub fn spawn_hero(roster: &mut UnitRoster, at: Vec2) -> UnitId {
    roster.spawn(|id| {
        Unit::new(id, "Hero", Side::Player)
            .with_stats(CombatStats::new(40, 0, 9, 2))
            .with_action_points(ActionPoints::new(10, 5))
            .at(at)
    })
}

/// Free-acting player unit.
pub fn spawn_troop(roster: &mut UnitRoster, name: &str, at: Vec2) -> UnitId {
    roster.spawn(|id| {
        Unit::new(id, name, Side::Player)
            .with_stats(CombatStats::new(15, 2, 4, 1))
            .at(at)
    })
}

/// Free-acting enemy: attack 10, defense 10, speed 5, range 1.
pub fn spawn_grunt(roster: &mut UnitRoster, at: Vec2) -> UnitId {
    roster.spawn(|id| {
        Unit::new(id, "Grunt", Side::Enemy)
            .with_stats(CombatStats::new(10, 10, 5, 1))
            .at(at)
    })
}

// =============================================================================
// State Accessors
// =============================================================================

/// Current health, or 0 for an unknown id.
pub fn health(roster: &UnitRoster, id: UnitId) -> i32 {
    roster.get(id).map_or(0, |unit| unit.health())
}

/// Current AP, or 0 for a unit without a pool.
pub fn ap(roster: &UnitRoster, id: UnitId) -> u32 {
    roster
        .get(id)
        .and_then(|unit| unit.action_points())
        .map_or(0, ActionPoints::current)
}

/// Drains a unit's AP pool.
pub fn drain_ap(roster: &mut UnitRoster, id: UnitId) {
    if let Some(pool) = roster.get_mut(id).and_then(|unit| unit.action_points_mut()) {
        let current = pool.current();
        pool.spend(current);
    }
}

// =============================================================================
// Drivers
// =============================================================================

/// Plays the active player unit: attack whatever is in reach, otherwise skip.
pub fn play_player_turn(combat: &mut CombatManager, roster: &mut UnitRoster) -> ActionResult {
    let Some(unit) = combat.active_unit() else {
        return combat.skip_turn(roster);
    };
    let attack = combat
        .available_actions(&*roster, unit)
        .into_iter()
        .find(|action: &CombatAction| action.kind() == ActionKind::Attack);
    match attack {
        Some(action) => combat.execute_player_action(roster, action),
        None => combat.skip_turn(roster),
    }
}

/// Runs the fight until it ends or `max_rounds` have passed.
pub fn play_out(combat: &mut CombatManager, roster: &mut UnitRoster, max_rounds: u32) {
    // each iteration makes progress: an action, a skip, or a whole enemy turn
    let mut budget = max_rounds as usize * 64;
    while combat.state() != CombatState::Ended && combat.round() <= max_rounds && budget > 0 {
        budget -= 1;
        if combat.is_player_turn() {
            play_player_turn(combat, roster);
        } else {
            combat.run_enemy_turn(roster);
        }
    }
}

/// A hero and a troop against two grunts, everyone in reach of someone.
pub fn skirmish(seed: u64) -> (CombatManager, UnitRoster, Vec<UnitId>, Vec<UnitId>) {
    let mut roster = UnitRoster::new();
    let hero = spawn_hero(&mut roster, Vec2::ZERO);
    let troop = spawn_troop(&mut roster, "Troop", Vec2::new(0.0, 1.0));
    let grunt_a = spawn_grunt(&mut roster, Vec2::new(1.0, 0.0));
    let grunt_b = spawn_grunt(&mut roster, Vec2::new(1.0, 1.0));

    let players = vec![hero, troop];
    let enemies = vec![grunt_a, grunt_b];
    let mut combat = CombatManager::new(seed);
    combat
        .start_combat(&mut roster, &players, &enemies)
        .expect("valid lineup");
    (combat, roster, players, enemies)
}
