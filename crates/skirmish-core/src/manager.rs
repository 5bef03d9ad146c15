//! Combat state machine.
//!
//! [`CombatManager`] owns everything about one fight except the combatants
//! themselves, which stay in the host's [`Roster`] and are passed into each
//! call. A fight moves through:
//!
//! ```text
//! Inactive -> Setup -> WaitingPlayer <-> WaitingEnemy -> Ended
//! ```
//!
//! The manager is the single writer of combat state:
//!
//! - Only the active unit may act, and player submissions are only accepted
//!   while waiting for the player side. Anything else is rejected with
//!   [`ActionOutcome::FailedInvalid`] and changes nothing.
//! - After a successful action that leaves the performer without AP (or any
//!   action by a unit with no AP pool), that unit's turn ends automatically.
//!   Skipping always ends the turn.
//! - When either side has no living units the fight ends and the surviving
//!   side is recorded as winner.
//!
//! At the start of each unit's turn the unit recovers AP and drops any
//! defending stance left over from its previous turn.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use skirmish_core::action::Attack;
//! use skirmish_core::action_points::ActionPoints;
//! use skirmish_core::manager::{CombatManager, CombatState};
//! use skirmish_core::roster::UnitRoster;
//! use skirmish_core::unit::{CombatStats, Side, Unit};
//!
//! let mut roster = UnitRoster::new();
//! let hero = roster.spawn(|id| {
//!     Unit::new(id, "Hero", Side::Player)
//!         .with_stats(CombatStats::new(40, 0, 9, 2))
//!         .with_action_points(ActionPoints::new(10, 5))
//! });
//! let grunt = roster.spawn(|id| Unit::new(id, "Grunt", Side::Enemy).at(Vec2::new(1.0, 0.0)));
//!
//! let mut combat = CombatManager::new(7);
//! combat.start_combat(&mut roster, &[hero], &[grunt]).unwrap();
//! assert_eq!(combat.state(), CombatState::WaitingPlayer);
//! assert_eq!(combat.active_unit(), Some(hero));
//!
//! let result = combat.execute_player_action(&mut roster, Attack::new(hero, grunt));
//! assert_eq!(result.ap_spent, 3);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::action::{
    name_of, Action, ActionContext, ActionInfo, ActionOutcome, ActionResult, ActionView, Attack,
    CombatAction, Defend, Skip, UseItem,
};
use crate::action_points::ActionPoints;
use crate::ai::{ApproachAndStrike, EnemyController};
use crate::board::{Board, OpenBoard};
use crate::config::CombatConfig;
use crate::damage::DamageSystem;
use crate::error::{CombatError, ConfigError, Result};
use crate::event::{CombatEvent, CombatLog};
use crate::rng::{CombatRng, SeededRng};
use crate::roster::Roster;
use crate::targeting::{TargetQuery, TargetingSystem};
use crate::turn::{Lineup, TurnOrder, TurnQueue};
use crate::unit::{Combatant, Side, UnitId};

/// Upper bound on actions a single enemy may take in one turn.
pub const MAX_ENEMY_ACTIONS: usize = 16;

/// Where the fight is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatState {
    /// No fight has started.
    #[default]
    Inactive,
    /// Units are being prepared.
    Setup,
    /// A player unit is active and input is expected.
    WaitingPlayer,
    /// An enemy unit is active.
    WaitingEnemy,
    /// The fight is over.
    Ended,
}

impl CombatState {
    /// Returns `true` while a unit is expected to act.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::WaitingPlayer | Self::WaitingEnemy)
    }
}

// =============================================================================
// CombatManager
// =============================================================================

/// Runs one fight.
pub struct CombatManager {
    config: CombatConfig,
    damage: DamageSystem,
    board: Box<dyn Board + Send>,
    rng: Box<dyn CombatRng>,
    turns: Box<dyn TurnOrder>,
    controller: Box<dyn EnemyController>,
    state: CombatState,
    lineup: Lineup,
    fallen: BTreeSet<UnitId>,
    events: Vec<CombatEvent>,
    log: CombatLog,
    winner: Option<Side>,
    last_round: u32,
}

impl CombatManager {
    /// Manager with default tuning, an unbounded [`OpenBoard`], a
    /// [`SeededRng`] seeded with `seed`, initiative turn order and the
    /// [`ApproachAndStrike`] enemy controller.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::build(seed, CombatConfig::default())
    }

    /// Like [`CombatManager::new`] with custom tuning.
    ///
    /// # Errors
    ///
    /// Returns the first problem [`CombatConfig::validate`] finds.
    pub fn with_config(seed: u64, config: CombatConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(seed, config))
    }

    fn build(seed: u64, config: CombatConfig) -> Self {
        Self {
            damage: DamageSystem::new(config.damage.clone()),
            board: Box::new(OpenBoard::new()),
            rng: Box::new(SeededRng::new(seed)),
            turns: Box::new(TurnQueue::new().with_jitter(config.initiative_jitter)),
            controller: Box::new(ApproachAndStrike),
            state: CombatState::Inactive,
            lineup: Lineup::default(),
            fallen: BTreeSet::new(),
            events: Vec::new(),
            log: CombatLog::new(config.log_capacity),
            winner: None,
            last_round: 0,
            config,
        }
    }

    /// Replaces the map.
    #[must_use]
    pub fn with_board(mut self, board: impl Board + Send + 'static) -> Self {
        self.board = Box::new(board);
        self
    }

    /// Replaces the random source.
    #[must_use]
    pub fn with_rng(mut self, rng: impl CombatRng + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Replaces the turn-order policy.
    #[must_use]
    pub fn with_turn_order(mut self, turns: impl TurnOrder + 'static) -> Self {
        self.turns = Box::new(turns);
        self
    }

    /// Replaces the enemy controller.
    #[must_use]
    pub fn with_controller(mut self, controller: impl EnemyController + 'static) -> Self {
        self.controller = Box::new(controller);
        self
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Starts a fight between the listed units.
    ///
    /// Dead units are left out. Every AP pool is reset, the combat log and
    /// event queue are cleared, and the first unit's turn begins. If either
    /// side has nobody alive the fight ends at once.
    ///
    /// # Errors
    ///
    /// - [`CombatError::UnknownUnit`] if an id is not in the roster.
    /// - [`CombatError::DuplicateUnit`] if an id is listed twice.
    /// - [`CombatError::WrongSide`] if a unit's owner disagrees with the list
    ///   it appears in.
    ///
    /// Nothing changes when an error is returned.
    pub fn start_combat(
        &mut self,
        roster: &mut dyn Roster,
        players: &[UnitId],
        enemies: &[UnitId],
    ) -> Result<()> {
        check_lineup(&*roster, players, enemies)?;

        self.state = CombatState::Setup;
        self.events.clear();
        self.log.clear();
        self.fallen.clear();
        self.winner = None;
        self.last_round = 0;

        let alive = |ids: &[UnitId]| -> Vec<UnitId> {
            ids.iter().copied().filter(|id| roster.is_alive(*id)).collect()
        };
        self.lineup = Lineup::new(alive(players), alive(enemies));

        for id in self.lineup.all() {
            if let Some(unit) = roster.get_mut(id) {
                if let Some(ap) = unit.action_points_mut() {
                    ap.reset();
                }
                unit.set_defending(false, 1.0);
            }
        }

        info!(
            players = self.lineup.players.len(),
            enemies = self.lineup.enemies.len(),
            "combat started"
        );
        self.events.push(CombatEvent::CombatStarted {
            players: self.lineup.players.clone(),
            enemies: self.lineup.enemies.clone(),
        });
        self.log.push(format!(
            "Combat started: {} vs {}",
            self.lineup.players.len(),
            self.lineup.enemies.len()
        ));

        if self.lineup.players.is_empty() || self.lineup.enemies.is_empty() {
            self.end_combat(roster);
            return Ok(());
        }

        match self.turns.start(&self.lineup, &*roster, &mut *self.rng) {
            Some(first) => self.begin_turn(roster, first),
            None => self.end_combat(roster),
        }
        Ok(())
    }

    /// Ends the fight now.
    ///
    /// Clears every defending stance and records the side that still has
    /// living units as winner; if both or neither do, there is no winner.
    /// Does nothing if the fight already ended.
    pub fn end_combat(&mut self, roster: &mut dyn Roster) {
        if self.state == CombatState::Ended {
            return;
        }
        self.state = CombatState::Ended;

        for id in self.lineup.all() {
            if let Some(unit) = roster.get_mut(id) {
                unit.set_defending(false, 1.0);
            }
        }

        let players_standing = !self.alive_player_units(&*roster).is_empty();
        let enemies_standing = !self.alive_enemy_units(&*roster).is_empty();
        self.winner = match (players_standing, enemies_standing) {
            (true, false) => Some(Side::Player),
            (false, true) => Some(Side::Enemy),
            _ => None,
        };

        info!(winner = ?self.winner, round = self.turns.round(), "combat ended");
        self.log.push(match self.winner {
            Some(side) => format!("Combat over: {side} side wins"),
            None => "Combat over: no winner".to_string(),
        });
        self.events.push(CombatEvent::CombatEnded {
            winner: self.winner,
        });
    }

    // -------------------------------------------------------------------------
    // Turn flow
    // -------------------------------------------------------------------------

    /// Ends the active unit's turn and hands over to the next unit.
    ///
    /// Ends the fight if no unit is left to act. Does nothing unless a turn is
    /// in progress.
    pub fn end_current_turn(&mut self, roster: &mut dyn Roster) {
        if !self.state.is_running() {
            return;
        }
        if let Some(unit) = self.turns.active_unit() {
            debug!(unit = %unit, "turn ended");
            self.events.push(CombatEvent::TurnEnded { unit });
        }
        self.advance(roster);
    }

    fn advance(&mut self, roster: &mut dyn Roster) {
        match self.turns.advance(&*roster, &mut *self.rng) {
            Some(next) => self.begin_turn(roster, next),
            None => self.end_combat(roster),
        }
    }

    fn begin_turn(&mut self, roster: &mut dyn Roster, unit: UnitId) {
        let round = self.turns.round();
        if round != self.last_round {
            self.last_round = round;
            debug!(round, "round started");
            self.events.push(CombatEvent::RoundStarted { round });
        }

        let Some(combatant) = roster.get_mut(unit) else {
            self.advance(roster);
            return;
        };
        combatant.set_defending(false, 1.0);
        if let Some(ap) = combatant.action_points_mut() {
            ap.recover();
        }
        let side = combatant.owner();
        let ap = combatant.action_points().map(ActionPoints::current);

        self.state = match side {
            Side::Player => CombatState::WaitingPlayer,
            Side::Enemy => CombatState::WaitingEnemy,
        };
        debug!(unit = %unit, %side, round, ap, "turn started");
        self.log.push(format!(
            "Round {round}: {}'s turn",
            name_of(&*roster, unit)
        ));
        self.events.push(CombatEvent::TurnStarted { unit, side, round });
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Runs an action submitted by the player for the active player unit.
    ///
    /// Rejected with [`ActionOutcome::FailedInvalid`] and no side effects
    /// unless the manager is waiting for the player and the performer is the
    /// active unit.
    pub fn execute_player_action(
        &mut self,
        roster: &mut dyn Roster,
        action: impl Into<CombatAction>,
    ) -> ActionResult {
        let action = action.into();
        if let Err(reason) = self.check_submission(&action, Side::Player) {
            warn!(unit = %action.performer(), kind = %action.kind(), reason, "submission rejected");
            return ActionResult::failure(ActionOutcome::FailedInvalid, reason);
        }
        self.perform(roster, action)
    }

    /// The active unit skips its turn, recovering bonus AP. Usable on either
    /// side's turn.
    pub fn skip_turn(&mut self, roster: &mut dyn Roster) -> ActionResult {
        let active = self.turns.active_unit().filter(|_| self.state.is_running());
        let Some(unit) = active else {
            warn!(state = ?self.state, "skip requested with no active unit");
            return ActionResult::failure(ActionOutcome::FailedInvalid, "no unit is acting");
        };
        self.perform(roster, Skip::new(unit).into())
    }

    /// Lets the enemy controller play the active enemy's turn.
    ///
    /// Asks for actions until the controller passes, an action fails, the
    /// turn ends on its own, or [`MAX_ENEMY_ACTIONS`] is reached; the turn is
    /// then ended if it has not been already. Returns every result produced.
    pub fn run_enemy_turn(&mut self, roster: &mut dyn Roster) -> Vec<ActionResult> {
        let mut results = Vec::new();
        let Some(unit) = self
            .turns
            .active_unit()
            .filter(|_| self.state == CombatState::WaitingEnemy)
        else {
            return results;
        };

        for _ in 0..MAX_ENEMY_ACTIONS {
            let choice = {
                let view = ActionView {
                    roster: &*roster,
                    board: &*self.board,
                    config: &self.config,
                };
                self.controller.next_action(unit, &view)
            };
            let Some(action) = choice.filter(|action| action.performer() == unit) else {
                break;
            };

            let result = self.perform(roster, action);
            let failed = !result.success;
            results.push(result);
            if failed || !self.is_acting(unit) {
                break;
            }
        }

        if self.is_acting(unit) {
            self.end_current_turn(roster);
        }
        results
    }

    /// Runs enemy turns until a player unit is up or the fight ends.
    pub fn run_enemy_phase(&mut self, roster: &mut dyn Roster) -> Vec<ActionResult> {
        let mut results = Vec::new();
        let bound = self.lineup.enemies.len().max(1) * 2;
        for _ in 0..bound {
            if self.state != CombatState::WaitingEnemy {
                break;
            }
            results.extend(self.run_enemy_turn(roster));
        }
        results
    }

    fn is_acting(&self, unit: UnitId) -> bool {
        self.state.is_running() && self.turns.active_unit() == Some(unit)
    }

    fn check_submission(&self, action: &CombatAction, side: Side) -> Result<(), &'static str> {
        let expected = match side {
            Side::Player => CombatState::WaitingPlayer,
            Side::Enemy => CombatState::WaitingEnemy,
        };
        if self.state != expected {
            return Err("not waiting for this side");
        }
        let performer = action.performer();
        if self.turns.active_unit() != Some(performer) {
            return Err("it is not this unit's turn");
        }
        let roster_side = match side {
            Side::Player => &self.lineup.players,
            Side::Enemy => &self.lineup.enemies,
        };
        if !roster_side.contains(&performer) {
            return Err("unit is not fighting on this side");
        }
        Ok(())
    }

    fn perform(&mut self, roster: &mut dyn Roster, action: CombatAction) -> ActionResult {
        let performer = action.performer();
        let kind = action.kind();

        let result = {
            let mut ctx = ActionContext {
                roster: &mut *roster,
                board: &*self.board,
                damage: &self.damage,
                rng: &mut *self.rng,
                config: &self.config,
            };
            action.execute(&mut ctx)
        };

        debug!(
            unit = %performer,
            %kind,
            outcome = ?result.outcome,
            ap = result.ap_spent,
            damage = result.damage_dealt,
            "action executed"
        );
        self.log.push(result.message.clone());
        self.events.push(CombatEvent::ActionExecuted {
            performer,
            kind,
            result: result.clone(),
        });

        if !result.success {
            return result;
        }

        self.collect_dead(roster);
        if self.state == CombatState::Ended {
            return result;
        }

        match self.turns.active_unit() {
            Some(unit) if unit == performer => {}
            Some(promoted) => {
                self.begin_turn(roster, promoted);
                return result;
            }
            None => {
                self.advance(roster);
                return result;
            }
        }
        if matches!(action, CombatAction::Skip(_)) || turn_spent(&*roster, performer) {
            self.end_current_turn(roster);
        }
        result
    }

    fn collect_dead(&mut self, roster: &mut dyn Roster) {
        let newly_dead: Vec<UnitId> = self
            .lineup
            .all()
            .filter(|id| !self.fallen.contains(id) && !roster.is_alive(*id))
            .collect();
        if newly_dead.is_empty() {
            return;
        }

        for unit in newly_dead {
            self.fallen.insert(unit);
            let side = if self.lineup.players.contains(&unit) {
                Side::Player
            } else {
                Side::Enemy
            };
            let name = name_of(&*roster, unit);
            info!(unit = %unit, %side, "unit died");
            self.log.push(format!("{name} has fallen"));
            self.events.push(CombatEvent::UnitDied { unit, side });
        }
        self.turns.remove_dead(&*roster);

        if self.alive_player_units(&*roster).is_empty() || self.alive_enemy_units(&*roster).is_empty()
        {
            self.end_combat(roster);
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Checks whether `action` would be accepted right now, without running
    /// it.
    #[must_use]
    pub fn can_execute_action(&self, roster: &dyn Roster, action: &CombatAction) -> bool {
        let side = if self.lineup.enemies.contains(&action.performer()) {
            Side::Enemy
        } else {
            Side::Player
        };
        self.check_submission(action, side).is_ok() && action.can_execute(&self.view(roster))
    }

    /// Ready-made actions `unit` could run right now.
    ///
    /// Attack targets the first reachable opponent, the item action uses the
    /// first carried item on the unit itself. Moves are left out since the
    /// destination has to come from the caller.
    #[must_use]
    pub fn available_actions(&self, roster: &dyn Roster, unit: UnitId) -> Vec<CombatAction> {
        let view = self.view(roster);
        self.candidate_actions(roster, unit)
            .into_iter()
            .filter(|action| action.can_execute(&view))
            .collect()
    }

    /// Menu entries for `unit`, usable or not.
    #[must_use]
    pub fn action_menu(&self, roster: &dyn Roster, unit: UnitId) -> Vec<ActionInfo> {
        let view = self.view(roster);
        self.candidate_actions(roster, unit)
            .iter()
            .map(|action| action.info(&view))
            .collect()
    }

    fn candidate_actions(&self, roster: &dyn Roster, unit: UnitId) -> Vec<CombatAction> {
        let Some(me) = roster.get(unit) else {
            return Vec::new();
        };

        let ids = roster.ids();
        let candidates: Vec<&dyn Combatant> = ids.iter().filter_map(|id| roster.get(*id)).collect();
        #[allow(clippy::cast_precision_loss)]
        let reach = me.range() as f32 * self.config.range_scale;
        let query = TargetQuery::enemies().within(reach).with_line_of_sight();
        let target = TargetingSystem::get_valid_targets(me, &candidates, &query, &*self.board)
            .first()
            .map(|target| target.id());

        let mut actions = vec![
            CombatAction::from(Attack::new(unit, target)),
            CombatAction::from(Defend::new(unit)),
        ];
        if let Some(item) = me.inventory().first() {
            actions.push(UseItem::new(unit, item.clone()).into());
        }
        actions.push(Skip::new(unit).into());
        actions
    }

    fn view<'a>(&'a self, roster: &'a dyn Roster) -> ActionView<'a> {
        ActionView {
            roster,
            board: &*self.board,
            config: &self.config,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CombatState {
        self.state
    }

    /// The unit whose turn it is, while the fight runs.
    #[must_use]
    pub fn active_unit(&self) -> Option<UnitId> {
        self.turns.active_unit().filter(|_| self.state.is_running())
    }

    /// The active unit's AP pool, if it has one.
    #[must_use]
    pub fn active_action_points<'r>(&self, roster: &'r dyn Roster) -> Option<&'r ActionPoints> {
        roster
            .get(self.active_unit()?)
            .and_then(|unit| unit.action_points())
    }

    /// Living player units, in listed order.
    #[must_use]
    pub fn alive_player_units(&self, roster: &dyn Roster) -> Vec<UnitId> {
        living(roster, &self.lineup.players)
    }

    /// Living enemy units, in listed order.
    #[must_use]
    pub fn alive_enemy_units(&self, roster: &dyn Roster) -> Vec<UnitId> {
        living(roster, &self.lineup.enemies)
    }

    /// Returns `true` while a player unit is active.
    #[must_use]
    pub fn is_player_turn(&self) -> bool {
        self.state == CombatState::WaitingPlayer
    }

    /// Current round.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.turns.round()
    }

    /// The side that won, once the fight is over.
    #[must_use]
    pub const fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Units taking part, as accepted by [`CombatManager::start_combat`].
    #[must_use]
    pub const fn lineup(&self) -> &Lineup {
        &self.lineup
    }

    /// The turn-order policy.
    #[must_use]
    pub fn turn_order(&self) -> &dyn TurnOrder {
        &*self.turns
    }

    /// Tuning in use.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Human-readable history.
    #[must_use]
    pub const fn log(&self) -> &CombatLog {
        &self.log
    }

    /// Drains and returns every queued event, oldest first.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of queued events.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

fn check_lineup(roster: &dyn Roster, players: &[UnitId], enemies: &[UnitId]) -> Result<()> {
    let mut seen = BTreeSet::new();
    let sides = players
        .iter()
        .map(|id| (*id, Side::Player))
        .chain(enemies.iter().map(|id| (*id, Side::Enemy)));
    for (id, side) in sides {
        let unit = roster.get(id).ok_or(CombatError::UnknownUnit(id))?;
        if !seen.insert(id) {
            return Err(CombatError::DuplicateUnit(id));
        }
        if unit.owner() != side {
            return Err(CombatError::WrongSide(id));
        }
    }
    Ok(())
}

fn living(roster: &dyn Roster, ids: &[UnitId]) -> Vec<UnitId> {
    ids.iter().copied().filter(|id| roster.is_alive(*id)).collect()
}

/// A unit's turn is spent once its pool is empty. Units without a pool get
/// one action per turn.
fn turn_spent(roster: &dyn Roster, unit: UnitId) -> bool {
    roster.get(unit).map_or(true, |unit| {
        unit.action_points().map_or(true, ActionPoints::is_depleted)
    })
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::rng::ScriptedRng;
    use crate::roster::UnitRoster;
    use crate::turn::AlternatingTurns;
    use crate::unit::{CombatStats, Unit};

    fn duel() -> (UnitRoster, UnitId, UnitId) {
        let mut roster = UnitRoster::new();
        let hero = roster.spawn(|id| {
            Unit::new(id, "Hero", Side::Player)
                .with_stats(CombatStats::new(40, 0, 20, 2))
                .with_action_points(ActionPoints::new(10, 5))
        });
        let grunt = roster.spawn(|id| {
            Unit::new(id, "Grunt", Side::Enemy)
                .with_stats(CombatStats::new(10, 10, 1, 1))
                .at(Vec2::new(1.0, 0.0))
        });
        (roster, hero, grunt)
    }

    fn started(rng: ScriptedRng) -> (CombatManager, UnitRoster, UnitId, UnitId) {
        let (mut roster, hero, grunt) = duel();
        let mut combat = CombatManager::new(0).with_rng(rng);
        combat.start_combat(&mut roster, &[hero], &[grunt]).unwrap();
        (combat, roster, hero, grunt)
    }

    mod setup_tests {
        use super::*;

        #[test]
        fn rejects_unknown_unit() {
            let (mut roster, hero, _) = duel();
            let mut combat = CombatManager::new(0);
            let ghost = UnitId::new(99);
            assert_eq!(
                combat.start_combat(&mut roster, &[hero], &[ghost]),
                Err(CombatError::UnknownUnit(ghost))
            );
            assert_eq!(combat.state(), CombatState::Inactive);
        }

        #[test]
        fn rejects_duplicates_and_wrong_side() {
            let (mut roster, hero, grunt) = duel();
            let mut combat = CombatManager::new(0);
            assert_eq!(
                combat.start_combat(&mut roster, &[hero], &[grunt, hero]),
                Err(CombatError::DuplicateUnit(hero))
            );
            assert_eq!(
                combat.start_combat(&mut roster, &[hero, grunt], &[]),
                Err(CombatError::WrongSide(grunt))
            );
        }

        #[test]
        fn empty_side_ends_at_once() {
            let (mut roster, hero, _) = duel();
            let mut combat = CombatManager::new(0);
            combat.start_combat(&mut roster, &[hero], &[]).unwrap();
            assert_eq!(combat.state(), CombatState::Ended);
            assert_eq!(combat.winner(), Some(Side::Player));
            assert_eq!(combat.active_unit(), None);
        }

        #[test]
        fn resets_pools_and_emits_opening_events() {
            let (mut roster, hero, grunt) = duel();
            roster
                .unit_mut(hero)
                .and_then(|u| u.action_points_mut())
                .unwrap()
                .spend(9);

            let mut combat = CombatManager::new(0);
            combat.start_combat(&mut roster, &[hero], &[grunt]).unwrap();
            assert_eq!(combat.active_action_points(&roster).map(ActionPoints::current), Some(10));

            let events = combat.take_events();
            assert!(matches!(events[0], CombatEvent::CombatStarted { .. }));
            assert_eq!(events[1], CombatEvent::RoundStarted { round: 1 });
            assert_eq!(
                events[2],
                CombatEvent::TurnStarted {
                    unit: hero,
                    side: Side::Player,
                    round: 1
                }
            );
            assert_eq!(combat.pending_events(), 0);
        }

        #[test]
        fn invalid_config_is_refused() {
            let config = CombatConfig {
                defend_multiplier: 2.0,
                ..CombatConfig::default()
            };
            assert!(CombatManager::with_config(0, config).is_err());
        }

        #[test]
        fn manager_is_send() {
            fn assert_send<T: Send>() {}
            assert_send::<CombatManager>();
        }
    }

    mod turn_tests {
        use super::*;

        #[test]
        fn depleted_ap_ends_turn() {
            let (mut combat, mut roster, hero, grunt) = started(ScriptedRng::new());
            roster
                .unit_mut(hero)
                .and_then(|u| u.action_points_mut())
                .unwrap()
                .spend(9);

            let result = combat.execute_player_action(&mut roster, Defend::new(hero));
            assert!(result.success);
            assert_eq!(combat.active_unit(), Some(grunt));
            assert_eq!(combat.state(), CombatState::WaitingEnemy);
        }

        #[test]
        fn turn_continues_while_ap_remains() {
            let (mut combat, mut roster, hero, _) = started(ScriptedRng::new());
            combat.execute_player_action(&mut roster, Defend::new(hero));
            assert_eq!(combat.active_unit(), Some(hero));
            assert_eq!(combat.active_action_points(&roster).map(ActionPoints::current), Some(9));
        }

        #[test]
        fn skip_ends_turn() {
            let (mut combat, mut roster, _, grunt) = started(ScriptedRng::new());
            let result = combat.skip_turn(&mut roster);
            assert!(result.success);
            assert_eq!(combat.active_unit(), Some(grunt));
        }

        #[test]
        fn defending_lasts_until_own_next_turn() {
            let (mut combat, mut roster, hero, _) = started(ScriptedRng::new());
            combat.execute_player_action(&mut roster, Defend::new(hero));
            combat.end_current_turn(&mut roster);
            assert!(roster.unit(hero).unwrap().is_defending());

            // grunt passes, hero is up again
            combat.end_current_turn(&mut roster);
            assert_eq!(combat.active_unit(), Some(hero));
            assert!(!roster.unit(hero).unwrap().is_defending());
        }

        #[test]
        fn enemy_turn_is_played_by_controller() {
            // grunt attack: torso roll, hit, no crit
            let rng = ScriptedRng::new().with_ints([0, 0, 50]).with_units([0.0, 0.99]);
            let (mut combat, mut roster, hero, _) = started(rng);
            combat.skip_turn(&mut roster);

            let results = combat.run_enemy_turn(&mut roster);
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].damage_dealt, 10);
            assert_eq!(roster.unit(hero).unwrap().health(), 90);
            assert_eq!(combat.active_unit(), Some(hero));
            assert_eq!(combat.round(), 2);
        }

        #[test]
        fn enemy_turn_noop_on_player_turn() {
            let (mut combat, mut roster, hero, _) = started(ScriptedRng::new());
            assert!(combat.run_enemy_turn(&mut roster).is_empty());
            assert_eq!(combat.active_unit(), Some(hero));
        }

        #[test]
        fn alternating_policy_plugs_in() {
            let (mut roster, hero, grunt) = duel();
            let mut combat = CombatManager::new(0).with_turn_order(AlternatingTurns::new());
            combat.start_combat(&mut roster, &[hero], &[grunt]).unwrap();
            assert_eq!(combat.active_unit(), Some(hero));
            combat.skip_turn(&mut roster);
            assert_eq!(combat.active_unit(), Some(grunt));
        }
    }

    mod rejection_tests {
        use super::*;

        #[test]
        fn not_the_active_unit() {
            let (mut combat, mut roster, _, grunt) = started(ScriptedRng::new());
            let before = combat.pending_events();

            let result = combat.execute_player_action(&mut roster, Defend::new(grunt));
            assert_eq!(result.outcome, ActionOutcome::FailedInvalid);
            assert!(!roster.unit(grunt).unwrap().is_defending());
            assert_eq!(combat.pending_events(), before);
        }

        #[test]
        fn player_cannot_act_on_enemy_turn() {
            let (mut combat, mut roster, hero, _) = started(ScriptedRng::new());
            combat.skip_turn(&mut roster);
            let result = combat.execute_player_action(&mut roster, Defend::new(hero));
            assert_eq!(result.outcome, ActionOutcome::FailedInvalid);
        }

        #[test]
        fn nothing_accepted_after_end() {
            let (mut combat, mut roster, hero, _) = started(ScriptedRng::new());
            combat.end_combat(&mut roster);
            assert_eq!(combat.winner(), None);
            assert_eq!(
                combat.skip_turn(&mut roster).outcome,
                ActionOutcome::FailedInvalid
            );
            assert_eq!(
                combat.execute_player_action(&mut roster, Defend::new(hero)).outcome,
                ActionOutcome::FailedInvalid
            );
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn available_actions_for_hero() {
            let (combat, roster, hero, grunt) = started(ScriptedRng::new());
            let actions = combat.available_actions(&roster, hero);
            let kinds: Vec<_> = actions.iter().map(Action::kind).collect();
            assert_eq!(
                kinds,
                vec![
                    crate::action::ActionKind::Attack,
                    crate::action::ActionKind::Defend,
                    crate::action::ActionKind::Skip
                ]
            );
            match &actions[0] {
                CombatAction::Attack(attack) => assert_eq!(attack.target(), Some(grunt)),
                other => panic!("expected attack, got {other:?}"),
            }
        }

        #[test]
        fn menu_marks_unreachable_attack() {
            let (mut roster, hero, grunt) = duel();
            roster.unit_mut(grunt).unwrap().move_to(Vec2::new(6.0, 0.0));
            let mut combat = CombatManager::new(0);
            combat.start_combat(&mut roster, &[hero], &[grunt]).unwrap();

            let menu = combat.action_menu(&roster, hero);
            assert_eq!(menu[0].name, "Attack");
            assert!(!menu[0].usable);
            assert!(menu[1].usable);
        }

        #[test]
        fn can_execute_checks_turn() {
            let (combat, roster, hero, grunt) = started(ScriptedRng::new());
            assert!(combat.can_execute_action(&roster, &Attack::new(hero, grunt).into()));
            assert!(!combat.can_execute_action(&roster, &Defend::new(grunt).into()));
        }
    }
}
