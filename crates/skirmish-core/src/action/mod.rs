//! Combat actions.
//!
//! Every action is an immutable value built with all of its parameters up
//! front. Each one implements [`Action`]:
//!
//! - [`Action::validate`] is a pure check that reports why the action cannot
//!   run, if it cannot.
//! - [`Action::execute`] validates again, pays the AP cost, applies the effect
//!   exactly once, and reports what happened. A failed precondition returns a
//!   failure [`ActionResult`] with `ap_spent == 0` and touches nothing.
//!
//! [`CombatAction`] is the closed set of built-in actions, which is what the
//! manager and enemy controllers pass around.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use skirmish_core::action::{Action, ActionContext, Attack};
//! use skirmish_core::action_points::ActionPoints;
//! use skirmish_core::board::OpenBoard;
//! use skirmish_core::config::CombatConfig;
//! use skirmish_core::damage::DamageSystem;
//! use skirmish_core::rng::SeededRng;
//! use skirmish_core::roster::UnitRoster;
//! use skirmish_core::unit::{Side, Unit};
//!
//! let mut roster = UnitRoster::new();
//! let a = roster.spawn(|id| Unit::new(id, "A", Side::Player).with_action_points(ActionPoints::new(10, 5)));
//! let b = roster.spawn(|id| Unit::new(id, "B", Side::Enemy).at(Vec2::new(1.0, 0.0)));
//!
//! let board = OpenBoard::new();
//! let damage = DamageSystem::default();
//! let config = CombatConfig::default();
//! let mut rng = SeededRng::new(1);
//! let mut ctx = ActionContext {
//!     roster: &mut roster,
//!     board: &board,
//!     damage: &damage,
//!     rng: &mut rng,
//!     config: &config,
//! };
//!
//! let result = Attack::new(a, b).execute(&mut ctx);
//! assert!(result.success);
//! assert_eq!(result.ap_spent, 3);
//! ```

mod attack;
mod defend;
mod movement;
mod skip;
mod use_item;

pub use attack::{Attack, Weapon};
pub use defend::Defend;
pub use movement::Move;
pub use skip::Skip;
pub use use_item::UseItem;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::CombatConfig;
use crate::damage::DamageSystem;
use crate::rng::CombatRng;
use crate::roster::Roster;
use crate::unit::{Combatant, UnitId};

/// Kind of action, used for cost lookup and UI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Strike a target.
    Attack,
    /// Brace against incoming damage.
    Defend,
    /// Step to an adjacent tile.
    Move,
    /// Use an inventory item.
    UseItem,
    /// Ability slot; no built-in action uses it.
    Special,
    /// End the turn early.
    Skip,
}

impl ActionKind {
    /// Base AP cost before weapon, terrain or item adjustments.
    #[must_use]
    pub const fn base_cost(self) -> u32 {
        match self {
            Self::Move | Self::UseItem => 2,
            Self::Attack => 3,
            Self::Defend => 1,
            Self::Special => 4,
            Self::Skip => 0,
        }
    }

    /// Label for menus.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Attack => "Attack",
            Self::Defend => "Defend",
            Self::Move => "Move",
            Self::UseItem => "Use Item",
            Self::Special => "Special",
            Self::Skip => "Skip Turn",
        }
    }

    /// One-line help text for menus.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Attack => "Strike an enemy within range.",
            Self::Defend => "Reduce incoming damage until your next turn.",
            Self::Move => "Step to an adjacent tile.",
            Self::UseItem => "Use an item from your inventory.",
            Self::Special => "Use a special ability.",
            Self::Skip => "End your turn early and recover extra AP.",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Result category of an action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// The action ran.
    Success,
    /// Not enough action points.
    FailedNoAp,
    /// A required target was missing.
    FailedNoTarget,
    /// The target exists but cannot be reached.
    FailedOutOfRange,
    /// Any other unmet precondition.
    FailedInvalid,
    /// Withdrawn before it ran.
    Cancelled,
}

impl ActionOutcome {
    /// Returns `true` for [`ActionOutcome::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What an action did, or why it did nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the action ran.
    pub success: bool,
    /// Result category.
    pub outcome: ActionOutcome,
    /// Human-readable summary.
    pub message: String,
    /// AP actually deducted.
    pub ap_spent: u32,
    /// Health actually removed from the target.
    pub damage_dealt: i32,
    /// Effect tags produced.
    pub effects: Vec<String>,
}

impl ActionResult {
    /// A successful result with nothing spent or dealt yet.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            outcome: ActionOutcome::Success,
            message: message.into(),
            ap_spent: 0,
            damage_dealt: 0,
            effects: Vec::new(),
        }
    }

    /// A failed result. Failures never spend AP or deal damage.
    #[must_use]
    pub fn failure(outcome: ActionOutcome, message: impl Into<String>) -> Self {
        Self {
            success: false,
            outcome,
            message: message.into(),
            ap_spent: 0,
            damage_dealt: 0,
            effects: Vec::new(),
        }
    }

    /// Records the AP deducted.
    #[must_use]
    pub fn with_ap_spent(mut self, ap: u32) -> Self {
        self.ap_spent = ap;
        self
    }

    /// Records the damage dealt.
    #[must_use]
    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage_dealt = damage;
        self
    }

    /// Records effect tags.
    #[must_use]
    pub fn with_effects<S: Into<String>>(mut self, effects: impl IntoIterator<Item = S>) -> Self {
        self.effects = effects.into_iter().map(Into::into).collect();
        self
    }
}

impl From<Rejection> for ActionResult {
    fn from(rejection: Rejection) -> Self {
        Self::failure(rejection.outcome, rejection.reason)
    }
}

/// Why an action cannot run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Failure category.
    pub outcome: ActionOutcome,
    /// Human-readable reason.
    pub reason: &'static str,
}

impl Rejection {
    /// Not enough action points.
    pub const NO_AP: Self = Self::new(ActionOutcome::FailedNoAp, "not enough action points");
    /// A target is required.
    pub const NO_TARGET: Self = Self::new(ActionOutcome::FailedNoTarget, "no target selected");
    /// The target is beyond reach.
    pub const OUT_OF_RANGE: Self = Self::new(ActionOutcome::FailedOutOfRange, "target out of range");

    /// Builds a rejection.
    #[must_use]
    pub const fn new(outcome: ActionOutcome, reason: &'static str) -> Self {
        Self { outcome, reason }
    }

    /// A generic invalid-action rejection.
    #[must_use]
    pub const fn invalid(reason: &'static str) -> Self {
        Self::new(ActionOutcome::FailedInvalid, reason)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}

/// Read-only state an action is validated against.
#[derive(Clone, Copy)]
pub struct ActionView<'a> {
    /// Combatant lookup.
    pub roster: &'a dyn Roster,
    /// Map queries.
    pub board: &'a dyn Board,
    /// Tuning.
    pub config: &'a CombatConfig,
}

/// Everything an action needs to run.
pub struct ActionContext<'a> {
    /// Combatant lookup; the only mutable state an action touches.
    pub roster: &'a mut dyn Roster,
    /// Map queries.
    pub board: &'a dyn Board,
    /// Damage resolution.
    pub damage: &'a DamageSystem,
    /// Random draws.
    pub rng: &'a mut dyn CombatRng,
    /// Tuning.
    pub config: &'a CombatConfig,
}

impl ActionContext<'_> {
    /// Read-only view for validation.
    #[must_use]
    pub fn view(&self) -> ActionView<'_> {
        ActionView {
            roster: &*self.roster,
            board: self.board,
            config: self.config,
        }
    }
}

/// One combat mechanic.
pub trait Action {
    /// The acting unit.
    fn performer(&self) -> UnitId;

    /// Kind, for cost lookup and UI.
    fn kind(&self) -> ActionKind;

    /// AP cost before the performer's cost multiplier.
    fn cost(&self, _view: &ActionView<'_>) -> u32 {
        self.kind().base_cost()
    }

    /// Checks every precondition without side effects.
    ///
    /// # Errors
    ///
    /// Returns the first unmet precondition.
    fn validate(&self, view: &ActionView<'_>) -> Result<(), Rejection>;

    /// Returns `true` if [`Action::validate`] passes.
    fn can_execute(&self, view: &ActionView<'_>) -> bool {
        self.validate(view).is_ok()
    }

    /// Runs the action. All-or-nothing.
    fn execute(&self, ctx: &mut ActionContext<'_>) -> ActionResult;
}

/// Checks that the performer exists, is alive and can pay `cost`.
///
/// Performers without an AP pool can always pay.
pub(crate) fn check_performer(
    view: &ActionView<'_>,
    performer: UnitId,
    cost: u32,
) -> Result<(), Rejection> {
    let unit = view
        .roster
        .get(performer)
        .ok_or(Rejection::invalid("performer is not in the roster"))?;
    if !unit.is_alive() {
        return Err(Rejection::invalid("performer is down"));
    }
    match unit.action_points() {
        Some(ap) if !ap.can_afford(cost) => Err(Rejection::NO_AP),
        _ => Ok(()),
    }
}

/// Deducts `cost` from the performer's pool and returns what was deducted.
///
/// Must only be called after validation passed, so the spend cannot fail.
pub(crate) fn pay(ctx: &mut ActionContext<'_>, performer: UnitId, cost: u32) -> u32 {
    let Some(ap) = ctx
        .roster
        .get_mut(performer)
        .and_then(|unit| unit.action_points_mut())
    else {
        return 0;
    };
    let actual = ap.effective_cost(cost);
    if ap.spend(cost) {
        actual
    } else {
        0
    }
}

/// Display name of a unit, or its id if it is not in the roster.
pub(crate) fn name_of(roster: &dyn Roster, id: UnitId) -> String {
    roster
        .get(id)
        .map_or_else(|| format!("unit {id}"), |unit| unit.name().to_string())
}

/// Menu entry for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    /// Kind.
    pub kind: ActionKind,
    /// Label.
    pub name: String,
    /// Help text.
    pub description: String,
    /// AP the performer would pay, after its multiplier.
    pub cost: u32,
    /// Whether it would pass validation now.
    pub usable: bool,
}

/// The built-in actions.
#[derive(Debug, Clone)]
pub enum CombatAction {
    /// See [`Attack`].
    Attack(Attack),
    /// See [`Defend`].
    Defend(Defend),
    /// See [`Move`].
    Move(Move),
    /// See [`UseItem`].
    UseItem(UseItem),
    /// See [`Skip`].
    Skip(Skip),
}

impl CombatAction {
    fn inner(&self) -> &dyn Action {
        match self {
            Self::Attack(a) => a,
            Self::Defend(a) => a,
            Self::Move(a) => a,
            Self::UseItem(a) => a,
            Self::Skip(a) => a,
        }
    }

    /// Menu entry as seen by the performer right now.
    #[must_use]
    pub fn info(&self, view: &ActionView<'_>) -> ActionInfo {
        let kind = self.kind();
        let base = self.cost(view);
        let cost = view
            .roster
            .get(self.performer())
            .and_then(|unit| unit.action_points())
            .map_or(base, |ap| ap.effective_cost(base));
        ActionInfo {
            kind,
            name: kind.display_name().to_string(),
            description: kind.description().to_string(),
            cost,
            usable: self.can_execute(view),
        }
    }
}

impl Action for CombatAction {
    fn performer(&self) -> UnitId {
        self.inner().performer()
    }

    fn kind(&self) -> ActionKind {
        self.inner().kind()
    }

    fn cost(&self, view: &ActionView<'_>) -> u32 {
        self.inner().cost(view)
    }

    fn validate(&self, view: &ActionView<'_>) -> Result<(), Rejection> {
        self.inner().validate(view)
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> ActionResult {
        self.inner().execute(ctx)
    }
}

impl From<Attack> for CombatAction {
    fn from(action: Attack) -> Self {
        Self::Attack(action)
    }
}

impl From<Defend> for CombatAction {
    fn from(action: Defend) -> Self {
        Self::Defend(action)
    }
}

impl From<Move> for CombatAction {
    fn from(action: Move) -> Self {
        Self::Move(action)
    }
}

impl From<UseItem> for CombatAction {
    fn from(action: UseItem) -> Self {
        Self::UseItem(action)
    }
}

impl From<Skip> for CombatAction {
    fn from(action: Skip) -> Self {
        Self::Skip(action)
    }
}
