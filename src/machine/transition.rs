//! Action state transitions.

use crate::core::{ActionState, Guard, Priority, VarHandle, WorldState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The states a transition may fire from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FromStates {
    /// Applies in any state
    All,
    /// Applies only in the listed states
    Only(Vec<ActionState>),
}

impl FromStates {
    pub fn contains(&self, state: ActionState) -> bool {
        match self {
            Self::All => true,
            Self::Only(states) => states.contains(&state),
        }
    }
}

impl From<ActionState> for FromStates {
    /// [`ActionState::ALL`] becomes [`FromStates::All`].
    fn from(state: ActionState) -> Self {
        if state == ActionState::ALL {
            Self::All
        } else {
            Self::Only(vec![state])
        }
    }
}

impl From<Vec<ActionState>> for FromStates {
    fn from(states: Vec<ActionState>) -> Self {
        if states.contains(&ActionState::ALL) {
            Self::All
        } else {
            Self::Only(states)
        }
    }
}

impl<const N: usize> From<[ActionState; N]> for FromStates {
    fn from(states: [ActionState; N]) -> Self {
        Self::from(states.to_vec())
    }
}

/// A guarded rule mapping (current state, world state) to a next state.
///
/// Transitions hold no mutable state of their own. Everything they read or
/// write lives in the world state they are handed or in the [`AstVar`]s
/// they report through [`vars`](Self::vars), so one definition can run
/// against a real machine and a simulated copy without interference.
///
/// [`AstVar`]: crate::core::AstVar
pub trait ActionStateTransition: Send + Sync {
    fn name(&self) -> &str;

    /// Lower values are evaluated first.
    fn priority(&self) -> Priority;

    fn from_states(&self) -> &FromStates;

    /// Cells this transition reads or writes. The machine checkpoints them.
    fn vars(&self) -> Vec<VarHandle> {
        Vec::new()
    }

    /// Pure check of whether the transition applies now.
    fn condition(&self, world: &WorldState) -> bool;

    /// Run the transition and return the next state.
    ///
    /// [`ActionState::NONE`] means the step is still in progress: the machine
    /// stays put and moves on to the next candidate. [`ActionState::ALL`]
    /// and [`ActionState::START`] are rejected as targets.
    fn effect(&self, world: &mut WorldState) -> ActionState;

    /// Resolve this transition against the current state.
    ///
    /// Returns [`ActionState::NONE`] when `current` is not a from-state or
    /// the condition fails. Otherwise runs the effect and returns its result,
    /// which is also NONE while the effect is in progress.
    fn evaluate(&self, current: ActionState, world: &mut WorldState) -> ActionState {
        if !self.from_states().contains(current) {
            return ActionState::NONE;
        }
        if !self.condition(world) {
            return ActionState::NONE;
        }
        self.effect(world)
    }
}

/// Type alias for transition effect functions.
pub type TransitionEffect = Arc<dyn Fn(&mut WorldState) -> ActionState + Send + Sync>;

/// Closure-backed transition, usually built with
/// [`TransitionBuilder`](crate::builder::TransitionBuilder).
#[derive(Clone)]
pub struct Transition {
    pub name: String,
    pub priority: Priority,
    pub from: FromStates,
    pub guard: Option<Guard>,
    pub effect: TransitionEffect,
    pub vars: Vec<VarHandle>,
}

impl Transition {
    /// Check if this transition would fire from `current` (pure).
    pub fn can_execute(&self, current: ActionState, world: &WorldState) -> bool {
        self.from.contains(current) && self.condition(world)
    }
}

impl ActionStateTransition for Transition {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn from_states(&self) -> &FromStates {
        &self.from
    }

    fn vars(&self) -> Vec<VarHandle> {
        self.vars.clone()
    }

    fn condition(&self, world: &WorldState) -> bool {
        self.guard.as_ref().is_none_or(|g| g.check(world))
    }

    fn effect(&self, world: &mut WorldState) -> ActionState {
        (self.effect)(world)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("from", &self.from)
            .field("guarded", &self.guard.is_some())
            .field("vars", &self.vars.len())
            .finish()
    }
}
