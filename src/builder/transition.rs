//! Builder for constructing action state transitions.

use crate::builder::error::BuildError;
use crate::core::{ActionState, AstVar, Guard, Priority, VarHandle, WorldProperty, WorldState};
use crate::machine::{FromStates, Transition, TransitionEffect};
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
///
/// A transition needs a name, its source states and an effect. Priority
/// defaults to [`Priority::HIGH`]; without a condition the transition fires
/// whenever the machine is in one of its source states.
#[derive(Default)]
pub struct TransitionBuilder {
    name: Option<String>,
    priority: Priority,
    from: Option<FromStates>,
    guard: Option<Guard>,
    effect: Option<TransitionEffect>,
    vars: Vec<VarHandle>,
}

impl TransitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transition name (required, unique within a machine).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Add a source state. May be called repeatedly.
    ///
    /// Passing [`ActionState::ALL`] makes the transition apply everywhere.
    pub fn from(mut self, state: ActionState) -> Self {
        self.from = Some(match self.from.take() {
            Some(FromStates::All) => FromStates::All,
            Some(FromStates::Only(mut states)) => {
                states.push(state);
                FromStates::from(states)
            }
            None => FromStates::from(state),
        });
        self
    }

    /// Replace the source states.
    pub fn from_states(mut self, states: impl Into<FromStates>) -> Self {
        self.from = Some(states.into());
        self
    }

    /// Apply in every state.
    pub fn from_any(mut self) -> Self {
        self.from = Some(FromStates::All);
        self
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a condition using a closure.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&WorldState) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Fire only while a world flag is set.
    pub fn when_flag(mut self, property: WorldProperty) -> Self {
        self.guard = Some(Guard::flag(property));
        self
    }

    /// Set the effect. It runs once per firing and returns the next state.
    pub fn effect<F>(mut self, effect: F) -> Self
    where
        F: Fn(&mut WorldState) -> ActionState + Send + Sync + 'static,
    {
        self.effect = Some(Arc::new(effect));
        self
    }

    /// Effect that moves straight to `state` without side effects.
    pub fn to(self, state: ActionState) -> Self {
        self.effect(move |_: &mut WorldState| state)
    }

    /// Declare a cell the transition reads or writes, so machines include it
    /// in checkpoints.
    pub fn uses<T>(mut self, var: &AstVar<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.vars.push(var.handle());
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition, BuildError> {
        let name = self.name.ok_or(BuildError::MissingName)?;
        let from = self.from.ok_or(BuildError::MissingFromStates)?;
        let effect = self.effect.ok_or(BuildError::MissingEffect)?;

        Ok(Transition {
            name,
            priority: self.priority,
            from,
            guard: self.guard,
            effect,
            vars: self.vars,
        })
    }
}
