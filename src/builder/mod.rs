//! Builder API for ergonomic machine construction.
//!
//! Fluent builders for transitions and machines, plus helpers for the two
//! most common transition shapes.

pub mod error;
pub mod machine;
pub mod transition;

pub use error::BuildError;
pub use machine::CmdrActionBuilder;
pub use transition::TransitionBuilder;

use crate::core::{ActionState, Guard, Priority, WorldState};
use crate::machine::{FromStates, Transition};
use std::sync::Arc;

/// Create an unconditional transition that moves from `from` to `to`.
///
/// # Example
///
/// ```
/// use cmdr_action::builder::simple_transition;
/// use cmdr_action::core::{ActionState, Priority};
///
/// let transition = simple_transition("arrive", Priority::HIGH, ActionState::MOVED, ActionState::ARRIVED);
/// assert_eq!(transition.name, "arrive");
/// ```
pub fn simple_transition(
    name: impl Into<String>,
    priority: Priority,
    from: impl Into<FromStates>,
    to: ActionState,
) -> Transition {
    Transition {
        name: name.into(),
        priority,
        from: from.into(),
        guard: None,
        effect: Arc::new(move |_: &mut WorldState| to),
        vars: Vec::new(),
    }
}

/// Create a transition that moves to `to` only while `guard` holds.
///
/// # Example
///
/// ```
/// use cmdr_action::builder::guarded_transition;
/// use cmdr_action::core::{ActionState, Guard, Priority, WorldProperty, WorldState};
///
/// let transition = guarded_transition(
///     "flee",
///     Priority::TOP,
///     ActionState::ALL,
///     ActionState::RTB,
///     Guard::flag(WorldProperty::AwareOfEnemy),
/// );
/// assert!(!transition.can_execute(ActionState::START, &WorldState::new()));
/// ```
pub fn guarded_transition(
    name: impl Into<String>,
    priority: Priority,
    from: impl Into<FromStates>,
    to: ActionState,
    guard: Guard,
) -> Transition {
    Transition {
        guard: Some(guard),
        ..simple_transition(name, priority, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldProperty;
    use crate::machine::ActionStateTransition;

    #[test]
    fn simple_transition_builds() {
        let transition =
            simple_transition("split", Priority::TOP, ActionState::START, ActionState::SPLIT);

        assert_eq!(transition.from, FromStates::Only(vec![ActionState::START]));
        assert!(transition.can_execute(ActionState::START, &WorldState::new()));
        assert!(!transition.can_execute(ActionState::SPLIT, &WorldState::new()));
    }

    #[test]
    fn guarded_transition_respects_guard() {
        let transition = guarded_transition(
            "heal",
            Priority::LOW,
            [ActionState::ARRIVED, ActionState::MOVED],
            ActionState::ASSIGNED,
            Guard::flag(WorldProperty::MedicAvailable),
        );
        let mut world = WorldState::new();

        assert_eq!(
            transition.evaluate(ActionState::ARRIVED, &mut world),
            ActionState::NONE
        );
        world.set_flag(WorldProperty::MedicAvailable, true);
        assert_eq!(
            transition.evaluate(ActionState::MOVED, &mut world),
            ActionState::ASSIGNED
        );
    }
}
