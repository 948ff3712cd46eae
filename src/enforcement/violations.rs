//! Violations reported when a transition is registered.

use crate::core::ActionState;
use thiserror::Error;

/// A rule a transition definition breaks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Transition name must not be empty")]
    EmptyName,

    #[error("Transition '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("Transition '{name}' has an empty from-state set")]
    EmptyFromStates { name: String },

    #[error("Transition '{name}' lists sentinel state {state:?} as a from-state")]
    SentinelFromState { name: String, state: ActionState },

    #[error("Transition '{name}' leaves END, which is terminal")]
    LeavesTerminal { name: String },

    #[error("Custom rule failed for '{name}': {message}")]
    CustomCheckFailed { name: String, message: String },
}
