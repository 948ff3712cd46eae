//! Errors raised by a running machine.

use crate::core::ActionState;
use crate::enforcement::RuleViolation;
use thiserror::Error;

/// Errors that can occur while driving a [`CmdrAction`](super::CmdrAction).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    /// `pop_checkpoint` without a matching push. A programming error.
    #[error("No checkpoint to pop")]
    EmptyCheckpointStack,

    #[error("Checkpoint depth limit ({max}) reached")]
    CheckpointDepthExceeded { max: usize },

    /// A fired transition returned a state a machine may not enter.
    #[error("Transition '{transition}' returned invalid target state {target:?}")]
    InvalidTarget {
        transition: String,
        target: ActionState,
    },

    #[error("Transition rejected: {}", format_violations(.0))]
    Registration(Vec<RuleViolation>),
}

pub(crate) fn format_violations(violations: &[RuleViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
