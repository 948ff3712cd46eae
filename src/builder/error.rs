//! Build errors for machine and transition builders.

use crate::config::ConfigError;
use crate::enforcement::RuleViolation;
use crate::machine::{format_violations, MachineError};
use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition name not specified. Call .name(name)")]
    MissingName,

    #[error("Transition source states not specified. Call .from(state) or .from_any()")]
    MissingFromStates,

    #[error("Transition effect not specified. Call .effect(f) or .to(state)")]
    MissingEffect,

    #[error("Transition rejected: {}", format_violations(.0))]
    Invalid(Vec<RuleViolation>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Machine(MachineError),
}

impl From<MachineError> for BuildError {
    fn from(err: MachineError) -> Self {
        match err {
            MachineError::Registration(violations) => Self::Invalid(violations),
            other => Self::Machine(other),
        }
    }
}
