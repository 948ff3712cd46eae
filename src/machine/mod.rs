//! The action state machine and its transitions.

mod action;
mod error;
mod transition;

pub use action::{CmdrAction, RunSummary, StopReason, TickOutcome, CANCEL_TRANSITION};
pub use error::MachineError;
pub(crate) use error::format_violations;
pub use transition::{ActionStateTransition, FromStates, Transition, TransitionEffect};
