//! Core data types of the action engine.
//!
//! This module contains the values transitions operate on:
//! - Action states and priorities
//! - Shared variable cells (`AstVar`)
//! - The garrison world-state vector
//! - Commander targets
//! - Guard predicates and transition history

mod guard;
mod history;
mod state;
mod target;
mod var;
mod world;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::{ActionState, Priority};
pub use target::{Position, Target, TargetId, TargetType};
pub use var::{AstVar, Producer, SavedVar, VarHandle};
pub use world::{WorldProperty, WorldState, WorldStateError, WorldValue};
