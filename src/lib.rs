//! cmdr-action: reactive action state machines for garrison commander AI
//!
//! A commander issues each garrison an *action*: attack, move, return to
//! base. Every action is a small state machine. On each tick it re-evaluates
//! a priority-ordered list of guarded transitions against the garrison's
//! world state and takes the first one that applies. Nothing is planned
//! ahead, so a change in the world is picked up on the next tick.
//!
//! # Core Concepts
//!
//! - **ActionState**: integer state with reserved sentinels (`START`, `END`,
//!   `NONE`, `ALL`) and action-specific values from `CUSTOM` upwards
//! - **WorldState**: fixed 22-property vector describing the garrison
//! - **AstVar**: shared cell holding a value or a deferred producer
//! - **Transitions**: priority, source states, condition and effect
//! - **CmdrAction**: the machine, with tick, simulation checkpoints and END
//! - **Threading**: each machine belongs to one message loop; foreign access
//!   panics in debug builds
//!
//! # Example
//!
//! ```rust
//! use cmdr_action::builder::{CmdrActionBuilder, TransitionBuilder};
//! use cmdr_action::core::{ActionState, AstVar, Priority, WorldProperty};
//!
//! let orders_issued = AstVar::new(false);
//! let issued = orders_issued.clone();
//!
//! let mut action = CmdrActionBuilder::new()
//!     .name("move_to_outpost")
//!     .transition(
//!         TransitionBuilder::new()
//!             .name("issue_orders")
//!             .priority(Priority::TOP)
//!             .from(ActionState::START)
//!             .uses(&orders_issued)
//!             .effect(move |_| {
//!                 issued.set(true);
//!                 ActionState::READY_TO_MOVE
//!             }),
//!     )?
//!     .transition(
//!         TransitionBuilder::new()
//!             .name("arrive")
//!             .from(ActionState::READY_TO_MOVE)
//!             .when_flag(WorldProperty::Moving)
//!             .to(ActionState::END),
//!     )?
//!     .build()?;
//!
//! action.tick()?;
//! assert_eq!(action.current_state(), ActionState::READY_TO_MOVE);
//! assert!(orders_issued.get());
//!
//! action.world_mut().set_flag(WorldProperty::Moving, true);
//! action.tick()?;
//! assert!(action.is_terminal());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod enforcement;
pub mod machine;
pub mod ownership;
pub mod threading;

// Re-export commonly used types
pub use builder::{BuildError, CmdrActionBuilder, TransitionBuilder};
pub use checkpoint::{CheckpointError, MachineSnapshot};
pub use config::MachineConfig;
pub use core::{ActionState, AstVar, Guard, Priority, Target, WorldProperty, WorldState};
pub use machine::{ActionStateTransition, CmdrAction, MachineError, TickOutcome};
pub use threading::{assert_owning_thread, ContextToken, MessageLoop};
