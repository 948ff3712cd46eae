//! Validation-based rules for registering transitions.
//!
//! Before a machine accepts a transition it checks the definition against
//! [`RegistrationRules`]. Violations are accumulated with Stillwater's
//! `Validation` so one registration attempt reports every problem at once.
//!
//! # Example
//!
//! ```rust
//! use cmdr_action::core::{ActionState, Priority};
//! use cmdr_action::enforcement::{RegistrationContext, RegistrationRules};
//! use cmdr_action::machine::FromStates;
//!
//! let rules = RegistrationRules::new()
//!     .require_pred(|ctx| ctx.priority <= Priority::LOW, "priority out of range");
//!
//! let from = FromStates::from(ActionState::END);
//! let ctx = RegistrationContext {
//!     name: "reopen",
//!     priority: Priority::TOP,
//!     from_states: &from,
//!     registered: &[],
//! };
//! assert!(rules.check(&ctx).is_err());
//! ```

pub mod rules;
pub mod violations;

pub use rules::{RegistrationContext, RegistrationRules, RuleCheck, RuleResult};
pub use violations::RuleViolation;
