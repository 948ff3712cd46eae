//! Registration rules for transitions, using Validation.

use crate::core::{ActionState, Priority};
use crate::enforcement::violations::RuleViolation;
use crate::machine::FromStates;
use stillwater::validation::Validation;

/// Outcome of a single rule.
pub type RuleResult = Validation<(), Vec<RuleViolation>>;

/// Type alias for rule check functions
pub type RuleCheck = Box<dyn Fn(&RegistrationContext<'_>) -> RuleResult + Send + Sync>;

/// What a rule sees about the transition being registered.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationContext<'a> {
    pub name: &'a str,
    pub priority: Priority,
    pub from_states: &'a FromStates,
    /// Names of the transitions already registered on the machine
    pub registered: &'a [String],
}

/// Rules every transition must satisfy before a machine accepts it.
///
/// The built-in rules always run. Extra rules can be added with
/// [`RegistrationRules::require_pred`]. All violations are collected instead
/// of stopping at the first one.
pub struct RegistrationRules {
    custom_checks: Vec<RuleCheck>,
}

impl Default for RegistrationRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationRules {
    pub fn new() -> Self {
        Self {
            custom_checks: Vec::new(),
        }
    }

    /// Add a predicate rule with an error message.
    pub fn require_pred<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&RegistrationContext<'_>) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        let check = move |ctx: &RegistrationContext<'_>| {
            if predicate(ctx) {
                Validation::Success(())
            } else {
                Validation::Failure(vec![RuleViolation::CustomCheckFailed {
                    name: ctx.name.to_string(),
                    message: message.clone(),
                }])
            }
        };
        self.custom_checks.push(Box::new(check));
        self
    }

    /// Check every rule, accumulating ALL violations.
    pub fn enforce(&self, context: &RegistrationContext<'_>) -> RuleResult {
        let mut checks = vec![
            check_name(context),
            check_unique(context),
            check_from_states(context),
        ];

        for check_fn in &self.custom_checks {
            checks.push(check_fn(context));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Like [`enforce`](Self::enforce), as a `Result`.
    pub fn check(&self, context: &RegistrationContext<'_>) -> Result<(), Vec<RuleViolation>> {
        match self.enforce(context) {
            Validation::Success(()) => Ok(()),
            Validation::Failure(violations) => Err(violations),
        }
    }
}

fn check_name(ctx: &RegistrationContext<'_>) -> RuleResult {
    if ctx.name.trim().is_empty() {
        Validation::Failure(vec![RuleViolation::EmptyName])
    } else {
        Validation::Success(())
    }
}

fn check_unique(ctx: &RegistrationContext<'_>) -> RuleResult {
    if ctx.registered.iter().any(|name| name == ctx.name) {
        Validation::Failure(vec![RuleViolation::DuplicateName {
            name: ctx.name.to_string(),
        }])
    } else {
        Validation::Success(())
    }
}

fn check_from_states(ctx: &RegistrationContext<'_>) -> RuleResult {
    let states = match ctx.from_states {
        FromStates::All => return Validation::Success(()),
        FromStates::Only(states) => states,
    };

    let mut violations = Vec::new();
    if states.is_empty() {
        violations.push(RuleViolation::EmptyFromStates {
            name: ctx.name.to_string(),
        });
    }
    for state in states {
        if *state == ActionState::END {
            violations.push(RuleViolation::LeavesTerminal {
                name: ctx.name.to_string(),
            });
        } else if !state.is_storable() {
            violations.push(RuleViolation::SentinelFromState {
                name: ctx.name.to_string(),
                state: *state,
            });
        }
    }

    if violations.is_empty() {
        Validation::Success(())
    } else {
        Validation::Failure(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context<'a>(
        name: &'a str,
        from_states: &'a FromStates,
        registered: &'a [String],
    ) -> RegistrationContext<'a> {
        RegistrationContext {
            name,
            priority: Priority::HIGH,
            from_states,
            registered,
        }
    }

    #[test]
    fn valid_transition_passes() {
        let from = FromStates::from(ActionState::START);
        let rules = RegistrationRules::new();
        assert!(rules.check(&context("select_target", &from, &[])).is_ok());
    }

    #[test]
    fn enforcement_accumulates_all_violations() {
        let from = FromStates::Only(vec![ActionState::END, ActionState::NONE]);
        let registered = vec![String::new()];
        let rules = RegistrationRules::new().require_pred(|_| false, "always fails");

        let violations = rules.check(&context("", &from, &registered)).unwrap_err();

        assert!(violations.contains(&RuleViolation::EmptyName));
        assert!(violations
            .iter()
            .any(|v| matches!(v, RuleViolation::DuplicateName { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, RuleViolation::LeavesTerminal { .. })));
        assert!(violations.iter().any(|v| matches!(
            v,
            RuleViolation::SentinelFromState { state, .. } if *state == ActionState::NONE
        )));
        assert!(violations
            .iter()
            .any(|v| matches!(v, RuleViolation::CustomCheckFailed { .. })));
        assert_eq!(violations.len(), 5);
    }

    #[test]
    fn wildcard_in_explicit_set_is_rejected() {
        let from = FromStates::Only(vec![ActionState::ALL]);
        let violations = RegistrationRules::new()
            .check(&context("any", &from, &[]))
            .unwrap_err();
        assert_eq!(
            violations,
            vec![RuleViolation::SentinelFromState {
                name: "any".to_string(),
                state: ActionState::ALL
            }]
        );
    }

    #[test]
    fn empty_explicit_set_is_rejected() {
        let from = FromStates::Only(Vec::new());
        let violations = RegistrationRules::new()
            .check(&context("nowhere", &from, &[]))
            .unwrap_err();
        assert!(matches!(
            violations.as_slice(),
            [RuleViolation::EmptyFromStates { .. }]
        ));
    }

    #[test]
    fn custom_rule_sees_priority() {
        let from = FromStates::All;
        let rules = RegistrationRules::new()
            .require_pred(|ctx| ctx.priority <= Priority::LOW, "priority too low");
        assert!(rules.check(&context("ok", &from, &[])).is_ok());

        let ctx = RegistrationContext {
            priority: Priority(50),
            ..context("late", &from, &[])
        };
        assert!(rules.check(&ctx).is_err());
    }
}
