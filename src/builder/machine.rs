//! Builder for constructing commander action machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::config::MachineConfig;
use crate::core::{AstVar, VarHandle, WorldState};
use crate::enforcement::RegistrationRules;
use crate::machine::{ActionStateTransition, CmdrAction};
use crate::threading::ContextToken;

/// Builder for constructing [`CmdrAction`]s with a fluent API.
///
/// Transitions are registered in the order they were added, so ties in
/// priority resolve the same way as with [`CmdrAction::register`].
pub struct CmdrActionBuilder {
    name: String,
    owner: Option<ContextToken>,
    world: Option<WorldState>,
    config: MachineConfig,
    rules: Option<RegistrationRules>,
    transitions: Vec<Box<dyn ActionStateTransition>>,
    vars: Vec<VarHandle>,
}

impl CmdrActionBuilder {
    pub fn new() -> Self {
        Self {
            name: "action".to_string(),
            owner: None,
            world: None,
            config: MachineConfig::default(),
            rules: None,
            transitions: Vec::new(),
            vars: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Owning context. Defaults to the context calling [`build`](Self::build).
    pub fn owner(mut self, owner: ContextToken) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Initial world state.
    pub fn world(mut self, world: WorldState) -> Self {
        self.world = Some(world);
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Registration rules in addition to the built-in ones.
    pub fn rules(mut self, rules: RegistrationRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(Box::new(transition));
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition<T>(mut self, transition: T) -> Self
    where
        T: ActionStateTransition + 'static,
    {
        self.transitions.push(Box::new(transition));
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions<I, T>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ActionStateTransition + 'static,
    {
        for transition in transitions {
            self.transitions.push(Box::new(transition));
        }
        self
    }

    /// Track a cell no transition declares.
    pub fn track<T>(mut self, var: &AstVar<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.vars.push(var.handle());
        self
    }

    /// Build the machine.
    ///
    /// Fails if no transition was added, the config is invalid, or any
    /// transition breaks a registration rule.
    pub fn build(self) -> Result<CmdrAction, BuildError> {
        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }
        self.config.validate()?;

        let mut machine =
            CmdrAction::with_config(self.name, self.config, ContextToken::current());
        if let Some(rules) = self.rules {
            machine.set_rules(rules);
        }
        if let Some(world) = self.world {
            *machine.world_mut() = world;
        }
        for var in self.vars {
            machine.track_handle(var);
        }
        for transition in self.transitions {
            machine.register_boxed(transition)?;
        }
        if let Some(owner) = self.owner {
            machine.set_owner(owner);
        }

        Ok(machine)
    }
}

impl Default for CmdrActionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionState, Priority, WorldProperty};
    use crate::enforcement::RuleViolation;
    use crate::threading::MessageLoop;

    fn step(name: &str, from: ActionState, to: ActionState) -> TransitionBuilder {
        TransitionBuilder::new().name(name).from(from).to(to)
    }

    #[test]
    fn builder_requires_transitions() {
        let result = CmdrActionBuilder::new().name("empty").build();
        assert!(matches!(result, Err(BuildError::NoTransitions)));
    }

    #[test]
    fn fluent_api_builds_machine() {
        let machine = CmdrActionBuilder::new()
            .name("patrol")
            .transition(step("leave", ActionState::START, ActionState::NEXT_WAYPOINT))
            .unwrap()
            .transition(step(
                "done",
                ActionState::NEXT_WAYPOINT,
                ActionState::FINISHED_WAYPOINTS,
            ))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(machine.name(), "patrol");
        assert_eq!(machine.current_state(), ActionState::START);
        assert_eq!(machine.transition_names(), vec!["leave", "done"]);
    }

    #[test]
    fn invalid_transitions_report_every_violation() {
        let result = CmdrActionBuilder::new()
            .transition(step("a", ActionState::START, ActionState::SPLIT))
            .unwrap()
            .add_transition(step("a", ActionState::END, ActionState::SPLIT).build().unwrap())
            .build();

        match result {
            Err(BuildError::Invalid(violations)) => {
                assert_eq!(violations.len(), 2);
                assert!(violations.contains(&RuleViolation::DuplicateName {
                    name: "a".to_string()
                }));
                assert!(violations.contains(&RuleViolation::LeavesTerminal {
                    name: "a".to_string()
                }));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn custom_rules_apply() {
        let rules = RegistrationRules::new()
            .require_pred(|ctx| ctx.priority != Priority::LOW, "low priority disallowed");
        let result = CmdrActionBuilder::new()
            .rules(rules)
            .transition(step("lazy", ActionState::START, ActionState::END).priority(Priority::LOW))
            .unwrap()
            .build();

        assert!(matches!(
            result,
            Err(BuildError::Invalid(ref v)) if matches!(v[0], RuleViolation::CustomCheckFailed { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MachineConfig {
            max_checkpoint_depth: 0,
            ..MachineConfig::default()
        };
        let result = CmdrActionBuilder::new()
            .config(config)
            .transition(step("a", ActionState::START, ActionState::END))
            .unwrap()
            .build();
        assert!(matches!(result, Err(BuildError::Config(_))));
    }

    #[test]
    fn world_and_tracked_cells_are_installed() {
        let mut world = WorldState::new();
        world.set_flag(WorldProperty::EngineerAvailable, true);
        let counter = AstVar::new(0u32);

        let machine = CmdrActionBuilder::new()
            .world(world)
            .track(&counter)
            .transition(step("a", ActionState::START, ActionState::END))
            .unwrap()
            .build()
            .unwrap();

        assert!(machine.world().flag(WorldProperty::EngineerAvailable));
        assert_eq!(machine.tracked_vars(), 1);
    }

    #[test]
    fn explicit_owner_is_kept() {
        let commander = MessageLoop::new("commander");
        let machine = CmdrActionBuilder::new()
            .owner(commander.token())
            .transition(step("a", ActionState::START, ActionState::END))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(machine.owner(), commander.token());
    }
}
