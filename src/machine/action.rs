//! The per-garrison action state machine.

use crate::checkpoint::{CheckpointError, MachineSnapshot, CHECKPOINT_VERSION};
use crate::config::MachineConfig;
use crate::core::{
    ActionState, AstVar, SavedVar, StateHistory, StateTransition, VarHandle, WorldState,
};
use crate::enforcement::{RegistrationContext, RegistrationRules};
use crate::machine::error::MachineError;
use crate::machine::transition::ActionStateTransition;
use crate::threading::{assert_owning_thread, ContextToken};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Name recorded in the history when a collaborator cancels the action.
pub const CANCEL_TRANSITION: &str = "<cancel>";

/// Result of a single tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A transition fired and the machine moved to `to`
    Transitioned {
        transition: String,
        from: ActionState,
        to: ActionState,
    },

    /// No transition applied; a long-running step is still in progress
    Idle,

    /// The machine is already at END; nothing was evaluated
    Terminal,
}

/// Why [`CmdrAction::run`] stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Terminal,
    Idle,
    TickLimit,
}

/// Summary of a [`CmdrAction::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks performed, including the final idle one
    pub ticks: usize,
    /// Transitions fired
    pub transitions: usize,
    pub stop: StopReason,
    pub state: ActionState,
}

struct Checkpoint {
    id: Uuid,
    created_at: DateTime<Utc>,
    state: ActionState,
    world: WorldState,
    vars: Vec<SavedVar>,
    history_mark: usize,
    tick_count: u64,
}

/// Action state machine of one garrison task.
///
/// Each tick re-resolves the registered transitions from scratch: candidates
/// whose from-states contain the current state are checked in ascending
/// priority (registration order on ties) and the first one whose condition
/// holds fires. There is no lookahead; a plan emerges as a sequence of
/// single-step decisions, so changes to the world between ticks are always
/// respected.
///
/// # Example
///
/// ```rust
/// use cmdr_action::builder::TransitionBuilder;
/// use cmdr_action::core::{ActionState, Priority, WorldProperty};
/// use cmdr_action::machine::{CmdrAction, TickOutcome};
///
/// let mut action = CmdrAction::new("reinforce");
/// action
///     .register(
///         TransitionBuilder::new()
///             .name("prepare")
///             .from(ActionState::START)
///             .to(ActionState::READY_TO_MOVE)
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
/// action
///     .register(
///         TransitionBuilder::new()
///             .name("arrive")
///             .priority(Priority::HIGH)
///             .from(ActionState::READY_TO_MOVE)
///             .when_flag(WorldProperty::Moving)
///             .to(ActionState::END)
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
///
/// action.tick().unwrap();
/// assert_eq!(action.current_state(), ActionState::READY_TO_MOVE);
///
/// // Still waiting for the garrison to move.
/// assert_eq!(action.tick().unwrap(), TickOutcome::Idle);
///
/// action.world_mut().set_flag(WorldProperty::Moving, true);
/// action.tick().unwrap();
/// assert!(action.is_terminal());
/// ```
pub struct CmdrAction {
    id: Uuid,
    name: String,
    owner: ContextToken,
    config: MachineConfig,
    rules: RegistrationRules,
    current: ActionState,
    transitions: Vec<Box<dyn ActionStateTransition>>,
    vars: Vec<VarHandle>,
    world: WorldState,
    checkpoints: Vec<Checkpoint>,
    history: StateHistory,
    tick_count: u64,
}

impl CmdrAction {
    /// Create a machine at START, owned by the calling context.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, MachineConfig::default(), ContextToken::current())
    }

    /// Create a machine with explicit config and owner.
    pub fn with_config(
        name: impl Into<String>,
        config: MachineConfig,
        owner: ContextToken,
    ) -> Self {
        let history = match config.history_limit {
            Some(limit) => StateHistory::bounded(limit),
            None => StateHistory::new(),
        };
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner,
            config,
            rules: RegistrationRules::new(),
            current: ActionState::START,
            transitions: Vec::new(),
            vars: Vec::new(),
            world: WorldState::new(),
            checkpoints: Vec::new(),
            history,
            tick_count: 0,
        }
    }

    pub(crate) fn set_rules(&mut self, rules: RegistrationRules) {
        self.rules = rules;
    }

    pub(crate) fn set_owner(&mut self, owner: ContextToken) {
        self.owner = owner;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> ContextToken {
        self.owner
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Get current state. Never NONE.
    pub fn current_state(&self) -> ActionState {
        self.current
    }

    /// A machine is terminal iff its state is END.
    pub fn is_terminal(&self) -> bool {
        self.current.is_final()
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable world state, for the owning collaborator to sync engine data
    /// between ticks.
    pub fn world_mut(&mut self) -> &mut WorldState {
        assert_owning_thread(self.owner, "world_mut");
        &mut self.world
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn checkpoint_depth(&self) -> usize {
        self.checkpoints.len()
    }

    /// Registered transition names in evaluation order.
    pub fn transition_names(&self) -> Vec<String> {
        self.transitions.iter().map(|t| t.name().to_string()).collect()
    }

    /// Register a transition.
    ///
    /// The definition is checked against the machine's registration rules
    /// and every cell it declares is tracked for checkpoints.
    pub fn register<T>(&mut self, transition: T) -> Result<(), MachineError>
    where
        T: ActionStateTransition + 'static,
    {
        self.register_boxed(Box::new(transition))
    }

    pub fn register_boxed(
        &mut self,
        transition: Box<dyn ActionStateTransition>,
    ) -> Result<(), MachineError> {
        assert_owning_thread(self.owner, "register");

        let registered = self.transition_names();
        let context = RegistrationContext {
            name: transition.name(),
            priority: transition.priority(),
            from_states: transition.from_states(),
            registered: &registered,
        };
        self.rules
            .check(&context)
            .map_err(MachineError::Registration)?;

        for var in transition.vars() {
            self.track_handle(var);
        }

        // Insert after every transition of equal priority: ties resolve in
        // registration order.
        let priority = transition.priority();
        let index = self
            .transitions
            .partition_point(|existing| existing.priority() <= priority);
        debug!(
            machine = %self.name,
            transition = transition.name(),
            priority = priority.0,
            index,
            "transition registered"
        );
        self.transitions.insert(index, transition);
        Ok(())
    }

    /// Include a cell in checkpoints. Tracking the same cell twice is a no-op.
    pub fn track<T>(&mut self, var: &AstVar<T>)
    where
        T: Clone + Send + Sync + 'static,
    {
        assert_owning_thread(self.owner, "track");
        self.track_handle(var.handle());
    }

    pub(crate) fn track_handle(&mut self, handle: VarHandle) {
        if !self.vars.iter().any(|known| known.id() == handle.id()) {
            self.vars.push(handle);
        }
    }

    /// Number of distinct cells included in checkpoints.
    pub fn tracked_vars(&self) -> usize {
        self.vars.len()
    }

    /// Perform one reactive step.
    ///
    /// Transitions are evaluated in priority order and the first one that
    /// yields a state other than NONE fires. A transition whose effect ran
    /// but returned NONE is still in progress; evaluation moves on to the
    /// next candidate. If nothing fires the tick is idle.
    ///
    /// A transition returning ALL or START aborts the tick with
    /// [`MachineError::InvalidTarget`]. The current state is left unchanged,
    /// but writes the effect already made to the world state and cells are
    /// kept; run it under [`simulate`](Self::simulate) to discard them.
    pub fn tick(&mut self) -> Result<TickOutcome, MachineError> {
        assert_owning_thread(self.owner, "tick");

        if self.is_terminal() {
            return Ok(TickOutcome::Terminal);
        }
        self.tick_count += 1;

        let current = self.current;
        let fired = self.transitions.iter().find_map(|transition| {
            let next = transition.evaluate(current, &mut self.world);
            (next != ActionState::NONE).then(|| (transition.name().to_string(), next))
        });

        let Some((name, next)) = fired else {
            trace!(machine = %self.name, state = %current, tick = self.tick_count, "no transition fired");
            return Ok(TickOutcome::Idle);
        };

        if next == ActionState::ALL || next == ActionState::START {
            warn!(
                machine = %self.name,
                transition = %name,
                target = ?next,
                "transition returned an invalid target"
            );
            return Err(MachineError::InvalidTarget {
                transition: name,
                target: next,
            });
        }

        self.current = next;
        self.record(&name, current, next);
        debug!(
            machine = %self.name,
            transition = %name,
            from = %current,
            to = %next,
            tick = self.tick_count,
            "transition fired"
        );
        if next.is_final() {
            info!(machine = %self.name, tick = self.tick_count, "action reached END");
        }

        Ok(TickOutcome::Transitioned {
            transition: name,
            from: current,
            to: next,
        })
    }

    /// Tick until END, an idle tick, or `max_ticks` ticks.
    pub fn run(&mut self, max_ticks: usize) -> Result<RunSummary, MachineError> {
        let mut ticks = 0;
        let mut transitions = 0;
        let stop = loop {
            if self.is_terminal() {
                break StopReason::Terminal;
            }
            if ticks == max_ticks {
                break StopReason::TickLimit;
            }
            ticks += 1;
            match self.tick()? {
                TickOutcome::Transitioned { .. } => transitions += 1,
                TickOutcome::Idle => break StopReason::Idle,
                TickOutcome::Terminal => break StopReason::Terminal,
            }
        };
        Ok(RunSummary {
            ticks,
            transitions,
            stop,
            state: self.current,
        })
    }

    /// Force the machine to END. Used by a controlling collaborator to
    /// cancel the action. No-op when already terminal.
    pub fn cancel(&mut self) {
        assert_owning_thread(self.owner, "cancel");
        if self.is_terminal() {
            return;
        }
        let from = self.current;
        self.current = ActionState::END;
        self.record(CANCEL_TRANSITION, from, ActionState::END);
        info!(machine = %self.name, from = %from, "action cancelled");
    }

    fn record(&mut self, transition: &str, from: ActionState, to: ActionState) {
        if self.config.record_history {
            self.history.record(StateTransition {
                transition: transition.to_string(),
                from,
                to,
                tick: self.tick_count,
                timestamp: Utc::now(),
            });
        }
    }

    /// Save state, tracked cells and world state onto the checkpoint stack.
    ///
    /// Returns the checkpoint id.
    pub fn push_checkpoint(&mut self) -> Result<Uuid, MachineError> {
        assert_owning_thread(self.owner, "push_checkpoint");

        let max = self.config.max_checkpoint_depth;
        if self.checkpoints.len() >= max {
            return Err(MachineError::CheckpointDepthExceeded { max });
        }

        let checkpoint = Checkpoint {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: self.current,
            world: self.world.clone(),
            vars: self.vars.iter().map(VarHandle::save).collect(),
            history_mark: self.history.total_recorded(),
            tick_count: self.tick_count,
        };
        let id = checkpoint.id;
        self.checkpoints.push(checkpoint);
        debug!(
            machine = %self.name,
            checkpoint = %id,
            depth = self.checkpoints.len(),
            state = %self.current,
            "checkpoint pushed"
        );
        Ok(id)
    }

    /// Restore the most recent checkpoint and remove it from the stack.
    pub fn pop_checkpoint(&mut self) -> Result<(), MachineError> {
        assert_owning_thread(self.owner, "pop_checkpoint");

        let checkpoint = self
            .checkpoints
            .pop()
            .ok_or(MachineError::EmptyCheckpointStack)?;

        self.current = checkpoint.state;
        self.world = checkpoint.world;
        for saved in checkpoint.vars {
            saved.restore();
        }
        self.history.truncate_to(checkpoint.history_mark);
        self.tick_count = checkpoint.tick_count;

        debug!(
            machine = %self.name,
            checkpoint = %checkpoint.id,
            age_ms = (Utc::now() - checkpoint.created_at).num_milliseconds(),
            depth = self.checkpoints.len(),
            state = %self.current,
            "checkpoint popped"
        );
        Ok(())
    }

    /// Run `f` hypothetically: everything it changes on this machine and its
    /// tracked cells is rolled back afterwards.
    ///
    /// Checkpoints `f` leaves on the stack are unwound too. If `f` pops the
    /// simulation's own checkpoint, [`MachineError::EmptyCheckpointStack`]
    /// is returned.
    pub fn simulate<R, F>(&mut self, f: F) -> Result<R, MachineError>
    where
        F: FnOnce(&mut Self) -> R,
    {
        let depth = self.checkpoints.len();
        self.push_checkpoint()?;
        let result = f(self);
        if self.checkpoints.len() <= depth {
            return Err(MachineError::EmptyCheckpointStack);
        }
        while self.checkpoints.len() > depth {
            self.pop_checkpoint()?;
        }
        Ok(result)
    }

    /// Serializable snapshot of the machine's data.
    ///
    /// Transition logic and cells are not part of a snapshot.
    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            machine_id: self.id,
            name: self.name.clone(),
            current_state: self.current,
            world: self.world.clone(),
            history: self.history.clone(),
            tick_count: self.tick_count,
        }
    }

    /// Replace state, world state and history with a snapshot's.
    ///
    /// The in-memory checkpoint stack is cleared.
    pub fn restore_snapshot(&mut self, snapshot: &MachineSnapshot) -> Result<(), CheckpointError> {
        assert_owning_thread(self.owner, "restore_snapshot");
        snapshot.validate()?;

        self.current = snapshot.current_state;
        self.world = snapshot.world.clone();
        self.history = snapshot.history.clone();
        self.tick_count = snapshot.tick_count;
        self.checkpoints.clear();
        info!(
            machine = %self.name,
            snapshot = %snapshot.id,
            state = %self.current,
            "snapshot restored"
        );
        Ok(())
    }
}

impl fmt::Debug for CmdrAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmdrAction")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("current", &self.current)
            .field("transitions", &self.transition_names())
            .field("tracked_vars", &self.vars.len())
            .field("checkpoints", &self.checkpoints.len())
            .field("tick_count", &self.tick_count)
            .finish()
    }
}
