//! Transition history tracking.
//!
//! Every fired transition is recorded so a run can be inspected, persisted,
//! and rolled back together with a checkpoint.

use super::state::ActionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single fired transition.
///
/// # Example
///
/// ```rust
/// use cmdr_action::core::{ActionState, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     transition: "give_move_order".to_string(),
///     from: ActionState::READY_TO_MOVE,
///     to: ActionState::MOVED,
///     tick: 3,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, ActionState::MOVED);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Name of the transition that fired
    pub transition: String,
    /// The state being transitioned from
    pub from: ActionState,
    /// The state being transitioned to
    pub to: ActionState,
    /// Machine tick on which the transition fired
    pub tick: u64,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of fired transitions.
///
/// A history may be bounded: once `limit` entries are held, recording drops
/// the oldest entry. `total_recorded` keeps counting so truncation back to a
/// checkpoint stays correct.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    total_recorded: usize,
}

impl StateHistory {
    /// Create a new unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `limit` entries.
    pub fn bounded(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Record a transition.
    pub fn record(&mut self, transition: StateTransition) {
        self.transitions.push(transition);
        self.total_recorded += 1;
        if let Some(limit) = self.limit {
            if self.transitions.len() > limit {
                let excess = self.transitions.len() - limit;
                self.transitions.drain(..excess);
            }
        }
    }

    /// Total number of transitions ever recorded, including dropped ones.
    pub fn total_recorded(&self) -> usize {
        self.total_recorded
    }

    /// Roll back to the point where `total_recorded` was `mark`.
    ///
    /// Entries already dropped by the limit cannot come back.
    pub fn truncate_to(&mut self, mark: usize) {
        if mark >= self.total_recorded {
            return;
        }
        let remove = self.total_recorded - mark;
        let keep = self.transitions.len().saturating_sub(remove);
        self.transitions.truncate(keep);
        self.total_recorded = mark;
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first held transition, then the `to`
    /// state of each transition.
    pub fn get_path(&self) -> Vec<ActionState> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.first() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Duration between the first and last held transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all held transitions in order.
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(from: ActionState, to: ActionState, tick: u64) -> StateTransition {
        StateTransition {
            transition: format!("{}->{}", from, to),
            from,
            to,
            tick,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let mut history = StateHistory::new();
        history.record(transition(ActionState::START, ActionState::READY_TO_MOVE, 1));
        history.record(transition(ActionState::READY_TO_MOVE, ActionState::MOVED, 2));

        assert_eq!(
            history.get_path(),
            vec![
                ActionState::START,
                ActionState::READY_TO_MOVE,
                ActionState::MOVED
            ]
        );
    }

    #[test]
    fn bounded_history_drops_oldest() {
        let mut history = StateHistory::bounded(2);
        history.record(transition(ActionState::START, ActionState::SPLIT, 1));
        history.record(transition(ActionState::SPLIT, ActionState::READY_TO_MOVE, 2));
        history.record(transition(ActionState::READY_TO_MOVE, ActionState::MOVED, 3));

        assert_eq!(history.len(), 2);
        assert_eq!(history.total_recorded(), 3);
        assert_eq!(history.transitions()[0].tick, 2);
    }

    #[test]
    fn truncate_to_rolls_back_recent_entries() {
        let mut history = StateHistory::new();
        history.record(transition(ActionState::START, ActionState::RTB, 1));
        let mark = history.total_recorded();
        history.record(transition(ActionState::RTB, ActionState::RTB_SUCCESS, 2));
        history.record(transition(ActionState::RTB_SUCCESS, ActionState::END, 3));

        history.truncate_to(mark);
        assert_eq!(history.len(), 1);
        assert_eq!(history.total_recorded(), 1);
        assert_eq!(history.transitions()[0].to, ActionState::RTB);
    }

    #[test]
    fn truncate_past_limit_keeps_counts_consistent() {
        let mut history = StateHistory::bounded(1);
        history.record(transition(ActionState::START, ActionState::RTB, 1));
        let mark = history.total_recorded();
        history.record(transition(ActionState::RTB, ActionState::RTB_SUCCESS, 2));
        history.record(transition(ActionState::RTB_SUCCESS, ActionState::END, 3));

        history.truncate_to(mark);
        assert!(history.is_empty());
        assert_eq!(history.total_recorded(), 1);
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let mut history = StateHistory::new();
        history.record(transition(ActionState::START, ActionState::END, 1));
        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = StateHistory::new();
        history.record(transition(ActionState::START, ActionState::ASSIGNED, 1));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(history, deserialized);
    }
}
