//! Action states and transition priorities.
//!
//! An action state is a named step in a garrison's current high-level task.
//! The numeric values are shared with collaborating behavior catalogs, so the
//! reserved sentinels and their relative ordering must never change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A step in a [`CmdrAction`](crate::machine::CmdrAction).
///
/// Reserved values:
///
/// - [`ActionState::NONE`]: returned by a transition that did not fire. Never
///   stored as a machine's current state.
/// - [`ActionState::START`]: the initial state of every machine. Never a
///   transition target.
/// - [`ActionState::END`]: terminal. Nothing is evaluated once it is reached.
/// - [`ActionState::ALL`]: wildcard used only in registration filters.
///
/// Application states start at [`ActionState::CUSTOM`].
///
/// # Example
///
/// ```rust
/// use cmdr_action::core::ActionState;
///
/// let patrol = ActionState::custom(50);
/// assert_eq!(patrol.value(), 1050);
/// assert!(patrol.is_custom());
/// assert!(!patrol.is_final());
///
/// assert_eq!(ActionState::READY_TO_MOVE.name(), "READY_TO_MOVE");
/// assert!(ActionState::END.is_final());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionState(i32);

impl ActionState {
    /// No change to the current state.
    pub const NONE: Self = Self(-1000);
    /// Initial state of every machine.
    pub const START: Self = Self(0);
    /// Final state, reached on success or failure.
    pub const END: Self = Self(1);
    /// Matches every state. Only meaningful in filters.
    pub const ALL: Self = Self(-1);
    /// Lowest value for application-defined states.
    pub const CUSTOM: Self = Self(1000);

    /// After a garrison is split into two.
    pub const SPLIT: Self = Self::custom(1);
    /// A garrison is ready to move.
    pub const READY_TO_MOVE: Self = Self::custom(2);
    /// A garrison has completed a move.
    pub const MOVED: Self = Self::custom(3);
    /// The target is dead. Success or failure depending on the action.
    pub const TARGET_DEAD: Self = Self::custom(4);
    /// A garrison has arrived somewhere.
    pub const ARRIVED: Self = Self::custom(5);
    /// A garrison has been assigned an action.
    pub const ASSIGNED: Self = Self::custom(6);
    /// A garrison should return to base.
    pub const RTB: Self = Self::custom(7);
    /// A garrison has returned to base.
    pub const RTB_SUCCESS: Self = Self::custom(8);
    /// A garrison needs to select a base to return to.
    pub const RTB_SELECT_TARGET: Self = Self::custom(9);
    /// Failed due to an out of range error.
    pub const FAILED_OUT_OF_RANGE: Self = Self::custom(10);
    /// Failed because the garrison is dead.
    pub const FAILED_GARRISON_DEAD: Self = Self::custom(11);
    /// Failed due to a generic time out.
    pub const FAILED_TIMEOUT: Self = Self::custom(12);
    /// The next waypoint of a route should be selected.
    pub const NEXT_WAYPOINT: Self = Self::custom(13);
    /// No more waypoints in the route.
    pub const FINISHED_WAYPOINTS: Self = Self::custom(14);

    /// Build an application state `offset` steps above [`ActionState::CUSTOM`].
    /// Saturates at `i32::MAX`.
    pub const fn custom(offset: i32) -> Self {
        Self(Self::CUSTOM.0.saturating_add(offset))
    }

    /// Wrap a raw numeric state, e.g. one received from a behavior catalog.
    pub const fn from_raw(value: i32) -> Self {
        Self(value)
    }

    /// Raw numeric value.
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Name for display and logging.
    ///
    /// Application states outside the predefined catalog are reported as
    /// `"CUSTOM"`, other unknown values as `"UNKNOWN"`.
    pub fn name(&self) -> &'static str {
        match *self {
            Self::NONE => "NONE",
            Self::START => "START",
            Self::END => "END",
            Self::ALL => "ALL",
            Self::SPLIT => "SPLIT",
            Self::READY_TO_MOVE => "READY_TO_MOVE",
            Self::MOVED => "MOVED",
            Self::TARGET_DEAD => "TARGET_DEAD",
            Self::ARRIVED => "ARRIVED",
            Self::ASSIGNED => "ASSIGNED",
            Self::RTB => "RTB",
            Self::RTB_SUCCESS => "RTB_SUCCESS",
            Self::RTB_SELECT_TARGET => "RTB_SELECT_TARGET",
            Self::FAILED_OUT_OF_RANGE => "FAILED_OUT_OF_RANGE",
            Self::FAILED_GARRISON_DEAD => "FAILED_GARRISON_DEAD",
            Self::FAILED_TIMEOUT => "FAILED_TIMEOUT",
            Self::NEXT_WAYPOINT => "NEXT_WAYPOINT",
            Self::FINISHED_WAYPOINTS => "FINISHED_WAYPOINTS",
            s if s.is_custom() => "CUSTOM",
            _ => "UNKNOWN",
        }
    }

    /// Check if this is the terminal state.
    pub fn is_final(&self) -> bool {
        *self == Self::END
    }

    /// Check if this is one of the predefined failure states.
    pub fn is_error(&self) -> bool {
        matches!(
            *self,
            Self::FAILED_OUT_OF_RANGE | Self::FAILED_GARRISON_DEAD | Self::FAILED_TIMEOUT
        )
    }

    /// Check if this state lies in the application range.
    pub fn is_custom(&self) -> bool {
        self.0 >= Self::CUSTOM.0
    }

    /// Check if a machine may hold this state as its current state.
    ///
    /// `NONE` and `ALL` are sentinels and never valid.
    pub fn is_storable(&self) -> bool {
        *self != Self::NONE && *self != Self::ALL
    }
}

impl fmt::Debug for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            "CUSTOM" | "UNKNOWN" => write!(f, "{}", self.0),
            name => f.write_str(name),
        }
    }
}

impl From<i32> for ActionState {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Evaluation priority of a transition. Lower values are evaluated first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    pub const TOP: Self = Self(0);
    pub const HIGH: Self = Self(1);
    pub const LOW: Self = Self(10);
}

impl Default for Priority {
    fn default() -> Self {
        Self::HIGH
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_saturates_at_the_top_of_the_range() {
        assert_eq!(ActionState::custom(i32::MAX).value(), i32::MAX);
        assert_eq!(ActionState::custom(i32::MAX - 1000).value(), i32::MAX);
        assert_eq!(ActionState::custom(3).value(), 1003);
    }

    #[test]
    fn reserved_values_match_catalog() {
        assert_eq!(ActionState::NONE.value(), -1000);
        assert_eq!(ActionState::START.value(), 0);
        assert_eq!(ActionState::END.value(), 1);
        assert_eq!(ActionState::ALL.value(), -1);
        assert_eq!(ActionState::CUSTOM.value(), 1000);
    }

    #[test]
    fn predefined_custom_states_follow_boundary() {
        assert_eq!(ActionState::SPLIT.value(), 1001);
        assert_eq!(ActionState::READY_TO_MOVE.value(), 1002);
        assert_eq!(ActionState::MOVED.value(), 1003);
        assert_eq!(ActionState::FINISHED_WAYPOINTS.value(), 1014);
        assert!(ActionState::SPLIT.is_custom());
        assert!(!ActionState::END.is_custom());
    }

    #[test]
    fn is_final_identifies_end_only() {
        assert!(ActionState::END.is_final());
        assert!(!ActionState::START.is_final());
        assert!(!ActionState::FAILED_TIMEOUT.is_final());
    }

    #[test]
    fn is_error_identifies_failure_states() {
        assert!(ActionState::FAILED_OUT_OF_RANGE.is_error());
        assert!(ActionState::FAILED_GARRISON_DEAD.is_error());
        assert!(ActionState::FAILED_TIMEOUT.is_error());
        assert!(!ActionState::RTB_SUCCESS.is_error());
    }

    #[test]
    fn sentinels_are_not_storable() {
        assert!(!ActionState::NONE.is_storable());
        assert!(!ActionState::ALL.is_storable());
        assert!(ActionState::START.is_storable());
        assert!(ActionState::custom(99).is_storable());
    }

    #[test]
    fn names_fall_back_for_unknown_values() {
        assert_eq!(ActionState::custom(500).name(), "CUSTOM");
        assert_eq!(ActionState::from_raw(42).name(), "UNKNOWN");
        assert_eq!(ActionState::custom(500).to_string(), "1500");
        assert_eq!(ActionState::RTB.to_string(), "RTB");
    }

    #[test]
    fn priorities_order_ascending() {
        assert!(Priority::TOP < Priority::HIGH);
        assert!(Priority::HIGH < Priority::LOW);
        assert_eq!(Priority::LOW, Priority(10));
    }

    #[test]
    fn state_serializes_as_number() {
        let json = serde_json::to_string(&ActionState::MOVED).unwrap();
        assert_eq!(json, "1003");
        let back: ActionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ActionState::MOVED);
    }
}
