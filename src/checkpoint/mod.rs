//! Persistent snapshots of action machines.
//!
//! In-memory checkpoints (`push_checkpoint` / `pop_checkpoint`) serve
//! simulation within one process. A [`MachineSnapshot`] is the serializable
//! counterpart: it captures a machine's state, world state and history so an
//! action can be saved with the game and resumed after a reload. Transition
//! logic and cells are code, not data, and are rebuilt by the owner before
//! [`restore_snapshot`](crate::machine::CmdrAction::restore_snapshot).

use crate::core::{ActionState, StateHistory, WorldState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for snapshot format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a machine.
///
/// # Example
///
/// ```rust
/// use cmdr_action::builder::simple_transition;
/// use cmdr_action::checkpoint::MachineSnapshot;
/// use cmdr_action::core::{ActionState, Priority};
/// use cmdr_action::machine::CmdrAction;
///
/// let mut action = CmdrAction::new("rtb");
/// action
///     .register(simple_transition("go", Priority::TOP, ActionState::START, ActionState::RTB))
///     .unwrap();
/// action.tick().unwrap();
///
/// let json = action.snapshot().to_json().unwrap();
/// let snapshot = MachineSnapshot::from_json(&json).unwrap();
///
/// let mut resumed = CmdrAction::new("rtb");
/// resumed.restore_snapshot(&snapshot).unwrap();
/// assert_eq!(resumed.current_state(), ActionState::RTB);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Id of the machine the snapshot was taken from
    pub machine_id: Uuid,

    pub name: String,

    pub current_state: ActionState,

    pub world: WorldState,

    /// Complete transition history
    pub history: StateHistory,

    pub tick_count: u64,
}

impl MachineSnapshot {
    /// Check the snapshot can be restored by this version of the crate.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if !self.current_state.is_storable() {
            return Err(CheckpointError::ValidationFailed(format!(
                "current state {:?} is a sentinel",
                self.current_state
            )));
        }
        if let Some(last) = self.history.transitions().last() {
            if last.to != self.current_state {
                return Err(CheckpointError::ValidationFailed(format!(
                    "history ends in {:?} but current state is {:?}",
                    last.to, self.current_state
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    /// Parse and validate a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Compact binary encoding.
    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    /// Decode and validate a binary snapshot.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Position, StateTransition, WorldProperty};

    fn snapshot() -> MachineSnapshot {
        let mut world = WorldState::new();
        world.set_flag(WorldProperty::Moving, true);
        world.put(WorldProperty::Position, Position::new(10.0, 2.5, 0.0));

        let mut history = StateHistory::new();
        history.record(StateTransition {
            transition: "move".to_string(),
            from: ActionState::READY_TO_MOVE,
            to: ActionState::MOVED,
            tick: 4,
            timestamp: Utc::now(),
        });

        MachineSnapshot {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            machine_id: Uuid::new_v4(),
            name: "move_to".to_string(),
            current_state: ActionState::MOVED,
            world,
            history,
            tick_count: 4,
        }
    }

    #[test]
    fn json_preserves_snapshot() {
        let original = snapshot();
        let back = MachineSnapshot::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn binary_preserves_snapshot() {
        let original = snapshot();
        let back = MachineSnapshot::from_binary(&original.to_binary().unwrap()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut future = snapshot();
        future.version = CHECKPOINT_VERSION + 1;
        let json = future.to_json().unwrap();

        assert!(matches!(
            MachineSnapshot::from_json(&json),
            Err(CheckpointError::UnsupportedVersion { found, supported })
                if found == CHECKPOINT_VERSION + 1 && supported == CHECKPOINT_VERSION
        ));
    }

    #[test]
    fn sentinel_state_fails_validation() {
        let mut broken = snapshot();
        broken.current_state = ActionState::NONE;
        broken.history = StateHistory::new();
        assert!(matches!(
            broken.validate(),
            Err(CheckpointError::ValidationFailed(_))
        ));

        broken.current_state = ActionState::ALL;
        assert!(broken.validate().is_err());
    }

    #[test]
    fn history_must_end_in_current_state() {
        let mut broken = snapshot();
        broken.current_state = ActionState::ARRIVED;
        assert!(matches!(
            broken.validate(),
            Err(CheckpointError::ValidationFailed(_))
        ));
    }

    #[test]
    fn garbage_is_a_deserialization_error() {
        assert!(matches!(
            MachineSnapshot::from_json("{\"version\": 1}"),
            Err(CheckpointError::DeserializationFailed(_))
        ));
        assert!(matches!(
            MachineSnapshot::from_binary(&[1, 2, 3]),
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }
}
