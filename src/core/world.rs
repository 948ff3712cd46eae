//! Garrison world-state property vector.
//!
//! A [`WorldState`] is a fixed-schema vector of situational properties that
//! transitions read to decide whether they apply and write as part of their
//! effect. Properties are identified by a stable index: new properties are
//! appended after the last one and existing indices are never renumbered, so
//! persisted and replayed vectors stay readable.

use super::target::{Position, Target};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by world-state access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorldStateError {
    /// The index is outside the schema. Signals a producer/consumer schema
    /// mismatch and is never clamped.
    #[error("Invalid world-state property {index} (schema has {count} properties)")]
    InvalidProperty { index: usize, count: usize },
}

/// Properties of a garrison's world state, by schema index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum WorldProperty {
    AwareOfEnemy = 0,
    AllVehiclesRepaired = 1,
    AllVehiclesCanMove = 2,
    AllHumansHealed = 3,
    AllInfantryMounted = 4,
    AllCrewMounted = 5,
    NeedVehiclesToReachDestination = 6,
    AllVehicleGroupsHaveDrivers = 7,
    AllVehicleGroupsHaveTurretOperators = 8,
    AllVehiclesHaveCrewAssigned = 9,
    EnoughVehiclesForAllHumans = 10,
    EngineerAvailable = 11,
    MedicAvailable = 12,
    Moving = 13,
    EnoughHumansForAllVehicles = 14,
    EmptyVehiclesAvailable = 15,
    Position = 16,
    CargoPosition = 17,
    VehiclesPosition = 18,
    Cargo = 19,
    HasCargo = 20,
    VehicleGroupsMerged = 21,
}

impl WorldProperty {
    /// Length of the vector. Also the first invalid index.
    pub const COUNT: usize = 22;

    /// Every property in index order.
    pub const ALL: [WorldProperty; Self::COUNT] = [
        Self::AwareOfEnemy,
        Self::AllVehiclesRepaired,
        Self::AllVehiclesCanMove,
        Self::AllHumansHealed,
        Self::AllInfantryMounted,
        Self::AllCrewMounted,
        Self::NeedVehiclesToReachDestination,
        Self::AllVehicleGroupsHaveDrivers,
        Self::AllVehicleGroupsHaveTurretOperators,
        Self::AllVehiclesHaveCrewAssigned,
        Self::EnoughVehiclesForAllHumans,
        Self::EngineerAvailable,
        Self::MedicAvailable,
        Self::Moving,
        Self::EnoughHumansForAllVehicles,
        Self::EmptyVehiclesAvailable,
        Self::Position,
        Self::CargoPosition,
        Self::VehiclesPosition,
        Self::Cargo,
        Self::HasCargo,
        Self::VehicleGroupsMerged,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AwareOfEnemy => "aware_of_enemy",
            Self::AllVehiclesRepaired => "all_vehicles_repaired",
            Self::AllVehiclesCanMove => "all_vehicles_can_move",
            Self::AllHumansHealed => "all_humans_healed",
            Self::AllInfantryMounted => "all_infantry_mounted",
            Self::AllCrewMounted => "all_crew_mounted",
            Self::NeedVehiclesToReachDestination => "need_vehicles_to_reach_destination",
            Self::AllVehicleGroupsHaveDrivers => "all_vehicle_groups_have_drivers",
            Self::AllVehicleGroupsHaveTurretOperators => "all_vehicle_groups_have_turret_operators",
            Self::AllVehiclesHaveCrewAssigned => "all_vehicles_have_crew_assigned",
            Self::EnoughVehiclesForAllHumans => "enough_vehicles_for_all_humans",
            Self::EngineerAvailable => "engineer_available",
            Self::MedicAvailable => "medic_available",
            Self::Moving => "moving",
            Self::EnoughHumansForAllVehicles => "enough_humans_for_all_vehicles",
            Self::EmptyVehiclesAvailable => "empty_vehicles_available",
            Self::Position => "position",
            Self::CargoPosition => "cargo_position",
            Self::VehiclesPosition => "vehicles_position",
            Self::Cargo => "cargo",
            Self::HasCargo => "has_cargo",
            Self::VehicleGroupsMerged => "vehicle_groups_merged",
        }
    }
}

impl TryFrom<usize> for WorldProperty {
    type Error = WorldStateError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(WorldStateError::InvalidProperty {
                index,
                count: Self::COUNT,
            })
    }
}

impl fmt::Display for WorldProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of one world-state property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum WorldValue {
    #[default]
    Unset,
    Bool(bool),
    Number(f64),
    Position(Position),
    Target(Target),
}

impl From<bool> for WorldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for WorldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Position> for WorldValue {
    fn from(value: Position) -> Self {
        Self::Position(value)
    }
}

impl From<Target> for WorldValue {
    fn from(value: Target) -> Self {
        Self::Target(value)
    }
}

/// Fixed-size property vector of one garrison.
///
/// Serialized as the plain list of values. A shorter list (written by an
/// older schema) is padded with [`WorldValue::Unset`]; a longer one is
/// rejected.
///
/// # Example
///
/// ```rust
/// use cmdr_action::core::{WorldProperty, WorldState, WorldStateError, WorldValue};
///
/// let mut world = WorldState::new();
/// world.set_flag(WorldProperty::Moving, true);
/// assert!(world.flag(WorldProperty::Moving));
///
/// assert_eq!(world.get(13), Ok(&WorldValue::Bool(true)));
/// assert!(matches!(
///     world.get(WorldProperty::COUNT),
///     Err(WorldStateError::InvalidProperty { index: 22, .. })
/// ));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WorldValue>", into = "Vec<WorldValue>")]
pub struct WorldState {
    values: Vec<WorldValue>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState {
    /// Create a vector with every property unset.
    pub fn new() -> Self {
        Self {
            values: vec![WorldValue::Unset; WorldProperty::COUNT],
        }
    }

    /// Number of properties. Always [`WorldProperty::COUNT`].
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bounds-checked read by raw index.
    pub fn get(&self, index: usize) -> Result<&WorldValue, WorldStateError> {
        self.values.get(index).ok_or(WorldStateError::InvalidProperty {
            index,
            count: WorldProperty::COUNT,
        })
    }

    /// Bounds-checked write by raw index.
    pub fn set(
        &mut self,
        index: usize,
        value: impl Into<WorldValue>,
    ) -> Result<(), WorldStateError> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(WorldStateError::InvalidProperty {
                index,
                count: WorldProperty::COUNT,
            })?;
        *slot = value.into();
        Ok(())
    }

    pub fn value(&self, property: WorldProperty) -> &WorldValue {
        &self.values[property.index()]
    }

    pub fn put(&mut self, property: WorldProperty, value: impl Into<WorldValue>) {
        self.values[property.index()] = value.into();
    }

    /// Read a boolean property. Anything other than `Bool(true)` is false.
    pub fn flag(&self, property: WorldProperty) -> bool {
        matches!(self.value(property), WorldValue::Bool(true))
    }

    pub fn set_flag(&mut self, property: WorldProperty, value: bool) {
        self.put(property, value);
    }

    pub fn number(&self, property: WorldProperty) -> Option<f64> {
        match self.value(property) {
            WorldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn position(&self, property: WorldProperty) -> Option<Position> {
        match self.value(property) {
            WorldValue::Position(p) => Some(*p),
            _ => None,
        }
    }

    pub fn target(&self, property: WorldProperty) -> Option<Target> {
        match self.value(property) {
            WorldValue::Target(t) => Some(*t),
            _ => None,
        }
    }

    /// Properties in index order with their values.
    pub fn iter(&self) -> impl Iterator<Item = (WorldProperty, &WorldValue)> {
        WorldProperty::ALL.iter().copied().zip(self.values.iter())
    }
}

impl TryFrom<Vec<WorldValue>> for WorldState {
    type Error = WorldStateError;

    fn try_from(mut values: Vec<WorldValue>) -> Result<Self, Self::Error> {
        if values.len() > WorldProperty::COUNT {
            return Err(WorldStateError::InvalidProperty {
                index: values.len() - 1,
                count: WorldProperty::COUNT,
            });
        }
        values.resize(WorldProperty::COUNT, WorldValue::Unset);
        Ok(Self { values })
    }
}

impl From<WorldState> for Vec<WorldValue> {
    fn from(world: WorldState) -> Self {
        world.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_every_property_unset() {
        let world = WorldState::new();
        assert_eq!(world.len(), 22);
        assert!(world.iter().all(|(_, v)| *v == WorldValue::Unset));
    }

    #[test]
    fn schema_indices_are_stable() {
        assert_eq!(WorldProperty::AwareOfEnemy.index(), 0);
        assert_eq!(WorldProperty::Moving.index(), 13);
        assert_eq!(WorldProperty::Position.index(), 16);
        assert_eq!(WorldProperty::VehicleGroupsMerged.index(), 21);
        for (i, property) in WorldProperty::ALL.iter().enumerate() {
            assert_eq!(property.index(), i);
        }
    }

    #[test]
    fn get_at_count_is_invalid() {
        let world = WorldState::new();
        assert_eq!(
            world.get(22),
            Err(WorldStateError::InvalidProperty {
                index: 22,
                count: 22
            })
        );
    }

    #[test]
    fn set_out_of_range_is_invalid_and_leaves_vector_unchanged() {
        let mut world = WorldState::new();
        let before = world.clone();
        assert!(world.set(40, true).is_err());
        assert_eq!(world, before);
    }

    #[test]
    fn raw_and_typed_access_agree() {
        let mut world = WorldState::new();
        world.set(16, Position::new(1.0, 2.0, 0.0)).unwrap();
        assert_eq!(
            world.position(WorldProperty::Position),
            Some(Position::new(1.0, 2.0, 0.0))
        );
        world.put(WorldProperty::Cargo, Target::Garrison(3));
        assert_eq!(world.target(WorldProperty::Cargo), Some(Target::Garrison(3)));
    }

    #[test]
    fn unset_flag_reads_false() {
        let world = WorldState::new();
        assert!(!world.flag(WorldProperty::AwareOfEnemy));
        assert_eq!(world.number(WorldProperty::Cargo), None);
    }

    #[test]
    fn clone_is_deep() {
        let mut world = WorldState::new();
        let copy = world.clone();
        world.set_flag(WorldProperty::HasCargo, true);
        assert!(!copy.flag(WorldProperty::HasCargo));
    }

    #[test]
    fn property_try_from_rejects_unknown_index() {
        assert_eq!(WorldProperty::try_from(13), Ok(WorldProperty::Moving));
        assert!(WorldProperty::try_from(WorldProperty::COUNT).is_err());
    }

    #[test]
    fn shorter_serialized_vector_is_padded() {
        let json = "[{\"Bool\":true}]";
        let world: WorldState = serde_json::from_str(json).unwrap();
        assert_eq!(world.len(), WorldProperty::COUNT);
        assert!(world.flag(WorldProperty::AwareOfEnemy));
    }

    #[test]
    fn longer_serialized_vector_is_rejected() {
        let values = vec![WorldValue::Unset; WorldProperty::COUNT + 1];
        let json = serde_json::to_string(&values).unwrap();
        assert!(serde_json::from_str::<WorldState>(&json).is_err());
    }

    #[test]
    fn state_roundtrips_through_json() {
        let mut world = WorldState::new();
        world.set_flag(WorldProperty::Moving, true);
        world.put(WorldProperty::Position, Position::new(5.0, 6.0, 0.0));
        let json = serde_json::to_string(&world).unwrap();
        let back: WorldState = serde_json::from_str(&json).unwrap();
        assert_eq!(world, back);
    }
}
