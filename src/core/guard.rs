//! Guard predicates for transition conditions.
//!
//! A guard decides whether a transition applies to the current world state.
//! It must be deterministic and must not mutate anything: mutation belongs to
//! the transition's effect, which only runs once the guard passed.

use super::world::{WorldProperty, WorldState};
use std::sync::Arc;

/// Predicate over a garrison's world state.
///
/// Guards read the world state they are given and any [`AstVar`] they
/// captured. They never write.
///
/// [`AstVar`]: crate::core::AstVar
///
/// # Example
///
/// ```rust
/// use cmdr_action::core::{Guard, WorldProperty, WorldState};
///
/// let can_leave = Guard::flag(WorldProperty::AllCrewMounted)
///     .and(Guard::not_flag(WorldProperty::AwareOfEnemy));
///
/// let mut world = WorldState::new();
/// assert!(!can_leave.check(&world));
///
/// world.set_flag(WorldProperty::AllCrewMounted, true);
/// assert!(can_leave.check(&world));
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<dyn Fn(&WorldState) -> bool + Send + Sync>,
}

impl Guard {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&WorldState) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard that always passes.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Passes while `property` is `Bool(true)`.
    pub fn flag(property: WorldProperty) -> Self {
        Self::new(move |world| world.flag(property))
    }

    /// Passes while `property` is not `Bool(true)`.
    pub fn not_flag(property: WorldProperty) -> Self {
        Self::new(move |world| !world.flag(property))
    }

    /// Passes when both guards pass. `other` is not evaluated if `self` fails.
    pub fn and(self, other: Guard) -> Self {
        Self::new(move |world| self.check(world) && other.check(world))
    }

    /// Passes when either guard passes.
    pub fn or(self, other: Guard) -> Self {
        Self::new(move |world| self.check(world) || other.check(world))
    }

    /// Check the guard against a world state.
    pub fn check(&self, world: &WorldState) -> bool {
        (self.predicate)(world)
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AstVar;

    #[test]
    fn flag_guard_follows_world_state() {
        let guard = Guard::flag(WorldProperty::Moving);
        let mut world = WorldState::new();
        assert!(!guard.check(&world));
        world.set_flag(WorldProperty::Moving, true);
        assert!(guard.check(&world));
    }

    #[test]
    fn combinators_compose() {
        let guard = Guard::flag(WorldProperty::MedicAvailable)
            .or(Guard::flag(WorldProperty::AllHumansHealed))
            .and(Guard::not_flag(WorldProperty::AwareOfEnemy));

        let mut world = WorldState::new();
        assert!(!guard.check(&world));
        world.set_flag(WorldProperty::AllHumansHealed, true);
        assert!(guard.check(&world));
        world.set_flag(WorldProperty::AwareOfEnemy, true);
        assert!(!guard.check(&world));
    }

    #[test]
    fn guard_can_read_shared_cells() {
        let ready = AstVar::new(false);
        let probe = ready.clone();
        let guard = Guard::new(move |_| probe.get());

        let world = WorldState::new();
        assert!(!guard.check(&world));
        ready.set(true);
        assert!(guard.check(&world));
    }

    #[test]
    fn guard_is_deterministic() {
        let world = WorldState::new();
        let guard = Guard::not_flag(WorldProperty::HasCargo);
        assert_eq!(guard.check(&world), guard.check(&world));
        assert!(Guard::always().check(&world));
    }
}
