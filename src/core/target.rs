//! Commander targets: what an action is aimed at.

use serde::{Deserialize, Serialize};

/// A point in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal (2D) distance, as used for range checks.
    pub fn distance_2d(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Numeric tag of a target kind, stable across collaborating catalogs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TargetType {
    Garrison = 0,
    Location = 1,
    Position = 2,
    Cluster = 3,
}

impl TargetType {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Opaque engine handle of a garrison, location or cluster.
pub type TargetId = u64;

/// What a garrison action is aimed at.
///
/// [`Target::NULL`] is the canonical empty target and is tested with
/// [`Target::is_null`].
///
/// # Example
///
/// ```rust
/// use cmdr_action::core::{Target, TargetType};
///
/// let target = Target::Location(12);
/// assert_eq!(target.target_type(), Some(TargetType::Location));
/// assert!(!target.is_null());
/// assert!(Target::NULL.is_null());
/// assert_eq!(Target::default(), Target::NULL);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Target {
    #[default]
    Null,
    Garrison(TargetId),
    Location(TargetId),
    Position(Position),
    Cluster(TargetId),
}

impl Target {
    pub const NULL: Self = Self::Null;

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Kind of the target, `None` for the null target.
    pub fn target_type(&self) -> Option<TargetType> {
        match self {
            Self::Null => None,
            Self::Garrison(_) => Some(TargetType::Garrison),
            Self::Location(_) => Some(TargetType::Location),
            Self::Position(_) => Some(TargetType::Position),
            Self::Cluster(_) => Some(TargetType::Cluster),
        }
    }
}
