//! Snapshot error types.

use thiserror::Error;

/// Errors that can occur while saving or restoring a snapshot
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Encoding to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Decoding from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The snapshot decoded but describes a machine that cannot exist
    #[error("Snapshot validation failed: {0}")]
    ValidationFailed(String),
}
