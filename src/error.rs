//! Error types for the configuration boundary
//!
//! The simulation itself has no error channel: degenerate geometry, over-stress
//! and pool exhaustion are domain policy. Errors only arise while loading or
//! validating parameters and static databases.

use thiserror::Error;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, SandboxError>;

#[derive(Error, Debug)]
pub enum SandboxError {
    /// Reading or writing a configuration file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration JSON is malformed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A tunable parameter lies outside its documented range
    #[error("parameter {name} = {value} outside [{min}, {max}]")]
    ParameterOutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// A fish species database with no species
    #[error("fish species database is empty")]
    EmptySpeciesDatabase,

    /// A ship definition that references missing points
    #[error("invalid ship definition: {0}")]
    InvalidShipDefinition(String),
}
