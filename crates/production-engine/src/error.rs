//! Error types for the engine layer

use production_storage::StorageError;
use production_types::ProductionStage;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No workflow exists for the given id or subject. No audit record
    /// is written.
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    /// A forward rank-skip was attempted. Structural precondition, not a
    /// gate outcome: no audit record is written.
    #[error("invalid transition {from} -> {to}: {reason}")]
    InvalidTransition {
        from: ProductionStage,
        to: ProductionStage,
        reason: String,
    },

    /// One or more gate requirements were unmet and no bypass was
    /// granted. The failed audit record has already been persisted.
    #[error("gate validation failed for {from} -> {to}: {}", .failures.join("; "))]
    GateFailed {
        from: ProductionStage,
        to: ProductionStage,
        failures: Vec<String>,
    },

    /// A bypass was requested without an actor or justification.
    #[error("invalid bypass request: {0}")]
    InvalidBypass(String),

    /// A custom stage ordering or requirement table was malformed.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfiguration(String),

    /// The backing store failed. Transient; retry policy belongs to the
    /// caller.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
