use connectors::error::{ExtractionError, PlanningError};
use model::error::TransformError;
use thiserror::Error;

/// Umbrella error of the host-engine contract. Wraps the layer errors
/// and adds the one protocol failure the orchestrator itself detects.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// Partition discovery failed; the job cannot start.
    #[error(transparent)]
    Planning(#[from] PlanningError),

    /// One partition's read or write failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A record could not cross the native boundary.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// `next` was called without a record staged by `has_next`.
    #[error("no record staged; a true `has_next` must precede `next`")]
    NoSuchRecord,
}
