use crate::error::ExtractionError;
use async_trait::async_trait;

/// Forward-only record source over one partition.
///
/// `advance` either produces the next native record or reports end of
/// data with `Ok(None)`; it is the only probe, so callers that need
/// idempotent lookahead stage the produced record themselves. After
/// `Ok(None)` further calls keep returning `Ok(None)`.
#[async_trait]
pub trait RecordCursor: Send {
    type Native: Send;

    async fn advance(&mut self) -> Result<Option<Self::Native>, ExtractionError>;

    /// Releases the cursor's resources. Safe to call on a cursor that
    /// never produced anything, and more than once.
    async fn close(&mut self) -> Result<(), ExtractionError>;
}
