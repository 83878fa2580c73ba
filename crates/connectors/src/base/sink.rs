use crate::error::ExtractionError;
use async_trait::async_trait;

/// Record-at-a-time writer for one partition's output. Every write is an
/// upsert on the schema's key fields; there is no batching and no
/// transaction spanning writes.
#[async_trait]
pub trait RecordSink: Send {
    type Native: Send;

    async fn put(&mut self, record: Self::Native) -> Result<(), ExtractionError>;

    /// Flushes and releases the connection. Idempotent.
    async fn close(&mut self) -> Result<(), ExtractionError>;
}
