use crate::{
    base::{cursor::RecordCursor, planner::PartitionPlanner, sink::RecordSink},
    error::ExtractionError,
};
use async_trait::async_trait;
use model::{config::ExtractorConfig, partition::PartitionDescriptor};

/// One storage technology: planning plus cursor and sink construction
/// over a shared native record type. Backends that scan or upsert by key
/// take their `RecordSchema` at construction; the trait itself never
/// sees records, only natives.
#[async_trait]
pub trait Backend: PartitionPlanner {
    type Native: Send;
    type Cursor: RecordCursor<Native = Self::Native>;
    type Sink: RecordSink<Native = Self::Native>;

    /// Opens a cursor over one planned partition. The descriptor must
    /// come from this backend's own planning.
    async fn open_cursor(
        &self,
        descriptor: &PartitionDescriptor,
        config: &ExtractorConfig,
    ) -> Result<Self::Cursor, ExtractionError>;

    /// Opens a sink for the dataset. Nothing is written until the first
    /// `put`.
    async fn open_sink(&self, config: &ExtractorConfig) -> Result<Self::Sink, ExtractionError>;
}
