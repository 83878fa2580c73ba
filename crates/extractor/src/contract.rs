use crate::error::ExtractorError;
use async_trait::async_trait;
use model::{config::ExtractorConfig, partition::PartitionDescriptor, records::row::Record};

/// The whole boundary the host engine's scheduler drives, one instance
/// per dataset and backend. Object safe, so hosts can keep
/// heterogeneous extractors behind a single pointer type.
///
/// Cursors and sinks are single-driver: the host guarantees one thread
/// at a time per instance, which `&mut self` encodes directly.
#[async_trait]
pub trait Extractor: Send {
    /// Computes the dataset's partition list. Nothing is cached on the
    /// instance; backend topology is re-read on every call.
    async fn plan_partitions(
        &mut self,
        config: &ExtractorConfig,
    ) -> Result<Vec<PartitionDescriptor>, ExtractorError>;

    /// Locality hint for one partition, hostnames without ports. Empty
    /// when the backend knows nothing; never an error.
    fn preferred_locations(&self, descriptor: &PartitionDescriptor) -> Vec<String>;

    /// Binds a cursor to one planned partition, replacing any cursor
    /// already open. Re-callable for the same descriptor; that is the
    /// host's retry path.
    async fn open_cursor(
        &mut self,
        descriptor: &PartitionDescriptor,
        config: &ExtractorConfig,
    ) -> Result<(), ExtractorError>;

    /// Stages at most one record ahead and reports whether one is
    /// available. Repeated calls answer from the staged record without
    /// touching the backend again.
    async fn has_next(&mut self) -> Result<bool, ExtractorError>;

    /// Hands over the staged record. Only valid after a `has_next` that
    /// returned true; anything else is `NoSuchRecord`.
    async fn next(&mut self) -> Result<Record, ExtractorError>;

    /// Prepares the writer. The sample only shapes the target; it is
    /// never written.
    async fn open_sink(
        &mut self,
        config: &ExtractorConfig,
        sample: &Record,
    ) -> Result<(), ExtractorError>;

    /// Persists exactly one record through the open sink.
    async fn write(&mut self, record: &Record) -> Result<(), ExtractorError>;

    /// Releases cursor and sink, attempting both even when one fails.
    /// Idempotent and safe when nothing was ever opened, including from
    /// a cleanup path after an abandoned read.
    async fn close(&mut self) -> Result<(), ExtractorError>;
}
