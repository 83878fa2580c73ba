use crate::{
    base::{cursor::RecordCursor, sink::RecordSink},
    batch::attempt::AttemptId,
    error::{ExtractionError, PlanningError},
};
use async_trait::async_trait;
use model::{config::ExtractorConfig, partition::JobId};
use serde::{Serialize, de::DeserializeOwned};

/// Boundary to a batch-format store: the store computes its own native
/// splits and hands out per-split readers and per-attempt writers. The
/// planner never interprets a split beyond serializing it and asking for
/// its locality hosts.
#[async_trait]
pub trait BatchFormat: Send + Sync {
    /// Native split description. Serialized into the opaque handle the
    /// descriptor carries; only this format ever decodes it again.
    type Split: Serialize + DeserializeOwned + Send + Sync;
    /// Record representation readers produce and writers accept.
    type Pair: Send;
    type Reader: RecordCursor<Native = Self::Pair>;
    type Writer: RecordSink<Native = Self::Pair>;

    /// Asks the store to split the dataset. Order is preserved: split `i`
    /// becomes partition `i`.
    async fn compute_splits(
        &self,
        job: &JobId,
        config: &ExtractorConfig,
    ) -> Result<Vec<Self::Split>, PlanningError>;

    /// Locality hosts for one split, ports allowed; empty when unknown.
    fn split_hosts(&self, split: &Self::Split) -> Vec<String>;

    async fn open_reader(
        &self,
        attempt: &AttemptId,
        split: Self::Split,
        config: &ExtractorConfig,
    ) -> Result<Self::Reader, ExtractionError>;

    async fn open_writer(
        &self,
        attempt: &AttemptId,
        config: &ExtractorConfig,
    ) -> Result<Self::Writer, ExtractionError>;
}
