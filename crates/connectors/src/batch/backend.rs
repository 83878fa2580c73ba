use crate::{
    base::{backend::Backend, planner::PartitionPlanner},
    batch::{attempt::AttemptId, format::BatchFormat},
    error::{ExtractionError, PlanningError},
};
use async_trait::async_trait;
use model::{
    config::ExtractorConfig,
    partition::{JobId, PartitionBounds, PartitionDescriptor, SplitHandle},
};
use tracing::debug;

/// Adapts any `BatchFormat` to the backend contract. Splits are wrapped
/// one-to-one in the order the format reports them.
pub struct BatchBackend<F> {
    format: F,
}

impl<F> BatchBackend<F> {
    pub fn new(format: F) -> Self {
        BatchBackend { format }
    }

    pub fn format(&self) -> &F {
        &self.format
    }
}

#[async_trait]
impl<F: BatchFormat> PartitionPlanner for BatchBackend<F> {
    async fn plan(
        &self,
        job: &JobId,
        config: &ExtractorConfig,
    ) -> Result<Vec<PartitionDescriptor>, PlanningError> {
        let splits = self.format.compute_splits(job, config).await?;
        let mut partitions = Vec::with_capacity(splits.len());
        for (index, split) in splits.into_iter().enumerate() {
            let hosts = self.format.split_hosts(&split);
            let bytes = bincode::serialize(&split)?;
            partitions.push(PartitionDescriptor::new(
                job.clone(),
                index,
                PartitionBounds::NativeSplit(SplitHandle::new(bytes, hosts)),
            ));
        }
        debug!(job = %job, partitions = partitions.len(), "planned batch-format dataset");
        Ok(partitions)
    }
}

#[async_trait]
impl<F: BatchFormat> Backend for BatchBackend<F> {
    type Native = F::Pair;
    type Cursor = F::Reader;
    type Sink = F::Writer;

    async fn open_cursor(
        &self,
        descriptor: &PartitionDescriptor,
        config: &ExtractorConfig,
    ) -> Result<Self::Cursor, ExtractionError> {
        let handle = match &descriptor.bounds {
            PartitionBounds::NativeSplit(handle) => handle,
            PartitionBounds::KeyRange(_) => {
                return Err(ExtractionError::InvalidDescriptor(
                    "batch formats require a native split, got a key range".into(),
                ));
            }
        };
        let split: F::Split = bincode::deserialize(&handle.bytes)?;
        let attempt = AttemptId::read(descriptor.job.clone(), descriptor.index);
        debug!(attempt = %attempt, "opening batch reader");
        self.format.open_reader(&attempt, split, config).await
    }

    async fn open_sink(&self, config: &ExtractorConfig) -> Result<Self::Sink, ExtractionError> {
        // Writes have no planned descriptor; identity comes from the
        // task's own config.
        let job = JobId::generate(config.dataset_id);
        let attempt = AttemptId::write(job, config.partition_id);
        debug!(attempt = %attempt, "opening batch writer");
        self.format.open_writer(&attempt, config).await
    }
}
