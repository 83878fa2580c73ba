use crate::error::PlanningError;
use async_trait::async_trait;
use model::{config::ExtractorConfig, partition::JobId, partition::PartitionDescriptor};

/// Computes the partition list for one dataset. Implementations open only
/// short-lived administrative connections and release them before
/// returning, on error paths too.
///
/// Returned descriptors are index-contiguous from zero, pairwise disjoint
/// and, for ordered key spaces, cover the whole space.
#[async_trait]
pub trait PartitionPlanner: Send + Sync {
    async fn plan(
        &self,
        job: &JobId,
        config: &ExtractorConfig,
    ) -> Result<Vec<PartitionDescriptor>, PlanningError>;
}
