use crate::{
    base::{backend::Backend, planner::PartitionPlanner},
    error::{ExtractionError, PlanningError},
    sql::{cursor::SqlCursor, planner, row::SqlTuple, sink::SqlSink},
};
use async_trait::async_trait;
use model::{
    config::ExtractorConfig,
    partition::{JobId, PartitionDescriptor},
    records::schema::RecordSchema,
};
use tracing::debug;

/// Relational backend over a wire-protocol client. Planning is pure
/// bound arithmetic; cursors and sinks each own one connection.
pub struct SqlBackend {
    schema: RecordSchema,
}

impl SqlBackend {
    pub fn new(schema: RecordSchema) -> Self {
        SqlBackend { schema }
    }

    fn key_column(&self) -> Result<String, ExtractionError> {
        self.schema
            .key_fields()
            .first()
            .map(|f| f.name.clone())
            .ok_or_else(|| {
                ExtractionError::InvalidConfig("schema declares no key field to scan by".into())
            })
    }
}

#[async_trait]
impl PartitionPlanner for SqlBackend {
    async fn plan(
        &self,
        job: &JobId,
        config: &ExtractorConfig,
    ) -> Result<Vec<PartitionDescriptor>, PlanningError> {
        let partitions = planner::range_partitions(job, config)?;
        debug!(job = %job, partitions = partitions.len(), "planned relational dataset");
        Ok(partitions)
    }
}

#[async_trait]
impl Backend for SqlBackend {
    type Native = SqlTuple;
    type Cursor = SqlCursor;
    type Sink = SqlSink;

    async fn open_cursor(
        &self,
        descriptor: &PartitionDescriptor,
        config: &ExtractorConfig,
    ) -> Result<SqlCursor, ExtractionError> {
        let key = self.key_column()?;
        SqlCursor::open(&key, descriptor, config).await
    }

    async fn open_sink(&self, config: &ExtractorConfig) -> Result<SqlSink, ExtractionError> {
        SqlSink::open(&self.schema, config).await
    }
}
