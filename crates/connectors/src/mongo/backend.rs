use crate::{
    base::{backend::Backend, planner::PartitionPlanner},
    error::{ExtractionError, PlanningError},
    mongo::{cursor::MongoCursor, planner, sink::MongoSink},
};
use async_trait::async_trait;
use bson::Document;
use model::{
    config::ExtractorConfig,
    partition::{JobId, PartitionDescriptor},
    records::schema::RecordSchema,
};

/// Document-store backend. Planning follows the deployment's own
/// topology, sharded or not; cursors and sinks each own one client.
pub struct MongoBackend {
    schema: RecordSchema,
}

impl MongoBackend {
    pub fn new(schema: RecordSchema) -> Self {
        MongoBackend { schema }
    }

    /// Collections are always keyed; without a declared key field the
    /// store's own `_id` drives scans and upserts.
    fn key_field(&self) -> String {
        self.schema
            .key_fields()
            .first()
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "_id".to_string())
    }
}

#[async_trait]
impl PartitionPlanner for MongoBackend {
    async fn plan(
        &self,
        job: &JobId,
        config: &ExtractorConfig,
    ) -> Result<Vec<PartitionDescriptor>, PlanningError> {
        planner::plan(job, &self.key_field(), config).await
    }
}

#[async_trait]
impl Backend for MongoBackend {
    type Native = Document;
    type Cursor = MongoCursor;
    type Sink = MongoSink;

    async fn open_cursor(
        &self,
        descriptor: &PartitionDescriptor,
        config: &ExtractorConfig,
    ) -> Result<MongoCursor, ExtractionError> {
        MongoCursor::open(&self.key_field(), descriptor, config).await
    }

    async fn open_sink(&self, config: &ExtractorConfig) -> Result<MongoSink, ExtractionError> {
        MongoSink::open(&self.key_field(), config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::data_type::DataType;

    #[test]
    fn key_field_defaults_to_the_store_id() {
        let keyed = MongoBackend::new(
            RecordSchema::builder("users")
                .key_field("user_id", DataType::Int)
                .field("name", DataType::String)
                .build(),
        );
        assert_eq!(keyed.key_field(), "user_id");

        let unkeyed = MongoBackend::new(
            RecordSchema::builder("events")
                .field("at", DataType::Timestamp)
                .build(),
        );
        assert_eq!(unkeyed.key_field(), "_id");
    }
}
