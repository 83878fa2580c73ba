use crate::{contract::Extractor, error::ExtractorError, staged::Staged};
use async_trait::async_trait;
use connectors::{
    base::{backend::Backend, mapper::RecordMapper, sink::RecordSink},
    error::ExtractionError,
};
use model::{
    config::ExtractorConfig,
    partition::{JobId, PartitionDescriptor, strip_port},
    records::{row::Record, schema::RecordSchema},
};
use std::sync::Arc;
use tracing::{debug, error};

/// The one concrete `Extractor`: a backend, its mapper, and at most one
/// open cursor and sink. Hosts pick the backend and mapper per dataset;
/// the lifecycle is shared.
pub struct Extraction<B: Backend> {
    backend: B,
    mapper: Arc<dyn RecordMapper<Native = B::Native>>,
    schema: RecordSchema,
    cursor: Option<Staged<B::Cursor>>,
    sink: Option<B::Sink>,
}

impl<B: Backend> Extraction<B> {
    pub fn new(
        backend: B,
        mapper: Arc<dyn RecordMapper<Native = B::Native>>,
        schema: RecordSchema,
    ) -> Self {
        Extraction {
            backend,
            mapper,
            schema,
            cursor: None,
            sink: None,
        }
    }
}

#[async_trait]
impl<B: Backend> Extractor for Extraction<B> {
    async fn plan_partitions(
        &mut self,
        config: &ExtractorConfig,
    ) -> Result<Vec<PartitionDescriptor>, ExtractorError> {
        // A fresh identity per call; descriptors of one plan share it.
        let job = JobId::generate(config.dataset_id);
        debug!(job = %job, "planning dataset");
        Ok(self.backend.plan(&job, config).await?)
    }

    fn preferred_locations(&self, descriptor: &PartitionDescriptor) -> Vec<String> {
        descriptor
            .replicas()
            .iter()
            .map(|host| strip_port(host))
            .collect()
    }

    async fn open_cursor(
        &mut self,
        descriptor: &PartitionDescriptor,
        config: &ExtractorConfig,
    ) -> Result<(), ExtractorError> {
        let cursor = self.backend.open_cursor(descriptor, config).await?;
        // a replaced cursor releases its resources on drop
        self.cursor = Some(Staged::new(cursor));
        Ok(())
    }

    async fn has_next(&mut self) -> Result<bool, ExtractorError> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(ExtractionError::Protocol("no cursor open".into()).into());
        };
        Ok(cursor.has_next().await?)
    }

    async fn next(&mut self) -> Result<Record, ExtractorError> {
        let native = self
            .cursor
            .as_mut()
            .and_then(Staged::take)
            .ok_or(ExtractorError::NoSuchRecord)?;
        Ok(self.mapper.decode(native)?)
    }

    async fn open_sink(
        &mut self,
        config: &ExtractorConfig,
        sample: &Record,
    ) -> Result<(), ExtractorError> {
        // the sample shapes the target, it is never written itself
        self.schema.validate(sample)?;
        self.sink = Some(self.backend.open_sink(config).await?);
        Ok(())
    }

    async fn write(&mut self, record: &Record) -> Result<(), ExtractorError> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(ExtractionError::Protocol("no sink open".into()).into());
        };
        let native = self.mapper.encode(record)?;
        sink.put(native).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ExtractorError> {
        let mut failures: Vec<ExtractionError> = Vec::new();
        if let Some(mut cursor) = self.cursor.take() {
            if let Err(err) = cursor.close().await {
                failures.push(err);
            }
        }
        if let Some(mut sink) = self.sink.take() {
            if let Err(err) = sink.close().await {
                failures.push(err);
            }
        }

        if failures.is_empty() {
            return Ok(());
        }
        for extra in failures.iter().skip(1) {
            error!(%extra, "additional close failure");
        }
        let primary = failures.remove(0);
        if failures.is_empty() {
            return Err(primary.into());
        }
        let rest = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(ExtractionError::Close(format!("{primary}; additionally: {rest}")).into())
    }
}
