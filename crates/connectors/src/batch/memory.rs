use crate::{
    base::{cursor::RecordCursor, sink::RecordSink},
    batch::{attempt::AttemptId, format::BatchFormat},
    error::{ExtractionError, PlanningError},
};
use async_trait::async_trait;
use model::{config::ExtractorConfig, partition::JobId, records::row::Record};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// In-process batch format over preloaded records. Doubles as the
/// reference implementation of `BatchFormat` and as the test double for
/// the whole extraction lifecycle; fail points can be armed per split to
/// exercise error paths.
#[derive(Clone)]
pub struct MemoryFormat {
    inner: Arc<Mutex<Inner>>,
}

/// Split handle of `MemoryFormat`: records stay in the format's store,
/// the split only references them by id, like a real split referencing
/// file regions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemorySplit {
    pub id: usize,
    pub hosts: Vec<String>,
}

struct Inner {
    splits: Vec<SplitData>,
    written: Vec<Record>,
    writes_closed: bool,
    fail_compute: bool,
    fail_reader_close: bool,
    fail_writer_close: bool,
    /// split id -> fail after this many records were produced
    fail_read_after: HashMap<usize, usize>,
}

struct SplitData {
    hosts: Vec<String>,
    records: Vec<Record>,
}

impl MemoryFormat {
    pub fn builder() -> MemoryFormatBuilder {
        MemoryFormatBuilder {
            splits: Vec::new(),
            fail_compute: false,
            fail_reader_close: false,
            fail_writer_close: false,
            fail_read_after: HashMap::new(),
        }
    }

    /// Everything writers have stored so far.
    pub fn written(&self) -> Vec<Record> {
        self.inner.lock().unwrap().written.clone()
    }

    pub fn writes_closed(&self) -> bool {
        self.inner.lock().unwrap().writes_closed
    }
}

pub struct MemoryFormatBuilder {
    splits: Vec<SplitData>,
    fail_compute: bool,
    fail_reader_close: bool,
    fail_writer_close: bool,
    fail_read_after: HashMap<usize, usize>,
}

impl MemoryFormatBuilder {
    pub fn split(self, records: Vec<Record>) -> Self {
        self.split_with_hosts(Vec::new(), records)
    }

    pub fn split_with_hosts(mut self, hosts: Vec<String>, records: Vec<Record>) -> Self {
        self.splits.push(SplitData { hosts, records });
        self
    }

    /// Arms `compute_splits` to fail.
    pub fn fail_compute(mut self) -> Self {
        self.fail_compute = true;
        self
    }

    /// Arms the reader of one split to fail once it has produced
    /// `after` records.
    pub fn fail_read_after(mut self, split: usize, after: usize) -> Self {
        self.fail_read_after.insert(split, after);
        self
    }

    pub fn fail_reader_close(mut self) -> Self {
        self.fail_reader_close = true;
        self
    }

    pub fn fail_writer_close(mut self) -> Self {
        self.fail_writer_close = true;
        self
    }

    pub fn build(self) -> MemoryFormat {
        MemoryFormat {
            inner: Arc::new(Mutex::new(Inner {
                splits: self.splits,
                written: Vec::new(),
                writes_closed: false,
                fail_compute: self.fail_compute,
                fail_reader_close: self.fail_reader_close,
                fail_writer_close: self.fail_writer_close,
                fail_read_after: self.fail_read_after,
            })),
        }
    }
}

#[async_trait]
impl BatchFormat for MemoryFormat {
    type Split = MemorySplit;
    type Pair = Record;
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    async fn compute_splits(
        &self,
        _job: &JobId,
        _config: &ExtractorConfig,
    ) -> Result<Vec<MemorySplit>, PlanningError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_compute {
            return Err(PlanningError::SplitComputation(
                "injected split failure".into(),
            ));
        }
        Ok(inner
            .splits
            .iter()
            .enumerate()
            .map(|(id, data)| MemorySplit {
                id,
                hosts: data.hosts.clone(),
            })
            .collect())
    }

    fn split_hosts(&self, split: &MemorySplit) -> Vec<String> {
        split.hosts.clone()
    }

    async fn open_reader(
        &self,
        _attempt: &AttemptId,
        split: MemorySplit,
        _config: &ExtractorConfig,
    ) -> Result<MemoryReader, ExtractionError> {
        let inner = self.inner.lock().unwrap();
        let data = inner.splits.get(split.id).ok_or_else(|| {
            ExtractionError::InvalidDescriptor(format!("unknown split {}", split.id))
        })?;
        Ok(MemoryReader {
            records: data.records.clone().into_iter(),
            produced: 0,
            fail_after: inner.fail_read_after.get(&split.id).copied(),
            fail_close: inner.fail_reader_close,
            closed: false,
        })
    }

    async fn open_writer(
        &self,
        _attempt: &AttemptId,
        _config: &ExtractorConfig,
    ) -> Result<MemoryWriter, ExtractionError> {
        Ok(MemoryWriter {
            inner: Arc::clone(&self.inner),
            fail_close: self.inner.lock().unwrap().fail_writer_close,
            closed: false,
        })
    }
}

#[derive(Debug)]
pub struct MemoryReader {
    records: std::vec::IntoIter<Record>,
    produced: usize,
    fail_after: Option<usize>,
    fail_close: bool,
    closed: bool,
}

#[async_trait]
impl RecordCursor for MemoryReader {
    type Native = Record;

    async fn advance(&mut self) -> Result<Option<Record>, ExtractionError> {
        if let Some(after) = self.fail_after
            && self.produced >= after
        {
            return Err(ExtractionError::Io(std::io::Error::other(
                "injected read failure",
            )));
        }
        match self.records.next() {
            Some(record) => {
                self.produced += 1;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.fail_close {
            return Err(ExtractionError::Close("injected reader close failure".into()));
        }
        Ok(())
    }
}

pub struct MemoryWriter {
    inner: Arc<Mutex<Inner>>,
    fail_close: bool,
    closed: bool,
}

#[async_trait]
impl RecordSink for MemoryWriter {
    type Native = Record;

    async fn put(&mut self, record: Record) -> Result<(), ExtractionError> {
        if self.closed {
            return Err(ExtractionError::Protocol("put after close".into()));
        }
        self.inner.lock().unwrap().written.push(record);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.lock().unwrap().writes_closed = true;
        if self.fail_close {
            return Err(ExtractionError::Close("injected writer close failure".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{backend::Backend, planner::PartitionPlanner};
    use crate::batch::backend::BatchBackend;
    use model::{core::value::Value, partition::PartitionBounds, records::row::FieldValue};

    fn record(id: i64) -> Record {
        Record::new("events", vec![FieldValue::new("id", Value::Int(id))])
    }

    #[tokio::test]
    async fn splits_wrap_one_to_one_in_order() {
        let format = MemoryFormat::builder()
            .split_with_hosts(vec!["node-a:9000".into()], vec![record(1)])
            .split_with_hosts(vec!["node-b:9000".into()], vec![record(2), record(3)])
            .build();
        let backend = BatchBackend::new(format);
        let job = JobId::with_stamp("20260101120000", 1);

        let partitions = backend
            .plan(&job, &ExtractorConfig::default())
            .await
            .unwrap();

        assert_eq!(partitions.len(), 2);
        for (i, partition) in partitions.iter().enumerate() {
            assert_eq!(partition.index, i);
            assert!(matches!(partition.bounds, PartitionBounds::NativeSplit(_)));
        }
        assert_eq!(partitions[0].replicas(), ["node-a:9000"]);
        assert_eq!(partitions[1].replicas(), ["node-b:9000"]);
    }

    #[tokio::test]
    async fn split_failure_is_fatal_to_planning() {
        let backend = BatchBackend::new(MemoryFormat::builder().fail_compute().build());
        let job = JobId::with_stamp("20260101120000", 1);

        let err = backend
            .plan(&job, &ExtractorConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PlanningError::SplitComputation(_)));
    }

    #[tokio::test]
    async fn reader_drains_split_records_then_reports_end() {
        let format = MemoryFormat::builder()
            .split(vec![record(1), record(2)])
            .build();
        let backend = BatchBackend::new(format);
        let config = ExtractorConfig::default();
        let job = JobId::with_stamp("20260101120000", 1);

        let partitions = backend.plan(&job, &config).await.unwrap();
        let mut reader = backend.open_cursor(&partitions[0], &config).await.unwrap();

        assert_eq!(reader.advance().await.unwrap(), Some(record(1)));
        assert_eq!(reader.advance().await.unwrap(), Some(record(2)));
        assert_eq!(reader.advance().await.unwrap(), None);
        assert_eq!(reader.advance().await.unwrap(), None);
        reader.close().await.unwrap();
    }

    #[tokio::test]
    async fn writer_stores_puts_until_closed() {
        let format = MemoryFormat::builder().build();
        let backend = BatchBackend::new(format.clone());

        let mut writer = backend
            .open_sink(&ExtractorConfig::default())
            .await
            .unwrap();
        writer.put(record(7)).await.unwrap();
        writer.close().await.unwrap();
        writer.close().await.unwrap();

        assert_eq!(format.written(), vec![record(7)]);
        assert!(format.writes_closed());
        assert!(matches!(
            writer.put(record(8)).await,
            Err(ExtractionError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn cursor_open_rejects_key_range_descriptors() {
        let backend = BatchBackend::new(MemoryFormat::builder().build());
        let descriptor = model::partition::PartitionDescriptor::new(
            JobId::with_stamp("20260101120000", 1),
            0,
            PartitionBounds::KeyRange(model::partition::TokenRange::unbounded()),
        );

        let err = backend
            .open_cursor(&descriptor, &ExtractorConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidDescriptor(_)));
    }
}
