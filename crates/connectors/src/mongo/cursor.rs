use crate::{
    base::cursor::RecordCursor,
    error::ExtractionError,
    mongo::{codec, utils},
};
use async_trait::async_trait;
use bson::{Document, doc};
use futures_util::TryStreamExt;
use model::{
    config::{ExtractorConfig, Filter, FilterOp},
    partition::{PartitionDescriptor, TokenRange},
};
use mongodb::{Client, options::FindOptions};
use std::collections::HashSet;
use tracing::debug;

/// Streaming scan over one planned key range of a collection. Dialed
/// against the range's replica hosts so reads stay local to the shard
/// that owns the chunk.
pub struct MongoCursor {
    client: Option<Client>,
    stream: Option<mongodb::Cursor<Document>>,
    documents_read: u64,
}

impl MongoCursor {
    pub(crate) async fn open(
        key: &str,
        descriptor: &PartitionDescriptor,
        config: &ExtractorConfig,
    ) -> Result<Self, ExtractionError> {
        let range = descriptor.key_range().ok_or_else(|| {
            ExtractionError::InvalidDescriptor(
                "document cursors require a key range, got a native split".into(),
            )
        })?;

        let hosts = if range.replicas.is_empty() {
            config.hosts.clone()
        } else {
            range.replicas.clone()
        };
        let filter = scan_filter(key, range, &config.filters);
        debug!(partition = descriptor.index, ?filter, "opening collection scan");

        let client = utils::connect(&hosts, config).await?;
        let collection = client
            .database(&config.catalog)
            .collection::<Document>(&config.table);
        let options = scan_projection(&config.input_columns)
            .map(|projection| FindOptions::builder().projection(projection).build());
        let stream = collection.find(filter, options).await?;

        Ok(MongoCursor {
            client: Some(client),
            stream: Some(stream),
            documents_read: 0,
        })
    }
}

#[async_trait]
impl RecordCursor for MongoCursor {
    type Native = Document;

    async fn advance(&mut self) -> Result<Option<Document>, ExtractionError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        match stream.try_next().await? {
            Some(document) => {
                self.documents_read += 1;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        if self.client.is_none() && self.stream.is_none() {
            return Ok(());
        }
        debug!(documents_read = self.documents_read, "closing collection scan");
        self.stream = None;
        if let Some(client) = self.client.take() {
            client.shutdown().await;
        }
        Ok(())
    }
}

/// Range bounds under the scan key plus pushed-down filters, merged into
/// one flat document when their fields are distinct. A filter on the
/// scan key itself would overwrite the bounds, so that case becomes an
/// explicit `$and`.
fn scan_filter(key: &str, range: &TokenRange, filters: &[Filter]) -> Document {
    let mut clauses: Vec<Document> = Vec::new();

    let mut bounds = Document::new();
    if let Some(start) = &range.start {
        bounds.insert("$gte", codec::value_to_bson(start));
    }
    if let Some(end) = &range.end {
        bounds.insert("$lt", codec::value_to_bson(end));
    }
    if !bounds.is_empty() {
        clauses.push(doc! { key: bounds });
    }
    for filter in filters {
        let clause = doc! { mongo_op(filter.op): codec::value_to_bson(&filter.value) };
        clauses.push(doc! { &filter.field: clause });
    }

    let mut fields = HashSet::new();
    let collides = clauses
        .iter()
        .filter_map(|clause| clause.keys().next())
        .any(|field| !fields.insert(field.clone()));

    if collides {
        doc! { "$and": clauses }
    } else {
        let mut merged = Document::new();
        for clause in clauses {
            for (field, condition) in clause {
                merged.insert(field, condition);
            }
        }
        merged
    }
}

fn mongo_op(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "$eq",
        FilterOp::Ne => "$ne",
        FilterOp::Lt => "$lt",
        FilterOp::Lte => "$lte",
        FilterOp::Gt => "$gt",
        FilterOp::Gte => "$gte",
    }
}

/// Inclusion projection over the configured columns; empty means the
/// whole document.
fn scan_projection(columns: &[String]) -> Option<Document> {
    if columns.is_empty() {
        return None;
    }
    let mut projection = Document::new();
    for column in columns {
        projection.insert(column, 1);
    }
    Some(projection)
}
