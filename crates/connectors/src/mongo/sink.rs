use crate::{base::sink::RecordSink, error::ExtractionError, mongo::utils};
use async_trait::async_trait;
use bson::{Document, doc};
use model::config::ExtractorConfig;
use mongodb::{
    Client, Collection,
    options::{CollectionOptions, ReplaceOptions},
};
use tracing::debug;

/// Document writer keyed on one field. Documents carrying the key are
/// upserted in place, the rest are plain inserts. The configured
/// acknowledgement level rides on the collection handle.
pub struct MongoSink {
    client: Option<Client>,
    collection: Option<Collection<Document>>,
    key: String,
    documents_written: u64,
}

impl MongoSink {
    pub(crate) async fn open(key: &str, config: &ExtractorConfig) -> Result<Self, ExtractionError> {
        if config.hosts.is_empty() {
            return Err(ExtractionError::InvalidConfig("no hosts configured".into()));
        }
        debug!(table = %config.table, ack = ?config.write_ack, "opening document sink");

        let client = utils::connect(&config.hosts, config).await?;
        let options = CollectionOptions::builder()
            .write_concern(utils::write_concern(&config.write_ack))
            .build();
        let collection = client
            .database(&config.catalog)
            .collection_with_options::<Document>(&config.table, options);

        Ok(MongoSink {
            client: Some(client),
            collection: Some(collection),
            key: key.to_string(),
            documents_written: 0,
        })
    }
}

#[async_trait]
impl RecordSink for MongoSink {
    type Native = Document;

    async fn put(&mut self, document: Document) -> Result<(), ExtractionError> {
        let Some(collection) = self.collection.as_ref() else {
            return Err(ExtractionError::Protocol("put after close".into()));
        };
        match document.get(&self.key) {
            Some(id) => {
                let filter = doc! { &self.key: id.clone() };
                let options = ReplaceOptions::builder().upsert(true).build();
                collection.replace_one(filter, document, options).await?;
            }
            None => {
                collection.insert_one(document, None).await?;
            }
        }
        self.documents_written += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        if self.client.is_none() && self.collection.is_none() {
            return Ok(());
        }
        debug!(
            documents_written = self.documents_written,
            "closing document sink"
        );
        self.collection = None;
        if let Some(client) = self.client.take() {
            client.shutdown().await;
        }
        Ok(())
    }
}
