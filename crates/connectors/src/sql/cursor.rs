use crate::{
    base::cursor::RecordCursor,
    error::ExtractionError,
    sql::{
        params::PgParamStore,
        query,
        row::{self, SqlTuple},
        utils,
    },
};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use model::{config::ExtractorConfig, partition::PartitionDescriptor};
use std::pin::Pin;
use tokio_postgres::{Client, RowStream};
use tracing::debug;

/// Streaming scan over one planned key range. One connection, one
/// portal; rows are pulled from the wire a record at a time.
pub struct SqlCursor {
    client: Option<Client>,
    stream: Option<Pin<Box<RowStream>>>,
    rows_read: u64,
}

impl SqlCursor {
    pub(crate) async fn open(
        key: &str,
        descriptor: &PartitionDescriptor,
        config: &ExtractorConfig,
    ) -> Result<Self, ExtractionError> {
        let range = descriptor.key_range().ok_or_else(|| {
            ExtractionError::InvalidDescriptor(
                "relational cursors require a key range, got a native split".into(),
            )
        })?;

        let (sql, params) = query::select_range(
            &config.table,
            &config.input_columns,
            key,
            range.start.as_ref(),
            range.end.as_ref(),
            &config.filters,
        );
        debug!(partition = descriptor.index, %sql, "opening range scan");

        let client = utils::connect(config).await?;
        let store = PgParamStore::from_values(params);
        let stream = client.query_raw(sql.as_str(), store.as_refs()).await?;

        Ok(SqlCursor {
            client: Some(client),
            stream: Some(Box::pin(stream)),
            rows_read: 0,
        })
    }
}

#[async_trait]
impl RecordCursor for SqlCursor {
    type Native = SqlTuple;

    async fn advance(&mut self) -> Result<Option<SqlTuple>, ExtractionError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        match stream.as_mut().try_next().await? {
            Some(wire_row) => {
                self.rows_read += 1;
                Ok(Some(row::decode_row(&wire_row)))
            }
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        if self.client.is_none() && self.stream.is_none() {
            return Ok(());
        }
        debug!(rows_read = self.rows_read, "closing range scan");
        // dropping the stream releases the portal, dropping the client
        // ends the connection task
        self.stream = None;
        self.client = None;
        Ok(())
    }
}
