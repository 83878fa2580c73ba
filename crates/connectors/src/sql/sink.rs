use crate::{
    base::sink::RecordSink,
    error::ExtractionError,
    sql::{params::PgParamStore, query, row::SqlTuple, utils},
};
use async_trait::async_trait;
use model::{config::ExtractorConfig, core::value::Value, records::schema::RecordSchema};
use tokio_postgres::{Client, Statement};
use tracing::debug;

/// Single-connection upsert writer. The statement is prepared once from
/// the schema; every `put` binds one tuple in schema column order.
pub struct SqlSink {
    client: Option<Client>,
    statement: Option<Statement>,
    columns: Vec<String>,
    rows_written: u64,
}

impl SqlSink {
    pub(crate) async fn open(
        schema: &RecordSchema,
        config: &ExtractorConfig,
    ) -> Result<Self, ExtractionError> {
        let columns = schema.projection();
        if columns.is_empty() {
            return Err(ExtractionError::InvalidConfig(
                "schema declares no columns to write".into(),
            ));
        }
        let keys: Vec<String> = schema.key_fields().iter().map(|f| f.name.clone()).collect();
        let sql = query::upsert(&config.table, &columns, &keys);
        debug!(table = %config.table, %sql, "opening upsert sink");

        let client = utils::connect(config).await?;
        let statement = client.prepare(&sql).await?;
        Ok(SqlSink {
            client: Some(client),
            statement: Some(statement),
            columns,
            rows_written: 0,
        })
    }
}

#[async_trait]
impl RecordSink for SqlSink {
    type Native = SqlTuple;

    async fn put(&mut self, record: SqlTuple) -> Result<(), ExtractionError> {
        let (Some(client), Some(statement)) = (self.client.as_ref(), self.statement.as_ref())
        else {
            return Err(ExtractionError::Protocol("put after close".into()));
        };
        let values: Vec<Value> = self
            .columns
            .iter()
            .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
            .collect();
        let store = PgParamStore::from_values(values);
        client.execute(statement, &store.as_refs()).await?;
        self.rows_written += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        if self.client.is_none() {
            return Ok(());
        }
        debug!(rows_written = self.rows_written, "closing upsert sink");
        self.statement = None;
        self.client = None;
        Ok(())
    }
}
