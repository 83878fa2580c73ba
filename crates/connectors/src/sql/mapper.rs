use crate::{base::mapper::RecordMapper, sql::row::SqlTuple};
use model::{
    error::TransformError,
    records::{
        row::{FieldValue, Record},
        schema::RecordSchema,
    },
};

/// Maps between wire tuples and records. Decoding carries whatever
/// columns the query produced; encoding is strict about the schema since
/// the upsert statement binds every declared column.
pub struct SqlMapper {
    schema: RecordSchema,
}

impl SqlMapper {
    pub fn new(schema: RecordSchema) -> Self {
        SqlMapper { schema }
    }
}

impl RecordMapper for SqlMapper {
    type Native = SqlTuple;

    fn decode(&self, native: SqlTuple) -> Result<Record, TransformError> {
        let fields = native
            .columns
            .into_iter()
            .map(|(name, value)| FieldValue { name, value })
            .collect();
        Ok(Record::new(&self.schema.entity, fields))
    }

    fn encode(&self, record: &Record) -> Result<SqlTuple, TransformError> {
        self.schema.validate(record)?;
        let columns = self
            .schema
            .fields
            .iter()
            .map(|def| (def.name.clone(), record.get_value(&def.name)))
            .collect();
        Ok(SqlTuple::new(columns))
    }
}
