use crate::{base::mapper::RecordMapper, mongo::codec};
use bson::Document;
use model::{error::TransformError, records::row::Record, records::schema::RecordSchema};

/// Maps between documents and records. Decoding carries whatever fields
/// the document holds; encoding validates against the schema first so a
/// malformed record never reaches the sink.
pub struct MongoMapper {
    schema: RecordSchema,
}

impl MongoMapper {
    pub fn new(schema: RecordSchema) -> Self {
        MongoMapper { schema }
    }
}

impl RecordMapper for MongoMapper {
    type Native = Document;

    fn decode(&self, native: Document) -> Result<Record, TransformError> {
        codec::document_to_record(&self.schema.entity, native)
    }

    fn encode(&self, record: &Record) -> Result<Document, TransformError> {
        self.schema.validate(record)?;
        Ok(codec::record_to_document(record))
    }
}
