use crate::{
    core::{data_type::DataType, value::Value},
    error::TransformError,
    records::row::Record,
};
use serde::{Deserialize, Serialize};

/// One declared field of a record type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub data_type: DataType,
    /// Part of the upsert identity for sinks and the partition key for
    /// range-scanning cursors.
    pub key: bool,
}

/// Explicit, ordered description of a record type. Backends derive their
/// projections, key columns and upsert filters from this instead of
/// inspecting records at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordSchema {
    pub entity: String,
    pub fields: Vec<FieldDef>,
}

impl RecordSchema {
    pub fn builder(entity: &str) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            entity: entity.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn key_fields(&self) -> Vec<&FieldDef> {
        self.fields.iter().filter(|f| f.key).collect()
    }

    /// Ordered column names, the projection cursors push down.
    pub fn projection(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Checks that a record carries every declared field with a value of
    /// the declared kind. `Null` satisfies any declared type.
    pub fn validate(&self, record: &Record) -> Result<(), TransformError> {
        for def in &self.fields {
            let field = record
                .get(&def.name)
                .ok_or_else(|| TransformError::MissingField(def.name.clone()))?;
            let found = field.value.data_type();
            if found != DataType::Null && found != def.data_type {
                return Err(TransformError::TypeMismatch {
                    field: def.name.clone(),
                    expected: def.data_type,
                    found,
                });
            }
        }
        Ok(())
    }

    /// The key value a record carries for a single-key schema.
    pub fn key_value(&self, record: &Record) -> Option<Value> {
        let key = self.key_fields().first().map(|f| f.name.clone())?;
        match record.get_value(&key) {
            Value::Null => None,
            value => Some(value),
        }
    }
}

pub struct RecordSchemaBuilder {
    entity: String,
    fields: Vec<FieldDef>,
}

impl RecordSchemaBuilder {
    pub fn field(mut self, name: &str, data_type: DataType) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            data_type,
            key: false,
        });
        self
    }

    pub fn key_field(mut self, name: &str, data_type: DataType) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            data_type,
            key: true,
        });
        self
    }

    pub fn build(self) -> RecordSchema {
        RecordSchema {
            entity: self.entity,
            fields: self.fields,
        }
    }
}
