use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// One named field of a record. Nullability is carried by `Value::Null`
/// rather than an `Option`, so every field a schema names is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

impl FieldValue {
    pub fn new(name: &str, value: Value) -> Self {
        FieldValue {
            name: name.to_string(),
            value,
        }
    }
}

/// The generic named-field tuple handed to and received from the host
/// engine. Backends never see `Record` directly; mappers translate it to
/// their native representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub entity: String,
    pub fields: Vec<FieldValue>,
}

impl Record {
    pub fn new(entity: &str, fields: Vec<FieldValue>) -> Self {
        Record {
            entity: entity.to_string(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }
}
