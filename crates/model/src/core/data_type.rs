use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire-facing type tag for a field, shared by every backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Int,
    Float,
    String,
    Bytes,
    Timestamp,
    Uuid,
    ObjectId,
    Json,
    Null,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "boolean",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::String => "string",
            DataType::Bytes => "bytes",
            DataType::Timestamp => "timestamp",
            DataType::Uuid => "uuid",
            DataType::ObjectId => "object_id",
            DataType::Json => "json",
            DataType::Null => "null",
        };
        write!(f, "{name}")
    }
}
