use crate::core::data_type::DataType;
use thiserror::Error;

/// Failure to translate between a backend-native record and `Record`.
/// Raised by mappers and by schema validation at sink-open time.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("record is missing declared field '{0}'")]
    MissingField(String),

    #[error("field '{field}' has type {found}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: DataType,
        found: DataType,
    },

    #[error("unsupported value: {0}")]
    Unsupported(String),
}
