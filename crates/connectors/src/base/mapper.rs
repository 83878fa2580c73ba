use model::{error::TransformError, records::row::Record};

/// Translates between a backend's native record type and the generic
/// `Record` the host engine consumes. Pure; no I/O.
pub trait RecordMapper: Send + Sync {
    type Native;

    fn decode(&self, native: Self::Native) -> Result<Record, TransformError>;

    fn encode(&self, record: &Record) -> Result<Self::Native, TransformError>;
}
