use model::error::TransformError;
use thiserror::Error;

/// Fatal planning failure. The job cannot start; no partial partition
/// list is ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// Low-level I/O failure while probing the store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The relational driver failed during planning.
    #[error("SQL error: {0}")]
    Sql(#[from] tokio_postgres::Error),

    /// The document-store driver failed during planning.
    #[error("Document store error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// A batch format could not compute its splits.
    #[error("Impossible to calculate partitions: {0}")]
    SplitComputation(String),

    /// Encoding a native split into an opaque handle failed.
    #[error("Split codec error: {0}")]
    SplitCodec(#[from] bincode::Error),

    /// Every deployment was probed and none produced split points.
    #[error("No shard produced split points for '{0}'")]
    NoSplitPoints(String),

    /// Chunks disagree about the collection's shard key.
    #[error("Shard key mismatch: first chunk uses '{expected}', later chunk uses '{found}'")]
    ShardKeyMismatch { expected: String, found: String },

    /// A topology document was missing a field planning relies on.
    #[error("Malformed topology document: {0}")]
    MalformedTopology(String),

    /// The configuration cannot produce a valid plan.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Fatal failure of one partition's extraction. The partition's work is
/// lost; other partitions are unaffected.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Low-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The relational driver failed mid-stream.
    #[error("SQL error: {0}")]
    Sql(#[from] tokio_postgres::Error),

    /// The document-store driver failed mid-stream.
    #[error("Document store error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// A split handle could not be decoded by its format.
    #[error("Split codec error: {0}")]
    SplitCodec(#[from] bincode::Error),

    /// The descriptor handed to a cursor does not fit the backend.
    #[error("Invalid partition descriptor: {0}")]
    InvalidDescriptor(String),

    /// The configuration or schema cannot drive this backend.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record translation failed inside a backend.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Writing a record failed at the application level.
    #[error("Write error: {0}")]
    Write(String),

    /// A cursor or sink was driven outside its lifecycle.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// Releasing a resource failed.
    #[error("Close error: {0}")]
    Close(String),
}
