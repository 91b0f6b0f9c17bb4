use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to content store: {0}")]
    Connect(String),

    #[error("content query failed: {0}")]
    Query(String),

    #[error("content insert failed: {0}")]
    Insert(String),

    #[error("content already exists for place: {place}")]
    DuplicatePlace { place: String },

    #[error("index creation failed: {0}")]
    Index(String),

    #[error("invalid stored timestamp: {0}")]
    Timestamp(String),
}
