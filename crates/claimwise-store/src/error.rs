use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("clause index not found; run ingest first")]
    IndexMissing,

    #[error("no clause batches to index")]
    EmptyRebuild,

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "lancedb")]
    #[error("lancedb error: {0}")]
    Lance(#[from] lancedb::Error),

    #[error("{0}")]
    Other(String),
}
