use crate::error::AppError;

/// Errors raised at the pipeline boundary
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// Malformed envelope or message body
    #[error("Decode error: {0}")]
    Decode(String),

    /// Submission after shutdown
    #[error("Indexing pipeline is closed")]
    Closed,
}

impl From<IndexerError> for AppError {
    fn from(err: IndexerError) -> Self {
        match err {
            IndexerError::Decode(msg) => AppError::Decode(msg),
            IndexerError::Closed => AppError::PipelineClosed,
        }
    }
}
