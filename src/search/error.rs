//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Index initialization failed
    #[error("Index initialization failed: {0}")]
    IndexInitFailed(String),

    /// Query parsing failed
    #[error("Query parsing failed: {0}")]
    QueryParsingFailed(String),

    /// Search execution failed
    #[error("Search execution failed: {0}")]
    SearchFailed(String),

    /// Bulk indexing failed
    #[error("Document indexing failed: {0}")]
    IndexingFailed(String),

    /// Schema error
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    /// Short machine-readable error type
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::IndexInitFailed(_) => "index_init_failed",
            SearchError::QueryParsingFailed(_) => "query_parsing_failed",
            SearchError::SearchFailed(_) => "search_failed",
            SearchError::IndexingFailed(_) => "indexing_failed",
            SearchError::SchemaError(_) => "schema_error",
            SearchError::IoError(_) => "io_error",
        }
    }
}

impl From<tantivy::query::QueryParserError> for SearchError {
    fn from(err: tantivy::query::QueryParserError) -> Self {
        SearchError::QueryParsingFailed(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        let kind = err.kind().to_string();
        match err {
            SearchError::QueryParsingFailed(reason) | SearchError::SearchFailed(reason) => {
                AppError::EngineQuery { kind, reason }
            }
            SearchError::IndexingFailed(msg) => AppError::EngineBulk(msg),
            SearchError::IoError(err) => AppError::Io(err),
            SearchError::IndexInitFailed(msg) | SearchError::SchemaError(msg) => {
                AppError::Internal(msg)
            }
        }
    }
}
