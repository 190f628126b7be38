use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Durable store read errors
    #[error("Database error: {0}")]
    Database(String),

    /// Durable store write errors
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// Malformed envelope or stored document
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Requesting host resolves to no enabled team
    #[error("Team is disabled or does not exist: {0}")]
    TeamUnresolved(String),

    /// Search engine rejected a bulk write
    #[error("Bulk indexing failed: {0}")]
    EngineBulk(String),

    /// Search engine rejected a query; passed through untranslated
    #[error("Search failed ({kind}): {reason}")]
    EngineQuery { kind: String, reason: String },

    /// Submission after the indexing pipeline was shut down
    #[error("Indexing pipeline is closed")]
    PipelineClosed,

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::TeamUnresolved(_) => StatusCode::NOT_FOUND,
            AppError::Decode(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::FORBIDDEN,
            AppError::EngineQuery { .. } => StatusCode::BAD_GATEWAY,
            AppError::EngineBulk(_) => StatusCode::BAD_GATEWAY,
            AppError::PipelineClosed => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StoreWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::TeamUnresolved(_) => "TEAM_UNRESOLVED",
            AppError::Decode(_) => "DECODE_ERROR",
            AppError::Authentication(_) => "AUTHENTICATION_ERROR",
            AppError::EngineQuery { .. } => "ENGINE_QUERY_ERROR",
            AppError::EngineBulk(_) => "ENGINE_BULK_ERROR",
            AppError::PipelineClosed => "PIPELINE_CLOSED",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::StoreWrite(_) => "STORE_WRITE_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        tracing::error!(
            error_code = error_code,
            status_code = status.as_u16(),
            message = %message,
            "Request error"
        );

        let mut error = json!({
            "code": error_code,
            "message": message,
            "status": status.as_u16(),
        });

        // Engine failures keep the engine's own type and reason
        if let AppError::EngineQuery { kind, reason } = &self {
            error["type"] = json!(kind);
            error["reason"] = json!(reason);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
