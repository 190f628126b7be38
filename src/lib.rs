//! Chat archive: ingests chat workspace messages streamed by an archiving bot,
//! keeps them in a durable store and serves scoped, highlighted full-text
//! search over them.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod indexer;
pub mod models;
pub mod search;
pub mod state;
pub mod websocket;

pub use config::Config;
pub use context::AppContext;
pub use error::{AppError, Result};
