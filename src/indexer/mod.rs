//! Ingestion: inbound envelopes are stored and batched into the search index

mod config;
mod envelope;
mod error;
mod pipeline;
mod reindex;

pub use config::IndexerConfig;
pub use envelope::{Envelope, MESSAGE_CATEGORY};
pub use error::IndexerError;
pub use pipeline::{IndexingPipeline, PipelineStats};
pub use reindex::{reindex_all, ReindexSummary};
