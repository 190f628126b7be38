//! Full-text message search powered by Tantivy
//!
//! - **Query building**: request parameters become a tenant-scoped,
//!   engine-neutral [`MessageQuery`]
//! - **Engine**: the [`SearchEngine`] contract and its Tantivy implementation,
//!   [`IndexManager`]
//! - **Result assembly**: hits are decoded, highlighted and enriched with the
//!   users they reference
//!
//! ```text
//! SearchParams ──► QueryBuilder ──► MessageQuery ──► SearchEngine
//!                                                      │
//!   SearchResults ◄── assemble + related users ◄───────┘
//! ```

mod config;
mod document;
mod engine;
mod error;
mod highlight;
mod index;
mod query;
mod service;
mod tenant;

pub use config::SearchConfig;
pub use engine::{Bucket, EngineHit, EngineResponse, IndexOperation, SearchEngine};
pub use error::{SearchError, SearchResult};
pub use highlight::Highlighter;
pub use index::IndexManager;
pub use query::{
    FilterClause, HighlightSpec, MessageQuery, QueryBuilder, SearchParams, SortOrder, TimeRange,
};
pub use service::{assemble_message, Aggregations, Related, SearchResults, SearchService};
pub use tenant::{request_host, resolve_channels, resolve_team};
