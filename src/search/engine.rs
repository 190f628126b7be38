//! Search engine adapter contract

use crate::error::Result;
use crate::models::Message;
use crate::search::query::MessageQuery;
use async_trait::async_trait;
use std::collections::HashMap;

/// One pending index write
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOperation {
    pub id: String,
    pub message: Message,
}

impl IndexOperation {
    pub fn new(id: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            message,
        }
    }
}

/// A single hit as returned by the engine
#[derive(Debug, Clone)]
pub struct EngineHit {
    pub id: String,

    /// Stored document, undecoded
    pub source: String,

    /// Highlighted fragments keyed by field name
    pub highlight: HashMap<String, Vec<String>>,
}

/// Term-count bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub key: String,
    pub doc_count: u64,
}

/// Raw engine response
#[derive(Debug, Clone, Default)]
pub struct EngineResponse {
    /// Total matching documents, before pagination
    pub total: u64,
    pub hits: Vec<EngineHit>,
    /// Channel buckets sorted by count descending, when requested
    pub aggregations: Option<Vec<Bucket>>,
}

/// Full-text engine holding the searchable copy of the archive
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Index or replace every operation's document in one call and return
    /// the ids that were indexed
    async fn bulk_index(&self, operations: Vec<IndexOperation>) -> Result<Vec<String>>;

    /// Run a structured query
    async fn search(&self, query: &MessageQuery) -> Result<EngineResponse>;
}
