//! Tantivy-backed search engine

use crate::error::Result;
use crate::models::Message;
use crate::search::config::SearchConfig;
use crate::search::document::{
    build_message_schema, to_tantivy_doc, MessageFields, CHANNEL_FACET, TS,
};
use crate::search::engine::{Bucket, EngineHit, EngineResponse, IndexOperation, SearchEngine};
use crate::search::error::{SearchError, SearchResult};
use crate::search::highlight::Highlighter;
use crate::search::query::{MessageQuery, SortOrder, TimeRange};
use async_trait::async_trait;
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;
use tantivy::collector::{Count, FacetCollector, TopDocs};
use tantivy::query::{
    AllQuery, BooleanQuery, ConstScoreQuery, EmptyQuery, Occur, Query, QueryParser, RangeQuery,
    TermQuery,
};
use tantivy::schema::{Facet, IndexRecordOption, Value};
use tantivy::{DocAddress, Index, IndexReader, IndexWriter, Order, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

/// Manages the Tantivy message index
pub struct IndexManager {
    /// The Tantivy index
    index: Index,

    fields: MessageFields,

    /// Index writer (wrapped in RwLock for thread-safety)
    writer: Arc<RwLock<IndexWriter>>,

    /// Index reader, reloaded after every commit
    reader: IndexReader,
}

impl IndexManager {
    /// Open the index under `config.index_path`, creating it if needed
    pub fn open(config: &SearchConfig) -> SearchResult<Self> {
        std::fs::create_dir_all(&config.index_path).map_err(|e| {
            SearchError::IndexInitFailed(format!("Failed to create index directory: {}", e))
        })?;

        let index = if Self::index_exists(&config.index_path) {
            Index::open_in_dir(&config.index_path).map_err(|e| {
                SearchError::IndexInitFailed(format!("Failed to open existing index: {}", e))
            })?
        } else {
            Index::create_in_dir(&config.index_path, build_message_schema()).map_err(|e| {
                SearchError::IndexInitFailed(format!("Failed to create new index: {}", e))
            })?
        };

        tracing::info!(path = ?config.index_path, "Opened search index");
        Self::from_index(index, config.writer_heap_size)
    }

    /// Index held entirely in memory
    pub fn in_memory(config: &SearchConfig) -> SearchResult<Self> {
        Self::from_index(Index::create_in_ram(build_message_schema()), config.writer_heap_size)
    }

    fn from_index(index: Index, writer_heap_size: usize) -> SearchResult<Self> {
        let fields = MessageFields::from_schema(&index.schema())?;

        // Single indexing thread; bulk batches are small
        let writer: IndexWriter = index
            .writer_with_num_threads(1, writer_heap_size)
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create writer: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create reader: {}", e)))?;

        Ok(Self {
            index,
            fields,
            writer: Arc::new(RwLock::new(writer)),
            reader,
        })
    }

    /// Check if an index exists at the given path
    fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }

    /// Replace documents by id and commit. A failed batch is rolled back so
    /// none of its operations reach a later commit.
    async fn index_documents(&self, operations: &[IndexOperation]) -> SearchResult<Vec<String>> {
        let mut writer = self.writer.write().await;

        let indexed = match self.stage_and_commit(&mut writer, operations) {
            Ok(indexed) => indexed,
            Err(e) => {
                Self::discard_staged(&mut writer);
                return Err(e);
            }
        };

        self.reader
            .reload()
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to reload reader: {}", e)))?;

        Ok(indexed)
    }

    fn discard_staged(writer: &mut IndexWriter) {
        if let Err(e) = writer.rollback() {
            tracing::error!(error = %e, "Failed to roll back index writer");
        }
    }

    fn stage_and_commit(
        &self,
        writer: &mut IndexWriter,
        operations: &[IndexOperation],
    ) -> SearchResult<Vec<String>> {
        let mut indexed = Vec::with_capacity(operations.len());

        for operation in operations {
            let doc = match to_tantivy_doc(&operation.id, &operation.message, &self.fields) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(message_id = %operation.id, error = %e, "Skipping document");
                    continue;
                }
            };

            // Delete existing document with same ID first
            writer.delete_term(Term::from_field_text(self.fields.id, &operation.id));

            writer.add_document(doc).map_err(|e| {
                SearchError::IndexingFailed(format!("Failed to add document {}: {}", operation.id, e))
            })?;

            indexed.push(operation.id.clone());
        }

        writer
            .commit()
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to commit batch: {}", e)))?;

        Ok(indexed)
    }

    fn term(&self, field: tantivy::schema::Field, text: &str) -> Box<dyn Query> {
        Box::new(TermQuery::new(
            Term::from_field_text(field, text),
            IndexRecordOption::Basic,
        ))
    }

    fn ts_range(range: &TimeRange) -> Box<dyn Query> {
        Box::new(RangeQuery::new_f64_bounds(
            TS.to_string(),
            Bound::Included(range.gte),
            Bound::Excluded(range.lt),
        ))
    }

    /// Scoring clauses plus the non-scoring filter; aggregations run on this
    fn compile_main(&self, query: &MessageQuery) -> SearchResult<Box<dyn Query>> {
        let mut must: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, Box::new(AllQuery) as Box<dyn Query>)];

        if let Some(text) = &query.text {
            let mut parser = QueryParser::for_index(
                &self.index,
                vec![self.fields.text, self.fields.attachments_text],
            );
            parser.set_conjunction_by_default();
            must.push((Occur::Must, parser.parse_query(text)?));
        }

        if let Some(range) = &query.text_range {
            must.push((Occur::Must, Self::ts_range(range)));
        }

        let filter = &query.filter;
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![
            (Occur::Must, self.term(self.fields.team, &filter.team)),
            (Occur::Must, Self::ts_range(&filter.window)),
        ];

        if let Some(thread_ts) = filter.thread_ts {
            clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(
                    Term::from_field_f64(self.fields.thread_ts, thread_ts),
                    IndexRecordOption::Basic,
                )),
            ));
        }

        for subtype in &filter.excluded_subtypes {
            clauses.push((Occur::MustNot, self.term(self.fields.subtype, subtype)));
        }

        if filter.exclude_hidden {
            clauses.push((
                Occur::MustNot,
                Box::new(TermQuery::new(
                    Term::from_field_bool(self.fields.hidden, true),
                    IndexRecordOption::Basic,
                )),
            ));
        }

        let filter_query = ConstScoreQuery::new(Box::new(BooleanQuery::new(clauses)), 0.0);
        must.push((Occur::Must, Box::new(filter_query)));

        Ok(Box::new(BooleanQuery::new(must)))
    }

    /// Channel restriction applied after aggregation
    fn compile_post_filter(&self, channels: &[String]) -> Box<dyn Query> {
        if channels.is_empty() {
            return Box::new(EmptyQuery);
        }

        let should = channels
            .iter()
            .map(|channel| (Occur::Should, self.term(self.fields.channel, channel)))
            .collect();

        Box::new(ConstScoreQuery::new(Box::new(BooleanQuery::new(should)), 0.0))
    }

    fn execute(&self, query: &MessageQuery) -> SearchResult<EngineResponse> {
        let scoped = BooleanQuery::new(vec![
            (Occur::Must, self.compile_main(query)?),
            (Occur::Must, self.compile_post_filter(&query.post_filter_channels)),
        ]);

        let searcher = self.reader.searcher();

        let total = searcher
            .search(&scoped, &Count)
            .map_err(|e| SearchError::SearchFailed(format!("Count failed: {}", e)))?
            as u64;

        // TopDocs rejects a zero limit; pages past the end are empty
        let addresses: Vec<DocAddress> = if query.size == 0 || query.offset as u64 >= total {
            Vec::new()
        } else {
            let order = match query.sort {
                SortOrder::Asc => Order::Asc,
                SortOrder::Desc => Order::Desc,
            };
            let collector = TopDocs::with_limit(query.size)
                .and_offset(query.offset)
                .order_by_fast_field::<f64>(TS, order);

            searcher
                .search(&scoped, &collector)
                .map_err(|e| SearchError::SearchFailed(format!("Search execution failed: {}", e)))?
                .into_iter()
                .map(|(_, address)| address)
                .collect()
        };

        let mut highlighter = match &query.text {
            Some(text) => {
                let analyzer = self.index.tokenizer_for_field(self.fields.text).map_err(|e| {
                    SearchError::SearchFailed(format!("Failed to load tokenizer: {}", e))
                })?;
                Highlighter::new(analyzer, text, query.highlight.clone())
            }
            None => None,
        };

        let mut hits = Vec::with_capacity(addresses.len());
        for address in addresses {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| SearchError::SearchFailed(format!("Failed to retrieve doc: {}", e)))?;

            let id = doc
                .get_first(self.fields.id)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let source = doc
                .get_first(self.fields.source)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            let highlight = match highlighter.as_mut() {
                Some(highlighter) => serde_json::from_str::<Message>(&source)
                    .map(|message| highlighter.highlight_message(&message))
                    .unwrap_or_default(),
                None => Default::default(),
            };

            hits.push(EngineHit {
                id,
                source,
                highlight,
            });
        }

        let aggregations = match query.channel_aggregation {
            Some(size) => Some(self.channel_buckets(&*self.compile_main(query)?, size)?),
            None => None,
        };

        Ok(EngineResponse {
            total,
            hits,
            aggregations,
        })
    }

    /// Document counts per channel, count descending
    fn channel_buckets(&self, query: &dyn Query, size: usize) -> SearchResult<Vec<Bucket>> {
        let searcher = self.reader.searcher();

        let mut facet_collector = FacetCollector::for_field(CHANNEL_FACET);
        facet_collector.add_facet(Facet::root());

        let facet_counts = searcher
            .search(query, &facet_collector)
            .map_err(|e| SearchError::SearchFailed(format!("Facet aggregation failed: {}", e)))?;

        Ok(facet_counts
            .top_k(Facet::root(), size)
            .into_iter()
            .filter_map(|(facet, count)| {
                facet.to_path().last().map(|channel| Bucket {
                    key: channel.to_string(),
                    doc_count: count,
                })
            })
            .collect())
    }

    /// Number of searchable documents
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}

#[async_trait]
impl SearchEngine for IndexManager {
    async fn bulk_index(&self, operations: Vec<IndexOperation>) -> Result<Vec<String>> {
        Ok(self.index_documents(&operations).await?)
    }

    async fn search(&self, query: &MessageQuery) -> Result<EngineResponse> {
        Ok(self.execute(query)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::query::{QueryBuilder, SearchParams};
    use tempfile::TempDir;

    fn message(ts: &str, text: &str) -> Message {
        Message {
            team: "T1".to_string(),
            channel: "C1".to_string(),
            ts: ts.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    fn query(params: SearchParams) -> MessageQuery {
        let config = SearchConfig::default();
        QueryBuilder::new(&config).build(&params, "T1", vec!["C1".to_string()], 1_000.0)
    }

    #[tokio::test]
    async fn test_index_creation() {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let manager = IndexManager::open(&config).unwrap();
        assert_eq!(manager.num_docs(), 0);
    }

    #[tokio::test]
    async fn test_reindexing_replaces_by_id() {
        let manager = IndexManager::in_memory(&SearchConfig::default()).unwrap();
        let first = message("10", "first");
        let second = message("10", "second");

        manager
            .bulk_index(vec![IndexOperation::new(first.archive_id(), first)])
            .await
            .unwrap();
        let indexed = manager
            .bulk_index(vec![IndexOperation::new(second.archive_id(), second)])
            .await
            .unwrap();

        assert_eq!(indexed, vec!["T1-C1-10"]);
        assert_eq!(manager.num_docs(), 1);
    }

    #[tokio::test]
    async fn test_zero_size_still_counts() {
        let manager = IndexManager::in_memory(&SearchConfig::default()).unwrap();
        let m = message("10", "hello");
        manager
            .bulk_index(vec![IndexOperation::new(m.archive_id(), m)])
            .await
            .unwrap();

        let response = manager
            .search(&query(SearchParams {
                size: Some("0".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(response.total, 1);
        assert!(response.hits.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_query_is_engine_error() {
        let manager = IndexManager::in_memory(&SearchConfig::default()).unwrap();
        let result = manager
            .search(&query(SearchParams {
                q: Some("nosuchfield:deploy".to_string()),
                ..Default::default()
            }))
            .await;

        assert!(matches!(
            result,
            Err(crate::error::AppError::EngineQuery { .. })
        ));
    }

    #[tokio::test]
    async fn test_discarded_batch_is_not_committed_later() {
        let manager = IndexManager::in_memory(&SearchConfig::default()).unwrap();
        let abandoned = message("10", "abandoned");
        let kept = message("20", "kept");

        {
            let mut writer = manager.writer.write().await;
            let doc = to_tantivy_doc(&abandoned.archive_id(), &abandoned, &manager.fields).unwrap();
            writer.add_document(doc).unwrap();
            IndexManager::discard_staged(&mut writer);
        }

        manager
            .bulk_index(vec![IndexOperation::new(kept.archive_id(), kept)])
            .await
            .unwrap();

        assert_eq!(manager.num_docs(), 1);
        let response = manager.search(&query(SearchParams::default())).await.unwrap();
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].id, "T1-C1-20");
    }

    #[tokio::test]
    async fn test_offset_past_end_is_empty() {
        let manager = IndexManager::in_memory(&SearchConfig::default()).unwrap();
        let m = message("10", "hello");
        manager
            .bulk_index(vec![IndexOperation::new(m.archive_id(), m)])
            .await
            .unwrap();

        let mut past_end = query(SearchParams::default());
        past_end.offset = usize::MAX;
        let response = manager.search(&past_end).await.unwrap();

        assert_eq!(response.total, 1);
        assert!(response.hits.is_empty());
    }
}
