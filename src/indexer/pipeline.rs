//! Batching pipeline from inbound envelopes to the store and the search index

use crate::error::Result;
use crate::indexer::config::IndexerConfig;
use crate::indexer::envelope::Envelope;
use crate::indexer::error::IndexerError;
use crate::models::Message;
use crate::search::{IndexOperation, SearchEngine};
use crate::state::ArchiveStore;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Pipeline counters
#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    discarded: AtomicU64,
    decode_failures: AtomicU64,
    store_failures: AtomicU64,
    flushed_batches: AtomicU64,
    indexed_documents: AtomicU64,
    failed_batches: AtomicU64,
}

impl Counters {
    fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time view of the pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub received: u64,
    pub discarded: u64,
    pub decode_failures: u64,
    pub store_failures: u64,
    pub flushed_batches: u64,
    pub indexed_documents: u64,
    pub failed_batches: u64,
}

/// Single-consumer indexing pipeline.
///
/// Envelopes are processed strictly in submission order by one worker task.
/// Each message is upserted into the store before it joins the pending batch;
/// the batch is bulk-indexed once it reaches `batch_size` or after
/// `flush_interval` without new input.
pub struct IndexingPipeline {
    sender: Mutex<Option<mpsc::UnboundedSender<Envelope>>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl IndexingPipeline {
    /// Start the worker task
    pub fn spawn(
        store: Arc<dyn ArchiveStore>,
        engine: Arc<dyn SearchEngine>,
        config: &IndexerConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());

        let worker = Worker {
            store,
            engine,
            batch_size: config.batch_size.max(1),
            flush_interval: config.flush_interval(),
            batch: Vec::with_capacity(config.batch_size.max(1)),
            counters: counters.clone(),
            started: Instant::now(),
        };

        info!(
            batch_size = worker.batch_size,
            flush_interval_secs = worker.flush_interval.as_secs(),
            "Starting indexing pipeline"
        );

        let handle = tokio::spawn(worker.run(rx));

        Self {
            sender: Mutex::new(Some(tx)),
            worker: tokio::sync::Mutex::new(Some(handle)),
            counters,
        }
    }

    /// Queue an envelope; never blocks
    pub fn submit(&self, envelope: Envelope) -> Result<()> {
        let guard = self.sender.lock();
        guard
            .as_ref()
            .ok_or(IndexerError::Closed)?
            .send(envelope)
            .map_err(|_| IndexerError::Closed)?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Stop accepting input, then wait until every queued envelope is
    /// processed and the final partial batch is flushed. Only the first call
    /// does any work.
    pub async fn shutdown(&self) {
        let sender = self.sender.lock().take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        info!("Draining indexing pipeline");

        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Indexing worker terminated abnormally");
            }
        }

        let stats = self.stats();
        info!(
            received = stats.received,
            indexed = stats.indexed_documents,
            failed_batches = stats.failed_batches,
            "Indexing pipeline stopped"
        );
    }

    pub fn stats(&self) -> PipelineStats {
        let c = &self.counters;
        PipelineStats {
            received: c.received.load(Ordering::Relaxed),
            discarded: c.discarded.load(Ordering::Relaxed),
            decode_failures: c.decode_failures.load(Ordering::Relaxed),
            store_failures: c.store_failures.load(Ordering::Relaxed),
            flushed_batches: c.flushed_batches.load(Ordering::Relaxed),
            indexed_documents: c.indexed_documents.load(Ordering::Relaxed),
            failed_batches: c.failed_batches.load(Ordering::Relaxed),
        }
    }
}

struct Worker {
    store: Arc<dyn ArchiveStore>,
    engine: Arc<dyn SearchEngine>,
    batch_size: usize,
    flush_interval: Duration,
    batch: Vec<IndexOperation>,
    counters: Arc<Counters>,
    started: Instant,
}

impl Worker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Envelope>) {
        loop {
            tokio::select! {
                envelope = rx.recv() => match envelope {
                    Some(envelope) => {
                        self.process(envelope).await;
                        if self.batch.len() < self.batch_size {
                            continue;
                        }
                    }
                    None => break,
                },
                _ = tokio::time::sleep(self.flush_interval) => {
                    if self.batch.is_empty() {
                        continue;
                    }
                    debug!(pending = self.batch.len(), "Flush interval elapsed");
                }
            }

            self.flush().await;
        }

        // Input closed; everything queued has been received
        if !self.batch.is_empty() {
            self.flush().await;
        }
    }

    async fn process(&mut self, envelope: Envelope) {
        Counters::incr(&self.counters.received);

        if !envelope.is_message() {
            Counters::incr(&self.counters.discarded);
            debug!(category = %envelope.category, "Discarding non-message envelope");
            return;
        }

        let message: Message = match serde_json::from_slice(&envelope.body) {
            Ok(message) => message,
            Err(e) => {
                Counters::incr(&self.counters.decode_failures);
                error!(
                    error = %e,
                    body = %String::from_utf8_lossy(&envelope.body),
                    "Failed to decode message"
                );
                return;
            }
        };

        let id = message.archive_id();

        // The index still receives the message when the store write fails
        if let Err(e) = self.store.upsert_message(&id, &message).await {
            Counters::incr(&self.counters.store_failures);
            warn!(message_id = %id, error = %e, "Failed to store message");
        }

        self.batch.push(IndexOperation::new(id, message));
    }

    async fn flush(&mut self) {
        let operations = std::mem::take(&mut self.batch);
        let pending = operations.len();

        match self.engine.bulk_index(operations).await {
            Ok(ids) => {
                Counters::incr(&self.counters.flushed_batches);
                let total = self
                    .counters
                    .indexed_documents
                    .fetch_add(ids.len() as u64, Ordering::Relaxed)
                    + ids.len() as u64;

                let minutes = self.started.elapsed().as_secs_f64() / 60.0;
                let rate = if minutes > 0.0 { total as f64 / minutes } else { 0.0 };

                info!(
                    indexed = ids.len(),
                    total,
                    docs_per_minute = (rate * 10.0).round() / 10.0,
                    "Flushed index batch"
                );
            }
            Err(e) => {
                Counters::incr(&self.counters.failed_batches);
                error!(pending, error = %e, "Bulk index failed; batch dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::search::{EngineResponse, MessageQuery};
    use crate::state::create_in_memory_store;
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingEngine {
        batches: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl SearchEngine for RecordingEngine {
        async fn bulk_index(&self, operations: Vec<IndexOperation>) -> Result<Vec<String>> {
            let ids: Vec<String> = operations.into_iter().map(|op| op.id).collect();
            self.batches.lock().push(ids.clone());
            Ok(ids)
        }

        async fn search(&self, _query: &MessageQuery) -> Result<EngineResponse> {
            Ok(EngineResponse::default())
        }
    }

    fn body(ts: u32) -> Vec<u8> {
        format!(r#"{{"team":"T1","channel":"C1","ts":"{}","text":"m{}"}}"#, ts, ts).into_bytes()
    }

    #[tokio::test]
    async fn test_shutdown_flushes_partial_batch() {
        let engine = Arc::new(RecordingEngine::default());
        let pipeline =
            IndexingPipeline::spawn(create_in_memory_store(), engine.clone(), &IndexerConfig::default());

        pipeline.submit(Envelope::message(body(1))).unwrap();
        pipeline.submit(Envelope::new("presence", b"{}".to_vec())).unwrap();
        pipeline.submit(Envelope::message(b"{".to_vec())).unwrap();
        pipeline.shutdown().await;

        assert_eq!(*engine.batches.lock(), vec![vec!["T1-C1-1".to_string()]]);

        let stats = pipeline.stats();
        assert_eq!(stats.received, 3);
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.indexed_documents, 1);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown() {
        let pipeline = IndexingPipeline::spawn(
            create_in_memory_store(),
            Arc::new(RecordingEngine::default()),
            &IndexerConfig::default(),
        );

        pipeline.shutdown().await;
        pipeline.shutdown().await;

        assert!(pipeline.is_closed());
        assert!(matches!(
            pipeline.submit(Envelope::message(body(1))),
            Err(AppError::PipelineClosed)
        ));
    }
}
