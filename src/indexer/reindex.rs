//! Full rebuild of the search index from the store

use crate::error::Result;
use crate::search::{IndexOperation, SearchEngine};
use crate::state::{ArchiveStore, MessageFilter};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info};

/// Outcome of a full reindex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReindexSummary {
    /// Stored messages visited, deleted ones excluded
    pub scanned: u64,
    pub indexed: u64,
    pub failed_batches: u64,
}

/// Stream every non-deleted stored message into the engine in bulks of
/// `batch_size`, resuming each page after the last id seen. A failed bulk is logged and skipped; the scan continues.
pub async fn reindex_all(
    store: &dyn ArchiveStore,
    engine: &dyn SearchEngine,
    batch_size: usize,
) -> Result<ReindexSummary> {
    let batch_size = batch_size.max(1);
    let filter = MessageFilter {
        exclude_deleted: true,
        ..Default::default()
    };

    let started = Instant::now();
    let mut summary = ReindexSummary::default();
    let mut cursor: Option<String> = None;

    info!(batch_size, "Starting full reindex");

    loop {
        let page = store
            .list_messages_after(&filter, cursor.as_deref(), batch_size)
            .await?;
        let Some((last, _)) = page.last() else {
            break;
        };
        cursor = Some(last.clone());
        summary.scanned += page.len() as u64;

        let operations: Vec<IndexOperation> = page
            .into_iter()
            .map(|(id, message)| IndexOperation::new(id, message))
            .collect();
        let pending = operations.len();

        match engine.bulk_index(operations).await {
            Ok(ids) => {
                summary.indexed += ids.len() as u64;
                info!(
                    indexed = summary.indexed,
                    elapsed_secs = started.elapsed().as_secs(),
                    "Reindex progress"
                );
            }
            Err(e) => {
                summary.failed_batches += 1;
                error!(pending, error = %e, "Reindex bulk failed");
            }
        }
    }

    info!(
        scanned = summary.scanned,
        indexed = summary.indexed,
        failed_batches = summary.failed_batches,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Full reindex completed"
    );

    Ok(summary)
}
