use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Indexing pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Pending operations that trigger a bulk flush
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Inactivity after which a partial batch is flushed
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,

    /// Bulk size used by the full reindex
    #[serde(default = "default_reindex_batch_size")]
    pub reindex_batch_size: usize,
}

impl IndexerConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            flush_interval_secs: default_flush_interval_secs(),
            reindex_batch_size: default_reindex_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_flush_interval_secs() -> u64 {
    10
}

fn default_reindex_batch_size() -> usize {
    1000
}
