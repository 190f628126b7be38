//! Search configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Path to the search index directory
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Index writer heap size in bytes (default: 50MB)
    #[serde(default = "default_writer_heap_size")]
    pub writer_heap_size: usize,

    /// Page size when the request does not specify one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Upper bound on the requested page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Deepest result offset a request may page to
    #[serde(default = "default_max_offset")]
    pub max_offset: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            writer_heap_size: default_writer_heap_size(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_offset: default_max_offset(),
        }
    }
}

fn default_index_path() -> PathBuf {
    PathBuf::from("./data/search_index")
}

fn default_writer_heap_size() -> usize {
    50_000_000
}

fn default_page_size() -> usize {
    100
}

fn default_max_page_size() -> usize {
    500
}

fn default_max_offset() -> usize {
    10_000
}
