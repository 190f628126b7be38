use crate::indexer::IndexerConfig;
use crate::search::SearchConfig;
use crate::websocket::WebSocketConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Domain of the team served when no custom domain matches the request host
    #[serde(default = "default_team")]
    pub team: String,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Archiving bot credentials
    #[serde(default)]
    pub bot: BotConfig,

    /// Durable store configuration
    #[serde(default)]
    pub state: StateConfig,

    /// Search index configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Indexing pipeline configuration
    #[serde(default)]
    pub indexer: IndexerConfig,

    /// WebSocket configuration
    #[serde(default)]
    pub websocket: WebSocketConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let config_path = path
            .map(str::to_string)
            .or_else(|| std::env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/local.toml".to_string());

        config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(&config_path).required(false))
            // Environment overrides, e.g. CHAT_ARCHIVE__BOT__TOKEN
            .add_source(
                config::Environment::with_prefix("CHAT_ARCHIVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            team: default_team(),
            server: ServerConfig::default(),
            bot: BotConfig::default(),
            state: StateConfig::default(),
            search: SearchConfig::default(),
            indexer: IndexerConfig::default(),
            websocket: WebSocketConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub port: u16,

    /// Header a trusted proxy uses to forward the original referrer
    #[serde(default = "default_referer_header")]
    pub referer_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
            referer_header: default_referer_header(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Shared secret; clients authenticate with its SHA-256 hex digest
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Durable store backend
    #[serde(default)]
    pub backend: StateBackend,

    /// Path for the embedded database
    pub path: Option<PathBuf>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StateBackend::default(),
            path: Some(PathBuf::from("./data/state")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    #[default]
    Sled,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON formatted logs
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_team() -> String {
    "archive".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_referer_header() -> String {
    "X-Alt-Referer".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.referer_header, "X-Alt-Referer");
        assert_eq!(config.indexer.batch_size, 100);
        assert_eq!(config.indexer.flush_interval_secs, 10);
        assert_eq!(config.websocket.outbound_capacity, 256);
        assert_eq!(config.search.max_page_size, 500);
    }

    #[test]
    fn test_load_embedded_defaults() {
        let config = Config::load(Some("does/not/exist.toml")).unwrap();
        assert_eq!(config.team, "archive");
        assert_eq!(config.state.backend, StateBackend::Sled);
        assert_eq!(config.search.default_page_size, 100);
        assert_eq!(config.websocket.ping_period_secs, 54);
    }
}
