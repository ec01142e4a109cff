//! # Node Configuration
//!
//! Runtime parameters for the node, read from `MC_*` environment variables.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MC_BIND_ADDR` | `0.0.0.0:8080` | Gateway listen address |
//! | `MC_STORAGE` | `memory` | `memory` or `rocksdb` |
//! | `MC_DATA_DIR` | `./data` | RocksDB directory |
//! | `MC_SEED_FILE` | unset | JSON file with users and teams |
//! | `MC_MAX_MESSAGE_LEN` | `500` | Proposal message limit |
//! | `MC_MAX_FEEDBACK_LEN` | `1000` | Outcome feedback limit |
//! | `MC_ALLOWED_MATCH_TYPES` | `scrim,practice,ranked,tournament` | Comma separated allow-list |

use match_consensus::ConsensusConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Gateway configuration.
    pub gateway: GatewayConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Seed file with users and teams, loaded at startup.
    pub seed_file: Option<PathBuf>,
    /// Validation limits handed to the core service.
    pub consensus: ConsensusConfig,
}

/// HTTP gateway settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout_secs: 30,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Which `MatchStore` the node runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process memory; state is lost on restart.
    #[default]
    Memory,
    /// RocksDB under `data_dir`. Needs the `rocksdb` feature.
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "rocksdb" => Ok(Self::RocksDb),
            other => Err(ConfigError::UnknownStorage(other.to_string())),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Store implementation.
    pub backend: StorageBackend,
    /// Data directory for the RocksDB backend.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to something that cannot be parsed.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// `MC_STORAGE` names an unknown backend.
    #[error("Unknown storage backend {0:?}, expected memory or rocksdb")]
    UnknownStorage(String),

    /// RocksDB was requested but the binary was built without it.
    #[error("Storage backend rocksdb requires building with --features rocksdb")]
    BackendNotCompiled,

    /// The core service would reject the limits.
    #[error("Invalid consensus configuration: {0}")]
    Consensus(String),
}

impl NodeConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("MC_BIND_ADDR") {
            config.gateway.bind_addr = parse_var("MC_BIND_ADDR", &addr)?;
        }
        if let Some(backend) = lookup("MC_STORAGE") {
            config.storage.backend = backend.parse()?;
        }
        if let Some(dir) = lookup("MC_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        config.seed_file = lookup("MC_SEED_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        if let Some(len) = lookup("MC_MAX_MESSAGE_LEN") {
            config.consensus.max_message_len = parse_var("MC_MAX_MESSAGE_LEN", &len)?;
        }
        if let Some(len) = lookup("MC_MAX_FEEDBACK_LEN") {
            config.consensus.max_feedback_len = parse_var("MC_MAX_FEEDBACK_LEN", &len)?;
        }
        if let Some(types) = lookup("MC_ALLOWED_MATCH_TYPES") {
            config.consensus.allowed_match_types = types
                .split(',')
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
        }

        Ok(config)
    }

    /// Check the configuration can actually be run by this binary.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::BackendNotCompiled);
        }
        self.consensus
            .validate()
            .map_err(|e| ConfigError::Consensus(e.to_string()))
    }
}

fn parse_var<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}
