//! # Service Container
//!
//! Builds the core service and its adapters from `NodeConfig`.
//!
//! ## Wiring
//!
//! ```text
//! NodeConfig ──► MatchStore (memory | rocksdb)
//!            ──► InMemoryTeamDirectory ◄── seed file ──► StaticIdentityProvider
//!            ──► InMemoryEventBus ──► BusNotifier
//!                          │
//!                          ▼
//!              MatchConsensusService ──► gateway AppState
//! ```

pub mod config;
pub mod seed;

pub use config::{ConfigError, GatewayConfig, NodeConfig, StorageBackend, StorageConfig};
pub use seed::{SeedError, SeedFile};

use match_consensus::{
    BusNotifier, ConsensusError, InMemoryMatchStore, InMemoryTeamDirectory,
    MatchConsensusDependencies, MatchConsensusService, MatchStore, StaticIdentityProvider,
    SystemTimeSource,
};
use match_telemetry::{log_event, log_match_event};
use shared_bus::{EventFilter, EventPublisher, EventSubscriber, InMemoryEventBus};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

/// The service type the node runs.
pub type NodeService = MatchConsensusService<
    Arc<dyn MatchStore>,
    Arc<InMemoryTeamDirectory>,
    BusNotifier,
    SystemTimeSource,
>;

/// Startup failures.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Seed file unusable.
    #[error(transparent)]
    Seed(#[from] SeedError),

    /// Store could not be opened.
    #[error("Failed to open store: {0}")]
    Storage(String),

    /// Core service rejected its configuration.
    #[error(transparent)]
    Service(#[from] ConsensusError),
}

/// Everything the gateway needs, built once at startup.
pub struct NodeContainer {
    /// Core service, shared by every request handler.
    pub service: Arc<NodeService>,
    /// Bearer-token lookup.
    pub identity: Arc<StaticIdentityProvider>,
    /// Team registry.
    pub directory: Arc<InMemoryTeamDirectory>,
    /// Lifecycle event bus.
    pub bus: Arc<InMemoryEventBus>,
}

impl NodeContainer {
    /// Validate `config`, open the store, load the seed and build the service.
    pub fn build(config: &NodeConfig) -> Result<Self, ContainerError> {
        config.validate()?;

        let directory = Arc::new(InMemoryTeamDirectory::new());
        let identity = Arc::new(StaticIdentityProvider::new());
        if let Some(path) = &config.seed_file {
            info!(path = %path.display(), "Loading seed file");
            SeedFile::load(path)?.apply(&directory, &identity);
        }

        let store = open_store(&config.storage)?;
        let bus = Arc::new(InMemoryEventBus::new());
        let publisher: Arc<dyn EventPublisher> = bus.clone();

        let service = MatchConsensusService::new(
            MatchConsensusDependencies {
                store,
                directory: Arc::clone(&directory),
                notifier: BusNotifier::new(publisher),
                time_source: SystemTimeSource,
            },
            config.consensus.clone(),
        )?;

        info!(
            backend = ?config.storage.backend,
            teams = directory.len(),
            "Match consensus service ready"
        );

        Ok(Self {
            service: Arc::new(service),
            identity,
            directory,
            bus,
        })
    }

    /// Log every lifecycle event at debug level until the bus closes.
    pub fn spawn_event_log(&self) -> JoinHandle<()> {
        spawn_event_log(self.bus.as_ref())
    }
}

/// Log every event `source` delivers at debug level until it closes.
pub fn spawn_event_log(source: &dyn EventSubscriber) -> JoinHandle<()> {
    let mut subscription = source.subscribe(EventFilter::all());
    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            match event.request_id() {
                Some(request_id) => log_match_event!(
                    debug,
                    "node",
                    "Lifecycle event",
                    request_id,
                    topic = ?event.topic(),
                    recipient = ?event.recipient()
                ),
                None => log_event!(debug, "node", "Lifecycle event", topic = ?event.topic()),
            }
        }
    })
}

fn open_store(storage: &StorageConfig) -> Result<Arc<dyn MatchStore>, ContainerError> {
    match storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryMatchStore::new())),
        #[cfg(feature = "rocksdb")]
        StorageBackend::RocksDb => {
            use crate::adapters::storage::{RocksDbConfig, RocksDbMatchStore};
            info!(path = %storage.data_dir.display(), "Opening RocksDB store");
            let store = RocksDbMatchStore::open(RocksDbConfig {
                path: storage.data_dir.clone(),
                ..Default::default()
            })
            .map_err(|e| ContainerError::Storage(e.to_string()))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::RocksDb => Err(ConfigError::BackendNotCompiled.into()),
    }
}
