//! # Match Node Library
//!
//! Internal modules of the `match-node` binary, exposed for testing.
//!
//! - `container/` - configuration, seed loading and service wiring
//! - `api/` - axum gateway over `MatchConsensusApi`
//! - `adapters/` - persistent `MatchStore` (feature `rocksdb`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod api;
pub mod container;

pub use api::{build_router, AppState};
pub use container::{ContainerError, NodeConfig, NodeContainer, NodeService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
