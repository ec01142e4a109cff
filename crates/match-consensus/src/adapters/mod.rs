//! # Adapters Module
//!
//! In-process implementations of the outbound ports.

pub mod clock;
pub mod directory;
pub mod memory_store;
pub mod notifier;

pub use clock::ManualClock;
pub use directory::{InMemoryTeamDirectory, StaticIdentityProvider};
pub use memory_store::InMemoryMatchStore;
pub use notifier::{BusNotifier, NoopNotifier};
