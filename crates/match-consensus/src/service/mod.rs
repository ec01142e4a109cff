//! # Match Consensus Service
//!
//! The main service implementing `MatchConsensusApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Negotiates requests between two teams (`negotiator`)
//! 2. Records the first outcome report for a completed match (`reporter`)
//! 3. Lets only the counter-party rule on that report and, on confirm,
//!    applies statistics in the same store commit (`arbiter`)
//! 4. Publishes a lifecycle event after every committed change
//!
//! All state lives in the `MatchStore`. The service holds no mutable state
//! of its own, so one instance is shared behind `Arc` by every caller.

mod api;
mod arbiter;
mod helpers;
mod negotiator;
mod queries;
mod reporter;

use crate::domain::{AuthorizationGuard, ConsensusConfig, ConsensusError};
use crate::ports::outbound::{MatchStore, NotificationChannel, TeamDirectory, TimeSource};

/// The Match Consensus Service.
pub struct MatchConsensusService<S, D, N, T>
where
    S: MatchStore,
    D: TeamDirectory,
    N: NotificationChannel,
    T: TimeSource,
{
    /// Persistent store with conditional writes.
    pub(crate) store: S,
    /// Team registry, source of team representatives.
    pub(crate) directory: D,
    /// Delivery of lifecycle events.
    pub(crate) notifier: N,
    /// Time source for timestamps.
    pub(crate) time_source: T,
    /// Validation limits and match type allow-list.
    pub(crate) config: ConsensusConfig,
    pub(crate) guard: AuthorizationGuard,
}

/// Dependencies for MatchConsensusService
pub struct MatchConsensusDependencies<S, D, N, T> {
    /// Persistent store
    pub store: S,
    /// Team registry
    pub directory: D,
    /// Event delivery
    pub notifier: N,
    /// Clock
    pub time_source: T,
}

impl<S, D, N, T> MatchConsensusService<S, D, N, T>
where
    S: MatchStore,
    D: TeamDirectory,
    N: NotificationChannel,
    T: TimeSource,
{
    /// Create a service from its dependencies.
    ///
    /// Fails with `ValidationError` if `config` is unusable.
    pub fn new(
        deps: MatchConsensusDependencies<S, D, N, T>,
        config: ConsensusConfig,
    ) -> Result<Self, ConsensusError> {
        config.validate()?;
        Ok(Self {
            store: deps.store,
            directory: deps.directory,
            notifier: deps.notifier,
            time_source: deps.time_source,
            config,
            guard: AuthorizationGuard::new(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying team directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }
}
