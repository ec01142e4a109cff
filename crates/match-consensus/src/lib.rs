//! # Match Consensus
//!
//! Lifecycle of a competitive match between two teams, from challenge to a
//! result both sides agree on.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Negotiate a match request between two teams
//! - Record exactly one outcome per completed match
//! - Require the counter-party, never the reporter, to confirm or dispute it
//! - Apply team statistics exactly once, at confirmation
//!
//! ## Lifecycle
//!
//! ```text
//! propose ──► pending ──accept──► accepted ──complete──► completed
//!                │                                          │
//!                └──decline──► declined                report (either side)
//!                                                           │
//!                                                           ▼
//!                                              unverified result
//!                                          confirm │        │ dispute
//!                                                  ▼        ▼
//!                                     verified + stats    disputed
//! ```
//!
//! ## Concurrency Guarantees
//!
//! | Race | Closed by |
//! |------|-----------|
//! | Two proposals for one team pair | Conditional insert on the unordered pair |
//! | Double respond / complete | Compare-and-swap on request status |
//! | Double report | Unique result per request |
//! | Double verify | Verification and statistics in one commit |
//!
//! ## Module Structure
//!
//! ```text
//! match-consensus/
//! ├── domain/      # Entities, state machines, guard, aggregator, invariants
//! ├── ports/       # MatchConsensusApi, MatchStore, TeamDirectory, ...
//! ├── adapters/    # In-memory store, directory, bus notifier, clocks
//! └── service/     # Negotiator, reporter, arbiter, queries
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    BusNotifier, InMemoryMatchStore, InMemoryTeamDirectory, ManualClock, NoopNotifier,
    StaticIdentityProvider,
};
pub use domain::{
    AuthSubject, AuthorizationGuard, BestPlayer, ConsensusConfig, ConsensusError,
    MatchListFilter, MatchRequest, MatchResult, MatchStatus, OutcomeApplication, Role, Scores,
    StatisticsAggregator, StoreError, TeamPair, TeamProfile, TeamStatistics, VerificationState,
};
pub use ports::{
    IdentityProvider, MatchConsensusApi, MatchStore, NotificationChannel, NotificationError,
    ProposeMatch, ReportOutcome, SystemTimeSource, TeamDirectory, TimeSource, VerificationCommit,
    VerificationReceipt,
};
pub use service::{MatchConsensusDependencies, MatchConsensusService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
