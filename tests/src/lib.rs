//! # Match Consensus Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks of the full lifecycle
//! └── src/integration/  # Cross-crate flows
//!     ├── fixtures.rs   # Shared world: service, bus, teams, users
//!     ├── flows.rs      # End-to-end scenarios and event choreography
//!     ├── races.rs      # Concurrent callers against one entity
//!     └── gateway.rs    # HTTP surface of match-node
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p match-tests
//!
//! # By category
//! cargo test -p match-tests integration::flows::
//! cargo test -p match-tests integration::races::
//!
//! # Benchmarks
//! cargo bench -p match-tests
//! ```

#![allow(dead_code)]

pub mod integration;
