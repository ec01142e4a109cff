//! # Shared Types Crate
//!
//! Identifier newtypes and small value types used across the workspace.
//!
//! ## Design Principles
//!
//! - **Typed identities**: a `TeamId` can never be passed where a `UserId` is
//!   expected, even though both are UUIDs on the wire.
//! - **Transparent encoding**: identifiers serialize as plain UUID strings so
//!   the HTTP surface and the event bus carry the same representation.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
