//! # Domain Module
//!
//! Core domain types for the match consensus engine.

pub mod aggregation;
pub mod authorization;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use aggregation::*;
pub use authorization::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
