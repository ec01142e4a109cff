//! Adapters the node adds on top of the core crate's in-memory ones.

pub mod storage;
