//! Cross-crate integration tests.

pub mod fixtures;

mod flows;
mod gateway;
mod races;
