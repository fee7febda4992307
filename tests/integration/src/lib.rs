//! Integration test utilities for the consultation service
//!
//! Spawns the real router on an ephemeral port over the in-memory store
//! and drives it with `reqwest`.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
