//! Shared helpers for the integration tests.

/// Simulator construction, execution and snapshot collection.
pub mod harness;
