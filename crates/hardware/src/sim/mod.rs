//! Simulation driver and program loading.
//!
//! Provides the instruction file loader and the [`Simulator`] that owns the
//! architectural state together with the selected execution engine.

/// Instruction file loader.
pub mod loader;

/// Top-level simulator and its driving API.
pub mod simulator;

pub use simulator::{RegisterFileView, RunOutcome, Simulator};
