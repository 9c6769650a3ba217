//! APEX architectural state.
//!
//! This module contains the state visible to programs:
//! 1. **GPRs:** The 16-entry register file and the condition-code flags.
//! 2. **Memory:** Immutable code memory and word-addressed data memory.

/// Architectural register file.
pub mod gpr;

/// Code and data memory.
pub mod memory;

pub use gpr::Gpr;
pub use memory::{CodeMemory, DataMemory};
