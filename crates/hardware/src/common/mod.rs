//! Common types and constants used throughout the APEX simulator.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Constants:** Code layout, register count, auto-increment stride.
//! 2. **Error Handling:** Pipeline faults, loader errors and simulation errors.
//! 3. **Register Identifiers:** Typed architectural, physical and condition-code tags.

/// Machine-wide constants.
pub mod constants;

/// Error types and pipeline faults.
pub mod error;

/// Register identifier types.
pub mod reg;

pub use constants::{ARCH_REG_COUNT, CODE_BASE, INSTRUCTION_BYTES};
pub use error::{Fault, LoadError, SimError};
pub use reg::{ArchReg, CcReg, PhysReg, RegTag};
