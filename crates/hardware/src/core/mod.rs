//! Core processor implementation.
//!
//! This module contains the architectural state, the pipeline structures and
//! engines, and the functional units they execute on.

/// Architectural state (register file, flags, code and data memory).
pub mod arch;

/// The `Cpu` container of architectural state.
pub mod cpu;

/// Instruction pipeline implementation (frontend, window structures, engines).
pub mod pipeline;

/// Execution units (ALU, branch unit and BTB, functional unit slots, MAU).
pub mod units;

pub use self::cpu::Cpu;
