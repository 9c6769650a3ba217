//! APEX pipeline simulator library.
//!
//! This crate implements a cycle-accurate simulator of the APEX teaching ISA with the following:
//! 1. **Core:** Out-of-order pipeline (fetch, decode, rename, dispatch, issue, execute, commit)
//!    with a reorder buffer, issue queue, load/store queue, branch queue and BTB.
//! 2. **Reference:** A scalar in-order engine over the same architectural state.
//! 3. **ISA:** Opcode table, text decoder and disassembler.
//! 4. **Simulation:** Loader, configuration, the driving API and statistics collection.

/// Common types and constants (registers, faults, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// CPU core (architectural state, pipeline, engines, functional units).
pub mod core;
/// Instruction set (opcodes, instruction, decode, disassembly, flags).
pub mod isa;
/// Program loader and the top-level simulator.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Architectural state container; registers, memories and stats.
pub use crate::core::Cpu;
/// Top-level simulator; construct with `Simulator::new` or `Simulator::from_file`.
pub use crate::sim::Simulator;
