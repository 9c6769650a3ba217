//! # Component Tests
//!
//! Tests organized by the part of the simulator they exercise, from the ISA
//! tables up to whole-program properties of the out-of-order engine.

/// Branch Target Buffer history table and replacement.
pub mod btb;

/// Conditional branches, jumps, prediction and squash recovery.
pub mod branches;

/// Out-of-order results against the in-order reference engine.
pub mod equivalence;

/// Faults raised at commit.
pub mod faults;

/// Per-cycle microarchitectural invariants.
pub mod invariants;

/// Text decoder and disassembler.
pub mod isa;

/// Instruction file loading.
pub mod loader;

/// Loads, stores, forwarding and auto-increment.
pub mod memory;

/// Straight-line arithmetic programs and the driving API.
pub mod programs;
