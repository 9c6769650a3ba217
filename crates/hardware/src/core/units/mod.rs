//! Execution units and functional components.
//!
//! This module contains the datapath pieces the engines schedule onto: the
//! integer ALU, the branch resolution unit with its BTB, the issue-side
//! functional unit slots and the memory access unit.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Branch resolution and the Branch Target Buffer.
pub mod bru;

/// Integer, multiply, address and branch unit slots.
pub mod fu;

/// Memory Access Unit.
pub mod mau;
