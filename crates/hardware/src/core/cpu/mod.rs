//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which holds the
//! architectural state every execution engine works against:
//! 1. **State Management:** Committed registers and condition code.
//! 2. **Memory:** Code memory (read-only) and data memory.
//! 3. **Accounting:** Statistics and the instruction trace switch.
//!
//! Microarchitectural state (latches, queues, rename state) belongs to the
//! engine, so the same `Cpu` can be driven by either backend.

use crate::config::Config;
use crate::core::arch::gpr::Gpr;
use crate::core::arch::memory::{CodeMemory, DataMemory};
use crate::isa::instruction::Instruction;
use crate::stats::SimStats;

/// Architectural state of the machine.
#[derive(Debug)]
pub struct Cpu {
    /// Committed general-purpose registers and condition code.
    pub regs: Gpr,
    /// Data memory.
    pub memory: DataMemory,
    /// Program being executed.
    pub code: CodeMemory,
    /// Simulation statistics.
    pub stats: SimStats,
    /// Emit a trace event for every retired instruction.
    pub trace: bool,
}

impl Cpu {
    /// Creates a reset machine holding `program`.
    pub fn new(program: Vec<Instruction>, config: &Config) -> Self {
        Self {
            regs: Gpr::new(),
            memory: DataMemory::new(config.memory.data_memory_size),
            code: CodeMemory::new(program),
            stats: SimStats::default(),
            trace: config.general.trace_instructions,
        }
    }
}
