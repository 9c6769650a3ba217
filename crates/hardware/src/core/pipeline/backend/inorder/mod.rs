//! In-order engine: one instruction fetched, executed and retired per cycle.
//!
//! There is no speculation and no microarchitectural state beyond the PC, so
//! the architectural results of a program are exactly those of sequential
//! execution. The out-of-order engine is checked against this one.

pub mod execute;

use tracing::{debug, trace};

use crate::common::constants::CODE_BASE;
use crate::common::error::SimError;
use crate::config::BackendType;
use crate::core::Cpu;
use crate::core::pipeline::engine::{CycleOutcome, ExecutionEngine};
use crate::core::pipeline::snapshot::{InOrderSnapshot, PipelineSnapshot};

use self::execute::Step;

/// Scalar in-order execution engine.
#[derive(Debug)]
pub struct InOrderEngine {
    /// PC of the next instruction.
    pub pc: u32,
    halted: bool,
}

impl InOrderEngine {
    /// Creates an engine at the start of code memory.
    pub const fn new() -> Self {
        Self {
            pc: CODE_BASE,
            halted: false,
        }
    }

    /// Whether a `HALT` has executed or the program has run out.
    pub const fn is_halted(&self) -> bool {
        self.halted
    }
}

impl Default for InOrderEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionEngine for InOrderEngine {
    fn tick(&mut self, cpu: &mut Cpu) -> Result<CycleOutcome, SimError> {
        if self.halted {
            return Ok(CycleOutcome::Halted);
        }
        cpu.stats.cycles += 1;

        let Some(inst) = cpu.code.fetch(self.pc).copied() else {
            self.halted = true;
            debug!(cycle = cpu.stats.cycles, "program drained without HALT");
            return Ok(CycleOutcome::Halted);
        };

        let step = execute::execute(&inst, self.pc, cpu)?;
        cpu.stats.record_retire(inst.opcode);
        if cpu.trace {
            trace!(cycle = cpu.stats.cycles, pc = self.pc, inst = %inst, "commit");
        }

        match step {
            Step::Next(pc) => {
                self.pc = pc;
                Ok(CycleOutcome::Running)
            }
            Step::Halt => {
                self.halted = true;
                debug!(cycle = cpu.stats.cycles, "HALT committed");
                Ok(CycleOutcome::Halted)
            }
        }
    }

    fn pipeline_state(&self) -> PipelineSnapshot {
        PipelineSnapshot::InOrder(InOrderSnapshot {
            pc: self.pc,
            next: None,
            halted: self.halted,
        })
    }

    fn backend_type(&self) -> BackendType {
        BackendType::InOrder
    }
}
