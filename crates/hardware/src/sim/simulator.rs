//! Simulator: owns the architectural state and the engine side-by-side.
//!
//! The engine borrows the [`Cpu`] mutably for each cycle, so neither needs to
//! hold a reference to the other. This is the only type outside the crate
//! needs to drive a simulation.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::common::constants::ARCH_REG_COUNT;
use crate::common::error::{LoadError, SimError};
use crate::config::{BackendType, Config};
use crate::core::Cpu;
use crate::core::pipeline::engine::{CycleOutcome, EngineDispatch, ExecutionEngine};
use crate::core::pipeline::snapshot::PipelineSnapshot;
use crate::isa::flags::ConditionCode;
use crate::isa::instruction::Instruction;
use crate::sim::loader;
use crate::stats::SimStats;

/// Why a call to [`Simulator::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// The program finished; further runs do nothing.
    Halted,
    /// The cycle budget ran out; the simulation can be resumed.
    Paused,
}

/// Committed register state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterFileView {
    /// `R0`-`R15`.
    pub regs: [i32; ARCH_REG_COUNT],
    /// Condition-code flags.
    pub cc: ConditionCode,
}

impl fmt::Display for RegisterFileView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=============== STATE OF ARCHITECTURAL REGISTER FILE ==========")?;
        for (row, vals) in self.regs.chunks(4).enumerate() {
            for (col, v) in vals.iter().enumerate() {
                write!(f, "R{:<2}= {v:<11} ", row * 4 + col)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "CC : {}", self.cc)
    }
}

/// Top-level simulator: architectural state plus the selected engine.
#[derive(Debug)]
pub struct Simulator {
    /// Architectural state (registers, memories, statistics).
    pub cpu: Cpu,
    engine: EngineDispatch,
    faulted: bool,
}

impl Simulator {
    /// Creates a simulator holding `program` in the reset state.
    ///
    /// # Errors
    ///
    /// Fails when `config` does not validate or `program` is empty.
    pub fn new(program: Vec<Instruction>, config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        if program.is_empty() {
            return Err(LoadError::Empty.into());
        }
        info!(
            instructions = program.len(),
            backend = ?config.general.backend,
            "simulator initialized"
        );
        Ok(Self {
            cpu: Cpu::new(program, config),
            engine: EngineDispatch::new(config),
            faulted: false,
        })
    }

    /// Loads the instruction file at `path` and creates a simulator for it.
    pub fn from_file(path: impl AsRef<Path>, config: &Config) -> Result<Self, SimError> {
        let program = loader::load_program(path)?;
        Self::new(program, config)
    }

    /// Advances exactly one cycle.
    ///
    /// A faulting instruction that reaches commit ends the simulation: the
    /// error is returned once and later calls report [`CycleOutcome::Halted`].
    pub fn step(&mut self) -> Result<CycleOutcome, SimError> {
        if self.faulted {
            return Ok(CycleOutcome::Halted);
        }
        self.engine.tick(&mut self.cpu).inspect_err(|e| {
            self.faulted = true;
            debug!(cycle = self.cpu.stats.cycles, error = %e, "simulation fault");
        })
    }

    /// Runs up to `cycles` cycles, stopping early when the program halts.
    pub fn run(&mut self, cycles: u64) -> Result<RunOutcome, SimError> {
        for _ in 0..cycles {
            if self.step()? == CycleOutcome::Halted {
                return Ok(RunOutcome::Halted);
            }
        }
        if self.is_halted() {
            Ok(RunOutcome::Halted)
        } else {
            Ok(RunOutcome::Paused)
        }
    }

    /// Runs until the clock reaches `target` (an absolute cycle number).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CycleTargetPassed`] when the clock is already at or
    /// past `target`.
    pub fn run_until(&mut self, target: u64) -> Result<RunOutcome, SimError> {
        let clock = self.clock();
        if target <= clock {
            return Err(SimError::CycleTargetPassed {
                clock,
                requested: target,
            });
        }
        self.run(target - clock)
    }

    /// Committed registers and flags.
    pub fn read_register_file(&self) -> RegisterFileView {
        RegisterFileView {
            regs: *self.cpu.regs.values(),
            cc: self.cpu.regs.cc(),
        }
    }

    /// Reads one data memory word.
    pub fn read_memory(&self, address: i32) -> Result<i32, SimError> {
        self.cpu
            .memory
            .read(address)
            .ok_or(SimError::AddressOutOfRange(address))
    }

    /// Captures the engine's microarchitectural state.
    pub fn read_pipeline_state(&self) -> PipelineSnapshot {
        let mut snapshot = self.engine.pipeline_state();
        if let PipelineSnapshot::InOrder(s) = &mut snapshot {
            s.next = self.cpu.code.fetch(s.pc).copied();
        }
        snapshot
    }

    /// Statistics collected so far.
    pub const fn stats(&self) -> &SimStats {
        &self.cpu.stats
    }

    /// Cycles simulated so far.
    pub const fn clock(&self) -> u64 {
        self.cpu.stats.cycles
    }

    /// Whether the program has finished (halted, drained or faulted).
    pub fn is_halted(&self) -> bool {
        self.faulted
            || match &self.engine {
                EngineDispatch::InOrder(e) => e.is_halted(),
                EngineDispatch::OutOfOrder(e) => e.is_halted(),
            }
    }

    /// Which engine drives this simulator.
    pub fn backend_type(&self) -> BackendType {
        self.engine.backend_type()
    }
}
