//! Execution engine trait and backend type erasure.
//!
//! This module defines the interface every backend implements:
//! 1. **`ExecutionEngine`**: advances the machine by one clock cycle.
//! 2. **`CycleOutcome`**: whether the program is still running after a cycle.
//! 3. **`EngineDispatch`**: enum dispatch for type-erased engine storage.

use serde::Serialize;

use crate::common::error::SimError;
use crate::config::{BackendType, Config};
use crate::core::Cpu;
use crate::core::pipeline::backend::inorder::InOrderEngine;
use crate::core::pipeline::backend::o3::O3Engine;
use crate::core::pipeline::snapshot::PipelineSnapshot;

/// Result of one clock cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CycleOutcome {
    /// Instructions remain in flight or to be fetched.
    Running,
    /// `HALT` committed or the program drained; no further cycles do anything.
    Halted,
}

/// The execution engine trait, implemented by [`InOrderEngine`] and [`O3Engine`].
pub trait ExecutionEngine {
    /// Runs one cycle of every stage against the architectural state in `cpu`.
    ///
    /// Returns an error when a faulting instruction retires.
    fn tick(&mut self, cpu: &mut Cpu) -> Result<CycleOutcome, SimError>;

    /// Captures the microarchitectural state for display.
    fn pipeline_state(&self) -> PipelineSnapshot;

    /// Which backend this is.
    fn backend_type(&self) -> BackendType;
}

/// Type-erased engine for storage in the non-generic simulator.
#[derive(Debug)]
pub enum EngineDispatch {
    /// Scalar in-order engine.
    InOrder(InOrderEngine),
    /// Out-of-order engine.
    OutOfOrder(Box<O3Engine>),
}

impl EngineDispatch {
    /// Builds the engine selected by `config.general.backend`.
    pub fn new(config: &Config) -> Self {
        match config.general.backend {
            BackendType::InOrder => Self::InOrder(InOrderEngine::new()),
            BackendType::OutOfOrder => Self::OutOfOrder(Box::new(O3Engine::new(config))),
        }
    }
}

impl ExecutionEngine for EngineDispatch {
    fn tick(&mut self, cpu: &mut Cpu) -> Result<CycleOutcome, SimError> {
        match self {
            Self::InOrder(e) => e.tick(cpu),
            Self::OutOfOrder(e) => e.tick(cpu),
        }
    }

    fn pipeline_state(&self) -> PipelineSnapshot {
        match self {
            Self::InOrder(e) => e.pipeline_state(),
            Self::OutOfOrder(e) => e.pipeline_state(),
        }
    }

    fn backend_type(&self) -> BackendType {
        match self {
            Self::InOrder(e) => e.backend_type(),
            Self::OutOfOrder(e) => e.backend_type(),
        }
    }
}
