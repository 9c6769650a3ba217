//! Configuration system for the APEX simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline structure capacities and unit latencies.
//! 2. **Structures:** Hierarchical config for general, pipeline and memory settings.
//! 3. **Enums:** Execution backend selection.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or taken from `Config::default()`.
//! Every field is optional in the JSON document and falls back to its default.

use serde::{Deserialize, Serialize};

use crate::common::constants::ARCH_REG_COUNT;
use crate::common::error::SimError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Reorder buffer entries.
    pub const ROB_SIZE: usize = 32;

    /// Issue queue entries.
    pub const IQ_SIZE: usize = 24;

    /// Load/store queue entries.
    pub const LSQ_SIZE: usize = 16;

    /// Branch queue entries.
    pub const BQ_SIZE: usize = 16;

    /// Branch target buffer entries.
    pub const BTB_SIZE: usize = 8;

    /// General-purpose physical registers.
    ///
    /// Sixteen of these back the architectural registers at reset; the rest
    /// form the initial free list.
    pub const PHYS_REGS: usize = 40;

    /// Condition-code physical registers.
    pub const CC_REGS: usize = 16;

    /// Multiply unit latency in cycles.
    pub const MUL_LATENCY: u32 = 3;

    /// Memory access unit latency in cycles.
    pub const MAU_LATENCY: u32 = 2;

    /// Instructions retired per cycle.
    pub const COMMIT_WIDTH: usize = 1;

    /// Data memory size in 32-bit words.
    pub const DATA_MEMORY_SIZE: usize = 4096;
}

/// Execution engine selection.
///
/// Both engines operate on the same architectural state and produce the
/// same committed results for a given program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum BackendType {
    /// Scalar in-order engine: one instruction executed and retired per cycle.
    InOrder,
    /// Out-of-order engine with renaming, issue queue, ROB and LSQ.
    #[default]
    OutOfOrder,
}

/// Root configuration structure for the simulator.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Structure capacities and functional unit latencies.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Data memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a configuration from a JSON document and validates it.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every capacity and latency is usable.
    ///
    /// The physical register pool must hold at least two registers beyond
    /// the architectural count: `LOADP`/`STOREP` rename both the destination
    /// and the base in the same cycle.
    pub fn validate(&self) -> Result<(), SimError> {
        let p = &self.pipeline;
        let sizes = [
            ("rob_size", p.rob_size),
            ("iq_size", p.iq_size),
            ("lsq_size", p.lsq_size),
            ("bq_size", p.bq_size),
            ("btb_size", p.btb_size),
            ("commit_width", p.commit_width),
            ("data_memory_size", self.memory.data_memory_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(SimError::InvalidConfig(format!("{name} must be non-zero")));
        }
        if p.phys_regs < ARCH_REG_COUNT + 2 {
            return Err(SimError::InvalidConfig(format!(
                "phys_regs must be at least {} (got {})",
                ARCH_REG_COUNT + 2,
                p.phys_regs
            )));
        }
        if p.cc_regs < 2 {
            return Err(SimError::InvalidConfig(format!(
                "cc_regs must be at least 2 (got {})",
                p.cc_regs
            )));
        }
        if p.mul_latency == 0 || p.mau_latency == 0 {
            return Err(SimError::InvalidConfig(
                "functional unit latencies must be non-zero".to_string(),
            ));
        }
        if self.memory.data_memory_size > i32::MAX as usize {
            return Err(SimError::InvalidConfig(
                "data_memory_size must be addressable by a 32-bit word".to_string(),
            ));
        }
        Ok(())
    }
}

/// General simulation settings and options.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Emit a `tracing` event for every committed instruction.
    #[serde(default)]
    pub trace_instructions: bool,

    /// Which execution engine drives the simulation.
    #[serde(default)]
    pub backend: BackendType,
}

/// Structure capacities and functional unit latencies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Reorder buffer entries
    #[serde(default = "PipelineConfig::default_rob_size")]
    pub rob_size: usize,

    /// Issue queue entries
    #[serde(default = "PipelineConfig::default_iq_size")]
    pub iq_size: usize,

    /// Load/store queue entries
    #[serde(default = "PipelineConfig::default_lsq_size")]
    pub lsq_size: usize,

    /// Branch queue entries
    #[serde(default = "PipelineConfig::default_bq_size")]
    pub bq_size: usize,

    /// Branch Target Buffer entries
    #[serde(default = "PipelineConfig::default_btb_size")]
    pub btb_size: usize,

    /// General-purpose physical registers
    #[serde(default = "PipelineConfig::default_phys_regs")]
    pub phys_regs: usize,

    /// Condition-code physical registers
    #[serde(default = "PipelineConfig::default_cc_regs")]
    pub cc_regs: usize,

    /// Multiply unit latency (cycles)
    #[serde(default = "PipelineConfig::default_mul_latency")]
    pub mul_latency: u32,

    /// Memory access unit latency (cycles)
    #[serde(default = "PipelineConfig::default_mau_latency")]
    pub mau_latency: u32,

    /// Maximum ROB entries retired per cycle
    #[serde(default = "PipelineConfig::default_commit_width")]
    pub commit_width: usize,
}

impl PipelineConfig {
    fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }

    fn default_iq_size() -> usize {
        defaults::IQ_SIZE
    }

    fn default_lsq_size() -> usize {
        defaults::LSQ_SIZE
    }

    fn default_bq_size() -> usize {
        defaults::BQ_SIZE
    }

    fn default_btb_size() -> usize {
        defaults::BTB_SIZE
    }

    fn default_phys_regs() -> usize {
        defaults::PHYS_REGS
    }

    fn default_cc_regs() -> usize {
        defaults::CC_REGS
    }

    fn default_mul_latency() -> u32 {
        defaults::MUL_LATENCY
    }

    fn default_mau_latency() -> u32 {
        defaults::MAU_LATENCY
    }

    fn default_commit_width() -> usize {
        defaults::COMMIT_WIDTH
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rob_size: defaults::ROB_SIZE,
            iq_size: defaults::IQ_SIZE,
            lsq_size: defaults::LSQ_SIZE,
            bq_size: defaults::BQ_SIZE,
            btb_size: defaults::BTB_SIZE,
            phys_regs: defaults::PHYS_REGS,
            cc_regs: defaults::CC_REGS,
            mul_latency: defaults::MUL_LATENCY,
            mau_latency: defaults::MAU_LATENCY,
            commit_width: defaults::COMMIT_WIDTH,
        }
    }
}

/// Data memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Data memory size in 32-bit words
    #[serde(default = "MemoryConfig::default_data_memory_size")]
    pub data_memory_size: usize,
}

impl MemoryConfig {
    fn default_data_memory_size() -> usize {
        defaults::DATA_MEMORY_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_memory_size: defaults::DATA_MEMORY_SIZE,
        }
    }
}
