//! Fault and Error definitions.
//!
//! This module defines the error handling for the simulator. It provides:
//! 1. **Pipeline Faults:** Conditions detected inside the pipeline and carried to the
//!    ROB head, where they become architectural (precise) errors.
//! 2. **Load Errors:** Problems reading or parsing an instruction file.
//! 3. **Simulation Errors:** Everything the driving API can report to its caller.
//!
//! Recoverable pipeline conditions (full queues, busy units, mispredictions) are
//! never errors; they show up as stall counters in [`SimStats`](crate::stats::SimStats).

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use super::reg::ArchReg;

/// Fault recorded against an in-flight instruction.
///
/// A fault does not stop the machine when it is detected: the instruction may
/// be on a mispredicted path. It is raised only if the faulted instruction
/// reaches the head of the reorder buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Fault {
    /// `LOADP`/`STOREP` names the same register as base and as
    /// destination (or store data).
    AutoIncrementAlias {
        /// The aliased architectural register.
        reg: ArchReg,
    },
    /// Effective address outside data memory.
    MemoryOutOfBounds {
        /// The computed address.
        addr: i32,
    },
}

/// Error produced while reading or parsing an instruction file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("could not read instruction file '{}': {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The opcode field is not a known mnemonic.
    #[error("line {line}: unknown opcode '{opcode}'")]
    UnknownOpcode {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        opcode: String,
    },
    /// A register operand is malformed or out of range.
    #[error("line {line}: invalid register '{text}'")]
    BadRegister {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// A literal operand is malformed.
    #[error("line {line}: invalid immediate '{text}'")]
    BadImmediate {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// Wrong number of operands for the opcode.
    #[error("line {line}: {opcode} expects {expected} operand(s), found {found}")]
    OperandCount {
        /// 1-based line number.
        line: usize,
        /// Mnemonic of the instruction.
        opcode: &'static str,
        /// Operands required by the opcode.
        expected: usize,
        /// Operands present on the line.
        found: usize,
    },
    /// The file contains no instructions.
    #[error("instruction file contains no instructions")]
    Empty,
}

/// Error reported by the simulator's driving API.
#[derive(Debug, Error)]
pub enum SimError {
    /// The instruction source could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration is structurally invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `LOADP`/`STOREP` whose destination and base register are identical.
    #[error("auto-increment instruction at pc {pc} uses {reg} as both base and destination")]
    AutoIncrementAlias {
        /// PC of the offending instruction.
        pc: u32,
        /// The aliased register.
        reg: ArchReg,
    },

    /// A committed memory operation addressed memory outside data memory.
    #[error("memory access at pc {pc} to address {addr} is out of bounds")]
    MemoryFault {
        /// PC of the offending instruction.
        pc: u32,
        /// The computed address.
        addr: i32,
    },

    /// `read_memory` was asked for an address outside data memory.
    #[error("address {0} is outside data memory")]
    AddressOutOfRange(i32),

    /// An absolute cycle target is not ahead of the current clock.
    #[error("Reached end of simulation already (clock = {clock}, requested = {requested})")]
    CycleTargetPassed {
        /// Current clock.
        clock: u64,
        /// Requested target cycle.
        requested: u64,
    },
}

impl SimError {
    /// Converts a fault that reached the ROB head into a simulation error.
    pub const fn from_fault(pc: u32, fault: Fault) -> Self {
        match fault {
            Fault::AutoIncrementAlias { reg } => Self::AutoIncrementAlias { pc, reg },
            Fault::MemoryOutOfBounds { addr } => Self::MemoryFault { pc, addr },
        }
    }
}
