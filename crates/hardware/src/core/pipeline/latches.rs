//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the entry types carried between the in-order front of
//! the out-of-order pipeline: Fetch → Decode1 → Decode2 (rename) → Dispatch.
//!
//! 1. **Instruction Flow:** One micro-op per latch, with its prediction metadata.
//! 2. **Double Buffering:** Each cycle the stages read last cycle's [`Latches`]
//!    and fill a fresh set that replaces it at the cycle boundary.
//! 3. **Fault Propagation:** Rename faults travel with the entry to the ROB.

use serde::Serialize;

use crate::common::error::Fault;
use crate::core::pipeline::issue_queue::{CcOperand, Operand};
use crate::core::pipeline::rob::{CcMapping, RegMapping};
use crate::core::units::bru::btb::BranchHistory;
use crate::isa::instruction::Instruction;

/// Entry in the fetch→decode1 and decode1→decode2 latches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FrontEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// The instruction.
    pub inst: Instruction,
    /// Whether fetch followed the taken path.
    pub predicted_taken: bool,
    /// PC fetched after this instruction.
    pub next_pc: u32,
    /// BTB history observed at fetch, if the branch had an entry.
    pub history: Option<BranchHistory>,
    /// Decode1 created the BTB entry for this branch this pass.
    pub awaiting_btb: bool,
}

/// Entry in the decode2→dispatch latch: a renamed micro-op.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenamedEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// The instruction.
    pub inst: Instruction,
    /// First register source (base for loads, base for stores).
    pub src1: Option<Operand>,
    /// Second register source.
    pub src2: Option<Operand>,
    /// Store data source.
    pub data: Option<Operand>,
    /// Condition-code source of a conditional branch.
    pub cc_src: Option<CcOperand>,
    /// Destination rename.
    pub dest: Option<RegMapping>,
    /// Auto-increment base rename.
    pub base: Option<RegMapping>,
    /// Condition-code rename.
    pub cc: Option<CcMapping>,
    /// Whether fetch followed the taken path.
    pub predicted_taken: bool,
    /// PC fetched after this instruction.
    pub next_pc: u32,
    /// BTB history observed at fetch.
    pub history: Option<BranchHistory>,
    /// Fault detected at rename.
    pub fault: Option<Fault>,
}

impl RenamedEntry {
    /// A micro-op that carries a fault and no renames.
    pub const fn faulted(front: &FrontEntry, fault: Fault) -> Self {
        Self {
            pc: front.pc,
            inst: front.inst,
            src1: None,
            src2: None,
            data: None,
            cc_src: None,
            dest: None,
            base: None,
            cc: None,
            predicted_taken: front.predicted_taken,
            next_pc: front.next_pc,
            history: front.history,
            fault: Some(fault),
        }
    }
}

/// The three front-end latches of one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Latches {
    /// Fetch → Decode1.
    pub fetch_decode1: Option<FrontEntry>,
    /// Decode1 → Decode2.
    pub decode1_decode2: Option<FrontEntry>,
    /// Decode2 → Dispatch.
    pub decode2_dispatch: Option<RenamedEntry>,
}

impl Latches {
    /// Whether every latch is empty.
    pub const fn is_empty(&self) -> bool {
        self.fetch_decode1.is_none()
            && self.decode1_decode2.is_none()
            && self.decode2_dispatch.is_none()
    }
}
