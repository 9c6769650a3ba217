//! Decode1 Stage: BTB allocation for newly seen branches.
//!
//! A conditional branch that fetch found no BTB entry for gets one here, with
//! the opcode's default bias as its initial history. The branch is marked so
//! that rename holds it for one cycle while the entry is written.

use crate::core::pipeline::frontend::Frontend;
use crate::core::pipeline::latches::FrontEntry;
use crate::core::units::bru::btb::BranchHistory;

/// Executes decode1 on one latched instruction.
pub fn decode_stage(frontend: &mut Frontend, mut entry: FrontEntry) -> FrontEntry {
    let op = entry.inst.opcode;
    if op.is_conditional_branch() && !frontend.btb.contains(entry.pc) {
        let target = entry.pc.wrapping_add_signed(entry.inst.imm);
        frontend
            .btb
            .insert(entry.pc, BranchHistory::initial(op.default_taken_bias()), target);
        entry.awaiting_btb = true;
    }
    entry
}
