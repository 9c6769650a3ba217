//! Fetch Stage: instruction read and next-PC prediction.
//!
//! Reads the instruction at the PC and chooses the next PC: the BTB target if
//! the branch has an entry predicting taken, otherwise the fall-through.

use tracing::trace;

use crate::common::constants::INSTRUCTION_BYTES;
use crate::core::arch::memory::CodeMemory;
use crate::core::pipeline::frontend::Frontend;
use crate::core::pipeline::latches::FrontEntry;
use crate::isa::opcode::Opcode;
use crate::stats::SimStats;

/// Executes the fetch stage.
///
/// Must only be called when the fetch→decode1 latch is free this cycle.
pub fn fetch_stage(
    frontend: &mut Frontend,
    code: &CodeMemory,
    stats: &mut SimStats,
) -> Option<FrontEntry> {
    if frontend.skip_fetch {
        frontend.skip_fetch = false;
        stats.stalls_fetch_redirect += 1;
        return None;
    }
    if !frontend.fetch_enabled {
        return None;
    }

    let pc = frontend.pc;
    let inst = *code.fetch(pc)?;
    let fall_through = pc.wrapping_add(INSTRUCTION_BYTES);

    let hit = inst
        .opcode
        .is_conditional_branch()
        .then(|| frontend.btb.lookup(pc))
        .flatten();
    let predicted_taken = hit.is_some_and(|e| e.history.predicts_taken());
    let next_pc = match hit {
        Some(e) if predicted_taken => e.target,
        _ => fall_through,
    };

    if inst.opcode == Opcode::Halt {
        frontend.fetch_enabled = false;
    }
    frontend.pc = next_pc;

    trace!(pc, %inst, next_pc, "fetch");
    Some(FrontEntry {
        pc,
        inst,
        predicted_taken,
        next_pc,
        history: hit.map(|e| e.history),
        awaiting_btb: false,
    })
}
