//! Dispatch stage: allocation into the out-of-order window.
//!
//! Every instruction gets a ROB entry; memory operations also get an LSQ slot,
//! control instructions a BQ entry and everything that executes an issue
//! queue entry. All of these are checked before anything is allocated, so a
//! stall leaves no partial state behind.
//!
//! Operands still waiting after rename are refreshed from the physical
//! register files and from results whose tag has already been broadcast, so an
//! instruction dispatched in the cycle of a broadcast does not miss it.

use crate::core::pipeline::backend::o3::O3Engine;
use crate::core::pipeline::branch_queue::BqEntry;
use crate::core::pipeline::issue_queue::{CcOperand, IqDest, IqEntry, Operand};
use crate::core::pipeline::latches::RenamedEntry;
use crate::core::pipeline::lsq::LsqEntry;
use crate::core::pipeline::rob::{RobEntry, RobState};
use crate::isa::opcode::Opcode;
use crate::stats::SimStats;

impl O3Engine {
    fn refresh(&self, op: Option<Operand>) -> Option<Operand> {
        op.map(|mut o| {
            if o.value.is_none() {
                o.value = self
                    .rename
                    .prf
                    .read(o.tag)
                    .or_else(|| self.gpr_bus.lookup(o.tag));
            }
            o
        })
    }

    fn refresh_cc(&self, op: Option<CcOperand>) -> Option<CcOperand> {
        op.map(|mut o| {
            if o.value.is_none() {
                o.value = self
                    .rename
                    .cc_prf
                    .read(o.tag)
                    .or_else(|| self.cc_bus.lookup(o.tag));
            }
            o
        })
    }

    /// Dispatches one renamed instruction. Returns it back on a stall.
    pub(super) fn dispatch(
        &mut self,
        entry: RenamedEntry,
        stats: &mut SimStats,
    ) -> Option<RenamedEntry> {
        let op = entry.inst.opcode;

        if self.rob.is_full() {
            stats.stalls_rob_full += 1;
            return Some(entry);
        }

        if let Some(fault) = entry.fault {
            let mut rob_entry = RobEntry::new(entry.pc, entry.inst);
            rob_entry.state = RobState::Faulted;
            rob_entry.fault = Some(fault);
            let _ = self.rob.allocate(rob_entry);
            return None;
        }

        if op.is_memory() && self.lsq.is_full() {
            stats.stalls_lsq_full += 1;
            return Some(entry);
        }
        if op.is_control() && self.bq.is_full() {
            stats.stalls_bq_full += 1;
            return Some(entry);
        }
        if op.fu_class().is_some() && self.iq.is_full() {
            stats.stalls_iq_full += 1;
            return Some(entry);
        }

        let tag = self.rob.next_tag();
        let src1 = self.refresh(entry.src1);
        let src2 = self.refresh(entry.src2);
        let data = self.refresh(entry.data);
        let cc_src = self.refresh_cc(entry.cc_src);

        let lsq_index = if op.is_load() {
            self.lsq
                .allocate(LsqEntry::load(tag, entry.pc, entry.dest.map(|m| m.phys)))
        } else if op.is_store() {
            data.and_then(|d| {
                self.lsq
                    .allocate(LsqEntry::store(tag, entry.pc, d.tag, d.value))
            })
        } else {
            None
        };

        if op.is_control() {
            let pushed = self.bq.push(BqEntry {
                tag,
                pc: entry.pc,
                opcode: op,
                predicted_taken: entry.predicted_taken,
                predicted_next: entry.next_pc,
                history: entry.history,
                cc_tag: cc_src.map(|c| c.tag),
                resolved: None,
            });
            debug_assert!(pushed.is_ok(), "branch queue full after capacity check");
        }

        if let Some(class) = op.fu_class() {
            let dest = match lsq_index {
                Some(idx) => IqDest::Lsq(idx),
                None => entry.dest.map_or(IqDest::None, |m| IqDest::Reg(m.phys)),
            };
            let inserted = self.iq.insert(IqEntry {
                tag,
                pc: entry.pc,
                class,
                opcode: op,
                src1,
                src2,
                cc_src,
                imm: entry.inst.imm,
                dest,
                cc_dest: entry.cc.map(|m| m.phys),
                base_dest: entry.base.map(|m| m.phys),
            });
            debug_assert!(inserted.is_ok(), "issue queue full after capacity check");
        }

        let mut rob_entry = RobEntry::new(entry.pc, entry.inst);
        rob_entry.dest = entry.dest;
        rob_entry.base = entry.base;
        rob_entry.cc = entry.cc;
        rob_entry.lsq_index = lsq_index;
        if matches!(op, Opcode::Nop | Opcode::Halt) {
            rob_entry.state = RobState::Completed;
        }
        let allocated = self.rob.allocate(rob_entry);
        debug_assert_eq!(allocated, Some(tag));
        None
    }
}
