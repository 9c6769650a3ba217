//! Commit stage: in-order retirement from the ROB head.
//!
//! The head retires when every register it writes holds its result, a load's
//! LSQ entry has its value, and a control instruction has been resolved. A
//! store at the head instead waits for its address and data and is handed to
//! the MAU, which retires it once memory has been written.
//!
//! Retirement updates the architectural state, returns the *previous*
//! mappings to the free lists and releases the LSQ and BQ heads.

use tracing::trace;

use crate::common::error::SimError;
use crate::core::Cpu;
use crate::core::pipeline::backend::o3::O3Engine;
use crate::core::pipeline::engine::CycleOutcome;
use crate::core::pipeline::rob::{RobEntry, RobState};
use crate::core::units::mau::MauOp;
use crate::isa::opcode::Opcode;

impl O3Engine {
    /// Retires up to `budget` instructions from the ROB head.
    pub(super) fn commit_stage(
        &mut self,
        cpu: &mut Cpu,
        budget: usize,
    ) -> Result<CycleOutcome, SimError> {
        for _ in 0..budget {
            let Some(head) = self.rob.peek_head() else {
                break;
            };

            if head.state == RobState::Faulted {
                if let Some(fault) = head.fault {
                    return Err(SimError::from_fault(head.pc, fault));
                }
            }

            let opcode = head.inst.opcode;
            if opcode == Opcode::Halt {
                if let Some(entry) = self.rob.retire_head() {
                    self.retire(entry, cpu);
                }
                return Ok(CycleOutcome::Halted);
            }

            if opcode.is_store() {
                let head = head.clone();
                self.send_store(head);
                break;
            }

            if !self.head_ready(head) {
                break;
            }
            if let Some(entry) = self.rob.retire_head() {
                self.retire(entry, cpu);
            }
        }
        Ok(CycleOutcome::Running)
    }

    fn head_ready(&self, head: &RobEntry) -> bool {
        let op = head.inst.opcode;
        if !self.rename.results_valid(head.dest, head.base, head.cc) {
            return false;
        }
        if op.is_load() {
            let lsq_ready = head.lsq_index.is_some_and(|idx| {
                self.lsq.head_index() == Some(idx)
                    && self
                        .lsq
                        .get(idx)
                        .is_some_and(|e| e.addr.is_some() && e.data.is_some())
            });
            if !lsq_ready {
                return false;
            }
        }
        if op.is_control() {
            return head.state == RobState::Completed;
        }
        true
    }

    /// Hands the store at the ROB head to the MAU once its address, data and
    /// auto-increment result are all available.
    fn send_store(&mut self, head: RobEntry) {
        if !self.mau.is_idle() {
            return;
        }
        let Some(idx) = head.lsq_index else { return };
        let Some(e) = self.lsq.get(idx) else { return };
        if e.issued || e.faulted {
            return;
        }
        let (Some(addr), Some(data)) = (e.addr, e.data) else {
            return;
        };
        if !self.rename.results_valid(None, head.base, None) {
            return;
        }
        self.mau.start(MauOp::Store {
            tag: head.tag,
            lsq_index: idx,
            addr,
            data,
        });
        if let Some(e) = self.lsq.get_mut(idx) {
            e.issued = true;
        }
    }

    /// Makes a retired instruction architecturally visible.
    pub(super) fn retire(&mut self, entry: RobEntry, cpu: &mut Cpu) {
        let op = entry.inst.opcode;
        for m in [entry.dest, entry.base].into_iter().flatten() {
            cpu.regs.write(m.arch, self.rename.prf.value(m.phys));
        }
        if let Some(m) = entry.cc {
            cpu.regs.set_cc(self.rename.cc_prf.value(m.phys));
        }
        self.rename.reclaim(entry.dest, entry.base, entry.cc);

        if op.is_memory() {
            let _ = self.lsq.retire_head();
        }
        if op.is_control() {
            let _ = self.bq.retire(entry.tag);
        }

        cpu.stats.record_retire(op);
        if cpu.trace {
            trace!(
                cycle = cpu.stats.cycles,
                pc = entry.pc,
                inst = %entry.inst,
                "commit"
            );
        }
    }
}
