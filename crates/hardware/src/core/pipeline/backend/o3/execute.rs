//! Execute stage: the issue-side functional units.
//!
//! The branch unit runs first: a misprediction squashes younger work before
//! the other units look at their inputs. Results are driven onto the buses
//! and become visible to wakeup in the next cycle.

use tracing::debug;

use crate::common::constants::AUTO_INCREMENT;
use crate::common::error::Fault;
use crate::core::Cpu;
use crate::core::pipeline::backend::o3::O3Engine;
use crate::core::pipeline::issue_queue::{IqDest, IqEntry};
use crate::core::pipeline::latches::Latches;
use crate::core::units::alu::Alu;
use crate::core::units::bru;

impl O3Engine {
    /// Runs every functional unit for one cycle.
    pub(super) fn execute_stage(&mut self, cpu: &mut Cpu, prev: &mut Latches) {
        if let Some(entry) = self.units.bfu.take() {
            self.execute_branch(&entry, cpu, prev);
        }
        if let Some(entry) = self.units.afu.take() {
            self.execute_address(&entry, cpu);
        }
        if let Some(entry) = self.units.mul.tick() {
            self.execute_alu(&entry);
        }
        if let Some(entry) = self.units.int.take() {
            self.execute_alu(&entry);
        }
    }

    fn execute_alu(&mut self, entry: &IqEntry) {
        let out = Alu::execute(entry.opcode, entry.a(), entry.b(), entry.imm);
        if let (Some(value), IqDest::Reg(dest)) = (out.value, entry.dest) {
            self.gpr_bus.drive(dest, value);
        }
        if let (Some(cc), Some(dest)) = (out.cc, entry.cc_dest) {
            self.cc_bus.drive(dest, cc);
        }
    }

    fn execute_address(&mut self, entry: &IqEntry, cpu: &Cpu) {
        let base = entry.a();
        let addr = base.wrapping_add(entry.imm);
        let faulted = !cpu.memory.contains(addr);
        if let IqDest::Lsq(idx) = entry.dest {
            self.lsq.set_address(idx, addr, faulted);
        }
        if faulted {
            self.rob.fault(entry.tag, Fault::MemoryOutOfBounds { addr });
        }
        if let Some(dest) = entry.base_dest {
            self.gpr_bus.drive(dest, base.wrapping_add(AUTO_INCREMENT));
        }
    }

    fn execute_branch(&mut self, entry: &IqEntry, cpu: &mut Cpu, prev: &mut Latches) {
        let r = bru::resolve(entry.opcode, entry.pc, entry.a(), entry.imm, entry.cc());

        if let (Some(link), IqDest::Reg(dest)) = (r.link, entry.dest) {
            self.gpr_bus.drive(dest, link);
        }
        self.rob.complete(entry.tag);
        self.bq.resolve(entry.tag, r.taken);

        // Jumps are never predicted and always redirect.
        let conditional = entry.opcode.is_conditional_branch();
        let mispredicted = conditional && {
            self.frontend.btb.update(entry.pc, r.taken);
            let predicted_next = self.bq.find(entry.tag).map(|b| b.predicted_next);
            predicted_next != Some(r.next_pc)
        };
        if conditional {
            if mispredicted {
                cpu.stats.branch_mispredictions += 1;
            } else {
                cpu.stats.branch_predictions += 1;
            }
        }

        if mispredicted || !conditional {
            debug!(
                pc = entry.pc,
                target = r.next_pc,
                taken = r.taken,
                "redirect"
            );
            self.squash_after(entry.tag, r.next_pc, cpu, prev);
        }
    }
}
