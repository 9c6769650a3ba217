//! Squash recovery after a control misprediction.
//!
//! Everything younger than the resolving branch is removed: the renamed
//! instruction waiting in the dispatch latch, ROB entries (walked youngest
//! first so each restores the mapping it replaced), issue queue, LSQ and BQ
//! entries, functional unit inputs, an in-flight load and bus results for the
//! freed registers. Fetch restarts at the correct target after one idle cycle.

use crate::common::reg::{CcReg, PhysReg};
use crate::core::Cpu;
use crate::core::pipeline::backend::o3::O3Engine;
use crate::core::pipeline::latches::Latches;
use crate::core::pipeline::rob::RobTag;

impl O3Engine {
    /// Squashes every instruction younger than `tag` and redirects fetch to `target`.
    pub(super) fn squash_after(
        &mut self,
        tag: RobTag,
        target: u32,
        cpu: &mut Cpu,
        prev: &mut Latches,
    ) {
        let mut freed: Vec<PhysReg> = Vec::new();
        let mut freed_cc: Vec<CcReg> = Vec::new();
        let mut squashed = 0u64;

        if let Some(pending) = prev.decode2_dispatch.take() {
            let (gpr, cc) = self.rename.undo(pending.dest, pending.base, pending.cc);
            freed.extend(gpr);
            freed_cc.extend(cc);
            squashed += 1;
        }
        squashed += u64::from(prev.decode1_decode2.take().is_some());
        squashed += u64::from(prev.fetch_decode1.take().is_some());

        for entry in self.rob.flush_after(tag) {
            let (gpr, cc) = self.rename.undo(entry.dest, entry.base, entry.cc);
            freed.extend(gpr);
            freed_cc.extend(cc);
            squashed += 1;
        }

        let _ = self.iq.flush_after(tag);
        let _ = self.lsq.flush_after(tag);
        let _ = self.bq.flush_after(tag);
        let _ = self.units.flush_after(tag);
        let _ = self.mau.cancel_after(tag);

        self.gpr_bus.purge(|t| freed.contains(&t));
        self.cc_bus.purge(|t| freed_cc.contains(&t));

        self.frontend.redirect(target);

        cpu.stats.flushes += 1;
        cpu.stats.squashed += squashed;
    }
}
