//! Memory stage: the memory access unit.
//!
//! A completing store writes data memory and retires its own ROB entry. A
//! completing load writes its LSQ entry and drives its destination onto the
//! bus. When idle after commit, the MAU takes the oldest load whose value is
//! available from an older store or from memory.

use crate::common::error::Fault;
use crate::core::Cpu;
use crate::core::pipeline::backend::o3::O3Engine;
use crate::core::pipeline::lsq::LoadResolution;
use crate::core::units::mau::MauOp;

impl O3Engine {
    /// Advances the MAU one cycle. Returns the number of stores retired.
    pub(super) fn memory_stage(&mut self, cpu: &mut Cpu) -> usize {
        let Some(op) = self.mau.tick() else {
            return 0;
        };

        match op {
            MauOp::Store {
                tag, addr, data, ..
            } => {
                let _ = cpu.memory.write(addr, data);
                if self.rob.peek_head().is_some_and(|h| h.tag == tag) {
                    if let Some(entry) = self.rob.retire_head() {
                        self.retire(entry, cpu);
                        return 1;
                    }
                }
                0
            }
            MauOp::Load {
                tag,
                lsq_index,
                addr,
                dest,
                forwarded,
            } => {
                let Some(value) = forwarded.or_else(|| cpu.memory.read(addr)) else {
                    self.rob.fault(tag, Fault::MemoryOutOfBounds { addr });
                    return 0;
                };
                if let Some(e) = self.lsq.get_mut(lsq_index) {
                    e.data = Some(value);
                }
                if let Some(dest) = dest {
                    self.gpr_bus.drive(dest, value);
                }
                0
            }
        }
    }

    /// Starts the oldest ready load if the MAU is idle.
    pub(super) fn start_load(&mut self, cpu: &mut Cpu) {
        if !self.mau.is_idle() {
            return;
        }
        let Some((idx, resolution)) = self.lsq.next_ready_load() else {
            return;
        };
        let Some(e) = self.lsq.get_mut(idx) else {
            return;
        };
        let Some(addr) = e.addr else { return };

        let forwarded = match resolution {
            LoadResolution::Forward(v) => {
                cpu.stats.loads_forwarded += 1;
                Some(v)
            }
            LoadResolution::Memory => {
                cpu.stats.loads_from_memory += 1;
                None
            }
            LoadResolution::Wait => return,
        };
        e.issued = true;

        self.mau.start(MauOp::Load {
            tag: e.tag,
            lsq_index: idx,
            addr,
            dest: e.dest,
            forwarded,
        });
    }
}
