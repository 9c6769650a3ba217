//! Issue stage: forwarding bus phases, wakeup and select.
//!
//! 1. **Data phase:** Results broadcast last cycle are written into the
//!    physical register files.
//! 2. **Tag phase:** Results latched last cycle wake every waiting issue queue
//!    operand and LSQ store-data slot.
//! 3. **Select:** Per unit class, the oldest ready entry goes to its unit if
//!    the unit can accept it.

use crate::core::pipeline::backend::o3::O3Engine;
use crate::isa::opcode::FuClass;

impl O3Engine {
    /// Runs wakeup and select for one cycle.
    pub(super) fn issue_stage(&mut self) {
        let _ = self.gpr_bus.data_phase(&mut self.rename.prf);
        let _ = self.cc_bus.data_phase(&mut self.rename.cc_prf);

        for (tag, value) in self.gpr_bus.tag_phase() {
            self.iq.wakeup(tag, value);
            self.lsq.capture_store_data(tag, value);
        }
        for (tag, cc) in self.cc_bus.tag_phase() {
            self.iq.wakeup_cc(tag, cc);
        }

        for class in FuClass::ALL {
            if !self.units.can_accept(class) {
                continue;
            }
            let Some(entry) = self.iq.select(class) else {
                continue;
            };
            match class {
                FuClass::Int => self.units.int.accept(entry),
                FuClass::Mul => self.units.mul.accept(entry),
                FuClass::Afu => self.units.afu.accept(entry),
                FuClass::Branch => self.units.bfu.accept(entry),
            }
        }
    }
}
