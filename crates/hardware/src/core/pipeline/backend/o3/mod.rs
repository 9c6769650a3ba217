//! Out-of-Order engine.
//!
//! The O3 engine owns every microarchitectural structure of the pipeline and
//! advances them once per cycle in reverse pipeline order:
//! 1. **Memory:** The MAU completes a store (which retires it) or a load.
//! 2. **Commit:** Retires ready instructions from the ROB head, sends a head store to the MAU.
//! 3. **Load issue:** Starts the oldest ready load when the MAU is idle.
//! 4. **Execute:** BFU first (it may squash younger work), then AFU, multiply and integer units.
//! 5. **Issue:** Bus data phase, tag phase (wakeup) and oldest-first select.
//! 6. **Dispatch, Decode2, Decode1, Fetch:** The in-order front, through double-buffered latches.
//!
//! Results driven in a cycle are latched onto the buses at the end of it, so
//! no stage sees a value produced earlier in the same cycle.

/// Commit stage and retirement.
pub mod commit;
/// Dispatch into ROB, LSQ, BQ and issue queue.
pub mod dispatch;
/// Functional unit execution.
pub mod execute;
/// Wakeup and select.
pub mod issue;
/// Memory access unit stage.
pub mod memory;
/// Squash recovery after a misprediction.
pub mod recovery;

use tracing::debug;

use crate::common::constants::ARCH_REG_COUNT;
use crate::common::error::SimError;
use crate::common::reg::{CcReg, PhysReg};
use crate::config::{BackendType, Config};
use crate::core::Cpu;
use crate::core::pipeline::branch_queue::BranchQueue;
use crate::core::pipeline::engine::{CycleOutcome, ExecutionEngine};
use crate::core::pipeline::forwarding::ForwardingBus;
use crate::core::pipeline::frontend::rename::{RenameOutcome, RenameState};
use crate::core::pipeline::frontend::{Frontend, decode, fetch};
use crate::core::pipeline::issue_queue::IssueQueue;
use crate::core::pipeline::latches::Latches;
use crate::core::pipeline::lsq::Lsq;
use crate::core::pipeline::rob::{Rob, RobTag};
use crate::core::pipeline::snapshot::{O3Snapshot, PipelineSnapshot, UnitsSnapshot};
use crate::core::units::fu::{FuSlot, MulUnit};
use crate::core::units::mau::Mau;
use crate::isa::flags::ConditionCode;
use crate::isa::opcode::FuClass;

/// Issue-side functional units.
#[derive(Debug)]
pub struct FunctionalUnits {
    /// Integer unit.
    pub int: FuSlot,
    /// Multiply unit.
    pub mul: MulUnit,
    /// Address computation unit.
    pub afu: FuSlot,
    /// Branch unit.
    pub bfu: FuSlot,
}

impl FunctionalUnits {
    fn new(mul_latency: u32) -> Self {
        Self {
            int: FuSlot::default(),
            mul: MulUnit::new(mul_latency),
            afu: FuSlot::default(),
            bfu: FuSlot::default(),
        }
    }

    /// Whether the unit for `class` can take an instruction this cycle.
    pub const fn can_accept(&self, class: FuClass) -> bool {
        match class {
            FuClass::Int => self.int.can_accept(),
            FuClass::Mul => self.mul.can_accept(),
            FuClass::Afu => self.afu.can_accept(),
            FuClass::Branch => self.bfu.can_accept(),
        }
    }

    /// Drops every unit's instruction younger than `tag`; returns how many.
    pub fn flush_after(&mut self, tag: RobTag) -> usize {
        [
            self.int.flush_after(tag),
            self.mul.flush_after(tag),
            self.afu.flush_after(tag),
            self.bfu.flush_after(tag),
        ]
        .into_iter()
        .filter(|&b| b)
        .count()
    }
}

/// Out-of-order execution engine.
#[derive(Debug)]
pub struct O3Engine {
    /// Fetch PC, fetch flags and BTB.
    pub frontend: Frontend,
    /// Front-end latches written last cycle.
    pub latches: Latches,
    /// Rename table, free lists and physical register files.
    pub rename: RenameState,
    /// General-purpose result bus.
    pub gpr_bus: ForwardingBus<PhysReg, i32>,
    /// Condition-code result bus.
    pub cc_bus: ForwardingBus<CcReg, ConditionCode>,
    /// Issue queue.
    pub iq: IssueQueue,
    /// Reorder buffer.
    pub rob: Rob,
    /// Load/store queue.
    pub lsq: Lsq,
    /// Branch queue.
    pub bq: BranchQueue,
    /// Integer, multiply, address and branch units.
    pub units: FunctionalUnits,
    /// Memory access unit.
    pub mau: Mau,
    commit_width: usize,
    halted: bool,
}

impl O3Engine {
    /// Creates an engine in the reset state.
    pub fn new(config: &Config) -> Self {
        let p = &config.pipeline;
        Self {
            frontend: Frontend::new(p.btb_size),
            latches: Latches::default(),
            rename: RenameState::new(p.phys_regs, p.cc_regs, ARCH_REG_COUNT),
            gpr_bus: ForwardingBus::new(p.phys_regs),
            cc_bus: ForwardingBus::new(p.cc_regs),
            iq: IssueQueue::new(p.iq_size),
            rob: Rob::new(p.rob_size),
            lsq: Lsq::new(p.lsq_size),
            bq: BranchQueue::new(p.bq_size),
            units: FunctionalUnits::new(p.mul_latency),
            mau: Mau::new(p.mau_latency),
            commit_width: p.commit_width,
            halted: false,
        }
    }

    /// Whether a `HALT` has committed or the program has drained.
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Nothing in flight and nothing left to fetch.
    fn drained(&self, cpu: &Cpu) -> bool {
        self.rob.is_empty()
            && self.latches.is_empty()
            && (!self.frontend.fetch_enabled || cpu.code.fetch(self.frontend.pc).is_none())
            && !self.frontend.skip_fetch
    }

    /// Front-end stages: dispatch, decode2, decode1 and fetch.
    fn front_end(&mut self, cpu: &mut Cpu, prev: Latches, next: &mut Latches) {
        // Dispatch
        if let Some(entry) = prev.decode2_dispatch {
            next.decode2_dispatch = self.dispatch(entry, &mut cpu.stats);
        }

        // Decode2 (rename)
        if let Some(mut entry) = prev.decode1_decode2 {
            if next.decode2_dispatch.is_some() {
                next.decode1_decode2 = Some(entry);
            } else if entry.awaiting_btb {
                entry.awaiting_btb = false;
                cpu.stats.stalls_btb += 1;
                next.decode1_decode2 = Some(entry);
            } else {
                match self.rename.rename(&entry) {
                    RenameOutcome::Renamed(renamed) => next.decode2_dispatch = Some(renamed),
                    RenameOutcome::Stalled => {
                        cpu.stats.stalls_free_list += 1;
                        next.decode1_decode2 = Some(entry);
                    }
                }
            }
        }

        // Decode1
        if let Some(entry) = prev.fetch_decode1 {
            if next.decode1_decode2.is_some() {
                next.fetch_decode1 = Some(entry);
            } else {
                next.decode1_decode2 = Some(decode::decode_stage(&mut self.frontend, entry));
            }
        }

        // Fetch
        if next.fetch_decode1.is_none() {
            next.fetch_decode1 = fetch::fetch_stage(&mut self.frontend, &cpu.code, &mut cpu.stats);
        }
    }
}

impl ExecutionEngine for O3Engine {
    fn tick(&mut self, cpu: &mut Cpu) -> Result<CycleOutcome, SimError> {
        if self.halted {
            return Ok(CycleOutcome::Halted);
        }
        cpu.stats.cycles += 1;

        let mut prev = std::mem::take(&mut self.latches);
        let mut next = Latches::default();

        let retired_stores = self.memory_stage(cpu);
        let outcome = self.commit_stage(cpu, self.commit_width.saturating_sub(retired_stores))?;
        if outcome == CycleOutcome::Halted {
            self.halted = true;
            debug!(cycle = cpu.stats.cycles, "HALT committed");
            return Ok(CycleOutcome::Halted);
        }
        self.start_load(cpu);
        self.execute_stage(cpu, &mut prev);
        self.issue_stage();
        self.front_end(cpu, prev, &mut next);

        self.latches = next;
        self.gpr_bus.latch();
        self.cc_bus.latch();

        if self.drained(cpu) {
            self.halted = true;
            debug!(cycle = cpu.stats.cycles, "program drained without HALT");
            return Ok(CycleOutcome::Halted);
        }
        Ok(CycleOutcome::Running)
    }

    fn pipeline_state(&self) -> PipelineSnapshot {
        PipelineSnapshot::OutOfOrder(Box::new(O3Snapshot {
            pc: self.frontend.pc,
            fetch_enabled: self.frontend.fetch_enabled,
            skip_fetch: self.frontend.skip_fetch,
            latches: self.latches.clone(),
            rename_table: self.rename.table.mappings().collect(),
            cc_mapping: self.rename.table.cc(),
            gpr_free: self.rename.gpr_free.iter().collect(),
            cc_free: self.rename.cc_free.iter().collect(),
            prf: self.rename.prf.entries().to_vec(),
            cc_prf: self.rename.cc_prf.entries().to_vec(),
            iq: self.iq.iter().cloned().collect(),
            rob: self.rob.iter().cloned().collect(),
            lsq: self.lsq.iter().map(|(i, e)| (i, e.clone())).collect(),
            bq: self.bq.iter().cloned().collect(),
            btb: self.frontend.btb.entries().copied().collect(),
            gpr_bus: self.gpr_bus.active_slots().copied().collect(),
            cc_bus: self.cc_bus.active_slots().copied().collect(),
            units: UnitsSnapshot {
                int: self.units.int.current().cloned(),
                mul: self.units.mul.current().map(|(e, n)| (e.clone(), n)),
                afu: self.units.afu.current().cloned(),
                bfu: self.units.bfu.current().cloned(),
                mau: self.mau.current(),
            },
        }))
    }

    fn backend_type(&self) -> BackendType {
        BackendType::OutOfOrder
    }
}
