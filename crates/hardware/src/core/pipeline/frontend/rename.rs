//! Decode2 Stage: register renaming.
//!
//! This stage maps architectural registers onto physical registers. Source
//! tags are looked up BEFORE any destination is renamed, so an instruction
//! reading its own destination (e.g. `ADDL R1,R1,#1`) gets the previous
//! producer's tag. Each destination then receives a fresh physical register
//! from the free list and the outgoing mapping is kept for reclamation.
//!
//! The same state is used in reverse by squash recovery ([`RenameState::undo`])
//! and forward by commit ([`RenameState::reclaim`]).

use serde::Serialize;

use crate::common::error::Fault;
use crate::common::reg::{ArchReg, CcReg, PhysReg};
use crate::core::pipeline::issue_queue::{CcOperand, Operand};
use crate::core::pipeline::latches::{FrontEntry, RenamedEntry};
use crate::core::pipeline::prf::PhysRegFile;
use crate::core::pipeline::rename_table::{FreeList, RenameTable};
use crate::core::pipeline::rob::{CcMapping, RegMapping};
use crate::isa::flags::ConditionCode;

/// Rename table, free lists and physical register files.
#[derive(Debug)]
pub struct RenameState {
    /// Architectural to physical mapping.
    pub table: RenameTable,
    /// Free general-purpose physical registers.
    pub gpr_free: FreeList<PhysReg>,
    /// Free condition-code registers.
    pub cc_free: FreeList<CcReg>,
    /// General-purpose physical register file.
    pub prf: PhysRegFile<PhysReg, i32>,
    /// Condition-code physical register file.
    pub cc_prf: PhysRegFile<CcReg, ConditionCode>,
}

/// Outcome of renaming one instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The instruction was renamed (or carries a fault) and moves on.
    Renamed(RenamedEntry),
    /// A free list is too short; the instruction stays in decode2.
    Stalled,
}

impl RenameState {
    /// Reset state: `Ri -> Pi` and the condition code to `C0`, all valid with
    /// zero values; the remaining registers are free.
    pub fn new(phys_regs: usize, cc_regs: usize, arch_regs: usize) -> Self {
        let mut prf = PhysRegFile::new(phys_regs);
        for i in 0..arch_regs {
            prf.write(PhysReg(i as u16), 0);
        }
        let mut cc_prf = PhysRegFile::new(cc_regs);
        cc_prf.write(CcReg(0), ConditionCode::default());

        Self {
            table: RenameTable::new(),
            gpr_free: FreeList::new(arch_regs, phys_regs),
            cc_free: FreeList::new(1, cc_regs),
            prf,
            cc_prf,
        }
    }

    fn source(&self, reg: ArchReg) -> Operand {
        let tag = self.table.lookup(reg);
        Operand {
            tag,
            value: self.prf.read(tag),
        }
    }

    fn allocate(&mut self, arch: ArchReg) -> Option<RegMapping> {
        let phys = self.gpr_free.pop()?;
        self.prf.allocate(phys);
        let prev = self.table.remap(arch, phys);
        Some(RegMapping { arch, phys, prev })
    }

    /// Renames one instruction.
    pub fn rename(&mut self, entry: &FrontEntry) -> RenameOutcome {
        let inst = entry.inst;
        let op = inst.opcode;

        if let Some(reg) = inst.auto_increment_alias() {
            return RenameOutcome::Renamed(RenamedEntry::faulted(
                entry,
                Fault::AutoIncrementAlias { reg },
            ));
        }

        let dest_reg = inst.dest();
        let base_reg = inst.auto_increment_base();
        let gpr_needed = usize::from(dest_reg.is_some()) + usize::from(base_reg.is_some());
        let cc_needed = usize::from(op.writes_cc());
        if self.gpr_free.len() < gpr_needed || self.cc_free.len() < cc_needed {
            return RenameOutcome::Stalled;
        }

        // Sources first.
        let (src1, src2, data) = if op.is_store() {
            (
                inst.base().map(|r| self.source(r)),
                None,
                inst.store_data().map(|r| self.source(r)),
            )
        } else {
            (
                inst.rs1.map(|r| self.source(r)),
                inst.rs2.map(|r| self.source(r)),
                None,
            )
        };
        let cc_src = op.is_conditional_branch().then(|| {
            let tag = self.table.cc();
            CcOperand {
                tag,
                value: self.cc_prf.read(tag),
            }
        });

        let dest = dest_reg.and_then(|r| self.allocate(r));
        let base = base_reg.and_then(|r| self.allocate(r));
        let cc = if op.writes_cc() {
            self.cc_free.pop().map(|phys| {
                self.cc_prf.allocate(phys);
                CcMapping {
                    phys,
                    prev: self.table.remap_cc(phys),
                }
            })
        } else {
            None
        };

        RenameOutcome::Renamed(RenamedEntry {
            pc: entry.pc,
            inst,
            src1,
            src2,
            data,
            cc_src,
            dest,
            base,
            cc,
            predicted_taken: entry.predicted_taken,
            next_pc: entry.next_pc,
            history: entry.history,
            fault: None,
        })
    }

    /// Reverts the renames of a squashed instruction and frees its registers.
    ///
    /// Must be called youngest first. Returns the freed general-purpose and
    /// condition-code tags.
    pub fn undo(
        &mut self,
        dest: Option<RegMapping>,
        base: Option<RegMapping>,
        cc: Option<CcMapping>,
    ) -> (Vec<PhysReg>, Option<CcReg>) {
        let mut freed = Vec::new();
        for m in [base, dest].into_iter().flatten() {
            let _ = self.table.remap(m.arch, m.prev);
            self.gpr_free.push(m.phys);
            freed.push(m.phys);
        }
        let freed_cc = cc.map(|m| {
            let _ = self.table.remap_cc(m.prev);
            self.cc_free.push(m.phys);
            m.phys
        });
        (freed, freed_cc)
    }

    /// Returns the mappings replaced by a committing instruction to the free lists.
    pub fn reclaim(
        &mut self,
        dest: Option<RegMapping>,
        base: Option<RegMapping>,
        cc: Option<CcMapping>,
    ) {
        for m in [dest, base].into_iter().flatten() {
            self.gpr_free.push(m.prev);
        }
        if let Some(m) = cc {
            self.cc_free.push(m.prev);
        }
    }

    /// Whether every register written by an instruction holds its result.
    pub fn results_valid(
        &self,
        dest: Option<RegMapping>,
        base: Option<RegMapping>,
        cc: Option<CcMapping>,
    ) -> bool {
        [dest, base]
            .into_iter()
            .flatten()
            .all(|m| self.prf.is_valid(m.phys))
            && cc.is_none_or(|m| self.cc_prf.is_valid(m.phys))
    }
}
