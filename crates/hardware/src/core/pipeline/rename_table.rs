//! Rename Table and Free Lists.
//!
//! The rename table maps each architectural register to the physical register
//! holding its newest value, plus one slot for the current condition-code
//! mapping. Free lists are FIFO pools of unallocated tags.
//!
//! Ownership rules:
//! - Rename pops a tag and records the outgoing mapping in the ROB entry.
//! - Commit pushes that *previous* mapping back, never the new one.
//! - Squash recovery restores the previous mapping and pushes the new one back.

use std::collections::VecDeque;

use serde::Serialize;

use crate::common::constants::ARCH_REG_COUNT;
use crate::common::reg::{ArchReg, CcReg, PhysReg, RegTag};

/// Architectural to physical register mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenameTable {
    gpr: [PhysReg; ARCH_REG_COUNT],
    cc: CcReg,
}

impl Default for RenameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RenameTable {
    /// Identity mapping: `Ri -> Pi` and the condition code to `C0`.
    pub fn new() -> Self {
        let mut gpr = [PhysReg(0); ARCH_REG_COUNT];
        for (i, slot) in gpr.iter_mut().enumerate() {
            *slot = PhysReg::from_index(i);
        }
        Self { gpr, cc: CcReg(0) }
    }

    /// Physical register currently holding `reg`.
    #[inline]
    pub const fn lookup(&self, reg: ArchReg) -> PhysReg {
        self.gpr[reg.index()]
    }

    /// Points `reg` at `phys` and returns the mapping it replaced.
    #[inline]
    pub const fn remap(&mut self, reg: ArchReg, phys: PhysReg) -> PhysReg {
        let prev = self.gpr[reg.index()];
        self.gpr[reg.index()] = phys;
        prev
    }

    /// Current condition-code register.
    #[inline]
    pub const fn cc(&self) -> CcReg {
        self.cc
    }

    /// Points the condition code at `phys` and returns the mapping it replaced.
    #[inline]
    pub const fn remap_cc(&mut self, phys: CcReg) -> CcReg {
        let prev = self.cc;
        self.cc = phys;
        prev
    }

    /// Iterates `(architectural, physical)` pairs in register order.
    pub fn mappings(&self) -> impl Iterator<Item = (ArchReg, PhysReg)> + '_ {
        ArchReg::all().map(|r| (r, self.gpr[r.index()]))
    }
}

/// FIFO pool of unallocated rename tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreeList<R> {
    tags: VecDeque<R>,
}

impl<R: RegTag> FreeList<R> {
    /// Pool holding tags `first..total` in ascending order.
    pub fn new(first: usize, total: usize) -> Self {
        Self {
            tags: (first..total).map(R::from_index).collect(),
        }
    }

    /// Number of free tags.
    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no tag is free.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Takes the oldest free tag.
    #[inline]
    pub fn pop(&mut self) -> Option<R> {
        self.tags.pop_front()
    }

    /// Returns a tag to the pool.
    #[inline]
    pub fn push(&mut self, tag: R) {
        debug_assert!(!self.tags.contains(&tag), "{tag:?} freed twice");
        self.tags.push_back(tag);
    }

    /// Whether `tag` is currently free.
    pub fn contains(&self, tag: R) -> bool {
        self.tags.contains(&tag)
    }

    /// Free tags in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = R> + '_ {
        self.tags.iter().copied()
    }
}
