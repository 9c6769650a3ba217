//! Issue Queue with wakeup and oldest-first select.
//!
//! Entries wait here between dispatch and execution. An entry is ready when
//! every source operand it names has captured a value. Wakeup is driven by the
//! tag phase of the forwarding buses; select picks, per functional unit class,
//! the ready entry with the smallest ROB tag.

use serde::Serialize;

use crate::common::reg::{CcReg, PhysReg};
use crate::core::pipeline::rob::RobTag;
use crate::isa::flags::ConditionCode;
use crate::isa::opcode::{FuClass, Opcode};

/// A general-purpose source operand: producer tag and captured value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Operand {
    /// Physical register the value comes from.
    pub tag: PhysReg,
    /// Captured value, `None` until the producer broadcasts.
    pub value: Option<i32>,
}

impl Operand {
    /// Operand waiting on `tag`.
    pub const fn waiting(tag: PhysReg) -> Self {
        Self { tag, value: None }
    }

    /// Whether the value has been captured.
    #[inline]
    pub const fn is_ready(&self) -> bool {
        self.value.is_some()
    }
}

/// A condition-code source operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CcOperand {
    /// Condition-code register the flags come from.
    pub tag: CcReg,
    /// Captured flags.
    pub value: Option<ConditionCode>,
}

impl CcOperand {
    /// Whether the flags have been captured.
    #[inline]
    pub const fn is_ready(&self) -> bool {
        self.value.is_some()
    }
}

/// Where the primary result of an issued entry goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum IqDest {
    /// No register result (compare, conditional branch, `JUMP`).
    None,
    /// Driven on the general-purpose bus.
    Reg(PhysReg),
    /// Effective address written into an LSQ slot.
    Lsq(usize),
}

/// One issue queue entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IqEntry {
    /// ROB tag; smaller is older.
    pub tag: RobTag,
    /// Program counter.
    pub pc: u32,
    /// Unit class this entry issues to.
    pub class: FuClass,
    /// Operation.
    pub opcode: Opcode,
    /// First source operand.
    pub src1: Option<Operand>,
    /// Second source operand.
    pub src2: Option<Operand>,
    /// Condition-code source (conditional branches).
    pub cc_src: Option<CcOperand>,
    /// Literal operand.
    pub imm: i32,
    /// Primary result destination.
    pub dest: IqDest,
    /// Condition-code destination.
    pub cc_dest: Option<CcReg>,
    /// Auto-increment base destination (`LOADP`/`STOREP`).
    pub base_dest: Option<PhysReg>,
}

impl IqEntry {
    /// Whether every named source has captured its value.
    pub fn is_ready(&self) -> bool {
        self.src1.is_none_or(|o| o.is_ready())
            && self.src2.is_none_or(|o| o.is_ready())
            && self.cc_src.is_none_or(|o| o.is_ready())
    }

    /// First source value (zero when the opcode has none).
    #[inline]
    pub fn a(&self) -> i32 {
        self.src1.and_then(|o| o.value).unwrap_or(0)
    }

    /// Second source value (zero when the opcode has none).
    #[inline]
    pub fn b(&self) -> i32 {
        self.src2.and_then(|o| o.value).unwrap_or(0)
    }

    /// Captured condition code (cleared flags when the opcode reads none).
    #[inline]
    pub fn cc(&self) -> ConditionCode {
        self.cc_src.and_then(|o| o.value).unwrap_or_default()
    }
}

/// Issue queue: fixed slots, unordered storage, age from the ROB tag.
#[derive(Debug)]
pub struct IssueQueue {
    slots: Vec<Option<IqEntry>>,
}

impl IssueQueue {
    /// Creates an empty queue with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Inserts into the first free slot; returns the entry back if full.
    pub fn insert(&mut self, entry: IqEntry) -> Result<(), IqEntry> {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(entry);
                Ok(())
            }
            None => Err(entry),
        }
    }

    /// Captures a general-purpose result in every operand waiting on `tag`.
    pub fn wakeup(&mut self, tag: PhysReg, value: i32) {
        for entry in self.slots.iter_mut().flatten() {
            for op in [&mut entry.src1, &mut entry.src2].into_iter().flatten() {
                if op.tag == tag && op.value.is_none() {
                    op.value = Some(value);
                }
            }
        }
    }

    /// Captures a condition-code result in every operand waiting on `tag`.
    pub fn wakeup_cc(&mut self, tag: CcReg, value: ConditionCode) {
        for entry in self.slots.iter_mut().flatten() {
            if let Some(op) = entry.cc_src.as_mut() {
                if op.tag == tag && op.value.is_none() {
                    op.value = Some(value);
                }
            }
        }
    }

    /// Removes and returns the oldest ready entry of `class`.
    pub fn select(&mut self, class: FuClass) -> Option<IqEntry> {
        let idx = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (i, e)))
            .filter(|(_, e)| e.class == class && e.is_ready())
            .min_by_key(|(_, e)| e.tag)
            .map(|(i, _)| i)?;
        self.slots[idx].take()
    }

    /// Drops every entry younger than `tag`; returns how many were removed.
    pub fn flush_after(&mut self, tag: RobTag) -> usize {
        let mut removed = 0;
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|e| e.tag > tag) {
                *slot = None;
                removed += 1;
            }
        }
        removed
    }

    /// Occupied entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &IqEntry> + '_ {
        self.slots.iter().flatten()
    }
}
