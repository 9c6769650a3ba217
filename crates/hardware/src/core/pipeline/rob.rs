//! Reorder Buffer (ROB) for in-order commit.
//!
//! The ROB is a circular buffer that tracks in-flight instructions from dispatch
//! through commit. It provides:
//! 1. **Allocation:** Assigns unique, monotonically increasing tags that double as the
//!    dispatch sequence number used for oldest-first selection.
//! 2. **Completion:** Marks instructions without a register result (branches) as done.
//! 3. **In-order Commit:** Retires instructions from the head in program order.
//! 4. **Reclamation:** Records the previous rename mappings freed when an entry retires.
//! 5. **Flush:** Squashes speculative entries younger than a mispredicted branch.

use serde::Serialize;

use crate::common::error::Fault;
use crate::common::reg::{ArchReg, CcReg, PhysReg};
use crate::isa::instruction::Instruction;

/// Unique tag identifying an in-flight instruction.
///
/// Tags increase with dispatch order, so comparing two tags compares the age
/// of the instructions (smaller is older).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct RobTag(pub u64);

/// Lifecycle state of an ROB entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub enum RobState {
    /// Dispatched; result(s) not yet globally visible.
    #[default]
    Pending,
    /// Resolved by a unit that produces no register result, or needs no execution.
    Completed,
    /// Instruction faulted; the fault is raised when it reaches the head.
    Faulted,
}

/// A general-purpose rename performed by one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RegMapping {
    /// Renamed architectural register.
    pub arch: ArchReg,
    /// Newly allocated physical register.
    pub phys: PhysReg,
    /// Mapping replaced by this rename; freed when the entry commits.
    pub prev: PhysReg,
}

/// A condition-code rename performed by one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CcMapping {
    /// Newly allocated condition-code register.
    pub phys: CcReg,
    /// Mapping replaced by this rename; freed when the entry commits.
    pub prev: CcReg,
}

/// A single entry in the Reorder Buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RobEntry {
    /// Unique tag for this entry.
    pub tag: RobTag,
    /// Program counter of the instruction.
    pub pc: u32,
    /// The instruction itself.
    pub inst: Instruction,
    /// Destination rename (result register).
    pub dest: Option<RegMapping>,
    /// Base-register rename of `LOADP`/`STOREP`.
    pub base: Option<RegMapping>,
    /// Condition-code rename.
    pub cc: Option<CcMapping>,
    /// Load/store queue slot of memory operations.
    pub lsq_index: Option<usize>,
    /// Current lifecycle state.
    pub state: RobState,
    /// Fault raised when this entry reaches the head.
    pub fault: Option<Fault>,
}

impl RobEntry {
    /// Creates a pending entry with no renames; the tag is assigned on allocation.
    pub const fn new(pc: u32, inst: Instruction) -> Self {
        Self {
            tag: RobTag(0),
            pc,
            inst,
            dest: None,
            base: None,
            cc: None,
            lsq_index: None,
            state: RobState::Pending,
            fault: None,
        }
    }
}

/// Reorder Buffer: circular buffer for in-order commit.
#[derive(Debug)]
pub struct Rob {
    /// Fixed-size slot array; `None` marks a free slot.
    entries: Vec<Option<RobEntry>>,
    /// Index of the oldest entry (commit point).
    head: usize,
    /// Index where the next entry will be allocated.
    tail: usize,
    /// Number of occupied entries.
    count: usize,
    /// Monotonically increasing tag counter.
    next_tag: u64,
}

impl Rob {
    /// Creates a new ROB with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
            head: 0,
            tail: 0,
            count: 0,
            next_tag: 1,
        }
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the ROB is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the ROB is full.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Tag the next allocation will receive.
    #[inline]
    pub const fn next_tag(&self) -> RobTag {
        RobTag(self.next_tag)
    }

    /// Allocates a new ROB entry at the tail. Returns `None` if the ROB is full.
    pub fn allocate(&mut self, mut entry: RobEntry) -> Option<RobTag> {
        if self.is_full() {
            return None;
        }

        let tag = RobTag(self.next_tag);
        self.next_tag += 1;
        entry.tag = tag;

        self.entries[self.tail] = Some(entry);
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Some(tag)
    }

    /// Marks an entry as Completed.
    pub fn complete(&mut self, tag: RobTag) {
        if let Some(entry) = self.find_entry_mut(tag) {
            if entry.state == RobState::Pending {
                entry.state = RobState::Completed;
            }
        }
    }

    /// Marks an entry as Faulted.
    pub fn fault(&mut self, tag: RobTag, fault: Fault) {
        if let Some(entry) = self.find_entry_mut(tag) {
            entry.state = RobState::Faulted;
            entry.fault = Some(fault);
        }
    }

    /// Returns a reference to the head entry (oldest), if the ROB is non-empty.
    pub fn peek_head(&self) -> Option<&RobEntry> {
        if self.count == 0 {
            None
        } else {
            self.entries[self.head].as_ref()
        }
    }

    /// Removes and returns the head entry.
    ///
    /// Readiness is decided by the commit stage, which knows the physical
    /// register file and load/store queue state.
    pub fn retire_head(&mut self) -> Option<RobEntry> {
        if self.count == 0 {
            return None;
        }
        let entry = self.entries[self.head].take();
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        entry
    }

    /// Removes every entry younger than `tag` and returns them youngest first.
    ///
    /// The entry with `tag` itself is kept. Returning youngest first lets the
    /// caller undo rename-table updates in reverse allocation order.
    pub fn flush_after(&mut self, tag: RobTag) -> Vec<RobEntry> {
        let mut squashed = Vec::new();
        while self.count > 0 {
            let last = (self.tail + self.entries.len() - 1) % self.entries.len();
            match &self.entries[last] {
                Some(entry) if entry.tag > tag => {}
                _ => break,
            }
            if let Some(entry) = self.entries[last].take() {
                squashed.push(entry);
            }
            self.tail = last;
            self.count -= 1;
        }
        squashed
    }

    /// Finds a mutable reference to the entry with the given tag.
    fn find_entry_mut(&mut self, tag: RobTag) -> Option<&mut RobEntry> {
        self.entries
            .iter_mut()
            .flatten()
            .find(|e| e.tag == tag)
    }

    /// Iterates over occupied entries from head (oldest) to tail.
    pub fn iter(&self) -> impl Iterator<Item = &RobEntry> + '_ {
        let cap = self.entries.len();
        (0..self.count).filter_map(move |i| self.entries[(self.head + i) % cap].as_ref())
    }
}
