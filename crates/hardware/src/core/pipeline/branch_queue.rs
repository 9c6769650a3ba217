//! Branch Queue.
//!
//! Holds the prediction made at fetch for every in-flight control instruction
//! so the branch unit can tell whether the fetched path was correct.

use std::collections::VecDeque;

use serde::Serialize;

use crate::common::reg::CcReg;
use crate::core::pipeline::rob::RobTag;
use crate::core::units::bru::btb::BranchHistory;
use crate::isa::opcode::Opcode;

/// One in-flight control instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BqEntry {
    /// ROB tag of the branch.
    pub tag: RobTag,
    /// Program counter.
    pub pc: u32,
    /// Branch opcode.
    pub opcode: Opcode,
    /// Whether fetch followed the taken path.
    pub predicted_taken: bool,
    /// PC fetched after the branch.
    pub predicted_next: u32,
    /// BTB history observed at fetch.
    pub history: Option<BranchHistory>,
    /// Condition-code register the branch reads.
    pub cc_tag: Option<CcReg>,
    /// Actual outcome once resolved.
    pub resolved: Option<bool>,
}

/// FIFO of in-flight control instructions.
#[derive(Debug)]
pub struct BranchQueue {
    entries: VecDeque<BqEntry>,
    capacity: usize,
}

impl BranchQueue {
    /// Creates an empty queue.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Appends an entry; returns it back if the queue is full.
    pub fn push(&mut self, entry: BqEntry) -> Result<(), BqEntry> {
        if self.is_full() {
            return Err(entry);
        }
        self.entries.push_back(entry);
        Ok(())
    }

    /// Entry of the branch with `tag`.
    pub fn find(&self, tag: RobTag) -> Option<&BqEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Records the actual outcome of `tag`.
    pub fn resolve(&mut self, tag: RobTag, taken: bool) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.tag == tag) {
            e.resolved = Some(taken);
        }
    }

    /// Removes the oldest entry if it belongs to `tag`.
    pub fn retire(&mut self, tag: RobTag) -> Option<BqEntry> {
        if self.entries.front().is_some_and(|e| e.tag == tag) {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Drops entries younger than `tag`; returns how many were removed.
    pub fn flush_after(&mut self, tag: RobTag) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.tag <= tag);
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BqEntry> + '_ {
        self.entries.iter()
    }
}
