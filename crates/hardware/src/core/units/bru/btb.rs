//! Branch Target Buffer (BTB).
//!
//! The BTB is a small fully associative table holding, for each conditional
//! branch seen so far, its target address and a 2-bit outcome history. Fetch
//! consults it to predict the next PC; decode allocates entries for branches
//! seen for the first time; the branch unit updates the history when the
//! branch resolves.
//!
//! When the table is full, the oldest entry is evicted.

use std::collections::VecDeque;

use serde::Serialize;

/// Two-bit outcome history of a branch.
///
/// The first bit is the outcome before last, the second the last outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BranchHistory {
    /// `{1,1}`
    StronglyTaken,
    /// `{1,0}`
    WeaklyTaken,
    /// `{0,1}`
    WeaklyNotTaken,
    /// `{0,0}`
    StronglyNotTaken,
}

impl BranchHistory {
    /// Every state.
    pub const ALL: [Self; 4] = [
        Self::StronglyTaken,
        Self::WeaklyTaken,
        Self::WeaklyNotTaken,
        Self::StronglyNotTaken,
    ];

    /// Initial history for a newly seen branch.
    pub const fn initial(taken_bias: bool) -> Self {
        if taken_bias {
            Self::StronglyTaken
        } else {
            Self::StronglyNotTaken
        }
    }

    /// Whether fetch should follow the taken path.
    pub const fn predicts_taken(self) -> bool {
        matches!(self, Self::StronglyTaken | Self::WeaklyTaken)
    }

    /// History after observing an outcome.
    pub const fn next(self, taken: bool) -> Self {
        match (self, taken) {
            (Self::StronglyTaken | Self::WeaklyTaken, true) => Self::StronglyTaken,
            (Self::StronglyTaken, false) => Self::WeaklyTaken,
            (Self::WeaklyTaken, false) => Self::WeaklyNotTaken,
            (Self::WeaklyNotTaken, true) => Self::WeaklyTaken,
            (Self::WeaklyNotTaken | Self::StronglyNotTaken, false) => Self::StronglyNotTaken,
            (Self::StronglyNotTaken, true) => Self::WeaklyNotTaken,
        }
    }

    /// The two history bits.
    pub const fn bits(self) -> [u8; 2] {
        match self {
            Self::StronglyTaken => [1, 1],
            Self::WeaklyTaken => [1, 0],
            Self::WeaklyNotTaken => [0, 1],
            Self::StronglyNotTaken => [0, 0],
        }
    }
}

/// An entry in the Branch Target Buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BtbEntry {
    /// PC of the branch.
    pub pc: u32,
    /// Outcome history.
    pub history: BranchHistory,
    /// Taken-path target.
    pub target: u32,
}

/// Branch Target Buffer structure.
#[derive(Debug)]
pub struct Btb {
    /// Entries, oldest first.
    table: VecDeque<BtbEntry>,
    /// Maximum number of entries.
    capacity: usize,
}

impl Btb {
    /// Creates an empty Branch Target Buffer.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The number of entries before eviction starts.
    pub fn new(capacity: usize) -> Self {
        Self {
            table: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Looks up the entry for a branch.
    ///
    /// # Arguments
    ///
    /// * `pc` - The program counter of the branch.
    ///
    /// # Returns
    ///
    /// The entry if the branch has been seen and not evicted.
    pub fn lookup(&self, pc: u32) -> Option<BtbEntry> {
        self.table.iter().copied().find(|e| e.pc == pc)
    }

    /// Whether `pc` has an entry.
    pub fn contains(&self, pc: u32) -> bool {
        self.table.iter().any(|e| e.pc == pc)
    }

    /// Allocates an entry for a newly seen branch, evicting the oldest entry
    /// when the table is full.
    ///
    /// An existing entry for `pc` is replaced in place.
    pub fn insert(&mut self, pc: u32, history: BranchHistory, target: u32) {
        let entry = BtbEntry {
            pc,
            history,
            target,
        };
        if let Some(e) = self.table.iter_mut().find(|e| e.pc == pc) {
            *e = entry;
            return;
        }
        if self.table.len() >= self.capacity {
            let _ = self.table.pop_front();
        }
        self.table.push_back(entry);
    }

    /// Advances the history of `pc` with a resolved outcome.
    ///
    /// Does nothing if the entry has been evicted.
    pub fn update(&mut self, pc: u32, taken: bool) {
        if let Some(e) = self.table.iter_mut().find(|e| e.pc == pc) {
            e.history = e.history.next(taken);
        }
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &BtbEntry> + '_ {
        self.table.iter()
    }
}
