//! Load/Store Queue.
//!
//! A ring buffer of memory operations in program order. The LSQ provides:
//! 1. **Ordering:** A load may access memory only once every older store has a
//!    known address.
//! 2. **Store-to-load forwarding:** The youngest older store to the same address
//!    supplies the load's value if its data is known.
//! 3. **Store data capture:** Stores snoop the forwarding bus for their data register.
//! 4. **Commit:** Stores write memory only when they reach the ROB head.

use serde::Serialize;

use crate::common::reg::PhysReg;
use crate::core::pipeline::rob::RobTag;

/// Load or store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MemKind {
    /// `LOAD`/`LOADP`
    Load,
    /// `STORE`/`STOREP`
    Store,
}

/// One LSQ entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LsqEntry {
    /// ROB tag of the owning instruction.
    pub tag: RobTag,
    /// Program counter.
    pub pc: u32,
    /// Load or store.
    pub kind: MemKind,
    /// Effective address, once computed by the AFU.
    pub addr: Option<i32>,
    /// Store: data to write. Load: value read or forwarded.
    pub data: Option<i32>,
    /// Store: physical register the data comes from.
    pub data_tag: Option<PhysReg>,
    /// Load: destination physical register.
    pub dest: Option<PhysReg>,
    /// Handed to the memory access unit.
    pub issued: bool,
    /// Address was out of range; the ROB entry carries the fault.
    pub faulted: bool,
}

impl LsqEntry {
    /// Entry for a load writing `dest`.
    pub const fn load(tag: RobTag, pc: u32, dest: Option<PhysReg>) -> Self {
        Self {
            tag,
            pc,
            kind: MemKind::Load,
            addr: None,
            data: None,
            data_tag: None,
            dest,
            issued: false,
            faulted: false,
        }
    }

    /// Entry for a store whose data comes from `data_tag`.
    pub const fn store(tag: RobTag, pc: u32, data_tag: PhysReg, data: Option<i32>) -> Self {
        Self {
            tag,
            pc,
            kind: MemKind::Store,
            addr: None,
            data,
            data_tag: Some(data_tag),
            dest: None,
            issued: false,
            faulted: false,
        }
    }
}

/// How a load can obtain its value this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadResolution {
    /// An older store blocks the load (unknown address, or matching store without data).
    Wait,
    /// The youngest older store to the same address supplies this value.
    Forward(i32),
    /// No older store matches; read data memory.
    Memory,
}

/// Load/Store Queue ring buffer.
#[derive(Debug)]
pub struct Lsq {
    entries: Vec<Option<LsqEntry>>,
    head: usize,
    tail: usize,
    count: usize,
}

impl Lsq {
    /// Creates an empty queue with `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Number of occupied entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether the queue is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether the queue is full.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Appends at the tail; returns the slot index, or `None` if full.
    pub fn allocate(&mut self, entry: LsqEntry) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let idx = self.tail;
        self.entries[idx] = Some(entry);
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Some(idx)
    }

    /// Entry at slot `idx`.
    pub fn get(&self, idx: usize) -> Option<&LsqEntry> {
        self.entries.get(idx).and_then(Option::as_ref)
    }

    /// Mutable entry at slot `idx`.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut LsqEntry> {
        self.entries.get_mut(idx).and_then(Option::as_mut)
    }

    /// Slot index of the oldest entry.
    pub const fn head_index(&self) -> Option<usize> {
        if self.count == 0 { None } else { Some(self.head) }
    }

    /// Oldest entry.
    pub fn head(&self) -> Option<&LsqEntry> {
        self.head_index().and_then(|i| self.get(i))
    }

    /// Removes the oldest entry.
    pub fn retire_head(&mut self) -> Option<LsqEntry> {
        if self.count == 0 {
            return None;
        }
        let entry = self.entries[self.head].take();
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        entry
    }

    /// Records the effective address computed by the AFU.
    pub fn set_address(&mut self, idx: usize, addr: i32, faulted: bool) {
        if let Some(e) = self.get_mut(idx) {
            e.addr = Some(addr);
            e.faulted = faulted;
        }
    }

    /// Captures a broadcast value in every store waiting on `tag` for its data.
    pub fn capture_store_data(&mut self, tag: PhysReg, value: i32) {
        for e in self.entries.iter_mut().flatten() {
            if e.kind == MemKind::Store && e.data.is_none() && e.data_tag == Some(tag) {
                e.data = Some(value);
            }
        }
    }

    /// Slot indices from head (oldest) to tail.
    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        let cap = self.entries.len();
        (0..self.count).map(move |i| (self.head + i) % cap)
    }

    /// Determines where the load in slot `idx` can take its value from.
    pub fn load_resolution(&self, idx: usize) -> LoadResolution {
        let Some(load) = self.get(idx) else {
            return LoadResolution::Wait;
        };
        let Some(addr) = load.addr else {
            return LoadResolution::Wait;
        };

        let mut forwarded = None;
        for i in self.indices() {
            if i == idx {
                break;
            }
            let Some(older) = self.get(i) else { continue };
            if older.kind != MemKind::Store || older.faulted {
                continue;
            }
            match older.addr {
                None => return LoadResolution::Wait,
                Some(a) if a == addr => forwarded = Some(older.data),
                Some(_) => {}
            }
        }

        match forwarded {
            Some(Some(v)) => LoadResolution::Forward(v),
            Some(None) => LoadResolution::Wait,
            None => LoadResolution::Memory,
        }
    }

    /// Oldest load with a valid address that has not been issued to the MAU
    /// and whose value is available.
    pub fn next_ready_load(&self) -> Option<(usize, LoadResolution)> {
        self.indices().find_map(|i| {
            let e = self.get(i)?;
            if e.kind != MemKind::Load || e.issued || e.faulted || e.addr.is_none() {
                return None;
            }
            match self.load_resolution(i) {
                LoadResolution::Wait => None,
                r => Some((i, r)),
            }
        })
    }

    /// Removes entries younger than `tag`; returns how many were removed.
    pub fn flush_after(&mut self, tag: RobTag) -> usize {
        let mut removed = 0;
        while self.count > 0 {
            let last = (self.tail + self.entries.len() - 1) % self.entries.len();
            if !self.entries[last].as_ref().is_some_and(|e| e.tag > tag) {
                break;
            }
            self.entries[last] = None;
            self.tail = last;
            self.count -= 1;
            removed += 1;
        }
        removed
    }

    /// Occupied entries from head to tail, with their slot index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LsqEntry)> + '_ {
        self.indices().filter_map(|i| self.get(i).map(|e| (i, e)))
    }
}
