//! Issue-side functional unit slots.
//!
//! The integer, address and branch units complete in the cycle after select,
//! so each is a single holding slot. The multiply unit counts its latency down
//! internally and stays busy until the result is driven.

use serde::Serialize;

use crate::core::pipeline::issue_queue::IqEntry;
use crate::core::pipeline::rob::RobTag;

/// A single-cycle unit.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FuSlot {
    entry: Option<IqEntry>,
}

impl FuSlot {
    /// Whether the unit can take an instruction this cycle.
    #[inline]
    pub const fn can_accept(&self) -> bool {
        self.entry.is_none()
    }

    /// Hands an instruction to the unit; it executes next cycle.
    pub fn accept(&mut self, entry: IqEntry) {
        debug_assert!(self.entry.is_none(), "unit already busy");
        self.entry = Some(entry);
    }

    /// Takes the instruction to execute this cycle.
    pub const fn take(&mut self) -> Option<IqEntry> {
        self.entry.take()
    }

    /// Instruction currently held.
    pub const fn current(&self) -> Option<&IqEntry> {
        self.entry.as_ref()
    }

    /// Drops the held instruction if it is younger than `tag`.
    pub fn flush_after(&mut self, tag: RobTag) -> bool {
        if self.entry.as_ref().is_some_and(|e| e.tag > tag) {
            self.entry = None;
            true
        } else {
            false
        }
    }
}

/// Multi-cycle multiply unit.
#[derive(Clone, Debug, Serialize)]
pub struct MulUnit {
    entry: Option<IqEntry>,
    remaining: u32,
    latency: u32,
}

impl MulUnit {
    /// Creates an idle unit with the given latency in cycles.
    pub const fn new(latency: u32) -> Self {
        Self {
            entry: None,
            remaining: 0,
            latency,
        }
    }

    /// Whether the unit is idle.
    #[inline]
    pub const fn can_accept(&self) -> bool {
        self.entry.is_none()
    }

    /// Starts a multiply.
    pub fn accept(&mut self, entry: IqEntry) {
        debug_assert!(self.entry.is_none(), "multiplier already busy");
        self.entry = Some(entry);
        self.remaining = self.latency;
    }

    /// Advances one cycle; returns the instruction on its completing cycle.
    pub fn tick(&mut self) -> Option<IqEntry> {
        if self.entry.is_none() {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.entry.take()
        } else {
            None
        }
    }

    /// Instruction in flight and the cycles left.
    pub fn current(&self) -> Option<(&IqEntry, u32)> {
        self.entry.as_ref().map(|e| (e, self.remaining))
    }

    /// Drops the instruction in flight if it is younger than `tag`.
    pub fn flush_after(&mut self, tag: RobTag) -> bool {
        if self.entry.as_ref().is_some_and(|e| e.tag > tag) {
            self.entry = None;
            self.remaining = 0;
            true
        } else {
            false
        }
    }
}
