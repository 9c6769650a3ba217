//! Forwarding (result broadcast) bus.
//!
//! One slot per physical register tag. A result travels through the bus in
//! three steps:
//! 1. **Drive:** A functional unit completes and drives `(tag, data)`. The result is
//!    held in a pending buffer and becomes visible only at the cycle boundary
//!    ([`ForwardingBus::latch`]).
//! 2. **Tag broadcast:** In the following cycle the issue stage marks the slot
//!    `tag_broadcasted`; every waiting consumer captures the data and may be selected.
//! 3. **Data broadcast:** One cycle later the data is written into the physical register
//!    file, the register becomes valid and the slot is released.
//!
//! The tag is therefore visible one cycle before the register file holds the
//! data, which models wakeup ahead of the bypass.

use serde::Serialize;

use crate::common::reg::RegTag;
use crate::core::pipeline::prf::PhysRegFile;

/// State of one bus slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BusSlot<R, T> {
    /// Tag of the producing physical register.
    pub tag: R,
    /// Result value.
    pub data: T,
    /// Whether the slot currently carries a result.
    pub valid: bool,
    /// Consumers have been woken with this result.
    pub tag_broadcasted: bool,
    /// The result has been written into the register file.
    pub data_broadcasted: bool,
}

/// Result bus for one register pool.
#[derive(Clone, Debug)]
pub struct ForwardingBus<R, T> {
    slots: Vec<BusSlot<R, T>>,
    pending: Vec<(R, T)>,
}

impl<R: RegTag, T: Copy + Default> ForwardingBus<R, T> {
    /// Creates a bus with one slot per tag of a pool of `size` registers.
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size)
                .map(|i| BusSlot {
                    tag: R::from_index(i),
                    data: T::default(),
                    valid: false,
                    tag_broadcasted: false,
                    data_broadcasted: false,
                })
                .collect(),
            pending: Vec::new(),
        }
    }

    /// Drives a completed result. It becomes visible after the next [`latch`](Self::latch).
    pub fn drive(&mut self, tag: R, data: T) {
        self.pending.push((tag, data));
    }

    /// Moves results driven this cycle onto their slots (cycle boundary).
    pub fn latch(&mut self) {
        for (tag, data) in self.pending.drain(..) {
            self.slots[tag.index()] = BusSlot {
                tag,
                data,
                valid: true,
                tag_broadcasted: false,
                data_broadcasted: false,
            };
        }
    }

    /// Data phase: writes every tag-broadcast result into `prf` and frees its slot.
    ///
    /// Returns the tags that became valid.
    pub fn data_phase(&mut self, prf: &mut PhysRegFile<R, T>) -> Vec<R> {
        let mut written = Vec::new();
        for slot in &mut self.slots {
            if slot.valid && slot.tag_broadcasted {
                prf.write(slot.tag, slot.data);
                slot.data_broadcasted = true;
                slot.valid = false;
                written.push(slot.tag);
            }
        }
        written
    }

    /// Tag phase: marks every newly latched result as broadcast and returns them
    /// for consumer wakeup.
    pub fn tag_phase(&mut self) -> Vec<(R, T)> {
        let mut woken = Vec::new();
        for slot in &mut self.slots {
            if slot.valid && !slot.tag_broadcasted {
                slot.tag_broadcasted = true;
                woken.push((slot.tag, slot.data));
            }
        }
        woken
    }

    /// Data currently carried for `tag`, once its tag has been broadcast.
    pub fn lookup(&self, tag: R) -> Option<T> {
        let slot = &self.slots[tag.index()];
        (slot.valid && slot.tag_broadcasted).then_some(slot.data)
    }

    /// Drops pending and latched results whose tag satisfies `squashed`.
    pub fn purge(&mut self, squashed: impl Fn(R) -> bool) {
        self.pending.retain(|(tag, _)| !squashed(*tag));
        for slot in &mut self.slots {
            if slot.valid && squashed(slot.tag) {
                slot.valid = false;
                slot.tag_broadcasted = false;
            }
        }
    }

    /// Slots currently carrying a result.
    pub fn active_slots(&self) -> impl Iterator<Item = &BusSlot<R, T>> + '_ {
        self.slots.iter().filter(|s| s.valid)
    }

    /// Results driven this cycle and not yet latched.
    pub fn pending(&self) -> &[(R, T)] {
        &self.pending
    }
}
