//! Memory Access Unit (MAU).
//!
//! Performs one data memory operation at a time with a fixed latency. Loads
//! are started from the load/store queue as soon as their value is available;
//! stores are started by commit when they reach the reorder buffer head.

use serde::Serialize;

use crate::common::reg::PhysReg;
use crate::core::pipeline::rob::RobTag;

/// Operation held by the MAU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MauOp {
    /// Read a word for a load.
    Load {
        /// ROB tag of the load.
        tag: RobTag,
        /// LSQ slot of the load.
        lsq_index: usize,
        /// Effective address.
        addr: i32,
        /// Destination physical register.
        dest: Option<PhysReg>,
        /// Value supplied by an older store, if any.
        forwarded: Option<i32>,
    },
    /// Write a word for a committing store.
    Store {
        /// ROB tag of the store.
        tag: RobTag,
        /// LSQ slot of the store.
        lsq_index: usize,
        /// Effective address.
        addr: i32,
        /// Value to write.
        data: i32,
    },
}

impl MauOp {
    /// ROB tag of the operation.
    pub const fn tag(&self) -> RobTag {
        match self {
            Self::Load { tag, .. } | Self::Store { tag, .. } => *tag,
        }
    }
}

/// Memory Access Unit.
#[derive(Clone, Debug, Serialize)]
pub struct Mau {
    op: Option<MauOp>,
    elapsed: u32,
    latency: u32,
}

impl Mau {
    /// Creates an idle unit with the given latency in cycles.
    pub const fn new(latency: u32) -> Self {
        Self {
            op: None,
            elapsed: 0,
            latency,
        }
    }

    /// Whether no operation is in progress.
    #[inline]
    pub const fn is_idle(&self) -> bool {
        self.op.is_none()
    }

    /// Starts an operation; it completes `latency` ticks later.
    pub fn start(&mut self, op: MauOp) {
        debug_assert!(self.op.is_none(), "MAU already busy");
        self.op = Some(op);
        self.elapsed = 0;
    }

    /// Advances one cycle; returns the operation on its completing cycle.
    pub fn tick(&mut self) -> Option<MauOp> {
        if self.op.is_none() {
            return None;
        }
        self.elapsed += 1;
        if self.elapsed >= self.latency {
            self.elapsed = 0;
            self.op.take()
        } else {
            None
        }
    }

    /// Operation in progress and the cycles spent on it.
    pub const fn current(&self) -> Option<(MauOp, u32)> {
        match self.op {
            Some(op) => Some((op, self.elapsed)),
            None => None,
        }
    }

    /// Cancels the operation in progress if it belongs to an instruction
    /// younger than `tag`.
    pub fn cancel_after(&mut self, tag: RobTag) -> bool {
        if self.op.is_some_and(|op| op.tag() > tag) {
            self.op = None;
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}
