//! Register Identifiers.
//!
//! Strongly typed indices for the three register namespaces of the machine:
//! 1. **Architectural:** `R0`-`R15` as written in programs.
//! 2. **Physical:** General-purpose rename registers held in the physical register file.
//! 3. **Condition code:** Rename registers for the zero/positive/negative flags.
//!
//! Keeping them as distinct types prevents a physical tag from being used
//! where an architectural index is expected (and vice versa).

use std::fmt;

use serde::Serialize;

use super::constants::ARCH_REG_COUNT;

/// Architectural register index (`R0`-`R15`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ArchReg(u8);

impl ArchReg {
    /// Creates an architectural register index, returning `None` when out of range.
    pub const fn new(index: usize) -> Option<Self> {
        if index < ARCH_REG_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Returns the register number as an array index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterates over every architectural register in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..ARCH_REG_COUNT as u8).map(Self)
    }
}

impl fmt::Display for ArchReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Common behaviour of rename-register tags.
///
/// Implemented by [`PhysReg`] and [`CcReg`] so that the physical register
/// file, free lists and forwarding buses can be shared between both pools.
pub trait RegTag: Copy + Eq + fmt::Debug {
    /// Builds a tag from a pool index.
    fn from_index(index: usize) -> Self;
    /// Returns the pool index of this tag.
    fn index(self) -> usize;
}

/// General-purpose physical register tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PhysReg(pub u16);

impl RegTag for PhysReg {
    #[inline]
    fn from_index(index: usize) -> Self {
        Self(index as u16)
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PhysReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Condition-code physical register tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CcReg(pub u16);

impl RegTag for CcReg {
    #[inline]
    fn from_index(index: usize) -> Self {
        Self(index as u16)
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CcReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}
