//! Physical Register File.
//!
//! A pool of `(value, valid)` pairs indexed by a rename tag. The same structure
//! backs both the general-purpose pool (`PhysRegFile<PhysReg, i32>`) and the
//! condition-code pool (`PhysRegFile<CcReg, ConditionCode>`).
//!
//! A register is invalidated when rename allocates it and becomes valid again
//! only through [`PhysRegFile::write`], which the forwarding bus calls during
//! its data phase.

use std::marker::PhantomData;

use serde::Serialize;

use crate::common::reg::RegTag;

/// One physical register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PhysEntry<T> {
    /// Last value written.
    pub value: T,
    /// Whether `value` is the result of the register's current producer.
    pub valid: bool,
}

/// Physical register pool.
#[derive(Clone, Debug)]
pub struct PhysRegFile<R, T> {
    entries: Vec<PhysEntry<T>>,
    _tag: PhantomData<R>,
}

impl<R: RegTag, T: Copy + Default> PhysRegFile<R, T> {
    /// Creates `size` registers holding the default value, all invalid.
    pub fn new(size: usize) -> Self {
        Self {
            entries: vec![PhysEntry::default(); size],
            _tag: PhantomData,
        }
    }

    /// Number of registers in the pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of `tag` if it is valid.
    #[inline]
    pub fn read(&self, tag: R) -> Option<T> {
        let e = self.entries[tag.index()];
        e.valid.then_some(e.value)
    }

    /// Whether `tag` currently holds its producer's result.
    #[inline]
    pub fn is_valid(&self, tag: R) -> bool {
        self.entries[tag.index()].valid
    }

    /// Raw value of `tag`, valid or not.
    #[inline]
    pub fn value(&self, tag: R) -> T {
        self.entries[tag.index()].value
    }

    /// Invalidates `tag` for a new producer.
    #[inline]
    pub fn allocate(&mut self, tag: R) {
        self.entries[tag.index()].valid = false;
    }

    /// Writes a result and marks the register valid.
    #[inline]
    pub fn write(&mut self, tag: R, value: T) {
        self.entries[tag.index()] = PhysEntry { value, valid: true };
    }

    /// All registers in index order.
    pub fn entries(&self) -> &[PhysEntry<T>] {
        &self.entries
    }
}
