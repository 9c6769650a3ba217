//! Code and data memory.
//!
//! Code memory is the immutable instruction array produced by the loader,
//! addressed by PC. Data memory is a flat array of signed 32-bit words indexed
//! directly by the effective address.

use crate::common::constants::pc_to_index;
use crate::isa::instruction::Instruction;

/// Immutable program storage.
#[derive(Clone, Debug, Default)]
pub struct CodeMemory {
    instructions: Vec<Instruction>,
}

impl CodeMemory {
    /// Wraps a decoded program.
    pub const fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Instruction at `pc`, or `None` when the PC lies outside the program.
    #[inline]
    pub fn fetch(&self, pc: u32) -> Option<&Instruction> {
        pc_to_index(pc).and_then(|i| self.instructions.get(i))
    }

    /// Number of instructions.
    pub const fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the program is empty.
    pub const fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// All instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

/// Word-addressed data memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataMemory {
    words: Vec<i32>,
}

impl DataMemory {
    /// Allocates `size` zeroed words.
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size],
        }
    }

    /// Number of words.
    pub const fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether memory has no words.
    pub const fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `addr` names a word of this memory.
    #[inline]
    pub fn contains(&self, addr: i32) -> bool {
        usize::try_from(addr).is_ok_and(|a| a < self.words.len())
    }

    /// Reads the word at `addr`.
    #[inline]
    pub fn read(&self, addr: i32) -> Option<i32> {
        usize::try_from(addr)
            .ok()
            .and_then(|a| self.words.get(a).copied())
    }

    /// Writes the word at `addr`, returning `false` when out of range.
    #[inline]
    pub fn write(&mut self, addr: i32, val: i32) -> bool {
        match usize::try_from(addr).ok().and_then(|a| self.words.get_mut(a)) {
            Some(slot) => {
                *slot = val;
                true
            }
            None => false,
        }
    }

    /// All words in address order.
    pub fn words(&self) -> &[i32] {
        &self.words
    }
}
