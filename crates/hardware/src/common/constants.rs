//! Global Machine Constants.
//!
//! This module defines the fixed architectural parameters of the APEX machine. It includes:
//! 1. **Code Layout:** Base address and instruction width of code memory.
//! 2. **Register Constants:** Number of architectural registers.
//! 3. **Memory Constants:** Auto-increment stride for `LOADP`/`STOREP`.

/// Address of the first instruction in code memory.
pub const CODE_BASE: u32 = 4000;

/// Size of one instruction in bytes; the PC advances by this amount.
pub const INSTRUCTION_BYTES: u32 = 4;

/// Number of architectural general-purpose registers (R0-R15).
pub const ARCH_REG_COUNT: usize = 16;

/// Amount added to the base register by `LOADP` and `STOREP`.
pub const AUTO_INCREMENT: i32 = 4;

/// Converts a PC into an index into code memory.
///
/// Returns `None` for addresses below [`CODE_BASE`] or not aligned to
/// [`INSTRUCTION_BYTES`].
#[inline]
pub const fn pc_to_index(pc: u32) -> Option<usize> {
    if pc < CODE_BASE || (pc - CODE_BASE) % INSTRUCTION_BYTES != 0 {
        None
    } else {
        Some(((pc - CODE_BASE) / INSTRUCTION_BYTES) as usize)
    }
}

/// Converts a code memory index into its PC.
#[inline]
pub const fn index_to_pc(index: usize) -> u32 {
    CODE_BASE + (index as u32) * INSTRUCTION_BYTES
}
