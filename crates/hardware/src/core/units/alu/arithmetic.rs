//! ALU arithmetic operations.
//!
//! Implements addition, subtraction and multiplication on 32-bit signed words.
//! Every operation wraps on overflow.

use crate::isa::opcode::Opcode;

/// Executes an integer arithmetic operation.
///
/// # Arguments
///
/// * `op`  - The opcode (must be an arithmetic variant).
/// * `a`   - First source value.
/// * `b`   - Second source value.
/// * `imm` - Literal operand for the `L` forms and `MOVC`.
///
/// # Returns
///
/// The 32-bit result. Returns `0` for non-arithmetic opcodes.
pub const fn execute(op: Opcode, a: i32, b: i32, imm: i32) -> i32 {
    match op {
        Opcode::Add => a.wrapping_add(b),
        Opcode::Sub => a.wrapping_sub(b),
        Opcode::Mul => a.wrapping_mul(b),
        Opcode::Addl => a.wrapping_add(imm),
        Opcode::Subl => a.wrapping_sub(imm),
        Opcode::Movc => imm,
        _ => 0,
    }
}
