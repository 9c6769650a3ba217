//! ALU bitwise operations.

use crate::isa::opcode::Opcode;

/// Executes a bitwise operation. Returns `0` for non-logic opcodes.
pub const fn execute(op: Opcode, a: i32, b: i32) -> i32 {
    match op {
        Opcode::And => a & b,
        Opcode::Or => a | b,
        Opcode::Xor => a ^ b,
        _ => 0,
    }
}
