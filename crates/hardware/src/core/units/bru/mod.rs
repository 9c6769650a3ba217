//! Branch resolution unit (BRU) support.
//!
//! This module contains the branch target buffer used for prediction and the
//! condition evaluation shared by the branch unit and the in-order engine.

/// Branch Target Buffer with 2-bit outcome histories.
pub mod btb;

use crate::common::constants::INSTRUCTION_BYTES;
use crate::isa::flags::ConditionCode;
use crate::isa::opcode::Opcode;

/// Outcome of a resolved control instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Whether control leaves the fall-through path.
    pub taken: bool,
    /// PC of the next instruction on the correct path.
    pub next_pc: u32,
    /// Link value written by `JALR`.
    pub link: Option<i32>,
}

/// Whether a conditional branch is taken under `cc`.
pub const fn condition_holds(op: Opcode, cc: ConditionCode) -> bool {
    match op {
        Opcode::Bz => cc.zero,
        Opcode::Bnz => !cc.zero,
        Opcode::Bp => cc.positive,
        Opcode::Bnp => !cc.positive,
        Opcode::Bn => cc.negative,
        Opcode::Bnn => !cc.negative,
        _ => false,
    }
}

/// Resolves a control instruction.
///
/// # Arguments
///
/// * `op`  - A control opcode
/// * `pc`  - PC of the instruction
/// * `rs1` - Register operand of `JUMP`/`JALR`
/// * `imm` - Branch offset or jump displacement
/// * `cc`  - Condition code read by conditional branches
pub const fn resolve(op: Opcode, pc: u32, rs1: i32, imm: i32, cc: ConditionCode) -> Resolution {
    let fall_through = pc.wrapping_add(INSTRUCTION_BYTES);
    match op {
        Opcode::Jump => Resolution {
            taken: true,
            next_pc: rs1.wrapping_add(imm) as u32,
            link: None,
        },
        Opcode::Jalr => Resolution {
            taken: true,
            next_pc: rs1.wrapping_add(imm) as u32,
            link: Some(fall_through as i32),
        },
        _ => {
            let taken = condition_holds(op, cc);
            Resolution {
                taken,
                next_pc: if taken {
                    pc.wrapping_add_signed(imm)
                } else {
                    fall_through
                },
                link: None,
            }
        }
    }
}
