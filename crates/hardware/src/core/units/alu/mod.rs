//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer datapath shared by the integer unit,
//! the multiply unit and the in-order engine. All arithmetic wraps at 32 bits.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Mul and their literal forms, MOVC
//! - [`logic`]:      And, Or, Xor

/// Integer arithmetic operations (add, subtract, multiply, move constant).
pub mod arithmetic;

/// Bitwise logical operations (and, or, xor).
pub mod logic;

use crate::isa::flags::ConditionCode;
use crate::isa::opcode::Opcode;

/// Result of one ALU operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AluOutput {
    /// Value written to the destination register, if the opcode has one.
    pub value: Option<i32>,
    /// Condition code produced, if the opcode sets flags.
    pub cc: Option<ConditionCode>,
}

/// Arithmetic Logic Unit for integer operations.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Executes an integer operation.
    ///
    /// # Arguments
    ///
    /// * `op`  - The opcode to evaluate
    /// * `a`   - First source register value
    /// * `b`   - Second source register value
    /// * `imm` - Literal operand
    ///
    /// # Returns
    ///
    /// The destination value and condition code. Compares produce only a
    /// condition code; `MOVC` produces only a value. Opcodes that do not
    /// execute on the ALU produce neither.
    ///
    /// # Examples
    ///
    /// ```
    /// use apex_core::core::units::alu::Alu;
    /// use apex_core::isa::opcode::Opcode;
    ///
    /// let out = Alu::execute(Opcode::Add, 5, 10, 0);
    /// assert_eq!(out.value, Some(15));
    /// assert!(out.cc.unwrap().positive);
    ///
    /// let out = Alu::execute(Opcode::Cml, 3, 0, 3);
    /// assert_eq!(out.value, None);
    /// assert!(out.cc.unwrap().zero);
    /// ```
    pub fn execute(op: Opcode, a: i32, b: i32, imm: i32) -> AluOutput {
        let value = match op {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Addl | Opcode::Subl | Opcode::Movc => {
                arithmetic::execute(op, a, b, imm)
            }
            Opcode::And | Opcode::Or | Opcode::Xor => logic::execute(op, a, b),
            Opcode::Cmp => {
                return AluOutput {
                    value: None,
                    cc: Some(ConditionCode::compare(a, b)),
                };
            }
            Opcode::Cml => {
                return AluOutput {
                    value: None,
                    cc: Some(ConditionCode::compare(a, imm)),
                };
            }
            _ => return AluOutput::default(),
        };

        AluOutput {
            value: Some(value),
            cc: op.writes_cc().then(|| ConditionCode::from_result(value)),
        }
    }
}
