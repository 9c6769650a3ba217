//! Text instruction decoder.
//!
//! Decodes one line of an APEX program into an [`Instruction`]. The format is
//! the mnemonic followed by comma-separated operands:
//!
//! ```text
//! MOVC,R0,#5
//! ADD,R2,R0,R1
//! STORE,R2,R1,#8     ; mem[R1 + 8] = R2
//! BNZ,#-12
//! ```
//!
//! Registers are `R0`-`R15`, literals are `#` followed by a signed decimal.
//! Whitespace around fields is ignored and `;` starts a comment.

use crate::common::error::LoadError;
use crate::common::reg::ArchReg;
use crate::isa::instruction::Instruction;
use crate::isa::opcode::{Format, Opcode};

/// Decodes a single source line.
///
/// Returns `Ok(None)` for blank and comment-only lines. `line` is the 1-based
/// line number used in error reports.
pub fn decode_line(line: usize, text: &str) -> Result<Option<Instruction>, LoadError> {
    let code = text.split(';').next().unwrap_or("").trim();
    if code.is_empty() {
        return Ok(None);
    }

    let mut fields = code.split(',').map(str::trim);
    let mnemonic = fields.next().unwrap_or("");
    let opcode: Opcode = mnemonic.parse().map_err(|_| LoadError::UnknownOpcode {
        line,
        opcode: mnemonic.to_string(),
    })?;
    let operands: Vec<&str> = fields.collect();

    let format = opcode.format();
    if operands.len() != format.operand_count() {
        return Err(LoadError::OperandCount {
            line,
            opcode: opcode.mnemonic(),
            expected: format.operand_count(),
            found: operands.len(),
        });
    }

    let reg = |i: usize| parse_register(line, operands[i]).map(Some);
    let imm = |i: usize| parse_immediate(line, operands[i]);

    let mut inst = Instruction::bare(opcode);
    match format {
        Format::RegRegReg => {
            inst.rd = reg(0)?;
            inst.rs1 = reg(1)?;
            inst.rs2 = reg(2)?;
        }
        Format::RegRegImm => {
            inst.rd = reg(0)?;
            inst.rs1 = reg(1)?;
            inst.imm = imm(2)?;
        }
        Format::RegImm => {
            inst.rd = reg(0)?;
            inst.imm = imm(1)?;
        }
        Format::SrcSrc => {
            inst.rs1 = reg(0)?;
            inst.rs2 = reg(1)?;
        }
        Format::SrcImm => {
            inst.rs1 = reg(0)?;
            inst.imm = imm(1)?;
        }
        Format::Store => {
            inst.rs1 = reg(0)?;
            inst.rs2 = reg(1)?;
            inst.imm = imm(2)?;
        }
        Format::Imm => inst.imm = imm(0)?,
        Format::Bare => {}
    }
    Ok(Some(inst))
}

fn parse_register(line: usize, text: &str) -> Result<ArchReg, LoadError> {
    let bad = || LoadError::BadRegister {
        line,
        text: text.to_string(),
    };
    let digits = text
        .strip_prefix('R')
        .or_else(|| text.strip_prefix('r'))
        .ok_or_else(bad)?;
    let index: usize = digits.parse().map_err(|_| bad())?;
    ArchReg::new(index).ok_or_else(bad)
}

fn parse_immediate(line: usize, text: &str) -> Result<i32, LoadError> {
    let bad = || LoadError::BadImmediate {
        line,
        text: text.to_string(),
    };
    text.strip_prefix('#')
        .ok_or_else(bad)?
        .trim()
        .parse()
        .map_err(|_| bad())
}
