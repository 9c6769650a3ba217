//! Instruction disassembler.
//!
//! Renders an [`Instruction`] in the same comma-separated text form the loader
//! accepts, so `decode_line(disassemble(i)) == i` for every valid instruction.
//! Used by pipeline-state display, commit traces and test diagnostics.

use std::fmt;

use crate::common::reg::ArchReg;
use crate::isa::instruction::Instruction;
use crate::isa::opcode::Format;

struct Reg(Option<ArchReg>);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(r) => write!(f, "{r}"),
            None => f.write_str("R?"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode;
        match op.format() {
            Format::RegRegReg => {
                write!(f, "{op},{},{},{}", Reg(self.rd), Reg(self.rs1), Reg(self.rs2))
            }
            Format::RegRegImm => {
                write!(f, "{op},{},{},#{}", Reg(self.rd), Reg(self.rs1), self.imm)
            }
            Format::RegImm => write!(f, "{op},{},#{}", Reg(self.rd), self.imm),
            Format::SrcSrc => write!(f, "{op},{},{}", Reg(self.rs1), Reg(self.rs2)),
            Format::SrcImm => write!(f, "{op},{},#{}", Reg(self.rs1), self.imm),
            Format::Store => {
                write!(f, "{op},{},{},#{}", Reg(self.rs1), Reg(self.rs2), self.imm)
            }
            Format::Imm => write!(f, "{op},#{}", self.imm),
            Format::Bare => write!(f, "{op}"),
        }
    }
}

/// Returns the text form of `inst`.
pub fn disassemble(inst: &Instruction) -> String {
    inst.to_string()
}
