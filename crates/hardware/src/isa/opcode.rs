//! APEX opcodes and their static properties.
//!
//! Every pipeline decision that depends on "what kind of instruction is this"
//! goes through a method on [`Opcode`], so adding an opcode is a compile error
//! everywhere it needs handling.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// APEX instruction opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    /// `rd = rs1 + rs2`
    Add,
    /// `rd = rs1 - rs2`
    Sub,
    /// `rd = rs1 * rs2`
    Mul,
    /// `rd = rs1 & rs2`
    And,
    /// `rd = rs1 | rs2`
    Or,
    /// `rd = rs1 ^ rs2`
    Xor,
    /// `rd = rs1 + imm`
    Addl,
    /// `rd = rs1 - imm`
    Subl,
    /// `rd = imm`
    Movc,
    /// Set flags from `rs1 - rs2`.
    Cmp,
    /// Set flags from `rs1 - imm`.
    Cml,
    /// `rd = mem[rs1 + imm]`
    Load,
    /// `rd = mem[rs1 + imm]; rs1 += 4`
    Loadp,
    /// `mem[rs2 + imm] = rs1`
    Store,
    /// `mem[rs2 + imm] = rs1; rs2 += 4`
    Storep,
    /// Branch if zero.
    Bz,
    /// Branch if not zero.
    Bnz,
    /// Branch if positive.
    Bp,
    /// Branch if not positive.
    Bnp,
    /// Branch if negative.
    Bn,
    /// Branch if not negative.
    Bnn,
    /// `pc = rs1 + imm`
    Jump,
    /// `rd = pc + 4; pc = rs1 + imm`
    Jalr,
    /// No operation.
    Nop,
    /// Stop fetching; the simulation ends when this commits.
    Halt,
}

/// Functional unit class an instruction is scheduled on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FuClass {
    /// Single-cycle integer unit.
    Int,
    /// Multi-cycle multiply unit.
    Mul,
    /// Address computation unit feeding the memory access unit.
    Afu,
    /// Branch resolution unit.
    Branch,
}

impl FuClass {
    /// Every class in select-priority order.
    pub const ALL: [Self; 4] = [Self::Int, Self::Mul, Self::Afu, Self::Branch];
}

/// Operand layout of an instruction in its text form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// `OP,Rd,Rs1,Rs2`
    RegRegReg,
    /// `OP,Rd,Rs1,#imm`
    RegRegImm,
    /// `OP,Rd,#imm`
    RegImm,
    /// `OP,Rs1,Rs2`
    SrcSrc,
    /// `OP,Rs1,#imm`
    SrcImm,
    /// `OP,Rs1,Rs2,#imm` (store data, base, offset)
    Store,
    /// `OP,#imm`
    Imm,
    /// `OP`
    Bare,
}

impl Format {
    /// Number of comma-separated operands after the mnemonic.
    pub const fn operand_count(self) -> usize {
        match self {
            Self::RegRegReg | Self::RegRegImm | Self::Store => 3,
            Self::RegImm | Self::SrcSrc | Self::SrcImm => 2,
            Self::Imm => 1,
            Self::Bare => 0,
        }
    }
}

impl Opcode {
    /// Every opcode, in mnemonic table order.
    pub const ALL: [Self; 25] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Addl,
        Self::Subl,
        Self::Movc,
        Self::Cmp,
        Self::Cml,
        Self::Load,
        Self::Loadp,
        Self::Store,
        Self::Storep,
        Self::Bz,
        Self::Bnz,
        Self::Bp,
        Self::Bnp,
        Self::Bn,
        Self::Bnn,
        Self::Jump,
        Self::Jalr,
        Self::Nop,
        Self::Halt,
    ];

    /// Upper-case assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Addl => "ADDL",
            Self::Subl => "SUBL",
            Self::Movc => "MOVC",
            Self::Cmp => "CMP",
            Self::Cml => "CML",
            Self::Load => "LOAD",
            Self::Loadp => "LOADP",
            Self::Store => "STORE",
            Self::Storep => "STOREP",
            Self::Bz => "BZ",
            Self::Bnz => "BNZ",
            Self::Bp => "BP",
            Self::Bnp => "BNP",
            Self::Bn => "BN",
            Self::Bnn => "BNN",
            Self::Jump => "JUMP",
            Self::Jalr => "JALR",
            Self::Nop => "NOP",
            Self::Halt => "HALT",
        }
    }

    /// Operand layout of the text form.
    pub const fn format(self) -> Format {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::And | Self::Or | Self::Xor => {
                Format::RegRegReg
            }
            Self::Addl | Self::Subl | Self::Load | Self::Loadp | Self::Jalr => Format::RegRegImm,
            Self::Movc => Format::RegImm,
            Self::Cmp => Format::SrcSrc,
            Self::Cml | Self::Jump => Format::SrcImm,
            Self::Store | Self::Storep => Format::Store,
            Self::Bz | Self::Bnz | Self::Bp | Self::Bnp | Self::Bn | Self::Bnn => Format::Imm,
            Self::Nop | Self::Halt => Format::Bare,
        }
    }

    /// Functional unit the instruction issues to, `None` for instructions
    /// that complete at dispatch.
    pub const fn fu_class(self) -> Option<FuClass> {
        match self {
            Self::Add
            | Self::Sub
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Addl
            | Self::Subl
            | Self::Movc
            | Self::Cmp
            | Self::Cml => Some(FuClass::Int),
            Self::Mul => Some(FuClass::Mul),
            Self::Load | Self::Loadp | Self::Store | Self::Storep => Some(FuClass::Afu),
            Self::Bz
            | Self::Bnz
            | Self::Bp
            | Self::Bnp
            | Self::Bn
            | Self::Bnn
            | Self::Jump
            | Self::Jalr => Some(FuClass::Branch),
            Self::Nop | Self::Halt => None,
        }
    }

    /// Whether the instruction produces a new condition code.
    pub const fn writes_cc(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::And
                | Self::Or
                | Self::Xor
                | Self::Addl
                | Self::Subl
                | Self::Cmp
                | Self::Cml
        )
    }

    /// Whether this is a flag-conditional branch.
    pub const fn is_conditional_branch(self) -> bool {
        matches!(
            self,
            Self::Bz | Self::Bnz | Self::Bp | Self::Bnp | Self::Bn | Self::Bnn
        )
    }

    /// Whether this opcode can redirect the PC.
    pub const fn is_control(self) -> bool {
        self.is_conditional_branch() || matches!(self, Self::Jump | Self::Jalr)
    }

    /// Whether this is a load (`LOAD`, `LOADP`).
    pub const fn is_load(self) -> bool {
        matches!(self, Self::Load | Self::Loadp)
    }

    /// Whether this is a store (`STORE`, `STOREP`).
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Store | Self::Storep)
    }

    /// Whether this instruction occupies a load/store queue slot.
    pub const fn is_memory(self) -> bool {
        self.is_load() || self.is_store()
    }

    /// Whether this instruction increments its base register.
    pub const fn is_auto_increment(self) -> bool {
        matches!(self, Self::Loadp | Self::Storep)
    }

    /// Whether a newly seen instance should be predicted taken.
    ///
    /// Branches on "not zero", "positive" and "not negative" usually close
    /// loops and start out biased taken; the others start biased not taken.
    pub const fn default_taken_bias(self) -> bool {
        matches!(self, Self::Bnz | Self::Bp | Self::Bnn)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Error returned when parsing an unknown mnemonic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownOpcode;

impl FromStr for Opcode {
    type Err = UnknownOpcode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .ok_or(UnknownOpcode)
    }
}
