//! Decoded APEX instructions.
//!
//! An [`Instruction`] is the unit stored in code memory. It is immutable once
//! loaded; the pipeline copies the fields it needs into its latches.

use serde::Serialize;

use crate::common::reg::ArchReg;
use crate::isa::opcode::{Format, Opcode};

/// One decoded instruction.
///
/// Register fields follow the text form: for stores `rs1` is the data register
/// and `rs2` the base register; for loads `rs1` is the base register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Operation.
    pub opcode: Opcode,
    /// Destination register, for formats that name one.
    pub rd: Option<ArchReg>,
    /// First source register.
    pub rs1: Option<ArchReg>,
    /// Second source register.
    pub rs2: Option<ArchReg>,
    /// Literal operand (zero when the format has none).
    pub imm: i32,
}

impl Instruction {
    /// An instruction with no register operands.
    pub const fn bare(opcode: Opcode) -> Self {
        Self {
            opcode,
            rd: None,
            rs1: None,
            rs2: None,
            imm: 0,
        }
    }

    /// Architectural register receiving the primary result, if any.
    pub const fn dest(&self) -> Option<ArchReg> {
        match self.opcode.format() {
            Format::RegRegReg | Format::RegRegImm | Format::RegImm => self.rd,
            Format::SrcSrc | Format::SrcImm | Format::Store | Format::Imm | Format::Bare => None,
        }
    }

    /// Register whose value forms the address base (memory ops only).
    pub const fn base(&self) -> Option<ArchReg> {
        match self.opcode {
            Opcode::Load | Opcode::Loadp => self.rs1,
            Opcode::Store | Opcode::Storep => self.rs2,
            _ => None,
        }
    }

    /// Register holding the value a store writes.
    pub const fn store_data(&self) -> Option<ArchReg> {
        if self.opcode.is_store() { self.rs1 } else { None }
    }

    /// Base register updated by `LOADP`/`STOREP`.
    pub const fn auto_increment_base(&self) -> Option<ArchReg> {
        if self.opcode.is_auto_increment() {
            self.base()
        } else {
            None
        }
    }

    /// Register that `LOADP`/`STOREP` would write twice, if any.
    ///
    /// For `LOADP` this is a destination equal to the base; for `STOREP` a
    /// data register equal to the base.
    pub fn auto_increment_alias(&self) -> Option<ArchReg> {
        let base = self.auto_increment_base()?;
        let other = match self.opcode {
            Opcode::Loadp => self.rd,
            Opcode::Storep => self.rs1,
            _ => None,
        }?;
        (base == other).then_some(base)
    }
}
