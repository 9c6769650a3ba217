//! APEX Architectural Register File.
//!
//! This module implements the committed (architectural) register state. It performs the following:
//! 1. **Storage:** Maintains 16 signed 32-bit registers (`R0`-`R15`) and the condition-code flags.
//! 2. **Commit Target:** Written only when an instruction retires from the ROB head
//!    (or by the in-order engine when it executes).

use serde::Serialize;

use crate::common::constants::ARCH_REG_COUNT;
use crate::common::reg::ArchReg;
use crate::isa::flags::ConditionCode;

/// Architectural register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Gpr {
    regs: [i32; ARCH_REG_COUNT],
    cc: ConditionCode,
}

impl Gpr {
    /// Creates a register file with every register zero and all flags clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register.
    #[inline]
    pub const fn read(&self, reg: ArchReg) -> i32 {
        self.regs[reg.index()]
    }

    /// Writes a register.
    #[inline]
    pub const fn write(&mut self, reg: ArchReg, val: i32) {
        self.regs[reg.index()] = val;
    }

    /// Current condition-code flags.
    #[inline]
    pub const fn cc(&self) -> ConditionCode {
        self.cc
    }

    /// Replaces the condition-code flags.
    #[inline]
    pub const fn set_cc(&mut self, cc: ConditionCode) {
        self.cc = cc;
    }

    /// All register values in index order.
    pub const fn values(&self) -> &[i32; ARCH_REG_COUNT] {
        &self.regs
    }
}
