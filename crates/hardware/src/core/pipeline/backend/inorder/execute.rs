//! In-order execute: one instruction evaluated completely against the
//! architectural state.
//!
//! Registers, flags and memory are updated immediately, so this path is also
//! the functional reference the out-of-order engine is compared against.

use crate::common::constants::{AUTO_INCREMENT, INSTRUCTION_BYTES};
use crate::common::error::SimError;
use crate::common::reg::ArchReg;
use crate::core::Cpu;
use crate::core::units::alu::Alu;
use crate::core::units::bru;
use crate::isa::instruction::Instruction;
use crate::isa::opcode::Opcode;

/// What the engine does after an instruction executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Continue at the given PC.
    Next(u32),
    /// `HALT` executed.
    Halt,
}

fn reg(cpu: &Cpu, r: Option<ArchReg>) -> i32 {
    r.map_or(0, |r| cpu.regs.read(r))
}

fn effective_address(cpu: &Cpu, inst: &Instruction, pc: u32) -> Result<i32, SimError> {
    let addr = reg(cpu, inst.base()).wrapping_add(inst.imm);
    if cpu.memory.contains(addr) {
        Ok(addr)
    } else {
        Err(SimError::MemoryFault { pc, addr })
    }
}

/// Executes `inst` at `pc` and commits its effects to `cpu`.
pub fn execute(inst: &Instruction, pc: u32, cpu: &mut Cpu) -> Result<Step, SimError> {
    let fall_through = pc.wrapping_add(INSTRUCTION_BYTES);
    let op = inst.opcode;

    if let Some(alias) = inst.auto_increment_alias() {
        return Err(SimError::AutoIncrementAlias { pc, reg: alias });
    }

    match op {
        Opcode::Halt => return Ok(Step::Halt),
        Opcode::Nop => {}
        Opcode::Load | Opcode::Loadp => {
            let addr = effective_address(cpu, inst, pc)?;
            let value = cpu
                .memory
                .read(addr)
                .ok_or(SimError::MemoryFault { pc, addr })?;
            if let Some(rd) = inst.rd {
                cpu.regs.write(rd, value);
            }
        }
        Opcode::Store | Opcode::Storep => {
            let addr = effective_address(cpu, inst, pc)?;
            let data = reg(cpu, inst.store_data());
            if !cpu.memory.write(addr, data) {
                return Err(SimError::MemoryFault { pc, addr });
            }
        }
        _ if op.is_control() => {
            let r = bru::resolve(op, pc, reg(cpu, inst.rs1), inst.imm, cpu.regs.cc());
            if let (Some(link), Some(rd)) = (r.link, inst.rd) {
                cpu.regs.write(rd, link);
            }
            return Ok(Step::Next(r.next_pc));
        }
        _ => {
            let out = Alu::execute(op, reg(cpu, inst.rs1), reg(cpu, inst.rs2), inst.imm);
            if let (Some(value), Some(rd)) = (out.value, inst.dest()) {
                cpu.regs.write(rd, value);
            }
            if let Some(cc) = out.cc {
                cpu.regs.set_cc(cc);
            }
        }
    }

    if let Some(base) = inst.auto_increment_base() {
        let value = cpu.regs.read(base).wrapping_add(AUTO_INCREMENT);
        cpu.regs.write(base, value);
    }
    Ok(Step::Next(fall_through))
}
