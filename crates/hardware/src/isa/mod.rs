//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the APEX opcode table, the decoded instruction representation, the
//! condition-code flags, the text decoder and the disassembler.

/// Text line decoder producing [`Instruction`](instruction::Instruction)s.
pub mod decode;

/// Instruction disassembler for display, tracing and diagnostics.
pub mod disasm;

/// Zero / positive / negative condition-code flags.
pub mod flags;

/// Decoded instruction structure and register role accessors.
pub mod instruction;

/// Opcodes, functional unit classes and operand formats.
pub mod opcode;

pub use flags::ConditionCode;
pub use instruction::Instruction;
pub use opcode::{FuClass, Opcode};
