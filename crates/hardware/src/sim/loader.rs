//! Program loader.
//!
//! Reads an APEX instruction file and decodes it into the instruction list
//! placed in code memory. The first instruction lives at
//! [`CODE_BASE`](crate::common::constants::CODE_BASE) and each following one
//! four bytes later.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::error::LoadError;
use crate::isa::decode::decode_line;
use crate::isa::instruction::Instruction;

/// Reads and decodes the instruction file at `path`.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the file cannot be read, a decode error
/// carrying the 1-based line number for a malformed line, and
/// [`LoadError::Empty`] when the file holds no instructions.
pub fn load_program(path: impl AsRef<Path>) -> Result<Vec<Instruction>, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let program = parse_program(&text)?;
    debug!(path = %path.display(), instructions = program.len(), "program loaded");
    Ok(program)
}

/// Decodes program text, skipping blank and comment lines.
pub fn parse_program(text: &str) -> Result<Vec<Instruction>, LoadError> {
    let mut program = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(inst) = decode_line(i + 1, line)? {
            program.push(inst);
        }
    }
    if program.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(program)
}
