//! Instruction File Loading Tests.

use std::fs;

use apex_core::Simulator;
use apex_core::common::error::{LoadError, SimError};
use apex_core::config::Config;
use apex_core::isa::opcode::Opcode;
use apex_core::sim::loader::load_program;

#[test]
fn loads_file_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sum.asm");
    fs::write(&path, "MOVC,R0,#5\nMOVC,R1,#10\n\nADD,R2,R0,R1\nHALT\n").unwrap();

    let program = load_program(&path).unwrap();
    let ops: Vec<Opcode> = program.iter().map(|i| i.opcode).collect();
    assert_eq!(ops, [Opcode::Movc, Opcode::Movc, Opcode::Add, Opcode::Halt]);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.asm");
    let err = load_program(&path).unwrap_err();
    match err {
        LoadError::Io { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn bad_line_reports_its_number() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.asm");
    fs::write(&path, "MOVC,R0,#5\n; comment\nADD,R2,R0\nHALT\n").unwrap();
    let err = load_program(&path).unwrap_err();
    assert!(matches!(err, LoadError::OperandCount { line: 3, .. }));
    assert!(err.to_string().starts_with("line 3:"));
}

#[test]
fn simulator_from_file_runs_program() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sum.asm");
    fs::write(&path, "MOVC,R0,#5\nMOVC,R1,#10\nADD,R2,R0,R1\nHALT\n").unwrap();

    let mut sim = Simulator::from_file(&path, &Config::default()).unwrap();
    let _ = sim.run(1000).unwrap();
    assert_eq!(sim.read_register_file().regs[2], 15);
}

#[test]
fn comment_only_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.asm");
    fs::write(&path, "; nothing here\n\n").unwrap();
    let err = Simulator::from_file(&path, &Config::default()).unwrap_err();
    assert!(matches!(err, SimError::Load(LoadError::Empty)));
}
