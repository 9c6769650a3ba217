//! Text Decoder and Disassembler Tests.

use apex_core::common::error::LoadError;
use apex_core::isa::decode::decode_line;
use apex_core::isa::disasm::disassemble;
use apex_core::isa::opcode::{FuClass, Opcode};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn decode(text: &str) -> apex_core::isa::Instruction {
    decode_line(1, text).unwrap().unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Round trip through the text form
// ══════════════════════════════════════════════════════════

#[rstest]
#[case("ADD,R2,R0,R1")]
#[case("MUL,R15,R14,R13")]
#[case("ADDL,R3,R3,#-7")]
#[case("SUBL,R3,R4,#12")]
#[case("MOVC,R0,#4000")]
#[case("CMP,R1,R2")]
#[case("CML,R1,#0")]
#[case("LOAD,R4,R5,#16")]
#[case("LOADP,R4,R5,#0")]
#[case("STORE,R4,R5,#-4")]
#[case("STOREP,R4,R5,#8")]
#[case("BZ,#8")]
#[case("BNN,#-12")]
#[case("JUMP,R6,#4")]
#[case("JALR,R7,R6,#0")]
#[case("NOP")]
#[case("HALT")]
fn display_matches_source(#[case] text: &str) {
    assert_eq!(disassemble(&decode(text)), text);
}

#[test]
fn whitespace_case_and_comments_are_ignored() {
    let inst = decode("  addl , r1 , r2 , #3   ; bump");
    assert_eq!(inst.to_string(), "ADDL,R1,R2,#3");
}

#[test]
fn blank_and_comment_lines_decode_to_nothing() {
    assert!(decode_line(1, "").unwrap().is_none());
    assert!(decode_line(2, "   ").unwrap().is_none());
    assert!(decode_line(3, "; only a comment").unwrap().is_none());
}

// ══════════════════════════════════════════════════════════
// 2. Operand roles
// ══════════════════════════════════════════════════════════

#[test]
fn store_roles() {
    let inst = decode("STOREP,R4,R5,#8");
    assert_eq!(inst.store_data().map(|r| r.index()), Some(4));
    assert_eq!(inst.base().map(|r| r.index()), Some(5));
    assert_eq!(inst.auto_increment_base().map(|r| r.index()), Some(5));
    assert_eq!(inst.dest(), None);
    assert_eq!(inst.auto_increment_alias(), None);
}

#[test]
fn loadp_alias_detected() {
    let inst = decode("LOADP,R3,R3,#0");
    assert_eq!(inst.auto_increment_alias().map(|r| r.index()), Some(3));
}

#[test]
fn storep_alias_detected() {
    let inst = decode("STOREP,R2,R2,#0");
    assert_eq!(inst.auto_increment_alias().map(|r| r.index()), Some(2));
}

#[test]
fn compares_have_no_destination() {
    assert_eq!(decode("CMP,R1,R2").dest(), None);
    assert_eq!(decode("CML,R1,#3").dest(), None);
    assert!(Opcode::Cmp.writes_cc());
}

#[rstest]
#[case(Opcode::Add, Some(FuClass::Int))]
#[case(Opcode::Movc, Some(FuClass::Int))]
#[case(Opcode::Mul, Some(FuClass::Mul))]
#[case(Opcode::Storep, Some(FuClass::Afu))]
#[case(Opcode::Jalr, Some(FuClass::Branch))]
#[case(Opcode::Halt, None)]
#[case(Opcode::Nop, None)]
fn functional_unit_classes(#[case] op: Opcode, #[case] class: Option<FuClass>) {
    assert_eq!(op.fu_class(), class);
}

#[test]
fn movc_and_memory_ops_leave_flags_alone() {
    for op in [Opcode::Movc, Opcode::Load, Opcode::Loadp, Opcode::Store, Opcode::Jalr] {
        assert!(!op.writes_cc(), "{op} must not write flags");
    }
}

// ══════════════════════════════════════════════════════════
// 3. Errors
// ══════════════════════════════════════════════════════════

#[test]
fn unknown_opcode() {
    let err = decode_line(7, "FROB,R1,R2,R3").unwrap_err();
    assert!(matches!(err, LoadError::UnknownOpcode { line: 7, .. }));
}

#[rstest]
#[case("ADD,R16,R0,R1")]
#[case("ADD,X1,R0,R1")]
#[case("MOVC,R1,5")]
fn malformed_operands(#[case] text: &str) {
    let err = decode_line(1, text).unwrap_err();
    assert!(
        matches!(
            err,
            LoadError::BadRegister { .. } | LoadError::BadImmediate { .. }
        ),
        "unexpected error {err:?}"
    );
}

#[test]
fn wrong_operand_count() {
    let err = decode_line(3, "ADD,R1,R2").unwrap_err();
    assert!(matches!(
        err,
        LoadError::OperandCount {
            line: 3,
            expected: 3,
            found: 2,
            ..
        }
    ));
}
