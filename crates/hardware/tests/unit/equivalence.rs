//! Out-of-Order vs In-Order Equivalence.
//!
//! Random branch-free programs must leave identical registers, flags and
//! memory on both engines, whatever order the out-of-order engine executed
//! them in.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::harness::TestContext;

/// `R15` holds the memory base so every generated address stays in range.
const PROLOGUE: &str = "MOVC,R15,#100\n";

fn reg() -> impl Strategy<Value = u8> {
    0u8..15
}

fn instruction() -> impl Strategy<Value = String> {
    let rrr = prop::sample::select(vec!["ADD", "SUB", "MUL", "AND", "OR", "XOR"]);
    let rri = prop::sample::select(vec!["ADDL", "SUBL"]);
    let load = prop::sample::select(vec!["LOAD", "LOADP"]);
    let store = prop::sample::select(vec!["STORE", "STOREP"]);
    let offset = (0i32..16).prop_map(|w| w * 4);
    prop_oneof![
        (rrr, reg(), reg(), reg()).prop_map(|(op, d, a, b)| format!("{op},R{d},R{a},R{b}")),
        (rri, reg(), reg(), -50i32..50).prop_map(|(op, d, a, i)| format!("{op},R{d},R{a},#{i}")),
        (reg(), -50i32..50).prop_map(|(d, i)| format!("MOVC,R{d},#{i}")),
        (reg(), reg()).prop_map(|(a, b)| format!("CMP,R{a},R{b}")),
        (reg(), -50i32..50).prop_map(|(a, i)| format!("CML,R{a},#{i}")),
        (load, reg(), offset.clone()).prop_map(|(op, d, o)| format!("{op},R{d},R15,#{o}")),
        (store, reg(), offset).prop_map(|(op, s, o)| format!("{op},R{s},R15,#{o}")),
        Just("NOP".to_string()),
    ]
}

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec(instruction(), 1..40).prop_map(|body| {
        let mut text = PROLOGUE.to_string();
        for line in body {
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str("HALT\n");
        text
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn out_of_order_matches_in_order(text in program()) {
        let mut reference = TestContext::in_order(&text);
        let _ = reference.run_to_halt();
        let mut ctx = TestContext::new(&text);
        let _ = ctx.run_to_halt();

        prop_assert_eq!(ctx.sim.read_register_file(), reference.sim.read_register_file());
        for addr in 0..400 {
            prop_assert_eq!(ctx.mem(addr), reference.mem(addr), "MEM[{}]", addr);
        }
        prop_assert_eq!(
            ctx.stats().instructions_retired,
            reference.stats().instructions_retired
        );
    }
}

#[test]
fn memory_heavy_program_matches() {
    let text = "\
MOVC,R15,#100
MOVC,R0,#3
STOREP,R0,R15,#0
STOREP,R0,R15,#0
LOAD,R1,R15,#-8
MUL,R2,R1,R0
STORE,R2,R15,#0
LOADP,R3,R15,#0
ADD,R4,R3,R1
HALT
";
    let mut reference = TestContext::in_order(text);
    let _ = reference.run_to_halt();
    let mut ctx = TestContext::new(text);
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.sim.read_register_file(), reference.sim.read_register_file());
    assert_eq!(ctx.reg(3), 9);
    assert_eq!(ctx.reg(4), 12);
}
