//! Load/Store Tests.
//!
//! Covers address computation, store-to-load forwarding through the LSQ, the
//! auto-increment forms and the ordering of memory operations.

use apex_core::isa::opcode::Opcode;
use pretty_assertions::assert_eq;

use crate::common::harness::TestContext;

#[test]
fn store_then_load_same_address() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#7\n\
         MOVC,R1,#10\n\
         STORE,R0,R1,#0\n\
         LOAD,R2,R1,#0\n\
         ADD,R3,R2,R0\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.mem(10), 7);
    assert_eq!(ctx.reg(2), 7);
    assert_eq!(ctx.reg(3), 14);
    let s = ctx.stats();
    assert_eq!(s.loads_forwarded + s.loads_from_memory, 1);
    assert_eq!((s.inst_load, s.inst_store), (1, 1));
}

#[test]
fn load_value_reaches_consumer_over_the_bus() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#7\n\
         MOVC,R1,#10\n\
         STORE,R0,R1,#0\n\
         LOAD,R2,R1,#0\n\
         ADD,R3,R2,R0\n\
         HALT\n",
    );
    let snapshots = ctx.collect_snapshots();
    let load_phys = snapshots
        .iter()
        .flat_map(|s| &s.rob)
        .find_map(|e| (e.inst.opcode == Opcode::Load).then_some(e.dest))
        .flatten()
        .expect("LOAD is renamed")
        .phys;

    // First cycle where the ADD holds its R2 operand, in the IQ or the INT unit.
    let woken = snapshots
        .iter()
        .find(|s| {
            s.iq.iter()
                .chain(s.units.int.as_ref())
                .filter(|e| e.opcode == Opcode::Add)
                .any(|e| e.src1.is_some_and(|op| op.tag == load_phys && op.value.is_some()))
        })
        .expect("ADD wakes up on the loaded value");

    let add = woken
        .iq
        .iter()
        .chain(woken.units.int.as_ref())
        .find(|e| e.opcode == Opcode::Add)
        .unwrap();
    assert_eq!(add.src1.and_then(|op| op.value), Some(7));
    assert!(
        woken.rob.iter().any(|e| e.inst.opcode == Opcode::Load),
        "LOAD has not committed"
    );
    assert!(!woken.prf[usize::from(load_phys.0)].valid);
    assert!(woken.gpr_bus.iter().any(|slot| {
        slot.tag == load_phys && slot.data == 7 && slot.tag_broadcasted
    }));

    assert_eq!(ctx.reg(3), 14);
}

#[test]
fn youngest_older_store_wins() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#1\n\
         MOVC,R1,#2\n\
         MOVC,R5,#40\n\
         STORE,R0,R5,#0\n\
         STORE,R1,R5,#0\n\
         LOAD,R2,R5,#0\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 2);
    assert_eq!(ctx.mem(40), 2);
}

#[test]
fn load_before_store_sees_old_value() {
    let mut ctx = TestContext::new(
        "MOVC,R5,#8\n\
         MOVC,R0,#3\n\
         STORE,R0,R5,#0\n\
         LOAD,R1,R5,#0\n\
         MOVC,R0,#9\n\
         STORE,R0,R5,#0\n\
         LOAD,R2,R5,#0\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 3);
    assert_eq!(ctx.reg(2), 9);
    assert_eq!(ctx.mem(8), 9);
}

#[test]
fn different_addresses_do_not_forward() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#5\n\
         MOVC,R1,#100\n\
         STORE,R0,R1,#0\n\
         LOAD,R2,R1,#4\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 0);
    assert_eq!(ctx.stats().loads_forwarded, 0);
    assert_eq!(ctx.stats().loads_from_memory, 1);
}

#[test]
fn loadp_increments_base() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#11\n\
         MOVC,R1,#22\n\
         MOVC,R4,#200\n\
         STORE,R0,R4,#0\n\
         STORE,R1,R4,#4\n\
         LOADP,R2,R4,#0\n\
         LOADP,R3,R4,#0\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 11);
    assert_eq!(ctx.reg(3), 22);
    assert_eq!(ctx.reg(4), 208);
}

#[test]
fn storep_walks_an_array() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#1\n\
         MOVC,R1,#2\n\
         MOVC,R2,#3\n\
         MOVC,R6,#300\n\
         STOREP,R0,R6,#0\n\
         STOREP,R1,R6,#0\n\
         STOREP,R2,R6,#0\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!([ctx.mem(300), ctx.mem(304), ctx.mem(308)], [1, 2, 3]);
    assert_eq!(ctx.reg(6), 312);
}

#[test]
fn negative_offset() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#77\n\
         MOVC,R1,#64\n\
         STORE,R0,R1,#-8\n\
         LOAD,R2,R1,#-8\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.mem(56), 77);
    assert_eq!(ctx.reg(2), 77);
}

#[test]
fn store_data_produced_late_by_multiply() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#6\n\
         MOVC,R7,#12\n\
         MUL,R1,R0,R0\n\
         STORE,R1,R7,#0\n\
         LOAD,R2,R7,#0\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.mem(12), 36);
    assert_eq!(ctx.reg(2), 36);
}
