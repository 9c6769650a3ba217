//! Pipeline Invariant Tests.
//!
//! These tests run a program, capture the pipeline state after every cycle
//! and check properties that must hold between consecutive snapshots.

use apex_core::core::pipeline::rob::RobEntry;
use apex_core::core::pipeline::snapshot::O3Snapshot;
use rstest::rstest;

use crate::common::harness::TestContext;

const MIXED: &str = "\
MOVC,R0,#5
MOVC,R1,#10
MUL,R2,R0,R1
ADD,R3,R2,R0
STORE,R3,R1,#0
LOAD,R4,R1,#0
SUBL,R5,R4,#55
MOVC,R6,#40
STOREP,R0,R6,#0
LOADP,R7,R6,#0
CMP,R5,R0
HALT
";

const INDEPENDENT: &str = "\
MOVC,R0,#1
MOVC,R1,#2
MOVC,R2,#3
MOVC,R3,#4
ADD,R4,R0,R1
ADD,R5,R2,R3
ADD,R6,R4,R5
HALT
";

/// Entries of `before` that are no longer in the ROB in `after`.
fn retired<'a>(before: &'a O3Snapshot, after: &O3Snapshot) -> Vec<&'a RobEntry> {
    let oldest_left = after.rob.first().map(|e| e.tag);
    before
        .rob
        .iter()
        .filter(|e| oldest_left.is_none_or(|t| e.tag < t))
        .collect()
}

#[rstest]
#[case(MIXED)]
#[case(INDEPENDENT)]
fn rob_is_ordered_by_tag(#[case] program: &str) {
    let snapshots = TestContext::new(program).collect_snapshots();
    for (cycle, s) in snapshots.iter().enumerate() {
        assert!(
            s.rob.windows(2).all(|w| w[0].tag < w[1].tag),
            "cycle {cycle}: ROB out of order"
        );
    }
}

#[rstest]
#[case(MIXED)]
#[case(INDEPENDENT)]
fn commit_follows_program_order(#[case] program: &str) {
    let snapshots = TestContext::new(program).collect_snapshots();
    let committed: Vec<u32> = snapshots
        .windows(2)
        .flat_map(|w| retired(&w[0], &w[1]).into_iter().map(|e| e.pc))
        .collect();
    let expected: Vec<u32> = (0..program.lines().count() as u32)
        .map(|i| 4000 + 4 * i)
        .collect();
    assert_eq!(committed, expected);
}

#[rstest]
#[case(MIXED)]
#[case(INDEPENDENT)]
fn commit_frees_previous_mapping(#[case] program: &str) {
    let snapshots = TestContext::new(program).collect_snapshots();
    for (cycle, w) in snapshots.windows(2).enumerate() {
        for entry in retired(&w[0], &w[1]) {
            for m in [entry.dest, entry.base].into_iter().flatten() {
                assert!(
                    w[1].gpr_free.contains(&m.prev),
                    "cycle {}: {} not freed after pc {} retired",
                    cycle + 1,
                    m.prev,
                    entry.pc
                );
                assert!(
                    !w[1].gpr_free.contains(&m.phys),
                    "cycle {}: live {} on the free list",
                    cycle + 1,
                    m.phys
                );
            }
        }
    }
}

#[rstest]
#[case(MIXED)]
#[case(INDEPENDENT)]
fn register_valid_only_after_tag_broadcast(#[case] program: &str) {
    let snapshots = TestContext::new(program).collect_snapshots();
    for (cycle, w) in snapshots.windows(2).enumerate() {
        let (before, after) = (&w[0], &w[1]);
        for (i, (old, new)) in before.prf.iter().zip(&after.prf).enumerate() {
            if old.valid || !new.valid {
                continue;
            }
            let broadcast = before
                .gpr_bus
                .iter()
                .any(|slot| usize::from(slot.tag.0) == i && slot.tag_broadcasted);
            assert!(
                broadcast,
                "cycle {}: P{i} became valid without a prior tag broadcast",
                cycle + 1
            );
            assert_eq!(
                before.gpr_bus.iter().find(|s| usize::from(s.tag.0) == i).map(|s| s.data),
                Some(new.value),
                "P{i} value differs from the broadcast value"
            );
        }
    }
}

#[test]
fn free_list_and_mappings_stay_disjoint() {
    let snapshots = TestContext::new(MIXED).collect_snapshots();
    for (cycle, s) in snapshots.iter().enumerate() {
        for (arch, phys) in &s.rename_table {
            assert!(
                !s.gpr_free.contains(phys),
                "cycle {cycle}: {arch} maps to free register {phys}"
            );
        }
    }
}

#[test]
fn final_state_after_mixed_program() {
    let mut ctx = TestContext::new(MIXED);
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 50);
    assert_eq!(ctx.reg(3), 55);
    assert_eq!(ctx.mem(10), 55);
    assert_eq!(ctx.reg(4), 55);
    assert_eq!(ctx.reg(5), 0);
    assert_eq!(ctx.mem(40), 5);
    assert_eq!(ctx.reg(7), 0, "LOADP reads MEM[44]");
    assert_eq!(ctx.reg(6), 48);
    assert!(ctx.sim.read_register_file().cc.negative);
}
