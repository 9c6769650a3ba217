//! Control Flow Tests.
//!
//! Verifies BTB-driven prediction, misprediction recovery and the
//! unconditional jumps.

use apex_core::core::units::bru::btb::BranchHistory;
use pretty_assertions::assert_eq;

use crate::common::harness::TestContext;

// ══════════════════════════════════════════════════════════
// 1. Conditional branches
// ══════════════════════════════════════════════════════════

#[test]
fn first_taken_branch_mispredicts_and_squashes() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#0\n\
         CML,R0,#0\n\
         BZ,#8\n\
         MOVC,R1,#99\n\
         MOVC,R2,#7\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 0, "wrong-path MOVC must not commit");
    assert_eq!(ctx.reg(2), 7);

    let s = ctx.stats();
    assert_eq!(s.branch_mispredictions, 1);
    assert_eq!(s.branch_predictions, 0);
    assert_eq!(s.flushes, 1);
    assert_eq!(s.stalls_fetch_redirect, 1);
    assert_eq!(s.stalls_btb, 1);
    assert_eq!(s.instructions_retired, 5);
    assert_eq!(s.inst_branch, 1);
}

#[test]
fn not_taken_branch_predicted_without_flush() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#1\n\
         CML,R0,#0\n\
         BZ,#8\n\
         MOVC,R1,#5\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 5);
    let s = ctx.stats();
    assert_eq!(s.branch_predictions, 1);
    assert_eq!(s.branch_mispredictions, 0);
    assert_eq!(s.flushes, 0);
}

#[test]
fn loop_trains_the_btb() {
    let program = "\
MOVC,R0,#3
MOVC,R1,#0
ADDL,R1,R1,#5
SUBL,R0,R0,#1
BNZ,#-8
HALT
";
    let mut ctx = TestContext::new(program);
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(0), 0);
    assert_eq!(ctx.reg(1), 15);

    // Unknown on the first pass, taken-biased afterwards, wrong on exit.
    let s = ctx.stats();
    assert_eq!(s.branch_mispredictions, 2);
    assert_eq!(s.branch_predictions, 1);
    assert_eq!(s.stalls_btb, 1);
    assert_eq!(s.inst_branch, 3);

    let btb = ctx.o3_snapshot().btb;
    assert_eq!(btb.len(), 1);
    assert_eq!(btb[0].pc, 4016);
    assert_eq!(btb[0].target, 4008);
    assert_eq!(btb[0].history, BranchHistory::WeaklyTaken);

    let mut reference = TestContext::in_order(program);
    let _ = reference.run_to_halt();
    assert_eq!(ctx.sim.read_register_file(), reference.sim.read_register_file());
    assert_eq!(s.instructions_retired, reference.stats().instructions_retired);
}

#[test]
fn wrong_path_halt_does_not_stop_fetch() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#0\n\
         CML,R0,#0\n\
         BZ,#8\n\
         HALT\n\
         MOVC,R2,#7\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 7);
    assert_eq!(ctx.stats().instructions_retired, 5);
}

#[test]
fn wrong_path_store_never_writes_memory() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#0\n\
         MOVC,R1,#9\n\
         CML,R0,#0\n\
         BZ,#8\n\
         STORE,R1,R0,#20\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.mem(20), 0);
    assert_eq!(ctx.stats().inst_store, 0);
}

#[test]
fn branch_reads_flags_of_latest_writer() {
    // ADDL after CML overwrites the flags; BP must see the ADDL result.
    let mut ctx = TestContext::new(
        "MOVC,R0,#0\n\
         CML,R0,#5\n\
         ADDL,R1,R0,#3\n\
         BP,#8\n\
         MOVC,R2,#1\n\
         MOVC,R3,#1\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 0, "BP taken on positive ADDL result");
    assert_eq!(ctx.reg(3), 1);
}

// ══════════════════════════════════════════════════════════
// 2. Jumps
// ══════════════════════════════════════════════════════════

#[test]
fn jump_to_register_target() {
    let mut ctx = TestContext::new(
        "MOVC,R5,#4012\n\
         JUMP,R5,#0\n\
         MOVC,R1,#99\n\
         MOVC,R2,#7\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 7);
    let s = ctx.stats();
    assert_eq!(s.flushes, 1);
    assert_eq!(
        (s.branch_predictions, s.branch_mispredictions),
        (0, 0),
        "jumps are not predictions"
    );
}

#[test]
fn jalr_links_return_address() {
    let mut ctx = TestContext::new(
        "MOVC,R5,#4008\n\
         JALR,R6,R5,#8\n\
         MOVC,R1,#99\n\
         MOVC,R1,#98\n\
         MOVC,R2,#7\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(6), 4008, "link is pc + 4");
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 7);
}

#[test]
fn call_and_return() {
    let program = "\
MOVC,R5,#4020
JALR,R6,R5,#0
MOVC,R2,#1
HALT
NOP
ADDL,R3,R3,#10
JUMP,R6,#0
";
    let mut ctx = TestContext::new(program);
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(3), 10);
    assert_eq!(ctx.reg(2), 1);

    let mut reference = TestContext::in_order(program);
    let _ = reference.run_to_halt();
    assert_eq!(ctx.sim.read_register_file(), reference.sim.read_register_file());
}
