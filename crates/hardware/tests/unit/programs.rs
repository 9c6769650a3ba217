//! Whole-Program Tests.
//!
//! Straight-line and looping programs run on the out-of-order engine, with
//! the committed state checked directly or against the in-order engine.

use apex_core::common::reg::ArchReg;
use apex_core::config::Config;
use apex_core::sim::RunOutcome;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::TestContext;

// ══════════════════════════════════════════════════════════
// 1. Arithmetic
// ══════════════════════════════════════════════════════════

#[test]
fn add_two_constants() {
    let mut ctx = TestContext::new("MOVC,R0,#5\nMOVC,R1,#10\nADD,R2,R0,R1\nHALT\n");
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 15);
    assert_eq!(ctx.stats().instructions_retired, 4);
    assert_eq!(ctx.stats().inst_alu, 3);
    assert_eq!(ctx.stats().inst_other, 1);
    assert!(ctx.sim.read_register_file().cc.positive);
}

#[test]
fn dependent_chain() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#1\n\
         ADDL,R0,R0,#2\n\
         ADDL,R0,R0,#3\n\
         SUBL,R0,R0,#10\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(0), -4);
    assert!(ctx.sim.read_register_file().cc.negative);
}

#[test]
fn logic_ops() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#12\n\
         MOVC,R1,#10\n\
         AND,R2,R0,R1\n\
         OR,R3,R0,R1\n\
         XOR,R4,R0,R1\n\
         XOR,R5,R0,R0\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!([ctx.reg(2), ctx.reg(3), ctx.reg(4), ctx.reg(5)], [8, 14, 6, 0]);
    assert!(ctx.sim.read_register_file().cc.zero);
}

#[test]
fn multiply_waits_for_its_latency() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#6\n\
         MOVC,R1,#7\n\
         MUL,R2,R0,R1\n\
         ADDL,R3,R2,#1\n\
         HALT\n",
    );
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 42);
    assert_eq!(ctx.reg(3), 43);
    assert_eq!(ctx.stats().inst_mul, 1);
}

#[test]
fn independent_work_overtakes_a_multiply() {
    let mut config = Config::default();
    config.pipeline.mul_latency = 20;
    let mut ctx = TestContext::with_config(
        "MOVC,R0,#3\n\
         MUL,R1,R0,R0\n\
         MOVC,R2,#1\n\
         MOVC,R3,#2\n\
         HALT\n",
        &config,
    );
    let r3 = ArchReg::new(3).unwrap();
    let snapshots = ctx.collect_snapshots();
    let overtaken = snapshots.iter().any(|s| {
        s.units.mul.is_some()
            && s.rename_table
                .iter()
                .any(|&(arch, phys)| arch == r3 && phys.0 >= 16 && s.prf[usize::from(phys.0)].valid)
    });
    assert!(overtaken, "younger MOVCs complete while MUL is in flight");
    assert_eq!(ctx.reg(1), 9);
}

#[test]
fn cmp_sets_flags_without_writing_registers() {
    let mut ctx = TestContext::new("MOVC,R0,#4\nMOVC,R1,#9\nCMP,R0,R1\nHALT\n");
    let _ = ctx.run_to_halt();
    let view = ctx.sim.read_register_file();
    assert!(view.cc.negative);
    assert!(!view.cc.zero);
    assert_eq!(view.regs[0], 4);
    assert_eq!(view.regs[1], 9);
}

#[test]
fn nop_retires() {
    let mut ctx = TestContext::new("NOP\nMOVC,R0,#1\nNOP\nHALT\n");
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(0), 1);
    assert_eq!(ctx.stats().instructions_retired, 4);
}

// ══════════════════════════════════════════════════════════
// 2. Termination and the driving API
// ══════════════════════════════════════════════════════════

#[test]
fn program_without_halt_drains() {
    let mut ctx = TestContext::new("MOVC,R0,#1\nADDL,R1,R0,#1\n");
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 2);
    assert_eq!(ctx.stats().instructions_retired, 2);
}

#[test]
fn instructions_after_halt_never_commit() {
    let mut ctx = TestContext::new("MOVC,R0,#1\nHALT\nMOVC,R0,#2\nMOVC,R1,#3\n");
    let _ = ctx.run_to_halt();
    assert_eq!(ctx.reg(0), 1);
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.stats().instructions_retired, 2);
}

#[test]
fn halted_simulator_stays_halted() {
    let mut ctx = TestContext::new("MOVC,R0,#1\nHALT\n");
    let _ = ctx.run_to_halt();
    let cycles = ctx.sim.clock();
    assert_eq!(ctx.sim.run(50).unwrap(), RunOutcome::Halted);
    assert_eq!(ctx.sim.clock(), cycles, "no cycles counted after halt");
}

#[test]
fn run_until_stops_at_absolute_cycle() {
    let mut ctx = TestContext::new(
        "MOVC,R0,#1\nMOVC,R1,#2\nMOVC,R2,#3\nMOVC,R3,#4\nMOVC,R4,#5\nHALT\n",
    );
    assert_eq!(ctx.sim.run_until(4).unwrap(), RunOutcome::Paused);
    assert_eq!(ctx.sim.clock(), 4);
    assert_eq!(ctx.sim.run_until(1000).unwrap(), RunOutcome::Halted);
    assert_eq!(ctx.reg(4), 5);
}

#[test]
fn pipeline_state_display_has_sections() {
    let mut ctx = TestContext::new("MOVC,R0,#5\nMOVC,R1,#10\nADD,R2,R0,R1\nHALT\n");
    let _ = ctx.sim.run(4).unwrap();
    let text = ctx.sim.read_pipeline_state().to_string();
    for section in ["RENAME TABLE", "REORDER BUFFER", "ISSUE QUEUE", "BTB"] {
        assert!(text.contains(section), "missing {section} in\n{text}");
    }
}

#[test]
fn in_order_reports_next_instruction() {
    let ctx = TestContext::in_order("MOVC,R0,#5\nHALT\n");
    let text = ctx.sim.read_pipeline_state().to_string();
    assert!(text.contains("MOVC,R0,#5"), "{text}");
}

// ══════════════════════════════════════════════════════════
// 3. Loops across pipeline shapes
// ══════════════════════════════════════════════════════════

const SUM_LOOP: &str = "\
MOVC,R0,#6
MOVC,R1,#0
MOVC,R2,#0
ADD,R1,R1,R0
STOREP,R1,R2,#0
SUBL,R0,R0,#1
BNZ,#-12
LOAD,R3,R2,#-4
HALT
";

fn shaped(rob: usize, iq: usize, lsq: usize, phys: usize, cc: usize, width: usize) -> Config {
    let mut config = Config::default();
    let p = &mut config.pipeline;
    p.rob_size = rob;
    p.iq_size = iq;
    p.lsq_size = lsq;
    p.bq_size = 2;
    p.btb_size = 2;
    p.phys_regs = phys;
    p.cc_regs = cc;
    p.commit_width = width;
    config
}

#[rstest]
#[case::defaults(Config::default())]
#[case::tiny_windows(shaped(4, 2, 2, 20, 2, 1))]
#[case::tight_registers(shaped(32, 24, 16, 18, 2, 1))]
#[case::wide_commit(shaped(32, 24, 16, 48, 16, 4))]
fn sum_loop_matches_in_order(#[case] config: Config) {
    let mut reference = TestContext::in_order(SUM_LOOP);
    let _ = reference.run_to_halt();

    let mut ctx = TestContext::with_config(SUM_LOOP, &config);
    let _ = ctx.run_to_halt();

    assert_eq!(ctx.sim.read_register_file(), reference.sim.read_register_file());
    for addr in (0..24).step_by(4) {
        assert_eq!(ctx.mem(addr), reference.mem(addr), "MEM[{addr}]");
    }
    assert_eq!(ctx.reg(1), 21);
    assert_eq!(ctx.reg(3), 21);
    assert_eq!(ctx.stats().instructions_retired, reference.stats().instructions_retired);
}
