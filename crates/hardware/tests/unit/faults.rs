//! Fault Tests.
//!
//! A fault is raised only when the faulting instruction reaches commit; both
//! engines report the same error.

use apex_core::Simulator;
use apex_core::common::error::SimError;
use apex_core::config::{BackendType, Config};
use apex_core::sim::RunOutcome;
use apex_core::sim::loader::parse_program;
use rstest::rstest;

fn simulator(text: &str, backend: BackendType) -> Simulator {
    let mut config = Config::default();
    config.general.backend = backend;
    Simulator::new(parse_program(text).unwrap(), &config).unwrap()
}

#[rstest]
fn loadp_alias(#[values(BackendType::InOrder, BackendType::OutOfOrder)] backend: BackendType) {
    let mut sim = simulator("MOVC,R0,#1\nLOADP,R1,R1,#0\nHALT\n", backend);
    let err = sim.run(1000).unwrap_err();
    assert!(
        matches!(err, SimError::AutoIncrementAlias { pc: 4004, reg } if reg.index() == 1),
        "{err}"
    );
    assert_eq!(sim.read_register_file().regs[0], 1, "older work committed");
    assert!(sim.is_halted());
}

#[rstest]
fn storep_alias(#[values(BackendType::InOrder, BackendType::OutOfOrder)] backend: BackendType) {
    let mut sim = simulator("STOREP,R2,R2,#0\nHALT\n", backend);
    let err = sim.run(1000).unwrap_err();
    assert!(matches!(err, SimError::AutoIncrementAlias { pc: 4000, .. }), "{err}");
}

#[rstest]
fn load_out_of_bounds(
    #[values(BackendType::InOrder, BackendType::OutOfOrder)] backend: BackendType,
) {
    let mut sim = simulator("MOVC,R1,#5000\nLOAD,R2,R1,#0\nHALT\n", backend);
    let err = sim.run(1000).unwrap_err();
    assert!(
        matches!(err, SimError::MemoryFault { pc: 4004, addr: 5000 }),
        "{err}"
    );
}

#[rstest]
fn store_out_of_bounds(
    #[values(BackendType::InOrder, BackendType::OutOfOrder)] backend: BackendType,
) {
    let mut sim = simulator("MOVC,R1,#-4\nMOVC,R2,#3\nSTORE,R2,R1,#0\nHALT\n", backend);
    let err = sim.run(1000).unwrap_err();
    assert!(matches!(err, SimError::MemoryFault { pc: 4008, addr: -4 }), "{err}");
}

#[test]
fn fault_on_wrong_path_is_discarded() {
    let mut sim = simulator(
        "MOVC,R0,#0\n\
         MOVC,R1,#9000\n\
         CML,R0,#0\n\
         BZ,#8\n\
         LOAD,R2,R1,#0\n\
         HALT\n",
        BackendType::OutOfOrder,
    );
    assert!(sim.run(1000).is_ok());
    assert!(sim.is_halted());
}

#[test]
fn error_is_reported_once() {
    let mut sim = simulator("LOADP,R3,R3,#4\nHALT\n", BackendType::OutOfOrder);
    assert!(sim.run(1000).is_err());
    let clock = sim.clock();
    assert_eq!(sim.run(10).unwrap(), RunOutcome::Halted);
    assert_eq!(sim.clock(), clock);
}

#[rstest]
#[case::no_spare(16)]
#[case::one_spare(17)]
fn invalid_config_is_rejected(#[case] phys_regs: usize) {
    let mut config = Config::default();
    config.pipeline.phys_regs = phys_regs;
    let err = Simulator::new(parse_program("HALT\n").unwrap(), &config).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)));
}

#[test]
fn smallest_register_pool_runs_auto_increment() {
    let mut config = Config::default();
    config.pipeline.phys_regs = 18;
    let program = parse_program("MOVC,R1,#8\nLOADP,R2,R1,#0\nSTOREP,R2,R1,#0\nHALT\n").unwrap();
    let mut sim = Simulator::new(program, &config).unwrap();
    assert_eq!(sim.run(1000).unwrap(), RunOutcome::Halted);
    assert_eq!(sim.read_register_file().regs[1], 16);
    assert_eq!(sim.stats().instructions_retired, 4);
}

#[test]
fn config_from_json_applies_defaults() {
    let config = Config::from_json(
        r#"{ "pipeline": { "rob_size": 8 }, "general": { "backend": "InOrder" } }"#,
    )
    .unwrap();
    assert_eq!(config.pipeline.rob_size, 8);
    assert_eq!(config.pipeline.iq_size, 24);
    assert_eq!(config.general.backend, BackendType::InOrder);

    assert!(matches!(Config::from_json("{ not json"), Err(SimError::Config(_))));
    assert!(matches!(
        Config::from_json(r#"{ "pipeline": { "commit_width": 0 } }"#),
        Err(SimError::InvalidConfig(_))
    ));
}
