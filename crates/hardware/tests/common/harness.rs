use apex_core::Simulator;
use apex_core::common::reg::ArchReg;
use apex_core::config::{BackendType, Config};
use apex_core::core::pipeline::engine::CycleOutcome;
use apex_core::core::pipeline::snapshot::{O3Snapshot, PipelineSnapshot};
use apex_core::sim::loader::parse_program;
use apex_core::stats::SimStats;
use tracing_subscriber::EnvFilter;

/// Cycle limit for programs expected to halt.
pub const MAX_CYCLES: u64 = 10_000;

pub struct TestContext {
    pub sim: Simulator,
}

impl TestContext {
    /// Out-of-order simulator with the default configuration.
    pub fn new(program: &str) -> Self {
        Self::with_config(program, &Config::default())
    }

    /// Simulator running the in-order reference engine.
    pub fn in_order(program: &str) -> Self {
        let mut config = Config::default();
        config.general.backend = BackendType::InOrder;
        Self::with_config(program, &config)
    }

    pub fn with_config(program: &str, config: &Config) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();

        let program = parse_program(program).expect("test program must parse");
        let sim = Simulator::new(program, config).expect("test configuration must validate");
        Self { sim }
    }

    /// Runs until the program halts; panics if it does not within `MAX_CYCLES`.
    pub fn run_to_halt(&mut self) -> &mut Self {
        for _ in 0..MAX_CYCLES {
            match self.sim.step() {
                Ok(CycleOutcome::Halted) => return self,
                Ok(CycleOutcome::Running) => {}
                Err(e) => panic!("simulation fault at cycle {}: {e}", self.sim.clock()),
            }
        }
        panic!("program did not halt within {MAX_CYCLES} cycles");
    }

    /// Runs to completion and returns the out-of-order snapshot taken after
    /// every cycle, starting with the reset state.
    pub fn collect_snapshots(&mut self) -> Vec<O3Snapshot> {
        let mut snapshots = vec![self.o3_snapshot()];
        for _ in 0..MAX_CYCLES {
            let outcome = self.sim.step().expect("program must not fault");
            snapshots.push(self.o3_snapshot());
            if outcome == CycleOutcome::Halted {
                return snapshots;
            }
        }
        panic!("program did not halt within {MAX_CYCLES} cycles");
    }

    pub fn o3_snapshot(&self) -> O3Snapshot {
        match self.sim.read_pipeline_state() {
            PipelineSnapshot::OutOfOrder(s) => *s,
            PipelineSnapshot::InOrder(_) => panic!("expected the out-of-order engine"),
        }
    }

    /// Committed value of `R<index>`.
    pub fn reg(&self, index: usize) -> i32 {
        let reg = ArchReg::new(index).expect("register index in range");
        self.sim.cpu.regs.read(reg)
    }

    pub fn mem(&self, addr: i32) -> i32 {
        self.sim.read_memory(addr).expect("address in range")
    }

    pub fn stats(&self) -> &SimStats {
        self.sim.stats()
    }
}
