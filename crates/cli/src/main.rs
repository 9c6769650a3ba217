//! APEX cycle-accurate simulator CLI.
//!
//! This binary provides the two ways of driving a simulation:
//! 1. **Batch run:** Load an instruction file, run to completion or a cycle budget, report.
//! 2. **Shell:** The interactive menu (`Initialize`, `Simulate`, `Single_step`, `Display`,
//!    `ShowMem`, `quit`) reading commands from standard input.
//!
//! Logging goes to stderr through `tracing-subscriber`; set `RUST_LOG=apex_core=debug`
//! to see flushes and halts, or `trace` together with `trace_instructions` for a
//! commit trace.

mod shell;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{fs, io};

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use apex_core::Simulator;
use apex_core::common::error::SimError;
use apex_core::config::{BackendType, Config};
use apex_core::sim::RunOutcome;
use apex_core::stats::STATS_SECTIONS;

/// Cycle budget of `run` when `--cycles` is not given.
const DEFAULT_CYCLE_BUDGET: u64 = 1_000_000;

#[derive(Parser, Debug)]
#[command(
    name = "apex-sim",
    author,
    version,
    about = "APEX cycle-accurate out-of-order pipeline simulator",
    long_about = "Run an APEX instruction file in batch mode or drive it from the interactive menu.\n\nExamples:\n  apex-sim run programs/sum.asm\n  apex-sim run programs/sum.asm --cycles 40 --display\n  apex-sim run programs/sum.asm --engine in-order\n  apex-sim run programs/sum.asm --stats summary,branch\n  apex-sim shell programs/sum.asm --config cfg.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program to completion or until the cycle budget is spent.
    Run {
        /// Instruction file to execute.
        file: PathBuf,

        /// Maximum number of cycles to simulate.
        #[arg(short, long)]
        cycles: Option<u64>,

        /// JSON configuration document.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Execution engine (overrides the configuration).
        #[arg(long, value_enum)]
        engine: Option<Engine>,

        /// Print the pipeline state after the run.
        #[arg(long)]
        display: bool,

        /// Print the statistics as JSON instead of the text report.
        #[arg(long)]
        json: bool,

        /// Statistics sections to print (comma-separated); all when omitted.
        #[arg(
            long,
            value_delimiter = ',',
            value_parser = PossibleValuesParser::new(STATS_SECTIONS.iter().copied())
        )]
        stats: Vec<String>,
    },

    /// Interactive menu reading commands from standard input.
    Shell {
        /// Instruction file to load on `Initialize`.
        file: PathBuf,

        /// JSON configuration document.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Execution engine (overrides the configuration).
        #[arg(long, value_enum)]
        engine: Option<Engine>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Engine {
    /// Scalar in-order reference engine.
    InOrder,
    /// Out-of-order engine.
    OutOfOrder,
}

impl From<Engine> for BackendType {
    fn from(engine: Engine) -> Self {
        match engine {
            Engine::InOrder => Self::InOrder,
            Engine::OutOfOrder => Self::OutOfOrder,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result: Result<(), Box<dyn Error>> = match cli.command {
        Commands::Run {
            file,
            cycles,
            config,
            engine,
            display,
            json,
            stats,
        } => load_config(config.as_deref(), engine).and_then(|config| {
            let report = Report {
                display,
                json,
                sections: stats,
            };
            cmd_run(
                &file,
                &config,
                cycles.unwrap_or(DEFAULT_CYCLE_BUDGET),
                &report,
            )
        })
        .map_err(Into::into),
        Commands::Shell {
            file,
            config,
            engine,
        } => load_config(config.as_deref(), engine)
            .map_err(Box::<dyn Error>::from)
            .and_then(|config| Ok(shell::run(&file, &config, io::stdin().lock())?)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Reads the configuration document, if any, and applies the engine override.
fn load_config(path: Option<&Path>, engine: Option<Engine>) -> Result<Config, SimError> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                SimError::InvalidConfig(format!("cannot read '{}': {e}", path.display()))
            })?;
            Config::from_json(&text)?
        }
        None => Config::default(),
    };
    if let Some(engine) = engine {
        config.general.backend = engine.into();
    }
    Ok(config)
}

/// What `run` prints after the simulation.
#[derive(Debug)]
struct Report {
    display: bool,
    json: bool,
    sections: Vec<String>,
}

/// Runs a program in batch mode and prints the final state.
fn cmd_run(file: &Path, config: &Config, cycles: u64, report: &Report) -> Result<(), SimError> {
    tracing::debug!(?config, "configuration");
    let mut sim = Simulator::from_file(file, config)?;
    println!(
        "Running {} on the {:?} engine (budget {cycles} cycles)",
        file.display(),
        sim.backend_type()
    );

    let outcome = sim.run(cycles);
    let stats = sim.stats();
    match &outcome {
        Ok(RunOutcome::Halted) => println!(
            "APEX_CPU: Simulation Complete, cycles = {} instructions = {}",
            stats.cycles, stats.instructions_retired
        ),
        Ok(RunOutcome::Paused) => println!(
            "APEX_CPU: Simulation Stopped after = {} cycles instructions = {}",
            stats.cycles, stats.instructions_retired
        ),
        Err(e) => println!("APEX_CPU: Simulation Aborted at cycle {}: {e}", stats.cycles),
    }

    print!("{}", sim.read_register_file());
    if report.display {
        print!("{}", sim.read_pipeline_state());
    }
    if report.json {
        match serde_json::to_string_pretty(sim.stats()) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("error: cannot serialize statistics: {e}"),
        }
    } else {
        sim.stats().print_sections(&report.sections);
    }

    outcome.map(|_| ())
}
