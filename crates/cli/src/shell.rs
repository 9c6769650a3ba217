//! Interactive menu.
//!
//! Commands are read one per line, case-insensitively, by name or by menu
//! number:
//!
//! ```text
//! 1 | Initialize          load the program and reset the machine
//! 2 | Simulate <n>        run until the clock reaches cycle n
//! 3 | Single_step         run one cycle and show the pipeline
//! 4 | Display             show the pipeline and the register file
//! 5 | ShowMem <addr>      show one data memory word
//! 6 | quit                leave the menu
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;

use apex_core::Simulator;
use apex_core::common::error::SimError;
use apex_core::config::Config;
use apex_core::core::pipeline::engine::CycleOutcome;
use apex_core::sim::RunOutcome;

const MENU: &str = "Enter a command(1-6):\n1.Initialize\n2.Simulate <no of cycles>\n3.Single_step\n4.Display\n5.ShowMem <address>\n6.quit";

/// One parsed menu command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Initialize,
    Simulate(u64),
    SingleStep,
    Display,
    ShowMem(i32),
    Quit,
}

fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or("").to_ascii_lowercase();
    let arg = words.next();
    fn parse_number<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<T, String> {
        arg.ok_or_else(|| format!("{what} expects an argument"))
            .and_then(|a| a.parse().map_err(|_| format!("'{a}' is not a number")))
    }
    match name.as_str() {
        "1" | "initialize" => Ok(Command::Initialize),
        "2" | "simulate" => parse_number(arg, "Simulate").map(Command::Simulate),
        "3" | "single_step" => Ok(Command::SingleStep),
        "4" | "display" => Ok(Command::Display),
        "5" | "showmem" => parse_number(arg, "ShowMem").map(Command::ShowMem),
        "6" | "quit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}'")),
    }
}

/// Menu state: the simulator exists once `Initialize` has run.
struct Shell<'a, W> {
    file: &'a Path,
    config: &'a Config,
    sim: Option<Simulator>,
    out: W,
}

impl<W: Write> Shell<'_, W> {
    fn complete(&mut self) -> io::Result<()> {
        if let Some(sim) = &self.sim {
            let stats = sim.stats();
            writeln!(
                self.out,
                "APEX_CPU: Simulation Complete, cycles = {} instructions = {}",
                stats.cycles, stats.instructions_retired
            )?;
        }
        Ok(())
    }

    fn report_error(&mut self, e: &SimError) -> io::Result<()> {
        writeln!(self.out, "APEX_CPU: {e}")
    }

    /// Runs one command; returns `false` when the menu should exit.
    fn execute(&mut self, command: Command) -> io::Result<bool> {
        if command == Command::Quit {
            return Ok(false);
        }
        if command == Command::Initialize {
            match Simulator::from_file(self.file, self.config) {
                Ok(sim) => {
                    self.sim = Some(sim);
                    writeln!(
                        self.out,
                        "APEX_CPU: Initialized APEX CPU, loaded {}",
                        self.file.display()
                    )?;
                }
                Err(e) => self.report_error(&e)?,
            }
            return Ok(true);
        }
        let Some(sim) = self.sim.as_mut() else {
            writeln!(
                self.out,
                "Error!! CPU has not been initialized yet, please perform Initialize step first!!"
            )?;
            return Ok(true);
        };

        match command {
            Command::Simulate(target) => match sim.run_until(target) {
                Ok(RunOutcome::Halted) => self.complete()?,
                Ok(RunOutcome::Paused) => {
                    let stats = sim.stats();
                    let line = format!(
                        "APEX_CPU: Simulation Stopped after = {} cycles instructions = {}",
                        stats.cycles, stats.instructions_retired
                    );
                    write!(self.out, "{}", sim.read_register_file())?;
                    writeln!(self.out, "{line}")?;
                }
                Err(SimError::CycleTargetPassed { .. }) => writeln!(
                    self.out,
                    "Reached end of simulation already!!! Please re initialize"
                )?,
                Err(e) => self.report_error(&e)?,
            },
            Command::SingleStep => {
                let outcome = sim.step();
                let state = sim.read_pipeline_state();
                match outcome {
                    Ok(CycleOutcome::Running) => {
                        writeln!(self.out, "Clock Cycle #: {}", sim.clock())?;
                        write!(self.out, "{state}")?;
                    }
                    Ok(CycleOutcome::Halted) => self.complete()?,
                    Err(e) => self.report_error(&e)?,
                }
            }
            Command::Display => {
                let state = sim.read_pipeline_state();
                let regs = sim.read_register_file();
                write!(self.out, "{state}{regs}")?;
            }
            Command::ShowMem(addr) => match sim.read_memory(addr) {
                Ok(value) => writeln!(self.out, "MEM[{addr}] = {value}")?,
                Err(e) => self.report_error(&e)?,
            },
            Command::Initialize | Command::Quit => {}
        }
        Ok(true)
    }
}

/// Runs the menu over `input` until `quit` or end of input.
pub fn run(file: &Path, config: &Config, input: impl BufRead) -> io::Result<()> {
    let stdout = io::stdout();
    let mut shell = Shell {
        file,
        config,
        sim: None,
        out: stdout.lock(),
    };
    drive(&mut shell, input)?;
    if let Some(sim) = &shell.sim {
        sim.stats().print();
    }
    Ok(())
}

fn drive<W: Write>(shell: &mut Shell<'_, W>, input: impl BufRead) -> io::Result<()> {
    writeln!(shell.out, "{MENU}")?;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let keep_going = match parse(&line) {
            Ok(command) => shell.execute(command)?,
            Err(msg) => {
                writeln!(shell.out, "{msg}")?;
                true
            }
        };
        if !keep_going {
            break;
        }
        shell.out.flush()?;
    }
    Ok(())
}
