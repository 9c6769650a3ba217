//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the APEX simulator. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived metrics (CPI).
//! 2. **Instruction mix:** Counts by category (ALU, multiply, load, store, branch, other).
//! 3. **Branch prediction:** Resolved branches, mispredictions, flushes, and accuracy.
//! 4. **Stalls:** Fetch skips, BTB decode stalls, and per-structure dispatch stalls.
//! 5. **Memory:** Loads satisfied by store forwarding versus data memory.

use std::time::Instant;

use serde::Serialize;

use crate::isa::opcode::Opcode;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Count of integer ALU instructions retired (including compares and MOVC).
    pub inst_alu: u64,
    /// Count of multiply instructions retired.
    pub inst_mul: u64,
    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of branch/jump instructions retired.
    pub inst_branch: u64,
    /// Count of NOP/HALT instructions retired.
    pub inst_other: u64,

    /// Conditional branches whose fetched path was correct.
    pub branch_predictions: u64,
    /// Conditional branches whose fetched path was wrong.
    pub branch_mispredictions: u64,
    /// Pipeline flushes (one per redirect).
    pub flushes: u64,
    /// Instructions squashed from the backend by flushes.
    pub squashed: u64,

    /// Cycles fetch was skipped after a redirect.
    pub stalls_fetch_redirect: u64,
    /// Cycles decode stalled waiting for a new BTB entry.
    pub stalls_btb: u64,
    /// Cycles rename stalled on an empty free list.
    pub stalls_free_list: u64,
    /// Cycles dispatch stalled on a full ROB.
    pub stalls_rob_full: u64,
    /// Cycles dispatch stalled on a full issue queue.
    pub stalls_iq_full: u64,
    /// Cycles dispatch stalled on a full load/store queue.
    pub stalls_lsq_full: u64,
    /// Cycles dispatch stalled on a full branch queue.
    pub stalls_bq_full: u64,

    /// Loads whose value was forwarded from an older store.
    pub loads_forwarded: u64,
    /// Loads whose value was read from data memory.
    pub loads_from_memory: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_alu: 0,
            inst_mul: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_other: 0,
            branch_predictions: 0,
            branch_mispredictions: 0,
            flushes: 0,
            squashed: 0,
            stalls_fetch_redirect: 0,
            stalls_btb: 0,
            stalls_free_list: 0,
            stalls_rob_full: 0,
            stalls_iq_full: 0,
            stalls_lsq_full: 0,
            stalls_bq_full: 0,
            loads_forwarded: 0,
            loads_from_memory: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"instruction_mix"`, `"branch"`, `"stalls"`, `"memory"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "branch", "stalls", "memory"];

impl SimStats {
    /// Counts one retired instruction in the instruction mix.
    pub const fn record_retire(&mut self, opcode: Opcode) {
        self.instructions_retired += 1;
        match opcode {
            Opcode::Mul => self.inst_mul += 1,
            Opcode::Load | Opcode::Loadp => self.inst_load += 1,
            Opcode::Store | Opcode::Storep => self.inst_store += 1,
            Opcode::Bz
            | Opcode::Bnz
            | Opcode::Bp
            | Opcode::Bnp
            | Opcode::Bn
            | Opcode::Bnn
            | Opcode::Jump
            | Opcode::Jalr => self.inst_branch += 1,
            Opcode::Nop | Opcode::Halt => self.inst_other += 1,
            Opcode::Add
            | Opcode::Sub
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Addl
            | Opcode::Subl
            | Opcode::Movc
            | Opcode::Cmp
            | Opcode::Cml => self.inst_alu += 1,
        }
    }

    /// Instructions per cycle so far.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_retired as f64 / self.cycles as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1);
        let instr = self.instructions_retired.max(1);
        let pct = |n: u64, d: u64| (n as f64 / d as f64) * 100.0;

        if want("summary") {
            let cpi = cyc as f64 / instr as f64;
            println!("\n==========================================================");
            println!("APEX PIPELINE SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {:.4}", self.ipc());
            println!("sim_cpi                  {cpi:.4}");
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            println!("INSTRUCTION MIX");
            for (name, n) in [
                ("op.alu", self.inst_alu),
                ("op.mul", self.inst_mul),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
                ("op.other", self.inst_other),
            ] {
                println!("  {name:<22} {n} ({:.2}%)", pct(n, instr));
            }
            println!("----------------------------------------------------------");
        }
        if want("branch") {
            let total = self.branch_predictions + self.branch_mispredictions;
            let acc = if total > 0 {
                pct(self.branch_predictions, total)
            } else {
                0.0
            };
            println!("BRANCH PREDICTION");
            println!("  bp.resolved            {total}");
            println!("  bp.mispredicts         {}", self.branch_mispredictions);
            println!("  bp.accuracy            {acc:.2}%");
            println!("  pipeline.flushes       {}", self.flushes);
            println!("  pipeline.squashed      {}", self.squashed);
            println!("----------------------------------------------------------");
        }
        if want("stalls") {
            println!("STALLS");
            for (name, n) in [
                ("stalls.fetch_redirect", self.stalls_fetch_redirect),
                ("stalls.btb", self.stalls_btb),
                ("stalls.free_list", self.stalls_free_list),
                ("stalls.rob_full", self.stalls_rob_full),
                ("stalls.iq_full", self.stalls_iq_full),
                ("stalls.lsq_full", self.stalls_lsq_full),
                ("stalls.bq_full", self.stalls_bq_full),
            ] {
                println!("  {name:<22} {n} ({:.2}%)", pct(n, cyc));
            }
            println!("----------------------------------------------------------");
        }
        if want("memory") {
            println!("MEMORY");
            println!("  loads.forwarded        {}", self.loads_forwarded);
            println!("  loads.memory           {}", self.loads_from_memory);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
