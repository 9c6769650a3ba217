//! Pipeline state snapshots.
//!
//! A snapshot is an owned copy of the microarchitectural state taken between
//! cycles. It serializes with serde for tooling and renders as text for the
//! interactive `Display` command.

use std::fmt;

use serde::Serialize;

use crate::common::reg::{ArchReg, CcReg, PhysReg};
use crate::core::pipeline::branch_queue::BqEntry;
use crate::core::pipeline::forwarding::BusSlot;
use crate::core::pipeline::issue_queue::{IqEntry, Operand};
use crate::core::pipeline::latches::{FrontEntry, Latches, RenamedEntry};
use crate::core::pipeline::lsq::{LsqEntry, MemKind};
use crate::core::pipeline::prf::PhysEntry;
use crate::core::pipeline::rob::RobEntry;
use crate::core::units::bru::btb::BtbEntry;
use crate::core::units::mau::MauOp;
use crate::isa::flags::ConditionCode;
use crate::isa::instruction::Instruction;

/// Microarchitectural state of either engine.
#[derive(Clone, Debug, Serialize)]
pub enum PipelineSnapshot {
    /// In-order engine state.
    InOrder(InOrderSnapshot),
    /// Out-of-order engine state.
    OutOfOrder(Box<O3Snapshot>),
}

/// State of the in-order engine.
#[derive(Clone, Debug, Serialize)]
pub struct InOrderSnapshot {
    /// PC of the next instruction.
    pub pc: u32,
    /// Instruction at that PC, if any.
    pub next: Option<Instruction>,
    /// Whether the engine has stopped.
    pub halted: bool,
}

/// Instructions held by the functional units.
#[derive(Clone, Debug, Serialize)]
pub struct UnitsSnapshot {
    /// Integer unit input.
    pub int: Option<IqEntry>,
    /// Multiply in flight and cycles remaining.
    pub mul: Option<(IqEntry, u32)>,
    /// Address unit input.
    pub afu: Option<IqEntry>,
    /// Branch unit input.
    pub bfu: Option<IqEntry>,
    /// Memory operation in flight and cycles elapsed.
    pub mau: Option<(MauOp, u32)>,
}

/// State of the out-of-order engine.
#[derive(Clone, Debug, Serialize)]
pub struct O3Snapshot {
    /// Next fetch PC.
    pub pc: u32,
    /// Fetch has not been stopped by `HALT`.
    pub fetch_enabled: bool,
    /// Fetch will idle next cycle after a redirect.
    pub skip_fetch: bool,
    /// Front-end latches.
    pub latches: Latches,
    /// Architectural to physical mapping.
    pub rename_table: Vec<(ArchReg, PhysReg)>,
    /// Current condition-code mapping.
    pub cc_mapping: CcReg,
    /// Free general-purpose registers, in allocation order.
    pub gpr_free: Vec<PhysReg>,
    /// Free condition-code registers, in allocation order.
    pub cc_free: Vec<CcReg>,
    /// General-purpose physical register file.
    pub prf: Vec<PhysEntry<i32>>,
    /// Condition-code physical register file.
    pub cc_prf: Vec<PhysEntry<ConditionCode>>,
    /// Issue queue entries.
    pub iq: Vec<IqEntry>,
    /// ROB entries, head first.
    pub rob: Vec<RobEntry>,
    /// LSQ entries with their slot index, head first.
    pub lsq: Vec<(usize, LsqEntry)>,
    /// Branch queue entries, oldest first.
    pub bq: Vec<BqEntry>,
    /// BTB entries, oldest first.
    pub btb: Vec<BtbEntry>,
    /// Active general-purpose bus slots.
    pub gpr_bus: Vec<BusSlot<PhysReg, i32>>,
    /// Active condition-code bus slots.
    pub cc_bus: Vec<BusSlot<CcReg, ConditionCode>>,
    /// Functional unit contents.
    pub units: UnitsSnapshot,
}

struct Opnd<'a>(&'a Option<Operand>);

impl fmt::Display for Opnd<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(Operand {
                tag,
                value: Some(v),
            }) => write!(f, "{tag}={v}"),
            Some(Operand { tag, value: None }) => write!(f, "{tag}=?"),
            None => f.write_str("-"),
        }
    }
}

fn front_line(f: &mut fmt::Formatter<'_>, stage: &str, e: Option<&FrontEntry>) -> fmt::Result {
    match e {
        Some(e) => writeln!(f, "{stage:<10} pc({}) {}", e.pc, e.inst),
        None => writeln!(f, "{stage:<10} Empty"),
    }
}

fn renamed_line(f: &mut fmt::Formatter<'_>, e: Option<&RenamedEntry>) -> fmt::Result {
    let Some(e) = e else {
        return writeln!(f, "{:<10} Empty", "Decode2");
    };
    write!(f, "{:<10} pc({}) {}", "Decode2", e.pc, e.inst)?;
    if let Some(d) = e.dest {
        write!(f, " [{}->{}]", d.arch, d.phys)?;
    }
    if let Some(fault) = e.fault {
        write!(f, " fault={fault:?}")?;
    }
    writeln!(f)
}

fn iq_line(f: &mut fmt::Formatter<'_>, e: &IqEntry) -> fmt::Result {
    write!(
        f,
        "  #{:<4} pc({}) {:<6} {:?} src1={} src2={}",
        e.tag.0,
        e.pc,
        e.opcode,
        e.class,
        Opnd(&e.src1),
        Opnd(&e.src2)
    )?;
    if let Some(cc) = e.cc_src {
        match cc.value {
            Some(v) => write!(f, " cc={}=({v})", cc.tag)?,
            None => write!(f, " cc={}=?", cc.tag)?,
        }
    }
    writeln!(f)
}

impl fmt::Display for O3Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--------------------------------")?;
        writeln!(
            f,
            "PC={} fetch={} skip={}",
            self.pc,
            if self.fetch_enabled { "on" } else { "off" },
            self.skip_fetch
        )?;
        front_line(f, "Fetch", self.latches.fetch_decode1.as_ref())?;
        front_line(f, "Decode1", self.latches.decode1_decode2.as_ref())?;
        renamed_line(f, self.latches.decode2_dispatch.as_ref())?;

        writeln!(f, "\n=== RENAME TABLE ===")?;
        for chunk in self.rename_table.chunks(4) {
            for (arch, phys) in chunk {
                write!(f, "  {arch:<4}-> {phys:<5}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  CC  -> {}", self.cc_mapping)?;
        writeln!(
            f,
            "  free: {} gpr, {} cc",
            self.gpr_free.len(),
            self.cc_free.len()
        )?;

        writeln!(f, "\n=== PHYSICAL REGISTERS ===")?;
        for (i, e) in self.prf.iter().enumerate().filter(|(_, e)| e.valid) {
            writeln!(f, "  P{i:<3} = {:<8} valid", e.value)?;
        }

        writeln!(f, "\n=== ISSUE QUEUE ({}) ===", self.iq.len())?;
        for e in &self.iq {
            iq_line(f, e)?;
        }

        writeln!(f, "\n=== REORDER BUFFER ({}) ===", self.rob.len())?;
        for e in &self.rob {
            write!(f, "  #{:<4} pc({}) {:<20} {:?}", e.tag.0, e.pc, e.inst.to_string(), e.state)?;
            if let Some(d) = e.dest {
                write!(f, " {}->{} (prev {})", d.arch, d.phys, d.prev)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n=== LOAD/STORE QUEUE ({}) ===", self.lsq.len())?;
        for (i, e) in &self.lsq {
            let kind = match e.kind {
                MemKind::Load => "LOAD ",
                MemKind::Store => "STORE",
            };
            let addr = e.addr.map_or_else(|| "?".to_string(), |a| a.to_string());
            let data = e.data.map_or_else(|| "?".to_string(), |d| d.to_string());
            writeln!(
                f,
                "  [{i:>2}] #{:<4} {kind} addr={addr} data={data}{}",
                e.tag.0,
                if e.issued { " issued" } else { "" }
            )?;
        }

        writeln!(f, "\n=== BRANCH QUEUE ({}) ===", self.bq.len())?;
        for e in &self.bq {
            writeln!(
                f,
                "  #{:<4} pc({}) {:<4} predicted {} -> {}",
                e.tag.0,
                e.pc,
                e.opcode,
                if e.predicted_taken { "T" } else { "N" },
                e.predicted_next
            )?;
        }

        writeln!(f, "\n=== BTB ===")?;
        for e in &self.btb {
            let [a, b] = e.history.bits();
            writeln!(f, "  pc({}) history={{{a},{b}}} target={}", e.pc, e.target)?;
        }

        writeln!(f, "\n=== FUNCTIONAL UNITS ===")?;
        let unit = |e: &Option<IqEntry>| {
            e.as_ref()
                .map_or_else(|| "Empty".to_string(), |e| format!("#{} {}", e.tag.0, e.opcode))
        };
        writeln!(f, "  INT  {}", unit(&self.units.int))?;
        match &self.units.mul {
            Some((e, left)) => writeln!(f, "  MUL  #{} {} ({left} left)", e.tag.0, e.opcode)?,
            None => writeln!(f, "  MUL  Empty")?,
        }
        writeln!(f, "  AFU  {}", unit(&self.units.afu))?;
        writeln!(f, "  BFU  {}", unit(&self.units.bfu))?;
        match self.units.mau {
            Some((op, elapsed)) => writeln!(f, "  MAU  #{} {op:?} ({elapsed} elapsed)", op.tag().0)?,
            None => writeln!(f, "  MAU  Empty")?,
        }

        if !self.gpr_bus.is_empty() || !self.cc_bus.is_empty() {
            writeln!(f, "\n=== FORWARDING BUS ===")?;
            for s in &self.gpr_bus {
                writeln!(f, "  {} = {} tag_broadcasted={}", s.tag, s.data, s.tag_broadcasted)?;
            }
            for s in &self.cc_bus {
                writeln!(f, "  {} = ({}) tag_broadcasted={}", s.tag, s.data, s.tag_broadcasted)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for InOrderSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--------------------------------")?;
        match &self.next {
            Some(inst) => writeln!(f, "Execute   pc({}) {inst}", self.pc)?,
            None => writeln!(f, "Execute   Empty")?,
        }
        if self.halted {
            writeln!(f, "(halted)")?;
        }
        Ok(())
    }
}

impl fmt::Display for PipelineSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InOrder(s) => s.fmt(f),
            Self::OutOfOrder(s) => s.fmt(f),
        }
    }
}
