//! Instruction pipeline implementation.
//!
//! This module contains the out-of-order pipeline and the structures it is
//! built from:
//! 1. **Frontend:** Fetch, Decode1 (BTB allocation) and Decode2 (rename).
//! 2. **Window:** Issue queue, reorder buffer, load/store queue and branch queue.
//! 3. **Registers:** Rename table, free lists, physical register files and forwarding buses.
//! 4. **Engines:** The execution engine trait, both backends and state snapshots.

/// Execution backends (in-order, out-of-order).
pub mod backend;

/// Branch queue of in-flight control instructions.
pub mod branch_queue;

/// Execution engine trait and enum dispatch.
pub mod engine;

/// Tag/data forwarding buses.
pub mod forwarding;

/// In-order frontend stages (fetch, decode1, decode2/rename).
pub mod frontend;

/// Issue queue with wakeup and oldest-first select.
pub mod issue_queue;

/// Double-buffered front-end latches.
pub mod latches;

/// Load/store queue.
pub mod lsq;

/// Physical register files.
pub mod prf;

/// Rename table and free lists.
pub mod rename_table;

/// Reorder buffer.
pub mod rob;

/// Serializable pipeline state snapshots.
pub mod snapshot;
