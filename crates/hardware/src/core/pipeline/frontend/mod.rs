//! Frontend pipeline stages of the out-of-order engine.
//!
//! The frontend is in order and handles:
//! Fetch -> Decode1 (BTB allocation) -> Decode2 (rename)
//!
//! Each stage is a free function that reads its input latch from the previous
//! cycle and returns what it places in its output latch this cycle.

pub mod decode;
pub mod fetch;
pub mod rename;

use crate::common::constants::CODE_BASE;
use crate::core::units::bru::btb::Btb;

/// Program counter and prediction state shared by the frontend stages.
#[derive(Debug)]
pub struct Frontend {
    /// Next PC to fetch.
    pub pc: u32,
    /// Cleared once a `HALT` has been fetched.
    pub fetch_enabled: bool,
    /// Skip fetching for one cycle after a redirect.
    pub skip_fetch: bool,
    /// Branch target buffer.
    pub btb: Btb,
}

impl Frontend {
    /// Creates a frontend fetching from the start of code memory.
    pub fn new(btb_size: usize) -> Self {
        Self {
            pc: CODE_BASE,
            fetch_enabled: true,
            skip_fetch: false,
            btb: Btb::new(btb_size),
        }
    }

    /// Redirects fetch to `target` after a misprediction.
    ///
    /// Fetch resumes even if a `HALT` on the wrong path disabled it, after
    /// skipping one cycle.
    pub const fn redirect(&mut self, target: u32) {
        self.pc = target;
        self.fetch_enabled = true;
        self.skip_fetch = true;
    }
}
