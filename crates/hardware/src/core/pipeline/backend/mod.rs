//! Execution backends.
//!
//! Two engines drive the same architectural state:
//! - [`inorder`]: scalar, one instruction per cycle, the functional reference.
//! - [`o3`]: out-of-order with renaming, issue queue, ROB, LSQ and BQ.

pub mod inorder;
pub mod o3;
