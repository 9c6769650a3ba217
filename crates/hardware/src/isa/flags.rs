//! Condition-code flags.

use std::fmt;

use serde::Serialize;

/// Zero / positive / negative flags produced by arithmetic and compare
/// instructions and consumed by conditional branches.
///
/// At most one flag is set for any value produced by [`ConditionCode::from_result`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ConditionCode {
    /// Result was zero.
    pub zero: bool,
    /// Result was strictly positive.
    pub positive: bool,
    /// Result was strictly negative.
    pub negative: bool,
}

impl ConditionCode {
    /// Flags describing `result`.
    pub const fn from_result(result: i32) -> Self {
        Self {
            zero: result == 0,
            positive: result > 0,
            negative: result < 0,
        }
    }

    /// Flags of a signed comparison `lhs` against `rhs`.
    ///
    /// Compares without wrapping, so `CMP` of two large values of opposite
    /// sign still orders them correctly.
    pub fn compare(lhs: i32, rhs: i32) -> Self {
        Self::from_result(match lhs.cmp(&rhs) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        })
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Z={} P={} N={}",
            u8::from(self.zero),
            u8::from(self.positive),
            u8::from(self.negative)
        )
    }
}
