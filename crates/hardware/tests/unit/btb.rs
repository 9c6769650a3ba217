//! Branch Target Buffer (BTB) Tests.
//!
//! Verifies the two-bit history transitions and the oldest-first replacement
//! of the fully associative table.

use apex_core::core::units::bru::btb::{BranchHistory, Btb};
use proptest::prelude::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. History transitions
// ══════════════════════════════════════════════════════════

#[test]
fn two_not_taken_flip_a_strongly_taken_branch() {
    let h = BranchHistory::StronglyTaken;
    let h1 = h.next(false);
    assert!(h1.predicts_taken(), "one not-taken outcome keeps the prediction");
    let h2 = h1.next(false);
    assert!(!h2.predicts_taken(), "two not-taken outcomes flip it");
    assert_eq!(h2.next(false), BranchHistory::StronglyNotTaken);
    assert_eq!(h2.next(false).next(false), BranchHistory::StronglyNotTaken);
}

#[rstest]
#[case(BranchHistory::StronglyTaken, [1, 1])]
#[case(BranchHistory::WeaklyTaken, [1, 0])]
#[case(BranchHistory::WeaklyNotTaken, [0, 1])]
#[case(BranchHistory::StronglyNotTaken, [0, 0])]
fn history_bits(#[case] history: BranchHistory, #[case] bits: [u8; 2]) {
    assert_eq!(history.bits(), bits);
}

proptest! {
    #[test]
    fn two_equal_outcomes_decide_the_prediction(
        start in prop::sample::select(BranchHistory::ALL.to_vec()),
        prefix in prop::collection::vec(any::<bool>(), 0..16),
        outcome in any::<bool>(),
    ) {
        let mut h = prefix.iter().fold(start, |h, &t| h.next(t));
        h = h.next(outcome).next(outcome);
        prop_assert_eq!(h.predicts_taken(), outcome);
    }

    #[test]
    fn three_equal_outcomes_saturate(
        start in prop::sample::select(BranchHistory::ALL.to_vec()),
        outcome in any::<bool>(),
    ) {
        let h = start.next(outcome).next(outcome).next(outcome);
        let strong = if outcome {
            BranchHistory::StronglyTaken
        } else {
            BranchHistory::StronglyNotTaken
        };
        prop_assert_eq!(h, strong);
    }
}

// ══════════════════════════════════════════════════════════
// 2. Table management
// ══════════════════════════════════════════════════════════

#[test]
fn lookup_empty_returns_none() {
    let btb = Btb::new(4);
    assert_eq!(btb.lookup(4000), None);
}

#[test]
fn update_moves_history() {
    let mut btb = Btb::new(4);
    btb.insert(4008, BranchHistory::StronglyTaken, 4000);
    btb.update(4008, false);
    btb.update(4008, false);
    let e = btb.lookup(4008).unwrap();
    assert_eq!(e.history, BranchHistory::WeaklyNotTaken);
    assert_eq!(e.target, 4000, "target is unchanged by outcomes");
}

#[test]
fn full_table_evicts_oldest_entry() {
    let mut btb = Btb::new(2);
    btb.insert(4000, BranchHistory::StronglyTaken, 4100);
    btb.insert(4004, BranchHistory::StronglyTaken, 4200);
    btb.insert(4008, BranchHistory::StronglyNotTaken, 4300);
    assert!(!btb.contains(4000), "oldest entry evicted");
    assert!(btb.contains(4004));
    assert!(btb.contains(4008));
    assert_eq!(btb.entries().count(), 2);
}
