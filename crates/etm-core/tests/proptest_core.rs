//! Property tests for the core ETM invariants.
//!
//! These use `proptest` to hammer the phase arithmetic and ledger with
//! random inputs and verify the universal properties: phase closure,
//! support nonnegativity, decay bounds, and memory range.

use etm_core::prelude::*;
use proptest::prelude::*;

/// Strategy for valid phases in `[0, 1)`.
fn valid_phase() -> impl Strategy<Value = f64> {
    (0u32..1_000_000u32).prop_map(|v| v as f64 / 1_000_000.0)
}

/// Strategy for bounded deltas, positive and negative.
fn delta() -> impl Strategy<Value = f64> {
    (-500_000i32..500_000i32).prop_map(|v| v as f64 / 100_000.0)
}

/// Strategy for small nonnegative reals (support amounts, decay rates).
fn small_nonneg() -> impl Strategy<Value = f64> {
    (0u32..100_000u32).prop_map(|v| v as f64 / 100_000.0)
}

proptest! {
    // -- phase closure ------------------------------------------------------

    #[test]
    fn advance_stays_in_unit_interval(p in valid_phase(), d in delta()) {
        let next = phase::advance(p, d);
        prop_assert!((0.0..1.0).contains(&next), "advance({p}, {d}) = {next}");
    }

    #[test]
    fn advance_chain_stays_closed(p in valid_phase(), ds in prop::collection::vec(delta(), 1..200)) {
        let mut cur = p;
        for d in ds {
            cur = phase::advance(cur, d);
            prop_assert!((0.0..1.0).contains(&cur));
        }
    }

    // -- circular distance --------------------------------------------------

    #[test]
    fn distance_bounded_and_symmetric(a in valid_phase(), b in valid_phase()) {
        let d = phase::circular_distance(a, b);
        prop_assert!((0.0..=0.5).contains(&d));
        prop_assert!((d - phase::circular_distance(b, a)).abs() < 1e-12);
    }

    #[test]
    fn distance_zero_iff_equal(a in valid_phase()) {
        prop_assert!(phase::circular_distance(a, a) < 1e-12);
    }

    #[test]
    fn shortest_arc_lands_on_target(a in valid_phase(), b in valid_phase()) {
        let err = phase::shortest_arc(a, b);
        prop_assert!((-0.5..=0.5).contains(&err));
        let landed = phase::advance(a, err);
        prop_assert!(phase::circular_distance(landed, b) < 1e-9);
    }

    // -- ledger nonnegativity and decay bound -------------------------------

    #[test]
    fn ledger_never_negative(
        amounts in prop::collection::vec((0usize..3, small_nonneg()), 1..100),
        rate in small_nonneg(),
    ) {
        let tags = [Ancestry::new("a"), Ancestry::new("b"), Ancestry::new("c")];
        let mut ledger = SupportLedger::per_ancestry(tags.clone());

        for (idx, amount) in amounts {
            ledger.accumulate(&tags[idx], amount);
            let before: Vec<f64> = ledger.entries().map(|(_, s)| s).collect();
            ledger.decay(rate);
            // Every score stays nonnegative and drops by at most `rate`.
            for ((_, after), before) in ledger.entries().zip(before) {
                prop_assert!(after >= 0.0);
                prop_assert!(before - after <= rate + 1e-12);
            }
        }
    }

    #[test]
    fn accumulate_is_monotone(
        first in small_nonneg(),
        second in small_nonneg(),
    ) {
        let tag = Ancestry::new("x");
        let mut ledger = SupportLedger::per_ancestry([tag.clone()]);
        ledger.accumulate(&tag, first);
        let mid = ledger.score(&tag);
        ledger.accumulate(&tag, second);
        prop_assert!(ledger.score(&tag) >= mid);
    }

    // -- identity memory range ----------------------------------------------

    #[test]
    fn identity_memory_stays_bounded(
        increments in prop::collection::vec(small_nonneg(), 1..100),
    ) {
        let mut node = IdentityNode::new("n", 0.0);
        for amount in increments {
            node.tick_forward(0.05);
            node.reinforce_memory(amount);
            prop_assert!((0.0..=1.0).contains(&node.memory()));
            prop_assert!((0.0..1.0).contains(&node.phase()));
        }
    }

    // -- recruiter support nonnegativity under echo + decay -----------------

    #[test]
    fn recruiter_support_nonnegative_under_traffic(
        ops in prop::collection::vec((valid_phase(), small_nonneg(), any::<bool>()), 1..100),
    ) {
        let p = Ancestry::new("H1_proton");
        let n = Ancestry::new("H2_neutron");
        let mut rec = RecruiterNode::new("z", 0.0)
            .with_ledger(SupportLedger::per_ancestry([p.clone(), n.clone()]));

        for (tick, (phase_v, strength, use_p)) in ops.into_iter().enumerate() {
            let ancestry = if use_p { p.clone() } else { n.clone() };
            let echo = Echo::from_identity(ancestry, phase_v, strength);
            rec.receive_echo(&echo, PhaseCompareMode::Circular, tick as u64 + 1);
            rec.decay_reinforcement(0.002);
            prop_assert!(rec.ledger().score(&p) >= 0.0);
            prop_assert!(rec.ledger().score(&n) >= 0.0);
        }
    }
}
