//! End-to-end lock-in scenarios: quorum lock timing, intruder exclusion,
//! and spin-distinguished coexistence.

use etm_engine::prelude::*;

/// The canonical pair lock-in lattice: six accept-any recruiters at phase
/// 0.0, a proton/neutron identity pair dropped together at `drop_tick`,
/// pre-drop reinforcement every 3 ticks so support is ready the moment the
/// pair lands, and adaptive recruiters tracking the pair's rhythm.
fn pair_lock_scenario(ticks: u64, with_intruder: bool) -> Scenario {
    const DROP_TICK: u64 = 30;

    let mut builder = Scenario::builder()
        .ticks(ticks)
        .respect_node_phase_increment(true)
        .phase_increment(0.01)
        .phase_tolerance(0.11)
        .reinforcement_amount(0.02)
        .reinforcement_decay(0.002)
        .reinforcement_threshold(0.1)
        .lock_in_threshold(20)
        .lock_in_quorum(4)
        .per_ancestry_ledger(true)
        .adaptive_recruiters(true)
        .adapt_rate(0.1)
        .echo_interval(3)
        .signature_locking(true);

    for i in 0..6 {
        builder = builder.recruiter(RecruiterSpec::new(format!("Z_{i}"), 0.0));
    }
    builder = builder
        .identity(
            IdentitySpec::new("identity_P", 0.0)
                .ancestry("H1_proton")
                .starts_inactive(),
        )
        .identity(
            IdentitySpec::new("identity_N", 0.0)
                .ancestry("H2_neutron")
                .starts_inactive(),
        );

    // Pre-drop reinforcement keeps both ancestries above the readiness
    // floor from the moment the pair lands.
    for t in (0..DROP_TICK).step_by(3) {
        for tag in ["H1_proton", "H2_neutron"] {
            builder = builder.event(
                t,
                EventKind::Reinforce {
                    ancestry: tag.into(),
                    strength: 0.02,
                    recruiters: None,
                },
            );
        }
    }
    for id in ["identity_P", "identity_N"] {
        builder = builder.event(
            DROP_TICK,
            EventKind::Drop {
                identity: id.to_owned(),
                phase: 0.0,
            },
        );
    }

    if with_intruder {
        builder = builder
            .identity(
                IdentitySpec::new("identity_I", 0.0)
                    .ancestry("H1_proton")
                    .starts_inactive(),
            )
            // Five ticks after the lock fires at tick 50.
            .event(
                55,
                EventKind::Drop {
                    identity: "identity_I".to_owned(),
                    phase: 0.0,
                },
            );
    }

    builder.build().expect("valid scenario")
}

// ---------------------------------------------------------------------------
// S5: lock-in with quorum 4 of 6, threshold 20
// ---------------------------------------------------------------------------

#[test]
fn s5_lock_fires_exactly_at_drop_plus_threshold() {
    let report = ScenarioRuntime::new(pair_lock_scenario(60, false))
        .expect("valid runtime")
        .run()
        .expect("run completes");

    // Drop at tick 30 (0-indexed) + 20-tick streak = lock at tick 50 in
    // the 1-indexed log.
    assert!(report.summary.locked);
    assert_eq!(report.summary.lock_tick, Some(50));
    assert_eq!(report.trace.first_locked_tick(), Some(50));

    // Quorum held at >= 4 for the 20 consecutive ticks ending at the lock.
    for tick in 31..=50 {
        let obs = report.trace.at_tick(tick).expect("tick recorded");
        assert!(
            obs.quorum >= 4,
            "tick {tick}: quorum {} below lock quorum",
            obs.quorum
        );
    }
    // Before the drop there is no rhythm, hence no quorum and no streak.
    for tick in 1..=30 {
        let obs = report.trace.at_tick(tick).expect("tick recorded");
        assert_eq!(obs.quorum, 0, "tick {tick}: quorum without active identities");
        assert_eq!(obs.lock_streak, 0);
    }
}

#[test]
fn s5_lock_is_monotone_for_the_rest_of_the_run() {
    let report = ScenarioRuntime::new(pair_lock_scenario(60, false))
        .expect("valid runtime")
        .run()
        .expect("run completes");

    for obs in report.trace.observations() {
        if obs.tick >= 50 {
            assert!(obs.locked, "tick {}: lock must not release", obs.tick);
            assert_eq!(obs.lock_tick, Some(50), "tick {}: lock tick drifted", obs.tick);
        } else {
            assert!(!obs.locked, "tick {}: locked early", obs.tick);
        }
    }
}

// ---------------------------------------------------------------------------
// S6: intruder exclusion after lock
// ---------------------------------------------------------------------------

#[test]
fn s6_intruder_is_excluded_after_lock() {
    let report = ScenarioRuntime::new(pair_lock_scenario(70, true))
        .expect("valid runtime")
        .run()
        .expect("run completes");

    // The intruder's arrival never disturbs the lock.
    assert_eq!(report.summary.lock_tick, Some(50));

    // The signature set holds exactly the pair's keys; the intruder never
    // acquires one.
    assert_eq!(report.lock_signatures.len(), 2);
    let owners: Vec<&str> = report
        .lock_signatures
        .iter()
        .map(|(_, owner)| owner.as_str())
        .collect();
    assert!(owners.contains(&"identity_P"));
    assert!(owners.contains(&"identity_N"));
    assert!(!owners.contains(&"identity_I"));

    // All recruiter bindings belong to the original pair's entry; the
    // intruder bound nothing.
    assert_eq!(report.summary.total_locks, 6);

    // The intruder is alive and ticking, just refused.
    let final_intruder = report
        .summary
        .final_identities
        .iter()
        .find(|s| s.id == "identity_I")
        .expect("intruder in summary");
    assert!(final_intruder.tick > 0);
}

// ---------------------------------------------------------------------------
// S7: spin-distinguished coexistence
// ---------------------------------------------------------------------------

#[test]
fn s7_opposite_spins_coexist_with_independent_signatures() {
    let mut builder = Scenario::builder()
        .ticks(10)
        .respect_node_phase_increment(true)
        .phase_increment(0.0)
        .reinforcement_amount(0.2)
        .per_ancestry_ledger(true)
        .signature_locking(true)
        .identity(IdentitySpec::new("A_up", 0.0).ancestry("rotor-A").spin(Spin::Up))
        .identity(
            IdentitySpec::new("A_down", 0.0)
                .ancestry("rotor-A")
                .spin(Spin::Down),
        );
    for (i, spin) in [(0, Spin::Up), (1, Spin::Up), (2, Spin::Down), (3, Spin::Down)] {
        let id = format!("field_{i}");
        builder = builder.recruiter(RecruiterSpec::new(id, 0.0).tolerance(0.11).spin(spin));
    }
    let report = ScenarioRuntime::new(builder.build().expect("valid scenario"))
        .expect("valid runtime")
        .run()
        .expect("run completes");

    // Both identities hold signatures differing only by spin.
    assert_eq!(report.lock_signatures.len(), 2);
    let mut keys: Vec<(&str, i64, Option<Spin>)> = report
        .lock_signatures
        .iter()
        .map(|(key, owner)| (owner.as_str(), key.phase_bucket, key.spin))
        .collect();
    keys.sort_by(|a, b| a.0.cmp(b.0));
    assert_eq!(
        keys,
        vec![
            ("A_down", 0, Some(Spin::Down)),
            ("A_up", 0, Some(Spin::Up)),
        ]
    );
    for (key, _) in &report.lock_signatures {
        assert_eq!(key.ancestry.as_str(), "rotor-A");
    }

    // Two spin-matched recruiters each: no exclusion in either direction.
    assert_eq!(report.summary.total_locks, 4);
}
