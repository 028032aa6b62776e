//! Typed per-tick observation records.
//!
//! The legacy trial drivers logged each tick as a free-form dictionary.
//! Here the observation is a closed struct: what the scenario asked to
//! record is captured once per tick, with the rounding the historical logs
//! used (6 decimals for phases, 4 for average support), and the
//! [`TickTrace`] keeps them append-only for the whole run.
//!
//! Serialization is plain serde; no formatting happens inside the
//! simulation loop.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// IdentityObservation
// ---------------------------------------------------------------------------

/// One identity's observable state within a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityObservation {
    /// Identity id.
    pub id: String,
    /// Phase, rounded to 6 decimals. `None` while the identity is inactive.
    pub phase: Option<f64>,
    /// Position, when the kinematics extension is on.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<(f64, f64)>,
}

// ---------------------------------------------------------------------------
// TickObservation
// ---------------------------------------------------------------------------

/// Everything recorded about one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickObservation {
    /// Tick index, 1-indexed per the log convention.
    pub tick: u64,
    /// Tracked identities in declaration order.
    pub identities: Vec<IdentityObservation>,
    /// Mean total support across recruiters, rounded to 4 decimals.
    pub recruiter_avg_support: f64,
    /// Number of recruiters satisfying phase match and support readiness.
    pub quorum: usize,
    /// Consecutive ticks at or above the lock quorum.
    pub lock_streak: u64,
    /// Whether the scenario-wide lock has fired.
    pub locked: bool,
    /// The 1-indexed tick the lock fired, once it has.
    pub lock_tick: Option<u64>,
    /// Labels for events injected this tick (`"drop(identity_P)"`,
    /// `"photon_pulse"`, `"drift_active"`, ...).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<String>,
}

// ---------------------------------------------------------------------------
// TickTrace
// ---------------------------------------------------------------------------

/// Append-only log of per-tick observations for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickTrace {
    observations: Vec<TickObservation>,
    /// Set when a run aborted mid-way; the trace stops at the failing tick.
    pub truncated: bool,
}

impl TickTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the observation for the next tick.
    pub fn record(&mut self, observation: TickObservation) {
        self.observations.push(observation);
    }

    /// Mark the trace as cut short by a fatal error.
    pub fn mark_truncated(&mut self) {
        tracing::warn!(
            recorded_ticks = self.observations.len(),
            "tick trace truncated by a fatal error"
        );
        self.truncated = true;
    }

    /// Number of recorded ticks.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All observations in tick order.
    pub fn observations(&self) -> &[TickObservation] {
        &self.observations
    }

    /// The observation for a given 1-indexed tick.
    pub fn at_tick(&self, tick: u64) -> Option<&TickObservation> {
        self.observations.iter().find(|o| o.tick == tick)
    }

    /// The first tick at which the lock was observed fired.
    pub fn first_locked_tick(&self) -> Option<u64> {
        self.observations.iter().find(|o| o.locked).map(|o| o.tick)
    }

    /// Iterate one identity's phase trajectory as `(tick, phase)`.
    pub fn phases_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = (u64, f64)> + 'a {
        self.observations.iter().filter_map(move |o| {
            o.identities
                .iter()
                .find(|i| i.id == id)
                .and_then(|i| i.phase)
                .map(|p| (o.tick, p))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(tick: u64, locked: bool, quorum: usize) -> TickObservation {
        TickObservation {
            tick,
            identities: vec![IdentityObservation {
                id: "identity_P".to_owned(),
                phase: Some(0.01 * tick as f64),
                position: None,
            }],
            recruiter_avg_support: 0.02,
            quorum,
            lock_streak: 0,
            locked,
            lock_tick: locked.then_some(tick),
            events: Vec::new(),
        }
    }

    #[test]
    fn record_and_query() {
        let mut trace = TickTrace::new();
        trace.record(obs(1, false, 0));
        trace.record(obs(2, false, 4));
        trace.record(obs(3, true, 6));

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.at_tick(2).map(|o| o.quorum), Some(4));
        assert_eq!(trace.first_locked_tick(), Some(3));
    }

    #[test]
    fn phase_trajectory_for_identity() {
        let mut trace = TickTrace::new();
        for t in 1..=5 {
            trace.record(obs(t, false, 0));
        }
        let traj: Vec<(u64, f64)> = trace.phases_of("identity_P").collect();
        assert_eq!(traj.len(), 5);
        assert_eq!(traj[4].0, 5);
        assert!((traj[4].1 - 0.05).abs() < 1e-12);
        assert_eq!(trace.phases_of("nobody").count(), 0);
    }

    #[test]
    fn truncation_flag_survives_serde() {
        let mut trace = TickTrace::new();
        trace.record(obs(1, false, 0));
        trace.mark_truncated();
        let json = serde_json::to_string(&trace).unwrap();
        let back: TickTrace = serde_json::from_str(&json).unwrap();
        assert!(back.truncated);
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn empty_events_are_omitted_from_json() {
        let o = obs(1, false, 0);
        let json = serde_json::to_string(&o).unwrap();
        assert!(!json.contains("\"events\""));
        assert!(!json.contains("\"position\""));
    }
}
