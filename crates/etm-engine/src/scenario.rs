//! Declarative scenario configuration.
//!
//! A [`Scenario`] is everything a run needs: the recruiter lattice, the
//! identities, the event timeline, and the scheduler policy knobs. The
//! historical trial scripts carried these as module-level constants; here
//! they are fields, and two scenarios with equal fields produce
//! bit-identical logs.
//!
//! Validation happens once, before the first tick: configuration problems
//! (duplicate ids, phases outside `[0, 1)`, negative tolerances) and
//! dangling references (events naming unknown ids) are fatal at scenario
//! start, never mid-run.

use etm_core::ancestry::{Ancestry, Spin};
use etm_core::identity::DEFAULT_MEMORY_DECAY;
use etm_core::phase::{self, PhaseCompareMode};
use etm_core::recruiter::DEFAULT_PHASE_TOLERANCE;
use serde::{Deserialize, Serialize};

use crate::event::ScheduledEvent;
use crate::EngineError;

// ---------------------------------------------------------------------------
// RecruiterSpec
// ---------------------------------------------------------------------------

/// Declaration of one recruiter site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecruiterSpec {
    pub id: String,
    pub target_phase: f64,
    /// Overrides the scenario default tolerance.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phase_tolerance: Option<f64>,
    /// `None` accepts any ancestry.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_ancestry: Option<Ancestry>,
    /// Spin tag for spin-selective fields.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_spin: Option<Spin>,
    /// Position for the kinematics extension.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<(f64, f64)>,
    /// Accepts photon/neutrino pulses into its ledger.
    #[serde(default)]
    pub catalyst: bool,
}

impl RecruiterSpec {
    pub fn new(id: impl Into<String>, target_phase: f64) -> Self {
        Self {
            id: id.into(),
            target_phase,
            phase_tolerance: None,
            target_ancestry: None,
            target_spin: None,
            position: None,
            catalyst: false,
        }
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.phase_tolerance = Some(tolerance);
        self
    }

    pub fn ancestry(mut self, tag: impl Into<Ancestry>) -> Self {
        self.target_ancestry = Some(tag.into());
        self
    }

    pub fn spin(mut self, spin: Spin) -> Self {
        self.target_spin = Some(spin);
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }

    pub fn catalyst(mut self) -> Self {
        self.catalyst = true;
        self
    }
}

// ---------------------------------------------------------------------------
// IdentitySpec
// ---------------------------------------------------------------------------

/// Declaration of one identity node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentitySpec {
    pub id: String,
    pub initial_phase: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ancestry: Option<Ancestry>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub spin: Option<Spin>,
    /// Overrides the scenario default increment (honored only when the
    /// scenario respects node increments).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phase_increment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<(f64, f64)>,
    /// When false, the identity waits inactive for a drop event.
    #[serde(default = "default_true")]
    pub active_from_start: bool,
}

fn default_true() -> bool {
    true
}

impl IdentitySpec {
    pub fn new(id: impl Into<String>, initial_phase: f64) -> Self {
        Self {
            id: id.into(),
            initial_phase,
            ancestry: None,
            spin: None,
            phase_increment: None,
            position: None,
            active_from_start: true,
        }
    }

    pub fn ancestry(mut self, tag: impl Into<Ancestry>) -> Self {
        self.ancestry = Some(tag.into());
        self
    }

    pub fn spin(mut self, spin: Spin) -> Self {
        self.spin = Some(spin);
        self
    }

    pub fn phase_increment(mut self, increment: f64) -> Self {
        self.phase_increment = Some(increment);
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }

    pub fn starts_inactive(mut self) -> Self {
        self.active_from_start = false;
        self
    }
}

// ---------------------------------------------------------------------------
// ModuleTrack
// ---------------------------------------------------------------------------

/// An identity whose module state the transition engine evaluates each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleTrack {
    pub identity: String,
    pub initial_module: etm_core::module::Module,
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// Complete configuration of one run.
///
/// Unknown fields fail parsing: the historical trials grew state by
/// attaching ad-hoc attributes, and silently accepting a misspelled knob
/// would reproduce that failure mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    /// Total tick count.
    pub ticks: u64,
    /// Default per-tick identity phase advance.
    pub phase_increment: f64,
    /// Default recruiter acceptance window.
    pub phase_tolerance: f64,
    /// Default echo strength.
    pub reinforcement_amount: f64,
    /// Per-tick linear support decay.
    pub reinforcement_decay: f64,
    /// Per-ancestry support floor for readiness.
    pub reinforcement_threshold: f64,
    /// Consecutive quorum ticks required to fire the lock.
    pub lock_in_threshold: u64,
    /// Minimum simultaneous recruiters for a quorum tick.
    pub lock_in_quorum: usize,
    /// Recruiter phase follow speed.
    pub adapt_rate: f64,
    /// Identity memory decay factor per tick.
    pub memory_decay: f64,
    /// Identities emit echoes every this many ticks from activation.
    pub echo_interval: u64,
    /// Per-ancestry ledgers instead of scalar support.
    pub per_ancestry_ledger: bool,
    /// Recruiters follow the sampled identity phase.
    pub adaptive_recruiters: bool,
    /// Adaptive recruiters snap onto in-window samples.
    pub snap_recruiters: bool,
    /// Positional drift integration.
    pub kinematics_enabled: bool,
    /// Per-identity signature claiming and recruiter binding.
    pub signature_locking: bool,
    /// Honor per-identity phase increments instead of the legacy node
    /// default of 0.05.
    pub respect_node_phase_increment: bool,
    /// Scenario-global phase comparison mode.
    pub phase_compare: PhaseCompareMode,
    /// Kinematic unlock window; releases signatures when the rhythm drifts
    /// out of every recruiter's window by this tolerance.
    pub unlock_tolerance: Option<f64>,
    /// The event timeline, in declaration order.
    pub events: Vec<ScheduledEvent>,
    /// The recruiter lattice, in declaration order.
    pub recruiters: Vec<RecruiterSpec>,
    /// The identities, in declaration order.
    pub identities: Vec<IdentitySpec>,
    /// Identities with tracked module state.
    pub modules_to_track: Vec<ModuleTrack>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            ticks: 100,
            phase_increment: 0.05,
            phase_tolerance: DEFAULT_PHASE_TOLERANCE,
            reinforcement_amount: 1.0,
            reinforcement_decay: 0.002,
            reinforcement_threshold: 0.1,
            lock_in_threshold: 20,
            lock_in_quorum: 4,
            adapt_rate: 0.01,
            memory_decay: DEFAULT_MEMORY_DECAY,
            echo_interval: 1,
            per_ancestry_ledger: false,
            adaptive_recruiters: false,
            snap_recruiters: false,
            kinematics_enabled: false,
            signature_locking: false,
            respect_node_phase_increment: false,
            phase_compare: PhaseCompareMode::Circular,
            unlock_tolerance: None,
            events: Vec::new(),
            recruiters: Vec::new(),
            identities: Vec::new(),
            modules_to_track: Vec::new(),
        }
    }
}

impl Scenario {
    /// Start a builder.
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder::default()
    }

    /// Every ancestry the scenario mentions, in first-appearance order.
    /// Per-ancestry ledgers recognize exactly this set.
    pub fn known_ancestries(&self) -> Vec<Ancestry> {
        let mut tags: Vec<Ancestry> = Vec::new();
        let mut push = |tag: &Ancestry| {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        };
        for identity in &self.identities {
            if let Some(tag) = &identity.ancestry {
                push(tag);
            }
        }
        for event in &self.events {
            use crate::event::EventKind::*;
            match &event.kind {
                PhotonPulse { ancestry, .. }
                | NeutrinoPulse { ancestry, .. }
                | Reinforce { ancestry, .. } => push(ancestry),
                _ => {}
            }
        }
        tags
    }

    /// Validate the whole configuration before any tick runs.
    pub fn validate(&self) -> Result<(), EngineError> {
        let config = |detail: String| EngineError::Configuration { detail };

        if self.ticks == 0 {
            return Err(config("ticks must be positive".to_owned()));
        }
        if self.phase_tolerance < 0.0 {
            return Err(config(format!(
                "phase_tolerance {} is negative",
                self.phase_tolerance
            )));
        }
        if self.reinforcement_amount < 0.0 || self.reinforcement_decay < 0.0 {
            return Err(config("reinforcement parameters must be nonnegative".to_owned()));
        }
        if self.echo_interval == 0 {
            return Err(config("echo_interval must be positive".to_owned()));
        }

        // Recruiters: unique ids, valid phases, nonnegative tolerances.
        for (i, rec) in self.recruiters.iter().enumerate() {
            if self.recruiters[..i].iter().any(|r| r.id == rec.id) {
                return Err(config(format!("duplicate recruiter id '{}'", rec.id)));
            }
            if !phase::is_valid(rec.target_phase) {
                return Err(config(format!(
                    "recruiter '{}' target_phase {} outside [0, 1)",
                    rec.id, rec.target_phase
                )));
            }
            if rec.phase_tolerance.is_some_and(|t| t < 0.0) {
                return Err(config(format!(
                    "recruiter '{}' has negative tolerance",
                    rec.id
                )));
            }
        }

        // Identities: unique ids (also unique against recruiters is not
        // required; the namespaces are separate), valid phases.
        for (i, identity) in self.identities.iter().enumerate() {
            if self.identities[..i].iter().any(|d| d.id == identity.id) {
                return Err(config(format!("duplicate identity id '{}'", identity.id)));
            }
            if !phase::is_valid(identity.initial_phase) {
                return Err(config(format!(
                    "identity '{}' initial_phase {} outside [0, 1)",
                    identity.id, identity.initial_phase
                )));
            }
            if identity.phase_increment.is_some_and(|d| !d.is_finite()) {
                return Err(config(format!(
                    "identity '{}' has non-finite phase_increment",
                    identity.id
                )));
            }
        }

        // Events: valid phases, known references.
        for event in &self.events {
            use crate::event::EventKind::*;
            let phase_of = match &event.kind {
                Drop { phase, .. } | Return { phase, .. } => Some(*phase),
                PhotonPulse { phase, .. } | NeutrinoPulse { phase, .. } => Some(*phase),
                _ => None,
            };
            if let Some(p) = phase_of {
                if !phase::is_valid(p) {
                    return Err(config(format!(
                        "event at tick {} has phase {} outside [0, 1)",
                        event.tick, p
                    )));
                }
            }
            if event.tick >= self.ticks {
                return Err(config(format!(
                    "event at tick {} is beyond the run of {} ticks",
                    event.tick, self.ticks
                )));
            }
            if let Some(id) = event.kind.identity() {
                if !self.identities.iter().any(|d| d.id == id) {
                    return Err(EngineError::Reference {
                        detail: format!("event at tick {} references unknown identity '{id}'", event.tick),
                    });
                }
            }
            if let Some(recs) = event.kind.recruiters() {
                for id in recs {
                    if !self.recruiters.iter().any(|r| r.id == *id) {
                        return Err(EngineError::Reference {
                            detail: format!(
                                "event at tick {} references unknown recruiter '{id}'",
                                event.tick
                            ),
                        });
                    }
                }
            }
        }

        // Module tracking references.
        for track in &self.modules_to_track {
            if !self.identities.iter().any(|d| d.id == track.identity) {
                return Err(EngineError::Reference {
                    detail: format!(
                        "modules_to_track references unknown identity '{}'",
                        track.identity
                    ),
                });
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScenarioBuilder
// ---------------------------------------------------------------------------

/// Fluent construction of a [`Scenario`].
#[derive(Debug, Clone, Default)]
pub struct ScenarioBuilder {
    scenario: Scenario,
}

impl ScenarioBuilder {
    pub fn ticks(mut self, ticks: u64) -> Self {
        self.scenario.ticks = ticks;
        self
    }

    pub fn phase_increment(mut self, value: f64) -> Self {
        self.scenario.phase_increment = value;
        self
    }

    pub fn phase_tolerance(mut self, value: f64) -> Self {
        self.scenario.phase_tolerance = value;
        self
    }

    pub fn reinforcement_amount(mut self, value: f64) -> Self {
        self.scenario.reinforcement_amount = value;
        self
    }

    pub fn reinforcement_decay(mut self, value: f64) -> Self {
        self.scenario.reinforcement_decay = value;
        self
    }

    pub fn reinforcement_threshold(mut self, value: f64) -> Self {
        self.scenario.reinforcement_threshold = value;
        self
    }

    pub fn lock_in_threshold(mut self, value: u64) -> Self {
        self.scenario.lock_in_threshold = value;
        self
    }

    pub fn lock_in_quorum(mut self, value: usize) -> Self {
        self.scenario.lock_in_quorum = value;
        self
    }

    pub fn adapt_rate(mut self, value: f64) -> Self {
        self.scenario.adapt_rate = value;
        self
    }

    pub fn memory_decay(mut self, value: f64) -> Self {
        self.scenario.memory_decay = value;
        self
    }

    pub fn echo_interval(mut self, value: u64) -> Self {
        self.scenario.echo_interval = value;
        self
    }

    pub fn per_ancestry_ledger(mut self, on: bool) -> Self {
        self.scenario.per_ancestry_ledger = on;
        self
    }

    pub fn adaptive_recruiters(mut self, on: bool) -> Self {
        self.scenario.adaptive_recruiters = on;
        self
    }

    pub fn snap_recruiters(mut self, on: bool) -> Self {
        self.scenario.snap_recruiters = on;
        self
    }

    pub fn kinematics_enabled(mut self, on: bool) -> Self {
        self.scenario.kinematics_enabled = on;
        self
    }

    pub fn signature_locking(mut self, on: bool) -> Self {
        self.scenario.signature_locking = on;
        self
    }

    pub fn respect_node_phase_increment(mut self, on: bool) -> Self {
        self.scenario.respect_node_phase_increment = on;
        self
    }

    pub fn phase_compare(mut self, mode: PhaseCompareMode) -> Self {
        self.scenario.phase_compare = mode;
        self
    }

    pub fn unlock_tolerance(mut self, value: f64) -> Self {
        self.scenario.unlock_tolerance = Some(value);
        self
    }

    pub fn recruiter(mut self, spec: RecruiterSpec) -> Self {
        self.scenario.recruiters.push(spec);
        self
    }

    pub fn identity(mut self, spec: IdentitySpec) -> Self {
        self.scenario.identities.push(spec);
        self
    }

    pub fn event(mut self, tick: u64, kind: crate::event::EventKind) -> Self {
        self.scenario.events.push(ScheduledEvent { tick, kind });
        self
    }

    pub fn track_module(
        mut self,
        identity: impl Into<String>,
        initial_module: etm_core::module::Module,
    ) -> Self {
        self.scenario.modules_to_track.push(ModuleTrack {
            identity: identity.into(),
            initial_module,
        });
        self
    }

    /// Validate and yield the scenario.
    pub fn build(self) -> Result<Scenario, EngineError> {
        self.scenario.validate()?;
        Ok(self.scenario)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
