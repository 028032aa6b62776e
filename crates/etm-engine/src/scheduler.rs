//! The tick scheduler — the only driver of a scenario.
//!
//! [`ScenarioRuntime`] owns both arenas (identities and recruiters, dense
//! vectors addressed by index) and advances the world one tick at a time.
//! Within a tick the nine phases run in a fixed order:
//!
//! 1. Event injection (drops, removals, returns, pulses, drift, reinforce)
//! 2. Phase advance for active identities (and kinematic integration)
//! 3. Echo emission onto the bus
//! 4. Echo delivery in insertion order
//! 5. Adaptive recruiter phase update
//! 6. Reinforcement decay
//! 7. Quorum evaluation, lock control, and signature binding
//! 8. Module transition evaluation
//! 9. Observation
//!
//! The order is a contract: accumulation strictly precedes decay, decay
//! strictly precedes quorum, quorum strictly precedes transitions. Nothing
//! in a step may observe a later step's side effects, and all iteration is
//! in declaration order, so two runtimes built from equal scenarios
//! produce bit-identical traces.

use std::collections::HashMap;
use std::path::Path;

use etm_core::ancestry::Ancestry;
use etm_core::echo::{Echo, EmitterKind};
use etm_core::identity::{IdentityNode, Kinematics, DEFAULT_PHASE_INCREMENT};
use etm_core::ledger::SupportLedger;
use etm_core::module::{Module, TransitionConditions};
use etm_core::phase;
use etm_core::recruiter::{RecruiterCapabilities, RecruiterNode};
use etm_trace::observation::{IdentityObservation, TickObservation, TickTrace};
use etm_trace::summary::{fingerprint, write_json, RunSummary};
use etm_trace::transition_log::TransitionLog;
use tracing::debug;

use crate::bus::EchoBus;
use crate::event::EventKind;
use crate::kinematics;
use crate::lock::{ClaimOutcome, LockController, LockKey, ModularLockSet};
use crate::quorum::QuorumEvaluator;
use crate::scenario::Scenario;
use crate::transition::TransitionEngine;
use crate::EngineError;

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Everything a completed run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Scenario-level digest.
    pub summary: RunSummary,
    /// Per-tick observations.
    pub trace: TickTrace,
    /// Every module transition attempt.
    pub transitions: TransitionLog,
    /// Claimed `(signature, owner)` pairs at run end, in claim order.
    pub lock_signatures: Vec<(LockKey, String)>,
    /// BLAKE3 digest over trace + transitions + summary.
    pub fingerprint: String,
}

// ---------------------------------------------------------------------------
// RunFailure
// ---------------------------------------------------------------------------

/// A run that aborted mid-way. No summary exists; the trace up to the
/// failing tick is retained and marked truncated.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RunFailure {
    /// What went wrong.
    pub error: EngineError,
    /// Observations up to (excluding) the failing tick, marked truncated.
    pub truncated_trace: TickTrace,
    /// Transition attempts up to the failure.
    pub transitions: TransitionLog,
}

// ---------------------------------------------------------------------------
// ScenarioRuntime
// ---------------------------------------------------------------------------

/// Owns the arenas and drives the nine-step tick loop.
pub struct ScenarioRuntime {
    scenario: Scenario,
    identities: Vec<IdentityNode>,
    recruiters: Vec<RecruiterNode>,
    /// Events grouped by tick, preserving declaration order within a tick.
    events_by_tick: Vec<Vec<EventKind>>,
    /// Tick each identity last became active, for echo cadence.
    activation_tick: Vec<Option<u64>>,
    /// Tick each identity was last removed, for the return interval.
    removed_at: Vec<Option<u64>>,
    /// Identities that returned and have not yet re-bound.
    awaiting_return_bind: Vec<bool>,
    /// The signature each identity currently holds, if any.
    claimed_key: Vec<Option<LockKey>>,
    /// Tracked `(identity index, current module)` pairs.
    tracked: Vec<(usize, Module)>,
    engine: TransitionEngine,
    lock: LockController,
    lock_set: ModularLockSet,
    bus: EchoBus,
    trace: TickTrace,
    /// Pulse/reinforce echoes collected during event injection, enqueued
    /// after identity emissions.
    pending_pulses: Vec<(usize, Echo)>,
    drift_per_tick: Option<f64>,
    echoes_delivered: u64,
    total_binds: u64,
    return_interval: Option<u64>,
}

impl ScenarioRuntime {
    /// Validate the scenario and build the arenas.
    pub fn new(scenario: Scenario) -> Result<Self, EngineError> {
        scenario.validate()?;

        let known = scenario.known_ancestries();
        let caps = RecruiterCapabilities {
            adapts: scenario.adaptive_recruiters,
            snaps: scenario.snap_recruiters,
            catalyst: false,
        };

        let recruiters: Vec<RecruiterNode> = scenario
            .recruiters
            .iter()
            .map(|spec| {
                let ledger = if scenario.per_ancestry_ledger {
                    SupportLedger::per_ancestry(known.iter().cloned())
                } else {
                    SupportLedger::scalar()
                };
                let mut rec = RecruiterNode::new(spec.id.clone(), spec.target_phase)
                    .with_tolerance(spec.phase_tolerance.unwrap_or(scenario.phase_tolerance))
                    .with_ledger(ledger)
                    .with_capabilities(RecruiterCapabilities {
                        catalyst: spec.catalyst,
                        ..caps
                    });
                if let Some(tag) = &spec.target_ancestry {
                    rec = rec.with_target_ancestry(tag.clone());
                }
                if let Some(spin) = spec.target_spin {
                    rec = rec.with_target_spin(spin);
                }
                if let Some((x, y)) = spec.position {
                    rec = rec.with_position(x, y);
                }
                rec
            })
            .collect();

        let identities: Vec<IdentityNode> = scenario
            .identities
            .iter()
            .map(|spec| {
                let mut node = IdentityNode::new(spec.id.clone(), spec.initial_phase)
                    .with_phase_increment(spec.phase_increment.unwrap_or(scenario.phase_increment))
                    .with_memory_decay(scenario.memory_decay);
                if let Some(tag) = &spec.ancestry {
                    node = node.with_ancestry(tag.clone());
                }
                if let Some(spin) = spec.spin {
                    node = node.with_spin(spin);
                }
                if let Some((x, y)) = spec.position {
                    node = node.with_kinematics(Kinematics::at(x, y));
                }
                if !spec.active_from_start {
                    node = node.inactive();
                }
                node
            })
            .collect();

        let id_index: HashMap<&str, usize> = scenario
            .identities
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.id.as_str(), i))
            .collect();

        let mut events_by_tick: Vec<Vec<EventKind>> = vec![Vec::new(); scenario.ticks as usize];
        for event in &scenario.events {
            events_by_tick[event.tick as usize].push(event.kind.clone());
        }

        let tracked = scenario
            .modules_to_track
            .iter()
            .map(|track| (id_index[track.identity.as_str()], track.initial_module.clone()))
            .collect();

        let activation_tick = identities
            .iter()
            .map(|node| node.is_active().then_some(0))
            .collect();

        let identity_count = identities.len();
        let lock = LockController::new(scenario.lock_in_quorum, scenario.lock_in_threshold);

        Ok(Self {
            identities,
            recruiters,
            events_by_tick,
            activation_tick,
            removed_at: vec![None; identity_count],
            awaiting_return_bind: vec![false; identity_count],
            claimed_key: vec![None; identity_count],
            tracked,
            engine: TransitionEngine::new(),
            lock,
            lock_set: ModularLockSet::new(),
            bus: EchoBus::new(),
            trace: TickTrace::new(),
            pending_pulses: Vec::new(),
            drift_per_tick: None,
            echoes_delivered: 0,
            total_binds: 0,
            return_interval: None,
            scenario,
        })
    }

    /// Run every tick and assemble the report.
    pub fn run(mut self) -> Result<RunReport, RunFailure> {
        for t in 0..self.scenario.ticks {
            if let Err(error) = self.step(t) {
                self.trace.mark_truncated();
                return Err(RunFailure {
                    error,
                    truncated_trace: self.trace,
                    transitions: self.engine.into_log(),
                });
            }
        }

        let summary = self.build_summary();
        let transitions = self.engine.into_log();
        let digest = match fingerprint(&self.trace, &transitions, &summary) {
            Ok(d) => d,
            Err(e) => {
                return Err(RunFailure {
                    error: EngineError::Trace(e),
                    truncated_trace: self.trace,
                    transitions,
                })
            }
        };
        Ok(RunReport {
            summary,
            trace: self.trace,
            transitions,
            lock_signatures: self.lock_set.entries().to_vec(),
            fingerprint: digest,
        })
    }

    /// Run and write the artifacts as JSON under `dir`.
    ///
    /// On success writes `tick_trace.json`, `transitions.json`, and
    /// `summary.json`. On failure no summary is written; the truncated
    /// trace goes to `tick_trace.truncated.json` for diagnostics and the
    /// error propagates.
    pub fn run_and_export(self, dir: &Path) -> anyhow::Result<RunReport> {
        match self.run() {
            Ok(report) => {
                write_json(&dir.join("tick_trace.json"), &report.trace)?;
                write_json(&dir.join("transitions.json"), &report.transitions)?;
                write_json(&dir.join("summary.json"), &report.summary)?;
                Ok(report)
            }
            Err(failure) => {
                write_json(&dir.join("tick_trace.truncated.json"), &failure.truncated_trace)?;
                Err(anyhow::Error::new(failure.error))
            }
        }
    }

    // -- the nine steps -----------------------------------------------------

    fn step(&mut self, t: u64) -> Result<(), EngineError> {
        let compare = self.scenario.phase_compare;
        let mut flags: Vec<String> = Vec::new();

        // 1. Event injection.
        let events = std::mem::take(&mut self.events_by_tick[t as usize]);
        for kind in &events {
            flags.push(kind.label());
            self.inject(t, kind)?;
        }
        if let Some(per_tick) = self.drift_per_tick {
            for recruiter in &mut self.recruiters {
                recruiter.drift_target(per_tick);
            }
            flags.push("drift_active".to_owned());
        }

        // 2. Phase advance (and kinematic integration).
        for node in &mut self.identities {
            if !node.is_active() {
                continue;
            }
            // Legacy behavior: every node advances by the hard default,
            // whatever its configured increment says.
            let delta = if self.scenario.respect_node_phase_increment {
                node.phase_increment()
            } else {
                DEFAULT_PHASE_INCREMENT
            };
            node.tick_forward(delta);
        }
        if self.scenario.kinematics_enabled {
            for i in 0..self.identities.len() {
                if self.identities[i].is_active() {
                    let support = kinematics::integrate(
                        &mut self.identities[i],
                        &self.recruiters,
                        self.scenario.reinforcement_decay,
                    );
                    self.identities[i].set_coherence(support);
                }
            }
        }

        // 3. Echo emission: identities in declaration order, then pulses.
        for (i, node) in self.identities.iter().enumerate() {
            if !node.is_active() {
                continue;
            }
            let Some(tag) = node.ancestry() else { continue };
            let since_activation = t - self.activation_tick[i].unwrap_or(0);
            if since_activation % self.scenario.echo_interval != 0 {
                continue;
            }
            let echo = Echo::from_identity(
                tag.clone(),
                node.phase(),
                self.scenario.reinforcement_amount,
            );
            for recipient in 0..self.recruiters.len() {
                self.bus.enqueue(recipient, echo.clone());
            }
        }
        for (recipient, echo) in self.pending_pulses.drain(..) {
            self.bus.enqueue(recipient, echo);
        }

        // 4. Echo delivery, insertion order, before any decay.
        self.echoes_delivered += self.bus.deliver(&mut self.recruiters, compare, t + 1);

        // 5. Adaptive phase update.
        if self.scenario.adaptive_recruiters {
            let active_phases: Vec<f64> = self
                .identities
                .iter()
                .filter(|n| n.is_active())
                .map(|n| n.phase())
                .collect();
            if !active_phases.is_empty() {
                let sample = active_phases.iter().sum::<f64>() / active_phases.len() as f64;
                let locked_global = self.lock.is_locked();
                for recruiter in &mut self.recruiters {
                    recruiter.adapt(sample, self.scenario.adapt_rate, locked_global);
                }
            }
        }

        // 6. Reinforcement decay, strictly after all accumulation.
        for recruiter in &mut self.recruiters {
            recruiter.decay_reinforcement(self.scenario.reinforcement_decay);
        }

        // 7. Quorum, lock control, signature binding.
        let quorum = self.evaluate_quorum();
        let fired = self.lock.update(t, quorum);
        if fired {
            if let Some(lock_tick) = self.lock.lock_tick() {
                for recruiter in &mut self.recruiters {
                    recruiter.lock(lock_tick);
                }
            }
            // The lock signature is fixed now: one key per participating
            // identity, at the rhythm it locked with. Identities that
            // already hold a signature keep the one they entered with.
            for i in 0..self.identities.len() {
                let node = &self.identities[i];
                if !node.is_active() || self.claimed_key[i].is_some() {
                    continue;
                }
                if let Some(tag) = node.ancestry() {
                    let key = LockKey::new(tag.clone(), node.phase(), node.spin());
                    if self.lock_set.claim(key.clone(), node.id()) != ClaimOutcome::Refused {
                        self.claimed_key[i] = Some(key);
                    }
                }
            }
        }
        if self.scenario.signature_locking {
            self.signature_binding_pass(t, compare);
        }

        // 8. Module transition evaluation.
        for slot in 0..self.tracked.len() {
            let (identity_idx, ref current) = self.tracked[slot];
            if !self.identities[identity_idx].is_active() {
                continue;
            }
            let conditions = self.assemble_conditions(identity_idx, compare);
            let current = current.clone();
            let id = self.identities[identity_idx].id().to_owned();
            let next = self
                .engine
                .attempt_transition(&id, t + 1, current, &conditions);
            self.tracked[slot].1 = next;
        }

        // 9. Observation.
        self.observe(t, quorum, flags);

        self.check_invariants(t)
    }

    /// Apply one injected event.
    fn inject(&mut self, t: u64, kind: &EventKind) -> Result<(), EngineError> {
        match kind {
            EventKind::Drop { identity, phase } => {
                let i = self.identity_index(identity)?;
                self.identities[i].set_phase(*phase);
                self.identities[i].activate();
                self.activation_tick[i] = Some(t);
                debug!(identity = %identity, phase = *phase, tick = t, "identity dropped");
            }
            EventKind::Remove { identity } => {
                let i = self.identity_index(identity)?;
                self.identities[i].deactivate();
                self.removed_at[i] = Some(t);
                debug!(identity = %identity, tick = t, "identity removed");
            }
            EventKind::Return { identity, phase } => {
                let i = self.identity_index(identity)?;
                self.identities[i].set_phase(*phase);
                self.identities[i].activate();
                self.activation_tick[i] = Some(t);
                self.awaiting_return_bind[i] = true;
                debug!(identity = %identity, phase = *phase, tick = t, "identity returned");
            }
            EventKind::PhotonPulse {
                ancestry,
                phase,
                strength,
                recruiters,
            } => {
                // A photon echo also tops up the memory of the identities
                // it addresses.
                for node in &mut self.identities {
                    if node.is_active() && node.ancestry() == Some(ancestry) {
                        node.reinforce_memory(*strength);
                    }
                }
                self.queue_pulse(EmitterKind::Photon, ancestry, *phase, *strength, recruiters)?;
            }
            EventKind::NeutrinoPulse {
                ancestry,
                phase,
                strength,
                recruiters,
            } => self.queue_pulse(EmitterKind::Neutrino, ancestry, *phase, *strength, recruiters)?,
            EventKind::DriftStart { per_tick } => {
                self.drift_per_tick = Some(*per_tick);
            }
            EventKind::Reinforce {
                ancestry,
                strength,
                recruiters,
            } => {
                let targets = self.recruiter_targets(recruiters)?;
                for recipient in targets {
                    // Delivered through the normal accumulation path, at
                    // the recruiter's own target phase so the scalar match
                    // gate accepts it.
                    let echo = Echo::from_identity(
                        ancestry.clone(),
                        self.recruiters[recipient].target_phase(),
                        *strength,
                    );
                    self.pending_pulses.push((recipient, echo));
                }
            }
        }
        Ok(())
    }

    fn queue_pulse(
        &mut self,
        emitter: EmitterKind,
        ancestry: &Ancestry,
        pulse_phase: f64,
        strength: f64,
        recruiters: &Option<Vec<String>>,
    ) -> Result<(), EngineError> {
        let targets = self.recruiter_targets(recruiters)?;
        for recipient in targets {
            self.pending_pulses.push((
                recipient,
                Echo::pulse(emitter, ancestry.clone(), pulse_phase, strength),
            ));
        }
        Ok(())
    }

    /// Resolve an optional recruiter-id list to arena indices (all
    /// recruiters when absent).
    fn recruiter_targets(
        &self,
        recruiters: &Option<Vec<String>>,
    ) -> Result<Vec<usize>, EngineError> {
        match recruiters {
            None => Ok((0..self.recruiters.len()).collect()),
            Some(ids) => ids
                .iter()
                .map(|id| {
                    self.recruiters
                        .iter()
                        .position(|r| r.id() == id)
                        .ok_or_else(|| EngineError::Reference {
                            detail: format!("unknown recruiter '{id}'"),
                        })
                })
                .collect(),
        }
    }

    fn identity_index(&self, id: &str) -> Result<usize, EngineError> {
        self.identities
            .iter()
            .position(|n| n.id() == id)
            .ok_or_else(|| EngineError::Reference {
                detail: format!("unknown identity '{id}'"),
            })
    }

    /// Quorum over every active identity's rhythm.
    fn evaluate_quorum(&self) -> usize {
        let phases: Vec<f64> = self
            .identities
            .iter()
            .filter(|n| n.is_active())
            .map(|n| n.phase())
            .collect();
        let mut ancestries: Vec<Ancestry> = Vec::new();
        for node in self.identities.iter().filter(|n| n.is_active()) {
            if let Some(tag) = node.ancestry() {
                if !ancestries.contains(tag) {
                    ancestries.push(tag.clone());
                }
            }
        }
        let evaluator = QuorumEvaluator {
            memory_threshold: self.scenario.reinforcement_threshold,
            require_support: self.scenario.per_ancestry_ledger,
            compare: self.scenario.phase_compare,
        };
        evaluator.count(&self.recruiters, &phases, &ancestries)
    }

    /// Per-identity signature claiming and recruiter binding (step 7b).
    fn signature_binding_pass(&mut self, t: u64, compare: phase::PhaseCompareMode) {
        for i in 0..self.identities.len() {
            let node = &self.identities[i];
            if !node.is_active() {
                continue;
            }
            let Some(tag) = node.ancestry().cloned() else { continue };
            let id = node.id().to_owned();
            let node_phase = node.phase();
            let spin = node.spin();

            // Holders re-enter freely; a new identity must pass the
            // exclusion gates first. After the group lock only existing
            // signature holders may enter at all.
            let entering = self.claimed_key[i].is_none();
            let candidate = entering.then(|| LockKey::new(tag.clone(), node_phase, spin));
            if let Some(key) = &candidate {
                if self.lock.is_locked() {
                    debug!(identity = %id, tick = t, "entry refused: field is locked");
                    continue;
                }
                if matches!(self.lock_set.owner_of(key), Some(owner) if owner != id) {
                    debug!(identity = %id, tick = t, "entry refused: signature occupied");
                    continue;
                }
            }

            let mut bound = false;
            for recruiter in &mut self.recruiters {
                let vacant = recruiter.locked_identity().is_none();
                if recruiter.try_lock(
                    &id,
                    &tag,
                    node_phase,
                    spin,
                    self.scenario.reinforcement_threshold,
                    compare,
                ) {
                    bound = true;
                    if vacant {
                        self.total_binds += 1;
                    }
                }
            }
            if bound {
                // A new signature registers only once a recruiter accepted.
                if let Some(key) = candidate {
                    if self.lock_set.claim(key.clone(), &id) != ClaimOutcome::Refused {
                        self.claimed_key[i] = Some(key);
                    }
                }
                if self.awaiting_return_bind[i] {
                    self.awaiting_return_bind[i] = false;
                    if let Some(removed) = self.removed_at[i] {
                        self.return_interval.get_or_insert(t - removed);
                    }
                }
            }
        }

        // Kinematic unlock: drifting out of every recruiter's window by the
        // unlock tolerance releases the signature and the bindings.
        if self.scenario.kinematics_enabled {
            if let Some(unlock_tol) = self.scenario.unlock_tolerance {
                for i in 0..self.identities.len() {
                    let node = &self.identities[i];
                    if !node.is_active() || self.claimed_key[i].is_none() {
                        continue;
                    }
                    if !kinematics::in_resonance(node.phase(), &self.recruiters, unlock_tol) {
                        let id = node.id().to_owned();
                        if let Some(key) = self.claimed_key[i].take() {
                            self.lock_set.release(&key, &id);
                        }
                        for recruiter in &mut self.recruiters {
                            if recruiter.locked_identity() == Some(id.as_str()) {
                                recruiter.release();
                            }
                        }
                        debug!(identity = %id, tick = t, "resonance broken: signature released");
                    }
                }
            }
        }
    }

    /// Evidence for a transition attempt, sampled across the recruiter set.
    fn assemble_conditions(
        &self,
        identity_idx: usize,
        compare: phase::PhaseCompareMode,
    ) -> TransitionConditions {
        let node = &self.identities[identity_idx];
        let recruiter_support = if self.recruiters.is_empty() {
            0.0
        } else {
            self.recruiters
                .iter()
                .map(|r| r.ledger().total())
                .sum::<f64>()
                / self.recruiters.len() as f64
        };
        let ancestry_match = self.recruiters.iter().any(|r| match r.target_ancestry() {
            None => true,
            Some(target) => node.ancestry() == Some(target),
        });
        let tick_phase_match = self
            .recruiters
            .iter()
            .any(|r| compare.matches(node.phase(), r.target_phase(), r.phase_tolerance()));
        TransitionConditions {
            recruiter_support,
            ancestry_match,
            tick_phase_match,
            reinforcement_score: node.memory(),
        }
    }

    /// Record this tick's observation.
    fn observe(&mut self, t: u64, quorum: usize, events: Vec<String>) {
        let identities = self
            .identities
            .iter()
            .map(|node| IdentityObservation {
                id: node.id().to_owned(),
                phase: node.is_active().then(|| phase::round6(node.phase())),
                position: if self.scenario.kinematics_enabled {
                    node.kinematics().map(|k| (k.x, k.y))
                } else {
                    None
                },
            })
            .collect();
        let recruiter_avg_support = if self.recruiters.is_empty() {
            0.0
        } else {
            phase::round4(
                self.recruiters
                    .iter()
                    .map(|r| r.ledger().total())
                    .sum::<f64>()
                    / self.recruiters.len() as f64,
            )
        };
        self.trace.record(TickObservation {
            tick: t + 1,
            identities,
            recruiter_avg_support,
            quorum,
            lock_streak: self.lock.streak(),
            locked: self.lock.is_locked(),
            lock_tick: self.lock.lock_tick(),
            events,
        });
    }

    /// End-of-tick invariant sweep. A breach aborts the run.
    fn check_invariants(&self, t: u64) -> Result<(), EngineError> {
        for node in &self.identities {
            if !phase::is_valid(node.phase()) {
                return Err(EngineError::InvariantViolation {
                    tick: t + 1,
                    component: format!("identity '{}'", node.id()),
                    detail: format!("phase {} escaped [0, 1)", node.phase()),
                });
            }
            if !(0.0..=1.0).contains(&node.memory()) {
                return Err(EngineError::InvariantViolation {
                    tick: t + 1,
                    component: format!("identity '{}'", node.id()),
                    detail: format!("memory {} escaped [0, 1]", node.memory()),
                });
            }
        }
        for recruiter in &self.recruiters {
            if recruiter.ledger().total() < 0.0
                || recruiter.ledger().entries().any(|(_, s)| s < 0.0)
            {
                return Err(EngineError::InvariantViolation {
                    tick: t + 1,
                    component: format!("recruiter '{}'", recruiter.id()),
                    detail: "negative support score".to_owned(),
                });
            }
            if recruiter.is_locked() && recruiter.lock_tick().is_none() {
                return Err(EngineError::InvariantViolation {
                    tick: t + 1,
                    component: format!("recruiter '{}'", recruiter.id()),
                    detail: "locked without a lock tick".to_owned(),
                });
            }
        }
        Ok(())
    }

    fn build_summary(&self) -> RunSummary {
        let final_identities = self.identities.iter().map(|n| n.status()).collect();
        let recruiter_avg_support = self
            .recruiters
            .iter()
            .map(|r| (r.id().to_owned(), phase::round4(r.ledger().average())))
            .collect();
        if self.lock.is_locked() {
            debug!(lock_tick = ?self.lock.lock_tick(), "run finished locked");
        }
        RunSummary {
            ticks_run: self.trace.len() as u64,
            locked: self.lock.is_locked(),
            lock_tick: self.lock.lock_tick(),
            total_locks: self.total_binds,
            final_identities,
            recruiter_avg_support,
            echoes_delivered: self.echoes_delivered,
            return_interval: self.return_interval,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
