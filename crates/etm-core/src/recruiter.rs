//! Recruiter nodes — stationary phase targets that accumulate support.
//!
//! A [`RecruiterNode`] watches for echoes whose ancestry and phase line up
//! with its target, accumulates reinforcement in a [`SupportLedger`], and
//! can bind to a single identity via [`try_lock`](RecruiterNode::try_lock)
//! or participate in a group quorum lock driven by the scheduler.
//!
//! The historical trial corpus grew a zoo of recruiter subclasses (memory,
//! adaptive, snap, drift, conflict, ...). Here they collapse into one
//! struct with [`RecruiterCapabilities`] flags; behavior differences are
//! branches on the capability set, and the ledger mode (scalar vs
//! per-ancestry) is a scenario-global choice made at construction.
//!
//! # Lock invariants
//!
//! Once `locked` is true, neither `target_phase` nor `target_ancestry` may
//! change: [`adapt`](RecruiterNode::adapt) and
//! [`drift_target`](RecruiterNode::drift_target) become no-ops, and echoes
//! are still logged but no longer move support. A bound `locked_identity`
//! stays bound until an explicit [`release`](RecruiterNode::release).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ancestry::{Ancestry, Spin};
use crate::echo::Echo;
use crate::ledger::SupportLedger;
use crate::phase::{self, PhaseCompareMode};

/// Legacy scalar memory decay applied on every received echo.
const ECHO_MEMORY_FACTOR: f64 = 0.97;

/// Default recruiter acceptance window.
pub const DEFAULT_PHASE_TOLERANCE: f64 = 0.11;

// ---------------------------------------------------------------------------
// RecruiterCapabilities
// ---------------------------------------------------------------------------

/// Behavior flags collapsed from the historical recruiter subclasses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecruiterCapabilities {
    /// Follows the sampled identity phase each tick (unlocked only).
    pub adapts: bool,
    /// Snaps its target exactly onto the sample when within the snap window
    /// (a stronger form of adaptation used by reconciliation fields).
    pub snaps: bool,
    /// Accepts photon/neutrino pulse echoes into the ledger.
    pub catalyst: bool,
}

// ---------------------------------------------------------------------------
// EchoRecord
// ---------------------------------------------------------------------------

/// One entry in a recruiter's append-only echo log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoRecord {
    /// Scheduler tick index at delivery (1-indexed, log convention).
    pub tick_index: u64,
    /// Ancestry carried by the echo.
    pub ancestry: Ancestry,
    /// Echo phase, rounded to 4 decimals.
    pub phase: f64,
    /// Whether the ancestry matched the recruiter's target.
    pub ancestry_match: bool,
    /// Whether the phase fell inside the tolerance window.
    pub phase_match: bool,
    /// Support actually credited to the ledger by this echo.
    pub support_added: f64,
}

// ---------------------------------------------------------------------------
// RecruiterNode
// ---------------------------------------------------------------------------

/// A stationary recruiter site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruiterNode {
    id: String,
    target_phase: f64,
    phase_tolerance: f64,
    target_ancestry: Option<Ancestry>,
    target_spin: Option<Spin>,
    ledger: SupportLedger,
    echo_log: Vec<EchoRecord>,
    /// Legacy scalar memory, decayed multiplicatively per received echo.
    memory: f64,
    locked: bool,
    lock_tick: Option<u64>,
    locked_identity: Option<String>,
    streak: u64,
    capabilities: RecruiterCapabilities,
    position: Option<(f64, f64)>,
}

impl RecruiterNode {
    /// Create a recruiter with a scalar ledger and default tolerance.
    pub fn new(id: impl Into<String>, target_phase: f64) -> Self {
        debug_assert!(phase::is_valid(target_phase));
        Self {
            id: id.into(),
            target_phase,
            phase_tolerance: DEFAULT_PHASE_TOLERANCE,
            target_ancestry: None,
            target_spin: None,
            ledger: SupportLedger::scalar(),
            echo_log: Vec::new(),
            memory: 1.0,
            locked: false,
            lock_tick: None,
            locked_identity: None,
            streak: 0,
            capabilities: RecruiterCapabilities::default(),
            position: None,
        }
    }

    // -- builders -----------------------------------------------------------

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.phase_tolerance = tolerance;
        self
    }

    pub fn with_target_ancestry(mut self, tag: Ancestry) -> Self {
        self.target_ancestry = Some(tag);
        self
    }

    pub fn with_target_spin(mut self, spin: Spin) -> Self {
        self.target_spin = Some(spin);
        self
    }

    pub fn with_ledger(mut self, ledger: SupportLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_capabilities(mut self, caps: RecruiterCapabilities) -> Self {
        self.capabilities = caps;
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }

    // -- echo intake --------------------------------------------------------

    /// Receive one echo: credit the ledger, append to the echo log, and
    /// apply the legacy per-echo memory decay.
    ///
    /// Returns the support credited. Locked recruiters log but never move
    /// support; pulse echoes only count when the catalyst capability is on.
    pub fn receive_echo(&mut self, echo: &Echo, compare: PhaseCompareMode, tick_index: u64) -> f64 {
        let ancestry_match = self
            .target_ancestry
            .as_ref()
            .map_or(true, |t| *t == echo.ancestry);
        let phase_match = compare.matches(echo.phase, self.target_phase, self.phase_tolerance);

        // Scalar support is gated on a full match, as the legacy recruiter
        // scored it; per-ancestry ledgers accumulate unconditionally.
        let match_gate = self.ledger.is_per_ancestry() || (ancestry_match && phase_match);
        let accepted = !self.locked
            && (!echo.emitter.is_pulse() || self.capabilities.catalyst)
            && match_gate;

        let support_added = if accepted {
            let credited = self.ledger.accumulate(&echo.ancestry, echo.strength);
            if credited == 0.0 && echo.strength > 0.0 {
                warn!(
                    recruiter = %self.id,
                    ancestry = %echo.ancestry,
                    "echo ancestry not recognized by ledger; support unchanged"
                );
            }
            credited
        } else {
            0.0
        };

        self.echo_log.push(EchoRecord {
            tick_index,
            ancestry: echo.ancestry.clone(),
            phase: phase::round4(echo.phase),
            ancestry_match,
            phase_match,
            support_added,
        });
        self.memory *= ECHO_MEMORY_FACTOR;
        support_added
    }

    /// Linear reinforcement decay, once per tick after all accumulation.
    pub fn decay_reinforcement(&mut self, rate: f64) {
        self.ledger.decay(rate);
    }

    // -- support & locking --------------------------------------------------

    /// Whether this recruiter currently supports the given rhythm: the
    /// ancestry's score has reached `threshold` and the phase is inside the
    /// tolerance window.
    pub fn is_supported(
        &self,
        ancestry: &Ancestry,
        phase: f64,
        threshold: f64,
        compare: PhaseCompareMode,
    ) -> bool {
        self.ledger.score(ancestry) >= threshold
            && compare.matches(phase, self.target_phase, self.phase_tolerance)
    }

    /// Attempt to bind an identity to this recruiter.
    ///
    /// The current holder always re-succeeds; a vacant recruiter binds when
    /// the rhythm is supported and any spin tag matches; everything else is
    /// refused.
    pub fn try_lock(
        &mut self,
        identity_id: &str,
        ancestry: &Ancestry,
        phase: f64,
        spin: Option<Spin>,
        threshold: f64,
        compare: PhaseCompareMode,
    ) -> bool {
        if self.locked_identity.as_deref() == Some(identity_id) {
            return true;
        }
        if self.locked_identity.is_none()
            && self.target_spin.map_or(true, |t| spin == Some(t))
            && self.is_supported(ancestry, phase, threshold, compare)
        {
            self.locked_identity = Some(identity_id.to_owned());
            return true;
        }
        false
    }

    /// Release the bound identity (explicit release events only).
    pub fn release(&mut self) {
        self.locked_identity = None;
    }

    /// Mark this recruiter locked by a group quorum at the given (1-indexed)
    /// tick. Idempotent; the first lock tick wins.
    pub fn lock(&mut self, lock_tick: u64) {
        if !self.locked {
            self.locked = true;
            self.lock_tick = Some(lock_tick);
        }
    }

    // -- phase steering -----------------------------------------------------

    /// Follow the sampled phase by `rate` times the shortest-arc error.
    /// No-op when locked (locally or globally) or when the recruiter does
    /// not adapt. With the snap capability, a sample inside the tolerance
    /// window snaps the target exactly onto it.
    pub fn adapt(&mut self, target_phase_sample: f64, rate: f64, locked_global: bool) {
        if self.locked || locked_global || !self.capabilities.adapts {
            return;
        }
        if self.capabilities.snaps
            && phase::within(target_phase_sample, self.target_phase, self.phase_tolerance)
        {
            self.target_phase = target_phase_sample;
            return;
        }
        let error = phase::shortest_arc(self.target_phase, target_phase_sample);
        self.target_phase = phase::advance(self.target_phase, rate * error);
    }

    /// Add a drift delta to the target phase (scenario drift events).
    /// No-op when locked.
    pub fn drift_target(&mut self, delta: f64) {
        if !self.locked {
            self.target_phase = phase::advance(self.target_phase, delta);
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target_phase(&self) -> f64 {
        self.target_phase
    }

    pub fn phase_tolerance(&self) -> f64 {
        self.phase_tolerance
    }

    pub fn target_ancestry(&self) -> Option<&Ancestry> {
        self.target_ancestry.as_ref()
    }

    pub fn target_spin(&self) -> Option<Spin> {
        self.target_spin
    }

    pub fn ledger(&self) -> &SupportLedger {
        &self.ledger
    }

    pub fn echo_log(&self) -> &[EchoRecord] {
        &self.echo_log
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock_tick(&self) -> Option<u64> {
        self.lock_tick
    }

    pub fn locked_identity(&self) -> Option<&str> {
        self.locked_identity.as_deref()
    }

    pub fn capabilities(&self) -> RecruiterCapabilities {
        self.capabilities
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }

    /// Local streak counter for per-recruiter lock logic.
    pub fn streak(&self) -> u64 {
        self.streak
    }

    /// Bump or reset the local streak; returns the new value.
    pub fn update_streak(&mut self, aligned: bool) -> u64 {
        self.streak = if aligned { self.streak + 1 } else { 0 };
        self.streak
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
