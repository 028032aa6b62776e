//! Identity nodes — the mobile rhythm carriers.
//!
//! An [`IdentityNode`] owns a tick counter, a phase on `[0, 1)`, an optional
//! ancestry tag, and a memory value that decays multiplicatively each tick.
//! Every tick appends an immutable [`IdentityStatus`] snapshot to the node's
//! history, so a run's full rhythm trajectory can be reconstructed after the
//! fact.
//!
//! Nodes do not schedule themselves: the scenario runtime decides when an
//! inactive node skips a tick, what phase delta applies, and when events
//! reset the phase. The node only guarantees its own invariants
//! (`0 <= phase < 1`, `memory` in `[0, 1]`, monotone tick).

use serde::{Deserialize, Serialize};

use crate::ancestry::{Ancestry, Spin};
use crate::phase;

/// Per-tick phase advance applied when a scenario does not respect
/// per-node increments (the legacy default-argument behavior).
pub const DEFAULT_PHASE_INCREMENT: f64 = 0.05;

/// Default multiplicative memory decay per tick.
pub const DEFAULT_MEMORY_DECAY: f64 = 0.98;

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

/// Positional state for the optional kinematics extension.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Kinematics {
    /// At rest at the given coordinates.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// IdentityStatus
// ---------------------------------------------------------------------------

/// Immutable status snapshot of an identity node.
///
/// Phase, memory, and coherence are rounded to 4 decimals, the historical
/// precision of status records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityStatus {
    /// The node's id.
    pub id: String,
    /// Tick counter at snapshot time.
    pub tick: u64,
    /// Phase, rounded to 4 decimals.
    pub phase: f64,
    /// Memory, rounded to 4 decimals.
    pub memory: f64,
    /// Ancestry tag, if assigned.
    pub ancestry: Option<Ancestry>,
    /// Coherence score, rounded to 4 decimals.
    pub coherence_score: f64,
}

// ---------------------------------------------------------------------------
// IdentityNode
// ---------------------------------------------------------------------------

/// A mobile rhythm carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityNode {
    id: String,
    tick: u64,
    phase: f64,
    ancestry: Option<Ancestry>,
    /// Configured per-tick advance; only honored when the scenario respects
    /// node increments.
    phase_increment: f64,
    memory: f64,
    memory_decay: f64,
    coherence_score: f64,
    spin: Option<Spin>,
    active: bool,
    history: Vec<IdentityStatus>,
    kinematics: Option<Kinematics>,
}

impl IdentityNode {
    /// Create a node at the given initial phase.
    ///
    /// The phase must already be valid (`[0, 1)`); scenario validation
    /// rejects bad inputs before construction.
    pub fn new(id: impl Into<String>, initial_phase: f64) -> Self {
        debug_assert!(phase::is_valid(initial_phase));
        Self {
            id: id.into(),
            tick: 0,
            phase: initial_phase,
            ancestry: None,
            phase_increment: DEFAULT_PHASE_INCREMENT,
            memory: 1.0,
            memory_decay: DEFAULT_MEMORY_DECAY,
            coherence_score: 0.0,
            spin: None,
            active: true,
            history: Vec::new(),
            kinematics: None,
        }
    }

    // -- builders -----------------------------------------------------------

    /// Set the ancestry tag at construction.
    pub fn with_ancestry(mut self, tag: Ancestry) -> Self {
        self.ancestry = Some(tag);
        self
    }

    /// Set the per-tick phase increment at construction.
    pub fn with_phase_increment(mut self, increment: f64) -> Self {
        self.phase_increment = increment;
        self
    }

    /// Set the memory decay factor at construction.
    pub fn with_memory_decay(mut self, decay: f64) -> Self {
        self.memory_decay = decay;
        self
    }

    /// Set the spin key at construction.
    pub fn with_spin(mut self, spin: Spin) -> Self {
        self.spin = Some(spin);
        self
    }

    /// Attach positional state at construction.
    pub fn with_kinematics(mut self, k: Kinematics) -> Self {
        self.kinematics = Some(k);
        self
    }

    /// Start the node inactive (it will not tick until dropped).
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    // -- per-tick operations ------------------------------------------------

    /// Advance one tick: bump the counter, advance the phase by
    /// `delta_phase`, decay memory, and append a status snapshot.
    pub fn tick_forward(&mut self, delta_phase: f64) {
        self.tick += 1;
        self.phase = phase::advance(self.phase, delta_phase);
        self.memory = (self.memory * self.memory_decay).clamp(0.0, 1.0);
        let snapshot = self.status();
        self.history.push(snapshot);
    }

    /// Assign or replace the ancestry tag.
    pub fn set_ancestry(&mut self, tag: Ancestry) {
        self.ancestry = Some(tag);
    }

    /// Reinforce memory from an echo or pulse, clamped to 1.
    pub fn reinforce_memory(&mut self, amount: f64) {
        self.memory = (self.memory + amount).min(1.0);
    }

    /// Event-driven phase reset (drop / return).
    pub fn set_phase(&mut self, p: f64) {
        debug_assert!(phase::is_valid(p));
        self.phase = p;
    }

    /// Set the coherence score (maintained by the scenario runtime).
    pub fn set_coherence(&mut self, score: f64) {
        self.coherence_score = score;
    }

    /// Activate the node (drop / return event).
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Deactivate the node (removal event). Inactive nodes do not tick.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Immutable status snapshot with observable rounding.
    pub fn status(&self) -> IdentityStatus {
        IdentityStatus {
            id: self.id.clone(),
            tick: self.tick,
            phase: phase::round4(self.phase),
            memory: phase::round4(self.memory),
            ancestry: self.ancestry.clone(),
            coherence_score: phase::round4(self.coherence_score),
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn ancestry(&self) -> Option<&Ancestry> {
        self.ancestry.as_ref()
    }

    pub fn phase_increment(&self) -> f64 {
        self.phase_increment
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    pub fn spin(&self) -> Option<Spin> {
        self.spin
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append-only history of status snapshots, oldest first.
    pub fn history(&self) -> &[IdentityStatus] {
        &self.history
    }

    pub fn kinematics(&self) -> Option<&Kinematics> {
        self.kinematics.as_ref()
    }

    pub fn kinematics_mut(&mut self) -> Option<&mut Kinematics> {
        self.kinematics.as_mut()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- 1. Construction ----------------------------------------------------

    #[test]
    fn new_node_defaults() {
        let node = IdentityNode::new("n1", 0.0);
        assert_eq!(node.tick(), 0);
        assert_eq!(node.phase(), 0.0);
        assert_eq!(node.memory(), 1.0);
        assert_eq!(node.phase_increment(), DEFAULT_PHASE_INCREMENT);
        assert!(node.is_active());
        assert!(node.ancestry().is_none());
        assert!(node.history().is_empty());
    }

    // -- 2. Ticking ---------------------------------------------------------

    #[test]
    fn tick_forward_advances_and_decays() {
        let mut node = IdentityNode::new("n1", 0.0);
        node.tick_forward(0.05);
        assert_eq!(node.tick(), 1);
        assert!((node.phase() - 0.05).abs() < 1e-12);
        assert!((node.memory() - 0.98).abs() < 1e-12);
        assert_eq!(node.history().len(), 1);
    }

    #[test]
    fn phase_wraps_and_stays_closed() {
        let mut node = IdentityNode::new("n1", 0.0);
        for _ in 0..100 {
            node.tick_forward(0.05);
            assert!((0.0..1.0).contains(&node.phase()));
        }
        assert_eq!(node.tick(), 100);
    }

    #[test]
    fn history_snapshots_are_rounded() {
        let mut node = IdentityNode::new("n1", 0.123_456_78);
        node.tick_forward(0.0);
        let snap = &node.history()[0];
        assert_eq!(snap.phase, 0.1235);
        assert_eq!(snap.tick, 1);
    }

    // -- 3. Memory ----------------------------------------------------------

    #[test]
    fn reinforce_clamps_at_one() {
        let mut node = IdentityNode::new("n1", 0.0);
        node.reinforce_memory(0.5);
        assert_eq!(node.memory(), 1.0);
        node.tick_forward(0.05);
        node.reinforce_memory(0.01);
        assert!((node.memory() - 0.99).abs() < 1e-12);
    }

    #[test]
    fn memory_decays_toward_zero_but_never_below() {
        let mut node = IdentityNode::new("n1", 0.0).with_memory_decay(0.5);
        for _ in 0..200 {
            node.tick_forward(0.01);
        }
        assert!(node.memory() >= 0.0);
        assert!(node.memory() < 1e-12);
    }

    // -- 4. Events ----------------------------------------------------------

    #[test]
    fn set_phase_resets_without_ticking() {
        let mut node = IdentityNode::new("n1", 0.3);
        node.tick_forward(0.05);
        node.set_phase(0.0);
        assert_eq!(node.phase(), 0.0);
        assert_eq!(node.tick(), 1);
    }

    #[test]
    fn activation_toggles() {
        let mut node = IdentityNode::new("n1", 0.0).inactive();
        assert!(!node.is_active());
        node.activate();
        assert!(node.is_active());
        node.deactivate();
        assert!(!node.is_active());
    }

    // -- 5. Status ----------------------------------------------------------

    #[test]
    fn status_carries_ancestry_and_spin_free_fields() {
        let mut node = IdentityNode::new("p", 0.0)
            .with_ancestry("H1_proton".into())
            .with_spin(Spin::Up);
        node.set_coherence(0.123_46);
        let status = node.status();
        assert_eq!(status.id, "p");
        assert_eq!(status.ancestry.as_ref().map(|a| a.as_str()), Some("H1_proton"));
        assert_eq!(status.coherence_score, 0.1235);
        assert_eq!(node.spin(), Some(Spin::Up));
    }

    #[test]
    fn kinematics_round_trip() {
        let mut node = IdentityNode::new("k", 0.5).with_kinematics(Kinematics::at(6.5, 0.0));
        if let Some(k) = node.kinematics_mut() {
            k.vx = 0.1;
        }
        assert_eq!(node.kinematics().map(|k| k.vx), Some(0.1));
    }
}
