//! Lock-in control and modular exclusion.
//!
//! Two cooperating pieces live here. The [`LockController`] tracks the
//! scenario-wide streak of quorum ticks and fires the irrevocable group
//! lock once the streak reaches the threshold. The [`ModularLockSet`] is
//! the shared registry of `(ancestry, phase bucket, spin)` signatures that
//! enforces the exclusion law afterward: a signature has at most one owner,
//! and once the group lock has fired no new signatures may be claimed —
//! intruders are refused for the rest of the run.
//!
//! `lock_tick` is recorded 1-indexed, matching the tick log convention.

use etm_core::ancestry::{Ancestry, Spin};
use etm_core::phase;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// LockKey
// ---------------------------------------------------------------------------

/// A modular-lock signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockKey {
    /// Ancestry of the signature holder.
    pub ancestry: Ancestry,
    /// Phase bucketed to integer hundredths.
    pub phase_bucket: i64,
    /// Spin distinguishability key, if the identity carries one.
    pub spin: Option<Spin>,
}

impl LockKey {
    /// Build the signature for an identity's current rhythm.
    pub fn new(ancestry: Ancestry, phase_value: f64, spin: Option<Spin>) -> Self {
        Self {
            ancestry,
            phase_bucket: phase::bucket2(phase_value),
            spin,
        }
    }
}

// ---------------------------------------------------------------------------
// ModularLockSet
// ---------------------------------------------------------------------------

/// Shared registry of claimed lock signatures.
///
/// Insertion-ordered for deterministic iteration and logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModularLockSet {
    entries: Vec<(LockKey, String)>,
}

/// Outcome of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The key was vacant and is now owned by the claimant.
    Claimed,
    /// The claimant already owned the key.
    AlreadyOwned,
    /// The key belongs to another identity; the claim is refused.
    Refused,
}

impl ModularLockSet {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to claim `key` for `owner`.
    pub fn claim(&mut self, key: LockKey, owner: &str) -> ClaimOutcome {
        match self.owner_of(&key) {
            Some(current) if current == owner => ClaimOutcome::AlreadyOwned,
            Some(_) => ClaimOutcome::Refused,
            None => {
                debug!(owner, ?key, "modular lock key claimed");
                self.entries.push((key, owner.to_owned()));
                ClaimOutcome::Claimed
            }
        }
    }

    /// The current owner of `key`, if any.
    pub fn owner_of(&self, key: &LockKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, owner)| owner.as_str())
    }

    /// Whether `owner` holds any signature in the set.
    pub fn holds_any(&self, owner: &str) -> bool {
        self.entries.iter().any(|(_, o)| o == owner)
    }

    /// Release `key` if held by `owner` (explicit release paths only).
    /// Returns whether an entry was removed.
    pub fn release(&mut self, key: &LockKey, owner: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, o)| !(k == key && o == owner));
        before != self.entries.len()
    }

    /// Number of claimed signatures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no signature is claimed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Claimed `(key, owner)` pairs in claim order.
    pub fn entries(&self) -> &[(LockKey, String)] {
        &self.entries
    }
}

// ---------------------------------------------------------------------------
// LockController
// ---------------------------------------------------------------------------

/// Scenario-wide streak tracking and lock-in firing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockController {
    quorum_required: usize,
    streak_threshold: u64,
    streak: u64,
    locked: bool,
    lock_tick: Option<u64>,
}

impl LockController {
    /// A controller that fires after `streak_threshold` consecutive ticks
    /// at or above `quorum_required`.
    pub fn new(quorum_required: usize, streak_threshold: u64) -> Self {
        Self {
            quorum_required,
            streak_threshold,
            streak: 0,
            locked: false,
            lock_tick: None,
        }
    }

    /// Feed this tick's quorum. Returns `true` exactly once, on the tick
    /// the lock fires. `tick` is 0-indexed; the recorded `lock_tick` is
    /// `tick + 1`.
    pub fn update(&mut self, tick: u64, quorum: usize) -> bool {
        if self.locked {
            return false;
        }
        if quorum >= self.quorum_required {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        if self.streak >= self.streak_threshold {
            self.locked = true;
            self.lock_tick = Some(tick + 1);
            info!(lock_tick = tick + 1, quorum, "lock-in fired");
            return true;
        }
        false
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock_tick(&self) -> Option<u64> {
        self.lock_tick
    }

    pub fn streak(&self) -> u64 {
        self.streak
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- LockController -----------------------------------------------------

    #[test]
    fn fires_after_consecutive_quorum_ticks() {
        let mut ctl = LockController::new(4, 3);
        assert!(!ctl.update(0, 4));
        assert!(!ctl.update(1, 5));
        assert!(ctl.update(2, 4));
        assert!(ctl.is_locked());
        assert_eq!(ctl.lock_tick(), Some(3));
    }

    #[test]
    fn sub_quorum_tick_resets_streak() {
        let mut ctl = LockController::new(4, 3);
        ctl.update(0, 4);
        ctl.update(1, 4);
        ctl.update(2, 3); // reset
        assert_eq!(ctl.streak(), 0);
        assert!(!ctl.update(3, 4));
        assert!(!ctl.update(4, 4));
        assert!(ctl.update(5, 4));
        assert_eq!(ctl.lock_tick(), Some(6));
    }

    #[test]
    fn locked_controller_is_idempotent() {
        let mut ctl = LockController::new(1, 1);
        assert!(ctl.update(9, 1));
        let fired_tick = ctl.lock_tick();
        // Further updates never re-fire or move the lock tick.
        assert!(!ctl.update(10, 0));
        assert!(!ctl.update(11, 5));
        assert!(ctl.is_locked());
        assert_eq!(ctl.lock_tick(), fired_tick);
    }

    // -- ModularLockSet -----------------------------------------------------

    fn key(ancestry: &str, phase_value: f64, spin: Option<Spin>) -> LockKey {
        LockKey::new(Ancestry::new(ancestry), phase_value, spin)
    }

    #[test]
    fn claim_vacant_then_refuse_foreign() {
        let mut set = ModularLockSet::new();
        let k = key("root", 0.5, None);
        assert_eq!(set.claim(k.clone(), "A"), ClaimOutcome::Claimed);
        assert_eq!(set.claim(k.clone(), "A"), ClaimOutcome::AlreadyOwned);
        assert_eq!(set.claim(k.clone(), "B"), ClaimOutcome::Refused);
        assert_eq!(set.owner_of(&k), Some("A"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn spin_distinguished_keys_coexist() {
        let mut set = ModularLockSet::new();
        let up = key("rotor-A", 0.0, Some(Spin::Up));
        let down = key("rotor-A", 0.0, Some(Spin::Down));
        assert_eq!(set.claim(up, "A1"), ClaimOutcome::Claimed);
        assert_eq!(set.claim(down, "A2"), ClaimOutcome::Claimed);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn phase_buckets_separate_keys() {
        let mut set = ModularLockSet::new();
        assert_eq!(set.claim(key("r", 0.0, None), "A"), ClaimOutcome::Claimed);
        // 0.5 buckets apart: a different signature entirely.
        assert_eq!(set.claim(key("r", 0.5, None), "B"), ClaimOutcome::Claimed);
        // Same bucket as A's: refused.
        assert_eq!(set.claim(key("r", 0.001, None), "C"), ClaimOutcome::Refused);
    }

    #[test]
    fn release_requires_owner() {
        let mut set = ModularLockSet::new();
        let k = key("r", 0.25, None);
        set.claim(k.clone(), "A");
        assert!(!set.release(&k, "B"));
        assert!(set.release(&k, "A"));
        assert!(set.is_empty());
        assert!(!set.holds_any("A"));
    }
}
