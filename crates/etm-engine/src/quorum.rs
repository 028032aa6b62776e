//! Quorum evaluation over the recruiter set.
//!
//! A recruiter is counted when every sampled identity phase falls inside
//! its tolerance window and — when the scenario runs a per-ancestry ledger
//! — every sampled ancestry has reached the memory threshold. The count is
//! deterministic: recruiters are visited in declaration order, and there is
//! no tie-breaking because nothing is selected, only counted.
//!
//! An empty sample yields quorum 0. With no rhythm present there is nothing
//! for a recruiter to confirm; vacuous truth would let an undropped lattice
//! lock itself.

use etm_core::ancestry::Ancestry;
use etm_core::phase::PhaseCompareMode;
use etm_core::recruiter::RecruiterNode;

// ---------------------------------------------------------------------------
// QuorumEvaluator
// ---------------------------------------------------------------------------

/// Counts recruiters that simultaneously satisfy phase match and support
/// readiness for a sampled identity set.
#[derive(Debug, Clone, Copy)]
pub struct QuorumEvaluator {
    /// Per-ancestry support floor for readiness.
    pub memory_threshold: f64,
    /// Whether support readiness participates (per-ancestry ledgers only).
    pub require_support: bool,
    /// Scenario-global phase comparison mode.
    pub compare: PhaseCompareMode,
}

impl QuorumEvaluator {
    /// Count satisfying recruiters for the sampled phases and ancestries.
    pub fn count(
        &self,
        recruiters: &[RecruiterNode],
        phases: &[f64],
        ancestries: &[Ancestry],
    ) -> usize {
        if phases.is_empty() {
            return 0;
        }
        recruiters
            .iter()
            .filter(|r| self.satisfied(r, phases, ancestries))
            .count()
    }

    fn satisfied(&self, recruiter: &RecruiterNode, phases: &[f64], ancestries: &[Ancestry]) -> bool {
        let phase_ok = phases.iter().all(|&p| {
            self.compare
                .matches(p, recruiter.target_phase(), recruiter.phase_tolerance())
        });
        if !phase_ok {
            return false;
        }
        if self.require_support {
            ancestries
                .iter()
                .all(|a| recruiter.ledger().score(a) >= self.memory_threshold)
        } else {
            true
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
