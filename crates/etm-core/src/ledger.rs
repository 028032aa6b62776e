//! Reinforcement support ledgers.
//!
//! A [`SupportLedger`] is the accumulator a recruiter keeps for incoming
//! echo support. Two modes exist, chosen once per scenario:
//!
//! - **Scalar** — a single nonnegative score. Accumulation is gated on the
//!   echo matching both ancestry and phase, as the legacy recruiter did.
//! - **Per-ancestry** — one score per recognized ancestry, in registration
//!   order. Accumulation is unconditional for recognized ancestries;
//!   unrecognized tags are ignored (and reported to the caller so the
//!   recruiter can log them).
//!
//! The ordering contract is the heart of the engine: within a tick, all
//! accumulation happens before [`decay`](SupportLedger::decay) runs, so a
//! just-arrived echo is never pre-decayed. The ledger itself only promises
//! that `accumulate` is monotone and `decay` clamps at zero; the scheduler
//! enforces the ordering.

use serde::{Deserialize, Serialize};

use crate::ancestry::Ancestry;

// ---------------------------------------------------------------------------
// SupportLedger
// ---------------------------------------------------------------------------

/// Per-recruiter support accumulator, scalar or per-ancestry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SupportLedger {
    /// One score for the whole recruiter.
    Scalar {
        /// Current support score, always `>= 0`.
        score: f64,
    },
    /// One score per recognized ancestry, iterated in registration order.
    PerAncestry {
        /// `(ancestry, score)` pairs in registration order. Scores `>= 0`.
        scores: Vec<(Ancestry, f64)>,
    },
}

impl SupportLedger {
    /// An empty scalar ledger.
    pub fn scalar() -> Self {
        Self::Scalar { score: 0.0 }
    }

    /// A per-ancestry ledger recognizing the given tags, all starting at 0.
    ///
    /// Duplicate tags collapse to a single entry (first position wins).
    pub fn per_ancestry(recognized: impl IntoIterator<Item = Ancestry>) -> Self {
        let mut scores: Vec<(Ancestry, f64)> = Vec::new();
        for tag in recognized {
            if !scores.iter().any(|(a, _)| *a == tag) {
                scores.push((tag, 0.0));
            }
        }
        Self::PerAncestry { scores }
    }

    /// Whether this is a per-ancestry ledger.
    pub fn is_per_ancestry(&self) -> bool {
        matches!(self, Self::PerAncestry { .. })
    }

    /// Register an additional ancestry (no-op in scalar mode or if already
    /// recognized).
    pub fn recognize(&mut self, tag: Ancestry) {
        if let Self::PerAncestry { scores } = self {
            if !scores.iter().any(|(a, _)| *a == tag) {
                scores.push((tag, 0.0));
            }
        }
    }

    /// Add `amount` of support for `ancestry`.
    ///
    /// Returns the amount actually credited: `amount` when accepted, `0.0`
    /// for an unrecognized ancestry in per-ancestry mode. Scalar mode
    /// always accepts (the recruiter applies its own match gate before
    /// calling). `amount` must be nonnegative.
    pub fn accumulate(&mut self, ancestry: &Ancestry, amount: f64) -> f64 {
        debug_assert!(amount >= 0.0, "support amounts are nonnegative");
        match self {
            Self::Scalar { score } => {
                *score += amount;
                amount
            }
            Self::PerAncestry { scores } => {
                match scores.iter_mut().find(|(a, _)| a == ancestry) {
                    Some((_, score)) => {
                        *score += amount;
                        amount
                    }
                    None => 0.0,
                }
            }
        }
    }

    /// Linear decay: every score drops by `rate`, clamped at zero.
    pub fn decay(&mut self, rate: f64) {
        match self {
            Self::Scalar { score } => *score = (*score - rate).max(0.0),
            Self::PerAncestry { scores } => {
                for (_, score) in scores.iter_mut() {
                    *score = (*score - rate).max(0.0);
                }
            }
        }
    }

    /// The score for `ancestry`: the scalar score in scalar mode, the
    /// per-ancestry score otherwise (0 for unrecognized tags).
    pub fn score(&self, ancestry: &Ancestry) -> f64 {
        match self {
            Self::Scalar { score } => *score,
            Self::PerAncestry { scores } => scores
                .iter()
                .find(|(a, _)| a == ancestry)
                .map_or(0.0, |(_, s)| *s),
        }
    }

    /// Sum of all scores.
    pub fn total(&self) -> f64 {
        match self {
            Self::Scalar { score } => *score,
            Self::PerAncestry { scores } => scores.iter().map(|(_, s)| s).sum(),
        }
    }

    /// Mean score across entries (scalar ledgers have one entry).
    pub fn average(&self) -> f64 {
        match self {
            Self::Scalar { score } => *score,
            Self::PerAncestry { scores } => {
                if scores.is_empty() {
                    0.0
                } else {
                    self.total() / scores.len() as f64
                }
            }
        }
    }

    /// Iterate `(ancestry, score)` in registration order (empty for scalar).
    pub fn entries(&self) -> impl Iterator<Item = (&Ancestry, f64)> + '_ {
        let slice: &[(Ancestry, f64)] = match self {
            Self::Scalar { .. } => &[],
            Self::PerAncestry { scores } => scores,
        };
        slice.iter().map(|(a, s)| (a, *s))
    }

    /// Lowest score across entries — the binding constraint for quorum
    /// readiness in per-ancestry mode. Zero for an empty ledger.
    pub fn min_score(&self) -> f64 {
        match self {
            Self::Scalar { score } => *score,
            Self::PerAncestry { scores } => scores
                .iter()
                .map(|(_, s)| *s)
                .fold(None, |acc: Option<f64>, s| {
                    Some(acc.map_or(s, |a| a.min(s)))
                })
                .unwrap_or(0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
