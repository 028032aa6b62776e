//! Modular phase arithmetic on the unit circle.
//!
//! A phase is a point on `[0, 1)` with wrap-around. Everything the rest of
//! the engine does with rhythm — advancing identities, testing recruiter
//! alignment, steering adaptive recruiters — reduces to the handful of
//! operations in this module.
//!
//! # Comparison modes
//!
//! Alignment checks come in two flavors. [`PhaseCompareMode::Circular`] is
//! the contract: distance is the shorter arc, so `0.98` and `0.02` are
//! `0.04` apart. [`PhaseCompareMode::ForwardOffset`] reproduces the legacy
//! comparison `(phase - target) mod 1 <= tol`, which only accepts phases
//! *ahead* of the target. Several historical scenarios depend on the legacy
//! form, so the mode is a scenario-global choice rather than a silent
//! normalization.
//!
//! # Example
//!
//! ```
//! use etm_core::phase;
//!
//! let p = phase::advance(0.97, 0.05);
//! assert!((p - 0.02).abs() < 1e-12);
//! assert!(phase::within(0.98, 0.02, 0.05));
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PhaseCompareMode
// ---------------------------------------------------------------------------

/// How phase alignment against a target is evaluated.
///
/// Scenario-global: a single run never mixes modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhaseCompareMode {
    /// Shortest-arc circular distance (the canonical contract).
    #[default]
    Circular,
    /// Legacy forward offset: `(phase - target) mod 1 <= tol`. Accepts only
    /// phases ahead of the target; `0.98` vs target `0.0` does NOT match.
    ForwardOffset,
}

impl PhaseCompareMode {
    /// Whether `phase` matches `target` under this mode's tolerance window.
    pub fn matches(self, phase: f64, target: f64, tolerance: f64) -> bool {
        match self {
            Self::Circular => within(phase, target, tolerance),
            Self::ForwardOffset => (phase - target).rem_euclid(1.0) <= tolerance,
        }
    }
}

// ---------------------------------------------------------------------------
// Core operations
// ---------------------------------------------------------------------------

/// Advance a phase by `delta`, wrapping into `[0, 1)`.
///
/// Correct for negative deltas: `advance(0.02, -0.05)` is `0.97`.
#[inline]
pub fn advance(phase: f64, delta: f64) -> f64 {
    let next = (phase + delta).rem_euclid(1.0);
    // rem_euclid can return exactly 1.0 when the sum is a tiny negative
    // number; fold that back onto 0.0 so the closure invariant holds.
    if next >= 1.0 {
        0.0
    } else {
        next
    }
}

/// Circular distance between two phases, in `[0, 0.5]`.
#[inline]
pub fn circular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 1.0;
    d.min(1.0 - d)
}

/// Whether two phases are within `tolerance` of each other on the circle.
#[inline]
pub fn within(a: f64, b: f64, tolerance: f64) -> bool {
    circular_distance(a, b) <= tolerance
}

/// Signed shortest arc from `from` to `to`, in `[-0.5, 0.5)`.
///
/// Positive means `to` is ahead of `from`. This is the error term an
/// adaptive recruiter follows.
#[inline]
pub fn shortest_arc(from: f64, to: f64) -> f64 {
    (to - from + 0.5).rem_euclid(1.0) - 0.5
}

/// Round to 6 decimal places — the precision of every observable phase.
#[inline]
pub fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

/// Round to 4 decimal places — the precision of status snapshots and
/// average-support observables.
#[inline]
pub fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

/// Bucket a phase to integer hundredths for modular-lock keys.
///
/// `0.249999` and `0.25` land in different buckets only when they genuinely
/// round apart; the bucket is the exclusion granularity, not a tolerance.
#[inline]
pub fn bucket2(phase: f64) -> i64 {
    (phase * 100.0).round() as i64
}

/// Whether `phase` is a valid phase coordinate (finite, in `[0, 1)`).
#[inline]
pub fn is_valid(phase: f64) -> bool {
    phase.is_finite() && (0.0..1.0).contains(&phase)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
