//! Optional positional drift — the kinematics extension.
//!
//! Ring-field scenarios give identities and recruiters 2D positions. Each
//! tick, every positioned recruiter pulls a positioned identity toward it
//! with a reinforcement weight that falls off with distance and phase
//! misalignment:
//!
//! ```text
//! reinforcement = max(0, 1 - decay_rate * dist - phase_diff)
//! ```
//!
//! The weighted unit offsets sum to a force; acceleration is a fixed 0.1
//! of it, velocity integrates the acceleration, position integrates the
//! velocity. The returned total reinforcement doubles as the positional
//! support level used by kinematic lock checks.

use etm_core::identity::IdentityNode;
use etm_core::phase;
use etm_core::recruiter::RecruiterNode;

/// Force-to-acceleration factor.
const ACCEL_FACTOR: f64 = 0.1;

/// Distance floor guarding the unit-offset division.
const MIN_DISTANCE: f64 = 1e-4;

// ---------------------------------------------------------------------------
// Integration
// ---------------------------------------------------------------------------

/// Integrate one identity's position against the positioned recruiters.
///
/// Returns the total positional reinforcement felt this tick; identities
/// or lattices without positions contribute nothing and do not move.
pub fn integrate(
    identity: &mut IdentityNode,
    recruiters: &[RecruiterNode],
    decay_rate: f64,
) -> f64 {
    let identity_phase = identity.phase();
    let Some(k) = identity.kinematics_mut() else {
        return 0.0;
    };

    let mut support = 0.0;
    let mut fx = 0.0;
    let mut fy = 0.0;

    for recruiter in recruiters {
        let Some((rx, ry)) = recruiter.position() else {
            continue;
        };
        let dx = rx - k.x;
        let dy = ry - k.y;
        let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
        let phase_diff = phase::circular_distance(identity_phase, recruiter.target_phase());
        let reinforcement = (1.0 - decay_rate * dist - phase_diff).max(0.0);
        support += reinforcement;
        fx += reinforcement * dx / dist;
        fy += reinforcement * dy / dist;
    }

    k.vx += fx * ACCEL_FACTOR;
    k.vy += fy * ACCEL_FACTOR;
    k.x += k.vx;
    k.y += k.vy;

    support
}

/// Whether the identity's rhythm is inside `tolerance` of any recruiter's
/// target — the kinematic lock/unlock resonance test.
pub fn in_resonance(identity_phase: f64, recruiters: &[RecruiterNode], tolerance: f64) -> bool {
    recruiters
        .iter()
        .any(|r| phase::within(identity_phase, r.target_phase(), tolerance))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
