//! ETM Core -- Data model for Euclidean Timing Mechanics simulations.
//!
//! This crate provides the leaf types of the ETM engine: modular phase
//! arithmetic on `[0, 1)`, ancestry tags and spins, echo records, the
//! reinforcement support ledger, identity modules, and the two node kinds —
//! mobile [`IdentityNode`](identity::IdentityNode)s and stationary
//! [`RecruiterNode`](recruiter::RecruiterNode)s.
//!
//! Nothing here schedules anything. The tick loop, quorum evaluation, lock
//! control, and transition rules live in `etm-engine`; this crate only
//! guarantees the local invariants (phase closure, nonnegative support,
//! bounded memory, frozen targets after lock).
//!
//! # Quick Start
//!
//! ```
//! use etm_core::prelude::*;
//!
//! let mut recruiter = RecruiterNode::new("rec_001", 0.0)
//!     .with_target_ancestry("rotor-A".into())
//!     .with_tolerance(0.11);
//!
//! let echo = Echo::from_identity("rotor-A".into(), 0.01, 1.0);
//! let credited = recruiter.receive_echo(&echo, PhaseCompareMode::Circular, 1);
//! assert_eq!(credited, 1.0);
//! ```

#![deny(unsafe_code)]

pub mod ancestry;
pub mod echo;
pub mod identity;
pub mod ledger;
pub mod module;
pub mod phase;
pub mod recruiter;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::ancestry::{Ancestry, Spin};
    pub use crate::echo::{Echo, EmitterKind};
    pub use crate::identity::{IdentityNode, IdentityStatus, Kinematics};
    pub use crate::ledger::SupportLedger;
    pub use crate::module::{Module, ModuleProfile, TransitionConditions};
    pub use crate::phase::{self, PhaseCompareMode};
    pub use crate::recruiter::{EchoRecord, RecruiterCapabilities, RecruiterNode};
}

// ---------------------------------------------------------------------------
// Integration tests
// ---------------------------------------------------------------------------
