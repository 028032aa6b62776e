//! ETM Engine -- Tick scheduler and modular transition engine for
//! Euclidean Timing Mechanics.
//!
//! Builds on [`etm_core`] to provide the simulation driver: a scenario is
//! declared once, validated before the first tick, and then advanced
//! through a strictly ordered nine-step loop by the
//! [`ScenarioRuntime`](scheduler::ScenarioRuntime). The run yields typed
//! artifacts (`etm_trace`) plus a BLAKE3 fingerprint, so two runs of equal
//! scenarios can be compared by a single digest.
//!
//! # Quick Start
//!
//! ```
//! use etm_engine::prelude::*;
//!
//! let scenario = Scenario::builder()
//!     .ticks(30)
//!     .per_ancestry_ledger(true)
//!     .reinforcement_amount(0.02)
//!     .recruiter(RecruiterSpec::new("rec_0", 0.0).tolerance(0.11))
//!     .identity(IdentitySpec::new("rotor", 0.0).ancestry("rotor-A"))
//!     .build()
//!     .expect("valid scenario");
//!
//! let report = ScenarioRuntime::new(scenario)
//!     .expect("valid runtime")
//!     .run()
//!     .expect("run completes");
//! assert_eq!(report.summary.ticks_run, 30);
//! ```

#![deny(unsafe_code)]

pub mod bus;
pub mod event;
pub mod kinematics;
pub mod lock;
pub mod quorum;
pub mod scenario;
pub mod scheduler;
pub mod transition;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by scenario validation and the tick loop.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The scenario configuration is invalid. Fatal at scenario start.
    #[error("invalid scenario: {detail}")]
    Configuration {
        detail: String,
    },

    /// The scenario references an unknown id. Fatal at scenario start.
    #[error("dangling reference: {detail}")]
    Reference {
        detail: String,
    },

    /// An internal invariant broke mid-run. The loop aborts at the
    /// offending tick.
    #[error("invariant violation at tick {tick} in {component}: {detail}")]
    InvariantViolation {
        tick: u64,
        component: String,
        detail: String,
    },

    /// Recording or fingerprinting a run artifact failed.
    #[error(transparent)]
    Trace(#[from] etm_trace::TraceError),
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Install a global `tracing` subscriber honoring `RUST_LOG`.
///
/// For embedders and test binaries; calling it twice is harmless (the
/// second call is ignored).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export the core and trace preludes.
    pub use etm_core::prelude::*;
    pub use etm_trace::prelude::*;

    // Engine-specific exports.
    pub use crate::event::{EventKind, ScheduledEvent};
    pub use crate::lock::{ClaimOutcome, LockController, LockKey, ModularLockSet};
    pub use crate::quorum::QuorumEvaluator;
    pub use crate::scenario::{
        IdentitySpec, ModuleTrack, RecruiterSpec, Scenario, ScenarioBuilder,
    };
    pub use crate::scheduler::{RunFailure, RunReport, ScenarioRuntime};
    pub use crate::transition::TransitionEngine;
    pub use crate::EngineError;
}
