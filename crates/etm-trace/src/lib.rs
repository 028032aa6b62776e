//! ETM Trace -- Typed observation records and run artifacts.
//!
//! The simulation proper never formats anything: the scheduler pushes typed
//! records into the structures in this crate, and JSON only appears at the
//! export boundary. Three artifacts make up a run:
//!
//! - [`TickTrace`](observation::TickTrace) — the per-tick observation log.
//! - [`TransitionLog`](transition_log::TransitionLog) — every module
//!   transition attempt, successful or not.
//! - [`RunSummary`](summary::RunSummary) — the scenario-level digest, plus
//!   a BLAKE3 [`fingerprint`](summary::fingerprint) over all three for
//!   bit-identical run comparison.

#![deny(unsafe_code)]

pub mod observation;
pub mod summary;
pub mod transition_log;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while recording or exporting run artifacts.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// Serialization failed (a bug: all artifact types are serializable).
    #[error("failed to serialize run artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem error during export.
    #[error("failed to write run artifact: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::observation::{IdentityObservation, TickObservation, TickTrace};
    pub use crate::summary::{fingerprint, write_json, RunSummary};
    pub use crate::transition_log::{TransitionLog, TransitionRecord};
    pub use crate::TraceError;
}
