//! Run summaries, BLAKE3 fingerprints, and JSON export.
//!
//! The summary is the small scenario-defined digest written next to the
//! full tick trace. The fingerprint is a BLAKE3 hex digest over the
//! canonical JSON of trace + transition log + summary; two runs of the same
//! scenario are bit-identical exactly when their fingerprints match, which
//! is how the determinism tests compare runs without diffing whole logs.
//!
//! Export opens files at write time and closes them on every path; after a
//! fatal simulation error no summary is written at all — only the truncated
//! trace, clearly marked, may be exported for diagnostics.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use etm_core::identity::IdentityStatus;
use serde::{Deserialize, Serialize};

use crate::observation::TickTrace;
use crate::transition_log::TransitionLog;
use crate::TraceError;

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Scenario-level digest of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ticks actually executed.
    pub ticks_run: u64,
    /// Whether the scenario-wide lock fired.
    pub locked: bool,
    /// The 1-indexed tick the lock fired, if it did.
    pub lock_tick: Option<u64>,
    /// Total identity-to-recruiter bindings established over the run.
    pub total_locks: u64,
    /// Final status snapshot of every identity, in declaration order.
    pub final_identities: Vec<IdentityStatus>,
    /// Final `(recruiter id, average support)` pairs, in declaration order,
    /// rounded to 4 decimals.
    pub recruiter_avg_support: Vec<(String, f64)>,
    /// Echoes delivered across the run.
    pub echoes_delivered: u64,
    /// Calibration interval: the tick delta at which a return event first
    /// succeeded, when one did.
    pub return_interval: Option<u64>,
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// BLAKE3 hex digest over the canonical JSON of the run artifacts.
///
/// Everything observable participates: the per-tick trace, the transition
/// log, and the summary. The digest is the equality oracle for
/// "identical builders produce bit-identical logs".
pub fn fingerprint(
    trace: &TickTrace,
    transitions: &TransitionLog,
    summary: &RunSummary,
) -> Result<String, TraceError> {
    #[derive(Serialize)]
    struct Canonical<'a> {
        trace: &'a TickTrace,
        transitions: &'a TransitionLog,
        summary: &'a RunSummary,
    }

    let bytes = serde_json::to_vec(&Canonical {
        trace,
        transitions,
        summary,
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Write any serializable artifact as pretty JSON.
///
/// The file handle lives only inside this function; flush errors surface as
/// [`TraceError::Io`] rather than being dropped on close.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), TraceError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), "run artifact written");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
