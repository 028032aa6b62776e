//! Append-only log of module transition attempts.
//!
//! Every call into the transition engine produces exactly one
//! [`TransitionRecord`], successful or not. The log spans the whole run and
//! is the artifact the end-to-end scenarios assert against.

use etm_core::module::{Module, TransitionConditions};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TransitionRecord
// ---------------------------------------------------------------------------

/// One transition attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// 1-indexed tick of the attempt. Zero for attempts made outside the
    /// tick loop (direct engine calls in analysis scripts).
    pub tick: u64,
    /// The identity whose module was evaluated.
    pub identity: String,
    /// Module before the attempt.
    pub from: Module,
    /// Module after the attempt (equal to `from` on failure).
    pub to: Module,
    /// The evidence the guards were judged on.
    pub conditions: TransitionConditions,
    /// Whether a guard fired (including the explicit same-state success of
    /// the stable D re-tick; the C terminal hold is not a success).
    pub success: bool,
}

// ---------------------------------------------------------------------------
// TransitionLog
// ---------------------------------------------------------------------------

/// Append-only collection of transition attempts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionLog {
    records: Vec<TransitionRecord>,
}

impl TransitionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one attempt.
    pub fn record(&mut self, record: TransitionRecord) {
        self.records.push(record);
    }

    /// Number of recorded attempts.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no attempts are recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in attempt order.
    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    /// Iterate the attempts for one identity.
    pub fn for_identity<'a>(
        &'a self,
        identity: &'a str,
    ) -> impl Iterator<Item = &'a TransitionRecord> + 'a {
        self.records.iter().filter(move |r| r.identity == identity)
    }

    /// Iterate only the attempts where a guard fired.
    pub fn successes(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter().filter(|r| r.success)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
