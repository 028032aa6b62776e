//! Echo records — the per-tick messages that carry rhythm to recruiters.
//!
//! An [`Echo`] is ephemeral: it is emitted, delivered, and forgotten within
//! a single tick. The emitter kind distinguishes identity echoes from
//! photon/neutrino pulses, which carry an addressed ancestry but no owning
//! identity; recruiters only fold pulse echoes into per-ancestry ledgers
//! when their catalyst capability is on.

use serde::{Deserialize, Serialize};

use crate::ancestry::Ancestry;

// ---------------------------------------------------------------------------
// EmitterKind
// ---------------------------------------------------------------------------

/// What produced an echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitterKind {
    /// A mobile identity node carrying its own ancestry.
    Identity,
    /// A photon pulse scheduled by the scenario timeline.
    Photon,
    /// A neutrino pulse scheduled by the scenario timeline.
    Neutrino,
}

impl EmitterKind {
    /// Pulse emitters have no owning identity.
    pub fn is_pulse(self) -> bool {
        matches!(self, Self::Photon | Self::Neutrino)
    }
}

// ---------------------------------------------------------------------------
// Echo
// ---------------------------------------------------------------------------

/// A single echo addressed to one recruiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    /// What emitted this echo.
    pub emitter: EmitterKind,
    /// The ancestry the echo carries (for pulses, the ancestry addressed).
    pub ancestry: Ancestry,
    /// Phase of the emitter at emission time.
    pub phase: f64,
    /// Support contributed on acceptance.
    pub strength: f64,
}

impl Echo {
    /// An echo emitted by an identity.
    pub fn from_identity(ancestry: Ancestry, phase: f64, strength: f64) -> Self {
        Self {
            emitter: EmitterKind::Identity,
            ancestry,
            phase,
            strength,
        }
    }

    /// A scheduled pulse echo.
    pub fn pulse(kind: EmitterKind, ancestry: Ancestry, phase: f64, strength: f64) -> Self {
        debug_assert!(kind.is_pulse());
        Self {
            emitter: kind,
            ancestry,
            phase,
            strength,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
