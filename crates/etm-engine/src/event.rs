//! The scenario event timeline.
//!
//! Events are the only external inputs to a run: identity drops, removals
//! and returns, photon/neutrino pulses, recruiter drift onset, and direct
//! reinforcement. Each is injected at the start of its tick, before any
//! phase advances. The timeline is declared up front and validated before
//! the first tick; an unrecognized kind fails scenario parsing.

use etm_core::ancestry::Ancestry;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// What an event does when injected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Activate an identity at the given phase.
    Drop {
        identity: String,
        phase: f64,
    },
    /// Deactivate an identity; it stops ticking and emitting.
    Remove {
        identity: String,
    },
    /// Re-activate a removed identity at the given phase. The tick delta
    /// from the removal is the scenario's return interval when the return
    /// subsequently binds.
    Return {
        identity: String,
        phase: f64,
    },
    /// Enqueue photon echoes carrying `ancestry` to the targeted
    /// recruiters (all recruiters when `recruiters` is `None`).
    PhotonPulse {
        ancestry: Ancestry,
        phase: f64,
        strength: f64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        recruiters: Option<Vec<String>>,
    },
    /// Enqueue neutrino echoes, same addressing as a photon pulse.
    NeutrinoPulse {
        ancestry: Ancestry,
        phase: f64,
        strength: f64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        recruiters: Option<Vec<String>>,
    },
    /// From this tick on, every unlocked recruiter's target phase drifts by
    /// `per_tick` each tick.
    DriftStart {
        per_tick: f64,
    },
    /// Direct support reinforcement for `ancestry` on the targeted
    /// recruiters, delivered through the normal accumulation path.
    Reinforce {
        ancestry: Ancestry,
        strength: f64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        recruiters: Option<Vec<String>>,
    },
}

impl EventKind {
    /// Short label used as an observation flag.
    pub fn label(&self) -> String {
        match self {
            Self::Drop { identity, .. } => format!("drop({identity})"),
            Self::Remove { identity } => format!("remove({identity})"),
            Self::Return { identity, .. } => format!("return({identity})"),
            Self::PhotonPulse { ancestry, .. } => format!("photon_pulse({ancestry})"),
            Self::NeutrinoPulse { ancestry, .. } => format!("neutrino_pulse({ancestry})"),
            Self::DriftStart { .. } => "drift_start".to_owned(),
            Self::Reinforce { ancestry, .. } => format!("reinforce({ancestry})"),
        }
    }

    /// The identity this event references, if any.
    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::Drop { identity, .. }
            | Self::Remove { identity }
            | Self::Return { identity, .. } => Some(identity),
            _ => None,
        }
    }

    /// The recruiter ids this event references, if it targets a subset.
    pub fn recruiters(&self) -> Option<&[String]> {
        match self {
            Self::PhotonPulse { recruiters, .. }
            | Self::NeutrinoPulse { recruiters, .. }
            | Self::Reinforce { recruiters, .. } => recruiters.as_deref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ScheduledEvent
// ---------------------------------------------------------------------------

/// An event pinned to a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// 0-indexed tick at which the event is injected.
    pub tick: u64,
    /// What happens.
    #[serde(flatten)]
    pub kind: EventKind,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_tagging_round_trip() {
        let event = ScheduledEvent {
            tick: 20,
            kind: EventKind::Drop {
                identity: "identity_P".to_owned(),
                phase: 0.0,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"drop\""));
        let back: ScheduledEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn unknown_kind_fails_parsing() {
        let json = r#"{"tick": 1, "kind": "explode", "identity": "x"}"#;
        assert!(serde_json::from_str::<ScheduledEvent>(json).is_err());
    }

    #[test]
    fn labels_are_compact() {
        let kind = EventKind::PhotonPulse {
            ancestry: "orbital_electron".into(),
            phase: 0.0,
            strength: 0.05,
            recruiters: None,
        };
        assert_eq!(kind.label(), "photon_pulse(orbital_electron)");
        assert_eq!(
            EventKind::DriftStart { per_tick: 0.001 }.label(),
            "drift_start"
        );
    }

    #[test]
    fn referenced_ids_are_exposed_for_validation() {
        let kind = EventKind::Remove {
            identity: "p".to_owned(),
        };
        assert_eq!(kind.identity(), Some("p"));

        let kind = EventKind::Reinforce {
            ancestry: "a".into(),
            strength: 0.02,
            recruiters: Some(vec!["Z_0".to_owned()]),
        };
        assert_eq!(kind.recruiters().map(<[String]>::len), Some(1));
    }
}
