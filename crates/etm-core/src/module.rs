//! Identity modules — the tagged states a tracked identity occupies.
//!
//! The core transition semantics are defined over `{A, B, C, D}`:
//! `A` is a recruiting rotor, `D` a stable identity, `B` a decayed
//! neutrino-like intermediate, `C` the terminal decayed state. The wider
//! ecosystem labels (`P`, `N`, `S`, `G`, `E1`, `Z`, `R`, `H2`) are accepted
//! and carried through unchanged unless a scenario supplies rules for them;
//! anything else rides in [`Module::Other`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// A modular identity state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Module {
    /// Rotor — recruits, pre-fold.
    A,
    /// Neutrino-like decayed intermediate.
    B,
    /// Terminal decayed state.
    C,
    /// Stable identity — recruits.
    D,
    /// Proton.
    P,
    /// Neutron.
    N,
    /// Scaffold.
    S,
    /// Ground orbital.
    G,
    /// First excited orbital.
    E1,
    /// Nuclear rhythm anchor.
    Z,
    /// Reconciled/recruited intermediate.
    R,
    /// Bound two-identity composite.
    H2,
    /// A label with no built-in rules; passed through unchanged.
    Other(String),
}

/// Static behavior profile of a canonical module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModuleProfile {
    /// Whether identities in this module may recruit others.
    pub recruits: bool,
    /// Memory character of the module.
    pub memory_profile: &'static str,
    /// Multiplicative memory decay factor per tick for this module.
    pub decay_rate: f64,
}

impl Module {
    /// Parse from the label form used in scenario files and logs.
    pub fn from_label(label: &str) -> Self {
        match label {
            "A" => Self::A,
            "B" => Self::B,
            "C" => Self::C,
            "D" => Self::D,
            "P" => Self::P,
            "N" => Self::N,
            "S" => Self::S,
            "G" => Self::G,
            "E1" => Self::E1,
            "Z" => Self::Z,
            "R" => Self::R,
            "H2" => Self::H2,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The label form.
    pub fn label(&self) -> &str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::P => "P",
            Self::N => "N",
            Self::S => "S",
            Self::G => "G",
            Self::E1 => "E1",
            Self::Z => "Z",
            Self::R => "R",
            Self::H2 => "H2",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this module is one of the four with built-in transition rules.
    pub fn is_core(&self) -> bool {
        matches!(self, Self::A | Self::B | Self::C | Self::D)
    }

    /// Static profile for canonical modules; `None` for labels the library
    /// does not define.
    pub fn profile(&self) -> Option<ModuleProfile> {
        let p = match self {
            Self::A => ModuleProfile {
                recruits: true,
                memory_profile: "rotor",
                decay_rate: 0.99,
            },
            Self::B => ModuleProfile {
                recruits: false,
                memory_profile: "neutrino",
                decay_rate: 1.0,
            },
            Self::C => ModuleProfile {
                recruits: false,
                memory_profile: "decayed",
                decay_rate: 0.90,
            },
            Self::D => ModuleProfile {
                recruits: true,
                memory_profile: "stable_mass",
                decay_rate: 0.95,
            },
            Self::P => ModuleProfile {
                recruits: true,
                memory_profile: "proton",
                decay_rate: 0.97,
            },
            Self::N => ModuleProfile {
                recruits: true,
                memory_profile: "neutron",
                decay_rate: 0.96,
            },
            Self::S => ModuleProfile {
                recruits: false,
                memory_profile: "scaffold",
                decay_rate: 0.94,
            },
            _ => return None,
        };
        Some(p)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Module {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Module {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_label(&s))
    }
}

// ---------------------------------------------------------------------------
// TransitionConditions
// ---------------------------------------------------------------------------

/// The evidence a transition attempt is judged on.
///
/// Assembled by the scheduler at evaluation time: recruiter support is the
/// quorum-relevant support level, `ancestry_match` and `tick_phase_match`
/// are the alignment verdicts for the evaluated identity, and
/// `reinforcement_score` is the identity-side memory level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransitionConditions {
    /// Support level seen across the recruiting field.
    pub recruiter_support: f64,
    /// Whether the identity's ancestry matched the recruiting field.
    pub ancestry_match: bool,
    /// Whether the identity's phase fell inside the acceptance window.
    pub tick_phase_match: bool,
    /// Identity-side reinforcement memory.
    pub reinforcement_score: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trip() {
        for label in ["A", "B", "C", "D", "P", "N", "S", "G", "E1", "Z", "R", "H2"] {
            let m = Module::from_label(label);
            assert_eq!(m.label(), label);
            assert!(!matches!(m, Module::Other(_)));
        }
    }

    #[test]
    fn unknown_labels_pass_through() {
        let m = Module::from_label("Q7");
        assert_eq!(m, Module::Other("Q7".to_owned()));
        assert_eq!(m.label(), "Q7");
        assert!(m.profile().is_none());
    }

    #[test]
    fn core_set() {
        assert!(Module::A.is_core());
        assert!(Module::D.is_core());
        assert!(!Module::Z.is_core());
        assert!(!Module::Other("x".to_owned()).is_core());
    }

    #[test]
    fn profiles_match_module_library() {
        let a = Module::A.profile().unwrap();
        assert!(a.recruits);
        assert_eq!(a.decay_rate, 0.99);

        let b = Module::B.profile().unwrap();
        assert!(!b.recruits);
        assert_eq!(b.decay_rate, 1.0);

        let d = Module::D.profile().unwrap();
        assert_eq!(d.memory_profile, "stable_mass");
    }

    #[test]
    fn serde_uses_labels() {
        assert_eq!(serde_json::to_string(&Module::E1).unwrap(), "\"E1\"");
        let m: Module = serde_json::from_str("\"H2\"").unwrap();
        assert_eq!(m, Module::H2);
        let other: Module = serde_json::from_str("\"mystery\"").unwrap();
        assert_eq!(other, Module::Other("mystery".to_owned()));
    }
}
