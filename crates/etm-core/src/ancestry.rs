//! Ancestry tags and spin keys.
//!
//! An [`Ancestry`] is an opaque identifier (`"rotor-A"`, `"H1_proton"`)
//! compared by exact string equality. Tags are shared freely between
//! identities, echoes, recruiters, and lock keys, so they are interned
//! behind an `Arc<str>` — cloning one is a refcount bump, not a string copy.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ancestry
// ---------------------------------------------------------------------------

/// An opaque ancestry tag with exact-equality semantics.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ancestry(Arc<str>);

impl Ancestry {
    /// Intern a tag.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Ancestry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ancestry({:?})", &*self.0)
    }
}

impl fmt::Display for Ancestry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ancestry {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ancestry {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Serialize for Ancestry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Ancestry {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

// ---------------------------------------------------------------------------
// Spin
// ---------------------------------------------------------------------------

/// Spin orientation used as a distinguishability key in modular-lock
/// signatures. Identities with the same ancestry and phase bucket but
/// different spins may coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spin {
    Up,
    Down,
    Side,
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
            Self::Side => f.write_str("side"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
