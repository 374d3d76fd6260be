//! The closed set of holocron modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A holocron mode. Each mode has its own grammar, catalog and store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Global feats and sectors.
    Conquest,
    /// Tracks, planets and missions.
    Rise,
    /// Squad counters.
    Counter,
    /// Free-form keys.
    War,
}

impl Mode {
    /// All modes, in command-table order.
    pub const ALL: [Mode; 4] = [Mode::Conquest, Mode::Rise, Mode::Counter, Mode::War];

    /// Get the command and directory name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conquest => "conquest",
            Self::Rise => "rise",
            Self::Counter => "counter",
            Self::War => "war",
        }
    }

    /// Look up a mode by its command name or one of its aliases.
    pub fn from_command(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "conquest" | "c" | "con" | "conq" => Some(Self::Conquest),
            "rise" | "r" => Some(Self::Rise),
            "counter" | "ctr" => Some(Self::Counter),
            "war" => Some(Self::War),
            _ => None,
        }
    }

    /// Command aliases accepted for this mode.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Conquest => &["c", "con", "conq"],
            Self::Rise => &["r"],
            Self::Counter => &["ctr"],
            Self::War => &[],
        }
    }

    /// Number of tips shown by a read without a depth filter.
    pub fn default_read_depth(&self) -> usize {
        match self {
            Self::War => 5,
            _ => 3,
        }
    }

    /// Whether addresses follow a structured grammar (as opposed to free-form keys).
    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::War)
    }

    /// Whether this mode stores its tips under squads.
    pub fn uses_squads(&self) -> bool {
        matches!(self, Self::Counter)
    }

    /// Whether this mode has planet maps.
    pub fn has_maps(&self) -> bool {
        matches!(self, Self::Rise)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_command(value).ok_or_else(|| format!("unknown mode: {}", value))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
