//! Counter-mode aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tip::Tip;

/// Activity tags accepted on counter tips and read filters.
pub const ACTIVITIES: &[&str] = &["GAC", "GAC3", "TW", "GG", "GG3"];

/// Normalize an activity token, returning `None` if it is not a known tag.
pub fn normalize_activity(token: &str) -> Option<String> {
    let upper = token.trim().to_uppercase();
    ACTIVITIES.contains(&upper.as_str()).then_some(upper)
}

/// A squad lead that counter tips are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    /// Normalized (lowercase) lookup key, e.g. "jmk".
    pub lead_id: String,
    /// Display title, e.g. "Jedi Master Kenobi".
    pub lead: String,
    /// Display name of the creator.
    pub author: String,
    /// Transport id of the creator.
    #[serde(default)]
    pub author_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the squad was replaced after creation.
    #[serde(default)]
    pub edited: bool,
    /// Counter tips, in insertion order.
    #[serde(default)]
    pub tips: Vec<Tip>,
}

impl Squad {
    /// Create an empty squad.
    pub fn new(
        lead_id: &str,
        lead: &str,
        author: impl Into<String>,
        author_id: Option<String>,
    ) -> Self {
        Self {
            lead_id: lead_id.trim().to_lowercase(),
            lead: title_case(lead),
            author: author.into(),
            author_id,
            created_at: Utc::now(),
            edited: false,
            tips: Vec::new(),
        }
    }

    /// Render the squad header, e.g. "Jedi Master Kenobi (`jmk`)".
    pub fn header(&self) -> String {
        format!("{} (`{}`)", self.lead, self.lead_id)
    }
}

/// An alternative lead id resolving to an existing squad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    /// The alias key.
    pub alias: String,
    /// The lead id the alias points at.
    pub squad_lead_id: String,
    /// Display name of the creator.
    pub author: String,
    /// Transport id of the creator.
    #[serde(default)]
    pub author_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Alias {
    /// Create an alias.
    pub fn new(alias: &str, squad_lead_id: &str, author: impl Into<String>) -> Self {
        Self {
            alias: alias.trim().to_lowercase(),
            squad_lead_id: squad_lead_id.trim().to_lowercase(),
            author: author.into(),
            author_id: None,
            created_at: Utc::now(),
        }
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
