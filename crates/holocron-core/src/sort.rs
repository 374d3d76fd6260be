//! Presentation ordering for tip listings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tip::Tip;

/// How tips are ordered when shown to a user.
///
/// Sorting never touches stored collections; it orders a borrowed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Most recent first.
    #[default]
    Recent,
    /// Highest rating first.
    Rating,
    /// Oldest first.
    Oldest,
}

impl SortPolicy {
    /// Get the configuration name of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Rating => "rating",
            Self::Oldest => "oldest",
        }
    }

    /// Return the tips ordered by this policy.
    pub fn sorted<'a, I>(&self, tips: I) -> Vec<&'a Tip>
    where
        I: IntoIterator<Item = &'a Tip>,
    {
        let mut ordered: Vec<&Tip> = tips.into_iter().collect();
        match self {
            Self::Recent => ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Self::Rating => ordered.sort_by(|a, b| b.rating.cmp(&a.rating)),
            Self::Oldest => ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        ordered
    }
}

impl FromStr for SortPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "rating" => Ok(Self::Rating),
            "oldest" => Ok(Self::Oldest),
            other => Err(format!("unknown sort policy: {}", other)),
        }
    }
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
