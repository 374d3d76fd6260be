//! Selection tokens attached to prompts.

use std::fmt;

use serde::{Deserialize, Serialize};

const KEYCAP: char = '\u{20E3}';
const VARIATION: char = '\u{FE0F}';

/// A choice a requester can make on a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// 1-based index into the visible page.
    Choice(u8),
    Next,
    Previous,
    Cancel,
    Add,
    Edit,
    Delete,
}

impl Selector {
    /// Word form, e.g. `3` or `next`.
    pub fn token(&self) -> String {
        match self {
            Self::Choice(n) => n.to_string(),
            Self::Next => "next".to_string(),
            Self::Previous => "previous".to_string(),
            Self::Cancel => "cancel".to_string(),
            Self::Add => "add".to_string(),
            Self::Edit => "edit".to_string(),
            Self::Delete => "delete".to_string(),
        }
    }

    /// Emoji form for transports that use reactions.
    pub fn emoji(&self) -> String {
        match self {
            Self::Choice(n) => format!("{}{}{}", n, VARIATION, KEYCAP),
            Self::Next => "\u{27A1}\u{FE0F}".to_string(),
            Self::Previous => "\u{2B05}\u{FE0F}".to_string(),
            Self::Cancel => "\u{1F6AB}".to_string(),
            Self::Add => "\u{2795}".to_string(),
            Self::Edit => "\u{270F}\u{FE0F}".to_string(),
            Self::Delete => "\u{2796}".to_string(),
        }
    }

    /// Parse either form. Variation selectors in emoji are optional.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let word = match input.to_lowercase().as_str() {
            "next" | "n" => Some(Self::Next),
            "previous" | "prev" | "p" => Some(Self::Previous),
            "cancel" | "c" => Some(Self::Cancel),
            "add" => Some(Self::Add),
            "edit" => Some(Self::Edit),
            "delete" => Some(Self::Delete),
            digits => digits.parse::<u8>().ok().map(Self::Choice),
        };
        if word.is_some() {
            return word;
        }

        let bare: String = input.chars().filter(|c| *c != VARIATION).collect();
        if let Some(digit) = bare.strip_suffix(KEYCAP) {
            return digit.parse::<u8>().ok().map(Self::Choice);
        }
        [
            Self::Next,
            Self::Previous,
            Self::Cancel,
            Self::Add,
            Self::Edit,
            Self::Delete,
        ]
        .into_iter()
        .find(|s| s.emoji().chars().filter(|c| *c != VARIATION).eq(bare.chars()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}
