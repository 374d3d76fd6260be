//! Error types for location resolution and catalog loading.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// What the grammar expected at the point where an address failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// One of a fixed set of tokens.
    Tokens(Vec<String>),
    /// A base-10 number within an inclusive range.
    Range { min: u32, max: u32 },
    /// Free-form description.
    Description(String),
}

impl Expected {
    /// Build a token expectation from string slices.
    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tokens(tokens.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Tokens(tokens) => {
                let quoted: Vec<String> = tokens.iter().map(|t| format!("`{}`", t)).collect();
                write!(f, "one of {}", quoted.join(", "))
            }
            Expected::Range { min, max } => {
                write!(f, "a number between {} and {} (inclusive)", min, max)
            }
            Expected::Description(text) => f.write_str(text),
        }
    }
}

/// An address that does not match the mode's grammar or catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid location `{address}`: {message} Expected {expected}.")]
pub struct InvalidLocation {
    /// The address as the user typed it.
    pub address: String,
    /// What went wrong.
    pub message: String,
    /// What would have been accepted.
    pub expected: Expected,
}

impl InvalidLocation {
    pub(crate) fn new(address: &str, message: impl Into<String>, expected: Expected) -> Self {
        Self {
            address: address.to_string(),
            message: message.into(),
            expected,
        }
    }
}

/// Errors raised while loading a label catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid JSON for a catalog.
    #[error("failed to parse catalog {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_display() {
        assert_eq!(
            Expected::tokens(["b", "m"]).to_string(),
            "one of `b`, `m`"
        );
        assert_eq!(
            Expected::Range { min: 1, max: 8 }.to_string(),
            "a number between 1 and 8 (inclusive)"
        );
    }

    #[test]
    fn test_invalid_location_display() {
        let err = InvalidLocation::new("g9", "No global feat 9.", Expected::Range { min: 1, max: 8 });
        assert_eq!(
            err.to_string(),
            "Invalid location `g9`: No global feat 9. Expected a number between 1 and 8 (inclusive)."
        );
    }
}
