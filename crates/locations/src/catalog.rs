//! Per-mode label catalogs.
//!
//! A catalog maps canonical addresses (`g1`, `s3b`, `ds1cm2`, ...) to display
//! labels. Resolvers derive every valid numeral range from the catalog.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;
use crate::mode::Mode;

/// Display data for one address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Short display name, e.g. "Boss Feat 1".
    pub name: String,
    /// Longer description shown above tips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Unit requirements for the location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    /// Enemy waves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enemies: Vec<String>,
    /// Map image name for planets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    /// Upper bound for sparse children (e.g. the nodes of a sector).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Labels for one mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Display name of the mode, e.g. "Rise of the Empire".
    pub name: String,
    #[serde(default)]
    labels: HashMap<String, Label>,
}

impl Catalog {
    /// Create a catalog from labels.
    pub fn new(name: impl Into<String>, labels: HashMap<String, Label>) -> Self {
        Self {
            name: name.into(),
            labels,
        }
    }

    /// Load `<data_dir>/<mode>/labels.json`.
    pub fn load(data_dir: &Path, mode: Mode) -> Result<Self, CatalogError> {
        let path = data_dir.join(mode.as_str()).join("labels.json");
        let json = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let catalog: Catalog =
            serde_json::from_str(&json).map_err(|source| CatalogError::Parse {
                path: path.clone(),
                source,
            })?;

        debug!(
            mode = %mode,
            labels = catalog.labels.len(),
            "Loaded label catalog from {:?}",
            path
        );
        Ok(catalog)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get the label for an address.
    pub fn label(&self, address: &str) -> Option<&Label> {
        self.labels.get(address)
    }

    /// Check whether an address has a label.
    pub fn contains(&self, address: &str) -> bool {
        self.labels.contains_key(address)
    }

    /// Get the display name for an address, if labelled.
    pub fn name_of(&self, address: &str) -> Option<&str> {
        self.labels.get(address).map(|l| l.name.as_str())
    }

    /// Numbers `n` such that `<prefix><n>` is labelled, ascending.
    pub fn numbered(&self, prefix: &str) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .labels
            .keys()
            .filter_map(|key| key.strip_prefix(prefix))
            .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|rest| rest.parse().ok())
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }

    /// Inclusive range of the numbers under `prefix`, if any.
    pub fn range(&self, prefix: &str) -> Option<(u32, u32)> {
        let numbers = self.numbered(prefix);
        Some((*numbers.first()?, *numbers.last()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_json(
            r#"{
                "name": "Conquest",
                "labels": {
                    "g": {"name": "Global Feats"},
                    "g1": {"name": "Global Feat 1", "detail": "Win 10 battles"},
                    "g2": {"name": "Global Feat 2"},
                    "g10": {"name": "Global Feat 10"},
                    "gx1": {"name": "not numbered under g"},
                    "s1n": {"name": "Nodes", "count": 16}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_numbered_only_counts_digit_suffixes() {
        let catalog = sample();
        assert_eq!(catalog.numbered("g"), vec![1, 2, 10]);
        assert_eq!(catalog.range("g"), Some((1, 10)));
        assert_eq!(catalog.range("s"), None);
    }

    #[test]
    fn test_label_lookup() {
        let catalog = sample();
        assert_eq!(catalog.name_of("g1"), Some("Global Feat 1"));
        assert_eq!(
            catalog.label("g1").and_then(|l| l.detail.as_deref()),
            Some("Win 10 battles")
        );
        assert_eq!(catalog.label("s1n").and_then(|l| l.count), Some(16));
        assert!(!catalog.contains("g3"));
    }

    #[test]
    fn test_load_missing_catalog_fails() {
        let result = Catalog::load(Path::new("/nonexistent"), Mode::War);
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
