//! Declarative store shapes (`data/<mode>/shape.json`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use locations::Mode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::node::Node;
use crate::squads::SquadStore;
use crate::store::TipStore;

/// Shape of one section.
///
/// - `count`: the section is a numbered run of `count` copies of itself
/// - `sparse` / `keyed`: numbered or keyed collections created on first access
/// - `tips`: the section has a collection of its own
/// - `subs`: named child sections
///
/// A section with no `subs` is a plain tip collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionShape {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub tips: bool,
    #[serde(default)]
    pub sparse: bool,
    #[serde(default)]
    pub keyed: bool,
    #[serde(default)]
    pub subs: IndexMap<String, SectionShape>,
}

impl SectionShape {
    /// Build an empty node of this shape.
    pub fn build(&self) -> Node {
        if self.sparse {
            return Node::Sparse {
                items: BTreeMap::new(),
            };
        }
        if self.keyed {
            return Node::Keyed {
                items: BTreeMap::new(),
            };
        }
        if self.count > 0 {
            let item = SectionShape {
                count: 0,
                ..self.clone()
            };
            return Node::Numbered {
                items: (1..=self.count).map(|index| (index, item.build())).collect(),
            };
        }
        if self.subs.is_empty() {
            return Node::Leaf { tips: Vec::new() };
        }
        Node::Section {
            tips: self.tips.then(Vec::new),
            children: self
                .subs
                .iter()
                .map(|(name, shape)| (name.clone(), shape.build()))
                .collect(),
        }
    }
}

/// Shape of a whole mode store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreShape {
    /// The store holds counter squads instead of a tree.
    #[serde(default)]
    pub squads: bool,
    /// Shape of the tree root.
    #[serde(flatten)]
    pub root: SectionShape,
}

impl StoreShape {
    /// Load `<data_dir>/<mode>/shape.json`.
    pub fn load(data_dir: &Path, mode: Mode) -> Result<Self> {
        let path = data_dir.join(mode.as_str()).join("shape.json");
        let json = fs::read_to_string(&path).map_err(|source| StorageError::ShapeIo {
            path: path.clone(),
            source,
        })?;
        let shape = Self::from_json(&json).map_err(|source| StorageError::ShapeParse {
            path: path.clone(),
            source,
        })?;
        debug!(mode = %mode, "Loaded store shape from {:?}", path);
        Ok(shape)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build an empty store of this shape.
    pub fn build(&self) -> TipStore {
        if self.squads {
            TipStore::Squads(SquadStore::default())
        } else {
            TipStore::Tree(self.root.build())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_numbered_sections() {
        let shape = StoreShape::from_json(
            r#"{
                "subs": {
                    "globals": {"count": 2, "tips": true},
                    "sectors": {"count": 1, "subs": {
                        "boss": {"tips": true, "subs": {"feats": {"count": 2}}},
                        "nodes": {"sparse": true}
                    }}
                }
            }"#,
        )
        .unwrap();

        let TipStore::Tree(Node::Section { tips, children }) = shape.build() else {
            panic!("expected a tree with a section root");
        };
        assert!(tips.is_none());

        let Some(Node::Numbered { items }) = children.get("globals") else {
            panic!("globals should be numbered");
        };
        assert_eq!(items.len(), 2);
        assert!(matches!(items.get(&1), Some(Node::Leaf { .. })));

        let Some(Node::Numbered { items }) = children.get("sectors") else {
            panic!("sectors should be numbered");
        };
        let Some(Node::Section { tips, children }) = items.get(&1) else {
            panic!("a sector should be a section");
        };
        assert!(tips.is_none());
        assert!(matches!(children.get("nodes"), Some(Node::Sparse { .. })));
        assert!(matches!(
            children.get("boss"),
            Some(Node::Section { tips: Some(_), .. })
        ));
    }

    #[test]
    fn test_build_squads_and_keyed() {
        assert!(matches!(
            StoreShape::from_json(r#"{"squads": true}"#).unwrap().build(),
            TipStore::Squads(_)
        ));
        assert!(matches!(
            StoreShape::from_json(r#"{"keyed": true}"#).unwrap().build(),
            TipStore::Tree(Node::Keyed { .. })
        ));
    }
}
