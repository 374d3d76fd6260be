//! Mode stores: navigation and CRUD over tip collections.

use holocron_core::{Tip, TipId};
use locations::{LocationDescriptor, PathSegment, SquadDirectory};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};
use crate::node::Node;
use crate::squads::SquadStore;

/// A field of a tip that can be replaced in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipField {
    Content(String),
    Author { name: String, id: Option<String> },
}

/// Per-section tip counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStats {
    pub name: String,
    pub total: usize,
    pub parts: Vec<(String, usize)>,
}

/// Summary of a store's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStats {
    Tree {
        total: usize,
        sections: Vec<SectionStats>,
    },
    Squads {
        squads: usize,
        tips: usize,
        aliases: usize,
        orphans: usize,
    },
}

/// All tips of one mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipStore {
    /// Nested sections (conquest, rise, war).
    Tree(Node),
    /// Squads (counter).
    Squads(SquadStore),
}

impl TipStore {
    /// Tips at a location, without materializing sparse entries.
    pub fn tips(&self, descriptor: &LocationDescriptor) -> Result<&[Tip]> {
        let path = leaf_path(descriptor)?;
        match self {
            TipStore::Tree(root) => tree_leaf(root, &path),
            TipStore::Squads(squads) => match path.as_slice() {
                [PathSegment::Squad(lead_id)] => squads.tips(lead_id),
                _ => Err(StorageError::WrongStoreKind("tree")),
            },
        }
    }

    /// The collection at a location, creating sparse entries on first access.
    pub fn resolve_leaf(&mut self, descriptor: &LocationDescriptor) -> Result<&mut Vec<Tip>> {
        let path = leaf_path(descriptor)?;
        match self {
            TipStore::Tree(root) => tree_leaf_mut(root, &path),
            TipStore::Squads(squads) => match path.as_slice() {
                [PathSegment::Squad(lead_id)] => squads.tips_mut(lead_id),
                _ => Err(StorageError::WrongStoreKind("tree")),
            },
        }
    }

    /// The node at a group location.
    pub fn resolve_group(&self, descriptor: &LocationDescriptor) -> Result<&Node> {
        let TipStore::Tree(root) = self else {
            return Err(StorageError::WrongStoreKind("tree"));
        };
        let path = descriptor.storage_path();
        let mut node = root;
        for segment in &path {
            node = node
                .child(segment)
                .ok_or_else(|| StorageError::PathNotFound(describe(&path)))?;
        }
        Ok(node)
    }

    /// Number of tips at a location (its own collection, or everything below a group).
    pub fn tip_count(&self, descriptor: &LocationDescriptor) -> Result<usize> {
        if descriptor.is_leaf() {
            Ok(self.tips(descriptor)?.len())
        } else {
            Ok(self.resolve_group(descriptor)?.tip_count())
        }
    }

    /// Keys a sparse group has materialized, e.g. the node numbers of a sector.
    pub fn materialized(&self, descriptor: &LocationDescriptor) -> Result<Vec<String>> {
        Ok(self.resolve_group(descriptor)?.materialized_keys())
    }

    /// Append a tip to the collection at a location.
    pub fn append(&mut self, descriptor: &LocationDescriptor, tip: Tip) -> Result<()> {
        self.resolve_leaf(descriptor)?.push(tip);
        Ok(())
    }

    /// Find a tip by id at a location.
    pub fn get(&self, descriptor: &LocationDescriptor, id: TipId) -> Result<&Tip> {
        self.tips(descriptor)?
            .iter()
            .find(|t| t.id == id)
            .ok_or(StorageError::TipNotFound(id))
    }

    /// Remove a tip by id from a location.
    pub fn remove(&mut self, descriptor: &LocationDescriptor, id: TipId) -> Result<Tip> {
        let tips = self.resolve_leaf(descriptor)?;
        let index = tips
            .iter()
            .position(|t| t.id == id)
            .ok_or(StorageError::TipNotFound(id))?;
        Ok(tips.remove(index))
    }

    /// Replace one field of a tip in place.
    pub fn replace_field(&mut self, descriptor: &LocationDescriptor, id: TipId, field: TipField) -> Result<()> {
        let tip = self
            .resolve_leaf(descriptor)?
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StorageError::TipNotFound(id))?;
        match field {
            TipField::Content(content) => tip.set_content(content),
            TipField::Author { name, id } => tip.set_author(name, id),
        }
        Ok(())
    }

    /// Every tip in the store.
    pub fn all_tips(&self) -> Vec<&Tip> {
        let mut tips = Vec::new();
        match self {
            TipStore::Tree(root) => root.collect_tips(&mut tips),
            TipStore::Squads(squads) => {
                for squad in squads.squads.values() {
                    tips.extend(&squad.tips);
                }
            }
        }
        tips
    }

    /// Keys of a keyed root (war), with their tip counts.
    pub fn keys(&self) -> Vec<(String, usize)> {
        match self {
            TipStore::Tree(node @ Node::Keyed { .. }) => node.child_counts(),
            _ => Vec::new(),
        }
    }

    pub fn squads(&self) -> Option<&SquadStore> {
        match self {
            TipStore::Squads(squads) => Some(squads),
            TipStore::Tree(_) => None,
        }
    }

    pub fn squads_mut(&mut self) -> Result<&mut SquadStore> {
        match self {
            TipStore::Squads(squads) => Ok(squads),
            TipStore::Tree(_) => Err(StorageError::WrongStoreKind("squad")),
        }
    }

    /// Tip counts per top-level section.
    pub fn stats(&self) -> StoreStats {
        match self {
            TipStore::Squads(squads) => StoreStats::Squads {
                squads: squads.squads.len(),
                tips: squads.tip_count(),
                aliases: squads.aliases.len(),
                orphans: squads.orphans.len(),
            },
            TipStore::Tree(root) => {
                let sections = match root {
                    Node::Section { children, .. } => children
                        .iter()
                        .map(|(name, node)| SectionStats {
                            name: name.clone(),
                            total: node.tip_count(),
                            parts: node.child_counts(),
                        })
                        .collect(),
                    node => vec![SectionStats {
                        name: "tips".to_string(),
                        total: node.tip_count(),
                        parts: node.child_counts(),
                    }],
                };
                StoreStats::Tree {
                    total: root.tip_count(),
                    sections,
                }
            }
        }
    }
}

impl SquadDirectory for TipStore {
    fn resolve_lead(&self, id: &str) -> Option<(String, String)> {
        self.squads().and_then(|squads| squads.resolve_lead(id))
    }

    fn known_leads(&self) -> Vec<String> {
        self.squads().map(|s| s.known_leads()).unwrap_or_default()
    }
}

fn leaf_path(descriptor: &LocationDescriptor) -> Result<Vec<PathSegment>> {
    descriptor
        .leaf_path()
        .ok_or_else(|| StorageError::NotALeaf(descriptor.canonical()))
}

fn tree_leaf<'a>(root: &'a Node, path: &[PathSegment]) -> Result<&'a [Tip]> {
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| StorageError::PathNotFound(describe(path)))?;
    let mut node = root;
    for segment in parents {
        node = node
            .child(segment)
            .ok_or_else(|| StorageError::PathNotFound(describe(path)))?;
    }

    match (node, last) {
        (Node::Sparse { items }, PathSegment::Index(index)) => {
            Ok(items.get(index).map(Vec::as_slice).unwrap_or(&[]))
        }
        (Node::Keyed { items }, PathSegment::Key(key)) => {
            Ok(items.get(key).map(Vec::as_slice).unwrap_or(&[]))
        }
        (Node::Section { tips: Some(tips), .. }, PathSegment::Own) => Ok(tips),
        (node, segment) => match node.child(segment) {
            Some(Node::Leaf { tips }) => Ok(tips),
            Some(_) => Err(StorageError::NotALeaf(describe(path))),
            None => Err(StorageError::PathNotFound(describe(path))),
        },
    }
}

fn tree_leaf_mut<'a>(root: &'a mut Node, path: &[PathSegment]) -> Result<&'a mut Vec<Tip>> {
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| StorageError::PathNotFound(describe(path)))?;
    let mut node = root;
    for segment in parents {
        node = node
            .child_mut(segment)
            .ok_or_else(|| StorageError::PathNotFound(describe(path)))?;
    }

    match (node, last) {
        (Node::Sparse { items }, PathSegment::Index(index)) => Ok(items.entry(*index).or_default()),
        (Node::Keyed { items }, PathSegment::Key(key)) => Ok(items.entry(key.clone()).or_default()),
        (Node::Section { tips: Some(tips), .. }, PathSegment::Own) => Ok(tips),
        (node, segment) => match node.child_mut(segment) {
            Some(Node::Leaf { tips }) => Ok(tips),
            Some(_) => Err(StorageError::NotALeaf(describe(path))),
            None => Err(StorageError::PathNotFound(describe(path))),
        },
    }
}

fn describe(path: &[PathSegment]) -> String {
    let parts: Vec<String> = path
        .iter()
        .map(|segment| match segment {
            PathSegment::Child(name) => name.to_string(),
            PathSegment::Index(index) => index.to_string(),
            PathSegment::Key(key) => format!("[{}]", key),
            PathSegment::Own => "tips".to_string(),
            PathSegment::Squad(lead_id) => format!("squad:{}", lead_id),
        })
        .collect();
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::StoreShape;
    use holocron_core::Squad;
    use locations::{Catalog, LocationResolver, Mode, NoSquads};

    const SHAPE: &str = r#"{
        "subs": {
            "globals": {"count": 2},
            "sectors": {"count": 1, "subs": {
                "boss": {"tips": true, "subs": {"feats": {"count": 2}}},
                "feats": {"count": 2},
                "nodes": {"sparse": true}
            }}
        }
    }"#;

    const LABELS: &str = r#"{
        "name": "Conquest",
        "labels": {
            "g": {"name": "Global Feats"},
            "g1": {"name": "Global Feat 1"},
            "g2": {"name": "Global Feat 2"},
            "s": {"name": "Sectors"},
            "s1": {"name": "Sector 1"},
            "s1b": {"name": "Boss"},
            "s1b1": {"name": "Boss Feat 1"},
            "s1f1": {"name": "Sector Feat 1"},
            "s1n": {"name": "Nodes", "count": 16}
        }
    }"#;

    fn fixture() -> (LocationResolver, TipStore) {
        let resolver = LocationResolver::new(Mode::Conquest, Catalog::from_json(LABELS).unwrap());
        let store = StoreShape::from_json(SHAPE).unwrap().build();
        (resolver, store)
    }

    fn at(resolver: &LocationResolver, address: &str) -> LocationDescriptor {
        resolver.resolve(address, &NoSquads).unwrap()
    }

    #[test]
    fn test_sparse_leaf_is_created_once() {
        let (resolver, mut store) = fixture();
        let node = at(&resolver, "s1n13");

        assert!(store.tips(&node).unwrap().is_empty());
        assert!(store.materialized(&at(&resolver, "s1n")).unwrap().is_empty());

        store.resolve_leaf(&node).unwrap().push(Tip::new("a", "uaq", None));
        assert_eq!(store.resolve_leaf(&node).unwrap().len(), 1);
        assert_eq!(store.materialized(&at(&resolver, "s1n")).unwrap(), vec!["13"]);
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let (resolver, mut store) = fixture();
        let feat = at(&resolver, "g1");
        store.append(&feat, Tip::new("first", "uaq", None)).unwrap();
        store.append(&feat, Tip::new("second", "uaq", None)).unwrap();

        let contents: Vec<&str> = store.tips(&feat).unwrap().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
        assert_eq!(store.tip_count(&at(&resolver, "g")).unwrap(), 2);
    }

    #[test]
    fn test_boss_own_tips_and_feats() {
        let (resolver, mut store) = fixture();
        store.append(&at(&resolver, "s1b"), Tip::new("own", "uaq", None)).unwrap();
        store.append(&at(&resolver, "s1b1"), Tip::new("feat", "uaq", None)).unwrap();

        assert_eq!(store.tips(&at(&resolver, "s1b")).unwrap().len(), 1);
        assert_eq!(store.tip_count(&at(&resolver, "s1")).unwrap(), 2);
        assert!(matches!(
            store.tips(&at(&resolver, "s1f")),
            Err(StorageError::NotALeaf(_))
        ));
    }

    #[test]
    fn test_edit_and_remove_by_id() {
        let (resolver, mut store) = fixture();
        let feat = at(&resolver, "s1f1");
        let tip = Tip::new("old", "uaq", Some("1".to_string()));
        let id = tip.id;
        store.append(&feat, tip).unwrap();

        store
            .replace_field(&feat, id, TipField::Content("new".to_string()))
            .unwrap();
        store
            .replace_field(
                &feat,
                id,
                TipField::Author {
                    name: "trich".to_string(),
                    id: Some("2".to_string()),
                },
            )
            .unwrap();
        let tip = store.get(&feat, id).unwrap();
        assert_eq!(tip.content, "new");
        assert!(tip.edited);
        assert!(tip.is_authored_by("2"));

        let removed = store.remove(&feat, id).unwrap();
        assert_eq!(removed.id, id);
        assert!(matches!(store.remove(&feat, id), Err(StorageError::TipNotFound(_))));
    }

    #[test]
    fn test_stats_per_section() {
        let (resolver, mut store) = fixture();
        store.append(&at(&resolver, "g2"), Tip::new("a", "uaq", None)).unwrap();
        store.append(&at(&resolver, "s1n4"), Tip::new("b", "uaq", None)).unwrap();

        let StoreStats::Tree { total, sections } = store.stats() else {
            panic!("expected tree stats");
        };
        assert_eq!(total, 2);
        assert_eq!(sections[0].name, "globals");
        assert_eq!(sections[0].parts, vec![("1".to_string(), 0), ("2".to_string(), 1)]);
        assert_eq!(sections[1].total, 1);
    }

    #[test]
    fn test_squad_store_paths() {
        let mut store = StoreShape::from_json(r#"{"squads": true}"#).unwrap().build();
        store
            .squads_mut()
            .unwrap()
            .add_squad(Squad::new("jmk", "Jedi Master Kenobi", "uaq", None))
            .unwrap();

        let resolver = LocationResolver::new(Mode::Counter, Catalog::default());
        let location = resolver.resolve("jmk", &store).unwrap();
        store.append(&location, Tip::new("counter", "uaq", None)).unwrap();
        assert_eq!(store.tips(&location).unwrap().len(), 1);
        assert_eq!(store.all_tips().len(), 1);
        assert!(resolver.resolve("see", &store).is_err());
    }

    #[test]
    fn test_war_keys_materialize() {
        let mut store = StoreShape::from_json(r#"{"keyed": true}"#).unwrap().build();
        let resolver = LocationResolver::new(Mode::War, Catalog::default());
        let location = resolver.resolve("rey", &NoSquads).unwrap();
        store.append(&location, Tip::new("bring Ben", "uaq", None)).unwrap();
        assert_eq!(store.keys(), vec![("rey".to_string(), 1)]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (resolver, mut store) = fixture();
        store.append(&at(&resolver, "s1n2"), Tip::new("a", "uaq", None)).unwrap();
        let json = serde_json::to_string(&store).unwrap();
        let back: TipStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }
}
