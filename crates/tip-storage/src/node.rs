//! Store nodes.

use std::collections::BTreeMap;

use holocron_core::Tip;
use indexmap::IndexMap;
use locations::PathSegment;
use serde::{Deserialize, Serialize};

/// One node of a mode's tip tree.
///
/// The tree's shape is fixed when it is built from a [`StoreShape`](crate::StoreShape);
/// only sparse and keyed nodes gain entries at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// A tip collection.
    Leaf { tips: Vec<Tip> },
    /// Named children, optionally with a collection of its own.
    Section {
        #[serde(default)]
        tips: Option<Vec<Tip>>,
        children: IndexMap<String, Node>,
    },
    /// A fixed run of numbered children.
    Numbered { items: BTreeMap<u32, Node> },
    /// Numbered collections created on first access.
    Sparse { items: BTreeMap<u32, Vec<Tip>> },
    /// Keyed collections created on first access.
    Keyed { items: BTreeMap<String, Vec<Tip>> },
}

impl Node {
    /// Step into a named or numbered child.
    pub fn child(&self, segment: &PathSegment) -> Option<&Node> {
        match (self, segment) {
            (Node::Section { children, .. }, PathSegment::Child(name)) => children.get(*name),
            (Node::Numbered { items }, PathSegment::Index(index)) => items.get(index),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, segment: &PathSegment) -> Option<&mut Node> {
        match (self, segment) {
            (Node::Section { children, .. }, PathSegment::Child(name)) => children.get_mut(*name),
            (Node::Numbered { items }, PathSegment::Index(index)) => items.get_mut(index),
            _ => None,
        }
    }

    /// Total number of tips at or below this node.
    pub fn tip_count(&self) -> usize {
        match self {
            Node::Leaf { tips } => tips.len(),
            Node::Section { tips, children } => {
                tips.as_ref().map_or(0, Vec::len) + children.values().map(Node::tip_count).sum::<usize>()
            }
            Node::Numbered { items } => items.values().map(Node::tip_count).sum(),
            Node::Sparse { items } => items.values().map(Vec::len).sum(),
            Node::Keyed { items } => items.values().map(Vec::len).sum(),
        }
    }

    /// Append every tip at or below this node to `out`.
    pub fn collect_tips<'a>(&'a self, out: &mut Vec<&'a Tip>) {
        match self {
            Node::Leaf { tips } => out.extend(tips),
            Node::Section { tips, children } => {
                if let Some(tips) = tips {
                    out.extend(tips);
                }
                for child in children.values() {
                    child.collect_tips(out);
                }
            }
            Node::Numbered { items } => items.values().for_each(|n| n.collect_tips(out)),
            Node::Sparse { items } => items.values().for_each(|t| out.extend(t)),
            Node::Keyed { items } => items.values().for_each(|t| out.extend(t)),
        }
    }

    /// Keys of the entries a sparse or keyed node has materialized.
    pub fn materialized_keys(&self) -> Vec<String> {
        match self {
            Node::Sparse { items } => items.keys().map(u32::to_string).collect(),
            Node::Keyed { items } => items.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Tip counts of the immediate children, keyed by their names.
    pub fn child_counts(&self) -> Vec<(String, usize)> {
        match self {
            Node::Leaf { .. } => Vec::new(),
            Node::Section { tips, children } => {
                let mut counts: Vec<(String, usize)> = tips
                    .as_ref()
                    .map(|t| ("tips".to_string(), t.len()))
                    .into_iter()
                    .collect();
                counts.extend(children.iter().map(|(name, n)| (name.clone(), n.tip_count())));
                counts
            }
            Node::Numbered { items } => items
                .iter()
                .map(|(index, n)| (index.to_string(), n.tip_count()))
                .collect(),
            Node::Sparse { items } => items
                .iter()
                .map(|(index, t)| (index.to_string(), t.len()))
                .collect(),
            Node::Keyed { items } => items.iter().map(|(key, t)| (key.clone(), t.len())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_collection() {
        let node = Node::Section {
            tips: Some(vec![Tip::new("own", "uaq", None)]),
            children: IndexMap::from([(
                "feats".to_string(),
                Node::Numbered {
                    items: BTreeMap::from([
                        (1, Node::Leaf { tips: vec![Tip::new("a", "uaq", None)] }),
                        (2, Node::Leaf { tips: vec![] }),
                    ]),
                },
            )]),
        };

        assert_eq!(node.tip_count(), 2);
        assert_eq!(
            node.child_counts(),
            vec![("tips".to_string(), 1), ("feats".to_string(), 1)]
        );

        let mut all = Vec::new();
        node.collect_tips(&mut all);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_materialized_keys() {
        let node = Node::Sparse {
            items: BTreeMap::from([(13, vec![]), (2, vec![])]),
        };
        assert_eq!(node.materialized_keys(), vec!["2", "13"]);
        assert!(Node::Leaf { tips: vec![] }.materialized_keys().is_empty());
    }
}
