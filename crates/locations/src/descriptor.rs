//! Resolved locations.

use crate::catalog::Catalog;
use crate::conquest::ConquestLocation;
use crate::counter::CounterLocation;
use crate::mode::Mode;
use crate::rise::RiseLocation;
use crate::war::WarLocation;

/// How a resolved location is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Exactly one tip collection.
    Leaf,
    /// A listing of leaves, optionally with a collection of its own (a boss).
    Group { own_tips: bool },
    /// A listing of sub-groups, rendered without tip counts.
    MidLevel,
}

/// One step through a tip store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named child of a section.
    Child(&'static str),
    /// Numbered item, materialized on first access when the node is sparse.
    Index(u32),
    /// Free-form key, materialized on first access.
    Key(String),
    /// The collection a group owns itself.
    Own,
    /// A squad, by normalized lead id.
    Squad(String),
}

/// The suffixes that select the children of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    /// Not a group.
    None,
    /// Fixed by the grammar and catalog.
    Fixed(Vec<String>),
    /// Whatever the store has materialized so far (sparse nodes).
    Materialized,
}

/// A validated location, one variant per mode.
///
/// Each variant carries the address as typed plus its parsed components.
/// [`canonical`](Self::canonical) re-serializes the components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationDescriptor {
    Conquest {
        address: String,
        location: ConquestLocation,
    },
    Rise {
        address: String,
        location: RiseLocation,
    },
    Counter {
        address: String,
        location: CounterLocation,
    },
    War {
        address: String,
        location: WarLocation,
    },
}

impl LocationDescriptor {
    /// The mode this location belongs to.
    pub fn mode(&self) -> Mode {
        match self {
            Self::Conquest { .. } => Mode::Conquest,
            Self::Rise { .. } => Mode::Rise,
            Self::Counter { .. } => Mode::Counter,
            Self::War { .. } => Mode::War,
        }
    }

    /// The address as typed (lowercased).
    pub fn address(&self) -> &str {
        match self {
            Self::Conquest { address, .. }
            | Self::Rise { address, .. }
            | Self::Counter { address, .. }
            | Self::War { address, .. } => address,
        }
    }

    /// The canonical address of this location.
    pub fn canonical(&self) -> String {
        match self {
            Self::Conquest { location, .. } => location.canonical(),
            Self::Rise { location, .. } => location.canonical(),
            Self::Counter { location, .. } => location.lead_id.clone(),
            Self::War { location, .. } => location.key.clone(),
        }
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            Self::Conquest { location, .. } => location.resolution(),
            Self::Rise { location, .. } => location.resolution(),
            Self::Counter { .. } | Self::War { .. } => Resolution::Leaf,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.resolution() == Resolution::Leaf
    }

    /// Whether this location has a tip collection that can be read and modified.
    pub fn has_tips(&self) -> bool {
        matches!(
            self.resolution(),
            Resolution::Leaf | Resolution::Group { own_tips: true }
        )
    }

    /// Path to the store node at this location.
    pub fn storage_path(&self) -> Vec<PathSegment> {
        match self {
            Self::Conquest { location, .. } => location.storage_path(),
            Self::Rise { location, .. } => location.storage_path(),
            Self::Counter { location, .. } => vec![PathSegment::Squad(location.lead_id.clone())],
            Self::War { location, .. } => vec![PathSegment::Key(location.key.clone())],
        }
    }

    /// Path to the tip collection at this location, if it has one.
    pub fn leaf_path(&self) -> Option<Vec<PathSegment>> {
        match self.resolution() {
            Resolution::Leaf => Some(self.storage_path()),
            Resolution::Group { own_tips: true } => {
                let mut path = self.storage_path();
                path.push(PathSegment::Own);
                Some(path)
            }
            _ => None,
        }
    }

    /// Suffixes selecting this group's children.
    pub fn children(&self, catalog: &Catalog) -> Children {
        match self {
            Self::Conquest { location, .. } => location.children(catalog),
            Self::Rise { location, .. } => location.children(catalog),
            Self::Counter { .. } | Self::War { .. } => Children::None,
        }
    }

    /// What a child of this group is called, e.g. "sector" or "mission".
    pub fn child_kind(&self) -> &'static str {
        match self {
            Self::Conquest { location, .. } => location.child_kind(),
            Self::Rise { location, .. } => location.child_kind(),
            Self::Counter { .. } | Self::War { .. } => "tip",
        }
    }

    /// Full name of the location, e.g. "Sector 3 - Boss Feat 1 (`s3b1`)".
    pub fn location_name(&self, catalog: &Catalog) -> String {
        format!("{} (`{}`)", self.display_name(catalog), self.canonical())
    }

    /// Name of the location without its address.
    pub fn display_name(&self, catalog: &Catalog) -> String {
        match self {
            Self::Conquest { location, .. } => location.display_name(catalog),
            Self::Rise { location, .. } => location.display_name(catalog),
            Self::Counter { location, .. } => location.lead.clone(),
            Self::War { location, .. } => location.key.clone(),
        }
    }

    /// Short title used when the location is listed inside its group.
    pub fn tip_title(&self, catalog: &Catalog) -> String {
        match self {
            Self::Conquest { location, .. } => location.title(catalog),
            Self::Rise { location, .. } => location.title(catalog),
            Self::Counter { location, .. } => location.lead.clone(),
            Self::War { location, .. } => location.key.clone(),
        }
    }

    /// Extra description shown above the tips, if the catalog has one.
    pub fn detail(&self, catalog: &Catalog) -> Option<String> {
        match self {
            Self::Conquest { location, .. } => catalog
                .label(&location.canonical())
                .and_then(|l| l.detail.clone()),
            Self::Rise { location, .. } => location.detail(catalog),
            Self::Counter { .. } | Self::War { .. } => None,
        }
    }

    /// Map image name for this location, if the mode has maps.
    pub fn map_name(&self, catalog: &Catalog) -> Option<String> {
        match self {
            Self::Rise { location, .. } => location.map_name(catalog),
            _ => None,
        }
    }
}

/// The label name of `address`, or a fallback.
pub(crate) fn labelled(catalog: &Catalog, address: &str, fallback: impl FnOnce() -> String) -> String {
    catalog
        .name_of(address)
        .map(str::to_string)
        .unwrap_or_else(fallback)
}
