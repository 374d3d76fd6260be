//! Conquest grammar: global feats (`g`, `gN`) and sectors (`s`, `sN`,
//! `sN{b,m,n,f}`, `sN{b,m,n,f}K`).

use crate::catalog::Catalog;
use crate::descriptor::{labelled, Children, PathSegment, Resolution};
use crate::error::{Expected, InvalidLocation};
use crate::fragments::Cursor;

const SECTOR_PARTS: [&str; 4] = ["b", "m", "n", "f"];

/// Which sector boss a location refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossKind {
    Boss,
    Mini,
}

impl BossKind {
    pub fn letter(&self) -> &'static str {
        match self {
            Self::Boss => "b",
            Self::Mini => "m",
        }
    }

    fn storage_key(&self) -> &'static str {
        match self {
            Self::Boss => "boss",
            Self::Mini => "mini",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Boss => "Boss",
            Self::Mini => "Miniboss",
        }
    }
}

/// A conquest location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConquestLocation {
    /// `g`
    Globals,
    /// `gN`
    GlobalFeat(u32),
    /// `s`
    Sectors,
    /// `sN`
    Sector(u32),
    /// `sNb` / `sNm`
    Boss { sector: u32, kind: BossKind },
    /// `sNbK` / `sNmK`
    BossFeat { sector: u32, kind: BossKind, feat: u32 },
    /// `sNf`
    SectorFeats(u32),
    /// `sNfK`
    SectorFeat { sector: u32, feat: u32 },
    /// `sNn`
    Nodes(u32),
    /// `sNnK`
    Node { sector: u32, node: u32 },
}

impl ConquestLocation {
    pub(crate) fn parse(cursor: &mut Cursor<'_>, catalog: &Catalog) -> Result<Self, InvalidLocation> {
        let Some(head) = cursor.alpha() else {
            return Err(cursor.error(
                "Conquest locations start with `g` for global feats or `s` for sectors.",
                Expected::tokens(["g", "s"]),
            ));
        };

        match head.as_str() {
            "g" => {
                if cursor.is_done() {
                    return Ok(Self::Globals);
                }
                let feat = cursor.labelled_number(catalog, "g", "global feat")?;
                cursor.finish("a global feat number")?;
                Ok(Self::GlobalFeat(feat))
            }
            "s" => {
                if cursor.is_done() {
                    return Ok(Self::Sectors);
                }
                let sector = cursor.labelled_number(catalog, "s", "sector")?;
                if cursor.is_done() {
                    return Ok(Self::Sector(sector));
                }
                Self::parse_sector_part(cursor, catalog, sector)
            }
            other => Err(cursor.error(
                format!("`{}` is not a conquest location type.", other),
                Expected::tokens(["g", "s"]),
            )),
        }
    }

    fn parse_sector_part(
        cursor: &mut Cursor<'_>,
        catalog: &Catalog,
        sector: u32,
    ) -> Result<Self, InvalidLocation> {
        let part = cursor.alpha().unwrap_or_default();
        let prefix = format!("s{}{}", sector, part);

        match part.as_str() {
            "b" | "m" => {
                let kind = if part == "b" { BossKind::Boss } else { BossKind::Mini };
                if cursor.is_done() {
                    return Ok(Self::Boss { sector, kind });
                }
                let feat = cursor.labelled_number(catalog, &prefix, "feat")?;
                cursor.finish("a feat number")?;
                Ok(Self::BossFeat { sector, kind, feat })
            }
            "f" => {
                if cursor.is_done() {
                    return Ok(Self::SectorFeats(sector));
                }
                let feat = cursor.labelled_number(catalog, &prefix, "sector feat")?;
                cursor.finish("a sector feat number")?;
                Ok(Self::SectorFeat { sector, feat })
            }
            "n" => {
                if cursor.is_done() {
                    return Ok(Self::Nodes(sector));
                }
                let count = catalog.label(&prefix).and_then(|l| l.count).unwrap_or(0);
                let expected = if count > 0 {
                    Expected::Range { min: 1, max: count }
                } else {
                    Expected::Description(format!("no nodes are configured under `{}`", prefix))
                };
                let Some(node) = cursor.number() else {
                    return Err(cursor.error("`n` must be followed by a node number.", expected));
                };
                if node == 0 || node > count {
                    return Err(cursor.error(format!("There is no node {} in sector {}.", node, sector), expected));
                }
                cursor.finish("a node number")?;
                Ok(Self::Node { sector, node })
            }
            other => Err(cursor.error(
                format!(
                    "The character following sector `{}` must be `b` for boss tips, `m` for miniboss tips, \
                     `n` for node tips, or `f` for sector feats, found `{}`.",
                    sector, other
                ),
                Expected::tokens(SECTOR_PARTS),
            )),
        }
    }

    pub fn canonical(&self) -> String {
        match self {
            Self::Globals => "g".to_string(),
            Self::GlobalFeat(feat) => format!("g{}", feat),
            Self::Sectors => "s".to_string(),
            Self::Sector(sector) => format!("s{}", sector),
            Self::Boss { sector, kind } => format!("s{}{}", sector, kind.letter()),
            Self::BossFeat { sector, kind, feat } => format!("s{}{}{}", sector, kind.letter(), feat),
            Self::SectorFeats(sector) => format!("s{}f", sector),
            Self::SectorFeat { sector, feat } => format!("s{}f{}", sector, feat),
            Self::Nodes(sector) => format!("s{}n", sector),
            Self::Node { sector, node } => format!("s{}n{}", sector, node),
        }
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            Self::Sectors | Self::Sector(_) => Resolution::MidLevel,
            Self::Boss { .. } => Resolution::Group { own_tips: true },
            Self::Globals | Self::SectorFeats(_) | Self::Nodes(_) => Resolution::Group { own_tips: false },
            Self::GlobalFeat(_)
            | Self::BossFeat { .. }
            | Self::SectorFeat { .. }
            | Self::Node { .. } => Resolution::Leaf,
        }
    }

    pub fn storage_path(&self) -> Vec<PathSegment> {
        use PathSegment::{Child, Index};

        match self {
            Self::Globals => vec![Child("globals")],
            Self::GlobalFeat(feat) => vec![Child("globals"), Index(*feat)],
            Self::Sectors => vec![Child("sectors")],
            Self::Sector(sector) => vec![Child("sectors"), Index(*sector)],
            Self::Boss { sector, kind } => {
                vec![Child("sectors"), Index(*sector), Child(kind.storage_key())]
            }
            Self::BossFeat { sector, kind, feat } => vec![
                Child("sectors"),
                Index(*sector),
                Child(kind.storage_key()),
                Child("feats"),
                Index(*feat),
            ],
            Self::SectorFeats(sector) => vec![Child("sectors"), Index(*sector), Child("feats")],
            Self::SectorFeat { sector, feat } => {
                vec![Child("sectors"), Index(*sector), Child("feats"), Index(*feat)]
            }
            Self::Nodes(sector) => vec![Child("sectors"), Index(*sector), Child("nodes")],
            Self::Node { sector, node } => {
                vec![Child("sectors"), Index(*sector), Child("nodes"), Index(*node)]
            }
        }
    }

    pub(crate) fn children(&self, catalog: &Catalog) -> Children {
        let numbered = |prefix: String| {
            Children::Fixed(catalog.numbered(&prefix).iter().map(u32::to_string).collect())
        };

        match self {
            Self::Globals => numbered("g".to_string()),
            Self::Sectors => numbered("s".to_string()),
            Self::Sector(_) => Children::Fixed(SECTOR_PARTS.iter().map(|p| p.to_string()).collect()),
            Self::Boss { .. } | Self::SectorFeats(_) => numbered(self.canonical()),
            Self::Nodes(_) => Children::Materialized,
            _ => Children::None,
        }
    }

    pub(crate) fn child_kind(&self) -> &'static str {
        match self {
            Self::Globals => "global feat",
            Self::Sectors => "sector",
            Self::Sector(_) => "tip type",
            Self::Boss { .. } => "feat",
            Self::SectorFeats(_) => "sector feat",
            Self::Nodes(_) => "node",
            _ => "tip",
        }
    }

    pub(crate) fn title(&self, catalog: &Catalog) -> String {
        let address = self.canonical();
        match self {
            Self::Globals => labelled(catalog, &address, || "Global Feats".to_string()),
            Self::GlobalFeat(feat) => labelled(catalog, &address, || format!("Global Feat {}", feat)),
            Self::Sectors => labelled(catalog, &address, || "Sectors".to_string()),
            Self::Sector(sector) => labelled(catalog, &address, || format!("Sector {}", sector)),
            Self::Boss { kind, .. } => labelled(catalog, &address, || kind.title().to_string()),
            Self::BossFeat { kind, feat, .. } => {
                labelled(catalog, &address, || format!("{} Feat {}", kind.title(), feat))
            }
            Self::SectorFeats(_) => labelled(catalog, &address, || "Sector Feats".to_string()),
            Self::SectorFeat { feat, .. } => {
                labelled(catalog, &address, || format!("Sector Feat {}", feat))
            }
            Self::Nodes(_) => labelled(catalog, &address, || "Nodes".to_string()),
            Self::Node { node, .. } => labelled(catalog, &address, || format!("Node {}", node)),
        }
    }

    pub(crate) fn display_name(&self, catalog: &Catalog) -> String {
        match self.sector() {
            Some(sector) if !matches!(self, Self::Sector(_)) => {
                format!("{} - {}", Self::Sector(sector).title(catalog), self.title(catalog))
            }
            _ => self.title(catalog),
        }
    }

    fn sector(&self) -> Option<u32> {
        match self {
            Self::Sector(sector)
            | Self::SectorFeats(sector)
            | Self::Nodes(sector)
            | Self::Boss { sector, .. }
            | Self::BossFeat { sector, .. }
            | Self::SectorFeat { sector, .. }
            | Self::Node { sector, .. } => Some(*sector),
            Self::Globals | Self::GlobalFeat(_) | Self::Sectors => None,
        }
    }
}
