//! Rise grammar: `<track>`, `<track>N`, `<track>Ncm`, `<track>NcmK`,
//! `<track>Nsm`, `<track>Nf`.

use crate::catalog::Catalog;
use crate::descriptor::{labelled, Children, PathSegment, Resolution};
use crate::error::{Expected, InvalidLocation};
use crate::fragments::Cursor;

/// A rise track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    DarkSide,
    Mixed,
    LightSide,
    LightSideBonus,
}

impl Track {
    const ALL: [Track; 4] = [Track::DarkSide, Track::Mixed, Track::LightSide, Track::LightSideBonus];

    /// Address prefix, e.g. `ds`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DarkSide => "ds",
            Self::Mixed => "mx",
            Self::LightSide => "ls",
            Self::LightSideBonus => "lsb",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    fn storage_key(&self) -> &'static str {
        match self {
            Self::DarkSide => "darkside",
            Self::Mixed => "mixed",
            Self::LightSide => "lightside",
            Self::LightSideBonus => "lightsidebonus",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::DarkSide => "Dark Side",
            Self::Mixed => "Mixed",
            Self::LightSide => "Light Side",
            Self::LightSideBonus => "Light Side Bonus",
        }
    }
}

/// A mission type on a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionKind {
    Combat,
    Special,
    Fleet,
}

impl MissionKind {
    const ALL: [MissionKind; 3] = [MissionKind::Combat, MissionKind::Special, MissionKind::Fleet];

    /// Address code, e.g. `cm`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Combat => "cm",
            Self::Special => "sm",
            Self::Fleet => "f",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    fn storage_key(&self) -> &'static str {
        match self {
            Self::Combat => "cm",
            Self::Special => "sm",
            Self::Fleet => "fleet",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Combat => "Combat Mission",
            Self::Special => "Special Mission",
            Self::Fleet => "Fleet Mission",
        }
    }
}

/// A rise location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RiseLocation {
    /// `ds`
    Track(Track),
    /// `ds1`
    Planet { track: Track, planet: u32 },
    /// `ds1cm`
    CombatMissions { track: Track, planet: u32 },
    /// `ds1cm2`, `ds1sm`, `ds1f`
    Mission {
        track: Track,
        planet: u32,
        kind: MissionKind,
        number: Option<u32>,
    },
}

impl RiseLocation {
    pub(crate) fn parse(cursor: &mut Cursor<'_>, catalog: &Catalog) -> Result<Self, InvalidLocation> {
        let track_codes = Track::ALL.map(|t| t.code());
        let head = cursor.alpha().unwrap_or_default();
        let Some(track) = Track::from_code(&head) else {
            return Err(cursor.error(
                "Rise locations start with a track.",
                Expected::tokens(track_codes),
            ));
        };
        if cursor.is_done() {
            return Ok(Self::Track(track));
        }

        let planet = cursor.labelled_number(catalog, track.code(), "planet")?;
        if cursor.is_done() {
            return Ok(Self::Planet { track, planet });
        }

        let code = cursor.alpha().unwrap_or_default();
        let Some(kind) = MissionKind::from_code(&code) else {
            return Err(cursor.error(
                format!("`{}` is not a mission type.", code),
                Expected::tokens(MissionKind::ALL.map(|m| m.code())),
            ));
        };

        let planet_address = format!("{}{}", track.code(), planet);
        match kind {
            MissionKind::Combat => {
                if cursor.is_done() {
                    return Ok(Self::CombatMissions { track, planet });
                }
                let prefix = format!("{}cm", planet_address);
                let number = cursor.labelled_number(catalog, &prefix, "combat mission")?;
                cursor.finish("a combat mission number")?;
                Ok(Self::Mission {
                    track,
                    planet,
                    kind,
                    number: Some(number),
                })
            }
            MissionKind::Special | MissionKind::Fleet => {
                if cursor.number().is_some() {
                    return Err(cursor.error(
                        format!("{}s are not numbered.", kind.title()),
                        Expected::Description(format!("`{}{}` with no number", planet_address, kind.code())),
                    ));
                }
                cursor.finish("the mission type")?;
                let address = format!("{}{}", planet_address, kind.code());
                if !catalog.contains(&address) {
                    return Err(cursor.error(
                        format!("This planet has no {}.", kind.title()),
                        Expected::Description("a mission listed for the planet".to_string()),
                    ));
                }
                Ok(Self::Mission {
                    track,
                    planet,
                    kind,
                    number: None,
                })
            }
        }
    }

    fn track(&self) -> Track {
        match self {
            Self::Track(track)
            | Self::Planet { track, .. }
            | Self::CombatMissions { track, .. }
            | Self::Mission { track, .. } => *track,
        }
    }

    fn planet(&self) -> Option<u32> {
        match self {
            Self::Track(_) => None,
            Self::Planet { planet, .. }
            | Self::CombatMissions { planet, .. }
            | Self::Mission { planet, .. } => Some(*planet),
        }
    }

    fn planet_address(&self) -> Option<String> {
        self.planet().map(|p| format!("{}{}", self.track().code(), p))
    }

    pub fn canonical(&self) -> String {
        match self {
            Self::Track(track) => track.code().to_string(),
            Self::Planet { track, planet } => format!("{}{}", track.code(), planet),
            Self::CombatMissions { track, planet } => format!("{}{}cm", track.code(), planet),
            Self::Mission {
                track,
                planet,
                kind,
                number,
            } => {
                let number = number.map(|n| n.to_string()).unwrap_or_default();
                format!("{}{}{}{}", track.code(), planet, kind.code(), number)
            }
        }
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            Self::Track(_) => Resolution::MidLevel,
            Self::Planet { .. } | Self::CombatMissions { .. } => Resolution::Group { own_tips: false },
            Self::Mission { .. } => Resolution::Leaf,
        }
    }

    pub fn storage_path(&self) -> Vec<PathSegment> {
        use PathSegment::{Child, Index};

        let mut path = vec![Child(self.track().storage_key())];
        if let Some(planet) = self.planet() {
            path.push(Index(planet));
        }
        match self {
            Self::CombatMissions { .. } => path.push(Child(MissionKind::Combat.storage_key())),
            Self::Mission { kind, number, .. } => {
                path.push(Child(kind.storage_key()));
                if let Some(number) = number {
                    path.push(Index(*number));
                }
            }
            Self::Track(_) | Self::Planet { .. } => {}
        }
        path
    }

    pub(crate) fn children(&self, catalog: &Catalog) -> Children {
        match self {
            Self::Track(track) => Children::Fixed(
                catalog.numbered(track.code()).iter().map(u32::to_string).collect(),
            ),
            Self::Planet { .. } => {
                let planet = self.planet_address().unwrap_or_default();
                let mut suffixes: Vec<String> = catalog
                    .numbered(&format!("{}cm", planet))
                    .iter()
                    .map(|n| format!("cm{}", n))
                    .collect();
                for kind in [MissionKind::Special, MissionKind::Fleet] {
                    if catalog.contains(&format!("{}{}", planet, kind.code())) {
                        suffixes.push(kind.code().to_string());
                    }
                }
                Children::Fixed(suffixes)
            }
            Self::CombatMissions { .. } => Children::Fixed(
                catalog.numbered(&self.canonical()).iter().map(u32::to_string).collect(),
            ),
            Self::Mission { .. } => Children::None,
        }
    }

    pub(crate) fn child_kind(&self) -> &'static str {
        match self {
            Self::Track(_) => "planet",
            Self::Planet { .. } => "mission",
            Self::CombatMissions { .. } => "combat mission",
            Self::Mission { .. } => "tip",
        }
    }

    pub(crate) fn title(&self, catalog: &Catalog) -> String {
        let address = self.canonical();
        match self {
            Self::Track(track) => labelled(catalog, &address, || track.title().to_string()),
            Self::Planet { planet, .. } => labelled(catalog, &address, || format!("Planet {}", planet)),
            Self::CombatMissions { .. } => labelled(catalog, &address, || "Combat Missions".to_string()),
            Self::Mission { kind, number, .. } => labelled(catalog, &address, || match number {
                Some(n) => format!("{} {}", kind.title(), n),
                None => kind.title().to_string(),
            }),
        }
    }

    pub(crate) fn display_name(&self, catalog: &Catalog) -> String {
        let track = Self::Track(self.track()).title(catalog);
        match self {
            Self::Track(_) => track,
            Self::Planet { .. } => format!("{} - {}", track, self.title(catalog)),
            Self::CombatMissions { track: t, planet } | Self::Mission { track: t, planet, .. } => {
                let planet = Self::Planet { track: *t, planet: *planet }.title(catalog);
                format!("{} - {} {}", track, planet, self.title(catalog))
            }
        }
    }

    pub(crate) fn detail(&self, catalog: &Catalog) -> Option<String> {
        let label = catalog.label(&self.canonical())?;
        let mut lines = Vec::new();
        if let Some(detail) = &label.detail {
            lines.push(detail.clone());
        }
        if let Some(requirements) = &label.requirements {
            lines.push(format!("Requirements: {}", requirements));
        }
        for (index, wave) in label.enemies.iter().enumerate() {
            lines.push(format!("Wave {}: {}", index + 1, wave));
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    pub(crate) fn map_name(&self, catalog: &Catalog) -> Option<String> {
        let planet = self.planet_address()?;
        let label = catalog.label(&planet)?;
        Some(label.map.clone().unwrap_or_else(|| label.name.to_lowercase()))
    }
}
