//! Per-mode resolver entry point.

use std::path::Path;

use tracing::debug;

use crate::catalog::Catalog;
use crate::conquest::ConquestLocation;
use crate::counter::{CounterLocation, SquadDirectory};
use crate::descriptor::{Children, LocationDescriptor};
use crate::error::{CatalogError, Expected, InvalidLocation};
use crate::fragments::Cursor;
use crate::mode::Mode;
use crate::rise::RiseLocation;
use crate::war::WarLocation;

/// Resolves addresses for one mode against its label catalog.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    mode: Mode,
    catalog: Catalog,
}

impl LocationResolver {
    /// Create a resolver from an already loaded catalog.
    pub fn new(mode: Mode, catalog: Catalog) -> Self {
        Self { mode, catalog }
    }

    /// Load the catalog for `mode` from `<data_dir>/<mode>/labels.json`.
    pub fn load(data_dir: &Path, mode: Mode) -> Result<Self, CatalogError> {
        Ok(Self::new(mode, Catalog::load(data_dir, mode)?))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve an address. Only counter mode consults `squads`.
    pub fn resolve(
        &self,
        address: &str,
        squads: &dyn SquadDirectory,
    ) -> Result<LocationDescriptor, InvalidLocation> {
        let address = address.trim().to_lowercase();
        if address.is_empty() {
            return Err(InvalidLocation::new(
                &address,
                "A location is required.",
                Expected::Description(self.address_hint().to_string()),
            ));
        }

        let descriptor = match self.mode {
            Mode::Conquest => {
                let mut cursor = Cursor::new(&address)?;
                let location = ConquestLocation::parse(&mut cursor, &self.catalog)?;
                LocationDescriptor::Conquest {
                    address: cursor.address().to_string(),
                    location,
                }
            }
            Mode::Rise => {
                let mut cursor = Cursor::new(&address)?;
                let location = RiseLocation::parse(&mut cursor, &self.catalog)?;
                LocationDescriptor::Rise {
                    address: cursor.address().to_string(),
                    location,
                }
            }
            Mode::Counter => LocationDescriptor::Counter {
                location: CounterLocation::parse(&address, squads)?,
                address,
            },
            Mode::War => LocationDescriptor::War {
                location: WarLocation::parse(&address)?,
                address,
            },
        };

        debug!(
            mode = %self.mode,
            address = descriptor.address(),
            canonical = %descriptor.canonical(),
            "Resolved location"
        );
        Ok(descriptor)
    }

    /// Resolve the child of a group selected by one of its listing suffixes.
    pub fn resolve_child(
        &self,
        parent: &LocationDescriptor,
        suffix: &str,
        squads: &dyn SquadDirectory,
    ) -> Result<LocationDescriptor, InvalidLocation> {
        self.resolve(&format!("{}{}", parent.canonical(), suffix), squads)
    }

    /// Resolve a counter lead id that is not registered yet (adding a squad).
    pub fn resolve_unregistered_squad(&self, address: &str) -> Result<LocationDescriptor, InvalidLocation> {
        if self.mode != Mode::Counter {
            return Err(InvalidLocation::new(
                address,
                "Only counter locations are squads.",
                Expected::Description(self.address_hint().to_string()),
            ));
        }
        let address = address.trim().to_lowercase();
        Ok(LocationDescriptor::Counter {
            location: CounterLocation::unregistered(&address)?,
            address,
        })
    }

    /// Fixed child suffixes of a group, as known from the grammar and catalog.
    pub fn children(&self, descriptor: &LocationDescriptor) -> Children {
        descriptor.children(&self.catalog)
    }

    pub fn location_name(&self, descriptor: &LocationDescriptor) -> String {
        descriptor.location_name(&self.catalog)
    }

    pub fn tip_title(&self, descriptor: &LocationDescriptor) -> String {
        descriptor.tip_title(&self.catalog)
    }

    pub fn detail(&self, descriptor: &LocationDescriptor) -> Option<String> {
        descriptor.detail(&self.catalog)
    }

    pub fn map_name(&self, descriptor: &LocationDescriptor) -> Option<String> {
        descriptor.map_name(&self.catalog)
    }

    /// Example address for this mode, used in error messages.
    pub fn address_hint(&self) -> &'static str {
        match self.mode {
            Mode::Conquest => "an address like `g3`, `s2b`, `s2b1`, `s1f3` or `s3n16`",
            Mode::Rise => "an address like `ds`, `ds1`, `ds1cm2`, `ds1sm` or `ls2f`",
            Mode::Counter => "a squad lead id like `jmk`",
            Mode::War => "any name",
        }
    }
}
