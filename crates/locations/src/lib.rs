//! Address grammars and location resolvers.
//!
//! Every mode has a small, fixed grammar that turns a short address such as
//! `s3b1` or `ds2cm4` into a validated [`LocationDescriptor`]. Numerals are
//! checked against the mode's label [`Catalog`], never against constants.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use locations::{LocationResolver, Mode, NoSquads, Resolution};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = LocationResolver::load(Path::new("data"), Mode::Conquest)?;
//!
//! let location = resolver.resolve("s3b", &NoSquads)?;
//! assert_eq!(location.resolution(), Resolution::Group { own_tips: true });
//!
//! let err = resolver.resolve("s3z", &NoSquads).unwrap_err();
//! println!("{}", err);
//! # Ok(())
//! # }
//! ```

mod catalog;
mod conquest;
mod counter;
mod descriptor;
mod error;
mod fragments;
mod mode;
mod resolver;
mod rise;
mod war;

pub use catalog::{Catalog, Label};
pub use conquest::{BossKind, ConquestLocation};
pub use counter::{CounterLocation, NoSquads, SquadDirectory};
pub use descriptor::{Children, LocationDescriptor, PathSegment, Resolution};
pub use error::{CatalogError, Expected, InvalidLocation};
pub use mode::Mode;
pub use resolver::LocationResolver;
pub use rise::{MissionKind, RiseLocation, Track};
pub use war::WarLocation;
