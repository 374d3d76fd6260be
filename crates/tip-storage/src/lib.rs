//! Hierarchical tip store for the Holocron tip manager.
//!
//! This crate provides the nested container each mode keeps its tips in, the
//! declarative shape it is built from, the counter squad store, and
//! whole-snapshot persistence using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use tip_storage::{Persistence, SqlitePersistence, StoreShape};
//! use locations::Mode;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let persistence = SqlitePersistence::connect("sqlite:holocron.db?mode=rwc").await?;
//!     persistence.migrate().await?;
//!
//!     // Load the saved conquest store, or build an empty one from its shape
//!     let store = match persistence.load(Mode::Conquest).await? {
//!         Some(store) => store,
//!         None => StoreShape::load(Path::new("data"), Mode::Conquest)?.build(),
//!     };
//!     persistence.save(Mode::Conquest, &store).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod node;
pub mod persistence;
pub mod shape;
pub mod squads;
pub mod store;

pub use error::{Result, StorageError};
pub use node::Node;
pub use persistence::{MemoryPersistence, Persistence, SqlitePersistence};
pub use shape::{SectionShape, StoreShape};
pub use squads::{OrphanPolicy, SquadStore};
pub use store::{SectionStats, StoreStats, TipField, TipStore};
