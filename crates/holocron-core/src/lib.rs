//! Core records for the Holocron tip manager.
//!
//! This crate provides the value types shared by every other crate in the
//! workspace:
//!
//! - [`Tip`] - A community-authored annotation attached to one location
//! - [`Squad`] / [`Alias`] - Counter-mode aggregates that own their tips
//! - [`SortPolicy`] - Presentation ordering for tip listings
//!
//! # Example
//!
//! ```rust
//! use holocron_core::{SortPolicy, Tip};
//!
//! let mut tips = vec![
//!     Tip::new("use Thrawn", "uaq", Some("42".to_string())),
//!     Tip::new("bring a healer", "trich", None).with_rating(3),
//! ];
//! let ordered = SortPolicy::Rating.sorted(&tips);
//! assert_eq!(ordered[0].content, "bring a healer");
//!
//! tips[0].set_content("use Thrawn and Kyber");
//! assert!(tips[0].edited);
//! ```

mod elapsed;
mod sort;
mod squad;
mod tip;

pub use elapsed::describe_elapsed;
pub use sort::SortPolicy;
pub use squad::{normalize_activity, Alias, Squad, ACTIVITIES};
pub use tip::{Tip, TipId};
