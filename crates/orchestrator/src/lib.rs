//! Command handling and interaction workflows for the holocron.
//!
//! This crate provides the [`Orchestrator`] type, which turns chat commands
//! into reads and changes of the per-mode tip stores.
//!
//! # Features
//!
//! - Parses order-insensitive command arguments into a [`CommandRequest`]
//! - Resolves addresses per mode and drills into groups with paged prompts
//! - Runs add, edit, delete and reassign as multi-step interactions
//! - Manages counter squads and their aliases
//! - Writes every change through to a [`Persistence`](tip_storage::Persistence)
//!
//! # Architecture
//!
//! ```text
//! message from the front end
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  capture waiting for this requester + channel?              │
//! │     yes → feed it (tip text, confirm, squad name)           │
//! │     no  → parse command → resolve address → mode lock       │
//! │         ↓                                                   │
//! │  read / add / edit / delete / list / squads                 │
//! │         ↓                                                   │
//! │  response, or a prompt registered in the pending table      │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑
//! selection event (number, next, previous, cancel, add/edit/delete)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orchestrator::{LoggingTransport, Orchestrator, RequestContext, Settings, StaticPermissions};
//! use locations::Mode;
//! use tip_storage::MemoryPersistence;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::load(
//!         Settings::from_env()?,
//!         LoggingTransport,
//!         StaticPermissions::new().with_admin("u1"),
//!         Arc::new(MemoryPersistence::new()),
//!     )
//!     .await?;
//!
//!     let context = RequestContext::new("u1", "Luke", "general", "guild");
//!     let outcome = orchestrator.handle_command(&context, Mode::Conquest, "g1").await?;
//!     println!("{:?}", outcome.responses);
//!     Ok(())
//! }
//! ```

mod capture;
mod command;
mod context;
mod error;
mod formatting;
mod help;
mod holocron;
mod orchestrator;
mod pending;
mod permissions;
mod selector;
mod sender;
mod settings;

pub use capture::{Capture, CaptureKind, CaptureTable};
pub use command::{split_quoted, CommandRequest, HelpTopic, Operation};
pub use context::{Outcome, RequestContext, SelectionEvent, SelectionOutcome};
pub use error::{HolocronError, OrchestratorError};
pub use holocron::{Holocron, ReadOptions, MAX_READ_DEPTH, MIN_READ_DEPTH};
pub use orchestrator::Orchestrator;
pub use pending::{Candidate, PendingInteraction, PendingTable, PromptKind, PAGE_SIZE};
pub use permissions::{Permissions, StaticPermissions};
pub use selector::Selector;
pub use sender::{LoggingTransport, MessageId, NoOpTransport, RecordingTransport, SentMessage, Target, Transport};
pub use settings::{ResponseMode, Settings, SettingsError};
