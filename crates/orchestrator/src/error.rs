//! Error types for orchestrator operations.

use locations::{CatalogError, InvalidLocation, Mode};
use thiserror::Error;
use tip_storage::StorageError;

/// Problems with a user's command, rendered back to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HolocronError {
    /// The address did not resolve.
    #[error("{0}")]
    InvalidAddress(#[from] InvalidLocation),

    /// Free text was given without quotes.
    #[error(
        "Too many values after `add`. Surround the tip text with double quotes to add it inline, \
         e.g. `add \"your tip here\"`."
    )]
    AmbiguousCommandArgument,

    /// The requester lacks the elevated role.
    #[error("You do not have access to this command.")]
    NotAuthorized,

    /// No tips the requester may modify at the location.
    #[error("There are no tips that you can {action} for {location}.")]
    NothingToModify { action: String, location: String },

    /// A continuation was asked to perform an operation it does not handle.
    #[error("Unknown operation: `{0}`.")]
    UnknownOperation(String),

    /// The operation exists but not in this mode.
    #[error("`{operation}` is not supported in {mode} mode.")]
    UnsupportedOperation { operation: String, mode: Mode },

    /// The operation needs an address.
    #[error("This command needs a location, e.g. {hint}.")]
    MissingAddress { hint: String },

    /// A modification targeted a location without its own tips.
    #[error("{location} is a group. Add, edit and delete need a location that holds tips, e.g. {hint}.")]
    NotATipLocation { location: String, hint: String },

    /// A read filter that is neither a depth nor an activity.
    #[error("Unrecognized filter `{value}`. Use a number of tips to show between {min} and {max} (inclusive).")]
    InvalidReadFilter { value: String, min: usize, max: usize },

    /// A required argument is missing.
    #[error("Missing {0}.")]
    MissingArgument(&'static str),

    /// A squad with this lead id already exists.
    #[error("Squad `{0}` already exists. Use `editsquad` to rename it.")]
    SquadExists(String),
}

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Message sending failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Tip store or persistence failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Label catalog could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A user-facing command error.
    #[error(transparent)]
    Holocron(#[from] HolocronError),

    /// No holocron is loaded for the mode.
    #[error("mode not loaded: {0}")]
    ModeNotLoaded(Mode),
}

impl From<InvalidLocation> for OrchestratorError {
    fn from(err: InvalidLocation) -> Self {
        Self::Holocron(HolocronError::InvalidAddress(err))
    }
}
