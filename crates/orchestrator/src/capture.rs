//! Free-text continuations: the requester's next message in a channel.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use holocron_core::TipId;
use locations::{LocationDescriptor, Mode};

use crate::context::RequestContext;
use crate::sender::Target;

/// What the captured message will be used for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureKind {
    /// Content of a new tip.
    AddTip { location: LocationDescriptor },
    /// Title of a new counter tip.
    CounterTitle { location: LocationDescriptor },
    /// Content of a new counter tip, after its title.
    CounterContent {
        location: LocationDescriptor,
        title: String,
    },
    /// Replacement content for a tip.
    EditTip {
        location: LocationDescriptor,
        tip_id: TipId,
    },
    /// `confirm` to delete a tip.
    ConfirmDelete {
        location: LocationDescriptor,
        tip_id: TipId,
    },
    /// `confirm` to clear the whole mode.
    ConfirmClear,
    /// Display title for a squad being added or renamed.
    SquadName {
        location: LocationDescriptor,
        replace: bool,
    },
}

impl CaptureKind {
    /// Reply sent when the requester answers `cancel`.
    pub fn cancel_message(&self) -> &'static str {
        match self {
            Self::AddTip { .. } | Self::CounterTitle { .. } | Self::CounterContent { .. } => {
                "Tip addition has been cancelled."
            }
            Self::EditTip { .. } => "Edit cancelled. Tip will remain as it was.",
            Self::ConfirmDelete { .. } => "Deletion canceled. Tip not deleted.",
            Self::ConfirmClear => "Storage clearing canceled. All tips will remain.",
            Self::SquadName { .. } => "Squad change has been cancelled.",
        }
    }
}

/// A pending free-text continuation.
#[derive(Debug, Clone)]
pub struct Capture {
    pub mode: Mode,
    pub context: RequestContext,
    pub target: Target,
    pub kind: CaptureKind,
    pub created_at: DateTime<Utc>,
}

impl Capture {
    pub fn new(
        mode: Mode,
        context: RequestContext,
        target: Target,
        kind: CaptureKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            mode,
            context,
            target,
            kind,
            created_at: now,
        }
    }
}

/// Captures keyed by (requester, channel). A newer capture replaces an older one.
///
/// Captures do not expire; they end when answered, cancelled or replaced.
#[derive(Debug, Default)]
pub struct CaptureTable {
    entries: HashMap<(String, String), Capture>,
}

impl CaptureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, capture: Capture) {
        let key = (
            capture.context.requester_id.clone(),
            capture.context.channel_id.clone(),
        );
        self.entries.insert(key, capture);
    }

    /// Remove and return the capture waiting on this requester in this channel.
    pub fn take(&mut self, requester_id: &str, channel_id: &str) -> Option<Capture> {
        self.entries
            .remove(&(requester_id.to_string(), channel_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
