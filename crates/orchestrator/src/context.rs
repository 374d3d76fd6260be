//! Request and event context passed in by the front end.

use serde::{Deserialize, Serialize};

use crate::sender::MessageId;

/// Who issued a command, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Transport id of the requester.
    pub requester_id: String,
    /// Display name, recorded as the author of new tips.
    pub requester_name: String,
    /// Channel the command was sent in.
    pub channel_id: String,
    /// Guild or server the channel belongs to, used for role and member lookups.
    pub scope_id: String,
}

impl RequestContext {
    pub fn new(
        requester_id: impl Into<String>,
        requester_name: impl Into<String>,
        channel_id: impl Into<String>,
        scope_id: impl Into<String>,
    ) -> Self {
        Self {
            requester_id: requester_id.into(),
            requester_name: requester_name.into(),
            channel_id: channel_id.into(),
            scope_id: scope_id.into(),
        }
    }
}

/// A selector chosen on a prompt (a reaction, a button, a typed token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEvent {
    /// The prompt message the selector was applied to.
    pub message_id: MessageId,
    pub requester_id: String,
    /// Raw selector in word or emoji form.
    pub selector: String,
}

impl SelectionEvent {
    pub fn new(
        message_id: impl Into<MessageId>,
        requester_id: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            requester_id: requester_id.into(),
            selector: selector.into(),
        }
    }
}

/// Messages produced while handling a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Text of every message sent, in order.
    pub responses: Vec<String>,
    /// Ids of messages that now await a selection.
    pub prompts: Vec<MessageId>,
}

impl Outcome {
    /// The last response, if any.
    pub fn last_response(&self) -> Option<&str> {
        self.responses.last().map(String::as_str)
    }
}

/// Result of a selection event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// A candidate or modifier was chosen and its continuation ran.
    Resolved(Outcome),
    /// The prompt moved to another page.
    PageChanged { page: usize },
    /// The requester cancelled the prompt.
    Cancelled,
    /// Not a pending prompt, wrong requester, or selector not offered.
    Ignored,
}
