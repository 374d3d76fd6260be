//! The tip record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::elapsed::describe_elapsed;

/// Stable identifier of a tip.
///
/// Pending selections and free-text captures refer to tips by id so they
/// never hold a borrow into the store across a suspension.
pub type TipId = Uuid;

/// Number of characters shown when a tip is previewed in a prompt.
const PREVIEW_CHARS: usize = 50;

/// A short community-authored annotation attached to exactly one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    /// Stable identifier.
    pub id: TipId,
    /// Free text of the tip.
    pub content: String,
    /// Display name of the author.
    pub author: String,
    /// Opaque transport id of the author, if known.
    #[serde(default)]
    pub author_id: Option<String>,
    /// Community rating.
    #[serde(default)]
    pub rating: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the content changed after creation.
    #[serde(default)]
    pub edited: bool,
    /// Counter title (e.g. "JMK/CAT vs SEE"), counter tips only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Activity tag (e.g. "GAC", "TW"), counter tips only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

impl Tip {
    /// Create a new tip authored now.
    pub fn new(
        content: impl Into<String>,
        author: impl Into<String>,
        author_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            author: author.into(),
            author_id,
            rating: 0,
            created_at: Utc::now(),
            edited: false,
            title: None,
            activity: None,
        }
    }

    /// Create a counter tip with a title and an optional activity tag.
    pub fn counter(
        title: impl Into<String>,
        content: impl Into<String>,
        activity: Option<&str>,
        author: impl Into<String>,
        author_id: Option<String>,
    ) -> Self {
        let mut tip = Self::new(content, author, author_id);
        tip.title = Some(title.into());
        tip.activity = activity.map(|a| a.to_uppercase());
        tip
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = rating;
        self
    }

    /// Override the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Check whether the given user wrote this tip.
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id.as_deref() == Some(user_id)
    }

    /// Replace the content and mark the tip as edited.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.edited = true;
    }

    /// Reassign the tip to another author.
    pub fn set_author(&mut self, author: impl Into<String>, author_id: Option<String>) {
        self.author = author.into();
        self.author_id = author_id;
    }

    /// Render the tip for a listing.
    pub fn tip_message(&self, show_rating: bool) -> String {
        let edited = if self.edited { " *(edited)*" } else { "" };
        let rating = if show_rating {
            format!(" *({:+})*", self.rating)
        } else {
            String::new()
        };

        match &self.title {
            Some(title) => {
                let activity = self
                    .activity
                    .as_ref()
                    .map(|a| format!("\t[{}] ", a))
                    .unwrap_or_default();
                format!(
                    "**{}**{}\n\t{}{}\t*(author: {}*{})",
                    title, activity, self.content, edited, self.author, rating
                )
            }
            None => format!(
                "**Tip from {}**{}:\n\t{}{}",
                self.author, rating, self.content, edited
            ),
        }
    }

    /// Render a one-line preview used in selection prompts.
    pub fn selection_message(&self, now: DateTime<Utc>) -> String {
        format!(
            "**{}**: {} ({})",
            self.author,
            self.preview(),
            describe_elapsed(self.created_at, now)
        )
    }

    /// Render the line quoted back when asking for a delete confirmation.
    pub fn delete_message(&self) -> String {
        format!("{}: {}", self.author, self.preview())
    }

    fn preview(&self) -> String {
        let text = match &self.title {
            Some(title) => format!("{} - {}", title, self.content),
            None => self.content.clone(),
        };
        text.chars().take(PREVIEW_CHARS).collect()
    }
}
