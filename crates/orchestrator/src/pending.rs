//! Prompts awaiting a selection.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use holocron_core::TipId;
use locations::{LocationDescriptor, Mode};

use crate::command::{CommandRequest, Operation};
use crate::context::RequestContext;
use crate::selector::Selector;
use crate::sender::{MessageId, Target};

/// Candidates shown per page.
pub const PAGE_SIZE: usize = 5;

/// Age at which a pending prompt is swept.
pub fn retention() -> Duration {
    Duration::days(1)
}

/// One selectable entry of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A tip, by id.
    Tip { id: TipId, label: String },
    /// A child of a group, by the suffix appended to the group address.
    Group { suffix: String, label: String },
}

impl Candidate {
    pub fn label(&self) -> &str {
        match self {
            Self::Tip { label, .. } | Self::Group { label, .. } => label,
        }
    }
}

/// What a prompt offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Numbered candidates with paging.
    Selection,
    /// Add, edit and delete on a tip read.
    Modifier,
}

/// A prompt message waiting for its requester to choose.
#[derive(Debug, Clone)]
pub struct PendingInteraction {
    pub context: RequestContext,
    pub mode: Mode,
    /// Where continuation responses go.
    pub target: Target,
    pub kind: PromptKind,
    /// Text above the candidate list.
    pub header: String,
    pub candidates: Vec<Candidate>,
    /// The request that produced the prompt.
    pub request: CommandRequest,
    pub location: LocationDescriptor,
    /// 1-based page.
    pub page: usize,
    pub allowed_selectors: Vec<Selector>,
    pub created_at: DateTime<Utc>,
}

impl PendingInteraction {
    /// A numbered selection over `candidates`, starting on page 1.
    #[allow(clippy::too_many_arguments)]
    pub fn selection(
        context: RequestContext,
        mode: Mode,
        target: Target,
        header: impl Into<String>,
        candidates: Vec<Candidate>,
        request: CommandRequest,
        location: LocationDescriptor,
        now: DateTime<Utc>,
    ) -> Self {
        let mut pending = Self {
            context,
            mode,
            target,
            kind: PromptKind::Selection,
            header: header.into(),
            candidates,
            request,
            location,
            page: 1,
            allowed_selectors: Vec::new(),
            created_at: now,
        };
        pending.allowed_selectors = pending.page_selectors();
        pending
    }

    /// The add/edit/delete prompt attached to a tip read.
    pub fn modifier(
        context: RequestContext,
        mode: Mode,
        target: Target,
        location: LocationDescriptor,
        now: DateTime<Utc>,
    ) -> Self {
        let request = CommandRequest::for_location(Operation::Read, &location.canonical());
        Self {
            context,
            mode,
            target,
            kind: PromptKind::Modifier,
            header: String::new(),
            candidates: Vec::new(),
            request,
            location,
            page: 1,
            allowed_selectors: vec![Selector::Add, Selector::Edit, Selector::Delete],
            created_at: now,
        }
    }

    pub fn page_count(&self) -> usize {
        self.candidates.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// Candidates on the current page.
    pub fn visible(&self) -> &[Candidate] {
        let start = (self.page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.candidates.len());
        self.candidates.get(start..end).unwrap_or_default()
    }

    fn page_selectors(&self) -> Vec<Selector> {
        let mut selectors: Vec<Selector> = (1..=self.visible().len())
            .map(|n| Selector::Choice(n as u8))
            .collect();
        if self.page > 1 {
            selectors.push(Selector::Previous);
        }
        if self.page < self.page_count() {
            selectors.push(Selector::Next);
        }
        selectors.push(Selector::Cancel);
        selectors
    }

    /// Prompt text for the current page.
    pub fn render(&self) -> String {
        let mut lines = vec![self.header.clone()];
        for (i, candidate) in self.visible().iter().enumerate() {
            lines.push(format!("{} - {}", i + 1, candidate.label()));
        }
        if self.page_count() > 1 {
            lines.push(format!("Page {}/{}", self.page, self.page_count()));
        }
        lines.join("\n")
    }

    /// Move one page forward or back. Returns false when already at the edge.
    pub fn turn_page(&mut self, selector: Selector) -> bool {
        let page = match selector {
            Selector::Next if self.page < self.page_count() => self.page + 1,
            Selector::Previous if self.page > 1 => self.page - 1,
            _ => return false,
        };
        self.page = page;
        self.allowed_selectors = self.page_selectors();
        true
    }

    /// The candidate behind a 1-based choice on the visible page.
    pub fn choose(&self, choice: u8) -> Option<&Candidate> {
        let index = usize::from(choice).checked_sub(1)?;
        self.visible().get(index)
    }

    /// Whether `requester_id` may apply `selector` to this prompt.
    pub fn accepts(&self, requester_id: &str, selector: Selector) -> bool {
        self.context.requester_id == requester_id && self.allowed_selectors.contains(&selector)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= retention()
    }
}

/// Pending prompts keyed by their message id.
#[derive(Debug, Default)]
pub struct PendingTable {
    entries: HashMap<MessageId, PendingInteraction>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, message_id: MessageId, pending: PendingInteraction) {
        self.entries.insert(message_id, pending);
    }

    pub fn get(&self, message_id: &str) -> Option<&PendingInteraction> {
        self.entries.get(message_id)
    }

    pub fn get_mut(&mut self, message_id: &str) -> Option<&mut PendingInteraction> {
        self.entries.get_mut(message_id)
    }

    pub fn remove(&mut self, message_id: &str) -> Option<PendingInteraction> {
        self.entries.remove(message_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries older than the retention period. Returns how many went.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, pending| !pending.is_expired(now));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::TimeZone;
    use locations::{Catalog, LocationResolver, NoSquads};

    use super::*;

    fn location() -> LocationDescriptor {
        LocationResolver::new(Mode::War, Catalog::new("War", HashMap::new()))
            .resolve("hoth", &NoSquads)
            .unwrap()
    }

    fn context() -> RequestContext {
        RequestContext::new("u1", "Luke", "c1", "g1")
    }

    fn prompt(count: usize, now: DateTime<Utc>) -> PendingInteraction {
        let candidates = (1..=count)
            .map(|n| Candidate::Group {
                suffix: n.to_string(),
                label: format!("item {}", n),
            })
            .collect();
        PendingInteraction::selection(
            context(),
            Mode::War,
            Target::Channel("c1".to_string()),
            "Pick one",
            candidates,
            CommandRequest::default(),
            location(),
            now,
        )
    }

    #[test]
    fn test_pagination() {
        let mut pending = prompt(12, Utc::now());
        assert_eq!(pending.page_count(), 3);

        assert_eq!(pending.visible().len(), 5);
        assert_eq!(pending.visible()[0].label(), "item 1");
        assert!(pending.allowed_selectors.contains(&Selector::Next));
        assert!(!pending.allowed_selectors.contains(&Selector::Previous));
        assert!(pending.render().ends_with("Page 1/3"));

        assert!(pending.turn_page(Selector::Next));
        assert!(pending.turn_page(Selector::Next));
        assert!(!pending.turn_page(Selector::Next));
        assert_eq!(pending.page, 3);

        let labels: Vec<&str> = pending.visible().iter().map(Candidate::label).collect();
        assert_eq!(labels, vec!["item 11", "item 12"]);
        assert!(pending.allowed_selectors.contains(&Selector::Previous));
        assert!(!pending.allowed_selectors.contains(&Selector::Next));
        assert!(!pending.allowed_selectors.contains(&Selector::Choice(3)));
        assert_eq!(pending.choose(2).map(Candidate::label), Some("item 12"));
        assert_eq!(pending.choose(3), None);
        assert_eq!(pending.choose(0), None);
    }

    #[test]
    fn test_single_page_has_no_paging() {
        let pending = prompt(3, Utc::now());
        assert_eq!(pending.page_count(), 1);
        assert_eq!(
            pending.allowed_selectors,
            vec![
                Selector::Choice(1),
                Selector::Choice(2),
                Selector::Choice(3),
                Selector::Cancel
            ]
        );
        assert!(!pending.render().contains("Page"));
    }

    #[test]
    fn test_accepts_only_requester() {
        let pending = prompt(2, Utc::now());
        assert!(pending.accepts("u1", Selector::Choice(2)));
        assert!(!pending.accepts("u2", Selector::Choice(2)));
        assert!(!pending.accepts("u1", Selector::Edit));
    }

    #[test]
    fn test_sweep_expired() {
        let created = Utc.with_ymd_and_hms(2024, 5, 4, 12, 0, 0).unwrap();
        let mut table = PendingTable::new();
        table.insert("m1".to_string(), prompt(2, created));

        assert_eq!(table.sweep_expired(created + Duration::hours(12)), 0);
        assert!(table.get("m1").is_some());

        assert_eq!(table.sweep_expired(created + Duration::days(2)), 1);
        assert!(table.is_empty());
    }
}
