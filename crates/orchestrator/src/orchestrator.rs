//! Main orchestrator that coordinates command handling.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use holocron_core::{Squad, Tip};
use locations::{Children, LocationDescriptor, Mode, Resolution, SquadDirectory};
use tip_storage::{OrphanPolicy, Persistence, StorageError, TipField};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::capture::{Capture, CaptureKind, CaptureTable};
use crate::command::{CommandRequest, Operation};
use crate::context::{Outcome, RequestContext, SelectionEvent, SelectionOutcome};
use crate::error::{HolocronError, OrchestratorError};
use crate::formatting::{key_list, squad_list, stats_report, tip_listing};
use crate::help::help_text;
use crate::holocron::{extract_activity, Holocron, ReadOptions};
use crate::pending::{Candidate, PendingInteraction, PendingTable, PromptKind};
use crate::permissions::Permissions;
use crate::selector::Selector;
use crate::sender::{MessageId, Target, Transport};
use crate::settings::{ResponseMode, Settings};

const CANCEL_HINT: &str = "If you wish to cancel, respond with `cancel`.";

/// Messages sent while handling one event.
struct Reply<'a> {
    transport: &'a dyn Transport,
    target: Target,
    outcome: Outcome,
}

impl<'a> Reply<'a> {
    fn new(transport: &'a dyn Transport, target: Target) -> Self {
        Self {
            transport,
            target,
            outcome: Outcome::default(),
        }
    }

    async fn send(&mut self, text: impl Into<String>) -> Result<MessageId, OrchestratorError> {
        self.send_with(text, None).await
    }

    async fn send_with(
        &mut self,
        text: impl Into<String>,
        attachment: Option<&Path>,
    ) -> Result<MessageId, OrchestratorError> {
        let text = text.into();
        let id = self.transport.send(&self.target, &text, attachment).await?;
        self.outcome.responses.push(text);
        Ok(id)
    }

    /// Send to the requester directly, regardless of the response mode.
    async fn direct(&mut self, user_id: &str, text: impl Into<String>) -> Result<MessageId, OrchestratorError> {
        let text = text.into();
        let target = Target::Direct(user_id.to_string());
        let id = self.transport.send(&target, &text, None).await?;
        self.outcome.responses.push(text);
        Ok(id)
    }
}

/// Coordinates commands, selections and captured messages across every mode.
///
/// The orchestrator:
/// - Parses command lines and resolves addresses per mode
/// - Runs the read, add, edit, delete and squad workflows
/// - Keeps the tables of prompts awaiting a selection and of free-text captures
/// - Writes every change through to persistence
pub struct Orchestrator<T: Transport, P: Permissions> {
    settings: Settings,
    /// Message transport (chat service, console, tests).
    transport: T,
    /// Role and member lookups.
    permissions: P,
    /// Snapshot storage for the tip stores.
    persistence: Arc<dyn Persistence>,
    /// One lock per mode; a mutation and its write-through happen under it.
    holocrons: HashMap<Mode, Mutex<Holocron>>,
    /// Prompts awaiting a selection, keyed by message id.
    pending: Mutex<PendingTable>,
    /// Free-text continuations, keyed by requester and channel.
    captures: Mutex<CaptureTable>,
}

impl<T: Transport, P: Permissions> Orchestrator<T, P> {
    /// Create an orchestrator over already loaded holocrons.
    pub fn new(
        settings: Settings,
        transport: T,
        permissions: P,
        persistence: Arc<dyn Persistence>,
        holocrons: Vec<Holocron>,
    ) -> Self {
        Self {
            settings,
            transport,
            permissions,
            persistence,
            holocrons: holocrons
                .into_iter()
                .map(|holocron| (holocron.mode(), Mutex::new(holocron)))
                .collect(),
            pending: Mutex::new(PendingTable::new()),
            captures: Mutex::new(CaptureTable::new()),
        }
    }

    /// Load every mode from the settings' data directory and `persistence`.
    pub async fn load(
        settings: Settings,
        transport: T,
        permissions: P,
        persistence: Arc<dyn Persistence>,
    ) -> Result<Self, OrchestratorError> {
        let mut holocrons = Vec::new();
        for mode in Mode::ALL {
            holocrons.push(Holocron::load(&settings.data_dir, mode, persistence.as_ref()).await?);
        }
        info!(data_dir = ?settings.data_dir, "Loaded {} modes", holocrons.len());
        Ok(Self::new(settings, transport, permissions, persistence, holocrons))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn capture_count(&self) -> usize {
        self.captures.lock().await.len()
    }

    fn holocron(&self, mode: Mode) -> Result<&Mutex<Holocron>, OrchestratorError> {
        self.holocrons
            .get(&mode)
            .ok_or(OrchestratorError::ModeNotLoaded(mode))
    }

    fn target_for(&self, context: &RequestContext) -> Target {
        match self.settings.response_mode {
            ResponseMode::Channel => Target::Channel(context.channel_id.clone()),
            ResponseMode::Direct => Target::Direct(context.requester_id.clone()),
        }
    }

    /// Handle the arguments of a mode command, e.g. `s3b1 add "use Thrawn"`.
    pub async fn handle_command(
        &self,
        context: &RequestContext,
        mode: Mode,
        raw_args: &str,
    ) -> Result<Outcome, OrchestratorError> {
        let request = CommandRequest::parse_line(raw_args);
        debug!(
            mode = %mode,
            requester = %context.requester_id,
            operation = %request.operation,
            address = ?request.address,
            "Handling command"
        );

        let mut reply = Reply::new(&self.transport, self.target_for(context));
        let result = self.dispatch(context, mode, request, &mut reply).await;
        self.finish(result, reply).await
    }

    /// Handle a plain message: a command, or the answer to a capture.
    ///
    /// Returns `None` for messages that are neither.
    pub async fn handle_message(
        &self,
        context: &RequestContext,
        text: &str,
    ) -> Result<Option<Outcome>, OrchestratorError> {
        if let Some((mode, args)) = self.parse_command(text) {
            if self
                .captures
                .lock()
                .await
                .take(&context.requester_id, &context.channel_id)
                .is_some()
            {
                debug!(requester = %context.requester_id, "Command replaced a pending capture");
            }
            return self.handle_command(context, mode, args).await.map(Some);
        }

        let capture = self
            .captures
            .lock()
            .await
            .take(&context.requester_id, &context.channel_id);
        match capture {
            Some(capture) => {
                let mut reply = Reply::new(&self.transport, capture.target.clone());
                let result = self.apply_capture(capture, text.trim(), &mut reply).await;
                self.finish(result, reply).await.map(Some)
            }
            None => Ok(None),
        }
    }

    fn parse_command<'t>(&self, text: &'t str) -> Option<(Mode, &'t str)> {
        let command = text.trim().strip_prefix(self.settings.prefix.as_str())?;
        let (name, args) = command
            .split_once(char::is_whitespace)
            .unwrap_or((command, ""));
        Mode::from_command(name).map(|mode| (mode, args))
    }

    /// Handle a selector applied to a prompt.
    pub async fn handle_selection(
        &self,
        event: &SelectionEvent,
    ) -> Result<SelectionOutcome, OrchestratorError> {
        let Some(selector) = Selector::parse(&event.selector) else {
            return Ok(SelectionOutcome::Ignored);
        };

        let pending = {
            let mut table = self.pending.lock().await;
            let Some(pending) = table.get_mut(&event.message_id) else {
                return Ok(SelectionOutcome::Ignored);
            };
            if !pending.accepts(&event.requester_id, selector) {
                debug!(message_id = %event.message_id, %selector, "Ignoring selection");
                return Ok(SelectionOutcome::Ignored);
            }

            match (selector, pending.kind) {
                (Selector::Next | Selector::Previous, _) => {
                    pending.turn_page(selector);
                    let page = pending.page;
                    let text = pending.render();
                    let selectors = pending.allowed_selectors.clone();
                    drop(table);

                    self.transport.edit(&event.message_id, &text).await?;
                    self.transport
                        .register_selectors(&event.message_id, &selectors)
                        .await?;
                    return Ok(SelectionOutcome::PageChanged { page });
                }
                (_, PromptKind::Modifier) => pending.clone(),
                _ => match table.remove(&event.message_id) {
                    Some(pending) => pending,
                    None => return Ok(SelectionOutcome::Ignored),
                },
            }
        };

        let mut reply = Reply::new(&self.transport, pending.target.clone());
        let result = match selector {
            Selector::Cancel => {
                info!(message_id = %event.message_id, "Selection cancelled");
                reply.send("Selection cancelled.").await?;
                return Ok(SelectionOutcome::Cancelled);
            }
            Selector::Choice(choice) => match pending.choose(choice).cloned() {
                Some(candidate) => self.apply_choice(&pending, candidate, &mut reply).await,
                None => return Ok(SelectionOutcome::Ignored),
            },
            Selector::Add | Selector::Edit | Selector::Delete => {
                self.apply_modifier(&pending, selector, &mut reply).await
            }
            Selector::Next | Selector::Previous => return Ok(SelectionOutcome::Ignored),
        };
        self.finish(result, reply).await.map(SelectionOutcome::Resolved)
    }

    /// Drop prompts older than a day. Returns how many went.
    ///
    /// Free-text captures are left alone.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let prompts = self.pending.lock().await.sweep_expired(now);
        if prompts > 0 {
            info!(prompts, "Swept expired prompts");
        }
        prompts
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `sweep_interval`.
    pub fn spawn_expiry_sweep(self: Arc<Self>) -> JoinHandle<()>
    where
        T: 'static,
        P: 'static,
    {
        let period = self.settings.sweep_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                self.sweep_expired(Utc::now()).await;
            }
        })
    }

    /// Render user-facing errors into the reply; pass infrastructure errors up.
    async fn finish(
        &self,
        result: Result<(), OrchestratorError>,
        mut reply: Reply<'_>,
    ) -> Result<Outcome, OrchestratorError> {
        match result {
            Ok(()) => {}
            Err(OrchestratorError::Holocron(e)) => {
                debug!(error = %e, "Command rejected");
                reply.send(e.to_string()).await?;
            }
            Err(OrchestratorError::Storage(e)) if e.is_not_found() => {
                warn!(error = %e, "Stale tip or location");
                reply.send("That tip or location no longer exists.").await?;
            }
            Err(e) => return Err(e),
        }
        Ok(reply.outcome)
    }

    async fn require_elevated(&self, context: &RequestContext) -> Result<(), HolocronError> {
        if self
            .permissions
            .has_elevated_role(&context.requester_id, &context.scope_id)
            .await
        {
            Ok(())
        } else {
            Err(HolocronError::NotAuthorized)
        }
    }

    fn address(request: &CommandRequest, holocron: &Holocron) -> Result<String, HolocronError> {
        request
            .address
            .clone()
            .ok_or_else(|| HolocronError::MissingAddress {
                hint: holocron.resolver().address_hint().to_string(),
            })
    }

    async fn dispatch(
        &self,
        context: &RequestContext,
        mode: Mode,
        request: CommandRequest,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        if let Some(error) = request.error.clone() {
            return Err(error.into());
        }
        if request.operation.requires_elevated() {
            self.require_elevated(context).await?;
        }

        match request.operation {
            Operation::Help => {
                let text = help_text(
                    mode,
                    &self.settings.prefix,
                    request.help_topic,
                    &request.trailing_args,
                );
                reply.send(text).await?;
            }
            Operation::Stats => {
                let holocron = self.holocron(mode)?.lock().await;
                let title = holocron.resolver().catalog().name.clone();
                reply.send(stats_report(&title, &holocron.store.stats())).await?;
            }
            Operation::Clear => {
                self.capture(mode, context, reply, CaptureKind::ConfirmClear).await;
                reply
                    .send(format!(
                        "Are you sure you want to clear all {} tips from storage? \
                         Type `confirm` to clear them, or `cancel` to keep them.",
                        mode
                    ))
                    .await?;
            }
            Operation::Populate => {
                let mut holocron = self.holocron(mode)?.lock().await;
                let added = holocron.populate()?;
                info!(mode = %mode, added, "Populated sample tips");
                self.persist(&holocron, reply).await?;
                reply.send(format!("Added {} sample tips.", added)).await?;
            }
            Operation::Map => self.show_map(mode, &request, reply).await?,
            Operation::List => self.list(context, mode, request, reply).await?,
            Operation::AddGroup | Operation::EditGroup | Operation::DeleteGroup => {
                self.squad_command(context, mode, request, reply).await?
            }
            Operation::Read
            | Operation::Add
            | Operation::Edit
            | Operation::Delete
            | Operation::ChangeAuthor => {
                let mut holocron = self.holocron(mode)?.lock().await;
                let address = Self::address(&request, &holocron)?;
                let location = holocron.resolve(&address)?;
                self.run(context, &mut holocron, request, location, reply).await?;
            }
        }
        Ok(())
    }

    /// Run a location workflow with the mode lock held.
    async fn run(
        &self,
        context: &RequestContext,
        holocron: &mut Holocron,
        request: CommandRequest,
        location: LocationDescriptor,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        match request.operation {
            Operation::Read | Operation::List => {
                if location.is_leaf() {
                    let filters: Vec<String> = request
                        .read_filters
                        .iter()
                        .chain(&request.trailing_args)
                        .cloned()
                        .collect();
                    let options = holocron.read_options(&filters)?;
                    self.show_tips(context, holocron, &location, &options, None, reply)
                        .await
                } else {
                    self.show_group(context, holocron, request, location, reply)
                        .await
                }
            }
            operation if operation.is_modification() && !location.has_tips() => {
                Err(HolocronError::NotATipLocation {
                    location: holocron.resolver().location_name(&location),
                    hint: holocron.resolver().address_hint().to_string(),
                }
                .into())
            }
            Operation::Add => self.start_add(context, holocron, request, location, reply).await,
            Operation::Edit | Operation::Delete | Operation::ChangeAuthor => {
                self.choose_tip(context, holocron, request, location, reply)
                    .await
            }
            other => Err(HolocronError::UnknownOperation(other.keyword().to_string()).into()),
        }
    }

    /// Send tips at a location and attach the add/edit/delete prompt.
    async fn show_tips(
        &self,
        context: &RequestContext,
        holocron: &Holocron,
        location: &LocationDescriptor,
        options: &ReadOptions,
        preface: Option<&str>,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let text = self.render_tips(holocron, location, options)?;
        let text = match preface {
            Some(preface) => format!("{}\n{}", preface, text),
            None => text,
        };

        let message_id = reply.send(text).await?;
        let pending = PendingInteraction::modifier(
            context.clone(),
            holocron.mode(),
            reply.target.clone(),
            location.clone(),
            Utc::now(),
        );
        self.register(message_id, pending, reply).await
    }

    fn render_tips(
        &self,
        holocron: &Holocron,
        location: &LocationDescriptor,
        options: &ReadOptions,
    ) -> Result<String, OrchestratorError> {
        let tips = holocron.store.tips(location)?;
        let filtered: Vec<&Tip> = tips
            .iter()
            .filter(|tip| match &options.activity {
                Some(activity) => tip.activity.as_deref() == Some(activity.as_str()),
                None => true,
            })
            .collect();
        let total = filtered.len();
        let mut shown = self.settings.tip_sort.sorted(filtered);
        shown.truncate(options.depth);

        let resolver = holocron.resolver();
        let name = resolver.location_name(location);
        let detail = resolver.detail(location);
        Ok(tip_listing(
            &name,
            detail.as_deref(),
            &shown,
            total,
            self.settings.tip_sort,
        ))
    }

    /// Prompt for a child of a group location.
    async fn show_group(
        &self,
        context: &RequestContext,
        holocron: &Holocron,
        request: CommandRequest,
        location: LocationDescriptor,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let resolver = holocron.resolver();
        let name = resolver.location_name(&location);
        let suffixes = match resolver.children(&location) {
            Children::Fixed(suffixes) => suffixes,
            Children::Materialized => holocron.store.materialized(&location)?,
            Children::None => Vec::new(),
        };

        let with_counts = location.resolution() != Resolution::MidLevel;
        let candidates: Vec<Candidate> = suffixes
            .into_iter()
            .filter_map(|suffix| {
                let child = resolver
                    .resolve_child(&location, &suffix, &holocron.store)
                    .ok()?;
                let title = resolver.tip_title(&child);
                let label = if with_counts {
                    let count = holocron.store.tip_count(&child).unwrap_or(0);
                    format!("{} (#tips: {})", title, count)
                } else {
                    title
                };
                Some(Candidate::Group { suffix, label })
            })
            .collect();

        let mut header = Vec::new();
        if location.has_tips() {
            let options = holocron.read_options(&[])?;
            header.push(self.render_tips(holocron, &location, &options)?);
            header.push(String::new());
        }
        if candidates.is_empty() {
            header.push(format!(
                "There are no {}s with tips for {} yet.",
                location.child_kind(),
                name
            ));
            reply.send(header.join("\n")).await?;
            return Ok(());
        }
        header.push(format!("View tips for which {} of {}?", location.child_kind(), name));

        let pending = PendingInteraction::selection(
            context.clone(),
            holocron.mode(),
            reply.target.clone(),
            header.join("\n"),
            candidates,
            request,
            location,
            Utc::now(),
        );
        let message_id = reply.send(pending.render()).await?;
        self.register(message_id, pending, reply).await
    }

    async fn start_add(
        &self,
        context: &RequestContext,
        holocron: &mut Holocron,
        request: CommandRequest,
        location: LocationDescriptor,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let mode = holocron.mode();
        let name = holocron.resolver().location_name(&location);

        match (mode, request.new_content) {
            (Mode::Counter, Some(title)) => {
                self.capture(mode, context, reply, CaptureKind::CounterContent { location, title })
                    .await;
                reply.send(counter_content_prompt(&name)).await?;
            }
            (Mode::Counter, None) => {
                self.capture(mode, context, reply, CaptureKind::CounterTitle { location })
                    .await;
                reply
                    .send(format!(
                        "Enter the title of the counter for {}, e.g. the squad that beats it.\n{}",
                        name, CANCEL_HINT
                    ))
                    .await?;
            }
            (_, Some(content)) => {
                self.add_tip(context, holocron, &location, content, None, reply)
                    .await?;
            }
            (_, None) => {
                self.capture(mode, context, reply, CaptureKind::AddTip { location })
                    .await;
                reply
                    .send(format!(
                        "Your next message in this channel will be added as a tip for {}.\n{}",
                        name, CANCEL_HINT
                    ))
                    .await?;
            }
        }
        Ok(())
    }

    async fn add_tip(
        &self,
        context: &RequestContext,
        holocron: &mut Holocron,
        location: &LocationDescriptor,
        content: String,
        title: Option<String>,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let author_id = Some(context.requester_id.clone());
        let tip = match title {
            Some(title) => {
                let (content, activity) = extract_activity(&content);
                Tip::counter(title, content, activity.as_deref(), &context.requester_name, author_id)
            }
            None => Tip::new(content, &context.requester_name, author_id),
        };
        info!(
            mode = %holocron.mode(),
            location = %location.canonical(),
            tip = %tip.id,
            "Adding tip"
        );
        holocron.store.append(location, tip)?;
        self.persist(holocron, reply).await?;

        let options = holocron.read_options(&[])?;
        self.show_tips(context, holocron, location, &options, Some("Your tip has been added."), reply)
            .await
    }

    /// Prompt for one of the tips the requester may modify.
    async fn choose_tip(
        &self,
        context: &RequestContext,
        holocron: &Holocron,
        request: CommandRequest,
        location: LocationDescriptor,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let operation = request.operation;
        if operation == Operation::ChangeAuthor && request.new_author.is_none() {
            return Err(HolocronError::MissingArgument("the new author's name").into());
        }

        let elevated = self
            .permissions
            .has_elevated_role(&context.requester_id, &context.scope_id)
            .await;
        let name = holocron.resolver().location_name(&location);
        let modifiable: Vec<&Tip> = holocron
            .store
            .tips(&location)?
            .iter()
            .filter(|tip| elevated || tip.is_authored_by(&context.requester_id))
            .collect();
        if modifiable.is_empty() {
            return Err(HolocronError::NothingToModify {
                action: operation.verb().to_string(),
                location: name,
            }
            .into());
        }

        let now = Utc::now();
        let candidates = self
            .settings
            .tip_sort
            .sorted(modifiable)
            .into_iter()
            .map(|tip| Candidate::Tip {
                id: tip.id,
                label: tip.selection_message(now),
            })
            .collect();

        let pending = PendingInteraction::selection(
            context.clone(),
            holocron.mode(),
            reply.target.clone(),
            format!("Which tip for {} would you like to {}?", name, operation.verb()),
            candidates,
            request,
            location,
            now,
        );
        let message_id = reply.send(pending.render()).await?;
        self.register(message_id, pending, reply).await
    }

    /// Continue a numbered selection.
    async fn apply_choice(
        &self,
        pending: &PendingInteraction,
        candidate: Candidate,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let mode = pending.mode;
        let context = &pending.context;
        let location = &pending.location;
        let mut holocron = self.holocron(mode)?.lock().await;

        match (candidate, pending.request.operation) {
            (Candidate::Group { suffix, .. }, _) => {
                let child = holocron
                    .resolver()
                    .resolve_child(location, &suffix, &holocron.store)?;
                let request = CommandRequest {
                    operation: Operation::Read,
                    address: Some(child.canonical()),
                    read_filters: pending.request.read_filters.clone(),
                    ..CommandRequest::default()
                };
                self.run(context, &mut holocron, request, child, reply).await
            }
            (Candidate::Tip { id, .. }, Operation::Edit) => {
                let current = holocron.store.get(location, id)?.tip_message(false);
                reply
                    .direct(
                        &context.requester_id,
                        format!("Here is the tip you are editing:\n{}", current),
                    )
                    .await?;
                self.capture(
                    mode,
                    context,
                    reply,
                    CaptureKind::EditTip {
                        location: location.clone(),
                        tip_id: id,
                    },
                )
                .await;
                reply
                    .send(format!(
                        "A message containing the tip has been sent to you. \
                         Your next message in this channel will replace it.\n{}",
                        CANCEL_HINT
                    ))
                    .await?;
                Ok(())
            }
            (Candidate::Tip { id, .. }, Operation::Delete) => {
                let preview = holocron.store.get(location, id)?.delete_message();
                self.capture(
                    mode,
                    context,
                    reply,
                    CaptureKind::ConfirmDelete {
                        location: location.clone(),
                        tip_id: id,
                    },
                )
                .await;
                reply
                    .send(format!(
                        "Are you sure you want to delete the tip:\n`{}`\n\n\
                         Type `confirm` to permanently delete it, or `cancel` to keep it.",
                        preview
                    ))
                    .await?;
                Ok(())
            }
            (Candidate::Tip { id, .. }, Operation::ChangeAuthor) => {
                let name = pending
                    .request
                    .new_author
                    .clone()
                    .ok_or(HolocronError::MissingArgument("the new author's name"))?;
                let member_id = self.permissions.find_member(&context.scope_id, &name).await;
                if member_id.is_none() {
                    warn!(author = %name, "New author is not a known member");
                }
                holocron.store.replace_field(
                    location,
                    id,
                    TipField::Author {
                        name,
                        id: member_id,
                    },
                )?;
                self.persist(&holocron, reply).await?;

                let options = holocron.read_options(&[])?;
                self.show_tips(context, &holocron, location, &options, Some("Author change successful."), reply)
                    .await
            }
            (Candidate::Tip { .. }, other) => {
                Err(HolocronError::UnknownOperation(other.keyword().to_string()).into())
            }
        }
    }

    /// Start add, edit or delete from the prompt attached to a tip read.
    async fn apply_modifier(
        &self,
        pending: &PendingInteraction,
        selector: Selector,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let operation = match selector {
            Selector::Add => Operation::Add,
            Selector::Edit => Operation::Edit,
            Selector::Delete => Operation::Delete,
            other => return Err(HolocronError::UnknownOperation(other.token()).into()),
        };
        let request = CommandRequest::for_location(operation, &pending.location.canonical());
        let mut holocron = self.holocron(pending.mode)?.lock().await;
        self.run(
            &pending.context,
            &mut holocron,
            request,
            pending.location.clone(),
            reply,
        )
        .await
    }

    /// Feed a captured message to its continuation.
    async fn apply_capture(
        &self,
        capture: Capture,
        text: &str,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let Capture {
            mode,
            context,
            kind,
            ..
        } = capture;
        if text.eq_ignore_ascii_case("cancel") {
            reply.send(kind.cancel_message()).await?;
            return Ok(());
        }
        let confirmed = text.eq_ignore_ascii_case("confirm");

        let mut holocron = self.holocron(mode)?.lock().await;
        match kind {
            CaptureKind::AddTip { location } => {
                self.add_tip(&context, &mut holocron, &location, text.to_string(), None, reply)
                    .await
            }
            CaptureKind::CounterTitle { location } => {
                let name = holocron.resolver().location_name(&location);
                let title = text.to_string();
                self.capture(mode, &context, reply, CaptureKind::CounterContent { location, title })
                    .await;
                reply.send(counter_content_prompt(&name)).await?;
                Ok(())
            }
            CaptureKind::CounterContent { location, title } => {
                self.add_tip(&context, &mut holocron, &location, text.to_string(), Some(title), reply)
                    .await
            }
            CaptureKind::EditTip { location, tip_id } => {
                holocron
                    .store
                    .replace_field(&location, tip_id, TipField::Content(text.to_string()))?;
                info!(mode = %mode, tip = %tip_id, "Edited tip");
                self.persist(&holocron, reply).await?;
                let options = holocron.read_options(&[])?;
                self.show_tips(&context, &holocron, &location, &options, Some("Edit success."), reply)
                    .await
            }
            CaptureKind::ConfirmDelete { .. } if !confirmed => {
                reply.send("Deletion canceled. Tip not deleted.").await?;
                Ok(())
            }
            CaptureKind::ConfirmDelete { location, tip_id } => {
                let removed = holocron.store.remove(&location, tip_id)?;
                info!(mode = %mode, tip = %removed.id, "Deleted tip");
                self.persist(&holocron, reply).await?;
                let options = holocron.read_options(&[])?;
                self.show_tips(&context, &holocron, &location, &options, Some("Tip deleted."), reply)
                    .await
            }
            CaptureKind::ConfirmClear if !confirmed => {
                reply.send(CaptureKind::ConfirmClear.cancel_message()).await?;
                Ok(())
            }
            CaptureKind::ConfirmClear => {
                holocron.clear();
                warn!(mode = %mode, requester = %context.requester_id, "Cleared tip storage");
                self.persist(&holocron, reply).await?;
                reply.send("Tip storage has been cleared.").await?;
                Ok(())
            }
            CaptureKind::SquadName { location, replace } => {
                self.save_squad(&context, &mut holocron, &location, text, replace, reply)
                    .await
            }
        }
    }

    async fn show_map(
        &self,
        mode: Mode,
        request: &CommandRequest,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        if !mode.has_maps() {
            return Err(HolocronError::UnsupportedOperation {
                operation: Operation::Map.keyword().to_string(),
                mode,
            }
            .into());
        }

        let holocron = self.holocron(mode)?.lock().await;
        let address = Self::address(request, &holocron)?;
        let location = holocron.resolve(&address)?;
        let name = holocron.resolver().location_name(&location);

        let Some(map) = holocron.resolver().map_name(&location) else {
            reply.send(format!("There is no map for {}.", name)).await?;
            return Ok(());
        };
        let path = self
            .settings
            .data_dir
            .join(mode.as_str())
            .join("images")
            .join(format!("{}.png", map));
        if !path.exists() {
            warn!(path = ?path, "Map image missing");
            reply
                .send(format!("The map for {} is not available.", name))
                .await?;
            return Ok(());
        }
        reply
            .send_with(format!("Map of {}", name), Some(path.as_path()))
            .await?;
        Ok(())
    }

    async fn list(
        &self,
        context: &RequestContext,
        mode: Mode,
        request: CommandRequest,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let mut holocron = self.holocron(mode)?.lock().await;
        match mode {
            Mode::Counter => {
                let text = holocron.store.squads().map(squad_list).unwrap_or_default();
                reply.send(text).await?;
                Ok(())
            }
            Mode::War => {
                reply.send(key_list(&holocron.store.keys())).await?;
                Ok(())
            }
            Mode::Conquest | Mode::Rise => {
                let address = Self::address(&request, &holocron)?;
                let location = holocron.resolve(&address)?;
                self.run(context, &mut holocron, request, location, reply)
                    .await
            }
        }
    }

    async fn squad_command(
        &self,
        context: &RequestContext,
        mode: Mode,
        request: CommandRequest,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        if !mode.uses_squads() {
            return Err(HolocronError::UnsupportedOperation {
                operation: request.operation.keyword().to_string(),
                mode,
            }
            .into());
        }

        let mut holocron = self.holocron(mode)?.lock().await;
        let address = Self::address(&request, &holocron)?;
        let name = (!request.trailing_args.is_empty()).then(|| request.trailing_args.join(" "));

        match request.operation {
            Operation::AddGroup | Operation::EditGroup => {
                let replace = request.operation == Operation::EditGroup;
                let location = if replace {
                    holocron.resolve(&address)?
                } else {
                    if holocron.store.resolve_lead(&address).is_some() {
                        return Err(HolocronError::SquadExists(address).into());
                    }
                    holocron.resolver().resolve_unregistered_squad(&address)?
                };

                match name {
                    Some(name) => {
                        self.save_squad(context, &mut holocron, &location, &name, replace, reply)
                            .await
                    }
                    None => {
                        let lead_id = location.canonical();
                        self.capture(mode, context, reply, CaptureKind::SquadName { location, replace })
                            .await;
                        reply
                            .send(format!(
                                "Enter the squad lead's name for `{}`, e.g. `Jedi Master Kenobi`.\n{}",
                                lead_id, CANCEL_HINT
                            ))
                            .await?;
                        Ok(())
                    }
                }
            }
            Operation::DeleteGroup => {
                let lead_id = holocron.resolve(&address)?.canonical();
                let policy = match request.trailing_args.first() {
                    Some(other) => OrphanPolicy::Reassign(holocron.resolve(other)?.canonical()),
                    None => self.settings.orphan_policy.clone(),
                };

                let squads = holocron.store.squads_mut()?;
                let tip_count = squads.resolve(&lead_id).map_or(0, |squad| squad.tips.len());
                let squad = squads.remove_squad(&lead_id, &policy)?;
                info!(lead_id = %lead_id, tips = tip_count, policy = ?policy, "Removed squad");
                self.persist(&holocron, reply).await?;

                let fate = match &policy {
                    OrphanPolicy::Delete => "were deleted".to_string(),
                    OrphanPolicy::Retain => "were kept as orphans".to_string(),
                    OrphanPolicy::Reassign(target) => format!("moved to `{}`", target),
                };
                reply
                    .send(format!(
                        "Squad {} removed. Its {} tips {}.",
                        squad.header(),
                        tip_count,
                        fate
                    ))
                    .await?;
                Ok(())
            }
            other => Err(HolocronError::UnknownOperation(other.keyword().to_string()).into()),
        }
    }

    async fn save_squad(
        &self,
        context: &RequestContext,
        holocron: &mut Holocron,
        location: &LocationDescriptor,
        name: &str,
        replace: bool,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        let lead_id = location.canonical();
        let squad = Squad::new(
            &lead_id,
            name,
            &context.requester_name,
            Some(context.requester_id.clone()),
        );
        let header = squad.header();

        let squads = holocron.store.squads_mut()?;
        if replace {
            squads.replace_squad(squad)?;
        } else {
            match squads.add_squad(squad) {
                Ok(()) => {}
                Err(StorageError::AlreadyExists { .. }) => {
                    return Err(HolocronError::SquadExists(lead_id).into())
                }
                Err(e) => return Err(e.into()),
            }
        }
        info!(lead_id = %lead_id, replace, "Saved squad");
        self.persist(holocron, reply).await?;

        let verb = if replace { "updated" } else { "added" };
        reply.send(format!("Squad {} {}.", header, verb)).await?;
        Ok(())
    }

    async fn capture(
        &self,
        mode: Mode,
        context: &RequestContext,
        reply: &Reply<'_>,
        kind: CaptureKind,
    ) {
        let capture = Capture::new(mode, context.clone(), reply.target.clone(), kind, Utc::now());
        self.captures.lock().await.insert(capture);
    }

    async fn register(
        &self,
        message_id: MessageId,
        pending: PendingInteraction,
        reply: &mut Reply<'_>,
    ) -> Result<(), OrchestratorError> {
        self.transport
            .register_selectors(&message_id, &pending.allowed_selectors)
            .await?;
        self.pending.lock().await.insert(message_id.clone(), pending);
        reply.outcome.prompts.push(message_id);
        Ok(())
    }

    /// Write the mode's store through. A failure is reported, not rolled back.
    async fn persist(&self, holocron: &Holocron, reply: &mut Reply<'_>) -> Result<(), OrchestratorError> {
        if let Err(e) = self.persistence.save(holocron.mode(), &holocron.store).await {
            error!(mode = %holocron.mode(), error = %e, "Failed to save tip store");
            reply
                .send("Your change was applied but could not be saved. It may be lost on restart.")
                .await?;
        }
        Ok(())
    }
}

fn counter_content_prompt(name: &str) -> String {
    format!(
        "Title added. Now enter the counter description for {}. \
         Include `tag=GAC` (or `GAC3`, `TW`, `GG`, `GG3`) to tag an activity.\n{}",
        name, CANCEL_HINT
    )
}
