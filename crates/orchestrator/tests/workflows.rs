//! End-to-end workflows against the real label catalogs.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use locations::Mode;
use orchestrator::{
    Orchestrator, Outcome, RecordingTransport, RequestContext, ResponseMode, SelectionEvent,
    SelectionOutcome, Settings, StaticPermissions, Target,
};
use tip_storage::{MemoryPersistence, Persistence};

type TestOrchestrator = Orchestrator<RecordingTransport, StaticPermissions>;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn luke() -> RequestContext {
    RequestContext::new("u-luke", "Luke", "general", "guild")
}

fn leia() -> RequestContext {
    RequestContext::new("u-leia", "Leia", "general", "guild")
}

fn admin() -> RequestContext {
    RequestContext::new("u-admin", "Yoda", "general", "guild")
}

async fn setup_with(settings: Settings) -> (TestOrchestrator, Arc<MemoryPersistence>) {
    let persistence = Arc::new(MemoryPersistence::new());
    let permissions = StaticPermissions::new()
        .with_admin("u-admin")
        .with_member("Han", "u-han");
    let orchestrator = Orchestrator::load(
        settings.with_data_dir(data_dir()),
        RecordingTransport::new(),
        permissions,
        persistence.clone(),
    )
    .await
    .unwrap();
    (orchestrator, persistence)
}

async fn setup() -> (TestOrchestrator, Arc<MemoryPersistence>) {
    setup_with(Settings::default()).await
}

async fn command(orchestrator: &TestOrchestrator, context: &RequestContext, mode: Mode, args: &str) -> Outcome {
    orchestrator.handle_command(context, mode, args).await.unwrap()
}

async fn message(orchestrator: &TestOrchestrator, context: &RequestContext, text: &str) -> Outcome {
    orchestrator
        .handle_message(context, text)
        .await
        .unwrap()
        .expect("message should be handled")
}

async fn select(
    orchestrator: &TestOrchestrator,
    context: &RequestContext,
    message_id: &str,
    selector: &str,
) -> SelectionOutcome {
    orchestrator
        .handle_selection(&SelectionEvent::new(message_id, &context.requester_id, selector))
        .await
        .unwrap()
}

fn resolved(outcome: SelectionOutcome) -> Outcome {
    match outcome {
        SelectionOutcome::Resolved(outcome) => outcome,
        other => panic!("expected a resolved selection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_read_empty_then_add_inline() {
    let (orchestrator, persistence) = setup().await;

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "g1").await;
    assert!(outcome.responses[0].contains("There are no tips for"));
    assert_eq!(outcome.prompts.len(), 1);

    let saves = persistence.save_count();
    let outcome = command(&orchestrator, &luke(), Mode::Conquest, r#"g1 add "use Thrawn""#).await;
    let text = outcome.last_response().unwrap();
    assert!(text.starts_with("Your tip has been added."));
    assert_eq!(persistence.save_count(), saves + 1);

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "G1").await;
    let text = outcome.last_response().unwrap();
    assert!(text.contains("(of 1)"));
    assert!(text.contains("1 - **Tip from Luke**:\n\tuse Thrawn"));
    assert!(!text.contains("(edited)"));

    let saved = persistence.load(Mode::Conquest).await.unwrap().unwrap();
    assert_eq!(saved.all_tips().len(), 1);
}

#[tokio::test]
async fn test_add_by_capture_and_cancel() {
    let (orchestrator, _) = setup().await;

    let outcome = command(&orchestrator, &luke(), Mode::Rise, "ds1cm2 add").await;
    assert!(outcome.responses[0].contains("Your next message in this channel"));
    assert_eq!(orchestrator.capture_count().await, 1);

    // Another user's message does not feed Luke's capture.
    assert!(orchestrator.handle_message(&leia(), "hello").await.unwrap().is_none());

    let outcome = message(&orchestrator, &luke(), "Bring Vader").await;
    assert!(outcome.last_response().unwrap().contains("Bring Vader"));
    assert_eq!(orchestrator.capture_count().await, 0);

    command(&orchestrator, &luke(), Mode::Rise, "ds1cm2 add").await;
    let outcome = message(&orchestrator, &luke(), "cancel").await;
    assert_eq!(outcome.responses, vec!["Tip addition has been cancelled."]);

    let outcome = command(&orchestrator, &luke(), Mode::Rise, "ds1cm2").await;
    assert!(outcome.last_response().unwrap().contains("(of 1)"));
}

#[tokio::test]
async fn test_edit_without_own_tips_is_nothing_to_modify() {
    let (orchestrator, _) = setup().await;
    command(&orchestrator, &luke(), Mode::Conquest, r#"s1f1 add "Luke's tip""#).await;
    let pending = orchestrator.pending_count().await;

    let outcome = command(&orchestrator, &leia(), Mode::Conquest, "s1f1 edit").await;
    assert!(outcome.responses[0].starts_with("There are no tips that you can edit for"));
    assert!(outcome.prompts.is_empty());
    assert_eq!(orchestrator.pending_count().await, pending);

    // The elevated role may edit anyone's tip.
    let outcome = command(&orchestrator, &admin(), Mode::Conquest, "s1f1 edit").await;
    assert_eq!(outcome.prompts.len(), 1);
}

#[tokio::test]
async fn test_edit_flow() {
    let (orchestrator, _) = setup().await;
    command(&orchestrator, &luke(), Mode::Conquest, r#"g2 add "old text""#).await;

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "g2 edit").await;
    let prompt = outcome.prompts[0].clone();
    assert!(outcome.responses[0].contains("1 - **Luke**: old text (just now)"));

    assert_eq!(select(&orchestrator, &leia(), &prompt, "1").await, SelectionOutcome::Ignored);

    let outcome = resolved(select(&orchestrator, &luke(), &prompt, "1").await);
    assert!(outcome.responses[0].contains("old text"));
    let dm = orchestrator.transport().messages().await;
    assert!(dm
        .iter()
        .any(|m| m.target == Target::Direct("u-luke".to_string()) && m.text.contains("old text")));

    let outcome = message(&orchestrator, &luke(), "new text").await;
    let text = outcome.last_response().unwrap();
    assert!(text.starts_with("Edit success."));
    assert!(text.contains("new text *(edited)*"));

    // The prompt was consumed.
    assert_eq!(select(&orchestrator, &luke(), &prompt, "1").await, SelectionOutcome::Ignored);
}

#[tokio::test]
async fn test_delete_requires_confirm() {
    let (orchestrator, _) = setup().await;
    command(&orchestrator, &luke(), Mode::War, r#"hoth add "set Vader in back""#).await;

    let outcome = command(&orchestrator, &luke(), Mode::War, "hoth delete").await;
    let prompt = outcome.prompts[0].clone();
    resolved(select(&orchestrator, &luke(), &prompt, "1").await);

    let outcome = message(&orchestrator, &luke(), "maybe").await;
    assert_eq!(outcome.responses, vec!["Deletion canceled. Tip not deleted."]);

    let outcome = command(&orchestrator, &luke(), Mode::War, "hoth delete").await;
    let prompt = outcome.prompts[0].clone();
    resolved(select(&orchestrator, &luke(), &prompt, "1").await);
    let outcome = message(&orchestrator, &luke(), "Confirm").await;
    let text = outcome.last_response().unwrap();
    assert!(text.starts_with("Tip deleted."));
    assert!(text.contains("There are no tips for"));
}

#[tokio::test]
async fn test_modifier_prompt_starts_add() {
    let (orchestrator, _) = setup().await;
    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "s2f3").await;
    let read = outcome.prompts[0].clone();
    let sent = orchestrator.transport().message(&read).await.unwrap();
    assert_eq!(sent.selectors.len(), 3);

    let outcome = resolved(select(&orchestrator, &luke(), &read, "\u{2795}").await);
    assert!(outcome.responses[0].contains("Your next message"));
    let outcome = message(&orchestrator, &luke(), "Use daze").await;
    assert!(outcome.last_response().unwrap().contains("Use daze"));

    // The modifier stays available on the original read.
    let outcome = resolved(select(&orchestrator, &luke(), &read, "edit").await);
    assert_eq!(outcome.prompts.len(), 1);
}

#[tokio::test]
async fn test_group_pages_and_drill_down() {
    let (orchestrator, _) = setup().await;

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "g").await;
    let prompt = outcome.prompts[0].clone();
    assert!(outcome.responses[0].ends_with("Page 1/2"));

    assert_eq!(select(&orchestrator, &luke(), &prompt, "previous").await, SelectionOutcome::Ignored);
    assert_eq!(
        select(&orchestrator, &luke(), &prompt, "next").await,
        SelectionOutcome::PageChanged { page: 2 }
    );
    let sent = orchestrator.transport().message(&prompt).await.unwrap();
    assert!(sent.text.ends_with("Page 2/2"));
    assert!(sent.text.contains("3 - Reach 50 Potency"));
    assert!(!sent.text.contains("4 - "));

    assert_eq!(select(&orchestrator, &luke(), &prompt, "4").await, SelectionOutcome::Ignored);
    let outcome = resolved(select(&orchestrator, &luke(), &prompt, "3").await);
    assert!(outcome.responses[0].contains("(`g8`)"));
}

#[tokio::test]
async fn test_cancel_removes_prompt() {
    let (orchestrator, _) = setup().await;
    let outcome = command(&orchestrator, &luke(), Mode::Rise, "ds").await;
    let prompt = outcome.prompts[0].clone();
    let before = orchestrator.pending_count().await;

    assert_eq!(select(&orchestrator, &luke(), &prompt, "cancel").await, SelectionOutcome::Cancelled);
    assert_eq!(orchestrator.pending_count().await, before - 1);
    let sent = orchestrator.transport().last().await.unwrap();
    assert_eq!(sent.text, "Selection cancelled.");
    assert_eq!(sent.target, Target::Channel("general".to_string()));
    assert_eq!(select(&orchestrator, &luke(), &prompt, "1").await, SelectionOutcome::Ignored);
}

#[tokio::test]
async fn test_sweep_expires_day_old_prompts() {
    let (orchestrator, _) = setup().await;
    command(&orchestrator, &luke(), Mode::Conquest, "s").await;
    assert_eq!(orchestrator.pending_count().await, 1);

    let now = Utc::now();
    assert_eq!(orchestrator.sweep_expired(now + Duration::hours(12)).await, 0);
    assert_eq!(orchestrator.pending_count().await, 1);
    assert_eq!(orchestrator.sweep_expired(now + Duration::days(2)).await, 1);
    assert_eq!(orchestrator.pending_count().await, 0);
}

#[tokio::test]
async fn test_sweep_keeps_waiting_captures() {
    let (orchestrator, _) = setup().await;
    command(&orchestrator, &luke(), Mode::Conquest, "g1 add").await;
    assert_eq!(orchestrator.capture_count().await, 1);

    orchestrator.sweep_expired(Utc::now() + Duration::days(2)).await;
    assert_eq!(orchestrator.capture_count().await, 1);

    let outcome = message(&orchestrator, &luke(), "use Thrawn").await;
    let text = outcome.last_response().unwrap();
    assert!(text.starts_with("Your tip has been added."));
    assert!(text.contains("use Thrawn"));
    assert_eq!(orchestrator.capture_count().await, 0);
}

#[tokio::test]
async fn test_invalid_address_lists_node_types() {
    let (orchestrator, _) = setup().await;
    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "s3z").await;
    let text = &outcome.responses[0];
    assert!(text.contains("`s3z`"));
    assert!(text.contains("`b`, `m`, `n`"));
    assert!(outcome.prompts.is_empty());

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "g9").await;
    assert!(outcome.responses[0].contains("between 1 and 8"));
}

#[tokio::test]
async fn test_elevated_operations() {
    let (orchestrator, _) = setup().await;

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "populate").await;
    assert_eq!(outcome.responses, vec!["You do not have access to this command."]);

    let outcome = command(&orchestrator, &admin(), Mode::Conquest, "dummy").await;
    assert!(outcome.responses[0].starts_with("Added"));

    let outcome = command(&orchestrator, &admin(), Mode::Conquest, "stats").await;
    assert!(!outcome.responses[0].contains("Total Tips**: 0"));

    command(&orchestrator, &admin(), Mode::Conquest, "reset").await;
    let outcome = message(&orchestrator, &admin(), "confirm").await;
    assert_eq!(outcome.responses, vec!["Tip storage has been cleared."]);

    let outcome = command(&orchestrator, &admin(), Mode::Conquest, "stats").await;
    assert!(outcome.responses[0].contains("Total Tips**: 0"));
}

#[tokio::test]
async fn test_reassign_author() {
    let (orchestrator, _) = setup().await;
    command(&orchestrator, &luke(), Mode::War, r#"endor add "bring ewoks""#).await;

    let outcome = command(&orchestrator, &luke(), Mode::War, "endor reassign Han").await;
    assert_eq!(outcome.responses, vec!["You do not have access to this command."]);

    let outcome = command(&orchestrator, &admin(), Mode::War, "endor reassign Han").await;
    let prompt = outcome.prompts[0].clone();
    let outcome = resolved(select(&orchestrator, &admin(), &prompt, "1").await);
    let text = outcome.last_response().unwrap();
    assert!(text.starts_with("Author change successful."));
    assert!(text.contains("**Tip from Han**"));
}

#[tokio::test]
async fn test_counter_squads_and_activity_filter() {
    let (orchestrator, _) = setup().await;

    let outcome = command(&orchestrator, &admin(), Mode::Counter, r#"addsquad jmk "jedi master kenobi""#).await;
    assert_eq!(outcome.responses, vec!["Squad Jedi Master Kenobi (`jmk`) added."]);

    let outcome = command(&orchestrator, &luke(), Mode::Counter, "addsquad JMK").await;
    assert!(outcome.responses[0].contains("already exists"));

    let outcome = command(&orchestrator, &luke(), Mode::Counter, r#"jmk add "Lord Vader""#).await;
    assert!(outcome.responses[0].starts_with("Title added."));
    let outcome = message(&orchestrator, &luke(), "Vader ignores the shield tag=gac").await;
    let text = outcome.last_response().unwrap();
    assert!(text.contains("**Lord Vader**\t[GAC]"));
    assert!(!text.contains("tag="));

    let outcome = command(&orchestrator, &luke(), Mode::Counter, "jmk TW").await;
    assert!(outcome.responses[0].contains("There are no tips for"));
    let outcome = command(&orchestrator, &luke(), Mode::Counter, "jmk gac").await;
    assert!(outcome.responses[0].contains("Lord Vader"));

    let outcome = command(&orchestrator, &luke(), Mode::Counter, "list").await;
    assert!(outcome.responses[0].contains("Jedi Master Kenobi (`jmk`) - 1 tips"));

    let outcome = command(&orchestrator, &luke(), Mode::Counter, "deletesquad jmk").await;
    assert_eq!(outcome.responses, vec!["You do not have access to this command."]);
    let outcome = command(&orchestrator, &admin(), Mode::Counter, "deletesquad jmk").await;
    assert!(outcome.responses[0].contains("Its 1 tips were deleted."));

    let outcome = command(&orchestrator, &luke(), Mode::Counter, "jmk").await;
    assert!(outcome.responses[0].contains("Squad lead not found"));
}

#[tokio::test]
async fn test_squad_name_capture() {
    let (orchestrator, _) = setup().await;
    let outcome = command(&orchestrator, &luke(), Mode::Counter, "addsquad see").await;
    assert!(outcome.responses[0].contains("`see`"));

    let outcome = message(&orchestrator, &luke(), "sith eternal emperor").await;
    assert_eq!(outcome.responses, vec!["Squad Sith Eternal Emperor (`see`) added."]);

    command(&orchestrator, &luke(), Mode::Counter, "editsquad see").await;
    let outcome = message(&orchestrator, &luke(), "Emperor Palpatine").await;
    assert_eq!(outcome.responses, vec!["Squad Emperor Palpatine (`see`) updated."]);
}

#[tokio::test]
async fn test_user_errors() {
    let (orchestrator, _) = setup().await;

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "map g1").await;
    assert_eq!(outcome.responses, vec!["`map` is not supported in conquest mode."]);

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "g1 add use Thrawn").await;
    assert!(outcome.responses[0].contains("double quotes"));

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "add").await;
    assert!(outcome.responses[0].starts_with("This command needs a location"));

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, r#"s2 add "tip""#).await;
    assert!(outcome.responses[0].contains("is a group"));

    let outcome = command(&orchestrator, &luke(), Mode::Conquest, "g1 lots").await;
    assert!(outcome.responses[0].starts_with("Unrecognized filter `lots`"));
}

#[tokio::test]
async fn test_help() {
    let (orchestrator, _) = setup().await;
    let outcome = command(&orchestrator, &luke(), Mode::Rise, "help").await;
    assert!(outcome.responses[0].contains("**Map**"));

    let outcome = command(&orchestrator, &luke(), Mode::Rise, "delete help").await;
    assert!(outcome.responses[0].starts_with("**Delete**"));
}

#[tokio::test]
async fn test_save_failure_is_reported_not_rolled_back() {
    let (orchestrator, persistence) = setup().await;
    persistence.set_fail_saves(true);

    let outcome = command(&orchestrator, &luke(), Mode::War, r#"hoth add "kept in memory""#).await;
    assert!(outcome.responses[0].contains("could not be saved"));
    assert!(outcome.last_response().unwrap().contains("kept in memory"));
}

#[tokio::test]
async fn test_direct_response_mode_and_message_commands() {
    let settings = Settings::default().with_response_mode(ResponseMode::Direct);
    let (orchestrator, _) = setup_with(settings).await;

    let outcome = message(&orchestrator, &luke(), "!war hoth").await;
    assert!(outcome.responses[0].contains("There are no tips"));
    let sent = orchestrator.transport().last().await.unwrap();
    assert_eq!(sent.target, Target::Direct("u-luke".to_string()));

    assert!(orchestrator
        .handle_message(&luke(), "just chatting")
        .await
        .unwrap()
        .is_none());
    assert!(orchestrator
        .handle_message(&luke(), "!unknown g1")
        .await
        .unwrap()
        .is_none());
}
