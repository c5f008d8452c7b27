//! Integration tests for a composing session
//!
//! Exercises the session together with the account registry, the post queue,
//! the upload simulator and the preview/validation helpers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use libsocialflow::composer::session::VIDEO_KEY_RESET;
use libsocialflow::config::{default_accounts, SimulationConfig};
use libsocialflow::events::GenerationKind;
use libsocialflow::preview::{self, MediaLayout};
use libsocialflow::{
    validation, AccountRegistry, Action, ComposerSession, Event, EventBus, GenerationError,
    GenerationOutcome, MediaItem, MediaKind, MockGenerator, Platform, Post, PostQueue, PostSink,
    PostStatus, ScheduleZone, SocialFlowError,
};

fn fast_simulation() -> SimulationConfig {
    SimulationConfig {
        oauth_delay: "10ms".to_string(),
        upload_tick: "1ms".to_string(),
        upload_max_step: 50,
    }
}

fn setup_session(generator: MockGenerator, events: EventBus) -> (ComposerSession, PostQueue) {
    let queue = PostQueue::new();
    let session = ComposerSession::new(
        Arc::new(generator),
        Arc::new(queue.clone()),
        events,
        &fast_simulation(),
        ScheduleZone::utc(),
    )
    .unwrap();
    (session, queue)
}

/// Sink that refuses every post
struct RejectingSink;

#[async_trait]
impl PostSink for RejectingSink {
    async fn accept(&self, _post: Post) -> libsocialflow::Result<()> {
        Err(SocialFlowError::InvalidInput("queue is full".to_string()))
    }
}

#[tokio::test]
async fn test_connect_select_tune_and_schedule() {
    let events = EventBus::default();
    let registry = AccountRegistry::new(default_accounts(), Duration::from_millis(10), events.clone());
    let (mut session, queue) = setup_session(MockGenerator::success(), events);

    registry.connect(Platform::Twitter).await.unwrap();
    session.dispatch(Action::SetContent("Our Q3 report is out, read the full story".to_string()));
    session.dispatch(Action::SelectAllConnected(registry.accounts()));
    assert_eq!(session.state().preview_platform(), Some(Platform::LinkedIn));
    assert_eq!(session.state().targets().len(), 4);

    // Tune Twitter only
    session.dispatch(Action::SetPreview(Platform::Twitter));
    session.dispatch(Action::EnterTuning);
    session.dispatch(Action::SetContent("Q3 report is out".to_string()));
    session.dispatch(Action::SetScheduleDate(Some("2025-06-01".to_string())));
    session.dispatch(Action::SetScheduleTime(Some("14:30".to_string())));

    let post = session.schedule().await.unwrap();

    assert_eq!(post.status, PostStatus::Scheduled);
    assert_eq!(post.content, "Our Q3 report is out, read the full story");
    assert_eq!(post.content_for(Platform::Twitter), "Q3 report is out");
    assert_eq!(post.content_for(Platform::LinkedIn), post.content);
    assert_eq!(post.overrides.as_ref().map(|o| o.len()), Some(1));
    assert_eq!(
        post.scheduled_at.map(|t| t.to_rfc3339()),
        Some("2025-06-01T14:30:00+00:00".to_string())
    );
    assert_eq!(post.platform_statuses.len(), 4);

    // The draft is gone and the queue holds the post
    assert!(session.state().content().is_empty());
    assert!(session.state().targets().is_empty());
    assert!(session.state().overrides().is_empty());
    assert_eq!(queue.scheduled().len(), 1);
    assert_eq!(queue.get(&post.id), Some(post));
}

#[tokio::test]
async fn test_overrides_dropped_when_tuning_is_off() {
    let (mut session, _queue) = setup_session(MockGenerator::success(), EventBus::default());

    session.dispatch(Action::SetContent("Master".to_string()));
    session.dispatch(Action::TogglePlatform(Platform::Facebook));
    session.dispatch(Action::EnterTuning);
    session.dispatch(Action::SetContent("Facebook only".to_string()));
    session.dispatch(Action::LeaveTuning);

    let post = session.save_draft().await.unwrap();
    assert!(post.overrides.is_none());
    assert_eq!(post.content_for(Platform::Facebook), "Master");

    // Overrides survive leaving tuning and come back when it is re-entered
    assert!(session.state().overrides().has_override(Platform::Facebook));
    session.dispatch(Action::EnterTuning);
    let post = session.save_draft().await.unwrap();
    assert_eq!(post.content_for(Platform::Facebook), "Facebook only");
}

#[tokio::test]
async fn test_generated_image_uploads_then_previews() {
    let (mut session, _queue) = setup_session(MockGenerator::success(), EventBus::default());

    session.dispatch(Action::SetContent("New collection".to_string()));
    session.dispatch(Action::TogglePlatform(Platform::Instagram));

    let before = preview::render_draft(session.state()).unwrap();
    assert_eq!(before.media, MediaLayout::MediaRequired);

    session.dispatch(Action::SetImagePrompt("studio shot".to_string()));
    session.dispatch(Action::AppendImageStyle("Minimalist".to_string()));
    assert_eq!(session.request_image().await, GenerationOutcome::Applied);
    assert!(session.state().has_pending_uploads());

    session.settle_uploads().await;
    assert!(!session.state().has_pending_uploads());
    assert_eq!(session.uploads_in_flight(), 0);

    let after = preview::render_draft(session.state()).unwrap();
    match after.media {
        MediaLayout::Hero { item } => assert_eq!(item.kind, MediaKind::Image),
        other => panic!("Expected a hero image, got {:?}", other),
    }
    let report = validation::validate(session.state());
    assert!(report.valid);
}

#[tokio::test]
async fn test_concurrent_requests_keep_only_the_latest() {
    let generator = MockGenerator::with_delay(Duration::from_millis(20));
    let (mut session, _queue) = setup_session(generator.clone(), EventBus::default());
    session.dispatch(Action::TogglePlatform(Platform::LinkedIn));

    let first = session.begin_image_with("a lighthouse".to_string()).unwrap();
    let second = session.begin_image_with("a harbour".to_string()).unwrap();

    let (first_done, second_done) =
        futures::join!(first.run(&generator), second.run(&generator));

    assert_eq!(session.complete(second_done), GenerationOutcome::Applied);
    assert_eq!(session.complete(first_done), GenerationOutcome::Discarded);
    assert_eq!(session.state().media().len(), 1);
    assert_eq!(generator.call_count(GenerationKind::Image), 2);
}

#[tokio::test]
async fn test_video_progress_and_credential_reset() {
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let (mut session, _queue) = setup_session(MockGenerator::success(), events);

    session.dispatch(Action::SetVideoPrompt("drone shot over a city".to_string()));
    assert_eq!(session.request_video().await, GenerationOutcome::Applied);

    let mut progress = Vec::new();
    let mut finished = None;
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::VideoProgress { message, .. } => progress.push(message),
            Event::GenerationFinished { kind, outcome, .. } => finished = Some((kind, outcome)),
            _ => {}
        }
    }
    assert_eq!(progress.len(), 3);
    assert_eq!(finished, Some((GenerationKind::Video, "applied".to_string())));
    assert_eq!(session.state().media()[0].kind, MediaKind::Video);

    // A rejected credential asks for a new key instead of a retry
    let failing = MockGenerator::failing(GenerationError::CredentialInvalid(
        "Requested entity was not found.".to_string(),
    ));
    let (mut session, _queue) = setup_session(failing, EventBus::default());
    session.dispatch(Action::SetVideoPrompt("drone shot".to_string()));

    assert_eq!(
        session.request_video().await,
        GenerationOutcome::Failed(VIDEO_KEY_RESET.to_string())
    );
    assert_eq!(session.state().error(), Some(VIDEO_KEY_RESET));
    assert!(session.state().media().is_empty());
}

#[tokio::test]
async fn test_rejected_post_keeps_the_draft() {
    let mut session = ComposerSession::new(
        Arc::new(MockGenerator::success()),
        Arc::new(RejectingSink),
        EventBus::default(),
        &fast_simulation(),
        ScheduleZone::utc(),
    )
    .unwrap();

    session.dispatch(Action::SetContent("Keep me".to_string()));
    session.dispatch(Action::TogglePlatform(Platform::Pinterest));
    session.dispatch(Action::AddMedia(MediaItem::ready(
        "https://cdn.example/pin.png".to_string(),
        MediaKind::Image,
    )));

    let err = session.schedule().await.unwrap_err();
    assert!(matches!(err, SocialFlowError::InvalidInput(_)));
    assert_eq!(session.state().content(), "Keep me");
    assert_eq!(session.state().targets(), &[Platform::Pinterest]);
    assert_eq!(session.state().media().len(), 1);
}

#[tokio::test]
async fn test_published_post_is_terminal() {
    let queue = PostQueue::with_demo_posts();
    let first = queue.scheduled()[0].clone();

    let published = queue
        .mark_published(&first.id, Default::default(), chrono::Utc::now())
        .unwrap();
    assert_eq!(published.status, PostStatus::Published);
    assert!(published
        .platform_statuses
        .values()
        .all(|s| *s == PostStatus::Published));

    // Terminal posts cannot move again
    assert!(queue.mark_failed(&first.id).is_err());
}
