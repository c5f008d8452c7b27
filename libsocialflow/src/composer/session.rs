//! One composing session
//!
//! [`ComposerSession`] owns the draft and everything that feeds it:
//!
//! - edits arrive as [`Action`]s and go through [`reduce`]
//! - uploads run as background tasks and report over the [`EventBus`];
//!   [`ComposerSession::pump`] applies what has arrived
//! - generation requests are split in three steps so the draft is never
//!   borrowed across an await: `begin_*` issues a ticketed
//!   [`PendingGeneration`], [`PendingGeneration::run`] talks to the service,
//!   and [`ComposerSession::complete`] applies the result if it is still
//!   current
//! - finalized posts go to a [`PostSink`]
//!
//! A completion is stale, and discarded, when a newer request of the same
//! kind was issued after it, or when the edit target changed since it was
//! issued.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, info, instrument, warn};

use super::actions::Action;
use super::finalize::{finalize, PostAction};
use super::reducer::reduce;
use super::state::{ComposerState, EditTarget};
use crate::config::{Config, SimulationConfig};
use crate::error::GenerationError;
use crate::events::{Event, EventBus, EventReceiver, GenerationKind};
use crate::generation::{ContentGenerator, GenerationResult};
use crate::queue::PostSink;
use crate::scheduling::ScheduleZone;
use crate::types::{CaptionVariant, MediaItem, MediaKind, Post};
use crate::uploads::UploadSimulator;
use crate::Result;

pub const CAPTIONS_FAILED: &str = "Failed to generate captions. Please try again.";
pub const SUMMARY_FAILED: &str = "AI was unable to summarize the post. Ensure the text isn't too short.";
pub const IMAGE_FAILED: &str = "Image generation failed. Try a more descriptive prompt.";
pub const VIDEO_FAILED: &str = "Video production failed. This can happen with complex prompts.";
pub const VIDEO_KEY_RESET: &str = "Video API key reset required. Please select a valid project.";

/// Label used for captions when no platform is selected
const FALLBACK_PLATFORM_LABEL: &str = "Social Media";

/// Identity of one generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub kind: GenerationKind,
    /// Where edits landed when the request was issued
    pub target: EditTarget,
}

#[derive(Debug, Clone)]
enum Request {
    Captions { topic: String, label: String },
    Summary { content: String },
    Image { prompt: String },
    Video { prompt: String },
}

#[derive(Debug, Clone)]
enum Response {
    Captions(Vec<CaptionVariant>),
    Summary(String),
    Media { url: String, kind: MediaKind },
}

/// A generation request that has been issued but not run yet
#[derive(Debug)]
pub struct PendingGeneration {
    ticket: Ticket,
    request: Request,
    events: EventBus,
}

impl PendingGeneration {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Call the generative service
    ///
    /// Video status lines are emitted as [`Event::VideoProgress`].
    #[instrument(skip_all, fields(ticket = self.ticket.id, kind = %self.ticket.kind, generator = generator.name()))]
    pub async fn run(self, generator: &dyn ContentGenerator) -> CompletedGeneration {
        let result: GenerationResult<Response> = match self.request {
            Request::Captions { topic, label } => generator
                .captions(&topic, &label)
                .await
                .map(Response::Captions),
            Request::Summary { content } => generator.summarize(&content).await.map(Response::Summary),
            Request::Image { prompt } => generator.image(&prompt).await.map(|url| Response::Media {
                url,
                kind: MediaKind::Image,
            }),
            Request::Video { prompt } => {
                let events = self.events.clone();
                let ticket = self.ticket.id;
                let progress = move |message: &str| {
                    events.emit(Event::VideoProgress {
                        ticket,
                        message: message.to_string(),
                    })
                };
                generator
                    .video(&prompt, &progress)
                    .await
                    .map(|url| Response::Media {
                        url,
                        kind: MediaKind::Video,
                    })
            }
        };

        CompletedGeneration {
            ticket: self.ticket,
            result,
        }
    }
}

/// The service's answer to a [`PendingGeneration`]
#[derive(Debug)]
pub struct CompletedGeneration {
    ticket: Ticket,
    result: GenerationResult<Response>,
}

impl CompletedGeneration {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// What happened to a generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The result was written into the draft
    Applied,
    /// Nothing was requested (empty content or prompt)
    Skipped,
    /// The result arrived after it stopped being relevant
    Discarded,
    /// The service failed; the message is shown to the user
    Failed(String),
}

/// Draft plus the collaborators that act on it
pub struct ComposerSession {
    state: ComposerState,
    generator: Arc<dyn ContentGenerator>,
    sink: Arc<dyn PostSink>,
    uploads: UploadSimulator,
    events: EventBus,
    inbox: EventReceiver,
    zone: ScheduleZone,
    next_ticket: u64,
    in_flight: HashMap<GenerationKind, Ticket>,
}

impl ComposerSession {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        sink: Arc<dyn PostSink>,
        events: EventBus,
        simulation: &SimulationConfig,
        zone: ScheduleZone,
    ) -> Result<Self> {
        let inbox = events.subscribe();
        let uploads = UploadSimulator::from_config(events.clone(), simulation)?;
        Ok(Self {
            state: ComposerState::new(),
            generator,
            sink,
            uploads,
            events,
            inbox,
            zone,
            next_ticket: 0,
            in_flight: HashMap::new(),
        })
    }

    pub fn from_config(
        config: &Config,
        generator: Arc<dyn ContentGenerator>,
        sink: Arc<dyn PostSink>,
        events: EventBus,
    ) -> Result<Self> {
        Self::new(
            generator,
            sink,
            events,
            &config.simulation,
            config.composer.schedule_zone()?,
        )
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn zone(&self) -> &ScheduleZone {
        &self.zone
    }

    /// Uploads still running
    pub fn uploads_in_flight(&mut self) -> usize {
        self.uploads.in_flight()
    }

    // === Edits ===

    /// Apply an edit to the draft
    ///
    /// Media added while uploading starts a simulated upload; removing the
    /// last copy of an item cancels its upload.
    pub fn dispatch(&mut self, action: Action) {
        let started = match &action {
            Action::AddMedia(item) if item.is_uploading() => Some(item.id.clone()),
            _ => None,
        };
        let removed = match &action {
            Action::RemoveMedia(id) => Some(id.clone()),
            _ => None,
        };
        let reset = matches!(action, Action::Reset);

        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);

        if let Some(id) = started {
            if self.state.contains_media(&id) {
                self.uploads.start(&id);
            }
        }
        if let Some(id) = removed {
            if !self.state.contains_media(&id) {
                self.uploads.cancel(&id);
            }
        }
        if reset {
            self.uploads.cancel_all();
            self.in_flight.clear();
        }
    }

    /// Apply every event that has already arrived; returns how many
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.inbox.try_recv() {
                Ok(event) => {
                    if self.apply_event(event) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session fell behind its event bus");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        applied
    }

    /// Wait until no media item is uploading any more
    pub async fn settle_uploads(&mut self) {
        loop {
            let running = self.uploads.in_flight();
            self.pump();
            if !self.state.has_pending_uploads() {
                return;
            }
            if running == 0 {
                warn!("Media still marked uploading with no upload running");
                return;
            }
            match self.inbox.recv().await {
                Ok(event) => {
                    self.apply_event(event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session fell behind its event bus");
                }
                Err(RecvError::Closed) => return,
            }
        }
    }

    fn apply_event(&mut self, event: Event) -> bool {
        match event {
            Event::UploadProgress { media_id, percent } => {
                self.state.apply_upload_progress(&media_id, percent)
            }
            Event::VideoProgress { ticket, message } => {
                let current = self
                    .in_flight
                    .get(&GenerationKind::Video)
                    .is_some_and(|t| t.id == ticket);
                if current {
                    self.state.set_video_progress(Some(message));
                }
                current
            }
            _ => false,
        }
    }

    // === Generation ===

    fn issue(&mut self, kind: GenerationKind, request: Request) -> PendingGeneration {
        self.next_ticket += 1;
        let ticket = Ticket {
            id: self.next_ticket,
            kind,
            target: self.state.edit_target(),
        };
        if let Some(previous) = self.in_flight.insert(kind, ticket) {
            debug!(previous = previous.id, ticket = ticket.id, %kind, "Superseding request");
        }
        self.state.clear_error();
        self.events.emit(Event::GenerationStarted {
            kind,
            ticket: ticket.id,
        });
        PendingGeneration {
            ticket,
            request,
            events: self.events.clone(),
        }
    }

    /// Ask for caption variations of the master content
    ///
    /// Returns `None` when the content is empty.
    pub fn begin_captions(&mut self) -> Option<PendingGeneration> {
        if self.state.content().is_empty() {
            return None;
        }
        let label = self
            .state
            .preview_platform()
            .or_else(|| self.state.targets().first().copied())
            .map(|p| p.to_string())
            .unwrap_or_else(|| FALLBACK_PLATFORM_LABEL.to_string());
        let topic = self.state.content().to_string();
        if !self.state.suggestions().is_empty() {
            self.state.close_panels();
        }
        Some(self.issue(GenerationKind::Captions, Request::Captions { topic, label }))
    }

    /// Ask for a shortened master content; `None` when the content is empty
    pub fn begin_summary(&mut self) -> Option<PendingGeneration> {
        if self.state.content().is_empty() {
            return None;
        }
        let content = self.state.content().to_string();
        Some(self.issue(GenerationKind::Summary, Request::Summary { content }))
    }

    /// Ask for an image from the image panel's prompt
    pub fn begin_image(&mut self) -> Option<PendingGeneration> {
        let prompt = self.state.image_prompt().unwrap_or_default().to_string();
        self.begin_image_with(prompt)
    }

    /// Ask for an image from an explicit prompt, such as a preset
    pub fn begin_image_with(&mut self, prompt: String) -> Option<PendingGeneration> {
        if prompt.is_empty() {
            return None;
        }
        Some(self.issue(GenerationKind::Image, Request::Image { prompt }))
    }

    /// Ask for a video from the video panel's prompt
    pub fn begin_video(&mut self) -> Option<PendingGeneration> {
        let prompt = self.state.video_prompt().unwrap_or_default().to_string();
        if prompt.is_empty() {
            return None;
        }
        Some(self.issue(GenerationKind::Video, Request::Video { prompt }))
    }

    /// Apply a finished request to the draft
    #[instrument(skip_all, fields(ticket = done.ticket.id, kind = %done.ticket.kind))]
    pub fn complete(&mut self, done: CompletedGeneration) -> GenerationOutcome {
        let ticket = done.ticket;
        let latest = self.in_flight.get(&ticket.kind).is_some_and(|t| t.id == ticket.id);
        if latest {
            self.in_flight.remove(&ticket.kind);
            if ticket.kind == GenerationKind::Video {
                self.state.set_video_progress(None);
            }
        }

        let current_target = self.state.edit_target();
        if !latest || ticket.target != current_target {
            info!(
                issued_for = ?ticket.target,
                now_editing = ?current_target,
                superseded = !latest,
                "Discarding stale generation result"
            );
            self.finish(ticket, "stale");
            return GenerationOutcome::Discarded;
        }

        match done.result {
            Ok(response) => {
                self.apply_response(response);
                self.finish(ticket, "applied");
                GenerationOutcome::Applied
            }
            Err(err) => {
                let message = failure_message(ticket.kind, &err);
                warn!(error = %err, "Generation failed");
                self.state.set_error(message);
                self.finish(ticket, "failed");
                GenerationOutcome::Failed(message.to_string())
            }
        }
    }

    fn apply_response(&mut self, response: Response) {
        match response {
            Response::Captions(variants) => self.state.show_suggestions(variants),
            Response::Summary(summary) => self.state.set_content(summary),
            Response::Media { url, kind } => {
                let item = MediaItem::uploading(url, kind);
                let id = item.id.clone();
                self.state.add_media(item);
                if self.state.contains_media(&id) {
                    self.uploads.start(&id);
                }
                self.state.close_panels();
            }
        }
    }

    fn finish(&self, ticket: Ticket, outcome: &str) {
        self.events.emit(Event::GenerationFinished {
            kind: ticket.kind,
            ticket: ticket.id,
            outcome: outcome.to_string(),
        });
    }

    async fn run_to_completion(&mut self, pending: Option<PendingGeneration>) -> GenerationOutcome {
        let Some(pending) = pending else {
            return GenerationOutcome::Skipped;
        };
        let generator = Arc::clone(&self.generator);
        let done = pending.run(generator.as_ref()).await;
        let outcome = self.complete(done);
        self.pump();
        outcome
    }

    /// Issue, run and apply a caption request
    pub async fn request_captions(&mut self) -> GenerationOutcome {
        let pending = self.begin_captions();
        self.run_to_completion(pending).await
    }

    pub async fn request_summary(&mut self) -> GenerationOutcome {
        let pending = self.begin_summary();
        self.run_to_completion(pending).await
    }

    pub async fn request_image(&mut self) -> GenerationOutcome {
        let pending = self.begin_image();
        self.run_to_completion(pending).await
    }

    pub async fn request_video(&mut self) -> GenerationOutcome {
        let pending = self.begin_video();
        self.run_to_completion(pending).await
    }

    // === Finalization ===

    /// Queue the draft and start a fresh one
    pub async fn schedule(&mut self) -> Result<Post> {
        self.finalize_into_sink(PostAction::Schedule).await
    }

    /// Save a copy of the draft and keep editing it
    pub async fn save_draft(&mut self) -> Result<Post> {
        self.finalize_into_sink(PostAction::SaveDraft).await
    }

    #[instrument(skip(self))]
    async fn finalize_into_sink(&mut self, action: PostAction) -> Result<Post> {
        self.pump();
        let snapshot = self.state.clone();
        let post = finalize(&mut self.state, action, &self.zone)?;

        if let Err(err) = self.sink.accept(post.clone()).await {
            warn!(error = %err, "Sink rejected post, keeping draft");
            self.state = snapshot;
            return Err(err);
        }

        if action == PostAction::Schedule {
            self.uploads.cancel_all();
            self.in_flight.clear();
        }

        self.events.emit(Event::PostFinalized {
            post_id: post.id.clone(),
            status: post.status,
            platforms: post.platforms.clone(),
        });
        Ok(post)
    }
}

fn failure_message(kind: GenerationKind, err: &GenerationError) -> &'static str {
    match (kind, err) {
        (GenerationKind::Video, GenerationError::CredentialInvalid(_)) => VIDEO_KEY_RESET,
        (GenerationKind::Captions, _) => CAPTIONS_FAILED,
        (GenerationKind::Summary, _) => SUMMARY_FAILED,
        (GenerationKind::Image, _) => IMAGE_FAILED,
        (GenerationKind::Video, _) => VIDEO_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::EditorMode;
    use crate::generation::{MockGenerator, MockGeneratorConfig};
    use crate::queue::PostQueue;
    use crate::types::{Platform, PostStatus};
    use crate::SocialFlowError;

    fn session_with(generator: MockGenerator) -> (ComposerSession, PostQueue) {
        let queue = PostQueue::new();
        let session = ComposerSession::new(
            Arc::new(generator),
            Arc::new(queue.clone()),
            EventBus::new(1024),
            &SimulationConfig::default(),
            ScheduleZone::utc(),
        )
        .unwrap();
        (session, queue)
    }

    fn session() -> (ComposerSession, PostQueue) {
        session_with(MockGenerator::success())
    }

    #[tokio::test]
    async fn test_captions_need_content() {
        let generator = MockGenerator::success();
        let (mut session, _) = session_with(generator.clone());

        assert_eq!(session.request_captions().await, GenerationOutcome::Skipped);
        assert_eq!(session.request_summary().await, GenerationOutcome::Skipped);
        assert_eq!(generator.call_count(GenerationKind::Captions), 0);
    }

    #[tokio::test]
    async fn test_caption_label_falls_back() {
        let generator = MockGenerator::success();
        let (mut session, _) = session_with(generator.clone());
        session.dispatch(Action::SetContent("launch".to_string()));

        session.request_captions().await;
        assert!(session.state().suggestions()[0].text.contains("Social Media"));

        session.dispatch(Action::TogglePlatform(Platform::LinkedIn));
        session.request_captions().await;
        assert!(session.state().suggestions()[0].text.contains("LinkedIn"));
    }

    #[tokio::test]
    async fn test_apply_suggestion_writes_content() {
        let (mut session, _) = session();
        session.dispatch(Action::SetContent("launch".to_string()));

        assert_eq!(session.request_captions().await, GenerationOutcome::Applied);
        let first = session.state().suggestions()[0].text.clone();

        session.dispatch(Action::ApplySuggestion(0));
        assert_eq!(session.state().content(), first);
        assert_eq!(*session.state().mode(), EditorMode::Idle);
    }

    #[tokio::test]
    async fn test_summary_goes_to_edit_target() {
        let (mut session, _) = session_with(MockGenerator::new(MockGeneratorConfig {
            summary: Some("short".to_string()),
            ..Default::default()
        }));
        session.dispatch(Action::SetContent("a long master text".to_string()));
        session.dispatch(Action::TogglePlatform(Platform::Twitter));
        session.dispatch(Action::EnterTuning);

        assert_eq!(session.request_summary().await, GenerationOutcome::Applied);
        assert_eq!(session.state().content(), "a long master text");
        assert_eq!(session.state().effective_content(Platform::Twitter), "short");
    }

    #[tokio::test(start_paused = true)]
    async fn test_generated_image_uploads_and_closes_panel() {
        let (mut session, _) = session();
        session.dispatch(Action::SetImagePrompt("a fox".to_string()));
        session.dispatch(Action::AppendImageStyle("Cinematic".to_string()));

        assert_eq!(session.request_image().await, GenerationOutcome::Applied);
        assert_eq!(*session.state().mode(), EditorMode::Idle);
        let item = session.state().media()[0].clone();
        assert_eq!(item.kind, MediaKind::Image);
        assert_eq!(item.upload_progress, Some(0));

        session.settle_uploads().await;
        assert_eq!(session.state().media()[0].upload_progress, None);
        assert_eq!(session.uploads_in_flight(), 0);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_skipped() {
        let (mut session, _) = session();
        session.dispatch(Action::ToggleImageGenerator);
        assert_eq!(session.request_image().await, GenerationOutcome::Skipped);
        assert_eq!(session.request_video().await, GenerationOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_failure_messages() {
        let failing = MockGenerator::failing(GenerationError::Failed("boom".to_string()));
        let (mut session, _) = session_with(failing);
        session.dispatch(Action::SetContent("topic".to_string()));

        assert_eq!(
            session.request_captions().await,
            GenerationOutcome::Failed(CAPTIONS_FAILED.to_string())
        );
        assert_eq!(session.state().error(), Some(CAPTIONS_FAILED));

        session.request_summary().await;
        assert_eq!(session.state().error(), Some(SUMMARY_FAILED));

        session.dispatch(Action::SetVideoPrompt("waves".to_string()));
        session.request_video().await;
        assert_eq!(session.state().error(), Some(VIDEO_FAILED));
        assert!(session.state().media().is_empty());
    }

    #[tokio::test]
    async fn test_video_credential_reset_message() {
        let failing = MockGenerator::failing(GenerationError::CredentialInvalid(
            "Requested entity was not found.".to_string(),
        ));
        let (mut session, _) = session_with(failing);
        session.dispatch(Action::SetVideoPrompt("waves".to_string()));

        assert_eq!(
            session.request_video().await,
            GenerationOutcome::Failed(VIDEO_KEY_RESET.to_string())
        );
        // The panel stays open with its progress cleared
        assert_eq!(
            *session.state().mode(),
            EditorMode::VideoGen {
                prompt: "waves".to_string(),
                progress: None
            }
        );
    }

    #[tokio::test]
    async fn test_new_request_clears_error() {
        let (mut session, _) = session();
        session.dispatch(Action::ShowError("old".to_string()));
        session.dispatch(Action::SetContent("topic".to_string()));

        session.request_summary().await;
        assert_eq!(session.state().error(), None);
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let generator = MockGenerator::success();
        let (mut session, _) = session_with(generator.clone());
        session.dispatch(Action::SetContent("first".to_string()));

        let older = session.begin_summary().unwrap();
        session.dispatch(Action::SetContent("second".to_string()));
        let newer = session.begin_summary().unwrap();

        let newer_done = newer.run(&generator).await;
        let older_done = older.run(&generator).await;

        assert_eq!(session.complete(newer_done), GenerationOutcome::Applied);
        assert_eq!(session.complete(older_done), GenerationOutcome::Discarded);
        assert_eq!(session.state().content(), "second");
    }

    #[tokio::test]
    async fn test_response_for_other_edit_target_is_discarded() {
        let generator = MockGenerator::success();
        let (mut session, _) = session_with(generator.clone());
        session.dispatch(Action::SetContent("master".to_string()));
        session.dispatch(Action::TogglePlatform(Platform::Twitter));

        let pending = session.begin_captions().unwrap();
        session.dispatch(Action::EnterTuning);
        let done = pending.run(&generator).await;

        assert_eq!(session.complete(done), GenerationOutcome::Discarded);
        assert!(session.state().suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_video_progress_only_while_current() {
        let generator = MockGenerator::success();
        let (mut session, _) = session_with(generator.clone());
        session.dispatch(Action::SetVideoPrompt("waves".to_string()));

        let pending = session.begin_video().unwrap();
        let done = pending.run(&generator).await;

        // Progress lines are waiting on the bus while the request is current
        assert!(session.pump() > 0);
        assert!(matches!(
            session.state().mode(),
            EditorMode::VideoGen { progress: Some(_), .. }
        ));

        assert_eq!(session.complete(done), GenerationOutcome::Applied);
        assert_eq!(session.state().media()[0].kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn test_schedule_hands_post_to_sink_and_resets() {
        let (mut session, queue) = session();
        session.dispatch(Action::SetContent("go live".to_string()));
        session.dispatch(Action::TogglePlatform(Platform::LinkedIn));
        session.dispatch(Action::SetScheduleDate(Some("2025-06-01".to_string())));
        session.dispatch(Action::SetScheduleTime(Some("14:30".to_string())));

        let mut rx = session.events().subscribe();
        let post = session.schedule().await.unwrap();

        assert_eq!(post.status, PostStatus::Scheduled);
        assert_eq!(queue.scheduled(), vec![post.clone()]);
        assert_eq!(session.state().content(), "");
        assert_eq!(
            rx.recv().await.unwrap(),
            Event::PostFinalized {
                post_id: post.id,
                status: PostStatus::Scheduled,
                platforms: vec![Platform::LinkedIn],
            }
        );
    }

    #[tokio::test]
    async fn test_save_draft_keeps_editing() {
        let (mut session, queue) = session();
        session.dispatch(Action::SetContent("wip".to_string()));
        session.dispatch(Action::TogglePlatform(Platform::Facebook));
        let before = session.state().clone();

        let post = session.save_draft().await.unwrap();
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(queue.drafts().len(), 1);
        assert_eq!(*session.state(), before);
    }

    #[tokio::test]
    async fn test_schedule_without_targets_is_blocked() {
        let (mut session, queue) = session();
        session.dispatch(Action::SetContent("nowhere".to_string()));

        let err = session.schedule().await.unwrap_err();
        assert!(matches!(err, SocialFlowError::ValidationBlocked(_)));
        assert!(queue.scheduled().is_empty());
        assert_eq!(session.state().content(), "nowhere");
    }

    #[tokio::test]
    async fn test_result_after_schedule_is_discarded() {
        let generator = MockGenerator::success();
        let (mut session, _) = session_with(generator.clone());
        session.dispatch(Action::SetContent("topic".to_string()));
        session.dispatch(Action::TogglePlatform(Platform::LinkedIn));

        let pending = session.begin_summary().unwrap();
        session.schedule().await.unwrap();
        let done = pending.run(&generator).await;

        assert_eq!(session.complete(done), GenerationOutcome::Discarded);
        assert_eq!(session.state().content(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_removing_media_cancels_upload() {
        let (mut session, _) = session();
        let item = MediaItem::uploading("https://cdn.example/a.png".to_string(), MediaKind::Image);
        let id = item.id.clone();

        session.dispatch(Action::AddMedia(item));
        assert_eq!(session.uploads_in_flight(), 1);

        session.dispatch(Action::RemoveMedia(id));
        assert_eq!(session.uploads_in_flight(), 0);
    }
}
