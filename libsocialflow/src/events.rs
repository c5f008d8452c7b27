//! Event system for session progress
//!
//! Background work (simulated uploads, simulated OAuth, video generation)
//! never touches the draft directly. It reports through an [`EventBus`] and
//! the composer session applies the events to its own state.
//!
//! The bus uses `tokio::sync::broadcast`, so any number of subscribers can
//! listen (the session itself, a CLI progress printer, tests). Emitting never
//! blocks; events are dropped when nobody listens.
//!
//! # Example
//!
//! ```no_run
//! use libsocialflow::events::{Event, EventBus};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::UploadProgress {
//!     media_id: "abc123".to_string(),
//!     percent: 40,
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Platform, PostStatus};

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Broadcast bus for session events
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus
    ///
    /// `capacity` is the number of events buffered per subscriber before a
    /// lagging subscriber starts missing the oldest ones.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: Event) {
        // send() only fails when there are no receivers
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// What a generation request was for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    Captions,
    Summary,
    Image,
    Video,
}

impl std::fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Captions => write!(f, "captions"),
            Self::Summary => write!(f, "summary"),
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Events emitted during a composing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A simulated upload advanced (100 means finished)
    UploadProgress { media_id: String, percent: u8 },

    /// Simulated OAuth finished and the account is now connected
    AccountConnected { platform: Platform, username: String },

    /// A generation request was issued
    GenerationStarted { kind: GenerationKind, ticket: u64 },

    /// Status line from a long-running video generation
    VideoProgress { ticket: u64, message: String },

    /// A generation request completed
    GenerationFinished {
        kind: GenerationKind,
        ticket: u64,
        /// "applied", "stale" or "failed"
        outcome: String,
    },

    /// A post was handed to a sink
    PostFinalized {
        post_id: String,
        status: PostStatus,
        platforms: Vec<Platform>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_emission_and_subscription() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.emit(Event::UploadProgress {
            media_id: "m1".to_string(),
            percent: 25,
        });

        match receiver.recv().await.unwrap() {
            Event::UploadProgress { media_id, percent } => {
                assert_eq!(media_id, "m1");
                assert_eq!(percent, 25);
            }
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        let event = Event::AccountConnected {
            platform: Platform::Twitter,
            username: "@connected_twitter".to_string(),
        };
        event_bus.emit(event.clone());

        assert_eq!(receiver1.recv().await.unwrap(), event);
        assert_eq!(receiver2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let event_bus = EventBus::new(10);

        // Must not panic or block
        event_bus.emit(Event::GenerationStarted {
            kind: GenerationKind::Image,
            ticket: 1,
        });
        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_pending_generation_is_debuggable() {
        use crate::composer::{Action, ComposerSession};
        use crate::config::SimulationConfig;
        use crate::generation::MockGenerator;
        use crate::queue::PostQueue;
        use crate::scheduling::ScheduleZone;
        use std::sync::Arc;

        let event_bus = EventBus::new(10);
        assert!(format!("{:?}", event_bus).contains("EventBus"));

        let mut session = ComposerSession::new(
            Arc::new(MockGenerator::success()),
            Arc::new(PostQueue::new()),
            event_bus,
            &SimulationConfig::default(),
            ScheduleZone::utc(),
        )
        .unwrap();
        session.dispatch(Action::SetContent("launch".to_string()));
        let pending = session.begin_summary().unwrap();
        assert!(format!("{:?}", pending).contains("PendingGeneration"));
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::PostFinalized {
            post_id: "p1".to_string(),
            status: PostStatus::Scheduled,
            platforms: vec![Platform::LinkedIn],
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"post_finalized""#));
        assert!(json.contains(r#""status":"Scheduled""#));

        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
