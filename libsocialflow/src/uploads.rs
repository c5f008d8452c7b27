//! Simulated media uploads
//!
//! Each upload is a tokio task that advances a percentage by a random step
//! every tick until it saturates at 100, reporting through the
//! [`EventBus`]. Uploads are cancellable: dropping the simulator, cancelling
//! an id, or starting a new upload for the same id aborts the old task.

use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::SimulationConfig;
use crate::events::{Event, EventBus};
use crate::Result;

/// Handle to one running upload; aborts the task when dropped
#[derive(Debug)]
pub struct UploadHandle {
    media_id: String,
    task: JoinHandle<()>,
}

impl UploadHandle {
    pub fn media_id(&self) -> &str {
        &self.media_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for UploadHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Runs simulated uploads for a session
pub struct UploadSimulator {
    events: EventBus,
    tick: Duration,
    max_step: u8,
    active: HashMap<String, UploadHandle>,
}

impl UploadSimulator {
    /// Create a simulator advancing by `0..=max_step` percent every `tick`
    pub fn new(events: EventBus, tick: Duration, max_step: u8) -> Self {
        Self {
            events,
            tick,
            max_step: max_step.max(1),
            active: HashMap::new(),
        }
    }

    pub fn from_config(events: EventBus, config: &SimulationConfig) -> Result<Self> {
        Ok(Self::new(events, config.upload_tick()?, config.upload_max_step))
    }

    /// Start uploading a media item
    ///
    /// An upload already running for the same id is superseded.
    pub fn start(&mut self, media_id: &str) {
        self.reap();
        if self.active.remove(media_id).is_some() {
            debug!(media_id, "Superseding running upload");
        }

        let events = self.events.clone();
        let tick = self.tick;
        let max_step = self.max_step;
        let id = media_id.to_string();
        let task = tokio::spawn(async move {
            let mut progress: u8 = 0;
            loop {
                tokio::time::sleep(tick).await;
                let step = rand::thread_rng().gen_range(0..=max_step);
                progress = progress.saturating_add(step).min(100);
                trace!(media_id = %id, progress, "Upload tick");
                events.emit(Event::UploadProgress {
                    media_id: id.clone(),
                    percent: progress,
                });
                if progress >= 100 {
                    break;
                }
            }
        });

        debug!(media_id, "Started upload");
        self.active.insert(
            media_id.to_string(),
            UploadHandle {
                media_id: media_id.to_string(),
                task,
            },
        );
    }

    /// Cancel a running upload; returns true if one was running
    pub fn cancel(&mut self, media_id: &str) -> bool {
        match self.active.remove(media_id) {
            Some(handle) => {
                let running = !handle.is_finished();
                handle.cancel();
                running
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        let count = self.active.len();
        self.active.clear();
        if count > 0 {
            debug!(count, "Cancelled uploads");
        }
    }

    /// Number of uploads still running
    pub fn in_flight(&mut self) -> usize {
        self.reap();
        self.active.len()
    }

    fn reap(&mut self) {
        self.active.retain(|_, handle| !handle.is_finished());
    }
}
