use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::CaptureConfig,
    models::{CommentHistory, MAX_SAMPLES},
    settings::SettingsStore,
};

use super::{CaptureDecision, FieldId, Observation, SessionState, TrackerState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

/// Emitted after every history mutation so a host can show feedback.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureEvent {
    Captured {
        index: usize,
        total: usize,
        evicted: bool,
        at: DateTime<Utc>,
    },
    Updated {
        index: usize,
        at: DateTime<Utc>,
    },
    Retracted {
        index: usize,
        total: usize,
        at: DateTime<Utc>,
    },
}

impl CaptureEvent {
    /// Short toast text for the host UI, `None` for silent updates.
    pub fn notification(&self) -> Option<String> {
        match self {
            CaptureEvent::Captured { total, .. } if *total < MAX_SAMPLES => Some(format!(
                "EchoType: Comment captured! ({total}/{MAX_SAMPLES})"
            )),
            CaptureEvent::Captured { total, .. } => {
                Some(format!("EchoType: Comment captured! ({total}) \u{2713}"))
            }
            CaptureEvent::Updated { .. } | CaptureEvent::Retracted { .. } => None,
        }
    }
}

struct PendingCapture {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PendingCapture {
    /// Cancels the timer and waits for the task, so an evaluation that was
    /// already running finishes before the caller moves on.
    async fn stop(self) {
        self.token.cancel();
        if let Err(err) = self.handle.await {
            if err.is_panic() {
                log_error!("Capture task panicked: {err}");
            }
        }
    }
}

/// Owns the typing session and decides when typed text becomes a sample.
///
/// Input arrives through `on_text_changed`, `on_focus_lost` and `on_reset`;
/// evaluation after the quiet period runs on a spawned task that is cancelled
/// whenever a newer event supersedes it.
#[derive(Clone)]
pub struct CaptureController {
    state: Arc<Mutex<TrackerState>>,
    store: Arc<SettingsStore>,
    pending: Arc<Mutex<Option<PendingCapture>>>,
    debounce: Duration,
    events: broadcast::Sender<CaptureEvent>,
}

impl CaptureController {
    pub fn new(store: Arc<SettingsStore>, config: &CaptureConfig) -> Self {
        let history = store.comment_history();
        log_info!("Capture tracker starting with {} stored samples", history.len());
        let (events, _) = broadcast::channel(32);

        Self {
            state: Arc::new(Mutex::new(TrackerState::new(
                history,
                config.exclusion_capacity,
            ))),
            store,
            pending: Arc::new(Mutex::new(None)),
            debounce: config.debounce(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events.subscribe()
    }

    pub async fn history(&self) -> CommentHistory {
        self.state.lock().await.history().clone()
    }

    pub async fn session(&self) -> Option<SessionState> {
        self.state.lock().await.session().cloned()
    }

    pub async fn on_text_changed(&self, field: impl Into<FieldId>, text: &str) {
        let field = field.into();
        let observation = self.state.lock().await.observe(&field, text);

        match observation {
            Observation::Pending { generation } => {
                log_debug!("Field {} changed, capture pending (gen {})", field, generation);
                self.schedule(generation).await;
            }
            Observation::SessionEnded => {
                log_debug!("Field {} emptied, session ended", field);
                self.cancel_pending().await;
            }
        }
    }

    pub async fn on_focus_lost(&self, field: impl Into<FieldId>, text: &str) -> Result<()> {
        let field = field.into();
        let (tracked, decision) = {
            let mut state = self.state.lock().await;
            let tracked = state.is_tracking(&field);
            (tracked, state.focus_lost(&field, text))
        };

        if tracked {
            self.cancel_pending().await;
        }
        match decision {
            Some(decision) => self.apply(decision).await,
            None => Ok(()),
        }
    }

    /// Forgets the session, the in-memory history and the exclusion set.
    /// Stored data is left for the caller to clear.
    pub async fn on_reset(&self) {
        self.cancel_pending().await;
        self.state.lock().await.reset();
        log_info!("Capture session reset");
    }

    /// Picks up a history that was edited directly in the store.
    pub async fn on_history_replaced(&self) {
        self.cancel_pending().await;
        let history = self.store.comment_history();
        log_info!("Reloaded {} stored samples", history.len());
        self.state.lock().await.replace_history(history);
    }

    pub async fn note_inserted_suggestion(&self, text: &str) {
        self.state.lock().await.note_inserted(text);
    }

    async fn schedule(&self, generation: u64) {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.stop().await;
        }

        let token = CancellationToken::new();
        let task_token = token.clone();
        let controller = self.clone();
        let delay = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(delay) => {
                    if let Err(err) = controller.fire(generation).await {
                        log_error!("Failed to persist captured comment: {err:?}");
                    }
                }
                _ = task_token.cancelled() => {}
            }
        });

        *pending = Some(PendingCapture { token, handle });
    }

    async fn cancel_pending(&self) {
        let previous = self.pending.lock().await.take();
        if let Some(previous) = previous {
            previous.stop().await;
        }
    }

    async fn fire(&self, generation: u64) -> Result<()> {
        let decision = self.state.lock().await.fire(generation);
        match decision {
            Some(decision) => self.apply(decision).await,
            None => {
                log_debug!("Dropped stale capture (gen {})", generation);
                Ok(())
            }
        }
    }

    async fn apply(&self, decision: CaptureDecision) -> Result<()> {
        if !decision.mutated_history() {
            if decision == CaptureDecision::Excluded {
                log_debug!("Skipped inserted suggestion");
            }
            return Ok(());
        }

        let history = self.state.lock().await.history().clone();
        let total = history.len();
        self.store.save_capture(history)?;

        let at = Utc::now();
        let event = match decision {
            CaptureDecision::Captured { index, evicted } => {
                log_info!("Captured comment at index {} ({} total)", index, total);
                CaptureEvent::Captured {
                    index,
                    total,
                    evicted,
                    at,
                }
            }
            CaptureDecision::Updated { index } => {
                log_debug!("Updated comment at index {}", index);
                CaptureEvent::Updated { index, at }
            }
            CaptureDecision::Retracted { index } => {
                log_info!("Retracted comment at index {} ({} left)", index, total);
                CaptureEvent::Retracted { index, total, at }
            }
            CaptureDecision::Excluded | CaptureDecision::Ignored => return Ok(()),
        };

        // No subscribers is fine.
        let _ = self.events.send(event);
        Ok(())
    }
}
