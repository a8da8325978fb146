use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::{
    models::{SuggestionSet, MIN_SAMPLES},
    settings::SettingsStore,
};

use super::{
    background::BackgroundRouter,
    protocol::{Request, Response},
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const MISSING_KEY_MESSAGE: &str = "Please set your API key in EchoType extension";
pub const RELOAD_MESSAGE: &str =
    "EchoType was reloaded or updated. Please reload the page to keep using it.";
const UNKNOWN_ERROR: &str = "Unknown error occurred";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChannelError {
    /// The background context went away, typically after an extension reload.
    #[error("Extension context invalidated")]
    ContextInvalidated,
    #[error("Message channel failed: {0}")]
    Failed(String),
}

/// Request/response link from a page context to the background context.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, ChannelError>;
}

/// In-process channel straight into a `BackgroundRouter`.
pub struct LocalChannel {
    router: BackgroundRouter,
    open: AtomicBool,
}

impl LocalChannel {
    pub fn new(router: BackgroundRouter) -> Self {
        Self {
            router,
            open: AtomicBool::new(true),
        }
    }

    /// Simulates the background context being torn down.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageChannel for LocalChannel {
    async fn send(&self, request: Request) -> Result<Response, ChannelError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(ChannelError::ContextInvalidated);
        }
        Ok(self.router.handle(request).await)
    }
}

/// What the page should render after a comment field gains focus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuggestionOutcome {
    Ready { suggestions: SuggestionSet },
    /// The request worked but produced nothing to show.
    Empty,
    MissingApiKey { message: String },
    NeedsMoreSamples { have: usize, message: String },
    Failed { error: String },
    NeedsReload { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrectionOutcome {
    Corrected { comment: String },
    Failed { error: String },
    NeedsReload { message: String },
}

/// Page-side logic that runs when the user focuses a comment field.
pub struct ContentFlow {
    store: Arc<SettingsStore>,
    channel: Arc<dyn MessageChannel>,
}

impl ContentFlow {
    pub fn new(store: Arc<SettingsStore>, channel: Arc<dyn MessageChannel>) -> Self {
        Self { store, channel }
    }

    pub async fn on_field_focused(&self, post_context: &str) -> SuggestionOutcome {
        if self.store.api_key().is_none() {
            return SuggestionOutcome::MissingApiKey {
                message: MISSING_KEY_MESSAGE.to_string(),
            };
        }

        let history = self.store.comment_history();
        if history.len() < MIN_SAMPLES {
            return SuggestionOutcome::NeedsMoreSamples {
                have: history.len(),
                message: format!(
                    "EchoType needs {MIN_SAMPLES}+ sample comments to generate suggestions"
                ),
            };
        }

        let request = Request::generate_from_samples(post_context, history.into());
        let response = match self.channel.send(request).await {
            Ok(response) => response,
            Err(ChannelError::ContextInvalidated) => {
                log_warn!("Background context is gone; asking for a page reload");
                return SuggestionOutcome::NeedsReload {
                    message: RELOAD_MESSAGE.to_string(),
                };
            }
            Err(err) => {
                return SuggestionOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };

        match response {
            Response {
                success: true,
                comments: Some(comments),
                ..
            } => {
                let suggestions = SuggestionSet::from_candidates(comments);
                if suggestions.is_empty() {
                    SuggestionOutcome::Empty
                } else {
                    log_info!("Showing {} suggestions", suggestions.len());
                    SuggestionOutcome::Ready { suggestions }
                }
            }
            Response { error, .. } => SuggestionOutcome::Failed {
                error: error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            },
        }
    }

    pub async fn correct_comment(&self, comment: &str) -> CorrectionOutcome {
        let request = Request::CorrectGrammar {
            comment: comment.to_string(),
        };
        match self.channel.send(request).await {
            Ok(Response {
                success: true,
                corrected_comment: Some(comment),
                ..
            }) => CorrectionOutcome::Corrected { comment },
            Ok(Response { error, .. }) => CorrectionOutcome::Failed {
                error: error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            },
            Err(ChannelError::ContextInvalidated) => CorrectionOutcome::NeedsReload {
                message: RELOAD_MESSAGE.to_string(),
            },
            Err(err) => CorrectionOutcome::Failed {
                error: err.to_string(),
            },
        }
    }
}

/// Context line sent as the post text, e.g. `Ada posted: "We shipped!"`.
/// `None` when there is no post text to respond to.
pub fn format_post_context(author: Option<&str>, text: Option<&str>) -> Option<String> {
    let text = text.map(str::trim).filter(|text| !text.is_empty())?;
    let author = author
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .unwrap_or("Someone");
    Some(format!("{author} posted: \"{text}\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::requester::tests::FakeGenerator;
    use crate::suggest::SuggestionRequester;

    fn store_with(key: Option<&str>, samples: &[&str]) -> Arc<SettingsStore> {
        let store = Arc::new(SettingsStore::in_memory());
        if let Some(key) = key {
            store.set_api_key(key).unwrap();
        }
        if !samples.is_empty() {
            store
                .save_manual_comments(samples.iter().map(|s| s.to_string()).collect())
                .unwrap();
        }
        store
    }

    fn flow(store: Arc<SettingsStore>, reply: Option<&str>) -> (ContentFlow, Arc<LocalChannel>) {
        let fake = FakeGenerator::replying(Ok(reply.map(str::to_string)));
        let router = BackgroundRouter::new(store.clone(), SuggestionRequester::new(fake));
        let channel = Arc::new(LocalChannel::new(router));
        (ContentFlow::new(store, channel.clone()), channel)
    }

    const SAMPLES: [&str; 3] = ["love this", "so cool to see", "great work team"];

    #[tokio::test]
    async fn gates_on_key_then_sample_count() {
        let (content, _) = flow(store_with(None, &SAMPLES), Some("hi"));
        assert!(matches!(
            content.on_field_focused("post").await,
            SuggestionOutcome::MissingApiKey { .. }
        ));

        let (content, _) = flow(store_with(Some("key"), &[]), Some("hi"));
        assert!(matches!(
            content.on_field_focused("post").await,
            SuggestionOutcome::NeedsMoreSamples { have: 0, .. }
        ));
    }

    #[tokio::test]
    async fn ready_and_empty_are_distinct() {
        let (content, _) = flow(store_with(Some("key"), &SAMPLES), Some("Nice!\nWell done"));
        match content.on_field_focused("post").await {
            SuggestionOutcome::Ready { suggestions } => {
                assert_eq!(suggestions.as_slice(), &["Nice!", "Well done"]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        let (content, _) = flow(store_with(Some("key"), &SAMPLES), Some("\n\n"));
        assert_eq!(content.on_field_focused("post").await, SuggestionOutcome::Empty);
    }

    #[tokio::test]
    async fn invalidated_context_asks_for_reload() {
        let (content, channel) = flow(store_with(Some("key"), &SAMPLES), Some("hi"));
        channel.close();

        assert_eq!(
            content.on_field_focused("post").await,
            SuggestionOutcome::NeedsReload {
                message: RELOAD_MESSAGE.to_string()
            }
        );
        assert!(matches!(
            content.correct_comment("x").await,
            CorrectionOutcome::NeedsReload { .. }
        ));
    }

    #[tokio::test]
    async fn correction_round_trip() {
        let (content, _) = flow(store_with(Some("key"), &[]), Some(" This is fine. "));
        assert_eq!(
            content.correct_comment("this are fine").await,
            CorrectionOutcome::Corrected {
                comment: "This is fine.".into()
            }
        );
    }

    #[test]
    fn post_context_defaults_author() {
        assert_eq!(
            format_post_context(None, Some("  We shipped!  ")).as_deref(),
            Some("Someone posted: \"We shipped!\"")
        );
        assert_eq!(
            format_post_context(Some("Ada"), Some("Hello")).as_deref(),
            Some("Ada posted: \"Hello\"")
        );
        assert_eq!(format_post_context(Some("Ada"), Some("   ")), None);
    }
}
