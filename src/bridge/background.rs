use std::sync::Arc;

use crate::{capture::CaptureController, settings::SettingsStore, suggest::SuggestionRequester};

use super::protocol::{style_of, Request, Response};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Background-context handler: owns the API key lookup and the outbound
/// generation calls.
#[derive(Clone)]
pub struct BackgroundRouter {
    store: Arc<SettingsStore>,
    requester: SuggestionRequester,
    capture: Option<CaptureController>,
}

impl BackgroundRouter {
    pub fn new(store: Arc<SettingsStore>, requester: SuggestionRequester) -> Self {
        Self {
            store,
            requester,
            capture: None,
        }
    }

    /// Lets `clear_session` reach the page's capture tracker.
    pub fn with_capture(mut self, capture: CaptureController) -> Self {
        self.capture = Some(capture);
        self
    }

    pub async fn handle(&self, request: Request) -> Response {
        log_info!("Received {} request", request.kind());

        match request {
            Request::GenerateComments {
                post,
                previous_comments,
                tone,
            } => {
                let style = style_of(previous_comments.as_deref(), tone.as_deref());
                let api_key = self.store.api_key();
                match self
                    .requester
                    .generate_comments(api_key.as_deref(), &post, &style)
                    .await
                {
                    Ok(suggestions) => Response::comments(suggestions.into_vec()),
                    Err(err) => {
                        log_warn!("Comment generation failed: {err}");
                        Response::failure(err)
                    }
                }
            }
            Request::CorrectGrammar { comment } => {
                let api_key = self.store.api_key();
                match self
                    .requester
                    .correct_grammar(api_key.as_deref(), &comment)
                    .await
                {
                    Ok(corrected) => Response::corrected(corrected),
                    Err(err) => {
                        log_warn!("Grammar correction failed: {err}");
                        Response::failure(err)
                    }
                }
            }
            Request::ClearSession => {
                if let Some(capture) = &self.capture {
                    capture.on_reset().await;
                }
                Response::ok()
            }
        }
    }
}
