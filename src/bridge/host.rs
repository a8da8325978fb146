//! JSON-lines adapter standing in for the browser platform.
//!
//! Each input line is one `HostCommand`; each command yields one output
//! line, and capture events are written as they happen.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::broadcast::error::RecvError,
};
use tokio_util::sync::CancellationToken;

use crate::{
    capture::{CaptureController, CaptureEvent, FieldId},
    settings::SettingsStore,
    tone::ToneLabel,
};

use super::{
    background::BackgroundRouter,
    content::{format_post_context, ContentFlow, CorrectionOutcome, SuggestionOutcome},
    protocol::{Request, Response},
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostCommand {
    TextChanged {
        field: FieldId,
        text: String,
    },
    FocusLost {
        field: FieldId,
        text: String,
    },
    /// A comment field gained focus below a post.
    Focused {
        field: FieldId,
        #[serde(default)]
        author: Option<String>,
        #[serde(default)]
        post: Option<String>,
    },
    /// The user picked a suggestion; the host writes it into the field.
    InsertSuggestion {
        field: FieldId,
        text: String,
    },
    CorrectComment {
        comment: String,
    },
    Message {
        request: Request,
    },
    SetApiKey {
        key: String,
    },
    SaveComments {
        comments: Vec<String>,
    },
    EditComment {
        index: usize,
        comment: String,
    },
    DeleteComment {
        index: usize,
    },
    ClearHistory,
    Status,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostOutput {
    Ack,
    Suggestions {
        field: FieldId,
        outcome: SuggestionOutcome,
    },
    /// Focus on a field with no recognisable post.
    NoPost {
        field: FieldId,
    },
    Correction {
        outcome: CorrectionOutcome,
    },
    Response {
        response: Response,
    },
    Capture {
        #[serde(flatten)]
        capture: CaptureEvent,
        #[serde(skip_serializing_if = "Option::is_none")]
        notification: Option<String>,
    },
    Status {
        samples: Vec<String>,
        tone: Option<ToneLabel>,
        has_api_key: bool,
    },
    Error {
        message: String,
    },
}

pub struct Host {
    store: Arc<SettingsStore>,
    capture: CaptureController,
    router: BackgroundRouter,
    content: ContentFlow,
}

impl Host {
    pub fn new(
        store: Arc<SettingsStore>,
        capture: CaptureController,
        router: BackgroundRouter,
        content: ContentFlow,
    ) -> Self {
        Self {
            store,
            capture,
            router,
            content,
        }
    }

    pub async fn dispatch(&self, command: HostCommand) -> HostOutput {
        match self.try_dispatch(command).await {
            Ok(output) => output,
            Err(err) => {
                log_warn!("Host command failed: {err:#}");
                HostOutput::Error {
                    message: format!("{err:#}"),
                }
            }
        }
    }

    async fn try_dispatch(&self, command: HostCommand) -> Result<HostOutput> {
        let output = match command {
            HostCommand::TextChanged { field, text } => {
                self.capture.on_text_changed(field, &text).await;
                HostOutput::Ack
            }
            HostCommand::FocusLost { field, text } => {
                self.capture.on_focus_lost(field, &text).await?;
                HostOutput::Ack
            }
            HostCommand::Focused {
                field,
                author,
                post,
            } => match format_post_context(author.as_deref(), post.as_deref()) {
                Some(context) => HostOutput::Suggestions {
                    outcome: self.content.on_field_focused(&context).await,
                    field,
                },
                None => HostOutput::NoPost { field },
            },
            HostCommand::InsertSuggestion { field, text } => {
                // Register first: writing into the field fires an input event.
                self.capture.note_inserted_suggestion(&text).await;
                self.capture.on_text_changed(field, &text).await;
                HostOutput::Ack
            }
            HostCommand::CorrectComment { comment } => HostOutput::Correction {
                outcome: self.content.correct_comment(&comment).await,
            },
            HostCommand::Message { request } => HostOutput::Response {
                response: self.router.handle(request).await,
            },
            HostCommand::SetApiKey { key } => {
                self.store.set_api_key(&key)?;
                HostOutput::Ack
            }
            HostCommand::SaveComments { comments } => {
                self.store.save_manual_comments(comments)?;
                self.capture.on_history_replaced().await;
                HostOutput::Ack
            }
            HostCommand::EditComment { index, comment } => {
                self.store.edit_comment(index, &comment)?;
                self.capture.on_history_replaced().await;
                HostOutput::Ack
            }
            HostCommand::DeleteComment { index } => {
                self.store.delete_comment(index)?;
                self.capture.on_history_replaced().await;
                HostOutput::Ack
            }
            HostCommand::ClearHistory => {
                self.store.clear_history()?;
                self.router.handle(Request::ClearSession).await;
                HostOutput::Ack
            }
            HostCommand::Status => HostOutput::Status {
                samples: self.store.comment_history().into(),
                tone: self.store.tone_profile(),
                has_api_key: self.store.api_key().is_some(),
            },
        };
        Ok(output)
    }

    /// Reads commands until EOF or `shutdown`, writing one JSON line per
    /// command and per capture event.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W, shutdown: CancellationToken) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut events = self.capture.subscribe();
        log_info!("Host adapter ready");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read host input")? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let output = match serde_json::from_str::<HostCommand>(&line) {
                        Ok(command) => self.dispatch(command).await,
                        Err(err) => HostOutput::Error {
                            message: format!("invalid command: {err}"),
                        },
                    };
                    write_line(&mut writer, &output).await?;
                }
                event = events.recv() => {
                    match event {
                        Ok(capture) => {
                            let notification = capture.notification();
                            write_line(&mut writer, &HostOutput::Capture { capture, notification }).await?;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            log_warn!("Dropped {} capture events", skipped);
                        }
                        Err(RecvError::Closed) => {
                            log_error!("Capture event stream closed");
                            break;
                        }
                    }
                }
                _ = shutdown.cancelled() => {
                    log_info!("Host adapter shutting down");
                    break;
                }
            }
        }

        writer.flush().await.context("failed to flush host output")?;
        Ok(())
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, output: &HostOutput) -> Result<()> {
    let mut line = serde_json::to_vec(output)?;
    line.push(b'\n');
    writer
        .write_all(&line)
        .await
        .context("failed to write host output")?;
    writer.flush().await.context("failed to flush host output")
}
