use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GenerationConfig;

use super::error::{SuggestError, SuggestResult};

/// Anything that turns a prompt into model text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// `Ok(None)` means the call succeeded but carried no candidate text.
    async fn generate(&self, api_key: &str, prompt: &str) -> SuggestResult<Option<String>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationParams,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    config: GenerationConfig,
}

impl GeminiClient {
    pub fn new(config: GenerationConfig) -> SuggestResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SuggestError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn map_transport(&self, err: reqwest::Error) -> SuggestError {
        if err.is_timeout() {
            SuggestError::Timeout {
                seconds: self.config.timeout_secs,
            }
        } else {
            SuggestError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> SuggestResult<Option<String>> {
        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationParams {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.url())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        debug!("Gemini responded with status {}", status);
        let raw = response.text().await.map_err(|e| self.map_transport(e))?;

        let parsed: Option<GenerateResponse> = serde_json::from_str(&raw).ok();
        if let Some(error) = parsed.as_ref().and_then(|p| p.error.as_ref()) {
            warn!("Gemini returned an error object (status {})", status);
            return Err(SuggestError::Api {
                status: Some(status.as_u16()),
                message: error_message(error),
            });
        }
        if !status.is_success() {
            return Err(SuggestError::Api {
                status: Some(status.as_u16()),
                message: if raw.trim().is_empty() {
                    status.to_string()
                } else {
                    raw
                },
            });
        }

        Ok(parsed.and_then(GenerateResponse::first_text))
    }
}

/// `message`, then `details`, then the whole object.
fn error_message(error: &Value) -> String {
    if let Some(message) = error.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    match error.get("details") {
        Some(Value::String(details)) => details.clone(),
        Some(details) if !details.is_null() => details.to_string(),
        _ => error.to_string(),
    }
}
