use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::suggest::StyleSource;
use crate::tone::ToneLabel;

/// Messages sent from a page context to the background context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    GenerateComments {
        post: String,
        #[serde(
            rename = "previousComments",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        previous_comments: Option<Vec<String>>,
        /// Older shape; ignored when `previousComments` is present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tone: Option<String>,
    },
    CorrectGrammar {
        comment: String,
    },
    ClearSession,
}

impl Request {
    pub fn generate_from_samples(post: impl Into<String>, samples: Vec<String>) -> Self {
        Request::GenerateComments {
            post: post.into(),
            previous_comments: Some(samples),
            tone: None,
        }
    }

    pub fn generate_from_tone(post: impl Into<String>, tone: impl Into<String>) -> Self {
        Request::GenerateComments {
            post: post.into(),
            previous_comments: None,
            tone: Some(tone.into()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::GenerateComments { .. } => "generate_comments",
            Request::CorrectGrammar { .. } => "correct_grammar",
            Request::ClearSession => "clear_session",
        }
    }
}

/// Style carried by a generate request. Samples win over a tone; a request
/// with neither falls back to the balanced tone.
pub fn style_of(previous_comments: Option<&[String]>, tone: Option<&str>) -> StyleSource {
    match (previous_comments, tone) {
        (Some(samples), _) => StyleSource::Samples(samples.to_vec()),
        (None, Some(tone)) => StyleSource::Tone(tone.to_string()),
        (None, None) => StyleSource::Tone(ToneLabel::Balanced.as_str().to_string()),
    }
}

/// Reply to a `Request`. Exactly one payload field is set on success;
/// `error` is set on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn comments(comments: Vec<String>) -> Self {
        Self {
            success: true,
            comments: Some(comments),
            ..Self::default()
        }
    }

    pub fn corrected(comment: String) -> Self {
        Self {
            success: true,
            corrected_comment: Some(comment),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}
