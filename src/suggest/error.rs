use thiserror::Error;

/// Failures of a suggestion or correction request. Every variant is
/// terminal for the user action that triggered it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SuggestError {
    #[error("Please set your Gemini API key in the extension settings")]
    MissingApiKey,

    #[error("API Error: {message}")]
    Api { status: Option<u16>, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("No correction received")]
    NoCorrection,
}

impl SuggestError {
    /// Whether trying again later could succeed. Callers still never retry
    /// on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SuggestError::Timeout { .. } | SuggestError::Transport(_))
    }
}

pub type SuggestResult<T> = Result<T, SuggestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            SuggestError::Api {
                status: Some(400),
                message: "API key not valid".into()
            }
            .to_string(),
            "API Error: API key not valid"
        );
        assert_eq!(SuggestError::NoCorrection.to_string(), "No correction received");
    }

    #[test]
    fn only_timeouts_and_transport_are_retryable() {
        assert!(SuggestError::Timeout { seconds: 20 }.is_retryable());
        assert!(SuggestError::Transport("reset".into()).is_retryable());
        assert!(!SuggestError::MissingApiKey.is_retryable());
        assert!(!SuggestError::NoCorrection.is_retryable());
    }
}
