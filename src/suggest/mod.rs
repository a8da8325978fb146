//! Comment suggestions from the Gemini generation API.
//!
//! ```text
//! post + style -> prompt.rs -> gemini.rs (HTTP) -> requester.rs -> SuggestionSet
//! ```
//!
//! `requester` owns the contract callers see: a missing API key fails before
//! any network traffic, empty model output is an empty (not failed) result,
//! and every failure is a `SuggestError` the caller shows to the user.

pub mod error;
pub mod gemini;
pub mod prompt;
pub mod requester;

pub use error::{SuggestError, SuggestResult};
pub use gemini::{GeminiClient, TextGenerator};
pub use prompt::StyleSource;
pub use requester::SuggestionRequester;
