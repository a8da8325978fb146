pub mod history;
pub mod suggestion;

pub use history::{CommentHistory, PushOutcome, MAX_SAMPLES, MIN_SAMPLES, MIN_WORDS};
pub use suggestion::{SuggestionSet, MAX_SUGGESTIONS};
