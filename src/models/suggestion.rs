use serde::{Deserialize, Serialize};

/// Upper bound on candidates kept from a single generation.
pub const MAX_SUGGESTIONS: usize = 3;

/// Candidate comments produced for one post. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionSet {
    candidates: Vec<String>,
}

impl SuggestionSet {
    /// Splits raw model output on line breaks, dropping blank lines.
    pub fn from_model_text(text: &str) -> Self {
        Self::from_candidates(text.lines().map(str::to_string))
    }

    pub fn from_candidates<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let candidates = candidates
            .into_iter()
            .map(|candidate| candidate.trim().to_string())
            .filter(|candidate| !candidate.is_empty())
            .take(MAX_SUGGESTIONS)
            .collect();
        Self { candidates }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.candidates
    }

    pub fn into_vec(self) -> Vec<String> {
        self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_and_caps_at_three() {
        let set = SuggestionSet::from_model_text(
            "Great point!\n\n  Totally agree here  \nLove this\nOne more line\n",
        );
        assert_eq!(
            set.as_slice(),
            &["Great point!", "Totally agree here", "Love this"]
        );
    }

    #[test]
    fn blank_output_is_empty_set() {
        assert!(SuggestionSet::from_model_text("\n \n").is_empty());
    }
}
