use serde::{Deserialize, Serialize};
use std::fmt;

const CASUAL_KEYWORDS: [&str; 5] = ["awesome", "cool", "great", "love", "amazing"];
const PROFESSIONAL_KEYWORDS: [&str; 5] = [
    "pleased",
    "excellent",
    "appreciate",
    "congratulations",
    "insights",
];

/// Coarse style signature derived from the comment history.
///
/// The serialized form is the phrase that gets embedded in prompts and
/// stored under `toneProfile`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToneLabel {
    #[serde(rename = "casual and friendly")]
    Casual,
    #[serde(rename = "professional and formal")]
    Professional,
    #[serde(rename = "balanced and approachable")]
    Balanced,
}

impl ToneLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToneLabel::Casual => "casual and friendly",
            ToneLabel::Professional => "professional and formal",
            ToneLabel::Balanced => "balanced and approachable",
        }
    }
}

impl fmt::Display for ToneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword hits per list. A keyword counts once per sample it appears in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToneCounts {
    pub casual: usize,
    pub professional: usize,
}

impl ToneCounts {
    pub fn label(&self) -> ToneLabel {
        if self.casual > self.professional {
            ToneLabel::Casual
        } else if self.professional > self.casual {
            ToneLabel::Professional
        } else {
            ToneLabel::Balanced
        }
    }
}

/// Substring matching, not word matching: "coolest" hits "cool".
pub fn count_keywords<S: AsRef<str>>(samples: &[S]) -> ToneCounts {
    samples.iter().fold(ToneCounts::default(), |mut counts, sample| {
        let lowered = sample.as_ref().to_lowercase();
        counts.casual += hits(&lowered, &CASUAL_KEYWORDS);
        counts.professional += hits(&lowered, &PROFESSIONAL_KEYWORDS);
        counts
    })
}

pub fn classify<S: AsRef<str>>(samples: &[S]) -> ToneLabel {
    count_keywords(samples).label()
}

fn hits(text: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|keyword| text.contains(*keyword))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casual_samples_classify_as_casual() {
        let samples = ["this is awesome work", "really cool insight", "love this"];
        let counts = count_keywords(&samples);
        assert_eq!(counts, ToneCounts { casual: 3, professional: 0 });
        assert_eq!(classify(&samples), ToneLabel::Casual);
    }

    #[test]
    fn professional_samples_classify_as_professional() {
        let samples = [
            "I appreciate these excellent insights",
            "congratulations on this achievement",
        ];
        assert_eq!(classify(&samples), ToneLabel::Professional);
    }

    #[test]
    fn ties_and_empty_input_are_balanced() {
        let empty: [&str; 0] = [];
        assert_eq!(classify(&empty), ToneLabel::Balanced);
        assert_eq!(classify(&["no keywords in here at all"]), ToneLabel::Balanced);
        assert_eq!(
            classify(&["great result", "excellent result"]),
            ToneLabel::Balanced
        );
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let counts = count_keywords(&["The COOLEST thing, Greatly done"]);
        assert_eq!(counts.casual, 2);

        // Repeats within one sample count once.
        let counts = count_keywords(&["love love love"]);
        assert_eq!(counts.casual, 1);
    }

    #[test]
    fn classification_is_repeatable() {
        let samples = vec!["amazing stuff".to_string(), "pleased to see".to_string()];
        assert_eq!(classify(&samples), classify(&samples));
    }

    #[test]
    fn labels_serialize_as_prompt_phrases() {
        let json = serde_json::to_string(&ToneLabel::Casual).unwrap();
        assert_eq!(json, r#""casual and friendly""#);
        let parsed: ToneLabel = serde_json::from_str(r#""professional and formal""#).unwrap();
        assert_eq!(parsed, ToneLabel::Professional);
    }
}
