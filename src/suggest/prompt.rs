//! Prompt text sent to the generation endpoint.
//!
//! Both builders are deterministic: identical inputs give identical prompts.

use std::fmt::Write;

/// Style signal used to personalise generated comments.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleSource {
    /// The user's own prior comments, enumerated in the prompt.
    Samples(Vec<String>),
    /// A tone phrase such as "casual and friendly". Older request shape.
    Tone(String),
}

pub fn comments_prompt(post: &str, style: &StyleSource) -> String {
    match style {
        StyleSource::Samples(samples) => samples_prompt(post, samples),
        StyleSource::Tone(tone) => tone_prompt(post, tone),
    }
}

fn samples_prompt(post: &str, samples: &[String]) -> String {
    let mut prompt = String::from(
        "Write 3 short, human-sounding LinkedIn comments for the following post.\n\
         The comments should be similar in style, tone, and punctuation as the previous comments made by the user.\n\
         Use these previous comments as a reference for how the user writes:\n",
    );
    for (idx, sample) in samples.iter().enumerate() {
        let _ = writeln!(prompt, "{}. \"{}\"", idx + 1, sample);
    }
    let _ = write!(
        prompt,
        "Ensure that the comments sound like they were written by the user, reflecting their unique style. \
         If the user doesn't use full stops, commas, or other punctuation, then **don't** use them in the new comments either.\n\n\
         Make the comments fit the tone of this post:\n\"{post}\"\n\n\
         Write each comment on a separate line. Make sure to keep the writing natural and conversational, just like the user would write."
    );
    prompt
}

fn tone_prompt(post: &str, tone: &str) -> String {
    format!(
        "Write 3 short, human-sounding LinkedIn comments for the following post. \
         Post: \"{post}\" Tone: \"{tone}\"\n\
         Write each comment on a separate line."
    )
}

pub fn grammar_prompt(comment: &str) -> String {
    format!(
        "Correct the grammar and spelling of the following comment. \
         Keep the author's wording, tone, and style, and change as little as possible. \
         Reply with only the corrected comment.\n\n\"{comment}\""
    )
}
