use std::sync::Arc;

use crate::models::SuggestionSet;

use super::{
    error::{SuggestError, SuggestResult},
    gemini::TextGenerator,
    prompt::{self, StyleSource},
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Builds prompts, calls the generator, and shapes the result.
#[derive(Clone)]
pub struct SuggestionRequester {
    generator: Arc<dyn TextGenerator>,
}

impl SuggestionRequester {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// An empty set is a successful answer with nothing usable in it.
    pub async fn generate_comments(
        &self,
        api_key: Option<&str>,
        post: &str,
        style: &StyleSource,
    ) -> SuggestResult<SuggestionSet> {
        let api_key = require_key(api_key)?;
        let prompt = prompt::comments_prompt(post, style);

        let text = self.generator.generate(api_key, &prompt).await?;
        let suggestions = text
            .as_deref()
            .map(SuggestionSet::from_model_text)
            .unwrap_or_default();

        if suggestions.is_empty() {
            log_warn!("Generation returned no usable comments");
        } else {
            log_info!("Generated {} comment suggestions", suggestions.len());
        }
        Ok(suggestions)
    }

    pub async fn correct_grammar(
        &self,
        api_key: Option<&str>,
        comment: &str,
    ) -> SuggestResult<String> {
        let api_key = require_key(api_key)?;
        let prompt = prompt::grammar_prompt(comment);

        let corrected = self
            .generator
            .generate(api_key, &prompt)
            .await?
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(SuggestError::NoCorrection)?;
        Ok(corrected)
    }
}

fn require_key(api_key: Option<&str>) -> SuggestResult<&str> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(SuggestError::MissingApiKey)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted generator that records the prompts it receives.
    pub(crate) struct FakeGenerator {
        reply: SuggestResult<Option<String>>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        pub(crate) fn replying(reply: SuggestResult<Option<String>>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _api_key: &str, prompt: &str) -> SuggestResult<Option<String>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn samples() -> StyleSource {
        StyleSource::Samples(vec!["love this".into(), "so cool".into(), "nice one".into()])
    }

    #[tokio::test]
    async fn missing_key_short_circuits_without_calling_out() {
        let fake = FakeGenerator::replying(Ok(Some("unused".into())));
        let requester = SuggestionRequester::new(fake.clone());

        let err = requester
            .generate_comments(None, "post", &samples())
            .await
            .unwrap_err();
        assert_eq!(err, SuggestError::MissingApiKey);

        let err = requester.correct_grammar(Some("  "), "text").await.unwrap_err();
        assert_eq!(err, SuggestError::MissingApiKey);
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn splits_model_text_into_candidates() {
        let fake = FakeGenerator::replying(Ok(Some(
            "Huge congrats!\n\nThis is so cool\nLove the energy here\n".into(),
        )));
        let requester = SuggestionRequester::new(fake.clone());

        let set = requester
            .generate_comments(Some("key"), "We launched", &samples())
            .await
            .unwrap();
        assert_eq!(
            set.as_slice(),
            &["Huge congrats!", "This is so cool", "Love the energy here"]
        );

        let prompts = fake.prompts.lock().unwrap();
        assert!(prompts[0].contains("1. \"love this\""));
        assert!(prompts[0].contains("\"We launched\""));
    }

    #[tokio::test]
    async fn absent_text_is_an_empty_success() {
        let requester = SuggestionRequester::new(FakeGenerator::replying(Ok(None)));
        let set = requester
            .generate_comments(Some("key"), "post", &StyleSource::Tone("balanced".into()))
            .await
            .unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn grammar_needs_non_empty_text() {
        let requester = SuggestionRequester::new(FakeGenerator::replying(Ok(Some(
            "  This is good.  ".into(),
        ))));
        assert_eq!(
            requester.correct_grammar(Some("key"), "this are good").await,
            Ok("This is good.".to_string())
        );

        let requester = SuggestionRequester::new(FakeGenerator::replying(Ok(Some("  ".into()))));
        assert_eq!(
            requester.correct_grammar(Some("key"), "x").await,
            Err(SuggestError::NoCorrection)
        );
    }

    #[tokio::test]
    async fn upstream_errors_pass_through() {
        let requester = SuggestionRequester::new(FakeGenerator::replying(Err(
            SuggestError::Timeout { seconds: 20 },
        )));
        let err = requester
            .generate_comments(Some("key"), "post", &samples())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
