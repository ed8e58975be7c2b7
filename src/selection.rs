//! Slang selection
//!
//! The ranked candidate list is shown to the language model, which removes
//! every word it knows to be ordinary. What comes back is parsed with
//! [`parse_term_list`](crate::literal::parse_term_list); malformed replies
//! degrade to a best-effort list instead of failing.

use crate::error::InterpretResult;
use crate::language_model::{CompletionRequest, LanguageModel};
use crate::literal::{ParseMode, parse_term_list, render_list};
use tracing::{debug, warn};

pub const SELECTION_SYSTEM_PROMPT: &str = "You are an expert in identifying slang terms and phrases in text. \
Given the following list of words and phrases, identify which ones are slang or have idiomatic meanings. \
Consider both individual words and multi-word expressions, prioritizing longer phrases that might have unique meanings. \
Respond with only a list of strings containing the identified slang terms and phrases.";

/// Build the user message embedding the candidate list
pub fn selection_message(candidates: &[String]) -> String {
    format!(
        "If you know what a word means AND it is not slang, remove it from the list: {}. \
IMPORTANT: Return only a list of strings containing the identified slang and unknown terms and phrases.",
        render_list(candidates)
    )
}

pub struct SlangSelector<'a> {
    model: &'a dyn LanguageModel,
    max_tokens: u32,
    temperature: f32,
}

impl<'a> SlangSelector<'a> {
    pub fn new(model: &'a dyn LanguageModel, max_tokens: u32) -> Self {
        Self {
            model,
            max_tokens,
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask the model which candidates are slang
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - Terms in the order the model listed them
    /// * `Err(InterpretError)` - If the model call itself failed
    pub async fn select(&self, candidates: &[String]) -> InterpretResult<Vec<String>> {
        let request = CompletionRequest::new(
            SELECTION_SYSTEM_PROMPT,
            selection_message(candidates),
            self.max_tokens,
        )
        .with_temperature(self.temperature);

        let raw = self.model.complete(&request).await?;
        let parsed = parse_term_list(&raw);

        if parsed.mode == ParseMode::Fallback {
            warn!(
                provider = self.model.provider_name(),
                "Slang list did not match the expected literal, using best-effort split"
            );
        }
        debug!(
            candidates = candidates.len(),
            selected = parsed.terms.len(),
            "Selected slang terms"
        );

        Ok(parsed.terms)
    }
}
