//! Interpretation synthesis

use crate::dictionary::TermDefinitions;
use crate::error::InterpretResult;
use crate::language_model::{CompletionRequest, LanguageModel};
use tracing::debug;

pub const SYNTHESIS_SYSTEM_PROMPT: &str = "You are an expert in interpreting text with slang terms. \
Given the original text and a dictionary of slang definitions, provide a clear interpretation of the text. \
The interpretation should be in a casual tone, and only include slang terms that are present in the original text, and not the definitions. \
IMPORTANT: response should be one sentence total.";

pub fn synthesis_message(text: &str, definitions: &TermDefinitions) -> String {
    format!(
        "Interpret this text: {}\n\nSlang definitions: {}",
        text,
        definitions.render()
    )
}

pub struct InterpretationSynthesizer<'a> {
    model: &'a dyn LanguageModel,
    max_tokens: u32,
    temperature: f32,
}

impl<'a> InterpretationSynthesizer<'a> {
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

    /// Ask for a one-sentence reading of `text`; the reply is returned untouched
    pub async fn synthesize(
        &self,
        text: &str,
        definitions: &TermDefinitions,
    ) -> InterpretResult<String> {
        let request = CompletionRequest::new(
            SYNTHESIS_SYSTEM_PROMPT,
            synthesis_message(text, definitions),
            self.max_tokens,
        )
        .with_temperature(self.temperature);

        let interpretation = self.model.complete(&request).await?;
        debug!(
            terms = definitions.len(),
            chars = interpretation.chars().count(),
            "Synthesized interpretation"
        );
        Ok(interpretation)
    }
}
