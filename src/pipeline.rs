//! End-to-end interpretation
//!
//! [`TextInterpreter::process`] runs the stages strictly in sequence:
//!
//! 1. censor profanity
//! 2. generate phrase candidates from the censored text
//! 3. let the language model pick the slang among them
//! 4. look up each picked term in the dictionary
//! 5. ask the language model for a one-sentence interpretation
//!
//! The result echoes the caller's original, uncensored text. Any failing stage
//! aborts the run and the error carries the input that was being processed.

use crate::anthropic::AnthropicProvider;
use crate::candidates::CandidateGenerator;
use crate::config::InterpreterConfig;
use crate::dictionary::{DictionaryLookup, UrbanDictionaryClient, lookup_many};
use crate::error::InterpretResult;
use crate::language_model::LanguageModel;
use crate::profanity::{ProfanityFilter, WordListFilter};
use crate::selection::SlangSelector;
use crate::synthesis::InterpretationSynthesizer;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpretationResult {
    pub original_text: String,
    pub interpretation: String,
}

#[derive(Clone)]
pub struct TextInterpreter {
    config: InterpreterConfig,
    generator: CandidateGenerator,
    filter: Arc<dyn ProfanityFilter>,
    model: Arc<dyn LanguageModel>,
    dictionary: Arc<dyn DictionaryLookup>,
}

impl TextInterpreter {
    /// Assemble a pipeline from explicit collaborators
    ///
    /// The credential is not required here since the collaborators may not
    /// need one; every other configuration value is validated.
    pub fn new(
        config: InterpreterConfig,
        filter: Arc<dyn ProfanityFilter>,
        model: Arc<dyn LanguageModel>,
        dictionary: Arc<dyn DictionaryLookup>,
    ) -> InterpretResult<Self> {
        config.validate()?;
        Ok(Self {
            generator: CandidateGenerator::new(config.candidates),
            config,
            filter,
            model,
            dictionary,
        })
    }

    /// Anthropic, Urban Dictionary and the default word list
    pub fn from_config(config: InterpreterConfig) -> InterpretResult<Self> {
        config.require_credential()?;
        let model = AnthropicProvider::new(&config)?;
        let dictionary = UrbanDictionaryClient::new(&config)?;
        let filter = WordListFilter::with_default_words()?;
        Self::new(
            config,
            Arc::new(filter),
            Arc::new(model),
            Arc::new(dictionary),
        )
    }

    /// Interpret one piece of text
    ///
    /// # Returns
    ///
    /// * `Ok(InterpretationResult)` - The original text and its interpretation
    /// * `Err(InterpretError::Pipeline)` - Wrapping the first failure, with `text` attached
    pub async fn process(&self, text: &str) -> InterpretResult<InterpretationResult> {
        self.run(text).await.map_err(|e| e.for_input(text))
    }

    async fn run(&self, text: &str) -> InterpretResult<InterpretationResult> {
        let filtered = self.filter.censor(text);

        let candidates = self.generator.generate(&filtered);
        info!(candidates = candidates.len(), "Generated phrase candidates");

        let slang_terms = SlangSelector::new(self.model.as_ref(), self.config.selection_max_tokens)
            .with_temperature(self.config.temperature)
            .select(&candidates)
            .await?;
        info!(terms = ?slang_terms, "Model selected slang terms");

        let definitions = lookup_many(self.dictionary.as_ref(), &slang_terms).await?;
        info!(
            defined = definitions.len() - definitions.undefined_terms().count(),
            undefined = definitions.undefined_terms().count(),
            "Fetched definitions"
        );

        let interpretation =
            InterpretationSynthesizer::new(self.model.as_ref(), self.config.synthesis_max_tokens)
                .with_temperature(self.config.temperature)
                .synthesize(&filtered, &definitions)
                .await?;

        Ok(InterpretationResult {
            original_text: text.to_string(),
            interpretation,
        })
    }
}

impl std::fmt::Debug for TextInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextInterpreter")
            .field("config", &self.config)
            .field("model", &self.model.provider_name())
            .field("dictionary", &self.dictionary.provider_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CandidateLimits;
    use crate::error::InterpretError;
    use crate::mock::{MockDictionary, MockLanguageModel, MockMode};

    fn interpreter(model: Arc<MockLanguageModel>, dictionary: MockDictionary) -> TextInterpreter {
        TextInterpreter::new(
            InterpreterConfig::default(),
            Arc::new(WordListFilter::with_default_words().unwrap()),
            model,
            Arc::new(dictionary),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = InterpreterConfig::default().with_candidate_limits(CandidateLimits {
            max_window: 0,
            whole_text_max_words: 5,
        });
        let result = TextInterpreter::new(
            config,
            Arc::new(WordListFilter::with_default_words().unwrap()),
            Arc::new(MockLanguageModel::new(MockMode::Echo)),
            Arc::new(MockDictionary::new()),
        );
        assert!(matches!(result, Err(InterpretError::Config(_))));
    }

    #[test]
    fn test_from_config_requires_credential() {
        let result = TextInterpreter::from_config(InterpreterConfig::default());
        assert!(matches!(result, Err(InterpretError::Config(_))));
    }

    #[tokio::test]
    async fn test_process_straight_line() {
        let model = Arc::new(MockLanguageModel::new(MockMode::Script(vec![
            "[\"that's fire\"]".to_string(),
            "That is really great.".to_string(),
        ])));
        let dictionary = MockDictionary::new().with_definition("that's fire", "that's excellent");

        let result = interpreter(model.clone(), dictionary)
            .process("that's fire")
            .await
            .unwrap();
        assert_eq!(
            result,
            InterpretationResult {
                original_text: "that's fire".to_string(),
                interpretation: "That is really great.".to_string(),
            }
        );
        assert_eq!(model.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_carries_input() {
        let model = Arc::new(MockLanguageModel::new(MockMode::Error("down".to_string())));
        let result = interpreter(model, MockDictionary::new())
            .process("no cap")
            .await;
        match result {
            Err(InterpretError::Pipeline { input, source }) => {
                assert_eq!(input, "no cap");
                assert!(matches!(*source, InterpretError::Model(_)));
            }
            other => panic!("Expected Pipeline error, got {:?}", other),
        }
    }
}
