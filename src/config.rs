//! Runtime configuration
//!
//! Everything the pipeline needs is carried by [`InterpreterConfig`] and handed
//! to constructors explicitly. [`InterpreterConfig::from_env`] is the startup
//! path: it fails immediately when the API credential is absent instead of
//! waiting for the first network call.
//!
//! | Variable | Field |
//! |---|---|
//! | `CLAUDE_API_KEY` (or `ANTHROPIC_API_KEY`) | `api_key` (required) |
//! | `CLAUDE_MODEL` | `model` |
//! | `ANTHROPIC_BASE_URL` | `model_base_url` |
//! | `URBAN_DICTIONARY_URL` | `dictionary_base_url` |
//! | `SLANG_REQUEST_TIMEOUT_SECS` | `request_timeout` |
//! | `SLANG_MAX_WINDOW` | `candidates.max_window` |
//! | `SLANG_WHOLE_TEXT_MAX_WORDS` | `candidates.whole_text_max_words` |

use crate::error::{InterpretError, InterpretResult};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_MODEL_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_DICTIONARY_BASE_URL: &str = "https://api.urbandictionary.com/v0";

/// Heuristic limits for phrase candidate generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateLimits {
    /// Longest word window emitted at each position
    pub max_window: usize,
    /// Inputs with at most this many words are also offered whole
    pub whole_text_max_words: usize,
}

impl Default for CandidateLimits {
    fn default() -> Self {
        Self {
            max_window: 4,
            whole_text_max_words: 5,
        }
    }
}

#[derive(Clone)]
pub struct InterpreterConfig {
    pub api_key: String,
    pub model: String,
    pub model_base_url: String,
    pub dictionary_base_url: String,
    /// Token budget for the slang selection call
    pub selection_max_tokens: u32,
    /// Token budget for the interpretation call
    pub synthesis_max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub candidates: CandidateLimits,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            model_base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            dictionary_base_url: DEFAULT_DICTIONARY_BASE_URL.to_string(),
            selection_max_tokens: 1000,
            synthesis_max_tokens: 2000,
            temperature: 0.0,
            request_timeout: Duration::from_secs(60),
            candidates: CandidateLimits::default(),
        }
    }
}

impl InterpreterConfig {
    /// Load configuration from the process environment
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - A validated configuration with a credential present
    /// * `Err(InterpretError::Config)` - If the credential is missing or a value is invalid
    pub fn from_env() -> InterpretResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub(crate) fn from_lookup<F>(lookup: F) -> InterpretResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.api_key = lookup("CLAUDE_API_KEY")
            .or_else(|| lookup("ANTHROPIC_API_KEY"))
            .ok_or_else(|| {
                InterpretError::Config(
                    "CLAUDE_API_KEY environment variable not set".to_string(),
                )
            })?;

        if let Some(model) = lookup("CLAUDE_MODEL") {
            config.model = model;
        }
        if let Some(url) = lookup("ANTHROPIC_BASE_URL") {
            config.model_base_url = url;
        }
        if let Some(url) = lookup("URBAN_DICTIONARY_URL") {
            config.dictionary_base_url = url;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "SLANG_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(window) = parse_var::<usize>(&lookup, "SLANG_MAX_WINDOW")? {
            config.candidates.max_window = window;
        }
        if let Some(words) = parse_var::<usize>(&lookup, "SLANG_WHOLE_TEXT_MAX_WORDS")? {
            config.candidates.whole_text_max_words = words;
        }

        config.require_credential()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_model_base_url(mut self, url: impl Into<String>) -> Self {
        self.model_base_url = url.into();
        self
    }

    pub fn with_dictionary_base_url(mut self, url: impl Into<String>) -> Self {
        self.dictionary_base_url = url.into();
        self
    }

    pub fn with_candidate_limits(mut self, limits: CandidateLimits) -> Self {
        self.candidates = limits;
        self
    }

    /// Fail unless an API credential is present
    pub fn require_credential(&self) -> InterpretResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(InterpretError::Config("API key cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Check the values that do not depend on the credential
    pub fn validate(&self) -> InterpretResult<()> {
        if self.candidates.max_window == 0 {
            return Err(InterpretError::Config(
                "Candidate window must be at least one word".to_string(),
            ));
        }
        if self.selection_max_tokens == 0 || self.synthesis_max_tokens == 0 {
            return Err(InterpretError::Config(
                "Token budgets must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(InterpretError::Config(format!(
                "Temperature {} is outside 0.0..=1.0",
                self.temperature
            )));
        }
        if self.model.trim().is_empty() {
            return Err(InterpretError::Config("Model name cannot be empty".to_string()));
        }
        for url in [&self.model_base_url, &self.dictionary_base_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(InterpretError::Config(format!(
                    "Base URL must be http(s): {}",
                    url
                )));
            }
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> InterpretResult<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            InterpretError::Config(format!("{} has an invalid value: {}", name, raw))
        }),
    }
}

impl std::fmt::Debug for InterpreterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpreterConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("model_base_url", &self.model_base_url)
            .field("dictionary_base_url", &self.dictionary_base_url)
            .field("selection_max_tokens", &self.selection_max_tokens)
            .field("synthesis_max_tokens", &self.synthesis_max_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout", &self.request_timeout)
            .field("candidates", &self.candidates)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = InterpreterConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.selection_max_tokens, 1000);
        assert_eq!(config.synthesis_max_tokens, 2000);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.candidates, CandidateLimits::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credential_fails_at_startup() {
        let result = InterpreterConfig::from_lookup(lookup_from(&[]));
        match result {
            Err(InterpretError::Config(msg)) => assert!(msg.contains("not set")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_blank_credential_rejected() {
        let result = InterpreterConfig::from_lookup(lookup_from(&[("CLAUDE_API_KEY", "   ")]));
        assert!(matches!(result, Err(InterpretError::Config(_))));
    }

    #[test]
    fn test_anthropic_key_fallback() {
        let config =
            InterpreterConfig::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-ant-1")]))
                .unwrap();
        assert_eq!(config.api_key, "sk-ant-1");
    }

    #[test]
    fn test_overrides() {
        let config = InterpreterConfig::from_lookup(lookup_from(&[
            ("CLAUDE_API_KEY", "key"),
            ("CLAUDE_MODEL", "claude-test"),
            ("URBAN_DICTIONARY_URL", "http://localhost:9000"),
            ("SLANG_MAX_WINDOW", "3"),
            ("SLANG_WHOLE_TEXT_MAX_WORDS", "7"),
            ("SLANG_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.model, "claude-test");
        assert_eq!(config.dictionary_base_url, "http://localhost:9000");
        assert_eq!(config.candidates.max_window, 3);
        assert_eq!(config.candidates.whole_text_max_words, 7);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let result = InterpreterConfig::from_lookup(lookup_from(&[
            ("CLAUDE_API_KEY", "key"),
            ("SLANG_MAX_WINDOW", "four"),
        ]));
        match result {
            Err(InterpretError::Config(msg)) => assert!(msg.contains("SLANG_MAX_WINDOW")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = InterpreterConfig::default().with_candidate_limits(CandidateLimits {
            max_window: 0,
            whole_text_max_words: 5,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_url_rejected() {
        let config = InterpreterConfig::default().with_dictionary_base_url("ftp://example.org");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_masks_key() {
        let config = InterpreterConfig::default().with_api_key("sk-ant-secret");
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("sk-ant-secret"));
    }
}
