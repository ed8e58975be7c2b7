//! Language model trait
//!
//! This module defines the `LanguageModel` trait for provider abstraction,
//! so the selection and synthesis stages can run against Anthropic, a mock,
//! or any other completion backend.
//!
//! # Example
//!
//! ```ignore
//! use slang_interpreter::{AnthropicProvider, CompletionRequest, InterpreterConfig, LanguageModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = InterpreterConfig::from_env()?;
//!     let provider = AnthropicProvider::new(&config)?;
//!
//!     let request = CompletionRequest::new("You are terse.", "Define 'bet'.", 100);
//!     let reply = provider.complete(&request).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

use crate::error::InterpretResult;
use async_trait::async_trait;

/// A single system + user message exchange
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Create a request with temperature 0
    pub fn new(
        system_prompt: impl Into<String>,
        user_message: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
            max_tokens,
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Generic trait for text completion providers
///
/// Implementations may stream internally, but `complete` only returns once the
/// whole response text is available.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send one request and return the full response text
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The concatenated response text
    /// * `Err(InterpretError)` - If the provider could not be reached or reported a failure
    async fn complete(&self, request: &CompletionRequest) -> InterpretResult<String>;

    /// Name of this provider, used in logs
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_defaults_to_zero_temperature() {
        let request = CompletionRequest::new("system", "user", 1000);
        assert_eq!(request.system_prompt, "system");
        assert_eq!(request.user_message, "user");
        assert_eq!(request.max_tokens, 1000);
        assert_eq!(request.temperature, 0.0);
    }

    #[test]
    fn test_with_temperature() {
        let request = CompletionRequest::new("s", "u", 10).with_temperature(0.7);
        assert_eq!(request.temperature, 0.7);
    }
}
