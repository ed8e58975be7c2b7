//! Slang interpretation for lyrics and other informal text
//!
//! The crate turns a line such as "that drip is bussin no cap" into a plain
//! one-sentence reading. Candidate phrases are enumerated from the text, a
//! language model picks the slang among them, a crowd-sourced dictionary
//! defines each pick, and the model writes the interpretation.
//!
//! # Workflow Example
//!
//! ```ignore
//! use slang_interpreter::{InterpreterConfig, TextInterpreter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Fails here, at startup, when CLAUDE_API_KEY is missing
//!     let config = InterpreterConfig::from_env()?;
//!     let interpreter = TextInterpreter::from_config(config)?;
//!
//!     let result = interpreter.process("that's fire no cap").await?;
//!     println!("Original: {}", result.original_text);
//!     println!("Interpretation: {}", result.interpretation);
//!     Ok(())
//! }
//! ```

pub mod anthropic;
pub mod candidates;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod language_model;
pub mod literal;
pub mod mock;
pub mod pipeline;
pub mod profanity;
pub mod selection;
pub mod synthesis;


// Re-export main types for convenient access
pub use anthropic::AnthropicProvider;
pub use candidates::CandidateGenerator;
pub use config::{CandidateLimits, InterpreterConfig};
pub use dictionary::{
    Definition, DictionaryLookup, NO_DEFINITION, TermDefinitions, UrbanDictionaryClient,
    lookup_many,
};
pub use error::{InterpretError, InterpretResult};
pub use language_model::{CompletionRequest, LanguageModel};
pub use literal::{ParseMode, ParsedTerms, parse_term_list, render_list};
pub use mock::{MockDictionary, MockLanguageModel, MockMode};
pub use pipeline::{InterpretationResult, TextInterpreter};
pub use profanity::{ProfanityFilter, WordListFilter};
pub use selection::SlangSelector;
pub use synthesis::InterpretationSynthesizer;
