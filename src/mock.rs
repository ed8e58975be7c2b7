//! Mock collaborators for testing
//!
//! Deterministic, network-free stand-ins for the language model and the
//! dictionary, used by the test suite and by the CLI's `--mock` mode.
//!
//! # Example
//!
//! ```ignore
//! use slang_interpreter::{CompletionRequest, LanguageModel, MockLanguageModel, MockMode};
//!
//! #[tokio::test]
//! async fn test_completion() {
//!     let mock = MockLanguageModel::new(MockMode::Fixed("['bet']".to_string()));
//!     let reply = mock.complete(&CompletionRequest::new("s", "u", 10)).await.unwrap();
//!     assert_eq!(reply, "['bet']");
//! }
//! ```

use crate::dictionary::{Definition, DictionaryLookup};
use crate::error::{InterpretError, InterpretResult};
use crate::language_model::{CompletionRequest, LanguageModel};
use crate::literal::{parse_term_list, render_list};
use crate::selection::SELECTION_SYSTEM_PROMPT;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// Mock response modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Always answer with the same text
    Fixed(String),

    /// Answer with each scripted reply in turn; errors once exhausted
    Script(Vec<String>),

    /// Answer with the user message unchanged
    Echo,

    /// Simulate provider errors
    Error(String),

    /// Pick the listed candidates found in the glossary and summarize
    /// interpretation requests, for running the full pipeline offline
    Glossary(Vec<String>),
}

/// Small slang vocabulary for offline runs
const DEMO_SLANG: &[(&str, &str)] = &[
    ("bet", "okay; agreed"),
    ("bussin", "extremely good, especially of food"),
    ("drip", "stylish clothing or accessories"),
    ("lowkey", "somewhat or secretly"),
    ("no cap", "no lie; for real"),
    ("rizz", "charm or skill at flirting"),
    ("slaps", "is excellent, usually of music"),
    ("that's fire", "that's excellent"),
];

/// Mock language model that records every request it receives
#[derive(Debug)]
pub struct MockLanguageModel {
    mode: MockMode,
    script: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLanguageModel {
    pub fn new(mode: MockMode) -> Self {
        let script = match &mode {
            MockMode::Script(replies) => replies.iter().cloned().collect(),
            _ => VecDeque::new(),
        };
        Self {
            mode,
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Glossary-mode model that knows the demo vocabulary
    pub fn offline() -> Self {
        Self::new(MockMode::Glossary(
            DEMO_SLANG.iter().map(|(term, _)| term.to_string()).collect(),
        ))
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, request: &CompletionRequest) -> InterpretResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match &self.mode {
            MockMode::Fixed(text) => Ok(text.clone()),
            MockMode::Script(_) => self
                .script
                .lock()
                .ok()
                .and_then(|mut script| script.pop_front())
                .ok_or_else(|| InterpretError::Model("mock script exhausted".to_string())),
            MockMode::Echo => Ok(request.user_message.clone()),
            MockMode::Error(msg) => Err(InterpretError::Model(msg.clone())),
            MockMode::Glossary(glossary) => Ok(glossary_reply(glossary, request)),
        }
    }

    fn provider_name(&self) -> &str {
        "Mock Language Model"
    }
}

fn glossary_reply(glossary: &[String], request: &CompletionRequest) -> String {
    let message = &request.user_message;

    if request.system_prompt == SELECTION_SYSTEM_PROMPT {
        let listed = match (message.find('['), message.rfind(']')) {
            (Some(start), Some(end)) if start < end => &message[start..=end],
            _ => "[]",
        };
        let mut picked: Vec<String> = Vec::new();
        for candidate in parse_term_list(listed).terms {
            let candidate = candidate.to_lowercase();
            if glossary.contains(&candidate) && !picked.contains(&candidate) {
                picked.push(candidate);
            }
        }
        return render_list(&picked);
    }

    let body = message
        .strip_prefix("Interpret this text: ")
        .unwrap_or(message);
    match body.split_once("\n\nSlang definitions: ") {
        Some((text, "{}")) => format!("\"{}\" has no slang to explain.", text),
        Some((text, definitions)) => {
            format!("\"{}\" reads plainly with {}.", text, definitions)
        }
        None => body.to_string(),
    }
}

/// In-memory dictionary
#[derive(Debug, Clone, Default)]
pub struct MockDictionary {
    entries: HashMap<String, Vec<Definition>>,
    failing: HashSet<String>,
}

impl MockDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition; repeated calls for one term append in relevance order
    pub fn with_definition(mut self, term: &str, definition: &str) -> Self {
        self.entries
            .entry(term.to_string())
            .or_default()
            .push(Definition {
                term: term.to_string(),
                definition: definition.to_string(),
                example: String::new(),
                upvotes: 0,
                downvotes: 0,
            });
        self
    }

    /// Dictionary holding the demo vocabulary used by [`MockLanguageModel::offline`]
    pub fn offline() -> Self {
        DEMO_SLANG
            .iter()
            .fold(Self::new(), |dictionary, (term, definition)| {
                dictionary.with_definition(term, definition)
            })
    }

    /// Make lookups of `term` fail as a network error would
    pub fn failing_on(mut self, term: &str) -> Self {
        self.failing.insert(term.to_string());
        self
    }
}

#[async_trait]
impl DictionaryLookup for MockDictionary {
    async fn define(&self, term: &str) -> InterpretResult<Vec<Definition>> {
        if self.failing.contains(term) {
            return Err(InterpretError::Api {
                service: "Mock Dictionary",
                status: 500,
                message: format!("lookup of {:?} failed", term),
            });
        }
        Ok(self.entries.get(term).cloned().unwrap_or_default())
    }

    fn provider_name(&self) -> &str {
        "Mock Dictionary"
    }
}
