//! Profanity censoring applied before text leaves the process
//!
//! Matching is case-insensitive and on whole words only, so "classic" is left
//! alone while "SHIT" becomes `****`.

use crate::error::{InterpretError, InterpretResult};
use regex::Regex;

pub const CENSOR_MASK: &str = "****";

const DEFAULT_WORDS: &[&str] = &[
    "asshole",
    "assholes",
    "bastard",
    "bitch",
    "bitches",
    "bullshit",
    "cunt",
    "dick",
    "dickhead",
    "fuck",
    "fucked",
    "fucker",
    "fuckin",
    "fucking",
    "motherfucker",
    "motherfucking",
    "piss",
    "pussy",
    "shit",
    "shits",
    "shitty",
    "slut",
    "whore",
];

pub trait ProfanityFilter: Send + Sync {
    /// Return `text` with offending words masked
    fn censor(&self, text: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct WordListFilter {
    words: Vec<String>,
    pattern: Option<Regex>,
}

impl WordListFilter {
    /// Build a filter for exactly the given words
    pub fn new<I, S>(words: I) -> InterpretResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        // longer alternatives first so "fucking" wins over "fuck"
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        words.dedup();

        let pattern = if words.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
            let source = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
            Some(Regex::new(&source).map_err(|e| {
                InterpretError::Config(format!("Invalid profanity word list: {}", e))
            })?)
        };

        Ok(Self { words, pattern })
    }

    /// Filter using the built-in word list
    pub fn with_default_words() -> InterpretResult<Self> {
        Self::new(DEFAULT_WORDS)
    }

    /// Extend the word list
    pub fn with_extra_words<I, S>(self, extra: I) -> InterpretResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let combined: Vec<String> = self
            .words
            .into_iter()
            .chain(extra.into_iter().map(|w| w.as_ref().to_string()))
            .collect();
        Self::new(combined)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl ProfanityFilter for WordListFilter {
    fn censor(&self, text: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, CENSOR_MASK).into_owned(),
            None => text.to_string(),
        }
    }
}
