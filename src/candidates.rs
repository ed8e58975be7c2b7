//! Phrase candidate generation
//!
//! Every contiguous run of up to `max_window` words is a candidate. Short inputs
//! are also offered whole so that a complete idiom ("that's fire") can be
//! judged as a unit. Candidates are ordered longest first so the language model
//! considers specific phrases before the single words inside them.

use crate::config::CandidateLimits;
use std::cmp::Reverse;

#[derive(Debug, Clone, Default)]
pub struct CandidateGenerator {
    limits: CandidateLimits,
}

impl CandidateGenerator {
    pub fn new(limits: CandidateLimits) -> Self {
        Self { limits }
    }

    /// Enumerate word windows of `text`, longest first
    ///
    /// # Example
    ///
    /// ```ignore
    /// let candidates = CandidateGenerator::default().generate("that's fire");
    /// assert_eq!(candidates[0], "that's fire");
    /// ```
    pub fn generate(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut candidates = Vec::new();

        for start in 0..words.len() {
            let longest = self.limits.max_window.min(words.len() - start);
            for len in 1..=longest {
                candidates.push(words[start..start + len].join(" "));
            }
        }

        // The whole text is kept verbatim, including its original spacing
        if !words.is_empty() && words.len() <= self.limits.whole_text_max_words {
            candidates.push(text.to_string());
        }

        // sort_by_key is stable: equal lengths keep generation order
        candidates.sort_by_key(|c| Reverse(c.chars().count()));
        candidates
    }
}
