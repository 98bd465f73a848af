// src/keywords/matcher.rs
// =============================================================================
// Finds which canonical terms occur in a piece of text.
//
// Patterns are compiled once, up front. A pattern that doesn't compile is a
// configuration error and stops the program before any network traffic.
//
// Output order always follows the pattern list, never the order in which
// words appear in the text, and every term is reported at most once.
// =============================================================================

use regex::{Regex, RegexBuilder};

use crate::error::{ProbeError, Result};

use super::patterns::KeywordPattern;

#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    rules: Vec<(Regex, String)>,
}

impl KeywordMatcher {
    // Compiles every pattern case-insensitively.
    // The regex crate's \b is Unicode-aware, so it works on Cyrillic words.
    pub fn new(patterns: &[KeywordPattern]) -> Result<Self> {
        let rules = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(&p.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (re, p.term.clone()))
                    .map_err(|source| ProbeError::Pattern {
                        pattern: p.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Terms whose pattern matches somewhere in `text`, in pattern order
    pub fn find_keywords(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for (regex, term) in &self.rules {
            // Two patterns may share a term; report it once
            if regex.is_match(text) && !found.iter().any(|t| t == term) {
                found.push(term.clone());
            }
        }
        found
    }
}
