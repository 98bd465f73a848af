// src/keywords/patterns.rs
// =============================================================================
// The keyword dictionary: which regular expressions map to which term.
//
// Russian nouns change their ending with case and number ("лошадь",
// "лошади", "лошадью"...), so each term is matched by a pattern that
// covers its common endings. The pattern list is data: the defaults below
// target equestrian topics, and a JSON file can replace them.
// =============================================================================

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, Result};

/// A regular expression and the canonical term it reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordPattern {
    pub pattern: String,
    pub term: String,
}

impl KeywordPattern {
    pub fn new(pattern: &str, term: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            term: term.to_string(),
        }
    }
}

/// Equestrian terms with their inflected endings
pub fn default_patterns() -> Vec<KeywordPattern> {
    vec![
        // Horses
        KeywordPattern::new(r"\bлошад[ьеиюям]\b", "лошадь"),
        KeywordPattern::new(r"\bкон[ныьиейямю]\b", "конь"),
        KeywordPattern::new(r"\bжереб[ецьяюеям]\b", "жеребец"),
        KeywordPattern::new(r"\bипподром[ауеоы]?\b", "ипподром"),
        // Equestrian sport
        KeywordPattern::new(r"\bконн[ыйаяоеые]{0,2} спорт[ауеы]?\b", "конный спорт"),
        KeywordPattern::new(r"\bконн[ые]{0,2} скачк[аиоамуеы]?\b", "конные скачки"),
        KeywordPattern::new(r"\bконкур[ауеоы]?\b", "конкур"),
        KeywordPattern::new(r"\bвыездк[ауеоы]?\b", "выездка"),
        KeywordPattern::new(r"\bтроеборь[еюяем]\b", "троеборье"),
    ]
}

// Reads a pattern list from a JSON file
//
// Expected format:
//   [
//     {"pattern": "\\bhorses?\\b", "term": "horse"},
//     {"pattern": "\\bdressage\\b", "term": "dressage"}
//   ]
pub fn load_patterns(path: &Path) -> Result<Vec<KeywordPattern>> {
    let content = fs::read_to_string(path)?;
    let patterns: Vec<KeywordPattern> = serde_json::from_str(&content).map_err(|e| {
        ProbeError::Config(format!("invalid pattern file {}: {}", path.display(), e))
    })?;

    if patterns.is_empty() {
        return Err(ProbeError::Config(format!(
            "pattern file {} contains no patterns",
            path.display()
        )));
    }

    Ok(patterns)
}
