// src/keywords/mod.rs
// =============================================================================
// Keyword matching for archived page text.
//
// Submodules:
// - patterns: the default (pattern, term) list and loading one from a file
// - matcher: compiles the patterns and reports which terms appear in a text
// =============================================================================

mod matcher;
mod patterns;

pub use matcher::KeywordMatcher;
pub use patterns::{default_patterns, load_patterns, KeywordPattern};
