//! Wildcard name matching used by scan, queue and exclude patterns.
//!
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//! - `|` separates alternative patterns, each anchored to the whole name
//!
//! Matching is case-insensitive. Empty alternatives are ignored, so an empty
//! pattern (or one made only of `|`) never matches.

use regex::{Regex, RegexBuilder};

/// Returns true if `value` matches `pattern` in full.
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    if pattern.split('|').all(str::is_empty) {
        return false;
    }
    match compile_pattern(pattern) {
        Some(regex) => regex.is_match(value),
        None => false,
    }
}

/// Translate a wildcard pattern into an anchored, case-insensitive regex.
fn compile_pattern(pattern: &str) -> Option<Regex> {
    let alternatives: Vec<String> = pattern
        .split('|')
        .filter(|alternative| !alternative.is_empty())
        .map(|alternative| {
            regex::escape(alternative)
                .replace(r"\*", ".*")
                .replace(r"\?", ".")
        })
        .collect();

    let source = format!("^(?:{})$", alternatives.join("|"));
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| tracing::warn!("Unusable match pattern {:?}: {}", pattern, e))
        .ok()
}
