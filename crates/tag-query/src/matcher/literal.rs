//! Literal (text) matching: exact, wildcard and fuzzy.

use regex::{Regex, RegexBuilder};
use strsim::osa_distance;

use super::{field_values, FieldMatcher};
use crate::error::TermError;

/// Matches text fields.
///
/// Multi-valued fields (`tags`) match if any of their values match.
#[derive(Debug, Clone)]
pub enum LiteralMatcher {
    /// Case-insensitive equality. The term is stored lowercased.
    Exact(String),
    /// Anchored, case-insensitive pattern compiled from `*` and `?`.
    Wildcard(Regex),
    /// Edit distance within a threshold derived from `fuzz`.
    Fuzzy {
        /// Lowercased term.
        term: String,
        /// Fuzz factor as written (`~0.8` or `~2`).
        fuzz: f64,
    },
}

impl LiteralMatcher {
    /// Builds the matcher a term calls for.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::InvalidWildcard`] if a wildcard pattern does not
    /// compile.
    pub fn new(term: &str, fuzz: f64, wildcardable: bool) -> Result<Self, TermError> {
        if wildcardable {
            return Ok(LiteralMatcher::Wildcard(compile_wildcard(term)?));
        }
        if fuzz == 0.0 {
            return Ok(LiteralMatcher::Exact(term.to_lowercase()));
        }
        Ok(LiteralMatcher::Fuzzy {
            term: term.to_lowercase(),
            fuzz,
        })
    }

    fn matches_one(&self, value: &str) -> bool {
        match self {
            LiteralMatcher::Exact(term) => value.to_lowercase() == *term,
            LiteralMatcher::Wildcard(pattern) => pattern.is_match(value),
            LiteralMatcher::Fuzzy { term, fuzz } => fuzzy_match(term, value, *fuzz),
        }
    }
}

impl FieldMatcher for LiteralMatcher {
    fn matches(&self, value: &str, field: &str, _document_id: i64) -> bool {
        field_values(value, field)
            .into_iter()
            .any(|v| self.matches_one(v))
    }
}

/// Tests whether `target` is within the fuzz threshold of `term`.
///
/// A fuzz below 1 is a similarity ratio relative to the target's length;
/// 1 and above is an absolute edit distance.
fn fuzzy_match(term: &str, target: &str, fuzz: f64) -> bool {
    let target = target.to_lowercase();
    let target_len = target.chars().count() as f64;
    let threshold = if fuzz < 1.0 {
        target_len * (1.0 - fuzz)
    } else {
        fuzz
    };
    osa_distance(term, &target) as f64 <= threshold
}

/// Translates a wildcard term into an anchored regex.
///
/// `*` matches any run of characters and `?` at most one; `\*` and `\?`
/// stay literal. Everything else is escaped.
fn compile_wildcard(term: &str) -> Result<Regex, TermError> {
    let mut pattern = String::with_capacity(term.len() + 8);
    pattern.push('^');

    let mut chars = term.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next) if next == '*' || next == '?' => {
                    chars.next();
                    pattern.push('\\');
                    pattern.push(next);
                }
                _ => pattern.push_str(r"\\"),
            },
            '*' => pattern.push_str(".*"),
            '?' => pattern.push_str(".?"),
            _ => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push('$');

    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| TermError::InvalidWildcard {
            pattern: term.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(term: &str, fuzz: f64, wildcardable: bool) -> LiteralMatcher {
        LiteralMatcher::new(term, fuzz, wildcardable).unwrap()
    }

    #[test]
    fn test_exact_in_multi_valued_field() {
        let m = matcher("safe", 0.0, false);
        assert!(m.matches("safe, solo", "tags", 0));
        assert!(!m.matches("solo", "tags", 0));
    }

    #[test]
    fn test_exact_in_single_valued_field() {
        let m = matcher("safe", 0.0, false);
        assert!(!m.matches("safe, solo", "description", 0));
        assert!(m.matches("safe", "description", 0));
        assert!(!m.matches("solo", "description", 0));
    }

    #[test]
    fn test_exact_is_case_insensitive() {
        let m = matcher("Twilight Sparkle", 0.0, false);
        assert!(m.matches("safe, twilight sparkle", "tags", 0));
    }

    #[test]
    fn test_fuzzy_normalized_distance() {
        let m = matcher("fluttersho", 0.8, false);
        assert!(m.matches("fluttershy", "tags", 0));
        assert!(!m.matches("rarity", "tags", 0));
    }

    #[test]
    fn test_fuzzy_raw_distance() {
        let m = matcher("fluttersho", 1.0, false);
        assert!(m.matches("fluttershy", "tags", 0));
        assert!(!m.matches("rarity", "tags", 0));
    }

    #[test]
    fn test_fuzzy_counts_transposition_once() {
        let m = matcher("rarity", 1.0, false);
        assert!(m.matches("rariyt", "tags", 0));
    }

    #[test]
    fn test_wildcard() {
        let m = matcher("fl?tter*", 0.0, true);
        assert!(m.matches("fluttershy", "tags", 0));
        assert!(m.matches("flitter", "tags", 0));
        assert!(!m.matches("rainbow dash", "tags", 0));
        assert!(!m.matches("gentle flutter", "tags", 0));
    }

    #[test]
    fn test_wildcard_escapes_regex_metacharacters() {
        let m = matcher("a.b+(c)", 0.0, true);
        assert!(m.matches("a.b+(c)", "description", 0));
        assert!(!m.matches("axbb(c)", "description", 0));
    }

    #[test]
    fn test_wildcard_escaped_star_is_literal() {
        let m = matcher(r"5\*", 0.0, true);
        assert!(m.matches("5*", "tags", 0));
        assert!(!m.matches("55", "tags", 0));
    }

    #[test]
    fn test_wildcard_without_metacharacters_is_exact() {
        let m = matcher("Safe", 0.0, true);
        assert!(m.matches("safe, solo", "tags", 0));
        assert!(!m.matches("unsafe", "tags", 0));
    }
}
