//! Numeric range matching.

use std::sync::LazyLock;

use regex::Regex;

use super::FieldMatcher;
use crate::fields::Qualifier;

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|[0-9]+(?:\.[0-9]*)?(?:[eE][+-]?[0-9]+)?|\.[0-9]+(?:[eE][+-]?[0-9]+)?)")
        .expect("float prefix pattern is valid")
});

/// Parses the longest numeric prefix of `s`, ignoring leading whitespace.
///
/// Returns NaN when there is no numeric prefix, so `"5px"` is 5 and `"px"`
/// compares false against everything.
pub fn parse_float_prefix(s: &str) -> f64 {
    FLOAT_PREFIX
        .find(s.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Matches number fields against a qualified value or a fuzz window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberMatcher {
    term: f64,
    fuzz: f64,
    qualifier: Qualifier,
}

impl NumberMatcher {
    /// Creates a matcher. A non-zero `fuzz` overrides the qualifier.
    pub fn new(term: f64, fuzz: f64, qualifier: Qualifier) -> Self {
        Self {
            term,
            fuzz,
            qualifier,
        }
    }

    /// Tests an already-parsed value.
    pub fn matches_value(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }

        if self.fuzz != 0.0 {
            return self.term - self.fuzz <= value && value <= self.term + self.fuzz;
        }

        match self.qualifier {
            Qualifier::Lt => value < self.term,
            Qualifier::Lte => value <= self.term,
            Qualifier::Gt => value > self.term,
            Qualifier::Gte => value >= self.term,
            Qualifier::Eq => value == self.term,
        }
    }
}

impl FieldMatcher for NumberMatcher {
    fn matches(&self, value: &str, _field: &str, _document_id: i64) -> bool {
        self.matches_value(parse_float_prefix(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("1920"), 1920.0);
        assert_eq!(parse_float_prefix(" 1.5"), 1.5);
        assert_eq!(parse_float_prefix("-3e2"), -300.0);
        assert_eq!(parse_float_prefix(".25x"), 0.25);
        assert_eq!(parse_float_prefix("5px"), 5.0);
        assert_eq!(parse_float_prefix("Infinity"), f64::INFINITY);
        assert!(parse_float_prefix("").is_nan());
        assert!(parse_float_prefix("abc").is_nan());
    }

    #[test]
    fn test_qualifiers() {
        let value = "100";
        assert!(NumberMatcher::new(100.0, 0.0, Qualifier::Eq).matches(value, "score", 0));
        assert!(!NumberMatcher::new(99.0, 0.0, Qualifier::Eq).matches(value, "score", 0));
        assert!(NumberMatcher::new(101.0, 0.0, Qualifier::Lt).matches(value, "score", 0));
        assert!(!NumberMatcher::new(100.0, 0.0, Qualifier::Lt).matches(value, "score", 0));
        assert!(NumberMatcher::new(100.0, 0.0, Qualifier::Lte).matches(value, "score", 0));
        assert!(NumberMatcher::new(99.0, 0.0, Qualifier::Gt).matches(value, "score", 0));
        assert!(!NumberMatcher::new(100.0, 0.0, Qualifier::Gt).matches(value, "score", 0));
        assert!(NumberMatcher::new(100.0, 0.0, Qualifier::Gte).matches(value, "score", 0));
    }

    #[test]
    fn test_fuzz_window_overrides_qualifier() {
        let m = NumberMatcher::new(100.0, 5.0, Qualifier::Gt);
        assert!(m.matches("95", "score", 0));
        assert!(m.matches("105", "score", 0));
        assert!(m.matches("100", "score", 0));
        assert!(!m.matches("94.9", "score", 0));
        assert!(!m.matches("105.1", "score", 0));
    }

    #[test]
    fn test_non_numeric_value_never_matches() {
        for qualifier in [
            Qualifier::Lt,
            Qualifier::Lte,
            Qualifier::Gt,
            Qualifier::Gte,
            Qualifier::Eq,
        ] {
            let m = NumberMatcher::new(1.0, 0.0, qualifier);
            assert!(!m.matches("", "score", 0));
            assert!(!m.matches("lots", "score", 0));
        }
        assert!(!NumberMatcher::new(1.0, 3.0, Qualifier::Eq).matches("", "score", 0));
    }

    #[test]
    fn test_nan_term_never_matches() {
        let m = NumberMatcher::new(f64::NAN, 0.0, Qualifier::Eq);
        assert!(!m.matches("1", "score", 0));
    }
}
