//! Term resolution: turns one raw term into a field predicate.
//!
//! A term is either `field:value`, `field.qualifier:value`, `my:interaction`
//! or a bare value matched against the default field. Unknown field names are
//! not errors; the whole term is then matched literally against `tags`, which
//! keeps tags containing a colon (`artist:foo`) searchable.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::QueryResult;
use crate::fields::{FieldKind, FieldTable, Qualifier, DEFAULT_FIELD};
use crate::matcher::{parse_float_prefix, FieldMatcher, MatcherFactory};
use crate::predicate::{Predicate, TermPredicate};

/// Resolves terms against a field table using a matcher factory.
#[derive(Clone, Copy)]
pub struct TermResolver<'a> {
    fields: &'a FieldTable,
    factory: &'a dyn MatcherFactory,
}

impl<'a> TermResolver<'a> {
    /// Creates a resolver.
    pub fn new(fields: &'a FieldTable, factory: &'a dyn MatcherFactory) -> Self {
        Self { fields, factory }
    }

    /// Resolves `term` into a predicate.
    ///
    /// `boost` is accepted for completeness and has no effect on matching.
    ///
    /// # Errors
    ///
    /// Returns a term error if the matcher cannot be built, for instance
    /// when a date field is given an unparseable date.
    pub fn resolve(&self, term: &str, fuzz: f64, boost: f64) -> QueryResult<Predicate> {
        let wildcardable = fuzz == 0.0 && !is_quoted_literal(term);
        let unquoted = if !wildcardable && fuzz == 0.0 {
            strip_quotes(term)
        } else {
            term
        };
        let normalized = normalize(unquoted, wildcardable);

        let (field, matcher) = self.field_matcher(&normalized, fuzz, wildcardable)?;
        tracing::trace!(term, field, fuzz, boost, wildcardable, "resolved term");

        Ok(Predicate::Term(TermPredicate::new(
            field,
            self.fields.attribute(field).map(str::to_string),
            self.fields.id_attribute().map(str::to_string),
            matcher,
        )))
    }

    fn field_matcher<'t>(
        &self,
        term: &'t str,
        fuzz: f64,
        wildcardable: bool,
    ) -> QueryResult<(&'t str, Arc<dyn FieldMatcher>)> {
        if let Some((name, value)) = term.split_once(':') {
            if let Some((field, qualifier, kind)) = self.range_field(name) {
                let matcher = match kind {
                    FieldKind::Date => self.factory.date_matcher(value, qualifier)?,
                    _ => self
                        .factory
                        .number_matcher(parse_float_prefix(value), fuzz, qualifier),
                };
                return Ok((field, matcher));
            }

            match self.fields.kind(name) {
                Some(FieldKind::Literal) => {
                    let matcher = self.factory.literal_matcher(value, fuzz, wildcardable)?;
                    return Ok((name, matcher));
                }
                Some(FieldKind::User) => return Ok((name, self.factory.user_matcher(value))),
                _ => {}
            }
        }

        let matcher = self.factory.literal_matcher(term, fuzz, wildcardable)?;
        Ok((DEFAULT_FIELD, matcher))
    }

    /// Resolves a number or date field name, with an optional `.qualifier`.
    fn range_field<'t>(&self, name: &'t str) -> Option<(&'t str, Qualifier, FieldKind)> {
        let is_range =
            |kind: Option<FieldKind>| matches!(kind, Some(FieldKind::Number | FieldKind::Date));

        let kind = self.fields.kind(name);
        if is_range(kind) {
            return kind.map(|kind| (name, Qualifier::Eq, kind));
        }

        let (field, qualifier) = name.split_once('.')?;
        let qualifier = qualifier.parse().ok()?;
        let kind = self.fields.kind(field);
        if is_range(kind) {
            kind.map(|kind| (field, qualifier, kind))
        } else {
            None
        }
    }
}

/// Returns true for `"..."` where every inner quote is escaped.
pub fn is_quoted_literal(term: &str) -> bool {
    let Some(inner) = term
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return false;
    };
    !inner.is_empty()
        && inner
            .char_indices()
            .all(|(i, c)| c != '"' || inner[..i].ends_with('\\'))
}

fn strip_quotes(term: &str) -> &str {
    term.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(term)
}

/// Resolves backslash escapes.
///
/// Wildcard terms keep `\*` and `\?` escaped for the wildcard compiler and
/// resolve every other escape. Other terms only resolve `\"`.
fn normalize(term: &str, wildcardable: bool) -> Cow<'_, str> {
    if !term.contains('\\') {
        return Cow::Borrowed(term);
    }
    if !wildcardable {
        return Cow::Owned(term.replace("\\\"", "\""));
    }

    let mut out = String::with_capacity(term.len());
    let mut chars = term.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if next != '*' && next != '?' => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::DefaultMatcherFactory;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct NoMatch;

    impl FieldMatcher for NoMatch {
        fn matches(&self, _value: &str, _field: &str, _document_id: i64) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct RecordingFactory {
        dates: Mutex<Vec<(String, Qualifier)>>,
        literals: Mutex<Vec<(String, f64, bool)>>,
        numbers: Mutex<Vec<(f64, Qualifier)>>,
        users: Mutex<Vec<String>>,
    }

    impl MatcherFactory for RecordingFactory {
        fn date_matcher(
            &self,
            term: &str,
            qualifier: Qualifier,
        ) -> QueryResult<Arc<dyn FieldMatcher>> {
            self.dates.lock().unwrap().push((term.to_string(), qualifier));
            Ok(Arc::new(NoMatch))
        }

        fn literal_matcher(
            &self,
            term: &str,
            fuzz: f64,
            wildcardable: bool,
        ) -> QueryResult<Arc<dyn FieldMatcher>> {
            self.literals
                .lock()
                .unwrap()
                .push((term.to_string(), fuzz, wildcardable));
            Ok(Arc::new(NoMatch))
        }

        fn number_matcher(&self, term: f64, _fuzz: f64, qualifier: Qualifier) -> Arc<dyn FieldMatcher> {
            self.numbers.lock().unwrap().push((term, qualifier));
            Arc::new(NoMatch)
        }

        fn user_matcher(&self, term: &str) -> Arc<dyn FieldMatcher> {
            self.users.lock().unwrap().push(term.to_string());
            Arc::new(NoMatch)
        }
    }

    fn field_of(predicate: &Predicate) -> &str {
        match predicate {
            Predicate::Term(term) => term.field(),
            other => panic!("expected a term predicate, got {other:?}"),
        }
    }

    fn resolve(factory: &RecordingFactory, term: &str, fuzz: f64) -> Predicate {
        let fields = FieldTable::new();
        TermResolver::new(&fields, factory)
            .resolve(term, fuzz, 1.0)
            .unwrap()
    }

    #[test]
    fn test_default_field() {
        let factory = RecordingFactory::default();
        let p = resolve(&factory, "default", 0.0);
        assert_eq!(field_of(&p), "tags");
        assert_eq!(
            *factory.literals.lock().unwrap(),
            vec![("default".to_string(), 0.0, true)]
        );
    }

    #[test]
    fn test_default_field_with_wildcarding() {
        let factory = RecordingFactory::default();
        resolve(&factory, "def?ul*", 0.0);
        assert_eq!(
            *factory.literals.lock().unwrap(),
            vec![("def?ul*".to_string(), 0.0, true)]
        );
    }

    #[test]
    fn test_default_field_with_fuzzing() {
        let factory = RecordingFactory::default();
        resolve(&factory, "default", 1.0);
        assert_eq!(
            *factory.literals.lock().unwrap(),
            vec![("default".to_string(), 1.0, false)]
        );
    }

    #[test]
    fn test_default_field_within_quotes() {
        let factory = RecordingFactory::default();
        resolve(&factory, "\"default\"", 0.0);
        assert_eq!(
            *factory.literals.lock().unwrap(),
            vec![("default".to_string(), 0.0, false)]
        );
    }

    #[test]
    fn test_quoted_term_unescapes_quotes() {
        let factory = RecordingFactory::default();
        resolve(&factory, r#""say \"hi\" *""#, 0.0);
        assert_eq!(
            *factory.literals.lock().unwrap(),
            vec![(r#"say "hi" *"#.to_string(), 0.0, false)]
        );
    }

    #[test]
    fn test_wildcard_term_resolves_other_escapes() {
        let factory = RecordingFactory::default();
        resolve(&factory, r"rose\ \(flower\)\*", 0.0);
        assert_eq!(
            *factory.literals.lock().unwrap(),
            vec![(r"rose (flower)\*".to_string(), 0.0, true)]
        );
    }

    #[test]
    fn test_exact_date_field() {
        let factory = RecordingFactory::default();
        let p = resolve(&factory, "created_at:2024", 0.0);
        assert_eq!(field_of(&p), "created_at");
        assert_eq!(
            *factory.dates.lock().unwrap(),
            vec![("2024".to_string(), Qualifier::Eq)]
        );
    }

    #[test]
    fn test_ranged_date_field() {
        let factory = RecordingFactory::default();
        for qualifier in ["lte", "lt", "gte", "gt"] {
            resolve(&factory, &format!("created_at.{qualifier}:2024"), 0.0);
        }
        assert_eq!(
            *factory.dates.lock().unwrap(),
            vec![
                ("2024".to_string(), Qualifier::Lte),
                ("2024".to_string(), Qualifier::Lt),
                ("2024".to_string(), Qualifier::Gte),
                ("2024".to_string(), Qualifier::Gt),
            ]
        );
    }

    #[test]
    fn test_date_value_keeps_later_colons() {
        let factory = RecordingFactory::default();
        resolve(&factory, "created_at:2024-01-01T10:30", 0.0);
        assert_eq!(
            *factory.dates.lock().unwrap(),
            vec![("2024-01-01T10:30".to_string(), Qualifier::Eq)]
        );
    }

    #[test]
    fn test_exact_number_field() {
        let factory = RecordingFactory::default();
        let p = resolve(&factory, "width:1920", 0.0);
        assert_eq!(field_of(&p), "width");
        assert_eq!(
            *factory.numbers.lock().unwrap(),
            vec![(1920.0, Qualifier::Eq)]
        );
    }

    #[test]
    fn test_ranged_number_field() {
        let factory = RecordingFactory::default();
        for qualifier in ["lte", "lt", "gte", "gt", "eq"] {
            resolve(&factory, &format!("width.{qualifier}:1920"), 0.0);
        }
        let numbers = factory.numbers.lock().unwrap();
        assert_eq!(numbers.len(), 5);
        assert!(numbers.iter().all(|(n, _)| *n == 1920.0));
        assert_eq!(numbers[0].1, Qualifier::Lte);
        assert_eq!(numbers[4].1, Qualifier::Eq);
    }

    #[test]
    fn test_literal_field() {
        let factory = RecordingFactory::default();
        let p = resolve(&factory, "source_url:*twitter*", 0.0);
        assert_eq!(field_of(&p), "source_url");
        assert_eq!(
            *factory.literals.lock().unwrap(),
            vec![("*twitter*".to_string(), 0.0, true)]
        );
    }

    #[test]
    fn test_user_field() {
        let factory = RecordingFactory::default();
        for term in ["my:upvotes", "my:downvotes", "my:faves"] {
            assert_eq!(field_of(&resolve(&factory, term, 0.0)), "my");
        }
        assert_eq!(
            *factory.users.lock().unwrap(),
            vec!["upvotes", "downvotes", "faves"]
        );
    }

    #[test]
    fn test_unknown_field_falls_back_to_whole_term() {
        let factory = RecordingFactory::default();
        let p = resolve(&factory, "artist:somebody", 0.0);
        assert_eq!(field_of(&p), "tags");
        assert_eq!(
            *factory.literals.lock().unwrap(),
            vec![("artist:somebody".to_string(), 0.0, true)]
        );

        let factory = RecordingFactory::default();
        resolve(&factory, "tags.lt:5", 0.0);
        resolve(&factory, "width.le:5", 0.0);
        assert!(factory.numbers.lock().unwrap().is_empty());
        assert_eq!(factory.literals.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_matches_document_with_field_values() {
        let fields = FieldTable::new();
        let factory = DefaultMatcherFactory::default();
        let resolver = TermResolver::new(&fields, &factory);
        let id = resolver.resolve("id.lt:1", 0.0, 1.0).unwrap();
        let source = resolver.resolve("source_url:twitter.com", 0.0, 1.0).unwrap();

        let proper = HashMap::from([
            ("data-image-id".to_string(), "0".to_string()),
            ("data-source-url".to_string(), "twitter.com".to_string()),
        ]);
        assert!(id.matches(&proper));
        assert!(source.matches(&proper));

        let improper: HashMap<String, String> = HashMap::new();
        assert!(!id.matches(&improper));
        assert!(!source.matches(&improper));
    }

    #[test]
    fn test_invalid_date_is_a_term_error() {
        let fields = FieldTable::new();
        let factory = DefaultMatcherFactory::default();
        let err = TermResolver::new(&fields, &factory)
            .resolve("created_at:yesterday-ish", 0.0, 1.0)
            .unwrap_err();
        assert_eq!(err.kind(), "term");
        assert_eq!(err.to_string(), "Cannot parse date string: yesterday-ish");
    }

    #[test]
    fn test_is_quoted_literal() {
        assert!(is_quoted_literal("\"a\""));
        assert!(is_quoted_literal(r#""a \"b\" c""#));
        assert!(!is_quoted_literal("\"\""));
        assert!(!is_quoted_literal("\"a\"b\""));
        assert!(!is_quoted_literal("a"));
        assert!(!is_quoted_literal("\""));
    }
}
