//! Compiled query predicates.

use std::fmt;
use std::sync::Arc;

use crate::document::Document;
use crate::matcher::FieldMatcher;

/// A single resolved term: one field matcher bound to the attribute it reads.
#[derive(Clone)]
pub struct TermPredicate {
    field: String,
    attribute: Option<String>,
    id_attribute: Option<String>,
    matcher: Arc<dyn FieldMatcher>,
}

impl TermPredicate {
    /// Binds a matcher for `field` to the attributes it reads.
    ///
    /// A field without an attribute (`my`) always sees the empty string.
    pub fn new(
        field: impl Into<String>,
        attribute: Option<String>,
        id_attribute: Option<String>,
        matcher: Arc<dyn FieldMatcher>,
    ) -> Self {
        Self {
            field: field.into(),
            attribute,
            id_attribute,
            matcher,
        }
    }

    /// The field this term tests.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The field matcher.
    pub fn matcher(&self) -> &dyn FieldMatcher {
        self.matcher.as_ref()
    }

    /// Reads the field and document id from `doc` and runs the matcher.
    pub fn matches<D: Document + ?Sized>(&self, doc: &D) -> bool {
        let value = self
            .attribute
            .as_deref()
            .and_then(|name| doc.attribute(name))
            .unwrap_or("");
        let document_id = self
            .id_attribute
            .as_deref()
            .and_then(|name| doc.attribute(name))
            .map_or(0, parse_document_id);
        self.matcher.matches(value, &self.field, document_id)
    }
}

impl fmt::Debug for TermPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermPredicate")
            .field("field", &self.field)
            .field("matcher", &self.matcher)
            .finish()
    }
}

/// Parses the leading decimal integer of an id attribute, 0 if there is none.
fn parse_document_id(raw: &str) -> i64 {
    let raw = raw.trim_start();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map_or(0, |n| sign * n)
}

/// A compiled query: a boolean tree over term predicates.
///
/// Predicates are immutable, cheap to clone and safe to share across
/// threads.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// A single field test.
    Term(TermPredicate),
    /// Both sides must match.
    And(Box<Predicate>, Box<Predicate>),
    /// Either side must match.
    Or(Box<Predicate>, Box<Predicate>),
    /// The inner predicate must not match.
    Not(Box<Predicate>),
    /// Matches nothing. The result of an empty query.
    Never,
}

impl Predicate {
    /// Creates an AND predicate.
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR predicate.
    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    /// Negates a predicate. Negating a negation unwraps it.
    pub fn negate(self) -> Self {
        match self {
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }

    /// Returns true if the document matches.
    pub fn matches<D: Document + ?Sized>(&self, doc: &D) -> bool {
        match self {
            Predicate::Term(term) => term.matches(doc),
            Predicate::And(left, right) => left.matches(doc) && right.matches(doc),
            Predicate::Or(left, right) => left.matches(doc) || right.matches(doc),
            Predicate::Not(inner) => !inner.matches(doc),
            Predicate::Never => false,
        }
    }

    /// Returns the documents that match.
    pub fn filter<'d, D: Document>(&self, docs: &'d [D]) -> Vec<&'d D> {
        docs.iter().filter(|doc| self.matches(*doc)).collect()
    }

    /// Counts the term predicates in the tree.
    pub fn term_count(&self) -> usize {
        match self {
            Predicate::Term(_) => 1,
            Predicate::And(left, right) | Predicate::Or(left, right) => {
                left.term_count() + right.term_count()
            }
            Predicate::Not(inner) => inner.term_count(),
            Predicate::Never => 0,
        }
    }
}
