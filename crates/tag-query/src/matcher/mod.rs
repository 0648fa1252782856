//! Field matchers and the factory that builds them.
//!
//! A field matcher decides whether one attribute value satisfies one term.
//! There is a matcher per [`FieldKind`](crate::FieldKind):
//!
//! - [`LiteralMatcher`] - exact, wildcard (`fl?tter*`) or fuzzy (`term~0.8`)
//! - [`NumberMatcher`] - qualified comparison or `term ± fuzz`
//! - [`DateMatcher`] - half-open instant range, absolute or relative
//! - [`UserMatcher`] - interaction lookup by document id
//!
//! The term resolver never constructs matchers directly; it goes through a
//! [`MatcherFactory`], so tests can substitute fakes.

mod date;
mod literal;
mod number;
mod user;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::QueryResult;
use crate::fields::{is_multi_valued, Qualifier};
use crate::interaction::{Interaction, InteractionSource};

pub use date::{DateMatcher, DateRange};
pub use literal::LiteralMatcher;
pub use number::{parse_float_prefix, NumberMatcher};
pub use user::{UserInteraction, UserMatcher};

/// Decides whether a single field value matches a term.
pub trait FieldMatcher: Send + Sync + fmt::Debug {
    /// Tests `value`, read from `field` of the document with `document_id`.
    fn matches(&self, value: &str, field: &str, document_id: i64) -> bool;
}

/// Builds field matchers for resolved terms.
pub trait MatcherFactory: Send + Sync {
    /// Builds a matcher for a date field.
    ///
    /// # Errors
    ///
    /// Returns a term error if `term` is not a valid date.
    fn date_matcher(&self, term: &str, qualifier: Qualifier) -> QueryResult<Arc<dyn FieldMatcher>>;

    /// Builds a matcher for a literal field.
    ///
    /// # Errors
    ///
    /// Returns a term error if a wildcard pattern cannot be compiled.
    fn literal_matcher(
        &self,
        term: &str,
        fuzz: f64,
        wildcardable: bool,
    ) -> QueryResult<Arc<dyn FieldMatcher>>;

    /// Builds a matcher for a number field.
    fn number_matcher(&self, term: f64, fuzz: f64, qualifier: Qualifier) -> Arc<dyn FieldMatcher>;

    /// Builds a matcher for a `my:` field.
    fn user_matcher(&self, term: &str) -> Arc<dyn FieldMatcher>;
}

/// The production matcher factory.
///
/// Holds the interaction list consulted by `my:` terms and, optionally, a
/// fixed "now" for relative dates.
#[derive(Clone)]
pub struct DefaultMatcherFactory {
    interactions: Arc<dyn InteractionSource>,
    now: Option<DateTime<Utc>>,
}

impl fmt::Debug for DefaultMatcherFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMatcherFactory")
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl Default for DefaultMatcherFactory {
    fn default() -> Self {
        Self::new(Arc::new(Vec::<Interaction>::new()))
    }
}

impl DefaultMatcherFactory {
    /// Creates a factory reading interactions from `interactions`.
    pub fn new(interactions: Arc<dyn InteractionSource>) -> Self {
        Self {
            interactions,
            now: None,
        }
    }

    /// Pins the instant relative dates are measured from.
    ///
    /// Without this, the current time at parse time is used.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

impl MatcherFactory for DefaultMatcherFactory {
    fn date_matcher(&self, term: &str, qualifier: Qualifier) -> QueryResult<Arc<dyn FieldMatcher>> {
        Ok(Arc::new(DateMatcher::parse(term, qualifier, self.now())?))
    }

    fn literal_matcher(
        &self,
        term: &str,
        fuzz: f64,
        wildcardable: bool,
    ) -> QueryResult<Arc<dyn FieldMatcher>> {
        Ok(Arc::new(LiteralMatcher::new(term, fuzz, wildcardable)?))
    }

    fn number_matcher(&self, term: f64, fuzz: f64, qualifier: Qualifier) -> Arc<dyn FieldMatcher> {
        Arc::new(NumberMatcher::new(term, fuzz, qualifier))
    }

    fn user_matcher(&self, term: &str) -> Arc<dyn FieldMatcher> {
        Arc::new(UserMatcher::new(term, Arc::clone(&self.interactions)))
    }
}

/// Splits a field value into the values a term is tested against.
pub(crate) fn field_values<'v>(value: &'v str, field: &str) -> Vec<&'v str> {
    if is_multi_valued(field) {
        value.split(", ").collect()
    } else {
        vec![value]
    }
}
