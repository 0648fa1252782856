//! `my:` matching against the host's interaction list.

use std::fmt;
use std::sync::Arc;

use super::FieldMatcher;
use crate::interaction::{InteractionSource, InteractionType, InteractionValue};

/// The interaction a `my:` term asks about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInteraction {
    /// `my:faves`
    Faves,
    /// `my:upvotes`
    Upvotes,
    /// `my:downvotes`
    Downvotes,
    /// Anything else, including `my:hidden` and `my:watched`. Never matches.
    Unsupported(String),
}

impl From<&str> for UserInteraction {
    fn from(term: &str) -> Self {
        match term {
            "faves" => UserInteraction::Faves,
            "upvotes" => UserInteraction::Upvotes,
            "downvotes" => UserInteraction::Downvotes,
            other => UserInteraction::Unsupported(other.to_string()),
        }
    }
}

/// Matches documents the current user interacted with.
#[derive(Clone)]
pub struct UserMatcher {
    interaction: UserInteraction,
    source: Arc<dyn InteractionSource>,
}

impl fmt::Debug for UserMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserMatcher")
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}

impl UserMatcher {
    /// Creates a matcher for the interaction named by `term`.
    pub fn new(term: &str, source: Arc<dyn InteractionSource>) -> Self {
        Self {
            interaction: UserInteraction::from(term),
            source,
        }
    }

    /// The interaction this matcher looks for.
    pub fn interaction(&self) -> &UserInteraction {
        &self.interaction
    }
}

impl FieldMatcher for UserMatcher {
    fn matches(&self, _value: &str, _field: &str, document_id: i64) -> bool {
        let (kind, value) = match self.interaction {
            UserInteraction::Faves => (InteractionType::Faved, None),
            UserInteraction::Upvotes => (InteractionType::Voted, Some(InteractionValue::Up)),
            UserInteraction::Downvotes => (InteractionType::Voted, Some(InteractionValue::Down)),
            UserInteraction::Unsupported(_) => return false,
        };
        self.source.has_interaction(document_id, kind, value)
    }
}
