//! Per-user interactions consulted by `my:` terms.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// The kind of interaction a user had with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Voted,
    Faved,
    Hidden,
}

/// The direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionValue {
    Up,
    Down,
}

/// One interaction record as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// The document the interaction applies to.
    pub image_id: i64,
    /// The user who interacted.
    #[serde(default)]
    pub user_id: i64,
    /// What kind of interaction it was.
    pub interaction_type: InteractionType,
    /// Vote direction; `None` for non-vote interactions.
    #[serde(default)]
    pub value: Option<InteractionValue>,
}

/// Read-only view of the host's interaction list.
///
/// The host owns the list and may replace it at any time; matchers only
/// query it at evaluation time and never cache what they see.
pub trait InteractionSource: Send + Sync {
    /// Returns true if the document has an interaction of the given type.
    ///
    /// When `value` is `Some`, the interaction's value must also match.
    fn has_interaction(
        &self,
        document_id: i64,
        interaction_type: InteractionType,
        value: Option<InteractionValue>,
    ) -> bool;
}

fn interaction_match(
    interactions: &[Interaction],
    document_id: i64,
    interaction_type: InteractionType,
    value: Option<InteractionValue>,
) -> bool {
    interactions.iter().any(|i| {
        i.image_id == document_id
            && i.interaction_type == interaction_type
            && (value.is_none() || i.value == value)
    })
}

impl InteractionSource for [Interaction] {
    fn has_interaction(
        &self,
        document_id: i64,
        interaction_type: InteractionType,
        value: Option<InteractionValue>,
    ) -> bool {
        interaction_match(self, document_id, interaction_type, value)
    }
}

impl InteractionSource for Vec<Interaction> {
    fn has_interaction(
        &self,
        document_id: i64,
        interaction_type: InteractionType,
        value: Option<InteractionValue>,
    ) -> bool {
        interaction_match(self, document_id, interaction_type, value)
    }
}

impl InteractionSource for RwLock<Vec<Interaction>> {
    fn has_interaction(
        &self,
        document_id: i64,
        interaction_type: InteractionType,
        value: Option<InteractionValue>,
    ) -> bool {
        // A poisoned list reads as empty.
        self.read()
            .map(|list| interaction_match(&list, document_id, interaction_type, value))
            .unwrap_or(false)
    }
}
