//! Field classification and the field-to-attribute map.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fields compared numerically.
pub const NUMBER_FIELDS: &[&str] = &[
    "id",
    "width",
    "height",
    "aspect_ratio",
    "comment_count",
    "score",
    "upvotes",
    "downvotes",
    "faves",
    "tag_count",
];

/// Fields compared as instants.
pub const DATE_FIELDS: &[&str] = &["created_at"];

/// Fields compared as strings.
pub const LITERAL_FIELDS: &[&str] = &[
    "tags",
    "orig_sha512_hash",
    "sha512_hash",
    "uploader",
    "source_url",
    "description",
];

/// The prefix for per-user interaction lookups (`my:faves`).
pub const USER_FIELD: &str = "my";

/// The field a term is matched against when it names no field.
pub const DEFAULT_FIELD: &str = "tags";

/// The field holding the document id.
pub const ID_FIELD: &str = "id";

/// Literal fields that hold a `", "`-separated list.
const MULTI_VALUED_FIELDS: &[&str] = &["tags"];

const DEFAULT_ATTRIBUTES: &[(&str, &str)] = &[
    ("tags", "data-image-tag-aliases"),
    ("score", "data-score"),
    ("upvotes", "data-upvotes"),
    ("downvotes", "data-downvotes"),
    ("uploader", "data-uploader"),
    ("id", "data-image-id"),
    ("width", "data-width"),
    ("height", "data-height"),
    ("aspect_ratio", "data-aspect-ratio"),
    ("comment_count", "data-comment-count"),
    ("tag_count", "data-tag-count"),
    ("source_url", "data-source-url"),
    ("faves", "data-faves"),
    ("sha512_hash", "data-sha512"),
    ("orig_sha512_hash", "data-orig-sha512"),
    ("created_at", "data-created-at"),
    ("description", "data-description"),
];

/// Returns true if the field's value is a `", "`-separated list.
pub fn is_multi_valued(field: &str) -> bool {
    MULTI_VALUED_FIELDS.contains(&field)
}

/// The type of a field, which decides how its values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Parsed as a float and range-compared.
    Number,
    /// Parsed as an instant and compared against a half-open range.
    Date,
    /// Compared as text, exactly, by wildcard or fuzzily.
    Literal,
    /// Looked up in the host's interaction list.
    User,
}

/// Range qualifier attached to a number or date field (`score.gte:100`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    Lt,
    Lte,
    Gt,
    Gte,
    #[default]
    Eq,
}

impl FromStr for Qualifier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lt" => Ok(Qualifier::Lt),
            "lte" => Ok(Qualifier::Lte),
            "gt" => Ok(Qualifier::Gt),
            "gte" => Ok(Qualifier::Gte),
            "eq" => Ok(Qualifier::Eq),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Qualifier::Lt => "lt",
            Qualifier::Lte => "lte",
            Qualifier::Gt => "gt",
            Qualifier::Gte => "gte",
            Qualifier::Eq => "eq",
        };
        f.write_str(s)
    }
}

/// Field classification plus the attribute each field is read from.
///
/// The classification is fixed. The attribute names default to the `data-*`
/// attributes rendered on gallery thumbnails and can be overridden for hosts
/// that store documents differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTable {
    attributes: BTreeMap<String, String>,
}

impl Default for FieldTable {
    fn default() -> Self {
        Self {
            attributes: DEFAULT_ATTRIBUTES
                .iter()
                .map(|(field, attr)| (field.to_string(), attr.to_string()))
                .collect(),
        }
    }
}

impl FieldTable {
    /// Creates a table with the default attribute names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the attribute a field is read from.
    ///
    /// Names that are not known fields are ignored.
    pub fn with_attribute(mut self, field: &str, attribute: impl Into<String>) -> Self {
        if self.kind(field).is_some() && field != USER_FIELD {
            self.attributes.insert(field.to_string(), attribute.into());
        }
        self
    }

    /// Applies several overrides at once.
    pub fn with_attributes<'a, I>(self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        overrides
            .into_iter()
            .fold(self, |table, (field, attr)| table.with_attribute(field, attr.clone()))
    }

    /// Returns the kind of a field, or `None` if the name is not a field.
    pub fn kind(&self, field: &str) -> Option<FieldKind> {
        if NUMBER_FIELDS.contains(&field) {
            Some(FieldKind::Number)
        } else if DATE_FIELDS.contains(&field) {
            Some(FieldKind::Date)
        } else if LITERAL_FIELDS.contains(&field) {
            Some(FieldKind::Literal)
        } else if field == USER_FIELD {
            Some(FieldKind::User)
        } else {
            None
        }
    }

    /// Returns the attribute a field is read from.
    ///
    /// `my` has no backing attribute.
    pub fn attribute(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }

    /// Returns the attribute holding the document id.
    pub fn id_attribute(&self) -> Option<&str> {
        self.attribute(ID_FIELD)
    }

    /// Returns true if the field's value is a `", "`-separated list.
    pub fn is_multi_valued(&self, field: &str) -> bool {
        is_multi_valued(field)
    }

    /// Iterates over `(field, attribute)` pairs.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(field, attr)| (field.as_str(), attr.as_str()))
    }
}
