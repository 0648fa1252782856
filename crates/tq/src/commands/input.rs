//! Loading documents and interactions from JSON files.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde_json::Value;
use tag_query_rs::Interaction;

use super::{CommandError, Result};

/// A document read from input: attribute name to string value.
pub type InputDocument = BTreeMap<String, String>;

/// Reads the whole of `path`, or stdin when the path is `-`.
fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|e| {
        CommandError::Input(format!("Failed to read {}: {}", path.display(), e))
    })
}

/// Loads documents from a JSON array of objects.
pub fn load_documents(path: &Path) -> Result<Vec<InputDocument>> {
    let content = read_source(path)?;
    let docs = parse_documents(&content)?;
    tracing::debug!(path = %path.display(), count = docs.len(), "loaded documents");
    Ok(docs)
}

/// Parses documents from JSON.
///
/// Strings are kept as-is, numbers and booleans are stringified, arrays are
/// joined with `", "` and nulls are dropped.
pub fn parse_documents(content: &str) -> Result<Vec<InputDocument>> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        return Err(CommandError::Input(
            "documents must be a JSON array".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| -> Result<InputDocument> {
            match item {
                Value::Object(map) => Ok(map
                    .into_iter()
                    .filter_map(|(key, value)| attribute_value(value).map(|v| (key, v)))
                    .collect()),
                other => Err(CommandError::Input(format!(
                    "document {} is not an object: {}",
                    index, other
                ))),
            }
        })
        .collect()
}

fn attribute_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(attribute_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

/// Loads the current user's interactions from a JSON array.
pub fn load_interactions(path: &Path) -> Result<Vec<Interaction>> {
    let content = read_source(path)?;
    let interactions: Vec<Interaction> = serde_json::from_str(&content).map_err(|e| {
        CommandError::Input(format!(
            "Invalid interactions in {}: {}",
            path.display(),
            e
        ))
    })?;
    tracing::debug!(
        path = %path.display(),
        count = interactions.len(),
        "loaded interactions"
    );
    Ok(interactions)
}
