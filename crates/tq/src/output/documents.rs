//! Matched document output formatting.

use std::collections::BTreeMap;

use owo_colors::OwoColorize;
use serde::Serialize;
use tag_query_rs::{Document, FieldTable};

use super::helpers::truncate_str;

/// Totals reported alongside matched documents.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MatchSummary<'a> {
    pub query: &'a str,
    pub matched: usize,
    pub total: usize,
    pub inverted: bool,
}

/// JSON output structure for the match command.
#[derive(Serialize)]
struct DocumentsOutput<'a> {
    #[serde(flatten)]
    summary: MatchSummary<'a>,
    documents: &'a [&'a BTreeMap<String, String>],
}

/// Formats matched documents as JSON.
pub fn format_documents_json(
    docs: &[&BTreeMap<String, String>],
    summary: MatchSummary<'_>,
) -> Result<String, serde_json::Error> {
    let output = DocumentsOutput {
        summary,
        documents: docs,
    };
    serde_json::to_string_pretty(&output)
}

/// Formats matched documents as a table of id, score and tags.
pub fn format_documents_table<D: Document>(
    docs: &[&D],
    fields: &FieldTable,
    use_colors: bool,
) -> String {
    if docs.is_empty() {
        return "No matching documents.\n".to_string();
    }

    let read = |doc: &D, field: &str| -> String {
        fields
            .attribute(field)
            .and_then(|name| doc.attribute(name))
            .unwrap_or("")
            .to_string()
    };

    let mut output = String::new();

    // Header
    let header = format!("{:<10} {:>7} {}", "ID", "Score", "Tags");
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for &doc in docs {
        let id = read(doc, "id");
        let score = read(doc, "score");
        let tags = truncate_str(&read(doc, "tags"), 60);

        let id = if use_colors {
            format!("{:<10}", truncate_str(&id, 10)).cyan().to_string()
        } else {
            format!("{:<10}", truncate_str(&id, 10))
        };

        output.push_str(&format!("{} {:>7} {}\n", id, score, tags));
    }

    output
}
