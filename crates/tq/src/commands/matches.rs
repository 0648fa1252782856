//! Match command implementation.
//!
//! Compiles a query once and runs it over every document in the input.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tag_query_rs::{DefaultMatcherFactory, Interaction, InteractionSource, QueryParser};

use super::config::{load_config, Config};
use super::input::{load_documents, load_interactions, InputDocument};
use super::{CommandContext, Result};
use crate::output::{format_documents_json, format_documents_table, MatchSummary};

/// Options for the match command.
#[derive(Debug)]
pub struct MatchOptions {
    /// The search query.
    pub query: String,
    /// Documents file, `-` for stdin.
    pub documents: PathBuf,
    /// Interactions file overriding the configured one.
    pub interactions: Option<PathBuf>,
    /// Keep the documents that do not match.
    pub invert: bool,
    /// Print only the number of selected documents.
    pub count: bool,
    /// Pinned clock for relative dates.
    pub now: Option<DateTime<Utc>>,
}

/// Result of running a query over a document set.
#[derive(Debug)]
pub struct MatchResult {
    /// Documents selected by the query (or rejected by it, when inverted).
    pub selected: Vec<InputDocument>,
    /// Number of documents examined.
    pub total: usize,
}

/// Builds the parser for the given config and interactions.
pub fn build_parser(
    config: &Config,
    interactions: Vec<Interaction>,
    now: Option<DateTime<Utc>>,
) -> QueryParser {
    let source: Arc<dyn InteractionSource> = Arc::new(interactions);
    let factory = DefaultMatcherFactory::new(source);
    let factory = match now {
        Some(now) => factory.with_now(now),
        None => factory,
    };
    QueryParser::new()
        .with_fields(config.field_table())
        .with_factory(Arc::new(factory))
}

/// Resolves which interactions file to read, if any.
fn interactions_path<'a>(opts: &'a MatchOptions, config: &'a Config) -> Option<&'a Path> {
    opts.interactions
        .as_deref()
        .or(config.interactions.as_deref())
}

/// Runs the query over `documents`.
pub fn run_query(
    parser: &QueryParser,
    query: &str,
    documents: Vec<InputDocument>,
    invert: bool,
) -> Result<MatchResult> {
    let predicate = parser.parse(query)?;
    let total = documents.len();
    let selected: Vec<InputDocument> = documents
        .into_iter()
        .filter(|doc| predicate.matches(doc) != invert)
        .collect();

    tracing::debug!(
        query = %query,
        total,
        selected = selected.len(),
        invert,
        "evaluated query"
    );

    Ok(MatchResult { selected, total })
}

/// Executes the match command.
pub fn execute(ctx: &CommandContext, opts: &MatchOptions) -> Result<()> {
    let config = load_config()?;

    let interactions = match interactions_path(opts, &config) {
        Some(path) => load_interactions(path)?,
        None => Vec::new(),
    };
    let parser = build_parser(&config, interactions, opts.now);

    // Parse before reading stdin so a bad query fails fast
    parser.parse(&opts.query)?;

    let documents = load_documents(&opts.documents)?;
    let result = run_query(&parser, &opts.query, documents, opts.invert)?;

    if opts.count {
        if ctx.json_output {
            let output = serde_json::json!({
                "query": opts.query,
                "matched": result.selected.len(),
                "total": result.total,
                "inverted": opts.invert,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", result.selected.len());
        }
        return Ok(());
    }

    let selected: Vec<&InputDocument> = result.selected.iter().collect();
    if ctx.json_output {
        let summary = MatchSummary {
            query: &opts.query,
            matched: selected.len(),
            total: result.total,
            inverted: opts.invert,
        };
        println!("{}", format_documents_json(&selected, summary)?);
    } else if !ctx.quiet {
        let use_colors = ctx.use_colors && config.colors_enabled();
        print!(
            "{}",
            format_documents_table(&selected, parser.fields(), use_colors)
        );
        if ctx.verbose {
            eprintln!("{} of {} documents", selected.len(), result.total);
        }
    }

    Ok(())
}
