//! Check command implementation.
//!
//! Validates a query without evaluating it.

use serde::Serialize;
use tag_query_rs::Predicate;

use super::config::load_config;
use super::matches::build_parser;
use super::{CommandContext, Result};

/// JSON output structure for a valid query.
#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    pub query: &'a str,
    pub valid: bool,
    pub terms: usize,
}

/// Summarizes a compiled query.
pub fn summarize<'a>(query: &'a str, predicate: &Predicate) -> CheckOutput<'a> {
    CheckOutput {
        query,
        valid: true,
        terms: predicate.term_count(),
    }
}

/// Executes the check command.
///
/// An invalid query is reported through the returned error.
pub fn execute(ctx: &CommandContext, query: &str) -> Result<()> {
    let config = load_config()?;
    let parser = build_parser(&config, Vec::new(), None);
    let predicate = parser.parse(query)?;
    let output = summarize(query, &predicate);

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let terms = match output.terms {
            1 => "1 term".to_string(),
            n => format!("{n} terms"),
        };
        if ctx.use_colors && config.colors_enabled() {
            println!("{} ({})", "Valid query".green(), terms);
        } else {
            println!("Valid query ({})", terms);
        }
    }

    Ok(())
}
