//! Lex command implementation.
//!
//! Shows the tokens and term positions of a query.

use super::config::load_config;
use super::matches::build_parser;
use super::{CommandContext, Result};
use crate::output::{format_tokens_json, format_tokens_table};

/// Executes the lex command.
pub fn execute(ctx: &CommandContext, query: &str) -> Result<()> {
    let config = load_config()?;
    let parser = build_parser(&config, Vec::new(), None);
    let output = parser.lex(query)?;

    tracing::debug!(
        tokens = output.tokens.len(),
        terms = output.term_contexts.len(),
        "lexed query"
    );

    if ctx.json_output {
        println!("{}", format_tokens_json(query, &output)?);
    } else if !ctx.quiet {
        let use_colors = ctx.use_colors && config.colors_enabled();
        print!("{}", format_tokens_table(&output, use_colors));
    }

    Ok(())
}
