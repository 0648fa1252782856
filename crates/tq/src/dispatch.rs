//! Command dispatch module for routing CLI commands to their handlers.

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::matches::MatchOptions;
use crate::commands::{self, CommandContext, CommandError, Result};

/// A parsed command ready to run.
pub enum Dispatch<'a> {
    Match(MatchOptions),
    Lex(&'a str),
    Check(&'a str),
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> Dispatch<'a> {
    /// Creates a dispatch from the CLI command.
    pub fn from_cli(cli: &'a Cli) -> Self {
        match &cli.command {
            Some(Commands::Match {
                query,
                documents,
                interactions,
                invert,
                count,
                now,
            }) => Self::Match(MatchOptions {
                query: query.clone(),
                documents: documents.clone(),
                interactions: interactions.clone(),
                invert: *invert,
                count: *count,
                now: *now,
            }),
            Some(Commands::Lex { query }) => Self::Lex(query),
            Some(Commands::Check { query }) => Self::Check(query),
            Some(Commands::Config { command }) => Self::Config(command),
            Some(Commands::Completions { shell }) => Self::Completions(shell),
            None => Self::Help,
        }
    }

    /// Runs the command.
    pub fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Match(opts) => commands::matches::execute(ctx, opts),
            Self::Lex(query) => commands::lex::execute(ctx, query),
            Self::Check(query) => commands::check::execute(ctx, query),
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("tq - tag-search query tool");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}
