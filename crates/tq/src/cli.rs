//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the tq CLI.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

/// tq - Evaluate tag-search queries against JSON documents
#[derive(Parser, Debug)]
#[command(name = "tq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the documents a query matches
    #[command(alias = "m")]
    Match {
        /// Search query (e.g., "fluttershy, score.gte:100")
        query: String,

        /// JSON file holding an array of documents ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        documents: PathBuf,

        /// JSON file holding the current user's interactions
        #[arg(short, long)]
        interactions: Option<PathBuf>,

        /// Print the documents that do not match instead
        #[arg(long)]
        invert: bool,

        /// Only print the number of matching documents
        #[arg(short, long)]
        count: bool,

        /// Instant relative dates are measured from (RFC 3339, default: now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Show how a query is tokenized
    Lex {
        /// Search query
        query: String,
    },

    /// Check that a query parses
    #[command(alias = "c")]
    Check {
        /// Search query
        query: String,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Supported shells for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,
}
