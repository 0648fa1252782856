//! Output formatting utilities for the tq CLI.
//!
//! This module provides functions for formatting data as tables or JSON:
//!
//! - [`documents`] - Matched documents (match command)
//! - [`tokens`] - Lexer output (lex command)
//! - [`helpers`] - Common formatting utilities (truncation)

mod documents;
pub mod helpers;
mod tokens;

pub use documents::{format_documents_json, format_documents_table, MatchSummary};
pub use tokens::{format_tokens_json, format_tokens_table};
