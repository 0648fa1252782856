//! Boolean tag-search query compiler.
//!
//! This crate compiles a search query such as
//! `fluttershy, (score.gte:100 OR my:faves), -created_at:2 days ago` into a
//! [`Predicate`] that decides whether a document matches. Documents expose
//! their metadata through the [`Document`] trait, so the same predicate can
//! run against rendered gallery thumbnails, JSON records or database rows.
//!
//! # Query Syntax
//!
//! ## Connectives
//! - `AND`, `&&`, `,` - both sides must match
//! - `OR`, `||` - either side must match
//! - `NOT`, leading `!` or `-` - negation
//! - `()` - grouping
//!
//! AND binds tighter than OR: `a OR b AND c` means `a OR (b AND c)`.
//!
//! ## Terms
//! - `term` - matched against the `tags` field; `*` and `?` are wildcards
//! - `"term"` - quoted, no wildcards
//! - `term~N` - fuzzy match (edit distance N, or similarity N when below 1)
//! - `term^N` - boost, accepted and ignored
//!
//! ## Fields
//! - `field:value` for literal, number and date fields
//! - `field.lt:value` (also `lte`, `gt`, `gte`, `eq`) for number and date fields
//! - `my:faves`, `my:upvotes`, `my:downvotes` for the current user's interactions
//!
//! Dates are absolute (`2024`, `2024-06-01T12:00+02:00`) or relative
//! (`3 days ago`) and always denote a range of instants.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//!
//! let predicate = tag_query_rs::parse("fluttershy AND score.gte:100").unwrap();
//!
//! let doc = HashMap::from([
//!     ("data-image-tag-aliases".to_string(), "safe, solo, fluttershy".to_string()),
//!     ("data-score".to_string(), "250".to_string()),
//! ]);
//! assert!(predicate.matches(&doc));
//!
//! let err = tag_query_rs::parse("(safe) solo").unwrap_err();
//! assert_eq!(err.to_string(), "Missing operator.");
//! ```

mod document;
mod error;
mod fields;
mod interaction;
pub mod lexer;
pub mod matcher;
mod parser;
mod predicate;
mod term;

pub use document::Document;
pub use error::{LexError, Paren, QueryError, QueryResult, StructuralError, TermError};
pub use fields::{
    FieldKind, FieldTable, Qualifier, DATE_FIELDS, DEFAULT_FIELD, ID_FIELD, LITERAL_FIELDS,
    NUMBER_FIELDS, USER_FIELD,
};
pub use interaction::{Interaction, InteractionSource, InteractionType, InteractionValue};
pub use lexer::{LexOutput, Lexer, TermContext, Token};
pub use matcher::{DefaultMatcherFactory, FieldMatcher, MatcherFactory};
pub use parser::{parse, parse_with_interactions, reduce, BooleanOperand, QueryParser};
pub use predicate::{Predicate, TermPredicate};
pub use term::{is_quoted_literal, TermResolver};
