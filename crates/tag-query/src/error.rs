//! Error types for the query compiler.
//!
//! Every failure happens at parse time. Once a [`Predicate`](crate::Predicate)
//! has been built, evaluating it never errors.

use std::fmt;

use thiserror::Error;

/// A specialized Result type for query parsing operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while compiling a query.
///
/// The display string of each variant is the human-readable message hosts
/// have historically shown to users; the variants themselves carry the
/// structured details.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The query could not be split into tokens.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A single term could not be turned into a field matcher.
    #[error(transparent)]
    Term(#[from] TermError),

    /// The token stream does not form a complete boolean expression.
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Which side of a parenthesis pair was left unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paren {
    /// An opening `(` that was never closed.
    Open,
    /// A closing `)` with no group to close.
    Close,
}

impl fmt::Display for Paren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paren::Open => f.write_str("("),
            Paren::Close => f.write_str(")"),
        }
    }
}

/// Errors raised by the lexer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    /// A parenthesis has no partner.
    #[error("Mismatched parentheses.")]
    MismatchedParentheses {
        /// The unmatched parenthesis.
        paren: Paren,
        /// Byte offset of the parenthesis in the query.
        position: usize,
    },
}

/// Errors raised while resolving a term into a field matcher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TermError {
    /// A date literal is neither a valid relative nor absolute date.
    #[error("Cannot parse date string: {value}")]
    InvalidDate {
        /// The date string as written in the query.
        value: String,
    },

    /// A relative date is too far in the past to represent.
    #[error("Cannot parse date string: {value}")]
    DateOutOfRange {
        /// The date string as written in the query.
        value: String,
    },

    /// A wildcard term could not be compiled.
    #[error("invalid wildcard pattern {pattern}: {reason}")]
    InvalidWildcard {
        /// The wildcard term.
        pattern: String,
        /// Why compilation failed.
        reason: String,
    },
}

/// Errors raised while reducing the token stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructuralError {
    /// A binary operator had fewer than two operands available.
    #[error("Missing operand.")]
    MissingOperand {
        /// Index of the operator in the token stream.
        token_index: usize,
    },

    /// More than one operand was left after reduction.
    #[error("Missing operator.")]
    MissingOperator {
        /// Number of operands left on the stack.
        operands: usize,
    },
}

impl TermError {
    /// Creates an invalid date error.
    pub fn invalid_date(value: impl Into<String>) -> Self {
        TermError::InvalidDate {
            value: value.into(),
        }
    }
}

impl QueryError {
    /// Returns a short, stable name for the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Lex(_) => "lex",
            QueryError::Term(_) => "term",
            QueryError::Structural(_) => "structural",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err: QueryError = LexError::MismatchedParentheses {
            paren: Paren::Open,
            position: 0,
        }
        .into();
        assert_eq!(err.to_string(), "Mismatched parentheses.");

        let err: QueryError = StructuralError::MissingOperand { token_index: 0 }.into();
        assert_eq!(err.to_string(), "Missing operand.");

        let err: QueryError = StructuralError::MissingOperator { operands: 2 }.into();
        assert_eq!(err.to_string(), "Missing operator.");

        let err: QueryError = TermError::invalid_date("3 test failures ago").into();
        assert_eq!(
            err.to_string(),
            "Cannot parse date string: 3 test failures ago"
        );
    }

    #[test]
    fn test_kind() {
        let err: QueryError = StructuralError::MissingOperator { operands: 2 }.into();
        assert_eq!(err.kind(), "structural");

        let err: QueryError = TermError::invalid_date("x").into();
        assert_eq!(err.kind(), "term");
    }
}
