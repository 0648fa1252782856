//! Query parser: lexes a query, then reduces the token stream to a predicate.

use std::fmt;
use std::sync::Arc;

use crate::error::{QueryResult, StructuralError};
use crate::fields::FieldTable;
use crate::interaction::InteractionSource;
use crate::lexer::{LexOutput, Lexer, Token};
use crate::matcher::{DefaultMatcherFactory, MatcherFactory};
use crate::predicate::Predicate;
use crate::term::TermResolver;

/// A value the reducer can combine with boolean operators.
pub trait BooleanOperand: Sized {
    /// Both operands must hold.
    fn and(left: Self, right: Self) -> Self;
    /// Either operand must hold.
    fn or(left: Self, right: Self) -> Self;
    /// The operand must not hold.
    fn negate(self) -> Self;
    /// The value of an empty expression.
    fn never() -> Self;
}

impl BooleanOperand for Predicate {
    fn and(left: Self, right: Self) -> Self {
        Predicate::and(left, right)
    }

    fn or(left: Self, right: Self) -> Self {
        Predicate::or(left, right)
    }

    fn negate(self) -> Self {
        Predicate::negate(self)
    }

    fn never() -> Self {
        Predicate::Never
    }
}

/// Reduces a lexed token stream to a single value.
///
/// Operands are pushed on a stack; AND and OR pop two and push the result.
/// Each NOT right after a value negates it.
///
/// # Errors
///
/// Returns [`StructuralError::MissingOperand`] when an operator has fewer
/// than two operands, and [`StructuralError::MissingOperator`] when more than
/// one value is left at the end.
pub fn reduce<T: BooleanOperand>(tokens: Vec<Token<T>>) -> QueryResult<T> {
    let mut stack: Vec<T> = Vec::new();
    let mut tokens = tokens.into_iter().enumerate().peekable();

    while let Some((index, token)) = tokens.next() {
        let mut value = match token {
            Token::Not => continue,
            Token::Operand(operand) => operand,
            Token::And => {
                let (left, right) = pop_pair(&mut stack, index)?;
                T::and(left, right)
            }
            Token::Or => {
                let (left, right) = pop_pair(&mut stack, index)?;
                T::or(left, right)
            }
        };

        while tokens.next_if(|(_, next)| matches!(next, Token::Not)).is_some() {
            value = value.negate();
        }
        stack.push(value);
    }

    if stack.len() > 1 {
        return Err(StructuralError::MissingOperator {
            operands: stack.len(),
        }
        .into());
    }

    Ok(stack.pop().unwrap_or_else(T::never))
}

fn pop_pair<T>(stack: &mut Vec<T>, token_index: usize) -> QueryResult<(T, T)> {
    match (stack.pop(), stack.pop()) {
        (Some(right), Some(left)) => Ok((left, right)),
        _ => Err(StructuralError::MissingOperand { token_index }.into()),
    }
}

/// Compiles queries into predicates.
///
/// A parser holds the field table and the matcher factory its terms are
/// resolved with. It is cheap to clone and can be shared across threads.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use tag_query_rs::QueryParser;
///
/// let parser = QueryParser::new();
/// let predicate = parser.parse("fluttershy, NOT twilight sparkle").unwrap();
///
/// let doc = HashMap::from([(
///     "data-image-tag-aliases".to_string(),
///     "safe, solo, fluttershy".to_string(),
/// )]);
/// assert!(predicate.matches(&doc));
/// ```
#[derive(Clone)]
pub struct QueryParser {
    fields: FieldTable,
    factory: Arc<dyn MatcherFactory>,
}

impl fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParser")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryParser {
    /// Creates a parser with the default field table and no interactions.
    pub fn new() -> Self {
        Self {
            fields: FieldTable::default(),
            factory: Arc::new(DefaultMatcherFactory::default()),
        }
    }

    /// Uses a different field table.
    pub fn with_fields(mut self, fields: FieldTable) -> Self {
        self.fields = fields;
        self
    }

    /// Uses a different matcher factory.
    pub fn with_factory(mut self, factory: Arc<dyn MatcherFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Uses the default matcher factory reading `my:` terms from `source`.
    pub fn with_interactions(self, source: Arc<dyn InteractionSource>) -> Self {
        self.with_factory(Arc::new(DefaultMatcherFactory::new(source)))
    }

    /// The field table terms are resolved against.
    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    /// Lexes a query, resolving every term.
    ///
    /// # Errors
    ///
    /// Returns a lex error for unbalanced parentheses or a term error for a
    /// term that cannot be resolved.
    pub fn lex(&self, query: &str) -> QueryResult<LexOutput<Predicate>> {
        let resolver = TermResolver::new(&self.fields, self.factory.as_ref());
        Lexer::new(query).tokenize(|term, fuzz, boost| resolver.resolve(term, fuzz, boost))
    }

    /// Parses a query into a predicate.
    ///
    /// An empty query yields a predicate that matches nothing.
    ///
    /// # Errors
    ///
    /// Returns the first lex, term or structural error found. No partial
    /// predicate is ever returned.
    pub fn parse(&self, query: &str) -> QueryResult<Predicate> {
        let result = self.lex(query).and_then(|output| {
            let term_count = output.term_contexts.len();
            let token_count = output.tokens.len();
            reduce(output.tokens).map(|predicate| (predicate, term_count, token_count))
        });

        match result {
            Ok((predicate, term_count, token_count)) => {
                tracing::debug!(query, term_count, token_count, "parsed query");
                Ok(predicate)
            }
            Err(err) => {
                tracing::debug!(query, kind = err.kind(), error = %err, "rejected query");
                Err(err)
            }
        }
    }
}

/// Parses a query with the default field table and no interactions.
///
/// # Errors
///
/// See [`QueryParser::parse`].
pub fn parse(query: &str) -> QueryResult<Predicate> {
    QueryParser::new().parse(query)
}

/// Parses a query whose `my:` terms consult `source`.
///
/// # Errors
///
/// See [`QueryParser::parse`].
pub fn parse_with_interactions(
    query: &str,
    source: Arc<dyn InteractionSource>,
) -> QueryResult<Predicate> {
    QueryParser::new().with_interactions(source).parse(query)
}
