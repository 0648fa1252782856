//! Lexer (tokenizer) for tag-search queries.
//!
//! The lexer does more than split text. It resolves each term as soon as the
//! term ends and orders operators so that they trail their operands, with AND
//! binding tighter than OR, parentheses overriding both, and NOT applying to
//! the operand or group right after it. The reducer then only has to fold
//! the stream with a stack.
//!
//! Terms are forgiving. Once a term has started, parentheses, `NOT`, `-` and
//! `~`/`^` suffixes that are followed by more text are taken literally, so
//! `rose (flower)` and `this NOT that` are single terms. Only a binary
//! operator or a `)` closing an enclosing group ends a term.

use std::ops::Range;

use serde::Serialize;

use crate::error::{LexError, Paren, QueryResult};

/// A token in the lexer's output stream.
///
/// Operators always follow the operands they apply to.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<T> {
    /// A resolved term.
    Operand(T),
    /// Logical AND of the two preceding values.
    And,
    /// Logical OR of the two preceding values.
    Or,
    /// Negates the value produced just before it.
    Not,
}

/// Where a term sits in the query, for editor integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermContext {
    /// Byte range of the term in the query.
    pub range: Range<usize>,
    /// The term text as handed to the term resolver.
    pub content: String,
}

/// The result of lexing a query.
#[derive(Debug, Clone, PartialEq)]
pub struct LexOutput<T> {
    /// Operands and operators, operators trailing their operands.
    pub tokens: Vec<Token<T>>,
    /// One entry per operand, in order.
    pub term_contexts: Vec<TermContext>,
}

impl<T> LexOutput<T> {
    /// Returns the term under a cursor at byte `offset`.
    ///
    /// A cursor right after the last character of a term counts as inside it.
    pub fn term_at(&self, offset: usize) -> Option<&TermContext> {
        self.term_contexts
            .iter()
            .find(|ctx| ctx.range.start <= offset && offset <= ctx.range.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lexeme {
    Fuzz(f64),
    Boost(f64),
    Quoted,
    LParen,
    RParen,
    And,
    Or,
    Not,
    Space,
    Word,
}

/// A lexeme found at some position.
#[derive(Debug, Clone, PartialEq)]
struct Scanned {
    lexeme: Lexeme,
    /// The significant characters, without surrounding whitespace.
    content: Range<usize>,
    /// Where scanning resumes.
    end: usize,
}

/// Operators waiting for their right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueuedOp {
    And,
    Or,
    Group { position: usize },
}

/// A term being accumulated.
#[derive(Debug, Clone, PartialEq)]
struct PendingTerm {
    start: usize,
    end: usize,
    fuzz: f64,
    boost: f64,
    /// Parentheses opened inside the term and not yet closed.
    open_parens: usize,
}

impl PendingTerm {
    fn new(content: Range<usize>) -> Self {
        Self {
            start: content.start,
            end: content.end,
            fuzz: 0.0,
            boost: 1.0,
            open_parens: 0,
        }
    }

    /// Appends text to the term. A `~`/`^` suffix seen before it becomes
    /// part of the text.
    fn extend(&mut self, content: Range<usize>) {
        self.end = content.end;
        self.fuzz = 0.0;
        self.boost = 1.0;
    }
}

/// Lexer state, stepped once per lexeme.
#[derive(Debug)]
struct LexState<T> {
    operator_queue: Vec<QueuedOp>,
    group_negate: Vec<bool>,
    pending_term: Option<PendingTerm>,
    pending_negate: bool,
    tokens: Vec<Token<T>>,
    term_contexts: Vec<TermContext>,
}

impl<T> LexState<T> {
    fn new() -> Self {
        Self {
            operator_queue: Vec::new(),
            group_negate: Vec::new(),
            pending_term: None,
            pending_negate: false,
            tokens: Vec::new(),
            term_contexts: Vec::new(),
        }
    }

    fn step<F>(&mut self, query: &str, scanned: Scanned, resolve: &mut F) -> QueryResult<()>
    where
        F: FnMut(&str, f64, f64) -> QueryResult<T>,
    {
        let Scanned {
            lexeme, content, ..
        } = scanned;

        let ends_term = match lexeme {
            Lexeme::And | Lexeme::Or => true,
            Lexeme::RParen => self
                .pending_term
                .as_ref()
                .is_some_and(|term| term.open_parens == 0),
            _ => false,
        };
        if ends_term {
            self.flush(query, resolve)?;
        }

        match (lexeme, self.pending_term.as_mut()) {
            (Lexeme::And, _) => self.push_and(),
            (Lexeme::Or, _) => self.push_or(),
            (Lexeme::Space, _) => {}
            (Lexeme::Fuzz(fuzz), Some(term)) => term.fuzz = fuzz,
            (Lexeme::Boost(boost), Some(term)) => term.boost = boost,
            (Lexeme::LParen, Some(term)) => {
                term.extend(content);
                term.open_parens += 1;
            }
            (Lexeme::RParen, Some(term)) => {
                term.extend(content);
                term.open_parens -= 1;
            }
            (Lexeme::Not | Lexeme::Quoted | Lexeme::Word, Some(term)) => term.extend(content),
            (Lexeme::LParen, None) => self.open_group(content.start),
            (Lexeme::RParen, None) => self.close_group(content.start)?,
            (Lexeme::Not, None) => self.pending_negate = !self.pending_negate,
            (Lexeme::Fuzz(_) | Lexeme::Boost(_) | Lexeme::Quoted | Lexeme::Word, None) => {
                self.pending_term = Some(PendingTerm::new(content));
            }
        }
        Ok(())
    }

    /// Resolves the pending term, then emits a pending negation.
    fn flush<F>(&mut self, query: &str, resolve: &mut F) -> QueryResult<()>
    where
        F: FnMut(&str, f64, f64) -> QueryResult<T>,
    {
        if let Some(term) = self.pending_term.take() {
            let text = &query[term.start..term.end];
            let operand = resolve(text, term.fuzz, term.boost)?;
            self.tokens.push(Token::Operand(operand));
            self.term_contexts.push(TermContext {
                range: term.start..term.end,
                content: text.to_string(),
            });
        }
        if self.pending_negate {
            self.tokens.push(Token::Not);
            self.pending_negate = false;
        }
        Ok(())
    }

    fn emit(&mut self, op: QueuedOp) {
        match op {
            QueuedOp::And => self.tokens.push(Token::And),
            QueuedOp::Or => self.tokens.push(Token::Or),
            QueuedOp::Group { .. } => {}
        }
    }

    /// Queues an AND after emitting queued ANDs, making AND left-associative.
    fn push_and(&mut self) {
        while let Some(&QueuedOp::And) = self.operator_queue.last() {
            self.operator_queue.pop();
            self.emit(QueuedOp::And);
        }
        self.operator_queue.push(QueuedOp::And);
    }

    /// Queues an OR after emitting queued ANDs and ORs, so AND binds tighter.
    fn push_or(&mut self) {
        while let Some(&op @ (QueuedOp::And | QueuedOp::Or)) = self.operator_queue.last() {
            self.operator_queue.pop();
            self.emit(op);
        }
        self.operator_queue.push(QueuedOp::Or);
    }

    fn open_group(&mut self, position: usize) {
        self.operator_queue.push(QueuedOp::Group { position });
        self.group_negate.push(self.pending_negate);
        self.pending_negate = false;
    }

    fn close_group(&mut self, position: usize) -> QueryResult<()> {
        loop {
            match self.operator_queue.pop() {
                Some(QueuedOp::Group { .. }) => break,
                Some(op) => self.emit(op),
                None => {
                    return Err(LexError::MismatchedParentheses {
                        paren: Paren::Close,
                        position,
                    }
                    .into())
                }
            }
        }
        if self.group_negate.pop() == Some(true) {
            self.tokens.push(Token::Not);
        }
        Ok(())
    }

    fn finish<F>(mut self, query: &str, resolve: &mut F) -> QueryResult<LexOutput<T>>
    where
        F: FnMut(&str, f64, f64) -> QueryResult<T>,
    {
        self.flush(query, resolve)?;

        let unclosed = self.operator_queue.iter().find_map(|op| match op {
            QueuedOp::Group { position } => Some(*position),
            _ => None,
        });
        if let Some(position) = unclosed {
            return Err(LexError::MismatchedParentheses {
                paren: Paren::Open,
                position,
            }
            .into());
        }

        while let Some(op) = self.operator_queue.pop() {
            self.emit(op);
        }

        Ok(LexOutput {
            tokens: self.tokens,
            term_contexts: self.term_contexts,
        })
    }
}

/// Lexer for tag-search queries.
#[derive(Debug, Clone, Copy)]
pub struct Lexer<'q> {
    query: &'q str,
}

impl<'q> Lexer<'q> {
    /// Creates a new lexer for the given query.
    pub fn new(query: &'q str) -> Self {
        Self { query }
    }

    /// Lexes the whole query.
    ///
    /// `resolve` is called with `(term, fuzz, boost)` for each term, in
    /// order, as soon as the term ends. Fuzz defaults to 0 and boost to 1.
    ///
    /// # Errors
    ///
    /// Returns [`LexError::MismatchedParentheses`] for unbalanced groups, or
    /// whatever error `resolve` returns.
    pub fn tokenize<T, F>(&self, mut resolve: F) -> QueryResult<LexOutput<T>>
    where
        F: FnMut(&str, f64, f64) -> QueryResult<T>,
    {
        let mut state = LexState::new();
        let mut position = 0;
        while position < self.query.len() {
            let scanned = self.scan(position);
            position = scanned.end;
            state.step(self.query, scanned, &mut resolve)?;
        }
        state.finish(self.query, &mut resolve)
    }

    /// Finds the lexeme at `position`. Patterns are tried in a fixed order
    /// and the first that matches wins.
    fn scan(&self, position: usize) -> Scanned {
        let rest = &self.query[position..];
        let found = scan_fuzz(rest)
            .or_else(|| scan_boost(rest))
            .or_else(|| scan_quoted(rest))
            .or_else(|| scan_paren(rest, '(', Lexeme::LParen))
            .or_else(|| scan_paren(rest, ')', Lexeme::RParen))
            .or_else(|| scan_binary(rest, &["&&", "AND"], Lexeme::And))
            .or_else(|| scan_comma(rest))
            .or_else(|| scan_binary(rest, &["||", "OR"], Lexeme::Or))
            .or_else(|| scan_not_keyword(rest))
            .or_else(|| scan_not_symbol(rest))
            .or_else(|| scan_space(rest))
            .or_else(|| scan_word(rest, is_term_delimiter))
            .or_else(|| scan_word(rest, is_group_delimiter));

        // Every character starts at least a one-character word; this only
        // guards the invariant.
        let (lexeme, content, len) = found.unwrap_or_else(|| {
            let len = rest.chars().next().map_or(1, char::len_utf8);
            (Lexeme::Word, 0..len, len)
        });

        Scanned {
            lexeme,
            content: position + content.start..position + content.end,
            end: position + len,
        }
    }
}

/// A match relative to the scanned slice: lexeme, content range, length.
type Found = (Lexeme, Range<usize>, usize);

fn leading_space(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Length of `.digits` at the start of `s`, if present.
fn fraction(s: &str) -> Option<usize> {
    let digits = leading_digits(s.strip_prefix('.')?);
    (digits > 0).then_some(1 + digits)
}

/// `~N`, `~N.M` or `~.M`
fn scan_fuzz(s: &str) -> Option<Found> {
    let body = s.strip_prefix('~')?;
    let digits = leading_digits(body);
    let len = if digits > 0 {
        digits + fraction(&body[digits..]).unwrap_or(0)
    } else {
        fraction(body)?
    };
    let value = body[..len].parse().ok()?;
    Some((Lexeme::Fuzz(value), 0..len + 1, len + 1))
}

/// `^N` or `^N.M`, optionally signed
fn scan_boost(s: &str) -> Option<Found> {
    let body = s.strip_prefix('^')?;
    let sign = usize::from(body.starts_with(['+', '-']));
    let digits = leading_digits(&body[sign..]);
    if digits == 0 {
        return None;
    }
    let len = sign + digits + fraction(&body[sign + digits..]).unwrap_or(0);
    let value = body[..len].parse().ok()?;
    Some((Lexeme::Boost(value), 0..len + 1, len + 1))
}

/// `"..."` holding at least one character, where `\"` does not close.
fn scan_quoted(s: &str) -> Option<Found> {
    let ws = leading_space(s);
    let body = s[ws..].strip_prefix('"')?;
    let mut chars = body.char_indices().peekable();
    let mut inner = 0;
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if chars.peek().is_some_and(|&(_, next)| next == '"') => {
                chars.next();
                inner += 1;
            }
            '"' if inner > 0 => {
                let end = ws + 1 + i + 1;
                return Some((Lexeme::Quoted, ws..end, end));
            }
            '"' => return None,
            _ => inner += 1,
        }
    }
    None
}

/// A parenthesis with any surrounding whitespace.
fn scan_paren(s: &str, paren: char, lexeme: Lexeme) -> Option<Found> {
    let ws = leading_space(s);
    let after = s[ws..].strip_prefix(paren)?;
    let end = ws + 1 + leading_space(after);
    Some((lexeme, ws..ws + 1, end))
}

/// A spelled-out binary operator, which must be followed by whitespace.
fn scan_binary(s: &str, spellings: &[&str], lexeme: Lexeme) -> Option<Found> {
    let ws = leading_space(s);
    let body = &s[ws..];
    spellings.iter().find_map(|op| {
        let after = body.strip_prefix(op)?;
        let trailing = leading_space(after);
        (trailing > 0).then(|| (lexeme, ws..ws + op.len(), ws + op.len() + trailing))
    })
}

/// A bare comma, which means AND.
fn scan_comma(s: &str) -> Option<Found> {
    let ws = leading_space(s);
    let after = s[ws..].strip_prefix(',')?;
    Some((Lexeme::And, ws..ws + 1, ws + 1 + leading_space(after)))
}

/// `NOT` followed by whitespace or an opening parenthesis.
fn scan_not_keyword(s: &str) -> Option<Found> {
    let ws = leading_space(s);
    let after = s[ws..].strip_prefix("NOT")?;
    let content = ws..ws + 3;
    if after.starts_with('(') {
        return Some((Lexeme::Not, content.clone(), content.end));
    }
    let trailing = leading_space(after);
    (trailing > 0).then(|| (Lexeme::Not, content.clone(), content.end + trailing))
}

/// A leading `!` or `-`.
fn scan_not_symbol(s: &str) -> Option<Found> {
    let ws = leading_space(s);
    let after = s[ws..].strip_prefix(['!', '-'])?;
    Some((Lexeme::Not, ws..ws + 1, ws + 1 + leading_space(after)))
}

fn scan_space(s: &str) -> Option<Found> {
    let ws = leading_space(s);
    (ws > 0).then_some((Lexeme::Space, 0..0, ws))
}

fn is_term_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '(' | ')' | '^' | '~')
}

fn is_group_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '(' | ')')
}

/// A run of non-delimiter characters; a backslash escapes a delimiter.
fn scan_word(s: &str, is_delimiter: fn(char) -> bool) -> Option<Found> {
    let mut chars = s.char_indices().peekable();
    let mut end = 0;
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            if let Some(&(j, next)) = chars.peek() {
                if is_delimiter(next) {
                    chars.next();
                    end = j + next.len_utf8();
                    continue;
                }
            }
        }
        if is_delimiter(c) {
            break;
        }
        end = i + c.len_utf8();
    }
    (end > 0).then_some((Lexeme::Word, 0..end, end))
}
