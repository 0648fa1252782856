//! Lexer output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use tag_query_rs::{LexOutput, Predicate, Token};

/// JSON output structure for a single token.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TokenOutput<'a> {
    Term {
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<&'a str>,
        content: &'a str,
        start: usize,
        end: usize,
    },
    And,
    Or,
    Not,
}

/// JSON output structure for the lex command.
#[derive(Serialize)]
struct TokensOutput<'a> {
    query: &'a str,
    tokens: Vec<TokenOutput<'a>>,
}

fn field_of(predicate: &Predicate) -> Option<&str> {
    match predicate {
        Predicate::Term(term) => Some(term.field()),
        _ => None,
    }
}

/// Pairs each token with its term context, operands consuming contexts in order.
fn token_outputs(output: &LexOutput<Predicate>) -> Vec<TokenOutput<'_>> {
    let mut contexts = output.term_contexts.iter();
    output
        .tokens
        .iter()
        .map(|token| match token {
            Token::Operand(predicate) => {
                let (content, start, end) = contexts
                    .next()
                    .map_or(("", 0, 0), |ctx| {
                        (ctx.content.as_str(), ctx.range.start, ctx.range.end)
                    });
                TokenOutput::Term {
                    field: field_of(predicate),
                    content,
                    start,
                    end,
                }
            }
            Token::And => TokenOutput::And,
            Token::Or => TokenOutput::Or,
            Token::Not => TokenOutput::Not,
        })
        .collect()
}

/// Formats lexer output as JSON.
pub fn format_tokens_json(
    query: &str,
    output: &LexOutput<Predicate>,
) -> Result<String, serde_json::Error> {
    let output = TokensOutput {
        query,
        tokens: token_outputs(output),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats lexer output as a table, one token per line.
pub fn format_tokens_table(output: &LexOutput<Predicate>, use_colors: bool) -> String {
    let tokens = token_outputs(output);
    if tokens.is_empty() {
        return "No tokens.\n".to_string();
    }

    let mut out = String::new();

    let header = format!("{:<6} {:<12} {:<10} {}", "Token", "Field", "Range", "Content");
    if use_colors {
        out.push_str(&format!("{}\n", header.dimmed()));
    } else {
        out.push_str(&header);
        out.push('\n');
    }

    for token in &tokens {
        let line = match token {
            TokenOutput::Term {
                field,
                content,
                start,
                end,
            } => format!(
                "{:<6} {:<12} {:<10} {}",
                "TERM",
                field.unwrap_or("-"),
                format!("{start}..{end}"),
                content
            ),
            TokenOutput::And => operator_line("AND", use_colors),
            TokenOutput::Or => operator_line("OR", use_colors),
            TokenOutput::Not => operator_line("NOT", use_colors),
        };
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn operator_line(name: &str, use_colors: bool) -> String {
    if use_colors {
        name.yellow().to_string()
    } else {
        name.to_string()
    }
}
