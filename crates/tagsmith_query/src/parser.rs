//! Recursive-descent parser for the query grammar.
//!
//! ```text
//! query      := or_expr
//! or_expr    := and_expr ( "or"          and_expr )*
//! and_expr   := not_expr ( ["and"]       not_expr )*   juxtaposition = and
//! not_expr   := "not" not_expr | cmp_expr
//! cmp_expr   := primary ( cmp_op value )?
//! primary    := tag_name | "(" query ")"
//! ```
//!
//! Keywords (`and`, `or`, `not` and the comparison aliases `eq`, `ne`,
//! `lt`, `gt`, `le`, `ge`) are only recognised as unquoted whole
//! tokens; a tag literally named `and` is written `"and"`.

use crate::ast::{CompareOp, Expr};
use crate::lexer::{join_args, lex_text, Token, TokenKind};
use thiserror::Error;

/// Failure to parse a query, with the byte offset into the query text
/// at which the problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        ParseError { position, message: message.into() }
    }
}

const KEYWORDS: &[&str] = &["and", "or", "not", "eq", "ne", "lt", "gt", "le", "ge"];

/// Parse an argument vector into a query expression.
///
/// An empty argument vector (or arguments that are all whitespace) is a
/// valid empty query and yields `None`.
pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Option<Expr>, ParseError> {
    let text = join_args(args);
    let tokens = lex_text(&text)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut parser = Parser { tokens, index: 0, text_len: text.len() };
    let expr = parser.or_expr()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::new(
            token.pos,
            format!("unexpected {}", token.kind.describe()),
        ));
    }
    Ok(Some(expr))
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    text_len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn end_pos(&self) -> usize {
        self.text_len
    }

    /// True when the next token is the given unquoted keyword.
    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.peek(),
            Some(Token { kind: TokenKind::Word { text, quoted: false }, .. })
                if text == keyword
        )
    }

    /// True when the next token can begin a `not_expr`.
    fn at_term_start(&self) -> bool {
        match self.peek() {
            Some(Token { kind: TokenKind::OpenParen, .. }) => true,
            Some(Token { kind: TokenKind::Word { text, quoted }, .. }) => {
                if *quoted {
                    true
                } else {
                    // "not" begins a term; the other keywords cannot
                    match text.as_str() {
                        "and" | "or" => false,
                        "eq" | "ne" | "lt" | "gt" | "le" | "ge" => false,
                        _ => true,
                    }
                }
            }
            _ => false,
        }
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        while self.at_keyword("or") {
            self.advance();
            let right = self.and_expr()?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.not_expr()?;
        loop {
            if self.at_keyword("and") {
                self.advance();
            } else if !self.at_term_start() {
                break;
            }
            let right = self.not_expr()?;
            left = Expr::and(left, right);
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.at_keyword("not") {
            self.advance();
            let inner = self.not_expr()?;
            return Ok(Expr::not(inner));
        }
        self.cmp_expr()
    }

    fn cmp_expr(&mut self) -> Result<Expr, ParseError> {
        let (tag, tag_pos) = self.primary()?;

        let op = match self.peek_compare_op() {
            Some(op) => op,
            None => {
                return match tag {
                    Primary::Tag(name) => Ok(Expr::Tag(name)),
                    Primary::Group(expr) => Ok(expr),
                }
            }
        };
        let op_token = self.advance().expect("operator token present");

        let tag = match tag {
            Primary::Tag(name) => name,
            Primary::Group(_) => {
                return Err(ParseError::new(
                    tag_pos,
                    "left side of a comparison must be a tag name",
                ));
            }
        };

        let value = match self.advance() {
            Some(Token { kind: TokenKind::Word { text, quoted }, pos }) => {
                if !quoted && KEYWORDS.contains(&text.as_str()) {
                    return Err(ParseError::new(
                        pos,
                        format!("expected value, found keyword '{}'", text),
                    ));
                }
                text
            }
            Some(token) => {
                return Err(ParseError::new(
                    token.pos,
                    format!("expected value, found {}", token.kind.describe()),
                ));
            }
            None => {
                return Err(ParseError::new(
                    op_token.pos,
                    "expected value after comparison operator",
                ));
            }
        };

        Ok(Expr::Comparison { tag, op, value })
    }

    fn peek_compare_op(&self) -> Option<CompareOp> {
        match self.peek() {
            Some(Token { kind: TokenKind::Equal, .. }) => Some(CompareOp::Equal),
            Some(Token { kind: TokenKind::NotEqual, .. }) => Some(CompareOp::NotEqual),
            Some(Token { kind: TokenKind::Less, .. }) => Some(CompareOp::LessThan),
            Some(Token { kind: TokenKind::Greater, .. }) => Some(CompareOp::GreaterThan),
            Some(Token { kind: TokenKind::LessEqual, .. }) => Some(CompareOp::LessOrEqual),
            Some(Token { kind: TokenKind::GreaterEqual, .. }) => {
                Some(CompareOp::GreaterOrEqual)
            }
            Some(Token { kind: TokenKind::Word { text, quoted: false }, .. }) => {
                match text.as_str() {
                    "eq" => Some(CompareOp::Equal),
                    "ne" => Some(CompareOp::NotEqual),
                    "lt" => Some(CompareOp::LessThan),
                    "gt" => Some(CompareOp::GreaterThan),
                    "le" => Some(CompareOp::LessOrEqual),
                    "ge" => Some(CompareOp::GreaterOrEqual),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn primary(&mut self) -> Result<(Primary, usize), ParseError> {
        match self.advance() {
            Some(Token { kind: TokenKind::Word { text, quoted }, pos }) => {
                if !quoted && KEYWORDS.contains(&text.as_str()) {
                    return Err(ParseError::new(
                        pos,
                        format!("unexpected keyword '{}'", text),
                    ));
                }
                Ok((Primary::Tag(text), pos))
            }
            Some(Token { kind: TokenKind::OpenParen, pos }) => {
                let inner = self.or_expr()?;
                match self.advance() {
                    Some(Token { kind: TokenKind::CloseParen, .. }) => {}
                    Some(token) => {
                        return Err(ParseError::new(
                            token.pos,
                            format!("expected ')', found {}", token.kind.describe()),
                        ));
                    }
                    None => {
                        return Err(ParseError::new(self.end_pos(), "expected ')'"));
                    }
                }
                Ok((Primary::Group(inner), pos))
            }
            Some(token) => Err(ParseError::new(
                token.pos,
                format!("expected tag or '(', found {}", token.kind.describe()),
            )),
            None => Err(ParseError::new(self.end_pos(), "unexpected end of query")),
        }
    }
}

enum Primary {
    Tag(String),
    Group(Expr),
}
