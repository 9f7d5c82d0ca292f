//! Query tokeniser.
//!
//! The query arrives as an ordered sequence of argument strings. The
//! arguments are joined with single spaces and the joined text is
//! tokenised, so `["size", "=", "100"]`, `["size = 100"]` and
//! `["size=100"]` all produce the same token stream. Token positions
//! are byte offsets into the joined text.

use crate::parser::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A tag name, value literal or keyword. `quoted` words are never
    /// interpreted as keywords.
    Word { text: String, quoted: bool },
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    OpenParen,
    CloseParen,
}

impl TokenKind {
    /// Source rendering, for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Word { text, .. } => format!("'{}'", text),
            TokenKind::Equal => "'='".into(),
            TokenKind::NotEqual => "'!='".into(),
            TokenKind::Less => "'<'".into(),
            TokenKind::Greater => "'>'".into(),
            TokenKind::LessEqual => "'<='".into(),
            TokenKind::GreaterEqual => "'>='".into(),
            TokenKind::OpenParen => "'('".into(),
            TokenKind::CloseParen => "')'".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset in the joined query text.
    pub pos: usize,
}

/// Characters that terminate an unquoted word.
fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || "=!<>(),\"'".contains(c)
}

/// Join the argument vector into the canonical query text.
pub fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| a.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenise the argument vector into a single token stream.
pub fn lex<S: AsRef<str>>(args: &[S]) -> Result<Vec<Token>, ParseError> {
    lex_text(&join_args(args))
}

/// Tokenise already-joined query text.
pub fn lex_text(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            _ if c.is_whitespace() => {}
            '(' => tokens.push(Token { kind: TokenKind::OpenParen, pos }),
            ')' => tokens.push(Token { kind: TokenKind::CloseParen, pos }),
            '=' => {
                // accept both '=' and '=='
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                }
                tokens.push(Token { kind: TokenKind::Equal, pos });
            }
            '!' => match chars.peek() {
                Some((_, '=')) => {
                    chars.next();
                    tokens.push(Token { kind: TokenKind::NotEqual, pos });
                }
                _ => {
                    return Err(ParseError::new(pos, "unexpected character '!'"));
                }
            },
            '<' => {
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token { kind: TokenKind::LessEqual, pos });
                } else {
                    tokens.push(Token { kind: TokenKind::Less, pos });
                }
            }
            '>' => {
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token { kind: TokenKind::GreaterEqual, pos });
                } else {
                    tokens.push(Token { kind: TokenKind::Greater, pos });
                }
            }
            ',' => {
                return Err(ParseError::new(pos, "unexpected character ','"));
            }
            '"' | '\'' => {
                let mut text = String::new();
                let mut closed = false;
                for (_, qc) in chars.by_ref() {
                    if qc == c {
                        closed = true;
                        break;
                    }
                    text.push(qc);
                }
                if !closed {
                    return Err(ParseError::new(pos, "unterminated quoted string"));
                }
                tokens.push(Token {
                    kind: TokenKind::Word { text, quoted: true },
                    pos,
                });
            }
            _ => {
                let mut text = String::new();
                text.push(c);
                while let Some((_, wc)) = chars.peek() {
                    if is_word_boundary(*wc) {
                        break;
                    }
                    text.push(*wc);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Word { text, quoted: false },
                    pos,
                });
            }
        }
    }

    Ok(tokens)
}
