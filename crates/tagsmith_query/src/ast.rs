//! Query abstract syntax tree.

use std::fmt;

/// Comparison operator in a `tag OP value` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
}

impl CompareOp {
    /// Canonical symbol, as accepted by the lexer.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::LessThan => "<",
            CompareOp::GreaterThan => ">",
            CompareOp::LessOrEqual => "<=",
            CompareOp::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// File bears the named tag (or any tag it transitively implies).
    Tag(String),
    /// File bears the named tag with a value satisfying the comparison.
    Comparison {
        tag: String,
        op: CompareOp,
        value: String,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Expr {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn not(inner: Expr) -> Expr {
        Expr::Not(Box::new(inner))
    }

    /// Tag names referenced anywhere in the expression.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_tag_names(&mut names);
        names
    }

    fn collect_tag_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Tag(name) => names.push(name),
            Expr::Comparison { tag, .. } => names.push(tag),
            Expr::Not(inner) => inner.collect_tag_names(names),
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.collect_tag_names(names);
                right.collect_tag_names(names);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(..) => 1,
            Expr::And(..) => 2,
            Expr::Not(..) => 3,
            Expr::Tag(_) | Expr::Comparison { .. } => 4,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        let wrap = self.precedence() < min;
        if wrap {
            f.write_str("(")?;
        }
        match self {
            Expr::Tag(name) => write_word(f, name)?,
            Expr::Comparison { tag, op, value } => {
                write_word(f, tag)?;
                write!(f, " {} ", op)?;
                write_word(f, value)?;
            }
            Expr::Not(inner) => {
                f.write_str("not ")?;
                inner.fmt_prec(f, 3)?;
            }
            Expr::And(left, right) => {
                left.fmt_prec(f, 2)?;
                f.write_str(" and ")?;
                right.fmt_prec(f, 3)?;
            }
            Expr::Or(left, right) => {
                left.fmt_prec(f, 1)?;
                f.write_str(" or ")?;
                right.fmt_prec(f, 2)?;
            }
        }
        if wrap {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Canonical printing: `parse(&[expr.to_string()])` yields `expr` back.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}

/// Words that collide with a keyword or would not survive relexing are
/// emitted quoted.
fn write_word(f: &mut fmt::Formatter<'_>, word: &str) -> fmt::Result {
    if needs_quoting(word) {
        let quote = if word.contains('"') { '\'' } else { '"' };
        write!(f, "{}{}{}", quote, word, quote)
    } else {
        f.write_str(word)
    }
}

fn needs_quoting(word: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "and", "or", "not", "eq", "ne", "lt", "gt", "le", "ge",
    ];
    word.is_empty()
        || KEYWORDS.contains(&word)
        || word
            .chars()
            .any(|c| c.is_whitespace() || "=!<>(),\"'".contains(c))
}
