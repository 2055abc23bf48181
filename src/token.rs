use crate::textlocator::Location;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub location: Location,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    If,
    Then,
    Else,
    And,
    Or,
    Not,

    Plus,
    Minus,
    Asterisk,
    ForwardSlash,
    Hat,
    Mod,

    // Lexed but not part of any expression form.
    Ampersand,
    Pipe,

    DoubleEquals,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,

    Number(f64),
    OpenParen,
    CloseParen,
    Eof,
}

impl TokenKind {
    /// Source text of every fixed-spelling token; numbers have no single spelling.
    pub fn lexeme(&self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            If => "IF",
            Then => "THEN",
            Else => "ELSE",
            And => "AND",
            Or => "OR",
            Not => "NOT",
            Plus => "+",
            Minus => "-",
            Asterisk => "*",
            ForwardSlash => "/",
            Hat => "^",
            Mod => "%",
            Ampersand => "&",
            Pipe => "|",
            DoubleEquals => "==",
            NotEqual => "!=",
            LessThan => "<",
            GreaterThan => ">",
            LessThanOrEqual => "<=",
            GreaterThanOrEqual => ">=",
            OpenParen => "(",
            CloseParen => ")",
            Number(_) | Eof => return None,
        })
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Eof => write!(f, "end of input"),
            other => write!(f, "{}", other.lexeme().unwrap_or_default()),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}:{} {}", self.location.line, self.location.column, self.kind)
    }
}
