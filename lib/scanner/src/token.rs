use std::fmt::Display;

use cursor::{Col, Line, SourceRange};

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub data: TokenData<'a>,
    pub range: SourceRange<'a>,
}

impl<'a> Token<'a> {
    pub fn new(data: TokenData<'a>, range: impl Into<SourceRange<'a>>) -> Token<'a> {
        Self { data, range: range.into() }
    }

    /// Raw source text of the token. For string literals this excludes the quotes.
    pub fn lexeme(&self) -> &'a str {
        self.range.lexeme()
    }

    pub fn line(&self) -> Line {
        self.range.line()
    }

    pub fn col(&self) -> Col {
        self.range.col()
    }

    pub fn is_eof(&self) -> bool {
        self.data == TokenData::Eof
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.data {
            TokenData::Eof => write!(f, "end of input"),
            TokenData::Str(s) => write!(f, "\"{}\"", s),
            _ => write!(f, "`{}`", self.lexeme()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenData<'a> {
    LeftParen,
    RightParen,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Equality and relational
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Logical
    AndAnd,
    OrOr,

    // Literals
    Identifier,
    Str(&'a str),
    Number(f64),
    Bool(bool),
    Nil,

    Eof,
}
