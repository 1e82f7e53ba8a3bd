use cursor::{Col, Cursor, Line, SourceRange};

pub mod token;
pub use token::{Token, TokenData};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Unknown character `{character}` (l. {line}, c. {col})")]
    UnknownCharacter { character: char, line: Line, col: Col },
    #[error("Unterminated string starting at l. {line}, c. {col}")]
    UnterminatedString { line: Line, col: Col },
}

/// Scans the whole source eagerly. Fails on the first lexical error.
pub fn scan(source: &str) -> Result<Vec<Token<'_>>, ScanError> {
    TokenStream::new(source).collect()
}

/// Lazily produces the tokens of `source`, ending with a single `Eof` token.
///
/// After an error has been yielded the stream is exhausted.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source), done: false }
    }

    fn scan_token(&mut self) -> Result<Token<'a>, ScanError> {
        self.cursor.eat_while(is_whitespace);

        let start = self.cursor.clone();
        let Some(c) = self.cursor.next() else {
            return Ok(Token::new(Eof, (start.clone(), start)));
        };

        let data = match c {
            d if d.is_ascii_digit() => self.number(&start),
            '"' => return self.string(start),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(&start),

            '(' => LeftParen,
            ')' => RightParen,

            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,

            '=' if self.cursor.eat('=') => EqualEqual,
            '!' if self.cursor.eat('=') => BangEqual,
            '<' if self.cursor.eat('=') => LessEqual,
            '<' => Less,
            '>' if self.cursor.eat('=') => GreaterEqual,
            '>' => Greater,
            '&' if self.cursor.eat('&') => AndAnd,
            '|' if self.cursor.eat('|') => OrOr,

            character => {
                return Err(ScanError::UnknownCharacter {
                    character,
                    line: start.line(),
                    col: start.col(),
                })
            }
        };

        Ok(Token::new(data, (start, self.cursor.clone())))
    }

    fn number(&mut self, start: &Cursor<'a>) -> TokenData<'a> {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.next();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        // Digits with an optional fraction always form a valid f64, overflowing to inf.
        match start.slice_until(&self.cursor).parse() {
            Ok(n) => Number(n),
            Err(e) => unreachable!("Scanned an invalid number literal: {e}"),
        }
    }

    fn string(&mut self, quote: Cursor<'a>) -> Result<Token<'a>, ScanError> {
        let start = self.cursor.clone();
        self.cursor.eat_while(|c| c != '"');
        let end = self.cursor.clone();

        if !self.cursor.eat('"') {
            return Err(ScanError::UnterminatedString { line: quote.line(), col: quote.col() });
        }

        let range = SourceRange::new(start, end);
        Ok(Token::new(Str(range.lexeme()), range))
    }

    fn identifier(&mut self, start: &Cursor<'a>) -> TokenData<'a> {
        self.cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');

        match start.slice_until(&self.cursor) {
            "true" => Bool(true),
            "false" => Bool(false),
            "nil" => Nil,
            _ => Identifier,
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.scan_token();
        match &result {
            Ok(token) => {
                let (line, col) = (token.line(), token.col());
                log::trace!("{:?} {:?} at {line}:{col}", token.data, token.lexeme());
                self.done = token.is_eof();
            }
            Err(e) => {
                log::trace!("scan error: {e}");
                self.done = true;
            }
        }
        Some(result)
    }
}
