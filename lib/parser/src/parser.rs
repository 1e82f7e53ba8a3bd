use std::{iter::Peekable, vec};

use cursor::{Col, Line};
use scanner::{ScanError, Token, TokenData};

mod expr;
pub use expr::{BinaryOp, Expr, Program};

use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Expected {expected} but found {found} (l. {line}, c. {col})")]
    Syntax { expected: Expected, found: String, line: Line, col: Col },
    #[error("Expression nested too deeply (l. {line}, c. {col})")]
    TooDeeplyNested { line: Line, col: Col },
}

impl ParseError {
    fn syntax(expected: Expected, token: &Token) -> Self {
        ParseError::Syntax {
            expected,
            found: token.to_string(),
            line: token.line(),
            col: token.col(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Expression,
    ClosingParen,
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Expected::Expression => "expression",
                Expected::ClosingParen => "closing `)` after expression",
            }
        )
    }
}

type Result<T> = std::result::Result<T, ParseError>;

/// Bound on open groups plus pending operators in one chain. Keeps the recursion of
/// parsing, evaluating and dropping the tree within the stack.
pub const MAX_NESTING: usize = 256;

/// Scans and parses `source` into a [`Program`].
pub fn parse(source: &str) -> Result<Program> {
    let tokens = scanner::scan(source)?;
    let program = Parser::new(tokens).parse()?;
    log::debug!("parsed program: {program}");
    Ok(program)
}

#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Peekable<vec::IntoIter<Token<'a>>>,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// `tokens` must be terminated by an `Eof` token, as produced by [`scanner::scan`].
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self { tokens: tokens.into_iter().peekable(), depth: 0 }
    }

    pub fn parse(mut self) -> Result<Program> {
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.expression()?);
        }
        Ok(Program { body })
    }

    fn expression(&mut self) -> Result<Expr> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr> {
        let mut expr = self.and()?;
        let depth = self.depth;

        while let Some(op @ BinaryOp::Or) = self.peek_op() {
            let token = self.advance();
            self.nest(&token)?;
            let right = self.and()?;
            expr = Expr::binary(expr, op, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut expr = self.equality()?;
        let depth = self.depth;

        while let Some(op @ BinaryOp::And) = self.peek_op() {
            let token = self.advance();
            self.nest(&token)?;
            let right = self.equality()?;
            expr = Expr::binary(expr, op, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.relational()?;
        let depth = self.depth;

        while let Some(op @ (BinaryOp::Equal | BinaryOp::NotEqual)) = self.peek_op() {
            let token = self.advance();
            self.nest(&token)?;
            let right = self.relational()?;
            expr = Expr::binary(expr, op, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn relational(&mut self) -> Result<Expr> {
        let mut expr = self.additive()?;
        let depth = self.depth;

        while let Some(
            op @ (BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual),
        ) = self.peek_op()
        {
            let token = self.advance();
            self.nest(&token)?;
            let right = self.additive()?;
            expr = Expr::binary(expr, op, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut expr = self.multiplicative()?;
        let depth = self.depth;

        while let Some(op @ (BinaryOp::Add | BinaryOp::Sub)) = self.peek_op() {
            let token = self.advance();
            self.nest(&token)?;
            let right = self.multiplicative()?;
            expr = Expr::binary(expr, op, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        let depth = self.depth;

        while let Some(op @ (BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem)) = self.peek_op() {
            let token = self.advance();
            self.nest(&token)?;
            let right = self.primary()?;
            expr = Expr::binary(expr, op, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        match token.data {
            Number(value) => Ok(Expr::Number { text: token.lexeme().to_string(), value }),
            Str(s) => Ok(Expr::Str { value: s.to_string() }),
            Bool(value) => Ok(Expr::Boolean { value }),
            Nil => Ok(Expr::Nil),
            Identifier => Ok(Expr::Identifier { name: token.lexeme().to_string() }),
            LeftParen => {
                self.nest(&token)?;
                let expr = self.expression()?;
                self.depth -= 1;
                self.consume_or_error(RightParen, Expected::ClosingParen)?;
                Ok(expr)
            }
            _ => Err(ParseError::syntax(Expected::Expression, &token)),
        }
    }
}

// Helpers
impl<'a> Parser<'a> {
    fn nest(&mut self, token: &Token) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::TooDeeplyNested { line: token.line(), col: token.col() });
        }
        Ok(())
    }

    fn peek_op(&mut self) -> Option<BinaryOp> {
        self.tokens.peek().and_then(|t| binary_op(&t.data))
    }

    fn advance(&mut self) -> Token<'a> {
        match self.tokens.next() {
            Some(token) => token,
            None => unreachable!("Should have hit Eof"),
        }
    }

    fn consume_or_error(&mut self, expected: TokenData, error: Expected) -> Result<Token<'a>> {
        let Some(token) = self.tokens.peek() else {
            unreachable!("Should have hit Eof");
        };
        if token.data != expected {
            return Err(ParseError::syntax(error, token));
        }
        Ok(self.advance())
    }

    fn is_at_end(&mut self) -> bool {
        self.tokens.peek().map_or(true, Token::is_eof)
    }
}

fn binary_op(data: &TokenData) -> Option<BinaryOp> {
    Some(match data {
        Plus => BinaryOp::Add,
        Minus => BinaryOp::Sub,
        Star => BinaryOp::Mul,
        Slash => BinaryOp::Div,
        Percent => BinaryOp::Rem,
        EqualEqual => BinaryOp::Equal,
        BangEqual => BinaryOp::NotEqual,
        Less => BinaryOp::Less,
        LessEqual => BinaryOp::LessEqual,
        Greater => BinaryOp::Greater,
        GreaterEqual => BinaryOp::GreaterEqual,
        AndAnd => BinaryOp::And,
        OrOr => BinaryOp::Or,
        _ => return None,
    })
}
