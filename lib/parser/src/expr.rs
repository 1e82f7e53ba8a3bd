use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use serde::{Serialize, Serializer};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "%")]
    Rem,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "&&")]
    And,
    #[strum(serialize = "||")]
    Or,
}

impl Serialize for BinaryOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

/// A pure expression. Every node owns its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name")]
pub enum Expr {
    #[serde(rename = "BinaryExpr")]
    Binary { left: Box<Expr>, op: BinaryOp, right: Box<Expr> },
    #[serde(rename = "NumberLiteral")]
    Number {
        #[serde(skip)]
        text: String,
        value: f64,
    },
    #[serde(rename = "BooleanLiteral")]
    Boolean { value: bool },
    #[serde(rename = "StringLiteral")]
    Str { value: String },
    /// Resolved against the environment each time it is evaluated.
    #[serde(rename = "IdentifierLiteral")]
    Identifier {
        #[serde(rename = "value")]
        name: String,
    },
    #[serde(rename = "NilLiteral")]
    Nil,
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary { left: Box::new(left), op, right: Box::new(right) }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary { left, op, right } => write!(f, "({} {} {})", op, left, right),
            Expr::Number { text, .. } => write!(f, "{}", text),
            Expr::Boolean { value } => write!(f, "{}", value),
            Expr::Str { value } => write!(f, "\"{}\"", value),
            Expr::Identifier { name } => write!(f, "{}", name),
            Expr::Nil => write!(f, "nil"),
        }
    }
}

/// Root of the tree: the top-level expressions in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Expr>,
}

impl Program {
    /// Structured dump of the tree for debugging.
    pub fn dump(&self) -> serde_json::Value {
        serde_json::json!({
            "name": "Program",
            "body": self.body,
        })
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body.iter().join(" "))
    }
}
