use std::{
    cmp::Ordering,
    ops::{Add, Div, Mul, Rem, Sub},
};

/// A runtime value. Operators never mutate their operands, they produce new values.
#[derive(Debug, Clone, PartialEq, derive_more::From, derive_more::Display)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    #[display(fmt = "nil")]
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Bool,
    Nil,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Bool(_) => ValueType::Bool,
            Value::Nil => ValueType::Nil,
        }
    }

    /// `false`, `nil` and `0` are falsy, everything else (including `""`) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Nil => false,
            Value::Number(n) => *n != 0.0,
            Value::String(_) => true,
        }
    }

    pub fn less_than(self, other: Value) -> Result<Value, (Value, Value)> {
        self.compare(other, Ordering::is_lt)
    }

    pub fn less_equal(self, other: Value) -> Result<Value, (Value, Value)> {
        self.compare(other, Ordering::is_le)
    }

    pub fn greater_than(self, other: Value) -> Result<Value, (Value, Value)> {
        self.compare(other, Ordering::is_gt)
    }

    pub fn greater_equal(self, other: Value) -> Result<Value, (Value, Value)> {
        self.compare(other, Ordering::is_ge)
    }

    // Unordered numbers (NaN) compare false for every relation.
    fn compare(self, other: Value, holds: fn(Ordering) -> bool) -> Result<Value, (Value, Value)> {
        let ordering = match (&self, &other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => return Err((self, other)),
        };
        Ok(Value::Bool(ordering.is_some_and(holds)))
    }
}

impl Add for Value {
    type Output = Result<Self, (Self, Self)>;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (a, b) => Err((a, b)),
        }
    }
}

impl Sub for Value {
    type Output = Result<Self, (Self, Self)>;

    fn sub(self, rhs: Self) -> Self::Output {
        match (&self, &rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
            _ => Err((self, rhs)),
        }
    }
}

impl Mul for Value {
    type Output = Result<Self, (Self, Self)>;

    fn mul(self, rhs: Self) -> Self::Output {
        match (&self, &rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
            _ => Err((self, rhs)),
        }
    }
}

impl Div for Value {
    type Output = Result<Self, (Self, Self)>;

    fn div(self, rhs: Self) -> Self::Output {
        match (&self, &rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
            _ => Err((self, rhs)),
        }
    }
}

impl Rem for Value {
    type Output = Result<Self, (Self, Self)>;

    fn rem(self, rhs: Self) -> Self::Output {
        match (&self, &rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a % b)),
            _ => Err((self, rhs)),
        }
    }
}
