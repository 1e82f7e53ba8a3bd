use parser::{BinaryOp, Expr, ParseError, Program};

mod value;
pub use value::{Value, ValueType};

mod environment;
pub use environment::{Environment, Globals};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("Use of undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("Type mismatch: cannot apply `{op}` to {left} and {right}")]
    TypeMismatch { op: BinaryOp, left: ValueType, right: ValueType },
    #[error("Operator `{op}` is not supported for type {ty}")]
    UnsupportedOperator { op: BinaryOp, ty: ValueType },
}

/// Any failure of the scan, parse, evaluate pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Evaluates every top-level expression in order and returns the value of the last one.
/// An empty program evaluates to `nil`.
pub fn evaluate<E: Environment + ?Sized>(program: &Program, env: &E) -> Result<Value, EvalError> {
    let mut result = Value::Nil;
    for expr in &program.body {
        result = evaluate_expr(expr, env)?;
    }
    Ok(result)
}

pub fn evaluate_expr<E: Environment + ?Sized>(expr: &Expr, env: &E) -> Result<Value, EvalError> {
    match expr {
        Expr::Number { value, .. } => Ok((*value).into()),
        Expr::Str { value } => Ok(value.as_str().into()),
        Expr::Boolean { value } => Ok((*value).into()),
        Expr::Nil => Ok(Value::Nil),

        Expr::Identifier { name } => {
            env.lookup(name).ok_or_else(|| EvalError::UndefinedVariable(name.clone()))
        }

        // Both operands are always evaluated, `&&` and `||` do not short-circuit.
        Expr::Binary { left, op, right } => {
            let left = evaluate_expr(left, env)?;
            let right = evaluate_expr(right, env)?;
            log::trace!("{left:?} {op} {right:?}");
            apply(*op, left, right)
        }
    }
}

fn apply(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    use BinaryOp::*;

    let arithmetic_error = |(l, r): (Value, Value)| {
        if l.value_type() == r.value_type() {
            EvalError::UnsupportedOperator { op, ty: l.value_type() }
        } else {
            EvalError::TypeMismatch { op, left: l.value_type(), right: r.value_type() }
        }
    };
    let comparison_error = |(l, r): (Value, Value)| EvalError::TypeMismatch {
        op,
        left: l.value_type(),
        right: r.value_type(),
    };

    match op {
        Add => (left + right).map_err(arithmetic_error),
        Sub => (left - right).map_err(arithmetic_error),
        Mul => (left * right).map_err(arithmetic_error),
        Div => (left / right).map_err(arithmetic_error),
        Rem => (left % right).map_err(arithmetic_error),

        Equal => Ok((left == right).into()),
        NotEqual => Ok((left != right).into()),

        Less => left.less_than(right).map_err(comparison_error),
        LessEqual => left.less_equal(right).map_err(comparison_error),
        Greater => left.greater_than(right).map_err(comparison_error),
        GreaterEqual => left.greater_equal(right).map_err(comparison_error),

        And => Ok((left.is_truthy() && right.is_truthy()).into()),
        Or => Ok((left.is_truthy() || right.is_truthy()).into()),
    }
}

/// Owns a global environment and runs source text against it.
#[derive(Debug, Default)]
pub struct Interpreter {
    globals: Globals,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_globals(globals: Globals) -> Self {
        Self { globals }
    }

    /// Scans, parses and evaluates `source`. Nothing is retained between calls
    /// apart from the globals, so a failed call leaves the interpreter usable.
    pub fn eval(&self, source: &str) -> Result<Value, Error> {
        let program = parser::parse(source)?;
        Ok(evaluate(&program, &self.globals)?)
    }

    pub fn define(&mut self, name: &str, value: impl Into<Value>) {
        self.globals.bind(name, value.into());
    }

    pub fn get(&self, name: &str) -> Result<Value, EvalError> {
        self.globals.lookup(name).ok_or_else(|| EvalError::UndefinedVariable(name.to_string()))
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, collections::HashMap};

    use pretty_assertions::assert_eq;

    use super::*;

    #[ctor::ctor]
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn eval(source: &str) -> Result<Value, Error> {
        Interpreter::new().eval(source)
    }

    fn eval_ok(source: &str) -> Value {
        eval(source).unwrap()
    }

    fn eval_err(source: &str) -> EvalError {
        match eval(source) {
            Err(Error::Eval(e)) => e,
            other => panic!("expected evaluation error for {source:?}, got {other:?}"),
        }
    }

    #[test]
    fn number_literals() {
        for n in ["0", "7", "42", "23.45", "3.14", "1000000", "0.5"] {
            assert_eq!(eval_ok(n), Value::Number(n.parse().unwrap()), "{n}");
        }
    }

    #[test]
    fn string_literals() {
        for s in ["", "hello", "with spaces", "1 + 2", "nil", "ünïcödé"] {
            assert_eq!(eval_ok(&format!("\"{s}\"")), Value::from(s));
        }
    }

    #[test]
    fn other_literals() {
        assert_eq!(eval_ok("true"), Value::Bool(true));
        assert_eq!(eval_ok("false"), Value::Bool(false));
        assert_eq!(eval_ok("nil"), Value::Nil);
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval_ok("2 - 3 - 1"), Value::Number(-2.0));
        assert_eq!(eval_ok("2 + 3 * 4"), Value::Number(14.0));
        assert_eq!(eval_ok("(2 + 3) * 4"), Value::Number(20.0));
        assert_eq!(eval_ok("16 / 4 / 2"), Value::Number(2.0));
        assert_eq!(eval_ok("10 % 4 * 3"), Value::Number(6.0));
        assert_eq!(eval_ok("1 + 2 == 3"), Value::Bool(true));
        assert_eq!(eval_ok("1 < 2 == 2 < 1"), Value::Bool(false));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(eval_ok("1 / 0"), Value::Number(f64::INFINITY));
        assert_eq!(eval_ok("0 - 1 / 0"), Value::Number(f64::NEG_INFINITY));
        assert!(matches!(eval_ok("0 / 0"), Value::Number(n) if n.is_nan()));
        assert!(matches!(eval_ok("5 % 0"), Value::Number(n) if n.is_nan()));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval_ok("\"John\" + \" \" + \"Doe\""), Value::from("John Doe"));
    }

    #[test]
    fn type_mismatch() {
        assert_eq!(
            eval_err("\"a\" + 1"),
            EvalError::TypeMismatch {
                op: BinaryOp::Add,
                left: ValueType::String,
                right: ValueType::Number
            }
        );
        assert_eq!(
            eval_err("1 * true"),
            EvalError::TypeMismatch {
                op: BinaryOp::Mul,
                left: ValueType::Number,
                right: ValueType::Bool
            }
        );
        assert_eq!(
            eval_err("nil - 1"),
            EvalError::TypeMismatch {
                op: BinaryOp::Sub,
                left: ValueType::Nil,
                right: ValueType::Number,
            }
        );
        assert_eq!(
            eval_err("1 < \"2\""),
            EvalError::TypeMismatch {
                op: BinaryOp::Less,
                left: ValueType::Number,
                right: ValueType::String
            }
        );
        assert_eq!(
            eval_err("true >= false"),
            EvalError::TypeMismatch {
                op: BinaryOp::GreaterEqual,
                left: ValueType::Bool,
                right: ValueType::Bool
            }
        );
    }

    #[test]
    fn unsupported_operator() {
        assert_eq!(
            eval_err("true + false"),
            EvalError::UnsupportedOperator { op: BinaryOp::Add, ty: ValueType::Bool }
        );
        assert_eq!(
            eval_err("nil * nil"),
            EvalError::UnsupportedOperator { op: BinaryOp::Mul, ty: ValueType::Nil }
        );
        assert_eq!(
            eval_err("\"ab\" - \"b\""),
            EvalError::UnsupportedOperator { op: BinaryOp::Sub, ty: ValueType::String }
        );
        assert_eq!(
            eval_err("\"ab\" % \"b\"").to_string(),
            "Operator `%` is not supported for type string"
        );
    }

    #[test]
    fn equality() {
        assert_eq!(eval_ok("1 == 1"), Value::Bool(true));
        assert_eq!(eval_ok("1 != 2"), Value::Bool(true));
        assert_eq!(eval_ok("\"a\" == \"a\""), Value::Bool(true));
        assert_eq!(eval_ok("true == true"), Value::Bool(true));
        assert_eq!(eval_ok("nil == nil"), Value::Bool(true));

        assert_eq!(eval_ok("1 == \"1\""), Value::Bool(false));
        assert_eq!(eval_ok("0 == false"), Value::Bool(false));
        assert_eq!(eval_ok("nil == false"), Value::Bool(false));
        assert_eq!(eval_ok("\"true\" != true"), Value::Bool(true));
        assert_eq!(eval_ok("0 / 0 == 0 / 0"), Value::Bool(false));
    }

    #[test]
    fn relational() {
        assert_eq!(eval_ok("1 < 2"), Value::Bool(true));
        assert_eq!(eval_ok("2 <= 2"), Value::Bool(true));
        assert_eq!(eval_ok("1 > 2"), Value::Bool(false));
        assert_eq!(eval_ok("3 >= 2.5"), Value::Bool(true));
        assert_eq!(eval_ok("\"apple\" < \"banana\""), Value::Bool(true));
    }

    #[test]
    fn logical_operators_use_truthiness() {
        assert_eq!(eval_ok("0 || \"x\""), Value::Bool(true));
        assert_eq!(eval_ok("nil && true"), Value::Bool(false));
        assert_eq!(eval_ok("\"\" && 1"), Value::Bool(true));
        assert_eq!(eval_ok("false || nil"), Value::Bool(false));
        assert_eq!(eval_ok("1 && 2 || 0"), Value::Bool(true));
    }

    #[test]
    fn logical_operators_evaluate_both_sides() {
        assert_eq!(eval_err("false && y"), EvalError::UndefinedVariable("y".to_string()));
        assert_eq!(eval_err("true || y"), EvalError::UndefinedVariable("y".to_string()));
    }

    #[test]
    fn identifiers() {
        let mut interpreter = Interpreter::new();
        interpreter.define("x", 23.45);
        assert_eq!(interpreter.eval("x + 1").unwrap(), Value::Number(24.45));

        assert_eq!(
            Interpreter::new().eval("x + 1"),
            Err(EvalError::UndefinedVariable("x".to_string()).into())
        );
    }

    #[test]
    fn identifiers_are_late_bound() {
        let program = parser::parse("n * 2").unwrap();
        let mut env: HashMap<String, Value> = HashMap::new();

        env.bind("n", Value::Number(2.0));
        assert_eq!(evaluate(&program, &env), Ok(Value::Number(4.0)));

        env.bind("n", Value::Number(5.0));
        assert_eq!(evaluate(&program, &env), Ok(Value::Number(10.0)));
    }

    #[test]
    fn injected_environment_is_only_read() {
        #[derive(Default)]
        struct Recording {
            lookups: Cell<usize>,
        }

        impl Environment for Recording {
            fn lookup(&self, name: &str) -> Option<Value> {
                self.lookups.set(self.lookups.get() + 1);
                (name == "a").then_some(Value::Number(1.0))
            }

            fn bind(&mut self, _: &str, _: Value) {
                panic!("evaluation must not bind");
            }
        }

        let env = Recording::default();
        let program = parser::parse("a + a + a").unwrap();
        assert_eq!(evaluate(&program, &env), Ok(Value::Number(3.0)));
        assert_eq!(env.lookups.get(), 3);
    }

    #[test]
    fn program_yields_last_value() {
        assert_eq!(eval_ok("1 2 3"), Value::Number(3.0));
        assert_eq!(eval_ok("\"a\" (1 + 1)"), Value::Number(2.0));
        assert_eq!(eval_ok(""), Value::Nil);
        assert_eq!(eval_err("missing 1"), EvalError::UndefinedVariable("missing".to_string()));
    }

    #[test]
    fn repeated_evaluation_is_deterministic() {
        let interpreter: Interpreter =
            Interpreter::with_globals([("PI", 3.14)].into_iter().collect());
        let first = interpreter.eval("PI * 2 + 1").unwrap();
        for _ in 0..3 {
            assert_eq!(interpreter.eval("PI * 2 + 1").unwrap(), first);
        }
        assert_eq!(interpreter.globals().len(), 1);
    }

    #[test]
    fn deep_input_is_an_error_not_a_crash() {
        let deepest = format!("{}1{}", "(".repeat(255), " + 1)".repeat(255));
        assert_eq!(eval_ok(&deepest), Value::Number(256.0));

        let too_deep = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert!(matches!(
            eval(&too_deep),
            Err(Error::Parse(ParseError::TooDeeplyNested { .. }))
        ));
        let too_long = format!("1{}", " - 1".repeat(100_000));
        assert!(matches!(
            eval(&too_long),
            Err(Error::Parse(ParseError::TooDeeplyNested { .. }))
        ));
    }

    #[test]
    fn errors_do_not_poison_the_interpreter() {
        let mut interpreter = Interpreter::new();
        interpreter.define("x", 1.0);

        assert!(matches!(interpreter.eval("(x +"), Err(Error::Parse(_))));
        assert!(matches!(interpreter.eval("\"open"), Err(Error::Parse(_))));
        assert!(matches!(interpreter.eval("x + true"), Err(Error::Eval(_))));
        assert_eq!(interpreter.eval("x + 1"), Ok(Value::Number(2.0)));
        assert_eq!(interpreter.get("x"), Ok(Value::Number(1.0)));
        assert_eq!(interpreter.get("y"), Err(EvalError::UndefinedVariable("y".to_string())));
    }
}
