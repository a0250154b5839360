//! Formula parsing and evaluation.
//!
//! One operation: take formula source text (with or without the leading
//! `=`) and a caller-supplied [`CellResolver`], and return a [`Value`].
//! Every failure mode — unknown function, operand type mismatch, division
//! by zero, invalid reference, unparseable source — is contained here and
//! surfaces as [`Value::Error`], never as a panic or a `Result` error.
//!
//! Reference resolution is single-layer by design: when a formula reads a
//! cell that itself holds a formula, the resolver hands back that cell's
//! last-committed literal instead of re-evaluating it. This bounds
//! recursion to one layer; a chain of formula cells reflects an edit only
//! as each is recomputed.

mod builtins;
mod eval;
mod parser;

pub use parser::{parse, BinOp, Expr, UnaryOp};

use std::fmt;

/// An evaluation error sentinel, displayed Excel-style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Division by zero.
    Div0,
    /// Operand type mismatch.
    Value,
    /// Unknown function name.
    Name,
    /// Invalid cell or range reference.
    Ref,
    /// Numeric domain error (e.g. square root of a negative).
    Num,
    /// Source text failed to parse.
    Parse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Div0 => "#DIV/0!",
            ErrorKind::Value => "#VALUE!",
            ErrorKind::Name => "#NAME?",
            ErrorKind::Ref => "#REF!",
            ErrorKind::Num => "#NUM!",
            ErrorKind::Parse => "#ERROR!",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of evaluating a formula (or of resolving one cell).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    /// A blank/absent cell. Coerces to zero in arithmetic context.
    Empty,
    Error(ErrorKind),
}

impl Value {
    /// Display form: numbers without a trailing `.0`, booleans upper-case,
    /// errors as their sentinel text.
    pub fn to_display(&self) -> String {
        match self {
            Value::Number(n) => crate::model::format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Value::Empty => String::new(),
            Value::Error(e) => e.as_str().to_string(),
        }
    }
}

/// Supplies cell literals to the evaluator.
///
/// Implementations must not re-enter the engine: a referenced formula
/// cell's *last-committed literal* is returned, not a fresh evaluation.
pub trait CellResolver {
    fn cell(&self, row: u32, col: u32) -> Value;
}

impl<F> CellResolver for F
where
    F: Fn(u32, u32) -> Value,
{
    fn cell(&self, row: u32, col: u32) -> Value {
        self(row, col)
    }
}

/// Evaluate formula source against a resolver.
///
/// A leading `=` is accepted and ignored.
///
/// # Example
///
/// ```
/// use gridbook::formula::{evaluate, Value};
///
/// let blank = |_row: u32, _col: u32| Value::Empty;
/// assert_eq!(evaluate("=1+2*3", &blank), Value::Number(7.0));
/// ```
pub fn evaluate(src: &str, resolver: &dyn CellResolver) -> Value {
    let src = src.strip_prefix('=').unwrap_or(src);
    match parser::parse(src) {
        Ok(expr) => eval::evaluate_expr(&expr, resolver),
        Err(e) => Value::Error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(_row: u32, _col: u32) -> Value {
        Value::Empty
    }

    #[test]
    fn test_precedence_and_sigil() {
        assert_eq!(evaluate("=1+2", &blank), Value::Number(3.0));
        assert_eq!(evaluate("1+2*3", &blank), Value::Number(7.0));
        assert_eq!(evaluate("(1+2)*3", &blank), Value::Number(9.0));
        assert_eq!(evaluate("2^3^2", &blank), Value::Number(512.0));
        assert_eq!(evaluate("-2^2", &blank), Value::Number(-4.0));
    }

    #[test]
    fn test_errors_are_contained() {
        assert_eq!(evaluate("=1/0", &blank), Value::Error(ErrorKind::Div0));
        assert_eq!(evaluate("=NOPE(1)", &blank), Value::Error(ErrorKind::Name));
        assert_eq!(evaluate("=1+", &blank), Value::Error(ErrorKind::Parse));
        assert_eq!(evaluate("=\"a\"*2", &blank), Value::Error(ErrorKind::Value));
        // A reference whose column part overflows is an unknown name,
        // never a panic.
        assert_eq!(
            evaluate("=ZZZZZZZZ1+1", &blank),
            Value::Error(ErrorKind::Name)
        );
    }

    #[test]
    fn test_resolver_feeds_references() {
        let cells = |row: u32, col: u32| {
            if (row, col) == (1, 1) {
                Value::Number(10.0)
            } else {
                Value::Empty
            }
        };
        assert_eq!(evaluate("=A1*2", &cells), Value::Number(20.0));
        // Blank coerces to zero in arithmetic context.
        assert_eq!(evaluate("=B9+5", &cells), Value::Number(5.0));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Number(3.0).to_display(), "3");
        assert_eq!(Value::Number(2.5).to_display(), "2.5");
        assert_eq!(Value::Bool(false).to_display(), "FALSE");
        assert_eq!(Value::Error(ErrorKind::Name).to_display(), "#NAME?");
        assert_eq!(Value::Empty.to_display(), "");
    }
}
