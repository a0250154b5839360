//! Expression evaluation with spreadsheet type coercion.

use super::parser::{BinOp, Expr, UnaryOp};
use super::{builtins, CellResolver, ErrorKind, Value};

/// Evaluate a parsed expression. Errors stay contained in the returned
/// [`Value`].
pub fn evaluate_expr(expr: &Expr, resolver: &dyn CellResolver) -> Value {
    match eval(expr, resolver) {
        Ok(v) => v,
        Err(e) => Value::Error(e),
    }
}

fn eval(expr: &Expr, resolver: &dyn CellResolver) -> Result<Value, ErrorKind> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::CellRef { row, col } => {
            if *row == 0 || *col == 0 {
                return Err(ErrorKind::Ref);
            }
            Ok(resolver.cell(*row, *col))
        }
        // A bare range only makes sense as a function argument.
        Expr::Range { .. } => Err(ErrorKind::Value),
        Expr::Unary { op, expr } => {
            let v = eval(expr, resolver)?;
            let n = to_number(&v)?;
            Ok(Value::Number(match op {
                UnaryOp::Neg => -n,
                UnaryOp::Percent => n / 100.0,
            }))
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval(lhs, resolver)?;
            let rhs = eval(rhs, resolver)?;
            apply_binary(*op, lhs, rhs)
        }
        Expr::Call { name, args } => {
            let args = flatten_args(args, resolver)?;
            builtins::call(name, args)
        }
    }
}

fn apply_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, ErrorKind> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Pow => {
            let a = to_number(&lhs)?;
            let b = to_number(&rhs)?;
            let n = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => {
                    if b == 0.0 {
                        return Err(ErrorKind::Div0);
                    }
                    a / b
                }
                BinOp::Pow => a.powf(b),
                _ => unreachable!(),
            };
            if n.is_finite() {
                Ok(Value::Number(n))
            } else {
                Err(ErrorKind::Num)
            }
        }
        BinOp::Concat => Ok(Value::Text(format!(
            "{}{}",
            to_text(&lhs)?,
            to_text(&rhs)?
        ))),
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ord = compare(&lhs, &rhs)?;
            Ok(Value::Bool(match op {
                BinOp::Eq => ord == std::cmp::Ordering::Equal,
                BinOp::Ne => ord != std::cmp::Ordering::Equal,
                BinOp::Lt => ord == std::cmp::Ordering::Less,
                BinOp::Le => ord != std::cmp::Ordering::Greater,
                BinOp::Gt => ord == std::cmp::Ordering::Greater,
                BinOp::Ge => ord != std::cmp::Ordering::Less,
                _ => unreachable!(),
            }))
        }
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Result<std::cmp::Ordering, ErrorKind> {
    // Numeric comparison when both sides coerce; otherwise case-insensitive
    // text comparison, the spreadsheet convention.
    match (to_number(lhs), to_number(rhs)) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).ok_or(ErrorKind::Value),
        _ => {
            let a = to_text(lhs)?.to_lowercase();
            let b = to_text(rhs)?.to_lowercase();
            Ok(a.cmp(&b))
        }
    }
}

/// Evaluate function arguments, expanding rectangular ranges into their
/// constituent cell values in row-major order.
fn flatten_args(args: &[Expr], resolver: &dyn CellResolver) -> Result<Vec<Value>, ErrorKind> {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Expr::Range { start, end } => {
                let (r1, c1) = *start;
                let (r2, c2) = *end;
                if r1 == 0 || c1 == 0 || r2 == 0 || c2 == 0 {
                    return Err(ErrorKind::Ref);
                }
                for row in r1.min(r2)..=r1.max(r2) {
                    for col in c1.min(c2)..=c1.max(c2) {
                        out.push(resolver.cell(row, col));
                    }
                }
            }
            other => out.push(eval(other, resolver)?),
        }
    }
    Ok(out)
}

/// Coerce a value to a number: numeric-looking text becomes a number,
/// booleans become 1/0, blank becomes 0.
pub(super) fn to_number(v: &Value) -> Result<f64, ErrorKind> {
    match v {
        Value::Number(n) => Ok(*n),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Empty => Ok(0.0),
        Value::Text(s) => s.trim().parse::<f64>().map_err(|_| ErrorKind::Value),
        Value::Error(e) => Err(*e),
    }
}

pub(super) fn to_text(v: &Value) -> Result<String, ErrorKind> {
    match v {
        Value::Error(e) => Err(*e),
        other => Ok(other.to_display()),
    }
}
