//! Built-in function catalog.
//!
//! The catalog is the extensible part of the engine: adding a function is
//! one more match arm over already-flattened argument values. Aggregates
//! fold numeric values (numbers, booleans, numeric-looking text); blanks
//! and non-numeric text are skipped; any error argument wins outright.

use super::eval::{to_number, to_text};
use super::{ErrorKind, Value};

pub fn call(name: &str, args: Vec<Value>) -> Result<Value, ErrorKind> {
    if let Some(err) = args.iter().find_map(|v| match v {
        Value::Error(e) => Some(*e),
        _ => None,
    }) {
        return Err(err);
    }

    match name {
        "SUM" => Ok(Value::Number(numeric(&args).sum())),
        "AVERAGE" => {
            let values: Vec<f64> = numeric(&args).collect();
            if values.is_empty() {
                return Err(ErrorKind::Div0);
            }
            Ok(Value::Number(values.iter().sum::<f64>() / values.len() as f64))
        }
        // MIN/MAX over no numeric values yield 0, the spreadsheet
        // convention for empty aggregates.
        "MIN" => Ok(Value::Number(numeric(&args).reduce(f64::min).unwrap_or(0.0))),
        "MAX" => Ok(Value::Number(numeric(&args).reduce(f64::max).unwrap_or(0.0))),
        "COUNT" => Ok(Value::Number(numeric(&args).count() as f64)),
        "ABS" => {
            let n = single_number(&args)?;
            Ok(Value::Number(n.abs()))
        }
        "SQRT" => {
            let n = single_number(&args)?;
            if n < 0.0 {
                return Err(ErrorKind::Num);
            }
            Ok(Value::Number(n.sqrt()))
        }
        "POWER" => {
            if args.len() != 2 {
                return Err(ErrorKind::Value);
            }
            let base = to_number(&args[0])?;
            let exp = to_number(&args[1])?;
            let n = base.powf(exp);
            if n.is_finite() {
                Ok(Value::Number(n))
            } else {
                Err(ErrorKind::Num)
            }
        }
        "ROUND" => {
            if args.is_empty() || args.len() > 2 {
                return Err(ErrorKind::Value);
            }
            let n = to_number(&args[0])?;
            let digits = if args.len() == 2 {
                to_number(&args[1])? as i32
            } else {
                0
            };
            let factor = 10f64.powi(digits);
            Ok(Value::Number((n * factor).round() / factor))
        }
        "IF" => {
            if args.len() < 2 || args.len() > 3 {
                return Err(ErrorKind::Value);
            }
            let cond = match &args[0] {
                Value::Bool(b) => *b,
                other => to_number(other)? != 0.0,
            };
            if cond {
                Ok(args[1].clone())
            } else if args.len() == 3 {
                Ok(args[2].clone())
            } else {
                Ok(Value::Bool(false))
            }
        }
        "LEN" => {
            if args.len() != 1 {
                return Err(ErrorKind::Value);
            }
            Ok(Value::Number(to_text(&args[0])?.chars().count() as f64))
        }
        "CONCATENATE" | "CONCAT" => {
            let mut out = String::new();
            for arg in &args {
                out.push_str(&to_text(arg)?);
            }
            Ok(Value::Text(out))
        }
        _ => Err(ErrorKind::Name),
    }
}

/// Numeric view over flattened arguments: numbers, booleans, and
/// numeric-looking text; blanks and other text are skipped.
fn numeric(args: &[Value]) -> impl Iterator<Item = f64> + '_ {
    args.iter().filter_map(|v| match v {
        Value::Number(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Empty | Value::Error(_) => None,
    })
}

fn single_number(args: &[Value]) -> Result<f64, ErrorKind> {
    if args.len() != 1 {
        return Err(ErrorKind::Value);
    }
    to_number(&args[0])
}

#[cfg(test)]
mod tests {
    use super::super::evaluate;
    use super::*;

    fn blank(_row: u32, _col: u32) -> Value {
        Value::Empty
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(evaluate("=SUM(1,2,3)", &blank), Value::Number(6.0));
        assert_eq!(evaluate("=AVERAGE(2,4)", &blank), Value::Number(3.0));
        assert_eq!(evaluate("=MIN(5,2,8)", &blank), Value::Number(2.0));
        assert_eq!(evaluate("=MAX(5,2,8)", &blank), Value::Number(8.0));
        assert_eq!(evaluate("=COUNT(1,\"x\",2)", &blank), Value::Number(2.0));
        assert_eq!(evaluate("=MIN()", &blank), Value::Number(0.0));
    }

    #[test]
    fn test_average_of_nothing_is_div0() {
        assert_eq!(evaluate("=AVERAGE()", &blank), Value::Error(ErrorKind::Div0));
    }

    #[test]
    fn test_scalar_functions() {
        assert_eq!(evaluate("=ABS(-3)", &blank), Value::Number(3.0));
        assert_eq!(evaluate("=SQRT(9)", &blank), Value::Number(3.0));
        assert_eq!(evaluate("=SQRT(-1)", &blank), Value::Error(ErrorKind::Num));
        assert_eq!(evaluate("=POWER(2,10)", &blank), Value::Number(1024.0));
        assert_eq!(evaluate("=ROUND(2.567, 1)", &blank), Value::Number(2.6));
        assert_eq!(evaluate("=ROUND(2.5)", &blank), Value::Number(3.0));
        assert_eq!(evaluate("=LEN(\"héllo\")", &blank), Value::Number(5.0));
    }

    #[test]
    fn test_if_and_concat() {
        assert_eq!(
            evaluate("=IF(1>0, \"yes\", \"no\")", &blank),
            Value::Text("yes".into())
        );
        assert_eq!(
            evaluate("=IF(FALSE, 1, 2)", &blank),
            Value::Number(2.0)
        );
        assert_eq!(
            evaluate("=CONCATENATE(\"a\", 1, TRUE)", &blank),
            Value::Text("a1TRUE".into())
        );
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(evaluate("=FOO(1)", &blank), Value::Error(ErrorKind::Name));
    }

    #[test]
    fn test_error_argument_wins() {
        assert_eq!(
            evaluate("=SUM(1, 1/0)", &blank),
            Value::Error(ErrorKind::Div0)
        );
    }
}
