use crate::expression::ast::{BinaryOp, Expr, UnaryOp};
use crate::foundation::error::FormResult;
use crate::foundation::value::{display_value, is_truthy, number_value};
use crate::template::resolver::ResolveVariable;
use serde_json::Value;
use std::cmp::Ordering;

/// Evaluate `expr`; `Ok(None)` is undefined.
pub(crate) fn eval<R>(expr: &Expr, resolver: &R) -> FormResult<Option<Value>>
where
    R: ResolveVariable + ?Sized,
{
    match expr {
        Expr::Lit(v) => Ok(Some(v.clone())),
        Expr::Undefined => Ok(None),
        Expr::Path(segments) => resolver.resolve(&segments.join(".")),
        Expr::Unary { op, expr } => {
            let v = eval(expr, resolver)?;
            Ok(Some(match op {
                UnaryOp::Neg => number_value(-to_number(v.as_ref())),
                UnaryOp::Not => Value::Bool(!is_truthy(v.as_ref())),
            }))
        }
        Expr::Cond {
            cond,
            then,
            otherwise,
        } => {
            if is_truthy(eval(cond, resolver)?.as_ref()) {
                eval(then, resolver)
            } else {
                eval(otherwise, resolver)
            }
        }
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            let l = eval(left, resolver)?;
            if is_truthy(l.as_ref()) {
                eval(right, resolver)
            } else {
                Ok(l)
            }
        }
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            let l = eval(left, resolver)?;
            if is_truthy(l.as_ref()) {
                Ok(l)
            } else {
                eval(right, resolver)
            }
        }
        Expr::Binary { op, left, right } => {
            let l = eval(left, resolver)?;
            let r = eval(right, resolver)?;
            Ok(Some(binary(*op, l.as_ref(), r.as_ref())))
        }
    }
}

fn binary(op: BinaryOp, l: Option<&Value>, r: Option<&Value>) -> Value {
    match op {
        BinaryOp::Add => {
            if is_stringish(l) || is_stringish(r) {
                Value::String(format!("{}{}", js_string(l), js_string(r)))
            } else {
                number_value(to_number(l) + to_number(r))
            }
        }
        BinaryOp::Sub => number_value(to_number(l) - to_number(r)),
        BinaryOp::Mul => number_value(to_number(l) * to_number(r)),
        BinaryOp::Div => number_value(to_number(l) / to_number(r)),
        BinaryOp::Mod => number_value(to_number(l) % to_number(r)),
        BinaryOp::Eq => Value::Bool(loose_eq(l, r)),
        BinaryOp::Ne => Value::Bool(!loose_eq(l, r)),
        BinaryOp::StrictEq => Value::Bool(strict_eq(l, r)),
        BinaryOp::StrictNe => Value::Bool(!strict_eq(l, r)),
        BinaryOp::Lt => Value::Bool(compare(l, r).is_some_and(Ordering::is_lt)),
        BinaryOp::Le => Value::Bool(compare(l, r).is_some_and(Ordering::is_le)),
        BinaryOp::Gt => Value::Bool(compare(l, r).is_some_and(Ordering::is_gt)),
        BinaryOp::Ge => Value::Bool(compare(l, r).is_some_and(Ordering::is_ge)),
        BinaryOp::And | BinaryOp::Or => unreachable!("logical operators short-circuit in eval"),
    }
}

fn is_stringish(v: Option<&Value>) -> bool {
    matches!(
        v,
        Some(Value::String(_)) | Some(Value::Array(_)) | Some(Value::Object(_))
    )
}

fn js_string(v: Option<&Value>) -> String {
    match v {
        None => "undefined".to_owned(),
        Some(Value::Null) => "null".to_owned(),
        other => display_value(other),
    }
}

pub(crate) fn to_number(v: Option<&Value>) -> f64 {
    match v {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_numeric(s),
        Some(Value::Array(items)) => match items.as_slice() {
            [] => 0.0,
            [one] => to_number(Some(one)),
            _ => f64::NAN,
        },
        Some(Value::Object(_)) => f64::NAN,
    }
}

fn parse_numeric(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => s.parse().unwrap_or(f64::NAN),
    }
}

fn compare(l: Option<&Value>, r: Option<&Value>) -> Option<Ordering> {
    if let (Some(Value::String(a)), Some(Value::String(b))) = (l, r) {
        return Some(a.cmp(b));
    }
    to_number(l).partial_cmp(&to_number(r))
}

fn strict_eq(l: Option<&Value>, r: Option<&Value>) -> bool {
    match (l, r) {
        (None, None) => true,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a.as_f64() == b.as_f64(),
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn loose_eq(l: Option<&Value>, r: Option<&Value>) -> bool {
    match (l, r) {
        (None | Some(Value::Null), None | Some(Value::Null)) => true,
        (None | Some(Value::Null), _) | (_, None | Some(Value::Null)) => false,
        (Some(Value::Bool(_)), _) | (_, Some(Value::Bool(_))) => {
            to_number(l) == to_number(r)
        }
        (Some(Value::Number(_)), Some(Value::String(_)))
        | (Some(Value::String(_)), Some(Value::Number(_))) => to_number(l) == to_number(r),
        _ => strict_eq(l, r),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/eval.rs"]
mod tests;
