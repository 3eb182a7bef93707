//! Predicate evaluation.
//!
//! Predicates are validated before they reach the evaluator, so evaluation
//! itself cannot fail: a value of an unexpected type simply does not match.

use std::cmp::Ordering;

use rowql_proto::{CompareOp, Predicate, Record, Value};

/// Evaluates predicates against records.
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Evaluate a predicate against a record.
    ///
    /// Any comparison involving a null or absent field is false; only
    /// `IsNull` matches those.
    pub fn evaluate(predicate: &Predicate, record: &Record) -> bool {
        match predicate {
            Predicate::Eq { field, value } => {
                Self::present(record, field).is_some_and(|fv| values_equal(fv, value))
            }
            Predicate::Compare { field, op, value } => {
                Self::present(record, field).is_some_and(|fv| Self::holds(*op, fv, value))
            }
            Predicate::IsNull { field } => record.is_null(field),
            Predicate::IsNotNull { field } => !record.is_null(field),
            Predicate::Like { field, pattern } => match Self::present(record, field) {
                Some(Value::String(s)) => like_match(s, pattern),
                _ => false,
            },
            Predicate::And(left, right) => {
                Self::evaluate(left, record) && Self::evaluate(right, record)
            }
        }
    }

    /// Field value, treating an explicit null like an absent field.
    fn present<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
        record.get(field).filter(|v| !v.is_null())
    }

    fn holds(op: CompareOp, left: &Value, right: &Value) -> bool {
        let ord = compare_values(left, right);
        match op {
            CompareOp::Ne => !values_equal(left, right),
            CompareOp::Lt => ord.is_some_and(Ordering::is_lt),
            CompareOp::Le => ord.is_some_and(Ordering::is_le),
            CompareOp::Gt => ord.is_some_and(Ordering::is_gt),
            CompareOp::Ge => ord.is_some_and(Ordering::is_ge),
        }
    }
}

/// Extension for evaluating a predicate directly.
pub trait Matches {
    /// Check whether `record` satisfies this predicate.
    fn matches(&self, record: &Record) -> bool;
}

impl Matches for Predicate {
    fn matches(&self, record: &Record) -> bool {
        FilterEvaluator::evaluate(self, record)
    }
}

/// Equality with numeric widening. Nulls are never equal to anything.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
        (Value::Ref(a), Value::Ref(b)) => a == b,
        _ => compare_values(a, b).is_some_and(Ordering::is_eq),
    }
}

/// Ordering between two non-null values of compatible kinds.
///
/// Integers widen to `i64`; any float widens both sides to `f64`. Returns
/// `None` for incompatible kinds, nulls, and NaN.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int32(x), Value::Int32(y)) => Some(x.cmp(y)),
        (Value::Int32(_) | Value::Int64(_), Value::Int32(_) | Value::Int64(_)) => {
            Some(a.as_i64()?.cmp(&b.as_i64()?))
        }
        (Value::Float64(_), Value::Int32(_) | Value::Int64(_) | Value::Float64(_))
        | (Value::Int32(_) | Value::Int64(_), Value::Float64(_)) => {
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Ref(x), Value::Ref(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Literal(char),
    One,
    Any,
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let token = match c {
            '%' => Token::Any,
            '_' => Token::One,
            // A trailing backslash matches itself.
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            c => Token::Literal(c),
        };
        // Runs of `%` collapse to one.
        if token == Token::Any && tokens.last() == Some(&Token::Any) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

/// Match a string against a SQL LIKE pattern.
///
/// `%` matches any run of characters, `_` exactly one, and a backslash makes
/// the next pattern character literal.
pub fn like_match(value: &str, pattern: &str) -> bool {
    let tokens = tokenize(pattern);
    let chars: Vec<char> = value.chars().collect();

    let (mut t, mut c) = (0, 0);
    // Position after the last `%` seen, and the value index it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while c < chars.len() {
        match tokens.get(t) {
            Some(Token::Any) => {
                backtrack = Some((t + 1, c));
                t += 1;
            }
            Some(Token::One) => {
                t += 1;
                c += 1;
            }
            Some(Token::Literal(l)) if *l == chars[c] => {
                t += 1;
                c += 1;
            }
            _ => match backtrack {
                Some((after, tried)) => {
                    t = after;
                    c = tried + 1;
                    backtrack = Some((after, tried + 1));
                }
                None => return false,
            },
        }
    }

    tokens[t..].iter().all(|token| *token == Token::Any)
}
