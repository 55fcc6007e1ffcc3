//! Expression evaluation: identifier binding, dynamic type coercion, LIKE
//! pattern matching, and truthiness (§4.6).

use crate::catalog::table::{Row, Table};
use crate::decimal::Decimal;
use crate::error::{SqlError, SqlResult};
use crate::parser::ast::{BinaryOperator, Expr};
use crate::value::Value;

use super::result::ResultRow;

/// Evaluates `expr` against a single table row (bare identifiers resolve to
/// that row's columns). Fails on an `Aggregate` node — those are only valid
/// in a SELECT/HAVING evaluated through the group-aware path.
pub fn eval_scalar(expr: &Expr, table: &Table, row: &Row) -> SqlResult<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Identifier(name) => table
            .get(row, name)
            .cloned()
            .ok_or_else(|| SqlError::column_not_found(name.clone())),
        Expr::BinaryOp { left, op, right } => {
            let l = eval_scalar(left, table, row)?;
            eval_binary(*op, l, || eval_scalar(right, table, row))
        }
        Expr::Aggregate { .. } => Err(SqlError::syntax_error(
            "aggregate functions are only valid in a SELECT list or HAVING clause",
            0,
            0,
        )),
    }
}

/// Evaluates `expr` within a group: aggregate calls compute over every row in
/// `group_rows`; bare identifiers first check the group's already-projected
/// result row (covering group-by columns and aliases), falling back to the
/// group's representative row (§4.6 "HAVING ... against the group's result
/// row").
pub fn eval_in_group(
    expr: &Expr,
    table: &Table,
    group_rows: &[Row],
    result_row: &ResultRow,
) -> SqlResult<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Identifier(name) => {
            if let Some(v) = result_row.get(name) {
                return Ok(v.clone());
            }
            match group_rows.first() {
                Some(row) => table
                    .get(row, name)
                    .cloned()
                    .ok_or_else(|| SqlError::column_not_found(name.clone())),
                None => Ok(Value::Null),
            }
        }
        Expr::BinaryOp { left, op, right } => {
            let l = eval_in_group(left, table, group_rows, result_row)?;
            eval_binary(*op, l, || eval_in_group(right, table, group_rows, result_row))
        }
        Expr::Aggregate { kind, arg } => {
            super::aggregate::compute(*kind, arg.as_deref(), table, group_rows)
        }
    }
}

pub(crate) fn eval_binary(
    op: BinaryOperator,
    left: Value,
    eval_right: impl FnOnce() -> SqlResult<Value>,
) -> SqlResult<Value> {
    use BinaryOperator::*;
    match op {
        And => {
            if !truthy(&left) {
                return Ok(Value::Boolean(false));
            }
            let right = eval_right()?;
            Ok(Value::Boolean(truthy(&right)))
        }
        Or => {
            if truthy(&left) {
                return Ok(Value::Boolean(true));
            }
            let right = eval_right()?;
            Ok(Value::Boolean(truthy(&right)))
        }
        Eq => {
            let right = eval_right()?;
            Ok(Value::Boolean(values_equal(&left, &right)))
        }
        NotEq => {
            let right = eval_right()?;
            Ok(Value::Boolean(!values_equal(&left, &right)))
        }
        Lt => {
            let right = eval_right()?;
            Ok(Value::Boolean(left < right))
        }
        LtEq => {
            let right = eval_right()?;
            Ok(Value::Boolean(left <= right))
        }
        Gt => {
            let right = eval_right()?;
            Ok(Value::Boolean(left > right))
        }
        GtEq => {
            let right = eval_right()?;
            Ok(Value::Boolean(left >= right))
        }
        Like => {
            let right = eval_right()?;
            Ok(Value::Boolean(like_match(&left, &right)))
        }
        Add | Sub | Mul | Div | Mod => {
            let right = eval_right()?;
            arithmetic(op, left, right)
        }
    }
}

/// Equality is case-insensitive string equality of stringifications (§4.6).
fn values_equal(left: &Value, right: &Value) -> bool {
    if left.is_null() || right.is_null() {
        return left.is_null() && right.is_null();
    }
    left.stringify().to_lowercase() == right.stringify().to_lowercase()
}

/// A bare identifier/value in boolean position is truthy iff non-null
/// (§4.6); an explicit boolean false is the one non-null falsy value.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Boolean(b) => *b,
        _ => true,
    }
}

/// LIKE is a case-insensitive glob: `%` matches any (possibly empty)
/// substring, `_` matches exactly one character, all else matches literally
/// (§4.6).
pub fn like_match(value: &Value, pattern: &Value) -> bool {
    if value.is_null() || pattern.is_null() {
        return false;
    }
    let text = value.stringify().to_lowercase();
    let pat = pattern.stringify().to_lowercase();
    glob_match(&pat.chars().collect::<Vec<_>>(), &text.chars().collect::<Vec<_>>())
}

fn glob_match(pattern: &[char], text: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => {
            glob_match(&pattern[1..], text)
                || (!text.is_empty() && glob_match(pattern, &text[1..]))
        }
        Some('_') => !text.is_empty() && glob_match(&pattern[1..], &text[1..]),
        Some(ch) => !text.is_empty() && text[0] == *ch && glob_match(&pattern[1..], &text[1..]),
    }
}

/// Binary arithmetic type coercion (§4.6 "Type coercion"): decimal-decimal
/// stays decimal; string `+` concatenates; anything else converts both
/// sides to decimal.
fn arithmetic(op: BinaryOperator, left: Value, right: Value) -> SqlResult<Value> {
    use BinaryOperator::*;
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    if matches!(left, Value::Text(_)) || matches!(right, Value::Text(_)) {
        return match op {
            Add => Ok(Value::Text(format!("{}{}", left, right))),
            _ => Err(SqlError::type_mismatch(
                "<expr>",
                "DECIMAL",
                left.data_type()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "TEXT".to_string()),
            )),
        };
    }
    let l = to_decimal(&left)?;
    let r = to_decimal(&right)?;
    let result = match op {
        Add => l.checked_add(&r),
        Sub => l.checked_sub(&r),
        Mul => l.checked_mul(&r),
        Div => return l.checked_div(&r).map(Value::Decimal).ok_or(SqlError::DivisionByZero),
        Mod => return l.checked_rem_euclid(&r).map(Value::Decimal).ok_or(SqlError::DivisionByZero),
        _ => unreachable!("non-arithmetic operator reached arithmetic()"),
    };
    result
        .map(Value::Decimal)
        .ok_or_else(|| SqlError::invalid_argument("decimal arithmetic overflow"))
}

pub fn to_decimal(value: &Value) -> SqlResult<Decimal> {
    if let Some(d) = value.as_decimal() {
        return Ok(d);
    }
    value
        .stringify()
        .parse::<Decimal>()
        .map_err(|_| SqlError::type_mismatch(
            "<expr>",
            "DECIMAL",
            value
                .data_type()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "NULL".to_string()),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_percent_matches_any_substring() {
        assert!(like_match(
            &Value::Text("Charlie Smith".into()),
            &Value::Text("%Smith".into())
        ));
        assert!(!like_match(
            &Value::Text("Smith Charlie".into()),
            &Value::Text("%Smith".into())
        ));
    }

    #[test]
    fn like_underscore_matches_single_char() {
        assert!(like_match(&Value::Text("cat".into()), &Value::Text("c_t".into())));
        assert!(!like_match(&Value::Text("ct".into()), &Value::Text("c_t".into())));
    }

    #[test]
    fn like_is_case_insensitive() {
        assert!(like_match(&Value::Text("SMITH".into()), &Value::Text("smith".into())));
    }

    #[test]
    fn equality_is_case_insensitive_string_compare() {
        assert!(values_equal(
            &Value::Text("Alice".into()),
            &Value::Text("ALICE".into())
        ));
    }

    #[test]
    fn string_plus_anything_concatenates() {
        let result = arithmetic(
            BinaryOperator::Add,
            Value::Text("a".into()),
            Value::Integer(1),
        )
        .unwrap();
        assert_eq!(result, Value::Text("a1".into()));
    }

    #[test]
    fn division_by_zero_fails() {
        let result = arithmetic(BinaryOperator::Div, Value::Integer(1), Value::Integer(0));
        assert!(matches!(result, Err(SqlError::DivisionByZero)));
    }

    #[test]
    fn modulo_uses_mathematical_definition() {
        let result = arithmetic(BinaryOperator::Mod, Value::Integer(-1), Value::Integer(3)).unwrap();
        assert_eq!(result, Value::Decimal("2".parse().unwrap()));
    }
}
