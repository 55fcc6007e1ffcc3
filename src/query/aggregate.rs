//! Aggregate computation over a group of rows (§4.6 "Aggregates").

use crate::catalog::table::{Row, Table};
use crate::decimal::Decimal;
use crate::error::SqlResult;
use crate::parser::ast::{AggregateKind, Expr};
use crate::value::Value;

use super::expr::{eval_scalar, to_decimal};

/// Computes one aggregate over `rows`. `arg` is `None` only for `COUNT(*)`.
/// Aggregates over an empty group return null, except `COUNT` which returns
/// 0 (§4.6).
pub fn compute(
    kind: AggregateKind,
    arg: Option<&Expr>,
    table: &Table,
    rows: &[Row],
) -> SqlResult<Value> {
    match kind {
        AggregateKind::Count => match arg {
            None => Ok(Value::Integer(rows.len() as i32)),
            Some(expr) => {
                let mut count = 0i32;
                for row in rows {
                    if !eval_scalar(expr, table, row)?.is_null() {
                        count += 1;
                    }
                }
                Ok(Value::Integer(count))
            }
        },
        AggregateKind::Sum | AggregateKind::Avg => {
            let expr = arg.expect("SUM/AVG always carry an argument expression");
            let mut values = Vec::new();
            for row in rows {
                let v = eval_scalar(expr, table, row)?;
                if !v.is_null() {
                    values.push(to_decimal(&v)?);
                }
            }
            if values.is_empty() {
                return Ok(Value::Null);
            }
            let sum = values
                .iter()
                .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
                .ok_or_else(|| crate::error::SqlError::invalid_argument("decimal overflow in SUM"))?;
            match kind {
                AggregateKind::Sum => Ok(Value::Decimal(sum)),
                AggregateKind::Avg => {
                    let count = Decimal::from_i64(values.len() as i64);
                    Ok(Value::Decimal(sum.checked_div(&count).expect("count is non-zero")))
                }
                _ => unreachable!(),
            }
        }
        AggregateKind::Min | AggregateKind::Max => {
            let expr = arg.expect("MIN/MAX always carry an argument expression");
            let mut best: Option<Value> = None;
            for row in rows {
                let v = eval_scalar(expr, table, row)?;
                if v.is_null() {
                    continue;
                }
                best = Some(match best {
                    None => v,
                    Some(current) => {
                        let replace = match kind {
                            AggregateKind::Min => v < current,
                            AggregateKind::Max => v > current,
                            _ => unreachable!(),
                        };
                        if replace {
                            v
                        } else {
                            current
                        }
                    }
                });
            }
            Ok(best.unwrap_or(Value::Null))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::table::Column;
    use crate::value::DataType;

    fn users() -> (Table, Vec<Row>) {
        let table = Table::new(
            "users",
            vec![
                Column::new("id", DataType::Int, true, false, None),
                Column::new("name", DataType::Varchar, false, true, None),
            ],
        )
        .unwrap();
        let rows = vec![
            Row::new(vec![Value::Integer(1), Value::Text("Alice".into())]),
            Row::new(vec![Value::Integer(2), Value::Text("Bob".into())]),
            Row::new(vec![Value::Integer(3), Value::Null]),
        ];
        (table, rows)
    }

    #[test]
    fn count_star_is_group_size() {
        let (table, rows) = users();
        let result = compute(AggregateKind::Count, None, &table, &rows).unwrap();
        assert_eq!(result, Value::Integer(3));
    }

    #[test]
    fn count_expr_skips_nulls() {
        let (table, rows) = users();
        let expr = Expr::Identifier("name".to_string());
        let result = compute(AggregateKind::Count, Some(&expr), &table, &rows).unwrap();
        assert_eq!(result, Value::Integer(2));
    }

    #[test]
    fn sum_over_empty_group_is_null() {
        let (table, _) = users();
        let expr = Expr::Identifier("id".to_string());
        let result = compute(AggregateKind::Sum, Some(&expr), &table, &[]).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn sum_coerces_to_decimal() {
        let (table, rows) = users();
        let expr = Expr::Identifier("id".to_string());
        let result = compute(AggregateKind::Sum, Some(&expr), &table, &rows).unwrap();
        assert_eq!(result, Value::Decimal("6".parse().unwrap()));
    }

    #[test]
    fn min_max_use_natural_ordering() {
        let (table, rows) = users();
        let expr = Expr::Identifier("id".to_string());
        assert_eq!(
            compute(AggregateKind::Min, Some(&expr), &table, &rows).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(
            compute(AggregateKind::Max, Some(&expr), &table, &rows).unwrap(),
            Value::Integer(3)
        );
    }
}
