//! Column and Table metadata (§3), plus the coercion rules of §4.3.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

use crate::decimal::Decimal;
use crate::error::{SqlError, SqlResult};
use crate::value::{DataType, Value};

/// Immutable column metadata. Invariants enforced at construction time by
/// `Table::new`: name non-empty, primary-key columns never nullable, and a
/// non-null default's type must match the declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub is_primary_key: bool,
    pub is_nullable: bool,
    pub default: Option<Value>,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        is_primary_key: bool,
        is_nullable: bool,
        default: Option<Value>,
    ) -> Self {
        Column {
            name: name.into(),
            // a primary key is never nullable, regardless of what was requested
            is_nullable: is_nullable && !is_primary_key,
            data_type,
            is_primary_key,
            default,
        }
    }
}

/// A row is an ordered list of values aligned 1:1 with its table's declared
/// column order; lookups by name go through `Table::get` for case-insensitive
/// resolution, keeping the row itself a plain positional vector (§3's
/// "ordered-insensitive mapping" is realized as column-order-plus-lookup
/// rather than a second name-keyed map).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    primary_key_index: usize,
}

impl Table {
    /// Validates the §3 Table invariants: exactly one primary key, unique
    /// column names (case-insensitively), a non-empty table name.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> SqlResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SqlError::invalid_argument("table name must not be empty"));
        }
        if columns.is_empty() {
            return Err(SqlError::invalid_argument(
                "table must declare at least one column",
            ));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(SqlError::invalid_argument("column name must not be empty"));
            }
            if !seen.insert(column.name.to_lowercase()) {
                return Err(SqlError::invalid_argument(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
            if let Some(default) = &column.default {
                if !default.is_null() && default.data_type() != Some(column.data_type) {
                    return Err(SqlError::type_mismatch(
                        &column.name,
                        column.data_type.to_string(),
                        default
                            .data_type()
                            .map(|t| t.to_string())
                            .unwrap_or_else(|| "NULL".to_string()),
                    ));
                }
            }
        }

        let pk_positions: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_primary_key)
            .map(|(i, _)| i)
            .collect();
        if pk_positions.len() != 1 {
            return Err(SqlError::invalid_argument(
                "table must declare exactly one primary key column",
            ));
        }

        Ok(Table {
            name,
            columns,
            primary_key_index: pk_positions[0],
        })
    }

    pub fn primary_key_column(&self) -> &Column {
        &self.columns[self.primary_key_index]
    }

    pub fn primary_key_index(&self) -> usize {
        self.primary_key_index
    }

    /// Case-insensitive column lookup, returning the column's position.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    pub fn get<'a>(&self, row: &'a Row, name: &str) -> Option<&'a Value> {
        self.column_index(name).map(|i| &row.values[i])
    }

    /// Renders a row's primary-key value as the B+ tree key string.
    pub fn primary_key_of(&self, row: &Row) -> String {
        row.values[self.primary_key_index].stringify()
    }

    /// Builds a row for a bare `INSERT ... VALUES (...)` by pairing the
    /// declared-or-explicit column list with the supplied values, filling
    /// any column absent from the list with its default (§4.3/§4.6).
    pub fn build_row(
        &self,
        column_names: &[String],
        values: Vec<Value>,
    ) -> SqlResult<Row> {
        if column_names.len() != values.len() {
            return Err(SqlError::arity_error(column_names.len(), values.len()));
        }

        let mut row_values: Vec<Option<Value>> = vec![None; self.columns.len()];
        for (name, value) in column_names.iter().zip(values.into_iter()) {
            let index = self
                .column_index(name)
                .ok_or_else(|| SqlError::column_not_found(name.clone()))?;
            row_values[index] = Some(self.coerce(index, value)?);
        }

        let mut finished = Vec::with_capacity(self.columns.len());
        for (index, column) in self.columns.iter().enumerate() {
            let value = match row_values[index].take() {
                Some(v) => v,
                None => column.default.clone().unwrap_or(Value::Null),
            };
            if value.is_null() && !column.is_nullable {
                return Err(SqlError::null_violation(column.name.clone()));
            }
            finished.push(value);
        }
        Ok(Row::new(finished))
    }

    /// Converts `value` to the declared type of the column at `index`,
    /// using canonical string parsing for numbers/dates (§4.3).
    pub fn coerce(&self, index: usize, value: Value) -> SqlResult<Value> {
        let column = &self.columns[index];
        if value.is_null() {
            if !column.is_nullable {
                return Err(SqlError::null_violation(column.name.clone()));
            }
            return Ok(Value::Null);
        }

        let mismatch = |found: &Value| {
            SqlError::type_mismatch(
                column.name.clone(),
                column.data_type.to_string(),
                found
                    .data_type()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "NULL".to_string()),
            )
        };

        match column.data_type {
            DataType::Int => match &value {
                Value::Integer(_) => Ok(value),
                Value::Text(s) => s
                    .trim()
                    .parse::<i32>()
                    .map(Value::Integer)
                    .map_err(|_| mismatch(&value)),
                Value::Decimal(d) => Ok(Value::Integer(d.to_f64() as i32)),
                _ => Err(mismatch(&value)),
            },
            DataType::Decimal => match &value {
                Value::Decimal(_) => Ok(value),
                Value::Integer(i) => Ok(Value::Decimal(Decimal::from_i64(*i as i64))),
                Value::Text(s) => s
                    .trim()
                    .parse::<Decimal>()
                    .map(Value::Decimal)
                    .map_err(|_| mismatch(&value)),
                _ => Err(mismatch(&value)),
            },
            DataType::Varchar | DataType::Text => match value {
                Value::Text(_) => Ok(value),
                other => Ok(Value::Text(other.to_string())),
            },
            DataType::Boolean => match &value {
                Value::Boolean(_) => Ok(value),
                Value::Text(s) => match s.to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::Boolean(true)),
                    "false" => Ok(Value::Boolean(false)),
                    _ => Err(mismatch(&value)),
                },
                _ => Err(mismatch(&value)),
            },
            DataType::DateTime => match &value {
                Value::DateTime(_) => Ok(value),
                Value::Text(s) => parse_datetime(s).map(Value::DateTime).ok_or_else(|| mismatch(&value)),
                _ => Err(mismatch(&value)),
            },
            DataType::Date => match &value {
                Value::Date(_) => Ok(value),
                Value::Text(s) => parse_date(s).map(Value::Date).ok_or_else(|| mismatch(&value)),
                _ => Err(mismatch(&value)),
            },
        }
    }
}

/// Canonical (invariant-culture) date/datetime parsing shared by coercion and
/// comparison of string literals against DATE/DATETIME columns.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| parse_date(s).map(|d| d.and_hms_opt(0, 0, 0).unwrap()))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_table() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", DataType::Int, true, false, None),
                Column::new("name", DataType::Varchar, false, true, None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_column_names() {
        let result = Table::new(
            "t",
            vec![
                Column::new("a", DataType::Int, true, false, None),
                Column::new("a", DataType::Varchar, false, true, None),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn requires_exactly_one_primary_key() {
        let result = Table::new(
            "t",
            vec![
                Column::new("a", DataType::Int, false, true, None),
                Column::new("b", DataType::Varchar, false, true, None),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn primary_key_is_never_nullable() {
        let column = Column::new("id", DataType::Int, true, true, None);
        assert!(!column.is_nullable);
    }

    #[test]
    fn build_row_fills_defaults_and_coerces() {
        let table = users_table();
        let row = table
            .build_row(&["id".to_string()], vec![Value::Text("7".to_string())])
            .unwrap();
        assert_eq!(row.values[0], Value::Integer(7));
        assert_eq!(row.values[1], Value::Null);
    }

    #[test]
    fn coerce_null_on_non_nullable_fails() {
        let table = users_table();
        let result = table.coerce(0, Value::Null);
        assert!(matches!(result, Err(SqlError::NullViolation { .. })));
    }
}
