//! Dynamically typed scalar values flowing through the lexer, evaluator, and
//! B+ tree store.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::decimal::Decimal;

/// The seven concrete value kinds a column may hold (§3).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Decimal(Decimal),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Null,
}

/// Canonical on-disk/display type tag (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Varchar,
    Text,
    Decimal,
    Boolean,
    DateTime,
    Date,
}

impl DataType {
    pub fn tag(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Varchar => "VARCHAR",
            DataType::Text => "TEXT",
            DataType::Decimal => "DECIMAL",
            DataType::Boolean => "BOOLEAN",
            DataType::DateTime => "DATETIME",
            DataType::Date => "DATE",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "INT" => Some(DataType::Int),
            "VARCHAR" => Some(DataType::Varchar),
            "TEXT" => Some(DataType::Text),
            "DECIMAL" => Some(DataType::Decimal),
            "BOOLEAN" => Some(DataType::Boolean),
            "DATETIME" => Some(DataType::DateTime),
            "DATE" => Some(DataType::Date),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Integer(_) => Some(DataType::Int),
            Value::Decimal(_) => Some(DataType::Decimal),
            Value::Text(_) => Some(DataType::Text),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::DateTime(_) => Some(DataType::DateTime),
            Value::Date(_) => Some(DataType::Date),
            Value::Null => None,
        }
    }

    /// Stringification used for comparisons, equality, and group keys (§4.6).
    pub fn stringify(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            other => other.to_string(),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            Value::Integer(i) => Some(Decimal::from_i64(*i as i64)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Null => write!(f, "null"),
        }
    }
}

/// Comparison per §4.6: nulls sort below non-nulls; both-string is
/// case-insensitive lexicographic; otherwise numeric parse of both
/// stringifications with a case-insensitive string fallback.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) => Some(Ordering::Less),
            (_, Value::Null) => Some(Ordering::Greater),
            (Value::Text(a), Value::Text(b)) => {
                Some(a.to_lowercase().cmp(&b.to_lowercase()))
            }
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
            _ => {
                let a_str = self.stringify();
                let b_str = other.stringify();
                if let (Ok(a_dec), Ok(b_dec)) =
                    (a_str.parse::<Decimal>(), b_str.parse::<Decimal>())
                {
                    Some(a_dec.cmp(&b_dec))
                } else {
                    Some(a_str.to_lowercase().cmp(&b_str.to_lowercase()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_sort_below_non_nulls() {
        assert_eq!(
            Value::Null.partial_cmp(&Value::Integer(0)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn mixed_numeric_stringification_compares_numerically() {
        let a = Value::Integer(9);
        let b = Value::Text("10".to_string());
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));
    }

    #[test]
    fn string_comparison_is_case_insensitive() {
        let a = Value::Text("apple".to_string());
        let b = Value::Text("APPLE".to_string());
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Equal));
    }
}
