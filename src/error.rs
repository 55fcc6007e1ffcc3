use thiserror::Error;

pub type SqlResult<T> = Result<T, SqlError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SqlError {
    #[error("Lex error at {line}:{column}: {message}")]
    LexError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Syntax error at {line}:{column}: {message}")]
    SyntaxError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Table not found: {table}")]
    TableNotFound { table: String },

    #[error("Table already exists: {table}")]
    TableExists { table: String },

    #[error("Column not found: {column}")]
    ColumnNotFound { column: String },

    #[error("Type mismatch for column {column}: expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Column {column} does not allow null values")]
    NullViolation { column: String },

    #[error("Arity mismatch: expected {expected} values, got {found}")]
    ArityError { expected: usize, found: usize },

    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Corrupt database: {message}")]
    CorruptDatabase { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl SqlError {
    pub fn lex_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        SqlError::LexError {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn syntax_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        SqlError::SyntaxError {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn table_not_found(table: impl Into<String>) -> Self {
        SqlError::TableNotFound { table: table.into() }
    }

    pub fn table_exists(table: impl Into<String>) -> Self {
        SqlError::TableExists { table: table.into() }
    }

    pub fn column_not_found(column: impl Into<String>) -> Self {
        SqlError::ColumnNotFound { column: column.into() }
    }

    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        SqlError::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn null_violation(column: impl Into<String>) -> Self {
        SqlError::NullViolation { column: column.into() }
    }

    pub fn arity_error(expected: usize, found: usize) -> Self {
        SqlError::ArityError { expected, found }
    }

    pub fn key_not_found(key: impl Into<String>) -> Self {
        SqlError::KeyNotFound { key: key.into() }
    }

    pub fn division_by_zero() -> Self {
        SqlError::DivisionByZero
    }

    pub fn corrupt_database(message: impl Into<String>) -> Self {
        SqlError::CorruptDatabase { message: message.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        SqlError::InvalidArgument { message: message.into() }
    }
}
