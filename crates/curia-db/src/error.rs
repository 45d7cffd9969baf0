//! Error types for curia-db

use thiserror::Error;

/// Result type alias for SQL rendering.
pub type CompileResult<T> = Result<T, CompileError>;

/// Result type alias for query execution.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while rendering a query to SQL.
///
/// Builders never validate while accumulating clauses; every one of these
/// surfaces the first time the query is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Empty or malformed table/column identifier
    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    /// Comparison operator outside the configured allow-list
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Placeholder count in the SQL does not match the flattened bindings
    #[error("Binding mismatch: SQL has {placeholders} placeholder(s) but {bindings} binding(s)")]
    BindingMismatch { placeholders: usize, bindings: usize },
}

impl CompileError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by the execution paths of a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query could not be rendered
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Connection-level failure reported by a `Connection` implementation
    #[error("Connection error: {0}")]
    Connection(String),

    /// SQLite driver error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error came from rendering the query
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Self::Compile(_))
    }
}
