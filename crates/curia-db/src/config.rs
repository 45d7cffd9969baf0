//! Grammar configuration.
//!
//! The table prefix, identifier delimiter and operator allow-list are plain
//! values handed to every compile call, so any number of queries can be
//! rendered concurrently with different settings.
//!
//! ```ignore
//! use curia_db::GrammarConfig;
//!
//! let config = GrammarConfig::from_toml_str(r#"
//!     table_prefix = "app_"
//!     identifier_quote = '"'
//! "#)?;
//! # Ok::<(), curia_db::QueryError>(())
//! ```

use crate::error::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Comparison operators accepted by `where`/`having` clauses unless overridden.
pub const DEFAULT_OPERATORS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "<>", "!=", "<=>",
    "like", "like binary", "not like", "ilike",
    "&", "|", "^", "<<", ">>",
    "rlike", "regexp", "not regexp",
    "~", "~*", "!~", "!~*", "similar to",
    "not similar to", "not ilike", "~~*", "!~~*",
];

/// Configuration consumed by [`Grammar`](crate::grammar::Grammar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Prefix prepended to every table name (and table alias).
    pub table_prefix: String,
    /// Delimiter wrapped around identifiers. Occurrences inside a name are doubled.
    pub identifier_quote: char,
    /// Allowed comparison operators, compared case-insensitively.
    pub operators: Vec<String>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            identifier_quote: '`',
            operators: DEFAULT_OPERATORS.iter().map(|op| op.to_string()).collect(),
        }
    }
}

impl GrammarConfig {
    /// Create a new configuration with defaults (no prefix, backtick quoting).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table prefix.
    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Set the identifier delimiter (e.g. `"` for ANSI SQL).
    pub fn with_identifier_quote(mut self, quote: char) -> Self {
        self.identifier_quote = quote;
        self
    }

    /// Replace the operator allow-list.
    pub fn with_operators<I, S>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operators = operators.into_iter().map(Into::into).collect();
        self
    }

    /// Allow one more operator.
    pub fn allow_operator(mut self, operator: impl Into<String>) -> Self {
        self.operators.push(operator.into());
        self
    }

    /// Check whether `operator` is in the allow-list.
    pub fn is_valid_operator(&self, operator: &str) -> bool {
        let operator = operator.trim();
        self.operators
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(operator))
    }

    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> QueryResult<Self> {
        toml::from_str(raw).map_err(|e| QueryError::Config(format!("invalid grammar config: {e}")))
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            QueryError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }
}
