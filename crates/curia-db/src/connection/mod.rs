//! The executor a compiled query is handed to.
//!
//! [`Connection`] is deliberately small: SQL text plus positional bindings in,
//! rows or an affected-row count out. Anything that can run `?`-placeholder
//! SQL can implement it.

mod logging;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use logging::{LogConfig, LoggingConnection, QueryType};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;

use crate::error::QueryResult;
use crate::row::Row;
use crate::value::Value;

/// A synchronous SQL executor.
pub trait Connection {
    /// Run a query and return all rows.
    fn select(&self, sql: &str, bindings: &[Value]) -> QueryResult<Vec<Row>>;

    /// Run a query and return the first row, if any.
    ///
    /// Extra rows are ignored.
    fn select_one(&self, sql: &str, bindings: &[Value]) -> QueryResult<Option<Row>> {
        Ok(self.select(sql, bindings)?.into_iter().next())
    }

    /// Run a statement and return the number of affected rows.
    fn statement(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64>;

    /// Run an INSERT statement.
    fn insert(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.statement(sql, bindings)
    }

    /// Run an UPDATE statement.
    fn update(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.statement(sql, bindings)
    }

    /// Run a DELETE statement.
    fn delete(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.statement(sql, bindings)
    }
}

impl<C: Connection + ?Sized> Connection for &C {
    fn select(&self, sql: &str, bindings: &[Value]) -> QueryResult<Vec<Row>> {
        (**self).select(sql, bindings)
    }

    fn select_one(&self, sql: &str, bindings: &[Value]) -> QueryResult<Option<Row>> {
        (**self).select_one(sql, bindings)
    }

    fn statement(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        (**self).statement(sql, bindings)
    }

    fn insert(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        (**self).insert(sql, bindings)
    }

    fn update(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        (**self).update(sql, bindings)
    }

    fn delete(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        (**self).delete(sql, bindings)
    }
}
