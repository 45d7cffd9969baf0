//! # curia-db
//!
//! A fluent SQL query builder and grammar compiler.
//!
//! ## Features
//!
//! - **Fluent accumulation**: chain `select` / `where_` / `join` / `order_by` / ... calls
//! - **Parameterized output**: every value becomes a positional `?`, bindings are
//!   flattened in the exact order their placeholders appear
//! - **Explicit configuration**: table prefix, identifier quote and operator
//!   allow-list are carried in a [`GrammarConfig`], never in globals
//! - **Exhaustive clause kinds**: predicates are a closed enum, each with its own compiler
//! - **Pluggable execution**: any [`Connection`] can run the compiled SQL; SQLite
//!   ships behind the `sqlite` feature
//!
//! ## Example
//!
//! ```ignore
//! use curia_db::{SqliteConnection, table};
//!
//! let conn = SqliteConnection::open_in_memory()?;
//!
//! let query = table("users")
//!     .select(["id", "name"])
//!     .where_("votes", ">", 100)
//!     .where_in("status", ["active", "pending"])
//!     .order_by("name", "asc")
//!     .limit(10);
//!
//! assert_eq!(
//!     query.to_sql()?,
//!     "select `id`, `name` from `users` where `votes` > ? and `status` in (?, ?) \
//!      order by `name` asc limit 10"
//! );
//!
//! let rows = query.get(&conn)?;
//! let total = table("users").count(&conn)?;
//! ```
//!
//! Raw fragments built with [`raw`] are spliced into the SQL verbatim and
//! never bound. Passing untrusted input through them is SQL injection.

pub mod config;
pub mod connection;
pub mod error;
pub mod grammar;
pub mod ident;
pub mod query;
pub mod row;
pub mod value;

pub use config::GrammarConfig;
pub use connection::{Connection, LogConfig, LoggingConnection, QueryType};
#[cfg(feature = "sqlite")]
pub use connection::SqliteConnection;
pub use error::{CompileError, CompileResult, QueryError, QueryResult};
pub use grammar::{Grammar, SELECT_COMPONENTS, SelectComponent};
pub use ident::{Ident, IntoIdent};
pub use query::{
    AggregateFunction, BindingBucket, Bindings, Boolean, CompiledQuery, Direction, JoinClause,
    JoinType, Lock, Order, QueryBuilder, Where, WhereKind,
};
pub use row::{FromRow, FromValue, Row};
pub use value::{Expression, IntoParam, Param, Value, raw};

/// Start a query against `table`.
pub fn table(table: impl IntoIdent) -> QueryBuilder {
    QueryBuilder::table(table)
}

/// Start an empty query with the default configuration.
pub fn query() -> QueryBuilder {
    QueryBuilder::new()
}
