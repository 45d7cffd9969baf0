use super::Connection;
use crate::error::QueryResult;
use crate::row::Row;
use crate::value::Value;
use rusqlite::params_from_iter;
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use std::path::Path;

/// [`Connection`] backed by a `rusqlite` database.
///
/// SQLite understands backtick-quoted identifiers and `?` placeholders, so
/// compiled queries run unchanged.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open a private in-memory database.
    pub fn open_in_memory() -> QueryResult<Self> {
        Ok(Self {
            conn: rusqlite::Connection::open_in_memory()?,
        })
    }

    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> QueryResult<Self> {
        Ok(Self {
            conn: rusqlite::Connection::open(path)?,
        })
    }

    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// The underlying `rusqlite` connection.
    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Run several `;`-separated statements without bindings (schema setup, fixtures).
    pub fn execute_batch(&self, sql: &str) -> QueryResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl Connection for SqliteConnection {
    fn select(&self, sql: &str, bindings: &[Value]) -> QueryResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(bindings.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(from_value_ref(row.get_ref(i)?));
            }
            out.push(Row::new(columns.clone(), values));
        }
        Ok(out)
    }

    fn statement(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        let affected = self.conn.execute(sql, params_from_iter(bindings.iter()))?;
        Ok(affected as u64)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(r) => Value::Float(r),
        ValueRef::Text(text) => Value::Text(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => Value::Bytes(blob.to_vec()),
    }
}
