use super::Connection;
use crate::error::QueryResult;
use crate::row::Row;
use crate::value::Value;
use std::time::{Duration, Instant};
use tracing::Level;

/// Statement kind, detected from the leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryType {
    /// Detect the statement kind from SQL text.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("");
        if keyword.eq_ignore_ascii_case("select") {
            QueryType::Select
        } else if keyword.eq_ignore_ascii_case("insert") {
            QueryType::Insert
        } else if keyword.eq_ignore_ascii_case("update") {
            QueryType::Update
        } else if keyword.eq_ignore_ascii_case("delete") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

/// Settings for [`LoggingConnection`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Statements slower than this are logged at `WARN`.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Set the slow statement threshold.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A connection wrapper that logs every statement through `tracing`.
///
/// Events go to target `curia_db.sql` after the statement finishes, carrying
/// the statement kind, parameter count, elapsed time and row count.
///
/// ```ignore
/// let conn = LoggingConnection::new(SqliteConnection::open_in_memory()?)
///     .with_config(LogConfig::new().slow_query_threshold(Duration::from_millis(50)));
/// let rows = curia_db::table("users").get(&conn)?;
/// ```
#[derive(Debug, Clone)]
pub struct LoggingConnection<C> {
    inner: C,
    config: LogConfig,
}

impl<C: Connection> LoggingConnection<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            config: LogConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// The wrapped connection.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn run<T>(
        &self,
        sql: &str,
        bindings: &[Value],
        exec: impl FnOnce(&C) -> QueryResult<T>,
        count: impl Fn(&T) -> u64,
    ) -> QueryResult<T> {
        let start = Instant::now();
        let result = exec(&self.inner);
        let elapsed = start.elapsed();
        let query_type = QueryType::from_sql(sql);
        let shown = self.config.truncate_sql(sql);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        match &result {
            Ok(out) => {
                let rows = count(out);
                let slow = self
                    .config
                    .slow_query_threshold
                    .is_some_and(|threshold| elapsed > threshold);
                if slow {
                    tracing::warn!(
                        target: "curia_db.sql",
                        query_type = ?query_type,
                        param_count = bindings.len(),
                        elapsed_ms,
                        rows,
                        sql = %shown,
                        "slow query"
                    );
                } else {
                    emit(self.config.level, query_type, bindings.len(), elapsed_ms, rows, &shown);
                }
            }
            Err(error) => tracing::warn!(
                target: "curia_db.sql",
                query_type = ?query_type,
                param_count = bindings.len(),
                elapsed_ms,
                error = %error,
                sql = %shown,
                "query failed"
            ),
        }
        result
    }
}

fn emit(level: Level, query_type: QueryType, param_count: usize, elapsed_ms: f64, rows: u64, sql: &str) {
    /// Dispatch a tracing event at a runtime-determined level.
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                Level::ERROR => tracing::error!($($field)*),
                Level::WARN  => tracing::warn!($($field)*),
                Level::INFO  => tracing::info!($($field)*),
                Level::DEBUG => tracing::debug!($($field)*),
                Level::TRACE => tracing::trace!($($field)*),
            }
        };
    }

    emit_at_level!(
        level,
        target: "curia_db.sql",
        query_type = ?query_type,
        param_count,
        elapsed_ms,
        rows,
        sql = %sql,
    );
}

impl<C: Connection> Connection for LoggingConnection<C> {
    fn select(&self, sql: &str, bindings: &[Value]) -> QueryResult<Vec<Row>> {
        self.run(sql, bindings, |c| c.select(sql, bindings), |rows: &Vec<Row>| rows.len() as u64)
    }

    fn statement(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.run(sql, bindings, |c| c.statement(sql, bindings), |n: &u64| *n)
    }

    fn insert(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.run(sql, bindings, |c| c.insert(sql, bindings), |n: &u64| *n)
    }

    fn update(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.run(sql, bindings, |c| c.update(sql, bindings), |n: &u64| *n)
    }

    fn delete(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.run(sql, bindings, |c| c.delete(sql, bindings), |n: &u64| *n)
    }
}
