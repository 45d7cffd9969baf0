//! Fluent query builder.
//!
//! A [`QueryBuilder`] accumulates the intent of one SELECT: columns, table,
//! joins, predicates, grouping, ordering, paging, unions and locks, plus the
//! values bound to each clause. Nothing is validated while accumulating; the
//! [`Grammar`](crate::grammar::Grammar) checks identifiers and operators the
//! first time the query is rendered.
//!
//! # Usage
//!
//! ```ignore
//! use curia_db::table;
//!
//! let qb = table("users")
//!     .select(["id", "name"])
//!     .where_("votes", ">", 100)
//!     .where_nested(|q| q.where_("name", "=", "alice").or_where("name", "=", "bob"))
//!     .order_by("name", "desc")
//!     .limit(10);
//!
//! assert_eq!(
//!     qb.to_sql()?,
//!     "select `id`, `name` from `users` where `votes` > ? and (`name` = ? or `name` = ?) \
//!      order by `name` desc limit 10"
//! );
//! let rows = qb.get(&conn)?;
//! ```

mod bindings;
mod clauses;
mod join;
mod wheres;

pub use bindings::{BindingBucket, Bindings};
pub use clauses::{
    Aggregate, AggregateFunction, Boolean, Direction, Having, HavingKind, Lock, Order, Union,
};
pub use join::{JoinClause, JoinType};
pub use wheres::{DatePart, Where, WhereKind};

use crate::config::GrammarConfig;
use crate::connection::Connection;
use crate::error::{CompileError, CompileResult, QueryError, QueryResult};
use crate::grammar::{Grammar, count_placeholders};
use crate::ident::{Ident, IntoIdent};
use crate::row::{FromRow, Row};
use crate::value::{Expression, IntoParam, Value};
use std::sync::Arc;

/// Column used by [`QueryBuilder::latest`] and [`QueryBuilder::oldest`].
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "created_at";

/// Stateful accumulator for one SELECT query.
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    config: Arc<GrammarConfig>,
    pub(crate) bindings: Bindings,
    pub(crate) aggregate: Option<Aggregate>,
    /// `None` renders as `*`
    pub(crate) columns: Option<Vec<Ident>>,
    pub(crate) distinct: bool,
    pub(crate) from: Option<Ident>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) wheres: Vec<Where>,
    pub(crate) groups: Vec<Ident>,
    pub(crate) havings: Vec<Having>,
    pub(crate) orders: Vec<Order>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) unions: Vec<Union>,
    pub(crate) union_orders: Vec<Order>,
    pub(crate) union_limit: Option<u64>,
    pub(crate) union_offset: Option<u64>,
    pub(crate) lock: Option<Lock>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// Create an empty builder with the default grammar configuration.
    pub fn new() -> Self {
        Self::with_shared_config(Arc::new(GrammarConfig::default()))
    }

    /// Create an empty builder rendering with `config`.
    pub fn with_config(config: GrammarConfig) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    /// Create an empty builder sharing an existing configuration.
    pub fn with_shared_config(config: Arc<GrammarConfig>) -> Self {
        Self {
            config,
            bindings: Bindings::new(),
            aggregate: None,
            columns: None,
            distinct: false,
            from: None,
            joins: Vec::new(),
            wheres: Vec::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            unions: Vec::new(),
            union_orders: Vec::new(),
            union_limit: None,
            union_offset: None,
            lock: None,
        }
    }

    /// Create a builder targeting `table`.
    pub fn table(table: impl IntoIdent) -> Self {
        Self::new().from(table)
    }

    /// Create an empty builder sharing this builder's configuration.
    pub fn new_query(&self) -> Self {
        Self::with_shared_config(Arc::clone(&self.config))
    }

    // ==================== Accessors ====================

    /// The grammar configuration used by [`to_sql`](Self::to_sql).
    pub fn config(&self) -> &GrammarConfig {
        &self.config
    }

    /// Selected columns; `None` means `*`.
    pub fn columns(&self) -> Option<&[Ident]> {
        self.columns.as_deref()
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn from_table(&self) -> Option<&Ident> {
        self.from.as_ref()
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    pub fn wheres(&self) -> &[Where] {
        &self.wheres
    }

    pub fn groups(&self) -> &[Ident] {
        &self.groups
    }

    pub fn havings(&self) -> &[Having] {
        &self.havings
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn union_orders(&self) -> &[Order] {
        &self.union_orders
    }

    pub fn unions(&self) -> &[Union] {
        &self.unions
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    pub fn union_limit_value(&self) -> Option<u64> {
        self.union_limit
    }

    pub fn union_offset_value(&self) -> Option<u64> {
        self.union_offset
    }

    pub fn lock_mode(&self) -> Option<&Lock> {
        self.lock.as_ref()
    }

    pub fn aggregate_value(&self) -> Option<&Aggregate> {
        self.aggregate.as_ref()
    }

    /// Bindings grouped by clause.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    // ==================== SELECT columns ====================

    /// Set the columns to be selected.
    pub fn select<C: IntoIdent>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.columns = Some(columns.into_iter().map(IntoIdent::into_ident).collect());
        self
    }

    /// Append columns to the selection. Without a prior `select`, the
    /// selection becomes exactly these columns.
    pub fn add_select<C: IntoIdent>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.columns
            .get_or_insert_with(Vec::new)
            .extend(columns.into_iter().map(IntoIdent::into_ident));
        self
    }

    /// Append a raw select expression. `?` placeholders consume `bindings`.
    pub fn select_raw<V: Into<Value>>(mut self, sql: &str, bindings: impl IntoIterator<Item = V>) -> Self {
        self.bindings
            .extend(BindingBucket::Select, bindings.into_iter().map(Into::into));
        self.columns
            .get_or_insert_with(Vec::new)
            .push(Ident::Raw(Expression::new(sql)));
        self
    }

    /// Force the query to only return distinct results.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== FROM ====================

    /// Set the table the query targets.
    pub fn from(mut self, table: impl IntoIdent) -> Self {
        self.from = Some(table.into_ident());
        self
    }

    /// Set a raw FROM expression. `?` placeholders consume `bindings`.
    pub fn from_raw<V: Into<Value>>(mut self, sql: &str, bindings: impl IntoIterator<Item = V>) -> Self {
        self.bindings
            .extend(BindingBucket::From, bindings.into_iter().map(Into::into));
        self.from = Some(Ident::Raw(Expression::new(sql)));
        self
    }

    // ==================== JOIN ====================

    /// Add a join whose conditions are built by `build`.
    ///
    /// # Example
    /// ```ignore
    /// let qb = curia_db::table("users").join_with(JoinType::Left, "posts", |j| {
    ///     j.on("users.id", "=", "posts.user_id").where_("posts.published", "=", true)
    /// });
    /// ```
    pub fn join_with(
        mut self,
        kind: JoinType,
        table: impl IntoIdent,
        build: impl FnOnce(JoinClause) -> JoinClause,
    ) -> Self {
        let join = build(JoinClause::new(kind, table.into_ident(), &self));
        self.bindings.extend(BindingBucket::Join, join.get_bindings());
        self.joins.push(join);
        self
    }

    /// Add INNER JOIN table ON first op second.
    pub fn join(
        self,
        table: impl IntoIdent,
        first: impl IntoIdent,
        operator: &str,
        second: impl IntoIdent,
    ) -> Self {
        self.join_with(JoinType::Inner, table, |j| j.on(first, operator, second))
    }

    /// Add LEFT JOIN table ON first op second.
    pub fn left_join(
        self,
        table: impl IntoIdent,
        first: impl IntoIdent,
        operator: &str,
        second: impl IntoIdent,
    ) -> Self {
        self.join_with(JoinType::Left, table, |j| j.on(first, operator, second))
    }

    /// Add RIGHT JOIN table ON first op second.
    pub fn right_join(
        self,
        table: impl IntoIdent,
        first: impl IntoIdent,
        operator: &str,
        second: impl IntoIdent,
    ) -> Self {
        self.join_with(JoinType::Right, table, |j| j.on(first, operator, second))
    }

    /// Add CROSS JOIN table.
    pub fn cross_join(self, table: impl IntoIdent) -> Self {
        self.join_with(JoinType::Cross, table, |j| j)
    }

    /// Add INNER JOIN table ON column op value, with `value` bound.
    pub fn join_where(
        self,
        table: impl IntoIdent,
        column: impl IntoIdent,
        operator: &str,
        value: impl IntoParam,
    ) -> Self {
        self.join_with(JoinType::Inner, table, |j| j.where_(column, operator, value))
    }

    /// Add LEFT JOIN table ON column op value, with `value` bound.
    pub fn left_join_where(
        self,
        table: impl IntoIdent,
        column: impl IntoIdent,
        operator: &str,
        value: impl IntoParam,
    ) -> Self {
        self.join_with(JoinType::Left, table, |j| j.where_(column, operator, value))
    }

    // ==================== GROUP BY / HAVING ====================

    /// Add GROUP BY columns.
    pub fn group_by<C: IntoIdent>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.groups
            .extend(columns.into_iter().map(IntoIdent::into_ident));
        self
    }

    fn push_having(mut self, boolean: Boolean, kind: HavingKind) -> Self {
        self.havings.push(Having { boolean, kind });
        self
    }

    fn basic_having(
        mut self,
        boolean: Boolean,
        column: impl IntoIdent,
        operator: &str,
        value: impl IntoParam,
    ) -> Self {
        let value = value.into_param();
        self.bindings.push_param(BindingBucket::Having, &value);
        let kind = HavingKind::Basic {
            column: column.into_ident(),
            operator: operator.to_string(),
            value,
        };
        self.push_having(boolean, kind)
    }

    /// Add HAVING: column op value
    pub fn having(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.basic_having(Boolean::And, column, operator, value)
    }

    /// Add OR HAVING: column op value
    pub fn or_having(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.basic_having(Boolean::Or, column, operator, value)
    }

    /// Add HAVING: column BETWEEN low AND high
    pub fn having_between(mut self, column: impl IntoIdent, low: impl IntoParam, high: impl IntoParam) -> Self {
        let (low, high) = (low.into_param(), high.into_param());
        self.bindings.push_param(BindingBucket::Having, &low);
        self.bindings.push_param(BindingBucket::Having, &high);
        let kind = HavingKind::Between {
            column: column.into_ident(),
            low,
            high,
            negated: false,
        };
        self.push_having(Boolean::And, kind)
    }

    fn raw_having<V: Into<Value>>(
        mut self,
        boolean: Boolean,
        sql: &str,
        bindings: impl IntoIterator<Item = V>,
    ) -> Self {
        self.bindings
            .extend(BindingBucket::Having, bindings.into_iter().map(Into::into));
        self.push_having(boolean, HavingKind::Raw { sql: sql.to_string() })
    }

    /// Add a raw HAVING condition.
    pub fn having_raw<V: Into<Value>>(self, sql: &str, bindings: impl IntoIterator<Item = V>) -> Self {
        self.raw_having(Boolean::And, sql, bindings)
    }

    /// Add a raw OR HAVING condition.
    pub fn or_having_raw<V: Into<Value>>(self, sql: &str, bindings: impl IntoIterator<Item = V>) -> Self {
        self.raw_having(Boolean::Or, sql, bindings)
    }

    // ==================== ORDER BY ====================

    fn push_order(mut self, order: Order) -> Self {
        if self.unions.is_empty() {
            self.orders.push(order);
        } else {
            self.union_orders.push(order);
        }
        self
    }

    /// Add ORDER BY column direction.
    ///
    /// The direction is normalized: case-insensitive `"asc"` sorts ascending,
    /// any other string sorts descending.
    pub fn order_by(self, column: impl IntoIdent, direction: impl Into<Direction>) -> Self {
        self.push_order(Order::Column {
            column: column.into_ident(),
            direction: direction.into(),
        })
    }

    /// Add ORDER BY column DESC.
    pub fn order_by_desc(self, column: impl IntoIdent) -> Self {
        self.order_by(column, Direction::Desc)
    }

    /// Newest first by `created_at`.
    pub fn latest(self) -> Self {
        self.order_by(DEFAULT_TIMESTAMP_COLUMN, Direction::Desc)
    }

    /// Newest first by `column`.
    pub fn latest_by(self, column: impl IntoIdent) -> Self {
        self.order_by(column, Direction::Desc)
    }

    /// Oldest first by `created_at`.
    pub fn oldest(self) -> Self {
        self.order_by(DEFAULT_TIMESTAMP_COLUMN, Direction::Asc)
    }

    /// Oldest first by `column`.
    pub fn oldest_by(self, column: impl IntoIdent) -> Self {
        self.order_by(column, Direction::Asc)
    }

    /// Add a raw ORDER BY entry. `?` placeholders consume `bindings`.
    pub fn order_by_raw<V: Into<Value>>(mut self, sql: &str, bindings: impl IntoIterator<Item = V>) -> Self {
        let bucket = if self.unions.is_empty() {
            BindingBucket::Order
        } else {
            BindingBucket::UnionOrder
        };
        self.bindings
            .extend(bucket, bindings.into_iter().map(Into::into));
        self.push_order(Order::Raw { sql: sql.to_string() })
    }

    /// Drop every ORDER BY entry and its bindings.
    pub fn reorder(mut self) -> Self {
        self.orders.clear();
        self.union_orders.clear();
        self.bindings.clear(BindingBucket::Order);
        self.bindings.clear(BindingBucket::UnionOrder);
        self
    }

    // ==================== Pagination ====================

    /// Set LIMIT. Negative values are ignored and leave any previous limit in place.
    pub fn limit(mut self, value: i64) -> Self {
        if let Ok(value) = u64::try_from(value) {
            if self.unions.is_empty() {
                self.limit = Some(value);
            } else {
                self.union_limit = Some(value);
            }
        }
        self
    }

    /// Set OFFSET. Negative values are clamped to 0.
    pub fn offset(mut self, value: i64) -> Self {
        let value = u64::try_from(value.max(0)).unwrap_or(0);
        if self.unions.is_empty() {
            self.offset = Some(value);
        } else {
            self.union_offset = Some(value);
        }
        self
    }

    /// Alias for [`limit`](Self::limit).
    pub fn take(self, value: i64) -> Self {
        self.limit(value)
    }

    /// Alias for [`offset`](Self::offset).
    pub fn skip(self, value: i64) -> Self {
        self.offset(value)
    }

    /// Set limit and offset for a 1-based page.
    ///
    /// `page` is clamped to >= 1.
    pub fn for_page(self, page: i64, per_page: i64) -> Self {
        let page = page.max(1);
        self.skip((page - 1).saturating_mul(per_page)).take(per_page)
    }

    // ==================== UNION / LOCK ====================

    /// Append `union <query>`.
    pub fn union(self, query: QueryBuilder) -> Self {
        self.push_union(query, false)
    }

    /// Append `union all <query>`.
    pub fn union_all(self, query: QueryBuilder) -> Self {
        self.push_union(query, true)
    }

    fn push_union(mut self, query: QueryBuilder, all: bool) -> Self {
        self.bindings.extend(BindingBucket::Union, query.get_bindings());
        self.unions.push(Union {
            query: Box::new(query),
            all,
        });
        self
    }

    /// Lock the selected rows for update.
    pub fn lock_for_update(mut self) -> Self {
        self.lock = Some(Lock::Update);
        self
    }

    /// Share-lock the selected rows.
    pub fn shared_lock(mut self) -> Self {
        self.lock = Some(Lock::Shared);
        self
    }

    /// Use a raw lock clause.
    pub fn lock(mut self, clause: impl Into<String>) -> Self {
        self.lock = Some(Lock::Raw(clause.into()));
        self
    }

    // ==================== Conditional building ====================

    /// Apply `build` only when `condition` holds.
    pub fn when(self, condition: bool, build: impl FnOnce(Self) -> Self) -> Self {
        if condition { build(self) } else { self }
    }

    // ==================== Rendering ====================

    /// Render the query to SQL. Never mutates the builder.
    pub fn to_sql(&self) -> CompileResult<String> {
        Grammar::new(&self.config).compile_select(self)
    }

    /// Flatten the bindings in clause order.
    pub fn get_bindings(&self) -> Vec<Value> {
        self.bindings.flatten()
    }

    /// Render SQL and bindings together, checking that they line up.
    pub fn compile(&self) -> CompileResult<CompiledQuery> {
        CompiledQuery::checked(self.to_sql()?, self.get_bindings(), self.config.identifier_quote)
    }

    // ==================== Execution ====================

    fn run_select(&self, conn: &impl Connection) -> QueryResult<Vec<Row>> {
        let compiled = self.compile()?;
        compiled.select(conn)
    }

    /// Execute the query and return all rows.
    pub fn get(&self, conn: &impl Connection) -> QueryResult<Vec<Row>> {
        self.run_select(conn)
    }

    /// Execute the query selecting `columns` unless a selection is already set.
    /// The builder itself is left untouched.
    pub fn get_columns<C: IntoIdent>(
        &self,
        conn: &impl Connection,
        columns: impl IntoIterator<Item = C>,
    ) -> QueryResult<Vec<Row>> {
        if self.columns.is_some() {
            return self.run_select(conn);
        }
        self.clone().select(columns).run_select(conn)
    }

    /// Execute with LIMIT 1 and return the first row, if any.
    pub fn first(&self, conn: &impl Connection) -> QueryResult<Option<Row>> {
        let rows = self.clone().take(1).get(conn)?;
        Ok(rows.into_iter().next())
    }

    /// Like [`first`](Self::first), selecting `columns` unless a selection is set.
    pub fn first_columns<C: IntoIdent>(
        &self,
        conn: &impl Connection,
        columns: impl IntoIterator<Item = C>,
    ) -> QueryResult<Option<Row>> {
        let rows = self.clone().take(1).get_columns(conn, columns)?;
        Ok(rows.into_iter().next())
    }

    /// Find a row by its `id` column.
    pub fn find(&self, conn: &impl Connection, id: impl IntoParam) -> QueryResult<Option<Row>> {
        self.clone().where_("id", "=", id).first(conn)
    }

    /// Find a row by its `id` column, selecting `columns`.
    pub fn find_columns<C: IntoIdent>(
        &self,
        conn: &impl Connection,
        id: impl IntoParam,
        columns: impl IntoIterator<Item = C>,
    ) -> QueryResult<Option<Row>> {
        self.clone().where_("id", "=", id).first_columns(conn, columns)
    }

    /// Get a single column's value from the first row. `None` when there are no rows.
    ///
    /// The value is looked up by the column's result name (alias or last
    /// dotted segment), so an existing selection is honoured. A raw column
    /// expression reads the first value of the row.
    pub fn value(&self, conn: &impl Connection, column: impl IntoIdent) -> QueryResult<Option<Value>> {
        let column = column.into_ident();
        let name = column.output_name().map(str::to_string);
        let Some(row) = self.first_columns(conn, [column])? else {
            return Ok(None);
        };
        match name {
            Some(name) => row
                .get(&name)
                .cloned()
                .map(Some)
                .ok_or_else(|| QueryError::decode(name, "column not in result")),
            None => Ok(row.into_values().into_iter().next()),
        }
    }

    /// Execute and map every row to `T`.
    pub fn fetch_all<T: FromRow>(&self, conn: &impl Connection) -> QueryResult<Vec<T>> {
        let rows = self.get(conn)?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute and map the first row to `T`, if any.
    pub fn fetch_opt<T: FromRow>(&self, conn: &impl Connection) -> QueryResult<Option<T>> {
        let row = self.first(conn)?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute and map the first row to `T`; no rows is [`QueryError::NotFound`].
    pub fn fetch_one<T: FromRow>(&self, conn: &impl Connection) -> QueryResult<T> {
        match self.first(conn)? {
            Some(row) => T::from_row(&row),
            None => Err(QueryError::not_found("Expected 1 row, got 0")),
        }
    }

    // ==================== Aggregates ====================

    /// Run an aggregate function and return its result (`None` for no rows or NULL).
    ///
    /// The selection, select bindings and (without GROUP BY) the ordering are
    /// dropped from a copy of the query; the builder itself is not modified.
    /// A union query keeps its selection, since every part must select the
    /// same columns, and is aggregated as a whole.
    pub fn aggregate<C: IntoIdent>(
        &self,
        conn: &impl Connection,
        function: AggregateFunction,
        columns: impl IntoIterator<Item = C>,
    ) -> QueryResult<Option<Value>> {
        let mut query = self.clone();
        if query.unions.is_empty() {
            query.columns = None;
            query.bindings.clear(BindingBucket::Select);
        }
        if query.groups.is_empty() {
            query.orders.clear();
            query.bindings.clear(BindingBucket::Order);
        }
        query.aggregate = Some(Aggregate {
            function,
            columns: columns.into_iter().map(IntoIdent::into_ident).collect(),
        });

        let rows = query.get(conn)?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.get("aggregate").cloned())
            .filter(|v| !v.is_null()))
    }

    /// `count(*)`.
    pub fn count(&self, conn: &impl Connection) -> QueryResult<i64> {
        let value = self.aggregate(conn, AggregateFunction::Count, ["*"])?;
        match value {
            None => Ok(0),
            Some(v) => v
                .as_i64()
                .ok_or_else(|| QueryError::decode("aggregate", format!("expected integer, got {}", v.type_name()))),
        }
    }

    /// `max(column)`.
    pub fn max(&self, conn: &impl Connection, column: impl IntoIdent) -> QueryResult<Option<Value>> {
        self.aggregate(conn, AggregateFunction::Max, [column])
    }

    /// `min(column)`.
    pub fn min(&self, conn: &impl Connection, column: impl IntoIdent) -> QueryResult<Option<Value>> {
        self.aggregate(conn, AggregateFunction::Min, [column])
    }

    /// `sum(column)`.
    pub fn sum(&self, conn: &impl Connection, column: impl IntoIdent) -> QueryResult<Option<Value>> {
        self.aggregate(conn, AggregateFunction::Sum, [column])
    }

    /// `avg(column)`.
    pub fn avg(&self, conn: &impl Connection, column: impl IntoIdent) -> QueryResult<Option<Value>> {
        self.aggregate(conn, AggregateFunction::Avg, [column])
    }

    /// Render `select exists(<query>) as `exists``.
    pub fn to_exists_sql(&self) -> CompileResult<String> {
        Grammar::new(&self.config).compile_exists(self)
    }

    /// Check whether the query matches any row.
    pub fn exists(&self, conn: &impl Connection) -> QueryResult<bool> {
        let compiled = CompiledQuery::checked(
            self.to_exists_sql()?,
            self.get_bindings(),
            self.config.identifier_quote,
        )?;
        let rows = compiled.select(conn)?;
        let found = rows
            .first()
            .and_then(|row| row.get("exists"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(found != 0)
    }

    /// Negation of [`exists`](Self::exists).
    pub fn doesnt_exist(&self, conn: &impl Connection) -> QueryResult<bool> {
        self.exists(conn).map(|found| !found)
    }
}

/// SQL text plus its positional bindings, verified to line up.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub bindings: Vec<Value>,
}

impl CompiledQuery {
    /// Pair `sql` with `bindings`, failing with [`CompileError::BindingMismatch`]
    /// when the number of `?` placeholders differs from the number of values.
    pub fn checked(sql: String, bindings: Vec<Value>, identifier_quote: char) -> CompileResult<Self> {
        let placeholders = count_placeholders(&sql, identifier_quote);
        if placeholders != bindings.len() {
            tracing::error!(
                target: "curia_db.query",
                placeholders,
                bindings = bindings.len(),
                sql = %sql,
                "placeholder/binding mismatch"
            );
            return Err(CompileError::BindingMismatch {
                placeholders,
                bindings: bindings.len(),
            });
        }
        Ok(Self { sql, bindings })
    }

    /// Run as a select against `conn`.
    pub fn select(&self, conn: &impl Connection) -> QueryResult<Vec<Row>> {
        tracing::trace!(
            target: "curia_db.query",
            sql = %self.sql,
            param_count = self.bindings.len(),
            "running select"
        );
        conn.select(&self.sql, &self.bindings)
    }
}
