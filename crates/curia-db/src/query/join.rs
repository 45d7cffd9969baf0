//! JOIN clauses.
//!
//! A [`JoinClause`] wraps its own [`QueryBuilder`] so that `on` conditions
//! reuse the WHERE machinery; the grammar renders that where-set with `on`
//! instead of `where`.

use crate::ident::{Ident, IntoIdent};
use crate::query::QueryBuilder;
use crate::value::{IntoParam, Value};

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinType {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
            JoinType::Cross => "cross",
        }
    }
}

/// One joined table and its `on` conditions.
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub kind: JoinType,
    pub table: Ident,
    pub(crate) query: QueryBuilder,
}

impl JoinClause {
    /// Create a join sharing the parent's configuration.
    pub(crate) fn new(kind: JoinType, table: Ident, parent: &QueryBuilder) -> Self {
        Self {
            kind,
            table,
            query: parent.new_query(),
        }
    }

    /// The builder holding this join's conditions and nested joins.
    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    /// Values bound by this join, nested joins first.
    pub fn get_bindings(&self) -> Vec<Value> {
        self.query.get_bindings()
    }

    /// Add ON: first op second
    pub fn on(mut self, first: impl IntoIdent, operator: &str, second: impl IntoIdent) -> Self {
        self.query = self.query.where_column(first, operator, second);
        self
    }

    /// Add OR ON: first op second
    pub fn or_on(mut self, first: impl IntoIdent, operator: &str, second: impl IntoIdent) -> Self {
        self.query = self.query.or_where_column(first, operator, second);
        self
    }

    /// Add ON: column op value (bound)
    pub fn where_(mut self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.query = self.query.where_(column, operator, value);
        self
    }

    /// Add OR ON: column op value (bound)
    pub fn or_where(mut self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.query = self.query.or_where(column, operator, value);
        self
    }

    /// Add ON: column IS NULL
    pub fn where_null(mut self, column: impl IntoIdent) -> Self {
        self.query = self.query.where_null(column);
        self
    }

    /// Add ON: column IS NOT NULL
    pub fn where_not_null(mut self, column: impl IntoIdent) -> Self {
        self.query = self.query.where_not_null(column);
        self
    }

    /// Add ON: column IN (values...)
    pub fn where_in<P: IntoParam>(mut self, column: impl IntoIdent, values: impl IntoIterator<Item = P>) -> Self {
        self.query = self.query.where_in(column, values);
        self
    }

    /// Add a parenthesized group of ON conditions.
    pub fn on_nested(mut self, build: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        self.query = self.query.where_nested(build);
        self
    }

    /// Join another table inside this join: `join a inner join b on ... on ...`.
    pub fn join(
        mut self,
        table: impl IntoIdent,
        first: impl IntoIdent,
        operator: &str,
        second: impl IntoIdent,
    ) -> Self {
        self.query = self.query.join(table, first, operator, second);
        self
    }
}
