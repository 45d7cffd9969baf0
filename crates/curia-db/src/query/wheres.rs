//! WHERE predicates and the builder methods that add them.
//!
//! Every method appends exactly one [`Where`] record and, in the same call,
//! the values its placeholders will consume to the `where` bucket. The grammar
//! walks the records in the same order, so the Nth `?` always lines up with
//! the Nth binding.

use crate::ident::{Ident, IntoIdent};
use crate::query::QueryBuilder;
use crate::query::bindings::BindingBucket;
use crate::query::clauses::Boolean;
use crate::value::{IntoParam, Param, Value};

/// One predicate plus its connector to the previous predicate.
#[derive(Debug, Clone)]
pub struct Where {
    pub boolean: Boolean,
    pub kind: WhereKind,
}

/// SQL date-part function applied to a column before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Date,
    Time,
    Day,
    Month,
    Year,
}

impl DatePart {
    pub fn function(self) -> &'static str {
        match self {
            DatePart::Date => "date",
            DatePart::Time => "time",
            DatePart::Day => "day",
            DatePart::Month => "month",
            DatePart::Year => "year",
        }
    }
}

/// Predicate variants. Each has a dedicated compiler in the grammar.
#[derive(Debug, Clone)]
pub enum WhereKind {
    /// `column op ?`
    Basic {
        column: Ident,
        operator: String,
        value: Param,
    },
    /// `column is null`
    Null { column: Ident },
    /// `column is not null`
    NotNull { column: Ident },
    /// `column [not] between ? and ?`
    Between {
        column: Ident,
        low: Param,
        high: Param,
        negated: bool,
    },
    /// `column in (?, ...)`; `0 = 1` when empty
    In { column: Ident, values: Vec<Param> },
    /// `column not in (?, ...)`; `1 = 1` when empty
    NotIn { column: Ident, values: Vec<Param> },
    /// `column in (select ...)`
    InSub {
        column: Ident,
        query: Box<QueryBuilder>,
    },
    /// `column not in (select ...)`
    NotInSub {
        column: Ident,
        query: Box<QueryBuilder>,
    },
    /// Parenthesized group of the child query's predicates.
    Nested { query: Box<QueryBuilder> },
    /// `column op (select ...)`
    Sub {
        column: Ident,
        operator: String,
        query: Box<QueryBuilder>,
    },
    /// `first op second`, both identifiers
    Column {
        first: Ident,
        operator: String,
        second: Ident,
    },
    /// `exists (select ...)`
    Exists { query: Box<QueryBuilder> },
    /// `not exists (select ...)`
    NotExists { query: Box<QueryBuilder> },
    /// Verbatim SQL
    Raw { sql: String },
    /// `part(column) op ?`
    Date {
        part: DatePart,
        column: Ident,
        operator: String,
        value: Param,
    },
    /// `(a, b) op (?, ?)`
    RowValues {
        columns: Vec<Ident>,
        operator: String,
        values: Vec<Param>,
    },
}

impl QueryBuilder {
    fn push_where(mut self, boolean: Boolean, kind: WhereKind) -> Self {
        self.wheres.push(Where { boolean, kind });
        self
    }

    fn push_where_params<'a>(
        mut self,
        boolean: Boolean,
        kind: WhereKind,
        params: impl IntoIterator<Item = &'a Param>,
    ) -> Self {
        for param in params {
            self.bindings.push_param(BindingBucket::Where, param);
        }
        self.push_where(boolean, kind)
    }

    fn push_where_query(mut self, boolean: Boolean, kind: WhereKind, query: &QueryBuilder) -> Self {
        self.bindings
            .extend(BindingBucket::Where, query.get_bindings());
        self.push_where(boolean, kind)
    }

    // ==================== Basic ====================

    fn basic_where(
        self,
        boolean: Boolean,
        column: impl IntoIdent,
        operator: &str,
        value: impl IntoParam,
    ) -> Self {
        let value = value.into_param();
        // `= null` / `!= null` can never match; rewrite to the null checks.
        if matches!(value, Param::Value(Value::Null)) {
            match operator.trim() {
                "=" => return self.push_where(boolean, WhereKind::Null { column: column.into_ident() }),
                "!=" | "<>" => {
                    return self.push_where(boolean, WhereKind::NotNull { column: column.into_ident() });
                }
                _ => {}
            }
        }
        let kind = WhereKind::Basic {
            column: column.into_ident(),
            operator: operator.to_string(),
            value: value.clone(),
        };
        self.push_where_params(boolean, kind, [&value])
    }

    /// Add WHERE: column op value
    pub fn where_(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.basic_where(Boolean::And, column, operator, value)
    }

    /// Add OR WHERE: column op value
    pub fn or_where(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.basic_where(Boolean::Or, column, operator, value)
    }

    /// Add WHERE: column = value
    pub fn where_eq(self, column: impl IntoIdent, value: impl IntoParam) -> Self {
        self.basic_where(Boolean::And, column, "=", value)
    }

    /// Add OR WHERE: column = value
    pub fn or_where_eq(self, column: impl IntoIdent, value: impl IntoParam) -> Self {
        self.basic_where(Boolean::Or, column, "=", value)
    }

    // ==================== Column comparison ====================

    /// Add WHERE: first op second (both identifiers)
    pub fn where_column(self, first: impl IntoIdent, operator: &str, second: impl IntoIdent) -> Self {
        let kind = WhereKind::Column {
            first: first.into_ident(),
            operator: operator.to_string(),
            second: second.into_ident(),
        };
        self.push_where(Boolean::And, kind)
    }

    /// Add OR WHERE: first op second (both identifiers)
    pub fn or_where_column(self, first: impl IntoIdent, operator: &str, second: impl IntoIdent) -> Self {
        let kind = WhereKind::Column {
            first: first.into_ident(),
            operator: operator.to_string(),
            second: second.into_ident(),
        };
        self.push_where(Boolean::Or, kind)
    }

    // ==================== NULL checks ====================

    /// Add WHERE: column IS NULL
    pub fn where_null(self, column: impl IntoIdent) -> Self {
        self.push_where(Boolean::And, WhereKind::Null { column: column.into_ident() })
    }

    /// Add OR WHERE: column IS NULL
    pub fn or_where_null(self, column: impl IntoIdent) -> Self {
        self.push_where(Boolean::Or, WhereKind::Null { column: column.into_ident() })
    }

    /// Add WHERE: column IS NOT NULL
    pub fn where_not_null(self, column: impl IntoIdent) -> Self {
        self.push_where(Boolean::And, WhereKind::NotNull { column: column.into_ident() })
    }

    /// Add OR WHERE: column IS NOT NULL
    pub fn or_where_not_null(self, column: impl IntoIdent) -> Self {
        self.push_where(Boolean::Or, WhereKind::NotNull { column: column.into_ident() })
    }

    // ==================== BETWEEN ====================

    fn between_where(
        self,
        boolean: Boolean,
        column: impl IntoIdent,
        low: impl IntoParam,
        high: impl IntoParam,
        negated: bool,
    ) -> Self {
        let (low, high) = (low.into_param(), high.into_param());
        let kind = WhereKind::Between {
            column: column.into_ident(),
            low: low.clone(),
            high: high.clone(),
            negated,
        };
        self.push_where_params(boolean, kind, [&low, &high])
    }

    /// Add WHERE: column BETWEEN low AND high
    pub fn where_between(self, column: impl IntoIdent, low: impl IntoParam, high: impl IntoParam) -> Self {
        self.between_where(Boolean::And, column, low, high, false)
    }

    /// Add OR WHERE: column BETWEEN low AND high
    pub fn or_where_between(self, column: impl IntoIdent, low: impl IntoParam, high: impl IntoParam) -> Self {
        self.between_where(Boolean::Or, column, low, high, false)
    }

    /// Add WHERE: column NOT BETWEEN low AND high
    pub fn where_not_between(self, column: impl IntoIdent, low: impl IntoParam, high: impl IntoParam) -> Self {
        self.between_where(Boolean::And, column, low, high, true)
    }

    /// Add OR WHERE: column NOT BETWEEN low AND high
    pub fn or_where_not_between(
        self,
        column: impl IntoIdent,
        low: impl IntoParam,
        high: impl IntoParam,
    ) -> Self {
        self.between_where(Boolean::Or, column, low, high, true)
    }

    // ==================== IN lists ====================

    fn in_where<P: IntoParam>(
        self,
        boolean: Boolean,
        column: impl IntoIdent,
        values: impl IntoIterator<Item = P>,
        negated: bool,
    ) -> Self {
        let values: Vec<Param> = values.into_iter().map(IntoParam::into_param).collect();
        let params = values.clone();
        let column = column.into_ident();
        let kind = if negated {
            WhereKind::NotIn { column, values }
        } else {
            WhereKind::In { column, values }
        };
        self.push_where_params(boolean, kind, params.iter())
    }

    /// Add WHERE: column IN (values...)
    ///
    /// An empty list compiles to `0 = 1`.
    pub fn where_in<P: IntoParam>(self, column: impl IntoIdent, values: impl IntoIterator<Item = P>) -> Self {
        self.in_where(Boolean::And, column, values, false)
    }

    /// Add OR WHERE: column IN (values...)
    pub fn or_where_in<P: IntoParam>(self, column: impl IntoIdent, values: impl IntoIterator<Item = P>) -> Self {
        self.in_where(Boolean::Or, column, values, false)
    }

    /// Add WHERE: column NOT IN (values...)
    ///
    /// An empty list compiles to `1 = 1`.
    pub fn where_not_in<P: IntoParam>(self, column: impl IntoIdent, values: impl IntoIterator<Item = P>) -> Self {
        self.in_where(Boolean::And, column, values, true)
    }

    /// Add OR WHERE: column NOT IN (values...)
    pub fn or_where_not_in<P: IntoParam>(
        self,
        column: impl IntoIdent,
        values: impl IntoIterator<Item = P>,
    ) -> Self {
        self.in_where(Boolean::Or, column, values, true)
    }

    // ==================== Sub-selects ====================

    fn in_sub_where(self, boolean: Boolean, column: impl IntoIdent, query: QueryBuilder, negated: bool) -> Self {
        let column = column.into_ident();
        let sub = query.clone();
        let kind = if negated {
            WhereKind::NotInSub { column, query: Box::new(query) }
        } else {
            WhereKind::InSub { column, query: Box::new(query) }
        };
        self.push_where_query(boolean, kind, &sub)
    }

    /// Add WHERE: column IN (select ...)
    pub fn where_in_sub(self, column: impl IntoIdent, query: QueryBuilder) -> Self {
        self.in_sub_where(Boolean::And, column, query, false)
    }

    /// Add OR WHERE: column IN (select ...)
    pub fn or_where_in_sub(self, column: impl IntoIdent, query: QueryBuilder) -> Self {
        self.in_sub_where(Boolean::Or, column, query, false)
    }

    /// Add WHERE: column NOT IN (select ...)
    pub fn where_not_in_sub(self, column: impl IntoIdent, query: QueryBuilder) -> Self {
        self.in_sub_where(Boolean::And, column, query, true)
    }

    /// Add OR WHERE: column NOT IN (select ...)
    pub fn or_where_not_in_sub(self, column: impl IntoIdent, query: QueryBuilder) -> Self {
        self.in_sub_where(Boolean::Or, column, query, true)
    }

    fn sub_where(self, boolean: Boolean, column: impl IntoIdent, operator: &str, query: QueryBuilder) -> Self {
        let sub = query.clone();
        let kind = WhereKind::Sub {
            column: column.into_ident(),
            operator: operator.to_string(),
            query: Box::new(query),
        };
        self.push_where_query(boolean, kind, &sub)
    }

    /// Add WHERE: column op (select ...)
    pub fn where_sub(self, column: impl IntoIdent, operator: &str, query: QueryBuilder) -> Self {
        self.sub_where(Boolean::And, column, operator, query)
    }

    /// Add OR WHERE: column op (select ...)
    pub fn or_where_sub(self, column: impl IntoIdent, operator: &str, query: QueryBuilder) -> Self {
        self.sub_where(Boolean::Or, column, operator, query)
    }

    fn exists_where(self, boolean: Boolean, query: QueryBuilder, negated: bool) -> Self {
        let sub = query.clone();
        let kind = if negated {
            WhereKind::NotExists { query: Box::new(query) }
        } else {
            WhereKind::Exists { query: Box::new(query) }
        };
        self.push_where_query(boolean, kind, &sub)
    }

    /// Add WHERE EXISTS (select ...)
    pub fn where_exists(self, query: QueryBuilder) -> Self {
        self.exists_where(Boolean::And, query, false)
    }

    /// Add OR WHERE EXISTS (select ...)
    pub fn or_where_exists(self, query: QueryBuilder) -> Self {
        self.exists_where(Boolean::Or, query, false)
    }

    /// Add WHERE NOT EXISTS (select ...)
    pub fn where_not_exists(self, query: QueryBuilder) -> Self {
        self.exists_where(Boolean::And, query, true)
    }

    /// Add OR WHERE NOT EXISTS (select ...)
    pub fn or_where_not_exists(self, query: QueryBuilder) -> Self {
        self.exists_where(Boolean::Or, query, true)
    }

    // ==================== Nested groups ====================

    fn nested_where(self, boolean: Boolean, build: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        let nested = build(self.new_query());
        if nested.wheres.is_empty() {
            return self;
        }
        let sub = nested.clone();
        self.push_where_query(boolean, WhereKind::Nested { query: Box::new(nested) }, &sub)
    }

    /// Add a parenthesized group of predicates.
    ///
    /// # Example
    /// ```ignore
    /// // where (`a` = ? or `b` = ?) and `c` = ?
    /// let qb = curia_db::table("t")
    ///     .where_nested(|q| q.where_("a", "=", 1).or_where("b", "=", 2))
    ///     .where_("c", "=", 3);
    /// ```
    pub fn where_nested(self, build: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        self.nested_where(Boolean::And, build)
    }

    /// Add a parenthesized group of predicates joined with OR.
    pub fn or_where_nested(self, build: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        self.nested_where(Boolean::Or, build)
    }

    // ==================== Raw ====================

    fn raw_where<V: Into<Value>>(
        mut self,
        boolean: Boolean,
        sql: &str,
        bindings: impl IntoIterator<Item = V>,
    ) -> Self {
        self.bindings
            .extend(BindingBucket::Where, bindings.into_iter().map(Into::into));
        self.push_where(boolean, WhereKind::Raw { sql: sql.to_string() })
    }

    /// Add a raw WHERE condition. `?` placeholders consume `bindings` in order.
    pub fn where_raw<V: Into<Value>>(self, sql: &str, bindings: impl IntoIterator<Item = V>) -> Self {
        self.raw_where(Boolean::And, sql, bindings)
    }

    /// Add a raw OR WHERE condition.
    pub fn or_where_raw<V: Into<Value>>(self, sql: &str, bindings: impl IntoIterator<Item = V>) -> Self {
        self.raw_where(Boolean::Or, sql, bindings)
    }

    // ==================== Date parts ====================

    fn date_where(
        self,
        boolean: Boolean,
        part: DatePart,
        column: impl IntoIdent,
        operator: &str,
        value: impl IntoParam,
    ) -> Self {
        let value = value.into_param();
        let kind = WhereKind::Date {
            part,
            column: column.into_ident(),
            operator: operator.to_string(),
            value: value.clone(),
        };
        self.push_where_params(boolean, kind, [&value])
    }

    /// Add WHERE: date(column) op value
    pub fn where_date(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::And, DatePart::Date, column, operator, value)
    }

    /// Add OR WHERE: date(column) op value
    pub fn or_where_date(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::Or, DatePart::Date, column, operator, value)
    }

    /// Add WHERE: time(column) op value
    pub fn where_time(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::And, DatePart::Time, column, operator, value)
    }

    /// Add OR WHERE: time(column) op value
    pub fn or_where_time(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::Or, DatePart::Time, column, operator, value)
    }

    /// Add WHERE: day(column) op value
    pub fn where_day(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::And, DatePart::Day, column, operator, value)
    }

    /// Add OR WHERE: day(column) op value
    pub fn or_where_day(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::Or, DatePart::Day, column, operator, value)
    }

    /// Add WHERE: month(column) op value
    pub fn where_month(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::And, DatePart::Month, column, operator, value)
    }

    /// Add OR WHERE: month(column) op value
    pub fn or_where_month(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::Or, DatePart::Month, column, operator, value)
    }

    /// Add WHERE: year(column) op value
    pub fn where_year(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::And, DatePart::Year, column, operator, value)
    }

    /// Add OR WHERE: year(column) op value
    pub fn or_where_year(self, column: impl IntoIdent, operator: &str, value: impl IntoParam) -> Self {
        self.date_where(Boolean::Or, DatePart::Year, column, operator, value)
    }

    // ==================== Row values ====================

    fn row_values_where<C: IntoIdent, P: IntoParam>(
        self,
        boolean: Boolean,
        columns: impl IntoIterator<Item = C>,
        operator: &str,
        values: impl IntoIterator<Item = P>,
    ) -> Self {
        let values: Vec<Param> = values.into_iter().map(IntoParam::into_param).collect();
        let params = values.clone();
        let kind = WhereKind::RowValues {
            columns: columns.into_iter().map(IntoIdent::into_ident).collect(),
            operator: operator.to_string(),
            values,
        };
        self.push_where_params(boolean, kind, params.iter())
    }

    /// Add WHERE: (col1, col2, ...) op (?, ?, ...)
    pub fn where_row_values<C: IntoIdent, P: IntoParam>(
        self,
        columns: impl IntoIterator<Item = C>,
        operator: &str,
        values: impl IntoIterator<Item = P>,
    ) -> Self {
        self.row_values_where(Boolean::And, columns, operator, values)
    }

    /// Add OR WHERE: (col1, col2, ...) op (?, ?, ...)
    pub fn or_where_row_values<C: IntoIdent, P: IntoParam>(
        self,
        columns: impl IntoIterator<Item = C>,
        operator: &str,
        values: impl IntoIterator<Item = P>,
    ) -> Self {
        self.row_values_where(Boolean::Or, columns, operator, values)
    }
}
