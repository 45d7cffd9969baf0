//! SQL text synthesis.
//!
//! [`Grammar`] renders a [`QueryBuilder`] snapshot to SQL. It holds nothing
//! but a borrowed [`GrammarConfig`], so the same configuration can be used
//! by any number of threads compiling unrelated queries.
//!
//! A select is compiled by walking [`SELECT_COMPONENTS`] in order and joining
//! the non-empty fragments with single spaces. Placeholders are emitted in
//! the same clause order in which [`Bindings::flatten`] yields values.
//!
//! [`Bindings::flatten`]: crate::query::Bindings::flatten

use crate::config::GrammarConfig;
use crate::error::{CompileError, CompileResult};
use crate::ident::{Ident, check_name, split_alias};
use crate::query::{
    Aggregate, Having, HavingKind, JoinClause, JoinType, Lock, Order, QueryBuilder, Where,
    WhereKind,
};
use crate::value::Param;

/// One clause category of a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectComponent {
    Aggregate,
    Columns,
    From,
    Joins,
    Wheres,
    Groups,
    Havings,
    Orders,
    Limit,
    Offset,
    Unions,
    Lock,
}

impl SelectComponent {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectComponent::Aggregate => "aggregate",
            SelectComponent::Columns => "columns",
            SelectComponent::From => "from",
            SelectComponent::Joins => "joins",
            SelectComponent::Wheres => "wheres",
            SelectComponent::Groups => "groups",
            SelectComponent::Havings => "havings",
            SelectComponent::Orders => "orders",
            SelectComponent::Limit => "limit",
            SelectComponent::Offset => "offset",
            SelectComponent::Unions => "unions",
            SelectComponent::Lock => "lock",
        }
    }
}

/// The order in which SELECT clauses are emitted.
pub const SELECT_COMPONENTS: [SelectComponent; 12] = [
    SelectComponent::Aggregate,
    SelectComponent::Columns,
    SelectComponent::From,
    SelectComponent::Joins,
    SelectComponent::Wheres,
    SelectComponent::Groups,
    SelectComponent::Havings,
    SelectComponent::Orders,
    SelectComponent::Limit,
    SelectComponent::Offset,
    SelectComponent::Unions,
    SelectComponent::Lock,
];

/// Compile `query` to SQL using `config`.
pub fn compile_select(query: &QueryBuilder, config: &GrammarConfig) -> CompileResult<String> {
    Grammar::new(config).compile_select(query)
}

/// SQL compiler for the backtick-quoted, `?`-placeholder dialect.
#[derive(Debug, Clone, Copy)]
pub struct Grammar<'a> {
    config: &'a GrammarConfig,
}

impl<'a> Grammar<'a> {
    pub fn new(config: &'a GrammarConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a GrammarConfig {
        self.config
    }

    /// Compile a select query.
    ///
    /// An unset column list renders as `*`; the query itself is never modified.
    ///
    /// An aggregate over a union is computed on the whole compound select,
    /// wrapped as a derived table.
    pub fn compile_select(&self, query: &QueryBuilder) -> CompileResult<String> {
        if let Some(aggregate) = &query.aggregate {
            if !query.unions.is_empty() {
                return self.compile_union_aggregate(query, aggregate);
            }
        }
        let mut segments = Vec::with_capacity(SELECT_COMPONENTS.len());
        for component in SELECT_COMPONENTS {
            let sql = self.compile_component(query, component)?;
            if !sql.is_empty() {
                segments.push(sql);
            }
        }
        Ok(segments.join(" ").trim().to_string())
    }

    /// Compile `select exists(<select>) as `exists``.
    pub fn compile_exists(&self, query: &QueryBuilder) -> CompileResult<String> {
        let select = self.compile_select(query)?;
        Ok(format!(
            "select exists({select}) as {}",
            self.wrap_value("exists")
        ))
    }

    /// Compile one clause category; an empty string means the clause is absent.
    pub fn compile_component(
        &self,
        query: &QueryBuilder,
        component: SelectComponent,
    ) -> CompileResult<String> {
        match component {
            SelectComponent::Aggregate => match &query.aggregate {
                Some(aggregate) => self.compile_aggregate(query, aggregate),
                None => Ok(String::new()),
            },
            SelectComponent::Columns => self.compile_columns(query),
            SelectComponent::From => match &query.from {
                Some(table) => Ok(format!("from {}", self.wrap_table(table)?)),
                None => Ok(String::new()),
            },
            SelectComponent::Joins => self.compile_joins(&query.joins),
            SelectComponent::Wheres => self.compile_wheres(query, "where"),
            SelectComponent::Groups => {
                if query.groups.is_empty() {
                    Ok(String::new())
                } else {
                    Ok(format!("group by {}", self.columnize(&query.groups)?))
                }
            }
            SelectComponent::Havings => self.compile_havings(&query.havings),
            SelectComponent::Orders => self.compile_orders(&query.orders),
            SelectComponent::Limit => Ok(query.limit.map(compile_limit).unwrap_or_default()),
            SelectComponent::Offset => Ok(query.offset.map(compile_offset).unwrap_or_default()),
            SelectComponent::Unions => self.compile_unions(query),
            SelectComponent::Lock => Ok(query.lock.as_ref().map(compile_lock).unwrap_or_default()),
        }
    }

    // ==================== SELECT ====================

    fn compile_aggregate(&self, query: &QueryBuilder, aggregate: &Aggregate) -> CompileResult<String> {
        let mut column = self.columnize(&aggregate.columns)?;
        if query.distinct && column != "*" {
            column = format!("distinct {column}");
        }
        Ok(format!("select {}({column}) as aggregate", aggregate.function.as_str()))
    }

    fn compile_union_aggregate(
        &self,
        query: &QueryBuilder,
        aggregate: &Aggregate,
    ) -> CompileResult<String> {
        let select = self.compile_aggregate(query, aggregate)?;
        let mut inner = query.clone();
        inner.aggregate = None;
        Ok(format!(
            "{select} from ({}) as {}",
            self.compile_select(&inner)?,
            self.wrap_value("temp_table")
        ))
    }

    fn compile_columns(&self, query: &QueryBuilder) -> CompileResult<String> {
        if query.aggregate.is_some() {
            return Ok(String::new());
        }
        let select = if query.distinct { "select distinct " } else { "select " };
        let columns = match query.columns.as_deref() {
            Some(columns) if !columns.is_empty() => self.columnize(columns)?,
            _ => "*".to_string(),
        };
        Ok(format!("{select}{columns}"))
    }

    // ==================== JOIN ====================

    fn compile_joins(&self, joins: &[JoinClause]) -> CompileResult<String> {
        let mut parts = Vec::with_capacity(joins.len());
        for join in joins {
            parts.push(self.compile_join(join)?);
        }
        Ok(parts.join(" "))
    }

    fn compile_join(&self, join: &JoinClause) -> CompileResult<String> {
        let table = self.wrap_table(&join.table)?;
        let nested = &join.query().joins;
        let table = if nested.is_empty() {
            table
        } else {
            format!("({table} {})", self.compile_joins(nested)?)
        };
        let on = self.compile_wheres(join.query(), "on")?;
        if join.kind == JoinType::Cross && on.is_empty() {
            return Ok(format!("cross join {table}"));
        }
        Ok(format!("{} join {table} {on}", join.kind.as_str())
            .trim()
            .to_string())
    }

    // ==================== WHERE ====================

    /// Compile a where-set, prefixed with `conjunction` (`where` or `on`).
    fn compile_wheres(&self, query: &QueryBuilder, conjunction: &str) -> CompileResult<String> {
        let body = self.compile_where_body(&query.wheres)?;
        if body.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{conjunction} {body}"))
    }

    /// Predicates joined by their connectors, leading connector removed.
    fn compile_where_body(&self, wheres: &[Where]) -> CompileResult<String> {
        if wheres.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(wheres.len());
        for w in wheres {
            parts.push(format!("{} {}", w.boolean.as_str(), self.compile_where(w)?));
        }
        Ok(remove_leading_boolean(&parts.join(" ")).to_string())
    }

    /// Compile a single predicate without its connector.
    pub fn compile_where(&self, w: &Where) -> CompileResult<String> {
        match &w.kind {
            WhereKind::Basic {
                column,
                operator,
                value,
            } => Ok(format!(
                "{} {} {}",
                self.wrap(column)?,
                self.operator(operator)?,
                self.parameter(value)
            )),
            WhereKind::Null { column } => Ok(format!("{} is null", self.wrap(column)?)),
            WhereKind::NotNull { column } => Ok(format!("{} is not null", self.wrap(column)?)),
            WhereKind::Between {
                column,
                low,
                high,
                negated,
            } => Ok(format!(
                "{} {}between {} and {}",
                self.wrap(column)?,
                if *negated { "not " } else { "" },
                self.parameter(low),
                self.parameter(high)
            )),
            WhereKind::In { column, values } => {
                if values.is_empty() {
                    return Ok("0 = 1".to_string());
                }
                Ok(format!("{} in ({})", self.wrap(column)?, self.parameterize(values)))
            }
            WhereKind::NotIn { column, values } => {
                if values.is_empty() {
                    return Ok("1 = 1".to_string());
                }
                Ok(format!("{} not in ({})", self.wrap(column)?, self.parameterize(values)))
            }
            WhereKind::InSub { column, query } => Ok(format!(
                "{} in ({})",
                self.wrap(column)?,
                self.compile_select(query)?
            )),
            WhereKind::NotInSub { column, query } => Ok(format!(
                "{} not in ({})",
                self.wrap(column)?,
                self.compile_select(query)?
            )),
            WhereKind::Nested { query } => Ok(format!("({})", self.compile_where_body(&query.wheres)?)),
            WhereKind::Sub {
                column,
                operator,
                query,
            } => Ok(format!(
                "{} {} ({})",
                self.wrap(column)?,
                self.operator(operator)?,
                self.compile_select(query)?
            )),
            WhereKind::Column {
                first,
                operator,
                second,
            } => Ok(format!(
                "{} {} {}",
                self.wrap(first)?,
                self.operator(operator)?,
                self.wrap(second)?
            )),
            WhereKind::Exists { query } => Ok(format!("exists ({})", self.compile_select(query)?)),
            WhereKind::NotExists { query } => {
                Ok(format!("not exists ({})", self.compile_select(query)?))
            }
            WhereKind::Raw { sql } => Ok(sql.clone()),
            WhereKind::Date {
                part,
                column,
                operator,
                value,
            } => Ok(format!(
                "{}({}) {} {}",
                part.function(),
                self.wrap(column)?,
                self.operator(operator)?,
                self.parameter(value)
            )),
            WhereKind::RowValues {
                columns,
                operator,
                values,
            } => Ok(format!(
                "({}) {} ({})",
                self.columnize(columns)?,
                self.operator(operator)?,
                self.parameterize(values)
            )),
        }
    }

    // ==================== GROUP BY / HAVING / ORDER BY ====================

    fn compile_havings(&self, havings: &[Having]) -> CompileResult<String> {
        if havings.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(havings.len());
        for having in havings {
            parts.push(format!("{} {}", having.boolean.as_str(), self.compile_having(having)?));
        }
        Ok(format!("having {}", remove_leading_boolean(&parts.join(" "))))
    }

    fn compile_having(&self, having: &Having) -> CompileResult<String> {
        match &having.kind {
            HavingKind::Basic {
                column,
                operator,
                value,
            } => Ok(format!(
                "{} {} {}",
                self.wrap(column)?,
                self.operator(operator)?,
                self.parameter(value)
            )),
            HavingKind::Between {
                column,
                low,
                high,
                negated,
            } => Ok(format!(
                "{} {}between {} and {}",
                self.wrap(column)?,
                if *negated { "not " } else { "" },
                self.parameter(low),
                self.parameter(high)
            )),
            HavingKind::Raw { sql } => Ok(sql.clone()),
        }
    }

    fn compile_orders(&self, orders: &[Order]) -> CompileResult<String> {
        if orders.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(orders.len());
        for order in orders {
            parts.push(match order {
                Order::Column { column, direction } => {
                    format!("{} {}", self.wrap(column)?, direction.as_str())
                }
                Order::Raw { sql } => sql.clone(),
            });
        }
        Ok(format!("order by {}", parts.join(", ")))
    }

    // ==================== UNION ====================

    fn compile_unions(&self, query: &QueryBuilder) -> CompileResult<String> {
        if query.unions.is_empty() {
            return Ok(String::new());
        }
        let mut sql = String::new();
        for union in &query.unions {
            let keyword = if union.all { " union all " } else { " union " };
            sql.push_str(keyword);
            sql.push_str(&self.compile_select(&union.query)?);
        }
        let orders = self.compile_orders(&query.union_orders)?;
        if !orders.is_empty() {
            sql.push(' ');
            sql.push_str(&orders);
        }
        if let Some(limit) = query.union_limit {
            sql.push(' ');
            sql.push_str(&compile_limit(limit));
        }
        if let Some(offset) = query.union_offset {
            sql.push(' ');
            sql.push_str(&compile_offset(offset));
        }
        Ok(sql.trim_start().to_string())
    }

    // ==================== Quoting ====================

    /// Quote a column reference.
    ///
    /// `users.id` becomes `` `users`.`id` `` (table segment prefixed),
    /// `name as n` becomes `` `name` as `n` ``, and `*` is left bare.
    /// Raw expressions are returned verbatim.
    pub fn wrap(&self, ident: &Ident) -> CompileResult<String> {
        match ident {
            Ident::Raw(expr) => Ok(expr.as_str().to_string()),
            Ident::Name(name) => self.wrap_name(name),
        }
    }

    /// Quote a table reference, applying the configured table prefix to the
    /// table and to its alias.
    pub fn wrap_table(&self, ident: &Ident) -> CompileResult<String> {
        match ident {
            Ident::Raw(expr) => Ok(expr.as_str().to_string()),
            Ident::Name(name) => self.wrap_table_name(name),
        }
    }

    fn wrap_name(&self, value: &str) -> CompileResult<String> {
        check_name(value)?;
        if let Some((expr, alias)) = split_alias(value) {
            check_alias(value, alias)?;
            return Ok(format!("{} as {}", self.wrap_name(expr)?, self.wrap_value(alias)));
        }
        let segments: Vec<&str> = value.split('.').collect();
        check_segments(value, &segments)?;
        let mut out = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            if i == 0 && segments.len() > 1 {
                out.push(self.wrap_table_name(segment)?);
            } else {
                out.push(self.wrap_value(segment));
            }
        }
        Ok(out.join("."))
    }

    fn wrap_table_name(&self, value: &str) -> CompileResult<String> {
        check_name(value)?;
        let prefix = &self.config.table_prefix;
        if let Some((expr, alias)) = split_alias(value) {
            check_alias(value, alias)?;
            return Ok(format!(
                "{} as {}",
                self.wrap_table_name(expr)?,
                self.wrap_value(&format!("{prefix}{alias}"))
            ));
        }
        let segments: Vec<&str> = value.split('.').collect();
        check_segments(value, &segments)?;
        let prefixed = format!("{prefix}{value}");
        Ok(prefixed
            .split('.')
            .map(|segment| self.wrap_value(segment))
            .collect::<Vec<_>>()
            .join("."))
    }

    /// Quote a single segment, doubling any embedded quote character.
    pub fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_string();
        }
        let quote = self.config.identifier_quote;
        let escaped = value.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Quote and comma-join a column list.
    pub fn columnize(&self, columns: &[Ident]) -> CompileResult<String> {
        let mut out = Vec::with_capacity(columns.len());
        for column in columns {
            out.push(self.wrap(column)?);
        }
        Ok(out.join(", "))
    }

    /// `?` for a bound value, the literal text for a raw expression.
    pub fn parameter(&self, param: &Param) -> String {
        match param {
            Param::Value(_) => "?".to_string(),
            Param::Raw(expr) => expr.as_str().to_string(),
        }
    }

    /// Comma-joined [`parameter`](Self::parameter)s.
    pub fn parameterize(&self, params: &[Param]) -> String {
        params
            .iter()
            .map(|p| self.parameter(p))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn operator<'o>(&self, operator: &'o str) -> CompileResult<&'o str> {
        if self.config.is_valid_operator(operator) {
            Ok(operator.trim())
        } else {
            Err(CompileError::InvalidOperator(operator.to_string()))
        }
    }
}

fn check_alias(value: &str, alias: &str) -> CompileResult<()> {
    if alias.trim().is_empty() {
        return Err(CompileError::invalid_identifier(value, "alias cannot be empty"));
    }
    if split_alias(alias).is_some() {
        return Err(CompileError::invalid_identifier(value, "identifier has more than one alias"));
    }
    Ok(())
}

fn check_segments(value: &str, segments: &[&str]) -> CompileResult<()> {
    if segments.iter().any(|s| s.is_empty()) {
        return Err(CompileError::invalid_identifier(
            value,
            "identifier contains an empty segment",
        ));
    }
    Ok(())
}

fn compile_limit(limit: u64) -> String {
    format!("limit {limit}")
}

fn compile_offset(offset: u64) -> String {
    format!("offset {offset}")
}

fn compile_lock(lock: &Lock) -> String {
    match lock {
        Lock::Update => "for update".to_string(),
        Lock::Shared => "lock in share mode".to_string(),
        Lock::Raw(sql) => sql.clone(),
    }
}

/// Strip a leading `and ` / `or ` (any case) from a predicate list.
pub fn remove_leading_boolean(sql: &str) -> &str {
    for keyword in ["and ", "or "] {
        if sql
            .get(..keyword.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
        {
            return &sql[keyword.len()..];
        }
    }
    sql
}

/// Count `?` placeholders outside string literals and quoted identifiers.
///
/// Quotes are toggled on every occurrence, so doubled quotes (`'it''s'`)
/// stay balanced. Inside `'...'` and `"..."` literals a backslash escapes the
/// next character (`'it\'s'`); inside quoted identifiers it does not.
pub fn count_placeholders(sql: &str, identifier_quote: char) -> usize {
    let mut count = 0;
    let mut open: Option<char> = None;
    let mut escaped = false;
    for c in sql.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match open {
            Some(q) if c == q => open = None,
            Some(q) if c == '\\' && q != identifier_quote => escaped = true,
            Some(_) => {}
            None if c == '\'' || c == '"' || c == identifier_quote => open = Some(c),
            None if c == '?' => count += 1,
            None => {}
        }
    }
    count
}

#[cfg(test)]
mod tests;
