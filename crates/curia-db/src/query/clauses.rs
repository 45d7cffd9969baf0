//! Clause records other than WHERE predicates.

use crate::ident::Ident;
use crate::query::QueryBuilder;
use crate::value::Param;

/// Connector between a predicate and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boolean {
    And,
    Or,
}

impl Boolean {
    pub fn as_str(self) -> &'static str {
        match self {
            Boolean::And => "and",
            Boolean::Or => "or",
        }
    }
}

/// Sort direction. Only `asc` and `desc` exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Normalize a direction string: case-insensitive `"asc"` is ascending,
    /// anything else is descending.
    pub fn parse(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("asc") {
            Direction::Asc
        } else {
            Direction::Desc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl From<&str> for Direction {
    fn from(direction: &str) -> Self {
        Direction::parse(direction)
    }
}

impl From<String> for Direction {
    fn from(direction: String) -> Self {
        Direction::parse(&direction)
    }
}

/// One `order by` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Column { column: Ident, direction: Direction },
    Raw { sql: String },
}

/// One `having` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Having {
    pub boolean: Boolean,
    pub kind: HavingKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HavingKind {
    Basic {
        column: Ident,
        operator: String,
        value: Param,
    },
    Between {
        column: Ident,
        low: Param,
        high: Param,
        negated: bool,
    },
    Raw {
        sql: String,
    },
}

/// Aggregate functions understood by the aggregate compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Max,
    Min,
    Sum,
    Avg,
}

impl AggregateFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Max => "max",
            AggregateFunction::Min => "min",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
        }
    }
}

/// An aggregate select; supersedes the column list when present.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub function: AggregateFunction,
    pub columns: Vec<Ident>,
}

/// A query appended with `union` / `union all`.
#[derive(Debug, Clone)]
pub struct Union {
    pub query: Box<QueryBuilder>,
    pub all: bool,
}

/// Row locking mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lock {
    /// `for update`
    Update,
    /// `lock in share mode`
    Shared,
    /// Lock clause rendered verbatim.
    Raw(String),
}
