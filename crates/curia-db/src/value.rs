//! Bound values, raw expressions and the parameters that carry them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar bound to a positional `?` placeholder at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Check if the value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text payload, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the value. Floats are truncated, booleans map to 0/1.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Floating-point view of the value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Short type name, used in decode errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Value::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl From<chrono::NaiveTime> for Value {
    fn from(v: chrono::NaiveTime) -> Self {
        Value::Text(v.format("%H:%M:%S").to_string())
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Value::Text(v.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        Value::from(v.naive_utc())
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Text(v.to_string())
    }
}

/// A raw SQL fragment spliced into the query verbatim.
///
/// Expressions are never quoted and never bound. Passing untrusted input
/// through an expression is an SQL injection; that is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression(String);

impl Expression {
    /// Wrap raw SQL text.
    pub fn new(sql: impl Into<String>) -> Self {
        Expression(sql.into())
    }

    /// The raw SQL text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Create a raw SQL expression.
///
/// # Example
/// ```ignore
/// let qb = curia_db::table("users").where_("created_at", "<", curia_db::raw("now()"));
/// ```
pub fn raw(sql: impl Into<String>) -> Expression {
    Expression::new(sql)
}

/// A value position in a clause: either a bound value or a raw expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Rendered as `?` and appended to the bindings.
    Value(Value),
    /// Rendered verbatim, never bound.
    Raw(Expression),
}

impl Param {
    /// The value to bind, if this parameter produces a placeholder.
    pub fn binding(&self) -> Option<&Value> {
        match self {
            Param::Value(v) => Some(v),
            Param::Raw(_) => None,
        }
    }

    /// Check if this parameter is a raw expression.
    pub fn is_raw(&self) -> bool {
        matches!(self, Param::Raw(_))
    }
}

/// Convert an input into a [`Param`].
///
/// Anything convertible into a [`Value`] becomes a bound parameter; an
/// [`Expression`] stays raw.
pub trait IntoParam {
    fn into_param(self) -> Param;
}

impl<T: Into<Value>> IntoParam for T {
    fn into_param(self) -> Param {
        Param::Value(self.into())
    }
}

impl IntoParam for Expression {
    fn into_param(self) -> Param {
        Param::Raw(self)
    }
}

impl IntoParam for Param {
    fn into_param(self) -> Param {
        self
    }
}
