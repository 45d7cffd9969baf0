//! Result rows and row mapping traits

use crate::error::{QueryError, QueryResult};
use crate::value::Value;

/// One result row: column names paired with their values, in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from parallel column/value lists.
    ///
    /// Extra values or names beyond the shorter list are dropped.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        let len = columns.len().min(values.len());
        let (mut columns, mut values) = (columns, values);
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    /// Column names in select order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in select order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Value at position `index`.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Decode a column, returning [`QueryError::Decode`] when it is missing
    /// or has an incompatible type.
    pub fn try_get<T: FromValue>(&self, column: &str) -> QueryResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| QueryError::decode(column, "column not found"))?;
        T::from_value(value).map_err(|message| QueryError::decode(column, message))
    }

    /// Iterate `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// Trait for types that can be constructed from a result row.
pub trait FromRow: Sized {
    /// Convert a result row into Self
    fn from_row(row: &Row) -> QueryResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QueryResult<Self> {
        Ok(row.clone())
    }
}

/// Decode a single column value.
///
/// Errors are plain messages; [`Row::try_get`] attaches the column name.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected}, got {}", value.type_name())
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(i64::from(*b)),
            other => Err(mismatch("integer", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| format!("integer {wide} out of range for i32"))
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        u64::try_from(wide).map_err(|_| format!("integer {wide} out of range for u64"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        value.as_f64().ok_or_else(|| mismatch("number", value))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            other => Err(mismatch("bytes", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            vec!["id".into(), "name".into(), "deleted_at".into()],
            vec![Value::Int(7), Value::Text("alice".into()), Value::Null],
        )
    }

    #[test]
    fn test_get_by_name_and_index() {
        let r = row();
        assert_eq!(r.get("name"), Some(&Value::Text("alice".into())));
        assert_eq!(r.get_index(0), Some(&Value::Int(7)));
        assert_eq!(r.get("missing"), None);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_try_get() {
        let r = row();
        assert_eq!(r.try_get::<i64>("id").unwrap(), 7);
        assert_eq!(r.try_get::<i32>("id").unwrap(), 7);
        assert_eq!(r.try_get::<String>("name").unwrap(), "alice");
        assert_eq!(r.try_get::<Option<String>>("deleted_at").unwrap(), None);
    }

    #[test]
    fn test_try_get_errors() {
        let r = row();
        let err = r.try_get::<i64>("name").unwrap_err();
        assert!(matches!(err, QueryError::Decode { ref column, .. } if column == "name"));
        assert!(r.try_get::<i64>("missing").is_err());
    }

    #[test]
    fn test_new_truncates_to_shorter_list() {
        let r = Row::new(vec!["a".into(), "b".into()], vec![Value::Int(1)]);
        assert_eq!(r.columns(), &["a".to_string()]);
    }
}
