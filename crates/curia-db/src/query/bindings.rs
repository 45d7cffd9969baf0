//! Clause-ordered binding buckets.

use crate::value::{Param, Value};

/// The clause a bound value belongs to.
///
/// Variants are declared in flatten order, which is also the order in which
/// the grammar emits the clauses' placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingBucket {
    Select,
    From,
    Join,
    Where,
    Having,
    Order,
    Union,
    /// Raw `order by` bindings added after a union; rendered after the unions.
    UnionOrder,
}

impl BindingBucket {
    /// All buckets in flatten order.
    pub const ALL: [BindingBucket; 8] = [
        BindingBucket::Select,
        BindingBucket::From,
        BindingBucket::Join,
        BindingBucket::Where,
        BindingBucket::Having,
        BindingBucket::Order,
        BindingBucket::Union,
        BindingBucket::UnionOrder,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Bucket name as used in debug output.
    pub fn as_str(self) -> &'static str {
        match self {
            BindingBucket::Select => "select",
            BindingBucket::From => "from",
            BindingBucket::Join => "join",
            BindingBucket::Where => "where",
            BindingBucket::Having => "having",
            BindingBucket::Order => "order",
            BindingBucket::Union => "union",
            BindingBucket::UnionOrder => "union_order",
        }
    }
}

/// Bound values grouped by clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    buckets: [Vec<Value>; 8],
}

impl Bindings {
    /// Create an empty set of buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value to a bucket.
    pub fn push(&mut self, bucket: BindingBucket, value: Value) {
        self.buckets[bucket.index()].push(value);
    }

    /// Append the value behind a parameter. Raw expressions bind nothing.
    pub fn push_param(&mut self, bucket: BindingBucket, param: &Param) {
        if let Some(value) = param.binding() {
            self.push(bucket, value.clone());
        }
    }

    /// Append several values to a bucket.
    pub fn extend(&mut self, bucket: BindingBucket, values: impl IntoIterator<Item = Value>) {
        self.buckets[bucket.index()].extend(values);
    }

    /// Values in one bucket.
    pub fn bucket(&self, bucket: BindingBucket) -> &[Value] {
        &self.buckets[bucket.index()]
    }

    /// Drop every value in one bucket.
    pub fn clear(&mut self, bucket: BindingBucket) {
        self.buckets[bucket.index()].clear();
    }

    /// Total number of values across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Check if every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Flatten the buckets into the positional parameter list.
    pub fn flatten(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.len());
        for bucket in BindingBucket::ALL {
            out.extend(self.bucket(bucket).iter().cloned());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_follows_clause_order() {
        let mut b = Bindings::new();
        b.push(BindingBucket::Having, Value::Int(3));
        b.push(BindingBucket::Where, Value::Int(2));
        b.push(BindingBucket::Union, Value::Int(4));
        b.push(BindingBucket::Join, Value::Int(1));
        assert_eq!(
            b.flatten(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
        );
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn test_raw_param_binds_nothing() {
        let mut b = Bindings::new();
        b.push_param(BindingBucket::Where, &Param::Raw(crate::raw("now()")));
        assert!(b.is_empty());
    }

    #[test]
    fn test_clear_bucket() {
        let mut b = Bindings::new();
        b.extend(BindingBucket::Select, [Value::Int(1), Value::Int(2)]);
        b.push(BindingBucket::Where, Value::Int(3));
        b.clear(BindingBucket::Select);
        assert_eq!(b.flatten(), vec![Value::Int(3)]);
    }
}
