//! Store queries: `where` clauses, ordering and limits
//!
//! Only the comparisons the order screens actually issue are supported:
//! equality, membership (`in`) and range comparisons.
//!
//! # Example
//! ```rust,ignore
//! // collection("orders").where("status", "==", "pendente").orderBy("createdAt", "desc").limit(50)
//! let query = Query::new()
//!     .filter("status", WhereOp::Eq, json!("pendente"))
//!     .order_by("createdAt", SortDirection::Desc)
//!     .limit(50);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operator of a `where` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhereOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
}

/// Sort direction of an `orderBy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One `where(field, op, value)` clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Field path, dot separated for nested fields (`client.id`)
    pub field: String,
    pub op: WhereOp,
    pub value: Value,
}

/// A filtered, ordered, limited read over one collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<usize>,
}

impl Query {
    /// Query matching every document
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, op: WhereOp, value: Value) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value,
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document satisfies every `where` clause
    pub fn matches(&self, data: &Value) -> bool {
        self.filters.iter().all(|filter| {
            let Some(actual) = lookup(data, &filter.field) else {
                return false;
            };
            match filter.op {
                WhereOp::Eq => compare(actual, &filter.value) == Some(Ordering::Equal),
                WhereOp::In => filter
                    .value
                    .as_array()
                    .is_some_and(|candidates| {
                        candidates
                            .iter()
                            .any(|c| compare(actual, c) == Some(Ordering::Equal))
                    }),
                WhereOp::Lt => compare(actual, &filter.value) == Some(Ordering::Less),
                WhereOp::Lte => matches!(
                    compare(actual, &filter.value),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                WhereOp::Gt => compare(actual, &filter.value) == Some(Ordering::Greater),
                WhereOp::Gte => matches!(
                    compare(actual, &filter.value),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
            }
        })
    }

    /// Apply filters, ordering and limit to `(id, data)` pairs
    ///
    /// Documents missing the `orderBy` field are excluded, as a document
    /// database would do.
    pub fn apply<T, F>(&self, docs: Vec<T>, data_of: F) -> Vec<T>
    where
        F: Fn(&T) -> &Value,
    {
        let mut result: Vec<T> = docs
            .into_iter()
            .filter(|doc| self.matches(data_of(doc)))
            .collect();

        if let Some((field, direction)) = &self.order_by {
            result.retain(|doc| lookup(data_of(doc), field).is_some());
            result.sort_by(|a, b| {
                let ordering = match (lookup(data_of(a), field), lookup(data_of(b), field)) {
                    (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            result.truncate(limit);
        }

        result
    }
}

/// Resolve a dot separated path inside a JSON document
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |current, segment| current.get(segment))
        .filter(|value| !value.is_null())
}

/// Compare two JSON values of the same kind
///
/// Store timestamps (`{seconds, nanoseconds}`) compare chronologically.
/// Values of different kinds are incomparable.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Object(_), Value::Object(_)) => {
            let key = |v: &Value| -> Option<(i64, i64)> {
                Some((v.get("seconds")?.as_i64()?, v.get("nanoseconds").and_then(Value::as_i64).unwrap_or(0)))
            };
            Some(key(a)?.cmp(&key(b)?))
        }
        _ => None,
    }
}
