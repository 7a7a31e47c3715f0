//! The [`Expr`] type: a query-language expression ready for the wire.
//!
//! An expression is a [`Value`] tree in which every object is a function call
//! (`{"get": ..}`, `{"let": .., "in": ..}`). Literal data therefore cannot be
//! embedded as-is: converting a [`Value`] into an [`Expr`] quotes it, writing
//! each object as `{"object": {...}}` so the service never mistakes data for a
//! call.

use serde::{Serialize, Serializer};
use types::{Date, Path, Ref, Segment, Timestamp, Value};

/// A query-language expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr(Value);

impl Expr {
    /// The `null` literal.
    pub fn null() -> Self {
        Expr(Value::Null)
    }

    /// Wraps an already-encoded expression tree without quoting it.
    ///
    /// Use this for expressions read as JSON from elsewhere; literal data
    /// should go through `From<Value>` instead.
    pub fn raw(value: Value) -> Self {
        Expr(value)
    }

    /// A function call: an object whose members are already expressions.
    pub(crate) fn call<const N: usize>(members: [(&str, Expr); N]) -> Self {
        Expr(Value::object(members.map(|(k, e)| (k, e.0))))
    }

    /// Adds a member to a function call built by [`Expr::call`].
    pub(crate) fn with(mut self, key: &str, value: Expr) -> Self {
        if let Value::Object(members) = &mut self.0 {
            members.insert(key.to_string(), value.0);
        }
        self
    }

    /// An array of expressions, written as-is.
    pub(crate) fn list<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Expr(Value::array(items.into_iter().map(|e| e.into().0)))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

fn quote(value: Value) -> Value {
    match value {
        Value::Object(members) => Value::object([(
            "object",
            Value::Object(members.into_iter().map(|(k, v)| (k, quote(v))).collect()),
        )]),
        Value::Array(items) => Value::Array(items.into_iter().map(quote).collect()),
        other => other,
    }
}

/// Quotes literal data; see the module documentation.
impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr(quote(value))
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr(Value::Boolean(b))
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr(Value::Long(n))
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Expr(Value::from(n))
    }
}

impl From<f64> for Expr {
    fn from(d: f64) -> Self {
        Expr(Value::Double(d))
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr(Value::from(s))
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr(Value::String(s))
    }
}

impl From<Ref> for Expr {
    fn from(r: Ref) -> Self {
        Expr(Value::Ref(r))
    }
}

impl From<&Ref> for Expr {
    fn from(r: &Ref) -> Self {
        Expr(Value::Ref(r.clone()))
    }
}

impl From<Timestamp> for Expr {
    fn from(ts: Timestamp) -> Self {
        Expr(Value::Timestamp(ts))
    }
}

impl From<Date> for Expr {
    fn from(d: Date) -> Self {
        Expr(Value::Date(d))
    }
}

/// A path becomes the array of keys and indexes used by `select` and `contains`.
impl From<&Path> for Expr {
    fn from(path: &Path) -> Self {
        Expr::list(path.segments().iter().map(|segment| match segment {
            Segment::Key(key) => Expr::from(key.as_str()),
            Segment::Index(index) => Expr(Value::Long(*index as i64)),
        }))
    }
}

impl From<Path> for Expr {
    fn from(path: Path) -> Self {
        Expr::from(&path)
    }
}

impl<E: Into<Expr>> From<Vec<E>> for Expr {
    fn from(items: Vec<E>) -> Self {
        Expr::list(items)
    }
}

impl<E: Into<Expr>, const N: usize> From<[E; N]> for Expr {
    fn from(items: [E; N]) -> Self {
        Expr::list(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_literal_objects_are_quoted_recursively() {
        let data = Value::parse(r#"{"name": "Fire", "tags": [{"hot": true}]}"#).unwrap();
        let expr = Expr::from(data);
        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({"object": {
                "name": "Fire",
                "tags": [{"object": {"hot": true}}]
            }})
        );
    }

    #[test]
    fn test_path_becomes_segment_array() {
        let path: Path = "data/tags/0".parse().unwrap();
        assert_eq!(serde_json::to_value(Expr::from(&path)).unwrap(), json!(["data", "tags", 0]));
    }

    #[test]
    fn test_scalars_and_refs_pass_through() {
        let expr = Expr::from(vec![
            Expr::from(1),
            Expr::from("a"),
            Expr::from(Ref::class("spells")),
            Expr::null(),
        ]);
        assert_eq!(expr.to_string(), r#"[1,"a",{"@ref":"classes/spells"},null]"#);
    }
}
