//! Typed shapes of common query results.
//!
//! Each record decodes the object the service returns for one kind of
//! resource, e.g. `Field::keys(["resource"]).to_type::<Page>()` for the result
//! of a `paginate` query. Unknown members are ignored; optional members may be
//! absent.
//!
//! ```
//! use types::response::Instance;
//! use types::{Field, Ref, Value};
//!
//! let body = Value::parse(r#"{"resource": {
//!     "ref": {"@ref": "classes/spells/1"},
//!     "class": {"@ref": "classes/spells"},
//!     "ts": 1509244539203043,
//!     "data": {"name": "Fire"}
//! }}"#).unwrap();
//!
//! let spell = Field::keys(["resource"]).to_type::<Instance>().get(&body).unwrap();
//! assert_eq!(spell.class, Ref::class("spells"));
//! assert_eq!(spell.data["name"], Value::from("Fire"));
//! ```

use std::collections::BTreeMap;

use crate::codec::{Codec, SET_REF};
use crate::{record, EncodeError, FieldError, FromValue, Ref, ToValue, Value};

/// One page of a paginated set.
///
/// `before` and `after` are cursors for the neighbouring pages, absent at the
/// ends of the set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub data: Vec<Value>,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

record! { Page { data, before, after } }

/// A user-defined document stored in a class.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub ref_: Ref,
    pub class: Ref,
    /// Microseconds since the Unix epoch of the last write.
    pub ts: i64,
    pub data: BTreeMap<String, Value>,
}

record! { Instance { ref_ => "ref", class, ts, data } }

/// A class definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub ref_: Ref,
    pub name: String,
    pub ts: i64,
    pub history_days: Option<i64>,
}

record! { Class { ref_ => "ref", name, ts, history_days } }

/// An index definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub ref_: Ref,
    pub name: String,
    pub source: Value,
    pub ts: i64,
    pub active: Option<bool>,
    pub unique: Option<bool>,
    pub terms: Option<Vec<Value>>,
    pub values: Option<Vec<Value>>,
    pub partitions: Option<i64>,
}

record! { Index { ref_ => "ref", name, source, ts, active, unique, terms, values, partitions } }

/// A database definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub ref_: Ref,
    pub name: String,
    pub ts: i64,
}

record! { Database { ref_ => "ref", name, ts } }

/// An access key. `secret` is only present in the response that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub ref_: Ref,
    pub database: Ref,
    pub role: String,
    pub ts: i64,
    pub secret: Option<String>,
    pub hashed_secret: Option<String>,
}

record! { Key { ref_ => "ref", database, role, ts, secret, hashed_secret } }

/// One entry of a resource's or set's history.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub resource: Ref,
    pub action: String,
    pub ts: i64,
}

record! { Event { resource, action, ts } }

/// A set reference, exposing the parameters of the query that describes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub parameters: BTreeMap<String, Value>,
}

impl FromValue for Set {
    fn from_value(value: &Value) -> Result<Self, FieldError> {
        let query = SET_REF.decode(value)?;
        let parameters = BTreeMap::<String, Value>::from_value(&query)?;
        Ok(Set { parameters })
    }
}

impl ToValue for Set {
    fn to_value(&self) -> Result<Value, EncodeError> {
        SET_REF.encode(&Value::Object(self.parameters.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_with_cursors() {
        let body = Value::parse(
            r#"{"resource": {
                "before": [{"@ref": "classes/spells/1"}],
                "after": [{"@ref": "classes/spells/3"}],
                "data": [{"@ref": "classes/spells/1"}, {"@ref": "classes/spells/2"}]
            }}"#,
        )
        .unwrap();

        let page = Field::keys(["resource"]).to_type::<Page>().get(&body).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[1], Value::Ref(Ref::class("spells").child("2")));
        assert_eq!(
            page.after,
            Some(Value::array([Value::Ref(Ref::class("spells").child("3"))]))
        );
    }

    #[test]
    fn test_last_page_has_no_after_cursor() {
        let page = Page::from_value(&Value::parse(r#"{"data": [1, 2]}"#).unwrap()).unwrap();
        assert_eq!(page, Page { data: vec![Value::Long(1), Value::Long(2)], before: None, after: None });
    }

    #[test]
    fn test_instance_requires_ref_and_class() {
        let err = Instance::from_value(&Value::parse(r#"{"ts": 1, "data": {}}"#).unwrap()).unwrap_err();
        let FieldError::Record { target, failures } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(*target, "Instance");
        let keys: Vec<&str> = failures.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["ref", "class"]);
    }

    #[test]
    fn test_schema_resources() {
        let class = Class::from_value(
            &Value::parse(
                r#"{"ref": {"@ref": "classes/spells"}, "class": {"@ref": "classes"},
                    "ts": 1509244539009619, "history_days": 30, "name": "spells"}"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(class.ref_, Ref::class("spells"));
        assert_eq!(class.history_days, Some(30));

        let index = Index::from_value(
            &Value::parse(
                r#"{"ref": {"@ref": "indexes/spells_by_element"}, "class": {"@ref": "indexes"},
                    "ts": 1509244540009619, "active": true, "partitions": 1,
                    "name": "spells_by_element", "source": {"@ref": "classes/spells"},
                    "terms": [{"field": ["data", "element"]}]}"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(index.source, Value::Ref(Ref::class("spells")));
        assert_eq!(index.unique, None);
        assert_eq!(index.terms.map(|t| t.len()), Some(1));

        let database = Database::from_value(
            &Value::parse(r#"{"ref": {"@ref": "databases/prydain"}, "ts": 1, "name": "prydain"}"#)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(database.ref_, Ref::database("prydain"));
    }

    #[test]
    fn test_key_secret_only_on_creation() {
        let key = Key::from_value(
            &Value::parse(
                r#"{"ref": {"@ref": "keys/181388643581657600"}, "ts": 1,
                    "database": {"@ref": "databases/prydain"}, "role": "server",
                    "secret": "kqnPAi...", "hashed_secret": "$2a$05$..."}"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(key.role, "server");
        assert_eq!(key.secret.as_deref(), Some("kqnPAi..."));
        assert_eq!(key.to_value().unwrap().as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_events_from_history_page() {
        let body = Value::parse(
            r#"{"data": [
                {"ts": 10, "action": "create", "resource": {"@ref": "classes/spells/1"}},
                {"ts": 20, "action": "delete", "resource": {"@ref": "classes/spells/1"}}
            ]}"#,
        )
        .unwrap();
        let events = Field::keys(["data"]).collect(&Field::root().to_type::<Event>()).get(&body).unwrap();
        let actions: Vec<&str> = events.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["create", "delete"]);
    }

    #[test]
    fn test_set_exposes_query_parameters() {
        let value = Value::parse(
            r#"{"@set": {"match": "fire", "index": {"@ref": "indexes/spells_by_element"}}}"#,
        )
        .unwrap();
        let set = Set::from_value(&value).unwrap();
        assert_eq!(set.parameters["match"], Value::from("fire"));
        assert_eq!(set.to_value(), Ok(value));

        let err = Set::from_value(&Value::from("fire")).unwrap_err();
        assert_eq!(err.to_string(), "Expected set but found string");
    }
}
