//! Typed, composable extractors.
//!
//! A [`Field<T>`] pairs a [`Path`] with a [`Codec<T>`]: it knows *where* a value
//! lives in a response tree and *how* to turn it into a `T`. Fields are usually
//! declared once and reused for the process lifetime; every combinator returns
//! a new field and leaves its inputs untouched.
//!
//! ```
//! use types::{codec, Field, Value};
//!
//! let response = Value::parse(r#"{"data": [{"name": "Fire"}, {"name": "Water"}]}"#).unwrap();
//!
//! let names = Field::keys(["data"]).collect(&Field::keys(["name"]).to(codec::STRING));
//! assert_eq!(names.get(&response).unwrap(), vec!["Fire", "Water"]);
//! ```
//!
//! Fields compare and hash by path alone: two fields with the same path and
//! different codecs are equal.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::codec::{Codec, TypedCodec, VALUE};
use crate::{EncodeError, FieldError, FromValue, Path, ToValue, Value, ValueKind};

/// A typed extractor: a [`Path`] plus the [`Codec`] applied at its end.
pub struct Field<T> {
    path: Path,
    codec: Arc<dyn Codec<T>>,
}

impl Field<Value> {
    /// The whole value, undecoded.
    pub fn root() -> Self {
        Self::of(VALUE)
    }

    /// The value reached through a sequence of object keys, undecoded.
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::at_path(Path::from_keys(keys))
    }

    /// The value reached through a sequence of array indexes, undecoded.
    pub fn indexes<I>(indexes: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self::at_path(Path::from_indexes(indexes))
    }

    /// The value reached through an arbitrary path, undecoded.
    pub fn at_path(path: Path) -> Self {
        Field { path, codec: Arc::new(VALUE) }
    }
}

impl<T: 'static> Field<T> {
    /// The whole value, decoded with `codec`.
    pub fn of<C>(codec: C) -> Self
    where
        C: Codec<T> + 'static,
    {
        Field { path: Path::empty(), codec: Arc::new(codec) }
    }

    /// Continues navigation into `other`.
    ///
    /// The result walks `self`'s path followed by `other`'s and decodes with
    /// `other`'s codec; `self`'s codec is discarded.
    pub fn at<A: 'static>(&self, other: &Field<A>) -> Field<A> {
        Field {
            path: self.path.sub_path(&other.path),
            codec: Arc::clone(&other.codec),
        }
    }

    /// Same path, decoded with `codec` instead.
    pub fn to<A, C>(&self, codec: C) -> Field<A>
    where
        A: 'static,
        C: Codec<A> + 'static,
    {
        Field { path: self.path.clone(), codec: Arc::new(codec) }
    }

    /// Same path, decoded structurally into `A` (see [`crate::record!`]).
    pub fn to_type<A>(&self) -> Field<A>
    where
        A: FromValue + ToValue + 'static,
    {
        self.to(TypedCodec::<A>::new())
    }

    /// Decodes every element of the array at this path with `field`.
    ///
    /// If any element fails, the result is a single [`FieldError::Collect`]
    /// listing every failing element by its absolute path.
    ///
    /// # Panics
    ///
    /// The resulting field decodes only. Calling `encode` on its codec panics.
    pub fn collect<A: 'static>(&self, field: &Field<A>) -> Field<Vec<A>> {
        Field {
            path: self.path.clone(),
            codec: Arc::new(CollectionCodec { path: self.path.clone(), field: field.clone() }),
        }
    }

    /// Walks the path from `root` and decodes what it finds.
    ///
    /// A path failure is returned before the codec is consulted.
    pub fn get(&self, root: &Value) -> Result<T, FieldError> {
        let value = self.path.get(root)?;
        self.codec.decode(value)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> &dyn Codec<T> {
        self.codec.as_ref()
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Field { path: self.path.clone(), codec: Arc::clone(&self.codec) }
    }
}

impl<T> PartialEq for Field<T> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<T> Eq for Field<T> {}

impl<T> Hash for Field<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field").field("path", &self.path.to_string()).finish()
    }
}

impl<T> std::fmt::Display for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

// ---------------------------------------------------------------------------
// Collection decoding
// ---------------------------------------------------------------------------

struct CollectionCodec<A> {
    /// Path of the array, used to report absolute element paths.
    path: Path,
    field: Field<A>,
}

impl<A: 'static> Codec<Vec<A>> for CollectionCodec<A> {
    fn decode(&self, value: &Value) -> Result<Vec<A>, FieldError> {
        let items = value
            .as_array()
            .ok_or_else(|| FieldError::mismatch(ValueKind::Array, value.kind()))?;

        let mut decoded = Vec::with_capacity(items.len());
        let mut failures = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.field.get(item) {
                Ok(v) => decoded.push(v),
                Err(err) => {
                    let element = self
                        .path
                        .sub_path(&Path::from_indexes([index]))
                        .sub_path(&self.field.path);
                    failures.push((element, err));
                }
            }
        }

        if failures.is_empty() {
            Ok(decoded)
        } else {
            Err(FieldError::Collect { failures })
        }
    }

    fn encode(&self, _value: &Vec<A>) -> Result<Value, EncodeError> {
        panic!("encoding is not implemented for the collection codec of {}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{LONG, STRING};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn response() -> Value {
        Value::parse(
            r#"{
                "ref": {"@ref": "classes/spells/1"},
                "data": {
                    "name": "Fire",
                    "costs": [1, 2, 3],
                    "elements": [{"name": "fire"}, {"name": "air"}]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_keys_field_returns_raw_value() {
        let name = Field::keys(["data", "name"]).get(&response());
        assert_eq!(name, Ok(Value::from("Fire")));
    }

    #[test]
    fn test_composition_uses_inner_codec() {
        let data = Field::keys(["data"]).to(STRING);
        let name = data.at(&Field::keys(["name"]).to(STRING));
        assert_eq!(name.path(), &Path::from_keys(["data", "name"]));
        assert_eq!(name.get(&response()), Ok("Fire".to_string()));
    }

    #[test]
    fn test_codec_failure_after_successful_walk() {
        let err = Field::keys(["data", "name"]).to(LONG).get(&response()).unwrap_err();
        assert_eq!(err, FieldError::mismatch(ValueKind::Long, ValueKind::String));
    }

    #[test]
    fn test_path_failure_short_circuits_codec() {
        let err = Field::keys(["data", "missing"]).to(LONG).get(&response()).unwrap_err();
        assert!(matches!(err, FieldError::PathNotFound { .. }));
    }

    #[test]
    fn test_collect_nested_fields() {
        let names = Field::keys(["data", "elements"]).collect(&Field::keys(["name"]).to(STRING));
        assert_eq!(names.get(&response()), Ok(vec!["fire".to_string(), "air".to_string()]));
    }

    #[test]
    fn test_collect_reports_absolute_element_paths() {
        let root = Value::parse(r#"{"items": [{"n": 1}, {"m": 2}, {"n": "x"}]}"#).unwrap();
        let ns = Field::keys(["items"]).collect(&Field::keys(["n"]).to(LONG));

        let err = ns.get(&root).unwrap_err();
        let FieldError::Collect { failures } = &err else {
            panic!("unexpected error: {err}");
        };
        let paths: Vec<String> = failures.iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, vec!["items/1/n", "items/2/n"]);
        assert!(err.to_string().starts_with("Failed to collect values: \"items/1/n\" Can not find path \"n\""));
    }

    #[test]
    fn test_collect_requires_array() {
        let err = Field::keys(["data", "name"]).collect(&Field::of(STRING)).get(&response());
        assert_eq!(err, Err(FieldError::mismatch(ValueKind::Array, ValueKind::String)));
    }

    #[test]
    #[should_panic(expected = "encoding is not implemented for the collection codec")]
    fn test_collected_field_cannot_encode() {
        let costs = Field::keys(["data", "costs"]).collect(&Field::of(LONG));
        let _ = costs.codec().encode(&vec![1, 2]);
    }

    #[test]
    fn test_equality_and_hash_ignore_codec() {
        let raw = Field::keys(["data", "name"]);
        let typed = Field::keys(["data", "name"]).to(LONG).to(VALUE);
        assert_eq!(raw, typed);

        let set: HashSet<Field<Value>> = [raw, typed, Field::keys(["ref"])].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_fields_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Field<Vec<String>>>();

        let field = Field::keys(["data", "costs"]).collect(&Field::of(LONG));
        let root = Arc::new(response());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let field = field.clone();
                let root = Arc::clone(&root);
                std::thread::spawn(move || field.get(&root))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(vec![1, 2, 3]));
        }
    }
}
