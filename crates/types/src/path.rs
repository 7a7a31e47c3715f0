//! Navigation paths into a [`Value`] tree.
//!
//! A [`Path`] is an ordered list of [`Segment`]s, each an object key or an array
//! index. Paths are built once, usually when a [`crate::Field`] is declared, and
//! never mutated; [`Path::sub_path`] always returns a new path.
//!
//! Walking a path borrows from the root: no part of the tree is copied.

use std::str::FromStr;

use crate::{FieldError, Value, ValueKind};

/// One navigation step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Look up a key in an object.
    Key(String),
    /// Look up a position in an array.
    Index(usize),
}

impl Segment {
    fn get<'v>(&self, value: &'v Value) -> Result<&'v Value, FieldError> {
        match self {
            Segment::Key(key) => {
                let members = value
                    .as_object()
                    .ok_or_else(|| FieldError::mismatch(ValueKind::Object, value.kind()))?;
                members.get(key).ok_or_else(|| FieldError::KeyNotFound(key.clone()))
            }
            Segment::Index(index) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| FieldError::mismatch(ValueKind::Array, value.kind()))?;
                items.get(*index).ok_or(FieldError::IndexNotFound(*index))
            }
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// An immutable sequence of [`Segment`]s from a root [`Value`] to a nested one.
///
/// Two paths are equal when their segments are equal element-wise. The empty
/// path returns the root unchanged and is an identity for [`Path::sub_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The path with no segments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A path of object keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { segments: keys.into_iter().map(|k| Segment::Key(k.into())).collect() }
    }

    /// A path of array indexes.
    pub fn from_indexes<I>(indexes: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self { segments: indexes.into_iter().map(Segment::Index).collect() }
    }

    /// A path of arbitrary segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        Self { segments: segments.into_iter().map(Into::into).collect() }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `self` followed by `other` as a new path.
    pub fn sub_path(&self, other: &Path) -> Path {
        let mut segments = Vec::with_capacity(self.segments.len() + other.segments.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&other.segments);
        Path { segments }
    }

    /// Walks the path from `root`.
    ///
    /// Stops at the first failing segment; the failure is wrapped with this
    /// whole path so the message names both where and why.
    pub fn get<'v>(&self, root: &'v Value) -> Result<&'v Value, FieldError> {
        let mut current = root;
        for segment in &self.segments {
            current = segment.get(current).map_err(|source| FieldError::PathNotFound {
                path: self.clone(),
                source: Box::new(source),
            })?;
        }
        Ok(current)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Parses `"data/tags/0"`.
///
/// Segments made only of ASCII digits become array indexes; everything else is
/// an object key. An empty string is the empty path.
///
/// The text form cannot name an object key made only of digits, nor a key
/// containing `/`. Build such paths with [`Path::from_keys`] or
/// [`Path::from_segments`].
impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<usize>() {
                Ok(index) if part.bytes().all(|b| b.is_ascii_digit()) => Segment::Index(index),
                _ => Segment::Key(part.to_string()),
            })
            .collect();
        Ok(Path { segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Value {
        Value::parse(r#"{"a": {"b": [10, {"c": "deep"}]}, "n": 1}"#).unwrap()
    }

    #[test]
    fn test_empty_path_returns_root() {
        let root = sample();
        assert_eq!(Path::empty().get(&root), Ok(&root));
    }

    #[test]
    fn test_mixed_segments_reach_nested_value() {
        let root = sample();
        let path = Path::from_segments([
            Segment::from("a"),
            Segment::from("b"),
            Segment::Index(1),
            Segment::from("c"),
        ]);
        assert_eq!(path.get(&root), Ok(&Value::from("deep")));
    }

    #[test]
    fn test_missing_key_names_path_and_key() {
        let root = sample();
        let err = Path::from_keys(["a", "missing"]).get(&root).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Can not find path \"a/missing\". Object key \"missing\" not found"
        );
    }

    #[test]
    fn test_out_of_bounds_index() {
        let root = sample();
        let path: Path = "a/b/5".parse().unwrap();
        let err = path.get(&root).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Can not find path \"a/b/5\". Array index \"5\" not found"
        );
    }

    #[test]
    fn test_wrong_container_kind() {
        let root = sample();
        let err = Path::from_indexes([0]).get(&root).unwrap_err();
        assert_eq!(
            err,
            FieldError::PathNotFound {
                path: Path::from_indexes([0]),
                source: Box::new(FieldError::mismatch(ValueKind::Array, ValueKind::Object)),
            }
        );

        let err = Path::from_keys(["n", "x"]).get(&root).unwrap_err();
        assert!(err.to_string().contains("Expected object but found long"));
    }

    #[test]
    fn test_sub_path_concatenates_and_keeps_identity() {
        let left = Path::from_keys(["a"]);
        let right = Path::from_indexes([1]);
        assert_eq!(left.sub_path(&right).to_string(), "a/1");
        assert_eq!(Path::empty().sub_path(&left), left);
        assert_eq!(left.sub_path(&Path::empty()), left);
    }

    #[test]
    fn test_parse_distinguishes_keys_and_indexes() {
        let path: Path = "/data/tags/0/".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[Segment::from("data"), Segment::from("tags"), Segment::Index(0)]
        );
        let signed: Path = "+1".parse().unwrap();
        assert_eq!(signed.segments(), &[Segment::from("+1")]);
    }

    #[test]
    fn test_digit_keys_need_explicit_segments() {
        let root = Value::parse(r#"{"data": {"0": "zero", "a/b": "slashed"}}"#).unwrap();

        let parsed: Path = "data/0".parse().unwrap();
        assert_eq!(parsed.segments()[1], Segment::Index(0));
        assert!(parsed.get(&root).unwrap_err().to_string().contains("Expected array but found object"));

        assert_eq!(Path::from_keys(["data", "0"]).get(&root), Ok(&Value::from("zero")));
        assert_eq!(Path::from_keys(["data", "a/b"]).get(&root), Ok(&Value::from("slashed")));
    }

    #[test]
    fn test_walk_stops_at_first_failing_segment() {
        let root = sample();
        let err = Path::from_keys(["a", "missing", "x"]).get(&root).unwrap_err();
        let FieldError::PathNotFound { path, source } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(*path, Path::from_keys(["a", "missing", "x"]));
        assert_eq!(**source, FieldError::KeyNotFound("missing".to_string()));
    }
}
