//! Error types for parsing, decoding and encoding values.
//!
//! Failures while *reading* data are ordinary values: every extraction returns a
//! [`std::result::Result`] whose error is a [`FieldError`]. Each layer that
//! propagates a failure wraps it with its own context, so the rendered message
//! names the full navigation path and the innermost cause, e.g.
//!
//! ```text
//! Can not find path "data/tags/3". Array index "3" not found
//! ```
//!
//! [`EncodeError`] is kept separate: it covers Rust values with no wire form.
//! Asking a decode-only codec to encode is a programming error and panics.
//!
//! [`ValueError`] covers turning raw JSON into a [`crate::Value`] tree.

use thiserror::Error;

use crate::{Path, ValueKind};

// ---------------------------------------------------------------------------
// Decode failures
// ---------------------------------------------------------------------------

/// A data-dependent failure raised while navigating or decoding a [`crate::Value`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The value exists but is of the wrong kind for the requested coercion.
    #[error("Expected {expected} but found {found}")]
    TypeMismatch {
        /// The kind the codec or path segment required.
        expected: ValueKind,
        /// The kind actually present.
        found: ValueKind,
    },

    /// An object did not contain the requested key.
    #[error("Object key \"{0}\" not found")]
    KeyNotFound(String),

    /// An array was shorter than the requested index.
    #[error("Array index \"{0}\" not found")]
    IndexNotFound(usize),

    /// A path walk stopped at its first failing segment.
    #[error("Can not find path \"{path}\". {source}")]
    PathNotFound {
        /// The complete path that was being walked.
        path: Path,
        /// The failure of the segment that stopped the walk.
        #[source]
        source: Box<FieldError>,
    },

    /// One or more elements of an array failed to decode.
    ///
    /// Every failing element is reported, not just the first.
    #[error("Failed to collect values: {}", render_collect(.failures))]
    Collect {
        /// Absolute path of each failing element paired with its failure.
        failures: Vec<(Path, FieldError)>,
    },

    /// One or more members of a structured record failed to decode.
    #[error("Failed to decode {target}: {}", render_record(.failures))]
    Record {
        /// Name of the Rust type being decoded.
        target: &'static str,
        /// Object key of each failing member paired with its failure.
        failures: Vec<(String, FieldError)>,
    },

    /// A custom codec rejected the value.
    #[error("{0}")]
    Invalid(String),
}

fn render_collect(failures: &[(Path, FieldError)]) -> String {
    failures
        .iter()
        .map(|(path, err)| format!("\"{path}\" {err}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_record(failures: &[(String, FieldError)]) -> String {
    failures
        .iter()
        .map(|(key, err)| format!("\"{key}\" {err}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl FieldError {
    /// Convenience constructor for [`FieldError::TypeMismatch`].
    pub fn mismatch(expected: ValueKind, found: ValueKind) -> Self {
        Self::TypeMismatch { expected, found }
    }
}

// ---------------------------------------------------------------------------
// Encode failures
// ---------------------------------------------------------------------------

/// Failure to turn a Rust value into a [`crate::Value`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// JSON has no representation for NaN or the infinities.
    #[error("Can not encode non-finite double {0}")]
    NonFinite(f64),

    /// The value cannot be represented on the wire.
    #[error("{0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Parse failures
// ---------------------------------------------------------------------------

/// Failure to build a [`crate::Value`] tree from JSON.
#[derive(Debug, Error)]
pub enum ValueError {
    /// The input was not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A `{"@ref": ..}`, `{"@ts": ..}`, `{"@date": ..}` or `{"@obj": ..}` form
    /// carried a payload of the wrong shape.
    #[error("Invalid {tag} payload: expected {expected}")]
    MalformedSpecial {
        /// The special key, including the `@`.
        tag: &'static str,
        /// Description of the required payload.
        expected: &'static str,
    },

    /// A `{"@ts": ..}` payload was not an RFC 3339 timestamp.
    #[error("Invalid timestamp '{raw}': {source}")]
    InvalidTimestamp {
        /// The offending text.
        raw: String,
        /// The underlying parse failure.
        source: chrono::ParseError,
    },

    /// A `{"@date": ..}` payload was not a `YYYY-MM-DD` date.
    #[error("Invalid date '{raw}': {source}")]
    InvalidDate {
        /// The offending text.
        raw: String,
        /// The underlying parse failure.
        source: chrono::ParseError,
    },

    /// The JSON tree was nested deeper than the configured limit.
    #[error("Value nested deeper than the limit of {limit} levels")]
    TooDeep {
        /// The limit that was exceeded.
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_failure_renders_full_context() {
        let err = FieldError::PathNotFound {
            path: Path::from_keys(["data", "name"]),
            source: Box::new(FieldError::KeyNotFound("name".to_string())),
        };

        assert_eq!(
            err.to_string(),
            "Can not find path \"data/name\". Object key \"name\" not found"
        );
    }

    #[test]
    fn test_collect_failure_lists_every_element() {
        let err = FieldError::Collect {
            failures: vec![
                (
                    Path::from_indexes([1]),
                    FieldError::mismatch(ValueKind::Long, ValueKind::String),
                ),
                (
                    Path::from_indexes([4]),
                    FieldError::mismatch(ValueKind::Long, ValueKind::Null),
                ),
            ],
        };

        assert_eq!(
            err.to_string(),
            "Failed to collect values: \"1\" Expected long but found string, \
             \"4\" Expected long but found null"
        );
    }
}
