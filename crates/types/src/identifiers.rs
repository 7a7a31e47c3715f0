//! Resource references.
//!
//! Every document, class, index, database and key stored by the service is
//! identified by a slash-separated reference string such as
//! `"classes/spells/181388642046968320"`. On the wire a reference is written as
//! `{"@ref": "<id>"}`; in Rust it is the [`Ref`] newtype so it can never be
//! confused with an ordinary string.

// ---------------------------------------------------------------------------
// Well-known top-level collections.
// ---------------------------------------------------------------------------
const CLASSES: &str = "classes";
const INDEXES: &str = "indexes";
const DATABASES: &str = "databases";
const KEYS: &str = "keys";

/// An opaque identifier of a resource held by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ref(String);

impl Ref {
    /// Creates a new reference, returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() { None } else { Some(Self(v)) }
    }

    /// Reference to the class named `name` (`classes/<name>`).
    pub fn class(name: &str) -> Self {
        Self(format!("{CLASSES}/{name}"))
    }

    /// Reference to the index named `name` (`indexes/<name>`).
    pub fn index(name: &str) -> Self {
        Self(format!("{INDEXES}/{name}"))
    }

    /// Reference to the database named `name` (`databases/<name>`).
    pub fn database(name: &str) -> Self {
        Self(format!("{DATABASES}/{name}"))
    }

    /// Reference to the key collection entry `id` (`keys/<id>`).
    pub fn key(id: &str) -> Self {
        Self(format!("{KEYS}/{id}"))
    }

    /// Returns a reference nested one level below this one.
    ///
    /// `Ref::class("spells").child("123")` is `classes/spells/123`.
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}/{}", self.0, segment))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ref_is_rejected() {
        assert!(Ref::new("").is_none());
        assert_eq!(Ref::new("classes/spells").map(|r| r.to_string()), Some("classes/spells".to_string()));
    }

    #[test]
    fn test_child_appends_segment() {
        let r = Ref::class("spells").child("181388642046968320");
        assert_eq!(r.as_str(), "classes/spells/181388642046968320");
    }

    #[test]
    fn test_well_known_collections() {
        assert_eq!(Ref::index("all_spells").as_str(), "indexes/all_spells");
        assert_eq!(Ref::database("prydain").as_str(), "databases/prydain");
        assert_eq!(Ref::key("1234").as_str(), "keys/1234");
    }
}
