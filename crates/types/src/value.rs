//! The [`Value`] tree: every datum exchanged with the remote service.
//!
//! A [`Value`] is a closed tagged union over the JSON data types plus the
//! domain-specific variants the service encodes with reserved `@`-prefixed keys:
//!
//! | JSON | Variant |
//! |------|---------|
//! | `{"@ref": "classes/spells/1"}` | [`Value::Ref`] |
//! | `{"@ts": "1970-01-01T00:00:00Z"}` | [`Value::Timestamp`] |
//! | `{"@date": "1970-01-01"}` | [`Value::Date`] |
//! | `{"@set": {...}}` | [`Value::SetRef`] |
//! | `{"@obj": {...}}` | [`Value::Object`] with keys taken literally |
//!
//! Values are immutable once built; equality and hashing are structural.
//! Doubles compare by bit pattern so that `Eq` and `Hash` agree.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::de::{
    Deserialize, DeserializeSeed, Deserializer, Error as _, MapAccess, SeqAccess, Visitor,
};
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value as Json;

use crate::{Date, Field, FieldError, Path, Ref, Timestamp, ValueError};

/// Nesting limit applied when building a [`Value`] from JSON.
pub const DEFAULT_MAX_DEPTH: usize = 128;

const REF_TAG: &str = "@ref";
const TS_TAG: &str = "@ts";
const DATE_TAG: &str = "@date";
const SET_TAG: &str = "@set";
const OBJ_TAG: &str = "@obj";

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The variant of a [`Value`], without its payload.
///
/// Used to describe coercion failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Long,
    Double,
    String,
    Array,
    Object,
    Ref,
    Timestamp,
    Date,
    Set,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Ref => "ref",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Date => "date",
            ValueKind::Set => "set",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// An immutable, JSON-compatible datum returned by or sent to the service.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    /// An integral number that fits in `i64`.
    Long(i64),
    /// Any other number.
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Ref(Ref),
    Timestamp(Timestamp),
    Date(Date),
    /// A set reference; the payload is the query that describes the set.
    SetRef(Box<Value>),
}

impl Value {
    /// Builds an object from key/value pairs.
    pub fn object<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds an array from any iterator of values.
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Array(items.into_iter().collect())
    }

    /// Returns the variant of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Long(_) => ValueKind::Long,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Ref(_) => ValueKind::Ref,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Date(_) => ValueKind::Date,
            Value::SetRef(_) => ValueKind::Set,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number as `f64`, widening a [`Value::Long`].
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Long(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<&Ref> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<Date> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the query describing a set reference.
    pub fn as_set(&self) -> Option<&Value> {
        match self {
            Value::SetRef(query) => Some(query),
            _ => None,
        }
    }

    /// Extracts a typed value using `field`. Equivalent to `field.get(self)`.
    pub fn get<T: 'static>(&self, field: &Field<T>) -> Result<T, FieldError> {
        field.get(self)
    }

    /// Returns the sub-value at `path`. Equivalent to `path.get(self)`.
    pub fn at(&self, path: &Path) -> Result<&Value, FieldError> {
        path.get(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::SetRef(a), Value::SetRef(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Long(n) => n.hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Array(items) => items.hash(state),
            Value::Object(members) => members.hash(state),
            Value::Ref(r) => r.hash(state),
            Value::Timestamp(ts) => ts.hash(state),
            Value::Date(d) => d.hash(state),
            Value::SetRef(query) => query.hash(state),
        }
    }
}

/// Renders the value as compact wire JSON.
///
/// A tree holding a non-finite double has no wire form and falls back to the
/// `Debug` rendering.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions from Rust values
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Long(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Long(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(members: BTreeMap<String, Value>) -> Self {
        Value::Object(members)
    }
}

impl From<Ref> for Value {
    fn from(r: Ref) -> Self {
        Value::Ref(r)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Date> for Value {
    fn from(d: Date) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Limits applied while converting JSON into a [`Value`] tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest array/object nesting accepted; deeper input fails with
    /// [`ValueError::TooDeep`]. The root is at depth 0.
    ///
    /// Parsing recurses once per level, so very large limits trade the
    /// error for a risk of exhausting the stack.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Value {
    /// Parses wire JSON text into a [`Value`] tree.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        Self::parse_with(text, ParseOptions::default())
    }

    /// Parses wire JSON text with explicit [`ParseOptions`].
    pub fn parse_with(text: &str, options: ParseOptions) -> Result<Self, ValueError> {
        let limit = options.max_depth;
        let exceeded = Cell::new(false);

        // `Bounded` enforces `limit` while reading, in place of serde_json's fixed one.
        let mut deserializer = serde_json::Deserializer::from_str(text);
        deserializer.disable_recursion_limit();
        let json = Bounded { depth: 0, limit, exceeded: &exceeded }
            .deserialize(&mut deserializer)
            .and_then(|json| deserializer.end().map(|()| json));

        match json {
            Ok(json) => convert(json, 0, limit),
            Err(_) if exceeded.get() => Err(ValueError::TooDeep { limit }),
            Err(err) => Err(err.into()),
        }
    }

    /// Converts an already-parsed JSON tree, recognising the `@`-tagged forms.
    pub fn from_json(json: Json) -> Result<Self, ValueError> {
        Self::from_json_with(json, ParseOptions::default())
    }

    /// Converts an already-parsed JSON tree with explicit [`ParseOptions`].
    pub fn from_json_with(json: Json, options: ParseOptions) -> Result<Self, ValueError> {
        convert(json, 0, options.max_depth)
    }
}

/// Reads one JSON value, failing as soon as nesting passes `limit`.
struct Bounded<'a> {
    depth: usize,
    limit: usize,
    exceeded: &'a Cell<bool>,
}

impl Bounded<'_> {
    fn child(&self) -> Self {
        Bounded { depth: self.depth + 1, limit: self.limit, exceeded: self.exceeded }
    }
}

impl<'de> DeserializeSeed<'de> for Bounded<'_> {
    type Value = Json;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Json, D::Error> {
        if self.depth > self.limit {
            self.exceeded.set(true);
            return Err(D::Error::custom(format!("nesting deeper than {}", self.limit)));
        }
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for Bounded<'_> {
    type Value = Json;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: serde::de::Error>(self, b: bool) -> Result<Json, E> {
        Ok(Json::Bool(b))
    }

    fn visit_i64<E: serde::de::Error>(self, n: i64) -> Result<Json, E> {
        Ok(Json::from(n))
    }

    fn visit_u64<E: serde::de::Error>(self, n: u64) -> Result<Json, E> {
        Ok(Json::from(n))
    }

    fn visit_f64<E: serde::de::Error>(self, n: f64) -> Result<Json, E> {
        Ok(serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number))
    }

    fn visit_str<E: serde::de::Error>(self, s: &str) -> Result<Json, E> {
        Ok(Json::String(s.to_string()))
    }

    fn visit_string<E: serde::de::Error>(self, s: String) -> Result<Json, E> {
        Ok(Json::String(s))
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Json, E> {
        Ok(Json::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Json, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element_seed(self.child())? {
            items.push(item);
        }
        Ok(Json::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Json, A::Error> {
        let mut members = serde_json::Map::new();
        while let Some(key) = map.next_key::<String>()? {
            let member = map.next_value_seed(self.child())?;
            members.insert(key, member);
        }
        Ok(Json::Object(members))
    }
}

fn convert(json: Json, depth: usize, limit: usize) -> Result<Value, ValueError> {
    if depth > limit {
        return Err(ValueError::TooDeep { limit });
    }

    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Boolean(b)),
        Json::Number(n) => Ok(match n.as_i64() {
            Some(long) => Value::Long(long),
            // Every serde_json number is representable as f64 without the
            // arbitrary-precision feature.
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Json::String(s) => Ok(Value::String(s)),
        Json::Array(items) => items
            .into_iter()
            .map(|item| convert(item, depth + 1, limit))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Json::Object(members) => convert_object(members, depth, limit),
    }
}

fn convert_object(
    mut members: serde_json::Map<String, Json>,
    depth: usize,
    limit: usize,
) -> Result<Value, ValueError> {
    if members.len() == 1 {
        if let Some(payload) = members.remove(REF_TAG) {
            return match payload {
                Json::String(id) => Ref::new(id).map(Value::Ref).ok_or(ValueError::MalformedSpecial {
                    tag: REF_TAG,
                    expected: "a non-empty string",
                }),
                _ => Err(ValueError::MalformedSpecial { tag: REF_TAG, expected: "a non-empty string" }),
            };
        }
        if let Some(payload) = members.remove(TS_TAG) {
            let raw = expect_string(payload, TS_TAG)?;
            return Timestamp::parse(&raw)
                .map(Value::Timestamp)
                .map_err(|source| ValueError::InvalidTimestamp { raw, source });
        }
        if let Some(payload) = members.remove(DATE_TAG) {
            let raw = expect_string(payload, DATE_TAG)?;
            return Date::parse(&raw)
                .map(Value::Date)
                .map_err(|source| ValueError::InvalidDate { raw, source });
        }
        if let Some(payload) = members.remove(SET_TAG) {
            return Ok(Value::SetRef(Box::new(convert(payload, depth + 1, limit)?)));
        }
        if let Some(payload) = members.remove(OBJ_TAG) {
            return match payload {
                Json::Object(literal) => convert_members(literal, depth + 1, limit),
                _ => Err(ValueError::MalformedSpecial { tag: OBJ_TAG, expected: "an object" }),
            };
        }
    }

    convert_members(members, depth, limit)
}

fn convert_members(
    members: serde_json::Map<String, Json>,
    depth: usize,
    limit: usize,
) -> Result<Value, ValueError> {
    members
        .into_iter()
        .map(|(key, member)| Ok((key, convert(member, depth + 1, limit)?)))
        .collect::<Result<BTreeMap<_, _>, ValueError>>()
        .map(Value::Object)
}

fn expect_string(payload: Json, tag: &'static str) -> Result<String, ValueError> {
    match payload {
        Json::String(s) => Ok(s),
        _ => Err(ValueError::MalformedSpecial { tag, expected: "a string" }),
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = Json::deserialize(deserializer)?;
        Value::from_json(json).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Long(n) => serializer.serialize_i64(*n),
            Value::Double(d) if !d.is_finite() => {
                Err(S::Error::custom(format!("can not serialize non-finite double {d}")))
            }
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            // Keys starting with '@' would be mistaken for tagged forms.
            Value::Object(members) if members.keys().any(|k| k.starts_with('@')) => {
                tagged(serializer, OBJ_TAG, members)
            }
            Value::Object(members) => members.serialize(serializer),
            Value::Ref(r) => tagged(serializer, REF_TAG, r.as_str()),
            Value::Timestamp(ts) => tagged(serializer, TS_TAG, &ts.to_string()),
            Value::Date(d) => tagged(serializer, DATE_TAG, &d.to_string()),
            Value::SetRef(query) => tagged(serializer, SET_TAG, &**query),
        }
    }
}

fn tagged<S, T>(serializer: S, tag: &str, payload: &T) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(tag, payload)?;
    map.end()
}
