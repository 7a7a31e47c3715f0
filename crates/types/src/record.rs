//! Compile-time structural decoding of Rust types.
//!
//! [`FromValue`] and [`ToValue`] describe how a Rust type maps to and from a
//! [`Value`]. They are implemented here for primitives, containers and the
//! domain types; user structs get both from the [`crate::record!`] macro, which
//! maps each struct field to an object key without any runtime reflection.
//!
//! ```
//! use types::{record, Field, Value};
//!
//! struct Spell {
//!     name: String,
//!     element: Option<String>,
//!     cost: i64,
//! }
//!
//! record! { Spell { name, element, cost => "mana_cost" } }
//!
//! let data = Value::parse(r#"{"data": {"name": "Fire", "mana_cost": 10}}"#).unwrap();
//! let spell = Field::keys(["data"]).to_type::<Spell>().get(&data).unwrap();
//! assert_eq!(spell.name, "Fire");
//! assert_eq!(spell.element, None);
//! assert_eq!(spell.cost, 10);
//! ```

use std::collections::BTreeMap;

use crate::codec::{Codec, BOOLEAN, DATE, DOUBLE, LONG, REF, STRING, TIMESTAMP};
use crate::{Date, EncodeError, FieldError, Path, Ref, Timestamp, Value, ValueKind};

/// Conversion from a [`Value`].
pub trait FromValue: Sized {
    /// Decodes `value`, or explains why it cannot.
    fn from_value(value: &Value) -> Result<Self, FieldError>;

    /// The value to use when a record member is missing entirely.
    ///
    /// `None` makes the member required.
    fn absent() -> Option<Self> {
        None
    }
}

/// Conversion into a [`Value`].
pub trait ToValue {
    /// Encodes `self` into its wire representation.
    fn to_value(&self) -> Result<Value, EncodeError>;

    /// Encodes `self` as a record member; `Ok(None)` omits the key.
    fn to_member(&self) -> Result<Option<Value>, EncodeError> {
        self.to_value().map(Some)
    }
}

// ---------------------------------------------------------------------------
// Leaf types delegate to the built-in codecs.
// ---------------------------------------------------------------------------
macro_rules! via_codec {
    ($($ty:ty => $codec:expr),+ $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, FieldError> {
                    $codec.decode(value)
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Result<Value, EncodeError> {
                    $codec.encode(self)
                }
            }
        )+
    };
}

via_codec! {
    String => STRING,
    bool => BOOLEAN,
    i64 => LONG,
    f64 => DOUBLE,
    Ref => REF,
    Timestamp => TIMESTAMP,
    Date => DATE,
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, FieldError> {
        Ok(value.clone())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(self.clone())
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, FieldError> {
        let n = LONG.decode(value)?;
        i32::try_from(n).map_err(|_| FieldError::Invalid(format!("{n} is out of range for i32")))
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Long(i64::from(*self)))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::String(self.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// `null` and a missing member both decode to `None`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, FieldError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

/// `None` encodes to `null` on its own and is omitted as a record member.
impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        match self {
            Some(inner) => inner.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn to_member(&self) -> Result<Option<Value>, EncodeError> {
        self.as_ref().map(ToValue::to_value).transpose()
    }
}

/// Decodes every element, reporting all failing indexes at once.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, FieldError> {
        let items = value
            .as_array()
            .ok_or_else(|| FieldError::mismatch(ValueKind::Array, value.kind()))?;

        let mut decoded = Vec::with_capacity(items.len());
        let mut failures = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match T::from_value(item) {
                Ok(v) => decoded.push(v),
                Err(err) => failures.push((Path::from_indexes([index]), err)),
            }
        }

        if failures.is_empty() {
            Ok(decoded)
        } else {
            Err(FieldError::Collect { failures })
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.iter().map(ToValue::to_value).collect::<Result<Vec<_>, _>>().map(Value::Array)
    }
}

/// Decodes every member, reporting all failing keys at once.
impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Result<Self, FieldError> {
        let members = value
            .as_object()
            .ok_or_else(|| FieldError::mismatch(ValueKind::Object, value.kind()))?;

        let mut decoded = BTreeMap::new();
        let mut failures = Vec::new();
        for (key, member) in members {
            match T::from_value(member) {
                Ok(v) => {
                    decoded.insert(key.clone(), v);
                }
                Err(err) => failures.push((Path::from_keys([key.as_str()]), err)),
            }
        }

        if failures.is_empty() {
            Ok(decoded)
        } else {
            Err(FieldError::Collect { failures })
        }
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.iter()
            .map(|(k, v)| Ok((k.clone(), v.to_value()?)))
            .collect::<Result<BTreeMap<_, _>, EncodeError>>()
            .map(Value::Object)
    }
}

// ---------------------------------------------------------------------------
// Support for `record!`
// ---------------------------------------------------------------------------

/// Decodes one record member, recording the failure instead of returning it
/// so every member of the record is checked.
#[doc(hidden)]
pub fn decode_member<T: FromValue>(
    members: &BTreeMap<String, Value>,
    key: &str,
    failures: &mut Vec<(String, FieldError)>,
) -> Option<T> {
    let decoded = match members.get(key) {
        Some(value) => T::from_value(value),
        None => T::absent().ok_or_else(|| FieldError::KeyNotFound(key.to_string())),
    };

    match decoded {
        Ok(v) => Some(v),
        Err(err) => {
            failures.push((key.to_string(), err));
            None
        }
    }
}

/// Implements [`FromValue`] and [`ToValue`] for a struct with named fields.
///
/// Each listed field maps to the object key of the same name, or to the key
/// given after `=>`. Every listed field must be listed exactly once and the
/// struct must have no other fields. `Option` fields may be absent from the
/// object and are omitted when encoding `None`.
///
/// Decoding checks every member; all missing or mistyped members are reported
/// together in one [`FieldError::Record`].
#[macro_export]
macro_rules! record {
    (@key $field:ident $key:literal) => {
        $key
    };
    (@key $field:ident) => {
        stringify!($field)
    };
    ($ty:ident { $($field:ident $(=> $key:literal)?),+ $(,)? }) => {
        impl $crate::FromValue for $ty {
            fn from_value(
                value: &$crate::Value,
            ) -> ::std::result::Result<Self, $crate::FieldError> {
                let members = value.as_object().ok_or_else(|| {
                    $crate::FieldError::mismatch($crate::ValueKind::Object, value.kind())
                })?;

                let mut failures = ::std::vec::Vec::new();
                $(
                    let $field = $crate::record::decode_member(
                        members,
                        $crate::record!(@key $field $($key)?),
                        &mut failures,
                    );
                )+

                match ($($field,)+) {
                    ($(::std::option::Option::Some($field),)+) => {
                        ::std::result::Result::Ok(Self { $($field),+ })
                    }
                    _ => ::std::result::Result::Err($crate::FieldError::Record {
                        target: stringify!($ty),
                        failures,
                    }),
                }
            }
        }

        impl $crate::ToValue for $ty {
            fn to_value(&self) -> ::std::result::Result<$crate::Value, $crate::EncodeError> {
                let mut members = ::std::collections::BTreeMap::new();
                $(
                    if let ::std::option::Option::Some(member) =
                        $crate::ToValue::to_member(&self.$field)?
                    {
                        members.insert(
                            ::std::string::String::from($crate::record!(@key $field $($key)?)),
                            member,
                        );
                    }
                )+
                ::std::result::Result::Ok($crate::Value::Object(members))
            }
        }
    };
}
