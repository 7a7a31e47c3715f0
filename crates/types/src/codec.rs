//! Decode/encode strategies between [`Value`] and Rust types.
//!
//! A [`Codec`] pairs a pure `decode` with an `encode`. Data failures are returned,
//! never panicked, so codecs compose through `?` and `and_then`.
//!
//! ## Built-in codecs
//!
//! | Constant | Rust type | Accepts |
//! |----------|-----------|---------|
//! | [`VALUE`] | [`Value`] | anything |
//! | [`STRING`] | `String` | [`Value::String`] |
//! | [`BOOLEAN`] | `bool` | [`Value::Boolean`] |
//! | [`LONG`] | `i64` | [`Value::Long`] |
//! | [`DOUBLE`] | `f64` | [`Value::Double`], widening [`Value::Long`] |
//! | [`ARRAY`] | `Vec<Value>` | [`Value::Array`] |
//! | [`OBJECT`] | `BTreeMap<String, Value>` | [`Value::Object`] |
//! | [`REF`] | [`Ref`] | [`Value::Ref`] |
//! | [`TIMESTAMP`] | [`Timestamp`] | [`Value::Timestamp`] |
//! | [`DATE`] | [`Date`] | [`Value::Date`] |
//! | [`SET_REF`] | [`Value`] (the set query) | [`Value::SetRef`] |
//!
//! Every built-in round-trips: `decode(&encode(&x)?) == Ok(x)`.
//!
//! Structured Rust types decode through [`TypedCodec`], which delegates to the
//! [`FromValue`]/[`ToValue`] implementations generated by [`crate::record!`].

use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::{Date, EncodeError, FieldError, FromValue, Ref, Timestamp, ToValue, Value, ValueKind};

/// A bidirectional conversion between [`Value`] and `T`.
///
/// `decode` must be a pure function of its input. `encode` fails only for
/// values that cannot be written to the wire; a codec that supports decoding
/// alone panics in `encode` instead, since calling it is a programming error.
pub trait Codec<T>: Send + Sync {
    /// Converts `value` into a `T`, or explains why it cannot.
    fn decode(&self, value: &Value) -> Result<T, FieldError>;

    /// Converts `value` back into its wire representation.
    fn encode(&self, value: &T) -> Result<Value, EncodeError>;
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Passes values through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ValueCodec;

impl Codec<Value> for ValueCodec {
    fn decode(&self, value: &Value) -> Result<Value, FieldError> {
        Ok(value.clone())
    }

    fn encode(&self, value: &Value) -> Result<Value, EncodeError> {
        Ok(value.clone())
    }
}

/// Shorthand for [`ValueCodec`].
pub const VALUE: ValueCodec = ValueCodec;

// ---------------------------------------------------------------------------
// Macro for single-variant codecs.
// Generates: unit struct, Codec impl (mismatch error on the wrong variant), const.
// `encode` returns a Result so a codec can refuse values with no wire form.
// ---------------------------------------------------------------------------
macro_rules! variant_codec {
    (
        $(#[$attr:meta])*
        $name:ident => $konst:ident: $ty:ty, $kind:ident,
        decode: $decode:expr,
        encode: $encode:expr $(,)?
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl Codec<$ty> for $name {
            fn decode(&self, value: &Value) -> Result<$ty, FieldError> {
                let decode: fn(&Value) -> Option<$ty> = $decode;
                decode(value).ok_or_else(|| FieldError::mismatch(ValueKind::$kind, value.kind()))
            }

            fn encode(&self, value: &$ty) -> Result<Value, EncodeError> {
                let encode: fn(&$ty) -> Result<Value, EncodeError> = $encode;
                encode(value)
            }
        }

        #[doc = concat!("Shorthand for [`", stringify!($name), "`].")]
        pub const $konst: $name = $name;
    };
}

variant_codec! {
    /// Decodes [`Value::String`] into `String`.
    StringCodec => STRING: String, String,
    decode: |v| v.as_str().map(str::to_string),
    encode: |s| Ok(Value::String(s.clone())),
}

variant_codec! {
    /// Decodes [`Value::Boolean`] into `bool`.
    BooleanCodec => BOOLEAN: bool, Boolean,
    decode: Value::as_bool,
    encode: |b| Ok(Value::Boolean(*b)),
}

variant_codec! {
    /// Decodes [`Value::Long`] into `i64`.
    LongCodec => LONG: i64, Long,
    decode: Value::as_long,
    encode: |n| Ok(Value::Long(*n)),
}

variant_codec! {
    /// Decodes [`Value::Double`] into `f64`; a [`Value::Long`] is widened.
    /// NaN and the infinities do not encode.
    DoubleCodec => DOUBLE: f64, Double,
    decode: Value::as_double,
    encode: |d| {
        if d.is_finite() {
            Ok(Value::Double(*d))
        } else {
            Err(EncodeError::NonFinite(*d))
        }
    },
}

variant_codec! {
    /// Decodes [`Value::Array`] into its elements, undecoded.
    ArrayCodec => ARRAY: Vec<Value>, Array,
    decode: |v| v.as_array().map(<[Value]>::to_vec),
    encode: |items| Ok(Value::Array(items.clone())),
}

variant_codec! {
    /// Decodes [`Value::Object`] into its members, undecoded.
    ObjectCodec => OBJECT: BTreeMap<String, Value>, Object,
    decode: |v| v.as_object().cloned(),
    encode: |members| Ok(Value::Object(members.clone())),
}

variant_codec! {
    /// Decodes [`Value::Ref`] into a [`Ref`].
    RefCodec => REF: Ref, Ref,
    decode: |v| v.as_ref_id().cloned(),
    encode: |r| Ok(Value::Ref(r.clone())),
}

variant_codec! {
    /// Decodes [`Value::Timestamp`] into a [`Timestamp`].
    TimestampCodec => TIMESTAMP: Timestamp, Timestamp,
    decode: Value::as_timestamp,
    encode: |ts| Ok(Value::Timestamp(*ts)),
}

variant_codec! {
    /// Decodes [`Value::Date`] into a [`Date`].
    DateCodec => DATE: Date, Date,
    decode: Value::as_date,
    encode: |d| Ok(Value::Date(*d)),
}

variant_codec! {
    /// Decodes [`Value::SetRef`] into the query describing the set.
    SetRefCodec => SET_REF: Value, Set,
    decode: |v| v.as_set().cloned(),
    encode: |query| Ok(Value::SetRef(Box::new(query.clone()))),
}

// ---------------------------------------------------------------------------
// Structured types
// ---------------------------------------------------------------------------

/// Adapts any [`FromValue`] + [`ToValue`] type to [`Codec`].
///
/// This is what [`crate::Field::to_type`] installs.
pub struct TypedCodec<T>(PhantomData<fn() -> T>);

impl<T> TypedCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TypedCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TypedCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypedCodec<{}>", std::any::type_name::<T>())
    }
}

impl<T: FromValue + ToValue> Codec<T> for TypedCodec<T> {
    fn decode(&self, value: &Value) -> Result<T, FieldError> {
        T::from_value(value)
    }

    fn encode(&self, value: &T) -> Result<Value, EncodeError> {
        value.to_value()
    }
}
