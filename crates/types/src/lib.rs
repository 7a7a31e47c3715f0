//! Value model and typed extraction for the database's JSON query protocol.
//!
//! Responses from the service arrive as JSON trees. This crate turns them into
//! an immutable [`Value`] tree and provides a safe, typed way to read it:
//! a [`Field`] describes *where* a datum lives (a [`Path`]) and *how* to decode
//! it (a [`Codec`]). Every read returns a [`Result`] whose [`FieldError`]
//! names the full path and the innermost cause; nothing in this crate panics on
//! bad data.
//!
//! ## Architectural Layer
//!
//! **Pure data and decoding logic.** No I/O, no logging, no shared mutable
//! state: every type here is immutable after construction and can be shared
//! freely between threads.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`value`] | The [`Value`] tree, wire-format parsing and serialization |
//! | [`identifiers`] | [`Ref`] resource references |
//! | [`time`] | [`Timestamp`] and [`Date`] |
//! | [`path`] | [`Path`] and [`Segment`] navigation |
//! | [`codec`] | The [`Codec`] trait and built-in codecs |
//! | [`record`] | [`FromValue`]/[`ToValue`] and the [`record!`] macro |
//! | [`field`] | [`Field`] extractors |
//! | [`response`] | Typed records for pages, instances, schema resources and events |
//! | [`errors`] | [`FieldError`], [`EncodeError`], [`ValueError`] |

pub mod codec;
pub mod errors;
pub mod field;
pub mod identifiers;
pub mod path;
pub mod record;
pub mod response;
pub mod time;
pub mod value;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use codec::{Codec, TypedCodec};
pub use errors::{EncodeError, FieldError, ValueError};
pub use field::Field;
pub use identifiers::Ref;
pub use path::{Path, Segment};
pub use record::{FromValue, ToValue};
pub use time::{Date, Timestamp};
pub use value::{ParseOptions, Value, ValueKind, DEFAULT_MAX_DEPTH};
