//! Builders for query-language expressions.
//!
//! Queries are JSON trees of function calls. This crate assembles them from
//! plain Rust values and [`types`] domain values; it performs no I/O and does
//! not validate that a query is meaningful.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`expr`] | The [`Expr`] type and literal conversion |
//! | [`language`] | One constructor per query function |
//! | [`paginate`] | The [`Paginate`] builder |

pub mod expr;
pub mod language;
pub mod paginate;

pub use expr::Expr;
pub use language::*;
pub use paginate::{paginate, Paginate};
