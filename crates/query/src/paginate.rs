//! The `paginate` call and its optional parameters.

use crate::Expr;

/// Position to resume paging from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Before(Expr),
    After(Expr),
}

/// Builder for a `paginate` expression over a set.
///
/// Only parameters that were set are emitted; `events` and `sources` are
/// emitted only when enabled. Setting [`Paginate::before`] after
/// [`Paginate::after`] (or the reverse) replaces the earlier cursor.
///
/// ```
/// use query::{match_index, paginate};
/// use types::Ref;
///
/// let page = paginate(match_index(Ref::index("all_spells"))).size(2).after(0).build();
/// assert_eq!(
///     page.to_string(),
///     r#"{"after":0,"paginate":{"match":{"@ref":"indexes/all_spells"}},"size":2}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginate {
    set: Expr,
    cursor: Option<Cursor>,
    ts: Option<Expr>,
    size: Option<Expr>,
    events: bool,
    sources: bool,
}

/// Starts a `paginate` expression over `set`. Same as [`Paginate::new`].
pub fn paginate(set: impl Into<Expr>) -> Paginate {
    Paginate::new(set)
}

impl Paginate {
    pub fn new(set: impl Into<Expr>) -> Self {
        Paginate {
            set: set.into(),
            cursor: None,
            ts: None,
            size: None,
            events: false,
            sources: false,
        }
    }

    pub fn before(mut self, cursor: impl Into<Expr>) -> Self {
        self.cursor = Some(Cursor::Before(cursor.into()));
        self
    }

    pub fn after(mut self, cursor: impl Into<Expr>) -> Self {
        self.cursor = Some(Cursor::After(cursor.into()));
        self
    }

    /// Reads the set as of `ts`.
    pub fn ts(mut self, ts: impl Into<Expr>) -> Self {
        self.ts = Some(ts.into());
        self
    }

    /// Maximum number of elements per page.
    pub fn size(mut self, size: impl Into<Expr>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Returns set events instead of members.
    pub fn events(mut self, events: bool) -> Self {
        self.events = events;
        self
    }

    /// Includes the source sets each member came from.
    pub fn sources(mut self, sources: bool) -> Self {
        self.sources = sources;
        self
    }

    pub fn build(self) -> Expr {
        let mut expr = Expr::call([("paginate", self.set)]);
        match self.cursor {
            Some(Cursor::Before(cursor)) => expr = expr.with("before", cursor),
            Some(Cursor::After(cursor)) => expr = expr.with("after", cursor),
            None => {}
        }
        if let Some(ts) = self.ts {
            expr = expr.with("ts", ts);
        }
        if let Some(size) = self.size {
            expr = expr.with("size", size);
        }
        if self.events {
            expr = expr.with("events", true.into());
        }
        if self.sources {
            expr = expr.with("sources", true.into());
        }
        expr
    }
}

impl From<Paginate> for Expr {
    fn from(paginate: Paginate) -> Self {
        paginate.build()
    }
}
