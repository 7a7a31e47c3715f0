//! Constructors for every query-language function.
//!
//! Each function returns an [`Expr`] object keyed by the function name, with
//! its arguments as members. Nothing is validated here: a `let_` whose body
//! refers to an undeclared variable builds fine and is rejected by the service.
//! Rust keywords are suffixed with `_` (`let_`, `if_`, `do_`, `match_`).
//!
//! ```
//! use query::{create, obj, let_, var, select};
//! use types::Ref;
//!
//! let expr = let_(
//!     [("spell", create(Ref::class("spells"), obj([("data", obj([("name", "Fire".into())]))])))],
//!     select(["ref"], var("spell")),
//! );
//! assert_eq!(
//!     expr.to_string(),
//!     r#"{"in":{"from":{"var":"spell"},"select":["ref"]},"let":{"spell":{"create":{"@ref":"classes/spells"},"params":{"object":{"data":{"object":{"name":"Fire"}}}}}}}"#
//! );
//! ```

use types::Value;

use crate::Expr;

// ---------------------------------------------------------------------------
// Macro for single-argument functions: `{"<key>": arg}`.
// ---------------------------------------------------------------------------
macro_rules! unary {
    ($($(#[$attr:meta])* $name:ident => $key:literal),+ $(,)?) => {
        $(
            $(#[$attr])*
            pub fn $name(arg: impl Into<Expr>) -> Expr {
                Expr::call([($key, arg.into())])
            }
        )+
    };
}

// ---------------------------------------------------------------------------
// Macro for functions over a list of arguments: `{"<key>": [args..]}`.
// ---------------------------------------------------------------------------
macro_rules! variadic {
    ($($(#[$attr:meta])* $name:ident => $key:literal),+ $(,)?) => {
        $(
            $(#[$attr])*
            pub fn $name<I, E>(args: I) -> Expr
            where
                I: IntoIterator<Item = E>,
                E: Into<Expr>,
            {
                Expr::call([($key, Expr::list(args))])
            }
        )+
    };
}

// ---------------------------------------------------------------------------
// Basic forms
// ---------------------------------------------------------------------------

/// Binds each name to its expression, then evaluates `body`.
pub fn let_<K, I>(bindings: I, body: impl Into<Expr>) -> Expr
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Expr)>,
{
    let vars = Value::object(bindings.into_iter().map(|(k, e)| (k, e.into_value())));
    Expr::call([("let", Expr::raw(vars)), ("in", body.into())])
}

/// Refers to a variable bound by [`let_`] or a lambda.
pub fn var(name: &str) -> Expr {
    Expr::call([("var", name.into())])
}

/// Evaluates `then` when `condition` is true, `otherwise` when it is false.
pub fn if_(condition: impl Into<Expr>, then: impl Into<Expr>, otherwise: impl Into<Expr>) -> Expr {
    Expr::call([("if", condition.into()), ("then", then.into()), ("else", otherwise.into())])
}

variadic! {
    /// Evaluates expressions in order, returning the last.
    do_ => "do",
}

/// A one-parameter lambda.
pub fn lambda(param: &str, body: impl Into<Expr>) -> Expr {
    Expr::call([("lambda", param.into()), ("expr", body.into())])
}

/// A lambda that destructures its argument array into `params`.
pub fn lambda_pattern<I, S>(params: I, body: impl Into<Expr>) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let params = Expr::list(params.into_iter().map(Into::<String>::into));
    Expr::call([("lambda", params), ("expr", body.into())])
}

/// An object literal whose members are expressions.
pub fn obj<K, I>(members: I) -> Expr
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Expr)>,
{
    let members = Value::object(members.into_iter().map(|(k, e)| (k, e.into_value())));
    Expr::call([("object", Expr::raw(members))])
}

/// An array literal whose elements are expressions.
pub fn arr<I, E>(items: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    Expr::list(items)
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// Applies `lambda` to each element of `collection`, returning the results.
pub fn map(collection: impl Into<Expr>, lambda: impl Into<Expr>) -> Expr {
    Expr::call([("map", lambda.into()), ("collection", collection.into())])
}

/// Applies `lambda` to each element of `collection` for its effects.
pub fn foreach(collection: impl Into<Expr>, lambda: impl Into<Expr>) -> Expr {
    Expr::call([("foreach", lambda.into()), ("collection", collection.into())])
}

/// Keeps the elements of `collection` for which `lambda` returns true.
pub fn filter(collection: impl Into<Expr>, lambda: impl Into<Expr>) -> Expr {
    Expr::call([("filter", lambda.into()), ("collection", collection.into())])
}

pub fn take(count: impl Into<Expr>, collection: impl Into<Expr>) -> Expr {
    Expr::call([("take", count.into()), ("collection", collection.into())])
}

pub fn drop(count: impl Into<Expr>, collection: impl Into<Expr>) -> Expr {
    Expr::call([("drop", count.into()), ("collection", collection.into())])
}

pub fn prepend(elements: impl Into<Expr>, collection: impl Into<Expr>) -> Expr {
    Expr::call([("prepend", elements.into()), ("collection", collection.into())])
}

pub fn append(elements: impl Into<Expr>, collection: impl Into<Expr>) -> Expr {
    Expr::call([("append", elements.into()), ("collection", collection.into())])
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

unary! {
    /// Reads the current version of a resource.
    get => "get",
    /// Tests whether a resource exists now.
    exists => "exists",
    /// Counts the members of a set.
    count => "count",
}

/// Reads a resource as of `ts`.
pub fn get_at(resource: impl Into<Expr>, ts: impl Into<Expr>) -> Expr {
    get(resource).with("ts", ts.into())
}

/// Tests whether a resource existed at `ts`.
pub fn exists_at(resource: impl Into<Expr>, ts: impl Into<Expr>) -> Expr {
    exists(resource).with("ts", ts.into())
}

/// Counts the events of a set instead of its members.
pub fn count_events(set: impl Into<Expr>) -> Expr {
    count(set).with("events", true.into())
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// The kind of event written by [`insert`] and removed by [`remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Delete,
}

impl From<Action> for Expr {
    fn from(action: Action) -> Self {
        match action {
            Action::Create => "create".into(),
            Action::Delete => "delete".into(),
        }
    }
}

/// Creates an instance of `class` with `params`.
pub fn create(class: impl Into<Expr>, params: impl Into<Expr>) -> Expr {
    Expr::call([("create", class.into()), ("params", params.into())])
}

/// Merges `params` into an existing resource.
pub fn update(resource: impl Into<Expr>, params: impl Into<Expr>) -> Expr {
    Expr::call([("update", resource.into()), ("params", params.into())])
}

/// Replaces the data of an existing resource with `params`.
pub fn replace(resource: impl Into<Expr>, params: impl Into<Expr>) -> Expr {
    Expr::call([("replace", resource.into()), ("params", params.into())])
}

unary! {
    /// Deletes a resource.
    delete => "delete",
}

/// Writes an event into a resource's history at `ts`.
pub fn insert(
    resource: impl Into<Expr>,
    ts: impl Into<Expr>,
    action: Action,
    params: impl Into<Expr>,
) -> Expr {
    Expr::call([
        ("insert", resource.into()),
        ("ts", ts.into()),
        ("action", action.into()),
        ("params", params.into()),
    ])
}

/// Deletes an event from a resource's history.
pub fn remove(resource: impl Into<Expr>, ts: impl Into<Expr>, action: Action) -> Expr {
    Expr::call([("remove", resource.into()), ("ts", ts.into()), ("action", action.into())])
}

// ---------------------------------------------------------------------------
// Sets
// ---------------------------------------------------------------------------

/// The set of instances in `index` matching `terms`.
pub fn match_(terms: impl Into<Expr>, index: impl Into<Expr>) -> Expr {
    Expr::call([("match", terms.into()), ("index", index.into())])
}

unary! {
    /// The set of every instance in an index with no terms.
    match_index => "match",
    /// The set with duplicate members removed.
    distinct => "distinct",
}

variadic! {
    /// Members present in any of the sets.
    union => "union",
    /// Members present in all of the sets.
    intersection => "intersection",
    /// Members of the first set absent from the rest.
    difference => "difference",
}

/// Follows each member of `source` through `target` (an index or lambda).
pub fn join(source: impl Into<Expr>, target: impl Into<Expr>) -> Expr {
    Expr::call([("join", source.into()), ("with", target.into())])
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Creates a token for `resource` given credentials in `params`.
pub fn login(resource: impl Into<Expr>, params: impl Into<Expr>) -> Expr {
    Expr::call([("login", resource.into()), ("params", params.into())])
}

/// Invalidates the current token, or every token of its owner.
pub fn logout(all_tokens: bool) -> Expr {
    Expr::call([("logout", all_tokens.into())])
}

/// Checks `password` against `resource`'s credentials.
pub fn identify(resource: impl Into<Expr>, password: impl Into<Expr>) -> Expr {
    Expr::call([("identify", resource.into()), ("password", password.into())])
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

variadic! {
    /// Joins strings with no separator.
    concat => "concat",
}

/// Joins strings with `separator`.
pub fn concat_with<I, E>(strings: I, separator: impl Into<Expr>) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    concat(strings).with("separator", separator.into())
}

unary! {
    /// Unicode case-folding of a string.
    casefold => "casefold",
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Unit of the number passed to [`epoch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl From<TimeUnit> for Expr {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Second => "second".into(),
            TimeUnit::Millisecond => "millisecond".into(),
            TimeUnit::Microsecond => "microsecond".into(),
            TimeUnit::Nanosecond => "nanosecond".into(),
        }
    }
}

unary! {
    /// Parses an ISO 8601 timestamp string; `"now"` is the transaction time.
    time => "time",
    /// Parses a `YYYY-MM-DD` date string.
    date => "date",
}

/// The timestamp `offset` units after the Unix epoch.
pub fn epoch(offset: impl Into<Expr>, unit: TimeUnit) -> Expr {
    Expr::call([("epoch", offset.into()), ("unit", unit.into())])
}

// ---------------------------------------------------------------------------
// Miscellaneous
// ---------------------------------------------------------------------------

/// A fresh, unique id suitable for a new instance ref.
pub fn next_id() -> Expr {
    Expr::call([("next_id", Expr::null())])
}

variadic! {
    /// True when every argument is equal.
    equals => "equals",
}

/// True when `path` resolves inside `value`.
pub fn contains(path: impl Into<Expr>, value: impl Into<Expr>) -> Expr {
    Expr::call([("contains", path.into()), ("in", value.into())])
}

/// The value at `path` inside `from`; an error at run time when absent.
pub fn select(path: impl Into<Expr>, from: impl Into<Expr>) -> Expr {
    Expr::call([("select", path.into()), ("from", from.into())])
}

/// The value at `path` inside `from`, or `default` when absent.
pub fn select_or(path: impl Into<Expr>, from: impl Into<Expr>, default: impl Into<Expr>) -> Expr {
    select(path, from).with("default", default.into())
}

variadic! {
    add => "add",
    multiply => "multiply",
    subtract => "subtract",
    divide => "divide",
    modulo => "modulo",
    and => "and",
    or => "or",
    lt => "lt",
    lte => "lte",
    gt => "gt",
    gte => "gte",
}

unary! {
    /// Boolean negation.
    not => "not",
}
