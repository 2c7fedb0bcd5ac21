//! Schema-driven validation and coercion
//!
//! A schema is a tree of nodes built with fluent modifiers. Two entry points
//! walk it:
//!
//! - [`validate`] checks an already typed value in place.
//! - [`process`] coerces a dynamic [`Value`] into a typed destination.
//!
//! Both return an [`IssueMap`] keyed by path. An empty map means success.
//!
//! ```
//! use sift::prelude::*;
//!
//! let schema = slice(int()).min(2).contains(5);
//! let mut dest = Vec::new();
//! let issues = process(&schema, &Value::from(vec!["1", "5"]), &mut dest, []);
//! assert!(issues.is_empty());
//! assert_eq!(dest, vec![1, 5]);
//! ```

pub mod conf;
pub mod context;
pub mod error;
pub mod issue;
pub mod path;
pub mod pipeline;
pub mod pool;
pub mod rule;
pub mod schema;

pub use sift_value::{Map, Value, ValueKind};

pub use conf::{Coercer, Coercers};
pub use context::{
    ExecCtx, ExecOption, IssueFormatter, SchemaCtx, Scope, with_ctx_value, with_formatter,
};
pub use error::{CoerceError, ModeMismatch, TransformError};
pub use issue::{Issue, IssueCode, IssueMap};
pub use path::{PathBuilder, PathSegment, ROOT_PATH};
pub use pipeline::Mode;
pub use rule::{Required, Test};
pub use schema::{
    MapOf, Modifiers, Pointer, Primitive, Schema, SchemaExt, SchemaType, Slice, Struct, ZeroValue,
};

use tracing::debug;

use crate::pool::Lease;

/// Validate `value` in place against `schema`.
///
/// Defaults and pre-transforms may overwrite parts of `value`.
pub fn validate<S, I>(schema: &S, value: &mut S::Output, options: I) -> IssueMap
where
    S: Schema + ?Sized,
    I: IntoIterator<Item = ExecOption>,
{
    let span = tracing::debug_span!("validate", dtype = %schema.schema_type());
    let _enter = span.enter();

    let mut exec = Lease::<ExecCtx>::acquire();
    for option in options {
        exec.apply(option);
    }
    let mut path = Lease::<PathBuilder>::acquire();
    let mut ctx = SchemaCtx::new(&mut exec, &mut path, schema.schema_type());
    schema.validate_node(value, &mut ctx);
    let halted = ctx.exited();

    let issues = exec.take_issues();
    debug!(issues = issues.len(), halted, "validate finished");
    issues
}

/// Coerce `input` into `dest` according to `schema`.
///
/// On failure, destinations under failed paths are left unspecified.
pub fn process<S, I>(schema: &S, input: &Value, dest: &mut S::Output, options: I) -> IssueMap
where
    S: Schema + ?Sized,
    I: IntoIterator<Item = ExecOption>,
{
    let span = tracing::debug_span!("process", dtype = %schema.schema_type());
    let _enter = span.enter();

    let mut exec = Lease::<ExecCtx>::acquire();
    for option in options {
        exec.apply(option);
    }
    let mut path = Lease::<PathBuilder>::acquire();
    let mut ctx = SchemaCtx::new(&mut exec, &mut path, schema.schema_type());
    schema.process_node(input, dest, &mut ctx);
    let halted = ctx.exited();

    let issues = exec.take_issues();
    debug!(issues = issues.len(), halted, "process finished");
    issues
}

// =============================================================================
// Factories
// =============================================================================

/// Sequence of values checked by `element`.
pub fn slice<S: Schema>(element: S) -> Slice<S> {
    Slice::new(element)
}

/// Text, coerced from text, bool and numbers.
pub fn string() -> Primitive<String> {
    Primitive::string()
}

/// 64-bit integer, coerced from integers, integral floats and numeric text.
pub fn int() -> Primitive<i64> {
    Primitive::int()
}

/// 64-bit float, coerced from numbers and numeric text.
pub fn float() -> Primitive<f64> {
    Primitive::float()
}

/// Boolean, coerced from bools, `0`/`1` and common spellings.
pub fn boolean() -> Primitive<bool> {
    Primitive::boolean()
}

/// Nullable wrapper around `inner`.
pub fn ptr<S: Schema>(inner: S) -> Pointer<S> {
    Pointer::new(inner)
}

/// String-keyed map whose values are checked by `value`.
pub fn map_of<S: Schema>(value: S) -> MapOf<S> {
    MapOf::new(value)
}

/// Record over `T`; add fields with [`Struct::field`].
pub fn structure<T: Clone + Send + Sync + 'static>() -> Struct<T> {
    Struct::new()
}

pub mod prelude {
    pub use crate::issue::{Issue, IssueCode, IssueMap};
    pub use crate::rule::{Required, Test};
    pub use crate::schema::{Modifiers, Schema, SchemaExt, SchemaType};
    pub use crate::{
        ExecOption, SchemaCtx, Value, boolean, float, int, map_of, process, ptr, slice, string,
        structure, validate, with_ctx_value, with_formatter,
    };
}
