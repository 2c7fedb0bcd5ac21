//! Schema node contract
//!
//! # Architecture
//!
//! A schema is a tree of nodes implementing [`Schema`]. Every node kind owns
//! a [`Pipeline`] with the shared configuration (transforms, tests, required,
//! default, coercer) and implements [`Traverse`](crate::pipeline::Traverse)
//! for the part that differs per kind: how zero is detected and how children
//! are recursed.
//!
//! Two modes share the pipeline:
//! - validate: the typed value is checked in place and may be overwritten by
//!   defaults and pre-transforms.
//! - process: a raw [`Value`] is coerced into a typed destination.

mod map;
mod pointer;
mod primitive;
mod slice;
mod structure;

pub use map::MapOf;
pub use pointer::Pointer;
pub use primitive::Primitive;
pub use slice::Slice;
pub use structure::Struct;

use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexMap;
use sift_value::Value;

use crate::context::{ExecOption, SchemaCtx};
use crate::error::{CoerceError, TransformError};
use crate::issue::IssueMap;
use crate::pipeline::{Pipeline, PreTransform};
use crate::rule::{Required, Test};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Bool,
    String,
    Number,
    Slice,
    Struct,
    Map,
    Pointer,
    Custom(&'static str),
}

impl core::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Slice => write!(f, "slice"),
            Self::Struct => write!(f, "struct"),
            Self::Map => write!(f, "map"),
            Self::Pointer => write!(f, "pointer"),
            Self::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// A composable node describing how to validate or coerce one value.
///
/// Nodes hold no per-call state and can be shared across threads once built.
pub trait Schema: Send + Sync {
    /// The typed value this node validates and produces.
    type Output: Clone + Default + Send + Sync + 'static;

    fn schema_type(&self) -> SchemaType;

    /// Validate `value` in place.
    fn validate_node(&self, value: &mut Self::Output, ctx: &mut SchemaCtx<'_>);

    /// Coerce `input` into `dest`.
    fn process_node(&self, input: &Value, dest: &mut Self::Output, ctx: &mut SchemaCtx<'_>);
}

/// Validate-mode zero check.
pub trait ZeroValue {
    fn is_zero(&self) -> bool;
}

impl ZeroValue for bool {
    fn is_zero(&self) -> bool {
        !*self
    }
}

macro_rules! impl_zero_for_numbers {
    ($($ty:ty),*) => {
        $(
            impl ZeroValue for $ty {
                fn is_zero(&self) -> bool {
                    *self == 0 as $ty
                }
            }
        )*
    };
}

impl_zero_for_numbers!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl ZeroValue for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T> ZeroValue for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T> ZeroValue for Option<T> {
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl<K, V> ZeroValue for IndexMap<K, V> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl ZeroValue for Value {
    fn is_zero(&self) -> bool {
        self.is_absent()
    }
}

// =============================================================================
// Modifiers (builder methods shared by every node kind)
// =============================================================================

/// Fluent configuration shared by all nodes.
///
/// Each method consumes the node and returns it, so schemas are assembled
/// once and then treated as immutable.
pub trait Modifiers: Sized {
    type Target: Clone;
    type Shape: Clone + 'static;

    fn pipeline_mut(&mut self) -> &mut Pipeline<Self::Target, Self::Shape>;

    fn required(self) -> Self {
        self.required_with(Required::new())
    }

    fn required_with(mut self, required: Required) -> Self {
        self.pipeline_mut().required = Some(required);
        self
    }

    /// Clears any previous `required`.
    fn optional(mut self) -> Self {
        self.pipeline_mut().required = None;
        self
    }

    fn default(mut self, value: Self::Target) -> Self {
        self.pipeline_mut().default = Some(value);
        self
    }

    /// Transform the typed value before validation.
    ///
    /// Validate mode only: in process mode the node records an `unknown`
    /// issue and stops.
    fn pre_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Self::Target, &SchemaCtx<'_>) -> Result<Self::Target, TransformError>
            + Send
            + Sync
            + 'static,
    {
        self.pipeline_mut()
            .pre_transforms
            .push(PreTransform::Typed(Arc::new(transform)));
        self
    }

    /// Transform the raw input before coercion.
    ///
    /// Process mode only: in validate mode the node records an `unknown`
    /// issue and stops.
    fn pre_transform_raw<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Value, &SchemaCtx<'_>) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.pipeline_mut()
            .pre_transforms
            .push(PreTransform::Raw(Arc::new(transform)));
        self
    }

    /// Runs after validation, only when the whole call is still issue-free.
    fn post_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&mut Self::Target, &SchemaCtx<'_>) -> Result<(), TransformError>
            + Send
            + Sync
            + 'static,
    {
        self.pipeline_mut().post_transforms.push(Arc::new(transform));
        self
    }

    fn test(mut self, test: Test<Self::Target>) -> Self {
        self.pipeline_mut().tests.push(test);
        self
    }

    fn test_func<F>(self, check: F) -> Self
    where
        F: Fn(&Self::Target, &SchemaCtx<'_>) -> bool + Send + Sync + 'static,
    {
        self.test(Test::func(check))
    }

    fn with_coercer<F>(mut self, coercer: F) -> Self
    where
        F: for<'v> Fn(&'v Value) -> Result<Cow<'v, Self::Shape>, CoerceError>
            + Send
            + Sync
            + 'static,
    {
        self.pipeline_mut().set_coercer(Arc::new(coercer));
        self
    }
}

/// Top-level entry points available on every schema.
pub trait SchemaExt: Schema {
    fn validate<I>(&self, value: &mut Self::Output, options: I) -> IssueMap
    where
        I: IntoIterator<Item = ExecOption>,
    {
        crate::validate(self, value, options)
    }

    fn process<I>(&self, input: &Value, dest: &mut Self::Output, options: I) -> IssueMap
    where
        I: IntoIterator<Item = ExecOption>,
    {
        crate::process(self, input, dest, options)
    }
}

impl<S: Schema + ?Sized> SchemaExt for S {}
