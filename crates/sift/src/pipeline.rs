//! Node pipeline shared by every schema kind
//!
//! Phases, in order:
//! 1. pre-transforms (short-circuit on failure, or when registered for the
//!    other mode)
//! 2. zero check: default, optional stop, or required issue
//! 3. coercion, process mode only (short-circuit on failure)
//! 4. structural recursion via [`Traverse`]
//! 5. rule tests, all of them, in declared order
//! 6. post-transforms, only if the call has recorded no issue at all
//!
//! Any short-circuit skips every later phase, post-transforms included.

use std::borrow::Cow;
use std::sync::Arc;

use sift_value::Value;
use tracing::trace;

use crate::conf::Coercer;
use crate::context::SchemaCtx;
use crate::error::{ModeMismatch, TransformError};
use crate::issue::Issue;
use crate::rule::{Required, Test};

pub type TypedTransform<T> =
    Arc<dyn Fn(&T, &SchemaCtx<'_>) -> Result<T, TransformError> + Send + Sync>;
pub type RawTransform =
    Arc<dyn Fn(&Value, &SchemaCtx<'_>) -> Result<Value, TransformError> + Send + Sync>;
pub type PostTransform<T> =
    Arc<dyn Fn(&mut T, &SchemaCtx<'_>) -> Result<(), TransformError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Validate,
    Process,
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Mode::Validate => write!(f, "validate"),
            Mode::Process => write!(f, "process"),
        }
    }
}

/// A registered pre-transform.
///
/// Typed transforms see the value validate mode works on; raw transforms see
/// the input process mode coerces. Running one in the other mode is a
/// recorded failure, never a silent skip.
pub enum PreTransform<T> {
    Typed(TypedTransform<T>),
    Raw(RawTransform),
}

impl<T> PreTransform<T> {
    pub fn mode(&self) -> Mode {
        match self {
            PreTransform::Typed(_) => Mode::Validate,
            PreTransform::Raw(_) => Mode::Process,
        }
    }
}

impl<T> Clone for PreTransform<T> {
    fn clone(&self) -> Self {
        match self {
            PreTransform::Typed(f) => PreTransform::Typed(f.clone()),
            PreTransform::Raw(f) => PreTransform::Raw(f.clone()),
        }
    }
}

/// The per-kind part of a node: zero detection and child recursion.
pub trait Traverse<T> {
    /// What the coercer produces for this node.
    type Shape: Clone + 'static;

    /// Validate-mode zero check on the typed value.
    fn is_zero(&self, value: &T) -> bool;

    /// Process-mode zero check on the raw input.
    fn is_absent(&self, input: &Value) -> bool {
        input.is_absent()
    }

    /// Recurse into children of an already typed value.
    fn descend(&self, value: &mut T, ctx: &mut SchemaCtx<'_>);

    /// Build `dest` from the coerced input, recursing into children.
    fn assemble(&self, shaped: &Self::Shape, dest: &mut T, ctx: &mut SchemaCtx<'_>);
}

/// Configuration shared by all node kinds.
pub struct Pipeline<T, S: Clone + 'static> {
    pub(crate) pre_transforms: Vec<PreTransform<T>>,
    pub(crate) tests: Vec<Test<T>>,
    pub(crate) post_transforms: Vec<PostTransform<T>>,
    pub(crate) required: Option<Required>,
    pub(crate) default: Option<T>,
    coercer: Coercer<S>,
}

impl<T: Clone, S: Clone + 'static> Clone for Pipeline<T, S> {
    fn clone(&self) -> Self {
        Self {
            pre_transforms: self.pre_transforms.clone(),
            tests: self.tests.clone(),
            post_transforms: self.post_transforms.clone(),
            required: self.required.clone(),
            default: self.default.clone(),
            coercer: self.coercer.clone(),
        }
    }
}

impl<T: Clone, S: Clone + 'static> Pipeline<T, S> {
    pub fn new(coercer: Coercer<S>) -> Self {
        Self {
            pre_transforms: Vec::new(),
            tests: Vec::new(),
            post_transforms: Vec::new(),
            required: None,
            default: None,
            coercer,
        }
    }

    pub fn set_coercer(&mut self, coercer: Coercer<S>) {
        self.coercer = coercer;
    }

    pub fn is_required(&self) -> bool {
        self.required.is_some()
    }

    /// Run the validate-mode pipeline on `value`.
    pub fn validate<N>(&self, node: &N, value: &mut T, ctx: &mut SchemaCtx<'_>)
    where
        N: Traverse<T, Shape = S> + ?Sized,
    {
        for transform in &self.pre_transforms {
            let result = match transform {
                PreTransform::Typed(f) => f(value, ctx),
                PreTransform::Raw(_) => Err(mismatch(transform, Mode::Validate)),
            };
            match result {
                Ok(next) => *value = next,
                Err(err) => return fail_pre_transform(err, ctx),
            }
        }

        if node.is_zero(value) {
            match (&self.default, &self.required) {
                (Some(default), _) => *value = default.clone(),
                (None, None) => return,
                (None, Some(required)) => {
                    trace!(path = %ctx.path(), "required value missing");
                    ctx.add_required_issue(required);
                    ctx.halt();
                    return;
                }
            }
        }

        node.descend(value, ctx);
        self.run_tests(value, ctx);
        self.run_post_transforms(value, ctx);
    }

    /// Run the process-mode pipeline from `input` into `dest`.
    ///
    /// The required check looks at the source; tests and post-transforms
    /// look at the destination, which holds the coerced values by then.
    pub fn process<N>(&self, node: &N, input: &Value, dest: &mut T, ctx: &mut SchemaCtx<'_>)
    where
        N: Traverse<T, Shape = S> + ?Sized,
    {
        let mut input = Cow::Borrowed(input);
        for transform in &self.pre_transforms {
            let result = match transform {
                PreTransform::Raw(f) => f(&input, ctx),
                PreTransform::Typed(_) => Err(mismatch(transform, Mode::Process)),
            };
            match result {
                Ok(next) => input = Cow::Owned(next),
                Err(err) => return fail_pre_transform(err, ctx),
            }
        }

        if node.is_absent(&input) {
            match (&self.default, &self.required) {
                (Some(default), _) => {
                    // Already typed, so children are checked rather than coerced.
                    *dest = default.clone();
                    node.descend(dest, ctx);
                }
                (None, None) => return,
                (None, Some(required)) => {
                    trace!(path = %ctx.path(), "required value missing");
                    ctx.add_required_issue(required);
                    ctx.halt();
                    return;
                }
            }
        } else {
            let shaped = match (self.coercer)(&*input) {
                Ok(shaped) => shaped,
                Err(err) => {
                    trace!(path = %ctx.path(), error = %err, "coercion failed");
                    ctx.add_issue(Issue::from_coerce(err));
                    ctx.halt();
                    return;
                }
            };
            node.assemble(&shaped, dest, ctx);
        }

        self.run_tests(dest, ctx);
        self.run_post_transforms(dest, ctx);
    }

    fn run_tests(&self, value: &T, ctx: &mut SchemaCtx<'_>) {
        for test in &self.tests {
            if !test.check(value, ctx) {
                ctx.add_test_issue(test);
            }
        }
    }

    fn run_post_transforms(&self, value: &mut T, ctx: &mut SchemaCtx<'_>) {
        if ctx.has_errored() {
            return;
        }
        for transform in &self.post_transforms {
            if let Err(err) = transform(value, ctx) {
                ctx.add_issue(Issue::from_error(err));
                return;
            }
        }
    }
}

fn mismatch<T>(transform: &PreTransform<T>, mode: Mode) -> TransformError {
    ModeMismatch {
        registered: transform.mode(),
        mode,
    }
    .into()
}

fn fail_pre_transform(err: TransformError, ctx: &mut SchemaCtx<'_>) {
    trace!(path = %ctx.path(), error = %err, "pre-transform failed");
    ctx.add_issue(Issue::from_error(err));
    ctx.halt();
}
