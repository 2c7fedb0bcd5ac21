use std::sync::Arc;

use sift_value::Value;

use crate::conf::{Coercer, Coercers};
use crate::context::SchemaCtx;
use crate::issue::IssueCode;
use crate::pipeline::{Pipeline, Traverse};
use crate::rule::Test;
use crate::schema::{Modifiers, Schema, SchemaType, ZeroValue};

/// Leaf node for scalar values.
pub struct Primitive<T: Clone + 'static> {
    dtype: SchemaType,
    pipeline: Pipeline<T, T>,
}

impl<T: Clone + 'static> Clone for Primitive<T> {
    fn clone(&self) -> Self {
        Self {
            dtype: self.dtype,
            pipeline: self.pipeline.clone(),
        }
    }
}

impl<T: Clone + 'static> Primitive<T> {
    pub fn new(dtype: SchemaType, coercer: Coercer<T>) -> Self {
        Self {
            dtype,
            pipeline: Pipeline::new(coercer),
        }
    }
}

impl Primitive<String> {
    pub fn string() -> Self {
        Self::new(SchemaType::String, Arc::new(Coercers::string))
    }

    /// At least `n` characters.
    pub fn min(self, n: usize) -> Self {
        self.test(
            Test::new(IssueCode::Min, move |v: &String, _| v.chars().count() >= n)
                .param("min", n),
        )
    }

    /// At most `n` characters.
    pub fn max(self, n: usize) -> Self {
        self.test(
            Test::new(IssueCode::Max, move |v: &String, _| v.chars().count() <= n)
                .param("max", n),
        )
    }

    pub fn len(self, n: usize) -> Self {
        self.test(
            Test::new(IssueCode::Len, move |v: &String, _| v.chars().count() == n)
                .param("len", n),
        )
    }
}

impl Primitive<i64> {
    pub fn int() -> Self {
        Self::new(SchemaType::Number, Arc::new(Coercers::int))
    }

    pub fn min(self, n: i64) -> Self {
        self.test(Test::new(IssueCode::Min, move |v: &i64, _| *v >= n).param("min", n))
    }

    pub fn max(self, n: i64) -> Self {
        self.test(Test::new(IssueCode::Max, move |v: &i64, _| *v <= n).param("max", n))
    }
}

impl Primitive<f64> {
    pub fn float() -> Self {
        Self::new(SchemaType::Number, Arc::new(Coercers::float))
    }

    pub fn min(self, n: f64) -> Self {
        self.test(Test::new(IssueCode::Min, move |v: &f64, _| *v >= n).param("min", n))
    }

    pub fn max(self, n: f64) -> Self {
        self.test(Test::new(IssueCode::Max, move |v: &f64, _| *v <= n).param("max", n))
    }
}

impl Primitive<bool> {
    pub fn boolean() -> Self {
        Self::new(SchemaType::Bool, Arc::new(Coercers::bool))
    }
}

impl<T> Traverse<T> for Primitive<T>
where
    T: Clone + ZeroValue + 'static,
{
    type Shape = T;

    fn is_zero(&self, value: &T) -> bool {
        value.is_zero()
    }

    fn descend(&self, _value: &mut T, _ctx: &mut SchemaCtx<'_>) {}

    fn assemble(&self, shaped: &T, dest: &mut T, _ctx: &mut SchemaCtx<'_>) {
        *dest = shaped.clone();
    }
}

impl<T> Schema for Primitive<T>
where
    T: Clone + Default + ZeroValue + Send + Sync + 'static,
{
    type Output = T;

    fn schema_type(&self) -> SchemaType {
        self.dtype
    }

    fn validate_node(&self, value: &mut T, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.validate(self, value, ctx);
    }

    fn process_node(&self, input: &Value, dest: &mut T, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.process(self, input, dest, ctx);
    }
}

impl<T: Clone + 'static> Modifiers for Primitive<T> {
    type Target = T;
    type Shape = T;

    fn pipeline_mut(&mut self) -> &mut Pipeline<T, T> {
        &mut self.pipeline
    }
}
