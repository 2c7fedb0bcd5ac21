use std::sync::Arc;

use sift_value::Value;

use crate::conf::Coercers;
use crate::context::SchemaCtx;
use crate::issue::IssueCode;
use crate::path::PathSegment;
use crate::pipeline::{Pipeline, Traverse};
use crate::rule::Test;
use crate::schema::{Modifiers, Schema, SchemaType};

/// Sequence node: recurses the element schema once per index.
pub struct Slice<S: Schema> {
    element: S,
    pipeline: Pipeline<Vec<S::Output>, Vec<Value>>,
}

impl<S: Schema + Clone> Clone for Slice<S> {
    fn clone(&self) -> Self {
        Self {
            element: self.element.clone(),
            pipeline: self.pipeline.clone(),
        }
    }
}

impl<S: Schema> Slice<S> {
    pub fn new(element: S) -> Self {
        Self {
            element,
            pipeline: Pipeline::new(Arc::new(Coercers::slice)),
        }
    }

    pub fn element(&self) -> &S {
        &self.element
    }

    /// At least `n` elements.
    pub fn min(self, n: usize) -> Self {
        self.test(
            Test::new(IssueCode::Min, move |v: &Vec<S::Output>, _| v.len() >= n)
                .param("min", n),
        )
    }

    /// At most `n` elements.
    pub fn max(self, n: usize) -> Self {
        self.test(
            Test::new(IssueCode::Max, move |v: &Vec<S::Output>, _| v.len() <= n)
                .param("max", n),
        )
    }

    /// Exactly `n` elements.
    pub fn len(self, n: usize) -> Self {
        self.test(
            Test::new(IssueCode::Len, move |v: &Vec<S::Output>, _| v.len() == n)
                .param("len", n),
        )
    }

    /// Some element equals `needle`.
    pub fn contains(self, needle: impl Into<S::Output>) -> Self
    where
        S::Output: PartialEq + Into<Value>,
    {
        let needle: S::Output = needle.into();
        let param: Value = needle.clone().into();
        self.test(
            Test::new(IssueCode::Contains, move |v: &Vec<S::Output>, _| {
                v.iter().any(|item| *item == needle)
            })
            .param("contains", param),
        )
    }
}

impl<S: Schema> Traverse<Vec<S::Output>> for Slice<S> {
    type Shape = Vec<Value>;

    fn is_zero(&self, value: &Vec<S::Output>) -> bool {
        value.is_empty()
    }

    fn descend(&self, value: &mut Vec<S::Output>, ctx: &mut SchemaCtx<'_>) {
        let dtype = self.element.schema_type();
        for (i, item) in value.iter_mut().enumerate() {
            let mut scope = ctx.enter(PathSegment::Index(i), dtype);
            self.element.validate_node(item, &mut scope);
        }
    }

    fn assemble(&self, shaped: &Vec<Value>, dest: &mut Vec<S::Output>, ctx: &mut SchemaCtx<'_>) {
        dest.clear();
        dest.resize_with(shaped.len(), Default::default);
        let dtype = self.element.schema_type();
        for (i, (source, slot)) in shaped.iter().zip(dest.iter_mut()).enumerate() {
            let mut scope = ctx.enter(PathSegment::Index(i), dtype);
            self.element.process_node(source, slot, &mut scope);
        }
    }
}

impl<S: Schema> Schema for Slice<S> {
    type Output = Vec<S::Output>;

    fn schema_type(&self) -> SchemaType {
        SchemaType::Slice
    }

    fn validate_node(&self, value: &mut Self::Output, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.validate(self, value, ctx);
    }

    fn process_node(&self, input: &Value, dest: &mut Self::Output, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.process(self, input, dest, ctx);
    }
}

impl<S: Schema> Modifiers for Slice<S> {
    type Target = Vec<S::Output>;
    type Shape = Vec<Value>;

    fn pipeline_mut(&mut self) -> &mut Pipeline<Self::Target, Vec<Value>> {
        &mut self.pipeline
    }
}
