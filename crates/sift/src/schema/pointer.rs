use std::sync::Arc;

use sift_value::Value;

use crate::conf::Coercers;
use crate::context::SchemaCtx;
use crate::pipeline::{Pipeline, Traverse};
use crate::schema::{Modifiers, Schema, SchemaType};

/// Nullable wrapper: `None` and `Null` are absent, anything else is handed
/// to the inner schema at the same path.
pub struct Pointer<S: Schema> {
    inner: S,
    pipeline: Pipeline<Option<S::Output>, Value>,
}

impl<S: Schema> Pointer<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pipeline: Pipeline::new(Arc::new(Coercers::identity)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Schema> Traverse<Option<S::Output>> for Pointer<S> {
    type Shape = Value;

    fn is_zero(&self, value: &Option<S::Output>) -> bool {
        value.is_none()
    }

    fn is_absent(&self, input: &Value) -> bool {
        input.is_null()
    }

    fn descend(&self, value: &mut Option<S::Output>, ctx: &mut SchemaCtx<'_>) {
        if let Some(inner) = value {
            let mut child = ctx.child(self.inner.schema_type());
            self.inner.validate_node(inner, &mut child);
        }
    }

    fn assemble(&self, shaped: &Value, dest: &mut Option<S::Output>, ctx: &mut SchemaCtx<'_>) {
        let slot = dest.get_or_insert_with(Default::default);
        let mut child = ctx.child(self.inner.schema_type());
        self.inner.process_node(shaped, slot, &mut child);
    }
}

impl<S: Schema> Schema for Pointer<S> {
    type Output = Option<S::Output>;

    fn schema_type(&self) -> SchemaType {
        SchemaType::Pointer
    }

    fn validate_node(&self, value: &mut Self::Output, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.validate(self, value, ctx);
    }

    fn process_node(&self, input: &Value, dest: &mut Self::Output, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.process(self, input, dest, ctx);
    }
}

impl<S: Schema> Modifiers for Pointer<S> {
    type Target = Option<S::Output>;
    type Shape = Value;

    fn pipeline_mut(&mut self) -> &mut Pipeline<Self::Target, Value> {
        &mut self.pipeline
    }
}
