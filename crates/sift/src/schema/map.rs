use std::sync::Arc;

use indexmap::IndexMap;
use sift_value::{Map, Value};

use crate::conf::Coercers;
use crate::context::SchemaCtx;
use crate::issue::IssueCode;
use crate::path::PathSegment;
use crate::pipeline::{Pipeline, Traverse};
use crate::rule::Test;
use crate::schema::{Modifiers, Schema, SchemaType};

/// String-keyed map node; every value is checked against one schema.
pub struct MapOf<S: Schema> {
    value: S,
    pipeline: Pipeline<IndexMap<String, S::Output>, Map>,
}

impl<S: Schema> MapOf<S> {
    pub fn new(value: S) -> Self {
        Self {
            value,
            pipeline: Pipeline::new(Arc::new(Coercers::map)),
        }
    }

    /// At least `n` entries.
    pub fn min(self, n: usize) -> Self {
        self.test(
            Test::new(IssueCode::Min, move |v: &IndexMap<String, S::Output>, _| v.len() >= n)
                .param("min", n),
        )
    }

    /// At most `n` entries.
    pub fn max(self, n: usize) -> Self {
        self.test(
            Test::new(IssueCode::Max, move |v: &IndexMap<String, S::Output>, _| v.len() <= n)
                .param("max", n),
        )
    }
}

impl<S: Schema> Traverse<IndexMap<String, S::Output>> for MapOf<S> {
    type Shape = Map;

    fn is_zero(&self, value: &IndexMap<String, S::Output>) -> bool {
        value.is_empty()
    }

    fn descend(&self, value: &mut IndexMap<String, S::Output>, ctx: &mut SchemaCtx<'_>) {
        let dtype = self.value.schema_type();
        for (key, item) in value.iter_mut() {
            let mut scope = ctx.enter(PathSegment::Field(key.clone()), dtype);
            self.value.validate_node(item, &mut scope);
        }
    }

    fn assemble(
        &self,
        shaped: &Map,
        dest: &mut IndexMap<String, S::Output>,
        ctx: &mut SchemaCtx<'_>,
    ) {
        dest.clear();
        let dtype = self.value.schema_type();
        for (key, source) in shaped {
            let mut scope = ctx.enter(PathSegment::Field(key.clone()), dtype);
            let slot = dest.entry(key.clone()).or_default();
            self.value.process_node(source, slot, &mut scope);
        }
    }
}

impl<S: Schema> Schema for MapOf<S> {
    type Output = IndexMap<String, S::Output>;

    fn schema_type(&self) -> SchemaType {
        SchemaType::Map
    }

    fn validate_node(&self, value: &mut Self::Output, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.validate(self, value, ctx);
    }

    fn process_node(&self, input: &Value, dest: &mut Self::Output, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.process(self, input, dest, ctx);
    }
}

impl<S: Schema> Modifiers for MapOf<S> {
    type Target = IndexMap<String, S::Output>;
    type Shape = Map;

    fn pipeline_mut(&mut self) -> &mut Pipeline<Self::Target, Map> {
        &mut self.pipeline
    }
}
