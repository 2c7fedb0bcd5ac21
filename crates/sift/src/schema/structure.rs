use std::sync::Arc;

use sift_value::{Map, Value};

use crate::conf::Coercers;
use crate::context::SchemaCtx;
use crate::path::PathSegment;
use crate::pipeline::{Pipeline, Traverse};
use crate::schema::{Modifiers, Schema, SchemaType};

/// Stand-in source for fields missing from the input map.
static NULL: Value = Value::Null;

/// One named field of a struct node.
trait Field<T>: Send + Sync {
    fn name(&self) -> &str;
    fn schema_type(&self) -> SchemaType;
    fn validate(&self, target: &mut T, ctx: &mut SchemaCtx<'_>);
    fn process(&self, input: &Value, target: &mut T, ctx: &mut SchemaCtx<'_>);
}

struct FieldNode<T, S: Schema> {
    name: String,
    schema: S,
    access: fn(&mut T) -> &mut S::Output,
}

impl<T: 'static, S: Schema> Field<T> for FieldNode<T, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema_type(&self) -> SchemaType {
        self.schema.schema_type()
    }

    fn validate(&self, target: &mut T, ctx: &mut SchemaCtx<'_>) {
        self.schema.validate_node((self.access)(target), ctx);
    }

    fn process(&self, input: &Value, target: &mut T, ctx: &mut SchemaCtx<'_>) {
        self.schema.process_node(input, (self.access)(target), ctx);
    }
}

/// Record node over a caller-defined struct `T`.
///
/// Fields are declared with an accessor into `T`:
///
/// ```
/// use sift::prelude::*;
///
/// #[derive(Clone, Default)]
/// struct User {
///     name: String,
///     age: i64,
/// }
///
/// let schema = structure::<User>()
///     .field("name", string().required(), |u| &mut u.name)
///     .field("age", int().min(0), |u| &mut u.age);
/// # let _ = schema;
/// ```
pub struct Struct<T> {
    fields: Vec<Box<dyn Field<T>>>,
    pipeline: Pipeline<T, Map>,
}

impl<T: Clone + Send + Sync + 'static> Default for Struct<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Struct<T> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            pipeline: Pipeline::new(Arc::new(Coercers::map)),
        }
    }

    pub fn field<S>(
        mut self,
        name: impl Into<String>,
        schema: S,
        access: fn(&mut T) -> &mut S::Output,
    ) -> Self
    where
        S: Schema + 'static,
    {
        self.fields.push(Box::new(FieldNode {
            name: name.into(),
            schema,
            access,
        }));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name())
    }
}

impl<T: Clone + Send + Sync + 'static> Traverse<T> for Struct<T> {
    type Shape = Map;

    /// A struct always has its fields checked.
    fn is_zero(&self, _value: &T) -> bool {
        false
    }

    fn is_absent(&self, input: &Value) -> bool {
        input.is_null()
    }

    fn descend(&self, value: &mut T, ctx: &mut SchemaCtx<'_>) {
        for field in &self.fields {
            let segment = PathSegment::Field(field.name().to_string());
            let mut scope = ctx.enter(segment, field.schema_type());
            field.validate(value, &mut scope);
        }
    }

    fn assemble(&self, shaped: &Map, dest: &mut T, ctx: &mut SchemaCtx<'_>) {
        for field in &self.fields {
            let source = shaped.get(field.name()).unwrap_or(&NULL);
            let segment = PathSegment::Field(field.name().to_string());
            let mut scope = ctx.enter(segment, field.schema_type());
            field.process(source, dest, &mut scope);
        }
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Schema for Struct<T> {
    type Output = T;

    fn schema_type(&self) -> SchemaType {
        SchemaType::Struct
    }

    fn validate_node(&self, value: &mut T, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.validate(self, value, ctx);
    }

    fn process_node(&self, input: &Value, dest: &mut T, ctx: &mut SchemaCtx<'_>) {
        self.pipeline.process(self, input, dest, ctx);
    }
}

impl<T: Clone + Send + Sync + 'static> Modifiers for Struct<T> {
    type Target = T;
    type Shape = Map;

    fn pipeline_mut(&mut self) -> &mut Pipeline<T, Map> {
        &mut self.pipeline
    }
}
