//! Default configuration: coercers and issue messages.

use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexMap;
use sift_value::{Map, Value};

use crate::context::ExecCtx;
use crate::error::CoerceError;
use crate::issue::{Issue, IssueCode};
use crate::schema::SchemaType;

/// Shapes a raw input into the structure a node expects.
pub type Coercer<S> =
    Arc<dyn for<'v> Fn(&'v Value) -> Result<Cow<'v, S>, CoerceError> + Send + Sync>;

// =============================================================================
// Coercers
// =============================================================================

/// Built-in coercer functions used by the node factories.
pub struct Coercers;

impl Coercers {
    pub fn bool(value: &Value) -> Result<Cow<'_, bool>, CoerceError> {
        match value {
            Value::Bool(b) => Ok(Cow::Owned(*b)),
            Value::Integer(_) => match value.as_i64() {
                Some(0) => Ok(Cow::Owned(false)),
                Some(1) => Ok(Cow::Owned(true)),
                _ => Err(CoerceError::Parse {
                    expected: "bool",
                    input: value.to_string(),
                }),
            },
            Value::Text(s) => match s.trim() {
                "true" | "True" | "TRUE" | "1" | "on" => Ok(Cow::Owned(true)),
                "false" | "False" | "FALSE" | "0" | "off" => Ok(Cow::Owned(false)),
                _ => Err(CoerceError::Parse {
                    expected: "bool",
                    input: s.clone(),
                }),
            },
            other => Err(CoerceError::Mismatch {
                expected: "bool",
                actual: other.kind(),
            }),
        }
    }

    pub fn int(value: &Value) -> Result<Cow<'_, i64>, CoerceError> {
        match value {
            Value::Integer(n) => value.as_i64().map(Cow::Owned).ok_or_else(|| {
                CoerceError::OutOfRange {
                    expected: "int",
                    value: n.to_string(),
                }
            }),
            Value::Float(f) => {
                if f.fract() != 0.0 || !f.is_finite() {
                    Err(CoerceError::Parse {
                        expected: "int",
                        input: f.to_string(),
                    })
                } else if *f < i64::MIN as f64 || *f >= i64::MAX as f64 {
                    // i64::MAX rounds up to 2^63 as f64, which does not fit.
                    Err(CoerceError::OutOfRange {
                        expected: "int",
                        value: f.to_string(),
                    })
                } else {
                    Ok(Cow::Owned(*f as i64))
                }
            }
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Cow::Owned)
                .map_err(|_| CoerceError::Parse {
                    expected: "int",
                    input: s.clone(),
                }),
            other => Err(CoerceError::Mismatch {
                expected: "int",
                actual: other.kind(),
            }),
        }
    }

    pub fn float(value: &Value) -> Result<Cow<'_, f64>, CoerceError> {
        match value {
            Value::Float(f) => Ok(Cow::Owned(*f)),
            Value::Integer(n) => value
                .as_f64()
                .map(Cow::Owned)
                .ok_or_else(|| CoerceError::OutOfRange {
                    expected: "float",
                    value: n.to_string(),
                }),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Cow::Owned)
                .map_err(|_| CoerceError::Parse {
                    expected: "float",
                    input: s.clone(),
                }),
            other => Err(CoerceError::Mismatch {
                expected: "float",
                actual: other.kind(),
            }),
        }
    }

    pub fn string(value: &Value) -> Result<Cow<'_, String>, CoerceError> {
        match value {
            Value::Text(s) => Ok(Cow::Borrowed(s)),
            Value::Bool(_) | Value::Integer(_) | Value::Float(_) => {
                Ok(Cow::Owned(value.to_string()))
            }
            other => Err(CoerceError::Mismatch {
                expected: "string",
                actual: other.kind(),
            }),
        }
    }

    /// Arrays pass through; a scalar becomes a one-element sequence.
    pub fn slice(value: &Value) -> Result<Cow<'_, Vec<Value>>, CoerceError> {
        match value {
            Value::Array(items) => Ok(Cow::Borrowed(items)),
            Value::Null | Value::Map(_) => Err(CoerceError::Mismatch {
                expected: "slice",
                actual: value.kind(),
            }),
            other => Ok(Cow::Owned(vec![other.clone()])),
        }
    }

    pub fn map(value: &Value) -> Result<Cow<'_, Map>, CoerceError> {
        match value {
            Value::Map(map) => Ok(Cow::Borrowed(map)),
            other => Err(CoerceError::Mismatch {
                expected: "map",
                actual: other.kind(),
            }),
        }
    }

    pub fn identity(value: &Value) -> Result<Cow<'_, Value>, CoerceError> {
        Ok(Cow::Borrowed(value))
    }
}

// =============================================================================
// Messages
// =============================================================================

/// Formatter used when neither the test nor the call supplies one.
pub fn default_formatter(issue: &mut Issue, _ctx: &ExecCtx) {
    issue.message = default_message(issue);
}

fn default_message(issue: &Issue) -> String {
    let template = match (&issue.code, issue.dtype) {
        (IssueCode::Required, _) => "is required",
        (IssueCode::Coerce, dtype) => return format!("should be a valid {}", dtype),
        (IssueCode::Unknown, _) => {
            return issue
                .err
                .as_ref()
                .map(|err| err.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
        }
        (IssueCode::Min, SchemaType::Slice) => "should have at least {min} items",
        (IssueCode::Max, SchemaType::Slice) => "should have at most {max} items",
        (IssueCode::Len, SchemaType::Slice) => "should have exactly {len} items",
        (IssueCode::Contains, SchemaType::Slice) => "should contain {contains}",
        (IssueCode::Min, SchemaType::Map) => "should have at least {min} entries",
        (IssueCode::Max, SchemaType::Map) => "should have at most {max} entries",
        (IssueCode::Min, SchemaType::String) => "should be at least {min} characters long",
        (IssueCode::Max, SchemaType::String) => "should be at most {max} characters long",
        (IssueCode::Min, _) => "should be at least {min}",
        (IssueCode::Max, _) => "should be at most {max}",
        (IssueCode::Len, _) => "should have length {len}",
        (IssueCode::Contains, _) => "should contain {contains}",
        (IssueCode::Custom(_), _) => "is invalid",
    };
    interpolate(template, &issue.params)
}

fn interpolate(template: &str, params: &IndexMap<String, Value>) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        out = out.replace(&format!("{{{}}}", key), &value.to_string());
    }
    out
}
