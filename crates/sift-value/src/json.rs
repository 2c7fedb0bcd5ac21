use num_bigint::BigInt;
use num_traits::ToPrimitive;
use thiserror::Error;

use crate::value::{Map, Value};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum JsonError {
    #[error("Invalid number: cannot represent {0} as JSON number")]
    InvalidNumber(String),
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(BigInt::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Integer(BigInt::from(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Map(
                object
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Map>(),
            ),
        }
    }
}

impl TryFrom<&Value> for serde_json::Value {
    type Error = JsonError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Integer(n) => {
                if let Some(i) = n.to_i64() {
                    Ok(serde_json::Value::from(i))
                } else if let Some(u) = n.to_u64() {
                    Ok(serde_json::Value::from(u))
                } else {
                    Err(JsonError::InvalidNumber(n.to_string()))
                }
            }
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| JsonError::InvalidNumber(f.to_string())),
            Value::Text(s) => Ok(serde_json::Value::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(serde_json::Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),
            Value::Map(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key.clone(), serde_json::Value::try_from(value)?);
                }
                Ok(serde_json::Value::Object(object))
            }
        }
    }
}
