//! Dynamic value type used at the input boundary of sift.
//!
//! Raw decoded data (JSON, form values, config trees) enters the engine as a
//! [`Value`]. Everything past coercion is statically typed.

/// The dynamic value tree and its kinds.
pub mod value;

/// Conversion to and from `serde_json::Value`.
#[cfg(feature = "json")]
pub mod json;

pub use value::{Map, Value, ValueKind};
#[cfg(feature = "json")]
pub use json::JsonError;
