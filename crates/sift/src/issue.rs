//! Issue model
//!
//! An `Issue` is one recorded failure. Issues accumulate in an `IssueMap`
//! keyed by the rendered path at which they were recorded.

use std::sync::Arc;

use indexmap::IndexMap;
use sift_value::Value;
use thisisplural::Plural;

use crate::error::{CoerceError, TransformError};
use crate::path::ROOT_PATH;
use crate::rule::{Required, Test};
use crate::schema::SchemaType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IssueCode {
    Required,
    Min,
    Max,
    Len,
    Contains,
    Coerce,
    /// Error returned by a transform
    Unknown,
    /// User-defined test
    Custom(String),
}

impl IssueCode {
    pub fn custom() -> Self {
        IssueCode::Custom("custom".to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            IssueCode::Required => "required",
            IssueCode::Min => "min",
            IssueCode::Max => "max",
            IssueCode::Len => "len",
            IssueCode::Contains => "contains",
            IssueCode::Coerce => "coerce",
            IssueCode::Unknown => "unknown",
            IssueCode::Custom(name) => name,
        }
    }
}

impl core::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Issue {
    pub code: IssueCode,
    /// Rendered path, stamped when recorded
    pub path: String,
    pub dtype: SchemaType,
    pub params: IndexMap<String, Value>,
    pub message: String,
    pub err: Option<Arc<anyhow::Error>>,
}

impl Issue {
    pub fn new(code: IssueCode) -> Self {
        Self {
            code,
            path: String::new(),
            dtype: SchemaType::Custom("unknown"),
            params: IndexMap::new(),
            message: String::new(),
            err: None,
        }
    }

    pub fn from_test<T>(test: &Test<T>) -> Self {
        let mut issue = Self::new(test.code().clone());
        issue.params = test.params().clone();
        issue
    }

    pub fn from_required(_required: &Required) -> Self {
        Self::new(IssueCode::Required)
    }

    pub fn from_coerce(err: CoerceError) -> Self {
        let mut issue = Self::new(IssueCode::Coerce);
        issue.err = Some(Arc::new(anyhow::Error::new(err)));
        issue
    }

    /// Wrap an uncategorized error, typically from a transform.
    pub fn from_error(err: TransformError) -> Self {
        let mut issue = Self::new(IssueCode::Unknown);
        issue.err = Some(Arc::new(err));
        issue
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl core::fmt::Display for Issue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Issues keyed by rendered path, in recording order.
#[derive(Debug, Clone, Default, Plural)]
#[plural(len, is_empty, iter, into_iter, into_iter_ref)]
pub struct IssueMap(IndexMap<String, Vec<Issue>>);

impl IssueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: Issue) {
        self.0.entry(issue.path.clone()).or_default().push(issue);
    }

    pub fn get(&self, path: &str) -> Option<&[Issue]> {
        self.0.get(path).map(Vec::as_slice)
    }

    /// Issues recorded against the top-level value.
    pub fn root(&self) -> Option<&[Issue]> {
        self.get(ROOT_PATH)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// First issue recorded anywhere.
    pub fn first(&self) -> Option<&Issue> {
        self.0.values().flatten().next()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Messages only, keyed by path.
    pub fn sanitize(&self) -> IndexMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|(path, issues)| {
                (
                    path.clone(),
                    issues.iter().map(|i| i.message.clone()).collect(),
                )
            })
            .collect()
    }
}
