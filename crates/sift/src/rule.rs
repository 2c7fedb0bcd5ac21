//! Rule tests attached to schema nodes.

use std::sync::Arc;

use indexmap::IndexMap;
use sift_value::Value;

use crate::context::{ExecCtx, IssueFormatter, SchemaCtx};
use crate::issue::{Issue, IssueCode};

pub type TestFn<T> = Arc<dyn Fn(&T, &SchemaCtx<'_>) -> bool + Send + Sync>;

/// A named predicate plus the parameters used to render its message.
pub struct Test<T> {
    code: IssueCode,
    params: IndexMap<String, Value>,
    check: TestFn<T>,
    formatter: Option<IssueFormatter>,
}

impl<T> Clone for Test<T> {
    fn clone(&self) -> Self {
        Self {
            code: self.code.clone(),
            params: self.params.clone(),
            check: self.check.clone(),
            formatter: self.formatter.clone(),
        }
    }
}

impl<T> core::fmt::Debug for Test<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Test")
            .field("code", &self.code)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl<T> Test<T> {
    pub fn new<F>(code: IssueCode, check: F) -> Self
    where
        F: Fn(&T, &SchemaCtx<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            code,
            params: IndexMap::new(),
            check: Arc::new(check),
            formatter: None,
        }
    }

    /// A test with the generic `custom` code.
    pub fn func<F>(check: F) -> Self
    where
        F: Fn(&T, &SchemaCtx<'_>) -> bool + Send + Sync + 'static,
    {
        Self::new(IssueCode::custom(), check)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Use a fixed message instead of the formatter's.
    pub fn message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message_fn(move |issue, _| issue.message = message.clone())
    }

    pub fn message_fn<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&mut Issue, &ExecCtx) + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn code(&self) -> &IssueCode {
        &self.code
    }

    pub fn params(&self) -> &IndexMap<String, Value> {
        &self.params
    }

    pub(crate) fn formatter(&self) -> Option<&IssueFormatter> {
        self.formatter.as_ref()
    }

    pub fn check(&self, value: &T, ctx: &SchemaCtx<'_>) -> bool {
        (self.check)(value, ctx)
    }
}

/// The distinguished "required" test.
///
/// Presence is decided by the node pipeline, so this only carries how the
/// resulting issue is rendered.
#[derive(Clone, Default)]
pub struct Required {
    formatter: Option<IssueFormatter>,
}

impl core::fmt::Debug for Required {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Required")
            .field("custom_message", &self.formatter.is_some())
            .finish()
    }
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message_fn(move |issue, _| issue.message = message.clone())
    }

    pub fn message_fn<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&mut Issue, &ExecCtx) + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub(crate) fn formatter(&self) -> Option<&IssueFormatter> {
        self.formatter.as_ref()
    }
}
