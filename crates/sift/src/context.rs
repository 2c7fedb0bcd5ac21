//! Execution and schema contexts
//!
//! `ExecCtx` is the per-call shared state: the issue map, the active
//! formatter, caller-supplied values, and the aggregate "errored" flag.
//! `SchemaCtx` is the per-node view: it borrows the `ExecCtx` and the shared
//! `PathBuilder` and carries the declared type and exit flag of the node
//! being processed. Each recursion step derives a child `SchemaCtx`.

use std::any::Any;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::thread::LocalKey;

use ahash::AHashMap;

use crate::conf;
use crate::issue::{Issue, IssueMap};
use crate::path::{PathBuilder, PathSegment};
use crate::pool::{Pool, Recycle};
use crate::rule::{Required, Test};
use crate::schema::SchemaType;

/// Renders `issue.message` from its code and params.
pub type IssueFormatter = Arc<dyn Fn(&mut Issue, &ExecCtx) + Send + Sync>;

// =============================================================================
// ExecCtx
// =============================================================================

#[derive(Default)]
pub struct ExecCtx {
    issues: IssueMap,
    /// `None` means the default English formatter
    formatter: Option<IssueFormatter>,
    bag: AHashMap<String, Arc<dyn Any + Send + Sync>>,
    errored: bool,
}

thread_local! {
    static EXEC_POOL: Pool<ExecCtx> = const { Pool::new() };
}

impl Recycle for ExecCtx {
    fn reset(&mut self) {
        self.issues.clear();
        self.formatter = None;
        self.bag.clear();
        self.errored = false;
    }

    fn pool() -> &'static LocalKey<Pool<Self>> {
        &EXEC_POOL
    }
}

impl ExecCtx {
    pub fn apply(&mut self, option: ExecOption) {
        match option {
            ExecOption::Formatter(formatter) => self.formatter = Some(formatter),
            ExecOption::CtxValue(key, value) => {
                self.bag.insert(key, value);
            }
        }
    }

    /// Look up a caller-supplied value.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.bag.get(key).and_then(|value| (**value).downcast_ref::<T>())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Any + Send + Sync) {
        self.bag.insert(key.into(), Arc::new(value));
    }

    pub fn has_errored(&self) -> bool {
        self.errored
    }

    pub fn issues(&self) -> &IssueMap {
        &self.issues
    }

    /// Move the issue map out, leaving this context empty.
    pub fn take_issues(&mut self) -> IssueMap {
        self.errored = false;
        std::mem::take(&mut self.issues)
    }

    fn format(&self, issue: &mut Issue) {
        match &self.formatter {
            Some(formatter) => formatter(issue, self),
            None => conf::default_formatter(issue, self),
        }
    }

    fn record(&mut self, issue: Issue) {
        self.errored = true;
        self.issues.add(issue);
    }
}

// =============================================================================
// ExecOption
// =============================================================================

/// Per-call option accepted by `validate` and `process`.
pub enum ExecOption {
    Formatter(IssueFormatter),
    CtxValue(String, Arc<dyn Any + Send + Sync>),
}

impl core::fmt::Debug for ExecOption {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExecOption::Formatter(_) => f.write_str("Formatter(..)"),
            ExecOption::CtxValue(key, _) => f.debug_tuple("CtxValue").field(key).finish(),
        }
    }
}

/// Replace the default formatter for every issue of this call.
pub fn with_formatter<F>(formatter: F) -> ExecOption
where
    F: Fn(&mut Issue, &ExecCtx) + Send + Sync + 'static,
{
    ExecOption::Formatter(Arc::new(formatter))
}

/// Make a value visible to tests and transforms through the context.
pub fn with_ctx_value(key: impl Into<String>, value: impl Any + Send + Sync) -> ExecOption {
    ExecOption::CtxValue(key.into(), Arc::new(value))
}

// =============================================================================
// SchemaCtx
// =============================================================================

pub struct SchemaCtx<'a> {
    exec: &'a mut ExecCtx,
    path: &'a mut PathBuilder,
    dtype: SchemaType,
    exit: bool,
}

impl<'a> SchemaCtx<'a> {
    pub fn new(exec: &'a mut ExecCtx, path: &'a mut PathBuilder, dtype: SchemaType) -> Self {
        Self {
            exec,
            path,
            dtype,
            exit: false,
        }
    }

    pub fn dtype(&self) -> SchemaType {
        self.dtype
    }

    /// Rendered current path.
    pub fn path(&self) -> String {
        self.path.render()
    }

    pub fn exec(&self) -> &ExecCtx {
        &*self.exec
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.exec.get(key)
    }

    /// Whether any issue has been recorded anywhere in this call.
    pub fn has_errored(&self) -> bool {
        self.exec.has_errored()
    }

    /// Whether this node's pipeline was cut short by an issue.
    pub fn exited(&self) -> bool {
        self.exit
    }

    pub(crate) fn halt(&mut self) {
        self.exit = true;
    }

    pub fn add_issue(&mut self, issue: Issue) {
        self.record(issue, None);
    }

    pub(crate) fn add_test_issue<T>(&mut self, test: &Test<T>) {
        self.record(Issue::from_test(test), test.formatter());
    }

    pub(crate) fn add_required_issue(&mut self, required: &Required) {
        self.record(Issue::from_required(required), required.formatter());
    }

    fn record(&mut self, mut issue: Issue, formatter: Option<&IssueFormatter>) {
        issue.path = self.path.render();
        issue.dtype = self.dtype;
        if issue.message.is_empty()
            && let Some(formatter) = formatter
        {
            formatter(&mut issue, &*self.exec);
        }
        if issue.message.is_empty() {
            self.exec.format(&mut issue);
        }
        self.exec.record(issue);
    }

    /// Context for a nested node at the same path.
    pub fn child(&mut self, dtype: SchemaType) -> SchemaCtx<'_> {
        SchemaCtx {
            exec: &mut *self.exec,
            path: &mut *self.path,
            dtype,
            exit: false,
        }
    }

    /// Context for a nested node one segment deeper.
    ///
    /// The segment is popped when the returned scope drops.
    pub fn enter(&mut self, segment: PathSegment, dtype: SchemaType) -> Scope<'_> {
        self.path.push(segment);
        Scope {
            ctx: self.child(dtype),
        }
    }
}

/// A child `SchemaCtx` whose path segment is popped on drop.
pub struct Scope<'s> {
    ctx: SchemaCtx<'s>,
}

impl<'s> Deref for Scope<'s> {
    type Target = SchemaCtx<'s>;

    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ctx
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.ctx.path.pop();
    }
}
