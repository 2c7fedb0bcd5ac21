//! Traversal path tracking
//!
//! A single `PathBuilder` is shared by the whole call tree. Composite nodes
//! push a segment before recursing and pop it on return; the rendered form
//! is only produced when an issue is recorded.

use core::fmt::{Display, Write};
use std::thread::LocalKey;

use thisisplural::Plural;

use crate::pool::{Pool, Recycle};

/// Key under which issues for the top-level value are recorded.
pub const ROOT_PATH: &str = "$root";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Struct field name or map key
    Field(String),
    /// Sequence element index
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Plural)]
#[plural(len, is_empty, iter, into_iter_ref)]
pub struct PathBuilder(Vec<PathSegment>);

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Render the current position, e.g. `users[0].name`.
    pub fn render(&self) -> String {
        if self.0.is_empty() {
            return ROOT_PATH.to_string();
        }
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i != 0 {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                PathSegment::Index(index) => {
                    let _ = write!(out, "[{}]", index);
                }
            }
        }
        out
    }
}

thread_local! {
    static PATH_POOL: Pool<PathBuilder> = const { Pool::new() };
}

impl Recycle for PathBuilder {
    fn reset(&mut self) {
        self.clear();
    }

    fn pool() -> &'static LocalKey<Pool<Self>> {
        &PATH_POOL
    }
}

impl Display for PathBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.render())
    }
}
