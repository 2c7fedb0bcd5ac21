//! Thread-local free lists for per-call traversal state.
//!
//! A top-level call leases an `ExecCtx` and a `PathBuilder`; both are reset
//! and handed back when the lease drops, on every exit path.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::thread::LocalKey;

/// Upper bound on idle instances kept per thread and kind.
const MAX_IDLE: usize = 32;

/// State that can be cleared and reused across calls.
pub trait Recycle: Default + 'static {
    /// Return to the freshly constructed state.
    fn reset(&mut self);

    /// The thread-local pool holding idle instances of this kind.
    fn pool() -> &'static LocalKey<Pool<Self>>;
}

pub struct Pool<T> {
    free: RefCell<Vec<T>>,
}

impl<T> Pool<T> {
    pub const fn new() -> Self {
        Self {
            free: RefCell::new(Vec::new()),
        }
    }

    fn take(&self) -> Option<T> {
        self.free.borrow_mut().pop()
    }

    fn give(&self, item: T) {
        let mut free = self.free.borrow_mut();
        if free.len() < MAX_IDLE {
            free.push(item);
        }
    }

    #[cfg(test)]
    pub fn idle(&self) -> usize {
        self.free.borrow().len()
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped handle to a pooled instance.
pub struct Lease<T: Recycle> {
    item: T,
}

impl<T: Recycle> Lease<T> {
    pub fn acquire() -> Self {
        let item = T::pool()
            .try_with(Pool::take)
            .ok()
            .flatten()
            .unwrap_or_default();
        Self { item }
    }
}

impl<T: Recycle> Deref for Lease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Recycle> DerefMut for Lease<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Recycle> Drop for Lease<T> {
    fn drop(&mut self) {
        let mut item = std::mem::take(&mut self.item);
        item.reset();
        // Pool is gone during thread teardown; dropping the item is fine then.
        let _ = T::pool().try_with(|pool| pool.give(item));
    }
}
