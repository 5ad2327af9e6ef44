use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::NodeId;

/// Mutable box that keeps its identity across renders.
///
/// Returned by [`use_ref`](crate::use_ref). Writing to it never schedules a
/// re-render. Clones share the same value.
pub struct MutableRef<T> {
    inner: Rc<RefCell<T>>,
}

/// Ref the reconciler fills with the live node of the element it is attached to.
pub type NodeRef = MutableRef<Option<NodeId>>;

impl<T> Clone for MutableRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> MutableRef<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let borrow = self.inner.borrow();
        f(&*borrow)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut borrow = self.inner.borrow_mut();
        f(&mut *borrow)
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    /// Stores `value` and returns the previous one.
    pub fn replace(&self, value: T) -> T {
        self.inner.replace(value)
    }

    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> MutableRef<T> {
    pub fn current(&self) -> T {
        self.inner.borrow().clone()
    }
}

impl<T: Default> Default for MutableRef<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for MutableRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MutableRef").field(&*self.inner.borrow()).finish()
    }
}
