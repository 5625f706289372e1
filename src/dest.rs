//! Destination slots
//!
//! A [`Dest`] is the memory location a field resolves into. Bindings hold
//! clones of it and write on success; the application keeps its own clone and
//! reads the final value after consolidation.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Identity of a destination slot, shared by all clones of one [`Dest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestId(usize);

/// Shared, lockable destination for one configuration value.
pub struct Dest<T> {
    slot: Arc<Mutex<T>>,
}

impl<T> Dest<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(value)),
        }
    }

    pub fn id(&self) -> DestId {
        DestId(Arc::as_ptr(&self.slot) as *const () as usize)
    }

    pub fn set(&self, value: T) {
        *self.slot.lock() = value;
    }

    /// Replace the value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.slot.lock(), value)
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.lock())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.slot.lock())
    }
}

impl<T: Clone> Dest<T> {
    pub fn get(&self) -> T {
        self.slot.lock().clone()
    }
}

impl<T: Default> Dest<T> {
    pub fn take(&self) -> T {
        std::mem::take(&mut *self.slot.lock())
    }
}

impl<T: Default> Default for Dest<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for Dest<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Dest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dest").field(&*self.slot.lock()).finish()
    }
}
