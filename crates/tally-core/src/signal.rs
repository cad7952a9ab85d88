use std::cell::RefCell;
use std::rc::Rc;

use crate::reactive::{SignalId, WeakRuntime};

/// Observable value. Clones are handles to the same cell.
///
/// Reads inside an effect subscribe that effect; every write (even of an
/// equal value) schedules the subscribers for the next flush.
pub struct Signal<T: 'static> {
    id: SignalId,
    rt: WeakRuntime,
    value: Rc<RefCell<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            rt: self.rt.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &*self.value.borrow())
            .finish()
    }
}

impl<T> Signal<T> {
    pub(crate) fn from_parts(id: SignalId, rt: WeakRuntime, value: T) -> Self {
        Self {
            id,
            rt,
            value: Rc::new(RefCell::new(value)),
        }
    }

    pub fn id(&self) -> SignalId {
        self.id
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track();
        self.value.borrow().clone()
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Tracked read by reference. Writing this signal from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.value.borrow())
    }

    pub fn set(&self, v: T) {
        *self.value.borrow_mut() = v;
        self.notify();
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.value.borrow_mut());
        self.notify();
    }

    /// Releases every subscription. The value stays readable and writable,
    /// but writes no longer schedule anything.
    pub fn dispose(&self) {
        if let Some(rt) = self.rt.upgrade() {
            rt.dispose_signal(self.id);
        }
    }

    fn track(&self) {
        if let Some(rt) = self.rt.upgrade() {
            rt.register_signal_read(self.id);
        }
    }

    fn notify(&self) {
        if let Some(rt) = self.rt.upgrade() {
            rt.signal_changed(self.id);
        }
    }
}
