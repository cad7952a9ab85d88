use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::effects::{Dispose, EffectHandle};
use crate::reactive::Runtime;
use crate::signal::Signal;

/// Ownership boundary for signals, effects and cleanups created on behalf of
/// one component instance.
///
/// Everything created through a scope is torn down by [`Scope::dispose`], or
/// when the last handle to the scope is dropped.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    rt: Runtime,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
    disposed: Cell<bool>,
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("disposers", &self.inner.disposers.borrow().len())
            .field("children", &self.inner.children.borrow().len())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

impl Scope {
    pub fn new(rt: &Runtime) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                rt: rt.clone(),
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.inner.rt
    }

    pub fn create_signal<T: 'static>(&self, value: T) -> Signal<T> {
        let sig = self.inner.rt.create_signal(value);
        let owned = sig.clone();
        self.add_disposer(move || owned.dispose());
        sig
    }

    pub fn create_effect(&self, f: impl FnMut() + 'static) -> EffectHandle {
        let handle = self.inner.rt.create_effect(f);
        let owned = handle.clone();
        self.add_disposer(move || owned.dispose());
        handle
    }

    pub fn on_cleanup(&self, d: Dispose) {
        self.add_disposer(move || d.run());
    }

    /// Registers a cleanup. On an already disposed scope it runs immediately.
    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            disposer();
            return;
        }
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new(&self.inner.rt);
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    /// Disposes children first, then runs disposers in registration order.
    /// Disposing twice is a no-op.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.inner.teardown();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl ScopeInner {
    fn teardown(&self) {
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        if !self.disposed.replace(true) {
            self.teardown();
        }
    }
}
