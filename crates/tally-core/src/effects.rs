use std::cell::RefCell;
use std::rc::Rc;

use crate::reactive::{EffectId, WeakRuntime};

#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl std::fmt::Debug for Dispose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Dispose")
            .field(&if self.is_spent() { "spent" } else { "armed" })
            .finish()
    }
}

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_spent(&self) -> bool {
        self.0.borrow().is_none()
    }
}

/// Helper to register cleanup inside effect.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

/// Handle to a registered effect, returned by
/// [`Runtime::create_effect`](crate::Runtime::create_effect).
#[derive(Clone)]
pub struct EffectHandle {
    id: EffectId,
    rt: WeakRuntime,
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl EffectHandle {
    pub(crate) fn new(id: EffectId, rt: WeakRuntime) -> Self {
        Self { id, rt }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Unsubscribes the effect everywhere and drops it from the pending set.
    /// Disposing twice is a no-op.
    pub fn dispose(&self) {
        if let Some(rt) = self.rt.upgrade()
            && rt.dispose_effect(self.id)
        {
            log::trace!("disposed effect {:?}", self.id);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.rt
            .upgrade()
            .is_some_and(|rt| rt.is_effect_alive(self.id))
    }
}
