use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use tally_core::Dispose;

use crate::error::DomError;
use crate::event::{Event, EventType, Listeners};
use crate::node::{Document, NodeId};

/// Shared handle to a [`Document`] and its event listeners.
///
/// Listeners live outside the document so that handlers can freely borrow
/// the document while an event is being dispatched.
#[derive(Clone, Default)]
pub struct Dom {
    doc: Rc<RefCell<Document>>,
    listeners: Rc<RefCell<Listeners>>,
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dom")
            .field("nodes", &self.doc.borrow().len())
            .finish()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn borrow(&self) -> Ref<'_, Document> {
        self.doc.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Document> {
        self.doc.borrow_mut()
    }

    pub fn body(&self) -> NodeId {
        self.doc.borrow().body()
    }

    /// Removes `node` with its subtree and drops every listener attached to
    /// the freed nodes.
    pub fn remove(&self, node: NodeId) -> Result<(), DomError> {
        let freed = self.doc.borrow_mut().remove(node)?;
        self.listeners.borrow_mut().purge(&freed);
        Ok(())
    }

    /// Frees the shadow tree of `host` and the listeners attached inside it.
    pub fn detach_shadow(&self, host: NodeId) -> Result<(), DomError> {
        let freed = self.doc.borrow_mut().detach_shadow(host)?;
        self.listeners.borrow_mut().purge(&freed);
        Ok(())
    }

    /// Attaches `handler` to `node`. Running the returned [`Dispose`] detaches
    /// it; so does removing the node.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        kind: EventType,
        handler: impl Fn(&Event) + 'static,
    ) -> Dispose {
        let id = self
            .listeners
            .borrow_mut()
            .add(node, kind, Rc::new(handler));
        let listeners: Weak<RefCell<Listeners>> = Rc::downgrade(&self.listeners);
        Dispose::new(move || {
            if let Some(l) = listeners.upgrade() {
                l.borrow_mut().remove(node, kind, id);
            }
        })
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.borrow().count(node)
    }

    /// Dispatches `kind` at `target` and bubbles it up through the ancestors,
    /// crossing shadow roots into their hosts. Returns the number of handlers
    /// invoked.
    pub fn dispatch(&self, target: NodeId, kind: EventType) -> Result<usize, DomError> {
        let path = {
            let doc = self.doc.borrow();
            if !doc.contains(target) {
                return Err(DomError::StaleNode(target));
            }
            let mut path = vec![target];
            let mut cur = target;
            while let Some(p) = doc.event_parent(cur) {
                path.push(p);
                cur = p;
            }
            path
        };

        let mut event = Event::new(kind, target);
        let mut invoked = 0;
        for node in path {
            event.current_target = node;
            // handlers may add or remove listeners
            let handlers = self.listeners.borrow().handlers(node, kind);
            for h in handlers {
                h(&event);
                invoked += 1;
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        log::trace!("dispatched {kind} at {target:?}: {invoked} handler(s)");
        Ok(invoked)
    }

    pub fn click(&self, target: NodeId) -> Result<usize, DomError> {
        self.dispatch(target, EventType::Click)
    }
}
