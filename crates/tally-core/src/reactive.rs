use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::effects::EffectHandle;
use crate::signal::Signal;

new_key_type! {
    pub struct SignalId;
    pub struct EffectId;
}

/// Rounds a single flush may take before it gives up on effects that keep
/// rescheduling themselves.
pub const MAX_FLUSH_ROUNDS: usize = 100;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EffectFlags: u8 {
        /// Member of the pending set.
        const SCHEDULED = 1 << 0;
        /// Currently executing its body.
        const RUNNING = 1 << 1;
    }
}

/// Host hook for arranging a flush at a point of the host's choosing.
///
/// Called once each time the pending set goes from empty to non-empty. The
/// host may call [`Runtime::flush`] right away or later (e.g. from a
/// microtask); writes between the request and the flush are coalesced.
pub trait HostScheduler {
    fn request_flush(&self);
}

impl<F: Fn()> HostScheduler for F {
    fn request_flush(&self) {
        self()
    }
}

type EffectFn = Rc<RefCell<dyn FnMut()>>;

struct EffectNode {
    f: EffectFn,
    // signals read during the last run
    deps: SmallVec<[SignalId; 4]>,
    flags: EffectFlags,
}

#[derive(Default)]
pub(crate) struct DepGraph {
    // signal -> effects that read it during their last run
    signals: SlotMap<SignalId, SmallVec<[EffectId; 4]>>,
    effects: SlotMap<EffectId, EffectNode>,
    pending: Vec<EffectId>,
    // `None` frames are untracked sections
    tracking: Vec<Option<EffectId>>,
    flushing: bool,
    host: Option<Rc<dyn HostScheduler>>,
}

impl DepGraph {
    fn remove_all_edges_for(&mut self, obs: EffectId) {
        let Some(node) = self.effects.get_mut(obs) else {
            return;
        };
        for sig in node.deps.drain(..) {
            if let Some(subs) = self.signals.get_mut(sig) {
                subs.retain(|e| *e != obs);
            }
        }
    }

    fn remove_effect(&mut self, obs: EffectId) -> bool {
        self.remove_all_edges_for(obs);
        if self.effects.remove(obs).is_none() {
            return false;
        }
        self.pending.retain(|e| *e != obs);
        true
    }

    fn remove_signal(&mut self, sig: SignalId) {
        let Some(subs) = self.signals.remove(sig) else {
            return;
        };
        for obs in subs {
            if let Some(node) = self.effects.get_mut(obs) {
                node.deps.retain(|s| *s != sig);
            }
        }
    }

    /// Enqueues every subscriber of `sig`. Returns true when the pending set
    /// went from empty to non-empty.
    fn schedule_subscribers(&mut self, sig: SignalId) -> bool {
        let was_empty = self.pending.is_empty();
        let Some(subs) = self.signals.get(sig) else {
            return false;
        };
        for obs in subs.clone() {
            if let Some(node) = self.effects.get_mut(obs)
                && !node.flags.contains(EffectFlags::SCHEDULED)
            {
                node.flags.insert(EffectFlags::SCHEDULED);
                self.pending.push(obs);
            }
        }
        was_empty && !self.pending.is_empty()
    }
}

/// Owner of the dependency graph and the pending-effect set.
///
/// A `Runtime` is a cheap handle; clones share the same graph. Every signal
/// and effect belongs to exactly one runtime and nothing here is global, so
/// independent runtimes (one per test, one per page) never observe each other.
#[derive(Clone, Default)]
pub struct Runtime {
    graph: Rc<RefCell<DepGraph>>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let g = self.graph.borrow();
        f.debug_struct("Runtime")
            .field("signals", &g.signals.len())
            .field("effects", &g.effects.len())
            .field("pending", &g.pending.len())
            .finish()
    }
}

#[derive(Clone, Default)]
pub(crate) struct WeakRuntime(Weak<RefCell<DepGraph>>);

impl WeakRuntime {
    pub(crate) fn upgrade(&self) -> Option<Runtime> {
        self.0.upgrade().map(|graph| Runtime { graph })
    }
}

/// Pops the tracking frame pushed by [`Runtime::with_observer`], also on unwind.
struct TrackingGuard<'a> {
    graph: &'a RefCell<DepGraph>,
}

impl Drop for TrackingGuard<'_> {
    fn drop(&mut self) {
        self.graph.borrow_mut().tracking.pop();
    }
}

struct FlushingGuard<'a> {
    graph: &'a RefCell<DepGraph>,
}

impl Drop for FlushingGuard<'_> {
    fn drop(&mut self) {
        self.graph.borrow_mut().flushing = false;
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn downgrade(&self) -> WeakRuntime {
        WeakRuntime(Rc::downgrade(&self.graph))
    }

    pub fn create_signal<T: 'static>(&self, value: T) -> Signal<T> {
        let id = self.graph.borrow_mut().signals.insert(SmallVec::new());
        Signal::from_parts(id, self.downgrade(), value)
    }

    /// Registers `f` as an effect and runs it once, immediately, under
    /// tracking. Later runs happen on [`flush`](Self::flush) after any signal
    /// read during the previous run is written.
    pub fn create_effect(&self, f: impl FnMut() + 'static) -> EffectHandle {
        let id = self.graph.borrow_mut().effects.insert(EffectNode {
            f: Rc::new(RefCell::new(f)),
            deps: SmallVec::new(),
            flags: EffectFlags::empty(),
        });
        self.run_effect(id);
        EffectHandle::new(id, self.downgrade())
    }

    /// Removes the effect and all of its dependency edges. Returns false if
    /// it was already gone.
    pub fn dispose_effect(&self, id: EffectId) -> bool {
        self.graph.borrow_mut().remove_effect(id)
    }

    pub(crate) fn dispose_signal(&self, id: SignalId) {
        self.graph.borrow_mut().remove_signal(id);
    }

    pub fn set_host_scheduler(&self, host: impl HostScheduler + 'static) {
        self.graph.borrow_mut().host = Some(Rc::new(host));
    }

    pub fn clear_host_scheduler(&self) {
        self.graph.borrow_mut().host = None;
    }

    /// Runs `f` with tracking suspended; signal reads inside subscribe nothing.
    pub fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        self.with_observer(None, f)
    }

    fn with_observer<R>(&self, obs: Option<EffectId>, f: impl FnOnce() -> R) -> R {
        self.graph.borrow_mut().tracking.push(obs);
        let _guard = TrackingGuard { graph: &self.graph };
        f()
    }

    pub(crate) fn register_signal_read(&self, sig: SignalId) {
        let mut g = self.graph.borrow_mut();
        let Some(Some(obs)) = g.tracking.last().copied() else {
            return;
        };
        if !g.effects.contains_key(obs) {
            return;
        }
        let Some(subs) = g.signals.get_mut(sig) else {
            return;
        };
        if !subs.contains(&obs) {
            subs.push(obs);
        }
        if let Some(node) = g.effects.get_mut(obs)
            && !node.deps.contains(&sig)
        {
            node.deps.push(sig);
        }
    }

    pub(crate) fn signal_changed(&self, sig: SignalId) {
        let host = {
            let mut g = self.graph.borrow_mut();
            let became_pending = g.schedule_subscribers(sig);
            if became_pending && !g.flushing {
                g.host.clone()
            } else {
                None
            }
        };
        if let Some(host) = host {
            host.request_flush();
        }
    }

    fn run_effect(&self, id: EffectId) {
        let f = {
            let mut g = self.graph.borrow_mut();
            match g.effects.get(id) {
                Some(node) if !node.flags.contains(EffectFlags::RUNNING) => {}
                _ => return,
            }
            // clear previous deps before recompute
            g.remove_all_edges_for(id);
            let Some(node) = g.effects.get_mut(id) else {
                return;
            };
            node.flags.remove(EffectFlags::SCHEDULED);
            node.flags.insert(EffectFlags::RUNNING);
            node.f.clone()
        };

        self.with_observer(Some(id), || (&mut *f.borrow_mut())());

        if let Some(node) = self.graph.borrow_mut().effects.get_mut(id) {
            node.flags.remove(EffectFlags::RUNNING);
        }
    }

    /// Runs every pending effect synchronously before returning.
    ///
    /// Each effect runs at most once per round no matter how many writes
    /// scheduled it. Effects scheduled while the flush is in progress run in
    /// a later round of the same flush. Calling `flush` from inside a flush
    /// returns immediately; the outer flush drains the queue.
    pub fn flush(&self) {
        {
            let mut g = self.graph.borrow_mut();
            if g.flushing || g.pending.is_empty() {
                return;
            }
            g.flushing = true;
        }
        let _flushing = FlushingGuard { graph: &self.graph };

        for round in 0..MAX_FLUSH_ROUNDS {
            let batch = std::mem::take(&mut self.graph.borrow_mut().pending);
            if batch.is_empty() {
                return;
            }
            log::trace!("flush round {round}: {} effect(s)", batch.len());
            for id in batch {
                self.run_effect(id);
            }
        }

        let mut g = self.graph.borrow_mut();
        log::error!(
            "flush gave up after {MAX_FLUSH_ROUNDS} rounds; {} effect(s) keep rescheduling themselves",
            g.pending.len()
        );
        for id in std::mem::take(&mut g.pending) {
            if let Some(node) = g.effects.get_mut(id) {
                node.flags.remove(EffectFlags::SCHEDULED);
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.graph.borrow().pending.len()
    }

    pub fn effect_count(&self) -> usize {
        self.graph.borrow().effects.len()
    }

    pub fn signal_count(&self) -> usize {
        self.graph.borrow().signals.len()
    }

    pub fn subscriber_count(&self, sig: SignalId) -> usize {
        self.graph
            .borrow()
            .signals
            .get(sig)
            .map_or(0, |subs| subs.len())
    }

    pub fn dependency_count(&self, id: EffectId) -> usize {
        self.graph
            .borrow()
            .effects
            .get(id)
            .map_or(0, |node| node.deps.len())
    }

    pub fn is_effect_alive(&self, id: EffectId) -> bool {
        self.graph.borrow().effects.contains_key(id)
    }
}
