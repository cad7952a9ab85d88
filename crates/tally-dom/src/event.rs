use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::node::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Input,
    Change,
    KeyDown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Input => "input",
            EventType::Change => "change",
            EventType::KeyDown => "keydown",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatched event. `current_target` changes as the event bubbles.
#[derive(Debug)]
pub struct Event {
    pub kind: EventType,
    pub target: NodeId,
    pub current_target: NodeId,
    stopped: Cell<bool>,
}

impl Event {
    pub(crate) fn new(kind: EventType, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            stopped: Cell::new(false),
        }
    }

    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.get()
    }
}

pub type Handler = Rc<dyn Fn(&Event)>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    map: HashMap<(NodeId, EventType), Vec<(u64, Handler)>>,
}

impl Listeners {
    pub(crate) fn add(&mut self, node: NodeId, kind: EventType, handler: Handler) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.map.entry((node, kind)).or_default().push((id, handler));
        id
    }

    pub(crate) fn remove(&mut self, node: NodeId, kind: EventType, id: u64) {
        if let Some(list) = self.map.get_mut(&(node, kind)) {
            list.retain(|(i, _)| *i != id);
            if list.is_empty() {
                self.map.remove(&(node, kind));
            }
        }
    }

    pub(crate) fn purge(&mut self, freed: &[NodeId]) {
        self.map.retain(|(node, _), _| !freed.contains(node));
    }

    pub(crate) fn handlers(&self, node: NodeId, kind: EventType) -> Vec<Handler> {
        self.map
            .get(&(node, kind))
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node: NodeId) -> usize {
        self.map
            .iter()
            .filter(|((n, _), _)| *n == node)
            .map(|(_, list)| list.len())
            .sum()
    }
}
