//! Binding targets: keep a text node or a class attribute in sync with a
//! producer, patching only when the produced string differs from what the
//! node currently holds.

use tally_core::{EffectHandle, Scope};

use crate::dom::Dom;
use crate::error::DomError;
use crate::node::{Document, NodeId};

/// Replaces the data of a text node if it differs from `value`. Returns
/// whether the node was mutated.
pub fn set_text(doc: &mut Document, node: NodeId, value: &str) -> Result<bool, DomError> {
    let unchanged = match doc.text(node) {
        Some(current) => current == value,
        None if doc.contains(node) => {
            return Err(DomError::WrongKind {
                node,
                expected: "a text node",
            });
        }
        None => return Err(DomError::StaleNode(node)),
    };
    if unchanged {
        return Ok(false);
    }
    doc.set_text_data(node, value)?;
    Ok(true)
}

/// Replaces the whole `class` attribute if it differs from `value`.
pub fn set_class(doc: &mut Document, element: NodeId, value: &str) -> Result<bool, DomError> {
    if doc.attribute(element, "class") == Some(value) {
        return Ok(false);
    }
    doc.set_attribute(element, "class", value)?;
    Ok(true)
}

/// Which part of a node a binding writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Text,
    Class,
}

impl Target {
    pub fn patch(self, doc: &mut Document, node: NodeId, value: &str) -> Result<bool, DomError> {
        match self {
            Target::Text => set_text(doc, node, value),
            Target::Class => set_class(doc, node, value),
        }
    }

    /// Applies one producer output. A node that vanished is logged, never
    /// fatal. Returns whether the node was mutated.
    pub fn apply(self, dom: &Dom, node: NodeId, value: &str) -> bool {
        match self.patch(&mut dom.borrow_mut(), node, value) {
            Ok(true) => {
                log::trace!("patched {self:?} of {node:?} -> {value:?}");
                true
            }
            Ok(false) => false,
            Err(e) => {
                log::warn!("{self:?} binding skipped: {e}");
                false
            }
        }
    }
}

/// Creates an effect in `scope` that writes `producer()` into the text node.
pub fn bind_text(
    scope: &Scope,
    dom: &Dom,
    node: NodeId,
    producer: impl Fn() -> String + 'static,
) -> EffectHandle {
    let dom = dom.clone();
    scope.create_effect(move || {
        let value = producer();
        Target::Text.apply(&dom, node, &value);
    })
}

/// Creates an effect in `scope` that writes `producer()` into the element's
/// `class` attribute.
pub fn bind_class(
    scope: &Scope,
    dom: &Dom,
    element: NodeId,
    producer: impl Fn() -> String + 'static,
) -> EffectHandle {
    let dom = dom.clone();
    scope.create_effect(move || {
        let value = producer();
        Target::Class.apply(&dom, element, &value);
    })
}
