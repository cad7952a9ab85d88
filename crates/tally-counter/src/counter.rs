//! The counter component.
//!
//! Markup (inside the element's shadow root):
//!
//! ```html
//! <style id="tally-c0un7r">…</style>
//! <button class="btn-solid tally-c0un7r">count is 0</button> <slot></slot><!---->
//! ```
//!
//! One template effect owns both bindings: it reads the count and the `type`
//! property and patches the button's class and its text node in place.

use std::cell::Cell;

use tally_core::{Dispose, Runtime, Scope, Signal};
use tally_dom::{Dom, DomError, Event, EventType, NodeId, Stylesheet, Target, Template, TemplateNode};

use crate::config::{CounterConfig, DEFAULT_VARIANT};
use crate::error::VariantError;
use crate::variant::{Variant, VariantMode};

/// Class added to every element the component styles.
pub const SCOPE_CLASS: &str = "tally-c0un7r";

pub const STYLES: Stylesheet = Stylesheet {
    hash: SCOPE_CLASS,
    code: "button.tally-c0un7r {padding:10px;color:#fff;font-size:17px;border-radius:5px;border:1px solid #ccc;cursor:pointer;}\
.btn-solid.tally-c0un7r {background:#20c997;border-color:#4cae4c;}\
.btn-outline.tally-c0un7r {color:#20c997;background:transparent;border-color:#20c997;}",
};

/// `<button> </button> <!>`
pub fn template() -> Template {
    Template::new(vec![
        TemplateNode::element("button").child(TemplateNode::text(" ")),
        TemplateNode::text(" "),
        TemplateNode::Anchor,
    ])
}

/// Output of the binding function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub class: String,
    pub text: String,
}

/// The binding function: a pure mapping from state to the two bound strings.
pub fn render(count: u64, variant: &str) -> Rendered {
    Rendered {
        class: format!("{} {SCOPE_CLASS}", Variant::classify(variant).class_token()),
        text: format!("count is {count}"),
    }
}

/// Click handler. The counter saturates at `u64::MAX`.
pub fn increment(_event: &Event, count: &Signal<u64>) {
    count.set(count.get().saturating_add(1));
}

/// A mounted counter instance.
///
/// The instance owns its nodes from [`mount`](Counter::mount) until
/// [`unmount`](Counter::unmount); host content projected through the slot
/// stays owned by the host.
pub struct Counter {
    rt: Runtime,
    dom: Dom,
    scope: Scope,
    count: Signal<u64>,
    variant: Signal<String>,
    mode: VariantMode,
    button: NodeId,
    text: NodeId,
    slot: NodeId,
    nodes: Vec<NodeId>,
    mounted: Cell<bool>,
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("count", &self.count.get_untracked())
            .field("variant", &self.variant.get_untracked())
            .field("mounted", &self.mounted.get())
            .finish()
    }
}

impl Counter {
    /// Instantiates the template, wires the click handler and the template
    /// effect, and appends the result to `target`.
    pub fn mount(
        rt: &Runtime,
        dom: &Dom,
        target: NodeId,
        config: &CounterConfig,
    ) -> Result<Counter, DomError> {
        let scope = Scope::new(rt);
        let count = scope.create_signal(config.initial_count);
        let variant = scope.create_signal(config.default_variant.clone());

        let (frag, button, text, anchor) = {
            let mut doc = dom.borrow_mut();
            doc.kind(target)?;
            doc.append_styles(target, &STYLES)?;

            let frag = template().instantiate(&mut doc);
            let button = doc.first_child(frag).ok_or(DomError::WrongKind {
                node: frag,
                expected: "a fragment holding the button",
            })?;
            let text = doc.first_child(button).ok_or(DomError::WrongKind {
                node: button,
                expected: "a button holding a text node",
            })?;
            let anchor = doc
                .next_sibling(button)
                .and_then(|gap| doc.next_sibling(gap))
                .ok_or(DomError::WrongKind {
                    node: frag,
                    expected: "a fragment ending in the slot anchor",
                })?;
            (frag, button, text, anchor)
        };

        let listener = dom.add_event_listener(button, EventType::Click, {
            let count = count.clone();
            move |e| increment(e, &count)
        });
        scope.on_cleanup(listener);

        let slot = {
            let mut doc = dom.borrow_mut();
            let slot = doc.create_element("slot");
            doc.insert_before(frag, slot, Some(anchor))?;
            slot
        };

        scope.create_effect({
            let (count, variant, dom) = (count.clone(), variant.clone(), dom.clone());
            move || {
                let r = variant.with(|v| render(count.get(), v));
                Target::Class.apply(&dom, button, &r.class);
                Target::Text.apply(&dom, text, &r.text);
            }
        });

        let nodes = {
            let mut doc = dom.borrow_mut();
            let nodes = doc.children(frag).to_vec();
            doc.append_child(target, frag)?;
            doc.remove(frag)?;
            nodes
        };

        log::debug!(
            "mounted counter at {target:?} (count={}, type={:?})",
            config.initial_count,
            config.default_variant
        );

        Ok(Counter {
            rt: rt.clone(),
            dom: dom.clone(),
            scope,
            count,
            variant,
            mode: config.variant_mode,
            button,
            text,
            slot,
            nodes,
            mounted: Cell::new(true),
        })
    }

    /// Disposes the template effect and the click handler, then removes the
    /// component's nodes. Calling it again does nothing.
    pub fn unmount(&self) {
        if !self.mounted.replace(false) {
            return;
        }
        self.scope.dispose();
        for node in &self.nodes {
            if let Err(e) = self.dom.remove(*node) {
                log::warn!("counter unmount: {e}");
            }
        }
        log::debug!("unmounted counter (count={})", self.count.get_untracked());
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Current value of the `type` property.
    pub fn variant(&self) -> String {
        self.variant.get_untracked()
    }

    /// Sets the `type` property and flushes dependent effects before
    /// returning. In strict mode an unknown value is rejected and the
    /// property keeps its previous value.
    pub fn set_variant(&self, value: impl Into<String>) -> Result<(), VariantError> {
        let value = value.into();
        self.mode.check(&value)?;
        self.variant.set(value);
        self.rt.flush();
        Ok(())
    }

    /// Resets the `type` property to its default (`"solid"`).
    pub fn reset_variant(&self) {
        self.variant.set(DEFAULT_VARIANT.to_string());
        self.rt.flush();
    }

    pub fn count(&self) -> u64 {
        self.count.get_untracked()
    }

    /// Handle to the count cell, e.g. for writes from outside the component.
    pub fn count_signal(&self) -> Signal<u64> {
        self.count.clone()
    }

    pub fn button(&self) -> NodeId {
        self.button
    }

    pub fn text_node(&self) -> NodeId {
        self.text
    }

    pub fn slot(&self) -> NodeId {
        self.slot
    }

    /// Registers an extra cleanup that runs on unmount.
    pub fn on_unmount(&self, d: Dispose) {
        self.scope.on_cleanup(d);
    }
}
