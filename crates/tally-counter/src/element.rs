//! Custom element plumbing: a registry of element definitions, upgrade of
//! host elements into shadow-rooted instances, and forwarding of observed
//! attribute changes to the instance.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use tally_core::Runtime;
use tally_dom::{Dom, NodeId};

use crate::config::{CounterConfig, DEFAULT_VARIANT};
use crate::counter::Counter;
use crate::error::{RegistryError, VariantError};

const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Whether `name` may be used as a custom element tag.
pub fn is_valid_custom_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_lowercase()
        && name.contains('-')
        && chars.all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_')
        })
        && !RESERVED_NAMES.contains(&name)
}

/// What an upgraded element gets to work with.
#[derive(Debug)]
pub struct ElementContext<'a> {
    pub runtime: &'a Runtime,
    pub dom: &'a Dom,
    pub host: NodeId,
    pub shadow_root: NodeId,
}

pub trait CustomElement: Any {
    /// Attributes whose changes reach [`attribute_changed`](Self::attribute_changed).
    fn observed_attributes(&self) -> &'static [&'static str] {
        &[]
    }

    fn connected(&mut self, ctx: &ElementContext<'_>) -> Result<(), RegistryError>;

    fn disconnected(&mut self) {}

    fn attribute_changed(&mut self, _name: &str, _old: Option<&str>, _new: Option<&str>) {}

    fn as_any(&self) -> &dyn Any;
}

type Constructor = Rc<dyn Fn() -> Box<dyn CustomElement>>;

pub struct Registry {
    rt: Runtime,
    dom: Dom,
    definitions: HashMap<String, Constructor>,
    instances: HashMap<NodeId, Box<dyn CustomElement>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.definitions.keys().collect();
        names.sort();
        f.debug_struct("Registry")
            .field("definitions", &names)
            .field("instances", &self.instances.len())
            .finish()
    }
}

impl Registry {
    pub fn new(rt: &Runtime, dom: &Dom) -> Self {
        Self {
            rt: rt.clone(),
            dom: dom.clone(),
            definitions: HashMap::new(),
            instances: HashMap::new(),
        }
    }

    pub fn define(
        &mut self,
        name: &str,
        constructor: impl Fn() -> Box<dyn CustomElement> + 'static,
    ) -> Result<(), RegistryError> {
        if !is_valid_custom_element_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.definitions.contains_key(name) {
            return Err(RegistryError::AlreadyDefined(name.to_string()));
        }
        self.definitions
            .insert(name.to_string(), Rc::new(constructor));
        log::debug!("defined <{name}>");
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Turns `host` into a live instance of its tag's definition: constructs
    /// it, replays the observed attributes the host already carries, attaches
    /// an open shadow root and connects it. Upgrading twice is a no-op; if
    /// connecting fails the shadow root is detached again so a later upgrade
    /// can retry.
    pub fn upgrade(&mut self, host: NodeId) -> Result<(), RegistryError> {
        if self.instances.contains_key(&host) {
            return Ok(());
        }
        let (tag, attrs) = {
            let doc = self.dom.borrow();
            doc.kind(host)?;
            let tag = doc
                .tag(host)
                .ok_or(tally_dom::DomError::WrongKind {
                    node: host,
                    expected: "an element",
                })?
                .to_string();
            (tag, doc.attributes(host).to_vec())
        };
        let constructor = self
            .definitions
            .get(&tag)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownElement(tag.clone()))?;

        let mut instance = constructor();
        let observed = instance.observed_attributes();
        for (name, value) in &attrs {
            if observed.contains(&name.as_str()) {
                instance.attribute_changed(name, None, Some(value.as_str()));
            }
        }
        let shadow_root = self.dom.borrow_mut().attach_shadow(host)?;
        let connected = instance.connected(&ElementContext {
            runtime: &self.rt,
            dom: &self.dom,
            host,
            shadow_root,
        });
        if let Err(e) = connected {
            if let Err(detach) = self.dom.detach_shadow(host) {
                log::warn!("upgrade of <{tag}> failed, shadow root left behind: {detach}");
            }
            return Err(e);
        }
        self.instances.insert(host, instance);
        log::debug!("upgraded <{tag}> {host:?}");
        Ok(())
    }

    /// Creates `<tag>` under `parent` and upgrades it.
    pub fn create(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, RegistryError> {
        let host = {
            let mut doc = self.dom.borrow_mut();
            let host = doc.create_element(tag);
            doc.append_child(parent, host)?;
            host
        };
        self.upgrade(host)?;
        Ok(host)
    }

    /// Sets an attribute on `host` and forwards observed changes.
    pub fn set_attribute(
        &mut self,
        host: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), RegistryError> {
        let old = {
            let mut doc = self.dom.borrow_mut();
            let old = doc.attribute(host, name).map(str::to_string);
            doc.set_attribute(host, name, value)?;
            old
        };
        self.forward(host, name, old.as_deref(), Some(value));
        Ok(())
    }

    pub fn remove_attribute(&mut self, host: NodeId, name: &str) -> Result<(), RegistryError> {
        let old = {
            let mut doc = self.dom.borrow_mut();
            let old = doc.attribute(host, name).map(str::to_string);
            doc.remove_attribute(host, name)?;
            old
        };
        if old.is_some() {
            self.forward(host, name, old.as_deref(), None);
        }
        Ok(())
    }

    fn forward(&mut self, host: NodeId, name: &str, old: Option<&str>, new: Option<&str>) {
        if let Some(instance) = self.instances.get_mut(&host)
            && instance.observed_attributes().contains(&name)
        {
            instance.attribute_changed(name, old, new);
        }
    }

    /// Disconnects every instance in the subtree of `node` (innermost
    /// first), then removes the subtree from the document. Removing an
    /// already removed node is a no-op.
    ///
    /// Trees holding upgraded elements must go through here rather than
    /// [`Dom::remove`], which knows nothing about instances.
    pub fn remove(&mut self, node: NodeId) -> Result<(), RegistryError> {
        if node == self.dom.body() {
            return Err(tally_dom::DomError::WrongKind {
                node,
                expected: "removable (the body is permanent)",
            }
            .into());
        }
        let subtree = self.dom.borrow().inclusive_descendants(node);
        for id in subtree.iter().rev() {
            if let Some(mut instance) = self.instances.remove(id) {
                instance.disconnected();
                log::debug!("disconnected {id:?}");
            }
        }
        if self.dom.borrow().contains(node) {
            self.dom.remove(node)?;
        }
        Ok(())
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get<T: CustomElement>(&self, host: NodeId) -> Option<&T> {
        self.instances.get(&host)?.as_any().downcast_ref::<T>()
    }
}

/// [`Counter`] exposed as a custom element with an observed `type`
/// attribute.
#[derive(Debug)]
pub struct CounterElement {
    config: CounterConfig,
    counter: Option<Counter>,
}

impl CounterElement {
    pub fn new(config: CounterConfig) -> Self {
        Self {
            config,
            counter: None,
        }
    }

    pub fn counter(&self) -> Option<&Counter> {
        self.counter.as_ref()
    }

    /// `type` property getter.
    pub fn variant(&self) -> String {
        match &self.counter {
            Some(c) => c.variant(),
            None => self.config.default_variant.clone(),
        }
    }

    /// `type` property setter. Before connection the value becomes the
    /// initial one.
    pub fn set_variant(&mut self, value: &str) -> Result<(), VariantError> {
        match &self.counter {
            Some(c) => c.set_variant(value),
            None => {
                self.config.variant_mode.check(value)?;
                self.config.default_variant = value.to_string();
                Ok(())
            }
        }
    }
}

impl CustomElement for CounterElement {
    fn observed_attributes(&self) -> &'static [&'static str] {
        &["type"]
    }

    fn connected(&mut self, ctx: &ElementContext<'_>) -> Result<(), RegistryError> {
        if self.counter.is_none() {
            let counter = Counter::mount(ctx.runtime, ctx.dom, ctx.shadow_root, &self.config)?;
            self.counter = Some(counter);
        }
        Ok(())
    }

    fn disconnected(&mut self) {
        if let Some(c) = self.counter.take() {
            c.unmount();
        }
    }

    fn attribute_changed(&mut self, name: &str, _old: Option<&str>, new: Option<&str>) {
        if name != "type" {
            return;
        }
        if let Err(e) = self.set_variant(new.unwrap_or(DEFAULT_VARIANT)) {
            log::warn!("ignoring type attribute: {e}");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Registers [`CounterElement`] under `config.tag_name`.
pub fn define_counter(registry: &mut Registry, config: CounterConfig) -> Result<(), RegistryError> {
    let tag = config.tag_name.clone();
    registry.define(&tag, move || {
        Box::new(CounterElement::new(config.clone())) as Box<dyn CustomElement>
    })
}
