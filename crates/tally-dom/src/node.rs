//! Arena-backed document tree.
//!
//! Nodes live in a `SlotMap`; a `NodeId` stays valid until the node (or an
//! ancestor) is removed, after which every operation on it reports
//! [`DomError::StaleNode`]. All changes are appended to a mutation log in the
//! spirit of `MutationObserver`.

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::error::DomError;

new_key_type! {
    pub struct NodeId;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    Fragment,
    ShadowRoot {
        host: NodeId,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList { target: NodeId },
    Attributes { target: NodeId, name: String },
    CharacterData { target: NodeId },
}

impl MutationRecord {
    pub fn target(&self) -> NodeId {
        match self {
            MutationRecord::ChildList { target }
            | MutationRecord::Attributes { target, .. }
            | MutationRecord::CharacterData { target } => *target,
        }
    }
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    shadow: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: SmallVec::new(),
            shadow: None,
        }
    }
}

#[derive(Debug)]
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    body: NodeId,
    // off unless observed; nothing drains the log on its own
    observing: bool,
    mutations: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(NodeData::new(NodeKind::Element {
            tag: "body".into(),
            attrs: Vec::new(),
        }));
        Self {
            nodes,
            body,
            observing: false,
            mutations: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.nodes.insert(NodeData::new(NodeKind::Element {
            tag: tag.into(),
            attrs: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.nodes.insert(NodeData::new(NodeKind::Text(data.into())))
    }

    pub fn create_comment(&mut self, data: impl Into<String>) -> NodeId {
        self.nodes
            .insert(NodeData::new(NodeKind::Comment(data.into())))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.nodes.insert(NodeData::new(NodeKind::Fragment))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn data(&self, node: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(node).ok_or(DomError::StaleNode(node))
    }

    fn data_mut(&mut self, node: NodeId) -> Result<&mut NodeData, DomError> {
        self.nodes.get_mut(node).ok_or(DomError::StaleNode(node))
    }

    pub fn kind(&self, node: NodeId) -> Result<&NodeKind, DomError> {
        Ok(&self.data(node)?.kind)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|d| d.children.as_slice())
            .unwrap_or_default()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|c| *c == node)?;
        siblings.get(idx + 1).copied()
    }

    /// Parent for event propagation: shadow roots hand off to their host.
    pub fn event_parent(&self, node: NodeId) -> Option<NodeId> {
        let data = self.nodes.get(node)?;
        match data.kind {
            NodeKind::ShadowRoot { host } => Some(host),
            _ => data.parent,
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.event_parent(node) {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|d| d.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != node);
        }
        self.record(MutationRecord::ChildList { target: parent });
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` before `reference` (or at the end). Inserting a
    /// fragment moves its children and leaves the fragment empty.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.data(parent)?;
        let child_kind = &self.data(child)?.kind;
        if matches!(child_kind, NodeKind::ShadowRoot { .. }) {
            return Err(DomError::WrongKind {
                node: child,
                expected: "insertable (shadow roots cannot be moved)",
            });
        }
        let is_fragment = matches!(child_kind, NodeKind::Fragment);
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(r) = reference
            && self.parent(r) != Some(parent)
        {
            return Err(DomError::NotAChild {
                parent,
                reference: r,
            });
        }
        // inserting a node before itself keeps it in place
        let reference = if reference == Some(child) {
            self.next_sibling(child)
        } else {
            reference
        };

        let moved: SmallVec<[NodeId; 4]> = if is_fragment {
            let kids = std::mem::take(&mut self.data_mut(child)?.children);
            for k in &kids {
                if let Some(d) = self.nodes.get_mut(*k) {
                    d.parent = None;
                }
            }
            if !kids.is_empty() {
                self.record(MutationRecord::ChildList { target: child });
            }
            kids
        } else {
            self.detach(child);
            smallvec::smallvec![child]
        };

        if moved.is_empty() {
            return Ok(());
        }
        for k in &moved {
            if let Some(d) = self.nodes.get_mut(*k) {
                d.parent = Some(parent);
            }
        }
        let parent_data = self.data_mut(parent)?;
        let at = reference
            .and_then(|r| parent_data.children.iter().position(|c| *c == r))
            .unwrap_or(parent_data.children.len());
        parent_data.children.insert_many(at, moved);
        self.record(MutationRecord::ChildList { target: parent });
        Ok(())
    }

    /// Detaches `node` and frees it together with its subtree and shadow
    /// root. Returns every freed id.
    pub fn remove(&mut self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        self.data(node)?;
        if node == self.body {
            return Err(DomError::WrongKind {
                node,
                expected: "removable (the body is permanent)",
            });
        }
        self.detach(node);
        Ok(self.free_subtree(node))
    }

    fn free_subtree(&mut self, node: NodeId) -> Vec<NodeId> {
        let mut freed = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(data) = self.nodes.remove(n) {
                stack.extend(data.children);
                stack.extend(data.shadow);
                freed.push(n);
            }
        }
        freed
    }

    /// `node` and everything below it, shadow trees included, each node
    /// before its descendants. These are the ids [`remove`](Self::remove)
    /// would free.
    pub fn inclusive_descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let Some(data) = self.nodes.get(n) else {
                continue;
            };
            out.push(n);
            stack.extend(data.children.iter().rev().copied());
            stack.extend(data.shadow);
        }
        out
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        match self.nodes.get(node).map(|d| &d.kind) {
            Some(NodeKind::Element { attrs, .. }) => attrs.as_slice(),
            _ => &[],
        }
    }

    fn attrs_mut(&mut self, node: NodeId) -> Result<&mut Vec<(String, String)>, DomError> {
        match &mut self.data_mut(node)?.kind {
            NodeKind::Element { attrs, .. } => Ok(attrs),
            _ => Err(DomError::WrongKind {
                node,
                expected: "an element",
            }),
        }
    }

    /// Always records a mutation, even when the value is unchanged.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        let value = value.into();
        let attrs = self.attrs_mut(node)?;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => attrs.push((name.to_string(), value)),
        }
        self.record(MutationRecord::Attributes {
            target: node,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool, DomError> {
        let attrs = self.attrs_mut(node)?;
        let before = attrs.len();
        attrs.retain(|(k, _)| k != name);
        let removed = attrs.len() != before;
        if removed {
            self.record(MutationRecord::Attributes {
                target: node,
                name: name.to_string(),
            });
        }
        Ok(removed)
    }

    /// Data of a text or comment node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Text(s) | NodeKind::Comment(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn set_text_data(&mut self, node: NodeId, data: impl Into<String>) -> Result<(), DomError> {
        match &mut self.data_mut(node)?.kind {
            NodeKind::Text(s) | NodeKind::Comment(s) => *s = data.into(),
            _ => {
                return Err(DomError::WrongKind {
                    node,
                    expected: "character data",
                });
            }
        }
        self.record(MutationRecord::CharacterData { target: node });
        Ok(())
    }

    /// Concatenated text of all descendant text nodes (shadow trees excluded).
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(s) => out.push_str(s),
            NodeKind::Comment(_) => {}
            _ => {
                for c in &data.children {
                    self.collect_text(*c, out);
                }
            }
        }
    }

    pub fn attach_shadow(&mut self, host: NodeId) -> Result<NodeId, DomError> {
        let data = self.data(host)?;
        if !matches!(data.kind, NodeKind::Element { .. }) {
            return Err(DomError::WrongKind {
                node: host,
                expected: "an element",
            });
        }
        if data.shadow.is_some() {
            return Err(DomError::ShadowRootExists(host));
        }
        let root = self.nodes.insert(NodeData::new(NodeKind::ShadowRoot { host }));
        self.data_mut(host)?.shadow = Some(root);
        Ok(root)
    }

    /// Detaches and frees the shadow root of `host`. Returns the freed ids,
    /// empty when the host had no shadow root.
    pub fn detach_shadow(&mut self, host: NodeId) -> Result<Vec<NodeId>, DomError> {
        let root = self.data_mut(host)?.shadow.take();
        Ok(root.map(|r| self.free_subtree(r)).unwrap_or_default())
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.nodes.get(host)?.shadow
    }

    pub fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        match self.nodes.get(root)?.kind {
            NodeKind::ShadowRoot { host } => Some(host),
            _ => None,
        }
    }

    /// The shadow root `node` lives in, if any.
    pub fn containing_shadow_root(&self, mut node: NodeId) -> Option<NodeId> {
        loop {
            let data = self.nodes.get(node)?;
            if let NodeKind::ShadowRoot { .. } = data.kind {
                return Some(node);
            }
            node = data.parent?;
        }
    }

    /// Light-DOM children of the host projected into `slot`.
    ///
    /// A `<slot>` without a `name` takes every host child that has no `slot`
    /// attribute; a named slot takes children whose `slot` attribute matches.
    pub fn assigned_nodes(&self, slot: NodeId) -> Vec<NodeId> {
        if self.tag(slot) != Some("slot") {
            return Vec::new();
        }
        let Some(host) = self
            .containing_shadow_root(slot)
            .and_then(|r| self.shadow_host(r))
        else {
            return Vec::new();
        };
        let name = self.attribute(slot, "name");
        self.children(host)
            .iter()
            .copied()
            .filter(|c| self.attribute(*c, "slot") == name)
            .collect()
    }

    /// Turns the mutation log on or off. Off by default; turning it off
    /// also clears it.
    pub fn observe_mutations(&mut self, on: bool) {
        self.observing = on;
        if !on {
            self.mutations.clear();
        }
    }

    pub fn is_observing_mutations(&self) -> bool {
        self.observing
    }

    fn record(&mut self, record: MutationRecord) {
        if self.observing {
            self.mutations.push(record);
        }
    }

    pub fn mutations(&self) -> &[MutationRecord] {
        &self.mutations
    }

    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(doc: &mut Document) -> (NodeId, NodeId, NodeId) {
        let ul = doc.create_element("ul");
        let a = doc.create_element("li");
        let b = doc.create_element("li");
        doc.append_child(ul, a).unwrap();
        doc.append_child(ul, b).unwrap();
        (ul, a, b)
    }

    #[test]
    fn test_append_and_siblings() {
        let mut doc = Document::new();
        let (ul, a, b) = list(&mut doc);
        assert_eq!(doc.children(ul), &[a, b]);
        assert_eq!(doc.first_child(ul), Some(a));
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.next_sibling(b), None);
        assert_eq!(doc.parent(b), Some(ul));
    }

    #[test]
    fn test_insert_before_reference() {
        let mut doc = Document::new();
        let (ul, a, b) = list(&mut doc);
        let c = doc.create_element("li");
        doc.insert_before(ul, c, Some(b)).unwrap();
        assert_eq!(doc.children(ul), &[a, c, b]);

        let stray = doc.create_element("li");
        assert_eq!(
            doc.insert_before(ul, c, Some(stray)),
            Err(DomError::NotAChild {
                parent: ul,
                reference: stray
            })
        );
    }

    #[test]
    fn test_append_moves_between_parents() {
        let mut doc = Document::new();
        let (ul, a, b) = list(&mut doc);
        let ol = doc.create_element("ol");
        doc.append_child(ol, a).unwrap();
        assert_eq!(doc.children(ul), &[b]);
        assert_eq!(doc.children(ol), &[a]);
        assert_eq!(doc.parent(a), Some(ol));
    }

    #[test]
    fn test_fragment_children_are_moved() {
        let mut doc = Document::new();
        let frag = doc.create_fragment();
        let x = doc.create_text("x");
        let y = doc.create_text("y");
        doc.append_child(frag, x).unwrap();
        doc.append_child(frag, y).unwrap();

        let div = doc.create_element("div");
        doc.append_child(div, frag).unwrap();
        assert_eq!(doc.children(div), &[x, y]);
        assert!(doc.children(frag).is_empty());
        assert_eq!(doc.text_content(div), "xy");
    }

    #[test]
    fn test_cannot_insert_into_own_subtree() {
        let mut doc = Document::new();
        let (ul, a, _) = list(&mut doc);
        assert_eq!(
            doc.append_child(a, ul),
            Err(DomError::HierarchyRequest {
                parent: a,
                child: ul
            })
        );
        assert_eq!(
            doc.append_child(ul, ul),
            Err(DomError::HierarchyRequest {
                parent: ul,
                child: ul
            })
        );
    }

    #[test]
    fn test_remove_frees_subtree() {
        let mut doc = Document::new();
        let body = doc.body();
        let (ul, a, b) = list(&mut doc);
        doc.append_child(body, ul).unwrap();
        let before = doc.len();

        let mut freed = doc.remove(ul).unwrap();
        freed.sort();
        let mut expected = vec![ul, a, b];
        expected.sort();
        assert_eq!(freed, expected);
        assert_eq!(doc.len(), before - 3);
        assert!(doc.children(body).is_empty());
        assert_eq!(
            doc.set_attribute(a, "x", "1"),
            Err(DomError::StaleNode(a))
        );
        assert_eq!(doc.remove(ul), Err(DomError::StaleNode(ul)));
    }

    #[test]
    fn test_body_cannot_be_removed() {
        let mut doc = Document::new();
        let body = doc.body();
        assert!(matches!(
            doc.remove(body),
            Err(DomError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_attributes_record_mutations() {
        let mut doc = Document::new();
        doc.observe_mutations(true);
        let el = doc.create_element("button");
        doc.set_attribute(el, "class", "a").unwrap();
        doc.set_attribute(el, "class", "a").unwrap();
        assert_eq!(doc.attribute(el, "class"), Some("a"));
        assert_eq!(doc.take_mutations().len(), 2);

        assert!(!doc.remove_attribute(el, "id").unwrap());
        assert!(doc.remove_attribute(el, "class").unwrap());
        assert_eq!(
            doc.take_mutations(),
            vec![MutationRecord::Attributes {
                target: el,
                name: "class".into()
            }]
        );

        let t = doc.create_text("t");
        assert!(matches!(
            doc.set_attribute(t, "class", "a"),
            Err(DomError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_shadow_root_and_slot_assignment() {
        let mut doc = Document::new();
        let host = doc.create_element("x-card");
        let plain = doc.create_text("plain");
        let titled = doc.create_element("h1");
        doc.set_attribute(titled, "slot", "title").unwrap();
        doc.append_child(host, plain).unwrap();
        doc.append_child(host, titled).unwrap();

        let root = doc.attach_shadow(host).unwrap();
        assert_eq!(doc.shadow_root(host), Some(root));
        assert_eq!(doc.shadow_host(root), Some(host));
        assert_eq!(doc.attach_shadow(host), Err(DomError::ShadowRootExists(host)));

        let default_slot = doc.create_element("slot");
        let title_slot = doc.create_element("slot");
        doc.set_attribute(title_slot, "name", "title").unwrap();
        doc.append_child(root, default_slot).unwrap();
        doc.append_child(root, title_slot).unwrap();

        assert_eq!(doc.assigned_nodes(default_slot), vec![plain]);
        assert_eq!(doc.assigned_nodes(title_slot), vec![titled]);
        assert_eq!(doc.containing_shadow_root(default_slot), Some(root));
        // light children stay with the host
        assert_eq!(doc.parent(plain), Some(host));
    }

    #[test]
    fn test_removing_host_frees_shadow_tree() {
        let mut doc = Document::new();
        let host = doc.create_element("x-card");
        let root = doc.attach_shadow(host).unwrap();
        let inner = doc.create_element("span");
        doc.append_child(root, inner).unwrap();

        doc.remove(host).unwrap();
        assert!(!doc.contains(root));
        assert!(!doc.contains(inner));
    }

    #[test]
    fn test_insert_before_itself_keeps_position() {
        let mut doc = Document::new();
        let (ul, a, b) = list(&mut doc);
        doc.insert_before(ul, a, Some(a)).unwrap();
        assert_eq!(doc.children(ul), &[a, b]);
        doc.insert_before(ul, b, Some(b)).unwrap();
        assert_eq!(doc.children(ul), &[a, b]);
        assert_eq!(doc.parent(a), Some(ul));
    }

    #[test]
    fn test_mutation_log_is_opt_in() {
        let mut doc = Document::new();
        let body = doc.body();
        let el = doc.create_element("p");
        doc.append_child(body, el).unwrap();
        doc.set_attribute(el, "class", "a").unwrap();
        assert!(!doc.is_observing_mutations());
        assert!(doc.mutations().is_empty());

        doc.observe_mutations(true);
        doc.set_attribute(el, "class", "b").unwrap();
        assert_eq!(doc.mutations().len(), 1);

        doc.observe_mutations(false);
        assert!(doc.mutations().is_empty());
        doc.set_attribute(el, "class", "c").unwrap();
        assert!(doc.mutations().is_empty());
    }

    #[test]
    fn test_detach_shadow_frees_shadow_tree() {
        let mut doc = Document::new();
        let host = doc.create_element("x-card");
        let light = doc.create_text("light");
        doc.append_child(host, light).unwrap();
        let root = doc.attach_shadow(host).unwrap();
        let inner = doc.create_element("span");
        doc.append_child(root, inner).unwrap();

        let mut freed = doc.detach_shadow(host).unwrap();
        freed.sort();
        let mut expected = vec![root, inner];
        expected.sort();
        assert_eq!(freed, expected);
        assert_eq!(doc.shadow_root(host), None);
        assert_eq!(doc.children(host), &[light]);
        assert!(doc.detach_shadow(host).unwrap().is_empty());

        // a fresh root can be attached again
        assert!(doc.attach_shadow(host).is_ok());
    }

    #[test]
    fn test_inclusive_descendants_cross_shadow_roots() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let host = doc.create_element("x-card");
        let light = doc.create_text("light");
        doc.append_child(div, host).unwrap();
        doc.append_child(host, light).unwrap();
        let root = doc.attach_shadow(host).unwrap();
        let inner = doc.create_element("span");
        doc.append_child(root, inner).unwrap();

        let mut seen = doc.inclusive_descendants(div);
        assert_eq!(seen[0], div);
        seen.sort();
        let mut freed = doc.remove(div).unwrap();
        freed.sort();
        assert_eq!(seen, freed);
        assert!(doc.inclusive_descendants(div).is_empty());
    }
}
