use crate::node::{Document, NodeId};

/// Static markup description, cloned into live nodes by
/// [`Template::instantiate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<TemplateNode>,
    },
    Text(String),
    /// Empty comment used as an insertion anchor (`<!---->`).
    Anchor,
}

impl TemplateNode {
    pub fn element(tag: impl Into<String>) -> Self {
        TemplateNode::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(data: impl Into<String>) -> Self {
        TemplateNode::Text(data.into())
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let TemplateNode::Element { attrs, .. } = &mut self {
            attrs.push((name.into(), value.into()));
        }
        self
    }

    pub fn child(mut self, node: TemplateNode) -> Self {
        if let TemplateNode::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    fn build(&self, doc: &mut Document) -> NodeId {
        match self {
            TemplateNode::Element {
                tag,
                attrs,
                children,
            } => {
                let el = doc.create_element(tag.clone());
                for (k, v) in attrs {
                    // freshly created element, cannot fail
                    let _ = doc.set_attribute(el, k, v.clone());
                }
                for c in children {
                    let child = c.build(doc);
                    let _ = doc.append_child(el, child);
                }
                el
            }
            TemplateNode::Text(s) => doc.create_text(s.clone()),
            TemplateNode::Anchor => doc.create_comment(""),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Template {
    roots: Vec<TemplateNode>,
}

impl Template {
    pub fn new(roots: Vec<TemplateNode>) -> Self {
        Self { roots }
    }

    /// Builds a fresh, detached fragment holding one copy of the template.
    pub fn instantiate(&self, doc: &mut Document) -> NodeId {
        let frag = doc.create_fragment();
        for root in &self.roots {
            let node = root.build(doc);
            let _ = doc.append_child(frag, node);
        }
        frag
    }
}
