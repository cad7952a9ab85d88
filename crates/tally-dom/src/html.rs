//! HTML serialization. Shadow roots are written in declarative form
//! (`<template shadowrootmode="open">`) ahead of the host's light children.

use std::fmt::Write;

use crate::node::{Document, NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn escape_text(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

impl Document {
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_children(node, &mut out);
        out
    }

    fn write_children(&self, node: NodeId, out: &mut String) {
        for c in self.children(node) {
            self.write_node(*c, out);
        }
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let Ok(kind) = self.kind(node) else {
            return;
        };
        match kind {
            NodeKind::Text(s) => escape_text(s, out),
            NodeKind::Comment(s) => {
                let _ = write!(out, "<!--{s}-->");
            }
            NodeKind::Fragment | NodeKind::ShadowRoot { .. } => self.write_children(node, out),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    escape_attr(v, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                if let Some(root) = self.shadow_root(node) {
                    out.push_str("<template shadowrootmode=\"open\">");
                    self.write_children(root, out);
                    out.push_str("</template>");
                }
                self.write_children(node, out);
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::template::{Template, TemplateNode};

    use super::*;

    #[test]
    fn test_escaping() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_attribute(p, "title", "a \"b\" & c").unwrap();
        let t = doc.create_text("1 < 2 & 3 > 2");
        doc.append_child(p, t).unwrap();
        insta::assert_snapshot!(
            doc.outer_html(p),
            @r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3 &gt; 2</p>"#
        );
    }

    #[test]
    fn test_template_with_shadow_host() {
        let mut doc = Document::new();
        let host = doc.create_element("x-counter");
        let light = doc.create_text("light");
        doc.append_child(host, light).unwrap();
        let root = doc.attach_shadow(host).unwrap();

        let template = Template::new(vec![
            TemplateNode::element("button")
                .attr("type", "button")
                .child(TemplateNode::text(" ")),
            TemplateNode::text(" "),
            TemplateNode::element("slot"),
            TemplateNode::Anchor,
        ]);
        let frag = template.instantiate(&mut doc);
        doc.append_child(root, frag).unwrap();

        insta::assert_snapshot!(
            doc.outer_html(host),
            @r#"<x-counter><template shadowrootmode="open"><button type="button"> </button> <slot></slot><!----></template>light</x-counter>"#
        );
        assert_eq!(doc.inner_html(host), "light");
    }

    #[test]
    fn test_void_elements_have_no_end_tag() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let br = doc.create_element("br");
        doc.append_child(div, br).unwrap();
        assert_eq!(doc.outer_html(div), "<div><br></div>");
    }
}
