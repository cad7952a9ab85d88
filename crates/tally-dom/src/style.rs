use crate::error::DomError;
use crate::node::{Document, NodeId};

/// Component stylesheet whose selectors are already scoped by `hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stylesheet {
    pub hash: &'static str,
    pub code: &'static str,
}

impl Document {
    /// Appends `<style id="{hash}">` to `root` unless one is already there.
    /// Returns whether a style element was inserted.
    pub fn append_styles(&mut self, root: NodeId, sheet: &Stylesheet) -> Result<bool, DomError> {
        self.kind(root)?;
        let present = self
            .children(root)
            .iter()
            .any(|c| self.tag(*c) == Some("style") && self.attribute(*c, "id") == Some(sheet.hash));
        if present {
            return Ok(false);
        }
        let style = self.create_element("style");
        self.set_attribute(style, "id", sheet.hash)?;
        let text = self.create_text(sheet.code);
        self.append_child(style, text)?;
        self.append_child(root, style)?;
        Ok(true)
    }
}
