//! # Documents, Events, and Binding Targets
//!
//! `tally-dom` is the rendering surface for Tally components: a small
//! in-memory document with just enough of the DOM to mount a component,
//! project host content through a `<slot>`, dispatch events and observe
//! mutations.
//!
//! ```rust
//! use tally_core::*;
//! use tally_dom::*;
//!
//! let rt = Runtime::new();
//! let scope = Scope::new(&rt);
//! let dom = Dom::new();
//!
//! let text = {
//!     let mut doc = dom.borrow_mut();
//!     let p = doc.create_element("p");
//!     let text = doc.create_text("");
//!     doc.append_child(p, text).unwrap();
//!     let body = doc.body();
//!     doc.append_child(body, p).unwrap();
//!     text
//! };
//!
//! let name = scope.create_signal("world".to_string());
//! bind_text(&scope, &dom, text, {
//!     let name = name.clone();
//!     move || format!("hello {}", name.get())
//! });
//! assert_eq!(dom.borrow().text(text), Some("hello world"));
//!
//! name.set("tally".into());
//! rt.flush();
//! assert_eq!(dom.borrow().text(text), Some("hello tally"));
//! ```
//!
//! Binding targets only patch when the produced string differs from what
//! the node holds, so re-running an effect with unchanged inputs leaves the
//! document (and its mutation log) untouched.

pub mod binding;
pub mod dom;
pub mod error;
pub mod event;
pub mod html;
pub mod node;
pub mod style;
pub mod template;

pub use binding::{Target, bind_class, bind_text, set_class, set_text};
pub use dom::Dom;
pub use error::DomError;
pub use event::{Event, EventType, Handler};
pub use node::{Document, MutationRecord, NodeId, NodeKind};
pub use style::Stylesheet;
pub use template::{Template, TemplateNode};
