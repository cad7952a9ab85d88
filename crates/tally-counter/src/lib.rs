//! # The Counter Element
//!
//! A button that counts its clicks, styled by a `type` property that picks
//! between a filled (`"solid"`) and an outlined treatment, with a default
//! slot after the button for host content.
//!
//! ```rust
//! use tally_core::Runtime;
//! use tally_counter::*;
//! use tally_dom::Dom;
//!
//! let rt = Runtime::new();
//! let dom = Dom::new();
//! let mut registry = Registry::new(&rt, &dom);
//! define_counter(&mut registry, CounterConfig::default()).unwrap();
//!
//! let body = dom.body();
//! let host = registry.create(body, "ps-counter").unwrap();
//! let counter = registry.get::<CounterElement>(host).unwrap().counter().unwrap();
//!
//! dom.click(counter.button()).unwrap();
//! rt.flush();
//! assert_eq!(dom.borrow().text(counter.text_node()), Some("count is 1"));
//!
//! registry.set_attribute(host, "type", "outline").unwrap();
//! let counter = registry.get::<CounterElement>(host).unwrap().counter().unwrap();
//! assert_eq!(
//!     dom.borrow().attribute(counter.button(), "class"),
//!     Some("btn-outline tally-c0un7r")
//! );
//! ```
//!
//! Clicks only schedule the re-render; the host decides when to flush
//! (`Runtime::flush`, or a `HostScheduler`). Setting the `type` property
//! flushes before it returns.

pub mod config;
pub mod counter;
pub mod element;
pub mod error;
pub mod variant;

pub use config::CounterConfig;
pub use counter::{Counter, Rendered, SCOPE_CLASS, STYLES, increment, render, template};
pub use element::{
    CounterElement, CustomElement, ElementContext, Registry, define_counter,
    is_valid_custom_element_name,
};
pub use error::{RegistryError, VariantError};
pub use variant::{Variant, VariantMode};
