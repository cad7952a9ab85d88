//! # Signals, Effects, and Flushing
//!
//! Tally keeps rendered output in sync with state through a small
//! fine-grained reactive core. There are four pieces:
//!
//! - `Runtime`: owns the dependency graph and the set of pending effects.
//! - `Signal<T>`: observable value; reads are tracked, writes schedule.
//! - effects: closures re-run when a signal they read is written.
//! - `Scope`: ownership boundary that tears everything down on unmount.
//!
//! ## Signals and effects
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tally_core::*;
//!
//! let rt = Runtime::new();
//! let count = rt.create_signal(0u64);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let _fx = rt.create_effect({
//!     let count = count.clone();
//!     let seen = seen.clone();
//!     move || seen.borrow_mut().push(count.get())
//! });
//!
//! count.set(1);
//! count.set(2);
//! assert_eq!(*seen.borrow(), vec![0]); // not run yet
//!
//! rt.flush();
//! assert_eq!(*seen.borrow(), vec![0, 2]); // once, with the final value
//! ```
//!
//! An effect runs once when created. Every signal it reads during a run
//! becomes a dependency; the set is rebuilt from scratch on each run, so a
//! branch that stops reading a signal also stops reacting to it.
//!
//! Writes never run effects inline. They put subscribers into the pending
//! set (at most once each) and the next `Runtime::flush` runs them. A host
//! can install a `HostScheduler` to be told when a flush is needed.
//!
//! ## Scopes
//!
//! ```rust
//! use tally_core::*;
//!
//! let rt = Runtime::new();
//! let scope = Scope::new(&rt);
//! let value = scope.create_signal(1);
//! let fx = scope.create_effect({
//!     let value = value.clone();
//!     move || {
//!         let _ = value.get();
//!     }
//! });
//!
//! scope.dispose();
//! assert!(!fx.is_alive());
//! value.set(2); // schedules nothing
//! assert_eq!(rt.pending_count(), 0);
//! ```

pub mod effects;
pub mod prelude;
pub mod reactive;
pub mod scope;
pub mod signal;
pub mod tests;

pub use effects::*;
pub use reactive::*;
pub use scope::*;
pub use signal::*;
