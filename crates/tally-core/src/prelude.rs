pub use crate::effects::{Dispose, EffectHandle, on_unmount};
pub use crate::reactive::{EffectId, HostScheduler, Runtime, SignalId};
pub use crate::scope::Scope;
pub use crate::signal::Signal;
