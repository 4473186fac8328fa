//! Script components and the foreign runtime boundary.
//!
//! A [`ScriptComponent`] delegates its lifecycle to an instance of a class
//! living in a [`ForeignRuntime`]. The instance is paired with a native
//! [`GameScript`] bridge handle that is bound to the owning entity before the
//! script's own `init` runs.

mod bridge;
mod component;
mod error;
mod runtime;

#[cfg(test)]
mod fake;

pub use bridge::{GameScript, ScriptOwner};
pub use component::{ScriptComponent, ScriptState, INIT_METHOD, UPDATE_METHOD};
pub use error::ScriptError;
pub use runtime::{
    BridgeScope, ClassRef, ForeignInstance, ForeignRuntime, ModuleRef, ScriptHandle, ScriptValue,
};
