//! Tether Scripting System
//!
//! JavaScript game logic via QuickJS.
//!
//! ## Architecture
//!
//! - **Registry:** modules, classes and live instances are kept in a JS-side
//!   table; Rust only ever holds the numeric handles that index it.
//! - **Bridge:** classes extending the global `GameScript` get a native
//!   [`tether_core::script::GameScript`] bound to their owning entity.
//! - **FFI:** game object state crosses as JSON, copied in before each call
//!   and copied back after it returns.

mod ffi;
pub mod runtime;

pub use runtime::ScriptRuntime;

pub use rquickjs;
