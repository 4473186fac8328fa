use crate::ecs::Entity;
use crate::script::{ScriptHandle, ScriptState};
use thiserror::Error;

/// Failures at the native/foreign boundary.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("no foreign runtime is attached to the world")]
    NoRuntime,

    #[error("script module '{module}' not found")]
    ModuleNotFound { module: String },

    #[error("script module '{module}' failed to load: {message}")]
    ModuleLoad { module: String, message: String },

    #[error("class '{class}' not found in module '{module}'")]
    ClassNotFound { module: String, class: String },

    #[error("failed to construct '{class}': {message}")]
    Construction { class: String, message: String },

    #[error("'{class}' does not extend GameScript and cannot be bound")]
    BindTypeMismatch { class: String },

    #[error("'{class}.{method}' failed: {message}")]
    Invocation {
        class: String,
        method: String,
        message: String,
    },

    #[error("foreign runtime is unusable: {message}")]
    Fatal { message: String },

    #[error("bridge handle used before its owner was set")]
    UnboundAccess,

    #[error("bridge handle is already bound to entity {entity}")]
    AlreadyBound { entity: Entity },

    #[error("script '{module}.{class}' is {state}; update requires a bound script")]
    NotInitialized {
        module: String,
        class: String,
        state: ScriptState,
    },

    #[error("script '{module}.{class}' re-entered init before it completed")]
    ReentrantInit { module: String, class: String },

    #[error("script '{module}.{class}' has already been initialized")]
    AlreadyInitialized { module: String, class: String },

    #[error("owning entity {entity} no longer exists")]
    StaleOwner { entity: Entity },

    #[error("unknown script handle {0:?}")]
    UnknownHandle(ScriptHandle),
}

impl ScriptError {
    /// The runtime itself is broken, as opposed to one call failing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}
