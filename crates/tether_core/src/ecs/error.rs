use crate::ecs::Entity;
use crate::script::ScriptError;
use thiserror::Error;

/// Errors returned by component `init`/`update`.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("owning entity {entity} no longer exists")]
    StaleOwner { entity: Entity },

    #[error("component is not attached to any entity")]
    Detached,

    #[error("{component} on entity {entity} is already running")]
    Reentrant {
        component: &'static str,
        entity: Entity,
    },

    #[error("entity {entity} has no {component}")]
    Missing {
        component: &'static str,
        entity: Entity,
    },

    #[error("{0}")]
    Failed(String),
}

/// Errors raised by world-level operations.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("entity {entity} does not exist")]
    StaleEntity { entity: Entity },

    #[error("{component} is already owned by entity {owner}")]
    AlreadyOwned {
        component: &'static str,
        owner: Entity,
    },

    #[error("{component} failed to initialize on entity {entity}")]
    ComponentInit {
        entity: Entity,
        component: &'static str,
        #[source]
        source: ComponentError,
    },
}
