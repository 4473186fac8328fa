//! Game objects and their components.
//!
//! A [`World`] owns every [`GameObject`]; [`Entity`] values are generational
//! handles into it and never keep an object alive. Each game object owns at
//! most one component per concrete type, keyed by [`component_id`].
//! Components hold a non-owning [`Owner`] back-reference that is filled in
//! when they are attached.

mod component;
mod context;
mod entity;
mod error;
mod game_object;
mod storage;
mod world;

pub use component::{component_id, meta_of, Component, ComponentId, ComponentMeta, Owner};
pub use context::ComponentContext;
pub use entity::Entity;
pub use error::{ComponentError, WorldError};
pub use game_object::{GameObject, ObjectFlags, ObjectState};
pub use world::{ComponentFailure, EntityMut, UpdateReport, World};
