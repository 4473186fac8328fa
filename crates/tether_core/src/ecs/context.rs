// context.rs - The view of the world a running component receives

use crate::ecs::{Component, ComponentError, Entity, GameObject, World};
use crate::script::{BridgeScope, ForeignRuntime};
use std::rc::Rc;

/// Passed to [`Component::init`] and [`Component::update`].
///
/// The running component is checked out of its slot for the duration of the
/// call, so it is not visible through [`sibling`](Self::sibling). Attaching or
/// removing components is not possible from here.
pub struct ComponentContext<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> ComponentContext<'w> {
    pub(crate) fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// The entity that owns the running component.
    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn game_object(&self) -> Result<&GameObject, ComponentError> {
        self.world
            .get(self.entity)
            .ok_or(ComponentError::StaleOwner {
                entity: self.entity,
            })
    }

    pub fn game_object_mut(&mut self) -> Result<&mut GameObject, ComponentError> {
        let entity = self.entity;
        self.world
            .get_mut(entity)
            .ok_or(ComponentError::StaleOwner { entity })
    }

    pub fn sibling<C: Component>(&self) -> Option<&C> {
        self.world.get_component::<C>(self.entity)
    }

    pub fn sibling_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.world.get_component_mut::<C>(self.entity)
    }

    /// Foreign runtime attached to the world, if any.
    pub fn runtime(&self) -> Option<Rc<dyn ForeignRuntime>> {
        self.world.runtime()
    }

    /// Scope through which a foreign runtime reaches native objects.
    pub fn bridge_scope(&mut self) -> BridgeScope<'_> {
        BridgeScope::new(self.world)
    }
}
