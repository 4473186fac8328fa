// world.rs - Owning context for game objects, component attachment and the update loop

use crate::ecs::{
    component_id, meta_of, Component, ComponentContext, ComponentError, ComponentId, Entity,
    GameObject, ObjectFlags, WorldError,
};
use crate::math::Vector2;
use crate::script::ForeignRuntime;
use std::any::type_name;
use std::rc::Rc;
use tracing::debug;

struct EntitySlot {
    generation: u32,
    object: Option<GameObject>,
}

#[derive(Clone, Copy)]
enum Phase {
    Init,
    Update,
}

/// A component call that failed during an update pass.
#[derive(Debug)]
pub struct ComponentFailure {
    pub entity: Entity,
    pub component: &'static str,
    pub error: ComponentError,
}

/// Outcome of an update pass. Failures are collected, never fatal to the pass.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Component updates that returned `Ok`.
    pub updated: usize,
    /// Inactive objects the pass did not visit.
    pub skipped: usize,
    pub failures: Vec<ComponentFailure>,
}

impl UpdateReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns every game object. Entities are generational handles into it.
pub struct World {
    slots: Vec<EntitySlot>,
    free: Vec<u32>,
    runtime: Option<Rc<dyn ForeignRuntime>>,
}

impl World {
    /// Create a world with no foreign runtime. Script components will fail to
    /// initialize until one is attached.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            runtime: None,
        }
    }

    pub fn with_runtime(runtime: Rc<dyn ForeignRuntime>) -> Self {
        let mut world = Self::new();
        world.runtime = Some(runtime);
        world
    }

    pub fn set_runtime(&mut self, runtime: Rc<dyn ForeignRuntime>) {
        self.runtime = Some(runtime);
    }

    pub fn runtime(&self) -> Option<Rc<dyn ForeignRuntime>> {
        self.runtime.clone()
    }

    /// Create an active game object centered at `(x, y)` with extent `(w, h)`.
    pub fn create(&mut self, x: i32, y: i32, w: i32, h: i32) -> Entity {
        self.create_with(x, y, w, h, ObjectFlags::default())
    }

    /// Like [`create`](Self::create), recording UI/permanent flags.
    pub fn create_with(&mut self, x: i32, y: i32, w: i32, h: i32, flags: ObjectFlags) -> Entity {
        let object = GameObject::new(Vector2::new(x, y), Vector2::new(w, h), flags);

        let entity = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                Entity::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(EntitySlot {
                    generation: 0,
                    object: Some(object),
                });
                Entity::new(index, 0)
            }
        };

        debug!(%entity, ui = flags.ui, permanent = flags.permanent, "game object created");
        entity
    }

    /// Destroy a game object and every component it owns.
    ///
    /// Returns false for handles that are already stale.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.slots.get_mut(entity.index() as usize) else {
            return false;
        };
        if slot.generation != entity.generation() {
            return false;
        }
        let Some(object) = slot.object.take() else {
            return false;
        };

        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index());
        debug!(%entity, components = object.component_count(), "game object destroyed");
        drop(object);
        true
    }

    /// Despawn every object not created as permanent.
    pub fn clear_transient(&mut self) -> usize {
        let transient: Vec<Entity> = self
            .entities()
            .filter(|&e| self.get(e).is_some_and(|o| !o.is_permanent()))
            .collect();
        for &entity in &transient {
            self.despawn(entity);
        }
        transient.len()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    pub fn get(&self, entity: Entity) -> Option<&GameObject> {
        let slot = self.slots.get(entity.index() as usize)?;
        if slot.generation != entity.generation() {
            return None;
        }
        slot.object.as_ref()
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut GameObject> {
        let slot = self.slots.get_mut(entity.index() as usize)?;
        if slot.generation != entity.generation() {
            return None;
        }
        slot.object.as_mut()
    }

    /// Live entities in slot order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.object
                .as_ref()
                .map(|_| Entity::new(index as u32, slot.generation))
        })
    }

    /// Number of live game objects.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chainable access for attaching components.
    pub fn entity_mut(&mut self, entity: Entity) -> Result<EntityMut<'_>, WorldError> {
        if !self.contains(entity) {
            return Err(WorldError::StaleEntity { entity });
        }
        Ok(EntityMut {
            world: self,
            entity,
        })
    }

    /// Attach a component: set its owner, store it under its type, then run `init`.
    ///
    /// An existing component of the same type is replaced and dropped. If
    /// `init` fails the component stays attached (in whatever failed state it
    /// recorded) and the error is returned.
    pub fn add_component<C: Component>(
        &mut self,
        entity: Entity,
        mut component: C,
    ) -> Result<(), WorldError> {
        let name = type_name::<C>();
        let object = self
            .get_mut(entity)
            .ok_or(WorldError::StaleEntity { entity })?;

        component
            .owner_mut()
            .attach(entity)
            .map_err(|owner| WorldError::AlreadyOwned {
                component: name,
                owner,
            })?;

        let (slot, replaced) = object
            .components
            .insert(component_id::<C>(), Box::new(component));
        if replaced.is_some() {
            debug!(%entity, component = name, "component replaced");
        }
        drop(replaced);

        self.run_slot(entity, slot, Phase::Init)
            .map_err(|source| WorldError::ComponentInit {
                entity,
                component: name,
                source,
            })
    }

    pub fn get_component<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.get(entity)?.get_component::<C>()
    }

    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.get_mut(entity)?.get_component_mut::<C>()
    }

    /// Detach and drop the component of type `C`. Later components keep
    /// their relative update order.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> bool {
        let Some(object) = self.get_mut(entity) else {
            return false;
        };
        let removed = object.components.remove(component_id::<C>());
        if removed.is_some() {
            debug!(%entity, component = type_name::<C>(), "component removed");
        }
        removed.is_some()
    }

    /// Run `f` against a component with a full [`ComponentContext`], from
    /// outside the update loop.
    pub fn with_component<C, R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut C, &mut ComponentContext<'_>) -> R,
    ) -> Result<R, ComponentError>
    where
        C: Component,
    {
        let component = type_name::<C>();
        let slot = self
            .get(entity)
            .ok_or(ComponentError::StaleOwner { entity })?
            .components
            .slot_of(component_id::<C>())
            .ok_or(ComponentError::Missing { component, entity })?;

        self.with_checked_out(entity, slot, |boxed, ctx| {
            let typed = boxed
                .as_any_mut()
                .downcast_mut::<C>()
                .ok_or(ComponentError::Missing { component, entity })?;
            Ok(f(typed, ctx))
        })
    }

    /// Update every active game object, components in insertion order.
    pub fn update(&mut self) -> UpdateReport {
        let mut report = UpdateReport::default();
        let entities: Vec<Entity> = self.entities().collect();

        for entity in entities {
            let active = match self.get(entity) {
                Some(object) => object.is_active(),
                None => continue,
            };
            if active {
                self.update_into(entity, &mut report);
            } else {
                report.skipped += 1;
            }
        }
        report
    }

    /// Update one game object regardless of its active flag.
    pub fn update_entity(&mut self, entity: Entity) -> Result<UpdateReport, WorldError> {
        if !self.contains(entity) {
            return Err(WorldError::StaleEntity { entity });
        }
        let mut report = UpdateReport::default();
        self.update_into(entity, &mut report);
        Ok(report)
    }

    /// Overlap test between two live objects.
    pub fn is_colliding(&self, a: Entity, b: Entity) -> Result<bool, WorldError> {
        let first = self.get(a).ok_or(WorldError::StaleEntity { entity: a })?;
        let second = self.get(b).ok_or(WorldError::StaleEntity { entity: b })?;
        Ok(first.is_colliding(second))
    }

    fn update_into(&mut self, entity: Entity, report: &mut UpdateReport) {
        let count = match self.get(entity) {
            Some(object) => object.component_count(),
            None => return,
        };

        for slot in 0..count {
            match self.run_slot(entity, slot, Phase::Update) {
                Ok(()) => report.updated += 1,
                Err(error) => {
                    let component = self.component_name(entity, slot);
                    debug!(%entity, component, %error, "component update failed");
                    report.failures.push(ComponentFailure {
                        entity,
                        component,
                        error,
                    });
                }
            }
        }
    }

    fn component_name(&self, entity: Entity, slot: usize) -> &'static str {
        self.get(entity)
            .and_then(|o| o.components.id_at(slot))
            .and_then(meta_of)
            .map_or("<unknown component>", |meta| meta.name)
    }

    fn run_slot(&mut self, entity: Entity, slot: usize, phase: Phase) -> Result<(), ComponentError> {
        self.with_checked_out(entity, slot, |component, ctx| match phase {
            Phase::Init => component.init(ctx),
            Phase::Update => component.update(ctx),
        })
    }

    /// Check a component out of its slot, run `f`, and put it back.
    ///
    /// While checked out the slot reads as empty, which is what turns a
    /// re-entrant call into an error instead of an aliasing borrow.
    fn with_checked_out<R>(
        &mut self,
        entity: Entity,
        slot: usize,
        f: impl FnOnce(&mut dyn Component, &mut ComponentContext<'_>) -> Result<R, ComponentError>,
    ) -> Result<R, ComponentError> {
        let object = self
            .get_mut(entity)
            .ok_or(ComponentError::StaleOwner { entity })?;
        let id: Option<ComponentId> = object.components.id_at(slot);
        let Some(mut component) = object.components.take(slot) else {
            return Err(ComponentError::Reentrant {
                component: id.and_then(meta_of).map_or("<unknown component>", |m| m.name),
                entity,
            });
        };

        let result = {
            let mut ctx = ComponentContext::new(self, entity);
            f(&mut *component, &mut ctx)
        };

        if let Some(object) = self.get_mut(entity) {
            object.components.restore(slot, component);
        }
        result
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable handle to one live entity, for chained attachment.
pub struct EntityMut<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> EntityMut<'w> {
    pub fn id(&self) -> Entity {
        self.entity
    }

    pub fn add_component<C: Component>(&mut self, component: C) -> Result<&mut Self, WorldError> {
        self.world.add_component(self.entity, component)?;
        Ok(self)
    }

    pub fn get(&self) -> Option<&GameObject> {
        self.world.get(self.entity)
    }
}
