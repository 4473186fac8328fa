// storage.rs - Per-object, type-indexed component storage

use crate::ecs::{component_id, Component, ComponentId};
use std::collections::HashMap;

struct Slot {
    id: ComponentId,
    /// Empty only while the component is checked out for a call.
    component: Option<Box<dyn Component>>,
}

/// Maps component IDs to boxed components, one instance per type.
///
/// Slots keep insertion order. Replacing a type reuses its slot, so the
/// update order of the remaining components does not change.
#[derive(Default)]
pub(crate) struct ComponentStore {
    slots: Vec<Slot>,
    index: HashMap<ComponentId, usize>,
}

impl ComponentStore {
    /// Insert a component, returning its slot and any instance it replaced.
    pub fn insert(
        &mut self,
        id: ComponentId,
        component: Box<dyn Component>,
    ) -> (usize, Option<Box<dyn Component>>) {
        if let Some(&slot) = self.index.get(&id) {
            let previous = self.slots[slot].component.replace(component);
            return (slot, previous);
        }

        let slot = self.slots.len();
        self.slots.push(Slot {
            id,
            component: Some(component),
        });
        self.index.insert(id, slot);
        (slot, None)
    }

    pub fn get<C: Component>(&self) -> Option<&C> {
        let slot = *self.index.get(&component_id::<C>())?;
        self.slots[slot]
            .component
            .as_deref()?
            .as_any()
            .downcast_ref::<C>()
    }

    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        let slot = *self.index.get(&component_id::<C>())?;
        self.slots[slot]
            .component
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<C>()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn slot_of(&self, id: ComponentId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn id_at(&self, slot: usize) -> Option<ComponentId> {
        self.slots.get(slot).map(|s| s.id)
    }

    /// Check a component out of its slot. `None` if it is already out.
    pub fn take(&mut self, slot: usize) -> Option<Box<dyn Component>> {
        self.slots.get_mut(slot)?.component.take()
    }

    pub fn restore(&mut self, slot: usize, component: Box<dyn Component>) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.component = Some(component);
        }
    }

    /// Remove a component by ID. Later slots shift down one place.
    pub fn remove(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        let slot = self.index.remove(&id)?;
        let removed = self.slots.remove(slot).component;
        for (i, s) in self.slots.iter().enumerate().skip(slot) {
            self.index.insert(s.id, i);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.slots.iter().map(|s| s.id)
    }
}
