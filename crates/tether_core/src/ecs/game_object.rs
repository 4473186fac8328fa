// game_object.rs - Native entity state and its owned components

use crate::ecs::storage::ComponentStore;
use crate::ecs::{component_id, Component, ComponentId};
use crate::math::Vector2;
use serde::{Deserialize, Serialize};

/// Flags recorded when a game object is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectFlags {
    /// Belongs to the UI layer rather than the world.
    pub ui: bool,
    /// Survives [`World::clear_transient`](crate::ecs::World::clear_transient).
    pub permanent: bool,
}

/// The part of a game object that scripts may read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectState {
    pub position: Vector2,
    pub scale: Vector2,
    pub active: bool,
}

/// A native entity: position, scale, state flags and the components it owns.
///
/// Created only through [`World::create`](crate::ecs::World::create).
pub struct GameObject {
    /// Center of the object.
    pub position: Vector2,
    /// Full width and height.
    pub scale: Vector2,
    active: bool,
    flags: ObjectFlags,
    pub(crate) components: ComponentStore,
}

impl GameObject {
    pub(crate) fn new(position: Vector2, scale: Vector2, flags: ObjectFlags) -> Self {
        Self {
            position,
            scale,
            active: true,
            flags,
            components: ComponentStore::default(),
        }
    }

    pub fn enable(&mut self) {
        self.active = true;
    }

    /// Marks the object inactive. The world loop skips inactive objects;
    /// direct calls to `World::update_entity` still run them.
    pub fn disable(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_ui(&self) -> bool {
        self.flags.ui
    }

    pub fn is_permanent(&self) -> bool {
        self.flags.permanent
    }

    pub fn flags(&self) -> ObjectFlags {
        self.flags
    }

    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.components.get::<C>()
    }

    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components.get_mut::<C>()
    }

    pub fn has_component<C: Component>(&self) -> bool {
        self.components.contains(component_id::<C>())
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Component IDs in update order.
    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.ids()
    }

    /// Axis-aligned overlap, treating `position` as the center and `scale`
    /// as the full extent.
    ///
    /// Half extents use truncating integer division of the summed scales,
    /// so an odd sum shrinks the reach by half a unit.
    pub fn is_colliding(&self, other: &GameObject) -> bool {
        fn overlaps(a: i32, b: i32, extent_a: i32, extent_b: i32) -> bool {
            let distance = (i64::from(a) - i64::from(b)).abs();
            distance <= (i64::from(extent_a) + i64::from(extent_b)) / 2
        }

        overlaps(self.position.x, other.position.x, self.scale.x, other.scale.x)
            && overlaps(self.position.y, other.position.y, self.scale.y, other.scale.y)
    }

    pub fn state(&self) -> ObjectState {
        ObjectState {
            position: self.position,
            scale: self.scale,
            active: self.active,
        }
    }

    pub fn apply_state(&mut self, state: &ObjectState) {
        self.position = state.position;
        self.scale = state.scale;
        self.active = state.active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(x: i32, y: i32, w: i32, h: i32) -> GameObject {
        GameObject::new(Vector2::new(x, y), Vector2::new(w, h), ObjectFlags::default())
    }

    #[test]
    fn test_new_object_is_active_and_empty() {
        let go = object(1, 2, 3, 4);
        assert!(go.is_active());
        assert!(!go.is_ui());
        assert!(!go.is_permanent());
        assert_eq!(go.component_count(), 0);
        assert_eq!(go.position, Vector2::new(1, 2));
        assert_eq!(go.scale, Vector2::new(3, 4));
    }

    #[test]
    fn test_enable_disable() {
        let mut go = object(0, 0, 1, 1);
        go.disable();
        assert!(!go.is_active());
        go.enable();
        assert!(go.is_active());
    }

    #[test]
    fn test_collision_cases() {
        let a = object(0, 0, 4, 4);
        assert!(!a.is_colliding(&object(10, 10, 4, 4)));
        assert!(a.is_colliding(&object(3, 3, 4, 4)));
        assert!(a.is_colliding(&object(0, 0, 1, 1)));
        // Overlap on one axis only is not a collision.
        assert!(!a.is_colliding(&object(2, 9, 4, 4)));
    }

    #[test]
    fn test_collision_is_inclusive_at_the_edge() {
        let a = object(0, 0, 4, 4);
        assert!(a.is_colliding(&object(4, -4, 4, 4)));
        assert!(!a.is_colliding(&object(5, 0, 4, 4)));
    }

    #[test]
    fn test_odd_extents_truncate() {
        // (3 + 4) / 2 == 3
        let a = object(0, 0, 3, 3);
        assert!(a.is_colliding(&object(3, 0, 4, 4)));
        assert!(!a.is_colliding(&object(4, 0, 4, 4)));
    }

    #[test]
    fn test_state_round_trip() {
        let mut go = object(1, 2, 3, 4);
        let mut state = go.state();
        state.position += Vector2::new(5, 0);
        state.active = false;
        go.apply_state(&state);
        assert_eq!(go.position, Vector2::new(6, 2));
        assert!(!go.is_active());
        assert_eq!(go.state(), state);
    }
}
