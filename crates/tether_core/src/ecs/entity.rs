//! Entity handle with generational index
//!
//! Entities are lightweight handles (8 bytes) that reference game objects
//! owned by the `World`. The generation counter prevents use-after-free bugs.

use std::fmt;

/// Entity handle (generation-indexed for safety)
///
/// - Index: Position in the world's slot array
/// - Generation: Incremented on despawn (stale handles stop resolving)
///
/// Example:
/// ```ignore
/// let entity = world.create(0, 0, 4, 4);
/// world.despawn(entity);
/// assert!(world.get(entity).is_none()); // generation mismatch
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
