//! Bridge handle between a foreign script instance and its native owner.

use crate::ecs::{ComponentId, Entity};
use crate::script::ScriptError;
use once_cell::unsync::OnceCell;

/// What a bound script points back to: a component slot on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptOwner {
    pub entity: Entity,
    pub component: ComponentId,
}

/// Native half of a foreign script instance.
///
/// The foreign runtime creates one for every instance whose class extends its
/// `GameScript` base and keeps it alive alongside that instance. The owner is
/// set once, right after construction, and only ever read afterwards.
#[derive(Debug, Default)]
pub struct GameScript {
    owner: OnceCell<ScriptOwner>,
}

impl GameScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_owner(&self, owner: ScriptOwner) -> Result<(), ScriptError> {
        self.owner.set(owner).map_err(|_| ScriptError::AlreadyBound {
            entity: self.owner.get().map_or(owner.entity, |o| o.entity),
        })
    }

    pub fn owner(&self) -> Option<ScriptOwner> {
        self.owner.get().copied()
    }

    pub fn is_bound(&self) -> bool {
        self.owner.get().is_some()
    }

    /// Entity owning the script component this handle is bound to.
    pub fn owning_entity(&self) -> Result<Entity, ScriptError> {
        self.owner
            .get()
            .map(|o| o.entity)
            .ok_or(ScriptError::UnboundAccess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(index: u32) -> ScriptOwner {
        ScriptOwner {
            entity: Entity::new(index, 0),
            component: 7,
        }
    }

    #[test]
    fn test_unbound_access_fails() {
        let bridge = GameScript::new();
        assert!(!bridge.is_bound());
        assert!(matches!(
            bridge.owning_entity(),
            Err(ScriptError::UnboundAccess)
        ));
    }

    #[test]
    fn test_set_owner_resolves_entity() {
        let bridge = GameScript::new();
        bridge.set_owner(owner(3)).unwrap();
        assert_eq!(bridge.owning_entity().unwrap(), Entity::new(3, 0));
        assert_eq!(bridge.owner(), Some(owner(3)));
    }

    #[test]
    fn test_owner_is_set_once() {
        let bridge = GameScript::new();
        bridge.set_owner(owner(1)).unwrap();
        match bridge.set_owner(owner(2)) {
            Err(ScriptError::AlreadyBound { entity }) => assert_eq!(entity, Entity::new(1, 0)),
            other => panic!("expected AlreadyBound, got {other:?}"),
        }
        assert_eq!(bridge.owning_entity().unwrap(), Entity::new(1, 0));
    }
}
