// component.rs - Component contract and runtime type registration
//
// Components are identified by u32 IDs handed out on first use, not by
// compile-time lists. The counter is process-wide and append-only.

use crate::ecs::{ComponentContext, ComponentError, Entity};
use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

pub type ComponentId = u32;

/// Metadata recorded when a component type receives its ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentMeta {
    pub id: ComponentId,
    pub name: &'static str,
}

#[derive(Default)]
struct Registry {
    by_type: HashMap<TypeId, ComponentId>,
    metas: Vec<ComponentMeta>,
}

/// Global registry. IDs are indices into `metas`, so they are dense and
/// assigned in first-request order.
static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::default()));

/// Stable per-type identifier, assigned lazily on first request.
pub fn component_id<C: Component>() -> ComponentId {
    let type_id = TypeId::of::<C>();
    if let Some(&id) = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .by_type
        .get(&type_id)
    {
        return id;
    }

    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    // Another caller may have won the race between the two locks.
    if let Some(&id) = registry.by_type.get(&type_id) {
        return id;
    }
    let id = registry.metas.len() as ComponentId;
    registry.metas.push(ComponentMeta {
        id,
        name: type_name::<C>(),
    });
    registry.by_type.insert(type_id, id);
    id
}

/// Look up component metadata by ID.
pub fn meta_of(id: ComponentId) -> Option<ComponentMeta> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .metas
        .get(id as usize)
        .copied()
}

/// Non-owning back-reference from a component to the entity it is attached to.
///
/// Empty until the component is attached; set at most once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Owner(Option<Entity>);

impl Owner {
    pub const fn detached() -> Self {
        Self(None)
    }

    pub fn entity(&self) -> Option<Entity> {
        self.0
    }

    pub fn is_attached(&self) -> bool {
        self.0.is_some()
    }

    /// Returns the existing owner if this component already belongs elsewhere.
    pub(crate) fn attach(&mut self, entity: Entity) -> Result<(), Entity> {
        match self.0 {
            Some(existing) => Err(existing),
            None => {
                self.0 = Some(entity);
                Ok(())
            }
        }
    }
}

/// Behavior unit attached to exactly one game object.
///
/// Implementors embed an [`Owner`] and use [`component_base!`](crate::component_base)
/// for the accessor boilerplate:
///
/// ```ignore
/// struct Spin { owner: Owner, speed: i32 }
///
/// impl Component for Spin {
///     tether_core::component_base!(owner);
///
///     fn update(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
///         ctx.game_object_mut()?.position.x += self.speed;
///         Ok(())
///     }
/// }
/// ```
pub trait Component: 'static {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn owner(&self) -> &Owner;
    fn owner_mut(&mut self) -> &mut Owner;

    /// Called once, right after the component is attached and its owner is set.
    fn init(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
        let _ = ctx;
        Ok(())
    }

    /// Called every tick by the owning loop.
    fn update(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError>;
}

/// Implements the accessor half of [`Component`] for a struct with an
/// [`Owner`] field.
#[macro_export]
macro_rules! component_base {
    ($owner:ident) => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn owner(&self) -> &$crate::ecs::Owner {
            &self.$owner
        }

        fn owner_mut(&mut self) -> &mut $crate::ecs::Owner {
            &mut self.$owner
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha {
        owner: Owner,
    }

    impl Component for Alpha {
        crate::component_base!(owner);

        fn update(&mut self, _ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    struct Beta {
        owner: Owner,
    }

    impl Component for Beta {
        crate::component_base!(owner);

        fn update(&mut self, _ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    #[test]
    fn test_ids_are_distinct_and_stable() {
        let alpha = component_id::<Alpha>();
        let beta = component_id::<Beta>();
        assert_ne!(alpha, beta);
        assert_eq!(alpha, component_id::<Alpha>());
        assert_eq!(beta, component_id::<Beta>());
    }

    #[test]
    fn test_meta_records_type_name() {
        let id = component_id::<Alpha>();
        let meta = meta_of(id).unwrap();
        assert_eq!(meta.id, id);
        assert!(meta.name.ends_with("Alpha"));
        assert!(meta_of(ComponentId::MAX).is_none());
    }

    #[test]
    fn test_owner_attaches_once() {
        let first = Entity::new(1, 0);
        let mut owner = Owner::detached();
        assert!(!owner.is_attached());

        owner.attach(first).unwrap();
        assert_eq!(owner.entity(), Some(first));
        assert_eq!(owner.attach(Entity::new(2, 0)), Err(first));
        assert_eq!(owner.entity(), Some(first));
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let boxed: Box<dyn Component> = Box::new(Alpha {
            owner: Owner::detached(),
        });
        assert!(boxed.as_any().downcast_ref::<Alpha>().is_some());
        assert!(boxed.as_any().downcast_ref::<Beta>().is_none());
    }
}
