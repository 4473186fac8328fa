//! Foreign runtime contract
//!
//! Handle-based access: the core never sees foreign objects directly, only
//! opaque IDs that the runtime maps to its own values.

use crate::ecs::{Entity, GameObject, ObjectFlags, World};
use crate::script::{GameScript, ScriptError};
use std::fmt;
use std::rc::Rc;

/// Arguments and return values crossing the boundary.
pub type ScriptValue = serde_json::Value;

/// Opaque handle to a resolved foreign module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRef(pub u64);

/// Opaque handle to a resolved foreign class (a constructor).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef(pub u64);

/// Opaque handle to a live foreign instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScriptHandle(pub u64);

impl fmt::Display for ScriptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An embedded, dynamically-typed scripting runtime.
///
/// Starting and stopping the runtime belongs to whoever constructs it; the
/// core only resolves, instantiates, binds, invokes and releases.
pub trait ForeignRuntime {
    fn resolve_module(&self, name: &str) -> Result<ModuleRef, ScriptError>;

    fn resolve_class(&self, module: ModuleRef, name: &str) -> Result<ClassRef, ScriptError>;

    fn instantiate(&self, class: ClassRef, args: &[ScriptValue]) -> Result<ScriptHandle, ScriptError>;

    /// The bridge handle the runtime created for `handle`.
    ///
    /// Fails with [`ScriptError::BindTypeMismatch`] when the instance's class
    /// does not expose the bridge capability.
    fn bridge(&self, handle: ScriptHandle) -> Result<Rc<GameScript>, ScriptError>;

    /// Call `method` on the instance. Any access the script makes to its
    /// native owner goes through `scope`.
    fn invoke(
        &self,
        handle: ScriptHandle,
        method: &str,
        args: &[ScriptValue],
        scope: &mut BridgeScope<'_>,
    ) -> Result<ScriptValue, ScriptError>;

    /// Drop the runtime's reference to the instance.
    fn release(&self, handle: ScriptHandle);
}

/// Exclusively owned foreign instance. Released when dropped.
pub struct ForeignInstance {
    runtime: Rc<dyn ForeignRuntime>,
    handle: ScriptHandle,
}

impl ForeignInstance {
    pub fn new(runtime: Rc<dyn ForeignRuntime>, handle: ScriptHandle) -> Self {
        Self { runtime, handle }
    }

    pub fn handle(&self) -> ScriptHandle {
        self.handle
    }

    pub fn invoke(
        &self,
        method: &str,
        args: &[ScriptValue],
        scope: &mut BridgeScope<'_>,
    ) -> Result<ScriptValue, ScriptError> {
        self.runtime.invoke(self.handle, method, args, scope)
    }
}

impl Drop for ForeignInstance {
    fn drop(&mut self) {
        self.runtime.release(self.handle);
    }
}

impl fmt::Debug for ForeignInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignInstance")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// The only path from foreign code back to native objects.
///
/// Lends out game objects for the duration of one call, resolved through a
/// bound [`GameScript`]. The world keeps ownership throughout.
pub struct BridgeScope<'w> {
    world: &'w mut World,
}

impl<'w> BridgeScope<'w> {
    pub(crate) fn new(world: &'w mut World) -> Self {
        Self { world }
    }

    pub fn game_object(&mut self, bridge: &GameScript) -> Result<&mut GameObject, ScriptError> {
        let entity = bridge.owning_entity()?;
        self.world
            .get_mut(entity)
            .ok_or(ScriptError::StaleOwner { entity })
    }

    /// Spawn a new game object on a script's behalf.
    pub fn create(&mut self, x: i32, y: i32, w: i32, h: i32, flags: ObjectFlags) -> Entity {
        self.world.create_with(x, y, w, h, flags)
    }
}
