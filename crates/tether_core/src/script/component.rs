// component.rs - Component whose behavior lives in a foreign script instance

use crate::ecs::{component_id, Component, ComponentContext, ComponentError, Owner};
use crate::script::{ForeignInstance, ScriptError, ScriptOwner, ScriptValue};
use std::fmt;
use tracing::{debug, warn};

pub const INIT_METHOD: &str = "init";
pub const UPDATE_METHOD: &str = "update";

/// Lifecycle of a [`ScriptComponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptState {
    /// Constructed, no foreign instance yet.
    Unbound,
    /// Inside `init`: resolving, constructing and binding.
    Initializing,
    /// Foreign instance constructed, bound and initialized.
    Bound,
    /// Initialization failed, or the runtime reported a fatal error.
    Failed,
}

impl fmt::Display for ScriptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unbound => "unbound",
            Self::Initializing => "initializing",
            Self::Bound => "bound",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Delegates `init`/`update` to an instance of `module_name.class_name` in the
/// world's foreign runtime.
pub struct ScriptComponent {
    owner: Owner,
    module_name: String,
    class_name: String,
    state: ScriptState,
    instance: Option<ForeignInstance>,
}

impl ScriptComponent {
    pub fn new(module: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            owner: Owner::detached(),
            module_name: module.into(),
            class_name: class.into(),
            state: ScriptState::Unbound,
            instance: None,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn state(&self) -> ScriptState {
        self.state
    }

    pub fn instance(&self) -> Option<&ForeignInstance> {
        self.instance.as_ref()
    }

    /// Invoke an arbitrary method on the bound instance.
    pub fn call(
        &mut self,
        ctx: &mut ComponentContext<'_>,
        method: &str,
        args: &[ScriptValue],
    ) -> Result<ScriptValue, ScriptError> {
        let result = self
            .bound_instance()?
            .invoke(method, args, &mut ctx.bridge_scope());

        if let Err(error) = &result {
            if error.is_fatal() {
                warn!(
                    entity = %ctx.entity(),
                    module = %self.module_name,
                    class = %self.class_name,
                    %error,
                    "script runtime failed, releasing instance"
                );
                self.state = ScriptState::Failed;
                self.instance = None;
            }
        }
        result
    }

    fn bound_instance(&self) -> Result<&ForeignInstance, ScriptError> {
        match (&self.instance, self.state) {
            (Some(instance), ScriptState::Bound) => Ok(instance),
            _ => Err(ScriptError::NotInitialized {
                module: self.module_name.clone(),
                class: self.class_name.clone(),
                state: self.state,
            }),
        }
    }

    /// Resolve, construct, bind, then run the script's own init.
    ///
    /// The instance is owned from the moment it exists, so any failure past
    /// construction releases it on the way out.
    fn start(&self, ctx: &mut ComponentContext<'_>) -> Result<ForeignInstance, ScriptError> {
        let runtime = ctx.runtime().ok_or(ScriptError::NoRuntime)?;

        let module = runtime.resolve_module(&self.module_name)?;
        let class = runtime.resolve_class(module, &self.class_name)?;
        let handle = runtime.instantiate(class, &[])?;
        let instance = ForeignInstance::new(runtime.clone(), handle);

        let bridge = runtime.bridge(handle)?;
        bridge.set_owner(ScriptOwner {
            entity: ctx.entity(),
            component: component_id::<ScriptComponent>(),
        })?;

        instance.invoke(INIT_METHOD, &[], &mut ctx.bridge_scope())?;
        Ok(instance)
    }
}

impl Component for ScriptComponent {
    crate::component_base!(owner);

    fn init(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
        match self.state {
            ScriptState::Unbound => {}
            ScriptState::Initializing => {
                return Err(ScriptError::ReentrantInit {
                    module: self.module_name.clone(),
                    class: self.class_name.clone(),
                }
                .into())
            }
            ScriptState::Bound | ScriptState::Failed => {
                return Err(ScriptError::AlreadyInitialized {
                    module: self.module_name.clone(),
                    class: self.class_name.clone(),
                }
                .into())
            }
        }

        if !self.owner.is_attached() {
            return Err(ComponentError::Detached);
        }

        self.state = ScriptState::Initializing;
        match self.start(ctx) {
            Ok(instance) => {
                debug!(
                    entity = %ctx.entity(),
                    module = %self.module_name,
                    class = %self.class_name,
                    handle = %instance.handle(),
                    "script bound"
                );
                self.instance = Some(instance);
                self.state = ScriptState::Bound;
                Ok(())
            }
            Err(error) => {
                warn!(
                    entity = %ctx.entity(),
                    module = %self.module_name,
                    class = %self.class_name,
                    %error,
                    "script failed to initialize"
                );
                self.state = ScriptState::Failed;
                Err(error.into())
            }
        }
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) -> Result<(), ComponentError> {
        self.call(ctx, UPDATE_METHOD, &[])?;
        Ok(())
    }
}
