//! Script runtime management
//!
//! Owns the QuickJS runtime and implements [`ForeignRuntime`] on top of it.
//! Every JS value lives in the prelude's registry; this side keeps the
//! handle bookkeeping and the native bridge handles.

use crate::ffi::{self, RegistryKey};
use rquickjs::{Context, Ctx, Function, Object, Runtime};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tether_core::script::{
    BridgeScope, ClassRef, ForeignRuntime, GameScript, ModuleRef, ScriptError, ScriptHandle,
    ScriptValue,
};
use tracing::{debug, info, warn};

const PRELUDE: &str = include_str!("prelude.js");

struct InstanceInfo {
    class: String,
    bridge: Option<Rc<GameScript>>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    modules: HashMap<String, ModuleRef>,
    module_names: HashMap<ModuleRef, String>,
    classes: HashMap<ClassRef, String>,
    class_cache: HashMap<(ModuleRef, String), ClassRef>,
    instances: HashMap<ScriptHandle, InstanceInfo>,
}

impl Registry {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Script execution context
pub struct ScriptRuntime {
    runtime: Runtime,
    context: Context,
    search_root: Option<PathBuf>,
    state: RefCell<Registry>,
}

impl ScriptRuntime {
    /// Start a runtime that only knows modules registered with
    /// [`load_module`](Self::load_module).
    pub fn new() -> Result<Self, ScriptError> {
        let runtime = Runtime::new().map_err(engine_error)?;
        let context = Context::full(&runtime).map_err(engine_error)?;
        context.with(|ctx| install_prelude(&ctx))?;

        Ok(Self {
            runtime,
            context,
            search_root: None,
            state: RefCell::new(Registry::default()),
        })
    }

    /// Start a runtime that also loads `a.b.c` from `<root>/a/b/c.js`.
    pub fn with_search_root(root: impl Into<PathBuf>) -> Result<Self, ScriptError> {
        let mut runtime = Self::new()?;
        runtime.search_root = Some(root.into());
        Ok(runtime)
    }

    pub fn search_root(&self) -> Option<&Path> {
        self.search_root.as_deref()
    }

    pub fn set_memory_limit(&self, bytes: usize) {
        self.runtime.set_memory_limit(bytes);
    }

    /// Evaluate a module body. `exports` is in scope; anything assigned to it
    /// is visible to [`resolve_class`](ForeignRuntime::resolve_class).
    ///
    /// Loading a name again replaces it for later lookups.
    pub fn load_module(&self, name: &str, source: &str) -> Result<ModuleRef, ScriptError> {
        let module = ModuleRef(self.state.borrow_mut().next_id());
        let wrapped = format!("(function (exports) {{\n{source}\n}})");

        self.context.with(|ctx| {
            let load_error = |error| ScriptError::ModuleLoad {
                module: name.to_string(),
                message: describe(&ctx, error),
            };
            let factory: Function = ctx.eval(wrapped).map_err(load_error)?;
            let define = registry(&ctx, "defineModule")?;
            define
                .call::<_, ()>((module.key(), factory))
                .map_err(load_error)
        })?;

        let mut state = self.state.borrow_mut();
        if let Some(previous) = state.modules.insert(name.to_string(), module) {
            state.module_names.remove(&previous);
        }
        state.module_names.insert(module, name.to_string());
        debug!(module = name, "script module loaded");
        Ok(module)
    }

    /// Evaluate a global script, outside any module.
    pub fn execute(&self, source: &str) -> Result<(), ScriptError> {
        self.context.with(|ctx| {
            ctx.eval::<(), _>(source)
                .map_err(|error| ScriptError::ModuleLoad {
                    module: "<eval>".to_string(),
                    message: describe(&ctx, error),
                })
        })
    }

    /// Live foreign instances.
    pub fn instance_count(&self) -> usize {
        self.state.borrow().instances.len()
    }

    fn module_path(&self, name: &str) -> Option<PathBuf> {
        let mut path = self.search_root.clone()?;
        for segment in name.split('.') {
            if segment.is_empty() || segment.contains(['/', '\\']) {
                return None;
            }
            path.push(segment);
        }
        path.set_extension("js");
        Some(path)
    }
}

impl ForeignRuntime for ScriptRuntime {
    fn resolve_module(&self, name: &str) -> Result<ModuleRef, ScriptError> {
        if let Some(module) = self.state.borrow().modules.get(name) {
            return Ok(*module);
        }

        let not_found = || ScriptError::ModuleNotFound {
            module: name.to_string(),
        };
        let path = self.module_path(name).ok_or_else(not_found)?;
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(error) => {
                return Err(ScriptError::ModuleLoad {
                    module: name.to_string(),
                    message: format!("{}: {error}", path.display()),
                })
            }
        };
        debug!(module = name, path = %path.display(), "loading script module from disk");
        self.load_module(name, &source)
    }

    fn resolve_class(&self, module: ModuleRef, name: &str) -> Result<ClassRef, ScriptError> {
        let (module_name, class) = {
            let mut state = self.state.borrow_mut();
            let module_name = state
                .module_names
                .get(&module)
                .cloned()
                .ok_or_else(|| ScriptError::ModuleNotFound {
                    module: format!("{module:?}"),
                })?;
            if let Some(class) = state.class_cache.get(&(module, name.to_string())) {
                return Ok(*class);
            }
            (module_name, ClassRef(state.next_id()))
        };

        let found = self.context.with(|ctx| {
            registry(&ctx, "resolveClass")?
                .call::<_, bool>((module.key(), name.to_string(), class.key()))
                .map_err(|error| ScriptError::Fatal {
                    message: describe(&ctx, error),
                })
        })?;
        if !found {
            return Err(ScriptError::ClassNotFound {
                module: module_name,
                class: name.to_string(),
            });
        }

        let mut state = self.state.borrow_mut();
        state.classes.insert(class, name.to_string());
        state.class_cache.insert((module, name.to_string()), class);
        Ok(class)
    }

    fn instantiate(&self, class: ClassRef, args: &[ScriptValue]) -> Result<ScriptHandle, ScriptError> {
        let (class_name, handle) = {
            let mut state = self.state.borrow_mut();
            let class_name = state
                .classes
                .get(&class)
                .cloned()
                .ok_or_else(|| ScriptError::Fatal {
                    message: format!("unknown class reference {class:?}"),
                })?;
            (class_name, ScriptHandle(state.next_id()))
        };

        let construction_error = |message: String| ScriptError::Construction {
            class: class_name.clone(),
            message,
        };
        let args_json = ffi::encode_args(args).map_err(|e| construction_error(e.to_string()))?;

        let bridged = self.context.with(|ctx| {
            registry(&ctx, "instantiate")?
                .call::<_, bool>((class.key(), handle.key(), args_json))
                .map_err(|error| construction_error(describe(&ctx, error)))
        })?;

        debug!(class = %class_name, %handle, bridged, "script instance created");
        self.state.borrow_mut().instances.insert(
            handle,
            InstanceInfo {
                class: class_name,
                bridge: bridged.then(|| Rc::new(GameScript::new())),
            },
        );
        Ok(handle)
    }

    fn bridge(&self, handle: ScriptHandle) -> Result<Rc<GameScript>, ScriptError> {
        let state = self.state.borrow();
        let instance = state
            .instances
            .get(&handle)
            .ok_or(ScriptError::UnknownHandle(handle))?;
        instance
            .bridge
            .clone()
            .ok_or_else(|| ScriptError::BindTypeMismatch {
                class: instance.class.clone(),
            })
    }

    fn invoke(
        &self,
        handle: ScriptHandle,
        method: &str,
        args: &[ScriptValue],
        scope: &mut BridgeScope<'_>,
    ) -> Result<ScriptValue, ScriptError> {
        let (class, bridge) = {
            let state = self.state.borrow();
            let instance = state
                .instances
                .get(&handle)
                .ok_or(ScriptError::UnknownHandle(handle))?;
            (instance.class.clone(), instance.bridge.clone())
        };
        let invocation_error = |message: String| ScriptError::Invocation {
            class: class.clone(),
            method: method.to_string(),
            message,
        };

        // Copy in
        let bridge = bridge.filter(|b| b.is_bound());
        let state_json = match &bridge {
            Some(bridge) => {
                let state = scope.game_object(bridge)?.state();
                Some(ffi::encode_state(&state).map_err(|e| invocation_error(e.to_string()))?)
            }
            None => None,
        };
        let args_json = ffi::encode_args(args).map_err(|e| invocation_error(e.to_string()))?;

        let outcome_json = self.context.with(|ctx| {
            registry(&ctx, "invoke")?
                .call::<_, String>((handle.key(), method.to_string(), args_json, state_json))
                .map_err(|error| invocation_error(describe(&ctx, error)))
        })?;

        // Copy out
        let outcome = ffi::decode_outcome(&outcome_json)
            .map_err(|e| invocation_error(format!("invalid game object state: {e}")))?;
        if let (Some(bridge), Some(state)) = (&bridge, outcome.game_object) {
            scope.game_object(bridge)?.apply_state(&state);
        }
        for request in &outcome.created {
            let entity = scope.create(request.x, request.y, request.w, request.h, request.flags());
            debug!(%class, method, %entity, "script created a game object");
        }
        Ok(outcome.result)
    }

    fn release(&self, handle: ScriptHandle) {
        if self.state.borrow_mut().instances.remove(&handle).is_none() {
            return;
        }

        let result = self.context.with(|ctx| {
            registry(&ctx, "release")?
                .call::<_, ()>((handle.key(),))
                .map_err(|error| ScriptError::Fatal {
                    message: describe(&ctx, error),
                })
        });
        match result {
            Ok(()) => debug!(%handle, "script instance released"),
            Err(error) => warn!(%handle, %error, "failed to release script instance"),
        }
    }
}

fn engine_error(error: rquickjs::Error) -> ScriptError {
    ScriptError::Fatal {
        message: error.to_string(),
    }
}

fn install_prelude(ctx: &Ctx<'_>) -> Result<(), ScriptError> {
    let log = Function::new(ctx.clone(), |message: String| {
        info!(target: "script", "{message}");
    })
    .map_err(engine_error)?;
    ctx.globals()
        .set("__tether_log", log)
        .map_err(engine_error)?;

    ctx.eval::<(), _>(PRELUDE).map_err(|error| ScriptError::Fatal {
        message: describe(ctx, error),
    })
}

/// A registry function from the prelude. Missing means the runtime is broken.
fn registry<'js>(ctx: &Ctx<'js>, name: &str) -> Result<Function<'js>, ScriptError> {
    ctx.globals()
        .get::<_, Object<'js>>("__tether")
        .and_then(|tether| tether.get::<_, Function<'js>>(name))
        .map_err(|error| ScriptError::Fatal {
            message: format!("script registry function '{name}' is unavailable: {error}"),
        })
}

/// Render a failed call, taking the pending JS exception if there is one.
fn describe(ctx: &Ctx<'_>, error: rquickjs::Error) -> String {
    if !matches!(error, rquickjs::Error::Exception) {
        return error.to_string();
    }

    let exception = ctx.catch();
    if let Some(object) = exception.as_object() {
        let name = object.get::<_, Option<String>>("name").ok().flatten();
        let message = object.get::<_, Option<String>>("message").ok().flatten();
        match (name, message) {
            (Some(name), Some(message)) => return format!("{name}: {message}"),
            (None, Some(message)) => return message,
            _ => {}
        }
    }
    if let Some(text) = exception.as_string() {
        if let Ok(text) = text.to_string() {
            return text;
        }
    }

    // Thrown non-errors, rendered by the prelude.
    let rendered = registry(ctx, "describe")
        .ok()
        .map(|describe| describe.call::<_, String>((exception,)));
    match rendered {
        Some(Ok(text)) => text,
        Some(Err(_)) => {
            let _ = ctx.catch();
            "uncaught exception".to_string()
        }
        None => "uncaught exception".to_string(),
    }
}
