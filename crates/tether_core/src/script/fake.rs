// fake.rs - In-memory ForeignRuntime for unit tests

use crate::ecs::ObjectFlags;
use crate::math::Vector2;
use crate::script::{
    BridgeScope, ClassRef, ForeignRuntime, GameScript, ModuleRef, ScriptError, ScriptHandle,
    ScriptValue,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct FakeClass {
    name: String,
    bridged: bool,
    fails_construct: bool,
    fails_update: bool,
    crashes: bool,
    step: Vector2,
}

impl FakeClass {
    /// A class extending the bridge base.
    pub fn bridged(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bridged: true,
            fails_construct: false,
            fails_update: false,
            crashes: false,
            step: Vector2::ZERO,
        }
    }

    /// A class that does not extend the bridge base.
    pub fn plain(name: &str) -> Self {
        Self {
            bridged: false,
            ..Self::bridged(name)
        }
    }

    /// `update` moves the owner by `(dx, dy)`.
    pub fn stepping(mut self, dx: i32, dy: i32) -> Self {
        self.step = Vector2::new(dx, dy);
        self
    }

    pub fn failing_construct(mut self) -> Self {
        self.fails_construct = true;
        self
    }

    pub fn failing_update(mut self) -> Self {
        self.fails_update = true;
        self
    }

    /// Every call after `init` reports a broken runtime.
    pub fn crashes(mut self) -> Self {
        self.crashes = true;
        self
    }
}

struct Instance {
    class: ClassRef,
    bridge: Option<Rc<GameScript>>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    modules: HashMap<String, ModuleRef>,
    classes: HashMap<ClassRef, (ModuleRef, FakeClass)>,
    instances: HashMap<ScriptHandle, Instance>,
    calls: Vec<String>,
}

impl State {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeRuntime {
    state: RefCell<State>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(self, module: &str, class: FakeClass) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let module = match state.modules.get(module) {
                Some(existing) => *existing,
                None => {
                    let id = ModuleRef(state.next());
                    state.modules.insert(module.to_string(), id);
                    id
                }
            };
            let id = ClassRef(state.next());
            state.classes.insert(id, (module, class));
        }
        self
    }

    /// Every invocation so far, as `Class.method`.
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn live_instances(&self) -> usize {
        self.state.borrow().instances.len()
    }

    fn class_of(&self, handle: ScriptHandle) -> Result<(FakeClass, Option<Rc<GameScript>>), ScriptError> {
        let state = self.state.borrow();
        let instance = state
            .instances
            .get(&handle)
            .ok_or(ScriptError::UnknownHandle(handle))?;
        let (_, class) = &state.classes[&instance.class];
        Ok((class.clone(), instance.bridge.clone()))
    }
}

impl ForeignRuntime for FakeRuntime {
    fn resolve_module(&self, name: &str) -> Result<ModuleRef, ScriptError> {
        self.state
            .borrow()
            .modules
            .get(name)
            .copied()
            .ok_or_else(|| ScriptError::ModuleNotFound {
                module: name.to_string(),
            })
    }

    fn resolve_class(&self, module: ModuleRef, name: &str) -> Result<ClassRef, ScriptError> {
        let state = self.state.borrow();
        state
            .classes
            .iter()
            .find(|(_, (m, class))| *m == module && class.name == name)
            .map(|(id, _)| *id)
            .ok_or_else(|| ScriptError::ClassNotFound {
                module: state
                    .modules
                    .iter()
                    .find(|(_, id)| **id == module)
                    .map_or_else(String::new, |(n, _)| n.clone()),
                class: name.to_string(),
            })
    }

    fn instantiate(&self, class: ClassRef, _args: &[ScriptValue]) -> Result<ScriptHandle, ScriptError> {
        let mut state = self.state.borrow_mut();
        let (_, info) = state
            .classes
            .get(&class)
            .ok_or_else(|| ScriptError::Fatal {
                message: "unknown class ref".to_string(),
            })?;
        if info.fails_construct {
            return Err(ScriptError::Construction {
                class: info.name.clone(),
                message: "constructor threw".to_string(),
            });
        }
        let bridge = info.bridged.then(|| Rc::new(GameScript::new()));
        let handle = ScriptHandle(state.next());
        state.instances.insert(handle, Instance { class, bridge });
        Ok(handle)
    }

    fn bridge(&self, handle: ScriptHandle) -> Result<Rc<GameScript>, ScriptError> {
        let (class, bridge) = self.class_of(handle)?;
        bridge.ok_or(ScriptError::BindTypeMismatch { class: class.name })
    }

    fn invoke(
        &self,
        handle: ScriptHandle,
        method: &str,
        args: &[ScriptValue],
        scope: &mut BridgeScope<'_>,
    ) -> Result<ScriptValue, ScriptError> {
        let (class, bridge) = self.class_of(handle)?;
        let entry = match method {
            "init" => format!(
                "{}.init bound={}",
                class.name,
                bridge.as_ref().is_some_and(|b| b.is_bound())
            ),
            _ => format!("{}.{}", class.name, method),
        };
        self.state.borrow_mut().calls.push(entry);

        let invocation_error = |message: &str| ScriptError::Invocation {
            class: class.name.clone(),
            method: method.to_string(),
            message: message.to_string(),
        };

        match method {
            "init" => Ok(ScriptValue::Null),
            _ if class.crashes => Err(ScriptError::Fatal {
                message: "interpreter crashed".to_string(),
            }),
            "update" if class.fails_update => Err(invocation_error("update threw")),
            "update" => {
                let bridge = bridge.ok_or_else(|| invocation_error("no bridge"))?;
                scope.game_object(&bridge)?.position += class.step;
                Ok(ScriptValue::Null)
            }
            "echo" => Ok(args.first().cloned().unwrap_or(ScriptValue::Null)),
            "spawn" => {
                let entity = scope.create(0, 0, 1, 1, ObjectFlags::default());
                Ok(ScriptValue::from(entity.index()))
            }
            _ => Err(invocation_error("no such method")),
        }
    }

    fn release(&self, handle: ScriptHandle) {
        self.state.borrow_mut().instances.remove(&handle);
    }
}
