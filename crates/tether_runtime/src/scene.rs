// scene.rs - Spawning configured objects and driving the tick loop

use crate::settings::ObjectSettings;
use tether_core::ecs::{Entity, ObjectFlags, World};
use tether_core::script::{ScriptComponent, ScriptState};
use tracing::{debug, info, warn};

/// A spawned object and the name it was configured with.
#[derive(Debug, Clone)]
pub struct Spawned {
    pub name: String,
    pub entity: Entity,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u32,
    pub updated: usize,
    pub failures: usize,
    pub collisions: usize,
}

/// Create every configured object. A script that fails to initialize is
/// logged and detached; the object still spawns.
pub fn spawn(world: &mut World, objects: &[ObjectSettings]) -> Vec<Spawned> {
    let mut spawned = Vec::with_capacity(objects.len());

    for object in objects {
        let flags = ObjectFlags {
            ui: object.ui,
            permanent: object.permanent,
        };
        let entity = world.create_with(object.x, object.y, object.w, object.h, flags);
        debug!(name = %object.name, %entity, "spawned");

        if let Some(script) = &object.script {
            let component = ScriptComponent::new(&script.module, &script.class);
            if let Err(error) = world.add_component(entity, component) {
                warn!(name = %object.name, %error, "script did not start");
                world.remove_component::<ScriptComponent>(entity);
            }
        }

        spawned.push(Spawned {
            name: object.name.clone(),
            entity,
        });
    }
    spawned
}

/// Run `ticks` update passes, reporting overlaps between world objects after
/// each one. Scripts that fail for good are detached once reported.
pub fn run(world: &mut World, spawned: &[Spawned], ticks: u32) -> RunSummary {
    let mut summary = RunSummary::default();

    for tick in 0..ticks {
        let report = world.update();
        summary.ticks += 1;
        summary.updated += report.updated;
        summary.failures += report.failures.len();

        for failure in &report.failures {
            warn!(tick, entity = %failure.entity, component = failure.component, error = %failure.error, "update failed");
        }
        detach_failed_scripts(world, spawned);

        for (i, a) in spawned.iter().enumerate() {
            for b in &spawned[i + 1..] {
                if !in_world(world, a.entity) || !in_world(world, b.entity) {
                    continue;
                }
                if let Ok(true) = world.is_colliding(a.entity, b.entity) {
                    summary.collisions += 1;
                    info!(tick, a = %a.name, b = %b.name, "collision");
                }
            }
        }
    }
    summary
}

fn detach_failed_scripts(world: &mut World, spawned: &[Spawned]) {
    for object in spawned {
        let failed = world
            .get_component::<ScriptComponent>(object.entity)
            .is_some_and(|script| script.state() == ScriptState::Failed);
        if failed && world.remove_component::<ScriptComponent>(object.entity) {
            warn!(name = %object.name, "script detached after a runtime failure");
        }
    }
}

fn in_world(world: &World, entity: Entity) -> bool {
    world.get(entity).is_some_and(|o| o.is_active() && !o.is_ui())
}
