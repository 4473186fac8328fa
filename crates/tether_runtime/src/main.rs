//! Tether Runtime
//!
//! Minimal binary that loads a scene, attaches its scripts and ticks it.
//!
//! Usage: `tether [settings.json]`

mod scene;
mod settings;

use anyhow::{Context, Result};
use settings::Settings;
use std::path::Path;
use std::rc::Rc;
use tether_core::ecs::World;
use tether_script::ScriptRuntime;
use tracing::Level;

fn main() -> Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path))?,
        None => Settings::default(),
    };

    let level: Level = settings
        .log_level
        .parse()
        .with_context(|| format!("unknown log level '{}'", settings.log_level))?;
    tracing_subscriber::fmt().with_max_level(level).init();

    tracing::info!("Tether Engine v{}", tether_core::VERSION);
    tracing::info!(root = %settings.script.root.display(), "Starting script runtime...");

    let runtime = Rc::new(ScriptRuntime::with_search_root(settings.script.root.clone())?);
    if let Some(limit) = settings.script.memory_limit {
        runtime.set_memory_limit(limit);
    }
    let mut world = World::with_runtime(runtime.clone());

    let spawned = scene::spawn(&mut world, &settings.scene);
    tracing::info!(objects = spawned.len(), "Scene loaded");

    let summary = scene::run(&mut world, &spawned, settings.simulation.ticks);
    tracing::info!(
        ticks = summary.ticks,
        updated = summary.updated,
        failures = summary.failures,
        collisions = summary.collisions,
        "Simulation finished"
    );

    let cleared = world.clear_transient();
    tracing::info!(
        cleared,
        remaining = world.len(),
        live_scripts = runtime.instance_count(),
        "Transient objects cleared"
    );

    Ok(())
}
