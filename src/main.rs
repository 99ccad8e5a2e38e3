//! Riftgate - portal engine core
//!
//! Headless demo: loads a universe from a scene file, runs the fixed-rate
//! simulation with interleaved frames against a tracing render backend,
//! and logs what the portal systems do.

use riftgate::config::AppConfig;
use riftgate::systems::{FrameSystem, SimulationSystem};
use riftgate_core::{BodyKind, Universe, UniverseTemplate};
use riftgate_render::{RenderContext, TraceBackend};

fn main() {
    env_logger::init();

    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    // Load and instantiate the universe template
    let mut universe = load_universe(&config.scene.path);
    log::info!(
        "Universe ready: {} worlds, {} portals ({} global), {} bodies",
        universe.worlds.len(),
        universe.portals.len(),
        universe.global_portals.len(),
        universe.bodies.len()
    );

    let mut simulation = SimulationSystem::new(&config.simulation, &config.portals);
    let mut frame_system = FrameSystem::new(&config.portals);
    let mut backend = TraceBackend::new();

    let dt = 1.0 / config.simulation.tick_rate;
    for tick in 0..config.debug.demo_ticks {
        simulation.tick(&mut universe, dt);
        frame_system.on_tick(&universe);

        // one frame per tick is enough for a headless run
        if let Some(ctx) = camera_context(&universe) {
            backend.clear();
            frame_system.frame(&mut universe, &ctx, &mut backend);
            let straddling = universe
                .bodies
                .values()
                .filter(|b| b.is_straddling_portal())
                .count();
            if straddling > 0 {
                log::info!(
                    "tick {}: {} straddling bodies, {} draw events this frame",
                    tick,
                    straddling,
                    backend.events.len()
                );
            }
        }
    }

    for (key, body) in universe.bodies.iter() {
        let world = universe
            .world(body.world)
            .map(|w| w.name.as_str())
            .unwrap_or("?");
        log::info!(
            "body {:?} ({:?}) ended in '{}' at {:?}",
            key,
            body.kind,
            world,
            body.position
        );
    }
}

/// Load the scene file, falling back to a built-in universe
fn load_universe(path: &str) -> Universe {
    let template = match UniverseTemplate::load(path) {
        Ok(template) => template,
        Err(e) => {
            log::warn!("Failed to load scene '{}': {}. Using built-in demo.", path, e);
            return built_in_universe();
        }
    };
    match template.instantiate() {
        Ok(universe) => universe,
        Err(e) => {
            log::warn!("Scene '{}' did not instantiate: {}. Using built-in demo.", path, e);
            built_in_universe()
        }
    }
}

/// Two worlds joined by a portal, with a body about to fall through it
fn built_in_universe() -> Universe {
    use riftgate_core::{Aabb, Body, Portal, Vec3, World};

    let mut universe = Universe::new();

    let mut overworld = World::new("overworld");
    overworld.add_terrain(Aabb::new(
        Vec3::new(-16.0, 63.0, -16.0),
        Vec3::new(16.0, 64.0, 16.0),
    ));
    let overworld = universe.add_world(overworld);

    let mut depths = World::new("depths");
    depths.add_terrain(Aabb::new(
        Vec3::new(-16.0, 29.0, -16.0),
        Vec3::new(16.0, 30.0, 16.0),
    ));
    let depths = universe.add_world(depths);

    // floor hatch in the overworld leading down into the depths
    universe.add_portal(Portal::new(
        overworld,
        Vec3::new(4.0, 64.0, 4.0),
        Vec3::Z,
        Vec3::X,
        3.0,
        3.0,
        depths,
        Vec3::new(4.0, 34.0, 4.0),
    ));

    universe.add_body(Body::new(
        BodyKind::LocalCamera,
        overworld,
        Vec3::new(4.0, 70.0, 4.0),
        Vec3::new(0.3, 0.9, 0.3),
    ));

    universe
}

/// Build the frame context from the camera body, if one exists
fn camera_context(universe: &Universe) -> Option<RenderContext> {
    universe
        .bodies
        .values()
        .find(|b| b.kind == BodyKind::LocalCamera)
        .map(|b| RenderContext::new(b.eye_pos(), b.world))
}
