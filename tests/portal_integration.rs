//! Integration tests for the portal pipeline
//!
//! These tests verify the full tick/frame pipeline works end to end:
//! 1. The proximity tracker stamps straddling bodies each tick
//! 2. The collision resolver honors terrain on both sides of a portal
//! 3. The frame system draws projected copies on the destination side

use riftgate::config::{AppConfig, PortalConfig, SimulationConfig};
use riftgate::systems::{FrameSystem, SimulationSystem};
use riftgate_core::{
    Aabb, Body, BodyKind, Portal, Universe, UniverseTemplate, Vec3, World, WorldId,
};
use riftgate_render::{DrawEvent, RenderContext, TraceBackend};

const TICK: f32 = 0.05;

struct Pipeline {
    universe: Universe,
    overworld: WorldId,
    depths: WorldId,
    simulation: SimulationSystem,
    frames: FrameSystem,
}

/// Two worlds joined by an up-facing hatch portal at y = 64 in the
/// overworld, leading to (0, 34, 0) in the depths. Terrain is left to each
/// test.
fn pipeline() -> Pipeline {
    let mut universe = Universe::new();
    let overworld = universe.add_world(World::new("overworld"));
    let depths = universe.add_world(World::new("depths"));
    universe.add_portal(Portal::new(
        overworld,
        Vec3::new(0.0, 64.0, 0.0),
        Vec3::Z,
        Vec3::X,
        3.0,
        3.0,
        depths,
        Vec3::new(0.0, 34.0, 0.0),
    ));

    let config = AppConfig::default();
    Pipeline {
        universe,
        overworld,
        depths,
        simulation: SimulationSystem::new(&config.simulation, &config.portals),
        frames: FrameSystem::new(&config.portals),
    }
}

fn falling_body(pipeline: &mut Pipeline) -> riftgate_core::BodyKey {
    pipeline.universe.add_body(Body::new(
        BodyKind::Ordinary,
        pipeline.overworld,
        Vec3::new(0.0, 70.0, 0.0),
        Vec3::new(0.3, 0.9, 0.3),
    ))
}

fn run_ticks(pipeline: &mut Pipeline, ticks: u32) {
    for _ in 0..ticks {
        pipeline.simulation.tick(&mut pipeline.universe, TICK);
        pipeline.frames.on_tick(&pipeline.universe);
    }
}

/// A body falling into the hatch is caught by a floor that only exists on
/// the far side of the portal: the other-side half of its clipped box
/// collides in the destination world while this side is empty air.
#[test]
fn test_far_side_floor_supports_straddling_body() {
    let mut pipeline = pipeline();
    // floor in the depths whose top sits half a unit below the
    // destination plane
    pipeline.universe.worlds[pipeline.depths].add_terrain(Aabb::new(
        Vec3::new(-16.0, 32.5, -16.0),
        Vec3::new(16.0, 33.5, 16.0),
    ));
    let body = falling_body(&mut pipeline);

    run_ticks(&mut pipeline, 80);

    let settled = &pipeline.universe.bodies[body];
    assert_eq!(settled.world, pipeline.overworld, "no teleport, only collision");
    assert!(
        (settled.position.y - 63.5).abs() < 1e-3,
        "feet rest half a unit through the plane: {:?}",
        settled.position
    );
    assert!(settled.is_straddling_portal());
    assert!(pipeline.frames.is_tracking(body));
}

/// With terrain on this side only, the body rests on it and the far side
/// contributes nothing.
#[test]
fn test_this_side_floor_wins_when_far_side_clear() {
    let mut pipeline = pipeline();
    pipeline.universe.worlds[pipeline.overworld].add_terrain(Aabb::new(
        Vec3::new(-16.0, 63.0, -16.0),
        Vec3::new(16.0, 64.0, 16.0),
    ));
    let body = falling_body(&mut pipeline);

    run_ticks(&mut pipeline, 80);

    let settled = &pipeline.universe.bodies[body];
    assert!(
        (settled.position.y - 64.0).abs() < 1e-3,
        "resting on the near-side floor: {:?}",
        settled.position
    );
    assert!(settled.is_straddling_portal());
}

/// A settled straddling body gets exactly one projected draw per frame
/// when viewed from the destination world.
#[test]
fn test_straddling_body_projects_into_destination_world() {
    let mut pipeline = pipeline();
    pipeline.universe.worlds[pipeline.depths].add_terrain(Aabb::new(
        Vec3::new(-16.0, 32.5, -16.0),
        Vec3::new(16.0, 33.5, 16.0),
    ));
    let body = falling_body(&mut pipeline);
    run_ticks(&mut pipeline, 80);
    assert!(pipeline.frames.is_tracking(body));

    let ctx = RenderContext::new(Vec3::new(5.0, 35.0, 0.0), pipeline.depths);
    let mut backend = TraceBackend::new();
    pipeline
        .frames
        .frame(&mut pipeline.universe, &ctx, &mut backend);

    let draws: Vec<&DrawEvent> = backend
        .events
        .iter()
        .filter(|e| matches!(e, DrawEvent::DrawBody { .. }))
        .collect();
    assert_eq!(draws.len(), 1, "one projected copy, no double draw");
    match draws[0] {
        DrawEvent::DrawBody { key, world, eye_pos } => {
            assert_eq!(*key, body);
            assert_eq!(*world, pipeline.depths);
            // eye carried through the portal's (0, -30, 0) offset
            assert!((eye_pos.y - (pipeline.universe.bodies[body].eye_pos().y - 30.0)).abs() < 1e-3);
        }
        _ => unreachable!(),
    }

    // viewed from the source world instead, the body draws normally and
    // nothing is projected
    let ctx = RenderContext::new(Vec3::new(5.0, 66.0, 0.0), pipeline.overworld);
    let mut backend = TraceBackend::new();
    pipeline
        .frames
        .frame(&mut pipeline.universe, &ctx, &mut backend);
    assert_eq!(backend.drawn_bodies(), vec![body]);
}

/// Leaving the portal neighborhood clears tracking within one tick.
#[test]
fn test_tracking_clears_after_leaving_portal() {
    let mut pipeline = pipeline();
    pipeline.universe.worlds[pipeline.depths].add_terrain(Aabb::new(
        Vec3::new(-16.0, 32.5, -16.0),
        Vec3::new(16.0, 33.5, 16.0),
    ));
    let body = falling_body(&mut pipeline);
    run_ticks(&mut pipeline, 80);
    assert!(pipeline.frames.is_tracking(body));

    pipeline.universe.bodies[body].set_position(Vec3::new(500.0, 70.0, 0.0));
    pipeline.universe.bodies[body].velocity = Vec3::ZERO;
    run_ticks(&mut pipeline, 1);

    assert!(!pipeline.universe.bodies[body].is_straddling_portal());
    assert!(!pipeline.frames.is_tracking(body));
}

/// The shipped demo scene loads, instantiates, and produces a straddling
/// body within a few seconds of simulation.
#[test]
fn test_demo_scene_runs() {
    let template = UniverseTemplate::load("scenes/demo.ron").expect("demo scene parses");
    let mut universe = template.instantiate().expect("demo scene instantiates");

    let config = AppConfig::default();
    let mut simulation = SimulationSystem::new(&config.simulation, &config.portals);
    for _ in 0..100 {
        simulation.tick(&mut universe, 1.0 / config.simulation.tick_rate);
    }

    let straddling = universe
        .bodies
        .values()
        .filter(|b| b.is_straddling_portal())
        .count();
    assert_eq!(straddling, 1, "the demo body ends up resting on the hatch");
}

/// Custom tick/portal settings flow from the config structs into the
/// systems.
#[test]
fn test_systems_accept_custom_config() {
    let simulation_config = SimulationConfig {
        gravity: -5.0,
        step_height: 0.0,
        tick_rate: 60.0,
    };
    let portal_config = PortalConfig {
        compensation_margin: 1.0,
        particle_depth_cap: 2,
        render_own_projection: false,
    };

    let mut universe = Universe::new();
    let world = universe.add_world(World::new("overworld"));
    universe.add_body(Body::new(
        BodyKind::Ordinary,
        world,
        Vec3::new(0.0, 10.0, 0.0),
        Vec3::new(0.3, 0.9, 0.3),
    ));

    let mut simulation = SimulationSystem::new(&simulation_config, &portal_config);
    simulation.tick(&mut universe, 1.0 / simulation_config.tick_rate);

    let frames = FrameSystem::new(&portal_config);
    let mut ctx = RenderContext::new(Vec3::ZERO, world);
    for _ in 0..3 {
        ctx.push_view(riftgate_core::PortalKey::default());
    }
    assert!(!frames.should_render_particles(&ctx));
}
