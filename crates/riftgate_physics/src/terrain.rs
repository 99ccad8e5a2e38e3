//! Default static-terrain movement integrator
//!
//! The engine-default "attempt a move, resolve against static terrain"
//! routine: per-axis clamping of a swept box against a world's solid boxes,
//! with a step-up assist so bodies walk onto slabs and stairs. Hosts with
//! their own integrator pass that instead; the portal resolver only sees
//! the closure.

use riftgate_core::{Aabb, Body, Vec3, World, WorldId};
use slotmap::SlotMap;

/// Default maximum ledge height a body steps onto without jumping
pub const DEFAULT_STEP_HEIGHT: f32 = 0.6;

const AXIS_EPSILON: f32 = 1e-5;

/// Resolves moves against the static terrain of whichever world a body is
/// currently in
///
/// Borrows the world arena only, so a body can be mutably held elsewhere
/// while moves are attempted for it.
pub struct TerrainResolver<'a> {
    worlds: &'a SlotMap<WorldId, World>,
    step_height: f32,
}

impl<'a> TerrainResolver<'a> {
    /// Create a resolver over a world arena
    pub fn new(worlds: &'a SlotMap<WorldId, World>) -> Self {
        Self {
            worlds,
            step_height: DEFAULT_STEP_HEIGHT,
        }
    }

    /// Override the step height (0 disables the step-up assist)
    pub fn with_step_height(mut self, step_height: f32) -> Self {
        self.step_height = step_height;
        self
    }

    /// Attempt to move the body's box through its current world
    ///
    /// Returns the portion of `desired` that does not push the box into
    /// terrain. An unresolvable world id passes the move through.
    pub fn attempt_move(&self, body: &Body, desired: Vec3) -> Vec3 {
        let Some(world) = self.worlds.get(body.world) else {
            return desired;
        };

        let moved = sweep(world, &body.aabb, desired);

        // step-up assist: horizontal motion got clamped while moving along
        // the ground, so retry raised by the step height and settle back
        // down onto whatever blocked us
        let blocked_horizontally = (moved.x - desired.x).abs() > AXIS_EPSILON
            || (moved.z - desired.z).abs() > AXIS_EPSILON;
        if self.step_height > 0.0 && desired.y <= 0.0 && blocked_horizontally {
            let raised = sweep(
                world,
                &body.aabb,
                Vec3::new(desired.x, self.step_height, desired.z),
            );
            let settle = sweep(
                world,
                &body.aabb.offset(raised),
                Vec3::new(0.0, desired.y - self.step_height, 0.0),
            );
            let stepped = raised + settle;
            let stepped_sq = stepped.x * stepped.x + stepped.z * stepped.z;
            let moved_sq = moved.x * moved.x + moved.z * moved.z;
            if stepped_sq > moved_sq {
                return stepped;
            }
        }

        moved
    }
}

/// Clamp a move axis by axis against the terrain boxes near the sweep
///
/// Vertical first, so a body falling while walking lands before the walls
/// it grazes clamp it.
fn sweep(world: &World, aabb: &Aabb, desired: Vec3) -> Vec3 {
    let region = aabb.stretch(desired).expand(1e-3);
    let terrain: Vec<&Aabb> = world.terrain_in(&region).collect();

    let dy = clamp_y(&terrain, aabb, desired.y);
    let shifted = aabb.offset(Vec3::new(0.0, dy, 0.0));
    let dx = clamp_x(&terrain, &shifted, desired.x);
    let shifted = shifted.offset(Vec3::new(dx, 0.0, 0.0));
    let dz = clamp_z(&terrain, &shifted, desired.z);

    Vec3::new(dx, dy, dz)
}

fn clamp_y(terrain: &[&Aabb], aabb: &Aabb, mut d: f32) -> f32 {
    for b in terrain {
        let overlaps = aabb.min.x < b.max.x
            && aabb.max.x > b.min.x
            && aabb.min.z < b.max.z
            && aabb.max.z > b.min.z;
        if !overlaps {
            continue;
        }
        if d > 0.0 && b.min.y >= aabb.max.y {
            d = d.min(b.min.y - aabb.max.y);
        } else if d < 0.0 && b.max.y <= aabb.min.y {
            d = d.max(b.max.y - aabb.min.y);
        }
    }
    d
}

fn clamp_x(terrain: &[&Aabb], aabb: &Aabb, mut d: f32) -> f32 {
    for b in terrain {
        let overlaps = aabb.min.y < b.max.y
            && aabb.max.y > b.min.y
            && aabb.min.z < b.max.z
            && aabb.max.z > b.min.z;
        if !overlaps {
            continue;
        }
        if d > 0.0 && b.min.x >= aabb.max.x {
            d = d.min(b.min.x - aabb.max.x);
        } else if d < 0.0 && b.max.x <= aabb.min.x {
            d = d.max(b.max.x - aabb.min.x);
        }
    }
    d
}

fn clamp_z(terrain: &[&Aabb], aabb: &Aabb, mut d: f32) -> f32 {
    for b in terrain {
        let overlaps = aabb.min.x < b.max.x
            && aabb.max.x > b.min.x
            && aabb.min.y < b.max.y
            && aabb.max.y > b.min.y;
        if !overlaps {
            continue;
        }
        if d > 0.0 && b.min.z >= aabb.max.z {
            d = d.min(b.min.z - aabb.max.z);
        } else if d < 0.0 && b.max.z <= aabb.min.z {
            d = d.max(b.max.z - aabb.min.z);
        }
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use riftgate_core::{BodyKind, Universe};

    const EPSILON: f32 = 1e-4;

    struct Fixture {
        universe: Universe,
        world: WorldId,
    }

    fn fixture_with_floor() -> Fixture {
        let mut universe = Universe::new();
        let mut overworld = World::new("overworld");
        // floor slab from y 63 to 64
        overworld.add_terrain(Aabb::new(
            Vec3::new(-32.0, 63.0, -32.0),
            Vec3::new(32.0, 64.0, 32.0),
        ));
        let world = universe.add_world(overworld);
        Fixture { universe, world }
    }

    fn body_at(world: WorldId, position: Vec3) -> Body {
        Body::new(BodyKind::Ordinary, world, position, Vec3::new(0.3, 0.9, 0.3))
    }

    #[test]
    fn test_free_fall_is_unclamped() {
        let fx = fixture_with_floor();
        let body = body_at(fx.world, Vec3::new(0.0, 80.0, 0.0));
        let resolver = TerrainResolver::new(&fx.universe.worlds);

        let moved = resolver.attempt_move(&body, Vec3::new(0.0, -0.5, 0.0));
        assert_eq!(moved, Vec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_fall_clamps_onto_floor() {
        let fx = fixture_with_floor();
        let body = body_at(fx.world, Vec3::new(0.0, 64.2, 0.0));
        let resolver = TerrainResolver::new(&fx.universe.worlds);

        let moved = resolver.attempt_move(&body, Vec3::new(0.0, -0.5, 0.0));
        assert!((moved.y + 0.2).abs() < EPSILON, "clamped to land: {:?}", moved);
    }

    #[test]
    fn test_wall_blocks_horizontal_move() {
        let mut fx = fixture_with_floor();
        // tall wall ahead; too high to step onto
        fx.universe.worlds[fx.world].add_terrain(Aabb::new(
            Vec3::new(2.0, 64.0, -32.0),
            Vec3::new(3.0, 68.0, 32.0),
        ));
        let body = body_at(fx.world, Vec3::new(0.0, 64.0, 0.0));
        let resolver = TerrainResolver::new(&fx.universe.worlds);

        let moved = resolver.attempt_move(&body, Vec3::new(4.0, 0.0, 0.0));
        assert!((moved.x - 1.7).abs() < EPSILON, "stopped at the wall: {:?}", moved);
        assert_eq!(moved.y, 0.0);
    }

    #[test]
    fn test_step_up_onto_slab() {
        let mut fx = fixture_with_floor();
        // half-slab ahead, top at y 64.5
        fx.universe.worlds[fx.world].add_terrain(Aabb::new(
            Vec3::new(1.0, 64.0, -32.0),
            Vec3::new(3.0, 64.5, 32.0),
        ));
        let body = body_at(fx.world, Vec3::new(0.0, 64.0, 0.0));
        let resolver = TerrainResolver::new(&fx.universe.worlds);

        // walking forward while settling downward
        let moved = resolver.attempt_move(&body, Vec3::new(0.8, -0.1, 0.0));
        assert!((moved.x - 0.8).abs() < EPSILON, "kept walking: {:?}", moved);
        assert!(moved.y > 0.0, "stepped up: {:?}", moved);
        assert!((moved.y - 0.5).abs() < EPSILON, "landed on the slab top: {:?}", moved);
    }

    #[test]
    fn test_step_assist_disabled_by_zero_height() {
        let mut fx = fixture_with_floor();
        fx.universe.worlds[fx.world].add_terrain(Aabb::new(
            Vec3::new(1.0, 64.0, -32.0),
            Vec3::new(3.0, 64.5, 32.0),
        ));
        let body = body_at(fx.world, Vec3::new(0.0, 64.0, 0.0));
        let resolver = TerrainResolver::new(&fx.universe.worlds).with_step_height(0.0);

        let moved = resolver.attempt_move(&body, Vec3::new(0.8, -0.1, 0.0));
        assert!((moved.x - 0.7).abs() < EPSILON, "blocked by the slab: {:?}", moved);
    }

    #[test]
    fn test_unknown_world_passes_move_through() {
        let fx = fixture_with_floor();
        let mut foreign = Universe::new();
        let foreign_world = foreign.add_world(World::new("elsewhere"));
        let body = body_at(foreign_world, Vec3::new(0.0, 64.2, 0.0));
        let resolver = TerrainResolver::new(&fx.universe.worlds);

        let moved = resolver.attempt_move(&body, Vec3::new(0.0, -0.5, 0.0));
        assert_eq!(moved, Vec3::new(0.0, -0.5, 0.0));
    }
}
