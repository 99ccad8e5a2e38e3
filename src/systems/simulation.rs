//! Simulation tick system
//!
//! Runs one authoritative tick: gravity and velocity integration, movement
//! resolution against static terrain (routed through the portal resolver
//! for straddling bodies), then the proximity scan that refreshes every
//! body's colliding-portal back-reference.

use riftgate_core::{BodyKey, BodyKind, Universe};
use riftgate_physics::{resolve_straddling_move, ProximityTracker, TerrainResolver};

use crate::config::{PortalConfig, SimulationConfig};

const VELOCITY_EPSILON: f32 = 1e-5;

/// Manages the fixed-rate simulation loop
pub struct SimulationSystem {
    gravity: f32,
    step_height: f32,
    tracker: ProximityTracker,
}

impl SimulationSystem {
    /// Create a simulation system from configuration
    pub fn new(simulation: &SimulationConfig, portals: &PortalConfig) -> Self {
        Self {
            gravity: simulation.gravity,
            step_height: simulation.step_height,
            tracker: ProximityTracker::new()
                .with_compensation_margin(portals.compensation_margin),
        }
    }

    /// Run one simulation tick of `dt` seconds
    pub fn tick(&mut self, universe: &mut Universe, dt: f32) {
        let keys: Vec<BodyKey> = universe.bodies.keys().collect();
        for key in keys {
            self.move_body(universe, key, dt);
        }

        self.tracker.tick(universe, dt);
    }

    /// Integrate one body and resolve its move
    fn move_body(&self, universe: &mut Universe, key: BodyKey, dt: f32) {
        // split the arenas: the body is mutated while worlds and portals
        // are read by the resolvers
        let Universe {
            bodies,
            worlds,
            portals,
            ..
        } = universe;
        let Some(body) = bodies.get_mut(key) else {
            return;
        };
        if body.kind == BodyKind::PortalActor {
            return;
        }

        body.velocity.y += self.gravity * dt;
        body.last_tick_position = body.position;
        let attempted = body.velocity * dt;

        let terrain = TerrainResolver::new(worlds).with_step_height(self.step_height);
        let actual = match body.colliding_portal.and_then(|k| portals.get(k)) {
            Some(portal) => resolve_straddling_move(body, portal, attempted, |b, desired| {
                terrain.attempt_move(b, desired)
            }),
            None => terrain.attempt_move(body, attempted),
        };

        body.apply_move(actual);

        // kill velocity on axes where the terrain won
        if (actual.x - attempted.x).abs() > VELOCITY_EPSILON {
            body.velocity.x = 0.0;
        }
        if (actual.y - attempted.y).abs() > VELOCITY_EPSILON {
            body.velocity.y = 0.0;
        }
        if (actual.z - attempted.z).abs() > VELOCITY_EPSILON {
            body.velocity.z = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riftgate_core::{Aabb, Body, Vec3, World};

    fn default_system() -> SimulationSystem {
        SimulationSystem::new(&SimulationConfig::default(), &PortalConfig::default())
    }

    #[test]
    fn test_body_falls_and_lands() {
        let mut universe = Universe::new();
        let mut world = World::new("overworld");
        world.add_terrain(Aabb::new(
            Vec3::new(-32.0, 63.0, -32.0),
            Vec3::new(32.0, 64.0, 32.0),
        ));
        let world = universe.add_world(world);
        let body = universe.add_body(Body::new(
            BodyKind::Ordinary,
            world,
            Vec3::new(0.0, 66.0, 0.0),
            Vec3::new(0.3, 0.9, 0.3),
        ));

        let mut system = default_system();
        for _ in 0..60 {
            system.tick(&mut universe, 0.05);
        }

        let landed = &universe.bodies[body];
        assert!(
            (landed.position.y - 64.0).abs() < 1e-3,
            "resting on the floor: {:?}",
            landed.position
        );
        assert_eq!(landed.velocity.y, 0.0);
    }

    #[test]
    fn test_portal_actor_is_not_integrated() {
        let mut universe = Universe::new();
        let world = universe.add_world(World::new("overworld"));
        let actor = universe.add_body(Body::new(
            BodyKind::PortalActor,
            world,
            Vec3::new(0.0, 66.0, 0.0),
            Vec3::new(0.5, 1.5, 0.1),
        ));

        let mut system = default_system();
        system.tick(&mut universe, 0.05);

        assert_eq!(universe.bodies[actor].position, Vec3::new(0.0, 66.0, 0.0));
        assert_eq!(universe.bodies[actor].velocity, Vec3::ZERO);
    }

    #[test]
    fn test_last_tick_position_updates() {
        let mut universe = Universe::new();
        let world = universe.add_world(World::new("overworld"));
        let body = universe.add_body(
            Body::new(
                BodyKind::Ordinary,
                world,
                Vec3::new(0.0, 66.0, 0.0),
                Vec3::new(0.3, 0.9, 0.3),
            )
            .with_velocity(Vec3::new(2.0, 0.0, 0.0)),
        );

        let mut system = default_system();
        system.tick(&mut universe, 0.05);

        let moved = &universe.bodies[body];
        assert_eq!(moved.last_tick_position, Vec3::new(0.0, 66.0, 0.0));
        assert!(moved.position.x > 0.0);
        assert!(moved.tick_movement() > 0.0);
    }
}
