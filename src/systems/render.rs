//! Render frame system
//!
//! Walks the bodies of the currently viewed world through one frame:
//! visibility gating, clipped ordinary draws, then the cross-portal
//! projections. The actual draw primitives come from whatever
//! `RenderBackend` the host supplies.

use riftgate_core::{BodyKey, Universe};
use riftgate_render::{CrossPortalProjector, RenderBackend, RenderContext};

use crate::config::PortalConfig;

/// Manages the per-frame render pass over bodies
pub struct FrameSystem {
    projector: CrossPortalProjector,
}

impl FrameSystem {
    /// Create a frame system from configuration
    pub fn new(portals: &PortalConfig) -> Self {
        let mut projector = CrossPortalProjector::new();
        projector.render_own_projection = portals.render_own_projection;
        projector.max_particle_view_depth = portals.particle_depth_cap;
        Self { projector }
    }

    /// Refresh projector tracking; call once per simulation tick
    pub fn on_tick(&mut self, universe: &Universe) {
        self.projector.tick(universe);
    }

    /// Whether a body currently gets cross-portal draw treatment
    pub fn is_tracking(&self, key: BodyKey) -> bool {
        self.projector.is_tracked(key)
    }

    /// Whether particle systems may render at the current nesting depth
    pub fn should_render_particles(&self, ctx: &RenderContext) -> bool {
        self.projector.should_render_particles(ctx)
    }

    /// Render one frame's body pass
    pub fn frame(
        &mut self,
        universe: &mut Universe,
        ctx: &RenderContext,
        backend: &mut dyn RenderBackend,
    ) {
        self.projector.begin_body_pass(universe, ctx, backend);

        let viewed_world = ctx.viewed_world(universe);
        let keys: Vec<BodyKey> = universe
            .bodies_in_world(viewed_world)
            .map(|(key, _)| key)
            .collect();
        for key in keys {
            if !self.projector.should_draw_body_now(universe, ctx, key) {
                continue;
            }
            self.projector.before_body_draw(universe, ctx, backend, key);
            if let Some(body) = universe.body(key) {
                backend.draw_body(key, body, body.world, body.eye_pos());
            }
            self.projector.after_body_draw(ctx, backend, key);
        }

        self.projector.end_body_pass(universe, ctx, backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riftgate_core::{Body, BodyKind, Portal, Vec3, World};
    use riftgate_render::{DrawEvent, TraceBackend};

    #[test]
    fn test_frame_draws_viewed_world_only() {
        let mut universe = Universe::new();
        let overworld = universe.add_world(World::new("overworld"));
        let depths = universe.add_world(World::new("depths"));
        let here = universe.add_body(Body::new(
            BodyKind::Ordinary,
            overworld,
            Vec3::new(0.0, 64.0, 0.0),
            Vec3::new(0.3, 0.9, 0.3),
        ));
        universe.add_body(Body::new(
            BodyKind::Ordinary,
            depths,
            Vec3::new(0.0, 30.0, 0.0),
            Vec3::new(0.3, 0.9, 0.3),
        ));

        let mut system = FrameSystem::new(&PortalConfig::default());
        system.on_tick(&universe);
        let ctx = RenderContext::new(Vec3::new(5.0, 65.0, 0.0), overworld);
        let mut backend = TraceBackend::new();
        system.frame(&mut universe, &ctx, &mut backend);

        assert_eq!(backend.drawn_bodies(), vec![here]);
    }

    #[test]
    fn test_frame_projects_straddling_body() {
        let mut universe = Universe::new();
        let overworld = universe.add_world(World::new("overworld"));
        let depths = universe.add_world(World::new("depths"));
        let portal = universe.add_portal(Portal::new(
            overworld,
            Vec3::new(100.0, 64.0, 0.0),
            -Vec3::Z,
            Vec3::Y,
            2.0,
            3.0,
            depths,
            Vec3::new(10.0, 30.0, 5.0),
        ));
        let straddler = universe.add_body(Body::new(
            BodyKind::Ordinary,
            overworld,
            Vec3::new(100.2, 63.0, 0.0),
            Vec3::new(0.5, 1.0, 0.5),
        ));
        universe.bodies[straddler].colliding_portal = Some(portal);

        let mut system = FrameSystem::new(&PortalConfig::default());
        system.on_tick(&universe);
        assert!(system.is_tracking(straddler));

        // viewed from the destination world: the straddler's own draw is
        // skipped (wrong world) but its projection lands here
        let ctx = RenderContext::new(Vec3::new(5.0, 31.0, 5.0), depths);
        let mut backend = TraceBackend::new();
        system.frame(&mut universe, &ctx, &mut backend);

        let draws: Vec<&DrawEvent> = backend
            .events
            .iter()
            .filter(|e| matches!(e, DrawEvent::DrawBody { .. }))
            .collect();
        assert_eq!(draws.len(), 1);
        match draws[0] {
            DrawEvent::DrawBody { key, world, .. } => {
                assert_eq!(*key, straddler);
                assert_eq!(*world, depths);
            }
            _ => unreachable!(),
        }
    }
}
