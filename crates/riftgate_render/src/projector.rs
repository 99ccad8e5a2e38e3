//! Cross-portal body projection
//!
//! Tracks which bodies are straddling a portal and, each frame, draws a
//! clipped copy of every tracked body on the destination side so it
//! appears to continue through the portal, with no double-draw and no
//! geometry leaking past the portal frame.

use std::collections::HashSet;

use log::{debug, trace};
use riftgate_core::{Body, BodyKey, BodyKind, Portal, Universe, Vec3, WorldId};

use crate::backend::RenderBackend;
use crate::clip::{inner_clip_plane, outer_clip_plane};
use crate::context::RenderContext;

/// Particle systems stop rendering above this many nested portal views
pub const MAX_PARTICLE_VIEW_DEPTH: usize = 4;

/// Containment slack for a projected eye inside the current portal view
const PROJECTED_EYE_TOLERANCE: f32 = -3.0;

/// Containment slack for ordinary draws inside a portal view
const VISIBILITY_TOLERANCE: f32 = -0.01;

/// Base of the minimum camera distance for drawing the camera body's own
/// projection; the body's per-tick movement is added on top
const MIN_SELF_PROJECTION_DISTANCE: f32 = 0.5;

/// Tracks straddling bodies and issues their clipped and projected draws
///
/// Membership mirrors the proximity tracker's back-references and is
/// refreshed once per simulation tick, not per frame. The set holds
/// generational keys, so removed bodies drop out instead of dangling.
pub struct CrossPortalProjector {
    tracked: HashSet<BodyKey>,
    /// Draw the camera body's own projection when it straddles a portal
    pub render_own_projection: bool,
    /// Nested-view depth above which particles are suppressed
    pub max_particle_view_depth: usize,
}

impl Default for CrossPortalProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossPortalProjector {
    /// Create a projector with nothing tracked
    pub fn new() -> Self {
        Self {
            tracked: HashSet::new(),
            render_own_projection: true,
            max_particle_view_depth: MAX_PARTICLE_VIEW_DEPTH,
        }
    }

    /// Refresh tracked-set membership from the back-references
    ///
    /// Called once per simulation tick. Bodies whose back-reference
    /// cleared, and bodies that no longer exist, drop out; straddling
    /// bodies join. Portal actors never join: the portal itself is not
    /// projected.
    pub fn tick(&mut self, universe: &Universe) {
        self.tracked
            .retain(|key| universe.body(*key).is_some_and(|b| b.is_straddling_portal()));
        for (key, body) in universe.bodies.iter() {
            if body.kind != BodyKind::PortalActor && body.is_straddling_portal() {
                self.tracked.insert(key);
            }
        }
    }

    /// Whether a body currently gets cross-portal draw treatment
    pub fn is_tracked(&self, key: BodyKey) -> bool {
        self.tracked.contains(&key)
    }

    /// Called before any bodies are drawn for the current pass
    ///
    /// Inside a portal view, installs the view portal's inner clip plane so
    /// bodies beyond the far boundary stay out of this view.
    pub fn begin_body_pass(
        &self,
        universe: &Universe,
        ctx: &RenderContext,
        backend: &mut dyn RenderBackend,
    ) {
        let Some(portal) = ctx.rendering_portal().and_then(|k| universe.portal(k)) else {
            return;
        };
        backend.set_clip_plane(inner_clip_plane(portal));
        backend.enable_clipping();
    }

    /// Called right before one body's ordinary draw
    ///
    /// Outside portal views, a tracked body gets the colliding portal's
    /// outer clip plane so only its near-side portion renders.
    pub fn before_body_draw(
        &self,
        universe: &Universe,
        ctx: &RenderContext,
        backend: &mut dyn RenderBackend,
        key: BodyKey,
    ) {
        if ctx.is_portal_rendering() || !self.is_tracked(key) {
            return;
        }
        let Some(body) = universe.body(key) else {
            return;
        };
        let Some((_, portal)) = universe.colliding_portal_of(body) else {
            debug!("colliding portal record invalid for body {:?}", key);
            return;
        };

        // draw already batched triangles before the clip state changes
        backend.flush();
        let plane = outer_clip_plane(portal);
        backend.set_clip_plane(plane);
        backend.enable_clipping();
        if backend.has_shader_clipping() {
            backend.update_shader_clipping(plane);
        }
    }

    /// Called right after one body's ordinary draw
    pub fn after_body_draw(
        &self,
        ctx: &RenderContext,
        backend: &mut dyn RenderBackend,
        key: BodyKey,
    ) {
        if ctx.is_portal_rendering() || !self.is_tracked(key) {
            return;
        }
        // the clipped body gets its own draw call
        backend.flush();
        backend.disable_clipping();
    }

    /// Called after all ordinary bodies are drawn for the pass
    ///
    /// Draws the projected copy of every tracked body whose colliding
    /// portal leads into the world being viewed.
    pub fn end_body_pass(
        &self,
        universe: &mut Universe,
        ctx: &RenderContext,
        backend: &mut dyn RenderBackend,
    ) {
        let viewed_world = ctx.viewed_world(universe);
        let keys: Vec<BodyKey> = self.tracked.iter().copied().collect();
        for key in keys {
            self.render_projection(universe, ctx, backend, key, viewed_world);
        }
    }

    fn render_projection(
        &self,
        universe: &mut Universe,
        ctx: &RenderContext,
        backend: &mut dyn RenderBackend,
        key: BodyKey,
        viewed_world: WorldId,
    ) {
        let Universe {
            bodies, portals, ..
        } = universe;
        let Some(body) = bodies.get_mut(key) else {
            return;
        };
        let Some(portal_key) = body.colliding_portal else {
            debug!("colliding portal record invalid for body {:?}", key);
            return;
        };
        let Some(portal) = portals.get(portal_key) else {
            debug!("colliding portal of body {:?} no longer exists", key);
            return;
        };
        if portal.mirror {
            // a mirror has no distinct destination to project into
            return;
        }
        if portal.has_rotation() || portal.has_scaling() {
            trace!("skipping projection through transformed portal {:?}", portal_key);
            return;
        }
        if portal.dest_world != viewed_world {
            return;
        }

        if let Some(rendering_key) = ctx.rendering_portal() {
            let Some(rendering_portal) = portals.get(rendering_key) else {
                return;
            };
            // correct rendering here needs two culling planes; skip the
            // flipped twin and hidden content instead
            if rendering_portal.is_flipped_with(portal) {
                return;
            }
            let hidden =
                (ctx.camera_pos - portal.destination).dot(portal.content_direction()) < 0.0;
            if rendering_key == portal_key || !hidden {
                self.draw_projected(body, key, portal, Some(rendering_portal), ctx, backend);
            }
        } else {
            // leave the outer-clipped batch before switching planes
            backend.disable_clipping();
            backend.flush();
            backend.set_clip_plane(inner_clip_plane(portal));
            backend.enable_clipping();
            self.draw_projected(body, key, portal, None, ctx, backend);
            backend.disable_clipping();
        }
    }

    fn draw_projected(
        &self,
        body: &mut Body,
        key: BodyKey,
        portal: &Portal,
        rendering_portal: Option<&Portal>,
        ctx: &RenderContext,
        backend: &mut dyn RenderBackend,
    ) {
        let new_eye = portal.transform_point(body.eye_pos());

        if let Some(rendering_portal) = rendering_portal {
            if !rendering_portal.is_inside(new_eye, PROJECTED_EYE_TOLERANCE) {
                return;
            }
        }

        if body.kind == BodyKind::LocalCamera {
            if !self.render_own_projection {
                return;
            }
            // too near the camera the projection blocks the whole view
            let valve = MIN_SELF_PROJECTION_DISTANCE + body.tick_movement();
            if new_eye.distance_to(ctx.camera_pos) < valve {
                trace!("camera body projection too close, skipping");
                return;
            }
        }

        let new_last_tick_eye = portal.transform_point(body.last_tick_eye_pos());

        let guard = EyeRestore::new(body);
        guard.body.set_eye_pos(new_eye, new_last_tick_eye);
        guard.body.world = portal.dest_world;
        backend.draw_body(key, guard.body, portal.dest_world, new_eye);
        // this one body must not linger in the default batch
        backend.flush();
    }

    /// Visibility gate for a body's ordinary draw
    ///
    /// Outside portal views every body draws. Inside a view a body draws
    /// only when it sits within the view portal's interior projection and,
    /// if it straddles a different portal, is not hidden behind that
    /// portal's back face.
    pub fn should_draw_body_now(
        &self,
        universe: &Universe,
        ctx: &RenderContext,
        key: BodyKey,
    ) -> bool {
        let Some(rendering_key) = ctx.rendering_portal() else {
            return true;
        };
        let Some(body) = universe.body(key) else {
            return false;
        };
        let Some(rendering_portal) = universe.portal(rendering_key) else {
            return false;
        };

        if body.kind == BodyKind::LocalCamera {
            return self.should_draw_own_body(ctx, body);
        }

        if let Some((_, colliding_portal)) = universe.colliding_portal_of(body) {
            if !colliding_portal.is_reverse_of(rendering_portal) {
                let hidden =
                    (ctx.camera_pos - colliding_portal.position).dot(colliding_portal.normal) < 0.0;
                if hidden {
                    return false;
                }
            }
        }

        rendering_portal.is_inside(body.eye_pos(), VISIBILITY_TOLERANCE)
    }

    /// Whether the camera body itself draws inside a portal view
    fn should_draw_own_body(&self, ctx: &RenderContext, body: &Body) -> bool {
        self.render_own_projection
            && ctx.is_portal_rendering()
            && body.world == ctx.camera_world
    }

    /// Whether particle systems may render at the current nesting depth
    pub fn should_render_particles(&self, ctx: &RenderContext) -> bool {
        ctx.depth() <= self.max_particle_view_depth
    }
}

/// Reverts the eye/world swap of a projected draw on every exit path
struct EyeRestore<'a> {
    body: &'a mut Body,
    position: Vec3,
    last_tick_position: Vec3,
    world: WorldId,
}

impl<'a> EyeRestore<'a> {
    fn new(body: &'a mut Body) -> Self {
        let position = body.position;
        let last_tick_position = body.last_tick_position;
        let world = body.world;
        Self {
            body,
            position,
            last_tick_position,
            world,
        }
    }
}

impl Drop for EyeRestore<'_> {
    fn drop(&mut self) {
        self.body.position = self.position;
        self.body.last_tick_position = self.last_tick_position;
        self.body.world = self.world;
    }
}
