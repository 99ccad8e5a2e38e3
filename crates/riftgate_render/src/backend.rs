//! Render backend seam
//!
//! The portal projector does not own a GPU. Everything it needs from the
//! host renderer goes through this trait: installing the active clip
//! plane, flushing batched draw commands, and drawing one body.

use log::trace;
use riftgate_core::{Body, BodyKey, Plane, Vec3, WorldId};

/// Draw primitives supplied by the host renderer
pub trait RenderBackend {
    /// Submit all batched draw commands now
    fn flush(&mut self);

    /// Replace the active clip plane
    fn set_clip_plane(&mut self, plane: Plane);

    /// Start discarding geometry behind the active clip plane
    fn enable_clipping(&mut self);

    /// Stop clipping
    fn disable_clipping(&mut self);

    /// Whether a secondary shader-based clipping system is present
    fn has_shader_clipping(&self) -> bool {
        false
    }

    /// Mirror the active clip plane into the shader clipping system
    fn update_shader_clipping(&mut self, _plane: Plane) {}

    /// Draw one body in a world with the given eye position
    fn draw_body(&mut self, key: BodyKey, body: &Body, world: WorldId, eye_pos: Vec3);
}

/// What a [`TraceBackend`] recorded
#[derive(Clone, Debug, PartialEq)]
pub enum DrawEvent {
    Flush,
    ClipPlane(Plane),
    EnableClipping,
    DisableClipping,
    DrawBody {
        key: BodyKey,
        world: WorldId,
        eye_pos: Vec3,
    },
}

/// Backend that records every call, for tests and headless runs
#[derive(Default)]
pub struct TraceBackend {
    /// Every call in order
    pub events: Vec<DrawEvent>,
    clipping: bool,
}

impl TraceBackend {
    /// Create an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// The bodies drawn so far, in order
    pub fn drawn_bodies(&self) -> Vec<BodyKey> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DrawEvent::DrawBody { key, .. } => Some(*key),
                _ => None,
            })
            .collect()
    }

    /// Whether clipping is enabled right now
    pub fn clipping_enabled(&self) -> bool {
        self.clipping
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl RenderBackend for TraceBackend {
    fn flush(&mut self) {
        trace!("flush");
        self.events.push(DrawEvent::Flush);
    }

    fn set_clip_plane(&mut self, plane: Plane) {
        trace!("clip plane at {:?}", plane.position);
        self.events.push(DrawEvent::ClipPlane(plane));
    }

    fn enable_clipping(&mut self) {
        self.clipping = true;
        self.events.push(DrawEvent::EnableClipping);
    }

    fn disable_clipping(&mut self) {
        self.clipping = false;
        self.events.push(DrawEvent::DisableClipping);
    }

    fn draw_body(&mut self, key: BodyKey, body: &Body, world: WorldId, eye_pos: Vec3) {
        trace!("draw body {:?} ({:?}) in {:?}", key, body.kind, world);
        self.events.push(DrawEvent::DrawBody {
            key,
            world,
            eye_pos,
        });
    }
}
