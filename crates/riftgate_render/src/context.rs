//! Per-frame render state
//!
//! Explicit context threaded through the draw call chain. Nesting into
//! portal views pushes onto the view stack; the projector and visibility
//! gates only ever read it. Keeping this a parameter rather than ambient
//! global state keeps the render path reentrant.

use riftgate_core::{PortalKey, Universe, Vec3, WorldId};

/// Render state for one frame
#[derive(Clone, Debug)]
pub struct RenderContext {
    /// Camera position in the world it is viewing from
    pub camera_pos: Vec3,
    /// World the camera body actually lives in
    pub camera_world: WorldId,
    /// Stack of portal views the renderer is currently inside, outermost
    /// first
    view_stack: Vec<PortalKey>,
}

impl RenderContext {
    /// Create a context for a camera
    pub fn new(camera_pos: Vec3, camera_world: WorldId) -> Self {
        Self {
            camera_pos,
            camera_world,
            view_stack: Vec::new(),
        }
    }

    /// Whether the renderer is currently inside any portal view
    pub fn is_portal_rendering(&self) -> bool {
        !self.view_stack.is_empty()
    }

    /// The portal view being rendered right now, if any
    pub fn rendering_portal(&self) -> Option<PortalKey> {
        self.view_stack.last().copied()
    }

    /// Current nesting depth of portal views
    pub fn depth(&self) -> usize {
        self.view_stack.len()
    }

    /// Enter a portal view
    ///
    /// Called by the host's portal renderer; this crate never nests views
    /// on its own.
    pub fn push_view(&mut self, portal: PortalKey) {
        self.view_stack.push(portal);
    }

    /// Leave the innermost portal view
    pub fn pop_view(&mut self) -> Option<PortalKey> {
        self.view_stack.pop()
    }

    /// The world whose content is being drawn right now
    ///
    /// Inside a portal view that is the view portal's destination world;
    /// otherwise the camera's own world. A stale view portal falls back to
    /// the camera world.
    pub fn viewed_world(&self, universe: &Universe) -> WorldId {
        self.rendering_portal()
            .and_then(|key| universe.portal(key))
            .map(|portal| portal.dest_world)
            .unwrap_or(self.camera_world)
    }
}
