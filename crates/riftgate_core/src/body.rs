//! Moving bodies

use bitflags::bitflags;
use riftgate_math::{Aabb, Vec3};
use serde::{Serialize, Deserialize};
use slotmap::new_key_type;

use crate::portal::PortalKey;
use crate::world::WorldId;

new_key_type! {
    /// Key to a body in the universe
    ///
    /// Uses generational indexing to prevent the ABA problem where a handle
    /// could point to a reused slot. If a body is removed and its slot
    /// reused, old keys will return None instead of pointing to the wrong
    /// body.
    pub struct BodyKey;
}

/// What a body is, beyond an ordinary moving object
///
/// The set of special cases is small and fixed, so this is a closed enum
/// rather than open-ended type inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// A regular simulated object
    Ordinary,
    /// The body the local camera follows
    LocalCamera,
    /// The body that represents a portal itself in the simulation
    PortalActor,
}

impl BodyKind {
    /// The mask bit for this kind
    pub fn mask(self) -> BodyKindMask {
        match self {
            BodyKind::Ordinary => BodyKindMask::ORDINARY,
            BodyKind::LocalCamera => BodyKindMask::LOCAL_CAMERA,
            BodyKind::PortalActor => BodyKindMask::PORTAL_ACTOR,
        }
    }
}

bitflags! {
    /// Filter over body kinds
    ///
    /// Portals carry one of these to decide which bodies they accept as
    /// teleportation candidates.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct BodyKindMask: u8 {
        const ORDINARY = 1 << 0;
        const LOCAL_CAMERA = 1 << 1;
        const PORTAL_ACTOR = 1 << 2;
        const ALL = 0xFF;
    }
}

impl BodyKindMask {
    /// Every kind a portal moves by default: portal actors never teleport
    pub fn teleportable() -> Self {
        Self::ALL & !Self::PORTAL_ACTOR
    }
}

/// A moving simulated object
///
/// Positions are feet-level; the eye sits `eye_height` above. The
/// `colliding_portal` back-reference is a weak association re-derived every
/// tick by the proximity tracker; it is a key, not a reference, so a
/// destroyed portal can never leave a dangling pointer behind.
#[derive(Clone, Debug)]
pub struct Body {
    /// What kind of body this is
    pub kind: BodyKind,
    /// World this body currently belongs to
    pub world: WorldId,
    /// Position (feet level, box bottom center)
    pub position: Vec3,
    /// Position at the end of the previous tick
    pub last_tick_position: Vec3,
    /// Velocity in units per second
    pub velocity: Vec3,
    /// Collision bounding box in world coordinates
    pub aabb: Aabb,
    /// Eye offset above the position
    pub eye_height: f32,
    /// Portal this body is currently straddling, if any
    pub colliding_portal: Option<PortalKey>,
}

impl Body {
    /// Create a body of the given kind at a position
    ///
    /// `half_extents.y` is the half-height; the box bottom sits at the
    /// position.
    pub fn new(kind: BodyKind, world: WorldId, position: Vec3, half_extents: Vec3) -> Self {
        Self {
            kind,
            world,
            position,
            last_tick_position: position,
            velocity: Vec3::ZERO,
            aabb: Self::box_at(position, half_extents),
            // eyes sit at 90% of the body height unless overridden
            eye_height: half_extents.y * 1.8,
            colliding_portal: None,
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the eye offset above the position
    pub fn with_eye_height(mut self, eye_height: f32) -> Self {
        self.eye_height = eye_height;
        self
    }

    fn box_at(position: Vec3, half_extents: Vec3) -> Aabb {
        Aabb::new(
            Vec3::new(
                position.x - half_extents.x,
                position.y,
                position.z - half_extents.z,
            ),
            Vec3::new(
                position.x + half_extents.x,
                position.y + half_extents.y * 2.0,
                position.z + half_extents.z,
            ),
        )
    }

    /// Current eye position
    pub fn eye_pos(&self) -> Vec3 {
        self.position + Vec3::Y * self.eye_height
    }

    /// Eye position at the end of the previous tick
    pub fn last_tick_eye_pos(&self) -> Vec3 {
        self.last_tick_position + Vec3::Y * self.eye_height
    }

    /// Place the eye at `eye` and the last-tick eye at `last_tick_eye`
    ///
    /// Moves the underlying positions; the box is not touched. Callers that
    /// reposition a body this way are expected to restore it afterwards.
    pub fn set_eye_pos(&mut self, eye: Vec3, last_tick_eye: Vec3) {
        self.position = eye - Vec3::Y * self.eye_height;
        self.last_tick_position = last_tick_eye - Vec3::Y * self.eye_height;
    }

    /// Move to a new position, translating the box along
    pub fn set_position(&mut self, position: Vec3) {
        let delta = position - self.position;
        self.position = position;
        self.aabb = self.aabb.offset(delta);
    }

    /// Apply a resolved per-tick move
    pub fn apply_move(&mut self, delta: Vec3) {
        self.position += delta;
        self.aabb = self.aabb.offset(delta);
    }

    /// Distance covered during the last tick
    pub fn tick_movement(&self) -> f32 {
        self.last_tick_position.distance_to(self.position)
    }

    /// Whether this body is currently straddling a portal
    pub fn is_straddling_portal(&self) -> bool {
        self.colliding_portal.is_some()
    }
}
