//! Portals
//!
//! A portal is a planar quad anchored in one world that connects to a
//! destination position, possibly in another world. The connected side may
//! be rotated, scaled, or mirrored relative to this side.

use riftgate_math::{Aabb, Quat, Vec3};
use slotmap::new_key_type;

use crate::body::{Body, BodyKindMask};
use crate::world::WorldId;

new_key_type! {
    /// Key to a portal in the universe
    ///
    /// Bodies hold one of these as their colliding-portal back-reference;
    /// generational indexing means a destroyed portal invalidates every
    /// outstanding key instead of dangling.
    pub struct PortalKey;
}

/// Scales this close to one count as no scaling
const SCALE_EPSILON: f32 = 1e-4;

/// Positional slack when comparing two portals' anchors
const ANCHOR_EPSILON: f32 = 1e-3;

/// A planar connector between two positions
///
/// The quad spans `width` along `right` and `height` along `up`, centered on
/// `position`. The normal is `right x up`, unit length by construction, and
/// points at the side the portal is viewed from.
#[derive(Clone, Debug)]
pub struct Portal {
    /// World the portal surface lives in
    pub world: WorldId,
    /// Center of the portal quad
    pub position: Vec3,
    /// Unit normal of the portal plane
    pub normal: Vec3,
    /// Unit vector along the quad's width
    pub right: Vec3,
    /// Unit vector along the quad's height
    pub up: Vec3,
    /// Extent along `right`
    pub width: f32,
    /// Extent along `up`
    pub height: f32,
    /// Where the connected side is anchored
    pub destination: Vec3,
    /// World the connected side lives in
    pub dest_world: WorldId,
    /// Orientation delta applied to the connected side
    pub rotation: Option<Quat>,
    /// Scale factor of the connected side (1.0 = none)
    pub scale: f32,
    /// Mirror portal: destination is this world, reflected across the plane
    pub mirror: bool,
    /// Whether bodies can physically pass through
    pub interactable: bool,
    /// Which body kinds this portal accepts as teleportation candidates
    pub teleport_mask: BodyKindMask,
}

impl Portal {
    /// Create a portal quad
    ///
    /// `right` and `up` must be perpendicular; they are normalized and the
    /// normal is derived from them.
    pub fn new(
        world: WorldId,
        position: Vec3,
        right: Vec3,
        up: Vec3,
        width: f32,
        height: f32,
        dest_world: WorldId,
        destination: Vec3,
    ) -> Self {
        let right = right.normalized();
        let up = up.normalized();
        Self {
            world,
            position,
            normal: right.cross(up).normalized(),
            right,
            up,
            width,
            height,
            destination,
            dest_world,
            rotation: None,
            scale: 1.0,
            mirror: false,
            interactable: true,
            teleport_mask: BodyKindMask::teleportable(),
        }
    }

    /// Create a mirror: destination is the same world, reflected in place
    pub fn new_mirror(
        world: WorldId,
        position: Vec3,
        right: Vec3,
        up: Vec3,
        width: f32,
        height: f32,
    ) -> Self {
        let mut portal = Self::new(world, position, right, up, width, height, world, position);
        portal.mirror = true;
        portal
    }

    /// Set an orientation delta for the connected side
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Set the scale factor of the connected side
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Mark the portal as visual-only (bodies cannot pass through)
    pub fn non_interactable(mut self) -> Self {
        self.interactable = false;
        self
    }

    /// Restrict which body kinds the portal teleports
    pub fn with_teleport_mask(mut self, mask: BodyKindMask) -> Self {
        self.teleport_mask = mask;
        self
    }

    /// Whether the connected side is rotated
    pub fn has_rotation(&self) -> bool {
        self.rotation.is_some()
    }

    /// Whether the connected side is scaled
    pub fn has_scaling(&self) -> bool {
        (self.scale - 1.0).abs() > SCALE_EPSILON
    }

    /// Bounding box of the portal quad
    pub fn aabb(&self) -> Aabb {
        let r = self.right * (self.width * 0.5);
        let u = self.up * (self.height * 0.5);
        let a = self.position + r + u;
        let b = self.position + r - u;
        let c = self.position - r + u;
        let d = self.position - r - u;
        Aabb::new(
            a.min_components(b).min_components(c.min_components(d)),
            a.max_components(b).max_components(c.max_components(d)),
        )
    }

    /// Signed distance from a point to the portal plane
    pub fn distance_to_plane(&self, point: Vec3) -> f32 {
        (point - self.position).dot(self.normal)
    }

    /// Whether a point is on the side the normal points at
    pub fn is_in_front(&self, point: Vec3) -> bool {
        self.distance_to_plane(point) > 0.0
    }

    /// Whether a point projects inside the portal quad's 2D bounds
    pub fn is_point_in_projection(&self, point: Vec3) -> bool {
        let offset = point - self.position;
        offset.dot(self.right).abs() < self.width * 0.5
            && offset.dot(self.up).abs() < self.height * 0.5
    }

    /// Map a point from this side to the connected side
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        if self.mirror {
            // reflect across the portal plane
            return point - self.normal * (2.0 * self.distance_to_plane(point));
        }
        let local = point - self.position;
        self.destination + self.transform_direction(local) * self.scale
    }

    /// Map a direction from this side to the connected side
    ///
    /// Directions are not scaled; only the orientation delta applies.
    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        match (self.mirror, self.rotation) {
            (true, _) => direction - self.normal * (2.0 * direction.dot(self.normal)),
            (false, Some(rotation)) => rotation.rotate(direction),
            (false, None) => direction,
        }
    }

    /// Direction pointing into the portal's content on the connected side
    pub fn content_direction(&self) -> Vec3 {
        self.transform_direction(-self.normal)
    }

    /// Whether a point is on the content side of the connected plane
    ///
    /// `tolerance` shifts the plane: negative values accept points slightly
    /// behind it.
    pub fn is_inside(&self, point: Vec3, tolerance: f32) -> bool {
        (point - self.destination).dot(self.content_direction()) > tolerance
    }

    /// Whether this portal accepts a body as a teleportation candidate
    pub fn can_teleport(&self, body: &Body) -> bool {
        self.interactable && self.teleport_mask.contains(body.kind.mask())
    }

    /// Whether `other` is this portal's back-face twin: same world, same
    /// anchor, opposite facing
    pub fn is_flipped_with(&self, other: &Portal) -> bool {
        self.world == other.world
            && self.position.distance_to(other.position) < ANCHOR_EPSILON
            && (self.normal + other.normal).length() < ANCHOR_EPSILON
    }

    /// Whether `other` is this portal's reverse: anchored at the
    /// destination, mapping back to this side
    pub fn is_reverse_of(&self, other: &Portal) -> bool {
        self.dest_world == other.world
            && other.dest_world == self.world
            && self.destination.distance_to(other.position) < ANCHOR_EPSILON
            && other.destination.distance_to(self.position) < ANCHOR_EPSILON
            && (self.content_direction() - other.normal).length() < ANCHOR_EPSILON
    }
}
