//! Portal clip plane variants
//!
//! Exactly one clip plane is active at a time per draw pass: the *inner*
//! plane while drawing the content seen through a portal, the *outer*
//! plane while drawing a straddling body from outside.

use riftgate_core::Portal;
use riftgate_math::Plane;

/// Clip plane for drawing inside a portal view
///
/// Anchored at the destination, keeping only geometry on the content side,
/// so nothing between the camera and the far boundary leaks into the view.
pub fn inner_clip_plane(portal: &Portal) -> Plane {
    Plane::new(portal.destination, portal.content_direction())
}

/// Clip plane for drawing a straddling body from outside
///
/// Anchored at the portal surface, keeping only the near-side portion of
/// the body, so the part that already crossed is not double-drawn.
pub fn outer_clip_plane(portal: &Portal) -> Plane {
    Plane::new(portal.position, portal.normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use riftgate_core::{Universe, Vec3, World};

    #[test]
    fn test_clip_plane_variants() {
        let mut universe = Universe::new();
        let overworld = universe.add_world(World::new("overworld"));
        let depths = universe.add_world(World::new("depths"));
        // quad at x = 100 facing +x
        let portal = Portal::new(
            overworld,
            Vec3::new(100.0, 64.0, 0.0),
            -Vec3::Z,
            Vec3::Y,
            2.0,
            3.0,
            depths,
            Vec3::new(10.0, 30.0, 5.0),
        );

        let outer = outer_clip_plane(&portal);
        assert_eq!(outer.position, portal.position);
        assert!((outer.normal - Vec3::X).length() < 1e-6);

        let inner = inner_clip_plane(&portal);
        assert_eq!(inner.position, portal.destination);
        assert!((inner.normal + Vec3::X).length() < 1e-6);
        // the two variants keep opposite half-spaces
        assert!(outer.signed_distance(Vec3::new(101.0, 64.0, 0.0)) > 0.0);
        assert!(inner.signed_distance(Vec3::new(9.0, 30.0, 5.0)) > 0.0);
    }
}
