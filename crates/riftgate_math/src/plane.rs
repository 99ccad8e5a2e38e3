//! Plane geometry and box clipping
//!
//! A portal boundary is an oriented plane. These primitives answer the two
//! questions the rest of the engine keeps asking: which side of the plane is
//! a point on, and what part of a box lies on the normal side.

use serde::{Serialize, Deserialize};

use crate::{Aabb, Vec3};

/// An oriented plane given by an anchor point and a unit normal
///
/// Also doubles as render clip-plane state: the rasterizer discards
/// geometry on the side the normal points away from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// A point on the plane
    pub position: Vec3,
    /// Unit normal pointing to the kept side
    pub normal: Vec3,
}

impl Plane {
    /// Create a plane from an anchor point and a normal
    ///
    /// The normal is normalized automatically.
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal: normal.normalized(),
        }
    }

    /// Signed distance from a point to the plane
    ///
    /// Positive = on the normal side.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.position).dot(self.normal)
    }

    /// The same plane facing the other way
    pub fn flipped(&self) -> Self {
        Self {
            position: self.position,
            normal: -self.normal,
        }
    }
}

/// Signed parametric distance from `ray_origin` along `ray_dir` to the plane
///
/// Solves `(ray_origin + t * ray_dir - plane_pos) . plane_normal = 0` for
/// `t`. The caller must ensure `ray_dir` is not parallel to the plane.
pub fn colliding_t(plane_pos: Vec3, plane_normal: Vec3, ray_origin: Vec3, ray_dir: Vec3) -> f32 {
    (plane_pos - ray_origin).dot(plane_normal) / ray_dir.dot(plane_normal)
}

/// Check whether a point is strictly on the side the normal points to
pub fn is_in_front_of_plane(point: Vec3, plane_pos: Vec3, plane_normal: Vec3) -> bool {
    (point - plane_pos).dot(plane_normal) > 0.0
}

/// Cut a box with a plane, keeping the side the normal points to
///
/// Returns `None` when the box is entirely behind the plane.
///
/// For each axis the corner nearest the plane along the normal direction is
/// the "pushed" corner and the opposite corner is the "static" corner. The
/// pushed corner being already in front means the plane misses the box; the
/// static corner being behind means the plane swallows it; otherwise the
/// clipped box spans from the pushed corner's plane intersection to the
/// static corner.
pub fn clip_box(aabb: &Aabb, plane_pos: Vec3, plane_normal: Vec3) -> Option<Aabb> {
    let x_forward = plane_normal.x > 0.0;
    let y_forward = plane_normal.y > 0.0;
    let z_forward = plane_normal.z > 0.0;

    let pushed_pos = Vec3::new(
        if x_forward { aabb.min.x } else { aabb.max.x },
        if y_forward { aabb.min.y } else { aabb.max.y },
        if z_forward { aabb.min.z } else { aabb.max.z },
    );
    let static_pos = Vec3::new(
        if x_forward { aabb.max.x } else { aabb.min.x },
        if y_forward { aabb.max.y } else { aabb.min.y },
        if z_forward { aabb.max.z } else { aabb.min.z },
    );

    let t_of_pushed_pos = colliding_t(plane_pos, plane_normal, pushed_pos, plane_normal);
    if t_of_pushed_pos < 0.0 {
        // the box is not cut by the plane
        return Some(*aabb);
    }
    if !is_in_front_of_plane(static_pos, plane_pos, plane_normal) {
        // the box is fully behind the plane
        return None;
    }

    // the plane cuts the box in two
    let after_being_pushed = pushed_pos + plane_normal * t_of_pushed_pos;
    Some(Aabb::from_corners(after_being_pushed, static_pos))
}
