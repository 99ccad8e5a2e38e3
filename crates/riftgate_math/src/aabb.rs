//! Axis-aligned bounding box

use serde::{Serialize, Deserialize};

use crate::Vec3;

/// An axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner (all components are minimums)
    pub min: Vec3,
    /// Maximum corner (all components are maximums)
    pub max: Vec3,
}

impl Aabb {
    /// A degenerate box at the origin with zero extent
    pub const ZERO: Self = Self { min: Vec3::ZERO, max: Vec3::ZERO };

    /// Create a new AABB from min and max corners
    ///
    /// The caller must ensure `min <= max` componentwise; use
    /// [`Aabb::from_corners`] when the corner order is unknown.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two arbitrary opposite corners
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min_components(b),
            max: a.max_components(b),
        }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents (half the size in each dimension)
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size in each dimension
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if a point is inside or on the AABB
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this AABB overlaps another (boundary contact does not count)
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Translate the AABB by a delta
    pub fn offset(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Grow the AABB symmetrically by `amount` on every axis
    pub fn expand(&self, amount: f32) -> Self {
        let d = Vec3::new(amount, amount, amount);
        Self {
            min: self.min - d,
            max: self.max + d,
        }
    }

    /// Extend the AABB in the direction of `delta`
    ///
    /// Each positive component pushes the max corner out, each negative
    /// component pushes the min corner out. Used to cover the volume a box
    /// sweeps while moving by `delta`.
    pub fn stretch(&self, delta: Vec3) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        if delta.x < 0.0 { min.x += delta.x; } else { max.x += delta.x; }
        if delta.y < 0.0 { min.y += delta.y; } else { max.y += delta.y; }
        if delta.z < 0.0 { min.z += delta.z; } else { max.z += delta.z; }
        Self { min, max }
    }
}
