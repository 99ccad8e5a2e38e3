//! Portal-aware physics for the Riftgate engine
//!
//! This crate provides:
//! - The straddling-move resolver: collision response for a body whose
//!   volume overlaps both sides of a portal plane
//!   ([`resolve_straddling_move`])
//! - The proximity tracker maintaining each body's colliding-portal
//!   back-reference every tick ([`ProximityTracker`])
//! - A default static-terrain movement integrator hosts can replace
//!   ([`TerrainResolver`])

pub mod collision;
pub mod proximity;
pub mod terrain;

pub use collision::{
    active_collision_box, can_collide_with_portal, resolve_straddling_move,
};
pub use proximity::{is_nearby_portal, rough_colliding_portals, ProximityTracker};
pub use terrain::{TerrainResolver, DEFAULT_STEP_HEIGHT};
