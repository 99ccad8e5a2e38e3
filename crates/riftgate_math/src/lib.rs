//! Math primitives for the Riftgate portal engine
//!
//! This crate provides the vector, box, and plane types shared by the
//! simulation and render crates.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Aabb`] - axis-aligned bounding box
//! - [`Plane`] - oriented plane (anchor point + unit normal)
//! - [`Quat`] - unit quaternion for orientation deltas
//!
//! ## Plane Clipping
//!
//! The free functions [`colliding_t`], [`is_in_front_of_plane`], and
//! [`clip_box`] implement the portal-plane geometry used to split a moving
//! body's collision volume at a portal boundary. They are pure and
//! allocation-free.

mod vec3;
mod quat;
pub mod aabb;
pub mod plane;

pub use vec3::Vec3;
pub use quat::Quat;
pub use aabb::Aabb;
pub use plane::{clip_box, colliding_t, is_in_front_of_plane, Plane};
