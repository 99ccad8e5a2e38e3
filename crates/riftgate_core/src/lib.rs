//! Core types for the Riftgate portal engine
//!
//! This crate provides the data model shared by the simulation and render
//! crates:
//!
//! - [`Body`] - a moving simulated object with position, velocity, and box
//! - [`Portal`] - a planar connector between two positions, possibly in
//!   different worlds
//! - [`World`] - one independently simulated coordinate space
//! - [`Universe`] - the container of all worlds, bodies, and portals
//! - [`BodyKey`], [`PortalKey`], [`WorldId`] - generational keys into the
//!   universe arenas
//! - [`UniverseTemplate`] - serializable universe description

mod body;
mod portal;
mod world;
mod scene;

pub use body::{Body, BodyKey, BodyKind, BodyKindMask};
pub use portal::{Portal, PortalKey};
pub use world::{Universe, World, WorldId};
pub use scene::{
    BodyTemplate, BoxTemplate, PortalTemplate, SceneInstantiateError, SceneLoadError,
    SceneSaveError, UniverseTemplate, WorldTemplate,
};

// Re-export commonly used math types for convenience
pub use riftgate_math::{Aabb, Plane, Quat, Vec3};
