//! Riftgate - portal engine core
//!
//! Ties the member crates together: configuration, the simulation tick
//! system, and the render frame system. The heavy lifting lives in
//! `riftgate_core`, `riftgate_physics`, and `riftgate_render`.

pub mod config;
pub mod systems;

pub use riftgate_core as core;
pub use riftgate_math as math;
pub use riftgate_physics as physics;
pub use riftgate_render as render;
