//! Cross-portal rendering for the Riftgate engine
//!
//! A body straddling a portal needs two draws per frame: its ordinary draw,
//! clipped at the portal plane so nothing leaks past the frame, and a
//! projected "ghost" draw on the destination side so the body appears to
//! continue through. This crate provides:
//!
//! - [`RenderContext`] - explicit per-frame render state (camera, active
//!   portal views), threaded through every call instead of living in
//!   globals
//! - [`RenderBackend`] - the seam to the host renderer: clip planes, batch
//!   flushes, and the actual draw call
//! - [`CrossPortalProjector`] - tracks straddling bodies and issues the
//!   clipped and projected draws
//! - [`inner_clip_plane`] / [`outer_clip_plane`] - the two portal clip
//!   plane variants

pub mod backend;
pub mod clip;
pub mod context;
pub mod projector;

pub use backend::{DrawEvent, RenderBackend, TraceBackend};
pub use clip::{inner_clip_plane, outer_clip_plane};
pub use context::RenderContext;
pub use projector::{CrossPortalProjector, MAX_PARTICLE_VIEW_DEPTH};
