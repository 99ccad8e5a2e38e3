//! Worlds and the universe container
//!
//! A `World` is one independently simulated coordinate space ("dimension").
//! The `Universe` owns every world plus flat arenas for bodies and portals;
//! membership is a `WorldId` field rather than per-world storage, so a
//! body's world can be swapped temporarily without relocating it.

use log::debug;
use riftgate_math::Aabb;
use slotmap::{new_key_type, SlotMap};

use crate::body::{Body, BodyKey};
use crate::portal::{Portal, PortalKey};

new_key_type! {
    /// Key to a world in the universe
    pub struct WorldId;
}

/// One independently simulated coordinate space
///
/// Terrain is a flat list of solid boxes. Chunked storage and streaming are
/// the host's concern; the portal core only needs "which static boxes
/// overlap this region".
#[derive(Clone, Debug, Default)]
pub struct World {
    /// Display name, used in logs and scene files
    pub name: String,
    /// Solid terrain boxes
    pub terrain: Vec<Aabb>,
}

impl World {
    /// Create an empty world
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terrain: Vec::new(),
        }
    }

    /// Add a solid terrain box
    pub fn add_terrain(&mut self, aabb: Aabb) {
        self.terrain.push(aabb);
    }

    /// Terrain boxes overlapping a region
    pub fn terrain_in<'a>(&'a self, region: &'a Aabb) -> impl Iterator<Item = &'a Aabb> {
        self.terrain.iter().filter(move |b| b.intersects(region))
    }
}

/// The container of all worlds, bodies, and portals
///
/// Arenas are public fields: callers routinely need a mutable body together
/// with read access to worlds or portals, which field-level split borrows
/// allow and accessor methods would not.
pub struct Universe {
    /// All worlds
    pub worlds: SlotMap<WorldId, World>,
    /// All bodies, across every world
    pub bodies: SlotMap<BodyKey, Body>,
    /// All portals, across every world
    pub portals: SlotMap<PortalKey, Portal>,
    /// Portals outside normal spatial storage, scanned unconditionally
    pub global_portals: Vec<PortalKey>,
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

impl Universe {
    /// Create an empty universe
    pub fn new() -> Self {
        Self {
            worlds: SlotMap::with_key(),
            bodies: SlotMap::with_key(),
            portals: SlotMap::with_key(),
            global_portals: Vec::new(),
        }
    }

    /// Add a world and return its id
    pub fn add_world(&mut self, world: World) -> WorldId {
        self.worlds.insert(world)
    }

    /// Add a body and return its key
    pub fn add_body(&mut self, body: Body) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body
    pub fn remove_body(&mut self, key: BodyKey) -> Option<Body> {
        self.bodies.remove(key)
    }

    /// Add a portal and return its key
    pub fn add_portal(&mut self, portal: Portal) -> PortalKey {
        self.portals.insert(portal)
    }

    /// Add a portal to the global registry: it is not discoverable by
    /// spatial queries and gets scanned against all bodies of its world
    pub fn add_global_portal(&mut self, portal: Portal) -> PortalKey {
        let key = self.portals.insert(portal);
        self.global_portals.push(key);
        key
    }

    /// Remove a portal
    ///
    /// Back-references held by bodies are keys into a generational arena,
    /// so they go stale rather than dangle; the proximity tracker clears
    /// them on its next sweep.
    pub fn remove_portal(&mut self, key: PortalKey) -> Option<Portal> {
        self.global_portals.retain(|k| *k != key);
        let removed = self.portals.remove(key);
        if removed.is_some() {
            debug!("removed portal {:?}; stale back-references clear next tick", key);
        }
        removed
    }

    /// Get a body by key
    pub fn body(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    /// Get a mutable body by key
    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key)
    }

    /// Get a portal by key
    pub fn portal(&self, key: PortalKey) -> Option<&Portal> {
        self.portals.get(key)
    }

    /// Get a world by id
    pub fn world(&self, id: WorldId) -> Option<&World> {
        self.worlds.get(id)
    }

    /// Iterate over the bodies of one world
    pub fn bodies_in_world(&self, world: WorldId) -> impl Iterator<Item = (BodyKey, &Body)> {
        self.bodies.iter().filter(move |(_, b)| b.world == world)
    }

    /// Keys of bodies in a world whose box intersects a region
    pub fn bodies_intersecting(&self, world: WorldId, region: &Aabb) -> Vec<BodyKey> {
        self.bodies
            .iter()
            .filter(|(_, b)| b.world == world && b.aabb.intersects(region))
            .map(|(k, _)| k)
            .collect()
    }

    /// Keys of spatially stored portals in a world whose quad box
    /// intersects a region; global portals are not spatially stored and
    /// never appear here
    pub fn portals_intersecting(&self, world: WorldId, region: &Aabb) -> Vec<PortalKey> {
        self.portals
            .iter()
            .filter(|(k, p)| {
                p.world == world
                    && !self.global_portals.contains(k)
                    && p.aabb().intersects(region)
            })
            .map(|(k, _)| k)
            .collect()
    }

    /// The portal a body is straddling, resolving the back-reference
    ///
    /// A stale reference (portal destroyed since the last sweep) reads as
    /// "no colliding portal".
    pub fn colliding_portal_of(&self, body: &Body) -> Option<(PortalKey, &Portal)> {
        let key = body.colliding_portal?;
        self.portals.get(key).map(|p| (key, p))
    }
}
