//! Colliding-portal proximity tracking
//!
//! Every simulation tick each portal scans the bodies near it and stamps
//! matching bodies with a back-reference to itself. References that stopped
//! being valid are cleared lazily at the start of the next tick's sweep,
//! not eagerly, so no extra full scan is needed.

use log::trace;
use riftgate_core::{Aabb, Body, PortalKey, Universe, WorldId};

use crate::collision::can_collide_with_portal;

/// Default growth of a portal's box when looking for nearby bodies
///
/// Catches fast-moving bodies and large portals cheaply without per-axis
/// exactness. Empirically chosen; tunable, not load-bearing.
pub const DEFAULT_COMPENSATION_MARGIN: f32 = 3.0;

/// Expansion used by the rough portal query and the global-portal scan
///
/// Portal quads are flat, so intersection tests need a little thickness.
const ROUGH_EXPANSION: f32 = 0.5;

/// Expansion used by the nearby-portal check
const NEARBY_EXPANSION: f32 = 1.0;

/// Maintains each body's colliding-portal back-reference
#[derive(Clone, Debug)]
pub struct ProximityTracker {
    /// Portal box growth during the scan
    pub compensation_margin: f32,
}

impl Default for ProximityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProximityTracker {
    /// Create a tracker with the default compensation margin
    pub fn new() -> Self {
        Self {
            compensation_margin: DEFAULT_COMPENSATION_MARGIN,
        }
    }

    /// Override the compensation margin
    pub fn with_compensation_margin(mut self, margin: f32) -> Self {
        self.compensation_margin = margin;
        self
    }

    /// Run one tick of proximity tracking
    ///
    /// `dt` is the tick length in seconds, used to stretch candidate boxes
    /// by the distance each body covers this tick.
    pub fn tick(&mut self, universe: &mut Universe, dt: f32) {
        self.sweep_stale(universe, dt);
        self.scan_portals(universe, dt);
        self.scan_global_portals(universe);
    }

    /// Clear back-references whose portal is gone or out of range
    fn sweep_stale(&self, universe: &mut Universe, dt: f32) {
        let Universe {
            bodies, portals, ..
        } = universe;

        for (body_key, body) in bodies.iter_mut() {
            let Some(portal_key) = body.colliding_portal else {
                continue;
            };
            let keep = portals.get(portal_key).is_some_and(|portal| {
                portal.world == body.world
                    && body
                        .aabb
                        .stretch(body.velocity * dt)
                        .intersects(&portal.aabb().expand(self.compensation_margin))
            });
            if !keep {
                trace!("clearing stale colliding portal of body {:?}", body_key);
                body.colliding_portal = None;
            }
        }
    }

    /// Stamp bodies near each spatially stored portal
    fn scan_portals(&self, universe: &mut Universe, dt: f32) {
        let Universe {
            bodies,
            portals,
            global_portals,
            ..
        } = universe;

        for (portal_key, portal) in portals.iter() {
            if global_portals.contains(&portal_key) {
                continue;
            }
            if !portal.interactable {
                continue;
            }
            let region = portal.aabb().expand(self.compensation_margin);
            for (body_key, body) in bodies.iter_mut() {
                if body.world != portal.world {
                    continue;
                }
                if !body.aabb.stretch(body.velocity * dt).intersects(&region) {
                    continue;
                }
                if can_collide_with_portal(body, portal) {
                    trace!("body {:?} colliding with portal {:?}", body_key, portal_key);
                    body.colliding_portal = Some(portal_key);
                }
            }
        }
    }

    /// Stamp bodies near global portals
    ///
    /// Global portals are outside spatial storage, so every body of the
    /// portal's world is considered.
    fn scan_global_portals(&self, universe: &mut Universe) {
        let Universe {
            bodies,
            portals,
            global_portals,
            ..
        } = universe;

        for &portal_key in global_portals.iter() {
            let Some(portal) = portals.get(portal_key) else {
                continue;
            };
            let portal_box = portal.aabb().expand(ROUGH_EXPANSION);
            for (_, body) in bodies.iter_mut() {
                if body.world != portal.world {
                    continue;
                }
                if body.aabb.intersects(&portal_box) && can_collide_with_portal(body, portal) {
                    body.colliding_portal = Some(portal_key);
                }
            }
        }
    }
}

/// Rough query: portals whose box is near `region` in a world
///
/// Spatially stored portals come from the box query; global portals are
/// appended from the registry since ordinary spatial queries cannot see
/// them.
pub fn rough_colliding_portals(
    universe: &Universe,
    world: WorldId,
    region: &Aabb,
) -> Vec<PortalKey> {
    let mut found = universe.portals_intersecting(world, &region.expand(ROUGH_EXPANSION));
    for &portal_key in &universe.global_portals {
        if let Some(portal) = universe.portal(portal_key) {
            if portal.world == world && portal.aabb().expand(ROUGH_EXPANSION).intersects(region) {
                found.push(portal_key);
            }
        }
    }
    found
}

/// Whether any portal is close to the body's box
pub fn is_nearby_portal(universe: &Universe, body: &Body) -> bool {
    !rough_colliding_portals(universe, body.world, &body.aabb.expand(NEARBY_EXPANSION)).is_empty()
}
