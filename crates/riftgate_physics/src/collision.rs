//! Collision resolution across a portal plane
//!
//! A body straddling a portal must respect static terrain on both sides at
//! once. The resolver clips the body's box at the portal plane, attempts
//! the move separately against each world with the corresponding half of
//! the box, and combines the two results into one move.

use log::trace;
use riftgate_core::{Aabb, Body, Portal, Vec3, WorldId};
use riftgate_math::clip_box;

/// Check whether a body is a live collision candidate for a portal
///
/// The portal must accept the body for teleportation and the body's eye
/// must be in front of the plane, inside the quad's 2D projection.
pub fn can_collide_with_portal(body: &Body, portal: &Portal) -> bool {
    if !portal.can_teleport(body) {
        return false;
    }
    let eye = body.eye_pos();
    portal.is_in_front(eye) && portal.is_point_in_projection(eye)
}

/// The body's effective collision box while straddling a portal
///
/// The portion of the box on the portal's near side, for collaborators that
/// probe the box without moving the body. An empty clip yields a zero box.
pub fn active_collision_box(body: &Body, portal: &Portal) -> Aabb {
    collision_box_this_side(portal, &body.aabb, Vec3::ZERO).unwrap_or(Aabb::ZERO)
}

/// Resolve the move of a body straddling `portal`
///
/// `attempt_move` is the engine's plain "attempt a move, resolve against
/// static terrain" routine; it is invoked with the body temporarily
/// reconfigured (clipped box, possibly swapped world membership) and must
/// resolve against the body's *current* world. All temporary body mutation
/// is reverted before this function returns.
///
/// Rotated and scaled portals are not exactly solvable here; for those the
/// attempted move passes through unchanged.
pub fn resolve_straddling_move<F>(
    body: &mut Body,
    portal: &Portal,
    attempted_move: Vec3,
    mut attempt_move: F,
) -> Vec3
where
    F: FnMut(&Body, Vec3) -> Vec3,
{
    if portal.has_rotation() || portal.has_scaling() {
        return attempted_move;
    }

    let this_side = this_side_move(body, portal, attempted_move, &mut attempt_move);
    let other_side = other_side_move(body, portal, attempted_move, &mut attempt_move);

    // stepping onto a slab or stair through the portal
    if attempted_move.y < 0.0 {
        if other_side.y > 0.0 {
            // stepping on the other side
            return Vec3::new(
                abs_min(this_side.x, other_side.x),
                other_side.y,
                abs_min(this_side.z, other_side.z),
            );
        } else if this_side.y > 0.0 {
            // stepping on this side; the clipped box underestimates the
            // step height, so redo the move with the intact box and carry
            // it across
            let new_this_side = attempt_move(body, attempted_move);
            return other_side_move(body, portal, new_this_side, &mut attempt_move);
        }
    }

    Vec3::new(
        abs_min(this_side.x, other_side.x),
        abs_min(this_side.y, other_side.y),
        abs_min(this_side.z, other_side.z),
    )
}

/// Componentwise most-restrictive-wins
///
/// An exact magnitude tie takes `b`, the far-side component.
fn abs_min(a: f32, b: f32) -> f32 {
    if a.abs() < b.abs() {
        a
    } else {
        b
    }
}

fn this_side_move<F>(
    body: &mut Body,
    portal: &Portal,
    attempted_move: Vec3,
    attempt_move: &mut F,
) -> Vec3
where
    F: FnMut(&Body, Vec3) -> Vec3,
{
    let Some(box_this_side) = collision_box_this_side(portal, &body.aabb, attempted_move) else {
        return attempted_move;
    };

    let guard = BodyRestore::new(body);
    guard.body.aabb = box_this_side;
    attempt_move(guard.body, attempted_move)
}

fn other_side_move<F>(
    body: &mut Body,
    portal: &Portal,
    attempted_move: Vec3,
    attempt_move: &mut F,
) -> Vec3
where
    F: FnMut(&Body, Vec3) -> Vec3,
{
    let Some(box_other_side) = collision_box_other_side(portal, &body.aabb, attempted_move)
    else {
        return attempted_move;
    };

    // switch world and check collision over there
    let guard = BodyRestore::new(body);
    guard.body.world = portal.dest_world;
    guard.body.aabb = box_other_side;
    attempt_move(guard.body, attempted_move)
}

fn collision_box_this_side(portal: &Portal, original_box: &Aabb, attempted_move: Vec3) -> Option<Aabb> {
    // cut the collision box a little bit more for horizontal portals,
    // because the box gets stretched by the attempted move when the
    // collision is calculated
    let culling_pos = portal.position - attempted_move;
    clip_box(original_box, culling_pos, portal.normal)
}

fn collision_box_other_side(portal: &Portal, original_box: &Aabb, attempted_move: Vec3) -> Option<Aabb> {
    let teleportation = portal.destination - portal.position;
    clip_box(
        &original_box.offset(teleportation),
        portal.destination - attempted_move,
        -portal.normal,
    )
}

/// Reverts every transient body mutation the resolver makes, on every exit
/// path, including panics inside the move attempt
struct BodyRestore<'a> {
    body: &'a mut Body,
    world: WorldId,
    position: Vec3,
    last_tick_position: Vec3,
    aabb: Aabb,
}

impl<'a> BodyRestore<'a> {
    fn new(body: &'a mut Body) -> Self {
        let world = body.world;
        let position = body.position;
        let last_tick_position = body.last_tick_position;
        let aabb = body.aabb;
        Self {
            body,
            world,
            position,
            last_tick_position,
            aabb,
        }
    }
}

impl Drop for BodyRestore<'_> {
    fn drop(&mut self) {
        trace!("restoring transient body state after move attempt");
        self.body.world = self.world;
        self.body.position = self.position;
        self.body.last_tick_position = self.last_tick_position;
        self.body.aabb = self.aabb;
    }
}
