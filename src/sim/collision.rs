//! Circle-based collision detection and response
//!
//! Every entity collides as a circle. There is no spatial partitioning; the
//! entity counts involved keep the brute-force pairs cheap.

use glam::Vec2;

use super::world::{Rock, World};
use crate::consts::WORLD_MARGIN;

const SETTLE_PASSES: usize = 3;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit vector from the obstacle toward the mover
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Strict overlap test between two circles
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Check a moving circle against a static one
pub fn circle_circle(pos: Vec2, radius: f32, other: Vec2, other_radius: f32) -> CollisionResult {
    let offset = pos - other;
    let dist = offset.length();
    let min_dist = radius + other_radius;

    if dist >= min_dist {
        return CollisionResult::miss();
    }

    // Coincident centers have no direction; pick one deterministically
    let normal = if dist > f32::EPSILON {
        offset / dist
    } else {
        Vec2::X
    };

    CollisionResult {
        hit: true,
        normal,
        penetration: min_dist - dist,
    }
}

/// Move `pos` out of the obstacle along the penetration normal
#[inline]
pub fn push_out(pos: Vec2, result: &CollisionResult) -> Vec2 {
    if result.hit {
        pos + result.normal * result.penetration
    } else {
        pos
    }
}

/// Push a circle out of every rock it overlaps; returns the corrected
/// position and whether any rock was touched
pub fn resolve_rock_collisions(mut pos: Vec2, radius: f32, rocks: &[Rock]) -> (Vec2, bool) {
    let mut touched = false;
    for rock in rocks {
        let result = circle_circle(pos, radius, rock.pos, rock.collision_radius);
        if result.hit {
            pos = push_out(pos, &result);
            touched = true;
        }
    }
    (pos, touched)
}

/// Rock push-out followed by a clamp to the playable area, repeated so a
/// rock next to the wall cannot shove the body outside the margin.
/// Bounds win when both cannot be satisfied.
pub fn settle_in_world(mut pos: Vec2, radius: f32, world: &World) -> (Vec2, bool) {
    let mut touched = false;
    for _ in 0..SETTLE_PASSES {
        let (pushed, hit) = resolve_rock_collisions(pos, radius, &world.rocks);
        touched |= hit;
        pos = world.clamp_inside(pushed, WORLD_MARGIN);
        if !hit {
            break;
        }
    }
    (pos, touched)
}

/// Whether a point-sized object is inside any rock
pub fn hits_any_rock(pos: Vec2, radius: f32, rocks: &[Rock]) -> bool {
    rocks
        .iter()
        .any(|rock| circles_overlap(pos, radius, rock.pos, rock.collision_radius))
}
