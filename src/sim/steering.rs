//! Movement integration for the player and steering for enemies
//!
//! Enemies blend pursuit, avoidance and wander into a desired heading, but
//! always drive along their current hull facing. Like real tanks they have to
//! turn before they can go somewhere else.

use glam::Vec2;
use rand::Rng;

use super::collision::{resolve_rock_collisions, settle_in_world};
use super::state::{EnemyTank, GameState, PlayerTank};
use super::world::{Rock, World};
use crate::consts::*;
use crate::{angle_delta, ease_angle, heading};

/// Combine held direction keys into a movement vector (screen axes, +y down)
pub fn move_direction(up: bool, down: bool, left: bool, right: bool) -> Vec2 {
    let x = (right as i32 - left as i32) as f32;
    let y = (down as i32 - up as i32) as f32;
    Vec2::new(x, y)
}

/// Integrate player movement for one frame
pub fn update_player(player: &mut PlayerTank, move_dir: Vec2, world: &World, frame_scale: f32) {
    if move_dir != Vec2::ZERO {
        player.target_rotation = move_dir.y.atan2(move_dir.x);
        player.rotation = ease_angle(
            player.rotation,
            player.target_rotation,
            PLAYER_ROTATION_SPEED * frame_scale,
        );

        // Ease off while the hull is still swinging around
        let misalignment = angle_delta(player.rotation, player.target_rotation).abs();
        player.target_speed = player.max_speed * misalignment.cos().max(0.3);

        if player.speed < player.target_speed {
            player.speed =
                (player.speed + player.acceleration * frame_scale).min(player.target_speed);
        } else {
            player.speed =
                (player.speed - player.deceleration * frame_scale).max(player.target_speed);
        }
        player.velocity = heading(player.rotation) * player.speed;
    } else {
        player.target_speed = 0.0;
        player.velocity *= PLAYER_FRICTION.powf(frame_scale);
        player.speed = player.velocity.length();
        if player.speed < VELOCITY_EPSILON {
            player.velocity = Vec2::ZERO;
            player.speed = 0.0;
        }
    }

    if player.velocity == Vec2::ZERO {
        return;
    }

    let target = player.pos + player.velocity * frame_scale;

    // Reject out-of-bounds motion per axis so sliding along a wall still works
    if target.x >= WORLD_MARGIN && target.x <= world.width - WORLD_MARGIN {
        player.pos.x = target.x;
    }
    if target.y >= WORLD_MARGIN && target.y <= world.height - WORLD_MARGIN {
        player.pos.y = target.y;
    }

    let (pos, touched) = settle_in_world(player.pos, player.radius(), world);
    player.pos = pos;
    if touched {
        player.velocity *= ROCK_BUMP_DAMPING;
        player.speed = player.velocity.length();
    }
}

/// Point the turret at a world-space aim point
pub fn aim_turret(player: &mut PlayerTank, aim: Vec2) {
    let to_aim = aim - player.pos;
    if to_aim.length_squared() > f32::EPSILON {
        player.turret_rotation = to_aim.y.atan2(to_aim.x);
    }
}

/// Repulsion from a circle obstacle, growing with inverse edge distance
fn repulsion(from: Vec2, obstacle: Vec2, obstacle_radius: f32) -> Vec2 {
    let offset = from - obstacle;
    let dist = offset.length();
    let edge = dist - obstacle_radius - TANK_RADIUS;
    if edge >= AVOIDANCE_RADIUS || dist <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let weight = (AVOIDANCE_RADIUS / edge.max(1.0) - 1.0).clamp(0.0, 10.0);
    offset / dist * weight
}

/// Desired unit heading for enemy `index` from pursuit, avoidance and wander
pub fn steering_direction(
    index: usize,
    enemies: &[EnemyTank],
    player_pos: Vec2,
    rocks: &[Rock],
) -> Vec2 {
    let enemy = &enemies[index];

    let to_player = player_pos - enemy.pos;
    let pursuit = if to_player.length() > ENEMY_PREFERRED_RANGE {
        to_player.normalize_or_zero() * PURSUIT_WEIGHT
    } else {
        Vec2::ZERO
    };

    let mut avoidance = Vec2::ZERO;
    for rock in rocks {
        avoidance += repulsion(enemy.pos, rock.pos, rock.collision_radius);
    }
    for (i, other) in enemies.iter().enumerate() {
        if i != index {
            avoidance += repulsion(enemy.pos, other.pos, other.radius());
        }
    }

    let wander = heading(enemy.wander_angle) * WANDER_WEIGHT;

    let desired = pursuit + avoidance * AVOIDANCE_WEIGHT + wander;
    let dir = desired.normalize_or_zero();
    if dir == Vec2::ZERO {
        heading(enemy.rotation)
    } else {
        dir
    }
}

/// Record the current position and apply an escape jump when the enemy has
/// barely moved over the whole history window. Returns true on escape.
pub fn detect_stuck<R: Rng>(enemy: &mut EnemyTank, rng: &mut R) -> bool {
    enemy.history.push_back(enemy.pos);
    while enemy.history.len() > STUCK_HISTORY_LEN {
        enemy.history.pop_front();
    }
    if enemy.history.len() < STUCK_HISTORY_LEN {
        return false;
    }

    let net = match (enemy.history.front(), enemy.history.back()) {
        (Some(first), Some(last)) => first.distance(*last),
        _ => return false,
    };

    if net < STUCK_DISTANCE_THRESHOLD {
        enemy.stuck_frames += 1;
    } else {
        enemy.stuck_frames = 0;
    }

    if enemy.stuck_frames > STUCK_FRAME_THRESHOLD {
        let angle = rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
        enemy.pos += heading(angle) * STUCK_ESCAPE_DISTANCE;
        enemy.wander_angle = angle;
        enemy.rotation = angle;
        enemy.target_rotation = angle;
        enemy.history.clear();
        enemy.stuck_frames = 0;
        return true;
    }
    false
}

/// Steer, move and unstick every enemy; drop those that left the world
pub fn update_enemies(state: &mut GameState, frame_scale: f32) {
    let player_pos = state.player.pos;

    for enemy in &mut state.enemies {
        enemy.wander_angle +=
            state.rng.random_range(-WANDER_JITTER..WANDER_JITTER) * frame_scale;
    }

    let directions: Vec<Vec2> = (0..state.enemies.len())
        .map(|i| steering_direction(i, &state.enemies, player_pos, &state.world.rocks))
        .collect();

    for (enemy, desired) in state.enemies.iter_mut().zip(directions) {
        enemy.target_rotation = desired.y.atan2(desired.x);
        enemy.rotation = ease_angle(
            enemy.rotation,
            enemy.target_rotation,
            enemy.turn_rate * frame_scale,
        );
        enemy.pos += heading(enemy.rotation) * enemy.speed * frame_scale;

        let (pos, _) = resolve_rock_collisions(enemy.pos, enemy.radius(), &state.world.rocks);
        enemy.pos = pos;

        let to_player = player_pos - enemy.pos;
        enemy.turret_rotation = ease_angle(
            enemy.turret_rotation,
            to_player.y.atan2(to_player.x),
            ENEMY_TURRET_TURN_RATE * frame_scale,
        );

        if detect_stuck(enemy, &mut state.rng) {
            log::debug!("Enemy {} was stuck, escaping", enemy.id);
        }
    }

    // Backward so swap_remove never skips an unvisited enemy
    for i in (0..state.enemies.len()).rev() {
        if !state
            .world
            .contains(state.enemies[i].pos, -ENEMY_OUT_OF_BOUNDS_MARGIN)
        {
            let enemy = state.enemies.swap_remove(i);
            log::debug!("Enemy {} left the world", enemy.id);
        }
    }
}
