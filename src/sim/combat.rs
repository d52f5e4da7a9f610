//! Shooting, hit resolution and health-pack pickups
//!
//! Entity lists are walked backward so `swap_remove` during iteration never
//! skips an element that has not been visited yet.

use glam::Vec2;

use super::collision::{circle_circle, circles_overlap, hits_any_rock, settle_in_world};
use super::state::{Bullet, GameEvent, GamePhase, GameState};
use super::world::RespawnTimer;
use crate::consts::*;
use crate::heading;

const ENEMY_HIT_COLOR: [u8; 3] = [255, 140, 40];
const PLAYER_HIT_COLOR: [u8; 3] = [255, 60, 60];
const ROCK_IMPACT_COLOR: [u8; 3] = [170, 160, 150];
const SCORE_TEXT_COLOR: [u8; 3] = [255, 230, 90];
const HEAL_TEXT_COLOR: [u8; 3] = [90, 255, 120];

/// Barrel tip distance from the tank center
const MUZZLE_OFFSET: f32 = TANK_RADIUS + 8.0;
/// Enemies only fire when the turret is roughly on target
const ENEMY_AIM_TOLERANCE: f32 = 0.25;

/// Fire a player bullet along the turret if the cooldown gate is open
pub fn player_fire(state: &mut GameState, rapid_fire: bool) -> bool {
    let now = state.elapsed_ms;
    if !state.player.can_shoot(now, rapid_fire) {
        return false;
    }
    let angle = state.player.turret_rotation;
    let muzzle = state.player.pos + heading(angle) * MUZZLE_OFFSET;
    state.player_bullets.push(Bullet::player(muzzle, angle));
    state.player.last_shot_ms = Some(now);
    true
}

/// Let every enemy in range with a settled aim and a ready gun shoot
pub fn enemy_fire(state: &mut GameState) {
    let now = state.elapsed_ms;
    let player_pos = state.player.pos;

    for enemy in &mut state.enemies {
        if now - enemy.last_shot_ms < enemy.shoot_cooldown_ms {
            continue;
        }
        let to_player = player_pos - enemy.pos;
        if to_player.length() > ENEMY_FIRE_RANGE {
            continue;
        }
        let aim_error = crate::angle_delta(enemy.turret_rotation, to_player.y.atan2(to_player.x));
        if aim_error.abs() > ENEMY_AIM_TOLERANCE {
            continue;
        }
        let muzzle = enemy.pos + heading(enemy.turret_rotation) * MUZZLE_OFFSET;
        state
            .enemy_bullets
            .push(Bullet::enemy(muzzle, enemy.turret_rotation));
        enemy.last_shot_ms = now;
    }
}

/// Advance both bullet pools and drop bullets that left the world
pub fn update_bullets(state: &mut GameState, frame_scale: f32) {
    for pool in [&mut state.player_bullets, &mut state.enemy_bullets] {
        for i in (0..pool.len()).rev() {
            pool[i].advance(frame_scale);
            if !state.world.contains(pool[i].pos, 0.0) {
                pool.swap_remove(i);
            }
        }
    }
}

/// Resolve all combat interactions for one frame, in fixed order:
/// player bullets vs enemies, enemy bullets vs player, body contact,
/// then bullets vs rocks
pub fn resolve_combat(state: &mut GameState, frame_scale: f32) {
    player_bullets_vs_enemies(state);
    enemy_bullets_vs_player(state);
    ramming(state, frame_scale);
    bullets_vs_rocks(state);
}

fn player_bullets_vs_enemies(state: &mut GameState) {
    for b in (0..state.player_bullets.len()).rev() {
        let bullet = state.player_bullets[b];
        let Some(e) = (0..state.enemies.len()).rev().find(|&e| {
            let enemy = &state.enemies[e];
            circles_overlap(bullet.pos, bullet.radius(), enemy.pos, enemy.radius())
        }) else {
            continue;
        };

        state.player_bullets.swap_remove(b);
        state.enemies[e].damage(bullet.damage);
        state.spawn_burst(bullet.pos, ENEMY_HIT_COLOR, 8, 3.0);

        if state.enemies[e].is_dead() {
            let enemy = state.enemies.swap_remove(e);
            state.score += ENEMY_KILL_SCORE;
            state.kills += 1;
            state.spawn_burst(enemy.pos, ENEMY_HIT_COLOR, 24, 4.5);
            state.spawn_text(enemy.pos, format!("+{}", ENEMY_KILL_SCORE), SCORE_TEXT_COLOR);
            state.events.push(GameEvent::EnemyKilled {
                id: enemy.id,
                score: ENEMY_KILL_SCORE,
            });
        }
    }
}

fn enemy_bullets_vs_player(state: &mut GameState) {
    for b in (0..state.enemy_bullets.len()).rev() {
        let bullet = state.enemy_bullets[b];
        if !circles_overlap(
            bullet.pos,
            bullet.radius(),
            state.player.pos,
            state.player.radius(),
        ) {
            continue;
        }
        state.enemy_bullets.swap_remove(b);
        state.player.damage(bullet.damage);
        state.spawn_burst(bullet.pos, PLAYER_HIT_COLOR, 10, 3.0);
        state.events.push(GameEvent::PlayerHit {
            damage: bullet.damage,
            health: state.player.health,
        });
        check_game_over(state);
    }
}

/// Continuous contact damage while an enemy touches the player, with both
/// bodies pushed apart by half the overlap each
fn ramming(state: &mut GameState, frame_scale: f32) {
    for enemy in &mut state.enemies {
        let contact = circle_circle(
            state.player.pos,
            state.player.radius(),
            enemy.pos,
            enemy.radius(),
        );
        if !contact.hit {
            continue;
        }
        state.player.damage(RAM_DAMAGE_PER_FRAME * frame_scale);
        let half = contact.normal * contact.penetration * 0.5;
        state.player.pos += half;
        enemy.pos -= half;
        let (pos, _) = settle_in_world(state.player.pos, state.player.radius(), &state.world);
        state.player.pos = pos;
    }
    check_game_over(state);
}

/// Bullets stop at rocks without damaging anything
fn bullets_vs_rocks(state: &mut GameState) {
    let mut impacts: Vec<Vec2> = Vec::new();
    for pool in [&mut state.player_bullets, &mut state.enemy_bullets] {
        for i in (0..pool.len()).rev() {
            if hits_any_rock(pool[i].pos, pool[i].radius(), &state.world.rocks) {
                impacts.push(pool.swap_remove(i).pos);
            }
        }
    }
    for pos in impacts {
        state.spawn_burst(pos, ROCK_IMPACT_COLOR, 5, 2.0);
    }
}

/// Transition to game over once the player's health is gone
pub fn check_game_over(state: &mut GameState) {
    if state.player.is_dead() && state.phase != GamePhase::GameOver {
        state.phase = GamePhase::GameOver;
        state.spawn_burst(state.player.pos, PLAYER_HIT_COLOR, 40, 5.0);
        state.events.push(GameEvent::GameOver {
            score: state.score,
            wave: state.wave.number,
        });
    }
}

/// Animate pack glow and restore packs whose respawn timer elapsed
pub fn update_health_packs(state: &mut GameState, dt_ms: f32, frame_scale: f32) {
    for pack in &mut state.world.health_packs {
        pack.pulse = (pack.pulse + 0.08 * frame_scale) % std::f32::consts::TAU;
    }

    let world = &mut state.world;
    for i in (0..world.respawn_timers.len()).rev() {
        world.respawn_timers[i].remaining_ms -= dt_ms;
        if world.respawn_timers[i].remaining_ms <= 0.0 {
            let timer = world.respawn_timers.swap_remove(i);
            if let Some(pack) = world.health_packs.get_mut(timer.pack) {
                pack.collected = false;
            }
            state
                .events
                .push(GameEvent::HealthPackRespawned { index: timer.pack });
        }
    }
}

/// Pick up packs the player overlaps. Packs stay put while the player is at
/// full health.
pub fn collect_health_packs(state: &mut GameState) {
    for i in 0..state.world.health_packs.len() {
        if state.player.health >= MAX_HEALTH {
            return;
        }
        let pack = &state.world.health_packs[i];
        if pack.collected
            || pack.pos.distance(state.player.pos) >= state.player.radius() + pack.size
        {
            continue;
        }
        let pos = pack.pos;

        state.player.heal(HEALTH_PACK_HEAL);
        state.score += HEALTH_PACK_POINTS;
        state.health_packs_collected += 1;
        state.world.health_packs[i].collected = true;
        state.world.respawn_timers.push(RespawnTimer {
            pack: i,
            remaining_ms: HEALTH_PACK_RESPAWN_MS,
        });
        state.spawn_text(pos, format!("+{} HP", HEALTH_PACK_HEAL as u32), HEAL_TEXT_COLOR);
        state.events.push(GameEvent::HealthPackCollected {
            index: i,
            health: state.player.health,
        });
    }
}
