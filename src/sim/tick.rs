//! Variable timestep simulation tick
//!
//! Motion is expressed per reference frame (60 Hz) and scaled by
//! `dt_ms / FRAME_MS`, so the game plays at the same speed on any refresh
//! rate. Timers (cooldowns, countdowns, respawns) run on milliseconds.

use glam::Vec2;

use super::combat::{
    collect_health_packs, enemy_fire, player_fire, resolve_combat, update_bullets,
    update_health_packs,
};
use super::state::{GameState, ParticleKind};
use super::steering::{aim_turret, update_enemies, update_player};
use super::wave::update_waves;
use crate::consts::*;

/// Burst fragments slow down as they fly
const PARTICLE_DRAG: f32 = 0.96;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Movement direction from the held keys (screen axes, not normalized)
    pub move_dir: Vec2,
    /// World-space aim point for the turret
    pub aim: Option<Vec2>,
    /// Try to shoot this frame (cooldown still applies)
    pub fire: bool,
    /// Debug: ignore the player's shot cooldown
    pub rapid_fire: bool,
}

/// Frame-rate scale for an elapsed time in milliseconds
#[inline]
pub fn frame_scale(dt_ms: f32) -> f32 {
    dt_ms / FRAME_MS
}

/// Advance the game state by `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if !state.is_running() {
        return;
    }

    let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_MS);
    let fs = frame_scale(dt_ms);
    state.elapsed_ms += dt_ms;

    update_player(&mut state.player, input.move_dir, &state.world, fs);
    if let Some(aim) = input.aim {
        aim_turret(&mut state.player, aim);
    }
    if input.fire {
        player_fire(state, input.rapid_fire);
    }

    update_enemies(state, fs);
    enemy_fire(state);
    update_bullets(state, fs);
    resolve_combat(state, fs);
    if state.is_over() {
        return;
    }

    update_health_packs(state, dt_ms, fs);
    collect_health_packs(state);
    update_particles(state, dt_ms, fs);
    update_waves(state, dt_ms);
    state.notifications.update(dt_ms);
    state.camera.follow(state.player.pos, &state.world, fs);
}

/// Move bursts, lift floating text, drop anything expired
pub fn update_particles(state: &mut GameState, dt_ms: f32, frame_scale: f32) {
    let drag = PARTICLE_DRAG.powf(frame_scale);
    for particle in &mut state.particles {
        particle.life_ms -= dt_ms;
        match &mut particle.kind {
            ParticleKind::Burst { vel, .. } => {
                particle.pos += *vel * frame_scale;
                *vel *= drag;
            }
            ParticleKind::Text { .. } => {
                particle.pos.y -= FLOATING_TEXT_DRIFT * frame_scale;
            }
        }
    }
    state.particles.retain(|p| p.life_ms > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bullet, GamePhase};
    use crate::sim::wave::wave_reward;

    fn run_for(state: &mut GameState, input: &TickInput, total_ms: f32, step_ms: f32) {
        let steps = (total_ms / step_ms).round() as usize;
        for _ in 0..steps {
            tick(state, input, step_ms);
        }
    }

    #[test]
    fn test_tick_ignored_until_started() {
        let mut state = GameState::new(12345);
        tick(&mut state, &TickInput::default(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.elapsed_ms, 0.0);
    }

    #[test]
    fn test_first_wave_spawns_one_enemy() {
        let mut state = GameState::new(12345);
        state.start();
        run_for(&mut state, &TickInput::default(), WAVE_COUNTDOWN_MS - 100.0, 100.0);
        assert!(state.enemies.is_empty());
        tick(&mut state, &TickInput::default(), 100.0);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_killing_last_enemy_rewards_wave() {
        let mut state = GameState::new(12345);
        state.start();
        run_for(&mut state, &TickInput::default(), WAVE_COUNTDOWN_MS, 100.0);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, 0);

        let target = state.enemies[0].pos;
        for _ in 0..2 {
            state.player_bullets.push(Bullet::player(target, 0.0));
        }
        tick(&mut state, &TickInput::default(), FRAME_MS);

        assert!(state.enemies.is_empty());
        assert_eq!(state.kills, 1);
        assert_eq!(state.score, ENEMY_KILL_SCORE + wave_reward(1));
    }

    #[test]
    fn test_enemy_fire_ends_game() {
        let mut state = GameState::new(12345);
        state.start();
        for _ in 0..10 {
            state.enemy_bullets.push(Bullet::enemy(state.player.pos, 0.0));
        }
        tick(&mut state, &TickInput::default(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.is_running());

        // Halted: further ticks change nothing
        let elapsed = state.elapsed_ms;
        tick(&mut state, &TickInput::default(), FRAME_MS);
        assert_eq!(state.elapsed_ms, elapsed);
    }

    #[test]
    fn test_paused_state_is_frozen() {
        let mut state = GameState::new(12345);
        state.start();
        run_for(&mut state, &TickInput::default(), WAVE_COUNTDOWN_MS, 100.0);
        state.phase = GamePhase::Paused;

        let enemy_pos = state.enemies[0].pos;
        let elapsed = state.elapsed_ms;
        let input = TickInput {
            move_dir: Vec2::X,
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_MS);
        assert_eq!(state.enemies[0].pos, enemy_pos);
        assert_eq!(state.elapsed_ms, elapsed);
        assert!(state.player_bullets.is_empty());
    }

    #[test]
    fn test_movement_is_frame_rate_independent() {
        let input = TickInput {
            move_dir: Vec2::new(0.0, -1.0),
            ..Default::default()
        };
        let mut fast = GameState::new(99);
        fast.start();
        let mut slow = fast.clone();

        run_for(&mut fast, &input, 500.0, 1000.0 / 120.0);
        run_for(&mut slow, &input, 500.0, 1000.0 / 30.0);

        let moved_fast = fast.player.pos.distance(fast.world.player_start());
        let moved_slow = slow.player.pos.distance(slow.world.player_start());
        assert!(moved_fast > 50.0);
        assert!((moved_fast - moved_slow).abs() / moved_fast < 0.15);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let input = TickInput {
            move_dir: Vec2::new(1.0, 1.0),
            aim: Some(Vec2::new(0.0, 0.0)),
            fire: true,
            rapid_fire: false,
        };
        let mut a = GameState::new(2024);
        let mut b = GameState::new(2024);
        a.start();
        b.start();
        run_for(&mut a, &input, 8000.0, FRAME_MS);
        run_for(&mut b, &input, 8000.0, FRAME_MS);

        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.score, b.score);
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
        }
    }

    #[test]
    fn test_particles_expire() {
        let mut state = GameState::new(5);
        state.start();
        state.spawn_burst(state.player.pos, [255, 0, 0], 20, 3.0);
        state.spawn_text(state.player.pos, "+50", [255, 255, 0]);
        let text_y = state.player.pos.y;

        update_particles(&mut state, 100.0, frame_scale(100.0));
        let text = state.particles.iter().find(|p| p.is_text());
        assert!(text.is_some_and(|p| p.pos.y < text_y));

        update_particles(&mut state, FLOATING_TEXT_LIFE_MS, 1.0);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_huge_frame_is_clamped() {
        let mut state = GameState::new(8);
        state.start();
        tick(&mut state, &TickInput::default(), 10_000.0);
        assert_eq!(state.elapsed_ms, MAX_FRAME_MS);
    }
}
