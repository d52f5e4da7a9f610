//! Tank Arena - a top-down tank survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, steering, combat, waves)
//! - `renderer`: Scene building and the WebGPU triangle pipeline
//! - `session`: Input capture and run/pause/reset orchestration
//! - `hud`: HUD text sink abstraction
//! - `settings`: Runtime configuration and debug toggles

pub mod hud;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use hud::{HudField, HudSink, HudSnapshot};
pub use session::Session;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
///
/// Speeds and per-frame rates are expressed per 60 fps reference frame and
/// rescaled by `dt / FRAME_MS`; timers are in milliseconds.
pub mod consts {
    /// Reference frame duration (60 fps baseline)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest delta fed to the simulation in one frame
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 3000.0;
    pub const WORLD_HEIGHT: f32 = 3000.0;
    /// Keep-out margin for the player along the world edges
    pub const WORLD_MARGIN: f32 = 20.0;
    /// Enemies further than this outside the world are discarded
    pub const ENEMY_OUT_OF_BOUNDS_MARGIN: f32 = 100.0;

    /// Rocks
    pub const ROCK_COUNT: usize = 40;
    pub const ROCK_MIN_SIZE: f32 = 40.0;
    pub const ROCK_MAX_SIZE: f32 = 100.0;
    pub const ROCK_COLLISION_FACTOR: f32 = 0.6;
    pub const ROCK_MIN_PLAYER_DISTANCE: f32 = 300.0;
    /// Extra gap kept between neighbouring rock silhouettes
    pub const ROCK_PADDING: f32 = 40.0;
    pub const ROCK_MIN_POINTS: usize = 8;
    pub const ROCK_MAX_POINTS: usize = 12;
    pub const ROCK_IRREGULARITY: f32 = 0.35;
    pub const ROCK_BASE_COLOR: [u8; 3] = [112, 104, 96];
    pub const ROCK_COLOR_JITTER: i32 = 18;

    /// Health packs
    pub const HEALTH_PACK_COUNT: usize = 5;
    pub const HEALTH_PACK_SIZE: f32 = 20.0;
    pub const HEALTH_PACK_MIN_PLAYER_DISTANCE: f32 = 200.0;
    pub const HEALTH_PACK_MIN_SPACING: f32 = 300.0;
    pub const HEALTH_PACK_ROCK_CLEARANCE: f32 = 30.0;
    pub const HEALTH_PACK_HEAL: f32 = 25.0;
    pub const HEALTH_PACK_POINTS: u64 = 10;
    pub const HEALTH_PACK_RESPAWN_MS: f32 = 30_000.0;

    /// Generators give up after this many attempts per requested item
    pub const GENERATION_ATTEMPT_FACTOR: usize = 10;

    /// Tanks
    pub const MAX_HEALTH: f32 = 100.0;
    pub const TANK_RADIUS: f32 = 20.0;

    /// Player
    pub const PLAYER_MAX_SPEED: f32 = 4.0;
    pub const PLAYER_ACCELERATION: f32 = 0.2;
    pub const PLAYER_DECELERATION: f32 = 0.35;
    pub const PLAYER_FRICTION: f32 = 0.9;
    pub const PLAYER_ROTATION_SPEED: f32 = 0.12;
    pub const PLAYER_SHOOT_COOLDOWN_MS: f32 = 250.0;
    /// Velocity is zeroed once it decays below this magnitude
    pub const VELOCITY_EPSILON: f32 = 0.05;
    /// Velocity multiplier after bumping into a rock
    pub const ROCK_BUMP_DAMPING: f32 = 0.7;

    /// Enemies
    pub const ENEMY_MIN_SPEED: f32 = 1.4;
    pub const ENEMY_MAX_SPEED: f32 = 2.0;
    pub const ENEMY_MIN_TURN_RATE: f32 = 0.03;
    pub const ENEMY_MAX_TURN_RATE: f32 = 0.06;
    pub const ENEMY_TURRET_TURN_RATE: f32 = 0.08;
    pub const ENEMY_SHOOT_COOLDOWN_MS: f32 = 1500.0;
    pub const ENEMY_SHOOT_JITTER_MS: f32 = 1000.0;
    pub const ENEMY_FIRE_RANGE: f32 = 650.0;
    pub const ENEMY_KILL_SCORE: u64 = 50;
    /// Ramming damage per reference frame of body contact
    pub const RAM_DAMAGE_PER_FRAME: f32 = 0.25;

    /// Steering weights
    pub const PURSUIT_WEIGHT: f32 = 1.0;
    pub const AVOIDANCE_WEIGHT: f32 = 1.6;
    pub const WANDER_WEIGHT: f32 = 0.2;
    pub const AVOIDANCE_RADIUS: f32 = 140.0;
    pub const WANDER_JITTER: f32 = 0.3;
    /// Pursuit stops pressing closer than this to the player
    pub const ENEMY_PREFERRED_RANGE: f32 = 180.0;

    /// Stuck detection
    pub const STUCK_HISTORY_LEN: usize = 30;
    pub const STUCK_DISTANCE_THRESHOLD: f32 = 10.0;
    pub const STUCK_FRAME_THRESHOLD: u32 = 30;
    pub const STUCK_ESCAPE_DISTANCE: f32 = 60.0;

    /// Bullets
    pub const BULLET_RADIUS: f32 = 4.0;
    pub const PLAYER_BULLET_SPEED: f32 = 10.0;
    pub const ENEMY_BULLET_SPEED: f32 = 5.0;
    pub const PLAYER_BULLET_DAMAGE: f32 = 50.0;
    pub const ENEMY_BULLET_DAMAGE: f32 = 10.0;

    /// Particles
    pub const FLOATING_TEXT_LIFE_MS: f32 = 1000.0;
    pub const FLOATING_TEXT_DRIFT: f32 = 0.6;

    /// Waves
    pub const WAVE_COUNTDOWN_MS: f32 = 5000.0;
    pub const WAVE_TIME_LIMIT_MS: f32 = 60_000.0;
    pub const WAVE_END_DELAY_MS: f32 = 3000.0;
    pub const WAVE_ENEMY_TABLE: [u32; 7] = [0, 1, 2, 4, 6, 8, 10];
    pub const WAVE_SCALING_START: u32 = 7;
    pub const WAVE_SCALING_BLOCK: u32 = 10;
    pub const WAVE_BASE_ENEMIES: u32 = 10;
    pub const WAVE_ENEMY_INCREMENT: u32 = 2;
    pub const WAVE_BASE_REWARD: u64 = 100;
    pub const WAVE_BONUS_INCREMENT: u64 = 50;
    /// Spawn placement
    pub const SPAWN_SAFE_RADIUS: f32 = 500.0;
    pub const SPAWN_ATTEMPTS: usize = 50;
    pub const SPAWN_CLEARANCE: f32 = 20.0;

    /// Camera follow interpolation per reference frame
    pub const CAMERA_LERP: f32 = 0.1;

    /// Notifications
    pub const MAX_NOTIFICATIONS: usize = 5;
    pub const NOTIFICATION_LIFE_MS: f32 = 3000.0;
    pub const NOTIFICATION_SPACING: f32 = 34.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest signed rotation from `from` to `to`
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Rotate `current` toward `target` by at most `max_step` radians
#[inline]
pub fn ease_angle(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = angle_delta(current, target);
    normalize_angle(current + delta.clamp(-max_step, max_step))
}

/// Unit vector for a heading
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn test_ease_angle_takes_short_way() {
        // From just below +π to just above -π is a tiny positive step
        let eased = ease_angle(PI - 0.05, -PI + 0.05, 0.5);
        assert!((eased - (-PI + 0.05)).abs() < 1e-4);
    }

    #[test]
    fn test_ease_angle_clamps_step() {
        let eased = ease_angle(0.0, 1.0, 0.1);
        assert!((eased - 0.1).abs() < 1e-6);
    }
}
