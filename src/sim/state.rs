//! Game state and core simulation types
//!
//! Everything the update phase mutates lives in `GameState`; the renderer and
//! HUD only read it.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::notify::Notifications;
use super::wave::WaveState;
use super::world::World;
use crate::consts::*;
use crate::heading;

/// Run state of the game; the scheduler re-arms only while `Running`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created but not started yet
    Ready,
    /// Active gameplay
    Running,
    /// Frozen; entity state kept intact
    Paused,
    /// Player destroyed, simulation halted
    GameOver,
}

/// Things that happened during a tick, drained by the session for logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveCountdown { wave: u32 },
    WaveStarted { wave: u32, enemies: u32 },
    WaveCleared { wave: u32, reward: u64 },
    WaveTimedOut { wave: u32, remaining: usize },
    EnemyKilled { id: u32, score: u64 },
    PlayerHit { damage: f32, health: f32 },
    HealthPackCollected { index: usize, health: f32 },
    HealthPackRespawned { index: usize },
    GameOver { score: u64, wave: u32 },
}

/// The player's tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTank {
    pub pos: Vec2,
    /// Hull facing (radians)
    pub rotation: f32,
    /// Hull facing requested by the directional keys
    pub target_rotation: f32,
    /// Turret facing, follows the mouse independently of the hull
    pub turret_rotation: f32,
    pub velocity: Vec2,
    pub speed: f32,
    pub target_speed: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Simulation time of the last shot
    pub last_shot_ms: Option<f32>,
    pub shoot_cooldown_ms: f32,
    pub health: f32,
}

impl PlayerTank {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            rotation: -std::f32::consts::FRAC_PI_2,
            target_rotation: -std::f32::consts::FRAC_PI_2,
            turret_rotation: -std::f32::consts::FRAC_PI_2,
            velocity: Vec2::ZERO,
            speed: 0.0,
            target_speed: 0.0,
            max_speed: PLAYER_MAX_SPEED,
            acceleration: PLAYER_ACCELERATION,
            deceleration: PLAYER_DECELERATION,
            last_shot_ms: None,
            shoot_cooldown_ms: PLAYER_SHOOT_COOLDOWN_MS,
            health: MAX_HEALTH,
        }
    }

    pub fn radius(&self) -> f32 {
        TANK_RADIUS
    }

    /// Whether the cooldown gate is open at `now_ms`
    pub fn can_shoot(&self, now_ms: f32, rapid_fire: bool) -> bool {
        let cooldown = if rapid_fire { 0.0 } else { self.shoot_cooldown_ms };
        self.last_shot_ms
            .is_none_or(|last| now_ms - last >= cooldown)
    }

    /// Apply damage, clamped to [0, MAX_HEALTH]
    pub fn damage(&mut self, amount: f32) {
        self.health = (self.health - amount).clamp(0.0, MAX_HEALTH);
    }

    /// Heal, clamped to [0, MAX_HEALTH]
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).clamp(0.0, MAX_HEALTH);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// An enemy tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTank {
    pub id: u32,
    pub pos: Vec2,
    pub rotation: f32,
    pub target_rotation: f32,
    pub turret_rotation: f32,
    pub speed: f32,
    /// Max hull rotation per reference frame
    pub turn_rate: f32,
    pub health: f32,
    /// Per-instance cooldown (base plus random jitter)
    pub shoot_cooldown_ms: f32,
    pub last_shot_ms: f32,
    /// Random-walk heading for the wander force
    pub wander_angle: f32,
    /// Recent positions, oldest first
    pub history: VecDeque<Vec2>,
    pub stuck_frames: u32,
    /// Wave that spawned this enemy
    pub wave: u32,
}

impl EnemyTank {
    /// Create an enemy with randomized speed, turn rate and cooldown jitter
    pub fn new<R: Rng>(id: u32, pos: Vec2, wave: u32, now_ms: f32, rng: &mut R) -> Self {
        let rotation = rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
        Self {
            id,
            pos,
            rotation,
            target_rotation: rotation,
            turret_rotation: rotation,
            speed: rng.random_range(ENEMY_MIN_SPEED..ENEMY_MAX_SPEED),
            turn_rate: rng.random_range(ENEMY_MIN_TURN_RATE..ENEMY_MAX_TURN_RATE),
            health: MAX_HEALTH,
            shoot_cooldown_ms: ENEMY_SHOOT_COOLDOWN_MS
                + rng.random_range(0.0..ENEMY_SHOOT_JITTER_MS),
            last_shot_ms: now_ms,
            wander_angle: rotation,
            history: VecDeque::with_capacity(STUCK_HISTORY_LEN),
            stuck_frames: 0,
            wave,
        }
    }

    pub fn radius(&self) -> f32 {
        TANK_RADIUS
    }

    /// Apply damage, clamped to [0, MAX_HEALTH]
    pub fn damage(&mut self, amount: f32) {
        self.health = (self.health - amount).clamp(0.0, MAX_HEALTH);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// A projectile; player and enemy bullets live in separate pools
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    /// Travel direction (radians)
    pub angle: f32,
    pub speed: f32,
    pub damage: f32,
}

impl Bullet {
    pub fn player(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle,
            speed: PLAYER_BULLET_SPEED,
            damage: PLAYER_BULLET_DAMAGE,
        }
    }

    pub fn enemy(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle,
            speed: ENEMY_BULLET_SPEED,
            damage: ENEMY_BULLET_DAMAGE,
        }
    }

    pub fn radius(&self) -> f32 {
        BULLET_RADIUS
    }

    /// Advance along the travel direction
    pub fn advance(&mut self, frame_scale: f32) {
        self.pos += heading(self.angle) * self.speed * frame_scale;
    }
}

/// Particle payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Decorative burst fragment
    Burst { vel: Vec2, size: f32 },
    /// Floating text drifting upward
    Text { text: String },
}

/// A visual particle; bursts and floating text share one collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub color: [u8; 3],
    pub life_ms: f32,
    pub max_life_ms: f32,
    pub kind: ParticleKind,
}

impl Particle {
    /// Opacity from remaining life
    pub fn alpha(&self) -> f32 {
        if self.max_life_ms <= 0.0 {
            0.0
        } else {
            (self.life_ms / self.max_life_ms).clamp(0.0, 1.0)
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ParticleKind::Text { .. })
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub world: World,
    pub player: PlayerTank,
    pub enemies: Vec<EnemyTank>,
    pub player_bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub particles: Vec<Particle>,
    pub wave: WaveState,
    pub notifications: Notifications,
    pub camera: Camera,
    pub score: u64,
    pub kills: u32,
    pub health_packs_collected: u32,
    /// Simulation clock, advances only while running
    pub elapsed_ms: f32,
    /// Burst particles beyond this count are not spawned
    pub max_particles: usize,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh game with the given seed; world contents are generated
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let world = World::generate(WORLD_WIDTH, WORLD_HEIGHT, &mut rng);
        let start = world.player_start();
        let mut camera = Camera::default();
        camera.snap_to(start, &world);

        Self {
            seed,
            rng,
            phase: GamePhase::Ready,
            world,
            player: PlayerTank::new(start),
            enemies: Vec::new(),
            player_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            particles: Vec::new(),
            wave: WaveState::new(),
            notifications: Notifications::default(),
            camera,
            score: 0,
            kills: 0,
            health_packs_collected: 0,
            elapsed_ms: 0.0,
            max_particles: 500,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Begin play: wave 1 countdown starts
    pub fn start(&mut self) {
        self.phase = GamePhase::Running;
        self.wave.begin_countdown(1);
        self.events.push(GameEvent::WaveCountdown { wave: 1 });
    }

    /// Wipe progress and regenerate the world, keeping the RNG stream and
    /// camera viewport; the game is left running at wave 1
    pub fn reset(&mut self) {
        self.world = World::generate(self.world.width, self.world.height, &mut self.rng);
        let start = self.world.player_start();
        self.player = PlayerTank::new(start);
        self.enemies.clear();
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.particles.clear();
        self.notifications.clear();
        self.wave = WaveState::new();
        self.score = 0;
        self.kills = 0;
        self.health_packs_collected = 0;
        self.elapsed_ms = 0.0;
        self.events.clear();
        self.camera.snap_to(start, &self.world);
        self.start();
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Emit a burst of particles, respecting the particle cap
    pub fn spawn_burst(&mut self, pos: Vec2, color: [u8; 3], count: usize, speed: f32) {
        let room = self.max_particles.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let angle = self
                .rng
                .random_range(-std::f32::consts::PI..std::f32::consts::PI);
            let vel = heading(angle) * speed * self.rng.random_range(0.3..1.0);
            let life = self.rng.random_range(400.0..900.0);
            self.particles.push(Particle {
                pos,
                color,
                life_ms: life,
                max_life_ms: life,
                kind: ParticleKind::Burst {
                    vel,
                    size: self.rng.random_range(2.0..5.0),
                },
            });
        }
    }

    /// Add a floating text particle
    pub fn spawn_text(&mut self, pos: Vec2, text: impl Into<String>, color: [u8; 3]) {
        self.particles.push(Particle {
            pos,
            color,
            life_ms: FLOATING_TEXT_LIFE_MS,
            max_life_ms: FLOATING_TEXT_LIFE_MS,
            kind: ParticleKind::Text { text: text.into() },
        });
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_ready_and_full_health() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.player.health, MAX_HEALTH);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.pos, state.world.player_start());
    }

    #[test]
    fn test_player_health_clamps() {
        let mut player = PlayerTank::new(Vec2::ZERO);
        player.damage(250.0);
        assert_eq!(player.health, 0.0);
        player.heal(500.0);
        assert_eq!(player.health, MAX_HEALTH);
    }

    #[test]
    fn test_can_shoot_respects_cooldown() {
        let mut player = PlayerTank::new(Vec2::ZERO);
        assert!(player.can_shoot(0.0, false));
        player.last_shot_ms = Some(1000.0);
        assert!(!player.can_shoot(1100.0, false));
        assert!(player.can_shoot(1100.0, true));
        assert!(player.can_shoot(1000.0 + PLAYER_SHOOT_COOLDOWN_MS, false));
    }

    #[test]
    fn test_burst_respects_particle_cap() {
        let mut state = GameState::new(3);
        state.max_particles = 4;
        state.spawn_burst(Vec2::ZERO, [255, 0, 0], 10, 3.0);
        assert_eq!(state.particles.len(), 4);
        // Text is not subject to the cap
        state.spawn_text(Vec2::ZERO, "+50", [255, 255, 255]);
        assert_eq!(state.particles.len(), 5);
    }

    #[test]
    fn test_particle_alpha_tracks_life() {
        let particle = Particle {
            pos: Vec2::ZERO,
            color: [0, 0, 0],
            life_ms: 250.0,
            max_life_ms: 1000.0,
            kind: ParticleKind::Text { text: "x".into() },
        };
        assert!((particle.alpha() - 0.25).abs() < 1e-6);
    }
}
