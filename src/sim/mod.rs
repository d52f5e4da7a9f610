//! Arena simulation
//!
//! All gameplay logic lives here. Nothing in this module touches the DOM or
//! the GPU:
//! - Seeded RNG only (`Pcg32`), so a seed replays identically
//! - Entity removal walks lists backward with `swap_remove`
//! - Motion is scaled by elapsed time, timers run on milliseconds

pub mod camera;
pub mod collision;
pub mod combat;
pub mod notify;
pub mod state;
pub mod steering;
pub mod tick;
pub mod wave;
pub mod world;

pub use camera::Camera;
pub use collision::{CollisionResult, circle_circle, circles_overlap, push_out, settle_in_world};
pub use combat::{collect_health_packs, resolve_combat, update_health_packs};
pub use notify::{Notification, Notifications};
pub use state::{
    Bullet, EnemyTank, GameEvent, GamePhase, GameState, Particle, ParticleKind, PlayerTank,
};
pub use steering::{detect_stuck, move_direction, steering_direction, update_enemies, update_player};
pub use tick::{TickInput, frame_scale, tick};
pub use wave::{
    WavePhase, WaveState, enemy_count_for_wave, skip_wave, spawn_wave, update_waves, wave_reward,
};
pub use world::{
    HealthPack, RespawnTimer, Rock, World, generate_health_packs, generate_rocks, jitter_color,
    rock_silhouette,
};
