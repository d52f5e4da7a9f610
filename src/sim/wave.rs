//! Wave director
//!
//! `Starting` counts down, then the whole quota spawns at once and the wave
//! goes `Active` until either every enemy is dead or the time limit runs out.
//! `Ending` holds for a short delay so the result message can be read, then
//! the next wave starts counting down. Survivors of a timed-out wave carry
//! over into the next one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{EnemyTank, GameEvent, GameState};
use crate::consts::*;

const WAVE_TEXT_COLOR: [u8; 3] = [120, 200, 255];
const CLEAR_TEXT_COLOR: [u8; 3] = [120, 255, 140];
const TIMEOUT_TEXT_COLOR: [u8; 3] = [255, 180, 80];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Game not started
    Idle,
    /// Counting down to the spawn
    Starting { countdown_ms: f32 },
    /// Enemies are out; `WaveState::time_left_ms` is ticking
    Active,
    /// Result shown, next countdown pending
    Ending { delay_ms: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveState {
    /// Current wave number (1-based once started, never decreases)
    pub number: u32,
    pub target_count: u32,
    pub spawned: u32,
    pub phase: WavePhase,
    pub time_left_ms: f32,
    pub scaling_factor: u32,
}

impl Default for WaveState {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveState {
    pub fn new() -> Self {
        Self {
            number: 1,
            target_count: 0,
            spawned: 0,
            phase: WavePhase::Idle,
            time_left_ms: WAVE_TIME_LIMIT_MS,
            scaling_factor: 1,
        }
    }

    /// Enter the countdown for `number`; lower numbers are ignored
    pub fn begin_countdown(&mut self, number: u32) {
        self.number = number.max(self.number);
        self.target_count = enemy_count_for_wave(self.number);
        self.scaling_factor = scaling_factor(self.number);
        self.spawned = 0;
        self.time_left_ms = WAVE_TIME_LIMIT_MS;
        self.phase = WavePhase::Starting {
            countdown_ms: WAVE_COUNTDOWN_MS,
        };
    }

    pub fn is_starting(&self) -> bool {
        matches!(self.phase, WavePhase::Starting { .. })
    }

    pub fn is_active(&self) -> bool {
        self.phase == WavePhase::Active
    }

    /// Whole seconds left on the countdown, if counting down
    pub fn countdown_secs(&self) -> Option<u32> {
        match self.phase {
            WavePhase::Starting { countdown_ms } => Some((countdown_ms / 1000.0).ceil().max(0.0) as u32),
            _ => None,
        }
    }
}

/// Difficulty multiplier: doubles every ten waves from wave 7
pub fn scaling_factor(wave: u32) -> u32 {
    if wave < WAVE_SCALING_START {
        1
    } else {
        let block = (wave - WAVE_SCALING_START) / WAVE_SCALING_BLOCK;
        1u32.checked_shl(block).unwrap_or(u32::MAX)
    }
}

/// Enemies spawned by `wave`
pub fn enemy_count_for_wave(wave: u32) -> u32 {
    if let Some(&count) = WAVE_ENEMY_TABLE.get(wave as usize) {
        return count;
    }
    let factor = scaling_factor(wave);
    let wave_in_block = (wave - WAVE_SCALING_START) % WAVE_SCALING_BLOCK;
    WAVE_BASE_ENEMIES
        .saturating_mul(factor)
        .saturating_add(WAVE_ENEMY_INCREMENT.saturating_mul(wave_in_block).saturating_mul(factor))
}

/// Score bonus for clearing `wave`
pub fn wave_reward(wave: u32) -> u64 {
    WAVE_BASE_REWARD + WAVE_BONUS_INCREMENT * (wave.saturating_sub(1) / 10) as u64
}

/// Advance the wave state machine by `dt_ms`
pub fn update_waves(state: &mut GameState, dt_ms: f32) {
    match state.wave.phase {
        WavePhase::Idle => {}
        WavePhase::Starting { countdown_ms } => {
            let countdown_ms = countdown_ms - dt_ms;
            if countdown_ms > 0.0 {
                state.wave.phase = WavePhase::Starting { countdown_ms };
                return;
            }
            spawn_wave(state);
            state.wave.phase = WavePhase::Active;
            state.wave.time_left_ms = WAVE_TIME_LIMIT_MS;
            let wave = state.wave.number;
            state.notifications.push(
                format!("Wave {} - {} enemies incoming!", wave, state.wave.target_count),
                WAVE_TEXT_COLOR,
            );
            state.events.push(GameEvent::WaveStarted {
                wave,
                enemies: state.wave.target_count,
            });
        }
        WavePhase::Active => {
            state.wave.time_left_ms -= dt_ms;
            let wave = state.wave.number;

            if state.enemies.is_empty() {
                let reward = wave_reward(wave);
                state.score += reward;
                state
                    .notifications
                    .push(format!("Wave {} complete! +{}", wave, reward), CLEAR_TEXT_COLOR);
                state.events.push(GameEvent::WaveCleared { wave, reward });
                state.wave.phase = WavePhase::Ending {
                    delay_ms: WAVE_END_DELAY_MS,
                };
            } else if state.wave.time_left_ms <= 0.0 {
                let remaining = state.enemies.len();
                state.wave.time_left_ms = 0.0;
                state.notifications.push(
                    format!("Time's up! {} enemies carry over", remaining),
                    TIMEOUT_TEXT_COLOR,
                );
                state.events.push(GameEvent::WaveTimedOut { wave, remaining });
                state.wave.phase = WavePhase::Ending {
                    delay_ms: WAVE_END_DELAY_MS,
                };
            }
        }
        WavePhase::Ending { delay_ms } => {
            let delay_ms = delay_ms - dt_ms;
            if delay_ms > 0.0 {
                state.wave.phase = WavePhase::Ending { delay_ms };
                return;
            }
            let next = state.wave.number + 1;
            state.wave.begin_countdown(next);
            state.events.push(GameEvent::WaveCountdown { wave: next });
        }
    }
}

/// Jump straight to the next wave's countdown
pub fn skip_wave(state: &mut GameState) {
    let next = state.wave.number + 1;
    state.wave.begin_countdown(next);
    state.events.push(GameEvent::WaveCountdown { wave: next });
}

/// Spawn the full quota for the current wave
pub fn spawn_wave(state: &mut GameState) {
    let wave = state.wave.number;
    for _ in 0..state.wave.target_count {
        let pos = find_spawn_position(state);
        let id = state.next_entity_id();
        let enemy = EnemyTank::new(id, pos, wave, state.elapsed_ms, &mut state.rng);
        state.enemies.push(enemy);
        state.wave.spawned += 1;
    }
    log::info!(
        "Wave {} spawned {} enemies ({} alive)",
        wave,
        state.wave.spawned,
        state.enemies.len()
    );
}

/// Whether an enemy may appear at `pos`
pub fn is_valid_spawn(state: &GameState, pos: Vec2) -> bool {
    if pos.distance(state.player.pos) < SPAWN_SAFE_RADIUS {
        return false;
    }
    let clear_of_rocks = state.world.rocks.iter().all(|r| {
        pos.distance(r.pos) >= r.collision_radius + TANK_RADIUS + SPAWN_CLEARANCE
    });
    let clear_of_enemies = state
        .enemies
        .iter()
        .all(|e| pos.distance(e.pos) >= e.radius() + TANK_RADIUS + SPAWN_CLEARANCE);
    let clear_of_packs = state
        .world
        .health_packs
        .iter()
        .all(|p| pos.distance(p.pos) >= p.size + TANK_RADIUS + SPAWN_CLEARANCE);
    clear_of_rocks && clear_of_enemies && clear_of_packs
}

/// Random valid spawn point; after the attempt budget the last candidate is
/// used unchecked
pub fn find_spawn_position(state: &mut GameState) -> Vec2 {
    let margin = TANK_RADIUS * 2.0;
    let mut candidate = state.world.random_point(margin, &mut state.rng);
    for _ in 1..SPAWN_ATTEMPTS {
        if is_valid_spawn(state, candidate) {
            return candidate;
        }
        candidate = state.world.random_point(margin, &mut state.rng);
    }
    if !is_valid_spawn(state, candidate) {
        log::debug!("Spawn placement exhausted, using unchecked position {:?}", candidate);
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn started_state() -> GameState {
        let mut state = GameState::new(4242);
        state.start();
        state
    }

    #[test]
    fn test_enemy_count_table() {
        let counts: Vec<u32> = (0..7).map(enemy_count_for_wave).collect();
        assert_eq!(counts, vec![0, 1, 2, 4, 6, 8, 10]);
        assert_eq!(enemy_count_for_wave(3), 4);
        assert_eq!(enemy_count_for_wave(6), 10);
    }

    #[test]
    fn test_enemy_count_closed_form() {
        assert_eq!(enemy_count_for_wave(7), 10);
        assert_eq!(enemy_count_for_wave(8), 12);
        assert_eq!(enemy_count_for_wave(16), 28);
        assert_eq!(enemy_count_for_wave(17), 20);
        assert_eq!(enemy_count_for_wave(27), 40);
    }

    #[test]
    fn test_scaling_factor_doubles_every_ten_waves() {
        assert_eq!(scaling_factor(1), 1);
        assert_eq!(scaling_factor(7), 1);
        assert_eq!(scaling_factor(16), 1);
        assert_eq!(scaling_factor(17), 2);
        assert_eq!(scaling_factor(27), 4);
    }

    #[test]
    fn test_wave_reward() {
        assert_eq!(wave_reward(1), 100);
        assert_eq!(wave_reward(10), 100);
        assert_eq!(wave_reward(11), 150);
        assert_eq!(wave_reward(20), 150);
        assert_eq!(wave_reward(21), 200);
        assert_eq!(wave_reward(30), 200);
    }

    #[test]
    fn test_countdown_then_spawn() {
        let mut state = started_state();
        assert!(state.wave.is_starting());
        update_waves(&mut state, WAVE_COUNTDOWN_MS - 1.0);
        assert!(state.wave.is_starting());
        assert!(state.enemies.is_empty());
        update_waves(&mut state, 1.0);
        assert!(state.wave.is_active());
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.wave.spawned, 1);
    }

    #[test]
    fn test_clear_grants_reward_and_advances_after_delay() {
        let mut state = started_state();
        update_waves(&mut state, WAVE_COUNTDOWN_MS);
        state.enemies.clear();
        update_waves(&mut state, 16.0);
        assert_eq!(state.score, 100);
        assert!(matches!(state.wave.phase, WavePhase::Ending { .. }));

        update_waves(&mut state, WAVE_END_DELAY_MS - 100.0);
        assert_eq!(state.wave.number, 1);
        update_waves(&mut state, 100.0);
        assert_eq!(state.wave.number, 2);
        assert!(state.wave.is_starting());
        assert_eq!(state.wave.target_count, 2);
    }

    #[test]
    fn test_timeout_keeps_survivors() {
        let mut state = started_state();
        update_waves(&mut state, WAVE_COUNTDOWN_MS);
        update_waves(&mut state, WAVE_TIME_LIMIT_MS);
        assert!(matches!(state.wave.phase, WavePhase::Ending { .. }));
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, 0);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::WaveTimedOut { remaining: 1, .. })));

        // Next wave adds its quota on top of the survivor
        update_waves(&mut state, WAVE_END_DELAY_MS);
        update_waves(&mut state, WAVE_COUNTDOWN_MS);
        assert_eq!(state.enemies.len(), 3);
    }

    #[test]
    fn test_spawns_respect_safety_radius() {
        let mut state = started_state();
        state.wave.begin_countdown(6);
        update_waves(&mut state, WAVE_COUNTDOWN_MS);
        assert_eq!(state.enemies.len(), 10);
        for enemy in &state.enemies {
            assert!(enemy.pos.distance(state.player.pos) >= SPAWN_SAFE_RADIUS);
        }
    }

    #[test]
    fn test_wave_number_never_decreases() {
        let mut wave = WaveState::new();
        wave.begin_countdown(5);
        wave.begin_countdown(3);
        assert_eq!(wave.number, 5);
    }

    #[test]
    fn test_countdown_secs() {
        let mut wave = WaveState::new();
        assert_eq!(wave.countdown_secs(), None);
        wave.begin_countdown(1);
        assert_eq!(wave.countdown_secs(), Some(5));
        wave.phase = WavePhase::Starting { countdown_ms: 4001.0 };
        assert_eq!(wave.countdown_secs(), Some(5));
        wave.phase = WavePhase::Starting { countdown_ms: 4000.0 };
        assert_eq!(wave.countdown_secs(), Some(4));
    }

    proptest! {
        #[test]
        fn prop_counts_non_decreasing_within_block(block in 0u32..5, step in 0u32..9) {
            let wave = WAVE_SCALING_START + block * WAVE_SCALING_BLOCK + step;
            prop_assert!(enemy_count_for_wave(wave + 1) >= enemy_count_for_wave(wave));
        }

        #[test]
        fn prop_block_starts_double(block in 0u32..6) {
            let start = WAVE_SCALING_START + block * WAVE_SCALING_BLOCK;
            prop_assert_eq!(
                enemy_count_for_wave(start + WAVE_SCALING_BLOCK),
                enemy_count_for_wave(start) * 2
            );
        }

        #[test]
        fn prop_reward_steps_every_ten(wave in 1u32..500) {
            prop_assert_eq!(wave_reward(wave), 100 + 50 * ((wave - 1) / 10) as u64);
        }
    }
}
