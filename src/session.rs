//! Input capture and run-state orchestration
//!
//! `Session` owns the `GameState` and everything the browser shell would
//! otherwise keep in loose globals: held keys, mouse state, the frame clock
//! and the animation-frame arming flag.
//!
//! Scheduler contract: the shell requests the next animation frame only when
//! `arm()` returns true. `arm()` succeeds while the game is running and no
//! callback is already pending, so pause, game over and duplicate starts
//! never leave a second loop behind.

use std::collections::HashSet;

use glam::Vec2;

use crate::consts::*;
use crate::hud::{HudSink, HudSnapshot};
use crate::renderer::{Frame, SceneOptions, build_frame};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, move_direction, skip_wave, tick};

const NOTICE_COLOR: [u8; 3] = [200, 200, 255];

/// Converts animation-frame timestamps into clamped deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    /// Milliseconds since the previous call. The first call after a reset
    /// yields one reference frame instead of the gap since the baseline.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last) as f32,
            None => FRAME_MS,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, MAX_FRAME_MS)
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Average FPS over the last 60 frames
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FpsCounter {
    pub fn record(&mut self, now_ms: f64) {
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // After the write, the slot at frame_index holds the oldest sample
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = now_ms - oldest;
            if elapsed > 0.0 {
                let frames = (self.frame_times.len() - 1) as f64;
                self.fps = (frames * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// A running game plus the input and scheduling state around it
pub struct Session {
    pub state: GameState,
    pub settings: Settings,
    keys: HashSet<String>,
    mouse_screen: Option<Vec2>,
    mouse_down: bool,
    /// Time since the last mouse auto-fire attempt
    auto_fire_ms: f32,
    /// A click that has not been turned into a shot yet
    click_pending: bool,
    clock: FrameClock,
    fps: FpsCounter,
    /// An animation-frame callback is pending
    armed: bool,
    fullscreen: bool,
    last_hud: Option<HudSnapshot>,
}

impl Session {
    pub fn new(seed: u64, settings: Settings) -> Self {
        let mut state = GameState::new(seed);
        state.max_particles = settings.max_particles();
        log::info!("Session created with seed {}", seed);
        Self {
            state,
            settings,
            keys: HashSet::new(),
            mouse_screen: None,
            mouse_down: false,
            auto_fire_ms: 0.0,
            click_pending: false,
            clock: FrameClock::default(),
            fps: FpsCounter::default(),
            armed: false,
            fullscreen: false,
            last_hud: None,
        }
    }

    // === Run state ===

    /// Start from the title screen; ignored once a game has begun
    pub fn start_game(&mut self) -> bool {
        if self.state.phase != GamePhase::Ready {
            return false;
        }
        self.state.start();
        self.clock.reset();
        log::info!("Game started (seed {})", self.state.seed);
        true
    }

    /// Fresh world and stats, running at wave 1
    pub fn reset_game(&mut self) {
        self.state.reset();
        self.state.max_particles = self.settings.max_particles();
        self.release_inputs();
        self.clock.reset();
        self.last_hud = None;
        log::info!("Game reset");
    }

    /// Running ⇄ Paused; no-op in any other phase
    pub fn toggle_pause(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Running => {
                self.state.phase = GamePhase::Paused;
                self.release_inputs();
                log::info!("Paused");
                true
            }
            GamePhase::Paused => {
                self.state.phase = GamePhase::Running;
                self.clock.reset();
                log::info!("Resumed");
                true
            }
            GamePhase::Ready | GamePhase::GameOver => false,
        }
    }

    /// Flip the fullscreen flag; the shell swaps containers and then calls
    /// `resize` with the new canvas size
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        log::info!("Fullscreen {}", if self.fullscreen { "on" } else { "off" });
        self.fullscreen
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Canvas size changed (CSS pixels)
    pub fn resize(&mut self, width: f32, height: f32) {
        let GameState { camera, world, .. } = &mut self.state;
        camera.resize(width, height, world);
    }

    // === Scheduling ===

    /// Whether the loop should continue at all
    pub fn should_rearm(&self) -> bool {
        self.state.phase == GamePhase::Running
    }

    /// Claim the next animation frame. Returns true when the caller should
    /// actually request one.
    pub fn arm(&mut self) -> bool {
        if self.should_rearm() && !self.armed {
            self.armed = true;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// The pending callback was cancelled (tab hidden)
    pub fn suspend(&mut self) {
        self.armed = false;
        self.clock.reset();
        self.release_inputs();
    }

    /// Page visible again; returns whether a frame should be requested
    pub fn resume(&mut self) -> bool {
        self.clock.reset();
        self.arm()
    }

    /// One animation-frame callback: update, then build the frame to draw
    pub fn frame(&mut self, now_ms: f64) -> Frame {
        self.armed = false;
        let dt_ms = self.clock.delta(now_ms);
        self.fps.record(now_ms);

        if self.state.is_running() {
            let input = self.tick_input(dt_ms);
            tick(&mut self.state, &input, dt_ms);
        }
        self.log_events();
        self.render()
    }

    /// Build a frame without advancing the simulation (overlays after a
    /// pause or game-over)
    pub fn render(&self) -> Frame {
        build_frame(&self.state, &self.scene_options())
    }

    pub fn scene_options(&self) -> SceneOptions {
        SceneOptions {
            show_grid: self.settings.quality.grid_enabled(),
            show_indicators: self.settings.show_indicators,
            show_debug: self.settings.show_debug,
            rapid_fire: self.settings.rapid_fire,
            fps: self.fps.fps(),
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    /// Push changed HUD fields to `sink`
    pub fn write_hud(&mut self, sink: &mut dyn HudSink) {
        let snapshot = HudSnapshot::from_state(&self.state);
        snapshot.write_to(sink, self.last_hud.as_ref());
        self.last_hud = Some(snapshot);
    }

    // === Input ===

    /// Handle a key press; returns true when the key was consumed
    pub fn key_down(&mut self, key: &str, ctrl: bool, shift: bool) -> bool {
        let key = key.to_lowercase();
        if ctrl && shift {
            return self.debug_key(&key);
        }
        match key.as_str() {
            "enter" => {
                if self.state.phase == GamePhase::Ready {
                    self.start_game();
                } else if self.state.is_over() {
                    self.reset_game();
                }
                true
            }
            "p" | "escape" => {
                self.toggle_pause();
                true
            }
            "r" if self.state.is_over() => {
                self.reset_game();
                true
            }
            "w" | "a" | "s" | "d" | "arrowup" | "arrowdown" | "arrowleft" | "arrowright" | " " => {
                self.keys.insert(key);
                true
            }
            _ => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.remove(&key.to_lowercase());
    }

    /// Pointer moved, in canvas CSS pixels
    pub fn mouse_move(&mut self, screen: Vec2) {
        self.mouse_screen = Some(screen);
    }

    pub fn mouse_down(&mut self, screen: Vec2) {
        self.mouse_screen = Some(screen);
        if !self.mouse_down {
            self.click_pending = true;
            self.auto_fire_ms = 0.0;
        }
        self.mouse_down = true;
    }

    pub fn mouse_up(&mut self) {
        self.mouse_down = false;
    }

    /// Drop every held input (focus loss, pause)
    pub fn release_inputs(&mut self) {
        self.keys.clear();
        self.mouse_down = false;
        self.click_pending = false;
        self.auto_fire_ms = 0.0;
    }

    fn held(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.keys.contains(*n))
    }

    fn tick_input(&mut self, dt_ms: f32) -> TickInput {
        let move_dir = move_direction(
            self.held(&["w", "arrowup"]),
            self.held(&["s", "arrowdown"]),
            self.held(&["a", "arrowleft"]),
            self.held(&["d", "arrowright"]),
        );

        // Mouse auto-fire runs on its own timer; both paths still go through
        // the player's cooldown gate
        let mut mouse_fire = false;
        if self.click_pending {
            mouse_fire = true;
            self.click_pending = false;
        } else if self.mouse_down {
            self.auto_fire_ms += dt_ms;
            if self.auto_fire_ms >= PLAYER_SHOOT_COOLDOWN_MS {
                self.auto_fire_ms -= PLAYER_SHOOT_COOLDOWN_MS;
                mouse_fire = true;
            }
        }
        let key_fire = self.held(&[" "]);

        TickInput {
            move_dir,
            aim: self.mouse_screen.map(|p| self.state.camera.screen_to_world(p)),
            fire: mouse_fire || key_fire || (self.mouse_down && self.settings.rapid_fire),
            rapid_fire: self.settings.rapid_fire,
        }
    }

    fn debug_key(&mut self, key: &str) -> bool {
        match key {
            "d" => {
                self.settings.show_debug = !self.settings.show_debug;
                log::info!("Debug overlay: {}", self.settings.show_debug);
            }
            "i" => {
                self.settings.show_indicators = !self.settings.show_indicators;
                log::info!("Indicators: {}", self.settings.show_indicators);
            }
            "f" => {
                self.settings.rapid_fire = !self.settings.rapid_fire;
                let text = if self.settings.rapid_fire {
                    "Rapid fire ON"
                } else {
                    "Rapid fire OFF"
                };
                self.state.notifications.push(text, NOTICE_COLOR);
            }
            "r" => {
                let GameState { world, rng, .. } = &mut self.state;
                world.regenerate_rocks(rng);
                let count = world.rocks.len();
                self.state
                    .notifications
                    .push(format!("Regenerated {} rocks", count), NOTICE_COLOR);
            }
            "h" => {
                let GameState { world, rng, .. } = &mut self.state;
                world.regenerate_health_packs(rng);
                let count = world.health_packs.len();
                self.state
                    .notifications
                    .push(format!("Regenerated {} health packs", count), NOTICE_COLOR);
            }
            "n" => {
                if !self.state.is_running() {
                    return true;
                }
                skip_wave(&mut self.state);
                let wave = self.state.wave.number;
                self.state
                    .notifications
                    .push(format!("Skipped to wave {}", wave), NOTICE_COLOR);
            }
            _ => return false,
        }
        true
    }

    fn log_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::WaveCountdown { wave } => log::info!("Wave {} countdown", wave),
                GameEvent::WaveStarted { wave, enemies } => {
                    log::info!("Wave {} started with {} enemies", wave, enemies)
                }
                GameEvent::WaveCleared { wave, reward } => {
                    log::info!("Wave {} cleared, +{}", wave, reward)
                }
                GameEvent::WaveTimedOut { wave, remaining } => {
                    log::info!("Wave {} timed out, {} enemies remain", wave, remaining)
                }
                GameEvent::GameOver { score, wave } => {
                    log::info!("Game over at wave {} with score {}", wave, score)
                }
                other => log::debug!("{:?}", other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::HudField;
    use crate::sim::Bullet;
    use std::collections::HashMap;

    fn session() -> Session {
        Session::new(77, Settings::default())
    }

    /// Drive frames at 60 fps starting from `t`, returning the next timestamp
    fn run_frames(s: &mut Session, mut t: f64, frames: usize) -> f64 {
        for _ in 0..frames {
            s.frame(t);
            t += FRAME_MS as f64;
        }
        t
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut s = session();
        assert!(!s.should_rearm());
        assert!(s.start_game());
        assert!(!s.start_game());
        assert_eq!(s.state.wave.number, 1);
        assert!(s.should_rearm());
    }

    #[test]
    fn test_arm_prevents_duplicate_loops() {
        let mut s = session();
        assert!(!s.arm());
        s.start_game();
        assert!(s.arm());
        assert!(!s.arm());
        s.frame(0.0);
        assert!(!s.is_armed());
        assert!(s.arm());
    }

    #[test]
    fn test_pause_stops_rearm_and_freezes() {
        let mut s = session();
        s.start_game();
        let t = run_frames(&mut s, 0.0, 10);
        assert!(s.toggle_pause());
        assert!(!s.should_rearm());
        assert!(!s.arm());

        let elapsed = s.state.elapsed_ms;
        s.frame(t + 5000.0);
        assert_eq!(s.state.elapsed_ms, elapsed);

        assert!(s.toggle_pause());
        assert!(s.arm());
        // Fresh baseline: the long pause does not leak into the next delta
        s.frame(t + 60_000.0);
        assert!((s.state.elapsed_ms - elapsed - FRAME_MS).abs() < 1e-3);
    }

    #[test]
    fn test_pause_is_noop_when_not_running() {
        let mut s = session();
        assert!(!s.toggle_pause());
        assert_eq!(s.state.phase, GamePhase::Ready);
        s.start_game();
        s.state.phase = GamePhase::GameOver;
        assert!(!s.toggle_pause());
        assert_eq!(s.state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_game_over_stops_scheduling() {
        let mut s = session();
        s.start_game();
        for _ in 0..10 {
            s.state.enemy_bullets.push(Bullet::enemy(s.state.player.pos, 0.0));
        }
        s.frame(0.0);
        assert!(s.state.is_over());
        assert!(!s.should_rearm());
        assert!(!s.arm());
    }

    #[test]
    fn test_suspend_resume_uses_fresh_baseline() {
        let mut s = session();
        s.start_game();
        let t = run_frames(&mut s, 0.0, 5);
        assert!(s.arm());
        s.suspend();
        assert!(!s.is_armed());

        let elapsed = s.state.elapsed_ms;
        assert!(s.resume());
        s.frame(t + 30_000.0);
        assert!((s.state.elapsed_ms - elapsed - FRAME_MS).abs() < 1e-3);
    }

    #[test]
    fn test_fullscreen_resize_keeps_state() {
        let mut s = session();
        s.start_game();
        run_frames(&mut s, 0.0, 20);
        let score = s.state.score;
        let pos = s.state.player.pos;
        let wave = s.state.wave.clone();

        assert!(s.toggle_fullscreen());
        s.resize(1920.0, 1080.0);
        assert_eq!(s.state.camera.viewport, Vec2::new(1920.0, 1080.0));
        assert_eq!(s.state.score, score);
        assert_eq!(s.state.player.pos, pos);
        assert_eq!(s.state.wave.number, wave.number);
        assert!(s.state.is_running());
        assert!(!s.toggle_fullscreen());
    }

    #[test]
    fn test_held_keys_move_player() {
        let mut s = session();
        s.start_game();
        let start = s.state.player.pos;
        assert!(s.key_down("ArrowUp", false, false));
        run_frames(&mut s, 0.0, 20);
        assert!(s.state.player.pos.y < start.y);

        s.key_up("ArrowUp");
        let t = run_frames(&mut s, 1000.0, 60);
        let stopped = s.state.player.pos;
        run_frames(&mut s, t, 5);
        assert_eq!(s.state.player.pos, stopped);
    }

    #[test]
    fn test_mouse_auto_fire_respects_cooldown() {
        let mut s = session();
        s.start_game();
        s.mouse_down(Vec2::new(100.0, 100.0));

        // One second of held mouse at 60 fps
        let mut shots = 0;
        let mut last = None;
        let mut t = 0.0;
        for _ in 0..60 {
            s.frame(t);
            t += FRAME_MS as f64;
            if s.state.player.last_shot_ms != last {
                shots += 1;
                last = s.state.player.last_shot_ms;
            }
        }
        let max_shots = (1000.0 / PLAYER_SHOOT_COOLDOWN_MS) as usize + 1;
        assert!(shots >= 2, "fired {shots}");
        assert!(shots <= max_shots, "fired {shots}");

        s.mouse_up();
        let before = s.state.player.last_shot_ms;
        run_frames(&mut s, t, 30);
        assert_eq!(s.state.player.last_shot_ms, before);
    }

    #[test]
    fn test_debug_bindings() {
        let mut s = session();
        s.start_game();
        assert!(s.key_down("D", true, true));
        assert!(s.settings.show_debug);
        assert!(s.key_down("i", true, true));
        assert!(!s.settings.show_indicators);
        assert!(s.key_down("F", true, true));
        assert!(s.settings.rapid_fire);
        assert!(s.key_down("N", true, true));
        assert_eq!(s.state.wave.number, 2);
        assert!(!s.key_down("Z", true, true));
        // Without modifiers "d" is a movement key, not a toggle
        s.key_down("d", false, false);
        assert!(s.settings.show_debug);
    }

    #[test]
    fn test_regenerate_health_packs_clears_timers() {
        let mut s = session();
        s.start_game();
        s.state.player.health = 50.0;
        s.state.player.pos = s.state.world.health_packs[0].pos;
        crate::sim::collect_health_packs(&mut s.state);
        assert_eq!(s.state.world.respawn_timers.len(), 1);

        s.key_down("h", true, true);
        assert!(s.state.world.respawn_timers.is_empty());
        assert!(s.state.world.health_packs.iter().all(|p| !p.collected));
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut s = session();
        s.start_game();
        s.state.score = 900;
        s.state.phase = GamePhase::GameOver;
        assert!(s.key_down("r", false, false));
        assert!(s.state.is_running());
        assert_eq!(s.state.score, 0);
        assert_eq!(s.state.player.health, MAX_HEALTH);
        assert!(s.arm());
    }

    #[test]
    fn test_hud_written_once_then_diffed() {
        let mut s = session();
        s.start_game();
        let mut sink: HashMap<HudField, String> = HashMap::new();
        s.write_hud(&mut sink);
        assert_eq!(sink.len(), HudField::ALL.len());

        sink.clear();
        s.write_hud(&mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fps_counter() {
        let mut fps = FpsCounter::default();
        let mut t = 1000.0;
        for _ in 0..120 {
            fps.record(t);
            t += 1000.0 / 60.0;
        }
        assert_eq!(fps.fps(), 60);
    }
}
