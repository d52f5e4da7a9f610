//! Frame composition
//!
//! Two passes over a read-only `GameState`:
//! 1. World pass inside one `save / translate(-camera) / restore` bracket:
//!    grid, rocks, health packs, enemies, player, bullets, particles.
//! 2. Screen pass: off-viewport indicators, notifications, wave/pause/game
//!    over overlays and the debug readout.

use glam::Vec2;

use super::indicators;
use super::painter::{Label, Painter, TextAlign};
use super::vertex::{Vertex, colors, rgba, shade};
use crate::consts::*;
use crate::sim::{EnemyTank, GamePhase, GameState, ParticleKind, PlayerTank, WavePhase};

const GRID_SPACING: f32 = 100.0;
const HEALTH_BAR_WIDTH: f32 = 40.0;
const HEALTH_BAR_HEIGHT: f32 = 5.0;

/// What the frame should include besides the game itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    pub show_grid: bool,
    pub show_indicators: bool,
    pub show_debug: bool,
    pub rapid_fire: bool,
    pub fps: u32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_indicators: true,
            show_debug: false,
            rapid_fire: false,
            fps: 0,
        }
    }
}

/// Everything needed to present one frame
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Screen-pixel triangles, back to front
    pub vertices: Vec<Vertex>,
    /// Text drawn above the triangles
    pub labels: Vec<Label>,
    pub viewport: Vec2,
}

/// Build the full frame for the current state
pub fn build_frame(state: &GameState, options: &SceneOptions) -> Frame {
    let mut painter = Painter::new();

    painter.save();
    painter.translate(-state.camera.pos);
    draw_world(&mut painter, state, options);
    painter.restore();

    draw_overlay(&mut painter, state, options);

    let (vertices, labels) = painter.finish();
    Frame {
        vertices,
        labels,
        viewport: state.camera.viewport,
    }
}

fn draw_world(p: &mut Painter, state: &GameState, options: &SceneOptions) {
    if options.show_grid {
        draw_grid(p, state);
    }
    draw_world_border(p, state);

    for rock in &state.world.rocks {
        if !state.camera.is_visible(rock.pos, rock.size) {
            continue;
        }
        let base = rgba(rock.color, 1.0);
        // Shadow lobe, body, then a smaller lighter lobe toward the top-left
        p.fill_polygon(rock.pos + Vec2::splat(4.0), &rock.points, 1.05, shade(base, 0.55));
        p.fill_polygon(rock.pos, &rock.points, 1.0, base);
        p.fill_polygon(
            rock.pos - Vec2::splat(rock.size * 0.06),
            &rock.points,
            0.6,
            shade(base, 1.25),
        );
    }

    for pack in &state.world.health_packs {
        if pack.collected || !state.camera.is_visible(pack.pos, pack.size * 2.0) {
            continue;
        }
        let glow = 1.0 + 0.25 * pack.pulse.sin();
        p.fill_circle(pack.pos, pack.size * 1.4 * glow, colors::HEALTH_GLOW);
        let half = pack.size * 0.75;
        p.fill_rect(pack.pos - Vec2::splat(half), Vec2::splat(half * 2.0), colors::HEALTH_PACK);
        let arm = Vec2::new(half * 1.2, half * 0.35);
        p.fill_rect(pack.pos - arm / 2.0, arm, colors::HEALTH_CROSS);
        let arm_v = Vec2::new(arm.y, arm.x);
        p.fill_rect(pack.pos - arm_v / 2.0, arm_v, colors::HEALTH_CROSS);
    }

    for enemy in &state.enemies {
        if state.camera.is_visible(enemy.pos, enemy.radius() * 2.0) {
            draw_enemy(p, enemy);
        }
    }

    if !state.is_over() {
        draw_player(p, &state.player);
    }

    for bullet in &state.player_bullets {
        p.fill_circle(bullet.pos, bullet.radius(), colors::PLAYER_BULLET);
    }
    for bullet in &state.enemy_bullets {
        p.fill_circle(bullet.pos, bullet.radius(), colors::ENEMY_BULLET);
    }

    for particle in &state.particles {
        if !state.camera.is_visible(particle.pos, 20.0) {
            continue;
        }
        let color = rgba(particle.color, particle.alpha());
        match &particle.kind {
            ParticleKind::Burst { size, .. } => p.fill_circle(particle.pos, *size, color),
            ParticleKind::Text { text } => {
                p.text(text.clone(), particle.pos, 16.0, color, TextAlign::Center)
            }
        }
    }
}

/// Grid lines covering only the visible part of the world
fn draw_grid(p: &mut Painter, state: &GameState) {
    let (min, max) = state.camera.visible_rect();
    let min = min.max(Vec2::ZERO);
    let max = max.min(Vec2::new(state.world.width, state.world.height));

    let mut x = (min.x / GRID_SPACING).ceil() * GRID_SPACING;
    while x <= max.x {
        p.line(Vec2::new(x, min.y), Vec2::new(x, max.y), 1.0, colors::GRID);
        x += GRID_SPACING;
    }
    let mut y = (min.y / GRID_SPACING).ceil() * GRID_SPACING;
    while y <= max.y {
        p.line(Vec2::new(min.x, y), Vec2::new(max.x, y), 1.0, colors::GRID);
        y += GRID_SPACING;
    }
}

fn draw_world_border(p: &mut Painter, state: &GameState) {
    let w = state.world.width;
    let h = state.world.height;
    let corners = [
        Vec2::ZERO,
        Vec2::new(w, 0.0),
        Vec2::new(w, h),
        Vec2::new(0.0, h),
    ];
    for i in 0..4 {
        p.line(corners[i], corners[(i + 1) % 4], 4.0, colors::WORLD_BORDER);
    }
}

fn draw_tank(
    p: &mut Painter,
    pos: Vec2,
    rotation: f32,
    turret_rotation: f32,
    hull: [f32; 4],
    turret: [f32; 4],
) {
    let r = TANK_RADIUS;
    for side in [-1.0, 1.0] {
        p.fill_rotated_rect(
            pos,
            Vec2::new(r * 1.05, r * 0.22),
            Vec2::new(0.0, side * r * 0.78),
            rotation,
            colors::TRACKS,
        );
    }
    p.fill_rotated_rect(pos, Vec2::new(r * 0.95, r * 0.62), Vec2::ZERO, rotation, hull);
    p.fill_rotated_rect(
        pos,
        Vec2::new(r * 0.6, r * 0.14),
        Vec2::new(r * 0.75, 0.0),
        turret_rotation,
        colors::BARREL,
    );
    p.fill_circle(pos, r * 0.45, turret);
}

fn draw_health_bar(p: &mut Painter, pos: Vec2, health: f32) {
    let frac = (health / MAX_HEALTH).clamp(0.0, 1.0);
    let top_left = pos - Vec2::new(HEALTH_BAR_WIDTH / 2.0, TANK_RADIUS + 14.0);
    p.fill_rect(
        top_left,
        Vec2::new(HEALTH_BAR_WIDTH, HEALTH_BAR_HEIGHT),
        colors::BAR_BACK,
    );
    let color = if frac > 0.6 {
        colors::BAR_GOOD
    } else if frac > 0.3 {
        colors::BAR_WARN
    } else {
        colors::BAR_LOW
    };
    p.fill_rect(
        top_left,
        Vec2::new(HEALTH_BAR_WIDTH * frac, HEALTH_BAR_HEIGHT),
        color,
    );
}

fn draw_enemy(p: &mut Painter, enemy: &EnemyTank) {
    draw_tank(
        p,
        enemy.pos,
        enemy.rotation,
        enemy.turret_rotation,
        colors::ENEMY_HULL,
        colors::ENEMY_TURRET,
    );
    if enemy.health < MAX_HEALTH {
        draw_health_bar(p, enemy.pos, enemy.health);
    }
}

fn draw_player(p: &mut Painter, player: &PlayerTank) {
    draw_tank(
        p,
        player.pos,
        player.rotation,
        player.turret_rotation,
        colors::PLAYER_HULL,
        colors::PLAYER_TURRET,
    );
    draw_health_bar(p, player.pos, player.health);
}

fn draw_overlay(p: &mut Painter, state: &GameState, options: &SceneOptions) {
    let view = state.camera.viewport;
    let center = view / 2.0;

    if options.show_indicators && !state.is_over() {
        for ind in indicators::collect(state) {
            let color = ind.tier.color();
            let scale = ind.tier.scale();
            p.fill_circle(ind.pos, 7.0 * scale, shade(color, 0.6));
            p.arrow(
                ind.pos + Vec2::from_angle(ind.angle) * 12.0 * scale,
                ind.angle,
                14.0 * scale,
                12.0 * scale,
                color,
            );
        }
    }

    for note in state.notifications.iter() {
        p.text(
            note.text.clone(),
            Vec2::new(center.x, 70.0 + note.offset),
            20.0,
            rgba(note.color, note.alpha()),
            TextAlign::Center,
        );
    }

    match state.wave.phase {
        WavePhase::Starting { .. } if !state.is_over() => {
            if let Some(secs) = state.wave.countdown_secs() {
                p.text(
                    format!("Wave {}", state.wave.number),
                    Vec2::new(center.x, center.y - 60.0),
                    48.0,
                    colors::TEXT,
                    TextAlign::Center,
                );
                p.text(
                    format!("{} enemies in {}", state.wave.target_count, secs),
                    Vec2::new(center.x, center.y - 20.0),
                    22.0,
                    colors::TEXT_DIM,
                    TextAlign::Center,
                );
            }
        }
        WavePhase::Active => {
            let secs = (state.wave.time_left_ms / 1000.0).ceil().max(0.0) as u32;
            let color = if secs <= 10 {
                colors::TEXT_ALERT
            } else {
                colors::TEXT_DIM
            };
            p.text(
                format!("Wave {} - {}s", state.wave.number, secs),
                Vec2::new(center.x, 32.0),
                18.0,
                color,
                TextAlign::Center,
            );
        }
        _ => {}
    }

    match state.phase {
        GamePhase::Ready => {
            p.fill_rect(Vec2::ZERO, view, colors::OVERLAY_DIM);
            p.text("TANK ARENA", center - Vec2::Y * 40.0, 56.0, colors::TEXT, TextAlign::Center);
            p.text(
                "WASD / arrows to drive, mouse to aim, click or Space to fire",
                center + Vec2::Y * 10.0,
                18.0,
                colors::TEXT_DIM,
                TextAlign::Center,
            );
            p.text("Press Enter to start", center + Vec2::Y * 45.0, 22.0, colors::TEXT, TextAlign::Center);
        }
        GamePhase::Paused => {
            p.fill_rect(Vec2::ZERO, view, colors::OVERLAY_DIM);
            p.text("PAUSED", center - Vec2::Y * 20.0, 56.0, colors::TEXT, TextAlign::Center);
            p.text("Press P to resume", center + Vec2::Y * 25.0, 20.0, colors::TEXT_DIM, TextAlign::Center);
        }
        GamePhase::GameOver => {
            p.fill_rect(Vec2::ZERO, view, colors::OVERLAY_DIM);
            let panel = Vec2::new(420.0, 220.0);
            p.fill_rect(center - panel / 2.0, panel, colors::PANEL);
            p.text("GAME OVER", center - Vec2::Y * 60.0, 48.0, colors::TEXT_ALERT, TextAlign::Center);
            p.text(
                format!("Score {}   Wave {}   Kills {}", state.score, state.wave.number, state.kills),
                center,
                20.0,
                colors::TEXT,
                TextAlign::Center,
            );
            p.text(
                format!("Survived {}", crate::hud::format_survival_time(state.elapsed_ms)),
                center + Vec2::Y * 30.0,
                18.0,
                colors::TEXT_DIM,
                TextAlign::Center,
            );
            p.text("Press R to restart", center + Vec2::Y * 70.0, 20.0, colors::TEXT, TextAlign::Center);
        }
        GamePhase::Running => {}
    }

    if options.show_debug {
        draw_debug(p, state, options);
    }
}

fn draw_debug(p: &mut Painter, state: &GameState, options: &SceneOptions) {
    let lines = [
        format!("FPS {}", options.fps),
        format!("seed {}", state.seed),
        format!("player {:.0},{:.0} v{:.2}", state.player.pos.x, state.player.pos.y, state.player.speed),
        format!("enemies {} bullets {}/{}", state.enemies.len(), state.player_bullets.len(), state.enemy_bullets.len()),
        format!("particles {}/{}", state.particles.len(), state.max_particles),
        format!("wave {} {:?}", state.wave.number, state.wave.phase),
        format!("rocks {} packs {} timers {}", state.world.rocks.len(), state.world.health_packs.len(), state.world.respawn_timers.len()),
        format!("rapid fire {}", if options.rapid_fire { "on" } else { "off" }),
    ];
    let size = Vec2::new(300.0, 16.0 * lines.len() as f32 + 12.0);
    let top_left = Vec2::new(8.0, state.camera.viewport.y - size.y - 8.0);
    p.fill_rect(top_left, size, colors::PANEL);
    for (i, line) in lines.into_iter().enumerate() {
        p.text(
            line,
            top_left + Vec2::new(8.0, 18.0 + 16.0 * i as f32),
            13.0,
            colors::DEBUG_TEXT,
            TextAlign::Left,
        );
    }
}
