//! Smoothed follow camera
//!
//! The camera position is the world-space top-left corner of the viewport.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::World;
use crate::consts::CAMERA_LERP;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
    /// Viewport size in pixels
    pub viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl Camera {
    /// Top-left position that centers the viewport on `target`
    fn centered_on(&self, target: Vec2) -> Vec2 {
        target - self.viewport / 2.0
    }

    /// Ease toward `target`, then keep the viewport inside the world
    pub fn follow(&mut self, target: Vec2, world: &World, frame_scale: f32) {
        let desired = self.centered_on(target);
        let t = (CAMERA_LERP * frame_scale).clamp(0.0, 1.0);
        self.pos += (desired - self.pos) * t;
        self.clamp(world);
    }

    /// Jump straight to `target` (used on start/reset)
    pub fn snap_to(&mut self, target: Vec2, world: &World) {
        self.pos = self.centered_on(target);
        self.clamp(world);
    }

    /// Keep the whole viewport within world bounds; a viewport larger than
    /// the world is centered on it instead
    pub fn clamp(&mut self, world: &World) {
        self.pos.x = clamp_axis(self.pos.x, self.viewport.x, world.width);
        self.pos.y = clamp_axis(self.pos.y, self.viewport.y, world.height);
    }

    /// Change the viewport size and re-clamp, keeping the same center
    pub fn resize(&mut self, width: f32, height: f32, world: &World) {
        let center = self.pos + self.viewport / 2.0;
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
        self.pos = self.centered_on(center);
        self.clamp(world);
    }

    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        p - self.pos
    }

    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        p + self.pos
    }

    /// World-space (min, max) corners of the visible region
    pub fn visible_rect(&self) -> (Vec2, Vec2) {
        (self.pos, self.pos + self.viewport)
    }

    /// Whether a circle at `p` overlaps the viewport
    pub fn is_visible(&self, p: Vec2, radius: f32) -> bool {
        let (min, max) = self.visible_rect();
        p.x + radius >= min.x && p.x - radius <= max.x && p.y + radius >= min.y && p.y - radius <= max.y
    }
}

fn clamp_axis(pos: f32, view: f32, world: f32) -> f32 {
    if view >= world {
        (world - view) / 2.0
    } else {
        pos.clamp(0.0, world - view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_world() -> World {
        World {
            width: 2000.0,
            height: 1500.0,
            rocks: Vec::new(),
            health_packs: Vec::new(),
            respawn_timers: Vec::new(),
        }
    }

    #[test]
    fn test_follow_eases_instead_of_snapping() {
        let world = empty_world();
        let mut camera = Camera {
            pos: Vec2::new(0.0, 0.0),
            viewport: Vec2::new(800.0, 600.0),
        };
        // Target wants camera at (600, 400)
        camera.follow(Vec2::new(1000.0, 700.0), &world, 1.0);
        assert!((camera.pos.x - 60.0).abs() < 1e-3);
        assert!((camera.pos.y - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_follow_converges_on_target() {
        let world = empty_world();
        let mut camera = Camera {
            pos: Vec2::ZERO,
            viewport: Vec2::new(800.0, 600.0),
        };
        for _ in 0..500 {
            camera.follow(Vec2::new(1000.0, 700.0), &world, 1.0);
        }
        assert!((camera.pos - Vec2::new(600.0, 400.0)).length() < 0.5);
    }

    #[test]
    fn test_clamps_to_world_edges() {
        let world = empty_world();
        let mut camera = Camera {
            pos: Vec2::ZERO,
            viewport: Vec2::new(800.0, 600.0),
        };
        camera.snap_to(Vec2::new(10.0, 10.0), &world);
        assert_eq!(camera.pos, Vec2::ZERO);
        camera.snap_to(Vec2::new(1990.0, 1490.0), &world);
        assert_eq!(camera.pos, Vec2::new(1200.0, 900.0));
    }

    #[test]
    fn test_oversized_viewport_is_centered() {
        let world = empty_world();
        let mut camera = Camera::default();
        camera.resize(2400.0, 1000.0, &world);
        assert_eq!(camera.pos.x, -200.0);
    }

    #[test]
    fn test_screen_world_round_trip() {
        let camera = Camera {
            pos: Vec2::new(300.0, 200.0),
            viewport: Vec2::new(800.0, 600.0),
        };
        let p = Vec2::new(512.0, 345.0);
        assert_eq!(camera.screen_to_world(camera.world_to_screen(p)), p);
        assert!(camera.is_visible(Vec2::new(310.0, 210.0), 0.0));
        assert!(!camera.is_visible(Vec2::new(1200.0, 210.0), 10.0));
    }
}
