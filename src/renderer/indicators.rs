//! Off-viewport enemy indicators
//!
//! The ray from the screen center toward the enemy is clipped against the
//! viewport rectangle (inset by a margin). The edge is picked by whichever
//! axis deviates more relative to its half-extent; ties go to the left/right
//! edges.

use glam::Vec2;

use super::vertex::colors;
use crate::sim::GameState;

/// Inset from the screen border for indicator placement
pub const INDICATOR_MARGIN: f32 = 24.0;
/// Enemies closer than this to the player are `Near`
pub const NEAR_THRESHOLD: f32 = 600.0;
/// Enemies closer than this (and not near) are `Medium`
pub const MEDIUM_THRESHOLD: f32 = 1200.0;

/// Distance band of an off-screen enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatTier {
    Near,
    Medium,
    Far,
}

impl ThreatTier {
    pub fn from_distance(distance: f32) -> Self {
        if distance < NEAR_THRESHOLD {
            ThreatTier::Near
        } else if distance < MEDIUM_THRESHOLD {
            ThreatTier::Medium
        } else {
            ThreatTier::Far
        }
    }

    pub fn color(self) -> [f32; 4] {
        match self {
            ThreatTier::Near => colors::THREAT_NEAR,
            ThreatTier::Medium => colors::THREAT_MEDIUM,
            ThreatTier::Far => colors::THREAT_FAR,
        }
    }

    /// Closer threats get bigger markers
    pub fn scale(self) -> f32 {
        match self {
            ThreatTier::Near => 1.3,
            ThreatTier::Medium => 1.0,
            ThreatTier::Far => 0.8,
        }
    }
}

/// A marker on the screen edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicator {
    /// Screen position on the inset edge
    pub pos: Vec2,
    /// Direction from screen center toward the enemy (radians)
    pub angle: f32,
    pub tier: ThreatTier,
}

/// Where the center→`target` ray meets the inset viewport border, or `None`
/// when `target` is on screen
pub fn edge_point(viewport: Vec2, target: Vec2, margin: f32) -> Option<(Vec2, f32)> {
    let on_screen =
        target.x >= 0.0 && target.x <= viewport.x && target.y >= 0.0 && target.y <= viewport.y;
    if on_screen {
        return None;
    }

    let center = viewport / 2.0;
    let d = target - center;
    let half = (center - Vec2::splat(margin)).max(Vec2::ONE);
    let dev_x = d.x.abs() / half.x;
    let dev_y = d.y.abs() / half.y;

    let t = if dev_x >= dev_y {
        half.x / d.x.abs()
    } else {
        half.y / d.y.abs()
    };
    Some((center + d * t, d.y.atan2(d.x)))
}

/// Indicators for every enemy outside the camera view
pub fn collect(state: &GameState) -> Vec<Indicator> {
    let viewport = state.camera.viewport;
    state
        .enemies
        .iter()
        .filter_map(|enemy| {
            let screen = state.camera.world_to_screen(enemy.pos);
            let (pos, angle) = edge_point(viewport, screen, INDICATOR_MARGIN)?;
            let tier = ThreatTier::from_distance(enemy.pos.distance(state.player.pos));
            Some(Indicator { pos, angle, tier })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VIEW: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_on_screen_has_no_indicator() {
        assert_eq!(edge_point(VIEW, Vec2::new(400.0, 300.0), 20.0), None);
        assert_eq!(edge_point(VIEW, Vec2::new(0.0, 600.0), 20.0), None);
    }

    #[test]
    fn test_right_edge() {
        let (pos, angle) = edge_point(VIEW, Vec2::new(1600.0, 300.0), 20.0).unwrap_or_default();
        assert!((pos.x - 780.0).abs() < 1e-3);
        assert!((pos.y - 300.0).abs() < 1e-3);
        assert!(angle.abs() < 1e-6);
    }

    #[test]
    fn test_top_edge() {
        let (pos, _) = edge_point(VIEW, Vec2::new(450.0, -900.0), 20.0).unwrap_or_default();
        assert!((pos.y - 20.0).abs() < 1e-3);
        assert!(pos.x > 400.0 && pos.x < 780.0);
    }

    #[test]
    fn test_tie_prefers_horizontal_edge() {
        // Equal normalized deviation on both axes: exactly the corner direction
        let half = Vec2::new(380.0, 280.0);
        let target = Vec2::new(400.0, 300.0) + half * 3.0;
        let (pos, _) = edge_point(VIEW, target, 20.0).unwrap_or_default();
        assert!((pos.x - 780.0).abs() < 1e-3);
    }

    #[test]
    fn test_threat_tiers() {
        assert_eq!(ThreatTier::from_distance(100.0), ThreatTier::Near);
        assert_eq!(ThreatTier::from_distance(599.9), ThreatTier::Near);
        assert_eq!(ThreatTier::from_distance(600.0), ThreatTier::Medium);
        assert_eq!(ThreatTier::from_distance(1199.0), ThreatTier::Medium);
        assert_eq!(ThreatTier::from_distance(1200.0), ThreatTier::Far);
        assert_ne!(ThreatTier::Near.color(), ThreatTier::Far.color());
    }

    #[test]
    fn test_collect_skips_visible_enemies() {
        use crate::sim::EnemyTank;
        use rand::SeedableRng;
        use rand_pcg::Pcg32;

        let mut state = GameState::new(11);
        let mut rng = Pcg32::seed_from_u64(1);
        let visible = state.camera.pos + state.camera.viewport / 2.0;
        let hidden = state.camera.pos + Vec2::new(-500.0, 10.0);
        state.enemies.push(EnemyTank::new(1, visible, 1, 0.0, &mut rng));
        state.enemies.push(EnemyTank::new(2, hidden, 1, 0.0, &mut rng));

        let found = collect(&state);
        assert_eq!(found.len(), 1);
        assert!((found[0].pos.x - INDICATOR_MARGIN).abs() < 1e-2);
    }

    proptest! {
        #[test]
        fn prop_indicator_lies_on_inset_border(x in -5000.0f32..5000.0, y in -5000.0f32..5000.0) {
            let target = Vec2::new(x, y);
            if let Some((pos, _)) = edge_point(VIEW, target, 20.0) {
                let on_vertical = (pos.x - 20.0).abs() < 1e-2 || (pos.x - 780.0).abs() < 1e-2;
                let on_horizontal = (pos.y - 20.0).abs() < 1e-2 || (pos.y - 580.0).abs() < 1e-2;
                prop_assert!(on_vertical || on_horizontal);
                prop_assert!(pos.x >= 20.0 - 1e-2 && pos.x <= 780.0 + 1e-2);
                prop_assert!(pos.y >= 20.0 - 1e-2 && pos.y <= 580.0 + 1e-2);
            }
        }
    }
}
