//! World bounds and procedural obstacle/pickup placement
//!
//! Rocks and health packs are placed by bounded rejection sampling. When the
//! attempt budget runs out the generator keeps whatever it managed to place.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::heading;

/// An irregular rock obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rock {
    pub pos: Vec2,
    pub size: f32,
    /// Local-space silhouette, ordered by angle around the center
    pub points: Vec<Vec2>,
    pub color: [u8; 3],
    pub collision_radius: f32,
}

impl Rock {
    pub fn new<R: Rng>(pos: Vec2, size: f32, rng: &mut R) -> Self {
        let num_points = rng.random_range(ROCK_MIN_POINTS..=ROCK_MAX_POINTS);
        Self {
            pos,
            size,
            points: rock_silhouette(rng, size, num_points, ROCK_IRREGULARITY),
            color: jitter_color(ROCK_BASE_COLOR, ROCK_COLOR_JITTER, rng),
            collision_radius: size * ROCK_COLLISION_FACTOR,
        }
    }
}

/// A health pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPack {
    pub pos: Vec2,
    pub size: f32,
    pub collected: bool,
    /// Glow animation phase (radians)
    pub pulse: f32,
}

impl HealthPack {
    pub fn new(pos: Vec2, pulse: f32) -> Self {
        Self {
            pos,
            size: HEALTH_PACK_SIZE,
            collected: false,
            pulse,
        }
    }
}

/// Pending respawn of a collected pack (index into `World::health_packs`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespawnTimer {
    pub pack: usize,
    pub remaining_ms: f32,
}

/// Fixed-size play field and its static contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub rocks: Vec<Rock>,
    pub health_packs: Vec<HealthPack>,
    pub respawn_timers: Vec<RespawnTimer>,
}

impl World {
    /// Create a world and populate rocks and health packs
    pub fn generate<R: Rng>(width: f32, height: f32, rng: &mut R) -> Self {
        let mut world = Self {
            width,
            height,
            rocks: Vec::new(),
            health_packs: Vec::new(),
            respawn_timers: Vec::new(),
        };
        world.regenerate_rocks(rng);
        world.regenerate_health_packs(rng);
        world
    }

    /// Where the player spawns
    pub fn player_start(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether `pos` lies inside the bounds shrunk by `margin`
    /// (a negative margin grows them)
    pub fn contains(&self, pos: Vec2, margin: f32) -> bool {
        pos.x >= margin
            && pos.x <= self.width - margin
            && pos.y >= margin
            && pos.y <= self.height - margin
    }

    /// Nearest point inside the bounds shrunk by `margin`
    pub fn clamp_inside(&self, pos: Vec2, margin: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(margin, (self.width - margin).max(margin)),
            pos.y.clamp(margin, (self.height - margin).max(margin)),
        )
    }

    /// Uniform random point at least `margin` away from every edge
    pub fn random_point<R: Rng>(&self, margin: f32, rng: &mut R) -> Vec2 {
        let margin = margin.min(self.width / 2.0 - 1.0).min(self.height / 2.0 - 1.0);
        Vec2::new(
            rng.random_range(margin..self.width - margin),
            rng.random_range(margin..self.height - margin),
        )
    }

    pub fn regenerate_rocks<R: Rng>(&mut self, rng: &mut R) {
        self.rocks = generate_rocks(self, ROCK_COUNT, rng);
    }

    /// Replace every pack; pending respawns refer to old packs and are dropped
    pub fn regenerate_health_packs<R: Rng>(&mut self, rng: &mut R) {
        self.respawn_timers.clear();
        self.health_packs = generate_health_packs(self, HEALTH_PACK_COUNT, rng);
    }
}

/// Place up to `target` rocks away from the player start and each other
pub fn generate_rocks<R: Rng>(world: &World, target: usize, rng: &mut R) -> Vec<Rock> {
    let start = world.player_start();
    let max_attempts = target * GENERATION_ATTEMPT_FACTOR;
    let mut rocks: Vec<Rock> = Vec::with_capacity(target);
    let mut attempts = 0;

    while rocks.len() < target && attempts < max_attempts {
        attempts += 1;
        let size = rng.random_range(ROCK_MIN_SIZE..ROCK_MAX_SIZE);
        let pos = world.random_point(size, rng);

        if pos.distance(start) < ROCK_MIN_PLAYER_DISTANCE {
            continue;
        }
        let crowded = rocks
            .iter()
            .any(|r| r.pos.distance(pos) < (r.size + size) * 0.5 + ROCK_PADDING);
        if crowded {
            continue;
        }
        rocks.push(Rock::new(pos, size, rng));
    }

    if rocks.len() < target {
        log::debug!(
            "Rock placement exhausted after {} attempts: {}/{} placed",
            attempts,
            rocks.len(),
            target
        );
    }
    rocks
}

/// Place up to `target` packs away from the player start, each other and rocks
pub fn generate_health_packs<R: Rng>(
    world: &World,
    target: usize,
    rng: &mut R,
) -> Vec<HealthPack> {
    let start = world.player_start();
    let max_attempts = target * GENERATION_ATTEMPT_FACTOR;
    let mut packs: Vec<HealthPack> = Vec::with_capacity(target);
    let mut attempts = 0;

    while packs.len() < target && attempts < max_attempts {
        attempts += 1;
        let pos = world.random_point(HEALTH_PACK_SIZE * 2.0, rng);

        if pos.distance(start) < HEALTH_PACK_MIN_PLAYER_DISTANCE {
            continue;
        }
        if packs
            .iter()
            .any(|p| p.pos.distance(pos) < HEALTH_PACK_MIN_SPACING)
        {
            continue;
        }
        let blocked = world.rocks.iter().any(|r| {
            r.pos.distance(pos) < r.collision_radius + HEALTH_PACK_SIZE + HEALTH_PACK_ROCK_CLEARANCE
        });
        if blocked {
            continue;
        }
        let pulse = rng.random_range(0.0..std::f32::consts::TAU);
        packs.push(HealthPack::new(pos, pulse));
    }

    if packs.len() < target {
        log::debug!(
            "Health pack placement exhausted after {} attempts: {}/{} placed",
            attempts,
            packs.len(),
            target
        );
    }
    packs
}

/// Sample `num_points` angularly ordered points around the origin with the
/// radius perturbed by up to `irregularity` of the nominal radius
pub fn rock_silhouette<R: Rng>(
    rng: &mut R,
    size: f32,
    num_points: usize,
    irregularity: f32,
) -> Vec<Vec2> {
    let num_points = num_points.max(3);
    let step = std::f32::consts::TAU / num_points as f32;
    let base_radius = size / 2.0;

    (0..num_points)
        .map(|i| {
            // Jitter stays inside the slot so the winding order holds
            let angle = (i as f32 + 0.5 + rng.random_range(-0.3..0.3)) * step;
            let radius =
                base_radius * (1.0 + rng.random_range(-irregularity..irregularity));
            heading(angle) * radius
        })
        .collect()
}

/// Base colour with independent per-channel jitter, clamped to [0, 255]
pub fn jitter_color<R: Rng>(base: [u8; 3], jitter: i32, rng: &mut R) -> [u8; 3] {
    base.map(|c| (c as i32 + rng.random_range(-jitter..=jitter)).clamp(0, 255) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn assert_spacing(world: &World) {
        let start = world.player_start();
        for (i, rock) in world.rocks.iter().enumerate() {
            assert!(rock.pos.distance(start) >= ROCK_MIN_PLAYER_DISTANCE);
            for other in &world.rocks[i + 1..] {
                assert!(
                    rock.pos.distance(other.pos) >= (rock.size + other.size) * 0.5 + ROCK_PADDING
                );
            }
        }
        for (i, pack) in world.health_packs.iter().enumerate() {
            assert!(pack.pos.distance(start) >= HEALTH_PACK_MIN_PLAYER_DISTANCE);
            for other in &world.health_packs[i + 1..] {
                assert!(pack.pos.distance(other.pos) >= HEALTH_PACK_MIN_SPACING);
            }
            for rock in &world.rocks {
                assert!(
                    pack.pos.distance(rock.pos)
                        >= rock.collision_radius + HEALTH_PACK_SIZE + HEALTH_PACK_ROCK_CLEARANCE
                );
            }
        }
    }

    #[test]
    fn test_generated_world_respects_spacing() {
        let mut rng = Pcg32::seed_from_u64(42);
        let world = World::generate(WORLD_WIDTH, WORLD_HEIGHT, &mut rng);
        assert!(!world.rocks.is_empty());
        assert!(world.rocks.len() <= ROCK_COUNT);
        assert!(world.health_packs.len() <= HEALTH_PACK_COUNT);
        assert_spacing(&world);
    }

    #[test]
    fn test_cramped_world_underprovisions_without_failing() {
        let mut rng = Pcg32::seed_from_u64(1);
        // Barely larger than the player keep-out zone: few rocks fit
        let world = World::generate(700.0, 700.0, &mut rng);
        assert!(world.rocks.len() < ROCK_COUNT);
        assert_spacing(&world);
    }

    #[test]
    fn test_rock_collision_radius_derived_from_size() {
        let mut rng = Pcg32::seed_from_u64(5);
        let rock = Rock::new(Vec2::new(10.0, 10.0), 80.0, &mut rng);
        assert!((rock.collision_radius - 48.0).abs() < 1e-4);
        assert!(rock.points.len() >= ROCK_MIN_POINTS && rock.points.len() <= ROCK_MAX_POINTS);
    }

    #[test]
    fn test_silhouette_is_angularly_ordered_and_irregular() {
        let mut rng = Pcg32::seed_from_u64(9);
        let points = rock_silhouette(&mut rng, 100.0, 10, 0.35);
        let mut last = -1.0;
        for p in &points {
            let mut a = p.y.atan2(p.x);
            if a < 0.0 {
                a += std::f32::consts::TAU;
            }
            assert!(a > last, "points must wind in order");
            last = a;
            let r = p.length();
            assert!(r >= 50.0 * 0.65 - 1e-3 && r <= 50.0 * 1.35 + 1e-3);
        }
        let radii: Vec<f32> = points.iter().map(|p| p.length()).collect();
        assert!(radii.iter().any(|r| (r - radii[0]).abs() > 1e-3));
    }

    #[test]
    fn test_jitter_color_clamps() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..100 {
            let c = jitter_color([250, 3, 128], 20, &mut rng);
            assert!(c[0] >= 230);
            assert!(c[1] <= 23);
            assert!((108..=148).contains(&c[2]));
        }
    }

    #[test]
    fn test_regenerating_packs_drops_pending_timers() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut world = World::generate(WORLD_WIDTH, WORLD_HEIGHT, &mut rng);
        world.health_packs[0].collected = true;
        world.respawn_timers.push(RespawnTimer {
            pack: 0,
            remaining_ms: 100.0,
        });
        world.regenerate_health_packs(&mut rng);
        assert!(world.respawn_timers.is_empty());
        assert!(world.health_packs.iter().all(|p| !p.collected));
    }

    proptest! {
        #[test]
        fn prop_generation_spacing_holds_for_any_seed(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let world = World::generate(WORLD_WIDTH, WORLD_HEIGHT, &mut rng);
            assert_spacing(&world);
        }
    }
}
