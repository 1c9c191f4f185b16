use crossterm::style::Color;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::obstacles::Obstacle;
use crate::orders::Route;

pub const ROAD_WIDTH: f32 = WORLD_WIDTH * 0.6;
pub const ROAD_LEFT: f32 = (WORLD_WIDTH - ROAD_WIDTH) / 2.0;
const LANE_RATIOS: [f32; 3] = [0.165, 0.5, 0.835];
pub const LINE_LENGTH: f32 = 70.0;
const LINE_GAP: f32 = 50.0;
const OBSTACLE_SPAWN_RATE: f32 = 1.2;
const CAR_SPAWN_CHANCE: f64 = 0.7;
/// Minimum distance between the trailing edges of two obstacles.
const MIN_SPAWN_GAP: f32 = 200.0;

const DECORATION_SPAWN_CHANCE: f64 = 0.15;
const DECORATION_MIN_Y: f32 = -200.0;
const DECORATION_INITIAL_STEP: f32 = 40.0;
const DECORATION_SIDE_MARGIN: f32 = WORLD_WIDTH * 0.02;
const STONE_SIZE_RANGE: (u32, u32) = (10, 25);
const STONE_ASPECT_RANGE: (f32, f32) = (0.7, 1.3);
const STONE_COLORS: [Color; 3] = [
    Color::Rgb { r: 70, g: 70, b: 70 },
    Color::Rgb { r: 90, g: 90, b: 90 },
    Color::Rgb { r: 110, g: 110, b: 110 },
];

pub fn lane_centers() -> [f32; 3] {
    LANE_RATIOS.map(|ratio| ROAD_LEFT + ROAD_WIDTH * ratio)
}

/// A stone on the grass verge; scrolls with the road and never collides.
#[derive(Debug, Clone, PartialEq)]
pub struct Stone {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct Road {
    lanes: [f32; 3],
    obstacles: Vec<Obstacle>,
    stones: Vec<Stone>,
    line_offsets: Vec<f32>,
    distance_traveled: f64,
    route: Option<Route>,
    spawn_timer: f32,
}

impl Road {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut road = Self {
            lanes: lane_centers(),
            obstacles: Vec::new(),
            stones: Vec::new(),
            line_offsets: initial_line_offsets(),
            distance_traveled: 0.0,
            route: None,
            spawn_timer: 0.0,
        };
        road.spawn_initial_stones(rng);
        road
    }

    pub fn reset(&mut self, route: Option<Route>, rng: &mut impl Rng) {
        self.obstacles.clear();
        self.stones.clear();
        self.distance_traveled = 0.0;
        self.spawn_timer = 1.0 / OBSTACLE_SPAWN_RATE;
        self.route = route;
        self.line_offsets = initial_line_offsets();
        self.spawn_initial_stones(rng);
    }

    pub fn update(&mut self, dt: f32, speed: f32, rng: &mut impl Rng) {
        self.distance_traveled += f64::from(speed * dt);
        self.scroll_lines(dt, speed);

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn_timer = 1.0 / OBSTACLE_SPAWN_RATE;
            self.spawn_obstacle(rng);
        }
        if rng.gen_bool(DECORATION_SPAWN_CHANCE) {
            let y = rng.gen_range(DECORATION_MIN_Y..0.0);
            self.spawn_stone(rng, y);
        }

        for obstacle in &mut self.obstacles {
            obstacle.advance(dt, speed);
        }
        self.obstacles.retain(|o| !o.is_offscreen());

        let max_stone_height = STONE_SIZE_RANGE.1 as f32 * STONE_ASPECT_RANGE.1;
        for stone in &mut self.stones {
            stone.y += speed * dt;
        }
        self.stones.retain(|s| s.y <= WORLD_HEIGHT + max_stone_height);
    }

    fn scroll_lines(&mut self, dt: f32, speed: f32) {
        for y in &mut self.line_offsets {
            *y += speed * dt;
            if *y > WORLD_HEIGHT {
                *y -= WORLD_HEIGHT + LINE_LENGTH + LINE_GAP;
            }
        }
    }

    /// Places a new obstacle at the top of a random lane unless another one
    /// is still within the minimum gap. Returns whether one was added.
    pub fn spawn_obstacle(&mut self, rng: &mut impl Rng) -> bool {
        let lane_x = *self.lanes.choose(rng).unwrap_or(&self.lanes[1]);
        let obstacle = match self.route {
            Some(Route::Long) => Obstacle::manhole(rng, lane_x),
            _ if rng.gen_bool(CAR_SPAWN_CHANCE) => Obstacle::car(rng, lane_x),
            _ => Obstacle::manhole(rng, lane_x),
        };

        let bottom = obstacle.bottom();
        if self
            .obstacles
            .iter()
            .any(|o| (o.bottom() - bottom).abs() < MIN_SPAWN_GAP)
        {
            return false;
        }
        debug!(kind = ?obstacle.kind, lane_x, "obstacle spawned");
        self.obstacles.push(obstacle);
        true
    }

    fn spawn_initial_stones(&mut self, rng: &mut impl Rng) {
        let mut y = WORLD_HEIGHT + 200.0;
        while y > DECORATION_MIN_Y - 200.0 {
            for _ in 0..rng.gen_range(5..=10) {
                let jitter = rng.gen_range(-DECORATION_INITIAL_STEP / 2.0..DECORATION_INITIAL_STEP / 2.0);
                self.spawn_stone(rng, y + jitter);
            }
            y -= DECORATION_INITIAL_STEP;
        }
    }

    fn spawn_stone(&mut self, rng: &mut impl Rng, y: f32) {
        let (x_min, x_max) = if rng.gen_bool(0.5) {
            (DECORATION_SIDE_MARGIN, ROAD_LEFT - DECORATION_SIDE_MARGIN)
        } else {
            (
                ROAD_LEFT + ROAD_WIDTH + DECORATION_SIDE_MARGIN,
                WORLD_WIDTH - DECORATION_SIDE_MARGIN,
            )
        };
        let base = rng.gen_range(STONE_SIZE_RANGE.0..=STONE_SIZE_RANGE.1) as f32;
        let aspect = rng.gen_range(STONE_ASPECT_RANGE.0..STONE_ASPECT_RANGE.1);
        let (width, height) = if rng.gen_bool(0.5) {
            (base, (base * aspect).floor())
        } else {
            ((base * aspect).floor(), base)
        };
        self.stones.push(Stone {
            x: rng.gen_range(x_min..x_max),
            y,
            width,
            height,
            color: *STONE_COLORS.choose(rng).unwrap_or(&STONE_COLORS[0]),
        });
    }

    pub fn remove_obstacle(&mut self, index: usize) -> Obstacle {
        self.obstacles.remove(index)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn stones(&self) -> &[Stone] {
        &self.stones
    }

    pub fn line_offsets(&self) -> &[f32] {
        &self.line_offsets
    }

    pub fn lanes(&self) -> [f32; 3] {
        self.lanes
    }

    pub fn distance_traveled(&self) -> f64 {
        self.distance_traveled
    }

    pub fn route(&self) -> Option<Route> {
        self.route
    }

    #[cfg(test)]
    pub(crate) fn set_distance_traveled(&mut self, distance: f64) {
        self.distance_traveled = distance;
    }

    #[cfg(test)]
    pub(crate) fn push_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }
}

fn initial_line_offsets() -> Vec<f32> {
    let step = LINE_LENGTH + LINE_GAP;
    let mut offsets = Vec::new();
    let mut y = -WORLD_HEIGHT;
    while y < WORLD_HEIGHT {
        offsets.push(y);
        y += step;
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::ObstacleKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn lanes_sit_inside_the_road() {
        let lanes = lane_centers();
        assert!(lanes.windows(2).all(|w| w[0] < w[1]));
        assert!(lanes[0] > ROAD_LEFT && lanes[2] < ROAD_LEFT + ROAD_WIDTH);
        assert!((lanes[1] - WORLD_WIDTH / 2.0).abs() < 1e-3);
    }

    #[test]
    fn spawns_respect_the_minimum_gap() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut road = Road::new(&mut rng);
        road.reset(Some(Route::Short), &mut rng);
        assert!(road.spawn_obstacle(&mut rng));
        assert!(!road.spawn_obstacle(&mut rng));
        assert_eq!(road.obstacles().len(), 1);
    }

    #[test]
    fn long_route_only_spawns_manholes() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut road = Road::new(&mut rng);
        road.reset(Some(Route::Long), &mut rng);
        for _ in 0..600 {
            road.update(1.0 / 60.0, 400.0, &mut rng);
        }
        assert!(!road.obstacles().is_empty());
        assert!(road
            .obstacles()
            .iter()
            .all(|o| matches!(o.kind, ObstacleKind::Manhole { .. })));
    }

    fn car_share(route: Option<Route>, seed: u64) -> f64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut road = Road::new(&mut rng);
        road.reset(route, &mut rng);
        let (mut cars, mut manholes) = (0u32, 0u32);
        for _ in 0..1000 {
            assert!(road.spawn_obstacle(&mut rng));
            match road.remove_obstacle(0).kind {
                ObstacleKind::Car { .. } => cars += 1,
                ObstacleKind::Manhole { .. } => manholes += 1,
            }
        }
        assert!(cars > 0 && manholes > 0);
        f64::from(cars) / f64::from(cars + manholes)
    }

    #[test]
    fn short_route_mixes_cars_and_manholes() {
        let share = car_share(Some(Route::Short), 21);
        assert!((share - CAR_SPAWN_CHANCE).abs() < 0.06, "car share {share}");
    }

    #[test]
    fn no_route_uses_the_same_mix() {
        let share = car_share(None, 22);
        assert!((share - CAR_SPAWN_CHANCE).abs() < 0.06, "car share {share}");
    }

    #[test]
    fn distance_accumulates_and_obstacles_scroll_away() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut road = Road::new(&mut rng);
        road.reset(Some(Route::Short), &mut rng);
        road.update(0.5, 200.0, &mut rng);
        assert!((road.distance_traveled() - 100.0).abs() < 1e-6);

        for _ in 0..2000 {
            road.update(1.0 / 60.0, 500.0, &mut rng);
            assert!(road.obstacles().iter().all(|o| !o.is_offscreen()));
            assert!(road.line_offsets().iter().all(|y| *y <= WORLD_HEIGHT));
        }
        assert!(road
            .stones()
            .iter()
            .all(|s| s.x < ROAD_LEFT || s.x > ROAD_LEFT + ROAD_WIDTH));
    }
}
