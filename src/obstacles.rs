use crossterm::style::Color;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::Rect;
use crate::config::WORLD_HEIGHT;

pub const CAR_WIDTH: f32 = 80.0;
pub const CAR_HEIGHT: f32 = 150.0;
pub const MANHOLE_SIZE: f32 = 100.0;
const MANHOLE_OPEN_Y_THRESHOLD: f32 = WORLD_HEIGHT * 0.4;
const MANHOLE_TRANSITION_SPEED: f32 = 2.5;
const MANHOLE_OPEN_OFFSET_FACTOR: f32 = 0.3;
const MANHOLE_DIAGONAL_OFFSET_FACTOR: f32 = 0.1;
const CAR_SPEED_RANGE: std::ops::Range<f32> = 100.0..200.0;

const CAR_COLORS: [Color; 9] = [
    Color::Rgb { r: 220, g: 50, b: 50 },
    Color::Rgb { r: 50, g: 50, b: 220 },
    Color::Rgb { r: 50, g: 200, b: 50 },
    Color::Rgb { r: 220, g: 220, b: 50 },
    Color::Rgb { r: 150, g: 150, b: 150 },
    Color::Rgb { r: 200, g: 100, b: 0 },
    Color::Rgb { r: 100, g: 50, b: 150 },
    Color::Rgb { r: 0, g: 150, b: 150 },
    Color::Rgb { r: 255, g: 165, b: 0 },
];

#[derive(Debug, Clone, PartialEq)]
pub enum ObstacleKind {
    Car { color: Color, speed: f32 },
    /// A cover that slides aside once it is far enough down the screen.
    Manhole {
        open_progress: f32,
        is_open: bool,
        transitioning: bool,
        open_direction: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub lane_x: f32,
    pub y: f32,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn car(rng: &mut impl Rng, lane_x: f32) -> Self {
        let color = *CAR_COLORS.choose(rng).unwrap_or(&CAR_COLORS[0]);
        Self {
            lane_x,
            y: -CAR_HEIGHT,
            kind: ObstacleKind::Car {
                color,
                speed: rng.gen_range(CAR_SPEED_RANGE),
            },
        }
    }

    pub fn manhole(rng: &mut impl Rng, lane_x: f32) -> Self {
        let open_direction = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        Self {
            lane_x,
            y: -manhole_frame_height(),
            kind: ObstacleKind::Manhole {
                open_progress: 0.0,
                is_open: false,
                transitioning: false,
                open_direction,
            },
        }
    }

    pub fn advance(&mut self, dt: f32, road_speed: f32) {
        match &mut self.kind {
            ObstacleKind::Car { speed, .. } => {
                self.y += (road_speed + *speed) * dt;
            }
            ObstacleKind::Manhole {
                open_progress,
                is_open,
                transitioning,
                ..
            } => {
                self.y += road_speed * dt;
                if !*transitioning && self.y > MANHOLE_OPEN_Y_THRESHOLD {
                    *transitioning = true;
                }
                if *transitioning && *open_progress < 1.0 {
                    *open_progress = (*open_progress + MANHOLE_TRANSITION_SPEED * dt).min(1.0);
                    if *open_progress >= 1.0 {
                        *is_open = true;
                    }
                }
            }
        }
    }

    pub fn is_passable(&self) -> bool {
        matches!(self.kind, ObstacleKind::Manhole { is_open: true, .. })
    }

    pub fn is_offscreen(&self) -> bool {
        self.y > WORLD_HEIGHT
    }

    pub fn bounds(&self) -> Rect {
        match self.kind {
            ObstacleKind::Car { .. } => Rect::from_center_x(self.lane_x, self.y, CAR_WIDTH, CAR_HEIGHT),
            ObstacleKind::Manhole { .. } => Rect::from_center_x(
                self.lane_x,
                self.y,
                MANHOLE_SIZE * 2.0,
                manhole_frame_height(),
            ),
        }
    }

    pub fn bottom(&self) -> f32 {
        self.bounds().bottom()
    }

    /// The solid part of the obstacle: the car body or the manhole cover at rest.
    pub fn hitbox(&self) -> Rect {
        match self.kind {
            ObstacleKind::Car { .. } => self.bounds(),
            ObstacleKind::Manhole { .. } => self.hole(),
        }
    }

    /// Narrow-phase test against a rectangular hitbox. Cars are solid boxes;
    /// a manhole only counts where its round cover is.
    pub fn collides_with(&self, hitbox: &Rect) -> bool {
        if self.is_passable() {
            return false;
        }
        match self.kind {
            ObstacleKind::Car { .. } => self.hitbox().overlaps(hitbox),
            ObstacleKind::Manhole { .. } => hitbox.overlaps_ellipse(&self.hole()),
        }
    }

    pub fn hole(&self) -> Rect {
        let frame = self.bounds();
        Rect::from_center_x(
            frame.center_x(),
            frame.y + (frame.h - MANHOLE_SIZE) / 2.0,
            MANHOLE_SIZE,
            MANHOLE_SIZE,
        )
    }

    /// Cover displacement (dx, dy) for the current opening progress; zero for cars.
    pub fn cover_offset(&self) -> (f32, f32) {
        match self.kind {
            ObstacleKind::Car { .. } => (0.0, 0.0),
            ObstacleKind::Manhole {
                open_progress,
                open_direction,
                ..
            } => (
                open_progress * MANHOLE_SIZE * MANHOLE_OPEN_OFFSET_FACTOR * open_direction,
                open_progress * MANHOLE_SIZE * MANHOLE_DIAGONAL_OFFSET_FACTOR,
            ),
        }
    }

    #[cfg(test)]
    pub fn open_progress(&self) -> Option<f32> {
        match self.kind {
            ObstacleKind::Manhole { open_progress, .. } => Some(open_progress),
            ObstacleKind::Car { .. } => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_open_progress(&mut self, progress: f32) {
        if let ObstacleKind::Manhole {
            open_progress,
            is_open,
            transitioning,
            ..
        } = &mut self.kind
        {
            *open_progress = progress.clamp(0.0, 1.0);
            *is_open = *open_progress >= 1.0;
            *transitioning = *open_progress > 0.0;
        }
    }
}

fn manhole_frame_height() -> f32 {
    MANHOLE_SIZE + 2.0 * MANHOLE_SIZE * MANHOLE_DIAGONAL_OFFSET_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn car_outpaces_the_road() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut car = Obstacle::car(&mut rng, 640.0);
        assert_eq!(car.bottom(), 0.0);
        let ObstacleKind::Car { speed, .. } = car.kind else {
            panic!("expected a car");
        };
        car.advance(1.0, 300.0);
        assert!((car.bottom() - (300.0 + speed)).abs() < 1e-3);
        assert!(!car.is_passable());
    }

    #[test]
    fn manhole_opens_only_past_threshold() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut hole = Obstacle::manhole(&mut rng, 640.0);
        hole.advance(0.5, 100.0);
        assert_eq!(hole.open_progress(), Some(0.0));

        hole.y = MANHOLE_OPEN_Y_THRESHOLD + 1.0;
        hole.advance(0.2, 0.0);
        assert!((hole.open_progress().unwrap() - 0.5).abs() < 1e-6);
        assert!(!hole.is_passable());

        hole.advance(0.1, 0.0);
        assert!((hole.open_progress().unwrap() - 0.75).abs() < 1e-6);
        assert!(!hole.is_passable());

        hole.advance(0.2, 0.0);
        assert_eq!(hole.open_progress(), Some(1.0));
        assert!(hole.is_passable());
    }

    #[test]
    fn cover_slides_diagonally_in_chosen_direction() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut hole = Obstacle::manhole(&mut rng, 640.0);
        assert_eq!(hole.cover_offset(), (0.0, 0.0));
        hole.set_open_progress(1.0);
        let (dx, dy) = hole.cover_offset();
        assert!((dx.abs() - 30.0).abs() < 1e-4);
        assert!((dy - 10.0).abs() < 1e-4);
    }

    #[test]
    fn obstacles_leave_past_the_bottom() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut car = Obstacle::car(&mut rng, 100.0);
        car.y = WORLD_HEIGHT - 1.0;
        assert!(!car.is_offscreen());
        car.advance(0.1, 100.0);
        assert!(car.is_offscreen());
    }
}
