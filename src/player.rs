use crate::components::Rect;
use crate::config::WORLD_HEIGHT;
use crate::progress::VehicleStats;

pub const PLAYER_WIDTH: f32 = 160.0;
pub const PLAYER_HEIGHT: f32 = 160.0;
pub const MAX_ENERGY: f32 = 100.0;
const ENERGY_REGEN_RATE: f32 = 6.0;
const ENERGY_DRAIN_RATE: f32 = 24.0;
const BASE_SPEED: f32 = 350.0;
const ACCELERATION: f32 = 100.0;
const DECELERATION: f32 = 120.0;
const BOOST_MULTIPLIER: f32 = 1.5;
const LANE_SHIFT_SPEED: f32 = 800.0;
const BOTTOM_MARGIN: f32 = 20.0;
/// The sprite has transparent margins; this is the part that can be hit.
const HITBOX_INSET_X: f32 = 45.0;
const HITBOX_INSET_Y: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct Player {
    lane_centers: [f32; 3],
    lane: usize,
    x: f32,
    target_x: f32,
    speed: f32,
    base_speed: f32,
    energy: f32,
    boosting: bool,
    braking: bool,
    lives: u32,
    max_lives: u32,
    alive: bool,
}

impl Player {
    pub fn new(lane_centers: [f32; 3], stats: &VehicleStats) -> Self {
        let mut player = Self {
            lane_centers,
            lane: 1,
            x: lane_centers[1],
            target_x: lane_centers[1],
            speed: 0.0,
            base_speed: BASE_SPEED,
            energy: MAX_ENERGY,
            boosting: false,
            braking: false,
            lives: 0,
            max_lives: 0,
            alive: true,
        };
        player.reset_stats(stats);
        player
    }

    /// Applies a vehicle's stats and puts the courier back at the start line.
    pub fn reset_stats(&mut self, stats: &VehicleStats) {
        self.base_speed = BASE_SPEED * stats.speed_multiplier;
        self.lives = stats.lives;
        self.max_lives = stats.lives;
        self.lane = 1;
        self.x = self.lane_centers[1];
        self.target_x = self.x;
        self.speed = 0.0;
        self.energy = MAX_ENERGY;
        self.boosting = false;
        self.braking = false;
        self.alive = true;
    }

    pub fn set_controls(&mut self, boost: bool, brake: bool) {
        self.boosting = boost;
        self.braking = brake;
    }

    /// Shifts one lane left (`-1`) or right (`1`). Returns whether the lane changed.
    pub fn move_lane(&mut self, direction: isize) -> bool {
        let next = self.lane as isize + direction;
        if next < 0 || next as usize >= self.lane_centers.len() {
            return false;
        }
        self.lane = next as usize;
        self.target_x = self.lane_centers[self.lane];
        true
    }

    pub fn update(&mut self, dt: f32) {
        if !self.alive {
            return;
        }
        self.update_speed(dt);
        self.update_energy(dt);
        self.update_horizontal_position(dt);
    }

    fn update_speed(&mut self, dt: f32) {
        let target = if self.boosting && self.energy > 0.0 {
            self.base_speed * BOOST_MULTIPLIER
        } else if self.braking {
            0.0
        } else {
            self.base_speed
        };

        if self.speed < target {
            self.speed = (self.speed + ACCELERATION * dt).min(target);
        } else if self.speed > target {
            self.speed = (self.speed - DECELERATION * dt).max(target);
        }
    }

    fn update_energy(&mut self, dt: f32) {
        if self.boosting && self.energy > 0.0 {
            self.energy = (self.energy - ENERGY_DRAIN_RATE * dt).max(0.0);
            if self.energy == 0.0 {
                self.boosting = false;
            }
        } else {
            self.energy = (self.energy + ENERGY_REGEN_RATE * dt).min(MAX_ENERGY);
        }
    }

    fn update_horizontal_position(&mut self, dt: f32) {
        let step = LANE_SHIFT_SPEED * dt;
        let dx = self.target_x - self.x;
        if dx.abs() < step {
            self.x = self.target_x;
        } else {
            self.x += step * dx.signum();
        }
    }

    /// Loses a life and half the current speed. Returns whether any lives remain.
    pub fn take_damage(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.speed *= 0.5;
        self.lives > 0
    }

    pub fn die(&mut self) {
        self.alive = false;
    }

    pub fn revive(&mut self) {
        self.lives = 1;
        self.alive = true;
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_x(
            self.x,
            WORLD_HEIGHT - BOTTOM_MARGIN - PLAYER_HEIGHT,
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
        )
    }

    pub fn hitbox(&self) -> Rect {
        self.bounds().inset(HITBOX_INSET_X, HITBOX_INSET_Y)
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    #[cfg(test)]
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn is_boosting(&self) -> bool {
        self.boosting
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    #[cfg(test)]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[cfg(test)]
    pub(crate) fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    #[cfg(test)]
    pub(crate) fn set_energy(&mut self, energy: f32) {
        self.energy = energy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::VEHICLES;

    const LANES: [f32; 3] = [100.0, 400.0, 700.0];

    fn bicycle() -> Player {
        Player::new(LANES, &VEHICLES[0])
    }

    #[test]
    fn vehicle_stats_scale_speed_and_lives() {
        let mut player = Player::new(LANES, &VEHICLES[2]);
        assert_eq!(player.lives(), 5);
        assert_eq!(player.max_lives(), 5);
        for _ in 0..600 {
            player.update(1.0 / 60.0);
        }
        assert!((player.speed() - 525.0).abs() < 1e-3);
    }

    #[test]
    fn damage_counts_down_lives() {
        let mut player = bicycle();
        player.set_speed(300.0);
        assert!(player.take_damage());
        assert_eq!(player.lives(), 2);
        assert_eq!(player.speed(), 150.0);
        assert!(player.take_damage());
        assert_eq!(player.lives(), 1);
        assert!(!player.take_damage());
        assert_eq!(player.lives(), 0);
    }

    #[test]
    fn energy_never_exceeds_max_on_regen() {
        let mut player = bicycle();
        player.set_energy(MAX_ENERGY - 0.5);
        for _ in 0..100 {
            player.update(0.1);
            assert!(player.energy() <= MAX_ENERGY);
        }
        assert_eq!(player.energy(), MAX_ENERGY);
    }

    #[test]
    fn boosting_drains_to_zero_and_clears_flag() {
        let mut player = bicycle();
        player.set_energy(1.0);
        player.set_controls(true, false);
        player.update(0.1);
        assert_eq!(player.energy(), 0.0);
        assert!(!player.is_boosting());
        player.update(0.1);
        assert!(player.energy() >= 0.0);
    }

    #[test]
    fn deceleration_is_faster_than_acceleration() {
        let mut player = bicycle();
        player.set_speed(200.0);
        player.update(0.5);
        let gained = player.speed() - 200.0;

        player.set_speed(200.0);
        player.set_controls(false, true);
        player.update(0.5);
        let lost = 200.0 - player.speed();
        assert!(lost > gained);
        assert_eq!(gained, 50.0);
        assert_eq!(lost, 60.0);
    }

    #[test]
    fn lane_change_eases_then_snaps() {
        let mut player = bicycle();
        assert!(player.move_lane(1));
        assert_eq!(player.lane(), 2);
        player.update(0.1);
        assert_eq!(player.x(), 480.0);
        player.update(0.3);
        assert_eq!(player.x(), 700.0);
        assert!(!player.move_lane(1));
        assert!(player.move_lane(-1));
        assert!(player.move_lane(-1));
        assert!(!player.move_lane(-1));
        assert_eq!(player.lane(), 0);
    }

    #[test]
    fn dead_player_is_frozen_until_revived() {
        let mut player = bicycle();
        player.die();
        player.update(1.0);
        assert_eq!(player.speed(), 0.0);
        player.revive();
        assert_eq!(player.lives(), 1);
        assert!(player.is_alive());
    }
}
