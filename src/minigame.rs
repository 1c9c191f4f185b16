use rand::Rng;
use tracing::{debug, warn};

use crate::components::{Direction, Pos, Rect};
use crate::config::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::maze::{self, Grid, Tile};
use crate::pathfind::find_path;
use crate::render::{palette, Canvas};

pub const ROWS: usize = 15;
pub const COLS: usize = 20;
pub const MOVE_DELAY: f32 = 0.15;
const CELL_SIZE: f32 = 30.0;
/// Regeneration attempts before a maze is accepted without a known route.
const MAX_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinigameOutcome {
    Win,
    Lose,
}

/// The revive maze: walk from the entrance to the exit; touching a wall loses.
#[derive(Debug, Clone)]
pub struct Minigame {
    grid: Grid,
    player: Pos,
    move_timer: f32,
    active: bool,
    solution_len: Option<usize>,
}

impl Default for Minigame {
    fn default() -> Self {
        let grid = Grid::filled(maze::odd_dimension(ROWS), maze::odd_dimension(COLS), Tile::Wall);
        Self {
            player: grid.entrance(),
            grid,
            move_timer: 0.0,
            active: false,
            solution_len: None,
        }
    }
}

impl Minigame {
    pub fn start(&mut self, rng: &mut impl Rng) {
        for attempt in 1..=MAX_ATTEMPTS {
            let grid = maze::generate(rng, ROWS, COLS);
            let path = find_path(&grid, grid.entrance(), grid.exit());
            self.grid = grid;
            if let Some(path) = path {
                self.solution_len = Some(path.len() - 1);
                break;
            }
            warn!(attempt, "generated maze has no route to the exit, regenerating");
            self.solution_len = None;
        }
        self.player = self.grid.entrance();
        self.move_timer = 0.0;
        self.active = true;
        debug!(steps = ?self.solution_len, "revive maze ready");
    }

    pub fn handle_move(&mut self, dir: Direction) -> Option<MinigameOutcome> {
        if !self.active || self.move_timer > 0.0 {
            return None;
        }
        let next = self.player.step(dir, self.grid.rows(), self.grid.cols())?;
        if !self.grid.is_open(next) {
            self.active = false;
            return Some(MinigameOutcome::Lose);
        }
        self.player = next;
        self.move_timer = MOVE_DELAY;
        if next == self.grid.exit() {
            self.active = false;
            return Some(MinigameOutcome::Win);
        }
        None
    }

    pub fn update(&mut self, dt: f32) {
        if self.move_timer > 0.0 {
            self.move_timer -= dt;
        }
    }

    #[cfg(test)]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub fn player(&self) -> Pos {
        self.player
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub fn solution_len(&self) -> Option<usize> {
        self.solution_len
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        if !self.active {
            return;
        }
        canvas.clear(palette::UI_BG);
        let cx = WORLD_WIDTH / 2.0;
        canvas.text_centered(cx, 30.0, "Revive chance: reach the exit!", palette::WHITE);
        canvas.text_centered(cx, 80.0, "Careful: touching a wall means defeat!", palette::RED);

        let width = self.grid.cols() as f32 * CELL_SIZE;
        let height = self.grid.rows() as f32 * CELL_SIZE;
        let x0 = (WORLD_WIDTH - width) / 2.0;
        let y0 = (WORLD_HEIGHT - height) / 2.0;
        let cell = |pos: Pos| Rect::new(x0 + pos.col as f32 * CELL_SIZE, y0 + pos.row as f32 * CELL_SIZE, CELL_SIZE, CELL_SIZE);

        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let pos = Pos::new(row, col);
                let color = if self.grid.is_open(pos) {
                    palette::MAZE_PATH
                } else {
                    palette::MAZE_WALL
                };
                canvas.fill_rect(cell(pos), color);
            }
        }
        canvas.fill_rect(cell(self.grid.exit()), palette::RED);
        canvas.fill_rect(cell(self.player), palette::GREEN);

        if let Some(steps) = self.solution_len {
            canvas.text_centered(
                cx,
                WORLD_HEIGHT - 40.0,
                &format!("Shortest route: {steps} steps"),
                palette::BLUE,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn started(seed: u64) -> Minigame {
        let mut game = Minigame::default();
        game.start(&mut StdRng::seed_from_u64(seed));
        game
    }

    #[test]
    fn walking_the_solution_wins() {
        let mut game = started(3);
        let path = find_path(game.grid(), game.grid().entrance(), game.grid().exit()).unwrap();
        assert_eq!(game.solution_len(), Some(path.len() - 1));

        let mut outcome = None;
        for pair in path.windows(2) {
            let dir = Direction::ALL
                .into_iter()
                .find(|d| pair[0].step(*d, ROWS + 1, COLS + 1) == Some(pair[1]))
                .unwrap();
            outcome = game.handle_move(dir);
            game.update(MOVE_DELAY);
        }
        assert_eq!(outcome, Some(MinigameOutcome::Win));
        assert!(!game.is_active());
    }

    #[test]
    fn touching_a_wall_loses() {
        let mut game = started(11);
        // The entrance sits in the left border; up is always wall.
        assert_eq!(game.handle_move(Direction::Up), Some(MinigameOutcome::Lose));
        assert!(!game.is_active());
        assert_eq!(game.handle_move(Direction::Right), None);
    }

    #[test]
    fn moves_off_the_grid_are_ignored() {
        let mut game = started(11);
        assert_eq!(game.handle_move(Direction::Left), None);
        assert!(game.is_active());
        assert_eq!(game.player(), game.grid().entrance());
    }

    #[test]
    fn cooldown_swallows_rapid_moves() {
        let mut game = started(7);
        assert_eq!(game.handle_move(Direction::Right), None);
        assert_eq!(game.player(), Pos::new(1, 1));
        // Still cooling down: even a wall step is ignored.
        assert_eq!(game.handle_move(Direction::Up), None);
        assert!(game.is_active());
        game.update(MOVE_DELAY / 2.0);
        assert_eq!(game.handle_move(Direction::Up), None);
        game.update(MOVE_DELAY);
        assert_eq!(game.handle_move(Direction::Up), Some(MinigameOutcome::Lose));
    }
}
