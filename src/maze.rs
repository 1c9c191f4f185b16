use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::components::{Direction, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Open,
}

/// Rectangular maze grid. Rooms sit on odd (row, col) coordinates and the
/// even cells between two rooms are the connectors carved to join them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    tiles: Vec<Vec<Tile>>,
}

impl Grid {
    pub fn filled(rows: usize, cols: usize, tile: Tile) -> Self {
        Self {
            rows,
            cols,
            tiles: vec![vec![tile; cols]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, pos: Pos) -> Option<Tile> {
        self.tiles.get(pos.row).and_then(|row| row.get(pos.col)).copied()
    }

    pub fn is_open(&self, pos: Pos) -> bool {
        self.get(pos) == Some(Tile::Open)
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) {
        self.tiles[pos.row][pos.col] = tile;
    }

    pub fn entrance(&self) -> Pos {
        Pos::new(1, 0)
    }

    pub fn exit(&self) -> Pos {
        Pos::new(self.rows - 2, self.cols - 1)
    }

    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.row > 0 && pos.col > 0 && pos.row < self.rows - 1 && pos.col < self.cols - 1
    }

    #[cfg(test)]
    pub fn is_room(&self, pos: Pos) -> bool {
        self.is_interior(pos) && pos.row % 2 == 1 && pos.col % 2 == 1
    }

    #[cfg(test)]
    pub fn rooms(&self) -> impl Iterator<Item = Pos> + '_ {
        (1..self.rows - 1)
            .step_by(2)
            .flat_map(move |row| (1..self.cols - 1).step_by(2).map(move |col| Pos::new(row, col)))
    }

    pub fn open_neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| pos.step(dir, self.rows, self.cols))
            .filter(move |next| self.is_open(*next))
    }
}

/// Rounds a requested dimension up to the next odd value of at least 3.
pub fn odd_dimension(n: usize) -> usize {
    let n = n.max(3);
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

/// Carves a perfect maze with an iterative randomized depth-first search,
/// then opens the entrance at (1, 0) and the exit at (rows - 2, cols - 1).
pub fn generate(rng: &mut impl Rng, rows: usize, cols: usize) -> Grid {
    let rows = odd_dimension(rows);
    let cols = odd_dimension(cols);
    let mut grid = Grid::filled(rows, cols, Tile::Wall);

    let start = Pos::new(1, 1);
    grid.set(start, Tile::Open);
    let mut stack = vec![start];
    let mut carved = 1usize;

    while let Some(&current) = stack.last() {
        let neighbors = unvisited_rooms(&grid, current);
        if let Some(&next) = neighbors.choose(rng) {
            carve_between(&mut grid, current, next);
            grid.set(next, Tile::Open);
            stack.push(next);
            carved += 1;
        } else {
            stack.pop();
        }
    }

    let entrance = grid.entrance();
    let exit = grid.exit();
    grid.set(entrance, Tile::Open);
    grid.set(exit, Tile::Open);

    debug!(rows, cols, rooms = carved, "maze generated");
    grid
}

fn unvisited_rooms(grid: &Grid, from: Pos) -> Vec<Pos> {
    let mut rooms = Vec::with_capacity(4);
    for (dr, dc) in [(0isize, 2isize), (0, -2), (2, 0), (-2, 0)] {
        let nr = from.row as isize + dr;
        let nc = from.col as isize + dc;
        if nr <= 0 || nc <= 0 {
            continue;
        }
        let next = Pos::new(nr as usize, nc as usize);
        if grid.is_interior(next) && grid.get(next) == Some(Tile::Wall) {
            rooms.push(next);
        }
    }
    rooms
}

fn carve_between(grid: &mut Grid, a: Pos, b: Pos) {
    let wall = Pos::new((a.row + b.row) / 2, (a.col + b.col) / 2);
    grid.set(wall, Tile::Open);
}
