use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::components::Pos;
use crate::maze::Grid;

/// Shortest 4-connected path through open cells using A* with a Manhattan
/// heuristic. Returns the cells from `start` to `end` inclusive, or `None`
/// when either endpoint is a wall or `end` cannot be reached.
///
/// Stale heap entries are skipped on pop instead of being updated in place;
/// among equal f-scores the entry pushed first is expanded first.
pub fn find_path(grid: &Grid, start: Pos, end: Pos) -> Option<Vec<Pos>> {
    if !grid.is_open(start) || !grid.is_open(end) {
        return None;
    }

    let cols = grid.cols();
    let idx = |p: Pos| p.row * cols + p.col;
    let cells = grid.rows() * cols;

    let mut g_score = vec![usize::MAX; cells];
    let mut came_from: Vec<Option<Pos>> = vec![None; cells];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    g_score[idx(start)] = 0;
    open.push(Reverse((start.manhattan(end), seq, start)));

    while let Some(Reverse((f, _, current))) = open.pop() {
        let g = g_score[idx(current)];
        if f > g + current.manhattan(end) {
            continue;
        }
        if current == end {
            return Some(reconstruct(&came_from, cols, end));
        }
        for next in grid.open_neighbors(current) {
            let tentative = g + 1;
            if tentative < g_score[idx(next)] {
                g_score[idx(next)] = tentative;
                came_from[idx(next)] = Some(current);
                seq += 1;
                open.push(Reverse((tentative + next.manhattan(end), seq, next)));
            }
        }
    }
    None
}

fn reconstruct(came_from: &[Option<Pos>], cols: usize, end: Pos) -> Vec<Pos> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(prev) = came_from[current.row * cols + current.col] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{generate, Tile};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    fn bfs_len(grid: &Grid, start: Pos, end: Pos) -> Option<usize> {
        let mut dist = vec![vec![usize::MAX; grid.cols()]; grid.rows()];
        let mut q = VecDeque::new();
        dist[start.row][start.col] = 0;
        q.push_back(start);
        while let Some(pos) = q.pop_front() {
            if pos == end {
                return Some(dist[pos.row][pos.col]);
            }
            for next in grid.open_neighbors(pos) {
                if dist[next.row][next.col] == usize::MAX {
                    dist[next.row][next.col] = dist[pos.row][pos.col] + 1;
                    q.push_back(next);
                }
            }
        }
        None
    }

    fn assert_valid_path(grid: &Grid, path: &[Pos], start: Pos, end: Pos) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1, "{:?} -> {:?}", pair[0], pair[1]);
            assert!(grid.is_open(pair[1]));
        }
    }

    #[test]
    fn seeded_revive_maze_has_a_deterministic_path() {
        let mut rng = StdRng::seed_from_u64(2024);
        let grid = generate(&mut rng, 15, 20);
        let path = find_path(&grid, grid.entrance(), grid.exit()).expect("exit reachable");
        assert_valid_path(&grid, &path, grid.entrance(), grid.exit());

        let mut again = StdRng::seed_from_u64(2024);
        let same = generate(&mut again, 15, 20);
        assert_eq!(same, grid);
        let replay = find_path(&same, same.entrance(), same.exit()).expect("exit reachable");
        assert_eq!(replay.len(), path.len());
    }

    #[test]
    fn unreachable_target_yields_none() {
        let mut grid = Grid::filled(5, 5, Tile::Wall);
        grid.set(Pos::new(1, 1), Tile::Open);
        grid.set(Pos::new(3, 3), Tile::Open);
        assert_eq!(find_path(&grid, Pos::new(1, 1), Pos::new(3, 3)), None);
        assert_eq!(find_path(&grid, Pos::new(0, 0), Pos::new(3, 3)), None);
    }

    #[test]
    fn start_equal_to_end_is_a_single_cell() {
        let grid = Grid::filled(3, 3, Tile::Open);
        let p = Pos::new(1, 1);
        assert_eq!(find_path(&grid, p, p), Some(vec![p]));
    }

    #[test]
    fn open_field_path_is_manhattan_length() {
        let grid = Grid::filled(6, 9, Tile::Open);
        let (start, end) = (Pos::new(0, 0), Pos::new(5, 8));
        let path = find_path(&grid, start, end).expect("open field");
        assert_eq!(path.len(), start.manhattan(end) + 1);
        assert_valid_path(&grid, &path, start, end);
    }

    proptest! {
        #[test]
        fn path_matches_the_unique_corridor(seed in any::<u64>(), rows in 5usize..25, cols in 5usize..25) {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate(&mut rng, rows, cols);
            let rooms: Vec<Pos> = grid.rooms().collect();
            let start = rooms[seed as usize % rooms.len()];
            let end = rooms[(seed / 7) as usize % rooms.len()];
            let path = find_path(&grid, start, end).expect("maze is connected");
            prop_assert_eq!(Some(path.len() - 1), bfs_len(&grid, start, end));
            assert_valid_path(&grid, &path, start, end);
        }
    }
}
