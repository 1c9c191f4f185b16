// Shared value types

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Neighbour in `dir`, or `None` when it would leave a `rows` x `cols` grid.
    pub fn step(self, dir: Direction, rows: usize, cols: usize) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        let nr = self.row as isize + dr;
        let nc = self.col as isize + dc;
        if nr < 0 || nc < 0 {
            return None;
        }
        let (nr, nc) = (nr as usize, nc as usize);
        if nr >= rows || nc >= cols {
            return None;
        }
        Some(Pos::new(nr, nc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in world units, `y` growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center_x(center_x: f32, top: f32, w: f32, h: f32) -> Self {
        Self::new(center_x - w / 2.0, top, w, h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn inset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.x + dx,
            self.y + dy,
            (self.w - 2.0 * dx).max(0.0),
            (self.h - 2.0 * dy).max(0.0),
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether this rectangle intersects the ellipse inscribed in `ellipse`.
    pub fn overlaps_ellipse(&self, ellipse: &Rect) -> bool {
        let (rx, ry) = (ellipse.w / 2.0, ellipse.h / 2.0);
        if rx <= 0.0 || ry <= 0.0 || !self.overlaps(ellipse) {
            return false;
        }
        let (cx, cy) = (ellipse.center_x(), ellipse.center_y());
        let nx = (cx.clamp(self.x, self.right()) - cx) / rx;
        let ny = (cy.clamp(self.y, self.bottom()) - cy) / ry;
        nx * nx + ny * ny < 1.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stays_inside_grid() {
        let corner = Pos::new(0, 0);
        assert_eq!(corner.step(Direction::Up, 3, 3), None);
        assert_eq!(corner.step(Direction::Left, 3, 3), None);
        assert_eq!(corner.step(Direction::Right, 3, 3), Some(Pos::new(0, 1)));
        assert_eq!(Pos::new(2, 2).step(Direction::Down, 3, 3), None);
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rect::new(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn ellipse_corners_are_empty() {
        let circle = Rect::new(100.0, 100.0, 100.0, 100.0);
        // Inside the bounding square but past the rim.
        assert!(!Rect::new(90.0, 90.0, 20.0, 20.0).overlaps_ellipse(&circle));
        assert!(Rect::new(90.0, 140.0, 20.0, 20.0).overlaps_ellipse(&circle));
        assert!(Rect::new(140.0, 140.0, 5.0, 5.0).overlaps_ellipse(&circle));
        assert!(!Rect::new(0.0, 0.0, 50.0, 50.0).overlaps_ellipse(&circle));
    }
}
