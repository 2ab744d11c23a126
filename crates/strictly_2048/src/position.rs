//! Board coordinates and move directions.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

/// A coordinate on the board.
///
/// `x` is the column (0 = leftmost), `y` is the row (0 = top). Coordinates
/// are signed so that a walk may step off the board; [`crate::Grid`] treats
/// such positions as empty rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Creates a new position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the position one step along `vector`.
    pub fn step(self, vector: Vector) -> Self {
        Self {
            x: self.x + vector.dx,
            y: self.y + vector.dy,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unit vector over the two board axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector {
    /// Horizontal component.
    pub dx: i32,
    /// Vertical component (positive points down).
    pub dy: i32,
}

/// A move direction.
///
/// The discriminants are the oracle wire codes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[repr(u8)]
pub enum Direction {
    /// Towards row 0.
    Up = 0,
    /// Towards the last column.
    Right = 1,
    /// Towards the last row.
    Down = 2,
    /// Towards column 0.
    Left = 3,
}

impl Direction {
    /// Returns the unit vector for this direction.
    pub fn vector(self) -> Vector {
        match self {
            Self::Up => Vector { dx: 0, dy: -1 },
            Self::Right => Vector { dx: 1, dy: 0 },
            Self::Down => Vector { dx: 0, dy: 1 },
            Self::Left => Vector { dx: -1, dy: 0 },
        }
    }

    /// Returns the wire code for this direction.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a wire code. Returns `None` for anything outside `0..=3`.
    #[instrument]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::iter().find(|direction| direction.code() == code)
    }

    /// All four directions in wire-code order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// Visiting order for a move.
///
/// Cells are visited farthest-first in the direction of travel, so a
/// chain of tiles slides in a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    /// Column order.
    pub xs: Vec<i32>,
    /// Row order.
    pub ys: Vec<i32>,
}

impl Traversal {
    /// Builds the traversal for a board of `size` cells per side.
    #[instrument]
    pub fn build(size: usize, vector: Vector) -> Self {
        let size = size as i32;
        let mut xs: Vec<i32> = (0..size).collect();
        let mut ys: Vec<i32> = (0..size).collect();

        if vector.dx == 1 {
            xs.reverse();
        }
        if vector.dy == 1 {
            ys.reverse();
        }

        Self { xs, ys }
    }

    /// Iterates positions column-major in traversal order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.xs
            .iter()
            .flat_map(move |&x| self.ys.iter().map(move |&y| Position::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_code() {
        for direction in Direction::all() {
            assert_eq!(Direction::from_code(direction.code()), Some(direction));
        }
        assert_eq!(Direction::from_code(4), None);
        assert_eq!(Direction::from_code(255), None);
    }

    #[test]
    fn test_wire_order() {
        let codes: Vec<u8> = Direction::all().map(Direction::code).collect();
        assert_eq!(codes, vec![0, 1, 2, 3]);
        assert_eq!(Direction::Left.code(), 3);
    }

    #[test]
    fn test_traversal_reverses_axis_of_travel() {
        let right = Traversal::build(4, Direction::Right.vector());
        assert_eq!(right.xs, vec![3, 2, 1, 0]);
        assert_eq!(right.ys, vec![0, 1, 2, 3]);

        let down = Traversal::build(4, Direction::Down.vector());
        assert_eq!(down.xs, vec![0, 1, 2, 3]);
        assert_eq!(down.ys, vec![3, 2, 1, 0]);

        let left = Traversal::build(4, Direction::Left.vector());
        assert_eq!(left.xs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_traversal_visits_every_cell_once() {
        let traversal = Traversal::build(4, Direction::Up.vector());
        let cells: Vec<Position> = traversal.positions().collect();
        assert_eq!(cells.len(), 16);
        assert_eq!(cells[0], Position::new(0, 0));
        assert_eq!(cells[1], Position::new(0, 1));
    }
}
