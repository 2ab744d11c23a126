//! The square board of optional tiles.

use crate::{Position, Tile};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Returns true for legal tile face values (powers of two, at least 2).
pub fn is_tile_value(value: u32) -> bool {
    value >= 2 && value.is_power_of_two()
}

/// An N×N board of optional tiles.
///
/// Invariant: a tile's stored position always equals the slot holding it.
/// Slots are indexed `cells[x][y]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Option<Tile>>>,
}

impl Grid {
    /// Creates an empty grid.
    #[instrument]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![vec![None; size]; size],
        }
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `pos` lies on the board.
    pub fn within_bounds(&self, pos: Position) -> bool {
        let size = self.size as i32;
        pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size
    }

    /// Returns the tile at `pos`, or `None` if the cell is empty or off the board.
    pub fn tile_at(&self, pos: Position) -> Option<&Tile> {
        if !self.within_bounds(pos) {
            return None;
        }
        self.cells[pos.x as usize][pos.y as usize].as_ref()
    }

    /// Whether `pos` is on the board and empty.
    pub fn cell_available(&self, pos: Position) -> bool {
        self.within_bounds(pos) && self.tile_at(pos).is_none()
    }

    /// Places a tile in the slot named by its own position, replacing any occupant.
    ///
    /// The caller guarantees the position is in bounds.
    #[instrument(skip(self, tile), fields(at = %tile.position(), value = tile.value()))]
    pub fn insert(&mut self, tile: Tile) {
        let pos = tile.position();
        debug_assert!(self.within_bounds(pos), "insert out of bounds at {pos}");
        self.cells[pos.x as usize][pos.y as usize] = Some(tile);
    }

    /// Empties the slot at `pos`, returning the previous occupant.
    ///
    /// The caller guarantees the position is in bounds.
    #[instrument(skip(self))]
    pub fn remove(&mut self, pos: Position) -> Option<Tile> {
        debug_assert!(self.within_bounds(pos), "remove out of bounds at {pos}");
        self.cells[pos.x as usize][pos.y as usize].take()
    }

    /// Relocates the tile at `from` to `to`, keeping its stored position in sync.
    #[instrument(skip(self))]
    pub fn move_tile(&mut self, from: Position, to: Position) {
        if from == to {
            return;
        }
        if let Some(mut tile) = self.remove(from) {
            tile.update_position(to);
            self.insert(tile);
        }
    }

    /// Resets per-move data on every tile.
    pub fn prepare_tiles(&mut self) {
        self.cells
            .iter_mut()
            .flatten()
            .flatten()
            .for_each(Tile::prepare_for_move);
    }

    /// Iterates occupied cells column by column.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten().flatten()
    }

    /// All empty coordinates.
    pub fn available_cells(&self) -> Vec<Position> {
        let size = self.size as i32;
        (0..size)
            .flat_map(|x| (0..size).map(move |y| Position::new(x, y)))
            .filter(|&pos| self.tile_at(pos).is_none())
            .collect()
    }

    /// Whether any cell is empty.
    pub fn has_empty_cells(&self) -> bool {
        self.cells.iter().flatten().any(Option::is_none)
    }

    /// Picks an empty coordinate uniformly at random. `None` when the grid is full.
    #[instrument(skip(self, rng))]
    pub fn random_empty_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let available = self.available_cells();
        let chosen = available.choose(rng).copied();
        debug!(available = available.len(), chosen = ?chosen, "Selected empty cell");
        chosen
    }

    /// Row-major tile values, `0` for empty cells.
    ///
    /// This ordering is the oracle wire format.
    #[instrument(skip(self))]
    pub fn for_oracle(&self) -> Vec<u32> {
        let size = self.size as i32;
        (0..size)
            .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
            .map(|pos| self.tile_at(pos).map_or(0, Tile::value))
            .collect()
    }

    /// Rebuilds a grid from the row-major layout produced by [`Grid::for_oracle`].
    ///
    /// Returns `None` unless the length is a perfect square and every
    /// non-zero entry is a legal tile value.
    #[instrument(skip(values), fields(len = values.len()))]
    pub fn from_flat(values: &[u32]) -> Option<Self> {
        let size = (values.len() as f64).sqrt() as usize;
        if size == 0 || size * size != values.len() {
            warn!("Flat board is not square");
            return None;
        }

        let mut grid = Self::new(size);
        for (index, &value) in values.iter().enumerate() {
            if value == 0 {
                continue;
            }
            if !is_tile_value(value) {
                warn!(index, value, "Flat board holds an illegal tile value");
                return None;
            }
            let pos = Position::new((index % size) as i32, (index / size) as i32);
            grid.insert(Tile::new(pos, value));
        }
        Some(grid)
    }

    /// Structural copy of values and positions.
    #[instrument(skip(self))]
    pub fn serialize(&self) -> SerializedGrid {
        let cells = self
            .cells
            .iter()
            .map(|column| {
                column
                    .iter()
                    .map(|slot| {
                        slot.as_ref().map(|tile| SerializedTile {
                            position: tile.position(),
                            value: tile.value(),
                        })
                    })
                    .collect()
            })
            .collect();

        SerializedGrid {
            size: self.size,
            cells,
        }
    }

    /// Rebuilds a grid from [`Grid::serialize`] output.
    ///
    /// Returns `None` if the shape is inconsistent, a tile's recorded
    /// position disagrees with its slot, or a value is illegal.
    #[instrument(skip(serialized), fields(size = serialized.size))]
    pub fn restore(serialized: &SerializedGrid) -> Option<Self> {
        let size = serialized.size;
        if size == 0
            || serialized.cells.len() != size
            || serialized.cells.iter().any(|column| column.len() != size)
        {
            warn!("Serialized grid has inconsistent dimensions");
            return None;
        }

        let mut grid = Self::new(size);
        for (x, column) in serialized.cells.iter().enumerate() {
            for (y, slot) in column.iter().enumerate() {
                let Some(tile) = slot else { continue };
                let expected = Position::new(x as i32, y as i32);
                if tile.position != expected || !is_tile_value(tile.value) {
                    warn!(slot = %expected, recorded = %tile.position, value = tile.value, "Serialized tile is inconsistent");
                    return None;
                }
                grid.insert(Tile::new(expected, tile.value));
            }
        }
        Some(grid)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, values) in self.for_oracle().chunks(self.size).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for (col, value) in values.iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                if *value == 0 {
                    write!(f, "{:>6}", ".")?;
                } else {
                    write!(f, "{value:>6}")?;
                }
            }
        }
        Ok(())
    }
}

/// Persisted form of one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTile {
    /// Coordinate.
    pub position: Position,
    /// Face value.
    pub value: u32,
}

/// Persisted form of a grid, `cells[x][y]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedGrid {
    /// Cells per side.
    pub size: usize,
    /// Slot contents.
    pub cells: Vec<Vec<Option<SerializedTile>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_out_of_bounds_lookup_is_empty() {
        let grid = Grid::new(4);
        assert!(grid.tile_at(Position::new(-1, 0)).is_none());
        assert!(grid.tile_at(Position::new(0, 4)).is_none());
        assert!(!grid.within_bounds(Position::new(4, 0)));
        assert!(grid.within_bounds(Position::new(3, 3)));
    }

    #[test]
    fn test_move_tile_keeps_position_in_sync() {
        let mut grid = Grid::new(4);
        grid.insert(Tile::new(Position::new(1, 1), 8));
        grid.move_tile(Position::new(1, 1), Position::new(3, 1));

        assert!(grid.tile_at(Position::new(1, 1)).is_none());
        let moved = grid.tile_at(Position::new(3, 1)).expect("tile moved");
        assert_eq!(moved.position(), Position::new(3, 1));
        assert_eq!(moved.value(), 8);
    }

    #[test]
    fn test_random_empty_position_on_full_grid() {
        let mut grid = Grid::new(2);
        for (i, pos) in grid.available_cells().into_iter().enumerate() {
            grid.insert(Tile::new(pos, 2 << i));
        }
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(grid.random_empty_position(&mut rng), None);
    }

    #[test]
    fn test_random_empty_position_only_picks_empty_cells() {
        let mut grid = Grid::new(4);
        grid.insert(Tile::new(Position::new(0, 0), 2));
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let pos = grid.random_empty_position(&mut rng).expect("has space");
            assert_ne!(pos, Position::new(0, 0));
        }
    }

    #[test]
    fn test_for_oracle_is_row_major() {
        let mut grid = Grid::new(4);
        grid.insert(Tile::new(Position::new(1, 0), 2));
        grid.insert(Tile::new(Position::new(0, 1), 4));
        grid.insert(Tile::new(Position::new(3, 3), 8));

        let flat = grid.for_oracle();
        assert_eq!(flat.len(), 16);
        assert_eq!(flat[1], 2);
        assert_eq!(flat[4], 4);
        assert_eq!(flat[15], 8);
        assert_eq!(Grid::from_flat(&flat), Some(grid));
    }

    #[test]
    fn test_from_flat_rejects_bad_input() {
        assert!(Grid::from_flat(&[2, 0, 0]).is_none());
        assert!(Grid::from_flat(&[3, 0, 0, 0]).is_none());
        assert!(Grid::from_flat(&[]).is_none());
    }

    #[test]
    fn test_restore_rejects_misplaced_tile() {
        let mut grid = Grid::new(4);
        grid.insert(Tile::new(Position::new(2, 1), 16));
        let mut serialized = grid.serialize();
        if let Some(tile) = serialized.cells[2][1].as_mut() {
            tile.position = Position::new(0, 0);
        }
        assert!(Grid::restore(&serialized).is_none());
    }
}
