//! Coordinate consistency: every tile sits in the slot it claims.

use super::Invariant;
use crate::Grid;

/// Invariant: a tile's stored position matches its slot, and no two tiles
/// share a coordinate.
pub struct CoordinatesConsistentInvariant;

impl Invariant<Grid> for CoordinatesConsistentInvariant {
    fn holds(grid: &Grid) -> bool {
        let mut seen = std::collections::HashSet::new();
        grid.tiles().all(|tile| {
            let pos = tile.position();
            let in_slot = grid
                .tile_at(pos)
                .is_some_and(|occupant| std::ptr::eq(occupant, tile));
            in_slot && seen.insert(pos)
        })
    }

    fn description() -> &'static str {
        "Tile coordinates match their grid slots"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, Tile};

    #[test]
    fn test_populated_grid_holds() {
        let mut grid = Grid::new(4);
        grid.insert(Tile::new(Position::new(0, 3), 2));
        grid.insert(Tile::new(Position::new(2, 1), 4));
        assert!(CoordinatesConsistentInvariant::holds(&grid));
    }

    #[test]
    fn test_moved_tiles_hold() {
        let mut grid = Grid::new(4);
        grid.insert(Tile::new(Position::new(3, 3), 2));
        grid.move_tile(Position::new(3, 3), Position::new(0, 0));
        assert!(CoordinatesConsistentInvariant::holds(&grid));
    }
}
