//! Tile values are powers of two.

use super::Invariant;
use crate::{Grid, is_tile_value};

/// Invariant: every tile's value is a power of two of at least 2.
pub struct TileValuesInvariant;

impl Invariant<Grid> for TileValuesInvariant {
    fn holds(grid: &Grid) -> bool {
        grid.tiles().all(|tile| is_tile_value(tile.value()))
    }

    fn description() -> &'static str {
        "Tile values are powers of two"
    }
}
