//! Move resolution and termination rules.
//!
//! These functions operate on a bare [`Grid`] so the engine, the legal
//! move probe, and move evaluators share one implementation.

use crate::{Direction, Grid, Position, Tile, Traversal, Vector};
use tracing::{debug, instrument, trace};

/// What a single resolved move did to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResolution {
    /// At least one tile ended somewhere other than where it started.
    pub moved: bool,
    /// Sum of the values of all tiles created by merges.
    pub score_gained: u32,
    /// Number of merges performed.
    pub merges: u32,
    /// A merge produced a tile equal to the win value.
    pub reached_win_value: bool,
}

/// Where a tile sliding from some position along a vector comes to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideTarget {
    /// Last empty in-bounds cell on the path (or the start itself).
    pub farthest: Position,
    /// The cell one step beyond `farthest`; may be occupied or off the board.
    pub next: Position,
}

/// Walks from `start` along `vector` while the next cell is empty.
pub fn find_farthest_position(grid: &Grid, start: Position, vector: Vector) -> SlideTarget {
    let mut previous;
    let mut cell = start;
    loop {
        previous = cell;
        cell = previous.step(vector);
        if !grid.cell_available(cell) {
            break;
        }
    }
    SlideTarget {
        farthest: previous,
        next: cell,
    }
}

/// Slides and merges every tile on `grid` in `direction`.
///
/// Each tile merges at most once per move, and a tile produced by a merge
/// during this move never merges again. Transient tile data is reset on
/// the whole board before any tile moves.
#[instrument(skip(grid))]
pub fn resolve_move(grid: &mut Grid, direction: Direction, win_value: u32) -> MoveResolution {
    let vector = direction.vector();
    let traversal = Traversal::build(grid.size(), vector);
    let mut resolution = MoveResolution::default();

    grid.prepare_tiles();

    for cell in traversal.positions() {
        let Some(tile) = grid.tile_at(cell).cloned() else {
            continue;
        };

        let target = find_farthest_position(grid, cell, vector);
        let mergeable = grid
            .tile_at(target.next)
            .filter(|next| next.value() == tile.value() && !next.is_merge_product())
            .cloned();

        let resting_place = if let Some(next) = mergeable {
            let mut moving = tile;
            moving.update_position(target.next);
            let merged = Tile::merged(moving, next);
            let value = merged.value();

            grid.insert(merged);
            grid.remove(cell);

            resolution.score_gained += value;
            resolution.merges += 1;
            if value == win_value {
                resolution.reached_win_value = true;
            }
            trace!(from = %cell, into = %target.next, value, "Merged");
            target.next
        } else {
            grid.move_tile(cell, target.farthest);
            target.farthest
        };

        if cell != resting_place {
            resolution.moved = true;
        }
    }

    debug!(?resolution, "Move resolved");
    resolution
}

/// Whether any two orthogonally adjacent tiles share a value.
pub fn tile_matches_available(grid: &Grid) -> bool {
    grid.tiles().any(|tile| {
        Direction::all().any(|direction| {
            grid.tile_at(tile.position().step(direction.vector()))
                .is_some_and(|other| other.value() == tile.value())
        })
    })
}

/// Whether any move can change the grid.
///
/// The adjacency scan only runs once the grid is full.
pub fn moves_available(grid: &Grid) -> bool {
    grid.has_empty_cells() || tile_matches_available(grid)
}

/// Directions that would move at least one tile, probed on a scratch copy.
#[instrument(skip(grid))]
pub fn legal_directions(grid: &Grid, win_value: u32) -> Vec<Direction> {
    Direction::all()
        .filter(|&direction| {
            let mut scratch = grid.clone();
            resolve_move(&mut scratch, direction, win_value).moved
        })
        .collect()
}
