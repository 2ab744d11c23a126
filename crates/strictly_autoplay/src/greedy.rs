//! A one-ply move evaluator so autoplay works without an external engine.

use strictly_2048::{Direction, Grid, rules};
use tracing::{debug, warn};

use crate::{MoveEvaluator, NO_MOVE_CODE, OracleRequest};

/// Points credited per empty cell left after a move.
const EMPTY_CELL_BONUS: u32 = 16;

/// Picks the direction with the best immediate payoff.
///
/// Each legal direction scores its merge gain plus a bonus per empty cell
/// left behind. Ties go to the earlier direction in wire-code order. The
/// request's depth and probability are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyEvaluator;

impl GreedyEvaluator {
    fn score(grid: &Grid, direction: Direction) -> Option<u32> {
        let mut scratch = grid.clone();
        let resolution = rules::resolve_move(&mut scratch, direction, u32::MAX);
        resolution.moved.then(|| {
            resolution.score_gained + EMPTY_CELL_BONUS * scratch.available_cells().len() as u32
        })
    }
}

impl MoveEvaluator for GreedyEvaluator {
    fn evaluate(&self, request: &OracleRequest) -> u8 {
        let Some(grid) = Grid::from_flat(request.grid()) else {
            warn!("Greedy evaluator received an unreadable board");
            return NO_MOVE_CODE;
        };

        let mut best: Option<(Direction, u32)> = None;
        for direction in Direction::all() {
            if let Some(score) = Self::score(&grid, direction) {
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some((direction, score));
                }
            }
        }

        match best {
            Some((direction, score)) => {
                debug!(%direction, score, "Greedy choice");
                direction.code()
            }
            None => NO_MOVE_CODE,
        }
    }
}
