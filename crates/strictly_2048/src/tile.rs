//! Numbered tiles.

use crate::Position;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A numbered tile occupying one board coordinate.
///
/// `previous_position` and `merged_from` are per-move animation data. They
/// are reset at the start of every move and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    position: Position,
    value: u32,
    previous_position: Option<Position>,
    merged_from: Option<Box<[Tile; 2]>>,
}

impl Tile {
    /// Creates a fresh tile.
    #[instrument]
    pub fn new(position: Position, value: u32) -> Self {
        Self {
            position,
            value,
            previous_position: None,
            merged_from: None,
        }
    }

    /// Creates the product of merging `moving` into `target`.
    ///
    /// The product sits at the target's position with double the value.
    #[instrument(skip(moving, target), fields(at = %target.position, value = target.value * 2))]
    pub fn merged(moving: Tile, target: Tile) -> Self {
        Self {
            position: target.position,
            value: target.value * 2,
            previous_position: None,
            merged_from: Some(Box::new([moving, target])),
        }
    }

    /// Current coordinate.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Face value.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Coordinate before the current move started.
    pub fn previous_position(&self) -> Option<Position> {
        self.previous_position
    }

    /// The two tiles consumed to produce this one during the current move.
    pub fn merged_from(&self) -> Option<&[Tile; 2]> {
        self.merged_from.as_deref()
    }

    /// Whether this tile was produced by a merge during the current move.
    pub fn is_merge_product(&self) -> bool {
        self.merged_from.is_some()
    }

    /// Clears per-move data and records the current position as the start
    /// of the move.
    pub fn prepare_for_move(&mut self) {
        self.merged_from = None;
        self.previous_position = Some(self.position);
    }

    /// Moves the tile's own coordinate. Slot bookkeeping is the grid's job.
    pub(crate) fn update_position(&mut self, position: Position) {
        self.position = position;
    }
}
