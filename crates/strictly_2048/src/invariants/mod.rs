//! First-class grid invariants.
//!
//! Invariants are logical properties that must hold after every move.
//! The engine checks them in debug builds; they are also testable on their own.

mod coordinates;
mod merge_provenance;
mod tile_values;

pub use coordinates::CoordinatesConsistentInvariant;
pub use merge_provenance::MergeProvenanceInvariant;
pub use tile_values::TileValuesInvariant;

use crate::Grid;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Every grid invariant as a composable set.
pub type GridInvariants = (
    CoordinatesConsistentInvariant,
    TileValuesInvariant,
    MergeProvenanceInvariant,
);

/// Asserts that all grid invariants hold (panics on violation in debug builds).
pub fn assert_invariants(grid: &Grid) {
    debug_assert!(
        GridInvariants::check_all(grid).is_ok(),
        "Grid invariants violated: {:?}",
        GridInvariants::check_all(grid).err()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Position, Tile, rules};

    #[test]
    fn test_invariant_set_holds_for_empty_grid() {
        assert!(GridInvariants::check_all(&Grid::new(4)).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_moves() {
        let mut grid = Grid::from_flat(&[
            2, 2, 4, 4, //
            0, 2, 0, 2, //
            8, 8, 8, 8, //
            0, 0, 0, 16,
        ])
        .expect("valid board");

        for direction in Direction::all() {
            rules::resolve_move(&mut grid, direction, 65536);
            assert!(GridInvariants::check_all(&grid).is_ok(), "after {direction}");
        }
    }

    #[test]
    fn test_invariant_set_reports_each_violation() {
        let mut grid = Grid::new(4);
        grid.insert(Tile::new(Position::new(0, 0), 3));

        let violations = GridInvariants::check_all(&grid).expect_err("bad value");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].description, TileValuesInvariant::description());
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (CoordinatesConsistentInvariant, TileValuesInvariant);
        assert!(TwoInvariants::check_all(&Grid::new(3)).is_ok());
    }
}
