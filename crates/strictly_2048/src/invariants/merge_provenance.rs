//! Merge provenance: each merge consumed two fresh, equal tiles.

use super::Invariant;
use crate::Grid;

/// Invariant: a merge product holds exactly two sources of half its value,
/// and neither source was itself produced by a merge during the same move.
///
/// This is the merge-once rule seen from the result side.
pub struct MergeProvenanceInvariant;

impl Invariant<Grid> for MergeProvenanceInvariant {
    fn holds(grid: &Grid) -> bool {
        grid.tiles().all(|tile| match tile.merged_from() {
            None => true,
            Some(sources) => sources.iter().all(|source| {
                source.value() * 2 == tile.value()
                    && !source.is_merge_product()
                    && source.position() == tile.position()
            }),
        })
    }

    fn description() -> &'static str {
        "Merged tiles come from two unmerged tiles of half the value"
    }
}
