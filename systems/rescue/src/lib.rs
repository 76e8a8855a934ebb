#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rescue point selection.

use rand::{seq::index, Rng};
use sar_mission_core::{CellCoord, CellMask};
use tracing::{debug, warn};

/// Samples rescue points from the free cells left after victim placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RescuePointSelector {
    count: usize,
}

impl RescuePointSelector {
    /// Creates a selector that picks up to `count` rescue points.
    #[must_use]
    pub const fn new(count: usize) -> Self {
        Self { count }
    }

    /// Number of rescue points the selector asks for.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Uniformly samples distinct cells from `passable \ excluded`.
    ///
    /// Returns every candidate when fewer than the requested count remain.
    pub fn select<R>(&self, passable: &CellMask, excluded: &CellMask, rng: &mut R) -> Vec<CellCoord>
    where
        R: Rng + ?Sized,
    {
        let candidates: Vec<CellCoord> = passable
            .iter()
            .filter(|cell| !excluded.contains(*cell))
            .collect();
        let amount = self.count.min(candidates.len());
        if amount < self.count {
            warn!(
                requested = self.count,
                available = candidates.len(),
                "not enough free cells for rescue points"
            );
        }

        let points: Vec<CellCoord> = index::sample(rng, candidates.len(), amount)
            .into_iter()
            .map(|position| candidates[position])
            .collect();
        debug!(rescue_points = points.len(), "rescue points selected");
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sar_mission_core::GridSize;

    #[test]
    fn zero_count_selects_nothing() {
        let size = GridSize::new(4, 4);
        let passable = CellMask::from_cells(size, size.cells());
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let points = RescuePointSelector::new(0).select(&passable, &CellMask::new(size), &mut rng);

        assert!(points.is_empty());
    }

    #[test]
    fn excluded_cells_are_never_selected() {
        let size = GridSize::new(4, 1);
        let passable = CellMask::from_cells(size, size.cells());
        let excluded = CellMask::from_cells(size, [CellCoord::new(0, 0), CellCoord::new(2, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let mut points = RescuePointSelector::new(5).select(&passable, &excluded, &mut rng);
        points.sort();

        assert_eq!(points, vec![CellCoord::new(1, 0), CellCoord::new(3, 0)]);
    }
}
