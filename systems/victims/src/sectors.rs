//! Sector quotas used to spread every tier across the grid.

use rand::{seq::SliceRandom, Rng};
use sar_mission_core::{CellCoord, GridSize, SectorGrid};

/// Per-sector placement quotas visited in a shuffled order.
///
/// Quotas always sum to the requested target. The `target % sectors` extra
/// units go to the first sectors of the shuffled order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SectorPlan {
    order: Vec<usize>,
    quotas: Vec<usize>,
}

impl SectorPlan {
    pub(crate) fn new<R>(sector_count: usize, target: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut order: Vec<usize> = (0..sector_count).collect();
        order.shuffle(rng);

        let mut quotas = vec![0; sector_count];
        if sector_count > 0 {
            let base = target / sector_count;
            let remainder = target % sector_count;
            for (position, sector) in order.iter().enumerate() {
                quotas[*sector] = base + usize::from(position < remainder);
            }
        }

        Self { order, quotas }
    }

    pub(crate) fn order(&self) -> &[usize] {
        &self.order
    }

    pub(crate) fn remaining(&self, sector: usize) -> usize {
        self.quotas.get(sector).copied().unwrap_or(0)
    }

    pub(crate) fn consume(&mut self, sector: usize) {
        if let Some(quota) = self.quotas.get_mut(sector) {
            *quota = quota.saturating_sub(1);
        }
    }
}

/// Groups items by the sector of their cell, keeping input order per sector.
pub(crate) fn bucket_by_sector<T>(
    items: impl IntoIterator<Item = T>,
    cell_of: impl Fn(&T) -> CellCoord,
    grid: SectorGrid,
    size: GridSize,
) -> Vec<Vec<T>> {
    let mut buckets: Vec<Vec<T>> = (0..grid.count()).map(|_| Vec::new()).collect();
    for item in items {
        let sector = grid.sector_of(cell_of(&item), size);
        if let Some(bucket) = buckets.get_mut(sector) {
            bucket.push(item);
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn quotas_sum_to_target_and_differ_by_at_most_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for target in [0, 1, 15, 30, 81, 100] {
            let plan = SectorPlan::new(9, target, &mut rng);
            let quotas: Vec<usize> = (0..9).map(|sector| plan.remaining(sector)).collect();
            assert_eq!(quotas.iter().sum::<usize>(), target);
            let min = quotas.iter().min().copied().unwrap_or(0);
            let max = quotas.iter().max().copied().unwrap_or(0);
            assert!(max - min <= 1, "uneven quotas {quotas:?}");
        }
    }

    #[test]
    fn extra_units_follow_shuffled_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let plan = SectorPlan::new(4, 6, &mut rng);
        let order = plan.order().to_vec();
        assert_eq!(plan.remaining(order[0]), 2);
        assert_eq!(plan.remaining(order[1]), 2);
        assert_eq!(plan.remaining(order[2]), 1);
        assert_eq!(plan.remaining(order[3]), 1);
    }

    #[test]
    fn remainder_is_not_biased_to_low_sectors() {
        let mut winners = std::collections::BTreeSet::new();
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let plan = SectorPlan::new(9, 1, &mut rng);
            let winner = (0..9).find(|sector| plan.remaining(*sector) == 1);
            let _ = winners.insert(winner);
        }
        assert!(winners.len() > 3, "remainder landed only in {winners:?}");
    }

    #[test]
    fn consume_saturates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut plan = SectorPlan::new(1, 1, &mut rng);
        plan.consume(0);
        plan.consume(0);
        plan.consume(7);
        assert_eq!(plan.remaining(0), 0);
    }

    #[test]
    fn buckets_keep_input_order() {
        let size = GridSize::new(4, 4);
        let cells = [
            CellCoord::new(3, 3),
            CellCoord::new(0, 0),
            CellCoord::new(2, 0),
            CellCoord::new(1, 1),
        ];
        let buckets = bucket_by_sector(cells, |cell| *cell, SectorGrid::new(2, 2), size);
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0], vec![CellCoord::new(0, 0), CellCoord::new(1, 1)]);
        assert_eq!(buckets[1], vec![CellCoord::new(2, 0)]);
        assert!(buckets[2].is_empty());
        assert_eq!(buckets[3], vec![CellCoord::new(3, 3)]);
    }
}
