#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tiered victim placement.
//!
//! High-tier victims are drawn from the far end of the distance field, ranked
//! by a hardness score and kept apart by a Chebyshev separation that relaxes
//! only when a full sector pass makes no progress. Medium and low tiers share
//! the same sector quota mechanism without scoring or spacing. Shortfalls are
//! reported and logged, never raised as errors.

mod hardness;
mod sectors;

use rand::{seq::SliceRandom, Rng};
use sar_mission_core::{
    CellCoord, CellMask, DifficultyProfile, DistanceMap, GridSize, MapLayout, SectorGrid,
    VictimMap, VictimTier, VictimTuning, SEPARATION_FLOOR,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    hardness::HardnessScorer,
    sectors::{bucket_by_sector, SectorPlan},
};

/// Far sets smaller than this are always extended toward nearer cells.
const MIN_FAR_SET: usize = 8;

/// Victims chosen by one placement run.
#[derive(Clone, Debug, PartialEq)]
pub struct VictimPlacement {
    victims: VictimMap,
    report: VictimReport,
}

impl VictimPlacement {
    /// Tier assignment of every placed victim.
    #[must_use]
    pub fn victims(&self) -> &VictimMap {
        &self.victims
    }

    /// Requested and placed counts per tier.
    #[must_use]
    pub fn report(&self) -> &VictimReport {
        &self.report
    }

    /// Consumes the placement, yielding the victim map and the report.
    #[must_use]
    pub fn into_parts(self) -> (VictimMap, VictimReport) {
        (self.victims, self.report)
    }
}

/// Requested and placed counts for one tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TierOutcome {
    /// Victims the profile asked for.
    pub requested: usize,
    /// Victims actually placed.
    pub placed: usize,
}

impl TierOutcome {
    /// Victims that could not be placed.
    #[must_use]
    pub const fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.placed)
    }
}

/// Statistics recorded while placing victims.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VictimReport {
    /// High-tier outcome.
    pub high: TierOutcome,
    /// Medium-tier outcome.
    pub medium: TierOutcome,
    /// Low-tier outcome.
    pub low: TierOutcome,
    /// Separation in effect when the greedy high-tier passes stopped.
    pub final_separation: u32,
    /// High-tier victims placed by the floor-separation fallback.
    pub fallback_placements: usize,
}

impl VictimReport {
    /// Outcome recorded for the provided tier.
    #[must_use]
    pub const fn tier(&self, tier: VictimTier) -> TierOutcome {
        match tier {
            VictimTier::High => self.high,
            VictimTier::Medium => self.medium,
            VictimTier::Low => self.low,
        }
    }

    fn tier_mut(&mut self, tier: VictimTier) -> &mut TierOutcome {
        match tier {
            VictimTier::High => &mut self.high,
            VictimTier::Medium => &mut self.medium,
            VictimTier::Low => &mut self.low,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Candidate {
    cell: CellCoord,
    distance: u32,
}

/// Places tiered victims for one profile.
#[derive(Clone, Copy, Debug)]
pub struct VictimPlacer<'a> {
    layout: &'a MapLayout,
    tuning: &'a VictimTuning,
}

impl<'a> VictimPlacer<'a> {
    /// Creates a placer for the provided profile.
    #[must_use]
    pub fn new(profile: &'a DifficultyProfile) -> Self {
        Self::from_parts(&profile.layout, &profile.victims)
    }

    /// Creates a placer from a layout and victim tuning.
    #[must_use]
    pub fn from_parts(layout: &'a MapLayout, tuning: &'a VictimTuning) -> Self {
        Self { layout, tuning }
    }

    /// Assigns victims to passable cells.
    ///
    /// `distances` must be measured from the layout's start cell over
    /// `passable`. Passable cells missing from `distances` are still used,
    /// but only after every reachable cell.
    pub fn place<R>(&self, distances: &DistanceMap, passable: &CellMask, rng: &mut R) -> VictimPlacement
    where
        R: Rng + ?Sized,
    {
        let targets = self.tuning.targets;
        let mut report = VictimReport {
            final_separation: self.tuning.separation,
            ..VictimReport::default()
        };
        for tier in VictimTier::ALL {
            report.tier_mut(tier).requested = targets.get(tier);
        }

        let mut victims = VictimMap::new();
        let pool = self.candidate_pool(distances, passable, rng);
        if !pool.is_empty() {
            for cell in self.place_high(&pool, passable, &mut report, rng) {
                let _ = victims.insert(cell, VictimTier::High);
            }

            let mut rest: Vec<CellCoord> = pool
                .iter()
                .map(|candidate| candidate.cell)
                .filter(|cell| !victims.contains(*cell))
                .collect();
            rest.shuffle(rng);

            for tier in [VictimTier::Medium, VictimTier::Low] {
                let chosen = distribute(
                    &rest,
                    targets.get(tier),
                    self.tuning.sectors(tier),
                    passable.size(),
                    rng,
                );
                for cell in chosen {
                    let _ = victims.insert(cell, tier);
                }
                rest.retain(|cell| !victims.contains(*cell));
            }
        }

        for tier in VictimTier::ALL {
            let outcome = report.tier_mut(tier);
            outcome.placed = victims.count(tier);
            if outcome.shortfall() > 0 {
                warn!(
                    tier = tier.label(),
                    requested = outcome.requested,
                    placed = outcome.placed,
                    "victim tier target not reached"
                );
            }
        }
        debug!(
            victims = victims.len(),
            pool = pool.len(),
            final_separation = report.final_separation,
            fallback_placements = report.fallback_placements,
            "victims placed"
        );

        VictimPlacement { victims, report }
    }

    /// Reachable cells in row-major order followed by stranded passable cells
    /// in random order. Start and protected cells never enter the pool.
    fn candidate_pool<R>(
        &self,
        distances: &DistanceMap,
        passable: &CellMask,
        rng: &mut R,
    ) -> Vec<Candidate>
    where
        R: Rng + ?Sized,
    {
        let mut pool: Vec<Candidate> = distances
            .iter()
            .filter(|(cell, _)| passable.contains(*cell) && !self.layout.is_locked(*cell))
            .map(|(cell, distance)| Candidate { cell, distance })
            .collect();

        let mut stranded: Vec<CellCoord> = passable
            .iter()
            .filter(|cell| !distances.contains(*cell) && !self.layout.is_locked(*cell))
            .collect();
        stranded.shuffle(rng);
        pool.extend(
            stranded
                .into_iter()
                .map(|cell| Candidate { cell, distance: 0 }),
        );
        pool
    }

    /// Candidates at or beyond the `far_quantile` distance cutoff.
    ///
    /// Sets smaller than `max(target, 8)` are extended with every remaining
    /// candidate, farthest first.
    fn far_set(&self, pool: &[Candidate], target: usize) -> Vec<Candidate> {
        let mut ranked = pool.to_vec();
        ranked.sort_by_key(|candidate| candidate.distance);

        let cutoff_index = (ranked.len() as f64 * self.tuning.far_quantile).floor() as usize;
        let cutoff = ranked.get(cutoff_index).map_or(0, |candidate| candidate.distance);
        let mut far: Vec<Candidate> = ranked
            .iter()
            .filter(|candidate| candidate.distance >= cutoff)
            .copied()
            .collect();

        if far.len() < target.max(MIN_FAR_SET) {
            far.extend(
                ranked
                    .iter()
                    .rev()
                    .filter(|candidate| candidate.distance < cutoff)
                    .copied(),
            );
        }
        far
    }

    fn place_high<R>(
        &self,
        pool: &[Candidate],
        passable: &CellMask,
        report: &mut VictimReport,
        rng: &mut R,
    ) -> Vec<CellCoord>
    where
        R: Rng + ?Sized,
    {
        let target = self.tuning.targets.high;
        if target == 0 {
            return Vec::new();
        }

        let size = passable.size();
        let far = self.far_set(pool, target);
        let max_distance = pool.iter().map(|candidate| candidate.distance).max().unwrap_or(0);
        let scorer = HardnessScorer::new(passable, self.tuning.hardness, max_distance);
        let score = |candidate: &Candidate| (candidate.cell, scorer.score(candidate.cell, candidate.distance));

        let grid = self.tuning.high_sectors;
        let mut buckets = bucket_by_sector(far.iter().map(score), |entry| entry.0, grid, size);
        for bucket in &mut buckets {
            bucket.sort_by(|left, right| right.1.total_cmp(&left.1));
        }

        let mut plan = SectorPlan::new(grid.count(), target, rng);
        let order = plan.order().to_vec();
        let mut placed: Vec<CellCoord> = Vec::with_capacity(target);
        let mut separation = self.tuning.separation;

        while placed.len() < target && separation >= SEPARATION_FLOOR {
            let mut progressed = false;
            for &sector in &order {
                if placed.len() >= target || plan.remaining(sector) == 0 {
                    continue;
                }
                let bucket = &mut buckets[sector];
                let pick = bucket
                    .iter()
                    .position(|(cell, _)| is_spaced(*cell, &placed, separation));
                if let Some(position) = pick {
                    let (cell, _) = bucket.remove(position);
                    placed.push(cell);
                    plan.consume(sector);
                    progressed = true;
                }
            }
            if !progressed {
                debug!(separation, placed = placed.len(), "relaxing high tier separation");
                separation -= 1;
            }
        }
        report.final_separation = separation.max(SEPARATION_FLOOR);

        if placed.len() < target {
            let before = placed.len();
            self.fill_fallback(pool, &far, &score, size, target, &mut placed);
            report.fallback_placements = placed.len() - before;
        }

        placed
    }

    /// Fills leftover high-tier slots at the floor separation.
    ///
    /// Unused far-set cells are tried first, then every other pool cell, each
    /// group ordered by descending score.
    fn fill_fallback(
        &self,
        pool: &[Candidate],
        far: &[Candidate],
        score: &dyn Fn(&Candidate) -> (CellCoord, f64),
        size: GridSize,
        target: usize,
        placed: &mut Vec<CellCoord>,
    ) {
        let taken = CellMask::from_cells(size, placed.iter().copied());
        let far_cells = CellMask::from_cells(size, far.iter().map(|candidate| candidate.cell));
        let by_score = |mut entries: Vec<(CellCoord, f64)>| -> Vec<(CellCoord, f64)> {
            entries.sort_by(|left, right| right.1.total_cmp(&left.1));
            entries
        };

        let unused_far = by_score(
            far.iter()
                .filter(|candidate| !taken.contains(candidate.cell))
                .map(score)
                .collect(),
        );
        let others = by_score(
            pool.iter()
                .filter(|candidate| {
                    !taken.contains(candidate.cell) && !far_cells.contains(candidate.cell)
                })
                .map(score)
                .collect(),
        );

        for (cell, _) in unused_far.into_iter().chain(others) {
            if placed.len() >= target {
                break;
            }
            if is_spaced(cell, placed, SEPARATION_FLOOR) {
                placed.push(cell);
            }
        }
    }
}

fn is_spaced(cell: CellCoord, placed: &[CellCoord], separation: u32) -> bool {
    placed
        .iter()
        .all(|other| other.chebyshev_distance(cell) >= separation)
}

/// Spreads up to `target` cells over the sector grid without scoring.
///
/// A sector with fewer candidates than its quota simply places fewer.
fn distribute<R>(
    candidates: &[CellCoord],
    target: usize,
    grid: SectorGrid,
    size: GridSize,
    rng: &mut R,
) -> Vec<CellCoord>
where
    R: Rng + ?Sized,
{
    if candidates.is_empty() || target == 0 {
        return Vec::new();
    }

    let mut buckets = bucket_by_sector(candidates.iter().copied(), |cell| *cell, grid, size);
    let mut plan = SectorPlan::new(grid.count(), target, rng);
    let order = plan.order().to_vec();
    let mut chosen = Vec::with_capacity(target);

    for sector in order {
        let bucket = &mut buckets[sector];
        bucket.shuffle(rng);
        for cell in bucket.iter() {
            if chosen.len() >= target || plan.remaining(sector) == 0 {
                break;
            }
            chosen.push(*cell);
            plan.consume(sector);
        }
    }

    chosen
}
