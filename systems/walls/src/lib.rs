#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded wall layout generation.
//!
//! The generator walls the border ring, scatters straight segments that keep
//! a clearance buffer from each other, thickens a random subset of the
//! resulting wall components and finally flags some components as hazardous.
//! Every step respects a wall budget derived from the profile's minimum
//! passable ratio; running out of budget degrades the layout instead of
//! failing.

mod components;

use rand::{
    seq::{index, SliceRandom},
    Rng, SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use sar_mission_core::{
    CellCoord, CellMask, DifficultyProfile, Direction, GridSize, MapLayout, WallTuning,
    SEPARATION_FLOOR,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use components::wall_components;

/// Wall cells produced by one generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WallLayout {
    walls: CellMask,
    hazard_walls: CellMask,
    report: WallReport,
}

impl WallLayout {
    /// Every impassable cell, border ring included.
    #[must_use]
    pub fn walls(&self) -> &CellMask {
        &self.walls
    }

    /// Wall cells flagged as hazardous. Never contains border cells.
    #[must_use]
    pub fn hazard_walls(&self) -> &CellMask {
        &self.hazard_walls
    }

    /// Statistics describing how the run went.
    #[must_use]
    pub fn report(&self) -> &WallReport {
        &self.report
    }

    /// Consumes the layout, yielding walls, hazard walls and the report.
    #[must_use]
    pub fn into_parts(self) -> (CellMask, CellMask, WallReport) {
        (self.walls, self.hazard_walls, self.report)
    }
}

/// Statistics recorded while generating walls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallReport {
    /// Largest number of wall cells the passable ratio allows.
    pub budget: usize,
    /// Segments the profile asked for.
    pub segments_requested: u32,
    /// Segments actually placed.
    pub segments_placed: u32,
    /// Segment attempts rejected by clearance or overlap checks.
    pub failed_attempts: u32,
    /// Components that gained at least one thickening layer.
    pub thickened_components: usize,
    /// Components flagged as hazardous.
    pub hazard_components: usize,
}

/// Builds wall layouts for one profile.
#[derive(Clone, Copy, Debug)]
pub struct WallGenerator<'a> {
    layout: &'a MapLayout,
    tuning: &'a WallTuning,
}

impl<'a> WallGenerator<'a> {
    /// Creates a generator for the provided profile.
    #[must_use]
    pub fn new(profile: &'a DifficultyProfile) -> Self {
        Self::from_parts(&profile.layout, &profile.walls)
    }

    /// Creates a generator from a layout and wall tuning.
    #[must_use]
    pub fn from_parts(layout: &'a MapLayout, tuning: &'a WallTuning) -> Self {
        Self { layout, tuning }
    }

    /// Generates walls from a generator private to this call.
    #[must_use]
    pub fn generate_seeded(&self, seed: u64) -> WallLayout {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(&mut rng)
    }

    /// Generates walls drawing every random decision from `rng`.
    pub fn generate<R>(&self, rng: &mut R) -> WallLayout
    where
        R: Rng + ?Sized,
    {
        let mut state = WallState::new(self.layout, self.tuning);
        state.seed_border();

        let (segments_placed, failed_attempts) = state.place_segments(rng);
        if segments_placed < self.tuning.segment_count {
            debug!(
                requested = self.tuning.segment_count,
                placed = segments_placed,
                failed_attempts,
                budget = state.budget,
                "wall segment target not reached"
            );
        }

        let thickened_components = state.thicken(rng);
        let (hazard_walls, hazard_components) = state.mark_hazards(rng);

        let report = WallReport {
            budget: state.budget,
            segments_requested: self.tuning.segment_count,
            segments_placed,
            failed_attempts,
            thickened_components,
            hazard_components,
        };
        debug!(
            walls = state.walls.len(),
            hazard_walls = hazard_walls.len(),
            thickened_components,
            hazard_components,
            "wall layout generated"
        );

        WallLayout {
            walls: state.walls,
            hazard_walls,
            report,
        }
    }
}

struct WallState<'a> {
    size: GridSize,
    layout: &'a MapLayout,
    tuning: &'a WallTuning,
    walls: CellMask,
    reserved: CellMask,
    anchors: CellMask,
    budget: usize,
}

impl<'a> WallState<'a> {
    fn new(layout: &'a MapLayout, tuning: &'a WallTuning) -> Self {
        let size = layout.size;
        Self {
            size,
            layout,
            tuning,
            walls: CellMask::new(size),
            reserved: CellMask::new(size),
            anchors: CellMask::new(size),
            budget: tuning.wall_budget(size.cell_count()),
        }
    }

    fn remaining_budget(&self) -> usize {
        self.budget.saturating_sub(self.walls.len())
    }

    /// Walls the border ring and reserves clearance around it and the anchors.
    fn seed_border(&mut self) {
        let clearance = self.tuning.wall_clearance;
        let border: Vec<CellCoord> = self.size.border_cells().collect();
        self.walls.extend(border.iter().copied());
        reserve_around(&mut self.reserved, self.size, &border, clearance);

        let start_radius = clearance.max(SEPARATION_FLOOR);
        reserve_around(&mut self.anchors, self.size, &[self.layout.start], start_radius);
        reserve_around(&mut self.anchors, self.size, &self.layout.protected, clearance);
        for cell in self.anchors.iter() {
            let _ = self.reserved.insert(cell);
        }
    }

    fn place_segments<R>(&mut self, rng: &mut R) -> (u32, u32)
    where
        R: Rng + ?Sized,
    {
        let requested = self.tuning.segment_count;
        let max_failures = requested.saturating_mul(self.tuning.attempts_per_segment);
        let lengths = self.tuning.segment_length;
        let (min_length, max_length) = (lengths.min.max(1), lengths.max.max(lengths.min.max(1)));
        let (width, height) = (self.size.width(), self.size.height());

        let mut placed = 0;
        let mut failures = 0;
        if width < 3 || height < 3 {
            return (placed, failures);
        }

        while placed < requested && failures < max_failures && self.remaining_budget() > 0 {
            let origin = CellCoord::new(rng.gen_range(1..width - 1), rng.gen_range(1..height - 1));
            if self.reserved.contains(origin) || origin == self.layout.start {
                failures += 1;
                continue;
            }

            let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            let length = rng.gen_range(min_length..=max_length);
            let Some(mut segment) = self.propose_segment(origin, direction, length) else {
                failures += 1;
                continue;
            };

            segment.truncate(self.remaining_budget());
            self.commit(&segment);
            placed += 1;
        }

        (placed, failures)
    }

    /// Walks a straight segment, rejecting it on any conflict.
    fn propose_segment(
        &self,
        origin: CellCoord,
        direction: Direction,
        length: u32,
    ) -> Option<Vec<CellCoord>> {
        let span = length.min(self.size.width().max(self.size.height()));
        let mut segment = Vec::with_capacity(usize::try_from(span).unwrap_or(0));
        let mut cursor = Some(origin);
        for _ in 0..length {
            let cell = cursor.filter(|cell| self.size.contains(*cell))?;
            if self.layout.is_locked(cell) || self.reserved.contains(cell) || self.walls.contains(cell)
            {
                return None;
            }
            segment.push(cell);
            cursor = cell.step(direction);
        }

        let clearance = self.tuning.wall_clearance;
        let crowded = segment.iter().any(|cell| {
            self.size
                .square(*cell, clearance)
                .any(|nearby| self.walls.contains(nearby))
        });
        if segment.is_empty() || crowded {
            return None;
        }
        Some(segment)
    }

    fn commit(&mut self, cells: &[CellCoord]) {
        self.walls.extend(cells.iter().copied());
        reserve_around(&mut self.reserved, self.size, cells, self.tuning.wall_clearance);
    }

    fn thicken<R>(&mut self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let mut components = wall_components(&self.walls);
        if components.is_empty() {
            return 0;
        }

        let share = (components.len() as f64 * self.tuning.multi_wall_pct).floor() as usize;
        let selected = share.max(1).min(components.len());
        let layers = self.tuning.thickening_layers;
        let max_layers = layers.max.max(layers.min);

        let mut thickened = 0;
        for position in index::sample(rng, components.len(), selected) {
            let layer_count = rng.gen_range(layers.min..=max_layers);
            let component = &mut components[position];
            let mut grew = false;
            for _ in 0..layer_count {
                if self.remaining_budget() == 0 {
                    break;
                }
                if self.grow_layer(component, rng) == 0 {
                    break;
                }
                grew = true;
            }
            if grew {
                thickened += 1;
            }
        }

        thickened
    }

    /// Grows a random share of the component's free rim by one cell.
    ///
    /// Rim cells reserved by another wall's buffer stay free; cells inside the
    /// component's own buffer may be taken. Anchor zones are never grown into.
    fn grow_layer<R>(&mut self, component: &mut Vec<CellCoord>, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let mut own_buffer = CellMask::new(self.size);
        reserve_around(&mut own_buffer, self.size, component, self.tuning.wall_clearance);

        let mut rim = CellMask::new(self.size);
        for cell in component.iter() {
            for neighbor in self.size.neighbors(*cell) {
                if !self.walls.contains(neighbor) {
                    let _ = rim.insert(neighbor);
                }
            }
        }

        let mut eligible: Vec<CellCoord> = rim
            .iter()
            .filter(|cell| !self.anchors.contains(*cell))
            .filter(|cell| !self.reserved.contains(*cell) || own_buffer.contains(*cell))
            .collect();
        if eligible.is_empty() {
            return 0;
        }

        let take = ((eligible.len() as f64 * self.tuning.grow_pct).floor() as usize).max(1);
        eligible.shuffle(rng);
        eligible.truncate(take.min(self.remaining_budget()));
        if eligible.is_empty() {
            return 0;
        }

        self.commit(&eligible);
        component.extend_from_slice(&eligible);
        eligible.len()
    }

    fn mark_hazards<R>(&self, rng: &mut R) -> (CellMask, usize)
    where
        R: Rng + ?Sized,
    {
        let components = wall_components(&self.walls);
        let count = ((components.len() as f64 * self.tuning.orange_wall_pct).floor() as usize)
            .min(components.len());

        let mut hazard = CellMask::new(self.size);
        if count == 0 {
            return (hazard, 0);
        }

        for position in index::sample(rng, components.len(), count) {
            for cell in &components[position] {
                if !self.size.is_border(*cell) {
                    let _ = hazard.insert(*cell);
                }
            }
        }
        (hazard, count)
    }
}

fn reserve_around(mask: &mut CellMask, size: GridSize, cells: &[CellCoord], radius: u32) {
    for cell in cells {
        mask.extend(size.square(*cell, radius));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sar_mission_core::CountRange;

    fn open_layout(width: u32, height: u32) -> MapLayout {
        MapLayout {
            size: GridSize::new(width, height),
            start: CellCoord::new(2, 2),
            protected: Vec::new(),
        }
    }

    #[test]
    fn proposed_segment_stops_at_grid_edge() {
        let layout = open_layout(12, 12);
        let tuning = WallTuning {
            wall_clearance: 0,
            ..WallTuning::default()
        };
        let state = WallState::new(&layout, &tuning);

        let accepted = state.propose_segment(CellCoord::new(6, 6), Direction::East, 3);
        assert_eq!(
            accepted,
            Some(vec![
                CellCoord::new(6, 6),
                CellCoord::new(7, 6),
                CellCoord::new(8, 6),
            ])
        );
        assert_eq!(
            state.propose_segment(CellCoord::new(10, 6), Direction::East, 3),
            None
        );
        assert_eq!(
            state.propose_segment(CellCoord::new(1, 6), Direction::West, 3),
            None
        );
    }

    #[test]
    fn proposed_segment_respects_clearance_from_walls() {
        let layout = open_layout(16, 16);
        let tuning = WallTuning {
            wall_clearance: 2,
            ..WallTuning::default()
        };
        let mut state = WallState::new(&layout, &tuning);
        let _ = state.walls.insert(CellCoord::new(8, 8));

        assert_eq!(
            state.propose_segment(CellCoord::new(8, 10), Direction::South, 2),
            None
        );
        assert!(state
            .propose_segment(CellCoord::new(8, 11), Direction::South, 2)
            .is_some());
    }

    #[test]
    fn proposed_segment_never_covers_start() {
        let layout = open_layout(12, 12);
        let tuning = WallTuning {
            wall_clearance: 0,
            ..WallTuning::default()
        };
        let state = WallState::new(&layout, &tuning);

        assert_eq!(
            state.propose_segment(CellCoord::new(2, 4), Direction::North, 4),
            None
        );
    }

    #[test]
    fn thickening_never_enters_anchor_zone() {
        let layout = open_layout(12, 12);
        let tuning = WallTuning {
            segment_count: 0,
            multi_wall_pct: 1.0,
            thickening_layers: CountRange::new(4, 4),
            grow_pct: 1.0,
            min_passable_ratio: 0.0,
            ..WallTuning::default()
        };
        let mut state = WallState::new(&layout, &tuning);
        state.seed_border();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let _ = state.thicken(&mut rng);

        for cell in state.anchors.iter().filter(|cell| !layout.size.is_border(*cell)) {
            assert!(!state.walls.contains(cell), "anchor cell {cell} was walled");
        }
        assert!(state.walls.len() > layout.size.border_count());
    }

    #[test]
    fn hazards_exclude_border() {
        let layout = open_layout(10, 10);
        let tuning = WallTuning {
            orange_wall_pct: 1.0,
            ..WallTuning::default()
        };
        let mut state = WallState::new(&layout, &tuning);
        state.seed_border();
        let _ = state.walls.insert(CellCoord::new(6, 6));
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let (hazard, count) = state.mark_hazards(&mut rng);

        assert_eq!(count, 2);
        assert_eq!(hazard.iter().collect::<Vec<_>>(), vec![CellCoord::new(6, 6)]);
    }
}
