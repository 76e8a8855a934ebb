//! Local topology scoring for high-tier candidates.

use sar_mission_core::{CellCoord, CellMask, Direction, HardnessWeights};

/// Ranks candidate cells by how hard they are to reach and search.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HardnessScorer<'a> {
    passable: &'a CellMask,
    weights: HardnessWeights,
    max_distance: u32,
}

impl<'a> HardnessScorer<'a> {
    pub(crate) fn new(passable: &'a CellMask, weights: HardnessWeights, max_distance: u32) -> Self {
        Self {
            passable,
            weights,
            max_distance,
        }
    }

    /// Additive score: weighted normalised distance plus topology bonuses.
    pub(crate) fn score(&self, cell: CellCoord, distance: u32) -> f64 {
        let normalised = if self.max_distance > 0 {
            f64::from(distance) / f64::from(self.max_distance)
        } else {
            0.0
        };

        let open = self.open_sides(cell);
        let degree = open.iter().filter(|side| **side).count();
        let mut score = self.weights.distance * normalised;
        if degree == 1 {
            score += self.weights.dead_end;
        }
        if is_straight_corridor(open) {
            score += self.weights.corridor;
        }
        if Direction::ALL.len() - degree >= 2 {
            score += self.weights.near_wall;
        }
        score
    }

    fn open_sides(&self, cell: CellCoord) -> [bool; 4] {
        Direction::ALL.map(|direction| {
            cell.step(direction)
                .is_some_and(|next| self.passable.contains(next))
        })
    }
}

/// Exactly two open sides and they face each other.
fn is_straight_corridor(open: [bool; 4]) -> bool {
    let [north, east, south, west] = open;
    (north && south && !east && !west) || (east && west && !north && !south)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sar_mission_core::GridSize;

    fn weights() -> HardnessWeights {
        HardnessWeights {
            distance: 1.0,
            dead_end: 0.8,
            corridor: 0.4,
            near_wall: 0.2,
        }
    }

    fn corridor_mask() -> CellMask {
        // A single horizontal corridor along row 1 of a 6x3 grid.
        let size = GridSize::new(6, 3);
        CellMask::from_cells(size, (1..5).map(|column| CellCoord::new(column, 1)))
    }

    #[test]
    fn dead_end_collects_dead_end_and_near_wall_bonus() {
        let passable = corridor_mask();
        let scorer = HardnessScorer::new(&passable, weights(), 4);

        let score = scorer.score(CellCoord::new(4, 1), 4);

        assert!((score - (1.0 + 0.8 + 0.2)).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn straight_corridor_collects_corridor_bonus() {
        let passable = corridor_mask();
        let scorer = HardnessScorer::new(&passable, weights(), 4);

        let score = scorer.score(CellCoord::new(2, 1), 2);

        assert!((score - (0.5 + 0.4 + 0.2)).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn bend_is_not_a_corridor() {
        assert!(!is_straight_corridor([true, true, false, false]));
        assert!(is_straight_corridor([false, true, false, true]));
        assert!(!is_straight_corridor([true, true, true, true]));
    }

    #[test]
    fn open_room_scores_distance_only() {
        let size = GridSize::new(5, 5);
        let passable = CellMask::from_cells(size, size.cells());
        let scorer = HardnessScorer::new(&passable, weights(), 0);

        assert_eq!(scorer.score(CellCoord::new(2, 2), 3), 0.0);
    }
}
