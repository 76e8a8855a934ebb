//! Immutable result of one generation run.

use sar_mission_core::{CellClass, CellCoord, CellMask, DistanceMap, GridSize, VictimMap, VictimTier};
use sar_mission_system_victims::VictimReport;
use sar_mission_system_walls::WallReport;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Statistics describing how far each stage got toward its targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Wall stage statistics.
    pub walls: WallReport,
    /// Victim stage statistics.
    pub victims: VictimReport,
    /// Rescue points the profile asked for.
    pub rescue_points_requested: usize,
    /// Rescue points actually selected.
    pub rescue_points_placed: usize,
}

/// Defects in a snapshot that correct generation never produces.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InvariantViolation {
    /// A snapshot component covers a different grid than the snapshot.
    #[error("{component} covers a {found_width}x{found_height} grid instead of {width}x{height}")]
    SizeMismatch {
        /// Component with the wrong dimensions.
        component: &'static str,
        /// Snapshot width.
        width: u32,
        /// Snapshot height.
        height: u32,
        /// Component width.
        found_width: u32,
        /// Component height.
        found_height: u32,
    },
    /// The start cell is a wall.
    #[error("start cell {cell} is a wall")]
    StartIsWall {
        /// Start cell.
        cell: CellCoord,
    },
    /// A protected cell is a wall.
    #[error("protected cell {cell} is a wall")]
    ProtectedCellIsWall {
        /// Offending protected cell.
        cell: CellCoord,
    },
    /// A border cell is passable.
    #[error("border cell {cell} is not a wall")]
    BorderOpen {
        /// Offending border cell.
        cell: CellCoord,
    },
    /// A hazard wall is not a wall.
    #[error("hazard cell {cell} is not a wall")]
    HazardOutsideWalls {
        /// Offending hazard cell.
        cell: CellCoord,
    },
    /// A hazard wall lies on the border ring.
    #[error("hazard cell {cell} lies on the border ring")]
    HazardOnBorder {
        /// Offending hazard cell.
        cell: CellCoord,
    },
    /// Fewer cells are passable than the profile requires.
    #[error("only {passable} of {total} cells are passable; the minimum ratio is {minimum}")]
    PassableRatioBelowMinimum {
        /// Passable cell count.
        passable: usize,
        /// Total cell count.
        total: usize,
        /// Configured minimum ratio.
        minimum: f64,
    },
    /// The wall set holds more cells than the grid.
    #[error("wall set holds {walls} cells but the grid only has {total}")]
    WallCountExceedsGrid {
        /// Number of wall cells.
        walls: usize,
        /// Number of grid cells.
        total: usize,
    },
    /// The recorded passable count disagrees with the wall set.
    #[error("recorded {recorded} passable cells but the wall set leaves {actual}")]
    PassableCountMismatch {
        /// Count stored in the snapshot.
        recorded: usize,
        /// Count derived from the wall set.
        actual: usize,
    },
    /// The distance field does not place the start at distance zero.
    #[error("distance field does not start at {cell} with distance zero")]
    DistanceFieldMisrooted {
        /// Start cell.
        cell: CellCoord,
    },
    /// A reachable cell has no neighbour one step closer to the start.
    #[error("cell {cell} at distance {distance} has no neighbour one step closer")]
    DistanceGap {
        /// Offending cell.
        cell: CellCoord,
        /// Recorded distance.
        distance: u32,
    },
    /// A victim sits on a wall.
    #[error("victim at {cell} sits on a wall")]
    VictimOnWall {
        /// Offending victim cell.
        cell: CellCoord,
    },
    /// A victim sits on the start or a protected cell.
    #[error("victim at {cell} sits on a locked cell")]
    VictimOnLockedCell {
        /// Offending victim cell.
        cell: CellCoord,
    },
    /// More victims of a tier were placed than requested.
    #[error("{placed} {tier} victims placed but only {requested} requested")]
    TierExceedsTarget {
        /// Offending tier.
        tier: VictimTier,
        /// Victims placed.
        placed: usize,
        /// Victims requested.
        requested: usize,
    },
    /// A rescue point sits on a wall.
    #[error("rescue point {cell} sits on a wall")]
    RescuePointOnWall {
        /// Offending rescue point.
        cell: CellCoord,
    },
    /// A rescue point shares a cell with a victim, the start or a protected cell.
    #[error("rescue point {cell} overlaps a victim or locked cell")]
    RescuePointOccupied {
        /// Offending rescue point.
        cell: CellCoord,
    },
    /// The same rescue point appears twice.
    #[error("rescue point {cell} is listed twice")]
    DuplicateRescuePoint {
        /// Repeated rescue point.
        cell: CellCoord,
    },
}

/// Fully formed map returned to the host.
///
/// Snapshots are never mutated after construction, so they can be shared
/// freely between threads and viewers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    difficulty: String,
    seed: u64,
    size: GridSize,
    start: CellCoord,
    protected: Vec<CellCoord>,
    min_passable_ratio: f64,
    walls: CellMask,
    hazard_walls: CellMask,
    victims: VictimMap,
    rescue_points: Vec<CellCoord>,
    passable_count: usize,
    distances: DistanceMap,
    report: GenerationReport,
}

/// Everything the orchestrator hands over to build a snapshot.
#[derive(Clone, Debug)]
pub(crate) struct SnapshotParts {
    pub(crate) difficulty: String,
    pub(crate) seed: u64,
    pub(crate) start: CellCoord,
    pub(crate) protected: Vec<CellCoord>,
    pub(crate) min_passable_ratio: f64,
    pub(crate) walls: CellMask,
    pub(crate) hazard_walls: CellMask,
    pub(crate) victims: VictimMap,
    pub(crate) rescue_points: Vec<CellCoord>,
    pub(crate) distances: DistanceMap,
    pub(crate) report: GenerationReport,
}

impl MapSnapshot {
    pub(crate) fn from_parts(parts: SnapshotParts) -> Self {
        let size = parts.walls.size();
        let passable_count = size.cell_count().saturating_sub(parts.walls.len());
        Self {
            difficulty: parts.difficulty,
            seed: parts.seed,
            size,
            start: parts.start,
            protected: parts.protected,
            min_passable_ratio: parts.min_passable_ratio,
            walls: parts.walls,
            hazard_walls: parts.hazard_walls,
            victims: parts.victims,
            rescue_points: parts.rescue_points,
            passable_count,
            distances: parts.distances,
            report: parts.report,
        }
    }

    /// Name of the difficulty profile that produced the map.
    #[must_use]
    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    /// Seed the map was generated from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Mission start cell.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Cells that are never walled or assigned a victim.
    #[must_use]
    pub fn protected(&self) -> &[CellCoord] {
        &self.protected
    }

    /// Minimum passable ratio the profile demanded.
    #[must_use]
    pub const fn min_passable_ratio(&self) -> f64 {
        self.min_passable_ratio
    }

    /// Every impassable cell.
    #[must_use]
    pub fn walls(&self) -> &CellMask {
        &self.walls
    }

    /// Wall cells flagged as hazardous.
    #[must_use]
    pub fn hazard_walls(&self) -> &CellMask {
        &self.hazard_walls
    }

    /// Tier assignment of every victim.
    #[must_use]
    pub fn victims(&self) -> &VictimMap {
        &self.victims
    }

    /// Reports whether the cell is a wall. Cells outside the grid are walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        !self.size.contains(cell) || self.walls.contains(cell)
    }

    /// Reports whether the cell is a hazardous wall.
    #[must_use]
    pub fn is_hazard_wall(&self, cell: CellCoord) -> bool {
        self.hazard_walls.contains(cell)
    }

    /// Tier of the victim occupying the cell.
    #[must_use]
    pub fn victim_at(&self, cell: CellCoord) -> Option<VictimTier> {
        self.victims.get(cell)
    }

    /// Rescue points in selection order.
    #[must_use]
    pub fn rescue_points(&self) -> &[CellCoord] {
        &self.rescue_points
    }

    /// Number of passable cells.
    #[must_use]
    pub const fn passable_count(&self) -> usize {
        self.passable_count
    }

    /// Share of the grid that is passable.
    #[must_use]
    pub fn passable_ratio(&self) -> f64 {
        let total = self.size.cell_count();
        if total == 0 {
            return 0.0;
        }
        self.passable_count as f64 / total as f64
    }

    /// Step distance from the start, or `None` when the cell is unreachable.
    #[must_use]
    pub fn distance_from_start(&self, cell: CellCoord) -> Option<u32> {
        self.distances.get(cell)
    }

    /// Full distance field rooted at the start.
    #[must_use]
    pub fn distances(&self) -> &DistanceMap {
        &self.distances
    }

    /// Statistics gathered while generating the map.
    #[must_use]
    pub const fn report(&self) -> &GenerationReport {
        &self.report
    }

    /// Classification of a single cell, or `None` outside the grid.
    ///
    /// Precedence is start, victim, rescue point, hazard wall, wall, free.
    #[must_use]
    pub fn cell_class(&self, cell: CellCoord) -> Option<CellClass> {
        if !self.size.contains(cell) {
            return None;
        }
        let class = if cell == self.start {
            CellClass::Start
        } else if let Some(tier) = self.victims.get(cell) {
            CellClass::Victim(tier)
        } else if self.rescue_points.contains(&cell) {
            CellClass::RescuePoint
        } else if self.hazard_walls.contains(cell) {
            CellClass::HazardWall
        } else if self.walls.contains(cell) {
            CellClass::Wall
        } else {
            CellClass::Free
        };
        Some(class)
    }

    /// Row-major classification codes, one row per grid row.
    #[must_use]
    pub fn matrix(&self) -> Vec<Vec<u8>> {
        let width = usize::try_from(self.size.width()).unwrap_or(0).max(1);
        self.codes().chunks(width).map(<[u8]>::to_vec).collect()
    }

    /// Row-major classification codes flattened into one buffer.
    #[must_use]
    pub fn codes(&self) -> Vec<u8> {
        self.size
            .cells()
            .filter_map(|cell| self.cell_class(cell))
            .map(CellClass::code)
            .collect()
    }

    /// Checks every structural invariant of a generated map.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        self.verify_sizes()?;
        self.verify_walls()?;
        self.verify_distances()?;
        self.verify_victims()?;
        self.verify_rescue_points()
    }

    fn verify_sizes(&self) -> Result<(), InvariantViolation> {
        let components = [
            ("walls", self.walls.size()),
            ("hazard_walls", self.hazard_walls.size()),
            ("distances", self.distances.size()),
        ];
        for (component, found) in components {
            if found != self.size {
                return Err(InvariantViolation::SizeMismatch {
                    component,
                    width: self.size.width(),
                    height: self.size.height(),
                    found_width: found.width(),
                    found_height: found.height(),
                });
            }
        }
        Ok(())
    }

    fn verify_walls(&self) -> Result<(), InvariantViolation> {
        if self.walls.contains(self.start) {
            return Err(InvariantViolation::StartIsWall { cell: self.start });
        }
        if let Some(&cell) = self.protected.iter().find(|cell| self.walls.contains(**cell)) {
            return Err(InvariantViolation::ProtectedCellIsWall { cell });
        }
        if let Some(cell) = self.size.border_cells().find(|cell| !self.walls.contains(*cell)) {
            return Err(InvariantViolation::BorderOpen { cell });
        }
        for cell in self.hazard_walls.iter() {
            if !self.walls.contains(cell) {
                return Err(InvariantViolation::HazardOutsideWalls { cell });
            }
            if self.size.is_border(cell) {
                return Err(InvariantViolation::HazardOnBorder { cell });
            }
        }

        let total = self.size.cell_count();
        let Some(actual) = total.checked_sub(self.walls.len()) else {
            return Err(InvariantViolation::WallCountExceedsGrid {
                walls: self.walls.len(),
                total,
            });
        };
        if actual != self.passable_count {
            return Err(InvariantViolation::PassableCountMismatch {
                recorded: self.passable_count,
                actual,
            });
        }
        if (actual as f64) < (total as f64 * self.min_passable_ratio).ceil() {
            return Err(InvariantViolation::PassableRatioBelowMinimum {
                passable: actual,
                total,
                minimum: self.min_passable_ratio,
            });
        }
        Ok(())
    }

    fn verify_distances(&self) -> Result<(), InvariantViolation> {
        if self.distances.origin() != self.start || self.distances.get(self.start) != Some(0) {
            return Err(InvariantViolation::DistanceFieldMisrooted { cell: self.start });
        }
        for (cell, distance) in self.distances.iter() {
            if distance == 0 {
                continue;
            }
            let anchored = self
                .size
                .neighbors(cell)
                .any(|neighbor| self.distances.get(neighbor) == Some(distance - 1));
            if !anchored || self.walls.contains(cell) {
                return Err(InvariantViolation::DistanceGap { cell, distance });
            }
        }
        Ok(())
    }

    fn verify_victims(&self) -> Result<(), InvariantViolation> {
        for (cell, _) in self.victims.iter() {
            if self.is_wall(cell) {
                return Err(InvariantViolation::VictimOnWall { cell });
            }
            if self.is_locked(cell) {
                return Err(InvariantViolation::VictimOnLockedCell { cell });
            }
        }
        for tier in VictimTier::ALL {
            let placed = self.victims.count(tier);
            let requested = self.report.victims.tier(tier).requested;
            if placed > requested {
                return Err(InvariantViolation::TierExceedsTarget {
                    tier,
                    placed,
                    requested,
                });
            }
        }
        Ok(())
    }

    fn verify_rescue_points(&self) -> Result<(), InvariantViolation> {
        let mut seen = CellMask::new(self.size);
        for &cell in &self.rescue_points {
            if self.is_wall(cell) {
                return Err(InvariantViolation::RescuePointOnWall { cell });
            }
            if self.victims.contains(cell) || self.is_locked(cell) {
                return Err(InvariantViolation::RescuePointOccupied { cell });
            }
            if !seen.insert(cell) {
                return Err(InvariantViolation::DuplicateRescuePoint { cell });
            }
        }
        Ok(())
    }

    fn is_locked(&self, cell: CellCoord) -> bool {
        cell == self.start || self.protected.contains(&cell)
    }
}
