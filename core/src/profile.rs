//! Difficulty profiles and the tuning knobs that drive map generation.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, ConfigError, GridSize, VictimTier};

/// Default play-area width in cells.
pub const DEFAULT_GRID_WIDTH: u32 = 61;
/// Default play-area height in cells.
pub const DEFAULT_GRID_HEIGHT: u32 = 40;
/// Default mission start cell.
pub const DEFAULT_START: CellCoord = CellCoord::new(9, 9);
/// Cells kept usable for interface anchoring on the default grid.
pub const DEFAULT_PROTECTED_CELLS: [CellCoord; 3] = [
    CellCoord::new(5, 5),
    CellCoord::new(10, 8),
    CellCoord::new(12, 15),
];
/// Smallest grid dimension that still leaves an interior cell for the start.
pub const MIN_GRID_DIMENSION: u32 = 3;
/// Smallest Chebyshev separation the high-tier placer relaxes down to.
pub const SEPARATION_FLOOR: u32 = 2;

const DEFAULT_SEED: u64 = 32;
const DEFAULT_RESCUE_POINTS: usize = 3;

/// Inclusive integer range sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountRange {
    /// Smallest value that may be drawn.
    pub min: u32,
    /// Largest value that may be drawn.
    pub max: u32,
}

impl CountRange {
    /// Creates a new inclusive range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Grid geometry shared by every stage of a generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapLayout {
    /// Dimensions of the play area.
    pub size: GridSize,
    /// Cell the player starts from and distances are measured from.
    pub start: CellCoord,
    /// Cells that are never walled, reserved or assigned a victim.
    pub protected: Vec<CellCoord>,
}

impl Default for MapLayout {
    fn default() -> Self {
        Self {
            size: GridSize::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT),
            start: DEFAULT_START,
            protected: DEFAULT_PROTECTED_CELLS.to_vec(),
        }
    }
}

impl MapLayout {
    /// Reports whether the cell is the start cell or a protected cell.
    #[must_use]
    pub fn is_locked(&self, cell: CellCoord) -> bool {
        cell == self.start || self.protected.contains(&cell)
    }
}

/// Knobs controlling wall segment placement, thickening and hazard marking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallTuning {
    /// Number of straight segments the generator tries to place.
    pub segment_count: u32,
    /// Smallest share of the grid that must stay passable.
    pub min_passable_ratio: f64,
    /// Share of wall components that get thickened.
    pub multi_wall_pct: f64,
    /// Number of thickening layers applied to a selected component.
    pub thickening_layers: CountRange,
    /// Share of final wall components flagged as hazardous.
    pub orange_wall_pct: f64,
    /// Chebyshev radius kept clear around placed walls and anchor cells.
    pub wall_clearance: u32,
    /// Length of a single straight segment in cells.
    pub segment_length: CountRange,
    /// Failed placement attempts tolerated per requested segment.
    pub attempts_per_segment: u32,
    /// Share of a component's free rim grown per thickening layer.
    pub grow_pct: f64,
}

impl Default for WallTuning {
    fn default() -> Self {
        Self {
            segment_count: 120,
            min_passable_ratio: 0.50,
            multi_wall_pct: 0.15,
            thickening_layers: CountRange::new(1, 2),
            orange_wall_pct: 0.25,
            wall_clearance: 2,
            segment_length: CountRange::new(3, 11),
            attempts_per_segment: 30,
            grow_pct: 0.25,
        }
    }
}

impl WallTuning {
    /// Fewest passable cells a grid of `total_cells` must keep.
    #[must_use]
    pub fn min_passable_cells(&self, total_cells: usize) -> usize {
        let required = (total_cells as f64 * self.min_passable_ratio).ceil();
        if required <= 0.0 {
            0
        } else {
            (required as usize).min(total_cells)
        }
    }

    /// Largest number of wall cells a grid of `total_cells` may hold.
    #[must_use]
    pub fn wall_budget(&self, total_cells: usize) -> usize {
        total_cells - self.min_passable_cells(total_cells)
    }
}

/// Rectangular partition of the grid used to spread placements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectorGrid {
    /// Number of sectors along the x axis.
    pub columns: u32,
    /// Number of sectors along the y axis.
    pub rows: u32,
}

impl SectorGrid {
    /// Creates a new sector grid.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Total number of sectors.
    #[must_use]
    pub fn count(&self) -> usize {
        usize::try_from(u64::from(self.columns) * u64::from(self.rows)).unwrap_or(usize::MAX)
    }

    /// Row-major sector index of the provided cell.
    ///
    /// Sectors are formed by proportional bucketing of each coordinate, so
    /// `sector_x = min(columns - 1, x * columns / width)`.
    #[must_use]
    pub fn sector_of(&self, cell: CellCoord, size: GridSize) -> usize {
        let bucket = |value: u32, sectors: u32, extent: u32| -> u64 {
            let scaled = u64::from(value) * u64::from(sectors) / u64::from(extent.max(1));
            scaled.min(u64::from(sectors.saturating_sub(1)))
        };
        let sector_x = bucket(cell.column(), self.columns, size.width());
        let sector_y = bucket(cell.row(), self.rows, size.height());
        let index = sector_y * u64::from(self.columns) + sector_x;
        usize::try_from(index).unwrap_or(usize::MAX)
    }
}

/// Number of victims requested per tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTargets {
    /// Target count for the high tier.
    pub high: usize,
    /// Target count for the medium tier.
    pub medium: usize,
    /// Target count for the low tier.
    pub low: usize,
}

impl Default for TierTargets {
    fn default() -> Self {
        Self {
            high: 15,
            medium: 30,
            low: 45,
        }
    }
}

impl TierTargets {
    /// Target count for the provided tier.
    #[must_use]
    pub const fn get(&self, tier: VictimTier) -> usize {
        match tier {
            VictimTier::High => self.high,
            VictimTier::Medium => self.medium,
            VictimTier::Low => self.low,
        }
    }

    /// Sum of every tier target.
    #[must_use]
    pub fn total(&self) -> usize {
        self.high
            .saturating_add(self.medium)
            .saturating_add(self.low)
    }
}

/// Weights folded into the high-tier hardness score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardnessWeights {
    /// Multiplier applied to the normalised start distance.
    pub distance: f64,
    /// Bonus for dead ends (a single passable neighbour).
    pub dead_end: f64,
    /// Bonus for straight corridors (two opposite passable neighbours).
    pub corridor: f64,
    /// Bonus for cells with at least two blocked sides.
    pub near_wall: f64,
}

impl Default for HardnessWeights {
    fn default() -> Self {
        Self {
            distance: 1.0,
            dead_end: 0.8,
            corridor: 0.4,
            near_wall: 0.2,
        }
    }
}

/// Knobs controlling victim placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VictimTuning {
    /// Requested victim counts per tier.
    pub targets: TierTargets,
    /// Sector grid balancing high-tier placements.
    pub high_sectors: SectorGrid,
    /// Sector grid balancing medium-tier placements.
    pub medium_sectors: SectorGrid,
    /// Sector grid balancing low-tier placements.
    pub low_sectors: SectorGrid,
    /// Distance quantile below which cells are too close for the high tier.
    pub far_quantile: f64,
    /// Initial Chebyshev separation between high-tier victims.
    pub separation: u32,
    /// Weights of the hardness score.
    pub hardness: HardnessWeights,
}

impl Default for VictimTuning {
    fn default() -> Self {
        Self {
            targets: TierTargets::default(),
            high_sectors: SectorGrid::new(2, 2),
            medium_sectors: SectorGrid::new(9, 9),
            low_sectors: SectorGrid::new(9, 9),
            far_quantile: 0.3,
            separation: 10,
            hardness: HardnessWeights::default(),
        }
    }
}

impl VictimTuning {
    /// Sector grid used for the provided tier.
    #[must_use]
    pub const fn sectors(&self, tier: VictimTier) -> SectorGrid {
        match tier {
            VictimTier::High => self.high_sectors,
            VictimTier::Medium => self.medium_sectors,
            VictimTier::Low => self.low_sectors,
        }
    }
}

/// Named bundle of every parameter a generation run needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyProfile {
    /// Name used to select the profile.
    pub name: String,
    /// Seed used when the caller does not supply one.
    pub rng_seed: u64,
    /// Grid geometry, start and protected cells.
    pub layout: MapLayout,
    /// Wall generation knobs.
    pub walls: WallTuning,
    /// Victim placement knobs.
    pub victims: VictimTuning,
    /// Number of rescue points to select.
    pub rescue_point_count: usize,
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self {
            name: "Custom".to_owned(),
            rng_seed: DEFAULT_SEED,
            layout: MapLayout::default(),
            walls: WallTuning::default(),
            victims: VictimTuning::default(),
            rescue_point_count: DEFAULT_RESCUE_POINTS,
        }
    }
}

impl DifficultyProfile {
    /// Sparse walls with a generous passable share.
    #[must_use]
    pub fn easy() -> Self {
        Self::with_walls("Easy", 75, 0.75, 0.3, CountRange::new(1, 1))
    }

    /// Moderate wall density.
    #[must_use]
    pub fn medium() -> Self {
        Self::with_walls("Medium", 120, 0.65, 0.4, CountRange::new(1, 2))
    }

    /// Dense, frequently thickened walls.
    #[must_use]
    pub fn hard() -> Self {
        Self::with_walls("Hard", 180, 0.55, 0.6, CountRange::new(1, 2))
    }

    fn with_walls(
        name: &str,
        segment_count: u32,
        min_passable_ratio: f64,
        multi_wall_pct: f64,
        thickening_layers: CountRange,
    ) -> Self {
        Self {
            name: name.to_owned(),
            walls: WallTuning {
                segment_count,
                min_passable_ratio,
                multi_wall_pct,
                thickening_layers,
                ..WallTuning::default()
            },
            ..Self::default()
        }
    }

    /// Checks that the profile can be used for generation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.layout.size;
        if size.width() < MIN_GRID_DIMENSION || size.height() < MIN_GRID_DIMENSION {
            return Err(ConfigError::GridTooSmall {
                width: size.width(),
                height: size.height(),
                minimum: MIN_GRID_DIMENSION,
            });
        }

        let start = self.layout.start;
        if !size.contains(start) {
            return Err(ConfigError::StartOutOfBounds { cell: start });
        }
        if size.is_border(start) {
            return Err(ConfigError::StartOnBorder { cell: start });
        }
        for &cell in &self.layout.protected {
            if !size.contains(cell) {
                return Err(ConfigError::ProtectedCellOutOfBounds { cell });
            }
            if size.is_border(cell) {
                return Err(ConfigError::ProtectedCellOnBorder { cell });
            }
            if cell == start {
                return Err(ConfigError::ProtectedCellIsStart { cell });
            }
        }

        self.validate_walls(size)?;
        self.validate_victims(size)
    }

    fn validate_walls(&self, size: GridSize) -> Result<(), ConfigError> {
        let walls = &self.walls;
        let ratio = walls.min_passable_ratio;
        if !ratio.is_finite() || !(0.0..1.0).contains(&ratio) {
            return Err(ConfigError::InvalidPassableRatio { value: ratio });
        }

        let border = size.border_count();
        let budget = walls.wall_budget(size.cell_count());
        if border > budget {
            return Err(ConfigError::BorderExceedsBudget { border, budget });
        }

        check_fraction("multi_wall_pct", walls.multi_wall_pct)?;
        check_fraction("orange_wall_pct", walls.orange_wall_pct)?;
        check_fraction("grow_pct", walls.grow_pct)?;
        check_range("segment_length", walls.segment_length, 1)?;
        check_range("thickening_layers", walls.thickening_layers, 0)
    }

    fn validate_victims(&self, size: GridSize) -> Result<(), ConfigError> {
        let victims = &self.victims;
        for tier in VictimTier::ALL {
            let sectors = victims.sectors(tier);
            if sectors.columns == 0 || sectors.rows == 0 {
                return Err(ConfigError::InvalidSectorGrid {
                    tier,
                    columns: sectors.columns,
                    rows: sectors.rows,
                });
            }
        }

        let quantile = victims.far_quantile;
        if !quantile.is_finite() || !(0.0..1.0).contains(&quantile) {
            return Err(ConfigError::InvalidFraction {
                field: "far_quantile",
                value: quantile,
            });
        }

        if victims.separation < SEPARATION_FLOOR {
            return Err(ConfigError::InvalidSeparation {
                value: victims.separation,
                floor: SEPARATION_FLOOR,
            });
        }

        let mut locked = self.layout.protected.clone();
        locked.sort_unstable();
        locked.dedup();
        let interior = size.cell_count() - size.border_count();
        let capacity = interior.saturating_sub(locked.len() + 1);
        let requested = victims.targets.total();
        if requested > capacity {
            return Err(ConfigError::VictimsExceedCapacity {
                requested,
                capacity,
            });
        }

        Ok(())
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidFraction { field, value })
    }
}

fn check_range(field: &'static str, range: CountRange, floor: u32) -> Result<(), ConfigError> {
    if range.min < floor || range.min > range.max {
        return Err(ConfigError::InvalidRange {
            field,
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

/// Named collection of difficulty profiles.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileCatalog {
    profiles: Vec<DifficultyProfile>,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileCatalog {
    /// Catalog holding the Easy, Medium and Hard profiles.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            DifficultyProfile::easy(),
            DifficultyProfile::medium(),
            DifficultyProfile::hard(),
        ])
    }

    /// Catalog holding exactly the provided profiles.
    ///
    /// Later profiles replace earlier ones with the same name.
    #[must_use]
    pub fn new(profiles: Vec<DifficultyProfile>) -> Self {
        let mut catalog = Self {
            profiles: Vec::with_capacity(profiles.len()),
        };
        for profile in profiles {
            catalog.insert(profile);
        }
        catalog
    }

    /// Adds a profile, replacing any existing profile with the same name.
    pub fn insert(&mut self, profile: DifficultyProfile) {
        match self.position(&profile.name) {
            Some(index) => self.profiles[index] = profile,
            None => self.profiles.push(profile),
        }
    }

    /// Looks up a profile by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Result<&DifficultyProfile, ConfigError> {
        self.position(name)
            .map(|index| &self.profiles[index])
            .ok_or_else(|| ConfigError::UnknownDifficulty(name.to_owned()))
    }

    /// Names of every profile in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|profile| profile.name.as_str())
    }

    /// Iterates every profile in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DifficultyProfile> {
        self.profiles.iter()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.profiles
            .iter()
            .position(|profile| profile.name.eq_ignore_ascii_case(name))
    }
}
