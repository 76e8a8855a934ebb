#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the SAR mission map generator.
//!
//! This crate defines the value types that connect the generation systems,
//! the orchestrating world crate and host adapters. Systems receive immutable
//! inputs expressed with these types, draw randomness from an explicit
//! generator, and hand back freshly built values. Nothing in here holds
//! process-wide mutable state: a [`DifficultyProfile`] is passed into every
//! call that needs configuration.

mod error;
mod profile;
mod rng;

use std::{collections::BTreeMap, fmt};

use serde::{de, Deserialize, Deserializer, Serialize};

pub use error::{ConfigError, GridDataError};
pub use profile::{
    CountRange, DifficultyProfile, HardnessWeights, MapLayout, ProfileCatalog, SectorGrid,
    TierTargets, VictimTuning, WallTuning, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
    DEFAULT_PROTECTED_CELLS, DEFAULT_START, MIN_GRID_DIMENSION, SEPARATION_FLOOR,
};
pub use rng::{
    derive_stream_seed, stream_rng, RNG_STREAM_RESCUE, RNG_STREAM_VICTIMS, RNG_STREAM_WALLS,
};

/// Cardinal directions used for 4-connected movement across the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every cardinal direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell (the `x` axis).
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell (the `y` axis).
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev (king-move) distance between two cell coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Cell one step away in the provided direction.
    ///
    /// Returns `None` when the step would underflow the coordinate space. Upper
    /// bounds are the grid's concern, see [`GridSize::neighbor`].
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Fixed dimensions of a generated grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Number of cells forming the outer border ring.
    #[must_use]
    pub fn border_count(&self) -> usize {
        if self.width == 0 || self.height == 0 {
            return 0;
        }
        if self.width == 1 || self.height == 1 {
            return self.cell_count();
        }
        let ring = 2 * u64::from(self.width) + 2 * u64::from(self.height) - 4;
        usize::try_from(ring).unwrap_or(usize::MAX)
    }

    /// Reports whether the provided cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Reports whether the provided cell belongs to the outer border ring.
    #[must_use]
    pub const fn is_border(&self, cell: CellCoord) -> bool {
        self.contains(cell)
            && (cell.column() == 0
                || cell.row() == 0
                || cell.column() + 1 == self.width
                || cell.row() + 1 == self.height)
    }

    /// Row-major offset of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell stored at the provided row-major offset.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.width).ok()?;
        if width == 0 || index >= self.cell_count() {
            return None;
        }
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
    }

    /// Iterates the cells of the outer border ring in row-major order.
    pub fn border_cells(&self) -> impl Iterator<Item = CellCoord> {
        let size = *self;
        self.cells().filter(move |cell| size.is_border(*cell))
    }

    /// Neighbouring cell in the provided direction when it lies inside the grid.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction).filter(|next| self.contains(*next))
    }

    /// Iterates the in-bounds 4-connected neighbours of the provided cell.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let size = *self;
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| size.neighbor(cell, direction))
    }

    /// Iterates the in-bounds cells within `radius` Chebyshev distance of `center`.
    ///
    /// The square is clipped to the grid and yielded in row-major order.
    pub fn square(&self, center: CellCoord, radius: u32) -> impl Iterator<Item = CellCoord> {
        let min_column = center.column().saturating_sub(radius);
        let min_row = center.row().saturating_sub(radius);
        let max_column = center
            .column()
            .saturating_add(radius)
            .min(self.width.saturating_sub(1));
        let max_row = center
            .row()
            .saturating_add(radius)
            .min(self.height.saturating_sub(1));
        let empty = self.width == 0 || self.height == 0;
        let rows = if empty { 1..=0 } else { min_row..=max_row };
        rows.flat_map(move |row| {
            (min_column..=max_column).map(move |column| CellCoord::new(column, row))
        })
    }
}

/// Dense set of cells backed by a row-major boolean grid.
///
/// Iteration always follows row-major order, which keeps every consumer
/// deterministic regardless of insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CellMask {
    size: GridSize,
    cells: Vec<bool>,
    len: usize,
}

#[derive(Deserialize)]
struct RawCellMask {
    size: GridSize,
    cells: Vec<bool>,
    len: usize,
}

impl TryFrom<RawCellMask> for CellMask {
    type Error = GridDataError;

    fn try_from(raw: RawCellMask) -> Result<Self, Self::Error> {
        check_cell_count(raw.size, raw.cells.len())?;
        let actual = raw.cells.iter().filter(|present| **present).count();
        if actual != raw.len {
            return Err(GridDataError::MemberCountMismatch {
                recorded: raw.len,
                actual,
            });
        }
        Ok(Self {
            size: raw.size,
            cells: raw.cells,
            len: raw.len,
        })
    }
}

impl<'de> Deserialize<'de> for CellMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawCellMask::deserialize(deserializer)?;
        Self::try_from(raw).map_err(de::Error::custom)
    }
}

fn check_cell_count(size: GridSize, found: usize) -> Result<(), GridDataError> {
    let expected = size.cell_count();
    if found == expected {
        return Ok(());
    }
    Err(GridDataError::CellCountMismatch {
        width: size.width(),
        height: size.height(),
        expected,
        found,
    })
}

impl CellMask {
    /// Creates an empty mask covering the provided grid.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![false; size.cell_count()],
            len: 0,
        }
    }

    /// Creates a mask containing every in-bounds cell yielded by the iterator.
    #[must_use]
    pub fn from_cells(size: GridSize, cells: impl IntoIterator<Item = CellCoord>) -> Self {
        let mut mask = Self::new(size);
        mask.extend(cells);
        mask
    }

    /// Dimensions of the grid the mask covers.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Number of cells contained in the mask.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the mask contains no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reports whether the provided cell is a member of the mask.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Adds the cell, returning `true` when it was not already present.
    ///
    /// Out-of-bounds cells are ignored and report `false`.
    pub fn insert(&mut self, cell: CellCoord) -> bool {
        let Some(slot) = self.size.index(cell).and_then(|index| self.cells.get_mut(index)) else {
            return false;
        };
        if *slot {
            return false;
        }
        *slot = true;
        self.len += 1;
        true
    }

    /// Removes the cell, returning `true` when it was present.
    pub fn remove(&mut self, cell: CellCoord) -> bool {
        let Some(slot) = self.size.index(cell).and_then(|index| self.cells.get_mut(index)) else {
            return false;
        };
        if !*slot {
            return false;
        }
        *slot = false;
        self.len -= 1;
        true
    }

    /// Adds every cell yielded by the iterator.
    pub fn extend(&mut self, cells: impl IntoIterator<Item = CellCoord>) {
        for cell in cells {
            let _ = self.insert(cell);
        }
    }

    /// Iterates the member cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, present)| **present)
            .filter_map(move |(index, _)| size.cell_at(index))
    }

    /// Mask containing every grid cell that is not a member of this mask.
    #[must_use]
    pub fn complement(&self) -> Self {
        let cells: Vec<bool> = self.cells.iter().map(|present| !present).collect();
        let len = self.size.cell_count() - self.len;
        Self {
            size: self.size,
            cells,
            len,
        }
    }

    /// Reports whether every member of this mask is also a member of `other`.
    #[must_use]
    pub fn is_subset(&self, other: &CellMask) -> bool {
        self.iter().all(|cell| other.contains(cell))
    }
}

/// Shortest-path step counts from a single origin over passable cells.
///
/// Cells that cannot be reached from the origin are absent: [`DistanceMap::get`]
/// returns `None` for them rather than a sentinel value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DistanceMap {
    size: GridSize,
    origin: CellCoord,
    distances: Vec<Option<u32>>,
    reached: usize,
}

#[derive(Deserialize)]
struct RawDistanceMap {
    size: GridSize,
    origin: CellCoord,
    distances: Vec<Option<u32>>,
    reached: usize,
}

impl TryFrom<RawDistanceMap> for DistanceMap {
    type Error = GridDataError;

    fn try_from(raw: RawDistanceMap) -> Result<Self, Self::Error> {
        check_cell_count(raw.size, raw.distances.len())?;
        let actual = raw.distances.iter().flatten().count();
        if actual != raw.reached {
            return Err(GridDataError::MemberCountMismatch {
                recorded: raw.reached,
                actual,
            });
        }
        Ok(Self {
            size: raw.size,
            origin: raw.origin,
            distances: raw.distances,
            reached: raw.reached,
        })
    }
}

impl<'de> Deserialize<'de> for DistanceMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDistanceMap::deserialize(deserializer)?;
        Self::try_from(raw).map_err(de::Error::custom)
    }
}

impl DistanceMap {
    /// Wraps a dense row-major distance buffer.
    ///
    /// Buffers shorter than the grid are padded with unreachable entries and
    /// longer buffers are truncated.
    #[must_use]
    pub fn new(size: GridSize, origin: CellCoord, mut distances: Vec<Option<u32>>) -> Self {
        distances.resize(size.cell_count(), None);
        let reached = distances.iter().filter(|entry| entry.is_some()).count();
        Self {
            size,
            origin,
            distances,
            reached,
        }
    }

    /// Dimensions of the grid the field covers.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Cell the distances were measured from.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Distance recorded for the provided cell, or `None` when unreachable.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<u32> {
        self.size
            .index(cell)
            .and_then(|index| self.distances.get(index).copied().flatten())
    }

    /// Reports whether the provided cell is reachable from the origin.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.get(cell).is_some()
    }

    /// Number of reachable cells, origin included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.reached
    }

    /// Reports whether no cell, not even the origin, was reached.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reached == 0
    }

    /// Largest recorded distance.
    #[must_use]
    pub fn max_distance(&self) -> Option<u32> {
        self.distances.iter().flatten().copied().max()
    }

    /// Iterates reachable cells and their distances in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, u32)> + '_ {
        let size = self.size;
        self.distances
            .iter()
            .enumerate()
            .filter_map(move |(index, distance)| Some((size.cell_at(index)?, (*distance)?)))
    }
}

/// Priority classes assigned to victims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VictimTier {
    /// Scarce, highest-value victims (shown in red).
    High,
    /// Mid-value victims (shown in purple).
    Medium,
    /// Plentiful, lowest-value victims (shown in yellow).
    Low,
}

impl VictimTier {
    /// Every tier in placement order.
    pub const ALL: [VictimTier; 3] = [VictimTier::High, VictimTier::Medium, VictimTier::Low];

    /// Lower-case label used in logs and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for VictimTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Assignment of victim tiers to cells.
///
/// Serialised as a list of `(cell, tier)` pairs ordered by cell so formats
/// without structured map keys can carry it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "Vec<(CellCoord, VictimTier)>",
    into = "Vec<(CellCoord, VictimTier)>"
)]
pub struct VictimMap {
    entries: BTreeMap<CellCoord, VictimTier>,
}

impl From<Vec<(CellCoord, VictimTier)>> for VictimMap {
    fn from(entries: Vec<(CellCoord, VictimTier)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl From<VictimMap> for Vec<(CellCoord, VictimTier)> {
    fn from(map: VictimMap) -> Self {
        map.entries.into_iter().collect()
    }
}

impl VictimMap {
    /// Creates an empty victim map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a tier to the cell, returning the tier it replaced.
    pub fn insert(&mut self, cell: CellCoord, tier: VictimTier) -> Option<VictimTier> {
        self.entries.insert(cell, tier)
    }

    /// Tier assigned to the provided cell.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<VictimTier> {
        self.entries.get(&cell).copied()
    }

    /// Reports whether any victim occupies the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.entries.contains_key(&cell)
    }

    /// Total number of victims across every tier.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no victim was placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of victims assigned to the provided tier.
    #[must_use]
    pub fn count(&self, tier: VictimTier) -> usize {
        self.entries.values().filter(|entry| **entry == tier).count()
    }

    /// Iterates every victim ordered by cell.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, VictimTier)> + '_ {
        self.entries.iter().map(|(cell, tier)| (*cell, *tier))
    }

    /// Iterates the cells holding victims of the provided tier.
    pub fn cells(&self, tier: VictimTier) -> impl Iterator<Item = CellCoord> + '_ {
        self.iter()
            .filter(move |(_, entry)| *entry == tier)
            .map(|(cell, _)| cell)
    }
}

/// Classification of a single cell in the flattened matrix export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellClass {
    /// Impassable wall cell.
    Wall,
    /// Passable cell with nothing on it.
    Free,
    /// Cell holding a victim of the given tier.
    Victim(VictimTier),
    /// Wall cell flagged as hazardous.
    HazardWall,
    /// Rescue or triage point.
    RescuePoint,
    /// Mission start cell.
    Start,
}

impl CellClass {
    /// Numeric code emitted in the matrix export.
    ///
    /// `0` wall, `1` free, `2`/`3`/`4` high/medium/low victim, `5` hazardous
    /// wall, `6` rescue point, `9` start.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Wall => 0,
            Self::Free => 1,
            Self::Victim(VictimTier::High) => 2,
            Self::Victim(VictimTier::Medium) => 3,
            Self::Victim(VictimTier::Low) => 4,
            Self::HazardWall => 5,
            Self::RescuePoint => 6,
            Self::Start => 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn distances_match_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(origin.chebyshev_distance(destination), 3);
        assert_eq!(destination.chebyshev_distance(origin), 3);
    }

    #[test]
    fn step_underflow_is_rejected() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(corner.step(Direction::West), None);
        assert_eq!(corner.step(Direction::East), Some(CellCoord::new(1, 0)));
        assert_eq!(corner.step(Direction::South), Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn neighbors_are_clipped_to_grid() {
        let size = GridSize::new(3, 3);
        let corner: Vec<_> = size.neighbors(CellCoord::new(2, 2)).collect();
        assert_eq!(corner, vec![CellCoord::new(2, 1), CellCoord::new(1, 2)]);
        assert_eq!(size.neighbors(CellCoord::new(1, 1)).count(), 4);
    }

    #[test]
    fn border_ring_counts_match() {
        let size = GridSize::new(5, 4);
        assert_eq!(size.border_count(), 14);
        assert_eq!(size.border_cells().count(), 14);
        assert!(size.is_border(CellCoord::new(4, 2)));
        assert!(!size.is_border(CellCoord::new(2, 2)));
        assert!(!size.is_border(CellCoord::new(5, 2)));
    }

    #[test]
    fn square_is_clipped_and_row_major() {
        let size = GridSize::new(4, 4);
        let cells: Vec<_> = size.square(CellCoord::new(0, 0), 1).collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
            ]
        );
        assert_eq!(size.square(CellCoord::new(2, 2), 5).count(), 16);
    }

    #[test]
    fn index_and_cell_at_agree() {
        let size = GridSize::new(7, 3);
        for (offset, cell) in size.cells().enumerate() {
            assert_eq!(size.index(cell), Some(offset));
            assert_eq!(size.cell_at(offset), Some(cell));
        }
        assert_eq!(size.index(CellCoord::new(7, 0)), None);
        assert_eq!(size.cell_at(21), None);
    }

    #[test]
    fn mask_tracks_membership() {
        let size = GridSize::new(4, 3);
        let mut mask = CellMask::new(size);
        assert!(mask.insert(CellCoord::new(3, 2)));
        assert!(mask.insert(CellCoord::new(0, 1)));
        assert!(!mask.insert(CellCoord::new(0, 1)));
        assert!(!mask.insert(CellCoord::new(9, 9)));
        assert_eq!(mask.len(), 2);
        assert_eq!(
            mask.iter().collect::<Vec<_>>(),
            vec![CellCoord::new(0, 1), CellCoord::new(3, 2)]
        );

        let complement = mask.complement();
        assert_eq!(complement.len(), 10);
        assert!(!complement.contains(CellCoord::new(0, 1)));

        assert!(mask.remove(CellCoord::new(0, 1)));
        assert!(!mask.remove(CellCoord::new(0, 1)));
        assert_eq!(mask.len(), 1);
        assert!(mask.is_subset(&CellMask::from_cells(size, size.cells())));
    }

    #[test]
    fn distance_map_treats_missing_entries_as_unreachable() {
        let size = GridSize::new(2, 2);
        let map = DistanceMap::new(size, CellCoord::new(0, 0), vec![Some(0), Some(1)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(CellCoord::new(1, 0)), Some(1));
        assert_eq!(map.get(CellCoord::new(1, 1)), None);
        assert_eq!(map.max_distance(), Some(1));
        assert_eq!(map.iter().count(), 2);
    }

    #[test]
    fn victim_map_counts_tiers() {
        let mut victims = VictimMap::new();
        assert_eq!(victims.insert(CellCoord::new(1, 1), VictimTier::High), None);
        assert_eq!(victims.insert(CellCoord::new(2, 1), VictimTier::Low), None);
        assert_eq!(victims.insert(CellCoord::new(3, 1), VictimTier::Low), None);
        assert_eq!(victims.count(VictimTier::Low), 2);
        assert_eq!(victims.count(VictimTier::Medium), 0);
        assert_eq!(
            victims.cells(VictimTier::High).collect::<Vec<_>>(),
            vec![CellCoord::new(1, 1)]
        );
    }

    #[test]
    fn cell_class_codes_are_stable() {
        assert_eq!(CellClass::Wall.code(), 0);
        assert_eq!(CellClass::Free.code(), 1);
        assert_eq!(CellClass::Victim(VictimTier::High).code(), 2);
        assert_eq!(CellClass::Victim(VictimTier::Medium).code(), 3);
        assert_eq!(CellClass::Victim(VictimTier::Low).code(), 4);
        assert_eq!(CellClass::HazardWall.code(), 5);
        assert_eq!(CellClass::RescuePoint.code(), 6);
        assert_eq!(CellClass::Start.code(), 9);
    }

    #[test]
    fn value_types_round_trip_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
        assert_round_trip(&VictimTier::Medium);
        assert_round_trip(&CellClass::Victim(VictimTier::Low));
        let mut mask = CellMask::new(GridSize::new(3, 2));
        let _ = mask.insert(CellCoord::new(2, 1));
        assert_round_trip(&mask);
        let mut victims = VictimMap::new();
        let _ = victims.insert(CellCoord::new(4, 2), VictimTier::High);
        let _ = victims.insert(CellCoord::new(1, 3), VictimTier::Low);
        assert_round_trip(&victims);
        assert_round_trip(&DistanceMap::new(
            GridSize::new(2, 1),
            CellCoord::new(0, 0),
            vec![Some(0), Some(1)],
        ));
    }

    #[test]
    fn mask_rejects_inconsistent_member_count() {
        let mut mask = CellMask::new(GridSize::new(3, 3));
        let _ = mask.insert(CellCoord::new(1, 1));
        let mut json = serde_json::to_value(&mask).expect("mask serialises");
        json["len"] = serde_json::json!(100_000);

        let error = serde_json::from_value::<CellMask>(json).expect_err("len is inconsistent");
        assert!(error.to_string().contains("records 100000 members but holds 1"));
    }

    #[test]
    fn mask_rejects_truncated_buffer() {
        let mask = CellMask::new(GridSize::new(3, 3));
        let mut json = serde_json::to_value(&mask).expect("mask serialises");
        json["cells"] = serde_json::json!([false, false]);

        let error = serde_json::from_value::<CellMask>(json).expect_err("buffer is short");
        assert!(error.to_string().contains("needs 9 entries but the buffer holds 2"));
    }

    #[test]
    fn distance_map_rejects_inconsistent_reach() {
        let map = DistanceMap::new(GridSize::new(2, 2), CellCoord::new(0, 0), vec![Some(0)]);
        let mut json = serde_json::to_value(&map).expect("map serialises");
        json["reached"] = serde_json::json!(4);
        assert!(serde_json::from_value::<DistanceMap>(json).is_err());

        let mut json = serde_json::to_value(&map).expect("map serialises");
        json["distances"] = serde_json::json!([0, 1, 2, 3, 4]);
        assert!(serde_json::from_value::<DistanceMap>(json).is_err());
    }
}
