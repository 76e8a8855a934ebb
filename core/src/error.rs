//! Configuration errors rejected before generation starts.

use thiserror::Error;

use crate::{CellCoord, VictimTier};

/// Reasons a [`crate::DifficultyProfile`] cannot be used for generation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// No profile with the requested name exists in the catalog.
    #[error("unknown difficulty `{0}`")]
    UnknownDifficulty(String),
    /// Grid dimensions leave no interior for the start cell.
    #[error("grid of {width}x{height} cells is too small; both dimensions must be at least {minimum}")]
    GridTooSmall {
        /// Configured grid width.
        width: u32,
        /// Configured grid height.
        height: u32,
        /// Smallest accepted dimension.
        minimum: u32,
    },
    /// The start cell lies outside the grid.
    #[error("start cell {cell} lies outside the grid")]
    StartOutOfBounds {
        /// Offending start cell.
        cell: CellCoord,
    },
    /// The start cell lies on the border ring, which is always walled.
    #[error("start cell {cell} lies on the border ring")]
    StartOnBorder {
        /// Offending start cell.
        cell: CellCoord,
    },
    /// A protected cell lies outside the grid.
    #[error("protected cell {cell} lies outside the grid")]
    ProtectedCellOutOfBounds {
        /// Offending protected cell.
        cell: CellCoord,
    },
    /// A protected cell lies on the border ring, which is always walled.
    #[error("protected cell {cell} lies on the border ring")]
    ProtectedCellOnBorder {
        /// Offending protected cell.
        cell: CellCoord,
    },
    /// A protected cell coincides with the start cell.
    #[error("protected cell {cell} coincides with the start cell")]
    ProtectedCellIsStart {
        /// Offending protected cell.
        cell: CellCoord,
    },
    /// The minimum passable ratio is not a finite value in `[0, 1)`.
    #[error("min_passable_ratio must lie in [0, 1), got {value}")]
    InvalidPassableRatio {
        /// Configured ratio.
        value: f64,
    },
    /// The border ring alone needs more walls than the passable ratio allows.
    #[error("border ring needs {border} walls but the passable ratio only allows {budget}")]
    BorderExceedsBudget {
        /// Number of border cells.
        border: usize,
        /// Wall budget derived from the passable ratio.
        budget: usize,
    },
    /// A fractional tuning knob is outside its accepted range.
    #[error("{field} must be a finite fraction in [0, 1], got {value}")]
    InvalidFraction {
        /// Name of the offending field.
        field: &'static str,
        /// Configured value.
        value: f64,
    },
    /// An inclusive range is empty or starts below its floor.
    #[error("{field} range {min}..={max} is invalid")]
    InvalidRange {
        /// Name of the offending field.
        field: &'static str,
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// A tier's sector grid has a zero dimension.
    #[error("{tier} tier sector grid {columns}x{rows} must have at least one sector per axis")]
    InvalidSectorGrid {
        /// Tier whose sector grid is invalid.
        tier: VictimTier,
        /// Configured sector columns.
        columns: u32,
        /// Configured sector rows.
        rows: u32,
    },
    /// The high-tier separation is below the relaxation floor.
    #[error("high tier separation {value} is below the floor of {floor}")]
    InvalidSeparation {
        /// Configured separation.
        value: u32,
        /// Smallest separation the placer relaxes to.
        floor: u32,
    },
    /// More victims were requested than free interior cells could ever hold.
    #[error("{requested} victims requested but at most {capacity} interior cells are available")]
    VictimsExceedCapacity {
        /// Sum of all tier targets.
        requested: usize,
        /// Interior cells minus the start and protected cells.
        capacity: usize,
    },
}

/// Reasons a deserialised grid buffer is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridDataError {
    /// The buffer does not hold exactly one entry per grid cell.
    #[error("{width}x{height} grid needs {expected} entries but the buffer holds {found}")]
    CellCountMismatch {
        /// Declared grid width.
        width: u32,
        /// Declared grid height.
        height: u32,
        /// Number of cells in the declared grid.
        expected: usize,
        /// Number of entries in the buffer.
        found: usize,
    },
    /// The stored member count disagrees with the buffer contents.
    #[error("buffer records {recorded} members but holds {actual}")]
    MemberCountMismatch {
        /// Count stored alongside the buffer.
        recorded: usize,
        /// Count of occupied entries in the buffer.
        actual: usize,
    },
}
