#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map generation pipeline for the SAR mission.
//!
//! [`MapGenerator`] runs walls, the distance field, victims and rescue points
//! in order and returns a fully formed [`MapSnapshot`]. Each stage draws from
//! its own labelled random stream derived from the run seed, so the same
//! `(difficulty, seed)` pair always reproduces the same map.

mod navigation;
mod snapshot;

use sar_mission_core::{
    stream_rng, CellMask, ConfigError, DifficultyProfile, ProfileCatalog, RNG_STREAM_RESCUE,
    RNG_STREAM_VICTIMS, RNG_STREAM_WALLS,
};
use sar_mission_system_rescue::RescuePointSelector;
use sar_mission_system_victims::VictimPlacer;
use sar_mission_system_walls::WallGenerator;
use tracing::info;

pub use navigation::compute_distance_field;
pub use snapshot::{GenerationReport, InvariantViolation, MapSnapshot};

use crate::snapshot::SnapshotParts;

/// Generates maps for the profiles of a catalog.
#[derive(Clone, Debug, Default)]
pub struct MapGenerator {
    catalog: ProfileCatalog,
}

impl MapGenerator {
    /// Creates a generator that resolves difficulty names against `catalog`.
    #[must_use]
    pub fn new(catalog: ProfileCatalog) -> Self {
        Self { catalog }
    }

    /// Profiles the generator can resolve.
    #[must_use]
    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Generates a map for the named difficulty.
    ///
    /// Without a seed override the profile's configured seed is used.
    pub fn generate_map(
        &self,
        difficulty: &str,
        seed: Option<u64>,
    ) -> Result<MapSnapshot, ConfigError> {
        let profile = self.catalog.get(difficulty)?;
        generate(profile, seed.unwrap_or(profile.rng_seed))
    }
}

/// Generates a map for the named built-in difficulty.
pub fn generate_map(difficulty: &str, seed: Option<u64>) -> Result<MapSnapshot, ConfigError> {
    MapGenerator::default().generate_map(difficulty, seed)
}

/// Runs the full pipeline for an explicit profile and seed.
///
/// Configuration errors are reported before any generation work starts.
/// Shortfalls in walls, victims or rescue points are recorded in the
/// snapshot's [`GenerationReport`] instead.
pub fn generate(profile: &DifficultyProfile, seed: u64) -> Result<MapSnapshot, ConfigError> {
    profile.validate()?;
    let layout = &profile.layout;

    let mut wall_rng = stream_rng(seed, RNG_STREAM_WALLS);
    let (walls, hazard_walls, wall_report) = WallGenerator::new(profile)
        .generate(&mut wall_rng)
        .into_parts();

    let passable = walls.complement();
    let distances = compute_distance_field(layout.start, &passable);

    let mut victim_rng = stream_rng(seed, RNG_STREAM_VICTIMS);
    let (victims, victim_report) = VictimPlacer::new(profile)
        .place(&distances, &passable, &mut victim_rng)
        .into_parts();

    let mut excluded = CellMask::from_cells(layout.size, victims.iter().map(|(cell, _)| cell));
    let _ = excluded.insert(layout.start);
    excluded.extend(layout.protected.iter().copied());

    let mut rescue_rng = stream_rng(seed, RNG_STREAM_RESCUE);
    let selector = RescuePointSelector::new(profile.rescue_point_count);
    let rescue_points = selector.select(&passable, &excluded, &mut rescue_rng);

    let report = GenerationReport {
        walls: wall_report,
        victims: victim_report,
        rescue_points_requested: selector.count(),
        rescue_points_placed: rescue_points.len(),
    };
    let snapshot = MapSnapshot::from_parts(SnapshotParts {
        difficulty: profile.name.clone(),
        seed,
        start: layout.start,
        protected: layout.protected.clone(),
        min_passable_ratio: profile.walls.min_passable_ratio,
        walls,
        hazard_walls,
        victims,
        rescue_points,
        distances,
        report,
    });
    debug_assert_eq!(snapshot.verify(), Ok(()));

    info!(
        difficulty = %profile.name,
        seed,
        walls = snapshot.walls().len(),
        hazard_walls = snapshot.hazard_walls().len(),
        passable = snapshot.passable_count(),
        victims = snapshot.victims().len(),
        rescue_points = snapshot.rescue_points().len(),
        "map generated"
    );

    Ok(snapshot)
}
