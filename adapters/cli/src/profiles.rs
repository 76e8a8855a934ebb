//! Loading difficulty profiles from TOML files.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use sar_mission_core::{DifficultyProfile, ProfileCatalog};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default, rename = "profile")]
    profiles: Vec<DifficultyProfile>,
}

/// Built-in catalog extended with the profiles found in `path`.
///
/// Profiles sharing a name with a built-in replace it.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<ProfileCatalog> {
    let mut catalog = ProfileCatalog::builtin();
    let Some(path) = path else {
        return Ok(catalog);
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read profile file at {}", path.display()))?;
    let profiles = parse_profiles(&contents)
        .with_context(|| format!("failed to load profiles from {}", path.display()))?;
    for profile in profiles {
        catalog.insert(profile);
    }
    Ok(catalog)
}

fn parse_profiles(contents: &str) -> Result<Vec<DifficultyProfile>> {
    let file: ProfileFile =
        toml::from_str(contents).context("failed to parse profile toml contents")?;
    if file.profiles.is_empty() {
        bail!("profile file contains no [[profile]] tables");
    }

    for profile in &file.profiles {
        profile
            .validate()
            .with_context(|| format!("profile `{}` is invalid", profile.name))?;
    }
    Ok(file.profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sar_mission_core::{CellCoord, GridSize};

    #[test]
    fn partial_tables_keep_defaults() {
        let profiles = parse_profiles(
            r#"
            [[profile]]
            name = "Drill"
            rng_seed = 5

            [profile.walls]
            segment_count = 40

            [profile.layout]
            size = { width = 30, height = 20 }
            start = { column = 3, row = 4 }
            protected = []
            "#,
        )
        .expect("profiles parse");

        assert_eq!(profiles.len(), 1);
        let drill = &profiles[0];
        assert_eq!(drill.name, "Drill");
        assert_eq!(drill.rng_seed, 5);
        assert_eq!(drill.walls.segment_count, 40);
        assert_eq!(drill.walls.min_passable_ratio, 0.5);
        assert_eq!(drill.layout.size, GridSize::new(30, 20));
        assert_eq!(drill.layout.start, CellCoord::new(3, 4));
        assert_eq!(drill.victims.targets.high, 15);
        assert_eq!(drill.rescue_point_count, 3);
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let error = parse_profiles(
            r#"
            [[profile]]
            name = "Broken"

            [profile.walls]
            min_passable_ratio = 1.0
            "#,
        )
        .expect_err("ratio of one is invalid");

        assert!(format!("{error:#}").contains("Broken"));
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(parse_profiles("").is_err());
    }

    #[test]
    fn missing_file_path_yields_builtins() {
        let catalog = load_catalog(None).expect("builtin catalog");
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["Easy", "Medium", "Hard"]);
    }
}
