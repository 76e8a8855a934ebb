#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that generates SAR mission maps.

mod map_transfer;
mod profiles;

use std::{
    fmt::Write as _,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sar_mission_core::VictimTier;
use sar_mission_world::{MapGenerator, MapSnapshot};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generates search-and-rescue mission maps", long_about = None)]
struct Args {
    /// Difficulty profile to generate
    #[arg(long, short, default_value = "Easy")]
    difficulty: String,

    /// Seed overriding the profile's configured seed
    #[arg(long, short)]
    seed: Option<u64>,

    /// TOML file with additional or replacement `[[profile]]` tables
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Matrix)]
    format: OutputFormat,

    /// List the available difficulty profiles and exit
    #[arg(long)]
    list: bool,

    /// Decode a transfer string instead of generating (use `-` to read stdin)
    #[arg(long, value_name = "TRANSFER")]
    decode: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One row of classification codes per grid row.
    Matrix,
    /// The full snapshot as JSON.
    Json,
    /// A single-line `sar:v1` transfer string.
    Transfer,
    /// Human-readable statistics.
    Summary,
}

/// Entry point for the SAR mission command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    let generator = MapGenerator::new(profiles::load_catalog(args.profiles.as_deref())?);
    debug!(profiles = generator.catalog().iter().count(), "profile catalog loaded");

    if args.list {
        for profile in generator.catalog().iter() {
            println!(
                "{} (seed {}, {}x{})",
                profile.name,
                profile.rng_seed,
                profile.layout.size.width(),
                profile.layout.size.height()
            );
        }
        return Ok(());
    }

    let snapshot = match args.decode.as_deref() {
        Some(transfer) => {
            let transfer = read_transfer(transfer)?;
            map_transfer::decode(&transfer).context("failed to decode transfer string")?
        }
        None => generator
            .generate_map(&args.difficulty, args.seed)
            .with_context(|| format!("failed to generate `{}` map", args.difficulty))?,
    };

    print!("{}", render(&snapshot, args.format)?);
    Ok(())
}

fn read_transfer(argument: &str) -> Result<String> {
    if argument != "-" {
        return Ok(argument.to_owned());
    }
    let mut buffer = String::new();
    let _ = io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read transfer string from stdin")?;
    Ok(buffer)
}

fn render(snapshot: &MapSnapshot, format: OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Matrix => render_matrix(snapshot),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(snapshot).context("failed to serialise snapshot")?;
            json.push('\n');
            json
        }
        OutputFormat::Transfer => {
            let mut line = map_transfer::encode(snapshot).context("failed to encode snapshot")?;
            line.push('\n');
            line
        }
        OutputFormat::Summary => render_summary(snapshot)?,
    };
    Ok(output)
}

fn render_matrix(snapshot: &MapSnapshot) -> String {
    snapshot
        .matrix()
        .iter()
        .map(|row| {
            let mut line = row
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            line.push('\n');
            line
        })
        .collect()
}

fn render_summary(snapshot: &MapSnapshot) -> Result<String> {
    let size = snapshot.size();
    let report = snapshot.report();
    let mut out = String::new();
    writeln!(out, "difficulty: {}", snapshot.difficulty())?;
    writeln!(out, "seed: {}", snapshot.seed())?;
    writeln!(out, "grid: {}x{}", size.width(), size.height())?;
    writeln!(out, "start: {}", snapshot.start())?;
    writeln!(
        out,
        "walls: {} ({} hazardous)",
        snapshot.walls().len(),
        snapshot.hazard_walls().len()
    )?;
    writeln!(
        out,
        "passable: {} ({:.1}%, minimum {:.1}%)",
        snapshot.passable_count(),
        snapshot.passable_ratio() * 100.0,
        snapshot.min_passable_ratio() * 100.0
    )?;
    writeln!(
        out,
        "segments: {}/{} placed, {} failed attempts",
        report.walls.segments_placed, report.walls.segments_requested, report.walls.failed_attempts
    )?;
    for tier in VictimTier::ALL {
        let outcome = report.victims.tier(tier);
        writeln!(
            out,
            "{} victims: {}/{}",
            tier.label(),
            outcome.placed,
            outcome.requested
        )?;
    }
    writeln!(
        out,
        "high tier separation: {} ({} fallback placements)",
        report.victims.final_separation, report.victims.fallback_placements
    )?;
    let points: Vec<String> = snapshot
        .rescue_points()
        .iter()
        .map(ToString::to_string)
        .collect();
    writeln!(
        out,
        "rescue points: {}/{} [{}]",
        report.rescue_points_placed,
        report.rescue_points_requested,
        points.join(", ")
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sar_mission_core::CellClass;

    fn snapshot() -> MapSnapshot {
        sar_mission_world::generate_map("Medium", Some(4)).expect("medium generates")
    }

    #[test]
    fn matrix_output_has_one_line_per_row() {
        let snapshot = snapshot();
        let output = render(&snapshot, OutputFormat::Matrix).expect("matrix renders");

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 40);
        assert!(lines.iter().all(|line| line.split(' ').count() == 61));
        let start = snapshot.start();
        let start_code = lines[start.row() as usize]
            .split(' ')
            .nth(start.column() as usize);
        assert_eq!(start_code, Some(CellClass::Start.code().to_string().as_str()));
    }

    #[test]
    fn summary_reports_every_tier() {
        let output = render(&snapshot(), OutputFormat::Summary).expect("summary renders");

        assert!(output.contains("difficulty: Medium"));
        assert!(output.contains("seed: 4"));
        for tier in VictimTier::ALL {
            assert!(output.contains(&format!("{} victims:", tier.label())));
        }
    }

    #[test]
    fn transfer_output_decodes_back() {
        let snapshot = snapshot();
        let output = render(&snapshot, OutputFormat::Transfer).expect("transfer renders");

        let decoded = map_transfer::decode(&output).expect("transfer decodes");
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn arguments_parse_with_defaults() {
        let args = Args::try_parse_from(["sar-mission"]).expect("defaults parse");
        assert_eq!(args.difficulty, "Easy");
        assert_eq!(args.seed, None);
        assert_eq!(args.format, OutputFormat::Matrix);

        let args = Args::try_parse_from(["sar-mission", "-d", "hard", "-s", "9", "--format", "json"])
            .expect("explicit arguments parse");
        assert_eq!(args.difficulty, "hard");
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.format, OutputFormat::Json);
    }
}
