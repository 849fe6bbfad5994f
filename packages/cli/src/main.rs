#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the factory map toolchain.
//!
//! Runs the ingestion batch over a raw occupancy CSV export, answers
//! filtered occupancy searches, and re-normalizes the polygons of an
//! already exported feature collection.

mod features;
mod records;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use factory_map_geometry::reference::ReferenceFrame;
use factory_map_migrate::batch::{BatchOptions, RejectPolicy, run};
use factory_map_occupancy::{aggregate, filter};
use factory_map_occupancy_models::{
    FilterSpec, MembershipFilter, RangeFilter, SubstringAnyFilter, SubstringFilter,
};

#[derive(Parser)]
#[command(name = "factory_map_cli", about = "Factory map migration toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full ingestion batch from a CSV export and write the
    /// resulting zone features as GeoJSON
    Migrate {
        /// Path to the occupancy CSV export
        #[arg(long)]
        input: PathBuf,
        /// Path of the GeoJSON feature collection to write
        #[arg(long)]
        output: PathBuf,
        /// Skip rows that fail to parse or validate instead of
        /// aborting the whole batch
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Aggregate filtered occupancy counts and print them as JSON
    Search {
        /// Path to the occupancy CSV export
        #[arg(long)]
        input: PathBuf,
        /// Prefix match on the zone code (e.g. "5012")
        #[arg(long)]
        zone_prefix: Option<String>,
        /// Inclusive numeric range on an attribute, as `ATTR:MIN:MAX`
        /// (either bound may be empty)
        #[arg(long)]
        range: Vec<String>,
        /// Exact-value membership on an attribute, as `ATTR:V1,V2`
        #[arg(long)]
        one_of: Vec<String>,
        /// Substring match on an attribute, as `ATTR:NEEDLE`
        #[arg(long)]
        contains: Vec<String>,
        /// Any-of-substrings match on an attribute, as `ATTR:V1,V2`
        #[arg(long)]
        contains_any: Vec<String>,
    },
    /// Re-normalize the polygons of an existing GeoJSON feature
    /// collection against the reference orientation and aspect ratio
    Normalize {
        /// Path to the GeoJSON feature collection to read
        #[arg(long)]
        input: PathBuf,
        /// Path of the normalized feature collection to write
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate {
            input,
            output,
            skip_invalid,
        } => migrate(&input, &output, skip_invalid),
        Commands::Search {
            input,
            zone_prefix,
            range,
            one_of,
            contains,
            contains_any,
        } => search(&input, zone_prefix, &range, &one_of, &contains, &contains_any),
        Commands::Normalize { input, output } => normalize(&input, &output),
    }
}

fn migrate(
    input: &Path,
    output: &Path,
    skip_invalid: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = records::read_csv(input)?;
    if !parsed.errors.is_empty() {
        if skip_invalid {
            for error in &parsed.errors {
                log::warn!("Skipping {error}");
            }
        } else {
            return Err(format!(
                "{} rows failed to parse (first: {}); use --skip-invalid to continue",
                parsed.errors.len(),
                parsed.errors[0]
            )
            .into());
        }
    }

    let options = BatchOptions {
        policy: if skip_invalid {
            RejectPolicy::Skip
        } else {
            RejectPolicy::Abort
        },
        ..BatchOptions::default()
    };
    let report = run(&parsed.records, &options)?;

    let collection = features::forest_to_features(&report.forest);
    std::fs::write(output, collection.to_string())?;

    log::info!(
        "Wrote {} features to {} ({} normalized, {} skipped)",
        report.forest.len(),
        output.display(),
        report.normalized,
        report.skipped.len()
    );
    Ok(())
}

fn search(
    input: &Path,
    zone_prefix: Option<String>,
    range: &[String],
    one_of: &[String],
    contains: &[String],
    contains_any: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = records::read_csv(input)?;
    for error in &parsed.errors {
        log::warn!("Ignoring {error}");
    }

    let spec = FilterSpec {
        code_prefix: zone_prefix,
        ranges: range
            .iter()
            .map(|raw| parse_range(raw))
            .collect::<Result<_, _>>()?,
        one_of: one_of
            .iter()
            .map(|raw| {
                parse_multi(raw).map(|(attribute, values)| MembershipFilter { attribute, values })
            })
            .collect::<Result<_, _>>()?,
        contains: contains
            .iter()
            .map(|raw| {
                parse_pair(raw).map(|(attribute, needle)| SubstringFilter { attribute, needle })
            })
            .collect::<Result<_, _>>()?,
        contains_any: contains_any
            .iter()
            .map(|raw| {
                parse_multi(raw)
                    .map(|(attribute, needles)| SubstringAnyFilter { attribute, needles })
            })
            .collect::<Result<_, _>>()?,
    };

    let filtered = filter::apply(&parsed.records, &spec);
    log::info!(
        "{} of {} records match the filters",
        filtered.len(),
        parsed.records.len()
    );

    let index = aggregate::index(filtered.iter().copied());
    println!("{}", serde_json::to_string_pretty(&index)?);
    Ok(())
}

fn normalize(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(input)?;
    let mut collection: geojson::FeatureCollection = text.parse()?;

    let frame = ReferenceFrame::default();
    let (normalized, skipped) = features::normalize_features(&mut collection, &frame);
    for label in &skipped {
        log::warn!("Could not normalize {label}");
    }

    std::fs::write(output, collection.to_string())?;
    log::info!(
        "Normalized {normalized} of {} polygon features into {}",
        normalized + skipped.len(),
        output.display()
    );
    Ok(())
}

/// Parses `ATTR:MIN:MAX` where either bound may be empty.
fn parse_range(raw: &str) -> Result<RangeFilter, String> {
    let parts: Vec<&str> = raw.splitn(3, ':').collect();
    let [attribute, min, max] = parts.as_slice() else {
        return Err(format!("invalid range {raw:?}: expected ATTR:MIN:MAX"));
    };
    let bound = |value: &str| -> Result<Option<i64>, String> {
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid range bound {value:?} in {raw:?}"))
    };
    Ok(RangeFilter {
        attribute: (*attribute).to_string(),
        min: bound(min)?,
        max: bound(max)?,
    })
}

/// Parses `ATTR:NEEDLE`.
fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(attribute, value)| (attribute.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid filter {raw:?}: expected ATTR:VALUE"))
}

/// Parses `ATTR:V1,V2,...`.
fn parse_multi(raw: &str) -> Result<(String, Vec<String>), String> {
    let (attribute, values) = parse_pair(raw)?;
    Ok((attribute, values.split(',').map(str::to_string).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_range() {
        let range = parse_range("operation:10:40").unwrap();
        assert_eq!(range.attribute, "operation");
        assert_eq!(range.min, Some(10));
        assert_eq!(range.max, Some(40));
    }

    #[test]
    fn parses_open_ended_ranges() {
        assert_eq!(parse_range("operation::40").unwrap().min, None);
        assert_eq!(parse_range("operation:10:").unwrap().max, None);
    }

    #[test]
    fn rejects_malformed_ranges() {
        assert!(parse_range("operation").is_err());
        assert!(parse_range("operation:ten:40").is_err());
    }

    #[test]
    fn parses_multi_value_filters() {
        let (attribute, values) = parse_multi("status:Aktiven,Zaprt").unwrap();
        assert_eq!(attribute, "status");
        assert_eq!(values, vec!["Aktiven", "Zaprt"]);
    }

    #[test]
    fn parses_substring_pairs() {
        assert_eq!(
            parse_pair("article:1234").unwrap(),
            ("article".to_string(), "1234".to_string())
        );
        assert!(parse_pair("article").is_err());
    }
}
