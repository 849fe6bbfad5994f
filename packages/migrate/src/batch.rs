//! One idempotent ingestion batch: records in, placed and normalized
//! forest out.
//!
//! A batch is a pure function of its input records and options. Rows
//! with no units at all are not part of the batch (the source query
//! only selects zones with activity); every other record either
//! contributes to the forest or is reported as rejected.

use factory_map_geometry::normalize::{NormalizeOutcome, normalize};
use factory_map_geometry::placement::GridLayout;
use factory_map_geometry::reference::ReferenceFrame;
use factory_map_geometry::ring::seed_rect;
use factory_map_occupancy::aggregate;
use factory_map_occupancy_models::OccupancyRecord;
use factory_map_zone::hierarchy::{self, RejectedSeed};
use factory_map_zone_models::{ZoneForest, ZoneLevel, ZoneSeed};

use crate::MigrateError;

/// What to do when a record fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RejectPolicy {
    /// Fail the whole batch on the first invalid record.
    #[default]
    Abort,
    /// Skip invalid records, reporting them in the batch report.
    Skip,
}

/// Configuration for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchOptions {
    /// Policy for invalid records.
    pub policy: RejectPolicy,
    /// Grid used to seed geometry for the new nodes.
    pub layout: GridLayout,
    /// Reference frame every seeded ring is normalized against.
    pub reference: ReferenceFrame,
}

/// A ring that could not be fully normalized, with the zone it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGeometry {
    /// Code of the zone whose ring was skipped.
    pub code: String,
    /// Why rescaling was not possible.
    pub reason: String,
}

/// A non-fatal data-quality finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQualityWarning {
    /// Code of the affected zone.
    pub code: String,
    /// Description of the inconsistency.
    pub message: String,
}

/// Complete result of one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// The placed, normalized forest for this batch.
    pub forest: ZoneForest,
    /// Records rejected during hierarchy construction (empty under
    /// [`RejectPolicy::Abort`], which turns the first into an error).
    pub rejected: Vec<RejectedSeed>,
    /// Data-quality warnings (taken capacity exceeding max).
    pub warnings: Vec<DataQualityWarning>,
    /// Number of rings fully normalized.
    pub normalized: usize,
    /// Rings that could not be fully normalized.
    pub skipped: Vec<SkippedGeometry>,
}

/// Runs one batch: hierarchy, capacities, placement, normalization.
///
/// Deterministic for a given input; re-running the same batch yields
/// an identical report, so ingestion is idempotent per batch once the
/// caller clears previous output.
///
/// # Errors
///
/// Returns [`MigrateError::InvalidRecord`] if a record is rejected and
/// the policy is [`RejectPolicy::Abort`].
pub fn run(records: &[OccupancyRecord], options: &BatchOptions) -> Result<BatchReport, MigrateError> {
    // Only zones with any units participate, matching the source query.
    let live: Vec<&OccupancyRecord> = records
        .iter()
        .filter(|record| record.active_count > 0 || record.closed_count > 0)
        .collect();
    log::info!(
        "Starting batch: {} records ({} with units)",
        records.len(),
        live.len()
    );

    let seeds: Vec<ZoneSeed> = live
        .iter()
        .map(|record| ZoneSeed {
            code: record.zone_code.clone(),
            field_label: record.field_label.clone(),
            description: record.description.clone(),
        })
        .collect();

    let outcome = hierarchy::build(&seeds);
    let mut report = BatchReport {
        forest: outcome.forest,
        ..BatchReport::default()
    };

    if let Some(first) = outcome.rejected.first() {
        match options.policy {
            RejectPolicy::Abort => {
                return Err(MigrateError::InvalidRecord {
                    code: first.code.clone(),
                    message: first.error.to_string(),
                });
            }
            RejectPolicy::Skip => {
                for rejected in &outcome.rejected {
                    log::warn!("Skipping record {:?}: {}", rejected.code, rejected.error);
                }
                report.rejected = outcome.rejected;
            }
        }
    }

    apply_capacities(&mut report, live.iter().copied());
    place_forest(&mut report.forest, &options.layout);
    normalize_forest(&mut report, &options.reference);

    for &level in ZoneLevel::all() {
        log::info!(
            "Created {} {level} zones",
            report.forest.count_at(level)
        );
    }
    log::info!(
        "Batch complete: {} zones, {} normalized, {} skipped, {} rejected",
        report.forest.len(),
        report.normalized,
        report.skipped.len(),
        report.rejected.len()
    );

    Ok(report)
}

/// Sets every node's capacity from the aggregation index at the node's
/// own level, reporting any taken-over-max inconsistency.
fn apply_capacities<'a, I>(report: &mut BatchReport, records: I)
where
    I: IntoIterator<Item = &'a OccupancyRecord>,
{
    let index = aggregate::index(records);
    for node in report.forest.iter_mut() {
        let capacity = aggregate::capacity(&index, &node.code, node.level);
        node.max_capacity = Some(capacity.total);
        node.taken_capacity = Some(capacity.taken);
        if capacity.taken > capacity.total {
            let message = format!(
                "taken capacity {} exceeds max capacity {}",
                capacity.taken, capacity.total
            );
            log::warn!("Zone {}: {message}", node.code);
            report.warnings.push(DataQualityWarning {
                code: node.code.clone(),
                message,
            });
        }
    }
}

/// Seeds each node's geometry with a default rectangle on the grid,
/// walking every level's nodes in code order.
fn place_forest(forest: &mut ZoneForest, layout: &GridLayout) {
    for &level in ZoneLevel::all() {
        let codes: Vec<String> = forest
            .codes_at(level)
            .into_iter()
            .map(str::to_string)
            .collect();
        let total = codes.len();
        for (index, code) in codes.iter().enumerate() {
            let origin = layout.position(index, total, level);
            if let Some(node) = forest.get_mut(code) {
                node.geometry = seed_rect(origin, level);
            }
        }
    }
}

/// Normalizes every ring in the forest against the reference frame.
fn normalize_forest(report: &mut BatchReport, reference: &ReferenceFrame) {
    let mut normalized = 0_usize;
    let mut skipped = Vec::new();
    for node in report.forest.iter_mut() {
        match normalize(&node.geometry, reference) {
            NormalizeOutcome::Normalized(ring) => {
                node.geometry = ring;
                normalized += 1;
            }
            NormalizeOutcome::Skipped { ring, reason } => {
                log::warn!("Zone {}: geometry not normalized ({reason})", node.code);
                node.geometry = ring;
                skipped.push(SkippedGeometry {
                    code: node.code.clone(),
                    reason: reason.to_string(),
                });
            }
        }
    }
    report.normalized = normalized;
    report.skipped = skipped;
}

#[cfg(test)]
mod tests {
    use factory_map_geometry::ring;

    use super::*;

    fn record(code: &str, active: u64, closed: u64) -> OccupancyRecord {
        OccupancyRecord {
            zone_code: code.to_string(),
            active_count: active,
            closed_count: closed,
            field_label: None,
            description: None,
            attributes: std::collections::BTreeMap::new(),
        }
    }

    fn sample_records() -> Vec<OccupancyRecord> {
        vec![
            record("501201", 2, 3),
            record("501202", 1, 1),
            record("50130", 0, 4),
        ]
    }

    #[test]
    fn builds_places_and_normalizes_the_forest() {
        let report = run(&sample_records(), &BatchOptions::default()).unwrap();

        assert_eq!(report.forest.len(), 6);
        assert_eq!(report.forest.count_at(ZoneLevel::Polje), 2);
        assert_eq!(report.forest.count_at(ZoneLevel::Subzone), 2);
        assert_eq!(report.forest.count_at(ZoneLevel::Vrsta), 2);
        assert_eq!(report.normalized, 6);
        assert!(report.skipped.is_empty());
        assert!(report.rejected.is_empty());
        assert!(report.warnings.is_empty());

        for node in &report.forest {
            assert!(ring::is_closed(&node.geometry));
            assert_eq!(node.geometry.0.len(), 5);
        }
    }

    #[test]
    fn capacities_roll_up_by_level() {
        let report = run(&sample_records(), &BatchOptions::default()).unwrap();
        let forest = &report.forest;

        let field = forest.get("5012").unwrap();
        assert_eq!(field.max_capacity, Some(7));
        assert_eq!(field.taken_capacity, Some(4));

        let subzone = forest.get("50130").unwrap();
        assert_eq!(subzone.max_capacity, Some(4));
        assert_eq!(subzone.taken_capacity, Some(4));

        let vrsta = forest.get("501202").unwrap();
        assert_eq!(vrsta.max_capacity, Some(2));
        assert_eq!(vrsta.taken_capacity, Some(1));
    }

    #[test]
    fn records_without_units_are_not_ingested() {
        let records = vec![record("501201", 1, 0), record("60110", 0, 0)];
        let report = run(&records, &BatchOptions::default()).unwrap();

        assert!(report.forest.get("6011").is_none());
        assert!(report.forest.get("5012").is_some());
    }

    #[test]
    fn abort_policy_fails_the_batch_on_an_invalid_record() {
        let records = vec![record("", 1, 0), record("501201", 1, 0)];
        let error = run(&records, &BatchOptions::default()).unwrap_err();
        assert!(matches!(error, MigrateError::InvalidRecord { .. }));
    }

    #[test]
    fn skip_policy_reports_and_continues() {
        let records = vec![record("", 1, 0), record("501201", 1, 0)];
        let options = BatchOptions {
            policy: RejectPolicy::Skip,
            ..BatchOptions::default()
        };
        let report = run(&records, &options).unwrap();

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].code, "");
        assert_eq!(report.forest.len(), 3);
    }

    #[test]
    fn batch_runs_are_idempotent() {
        let records = sample_records();
        let options = BatchOptions::default();
        let first = run(&records, &options).unwrap();
        let second = run(&records, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn batch_output_is_independent_of_record_order() {
        let mut reversed = sample_records();
        reversed.reverse();
        let forward = run(&sample_records(), &BatchOptions::default()).unwrap();
        let backward = run(&reversed, &BatchOptions::default()).unwrap();
        assert_eq!(forward.forest, backward.forest);
    }

    #[test]
    fn seeded_rings_match_the_reference_aspect_in_its_frame() {
        let reference = ReferenceFrame {
            orientation: 30.0_f64.to_radians(),
            aspect_ratio: 2.5,
        };
        let options = BatchOptions {
            reference,
            ..BatchOptions::default()
        };
        let report = run(&sample_records(), &options).unwrap();

        for node in &report.forest {
            // Rotate the output back into the reference axis and
            // measure its bounding box there.
            let cos = (-reference.orientation).cos();
            let sin = (-reference.orientation).sin();
            let mut min_x = f64::INFINITY;
            let mut max_x = f64::NEG_INFINITY;
            let mut min_y = f64::INFINITY;
            let mut max_y = f64::NEG_INFINITY;
            for c in &node.geometry.0 {
                let x = c.x * cos - c.y * sin;
                let y = c.x * sin + c.y * cos;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
            let aspect = (max_x - min_x) / (max_y - min_y);
            assert!(
                (aspect - reference.aspect_ratio).abs() < 1e-9,
                "zone {} has aspect {aspect}",
                node.code
            );
        }
    }

    #[test]
    fn placement_stays_inside_the_layout_bounds() {
        let options = BatchOptions::default();
        let report = run(&sample_records(), &options).unwrap();

        for node in &report.forest {
            let centroid = ring::vertex_centroid(&node.geometry).unwrap();
            // Normalization preserves centroids, so every zone centers
            // near its grid cell, well inside the canvas.
            assert!(centroid.x >= options.layout.x_min);
            assert!(centroid.y >= options.layout.y_min);
            assert!(centroid.x <= options.layout.x_max);
            assert!(centroid.y <= options.layout.y_max);
        }
    }
}
