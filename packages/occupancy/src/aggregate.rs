//! Level-aware occupancy aggregation.
//!
//! One pass over (already filtered) records builds sums at every
//! granularity at once. Total capacity counts active and closed units;
//! taken capacity counts only closed units, since closed units occupy
//! their position while active ones are still in transit.

use factory_map_occupancy_models::{AggregationIndex, OccupancyRecord};
use factory_map_zone::code::{field_code, subzone_code, truncate_for};
use factory_map_zone_models::{Capacity, ZoneLevel};

/// Builds the aggregation index in a single pass.
#[must_use]
pub fn index<'a, I>(records: I) -> AggregationIndex
where
    I: IntoIterator<Item = &'a OccupancyRecord>,
{
    let mut index = AggregationIndex::default();
    for record in records {
        let capacity = Capacity {
            total: record.active_count + record.closed_count,
            taken: record.closed_count,
        };
        index
            .by_field
            .entry(field_code(&record.zone_code).to_string())
            .or_default()
            .accumulate(capacity);
        index
            .by_subzone
            .entry(subzone_code(&record.zone_code).to_string())
            .or_default()
            .accumulate(capacity);
        index
            .by_vrsta
            .entry(record.zone_code.clone())
            .or_default()
            .accumulate(capacity);
    }
    index
}

/// Looks up the summed capacity for a code at a given level.
///
/// The code is truncated to the prefix the level aggregates at; codes
/// absent from the index report zero.
#[must_use]
pub fn capacity(index: &AggregationIndex, code: &str, level: ZoneLevel) -> Capacity {
    let key = truncate_for(code, level);
    let map = match level {
        ZoneLevel::Polje => &index.by_field,
        ZoneLevel::Subzone => &index.by_subzone,
        ZoneLevel::Vrsta => &index.by_vrsta,
    };
    map.get(key).copied().unwrap_or_default()
}

/// Looks up the summed total (active + closed) for a code at a level.
#[must_use]
pub fn total(index: &AggregationIndex, code: &str, level: ZoneLevel) -> u64 {
    capacity(index, code, level).total
}

/// Looks up the summed taken count (closed units) for a code at a level.
#[must_use]
pub fn taken(index: &AggregationIndex, code: &str, level: ZoneLevel) -> u64 {
    capacity(index, code, level).taken
}
