//! Query-time occupancy overlay for an existing forest.
//!
//! Given a filtered view of the raw records, resolves each zone's
//! occupancy at its own granularity: a field-level zone reports every
//! matching record sharing its 4-character prefix, a vrsta-level zone
//! only exact code matches. Zones with no matching records are omitted,
//! so the caller joins counts onto only the features that lit up.

use std::collections::BTreeMap;

use factory_map_occupancy::{aggregate, filter};
use factory_map_occupancy_models::{FilterSpec, OccupancyRecord};
use factory_map_zone_models::{Capacity, ZoneForest};

/// Resolves filtered occupancy per zone, keyed by zone code.
#[must_use]
pub fn occupancy_by_node(
    forest: &ZoneForest,
    records: &[OccupancyRecord],
    spec: &FilterSpec,
) -> BTreeMap<String, Capacity> {
    let filtered = filter::apply(records, spec);
    let index = aggregate::index(filtered.iter().copied());

    forest
        .iter()
        .filter_map(|node| {
            let capacity = aggregate::capacity(&index, &node.code, node.level);
            (capacity.total > 0).then(|| (node.code.clone(), capacity))
        })
        .collect()
}
