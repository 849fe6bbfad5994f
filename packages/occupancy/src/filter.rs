//! Conjunctive filtering of occupancy records.
//!
//! The in-memory rendition of the advanced-search WHERE clause: filter
//! kinds AND together, values within one multi-value filter OR together,
//! and absent filters exclude nothing.

use std::borrow::Cow;

use factory_map_occupancy_models::{AttrValue, FilterSpec, OccupancyRecord};

/// Returns the textual form of an attribute value; numbers compare by
/// their decimal representation.
fn attr_text(value: &AttrValue) -> Cow<'_, str> {
    match value {
        AttrValue::Text(s) => Cow::Borrowed(s.as_str()),
        AttrValue::Number(n) => Cow::Owned(n.to_string()),
    }
}

/// Tests one record against a filter spec.
#[must_use]
pub fn matches(record: &OccupancyRecord, spec: &FilterSpec) -> bool {
    if let Some(prefix) = &spec.code_prefix
        && !record.zone_code.starts_with(prefix.as_str())
    {
        return false;
    }

    for range in &spec.ranges {
        // A missing or textual attribute never satisfies a numeric
        // range, mirroring SQL NULL comparison semantics.
        let Some(value) = record
            .attributes
            .get(&range.attribute)
            .and_then(AttrValue::as_number)
        else {
            return false;
        };
        if range.min.is_some_and(|min| value < min) || range.max.is_some_and(|max| value > max) {
            return false;
        }
    }

    for membership in &spec.one_of {
        if membership.values.is_empty() {
            continue;
        }
        let matched = record.attributes.get(&membership.attribute).is_some_and(|value| {
            let text = attr_text(value);
            membership.values.iter().any(|accepted| accepted == text.as_ref())
        });
        if !matched {
            return false;
        }
    }

    for substring in &spec.contains {
        let matched = record
            .attributes
            .get(&substring.attribute)
            .is_some_and(|value| attr_text(value).contains(&substring.needle));
        if !matched {
            return false;
        }
    }

    for any in &spec.contains_any {
        if any.needles.is_empty() {
            continue;
        }
        let matched = record.attributes.get(&any.attribute).is_some_and(|value| {
            let text = attr_text(value);
            any.needles.iter().any(|needle| text.contains(needle))
        });
        if !matched {
            return false;
        }
    }

    true
}

/// Filters a record slice, preserving input order.
#[must_use]
pub fn apply<'a>(records: &'a [OccupancyRecord], spec: &FilterSpec) -> Vec<&'a OccupancyRecord> {
    records
        .iter()
        .filter(|record| matches(record, spec))
        .collect()
}
