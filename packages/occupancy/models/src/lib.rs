#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Occupancy record, filter, and aggregation index types.
//!
//! An occupancy record counts active and closed units tagged to one
//! exact zone code, plus arbitrary filterable attributes from the
//! production-tracking source. Records are immutable inputs; filtering
//! and aggregation never mutate them.

use std::collections::BTreeMap;

use factory_map_zone_models::Capacity;
use serde::{Deserialize, Serialize};

/// A filterable attribute value from the production-tracking source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Integral value (operation numbers, group ciphers).
    Number(i64),
    /// Free-form text (status, article, order references).
    Text(String),
}

impl AttrValue {
    /// Returns the numeric value, if this attribute is numeric.
    #[must_use]
    pub const fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Returns the textual value, if this attribute is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One raw occupancy row: unit counts tagged to an exact zone code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyRecord {
    /// Exact, full-granularity zone code.
    pub zone_code: String,
    /// Units currently active (in transit, not yet occupying capacity).
    pub active_count: u64,
    /// Units closed onto the zone (occupying capacity).
    pub closed_count: u64,
    /// Human-readable field (polje) label, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_label: Option<String>,
    /// Human-readable description for finer levels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remaining filterable source fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
}

/// Inclusive numeric range test on a named attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFilter {
    /// Attribute to test.
    pub attribute: String,
    /// Lower bound, inclusive. `None` leaves the range open below.
    pub min: Option<i64>,
    /// Upper bound, inclusive. `None` leaves the range open above.
    pub max: Option<i64>,
}

/// Exact-string membership test on a named attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipFilter {
    /// Attribute to test.
    pub attribute: String,
    /// Accepted values; a record matches if its value equals any one.
    pub values: Vec<String>,
}

/// Substring test on a named attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringFilter {
    /// Attribute to test.
    pub attribute: String,
    /// Substring that must occur in the attribute value.
    pub needle: String,
}

/// OR of substring tests on a named attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringAnyFilter {
    /// Attribute to test.
    pub attribute: String,
    /// A record matches if any needle occurs in the attribute value.
    pub needles: Vec<String>,
}

/// Conjunctive filter over occupancy records.
///
/// Filter kinds combine with AND; values within a multi-value filter
/// combine with OR. Absent filters exclude nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Prefix match on the zone code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_prefix: Option<String>,
    /// Inclusive numeric ranges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<RangeFilter>,
    /// Exact-string memberships.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<MembershipFilter>,
    /// Substring tests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<SubstringFilter>,
    /// OR-of-substring tests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains_any: Vec<SubstringAnyFilter>,
}

impl FilterSpec {
    /// Whether this spec excludes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code_prefix.is_none()
            && self.ranges.is_empty()
            && self.one_of.is_empty()
            && self.contains.is_empty()
            && self.contains_any.is_empty()
    }
}

/// Per-prefix-length occupancy sums, enabling O(log n) lookup of the
/// combined counts at any hierarchy level.
///
/// Field and subzone maps are keyed by 4- and 5-character truncations;
/// the vrsta map is keyed by the full code, since vrsta granularity is
/// the whole code rather than a fixed six characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationIndex {
    /// Sums keyed by 4-character field prefix.
    pub by_field: BTreeMap<String, Capacity>,
    /// Sums keyed by 5-character subzone prefix.
    pub by_subzone: BTreeMap<String, Capacity>,
    /// Sums keyed by full code.
    pub by_vrsta: BTreeMap<String, Capacity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_value_accessors() {
        assert_eq!(AttrValue::from(40).as_number(), Some(40));
        assert_eq!(AttrValue::from(40).as_text(), None);
        assert_eq!(AttrValue::from("Zaprt").as_text(), Some("Zaprt"));
        assert_eq!(AttrValue::from("Zaprt").as_number(), None);
    }

    #[test]
    fn empty_filter_spec_is_empty() {
        assert!(FilterSpec::default().is_empty());
    }

    #[test]
    fn populated_filter_spec_is_not_empty() {
        let spec = FilterSpec {
            code_prefix: Some("5012".to_string()),
            ..FilterSpec::default()
        };
        assert!(!spec.is_empty());
    }

    #[test]
    fn attr_value_round_trips_untagged() {
        let json = serde_json::to_string(&AttrValue::from(7)).unwrap();
        assert_eq!(json, "7");
        let back: AttrValue = serde_json::from_str("\"Aktiven\"").unwrap();
        assert_eq!(back, AttrValue::from("Aktiven"));
    }
}
