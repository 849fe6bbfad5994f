#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone hierarchy node and level types for the factory map.
//!
//! A storage zone is identified by a hierarchical string code whose prefix
//! length encodes granularity: the first 4 characters name the field
//! (polje), the first 5 the subzone, and the full code the row (vrsta).
//! These types represent one rebuilt-per-batch forest of such zones; the
//! forest owns its nodes by code, and parent links are code keys rather
//! than references.

use std::collections::BTreeMap;

use geo::LineString;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Granularity level of a zone, coarsest to finest.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneLevel {
    /// Field level, addressed by the 4-character code prefix.
    Polje,
    /// Subzone level, addressed by the 5-character code prefix.
    Subzone,
    /// Row level, addressed by the full code.
    Vrsta,
}

impl ZoneLevel {
    /// Returns the depth of this level in the hierarchy (polje = 0).
    #[must_use]
    pub const fn depth(self) -> u8 {
        match self {
            Self::Polje => 0,
            Self::Subzone => 1,
            Self::Vrsta => 2,
        }
    }

    /// Returns all levels, coarsest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Polje, Self::Subzone, Self::Vrsta]
    }
}

/// An RGB display color, serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// Fallback display color used when a zone has no assigned color.
pub const DEFAULT_COLOR: Rgb = Rgb {
    r: 0x33,
    g: 0xac,
    b: 0xff,
};

/// Gray assigned to the catch-all group of non-production hierarchies.
pub const OTHER_GROUP_COLOR: Rgb = Rgb {
    r: 0x80,
    g: 0x80,
    b: 0x80,
};

impl Rgb {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Darkens each channel by the given multiplicative factor,
    /// flooring to an integer channel value.
    #[must_use]
    pub fn darken(self, factor: f64) -> Self {
        let scale = |c: u8| {
            let scaled = (f64::from(c) * factor).floor();
            if scaled <= 0.0 {
                0
            } else if scaled >= 255.0 {
                255
            } else {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    scaled as u8
                }
            }
        };
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }

    /// Parses a `#rrggbb` (or `rrggbb`) hex string.
    ///
    /// # Errors
    ///
    /// Returns [`ParseColorError`] if the input is not six hex digits.
    pub fn from_hex(input: &str) -> Result<Self, ParseColorError> {
        let hex = input.strip_prefix('#').unwrap_or(input);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError {
                input: input.to_string(),
            });
        }
        let channel = |range| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError {
                input: input.to_string(),
            })
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError {
    /// The rejected input string.
    pub input: String,
}

impl std::fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid hex color {:?}: expected #rrggbb", self.input)
    }
}

impl std::error::Error for ParseColorError {}

/// Occupancy capacity of a zone: total positions and positions taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capacity {
    /// Total capacity (active + closed units).
    pub total: u64,
    /// Capacity currently taken (closed units).
    pub taken: u64,
}

impl Capacity {
    /// Adds another capacity into this one.
    pub fn accumulate(&mut self, other: Self) {
        self.total += other.total;
        self.taken += other.taken;
    }
}

/// One node of a zone hierarchy.
///
/// Nodes are owned by their [`ZoneForest`] keyed by code; `parent_code`
/// is a lookup key into the same forest, never the node's own code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneNode {
    /// Full zone code at this node's granularity.
    pub code: String,
    /// Granularity level.
    pub level: ZoneLevel,
    /// Code of the parent node, if any.
    pub parent_code: Option<String>,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: Rgb,
    /// Free-form note.
    pub note: Option<String>,
    /// Polygon ring (closed: first vertex repeated last). Empty until
    /// the layout pass seeds it.
    pub geometry: LineString<f64>,
    /// Total capacity. `None` for hierarchies without occupancy data.
    pub max_capacity: Option<u64>,
    /// Taken capacity. `None` for hierarchies without occupancy data.
    pub taken_capacity: Option<u64>,
}

/// Input to the hierarchy builder: one full-granularity code plus the
/// optional human-readable fields used for naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSeed {
    /// Full-granularity zone code.
    pub code: String,
    /// Human-readable field (polje) label.
    pub field_label: Option<String>,
    /// Human-readable description, used to name subzone/vrsta nodes.
    pub description: Option<String>,
}

/// A deduplicated forest of zone nodes keyed by code.
///
/// Rebuilt from scratch on every batch ingestion; parent links resolve
/// by code lookup within the same forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneForest {
    nodes: BTreeMap<String, ZoneNode>,
}

impl ZoneForest {
    /// Creates an empty forest.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Inserts a node, replacing any previous node with the same code.
    pub fn insert(&mut self, node: ZoneNode) {
        self.nodes.insert(node.code.clone(), node);
    }

    /// Looks up a node by code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&ZoneNode> {
        self.nodes.get(code)
    }

    /// Looks up a node by code for mutation.
    pub fn get_mut(&mut self, code: &str) -> Option<&mut ZoneNode> {
        self.nodes.get_mut(code)
    }

    /// Returns whether a node with the given code exists.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.nodes.contains_key(code)
    }

    /// Resolves a node's parent node, if it has one.
    #[must_use]
    pub fn parent_of(&self, code: &str) -> Option<&ZoneNode> {
        self.nodes
            .get(code)
            .and_then(|node| node.parent_code.as_deref())
            .and_then(|parent| self.nodes.get(parent))
    }

    /// Number of nodes in the forest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in code order.
    pub fn iter(&self) -> impl Iterator<Item = &ZoneNode> {
        self.nodes.values()
    }

    /// Iterates over all nodes in code order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ZoneNode> {
        self.nodes.values_mut()
    }

    /// Returns the codes of all nodes at the given level, in code order.
    #[must_use]
    pub fn codes_at(&self, level: ZoneLevel) -> Vec<&str> {
        self.nodes
            .values()
            .filter(|node| node.level == level)
            .map(|node| node.code.as_str())
            .collect()
    }

    /// Number of nodes at the given level.
    #[must_use]
    pub fn count_at(&self, level: ZoneLevel) -> usize {
        self.nodes
            .values()
            .filter(|node| node.level == level)
            .count()
    }
}

impl<'a> IntoIterator for &'a ZoneForest {
    type Item = &'a ZoneNode;
    type IntoIter = std::collections::btree_map::Values<'a, String, ZoneNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.values()
    }
}
