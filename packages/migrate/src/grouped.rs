//! Hierarchy construction for externally grouped sources.
//!
//! Some layers (machines grouped by production team) have no zone codes
//! of their own: the hierarchy comes from grouping keys instead. Codes
//! are synthesized from zero-padded per-level indices so the forest
//! still has a stable code identity, and capacities stay unset — there
//! is no occupancy source for these hierarchies.

use std::collections::BTreeMap;

use factory_map_zone_models::{
    OTHER_GROUP_COLOR, Rgb, ZoneForest, ZoneLevel, ZoneNode,
};
use geo::LineString;

/// Darkening factor for subgroup nodes relative to their group color.
const SUBGROUP_DARKEN: f64 = 0.7;

/// Darkening factor for item nodes relative to their group color.
const ITEM_DARKEN: f64 = 0.5;

/// One grouped source row: a leaf item with its grouping keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedItem {
    /// Top-level group (the field-level node), e.g. a team name.
    pub group: String,
    /// Optional middle grouping key; items without one group under
    /// themselves.
    pub subgroup: Option<String>,
    /// Leaf item identifier.
    pub item: String,
    /// Optional human-readable description for the leaf.
    pub description: Option<String>,
}

impl GroupedItem {
    /// The subgroup key this item files under: its subgroup when
    /// present, else the item itself.
    #[must_use]
    pub fn subgroup_key(&self) -> &str {
        self.subgroup.as_deref().unwrap_or(&self.item)
    }
}

/// Builds a forest from grouped items.
///
/// Groups, subgroups, and items are each assigned zero-padded
/// two-digit indices in sorted order, concatenated into synthetic
/// codes (`GG`, `GGSS`, `GGSSII`). Group colors come from the caller's
/// map, falling back to the catch-all gray; capacities are left unset.
#[must_use]
pub fn build_grouped_forest(
    items: &[GroupedItem],
    group_colors: &BTreeMap<String, Rgb>,
) -> ZoneForest {
    // group -> subgroup key -> items
    let mut categorized: BTreeMap<&str, BTreeMap<&str, Vec<&GroupedItem>>> = BTreeMap::new();
    for item in items {
        categorized
            .entry(item.group.as_str())
            .or_default()
            .entry(item.subgroup_key())
            .or_default()
            .push(item);
    }

    let mut forest = ZoneForest::new();

    for (group_index, (group, subgroups)) in categorized.iter().enumerate() {
        let group_code = format!("{:02}", group_index + 1);
        let group_color = group_colors
            .get(*group)
            .copied()
            .unwrap_or(OTHER_GROUP_COLOR);

        forest.insert(ZoneNode {
            code: group_code.clone(),
            level: ZoneLevel::Polje,
            parent_code: None,
            name: (*group).to_string(),
            color: group_color,
            note: Some((*group).to_string()),
            geometry: LineString::new(vec![]),
            max_capacity: None,
            taken_capacity: None,
        });

        for (subgroup_index, (subgroup_key, members)) in subgroups.iter().enumerate() {
            let subgroup_code = format!("{group_code}{:02}", subgroup_index + 1);

            forest.insert(ZoneNode {
                code: subgroup_code.clone(),
                level: ZoneLevel::Subzone,
                parent_code: Some(group_code.clone()),
                name: (*subgroup_key).to_string(),
                color: group_color.darken(SUBGROUP_DARKEN),
                note: Some(format!("{group} - {subgroup_key}")),
                geometry: LineString::new(vec![]),
                max_capacity: None,
                taken_capacity: None,
            });

            let mut members: Vec<&GroupedItem> = members.iter().copied().collect();
            members.sort_by(|a, b| a.item.cmp(&b.item));

            for (item_index, member) in members.iter().enumerate() {
                let item_code = format!("{subgroup_code}{:02}", item_index + 1);
                let note = member
                    .description
                    .clone()
                    .unwrap_or_else(|| member.item.clone());

                forest.insert(ZoneNode {
                    code: item_code,
                    level: ZoneLevel::Vrsta,
                    parent_code: Some(subgroup_code.clone()),
                    name: member.item.clone(),
                    color: group_color.darken(ITEM_DARKEN),
                    note: Some(note),
                    geometry: LineString::new(vec![]),
                    max_capacity: None,
                    taken_capacity: None,
                });
            }
        }
    }

    forest
}
