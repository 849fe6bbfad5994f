//! Derives the zone forest from a flat batch of full-granularity codes.
//!
//! Each distinct code contributes its field (4-char prefix), subzone
//! (5-char prefix), and vrsta (full code) nodes, skipping any level that
//! would duplicate a shorter one. Parent links are resolved within the
//! same pass; a vrsta whose subzone was not materialized links directly
//! to its field.

use std::collections::BTreeMap;

use factory_map_zone_models::{Rgb, ZoneForest, ZoneLevel, ZoneNode, ZoneSeed};
use geo::LineString;

use crate::ZoneError;
use crate::code::{field_code, level_of, subzone_code, validate};
use crate::palette::{SUBZONE_DARKEN, VRSTA_DARKEN, field_colors};

/// A seed that failed validation, reported alongside the built forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSeed {
    /// The offending code, verbatim.
    pub code: String,
    /// Why the seed was rejected.
    pub error: ZoneError,
}

/// Result of a hierarchy build: the forest plus any rejected seeds.
///
/// Rejected seeds are never silently dropped; whether their presence
/// aborts the batch is the caller's policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyOutcome {
    /// The deduplicated forest keyed by code.
    pub forest: ZoneForest,
    /// Seeds whose codes failed validation, in input order.
    pub rejected: Vec<RejectedSeed>,
}

/// Builds a deduplicated forest from a batch of seeds.
///
/// The build is a pure function of its input: colors are assigned from
/// a map scoped to this pass, node naming is first-seed-wins, and the
/// same seed batch always produces the same forest.
#[must_use]
pub fn build(seeds: &[ZoneSeed]) -> HierarchyOutcome {
    let mut outcome = HierarchyOutcome::default();

    let valid: Vec<&ZoneSeed> = seeds
        .iter()
        .filter(|seed| match validate(&seed.code) {
            Ok(()) => true,
            Err(error) => {
                outcome.rejected.push(RejectedSeed {
                    code: seed.code.clone(),
                    error,
                });
                false
            }
        })
        .collect();

    let colors = field_colors(valid.iter().map(|seed| field_code(&seed.code)));

    for seed in valid {
        insert_lineage(&mut outcome.forest, seed, &colors);
    }

    outcome
}

/// Inserts the field/subzone/vrsta lineage of one seed, skipping nodes
/// that already exist or that would duplicate a shorter level.
fn insert_lineage(forest: &mut ZoneForest, seed: &ZoneSeed, colors: &BTreeMap<String, Rgb>) {
    let code = seed.code.as_str();
    let field = field_code(code);
    let subzone = subzone_code(code);
    let field_color = colors
        .get(field)
        .copied()
        .unwrap_or(factory_map_zone_models::DEFAULT_COLOR);

    if !forest.contains(field) {
        let label = seed
            .field_label
            .clone()
            .unwrap_or_else(|| format!("Polje_{field}"));
        forest.insert(ZoneNode {
            code: field.to_string(),
            level: ZoneLevel::Polje,
            parent_code: None,
            name: format!("{label} ({field})"),
            color: field_color,
            note: None,
            geometry: LineString::new(vec![]),
            max_capacity: None,
            taken_capacity: None,
        });
    }

    if subzone != field && !forest.contains(subzone) {
        let label = seed
            .description
            .clone()
            .unwrap_or_else(|| format!("Subzone_{subzone}"));
        forest.insert(ZoneNode {
            code: subzone.to_string(),
            level: ZoneLevel::Subzone,
            parent_code: Some(field.to_string()),
            name: format!("{label} ({subzone})"),
            color: field_color.darken(SUBZONE_DARKEN),
            note: Some(label),
            geometry: LineString::new(vec![]),
            max_capacity: None,
            taken_capacity: None,
        });
    }

    if level_of(code) == ZoneLevel::Vrsta && code != subzone && !forest.contains(code) {
        // Link to the subzone when this batch materialized one, else
        // directly to the field.
        let parent = if forest.contains(subzone) {
            subzone.to_string()
        } else {
            field.to_string()
        };
        let label = seed
            .description
            .clone()
            .unwrap_or_else(|| format!("Vrsta_{code}"));
        forest.insert(ZoneNode {
            code: code.to_string(),
            level: ZoneLevel::Vrsta,
            parent_code: Some(parent),
            name: format!("{label} ({code})"),
            color: field_color.darken(VRSTA_DARKEN),
            note: Some(label),
            geometry: LineString::new(vec![]),
            max_capacity: None,
            taken_capacity: None,
        });
    }
}

/// Recomputes every parent link from codes alone.
///
/// Used when a forest is reassembled from externally stored rows whose
/// links may be stale or missing. Subzones link to their field, vrsta
/// rows to their subzone when present in the forest and to their field
/// otherwise — the same fallback the single-pass build applies.
///
/// # Errors
///
/// Returns [`ZoneError::MissingAncestor`] if a subzone's field, or a
/// vrsta's field after the subzone fallback, is absent from the forest.
pub fn relink_parents(forest: &mut ZoneForest) -> Result<(), ZoneError> {
    let links: Vec<(String, Option<String>)> = forest
        .iter()
        .map(|node| {
            let parent = match node.level {
                ZoneLevel::Polje => None,
                ZoneLevel::Subzone => {
                    let field = field_code(&node.code);
                    if field == node.code || !forest.contains(field) {
                        return Err(ZoneError::MissingAncestor {
                            code: node.code.clone(),
                            ancestor: field.to_string(),
                        });
                    }
                    Some(field.to_string())
                }
                ZoneLevel::Vrsta => {
                    let subzone = subzone_code(&node.code);
                    if subzone != node.code && forest.contains(subzone) {
                        Some(subzone.to_string())
                    } else {
                        let field = field_code(&node.code);
                        if field == node.code || !forest.contains(field) {
                            return Err(ZoneError::MissingAncestor {
                                code: node.code.clone(),
                                ancestor: field.to_string(),
                            });
                        }
                        Some(field.to_string())
                    }
                }
            };
            Ok((node.code.clone(), parent))
        })
        .collect::<Result<_, _>>()?;

    for (code, parent) in links {
        if let Some(node) = forest.get_mut(&code) {
            node.parent_code = parent;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(code: &str) -> ZoneSeed {
        ZoneSeed {
            code: code.to_string(),
            field_label: None,
            description: None,
        }
    }

    fn named_seed(code: &str, label: &str, description: &str) -> ZoneSeed {
        ZoneSeed {
            code: code.to_string(),
            field_label: Some(label.to_string()),
            description: Some(description.to_string()),
        }
    }

    #[test]
    fn builds_three_level_forest() {
        let outcome = build(&[seed("501201"), seed("501202"), seed("50130")]);
        let forest = &outcome.forest;

        assert!(outcome.rejected.is_empty());
        assert_eq!(forest.len(), 6);
        assert_eq!(forest.count_at(ZoneLevel::Polje), 2);
        assert_eq!(forest.count_at(ZoneLevel::Subzone), 2);
        assert_eq!(forest.count_at(ZoneLevel::Vrsta), 2);
        assert_eq!(forest.codes_at(ZoneLevel::Polje), vec!["5012", "5013"]);
        assert_eq!(forest.codes_at(ZoneLevel::Subzone), vec!["50120", "50130"]);
        assert_eq!(
            forest.codes_at(ZoneLevel::Vrsta),
            vec!["501201", "501202"]
        );
    }

    #[test]
    fn links_each_level_to_the_one_above() {
        let outcome = build(&[seed("501201")]);
        let forest = &outcome.forest;

        assert_eq!(forest.get("5012").unwrap().parent_code, None);
        assert_eq!(
            forest.get("50120").unwrap().parent_code.as_deref(),
            Some("5012")
        );
        assert_eq!(
            forest.get("501201").unwrap().parent_code.as_deref(),
            Some("50120")
        );
    }

    #[test]
    fn four_char_code_yields_only_a_field_node() {
        let outcome = build(&[seed("5012")]);
        assert_eq!(outcome.forest.len(), 1);
        assert_eq!(outcome.forest.get("5012").unwrap().level, ZoneLevel::Polje);
    }

    #[test]
    fn five_char_code_yields_no_vrsta() {
        let outcome = build(&[seed("50130")]);
        assert_eq!(outcome.forest.len(), 2);
        assert!(outcome.forest.get("50130").is_some());
        assert_eq!(outcome.forest.count_at(ZoneLevel::Vrsta), 0);
    }

    #[test]
    fn short_code_is_used_verbatim_as_field() {
        let outcome = build(&[seed("50")]);
        assert_eq!(outcome.forest.len(), 1);
        assert_eq!(outcome.forest.get("50").unwrap().level, ZoneLevel::Polje);
    }

    #[test]
    fn duplicate_codes_do_not_duplicate_nodes() {
        let outcome = build(&[seed("501201"), seed("501201"), seed("501201")]);
        assert_eq!(outcome.forest.len(), 3);
    }

    #[test]
    fn empty_code_is_rejected_and_reported() {
        let outcome = build(&[seed(""), seed("501201")]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].code, "");
        assert!(matches!(
            outcome.rejected[0].error,
            ZoneError::InvalidZoneCode { .. }
        ));
        assert_eq!(outcome.forest.len(), 3);
    }

    #[test]
    fn names_use_labels_when_present() {
        let outcome = build(&[named_seed("501201", "Hala A", "Regal 12")]);
        let forest = &outcome.forest;

        assert_eq!(forest.get("5012").unwrap().name, "Hala A (5012)");
        assert_eq!(forest.get("50120").unwrap().name, "Regal 12 (50120)");
        assert_eq!(forest.get("501201").unwrap().name, "Regal 12 (501201)");
        assert_eq!(
            forest.get("50120").unwrap().note.as_deref(),
            Some("Regal 12")
        );
    }

    #[test]
    fn names_fall_back_to_level_and_code() {
        let outcome = build(&[seed("501201")]);
        let forest = &outcome.forest;

        assert_eq!(forest.get("5012").unwrap().name, "Polje_5012 (5012)");
        assert_eq!(forest.get("50120").unwrap().name, "Subzone_50120 (50120)");
        assert_eq!(
            forest.get("501201").unwrap().name,
            "Vrsta_501201 (501201)"
        );
    }

    #[test]
    fn first_seed_wins_naming() {
        let outcome = build(&[
            named_seed("501201", "First", "First sub"),
            named_seed("501202", "Second", "Second sub"),
        ]);
        assert_eq!(outcome.forest.get("5012").unwrap().name, "First (5012)");
        assert_eq!(
            outcome.forest.get("50120").unwrap().name,
            "First sub (50120)"
        );
    }

    #[test]
    fn descendants_darken_the_field_color() {
        let outcome = build(&[seed("501201")]);
        let forest = &outcome.forest;

        let field = forest.get("5012").unwrap().color;
        assert_eq!(forest.get("50120").unwrap().color, field.darken(0.8));
        assert_eq!(forest.get("501201").unwrap().color, field.darken(0.6));
    }

    #[test]
    fn colors_are_stable_across_record_order() {
        let forward = build(&[seed("501201"), seed("60110")]);
        let reversed = build(&[seed("60110"), seed("501201")]);
        assert_eq!(
            forward.forest.get("5012").unwrap().color,
            reversed.forest.get("5012").unwrap().color
        );
        assert_eq!(
            forward.forest.get("6011").unwrap().color,
            reversed.forest.get("6011").unwrap().color
        );
    }

    #[test]
    fn relink_prefers_subzone_parent() {
        let mut forest = build(&[seed("501201")]).forest;
        forest.get_mut("501201").unwrap().parent_code = None;

        relink_parents(&mut forest).unwrap();
        assert_eq!(
            forest.get("501201").unwrap().parent_code.as_deref(),
            Some("50120")
        );
    }

    #[test]
    fn relink_falls_back_to_field_when_subzone_is_absent() {
        let mut forest = ZoneForest::new();
        let built = build(&[seed("501201")]).forest;
        forest.insert(built.get("5012").unwrap().clone());
        forest.insert(built.get("501201").unwrap().clone());

        relink_parents(&mut forest).unwrap();
        assert_eq!(
            forest.get("501201").unwrap().parent_code.as_deref(),
            Some("5012")
        );
    }

    #[test]
    fn relink_reports_missing_field() {
        let mut forest = ZoneForest::new();
        let built = build(&[seed("501201")]).forest;
        forest.insert(built.get("501201").unwrap().clone());

        assert_eq!(
            relink_parents(&mut forest),
            Err(ZoneError::MissingAncestor {
                code: "501201".to_string(),
                ancestor: "5012".to_string(),
            })
        );
    }
}
