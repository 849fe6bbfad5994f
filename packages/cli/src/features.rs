//! GeoJSON conversion between zone forests and feature collections.
//!
//! The persisted map features carry one polygon per zone plus the
//! display and capacity columns as properties. Only exterior rings are
//! annotated geometry; holes never occur in drawn zones.

use factory_map_geometry::normalize::normalize;
use factory_map_geometry::reference::ReferenceFrame;
use factory_map_zone_models::{ZoneForest, ZoneNode};
use geo::{Coord, LineString};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

/// Converts a forest into a GeoJSON feature collection, one feature per
/// zone in code order.
#[must_use]
pub fn forest_to_features(forest: &ZoneForest) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: forest.iter().map(node_to_feature).collect(),
        foreign_members: None,
    }
}

fn node_to_feature(node: &ZoneNode) -> Feature {
    let ring: Vec<Vec<f64>> = node.geometry.0.iter().map(|c| vec![c.x, c.y]).collect();

    let mut properties = JsonObject::new();
    properties.insert("code".to_string(), node.code.clone().into());
    properties.insert("level".to_string(), node.level.to_string().into());
    properties.insert("name".to_string(), node.name.clone().into());
    properties.insert("color".to_string(), node.color.to_string().into());
    properties.insert(
        "parentCode".to_string(),
        node.parent_code.clone().map_or(serde_json::Value::Null, Into::into),
    );
    properties.insert(
        "note".to_string(),
        node.note.clone().map_or(serde_json::Value::Null, Into::into),
    );
    properties.insert(
        "maxCapacity".to_string(),
        node.max_capacity.map_or(serde_json::Value::Null, Into::into),
    );
    properties.insert(
        "takenCapacity".to_string(),
        node.taken_capacity.map_or(serde_json::Value::Null, Into::into),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Re-normalizes every polygon feature in place against the frame.
///
/// Returns the number of fully normalized rings and labels of the
/// features that were skipped. Non-polygon features pass through
/// untouched.
pub fn normalize_features(
    collection: &mut FeatureCollection,
    frame: &ReferenceFrame,
) -> (usize, Vec<String>) {
    let mut normalized = 0_usize;
    let mut skipped = Vec::new();

    for (index, feature) in collection.features.iter_mut().enumerate() {
        let Some(geometry) = &mut feature.geometry else {
            continue;
        };
        let Value::Polygon(rings) = &geometry.value else {
            continue;
        };
        let Some(exterior) = rings.first() else {
            continue;
        };

        let ring = LineString::new(
            exterior
                .iter()
                .filter(|position| position.len() >= 2)
                .map(|position| Coord {
                    x: position[0],
                    y: position[1],
                })
                .collect(),
        );

        let outcome = normalize(&ring, frame);
        if outcome.is_normalized() {
            normalized += 1;
        } else {
            skipped.push(feature_label(feature.properties.as_ref(), index));
        }
        let out: Vec<Vec<f64>> = outcome
            .into_ring()
            .0
            .iter()
            .map(|c| vec![c.x, c.y])
            .collect();
        if let Some(geometry) = &mut feature.geometry {
            geometry.value = Value::Polygon(vec![out]);
        }
    }

    (normalized, skipped)
}

/// A human-readable label for log lines: the feature's code or name,
/// falling back to its index.
fn feature_label(properties: Option<&JsonObject>, index: usize) -> String {
    properties
        .and_then(|props| {
            props
                .get("code")
                .or_else(|| props.get("name"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("feature #{index}"))
}
