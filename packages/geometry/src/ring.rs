//! Polygon ring primitives.
//!
//! Rings are `geo` line strings, closed by repeating the first vertex
//! last. The centroid here is the arithmetic mean of the distinct
//! vertices (not an area centroid), matching how the map editor anchors
//! rotations.

use factory_map_zone_models::ZoneLevel;
use geo::{Coord, LineString};

/// Whether the ring is explicitly closed (first vertex repeated last).
#[must_use]
pub fn is_closed(ring: &LineString<f64>) -> bool {
    match (ring.0.first(), ring.0.last()) {
        (Some(first), Some(last)) => ring.0.len() >= 2 && first == last,
        _ => false,
    }
}

/// Direction angle of the ring's longest edge, in radians.
///
/// Consecutive vertex pairs are scanned, plus the implicit closing edge
/// for an unclosed ring; ties keep the first maximal edge in scan
/// order. Rings with fewer than two vertices have orientation zero.
#[must_use]
pub fn orientation(ring: &LineString<f64>) -> f64 {
    let mut max_length_sq = 0.0_f64;
    let mut angle = 0.0_f64;

    let mut consider = |a: Coord<f64>, b: Coord<f64>| {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let length_sq = dx * dx + dy * dy;
        if length_sq > max_length_sq {
            max_length_sq = length_sq;
            angle = dy.atan2(dx);
        }
    };

    for pair in ring.0.windows(2) {
        consider(pair[0], pair[1]);
    }
    if !is_closed(ring)
        && let (Some(&last), Some(&first)) = (ring.0.last(), ring.0.first())
    {
        consider(last, first);
    }

    angle
}

/// Arithmetic mean of the ring's vertices, dropping the duplicated
/// closing vertex. `None` for an empty ring.
#[must_use]
pub fn vertex_centroid(ring: &LineString<f64>) -> Option<Coord<f64>> {
    let count = if is_closed(ring) {
        ring.0.len() - 1
    } else {
        ring.0.len()
    };
    if count == 0 {
        return None;
    }
    let sum = ring.0[..count]
        .iter()
        .fold(Coord { x: 0.0, y: 0.0 }, |acc, c| Coord {
            x: acc.x + c.x,
            y: acc.y + c.y,
        });
    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    Some(Coord {
        x: sum.x / n,
        y: sum.y / n,
    })
}

/// Default rectangle dimensions for a freshly placed zone, width then
/// height. Coarser levels get wider boxes.
#[must_use]
pub const fn seed_dimensions(level: ZoneLevel) -> (f64, f64) {
    match level {
        ZoneLevel::Polje => (20.0, 8.0),
        ZoneLevel::Subzone => (12.0, 8.0),
        ZoneLevel::Vrsta => (8.0, 8.0),
    }
}

/// Builds the closed default rectangle for a zone anchored at `origin`
/// (bottom-left corner).
#[must_use]
pub fn seed_rect(origin: Coord<f64>, level: ZoneLevel) -> LineString<f64> {
    let (width, height) = seed_dimensions(level);
    LineString::new(vec![
        origin,
        Coord {
            x: origin.x + width,
            y: origin.y,
        },
        Coord {
            x: origin.x + width,
            y: origin.y + height,
        },
        Coord {
            x: origin.x,
            y: origin.y + height,
        },
        origin,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> LineString<f64> {
        LineString::new(coords.iter().map(|&(x, y)| Coord { x, y }).collect())
    }

    #[test]
    fn detects_closure() {
        assert!(is_closed(&ring(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 0.0)
        ])));
        assert!(!is_closed(&ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])));
        assert!(!is_closed(&ring(&[])));
    }

    #[test]
    fn orientation_follows_longest_edge() {
        // Longest edge runs up the y axis.
        let r = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 3.0), (0.0, 3.0), (0.0, 0.0)]);
        let angle = orientation(&r);
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn orientation_ties_keep_first_edge() {
        // Unit square: all edges equal, first edge (along +x) wins.
        let r = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        assert!(orientation(&r).abs() < 1e-12);
    }

    #[test]
    fn orientation_counts_the_closing_edge_of_open_rings() {
        // Open triangle whose longest edge is the implicit close.
        let r = ring(&[(0.0, 0.0), (1.0, 0.0), (5.0, 1.0)]);
        let expected = (0.0_f64 - 1.0).atan2(0.0 - 5.0);
        assert!((orientation(&r) - expected).abs() < 1e-12);
    }

    #[test]
    fn centroid_drops_duplicated_closing_vertex() {
        let closed = ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]);
        let c = vertex_centroid(&closed).unwrap();
        assert!((c.x - 1.0).abs() < 1e-12);
        assert!((c.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_empty_ring_is_none() {
        assert!(vertex_centroid(&ring(&[])).is_none());
    }

    #[test]
    fn seed_rect_is_closed_with_level_dimensions() {
        let rect = seed_rect(Coord { x: 10.0, y: 20.0 }, ZoneLevel::Polje);
        assert!(is_closed(&rect));
        assert_eq!(rect.0.len(), 5);
        assert!((rect.0[2].x - 30.0).abs() < 1e-12);
        assert!((rect.0[2].y - 28.0).abs() < 1e-12);
    }
}
