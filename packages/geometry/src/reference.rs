//! The reference frame every polygon is normalized against.
//!
//! One fixed polygon supplies the target orientation and, after rotating
//! it into its own axis, the target width/height aspect ratio for a
//! whole normalization run.

use geo::{Coord, LineString};

use crate::ring;

/// Target orientation and bounding-box aspect ratio for normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    /// Orientation angle of the reference polygon's longest edge,
    /// in radians.
    pub orientation: f64,
    /// Width/height ratio of the reference polygon's bounding box in
    /// its own rotated axis; infinite when the rotated height is zero.
    pub aspect_ratio: f64,
}

impl ReferenceFrame {
    /// Derives the frame from a reference ring.
    #[must_use]
    pub fn from_ring(reference: &LineString<f64>) -> Self {
        let orientation = ring::orientation(reference);

        // Rotate into the reference's own axis and measure the
        // axis-aligned bounds there.
        let cos = (-orientation).cos();
        let sin = (-orientation).sin();
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for coord in &reference.0 {
            let x = coord.x * cos - coord.y * sin;
            let y = coord.x * sin + coord.y * cos;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        let width = max_x - min_x;
        let height = max_y - min_y;
        let aspect_ratio = if height == 0.0 {
            f64::INFINITY
        } else {
            width / height
        };

        Self {
            orientation,
            aspect_ratio,
        }
    }
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self::from_ring(&default_reference_ring())
    }
}

/// The fixed reference annotation all map layers are normalized against.
#[must_use]
pub fn default_reference_ring() -> LineString<f64> {
    LineString::new(vec![
        Coord {
            x: 10.975_172_639_350_573,
            y: 45.168_735_419_035_52,
        },
        Coord {
            x: 9.753_687_796_547_522,
            y: 45.118_458_416_030_7,
        },
        Coord {
            x: 9.829_368_801_142_177,
            y: 44.267_151_666_969_13,
        },
        Coord {
            x: 11.029_076_321_130_045,
            y: 44.317_441_291_069_5,
        },
        Coord {
            x: 10.975_172_639_350_573,
            y: 45.168_735_419_035_52,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_ring(coords: &[(f64, f64)]) -> LineString<f64> {
        LineString::new(coords.iter().map(|&(x, y)| Coord { x, y }).collect())
    }

    #[test]
    fn axis_aligned_rectangle_keeps_its_aspect() {
        let rect = closed_ring(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (0.0, 2.0),
            (0.0, 0.0),
        ]);
        let frame = ReferenceFrame::from_ring(&rect);
        assert!(frame.orientation.abs() < 1e-12);
        assert!((frame.aspect_ratio - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rotated_rectangle_measures_in_its_own_axis() {
        // The same 4x2 rectangle rotated 30 degrees still has aspect 2.
        let angle = 30.0_f64.to_radians();
        let rotate = |x: f64, y: f64| (x * angle.cos() - y * angle.sin(), x * angle.sin() + y * angle.cos());
        let corners = [(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0), (0.0, 0.0)];
        let rect = closed_ring(&corners.map(|(x, y)| rotate(x, y)));

        let frame = ReferenceFrame::from_ring(&rect);
        assert!((frame.orientation - angle).abs() < 1e-9);
        assert!((frame.aspect_ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_height_reference_has_infinite_aspect() {
        let line = closed_ring(&[(0.0, 0.0), (4.0, 0.0), (0.0, 0.0)]);
        let frame = ReferenceFrame::from_ring(&line);
        assert!(frame.aspect_ratio.is_infinite());
    }

    #[test]
    fn default_frame_comes_from_the_reference_annotation() {
        let frame = ReferenceFrame::default();
        assert!(frame.aspect_ratio.is_finite());
        assert!(frame.aspect_ratio > 0.0);
    }
}
