//! Orientation and aspect-ratio normalization of polygon rings.
//!
//! Every ring is rotated about its vertex centroid to the reference
//! orientation, then rescaled along the perpendicular axis so its
//! bounding-box aspect ratio in the rotated frame matches the
//! reference. Width is preserved; only the y axis is corrected.
//! Degenerate rings come back as an explicit [`NormalizeOutcome::Skipped`]
//! so callers can surface data-quality issues instead of losing them.

use geo::{Coord, LineString};

use crate::reference::ReferenceFrame;
use crate::ring;

/// Why a ring could not be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than three vertices: not a polygon.
    TooFewVertices,
    /// Zero height after rotation: no perpendicular extent to rescale.
    ZeroHeight,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewVertices => write!(f, "fewer than three vertices"),
            Self::ZeroHeight => write!(f, "zero height after rotation"),
        }
    }
}

/// Result of normalizing one ring.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeOutcome {
    /// The ring was rotated and rescaled.
    Normalized(LineString<f64>),
    /// The ring could not be fully normalized. For
    /// [`SkipReason::ZeroHeight`] the ring is rotated but unscaled; for
    /// [`SkipReason::TooFewVertices`] it is the input, unchanged.
    Skipped {
        /// The best-effort output ring.
        ring: LineString<f64>,
        /// Why rescaling was not possible.
        reason: SkipReason,
    },
}

impl NormalizeOutcome {
    /// The output ring, whether or not it was fully normalized.
    #[must_use]
    pub const fn ring(&self) -> &LineString<f64> {
        match self {
            Self::Normalized(ring) | Self::Skipped { ring, .. } => ring,
        }
    }

    /// Consumes the outcome, returning the output ring.
    #[must_use]
    pub fn into_ring(self) -> LineString<f64> {
        match self {
            Self::Normalized(ring) | Self::Skipped { ring, .. } => ring,
        }
    }

    /// Whether the ring was fully normalized.
    #[must_use]
    pub const fn is_normalized(&self) -> bool {
        matches!(self, Self::Normalized(_))
    }
}

/// Rotates a ring to the reference orientation and rescales its y axis
/// so the rotated-frame aspect ratio matches the reference's.
///
/// The centroid is preserved exactly; a closed input yields a closed
/// output. A reference aspect ratio of zero disables rescaling. Pure:
/// rings normalize independently, in any order.
#[must_use]
pub fn normalize(input: &LineString<f64>, frame: &ReferenceFrame) -> NormalizeOutcome {
    if input.0.len() < 3 {
        return NormalizeOutcome::Skipped {
            ring: input.clone(),
            reason: SkipReason::TooFewVertices,
        };
    }

    let was_closed = ring::is_closed(input);
    let open = if was_closed {
        &input.0[..input.0.len() - 1]
    } else {
        &input.0[..]
    };

    #[allow(clippy::cast_precision_loss)]
    let n = open.len() as f64;
    let centroid = Coord {
        x: open.iter().map(|c| c.x).sum::<f64>() / n,
        y: open.iter().map(|c| c.y).sum::<f64>() / n,
    };

    let rotation = frame.orientation - ring::orientation(input);
    let cos = rotation.cos();
    let sin = rotation.sin();

    // Offsets from the centroid, rotated into the reference axis.
    let rotated: Vec<Coord<f64>> = open
        .iter()
        .map(|c| {
            let dx = c.x - centroid.x;
            let dy = c.y - centroid.y;
            Coord {
                x: dx * cos - dy * sin,
                y: dx * sin + dy * cos,
            }
        })
        .collect();

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for c in &rotated {
        min_x = min_x.min(c.x);
        max_x = max_x.max(c.x);
        min_y = min_y.min(c.y);
        max_y = max_y.max(c.y);
    }
    let width = max_x - min_x;
    let height = max_y - min_y;

    if height == 0.0 {
        let ring = reassemble(&rotated, centroid, 1.0, was_closed);
        return NormalizeOutcome::Skipped {
            ring,
            reason: SkipReason::ZeroHeight,
        };
    }

    let scale_y = if frame.aspect_ratio == 0.0 {
        1.0
    } else {
        (width / height) / frame.aspect_ratio
    };

    NormalizeOutcome::Normalized(reassemble(&rotated, centroid, scale_y, was_closed))
}

/// Scales rotated offsets on the y axis, translates back to world
/// coordinates, and re-closes the ring if the input was closed.
fn reassemble(
    rotated: &[Coord<f64>],
    centroid: Coord<f64>,
    scale_y: f64,
    close: bool,
) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = rotated
        .iter()
        .map(|c| Coord {
            x: c.x + centroid.x,
            y: c.y * scale_y + centroid.y,
        })
        .collect();
    if close && let Some(&first) = coords.first() {
        coords.push(first);
    }
    LineString::new(coords)
}
