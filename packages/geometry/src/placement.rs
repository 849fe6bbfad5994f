//! Deterministic grid placement for freshly created zones.
//!
//! New zones have no drawn geometry yet; they are seeded on a fixed
//! grid inside the factory canvas so they never overlap and can be
//! dragged into place later. Placement is a pure function of
//! `(index, total, level)` — no state is carried between calls.

use factory_map_zone_models::ZoneLevel;
use geo::Coord;

/// Fixed rectangular canvas and grid configuration for zone placement.
///
/// The defaults are the factory layout bounds in Web Mercator
/// (EPSG:3857) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Western canvas bound.
    pub x_min: f64,
    /// Eastern canvas bound.
    pub x_max: f64,
    /// Southern canvas bound.
    pub y_min: f64,
    /// Northern canvas bound.
    pub y_max: f64,
    /// Fixed number of grid rows; columns grow with the batch size.
    pub rows: usize,
    /// Offset added to both axes per hierarchy level, so sibling
    /// levels placed in the same pass do not overlap.
    pub level_offset: f64,
    /// Margin kept free at the eastern and northern bounds.
    pub margin: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            x_min: 584_000.0,
            x_max: 1_262_000.0,
            y_min: 5_350_000.0,
            y_max: 6_000_000.0,
            rows: 28,
            level_offset: 50_000.0,
            margin: 1_000.0,
        }
    }
}

impl GridLayout {
    /// Computes the position of element `index` out of `total` at the
    /// given level.
    ///
    /// Columns are `ceil(total / rows)`; the element walks the grid
    /// row-major. Spacing divides the canvas evenly and collapses to
    /// zero for a single row or column. The result is clamped into
    /// `[min, max - margin]` on both axes so no placement escapes the
    /// canvas.
    #[must_use]
    pub fn position(&self, index: usize, total: usize, level: ZoneLevel) -> Coord<f64> {
        let cols = total.div_ceil(self.rows.max(1)).max(1);
        let col = index % cols;
        let row = index / cols;

        #[allow(clippy::cast_precision_loss)]
        let x_spacing = if cols > 1 {
            (self.x_max - self.x_min) / (cols - 1) as f64
        } else {
            0.0
        };
        #[allow(clippy::cast_precision_loss)]
        let y_spacing = if self.rows > 1 {
            (self.y_max - self.y_min) / (self.rows - 1) as f64
        } else {
            0.0
        };

        let offset = f64::from(level.depth()) * self.level_offset;

        #[allow(clippy::cast_precision_loss)]
        let x = self.x_min + col as f64 * x_spacing + offset;
        #[allow(clippy::cast_precision_loss)]
        let y = self.y_min + row as f64 * y_spacing + offset;

        Coord {
            x: x.clamp(self.x_min, self.x_max - self.margin),
            y: y.clamp(self.y_min, self.y_max - self.margin),
        }
    }
}
