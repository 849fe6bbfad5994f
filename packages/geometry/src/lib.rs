#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Polygon ring normalization, grid placement, and coordinate helpers.
//!
//! Source polygons arrive in heterogeneous shapes and orientations; to
//! render consistently they are rotated to a shared reference
//! orientation and rescaled so their bounding-box aspect ratio matches
//! the reference polygon's. Newly created zones with no geometry yet are
//! seeded with rectangles placed on a deterministic grid inside the
//! factory canvas bounds.

pub mod mercator;
pub mod normalize;
pub mod placement;
pub mod reference;
pub mod ring;
