#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Occupancy record filtering and level-aware aggregation.
//!
//! Records are filtered first, then summed into a per-prefix-length
//! index in one pass. Lookups truncate a zone code to the prefix its
//! level aggregates at, so a field-level feature reports the combined
//! occupancy of every record sharing its 4-character prefix while a
//! vrsta-level feature reports only exact matches. Counts are conserved
//! across resolutions: every record lands in exactly one bucket per
//! level.

pub mod aggregate;
pub mod filter;
