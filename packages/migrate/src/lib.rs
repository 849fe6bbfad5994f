#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Idempotent batch orchestration for factory map ingestion.
//!
//! Wires the hierarchy builder, capacity aggregator, grid placer, and
//! geometry normalizer into one deterministic run over a batch of raw
//! occupancy records. The output is a complete, consistent forest for
//! the batch; the persistence collaborator owns transactional
//! clear-then-insert semantics, and an interrupted write must discard
//! the whole batch.

pub mod batch;
pub mod grouped;
pub mod query;

use thiserror::Error;

/// Errors that can occur while orchestrating a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrateError {
    /// Hierarchy construction failed.
    #[error("Zone error: {0}")]
    Zone(#[from] factory_map_zone::ZoneError),

    /// A record was rejected and the batch policy aborts on invalid
    /// records.
    #[error("invalid record {code:?}: {message}")]
    InvalidRecord {
        /// Zone code of the offending record, verbatim.
        code: String,
        /// Description of what was wrong with it.
        message: String,
    },
}
