#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone code utilities, color palette, and hierarchy builder.
//!
//! Zone codes are hierarchical strings whose prefix length encodes
//! granularity. This crate derives the field/subzone/vrsta forest from a
//! flat batch of full-granularity codes, assigns display colors per
//! field, and resolves parent links by code prefix.

pub mod code;
pub mod hierarchy;
pub mod palette;

use thiserror::Error;

/// Errors that can occur while building a zone hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    /// A zone code failed validation.
    #[error("invalid zone code {code:?}: code must not be empty")]
    InvalidZoneCode {
        /// The rejected code.
        code: String,
    },

    /// A node references an ancestor that is not present in the forest.
    /// This cannot happen in a single-pass build and indicates an
    /// inconsistently assembled forest; fatal to the batch.
    #[error("zone {code} references missing ancestor {ancestor}")]
    MissingAncestor {
        /// Code of the node whose ancestor is missing.
        code: String,
        /// Code of the ancestor that could not be found.
        ancestor: String,
    },
}
