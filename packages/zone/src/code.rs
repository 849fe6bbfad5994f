//! Pure functions over hierarchical zone code strings.
//!
//! A code's ancestors are its prefixes: the first 4 characters name the
//! field (polje) and the first 5 the subzone; the full code is the vrsta.
//! Truncation is always the leading characters, never trimmed or padded,
//! and a code shorter than a prefix length is used verbatim.

use factory_map_zone_models::ZoneLevel;

use crate::ZoneError;

/// Number of leading characters that identify a field (polje).
pub const FIELD_PREFIX_LEN: usize = 4;

/// Number of leading characters that identify a subzone.
pub const SUBZONE_PREFIX_LEN: usize = 5;

/// Returns the leading `len` characters of `code`, or the whole code
/// when it is shorter.
#[must_use]
fn prefix(code: &str, len: usize) -> &str {
    code.char_indices()
        .nth(len)
        .map_or(code, |(idx, _)| &code[..idx])
}

/// Derives the field (polje) code: the first 4 characters.
#[must_use]
pub fn field_code(code: &str) -> &str {
    prefix(code, FIELD_PREFIX_LEN)
}

/// Derives the subzone code: the first 5 characters.
#[must_use]
pub fn subzone_code(code: &str) -> &str {
    prefix(code, SUBZONE_PREFIX_LEN)
}

/// Infers the granularity level encoded by a code's length.
///
/// 4 characters or fewer is a field, exactly 5 a subzone, 6 or more a
/// vrsta.
#[must_use]
pub fn level_of(code: &str) -> ZoneLevel {
    match code.chars().count() {
        0..=FIELD_PREFIX_LEN => ZoneLevel::Polje,
        SUBZONE_PREFIX_LEN => ZoneLevel::Subzone,
        _ => ZoneLevel::Vrsta,
    }
}

/// Truncates a code to the prefix a given level aggregates at.
///
/// Vrsta granularity is the full code, not a fixed six characters.
#[must_use]
pub fn truncate_for(code: &str, level: ZoneLevel) -> &str {
    match level {
        ZoneLevel::Polje => field_code(code),
        ZoneLevel::Subzone => subzone_code(code),
        ZoneLevel::Vrsta => code,
    }
}

/// Validates a zone code.
///
/// # Errors
///
/// Returns [`ZoneError::InvalidZoneCode`] if the code is empty.
pub fn validate(code: &str) -> Result<(), ZoneError> {
    if code.is_empty() {
        return Err(ZoneError::InvalidZoneCode {
            code: code.to_string(),
        });
    }
    Ok(())
}
