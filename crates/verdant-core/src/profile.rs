//! Care-profile completeness rules and placeholder scrubbing.
//!
//! The external generator occasionally echoes schema example tokens
//! (`"string"`, `"n/a"`, `"unknown"`) literally. Those values are treated as
//! absent data everywhere: when deciding whether a stored profile is complete
//! and when sanitizing freshly generated output before persisting it.

use crate::models::SpeciesRecord;

/// Literal tokens treated as absent data (compared case-insensitively).
pub const PLACEHOLDER_VALUES: &[&str] = &["string", "n/a", "unknown"];

/// Fallback soil type used when the generated value sanitizes to nothing.
pub const FALLBACK_SOIL_TYPE: &str = "Well-draining mix";

fn is_placeholder(value: &str) -> bool {
    let lowered = value.to_lowercase();
    PLACEHOLDER_VALUES.iter().any(|p| *p == lowered)
}

/// Trim a scalar value and drop it when empty or a placeholder echo.
pub fn sanitize_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || is_placeholder(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Trim each list entry, discarding empty and placeholder entries.
///
/// Order of surviving entries is preserved.
pub fn sanitize_text_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| sanitize_text(Some(v)))
        .collect()
}

fn field_present(value: Option<&str>) -> bool {
    sanitize_text(value).is_some()
}

/// Whether a species record satisfies the completeness invariant.
///
/// A record is complete iff every required care field holds a non-empty,
/// non-placeholder value. A complete record is never re-generated, which
/// bounds external-API cost to at most one generation per incompleteness
/// episode.
pub fn is_profile_complete(record: &SpeciesRecord) -> bool {
    field_present(record.care_summary.as_deref())
        && field_present(record.care_difficulty.as_deref())
        && field_present(record.watering.as_deref())
        && field_present(record.sunlight.as_deref())
        && field_present(record.temperature_range.as_deref())
        && field_present(record.temperature_notes.as_deref())
        && field_present(record.soil_type.as_deref())
}
