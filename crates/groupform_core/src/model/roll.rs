//! Roll number format rules.
//!
//! # Invariants
//! - Format check is case-sensitive; no normalization beyond trimming.
//! - Blank input is valid and means "unused slot".

use once_cell::sync::Lazy;
use regex::Regex;

static ROLL_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][0-9]{3}$").expect("valid roll number regex"));

/// Returns whether `value` is an acceptable roll number.
///
/// Trims input first. Returns `true` for blank input or for exactly one
/// uppercase ASCII letter followed by exactly three ASCII digits.
pub fn is_valid_roll_number(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || ROLL_NUMBER_RE.is_match(trimmed)
}

/// Example roll number shown next to format errors.
pub const ROLL_NUMBER_EXAMPLE: &str = "A123";
