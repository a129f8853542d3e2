//! Solo submission rules.

use crate::claims::{collect_claimed_rolls, is_roll_taken};
use crate::model::registration::{Group, SoloEntry, SoloForm};
use crate::model::roll::is_valid_roll_number;
use crate::validation::error::{SoloField, ValidationError};

/// Normalized solo entry accepted by validation, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSoloEntry {
    pub roll: String,
    pub name: String,
}

/// Validates a solo form against the current snapshot.
///
/// Checks run in order: blank fields (roll first), format, uniqueness.
pub fn validate_solo_submission(
    form: &SoloForm,
    current_groups: &[Group],
    current_solo: &[SoloEntry],
) -> Result<ValidSoloEntry, ValidationError> {
    let roll = form.roll.trim();
    let name = form.name.trim();

    if roll.is_empty() {
        return Err(ValidationError::MissingField(SoloField::Roll));
    }
    if name.is_empty() {
        return Err(ValidationError::MissingField(SoloField::Name));
    }
    if !is_valid_roll_number(roll) {
        return Err(ValidationError::InvalidRollFormat(roll.to_string()));
    }

    let claimed = collect_claimed_rolls(current_groups, current_solo);
    if is_roll_taken(roll, &claimed) {
        return Err(ValidationError::DuplicateRoll(roll.to_string()));
    }

    Ok(ValidSoloEntry {
        roll: roll.to_string(),
        name: name.to_string(),
    })
}
