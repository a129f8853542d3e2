//! Validation rejection reasons.

use crate::model::registration::{MAX_GROUP_MEMBERS, MIN_GROUP_MEMBERS, MIN_LOCKED_MEMBERS};
use crate::model::roll::ROLL_NUMBER_EXAMPLE;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Solo form field that was left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoloField {
    Roll,
    Name,
}

impl SoloField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Roll => "roll",
            Self::Name => "name",
        }
    }
}

/// Reason a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Present member count is outside the allowed group size.
    MemberCountOutOfRange { present: usize },
    /// A non-blank roll does not match the roll number format.
    InvalidRollFormat(String),
    /// Roll already claimed elsewhere, or repeated within this submission.
    DuplicateRoll(String),
    /// `locked` was requested with fewer than three present members.
    LockRequiresThreeMembers { present: usize },
    /// Required solo field is blank.
    MissingField(SoloField),
}

impl ValidationError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MemberCountOutOfRange { .. } => "member_count_out_of_range",
            Self::InvalidRollFormat(_) => "invalid_roll_format",
            Self::DuplicateRoll(_) => "duplicate_roll",
            Self::LockRequiresThreeMembers { .. } => "lock_requires_three_members",
            Self::MissingField(_) => "missing_field",
        }
    }

    /// Sentence shown to the participant who submitted the form.
    pub fn user_message(&self) -> String {
        match self {
            Self::MemberCountOutOfRange { .. } => format!(
                "A group must have between {MIN_GROUP_MEMBERS} and {MAX_GROUP_MEMBERS} members."
            ),
            Self::InvalidRollFormat(roll) => format!(
                "Roll number '{roll}' is not in the correct format (e.g., {ROLL_NUMBER_EXAMPLE})."
            ),
            Self::DuplicateRoll(roll) => {
                format!("Roll number {roll} is already in a team or on the solo list.")
            }
            Self::LockRequiresThreeMembers { .. } => format!(
                "You can only lock teams with {MIN_LOCKED_MEMBERS} or more members."
            ),
            Self::MissingField(_) => "Please enter both your roll number and name.".to_string(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemberCountOutOfRange { present } => write!(
                f,
                "group has {present} present members; expected {MIN_GROUP_MEMBERS}..={MAX_GROUP_MEMBERS}"
            ),
            Self::InvalidRollFormat(roll) => write!(f, "invalid roll number format: `{roll}`"),
            Self::DuplicateRoll(roll) => write!(f, "roll number already claimed: `{roll}`"),
            Self::LockRequiresThreeMembers { present } => write!(
                f,
                "locking requires at least {MIN_LOCKED_MEMBERS} present members, got {present}"
            ),
            Self::MissingField(field) => write!(f, "missing required field: {}", field.as_str()),
        }
    }
}

impl Error for ValidationError {}
