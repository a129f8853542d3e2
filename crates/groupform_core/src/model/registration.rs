//! Group and solo registration records.
//!
//! # Responsibility
//! - Define persisted `Group`/`SoloEntry` shapes and submission forms.
//! - Provide presence/count helpers used by validation and views.
//!
//! # Invariants
//! - A group always has exactly `GROUP_SLOT_COUNT` ordered member slots.
//! - A slot is "present" only when both roll and name are non-blank.
//! - Persisted records are immutable; there is no edit path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of member slots in every group.
pub const GROUP_SLOT_COUNT: usize = 4;
/// Minimum present members for a group submission.
pub const MIN_GROUP_MEMBERS: usize = 2;
/// Maximum present members for a group submission.
pub const MAX_GROUP_MEMBERS: usize = GROUP_SLOT_COUNT;
/// Minimum present members before a group may be locked.
pub const MIN_LOCKED_MEMBERS: usize = 3;

/// Stable identifier for any registration record.
pub type RecordId = Uuid;

/// Collection a registration record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Group,
    Solo,
}

impl RecordKind {
    /// Stable string id used in storage and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Solo => "solo",
        }
    }

    /// Parses a stored kind string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "group" => Some(Self::Group),
            "solo" => Some(Self::Solo),
            _ => None,
        }
    }
}

/// One roll number + display name pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub roll: String,
    pub name: String,
}

impl Member {
    pub fn new(roll: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll: roll.into(),
            name: name.into(),
        }
    }

    /// Returns whether both roll and name are non-blank.
    pub fn is_present(&self) -> bool {
        !self.roll.trim().is_empty() && !self.name.trim().is_empty()
    }

    /// Returns a copy with both fields trimmed.
    pub fn trimmed(&self) -> Self {
        Self::new(self.roll.trim(), self.name.trim())
    }
}

/// Persisted group registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: RecordId,
    /// Ordered member slots; absent slots hold empty strings.
    pub members: [Member; GROUP_SLOT_COUNT],
    pub locked: bool,
    /// Unix epoch milliseconds, assigned by the store.
    pub created_at: i64,
    /// Participant that submitted the group, when known.
    pub creator_id: Option<String>,
}

impl Group {
    /// Members with both roll and name set, in slot order.
    pub fn present_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|member| member.is_present())
    }

    pub fn present_count(&self) -> usize {
        self.present_members().count()
    }

    /// Non-blank roll numbers across all slots.
    pub fn claimed_rolls(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .map(|member| member.roll.trim())
            .filter(|roll| !roll.is_empty())
    }
}

/// Persisted solo registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoloEntry {
    pub id: RecordId,
    pub roll: String,
    pub name: String,
    /// Unix epoch milliseconds, assigned by the store.
    pub created_at: i64,
    pub creator_id: Option<String>,
}

/// Raw group submission as typed by a participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupForm {
    pub slots: [Member; GROUP_SLOT_COUNT],
    pub locked: bool,
}

impl GroupForm {
    /// Builds a form filling slots in order from `members`.
    ///
    /// Extra members beyond `GROUP_SLOT_COUNT` are ignored.
    pub fn from_members<R, N>(members: impl IntoIterator<Item = (R, N)>, locked: bool) -> Self
    where
        R: Into<String>,
        N: Into<String>,
    {
        let mut form = Self {
            locked,
            ..Self::default()
        };
        for (slot, (roll, name)) in form.slots.iter_mut().zip(members) {
            *slot = Member::new(roll, name);
        }
        form
    }

    /// Number of slots whose roll field is non-blank.
    pub fn filled_roll_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| !slot.roll.trim().is_empty())
            .count()
    }

    /// Whether the lock toggle should be offered for the current input.
    pub fn can_lock(&self) -> bool {
        self.filled_roll_count() >= MIN_LOCKED_MEMBERS
    }

    /// Clears every slot and the lock flag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Raw solo submission as typed by a participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoloForm {
    pub roll: String,
    pub name: String,
}

impl SoloForm {
    pub fn new(roll: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll: roll.into(),
            name: name.into(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Pairs each group with its 1-based display number.
///
/// Numbering follows creation order; ties keep the input order.
pub fn numbered_groups(groups: &[Group]) -> Vec<(usize, &Group)> {
    let mut ordered: Vec<&Group> = groups.iter().collect();
    ordered.sort_by_key(|group| group.created_at);
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, group)| (index + 1, group))
        .collect()
}
