//! Group submission rules.
//!
//! Check order is fixed so the same input always yields the same reason:
//! member count, then per-member format/uniqueness in slot order, then the
//! lock precondition.

use crate::claims::{collect_claimed_rolls, is_roll_taken};
use crate::model::registration::{
    Group, GroupForm, Member, SoloEntry, GROUP_SLOT_COUNT, MAX_GROUP_MEMBERS, MIN_GROUP_MEMBERS,
    MIN_LOCKED_MEMBERS,
};
use crate::model::roll::is_valid_roll_number;
use crate::validation::error::ValidationError;

/// Normalized group accepted by validation, not yet persisted.
///
/// Present slots are trimmed; every other slot is blank in both fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidGroup {
    pub members: [Member; GROUP_SLOT_COUNT],
    pub locked: bool,
    /// 1-based numbers of slots that had only one of roll or name filled in.
    /// They are not stored; callers should tell the submitter.
    pub partial_slots: Vec<usize>,
}

impl ValidGroup {
    pub fn present_count(&self) -> usize {
        self.members
            .iter()
            .filter(|member| member.is_present())
            .count()
    }

    /// Present roll numbers in slot order.
    pub fn rolls(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|member| member.is_present())
            .map(|member| member.roll.as_str())
    }
}

/// Validates a group form against the current snapshot.
///
/// # Errors
/// - `MemberCountOutOfRange` when present members are outside `2..=4`.
/// - `InvalidRollFormat` for the first malformed roll in slot order.
/// - `DuplicateRoll` for the first roll already claimed in the snapshot or
///   repeated by an earlier slot of this form.
/// - `LockRequiresThreeMembers` when `locked` is set with fewer than three.
pub fn validate_group_submission(
    form: &GroupForm,
    current_groups: &[Group],
    current_solo: &[SoloEntry],
) -> Result<ValidGroup, ValidationError> {
    let mut members: [Member; GROUP_SLOT_COUNT] = Default::default();
    let mut present = 0usize;
    let mut partial_slots = Vec::new();
    for (index, (normalized, slot)) in members.iter_mut().zip(form.slots.iter()).enumerate() {
        if slot.is_present() {
            *normalized = slot.trimmed();
            present += 1;
        } else if !slot.roll.trim().is_empty() || !slot.name.trim().is_empty() {
            partial_slots.push(index + 1);
        }
    }

    if !(MIN_GROUP_MEMBERS..=MAX_GROUP_MEMBERS).contains(&present) {
        return Err(ValidationError::MemberCountOutOfRange { present });
    }

    let mut claimed = collect_claimed_rolls(current_groups, current_solo);
    for member in members.iter().filter(|member| member.is_present()) {
        if !is_valid_roll_number(&member.roll) {
            return Err(ValidationError::InvalidRollFormat(member.roll.clone()));
        }
        if is_roll_taken(&member.roll, &claimed) {
            return Err(ValidationError::DuplicateRoll(member.roll.clone()));
        }
        claimed.claim(member.roll.as_str());
    }

    if form.locked && present < MIN_LOCKED_MEMBERS {
        return Err(ValidationError::LockRequiresThreeMembers { present });
    }

    Ok(ValidGroup {
        members,
        locked: form.locked,
        partial_slots,
    })
}

#[cfg(test)]
mod tests {
    use super::validate_group_submission;
    use crate::model::registration::{Group, GroupForm, SoloEntry};
    use crate::validation::error::ValidationError;
    use uuid::Uuid;

    fn stored_group(members: &[(&str, &str)]) -> Group {
        Group {
            id: Uuid::new_v4(),
            members: GroupForm::from_members(members.iter().copied(), false).slots,
            locked: false,
            created_at: 0,
            creator_id: None,
        }
    }

    fn stored_solo(roll: &str) -> SoloEntry {
        SoloEntry {
            id: Uuid::new_v4(),
            roll: roll.to_string(),
            name: "solo".to_string(),
            created_at: 0,
            creator_id: None,
        }
    }

    #[test]
    fn one_present_member_is_out_of_range() {
        let form = GroupForm::from_members([("A100", "Alice")], false);
        let err = validate_group_submission(&form, &[], &[]).unwrap_err();
        assert_eq!(err, ValidationError::MemberCountOutOfRange { present: 1 });
    }

    #[test]
    fn half_filled_slots_do_not_count() {
        let form = GroupForm::from_members([("A100", "Alice"), ("A101", "  ")], false);
        let err = validate_group_submission(&form, &[], &[]).unwrap_err();
        assert_eq!(err, ValidationError::MemberCountOutOfRange { present: 1 });
    }

    #[test]
    fn two_three_and_four_members_are_accepted() {
        let all = [("A100", "a"), ("A101", "b"), ("A102", "c"), ("A103", "d")];
        for size in 2..=4 {
            let form = GroupForm::from_members(all[..size].iter().copied(), false);
            let valid = validate_group_submission(&form, &[], &[]).unwrap();
            assert_eq!(valid.present_count(), size);
        }
    }

    #[test]
    fn count_is_checked_before_format() {
        let form = GroupForm::from_members([("bad", "Alice")], false);
        let err = validate_group_submission(&form, &[], &[]).unwrap_err();
        assert!(matches!(err, ValidationError::MemberCountOutOfRange { .. }));
    }

    #[test]
    fn format_and_duplicates_are_reported_in_slot_order() {
        let groups = vec![stored_group(&[("A101", "x"), ("A109", "y")])];
        let form = GroupForm::from_members([("A100", "a"), ("A101", "b"), ("bad", "c")], false);
        let err = validate_group_submission(&form, &groups, &[]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateRoll("A101".to_string()));

        let form = GroupForm::from_members([("A100", "a"), ("bad", "b"), ("A101", "c")], false);
        let err = validate_group_submission(&form, &groups, &[]).unwrap_err();
        assert_eq!(err, ValidationError::InvalidRollFormat("bad".to_string()));
    }

    #[test]
    fn repeated_roll_within_submission_is_duplicate() {
        let form = GroupForm::from_members([("A100", "a"), ("A100", "b")], false);
        let err = validate_group_submission(&form, &[], &[]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateRoll("A100".to_string()));
    }

    #[test]
    fn roll_on_solo_list_is_duplicate() {
        let solo = vec![stored_solo("A101")];
        let form = GroupForm::from_members([("A100", "a"), ("A101", "b")], false);
        let err = validate_group_submission(&form, &[], &solo).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateRoll("A101".to_string()));
    }

    #[test]
    fn lock_requires_three_members_and_is_checked_last() {
        let form = GroupForm::from_members([("A100", "a"), ("A101", "b")], true);
        let err = validate_group_submission(&form, &[], &[]).unwrap_err();
        assert_eq!(err, ValidationError::LockRequiresThreeMembers { present: 2 });

        let form = GroupForm::from_members([("A100", "a"), ("bad", "b")], true);
        let err = validate_group_submission(&form, &[], &[]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRollFormat(_)));

        let form = GroupForm::from_members([("A100", "a"), ("A101", "b"), ("A102", "c")], true);
        let valid = validate_group_submission(&form, &[], &[]).unwrap();
        assert!(valid.locked);
    }

    #[test]
    fn accepted_group_is_trimmed_and_keeps_slot_positions() {
        let mut form = GroupForm::default();
        form.slots[0] = crate::model::registration::Member::new(" A100 ", " Alice ");
        form.slots[1] = crate::model::registration::Member::new("A999", "");
        form.slots[2] = crate::model::registration::Member::new("A101", "Bob");

        let valid = validate_group_submission(&form, &[], &[]).unwrap();
        assert_eq!(valid.members[0].roll, "A100");
        assert_eq!(valid.members[0].name, "Alice");
        assert!(valid.members[1].roll.is_empty());
        assert_eq!(valid.members[2].roll, "A101");
        assert_eq!(valid.rolls().collect::<Vec<_>>(), vec!["A100", "A101"]);
        assert_eq!(valid.partial_slots, vec![2]);
    }

    #[test]
    fn partial_slots_report_roll_only_and_name_only_entries() {
        let mut form = GroupForm::from_members([("A100", "a"), ("A101", "b")], false);
        form.slots[2].name = "Nameless".to_string();
        form.slots[3].roll = "A103".to_string();

        let valid = validate_group_submission(&form, &[], &[]).unwrap();
        assert_eq!(valid.partial_slots, vec![3, 4]);
        assert_eq!(valid.present_count(), 2);

        let form = GroupForm::from_members([("A100", "a"), ("A101", "b")], false);
        let valid = validate_group_submission(&form, &[], &[]).unwrap();
        assert!(valid.partial_slots.is_empty());
    }
}
