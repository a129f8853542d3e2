//! Claimed roll set derived from registration snapshots.
//!
//! # Invariants
//! - Blank roll values never enter the set.
//! - Membership is an exact, case-sensitive string match.
//! - The set reflects one snapshot only; it is advisory, not transactional.

use crate::model::registration::{Group, SoloEntry};
use std::collections::HashSet;

/// Set of roll numbers currently in use across groups and solo entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedRolls {
    rolls: HashSet<String>,
}

impl ClaimedRolls {
    /// Returns whether `roll` is already claimed.
    pub fn contains(&self, roll: &str) -> bool {
        self.rolls.contains(roll)
    }

    /// Claims `roll`; returns `false` when it was already claimed.
    pub fn claim(&mut self, roll: impl Into<String>) -> bool {
        self.rolls.insert(roll.into())
    }

    pub fn len(&self) -> usize {
        self.rolls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }
}

/// Flattens every group slot roll and every solo roll into one set.
pub fn collect_claimed_rolls(groups: &[Group], solo: &[SoloEntry]) -> ClaimedRolls {
    let group_rolls = groups.iter().flat_map(Group::claimed_rolls);
    let solo_rolls = solo.iter().map(|entry| entry.roll.trim());

    ClaimedRolls {
        rolls: group_rolls
            .chain(solo_rolls)
            .filter(|roll| !roll.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Exact membership test against a previously collected set.
pub fn is_roll_taken(roll: &str, claimed: &ClaimedRolls) -> bool {
    claimed.contains(roll)
}
