//! Per-client application state.
//!
//! # Responsibility
//! - Hold the latest observed snapshots of both collections.
//! - Hold form input and the deletion workflow for one client.
//!
//! # Invariants
//! - Snapshots are replaced wholesale by live events, never patched.
//! - Validation reads only these snapshots; they may be stale.

use crate::deletion::{DeletionGate, DeletionSecret};
use crate::live::LiveEvent;
use crate::model::registration::{numbered_groups, Group, GroupForm, SoloEntry, SoloForm};

/// Explicit state threaded through validation and submission.
#[derive(Debug)]
pub struct ClientState {
    pub groups: Vec<Group>,
    pub solo: Vec<SoloEntry>,
    pub group_form: GroupForm,
    pub solo_form: SoloForm,
    pub deletion: DeletionGate,
    groups_loading: bool,
    solo_loading: bool,
    groups_error: Option<String>,
    solo_error: Option<String>,
}

impl ClientState {
    /// Creates an empty state that is waiting for its first snapshots.
    pub fn new(secret: DeletionSecret) -> Self {
        Self {
            groups: Vec::new(),
            solo: Vec::new(),
            group_form: GroupForm::default(),
            solo_form: SoloForm::default(),
            deletion: DeletionGate::new(secret),
            groups_loading: true,
            solo_loading: true,
            groups_error: None,
            solo_error: None,
        }
    }

    /// Folds one groups event into the state.
    pub fn apply_groups_event(&mut self, event: LiveEvent<Group>) {
        self.groups_loading = false;
        match event {
            LiveEvent::Snapshot(groups) => {
                self.groups = groups;
                self.groups_error = None;
            }
            LiveEvent::Failed(message) => self.groups_error = Some(message),
        }
    }

    /// Folds one solo event into the state.
    pub fn apply_solo_event(&mut self, event: LiveEvent<SoloEntry>) {
        self.solo_loading = false;
        match event {
            LiveEvent::Snapshot(entries) => {
                self.solo = entries;
                self.solo_error = None;
            }
            LiveEvent::Failed(message) => self.solo_error = Some(message),
        }
    }

    /// Whether either collection still awaits its first event.
    pub fn is_loading(&self) -> bool {
        self.groups_loading || self.solo_loading
    }

    /// Most recent read failure message, groups first.
    pub fn read_error(&self) -> Option<&str> {
        self.groups_error.as_deref().or(self.solo_error.as_deref())
    }

    /// Groups paired with their display numbers.
    pub fn numbered_groups(&self) -> Vec<(usize, &Group)> {
        numbered_groups(&self.groups)
    }
}
