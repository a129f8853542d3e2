//! Registration use-case service.
//!
//! # Responsibility
//! - Validate submissions against the client's latest snapshot, then persist.
//! - Route every deletion through the client's `DeletionGate`.
//! - Map store failures to retryable submit errors.
//!
//! # Invariants
//! - A rejected or failed submission leaves the form untouched.
//! - A successful submission clears the form.
//! - Nothing is retried automatically.

use crate::deletion::{DeletionError, DeletionTarget};
use crate::identity::IdentityProvider;
use crate::live::LiveEvent;
use crate::model::registration::{RecordId, RecordKind};
use crate::repo::registration_repo::{RegistrationStore, StoreError};
use crate::state::ClientState;
use crate::validation::{validate_group_submission, validate_solo_submission, ValidationError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of a group or solo submission.
#[derive(Debug)]
pub enum SubmitError {
    /// Submission broke a registration rule.
    Validation(ValidationError),
    /// Store rejected the write; resubmitting may succeed.
    Store {
        kind: RecordKind,
        source: StoreError,
    },
}

impl SubmitError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { .. })
    }

    /// Sentence shown to the participant.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.user_message(),
            Self::Store {
                kind: RecordKind::Group,
                ..
            } => "Failed to submit group. Please try again.".to_string(),
            Self::Store {
                kind: RecordKind::Solo,
                ..
            } => "Failed to add to solo list. Please try again.".to_string(),
        }
    }

    fn from_store(kind: RecordKind, err: StoreError) -> Self {
        match err {
            StoreError::RollConflict(roll) => {
                Self::Validation(ValidationError::DuplicateRoll(roll))
            }
            source => Self::Store { kind, source },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::Store { source, .. } => source.code(),
        }
    }
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store { source, .. } => write!(f, "{source}"),
        }
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store { source, .. } => Some(source),
        }
    }
}

impl From<ValidationError> for SubmitError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Outcome of an accepted group submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedGroup {
    pub id: RecordId,
    /// 1-based slots left out because only one of roll or name was filled.
    pub ignored_slots: Vec<usize>,
}

/// Registration service facade over a store and an identity provider.
pub struct RegistrationService<S: RegistrationStore, I: IdentityProvider> {
    store: S,
    identity: I,
}

impl<S: RegistrationStore, I: IdentityProvider> RegistrationService<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self { store, identity }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads both collections once and folds them into `state`.
    ///
    /// Read failures are recorded in `state` rather than returned.
    pub fn load_snapshot(&self, state: &mut ClientState) {
        let groups = match self.store.read_all_groups() {
            Ok(groups) => LiveEvent::Snapshot(groups),
            Err(err) => {
                warn!(
                    "event=snapshot_load module=service status=error collection=groups error_code={}",
                    err.code()
                );
                LiveEvent::Failed("Failed to fetch groups.".to_string())
            }
        };
        let solo = match self.store.read_all_solo() {
            Ok(entries) => LiveEvent::Snapshot(entries),
            Err(err) => {
                warn!(
                    "event=snapshot_load module=service status=error collection=solo error_code={}",
                    err.code()
                );
                LiveEvent::Failed("Failed to fetch solo students.".to_string())
            }
        };
        state.apply_groups_event(groups);
        state.apply_solo_event(solo);
    }

    /// Validates `state.group_form` and persists it as a new group.
    ///
    /// Half-filled slots are not stored; their numbers come back in
    /// `SubmittedGroup::ignored_slots`.
    pub fn submit_group(&self, state: &mut ClientState) -> Result<SubmittedGroup, SubmitError> {
        let result = validate_group_submission(&state.group_form, &state.groups, &state.solo)
            .map_err(SubmitError::from)
            .and_then(|group| {
                let creator = self.identity.current_participant_id();
                self.store
                    .create_group(&group, creator.as_deref())
                    .map(|id| (id, group))
                    .map_err(|err| SubmitError::from_store(RecordKind::Group, err))
            });

        match result {
            Ok((id, group)) => {
                info!(
                    "event=group_submit module=service status=ok id={id} members={} locked={} ignored_slots={:?}",
                    group.present_count(),
                    group.locked,
                    group.partial_slots
                );
                state.group_form.reset();
                Ok(SubmittedGroup {
                    id,
                    ignored_slots: group.partial_slots,
                })
            }
            Err(err) => {
                warn!(
                    "event=group_submit module=service status=rejected error_code={} retryable={}",
                    err.code(),
                    err.is_retryable()
                );
                Err(err)
            }
        }
    }

    /// Validates `state.solo_form` and persists it as a new solo entry.
    pub fn submit_solo(&self, state: &mut ClientState) -> Result<RecordId, SubmitError> {
        let result = validate_solo_submission(&state.solo_form, &state.groups, &state.solo)
            .map_err(SubmitError::from)
            .and_then(|entry| {
                let creator = self.identity.current_participant_id();
                self.store
                    .create_solo(&entry, creator.as_deref())
                    .map_err(|err| SubmitError::from_store(RecordKind::Solo, err))
            });

        match result {
            Ok(id) => {
                info!("event=solo_submit module=service status=ok id={id}");
                state.solo_form.reset();
                Ok(id)
            }
            Err(err) => {
                warn!(
                    "event=solo_submit module=service status=rejected error_code={} retryable={}",
                    err.code(),
                    err.is_retryable()
                );
                Err(err)
            }
        }
    }

    /// Phase one of deletion: selects a record, touching nothing.
    pub fn request_delete(&self, state: &mut ClientState, kind: RecordKind, id: RecordId) {
        state.deletion.request(DeletionTarget::new(kind, id));
    }

    /// Abandons a pending deletion.
    pub fn cancel_delete(&self, state: &mut ClientState) -> Option<DeletionTarget> {
        state.deletion.cancel()
    }

    /// Phase two of deletion: deletes the pending record if `secret` matches.
    pub fn confirm_delete(
        &self,
        state: &mut ClientState,
        secret: &str,
    ) -> Result<DeletionTarget, DeletionError> {
        state.deletion.confirm(secret, &self.store)
    }
}
