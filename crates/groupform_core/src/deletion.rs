//! Passphrase-gated deletion workflow.
//!
//! # Responsibility
//! - Hold at most one pending delete target until a passphrase is supplied.
//! - Issue exactly one store delete on a matching passphrase, none otherwise.
//!
//! # Invariants
//! - `Idle -> AwaitingSecret -> Idle`; every confirm or cancel ends in `Idle`.
//! - A new request while awaiting replaces the pending target.
//! - The passphrase never appears in logs or `Debug` output.

use crate::model::registration::{RecordId, RecordKind};
use crate::repo::registration_repo::{RegistrationStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Shared passphrase required to confirm a deletion.
#[derive(Clone, PartialEq, Eq)]
pub struct DeletionSecret(String);

impl DeletionSecret {
    /// Wraps a passphrase. Returns `None` for blank input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return None;
        }
        Some(Self(value))
    }

    /// Exact, case-sensitive comparison with no trimming.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl Debug for DeletionSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("DeletionSecret(<redacted>)")
    }
}

/// Record selected for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionTarget {
    pub kind: RecordKind,
    pub id: RecordId,
}

impl DeletionTarget {
    pub fn new(kind: RecordKind, id: RecordId) -> Self {
        Self { kind, id }
    }
}

/// Current step of the deletion workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionState {
    #[default]
    Idle,
    AwaitingSecret(DeletionTarget),
}

/// Failure of a deletion confirm.
#[derive(Debug)]
pub enum DeletionError {
    /// Confirm was called with no pending target.
    NothingPending,
    /// Supplied passphrase did not match; nothing was deleted.
    IncorrectSecret,
    /// Passphrase matched but the store rejected the delete.
    Store(StoreError),
}

impl DeletionError {
    /// Sentence shown to the participant.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NothingPending => "No entry is selected for deletion.",
            Self::IncorrectSecret => "Incorrect password. Deletion cancelled.",
            Self::Store(_) => "Failed to delete entry.",
        }
    }
}

impl Display for DeletionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingPending => write!(f, "no deletion is pending"),
            Self::IncorrectSecret => write!(f, "incorrect deletion passphrase"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DeletionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for DeletionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Two-phase deletion state machine for one client.
#[derive(Debug)]
pub struct DeletionGate {
    secret: DeletionSecret,
    state: DeletionState,
}

impl DeletionGate {
    pub fn new(secret: DeletionSecret) -> Self {
        Self {
            secret,
            state: DeletionState::Idle,
        }
    }

    pub fn state(&self) -> DeletionState {
        self.state
    }

    /// Pending target while awaiting a passphrase.
    pub fn pending(&self) -> Option<DeletionTarget> {
        match self.state {
            DeletionState::Idle => None,
            DeletionState::AwaitingSecret(target) => Some(target),
        }
    }

    /// Phase one: selects `target`, replacing any pending one.
    pub fn request(&mut self, target: DeletionTarget) {
        if let Some(previous) = self.pending() {
            info!(
                "event=delete_request module=deletion status=replaced kind={} id={} previous_id={}",
                target.kind.as_str(),
                target.id,
                previous.id
            );
        } else {
            info!(
                "event=delete_request module=deletion status=awaiting kind={} id={}",
                target.kind.as_str(),
                target.id
            );
        }
        self.state = DeletionState::AwaitingSecret(target);
    }

    /// Abandons the pending target without touching the store.
    pub fn cancel(&mut self) -> Option<DeletionTarget> {
        let pending = self.pending();
        if let Some(target) = pending {
            info!(
                "event=delete_cancel module=deletion status=ok kind={} id={}",
                target.kind.as_str(),
                target.id
            );
        }
        self.state = DeletionState::Idle;
        pending
    }

    /// Phase two: deletes the pending target when `secret` matches.
    ///
    /// The gate returns to `Idle` whatever the outcome.
    ///
    /// # Errors
    /// - `NothingPending` when no target was requested.
    /// - `IncorrectSecret` on mismatch; the store is not called.
    /// - `Store` when the delete itself fails.
    pub fn confirm<S>(&mut self, secret: &str, store: &S) -> Result<DeletionTarget, DeletionError>
    where
        S: RegistrationStore + ?Sized,
    {
        let target = match std::mem::take(&mut self.state) {
            DeletionState::Idle => return Err(DeletionError::NothingPending),
            DeletionState::AwaitingSecret(target) => target,
        };

        if !self.secret.matches(secret) {
            warn!(
                "event=delete_confirm module=deletion status=rejected kind={} id={} error_code=incorrect_secret",
                target.kind.as_str(),
                target.id
            );
            return Err(DeletionError::IncorrectSecret);
        }

        match store.delete_record(target.kind, target.id) {
            Ok(()) => {
                info!(
                    "event=delete_confirm module=deletion status=ok kind={} id={}",
                    target.kind.as_str(),
                    target.id
                );
                Ok(target)
            }
            Err(err) => {
                warn!(
                    "event=delete_confirm module=deletion status=error kind={} id={} error_code={}",
                    target.kind.as_str(),
                    target.id,
                    err.code()
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DeletionError, DeletionGate, DeletionSecret, DeletionState, DeletionTarget};
    use crate::model::registration::{Group, RecordId, RecordKind, SoloEntry};
    use crate::repo::registration_repo::{RegistrationStore, StoreResult};
    use crate::validation::{ValidGroup, ValidSoloEntry};
    use std::cell::RefCell;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingStore {
        deletes: RefCell<Vec<(RecordKind, RecordId)>>,
    }

    impl RegistrationStore for RecordingStore {
        fn read_all_groups(&self) -> StoreResult<Vec<Group>> {
            Ok(Vec::new())
        }

        fn read_all_solo(&self) -> StoreResult<Vec<SoloEntry>> {
            Ok(Vec::new())
        }

        fn create_group(&self, _: &ValidGroup, _: Option<&str>) -> StoreResult<RecordId> {
            Ok(Uuid::new_v4())
        }

        fn create_solo(&self, _: &ValidSoloEntry, _: Option<&str>) -> StoreResult<RecordId> {
            Ok(Uuid::new_v4())
        }

        fn delete_record(&self, kind: RecordKind, id: RecordId) -> StoreResult<()> {
            self.deletes.borrow_mut().push((kind, id));
            Ok(())
        }
    }

    fn gate() -> DeletionGate {
        DeletionGate::new(DeletionSecret::new("open sesame").unwrap())
    }

    #[test]
    fn blank_secret_is_rejected_and_debug_is_redacted() {
        assert!(DeletionSecret::new("  ").is_none());
        let secret = DeletionSecret::new("hunter2").unwrap();
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[test]
    fn correct_secret_deletes_exactly_once() {
        let store = RecordingStore::default();
        let mut gate = gate();
        let target = DeletionTarget::new(RecordKind::Group, Uuid::new_v4());

        gate.request(target);
        assert_eq!(gate.state(), DeletionState::AwaitingSecret(target));

        let deleted = gate.confirm("open sesame", &store).unwrap();
        assert_eq!(deleted, target);
        assert_eq!(store.deletes.borrow().as_slice(), &[(target.kind, target.id)]);
        assert_eq!(gate.state(), DeletionState::Idle);
    }

    #[test]
    fn wrong_secret_deletes_nothing_and_clears_target() {
        let store = RecordingStore::default();
        let mut gate = gate();
        gate.request(DeletionTarget::new(RecordKind::Solo, Uuid::new_v4()));

        let err = gate.confirm("Open sesame", &store).unwrap_err();
        assert!(matches!(err, DeletionError::IncorrectSecret));
        assert!(store.deletes.borrow().is_empty());
        assert_eq!(gate.state(), DeletionState::Idle);

        let err = gate.confirm("open sesame", &store).unwrap_err();
        assert!(matches!(err, DeletionError::NothingPending));
        assert!(store.deletes.borrow().is_empty());
    }

    #[test]
    fn secret_comparison_is_exact() {
        let secret = DeletionSecret::new("open sesame").unwrap();
        assert!(secret.matches("open sesame"));
        for attempt in ["Open sesame", "open sesame ", " open sesame", ""] {
            assert!(!secret.matches(attempt), "`{attempt}` must not match");
        }
    }

    #[test]
    fn last_request_wins_and_cancel_has_no_side_effects() {
        let store = RecordingStore::default();
        let mut gate = gate();
        let first = DeletionTarget::new(RecordKind::Group, Uuid::new_v4());
        let second = DeletionTarget::new(RecordKind::Solo, Uuid::new_v4());

        gate.request(first);
        gate.request(second);
        assert_eq!(gate.pending(), Some(second));

        assert_eq!(gate.cancel(), Some(second));
        assert_eq!(gate.state(), DeletionState::Idle);
        assert!(store.deletes.borrow().is_empty());
        assert_eq!(gate.cancel(), None);
    }
}
