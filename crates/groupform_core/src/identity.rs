//! Participant identity boundary.
//!
//! The identity only stamps `creator_id` on new records; it never gates any
//! operation.

/// Supplies the opaque identifier of the current participant.
pub trait IdentityProvider {
    fn current_participant_id(&self) -> Option<String>;
}

/// Identity fixed for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    participant_id: Option<String>,
}

impl StaticIdentity {
    pub fn new(participant_id: impl Into<String>) -> Self {
        let participant_id = participant_id.into();
        let participant_id = participant_id.trim();
        Self {
            participant_id: (!participant_id.is_empty()).then(|| participant_id.to_string()),
        }
    }

    /// Identity for a participant that is not signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_participant_id(&self) -> Option<String> {
        self.participant_id.clone()
    }
}
