//! Registration core for student group formation.
//!
//! Students register as a group of two to four members or as a solo entrant.
//! This crate owns the rules that keep every roll number unique across both
//! lists, the group lock rule, and the passphrase-gated deletion workflow.

pub mod claims;
pub mod config;
pub mod db;
pub mod deletion;
pub mod identity;
pub mod live;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod state;
pub mod validation;

pub use claims::{collect_claimed_rolls, is_roll_taken, ClaimedRolls};
pub use config::{ConfigError, CoreConfig};
pub use deletion::{DeletionError, DeletionGate, DeletionSecret, DeletionState, DeletionTarget};
pub use identity::{IdentityProvider, StaticIdentity};
pub use live::{Broadcaster, LiveEvent, LiveRegistrationStore, Subscription};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::registration::{
    numbered_groups, Group, GroupForm, Member, RecordId, RecordKind, SoloEntry, SoloForm,
    GROUP_SLOT_COUNT,
};
pub use model::roll::is_valid_roll_number;
pub use repo::registration_repo::{
    RegistrationStore, SqliteRegistrationStore, StoreError, StoreResult,
};
pub use service::registration_service::{RegistrationService, SubmitError, SubmittedGroup};
pub use state::ClientState;
pub use validation::{
    validate_group_submission, validate_solo_submission, SoloField, ValidGroup, ValidSoloEntry,
    ValidationError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
