//! Submission validation rules.
//!
//! # Responsibility
//! - Decide whether a group/solo submission may be persisted.
//! - Produce normalized records ready for the store boundary.
//!
//! # Invariants
//! - Validation is pure: it reads snapshots and never touches storage.
//! - Rejections are reported verbatim; input is never silently corrected
//!   beyond whitespace trimming.

pub mod error;
pub mod group_rules;
pub mod solo_rules;

pub use error::{SoloField, ValidationError};
pub use group_rules::{validate_group_submission, ValidGroup};
pub use solo_rules::{validate_solo_submission, ValidSoloEntry};
