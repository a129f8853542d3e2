//! Registration domain model.
//!
//! # Responsibility
//! - Define the group/solo records shared by validation, storage and views.
//! - Define roll number format rules.
//!
//! # Invariants
//! - Every persisted record is identified by a stable UUID.
//! - A roll number is either blank (unused slot) or `[A-Z][0-9]{3}`.

pub mod registration;
pub mod roll;
