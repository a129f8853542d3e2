//! Registration store boundary and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract the registration core consumes.
//! - Isolate SQLite query details from validation and service orchestration.
//!
//! # Invariants
//! - Only validated records (`ValidGroup`/`ValidSoloEntry`) reach write paths.
//! - Store errors distinguish read failures from write failures.

pub mod registration_repo;
