//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, store writes and the deletion gate.
//! - Keep CLI and other shells decoupled from storage details.

pub mod registration_service;
