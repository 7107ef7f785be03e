//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate rule-table expansion and repository calls into the merged
//!   agenda API.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod schedule_service;
