//! Domain model for schedule data.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Separate mutable user data (one-off events) from immutable weekly
//!   configuration (recurring templates) and derived view rows (agenda).
//!
//! # Invariants
//! - Every one-off event is identified by a stable `EventId`.
//! - Recurring templates are never individually addressable for mutation.

pub mod agenda;
pub mod event;
pub mod recurring;
