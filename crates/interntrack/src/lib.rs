//! Core library behind the InternTrack service.
//!
//! The library owns the domain model for users, internships, and tracked
//! applications, plus the three engines the product is built around:
//!
//! - [`workflows::tracker`]: the application status state machine.
//! - [`workflows::reminders`]: the deadline scanner, notification
//!   dispatcher, and batch reminder cycle.
//! - [`workflows::recommend`]: the preference-driven recommendation scorer.
//!
//! Persistence and outbound mail are external collaborators reached through
//! the narrow contracts in [`store`] and [`workflows::reminders`].

pub mod config;
pub mod domain;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
