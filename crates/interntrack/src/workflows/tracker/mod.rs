//! Application tracking workflow: the status state machine over a user's
//! tracked applications, plus the HTTP surface for browsing and mutating
//! them.

pub mod router;
pub mod state_machine;

#[cfg(test)]
mod tests;

pub use router::tracker_router;
pub use state_machine::{ApplicationTracker, TrackerError, TransitionPolicy};
