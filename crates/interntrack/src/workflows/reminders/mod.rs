//! Deadline reminder workflow: a pure scanner over a user's tracked
//! applications, a notification dispatcher speaking to external mail and
//! push transports, and a bounded batch cycle iterating over all users.

pub mod cycle;
pub mod dispatcher;
pub mod router;
pub mod scanner;

#[cfg(test)]
mod tests;

pub use cycle::{CycleReport, ReminderCycle};
pub use dispatcher::{
    compose_reminder_email, DispatchFailure, DispatchReport, MailTransport, PushTransport,
    Reminder, ReminderChannel, ReminderDispatcher, ReminderEmail, TransportError,
};
pub use router::{notifications_router, NotificationState};
pub use scanner::{scan, DeadlineHit};
