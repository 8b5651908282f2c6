use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::domain::{Internship, InternshipId, User, UserId};

/// Outbound e-mail contract. The real SMTP adapter lives with the service
/// binary; the core only ever sees this trait.
pub trait MailTransport: Send + Sync {
    fn send(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), TransportError>;
}

/// Outbound push-notification contract, symmetric to [`MailTransport`].
pub trait PushTransport: Send + Sync {
    fn push(&self, user_id: &UserId, title: &str, body: &str) -> Result<(), TransportError>;
}

/// Transport dispatch error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// A scan hit joined with its internship so messages can name the posting.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub internship: Internship,
    pub days_remaining: i64,
}

/// Rendered e-mail payload for one deadline reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub fn compose_reminder_email(internship: &Internship, days_remaining: i64) -> ReminderEmail {
    let subject = format!("Reminder: {} Application Deadline", internship.title);
    let text = format!(
        "The application deadline for {} at {} is in {} days.",
        internship.title, internship.company, days_remaining
    );
    let html = format!(
        "<h2>Application Deadline Reminder</h2>\
         <p>The application deadline for <strong>{}</strong> at <strong>{}</strong> \
         is in <strong>{} days</strong>.</p>\
         <p>Don't forget to submit your application!</p>",
        internship.title, internship.company, days_remaining
    );

    ReminderEmail {
        subject,
        text,
        html,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderChannel {
    Email,
    Push,
}

/// One message that could not be handed to its transport. The batch keeps
/// going; the caller may retry failed entries on the next cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchFailure {
    pub internship_id: InternshipId,
    pub channel: ReminderChannel,
    pub error: TransportError,
}

/// Outcome counters for one user's dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub sent: usize,
    pub suppressed: usize,
    pub failures: Vec<DispatchFailure>,
}

type DeliveryKey = (UserId, InternshipId, i64, ReminderChannel);

/// Turns scan results into outbound messages, honoring per-channel user
/// preferences and staying idempotent per `(user, internship,
/// days_remaining)` key within a cycle. One failing transport call never
/// aborts the remaining messages.
pub struct ReminderDispatcher<M, P> {
    mail: Arc<M>,
    push: Arc<P>,
    delivered: Mutex<HashSet<DeliveryKey>>,
}

impl<M, P> ReminderDispatcher<M, P>
where
    M: MailTransport,
    P: PushTransport,
{
    pub fn new(mail: Arc<M>, push: Arc<P>) -> Self {
        Self {
            mail,
            push,
            delivered: Mutex::new(HashSet::new()),
        }
    }

    /// Forget delivery keys from previous cycles. Called by the batch runner
    /// at the start of each scheduled cycle; within one cycle repeated
    /// dispatches stay suppressed.
    pub fn begin_cycle(&self) {
        self.delivered
            .lock()
            .expect("delivery ledger poisoned")
            .clear();
    }

    pub fn dispatch(&self, user: &User, reminders: &[Reminder]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for reminder in reminders {
            for channel in [ReminderChannel::Email, ReminderChannel::Push] {
                let enabled = match channel {
                    ReminderChannel::Email => user.preferences.notifications.email,
                    ReminderChannel::Push => user.preferences.notifications.push,
                };
                if !enabled {
                    report.suppressed += 1;
                    continue;
                }

                let key = (
                    user.id.clone(),
                    reminder.internship.id.clone(),
                    reminder.days_remaining,
                    channel,
                );
                if self
                    .delivered
                    .lock()
                    .expect("delivery ledger poisoned")
                    .contains(&key)
                {
                    report.suppressed += 1;
                    continue;
                }

                let outcome = match channel {
                    ReminderChannel::Email => {
                        let email =
                            compose_reminder_email(&reminder.internship, reminder.days_remaining);
                        self.mail
                            .send(&user.email, &email.subject, &email.text, &email.html)
                    }
                    ReminderChannel::Push => {
                        let email =
                            compose_reminder_email(&reminder.internship, reminder.days_remaining);
                        self.push.push(&user.id, &email.subject, &email.text)
                    }
                };

                match outcome {
                    Ok(()) => {
                        self.delivered
                            .lock()
                            .expect("delivery ledger poisoned")
                            .insert(key);
                        report.sent += 1;
                    }
                    Err(error) => {
                        tracing::warn!(
                            user = %user.id.0,
                            internship = %reminder.internship.id.0,
                            ?channel,
                            %error,
                            "reminder delivery failed"
                        );
                        report.failures.push(DispatchFailure {
                            internship_id: reminder.internship.id.clone(),
                            channel,
                            error,
                        });
                    }
                }
            }
        }

        report
    }

    /// Ad-hoc single e-mail send outside the batch flow. A transport failure
    /// here is a warning for the caller, never a hard request failure.
    pub fn send_single(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), TransportError> {
        self.mail.send(to, subject, text, html).inspect_err(|error| {
            tracing::warn!(%to, %error, "ad-hoc email send failed");
        })
    }
}
