use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{DateTime, Utc};

use super::dispatcher::{DispatchReport, MailTransport, PushTransport, Reminder, ReminderDispatcher};
use super::scanner::scan;
use crate::config::ReminderConfig;
use crate::domain::{ReminderFrequency, UserId};
use crate::store::{RecordStore, StoreError};

/// Aggregate outcome of one batch reminder cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub users_scanned: usize,
    pub sent: usize,
    pub suppressed: usize,
    pub failed: usize,
    /// Users whose records could not be loaded this cycle. They are picked
    /// up again on the next scheduled run; there is no retry loop here.
    pub skipped_users: usize,
}

impl CycleReport {
    fn absorb(&mut self, report: &DispatchReport) {
        self.users_scanned += 1;
        self.sent += report.sent;
        self.suppressed += report.suppressed;
        self.failed += report.failures.len();
    }
}

/// Periodic batch job pairing the deadline scanner with the dispatcher.
///
/// Users are processed independently on a bounded worker pool so one slow
/// mail send or one broken user record never stalls the batch; per-user
/// failures are counted and left for the next cycle.
pub struct ReminderCycle<S, M, P> {
    store: Arc<S>,
    dispatcher: Arc<ReminderDispatcher<M, P>>,
    config: ReminderConfig,
}

impl<S, M, P> ReminderCycle<S, M, P>
where
    S: RecordStore + 'static,
    M: MailTransport + 'static,
    P: PushTransport + 'static,
{
    pub fn new(
        store: Arc<S>,
        dispatcher: Arc<ReminderDispatcher<M, P>>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            config,
        }
    }

    /// Run one cycle over every user.
    pub fn run(&self, now: DateTime<Utc>) -> Result<CycleReport, StoreError> {
        self.run_filtered(now, None)
    }

    /// Run one cycle over only the users subscribed at the given cadence.
    /// The scheduling layer invokes this daily/weekly/bi-weekly; cadence
    /// never changes which deadlines qualify.
    pub fn run_cadence(
        &self,
        now: DateTime<Utc>,
        frequency: ReminderFrequency,
    ) -> Result<CycleReport, StoreError> {
        self.run_filtered(now, Some(frequency))
    }

    fn run_filtered(
        &self,
        now: DateTime<Utc>,
        frequency: Option<ReminderFrequency>,
    ) -> Result<CycleReport, StoreError> {
        self.dispatcher.begin_cycle();

        let user_ids = self.store.list_user_ids()?;
        let workers = self.config.max_workers.clamp(1, user_ids.len().max(1));
        let next = AtomicUsize::new(0);
        let report = Mutex::new(CycleReport::default());

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(user_id) = user_ids.get(index) else {
                        break;
                    };
                    match self.process_user(user_id, now, frequency) {
                        Ok(Some(user_report)) => {
                            report
                                .lock()
                                .expect("cycle report poisoned")
                                .absorb(&user_report);
                        }
                        Ok(None) => {}
                        Err(error) => {
                            tracing::warn!(user = %user_id.0, %error, "skipping user this cycle");
                            report.lock().expect("cycle report poisoned").skipped_users += 1;
                        }
                    }
                });
            }
        });

        let report = report.into_inner().expect("cycle report poisoned");
        tracing::info!(
            users = report.users_scanned,
            sent = report.sent,
            suppressed = report.suppressed,
            failed = report.failed,
            "reminder cycle complete"
        );
        Ok(report)
    }

    fn process_user(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        frequency: Option<ReminderFrequency>,
    ) -> Result<Option<DispatchReport>, StoreError> {
        let Some(user) = self.store.get_user(user_id)? else {
            // Deleted between listing and processing.
            return Ok(None);
        };
        if frequency
            .is_some_and(|cadence| user.preferences.notifications.reminder_frequency != cadence)
        {
            return Ok(None);
        }

        let hits = scan(&user, now, self.config.window_days);
        let mut reminders = Vec::with_capacity(hits.len());
        for hit in hits {
            if let Some(internship) = self.store.get_internship(&hit.application.internship_id)? {
                reminders.push(Reminder {
                    internship,
                    days_remaining: hit.days_remaining,
                });
            }
        }

        Ok(Some(self.dispatcher.dispatch(&user, &reminders)))
    }
}
