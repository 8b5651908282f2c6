use chrono::{DateTime, Utc};

use crate::domain::{TrackedApplication, User};

/// One tracked application whose deadline falls inside the reminder window.
#[derive(Debug, Clone, PartialEq)]
pub struct DeadlineHit {
    pub application: TrackedApplication,
    pub days_remaining: i64,
}

/// Whole-day ceiling of the time left until `deadline`. A deadline later
/// today counts as 1 day remaining; one that has passed is zero or negative.
fn days_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
    let seconds = (deadline - now).num_seconds();
    seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) != 0)
}

/// Scan a user's tracked applications for deadlines due within the window.
///
/// Pure function of its inputs: no clock reads, no side effects, recomputed
/// fresh on every call. Passed deadlines and terminal-status applications
/// never qualify. Output is ordered soonest-first, ties broken by internship
/// id so repeated scans are byte-for-byte identical.
pub fn scan(user: &User, now: DateTime<Utc>, window_days: i64) -> Vec<DeadlineHit> {
    let mut hits: Vec<DeadlineHit> = user
        .applications
        .iter()
        .filter(|app| !app.status.is_terminal())
        .filter_map(|app| {
            let days = days_remaining(app.deadline_snapshot, now);
            (days > 0 && days <= window_days).then(|| DeadlineHit {
                application: app.clone(),
                days_remaining: days,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        a.days_remaining
            .cmp(&b.days_remaining)
            .then_with(|| a.application.internship_id.cmp(&b.application.internship_id))
    });

    hits
}
