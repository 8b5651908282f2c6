use super::common::*;
use crate::domain::{ApplicationStatus, InternshipId, UserId};
use crate::workflows::tracker::{ApplicationTracker, TrackerError, TransitionPolicy};
use chrono::Duration;
use std::sync::Arc;

fn seeded() -> (Arc<MemoryStore>, ApplicationTracker<MemoryStore>, UserId, InternshipId) {
    let store = MemoryStore::default()
        .with_user(user("u-1"))
        .with_internship(internship("intern-1", 14));
    let (store, tracker) = build_tracker(store);
    (store, tracker, UserId("u-1".to_string()), InternshipId("intern-1".to_string()))
}

#[test]
fn saving_creates_a_tracked_application_with_deadline_snapshot() {
    let (store, tracker, user_id, internship_id) = seeded();

    let application = tracker
        .transition_at(&user_id, &internship_id, ApplicationStatus::Saved, None, base_time())
        .expect("save succeeds");

    assert_eq!(application.status, ApplicationStatus::Saved);
    assert_eq!(application.applied_date, None);
    assert_eq!(application.deadline_snapshot, base_time() + Duration::days(14));

    let stored = store.stored_user(&user_id);
    assert_eq!(stored.applications.len(), 1);
    assert_eq!(stored.history_version, 1);
}

#[test]
fn saving_twice_fails_with_duplicate() {
    let (store, tracker, user_id, internship_id) = seeded();

    tracker
        .transition_at(&user_id, &internship_id, ApplicationStatus::Saved, None, base_time())
        .expect("first save succeeds");

    match tracker.transition_at(&user_id, &internship_id, ApplicationStatus::Saved, None, base_time()) {
        Err(TrackerError::DuplicateApplication) => {}
        other => panic!("expected duplicate error, got {other:?}"),
    }
    // The failed save must not touch the stored record.
    assert_eq!(store.stored_user(&user_id).history_version, 1);
}

#[test]
fn non_saved_target_without_a_record_is_not_found() {
    let (_store, tracker, user_id, internship_id) = seeded();

    match tracker.transition_at(
        &user_id,
        &internship_id,
        ApplicationStatus::Applied,
        None,
        base_time(),
    ) {
        Err(TrackerError::ApplicationNotFound) => {}
        other => panic!("expected application not found, got {other:?}"),
    }
}

#[test]
fn saving_an_unknown_internship_is_not_found() {
    let (_store, tracker, user_id, _) = seeded();

    match tracker.transition_at(
        &user_id,
        &InternshipId("ghost".to_string()),
        ApplicationStatus::Saved,
        None,
        base_time(),
    ) {
        Err(TrackerError::InternshipNotFound) => {}
        other => panic!("expected internship not found, got {other:?}"),
    }
}

#[test]
fn applied_stamps_applied_date_exactly_once() {
    let (_store, tracker, user_id, internship_id) = seeded();
    tracker
        .transition_at(&user_id, &internship_id, ApplicationStatus::Saved, None, base_time())
        .expect("save succeeds");

    let first = tracker
        .transition_at(&user_id, &internship_id, ApplicationStatus::Applied, None, base_time())
        .expect("first apply succeeds");
    assert_eq!(first.applied_date, Some(base_time()));

    let later = base_time() + Duration::days(2);
    let second = tracker
        .transition_at(&user_id, &internship_id, ApplicationStatus::Applied, None, later)
        .expect("re-applying is permitted");
    assert_eq!(second.applied_date, Some(base_time()), "stamp must not move");
}

#[test]
fn terminal_states_refuse_further_transitions() {
    let (store, tracker, user_id, internship_id) = seeded();
    tracker
        .transition_at(&user_id, &internship_id, ApplicationStatus::Saved, None, base_time())
        .expect("save succeeds");
    tracker
        .transition_at(&user_id, &internship_id, ApplicationStatus::Rejected, None, base_time())
        .expect("rejection from saved is permitted");

    match tracker.transition_at(
        &user_id,
        &internship_id,
        ApplicationStatus::Interviewing,
        None,
        base_time(),
    ) {
        Err(TrackerError::InvalidTransition { from, to }) => {
            assert_eq!(from, ApplicationStatus::Rejected);
            assert_eq!(to, ApplicationStatus::Interviewing);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }

    let stored = store.stored_user(&user_id);
    assert_eq!(stored.applications[0].status, ApplicationStatus::Rejected);
}

#[test]
fn permissive_policy_allows_saved_straight_to_interviewing() {
    let (_store, tracker, user_id, internship_id) = seeded();
    tracker
        .transition_at(&user_id, &internship_id, ApplicationStatus::Saved, None, base_time())
        .expect("save succeeds");

    let application = tracker
        .transition_at(
            &user_id,
            &internship_id,
            ApplicationStatus::Interviewing,
            Some("phone screen booked".to_string()),
            base_time(),
        )
        .expect("permissive jump succeeds");
    assert_eq!(application.status, ApplicationStatus::Interviewing);
    assert_eq!(application.notes.as_deref(), Some("phone screen booked"));
}

#[test]
fn strict_policy_rejects_saved_straight_to_accepted() {
    let store = MemoryStore::default()
        .with_user(user("u-1"))
        .with_internship(internship("intern-1", 14));
    let store = Arc::new(store);
    let tracker = ApplicationTracker::with_policy(store, TransitionPolicy::Strict);
    let user_id = UserId("u-1".to_string());
    let internship_id = InternshipId("intern-1".to_string());

    tracker
        .transition_at(&user_id, &internship_id, ApplicationStatus::Saved, None, base_time())
        .expect("save succeeds");

    match tracker.transition_at(
        &user_id,
        &internship_id,
        ApplicationStatus::Accepted,
        None,
        base_time(),
    ) {
        Err(TrackerError::InvalidTransition { .. }) => {}
        other => panic!("expected invalid transition, got {other:?}"),
    }

    // The conventional pipeline still works end to end.
    for status in [
        ApplicationStatus::Applied,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Offered,
        ApplicationStatus::Accepted,
    ] {
        tracker
            .transition_at(&user_id, &internship_id, status, None, base_time())
            .unwrap_or_else(|err| panic!("strict pipeline step {status:?} failed: {err:?}"));
    }
}

#[test]
fn unknown_user_is_not_found() {
    let (_store, tracker, _, internship_id) = seeded();

    match tracker.transition_at(
        &UserId("ghost".to_string()),
        &internship_id,
        ApplicationStatus::Saved,
        None,
        base_time(),
    ) {
        Err(TrackerError::UserNotFound) => {}
        other => panic!("expected user not found, got {other:?}"),
    }
}

#[test]
fn concurrent_transitions_on_one_user_serialize() {
    let store = MemoryStore::default().with_user(user("u-1"));
    let store = {
        let mut store = store;
        for index in 0..8 {
            store = store.with_internship(internship(&format!("intern-{index}"), 14));
        }
        store
    };
    let (store, tracker) = build_tracker(store);
    let tracker = Arc::new(tracker);
    let user_id = UserId("u-1".to_string());

    std::thread::scope(|scope| {
        for index in 0..8 {
            let tracker = tracker.clone();
            let user_id = user_id.clone();
            scope.spawn(move || {
                tracker
                    .transition(
                        &user_id,
                        &InternshipId(format!("intern-{index}")),
                        ApplicationStatus::Saved,
                        None,
                    )
                    .expect("save succeeds");
            });
        }
    });

    let stored = store.stored_user(&user_id);
    assert_eq!(stored.applications.len(), 8, "no lost updates");
    assert_eq!(stored.history_version, 8);
}
