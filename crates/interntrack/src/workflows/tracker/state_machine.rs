use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::domain::{
    ApplicationStatus, Internship, InternshipId, TrackedApplication, User, UserId,
};
use crate::store::{InternshipFilter, InternshipPage, RecordStore, StoreError};

/// Governs which non-terminal transitions the state machine accepts.
///
/// The product has always allowed any jump between non-terminal statuses
/// (a user can go straight from `Saved` to `Interviewing`), so `Permissive`
/// is the default. `Strict` enforces the conventional pipeline and exists as
/// a configuration choice rather than a behavior change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl TransitionPolicy {
    pub fn allows(self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        use ApplicationStatus::*;

        match self {
            Self::Permissive => true,
            Self::Strict => {
                if from == to {
                    // Re-asserting the current status is always a no-op-ish
                    // update (notes may still change).
                    return true;
                }
                match to {
                    Withdrawn => true,
                    Rejected => matches!(from, Applied | Interviewing | Offered),
                    Applied => from == Saved,
                    Interviewing => from == Applied,
                    Offered => from == Interviewing,
                    Accepted => from == Offered,
                    Saved => false,
                }
            }
        }
    }
}

/// The status state machine over a user's tracked applications.
///
/// Every successful transition is one atomic `save_user` against the record
/// store, serialized per user through an advisory lock registry so two
/// concurrent transitions can never interleave their read-modify-write.
pub struct ApplicationTracker<S> {
    store: Arc<S>,
    locks: UserLockRegistry,
    policy: TransitionPolicy,
}

impl<S> ApplicationTracker<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_policy(store, TransitionPolicy::default())
    }

    pub fn with_policy(store: Arc<S>, policy: TransitionPolicy) -> Self {
        Self {
            store,
            locks: UserLockRegistry::default(),
            policy,
        }
    }

    /// Apply a status transition, creating the tracked application when the
    /// target is `Saved` and none exists yet.
    pub fn transition(
        &self,
        user_id: &UserId,
        internship_id: &InternshipId,
        target: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<TrackedApplication, TrackerError> {
        self.transition_at(user_id, internship_id, target, notes, Utc::now())
    }

    /// Same as [`transition`](Self::transition) with an injected clock for
    /// deterministic `applied_date` stamping in tests.
    pub fn transition_at(
        &self,
        user_id: &UserId,
        internship_id: &InternshipId,
        target: ApplicationStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<TrackedApplication, TrackerError> {
        let lock = self.locks.user_lock(user_id);
        let _guard = lock.lock().expect("user lock poisoned");

        let mut user = self
            .store
            .get_user(user_id)?
            .ok_or(TrackerError::UserNotFound)?;

        let position = user
            .applications
            .iter()
            .position(|app| &app.internship_id == internship_id);

        let updated = match position {
            None => {
                if target != ApplicationStatus::Saved {
                    return Err(TrackerError::ApplicationNotFound);
                }
                let internship = self
                    .store
                    .get_internship(internship_id)?
                    .ok_or(TrackerError::InternshipNotFound)?;
                let application = TrackedApplication {
                    internship_id: internship_id.clone(),
                    status: ApplicationStatus::Saved,
                    applied_date: None,
                    // Snapshot taken now; later deadline edits on the
                    // posting do not rewrite this user's reminder history.
                    deadline_snapshot: internship.deadline,
                    notes,
                };
                user.applications.push(application.clone());
                application
            }
            Some(index) => {
                let current = user.applications[index].status;
                if target == ApplicationStatus::Saved {
                    return Err(TrackerError::DuplicateApplication);
                }
                if current.is_terminal() || !self.policy.allows(current, target) {
                    return Err(TrackerError::InvalidTransition {
                        from: current,
                        to: target,
                    });
                }

                let application = &mut user.applications[index];
                application.status = target;
                if target == ApplicationStatus::Applied && application.applied_date.is_none() {
                    application.applied_date = Some(now);
                }
                if let Some(notes) = notes {
                    application.notes = Some(notes);
                }
                application.clone()
            }
        };

        user.history_version += 1;
        self.store.save_user(user)?;

        tracing::debug!(
            user = %user_id.0,
            internship = %internship_id.0,
            status = updated.status.label(),
            "application transition applied"
        );

        Ok(updated)
    }

    /// All tracked applications for a user, in tracking order.
    pub fn applications(&self, user_id: &UserId) -> Result<Vec<TrackedApplication>, TrackerError> {
        let user = self
            .store
            .get_user(user_id)?
            .ok_or(TrackerError::UserNotFound)?;
        Ok(user.applications)
    }

    /// Only the bookmarked-but-not-yet-applied applications.
    pub fn saved_applications(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<TrackedApplication>, TrackerError> {
        let applications = self.applications(user_id)?;
        Ok(applications
            .into_iter()
            .filter(|app| app.status == ApplicationStatus::Saved)
            .collect())
    }

    /// Filtered, paginated posting catalogue for the listing endpoints.
    pub fn browse(
        &self,
        filter: &InternshipFilter,
        page: usize,
        limit: usize,
    ) -> Result<InternshipPage, TrackerError> {
        Ok(self.store.find_internships(filter, page, limit)?)
    }

    pub fn internship(&self, id: &InternshipId) -> Result<Internship, TrackerError> {
        self.store
            .get_internship(id)?
            .ok_or(TrackerError::InternshipNotFound)
    }

    pub fn user(&self, id: &UserId) -> Result<User, TrackerError> {
        self.store.get_user(id)?.ok_or(TrackerError::UserNotFound)
    }
}

/// One advisory lock per user id so transitions on the same user serialize.
#[derive(Default)]
struct UserLockRegistry {
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLockRegistry {
    fn user_lock(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        let mut registry = self.locks.lock().expect("lock registry poisoned");
        registry
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Error raised by the application tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("user not found")]
    UserNotFound,
    #[error("internship not found")]
    InternshipNotFound,
    #[error("no tracked application for this internship")]
    ApplicationNotFound,
    #[error("internship already saved")]
    DuplicateApplication,
    #[error("cannot move application from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}
