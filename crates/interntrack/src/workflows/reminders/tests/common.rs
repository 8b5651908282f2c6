use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{
    ApplicationStatus, ExperienceLevel, Field, Internship, InternshipId, Preferences,
    TrackedApplication, User, UserId, WorkType,
};
use crate::store::{InternshipFilter, InternshipPage, RecordStore, StoreError};
use crate::workflows::reminders::dispatcher::{
    MailTransport, PushTransport, TransportError,
};

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).single().expect("valid base time")
}

pub(super) fn internship(id: &str, deadline_in_days: i64) -> Internship {
    Internship {
        id: InternshipId(id.to_string()),
        title: format!("{id} Intern"),
        company: "Acme Robotics".to_string(),
        description: "Build internal tooling".to_string(),
        requirements: Vec::new(),
        location: "Des Moines".to_string(),
        work_type: WorkType::Remote,
        field: Field::DataScience,
        experience_level: ExperienceLevel::EntryLevel,
        duration: "10 weeks".to_string(),
        stipend: None,
        application_url: format!("https://acme.example/jobs/{id}"),
        deadline: base_time() + Duration::days(deadline_in_days),
        posted_date: base_time() - Duration::days(5),
        tags: Vec::new(),
        application_count: 0,
        is_active: true,
    }
}

pub(super) fn tracked(id: &str, deadline_in_days: i64, status: ApplicationStatus) -> TrackedApplication {
    TrackedApplication {
        internship_id: InternshipId(id.to_string()),
        status,
        applied_date: None,
        deadline_snapshot: base_time() + Duration::days(deadline_in_days),
        notes: None,
    }
}

pub(super) fn user_with(id: &str, applications: Vec<TrackedApplication>) -> User {
    User {
        id: UserId(id.to_string()),
        email: format!("{id}@example.com"),
        name: "Jordan Example".to_string(),
        preferences: Preferences::default(),
        applications,
        history_version: 0,
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    users: Mutex<HashMap<UserId, User>>,
    internships: Mutex<BTreeMap<InternshipId, Internship>>,
}

impl MemoryStore {
    pub(super) fn with_user(self, user: User) -> Self {
        self.users
            .lock()
            .expect("store mutex poisoned")
            .insert(user.id.clone(), user);
        self
    }

    pub(super) fn with_internship(self, internship: Internship) -> Self {
        self.internships
            .lock()
            .expect("store mutex poisoned")
            .insert(internship.id.clone(), internship);
        self
    }
}

impl RecordStore for MemoryStore {
    fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().expect("store mutex poisoned").get(id).cloned())
    }

    fn save_user(&self, user: User) -> Result<(), StoreError> {
        self.users
            .lock()
            .expect("store mutex poisoned")
            .insert(user.id.clone(), user);
        Ok(())
    }

    fn list_user_ids(&self) -> Result<Vec<UserId>, StoreError> {
        let mut ids: Vec<UserId> = self
            .users
            .lock()
            .expect("store mutex poisoned")
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn get_internship(&self, id: &InternshipId) -> Result<Option<Internship>, StoreError> {
        Ok(self
            .internships
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }

    fn find_internships(
        &self,
        filter: &InternshipFilter,
        page: usize,
        limit: usize,
    ) -> Result<InternshipPage, StoreError> {
        let mut items: Vec<Internship> = self
            .internships
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|internship| filter.matches(internship))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.posted_date.cmp(&a.posted_date).then_with(|| a.id.cmp(&b.id)));
        let total = items.len();
        let items = items
            .into_iter()
            .skip(page.saturating_sub(1) * limit)
            .take(limit)
            .collect();
        Ok(InternshipPage { items, total })
    }
}

/// Captures outbound e-mail instead of delivering it.
#[derive(Default)]
pub(super) struct RecordingMail {
    pub(super) sent: Mutex<Vec<(String, String, String)>>,
}

impl MailTransport for RecordingMail {
    fn send(&self, to: &str, subject: &str, text: &str, _html: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .expect("mail mutex poisoned")
            .push((to.to_string(), subject.to_string(), text.to_string()));
        Ok(())
    }
}

impl RecordingMail {
    pub(super) fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("mail mutex poisoned")
            .iter()
            .map(|(_, subject, _)| subject.clone())
            .collect()
    }
}

/// Captures push notifications instead of delivering them.
#[derive(Default)]
pub(super) struct RecordingPush {
    pub(super) pushed: Mutex<Vec<(UserId, String)>>,
}

impl PushTransport for RecordingPush {
    fn push(&self, user_id: &UserId, title: &str, _body: &str) -> Result<(), TransportError> {
        self.pushed
            .lock()
            .expect("push mutex poisoned")
            .push((user_id.clone(), title.to_string()));
        Ok(())
    }
}

/// Fails every send, for partial-failure coverage.
pub(super) struct FailingMail;

impl MailTransport for FailingMail {
    fn send(&self, _to: &str, _subject: &str, _text: &str, _html: &str) -> Result<(), TransportError> {
        Err(TransportError::Unavailable("smtp offline".to_string()))
    }
}

pub(super) fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
