use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{
    ExperienceLevel, Field, Internship, InternshipId, Preferences, Stipend, User, UserId, WorkType,
};
use crate::store::{InternshipFilter, InternshipPage, RecordStore, StoreError};
use crate::workflows::tracker::ApplicationTracker;

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).single().expect("valid base time")
}

pub(super) fn internship(id: &str, deadline_in_days: i64) -> Internship {
    Internship {
        id: InternshipId(id.to_string()),
        title: format!("{id} Intern"),
        company: "Acme Robotics".to_string(),
        description: "Build internal tooling".to_string(),
        requirements: vec!["Rust".to_string()],
        location: "Des Moines".to_string(),
        work_type: WorkType::Hybrid,
        field: Field::SoftwareEngineering,
        experience_level: ExperienceLevel::EntryLevel,
        duration: "12 weeks".to_string(),
        stipend: Some(Stipend {
            amount: 4000,
            currency: "USD".to_string(),
        }),
        application_url: format!("https://acme.example/jobs/{id}"),
        deadline: base_time() + Duration::days(deadline_in_days),
        posted_date: base_time() - Duration::days(10),
        tags: Vec::new(),
        application_count: 0,
        is_active: true,
    }
}

pub(super) fn user(id: &str) -> User {
    User {
        id: UserId(id.to_string()),
        email: format!("{id}@example.com"),
        name: "Jordan Example".to_string(),
        preferences: Preferences::default(),
        applications: Vec::new(),
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

    pub(super) fn stored_user(&self, id: &UserId) -> User {
        self.users
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
            .expect("user present")
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
        Ok(self
            .users
            .lock()
            .expect("store mutex poisoned")
            .keys()
            .cloned()
            .collect())
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

pub(super) fn build_tracker(store: MemoryStore) -> (Arc<MemoryStore>, ApplicationTracker<MemoryStore>) {
    let store = Arc::new(store);
    let tracker = ApplicationTracker::new(store.clone());
    (store, tracker)
}
