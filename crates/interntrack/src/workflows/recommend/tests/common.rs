use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::config::RecommendConfig;
use crate::domain::{
    ApplicationStatus, ExperienceLevel, Field, Internship, InternshipId, Preferences, Stipend,
    TrackedApplication, User, UserId, WorkType,
};
use crate::store::{InternshipFilter, InternshipPage, RecordStore, StoreError};
use crate::workflows::recommend::RecommendationScorer;

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).single().expect("valid base time")
}

pub(super) struct PostingSpec {
    pub(super) id: &'static str,
    pub(super) field: Field,
    pub(super) location: &'static str,
    pub(super) work_type: WorkType,
    pub(super) experience_level: ExperienceLevel,
    pub(super) stipend: Option<u32>,
    pub(super) posted_days_ago: i64,
}

impl Default for PostingSpec {
    fn default() -> Self {
        Self {
            id: "intern-1",
            field: Field::SoftwareEngineering,
            location: "Des Moines",
            work_type: WorkType::Hybrid,
            experience_level: ExperienceLevel::EntryLevel,
            stipend: None,
            posted_days_ago: 10,
        }
    }
}

pub(super) fn posting(spec: PostingSpec) -> Internship {
    Internship {
        id: InternshipId(spec.id.to_string()),
        title: format!("{} Intern", spec.id),
        company: "Acme Robotics".to_string(),
        description: "Seasonal internship".to_string(),
        requirements: Vec::new(),
        location: spec.location.to_string(),
        work_type: spec.work_type,
        field: spec.field,
        experience_level: spec.experience_level,
        duration: "12 weeks".to_string(),
        stipend: spec.stipend.map(|amount| Stipend {
            amount,
            currency: "USD".to_string(),
        }),
        application_url: format!("https://acme.example/jobs/{}", spec.id),
        deadline: base_time() + Duration::days(15),
        posted_date: base_time() - Duration::days(spec.posted_days_ago),
        tags: Vec::new(),
        application_count: 0,
        is_active: true,
    }
}

pub(super) fn data_science_fan(id: &str) -> User {
    User {
        id: UserId(id.to_string()),
        email: format!("{id}@example.com"),
        name: "Jordan Example".to_string(),
        preferences: Preferences {
            fields: vec![Field::DataScience],
            locations: vec!["Des Moines".to_string()],
            experience_level: Some(ExperienceLevel::EntryLevel),
            work_types: vec![WorkType::Remote],
            ..Preferences::default()
        },
        applications: Vec::new(),
        history_version: 0,
    }
}

pub(super) fn tracked(id: &str, status: ApplicationStatus, applied: bool) -> TrackedApplication {
    TrackedApplication {
        internship_id: InternshipId(id.to_string()),
        status,
        applied_date: applied.then(|| base_time() - Duration::days(3)),
        deadline_snapshot: base_time() + Duration::days(15),
        notes: None,
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

pub(super) fn build_scorer(store: MemoryStore) -> (Arc<MemoryStore>, RecommendationScorer<MemoryStore>) {
    let store = Arc::new(store);
    let scorer = RecommendationScorer::new(store.clone(), RecommendConfig::default());
    (store, scorer)
}
