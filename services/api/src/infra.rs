use chrono::{DateTime, Duration, NaiveDate, Utc};
use interntrack::domain::{
    ExperienceLevel, Field, Internship, InternshipId, NotificationPreferences, Preferences,
    ReminderFrequency, Stipend, User, UserId, WorkType,
};
use interntrack::store::{InternshipFilter, InternshipPage, RecordStore, StoreError};
use interntrack::workflows::reminders::{MailTransport, PushTransport, TransportError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryRecordStore {
    users: Mutex<HashMap<UserId, User>>,
    internships: Mutex<BTreeMap<InternshipId, Internship>>,
}

impl InMemoryRecordStore {
    pub(crate) fn insert_user(&self, user: User) {
        self.users
            .lock()
            .expect("user store mutex poisoned")
            .insert(user.id.clone(), user);
    }

    pub(crate) fn insert_internship(&self, internship: Internship) {
        self.internships
            .lock()
            .expect("internship store mutex poisoned")
            .insert(internship.id.clone(), internship);
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .expect("user store mutex poisoned")
            .get(id)
            .cloned())
    }

    fn save_user(&self, user: User) -> Result<(), StoreError> {
        self.users
            .lock()
            .expect("user store mutex poisoned")
            .insert(user.id.clone(), user);
        Ok(())
    }

    fn list_user_ids(&self) -> Result<Vec<UserId>, StoreError> {
        Ok(self
            .users
            .lock()
            .expect("user store mutex poisoned")
            .keys()
            .cloned()
            .collect())
    }

    fn get_internship(&self, id: &InternshipId) -> Result<Option<Internship>, StoreError> {
        Ok(self
            .internships
            .lock()
            .expect("internship store mutex poisoned")
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
            .expect("internship store mutex poisoned")
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

/// Mail adapter for local runs: every send is logged and recorded, none
/// leaves the process.
pub(crate) struct OutboxMailTransport {
    from: String,
    deliveries: Mutex<Vec<(String, String)>>,
}

impl OutboxMailTransport {
    pub(crate) fn new(from: String) -> Self {
        Self {
            from,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn deliveries(&self) -> Vec<(String, String)> {
        self.deliveries.lock().expect("outbox mutex poisoned").clone()
    }
}

impl MailTransport for OutboxMailTransport {
    fn send(&self, to: &str, subject: &str, _text: &str, _html: &str) -> Result<(), TransportError> {
        info!(from = %self.from, %to, %subject, "outbox mail delivery");
        self.deliveries
            .lock()
            .expect("outbox mutex poisoned")
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct LoggingPushTransport {
    pushes: Mutex<Vec<(UserId, String)>>,
}

impl LoggingPushTransport {
    pub(crate) fn pushes(&self) -> Vec<(UserId, String)> {
        self.pushes.lock().expect("push log mutex poisoned").clone()
    }
}

impl PushTransport for LoggingPushTransport {
    fn push(&self, user_id: &UserId, title: &str, body: &str) -> Result<(), TransportError> {
        info!(user = %user_id.0, %title, %body, "push delivery");
        self.pushes
            .lock()
            .expect("push log mutex poisoned")
            .push((user_id.clone(), title.to_string()));
        Ok(())
    }
}

/// Seed the store with a small internship catalogue and one demo user so
/// the service answers meaningfully out of the box.
pub(crate) fn seed_records(store: &InMemoryRecordStore, now: DateTime<Utc>) {
    for internship in seed_internships(now) {
        store.insert_internship(internship);
    }
    store.insert_user(demo_user());
}

pub(crate) fn demo_user() -> User {
    User {
        id: UserId("demo-user".to_string()),
        email: "demo@interntrack.dev".to_string(),
        name: "Demo User".to_string(),
        preferences: Preferences {
            fields: vec![Field::SoftwareEngineering, Field::DataScience],
            locations: vec!["Des Moines".to_string(), "Remote".to_string()],
            experience_level: Some(ExperienceLevel::EntryLevel),
            work_types: vec![WorkType::Remote, WorkType::Hybrid],
            notifications: NotificationPreferences {
                email: true,
                push: true,
                reminder_frequency: ReminderFrequency::Daily,
            },
        },
        applications: Vec::new(),
        history_version: 0,
    }
}

pub(crate) fn seed_internships(now: DateTime<Utc>) -> Vec<Internship> {
    vec![
        seed_internship(
            "seed-backend",
            "Backend Engineering Intern",
            "Prairie Systems",
            Field::SoftwareEngineering,
            "Des Moines",
            WorkType::Hybrid,
            Some(2_400),
            now + Duration::days(5),
            now - Duration::days(2),
        ),
        seed_internship(
            "seed-data",
            "Data Science Intern",
            "Heartland Analytics",
            Field::DataScience,
            "Remote",
            WorkType::Remote,
            Some(2_800),
            now + Duration::days(12),
            now - Duration::days(4),
        ),
        seed_internship(
            "seed-design",
            "UX Design Intern",
            "Cedar Labs",
            Field::UxDesign,
            "Cedar Rapids",
            WorkType::OnSite,
            None,
            now + Duration::days(21),
            now - Duration::days(7),
        ),
        seed_internship(
            "seed-marketing",
            "Growth Marketing Intern",
            "Bluff Media",
            Field::Marketing,
            "Davenport",
            WorkType::Hybrid,
            Some(1_900),
            now + Duration::days(3),
            now - Duration::days(1),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn seed_internship(
    id: &str,
    title: &str,
    company: &str,
    field: Field,
    location: &str,
    work_type: WorkType,
    stipend: Option<u32>,
    deadline: DateTime<Utc>,
    posted_date: DateTime<Utc>,
) -> Internship {
    Internship {
        id: InternshipId(id.to_string()),
        title: title.to_string(),
        company: company.to_string(),
        description: format!("{title} at {company}"),
        requirements: Vec::new(),
        location: location.to_string(),
        work_type,
        field,
        experience_level: ExperienceLevel::EntryLevel,
        duration: "12 weeks".to_string(),
        stipend: stipend.map(|amount| Stipend {
            amount,
            currency: "USD".to_string(),
        }),
        application_url: format!("https://careers.example/{id}"),
        deadline,
        posted_date,
        tags: Vec::new(),
        application_count: 0,
        is_active: true,
    }
}

pub(crate) fn parse_day(raw: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("'{raw}' has no midnight"))?;
    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc))
}
