use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for user records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for internship postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InternshipId(pub String);

/// Closed vocabulary of internship fields surfaced to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "Software Engineering")]
    SoftwareEngineering,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Product Management")]
    ProductManagement,
    #[serde(rename = "UX Design")]
    UxDesign,
    Marketing,
    Finance,
}

/// Seniority tiers used both on postings and in user preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "Entry Level")]
    EntryLevel,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkType {
    Remote,
    Hybrid,
    #[serde(rename = "On-site")]
    OnSite,
}

/// How often the scheduling layer invokes the reminder cycle for a user.
/// Cadence only; it never changes which deadlines qualify for a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    #[serde(rename = "Bi-weekly")]
    BiWeekly,
}

impl Default for ReminderFrequency {
    fn default() -> Self {
        Self::Daily
    }
}

/// Lifecycle status of a tracked application.
///
/// `Rejected`, `Accepted`, and `Withdrawn` are terminal: once reached, no
/// further transition is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Saved,
    Applied,
    Interviewing,
    Offered,
    Rejected,
    Accepted,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Accepted | Self::Withdrawn)
    }

    /// True once the user has actually submitted an application, as opposed
    /// to merely bookmarking it. Used to label recommendation training data.
    pub const fn reached_applied(self) -> bool {
        matches!(
            self,
            Self::Applied | Self::Interviewing | Self::Offered | Self::Accepted
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Saved => "Saved",
            Self::Applied => "Applied",
            Self::Interviewing => "Interviewing",
            Self::Offered => "Offered",
            Self::Rejected => "Rejected",
            Self::Accepted => "Accepted",
            Self::Withdrawn => "Withdrawn",
        }
    }
}

/// Monthly stipend attached to a posting, when the company discloses one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stipend {
    pub amount: u32,
    #[serde(default = "Stipend::default_currency")]
    pub currency: String,
}

impl Stipend {
    fn default_currency() -> String {
        "USD".to_string()
    }
}

/// An internship posting. Immutable from the core's perspective except for
/// the `is_active` / `application_count` side counters maintained by
/// ingestion collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Internship {
    pub id: InternshipId,
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub location: String,
    pub work_type: WorkType,
    pub field: Field,
    pub experience_level: ExperienceLevel,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stipend: Option<Stipend>,
    pub application_url: String,
    pub deadline: DateTime<Utc>,
    pub posted_date: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub application_count: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// A user's record of interest in one internship, carrying its own status
/// and a deadline snapshot taken at save time so later edits to the posting
/// do not rewrite reminder history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedApplication {
    pub internship_id: InternshipId,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<DateTime<Utc>>,
    pub deadline_snapshot: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Per-channel toggles and cadence for reminder delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default = "default_true")]
    pub email: bool,
    #[serde(default = "default_true")]
    pub push: bool,
    #[serde(default)]
    pub reminder_frequency: ReminderFrequency,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            reminder_frequency: ReminderFrequency::default(),
        }
    }
}

/// Matching preferences driving both browse filters and the recommendation
/// feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub work_types: Vec<WorkType>,
    #[serde(default)]
    pub notifications: NotificationPreferences,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            locations: Vec::new(),
            experience_level: None,
            work_types: Vec::new(),
            notifications: NotificationPreferences::default(),
        }
    }
}

/// A user record. Owned exclusively by the record store; the applications
/// sequence is mutated only through the tracker state machine or the
/// preference-update operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub applications: Vec<TrackedApplication>,
    /// Bumped on every successful status transition; the recommendation
    /// model cache keys off it to decide when retraining is due.
    #[serde(default)]
    pub history_version: u64,
}

impl User {
    pub fn application(&self, internship_id: &InternshipId) -> Option<&TrackedApplication> {
        self.applications
            .iter()
            .find(|app| &app.internship_id == internship_id)
    }
}
