use serde::Deserialize;

use crate::domain::{ExperienceLevel, Field, Internship, InternshipId, User, UserId, WorkType};

/// Narrow contract over the document store holding users and internships.
///
/// The core never assumes a storage technology; `save_user` must replace the
/// whole document atomically so the tracker's read-modify-write stays
/// consistent under its per-user lock.
pub trait RecordStore: Send + Sync {
    fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
    fn save_user(&self, user: User) -> Result<(), StoreError>;
    /// Enumerates users for the batch reminder cycle.
    fn list_user_ids(&self) -> Result<Vec<UserId>, StoreError>;
    fn get_internship(&self, id: &InternshipId) -> Result<Option<Internship>, StoreError>;
    fn find_internships(
        &self,
        filter: &InternshipFilter,
        page: usize,
        limit: usize,
    ) -> Result<InternshipPage, StoreError>;
}

/// Query-by-filter parameters for internship listings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InternshipFilter {
    pub field: Option<Field>,
    pub location: Option<String>,
    pub work_type: Option<WorkType>,
    pub experience_level: Option<ExperienceLevel>,
    pub search: Option<String>,
    #[serde(default = "InternshipFilter::default_active_only")]
    pub active_only: bool,
}

impl InternshipFilter {
    const fn default_active_only() -> bool {
        true
    }

    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, internship: &Internship) -> bool {
        if self.active_only && !internship.is_active {
            return false;
        }
        if self.field.is_some_and(|field| field != internship.field) {
            return false;
        }
        if self
            .location
            .as_deref()
            .is_some_and(|location| !internship.location.eq_ignore_ascii_case(location))
        {
            return false;
        }
        if self
            .work_type
            .is_some_and(|work_type| work_type != internship.work_type)
        {
            return false;
        }
        if self
            .experience_level
            .is_some_and(|level| level != internship.experience_level)
        {
            return false;
        }
        if let Some(needle) = self.search.as_deref() {
            let needle = needle.to_lowercase();
            let haystack = format!(
                "{} {} {}",
                internship.title, internship.company, internship.description
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// One page of a filtered internship query plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct InternshipPage {
    pub items: Vec<Internship>,
    pub total: usize,
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("concurrent update conflict")]
    Conflict,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}
