use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::features::{feature_vector, heuristic_score};
use super::model::{LogisticModel, TrainingExample};
use crate::config::RecommendConfig;
use crate::domain::{Internship, InternshipId, User, UserId};
use crate::store::{InternshipFilter, RecordStore, StoreError};

/// Upper bound on candidate postings pulled per request, keeping scoring
/// cost bounded regardless of catalogue size.
const CANDIDATE_POOL_LIMIT: usize = 200;

const SIMILAR_LIMIT: usize = 5;

/// Ephemeral per-request scoring outcome; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub internship_id: InternshipId,
    pub score: f32,
}

/// A score joined with its posting for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredInternship {
    pub internship: Internship,
    pub score: f32,
}

impl ScoredInternship {
    pub fn score_result(&self) -> ScoreResult {
        ScoreResult {
            internship_id: self.internship.id.clone(),
            score: self.score,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("user not found")]
    UserNotFound,
    #[error("internship not found")]
    InternshipNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

struct CachedModel {
    history_version: u64,
    /// `None` records that this history version could not support a fit, so
    /// repeated requests do not retrain just to fail again.
    model: Option<LogisticModel>,
}

/// Ranks not-yet-tracked internships by predicted relevance.
///
/// Models are cached per user and rebuilt only when the user's
/// `history_version` moves, so a burst of recommendation requests does not
/// retrain on every call.
pub struct RecommendationScorer<S> {
    store: Arc<S>,
    config: RecommendConfig,
    cache: Mutex<HashMap<UserId, CachedModel>>,
}

impl<S> RecommendationScorer<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>, config: RecommendConfig) -> Self {
        Self {
            store,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Load the user and the active candidate pool, then rank.
    pub fn recommend(&self, user_id: &UserId) -> Result<Vec<ScoredInternship>, RecommendError> {
        let user = self
            .store
            .get_user(user_id)?
            .ok_or(RecommendError::UserNotFound)?;
        let pool = self
            .store
            .find_internships(&InternshipFilter::active(), 1, CANDIDATE_POOL_LIMIT)?
            .items;
        Ok(self.recommend_for(&user, pool, Utc::now()))
    }

    /// Rank an explicit candidate pool. Already-tracked and inactive
    /// postings are excluded outright, not merely down-ranked. Ordering is
    /// score descending, then most recently posted, then internship id, and
    /// the result is truncated to the configured `top_k`.
    pub fn recommend_for(
        &self,
        user: &User,
        pool: Vec<Internship>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredInternship> {
        let model = self.scoring_model(user, now);
        let tracked: HashSet<&InternshipId> = user
            .applications
            .iter()
            .map(|app| &app.internship_id)
            .collect();

        let mut scored: Vec<ScoredInternship> = pool
            .into_iter()
            .filter(|internship| internship.is_active && !tracked.contains(&internship.id))
            .map(|internship| {
                let features = feature_vector(&user.preferences, &internship, now);
                let score = match &model {
                    Some(model) => model.predict(&features),
                    None => heuristic_score(&features),
                };
                ScoredInternship { internship, score }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.internship.posted_date.cmp(&a.internship.posted_date))
                .then_with(|| a.internship.id.cmp(&b.internship.id))
        });
        scored.truncate(self.config.top_k);
        scored
    }

    /// Postings in the same field at the same level as the anchor, newest
    /// first.
    pub fn similar(&self, internship_id: &InternshipId) -> Result<Vec<Internship>, RecommendError> {
        let anchor = self
            .store
            .get_internship(internship_id)?
            .ok_or(RecommendError::InternshipNotFound)?;

        let filter = InternshipFilter {
            field: Some(anchor.field),
            experience_level: Some(anchor.experience_level),
            ..InternshipFilter::active()
        };
        let page = self
            .store
            .find_internships(&filter, 1, SIMILAR_LIMIT + 1)?;

        Ok(page
            .items
            .into_iter()
            .filter(|candidate| candidate.id != anchor.id)
            .take(SIMILAR_LIMIT)
            .collect())
    }

    /// Fetch or rebuild the cached model for this user's current history
    /// version. `None` means the heuristic path applies.
    fn scoring_model(&self, user: &User, now: DateTime<Utc>) -> Option<LogisticModel> {
        let mut cache = self.cache.lock().expect("model cache poisoned");
        if let Some(entry) = cache.get(&user.id) {
            if entry.history_version == user.history_version {
                return entry.model.clone();
            }
        }

        let examples = self.training_examples(user, now);
        let model = match LogisticModel::fit(&examples, self.config.min_training_examples) {
            Ok(model) => Some(model),
            Err(reason) => {
                tracing::debug!(user = %user.id.0, %reason, "using heuristic recommendation score");
                None
            }
        };

        cache.insert(
            user.id.clone(),
            CachedModel {
                history_version: user.history_version,
                model: model.clone(),
            },
        );
        model
    }

    fn training_examples(&self, user: &User, now: DateTime<Utc>) -> Vec<TrainingExample> {
        let mut examples = Vec::with_capacity(user.applications.len());
        for app in &user.applications {
            let internship = match self.store.get_internship(&app.internship_id) {
                Ok(Some(internship)) => internship,
                // A posting that vanished from the catalogue simply drops
                // out of the training set.
                Ok(None) | Err(_) => continue,
            };
            let positive = app.applied_date.is_some() || app.status.reached_applied();
            examples.push(TrainingExample {
                features: feature_vector(&user.preferences, &internship, now),
                label: f32::from(u8::from(positive)),
            });
        }
        examples
    }
}
