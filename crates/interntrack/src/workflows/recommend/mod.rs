//! Recommendation workflow: builds per-(user, internship) feature vectors,
//! fits a small logistic scorer from the user's own application history, and
//! ranks not-yet-tracked internships. Sparse or degenerate history falls
//! back to a deterministic heuristic rather than an error.

pub mod features;
pub mod model;
pub mod router;
pub mod scorer;

#[cfg(test)]
mod tests;

pub use features::{feature_vector, heuristic_score, FeatureVector, FEATURE_DIM};
pub use model::{LogisticModel, TrainingError, TrainingExample};
pub use router::recommendations_router;
pub use scorer::{RecommendError, RecommendationScorer, ScoreResult, ScoredInternship};
