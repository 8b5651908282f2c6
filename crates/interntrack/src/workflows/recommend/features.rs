use chrono::{DateTime, Utc};

use crate::domain::{Internship, Preferences};

pub const FEATURE_DIM: usize = 6;

pub type FeatureVector = [f32; FEATURE_DIM];

/// Stipend amounts are squashed against this ceiling so a single outlier
/// posting cannot dominate the score.
const STIPEND_SCALE: f32 = 10_000.0;

/// Deadlines further out than this many days all read as "far away".
const DEADLINE_HORIZON_DAYS: f32 = 30.0;

/// Fixed-dimension feature representation of one (user, internship) pair.
///
/// The first four entries are binary preference matches; the last two are
/// normalized continuous attributes clamped to [0, 1]. Deterministic given
/// the preferences, the posting, and `now`.
pub fn feature_vector(
    preferences: &Preferences,
    internship: &Internship,
    now: DateTime<Utc>,
) -> FeatureVector {
    let field_match = preferences.fields.contains(&internship.field);
    let location_match = preferences
        .locations
        .iter()
        .any(|location| location.eq_ignore_ascii_case(&internship.location));
    let experience_match = preferences.experience_level == Some(internship.experience_level);
    let work_type_match = preferences.work_types.contains(&internship.work_type);

    let stipend = internship
        .stipend
        .as_ref()
        .map(|stipend| (stipend.amount as f32 / STIPEND_SCALE).clamp(0.0, 1.0))
        .unwrap_or(0.0);

    let days_until_deadline = (internship.deadline - now).num_seconds() as f32 / 86_400.0;
    let deadline_proximity = (days_until_deadline / DEADLINE_HORIZON_DAYS).clamp(0.0, 1.0);

    [
        f32::from(u8::from(field_match)),
        f32::from(u8::from(location_match)),
        f32::from(u8::from(experience_match)),
        f32::from(u8::from(work_type_match)),
        stipend,
        deadline_proximity,
    ]
}

/// Unweighted mean of the four preference-match features. Used whenever a
/// trained model is unavailable; depends on nothing but the preferences and
/// the posting, so it is fully deterministic.
pub fn heuristic_score(features: &FeatureVector) -> f32 {
    (features[0] + features[1] + features[2] + features[3]) / 4.0
}
