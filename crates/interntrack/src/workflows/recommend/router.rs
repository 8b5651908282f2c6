use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::scorer::{RecommendError, RecommendationScorer};
use crate::domain::{InternshipId, UserId};
use crate::store::RecordStore;

/// Router builder for personalized recommendations and similar-posting
/// lookups.
pub fn recommendations_router<S>(scorer: Arc<RecommendationScorer<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/recommendations", get(recommendations_handler::<S>))
        .route(
            "/recommendations/similar/:internship_id",
            get(similar_handler::<S>),
        )
        .with_state(scorer)
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrincipalQuery {
    user_id: String,
}

pub(crate) async fn recommendations_handler<S>(
    State(scorer): State<Arc<RecommendationScorer<S>>>,
    Query(principal): Query<PrincipalQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    match scorer.recommend(&UserId(principal.user_id)) {
        Ok(ranked) => (StatusCode::OK, Json(ranked)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn similar_handler<S>(
    State(scorer): State<Arc<RecommendationScorer<S>>>,
    Path(internship_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match scorer.similar(&InternshipId(internship_id)) {
        Ok(similar) => (StatusCode::OK, Json(similar)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: RecommendError) -> Response {
    let status = match &error {
        RecommendError::UserNotFound | RecommendError::InternshipNotFound => StatusCode::NOT_FOUND,
        RecommendError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
