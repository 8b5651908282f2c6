use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::state_machine::{ApplicationTracker, TrackerError};
use crate::domain::{ApplicationStatus, Internship, InternshipId, TrackedApplication, UserId};
use crate::store::{InternshipFilter, RecordStore};

/// Router builder exposing the internship catalogue and application
/// tracking endpoints. The authenticated principal arrives as a `user_id`
/// query parameter; auth-provider wiring lives outside the core.
pub fn tracker_router<S>(tracker: Arc<ApplicationTracker<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/internships", get(list_handler::<S>))
        .route("/internships/user/applications", get(applications_handler::<S>))
        .route("/internships/user/saved", get(saved_handler::<S>))
        .route("/internships/:internship_id", get(detail_handler::<S>))
        .route("/internships/:internship_id/save", post(save_handler::<S>))
        .route(
            "/internships/:internship_id/status",
            put(status_handler::<S>),
        )
        .with_state(tracker)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingQuery {
    #[serde(default)]
    field: Option<crate::domain::Field>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    work_type: Option<crate::domain::WorkType>,
    #[serde(default)]
    experience_level: Option<crate::domain::ExperienceLevel>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrincipalQuery {
    user_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateRequest {
    status: ApplicationStatus,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListingResponse {
    internships: Vec<Internship>,
    total_pages: usize,
    current_page: usize,
}

pub(crate) async fn list_handler<S>(
    State(tracker): State<Arc<ApplicationTracker<S>>>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResponse>, TrackerError>
where
    S: RecordStore + 'static,
{
    let filter = InternshipFilter {
        field: query.field,
        location: query.location,
        work_type: query.work_type,
        experience_level: query.experience_level,
        search: query.search,
        active_only: true,
    };
    let limit = query.limit.max(1);
    let page = query.page.max(1);
    let result = tracker.browse(&filter, page, limit)?;

    Ok(Json(ListingResponse {
        total_pages: result.total.div_ceil(limit),
        current_page: page,
        internships: result.items,
    }))
}

pub(crate) async fn detail_handler<S>(
    State(tracker): State<Arc<ApplicationTracker<S>>>,
    Path(internship_id): Path<String>,
) -> Result<Json<Internship>, TrackerError>
where
    S: RecordStore + 'static,
{
    let internship = tracker.internship(&InternshipId(internship_id))?;
    Ok(Json(internship))
}

pub(crate) async fn save_handler<S>(
    State(tracker): State<Arc<ApplicationTracker<S>>>,
    Path(internship_id): Path<String>,
    Query(principal): Query<PrincipalQuery>,
) -> Result<Json<TrackedApplication>, TrackerError>
where
    S: RecordStore + 'static,
{
    let application = tracker.transition(
        &UserId(principal.user_id),
        &InternshipId(internship_id),
        ApplicationStatus::Saved,
        None,
    )?;
    Ok(Json(application))
}

pub(crate) async fn status_handler<S>(
    State(tracker): State<Arc<ApplicationTracker<S>>>,
    Path(internship_id): Path<String>,
    Query(principal): Query<PrincipalQuery>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<TrackedApplication>, TrackerError>
where
    S: RecordStore + 'static,
{
    let application = tracker.transition(
        &UserId(principal.user_id),
        &InternshipId(internship_id),
        request.status,
        request.notes,
    )?;
    Ok(Json(application))
}

pub(crate) async fn applications_handler<S>(
    State(tracker): State<Arc<ApplicationTracker<S>>>,
    Query(principal): Query<PrincipalQuery>,
) -> Result<Json<Vec<TrackedApplication>>, TrackerError>
where
    S: RecordStore + 'static,
{
    let applications = tracker.applications(&UserId(principal.user_id))?;
    Ok(Json(applications))
}

pub(crate) async fn saved_handler<S>(
    State(tracker): State<Arc<ApplicationTracker<S>>>,
    Query(principal): Query<PrincipalQuery>,
) -> Result<Json<Vec<TrackedApplication>>, TrackerError>
where
    S: RecordStore + 'static,
{
    let saved = tracker.saved_applications(&UserId(principal.user_id))?;
    Ok(Json(saved))
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = match &self {
            TrackerError::UserNotFound
            | TrackerError::InternshipNotFound
            | TrackerError::ApplicationNotFound => StatusCode::NOT_FOUND,
            TrackerError::DuplicateApplication | TrackerError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            TrackerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
