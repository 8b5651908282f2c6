use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use interntrack::store::RecordStore;
use interntrack::workflows::recommend::{recommendations_router, RecommendationScorer};
use interntrack::workflows::reminders::{
    notifications_router, MailTransport, NotificationState, PushTransport,
};
use interntrack::workflows::tracker::{tracker_router, ApplicationTracker};
use serde_json::json;
use std::sync::Arc;

/// Assemble the full application router: tracking, notifications, and
/// recommendations, plus the operational endpoints.
pub(crate) fn with_workflow_routes<S, M, P>(
    tracker: Arc<ApplicationTracker<S>>,
    notifications: Arc<NotificationState<S, M, P>>,
    scorer: Arc<RecommendationScorer<S>>,
) -> axum::Router
where
    S: RecordStore + 'static,
    M: MailTransport + 'static,
    P: PushTransport + 'static,
{
    tracker_router(tracker)
        .merge(notifications_router(notifications))
        .merge(recommendations_router(scorer))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
