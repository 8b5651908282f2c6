use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::dispatcher::{MailTransport, PushTransport, ReminderDispatcher};
use super::scanner::scan;
use crate::domain::{
    ApplicationStatus, Internship, NotificationPreferences, ReminderFrequency, UserId,
};
use crate::store::{RecordStore, StoreError};

/// Shared state for the notification endpoints.
pub struct NotificationState<S, M, P> {
    pub store: Arc<S>,
    pub dispatcher: Arc<ReminderDispatcher<M, P>>,
    pub window_days: i64,
}

/// Router builder for the notification feed, preference updates, and the
/// ad-hoc e-mail endpoint.
pub fn notifications_router<S, M, P>(state: Arc<NotificationState<S, M, P>>) -> Router
where
    S: RecordStore + 'static,
    M: MailTransport + 'static,
    P: PushTransport + 'static,
{
    Router::new()
        .route("/notifications", get(feed_handler::<S, M, P>))
        .route(
            "/notifications/preferences",
            put(preferences_handler::<S, M, P>),
        )
        .route(
            "/notifications/send-email",
            post(send_email_handler::<S, M, P>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrincipalQuery {
    user_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeadlineNotice {
    internship: Internship,
    days_until_deadline: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusNotice {
    internship: Internship,
    status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotificationFeed {
    upcoming_deadlines: Vec<DeadlineNotice>,
    status_updates: Vec<StatusNotice>,
}

pub(crate) async fn feed_handler<S, M, P>(
    State(state): State<Arc<NotificationState<S, M, P>>>,
    Query(principal): Query<PrincipalQuery>,
) -> Response
where
    S: RecordStore + 'static,
    M: MailTransport + 'static,
    P: PushTransport + 'static,
{
    let user_id = UserId(principal.user_id);
    let user = match state.store.get_user(&user_id) {
        Ok(Some(user)) => user,
        Ok(None) => return not_found("user not found"),
        Err(error) => return store_failure(error),
    };

    let now = chrono::Utc::now();
    let mut upcoming_deadlines = Vec::new();
    for hit in scan(&user, now, state.window_days) {
        match state.store.get_internship(&hit.application.internship_id) {
            Ok(Some(internship)) => upcoming_deadlines.push(DeadlineNotice {
                internship,
                days_until_deadline: hit.days_remaining,
            }),
            Ok(None) => {}
            Err(error) => return store_failure(error),
        }
    }

    let mut status_updates = Vec::new();
    for app in &user.applications {
        if matches!(
            app.status,
            ApplicationStatus::Interviewing | ApplicationStatus::Offered
        ) {
            match state.store.get_internship(&app.internship_id) {
                Ok(Some(internship)) => status_updates.push(StatusNotice {
                    internship,
                    status: app.status,
                }),
                Ok(None) => {}
                Err(error) => return store_failure(error),
            }
        }
    }

    (
        StatusCode::OK,
        Json(NotificationFeed {
            upcoming_deadlines,
            status_updates,
        }),
    )
        .into_response()
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub(crate) struct PreferencesUpdate {
    #[serde(default)]
    email: Option<bool>,
    #[serde(default)]
    push: Option<bool>,
    #[serde(default)]
    reminder_frequency: Option<ReminderFrequency>,
}

pub(crate) async fn preferences_handler<S, M, P>(
    State(state): State<Arc<NotificationState<S, M, P>>>,
    Query(principal): Query<PrincipalQuery>,
    Json(update): Json<PreferencesUpdate>,
) -> Response
where
    S: RecordStore + 'static,
    M: MailTransport + 'static,
    P: PushTransport + 'static,
{
    let user_id = UserId(principal.user_id);
    let mut user = match state.store.get_user(&user_id) {
        Ok(Some(user)) => user,
        Ok(None) => return not_found("user not found"),
        Err(error) => return store_failure(error),
    };

    let current = &mut user.preferences.notifications;
    let merged = NotificationPreferences {
        email: update.email.unwrap_or(current.email),
        push: update.push.unwrap_or(current.push),
        reminder_frequency: update
            .reminder_frequency
            .unwrap_or(current.reminder_frequency),
    };
    *current = merged.clone();

    if let Err(error) = state.store.save_user(user) {
        return store_failure(error);
    }

    (StatusCode::OK, Json(merged)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendEmailRequest {
    to: String,
    subject: String,
    text: String,
    #[serde(default)]
    html: String,
}

pub(crate) async fn send_email_handler<S, M, P>(
    State(state): State<Arc<NotificationState<S, M, P>>>,
    Json(request): Json<SendEmailRequest>,
) -> Response
where
    S: RecordStore + 'static,
    M: MailTransport + 'static,
    P: PushTransport + 'static,
{
    // Transport trouble on an ad-hoc send is reported as a warning, not a
    // request failure; the caller decides whether to retry.
    match state.dispatcher.send_single(
        &request.to,
        &request.subject,
        &request.text,
        &request.html,
    ) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "delivered": true })),
        )
            .into_response(),
        Err(error) => (
            StatusCode::OK,
            Json(json!({ "delivered": false, "warning": error.to_string() })),
        )
            .into_response(),
    }
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": message })),
    )
        .into_response()
}

fn store_failure(error: StoreError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error.to_string() })),
    )
        .into_response()
}
