use crate::cli::ServeArgs;
use crate::infra::{seed_records, AppState, InMemoryRecordStore, LoggingPushTransport, OutboxMailTransport};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use interntrack::config::AppConfig;
use interntrack::error::AppError;
use interntrack::telemetry;
use interntrack::workflows::recommend::RecommendationScorer;
use interntrack::workflows::reminders::{NotificationState, ReminderDispatcher};
use interntrack::workflows::tracker::{ApplicationTracker, TransitionPolicy};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryRecordStore::default());
    seed_records(&store, Utc::now());

    let policy = if args.strict_transitions {
        TransitionPolicy::Strict
    } else {
        TransitionPolicy::Permissive
    };
    let tracker = Arc::new(ApplicationTracker::with_policy(store.clone(), policy));

    let mail = Arc::new(OutboxMailTransport::new(config.mail.from.clone()));
    let push = Arc::new(LoggingPushTransport::default());
    let dispatcher = Arc::new(ReminderDispatcher::new(mail, push));
    let notifications = Arc::new(NotificationState {
        store: store.clone(),
        dispatcher,
        window_days: config.reminders.window_days,
    });

    let scorer = Arc::new(RecommendationScorer::new(store, config.recommend));

    let app = with_workflow_routes(tracker, notifications, scorer)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "internship tracking service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
