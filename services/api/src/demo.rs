use crate::infra::{
    demo_user, parse_day, seed_records, InMemoryRecordStore, LoggingPushTransport,
    OutboxMailTransport,
};
use chrono::{DateTime, Utc};
use clap::Args;
use interntrack::config::{RecommendConfig, ReminderConfig};
use interntrack::domain::ApplicationStatus;
use interntrack::error::AppError;
use interntrack::store::InternshipFilter;
use interntrack::workflows::recommend::RecommendationScorer;
use interntrack::workflows::reminders::{ReminderCycle, ReminderDispatcher};
use interntrack::workflows::tracker::ApplicationTracker;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct RemindArgs {
    /// Override the evaluation instant (YYYY-MM-DD, midnight UTC).
    /// Defaults to now.
    #[arg(long, value_parser = parse_day)]
    pub(crate) today: Option<DateTime<Utc>>,
    /// Override the reminder window in days.
    #[arg(long)]
    pub(crate) window_days: Option<i64>,
    /// Override the worker pool width for the cycle.
    #[arg(long)]
    pub(crate) max_workers: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the evaluation instant (YYYY-MM-DD, midnight UTC).
    /// Defaults to now.
    #[arg(long, value_parser = parse_day)]
    pub(crate) today: Option<DateTime<Utc>>,
    /// Skip the recommendation portion of the demo.
    #[arg(long)]
    pub(crate) skip_recommendations: bool,
}

struct DemoContext {
    store: Arc<InMemoryRecordStore>,
    tracker: ApplicationTracker<InMemoryRecordStore>,
    mail: Arc<OutboxMailTransport>,
    push: Arc<LoggingPushTransport>,
    dispatcher: Arc<ReminderDispatcher<OutboxMailTransport, LoggingPushTransport>>,
    now: DateTime<Utc>,
}

fn demo_context(today: Option<DateTime<Utc>>) -> DemoContext {
    let now = today.unwrap_or_else(Utc::now);
    let store = Arc::new(InMemoryRecordStore::default());
    seed_records(&store, now);

    let tracker = ApplicationTracker::new(store.clone());
    let mail = Arc::new(OutboxMailTransport::new("reminders@interntrack.dev".to_string()));
    let push = Arc::new(LoggingPushTransport::default());
    let dispatcher = Arc::new(ReminderDispatcher::new(mail.clone(), push.clone()));

    DemoContext {
        store,
        tracker,
        mail,
        push,
        dispatcher,
        now,
    }
}

/// Track two seeded postings for the demo user so the scanner has
/// deadlines to find. Failures are printed, not fatal; the commands stay
/// usable even if the seed data changes shape.
fn track_demo_applications(ctx: &DemoContext) {
    let user = demo_user();
    let saves = [
        ("seed-backend", Some(ApplicationStatus::Applied)),
        ("seed-marketing", None),
        ("seed-data", None),
    ];

    for (internship_id, follow_up) in saves {
        let id = interntrack::domain::InternshipId(internship_id.to_string());
        if let Err(err) =
            ctx.tracker
                .transition_at(&user.id, &id, ApplicationStatus::Saved, None, ctx.now)
        {
            println!("  Could not save {internship_id}: {err}");
            continue;
        }
        if let Some(status) = follow_up {
            if let Err(err) = ctx.tracker.transition_at(&user.id, &id, status, None, ctx.now) {
                println!("  Could not update {internship_id}: {err}");
            }
        }
    }
}

pub(crate) fn run_reminder_cycle(args: RemindArgs) -> Result<(), AppError> {
    let RemindArgs {
        today,
        window_days,
        max_workers,
    } = args;

    let ctx = demo_context(today);
    track_demo_applications(&ctx);

    let defaults = ReminderConfig::default();
    let config = ReminderConfig {
        window_days: window_days.unwrap_or(defaults.window_days),
        max_workers: max_workers.unwrap_or(defaults.max_workers),
    };
    let cycle = ReminderCycle::new(ctx.store.clone(), ctx.dispatcher.clone(), config);

    println!("Deadline reminder cycle (window {} days)", config.window_days);
    let report = match cycle.run(ctx.now) {
        Ok(report) => report,
        Err(err) => {
            println!("  Cycle aborted: {err}");
            return Ok(());
        }
    };

    println!(
        "- {} users scanned | {} sent | {} suppressed | {} failed | {} skipped",
        report.users_scanned, report.sent, report.suppressed, report.failed, report.skipped_users
    );

    let deliveries = ctx.mail.deliveries();
    if deliveries.is_empty() {
        println!("- Outbox: empty");
    } else {
        println!("- Outbox:");
        for (to, subject) in deliveries {
            println!("    {to}: {subject}");
        }
    }
    let pushes = ctx.push.pushes();
    if !pushes.is_empty() {
        println!("- Push notifications:");
        for (user_id, title) in pushes {
            println!("    {}: {title}", user_id.0);
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        skip_recommendations,
    } = args;

    let ctx = demo_context(today);
    let user = demo_user();

    println!("Internship tracking demo (evaluated {})", ctx.now.date_naive());

    println!("\nCatalogue");
    match ctx.tracker.browse(&InternshipFilter::active(), 1, 10) {
        Ok(page) => {
            for internship in &page.items {
                println!(
                    "- [{}] {} at {} (deadline {})",
                    internship.id.0,
                    internship.title,
                    internship.company,
                    internship.deadline.date_naive()
                );
            }
        }
        Err(err) => println!("  Catalogue unavailable: {err}"),
    }

    println!("\nTracking");
    track_demo_applications(&ctx);
    match ctx.tracker.applications(&user.id) {
        Ok(applications) => {
            for app in &applications {
                println!(
                    "- {} -> {}{}",
                    app.internship_id.0,
                    app.status.label(),
                    app.applied_date
                        .map(|date| format!(" (applied {})", date.date_naive()))
                        .unwrap_or_default()
                );
            }
        }
        Err(err) => println!("  Application listing unavailable: {err}"),
    }

    println!("\nDeadline reminders");
    let cycle = ReminderCycle::new(
        ctx.store.clone(),
        ctx.dispatcher.clone(),
        ReminderConfig::default(),
    );
    match cycle.run(ctx.now) {
        Ok(report) => {
            println!(
                "- {} sent | {} suppressed | {} failed",
                report.sent, report.suppressed, report.failed
            );
            for (to, subject) in ctx.mail.deliveries() {
                println!("    {to}: {subject}");
            }
        }
        Err(err) => println!("  Cycle aborted: {err}"),
    }

    if skip_recommendations {
        return Ok(());
    }

    println!("\nRecommendations");
    let scorer = RecommendationScorer::new(ctx.store.clone(), RecommendConfig::default());
    match scorer.recommend(&user.id) {
        Ok(ranked) => {
            if ranked.is_empty() {
                println!("- Nothing left to recommend");
            }
            for entry in &ranked {
                println!(
                    "- {} at {} (score {:.3})",
                    entry.internship.title, entry.internship.company, entry.score
                );
            }
        }
        Err(err) => println!("  Recommendations unavailable: {err}"),
    }

    Ok(())
}
