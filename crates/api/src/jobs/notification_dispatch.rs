//! Background delivery of registration decisions to visitors.

use std::sync::Arc;
use std::time::Duration;

use domain::services::{dispatch_decisions, RegistrationDecisionPayload, VisitorNotifier};
use persistence::repositories::RegistrationRepository;
use sqlx::PgPool;
use tracing::{info, warn};

use super::scheduler::{Job, JobError};

/// Sends pending approval/rejection notices and marks delivered ones.
///
/// Failed deliveries stay unmarked and have their attempt count bumped, which
/// moves them behind fresher notices on later runs.
pub struct NotificationDispatchJob {
    pool: PgPool,
    notifier: Arc<dyn VisitorNotifier>,
    interval: Duration,
    batch_size: i64,
}

impl NotificationDispatchJob {
    pub fn new(
        pool: PgPool,
        notifier: Arc<dyn VisitorNotifier>,
        interval_secs: u64,
        batch_size: i64,
    ) -> Self {
        Self {
            pool,
            notifier,
            interval: Duration::from_secs(interval_secs.max(1)),
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait::async_trait]
impl Job for NotificationDispatchJob {
    fn name(&self) -> &'static str {
        "notification_dispatch"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn execute(&self) -> Result<usize, JobError> {
        let repo = RegistrationRepository::new(self.pool.clone());
        let due: Vec<RegistrationDecisionPayload> = repo
            .find_due_notifications(self.batch_size)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        if due.is_empty() {
            return Ok(0);
        }

        let summary = dispatch_decisions(self.notifier.as_ref(), &due).await;
        let marked = repo.mark_notified(&summary.sent).await?;

        if !summary.failed.is_empty() {
            repo.record_failed_notifications(&summary.failed).await?;
            warn!(
                failed = summary.failed.len(),
                "Some decision notifications were not delivered"
            );
        }
        info!(
            due = due.len(),
            sent = summary.sent.len(),
            marked,
            "Dispatched decision notifications"
        );

        Ok(summary.sent.len())
    }
}
