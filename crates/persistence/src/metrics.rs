//! Database and queue metrics.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Record connection pool occupancy.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
}

/// Count one registration queue operation by action and outcome.
///
/// `action` is one of submit/approve/reject/cancel; `outcome` is "ok" or
/// the error kind.
pub fn record_registration_transition(action: &'static str, outcome: &'static str) {
    counter!(
        "registration_transitions_total",
        "action" => action,
        "outcome" => outcome
    )
    .increment(1);
}

/// Times a query and records it under `database_query_duration_seconds`.
///
/// ```ignore
/// let timer = QueryTimer::new("find_exhibition_by_id");
/// let result = sqlx::query_as::<_, ExhibitionEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}
