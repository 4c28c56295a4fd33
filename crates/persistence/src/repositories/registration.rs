//! Registration repository for read queries and notification bookkeeping.
//!
//! State changes go through [`crate::repositories::PgQueueStore`]; this
//! repository never touches status or queue positions.

use sqlx::PgPool;

use crate::entities::{DecisionNotificationEntity, RegistrationDetailsEntity, RegistrationStatusDb};
use crate::metrics::QueryTimer;

/// Filters for listing registrations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationFilter {
    pub exhibition_id: Option<i64>,
    pub status: Option<RegistrationStatusDb>,
}

/// Repository for registration read queries.
#[derive(Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Creates a new RegistrationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a registration with visitor and exhibition labels.
    pub async fn find_details_by_id(
        &self,
        id: i64,
    ) -> Result<Option<RegistrationDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_registration_details_by_id");
        let result = sqlx::query_as::<_, RegistrationDetailsEntity>(
            r#"
            SELECT r.id, r.visitor_id, r.exhibition_id, r.attendees_count, r.status,
                   r.confirmed, r.queue_position, r.submitted_at, r.reviewed_by,
                   r.reviewed_at, r.rejection_reason, r.visitor_notified,
                   v.name as visitor_name, v.email as visitor_email,
                   e.title as exhibition_title, e.status as exhibition_status
            FROM registrations r
            JOIN visitors v ON v.id = r.visitor_id
            JOIN exhibitions e ON e.id = r.exhibition_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List registrations, newest first.
    pub async fn list(
        &self,
        filter: RegistrationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RegistrationDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_registrations");
        let result = sqlx::query_as::<_, RegistrationDetailsEntity>(
            r#"
            SELECT r.id, r.visitor_id, r.exhibition_id, r.attendees_count, r.status,
                   r.confirmed, r.queue_position, r.submitted_at, r.reviewed_by,
                   r.reviewed_at, r.rejection_reason, r.visitor_notified,
                   v.name as visitor_name, v.email as visitor_email,
                   e.title as exhibition_title, e.status as exhibition_status
            FROM registrations r
            JOIN visitors v ON v.id = r.visitor_id
            JOIN exhibitions e ON e.id = r.exhibition_id
            WHERE ($1::BIGINT IS NULL OR r.exhibition_id = $1)
              AND ($2::registration_status IS NULL OR r.status = $2)
            ORDER BY r.submitted_at DESC, r.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.exhibition_id)
        .bind(filter.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count registrations matching a filter.
    pub async fn count(&self, filter: RegistrationFilter) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_registrations");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM registrations r
            WHERE ($1::BIGINT IS NULL OR r.exhibition_id = $1)
              AND ($2::registration_status IS NULL OR r.status = $2)
            "#,
        )
        .bind(filter.exhibition_id)
        .bind(filter.status)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All registrations of the visitor with this email, newest first.
    pub async fn list_for_visitor_email(
        &self,
        email: &str,
    ) -> Result<Vec<RegistrationDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_registrations_for_visitor");
        let result = sqlx::query_as::<_, RegistrationDetailsEntity>(
            r#"
            SELECT r.id, r.visitor_id, r.exhibition_id, r.attendees_count, r.status,
                   r.confirmed, r.queue_position, r.submitted_at, r.reviewed_by,
                   r.reviewed_at, r.rejection_reason, r.visitor_notified,
                   v.name as visitor_name, v.email as visitor_email,
                   e.title as exhibition_title, e.status as exhibition_status
            FROM registrations r
            JOIN visitors v ON v.id = r.visitor_id
            JOIN exhibitions e ON e.id = r.exhibition_id
            WHERE v.email = $1
            ORDER BY r.submitted_at DESC, r.id DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Reviewed registrations whose visitor has not been notified.
    ///
    /// Rows with fewer failed attempts come first, then the oldest decision,
    /// so a batch of undeliverable notices cannot hold back newer ones.
    pub async fn find_due_notifications(
        &self,
        limit: i64,
    ) -> Result<Vec<DecisionNotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_due_decision_notifications");
        let result = sqlx::query_as::<_, DecisionNotificationEntity>(
            r#"
            SELECT r.id as registration_id, r.exhibition_id, e.title as exhibition_title,
                   v.name as visitor_name, v.email as visitor_email, r.status,
                   r.rejection_reason, r.reviewed_by, r.reviewed_at
            FROM registrations r
            JOIN visitors v ON v.id = r.visitor_id
            JOIN exhibitions e ON e.id = r.exhibition_id
            WHERE r.visitor_notified = false
              AND r.status IN ('APPROVED', 'REJECTED')
            ORDER BY r.notification_attempts, r.reviewed_at, r.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark registrations as notified. Returns the number of rows updated.
    pub async fn mark_notified(&self, ids: &[i64]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let timer = QueryTimer::new("mark_registrations_notified");
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET visitor_notified = true, updated_at = NOW()
            WHERE id = ANY($1) AND visitor_notified = false
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Count a failed delivery attempt for each registration.
    pub async fn record_failed_notifications(&self, ids: &[i64]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let timer = QueryTimer::new("record_failed_notifications");
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET notification_attempts = notification_attempts + 1,
                last_notification_attempt_at = NOW()
            WHERE id = ANY($1) AND visitor_notified = false
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}
