//! PostgreSQL implementation of the registration queue store.
//!
//! Writers serialize per exhibition by locking the exhibition row with
//! `SELECT ... FOR UPDATE` before reading or changing its queue. Lock order
//! is always exhibition row first, then registration rows.

use async_trait::async_trait;
use domain::models::{Exhibition, NewRegistration, NewVisitor, Registration, Visitor};
use domain::services::{PendingRegistration, QueueStore, QueueTransaction, StoreError};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::entities::{
    ExhibitionEntity, PendingRegistrationEntity, RegistrationEntity, RegistrationStatusDb,
    VisitorEntity,
};
use crate::metrics::QueryTimer;

/// Maps a sqlx error onto the store error kinds the queue engine understands.
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::UniqueViolation(constraint);
            }
            Some("40001") | Some("40P01") => {
                return StoreError::Conflict(db_err.message().to_string());
            }
            _ => {}
        }
    }
    StoreError::Backend(err.to_string())
}

/// Queue store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgQueueStore {
    pool: PgPool,
}

impl PgQueueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueStore for PgQueueStore {
    async fn begin(&self) -> Result<Box<dyn QueueTransaction>, StoreError> {
        let tx = self.pool.begin().await.map_err(store_error)?;
        Ok(Box::new(PgQueueTransaction { tx }))
    }

    async fn find_visitor_by_email(&self, email: &str) -> Result<Option<Visitor>, StoreError> {
        let timer = QueryTimer::new("find_visitor_by_email");
        let result = sqlx::query_as::<_, VisitorEntity>(
            r#"
            SELECT id, name, email, phone
            FROM visitors
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn pending_queue_for_visitor(
        &self,
        visitor_id: i64,
    ) -> Result<Vec<PendingRegistration>, StoreError> {
        let timer = QueryTimer::new("pending_queue_for_visitor");
        let result = sqlx::query_as::<_, PendingRegistrationEntity>(
            r#"
            SELECT r.id, r.visitor_id, r.exhibition_id, r.attendees_count, r.status,
                   r.confirmed, r.queue_position, r.submitted_at, r.reviewed_by,
                   r.reviewed_at, r.rejection_reason, r.visitor_notified,
                   e.title as exhibition_title
            FROM registrations r
            JOIN exhibitions e ON e.id = r.exhibition_id
            WHERE r.visitor_id = $1 AND r.status = 'PENDING'
            ORDER BY r.queue_position, r.submitted_at
            "#,
        )
        .bind(visitor_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

/// One queue unit of work in a PostgreSQL transaction.
///
/// Dropping it without `commit` rolls the transaction back.
pub struct PgQueueTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl QueueTransaction for PgQueueTransaction {
    async fn lock_exhibition(
        &mut self,
        exhibition_id: i64,
    ) -> Result<Option<Exhibition>, StoreError> {
        let timer = QueryTimer::new("lock_exhibition");
        let result = sqlx::query_as::<_, ExhibitionEntity>(
            r#"
            SELECT id, title, start_date, end_date, status
            FROM exhibitions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(exhibition_id)
        .fetch_optional(&mut *self.tx)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn get_or_create_visitor(&mut self, visitor: &NewVisitor) -> Result<Visitor, StoreError> {
        let timer = QueryTimer::new("get_or_create_visitor");
        let result = sqlx::query_as::<_, VisitorEntity>(
            r#"
            INSERT INTO visitors (name, email, phone)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
                SET name = CASE WHEN visitors.name = '' THEN EXCLUDED.name ELSE visitors.name END
            RETURNING id, name, email, phone
            "#,
        )
        .bind(&visitor.name)
        .bind(&visitor.email)
        .bind(&visitor.phone)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.into())
    }

    async fn find_registration(&mut self, id: i64) -> Result<Option<Registration>, StoreError> {
        let timer = QueryTimer::new("find_registration_by_id");
        let result = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            SELECT id, visitor_id, exhibition_id, attendees_count, status, confirmed,
                   queue_position, submitted_at, reviewed_by, reviewed_at,
                   rejection_reason, visitor_notified
            FROM registrations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn lock_registration(&mut self, id: i64) -> Result<Option<Registration>, StoreError> {
        let timer = QueryTimer::new("lock_registration");
        let result = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            SELECT id, visitor_id, exhibition_id, attendees_count, status, confirmed,
                   queue_position, submitted_at, reviewed_by, reviewed_at,
                   rejection_reason, visitor_notified
            FROM registrations
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn find_registration_for(
        &mut self,
        visitor_id: i64,
        exhibition_id: i64,
    ) -> Result<Option<Registration>, StoreError> {
        let timer = QueryTimer::new("find_registration_for_visitor_exhibition");
        let result = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            SELECT id, visitor_id, exhibition_id, attendees_count, status, confirmed,
                   queue_position, submitted_at, reviewed_by, reviewed_at,
                   rejection_reason, visitor_notified
            FROM registrations
            WHERE visitor_id = $1 AND exhibition_id = $2
            "#,
        )
        .bind(visitor_id)
        .bind(exhibition_id)
        .fetch_optional(&mut *self.tx)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn max_pending_position(
        &mut self,
        exhibition_id: i64,
    ) -> Result<Option<i32>, StoreError> {
        let timer = QueryTimer::new("max_pending_queue_position");
        let result = sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT MAX(queue_position)
            FROM registrations
            WHERE exhibition_id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(exhibition_id)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        result.map_err(store_error)
    }

    async fn insert_registration(
        &mut self,
        registration: &NewRegistration,
    ) -> Result<Registration, StoreError> {
        let timer = QueryTimer::new("insert_registration");
        let result = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            INSERT INTO registrations
                (visitor_id, exhibition_id, attendees_count, status, confirmed,
                 queue_position, submitted_at, visitor_notified)
            VALUES ($1, $2, $3, 'PENDING', false, $4, $5, true)
            RETURNING id, visitor_id, exhibition_id, attendees_count, status, confirmed,
                      queue_position, submitted_at, reviewed_by, reviewed_at,
                      rejection_reason, visitor_notified
            "#,
        )
        .bind(registration.visitor_id)
        .bind(registration.exhibition_id)
        .bind(registration.attendees_count)
        .bind(registration.queue_position)
        .bind(registration.submitted_at)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.into())
    }

    async fn update_registration(&mut self, registration: &Registration) -> Result<(), StoreError> {
        let timer = QueryTimer::new("update_registration_status");
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET status = $2,
                confirmed = $3,
                queue_position = $4,
                reviewed_by = $5,
                reviewed_at = $6,
                rejection_reason = $7,
                visitor_notified = $8,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(registration.id)
        .bind(RegistrationStatusDb::from(registration.status))
        .bind(registration.confirmed)
        .bind(registration.queue_position)
        .bind(&registration.reviewed_by)
        .bind(registration.reviewed_at)
        .bind(&registration.rejection_reason)
        .bind(registration.visitor_notified)
        .execute(&mut *self.tx)
        .await;
        timer.record();

        match result.map_err(store_error)?.rows_affected() {
            0 => Err(StoreError::Backend(format!(
                "registration {} vanished during update",
                registration.id
            ))),
            _ => Ok(()),
        }
    }

    async fn close_queue_gap(
        &mut self,
        exhibition_id: i64,
        vacated: i32,
    ) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("close_queue_gap");
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET queue_position = queue_position - 1, updated_at = NOW()
            WHERE exhibition_id = $1
              AND status = 'PENDING'
              AND queue_position > $2
            "#,
        )
        .bind(exhibition_id)
        .bind(vacated)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        let shifted = result.map_err(store_error)?.rows_affected();
        debug!(exhibition_id, vacated, shifted, "Closed queue gap");
        Ok(shifted)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx.commit().await.map_err(store_error)
    }
}
