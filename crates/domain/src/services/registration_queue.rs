//! Registration queue engine.
//!
//! Owns the registration lifecycle: sequencing submissions into a
//! per-exhibition FIFO queue, the one-way transitions out of `PENDING`, and
//! the renumbering that keeps each exhibition's pending positions dense.

use chrono::Utc;
use shared::validation::{normalize_email, MAX_ATTENDEES, MIN_ATTENDEES};
use tracing::{info, warn};

use super::queue_store::{QueueStore, StoreError};
use crate::models::{
    authorize, Action, InvalidTransition, NewRegistration, NewVisitor, QueueEntry, QueueStatus,
    Registration, RegistrationStatus, Transition, UserIdentity,
};

/// Errors returned by queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The exhibition does not accept registrations in its current status.
    #[error("{0}")]
    NotEligible(String),

    /// The visitor already holds a registration for the exhibition.
    #[error("You have already registered for this exhibition")]
    DuplicateRegistration {
        existing_id: Option<i64>,
        status: Option<RegistrationStatus>,
    },

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("{0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl QueueError {
    /// Stable snake_case label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            QueueError::InvalidInput(_) => "invalid_input",
            QueueError::NotFound(_) => "not_found",
            QueueError::NotEligible(_) => "not_eligible",
            QueueError::DuplicateRegistration { .. } => "duplicate_registration",
            QueueError::InvalidTransition(_) => "invalid_transition",
            QueueError::Forbidden(_) => "forbidden",
            QueueError::Storage(_) => "storage",
        }
    }
}

/// Outcome of a reviewer's decision on a pending registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject { reason: Option<String> },
}

/// The registration queue engine, generic over its store.
#[derive(Debug, Clone)]
pub struct RegistrationQueue<S> {
    store: S,
    max_attendees: i32,
}

impl<S: QueueStore> RegistrationQueue<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_attendees: MAX_ATTENDEES,
        }
    }

    /// Uses a lower per-registration attendee cap. Values outside the
    /// accepted range fall back to the nearest bound.
    pub fn with_max_attendees(store: S, max_attendees: i32) -> Self {
        Self {
            store,
            max_attendees: max_attendees.clamp(MIN_ATTENDEES, MAX_ATTENDEES),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Queues a registration for `visitor` at the tail of the exhibition's queue.
    pub async fn submit(
        &self,
        visitor: &UserIdentity,
        exhibition_id: i64,
        attendees_count: i32,
    ) -> Result<Registration, QueueError> {
        if !(MIN_ATTENDEES..=self.max_attendees).contains(&attendees_count) {
            return Err(QueueError::InvalidInput(format!(
                "Attendees count must be between {} and {}",
                MIN_ATTENDEES, self.max_attendees
            )));
        }
        if visitor.email.trim().is_empty() {
            return Err(QueueError::InvalidInput(
                "Identity carries no email address".to_string(),
            ));
        }

        let new_visitor = NewVisitor::from_identity(visitor);
        let mut tx = self.store.begin().await?;

        let exhibition = tx
            .lock_exhibition(exhibition_id)
            .await?
            .ok_or(QueueError::NotFound("Exhibition"))?;
        if !exhibition.status.accepts_registrations() {
            warn!(
                exhibition_id = exhibition.id,
                status = %exhibition.status,
                "Registration refused for closed exhibition"
            );
            return Err(QueueError::NotEligible(format!(
                "Exhibition is not open for registration (status: {})",
                exhibition.status
            )));
        }

        let visitor_row = tx.get_or_create_visitor(&new_visitor).await?;
        if let Some(existing) = tx
            .find_registration_for(visitor_row.id, exhibition.id)
            .await?
        {
            warn!(
                visitor_id = visitor_row.id,
                exhibition_id = exhibition.id,
                existing_id = existing.id,
                "Duplicate registration attempt"
            );
            return Err(QueueError::DuplicateRegistration {
                existing_id: Some(existing.id),
                status: Some(existing.status),
            });
        }

        let queue_position = tx
            .max_pending_position(exhibition.id)
            .await?
            .map_or(1, |max| max + 1);

        let new_registration = NewRegistration {
            visitor_id: visitor_row.id,
            exhibition_id: exhibition.id,
            attendees_count,
            queue_position,
            submitted_at: Utc::now(),
        };
        let registration = match tx.insert_registration(&new_registration).await {
            Ok(registration) => registration,
            Err(StoreError::UniqueViolation(_)) => {
                return Err(QueueError::DuplicateRegistration {
                    existing_id: None,
                    status: None,
                })
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;

        info!(
            registration_id = registration.id,
            visitor_id = registration.visitor_id,
            exhibition_id = registration.exhibition_id,
            queue_position,
            attendees_count,
            "Registration queued"
        );

        Ok(registration)
    }

    pub async fn approve(
        &self,
        registration_id: i64,
        reviewer: &UserIdentity,
    ) -> Result<Registration, QueueError> {
        self.review(registration_id, reviewer, ReviewDecision::Approve)
            .await
    }

    /// Rejects a pending registration. A missing reason is stored as "".
    pub async fn reject(
        &self,
        registration_id: i64,
        reviewer: &UserIdentity,
        reason: Option<String>,
    ) -> Result<Registration, QueueError> {
        self.review(registration_id, reviewer, ReviewDecision::Reject { reason })
            .await
    }

    /// Applies a reviewer decision. Only clerks and admins may review.
    pub async fn review(
        &self,
        registration_id: i64,
        reviewer: &UserIdentity,
        decision: ReviewDecision,
    ) -> Result<Registration, QueueError> {
        if !authorize(reviewer.role, Action::ReviewRegistration) {
            warn!(
                registration_id,
                user_id = %reviewer.user_id,
                role = %reviewer.role,
                "Review attempted without reviewer role"
            );
            return Err(QueueError::Forbidden(
                "Only clerks and admins can review registrations".to_string(),
            ));
        }

        let reviewed_by = reviewer.reviewer_label();
        let transition = match decision {
            ReviewDecision::Approve => Transition::Approve { reviewed_by },
            ReviewDecision::Reject { reason } => Transition::Reject {
                reviewed_by,
                reason: reason.unwrap_or_default(),
            },
        };

        self.transition(registration_id, transition, None).await
    }

    /// Cancels a pending registration regardless of owner.
    pub async fn cancel(&self, registration_id: i64) -> Result<Registration, QueueError> {
        self.transition(registration_id, Transition::Cancel, None)
            .await
    }

    /// Cancels on behalf of `requester`.
    ///
    /// Visitors may only cancel their own registrations; anyone else's is
    /// reported as not found. Clerks and admins may cancel any registration.
    pub async fn cancel_as(
        &self,
        registration_id: i64,
        requester: &UserIdentity,
    ) -> Result<Registration, QueueError> {
        if authorize(requester.role, Action::CancelAnyRegistration) {
            return self.cancel(registration_id).await;
        }

        let owner = self
            .store
            .find_visitor_by_email(&normalize_email(&requester.email))
            .await?
            .ok_or(QueueError::NotFound("Registration"))?;

        self.transition(registration_id, Transition::Cancel, Some(owner.id))
            .await
    }

    /// Pending registrations of `visitor`, ordered by queue position.
    pub async fn queue_status(&self, visitor: &UserIdentity) -> Result<QueueStatus, QueueError> {
        let Some(visitor_row) = self
            .store
            .find_visitor_by_email(&normalize_email(&visitor.email))
            .await?
        else {
            return Ok(QueueStatus {
                pending_registrations: Vec::new(),
                total_in_queue: 0,
            });
        };

        let pending_registrations: Vec<QueueEntry> = self
            .store
            .pending_queue_for_visitor(visitor_row.id)
            .await?
            .into_iter()
            .filter_map(|pending| {
                let position = pending.registration.queue_position?;
                Some(QueueEntry {
                    registration_id: pending.registration.id,
                    exhibition_id: pending.registration.exhibition_id,
                    exhibition_title: pending.exhibition_title,
                    queue_position: position,
                    submitted_at: pending.registration.submitted_at,
                    attendees_count: pending.registration.attendees_count,
                    estimated_wait: QueueEntry::estimated_wait_for(position),
                })
            })
            .collect();

        Ok(QueueStatus {
            total_in_queue: pending_registrations.len(),
            pending_registrations,
        })
    }

    async fn transition(
        &self,
        registration_id: i64,
        transition: Transition,
        owner: Option<i64>,
    ) -> Result<Registration, QueueError> {
        let verb = transition.verb();
        let mut tx = self.store.begin().await?;

        let current = tx
            .find_registration(registration_id)
            .await?
            .ok_or(QueueError::NotFound("Registration"))?;
        if owner.is_some_and(|visitor_id| visitor_id != current.visitor_id) {
            return Err(QueueError::NotFound("Registration"));
        }

        // Exhibition row first, then the registration.
        tx.lock_exhibition(current.exhibition_id).await?;
        let mut registration = tx
            .lock_registration(registration_id)
            .await?
            .ok_or(QueueError::NotFound("Registration"))?;

        let vacated = registration.apply(transition, Utc::now()).map_err(|e| {
            warn!(
                registration_id,
                status = %e.from,
                action = e.action,
                "Rejected registration transition"
            );
            e
        })?;
        tx.update_registration(&registration).await?;

        let shifted = match vacated {
            Some(position) => {
                tx.close_queue_gap(registration.exhibition_id, position)
                    .await?
            }
            None => 0,
        };
        tx.commit().await?;

        info!(
            registration_id,
            exhibition_id = registration.exhibition_id,
            action = verb,
            status = %registration.status,
            shifted,
            "Registration transitioned"
        );

        Ok(registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExhibitionStatus, UserRole};
    use crate::services::queue_store::InMemoryQueueStore;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::{FirstName, LastName};
    use fake::Fake;

    fn identity(role: UserRole, email: &str) -> UserIdentity {
        UserIdentity {
            user_id: email.to_string(),
            email: email.to_string(),
            username: email.split('@').next().unwrap_or_default().to_string(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            role,
            phone: None,
        }
    }

    fn visitor(n: usize) -> UserIdentity {
        let email: String = SafeEmail().fake();
        identity(UserRole::Visitor, &format!("v{}.{}", n, email))
    }

    fn clerk() -> UserIdentity {
        identity(UserRole::Clerk, "clerk@gallery.test")
    }

    async fn setup(status: ExhibitionStatus) -> (RegistrationQueue<InMemoryQueueStore>, i64) {
        let store = InMemoryQueueStore::new();
        let exhibition = store.add_exhibition("Northern Light", status).await;
        (RegistrationQueue::new(store), exhibition.id)
    }

    async fn positions(queue: &RegistrationQueue<InMemoryQueueStore>, id: i64) -> Vec<i32> {
        let mut positions: Vec<i32> = queue
            .store()
            .registrations()
            .await
            .into_iter()
            .filter(|r| r.exhibition_id == id && r.status == RegistrationStatus::Pending)
            .filter_map(|r| r.queue_position)
            .collect();
        positions.sort_unstable();
        positions
    }

    async fn assert_consistent(queue: &RegistrationQueue<InMemoryQueueStore>, id: i64) {
        let pending = positions(queue, id).await;
        let expected: Vec<i32> = (1..=pending.len() as i32).collect();
        assert_eq!(pending, expected);
        for registration in queue.store().registrations().await {
            assert!(registration.is_consistent(), "{:?}", registration);
        }
    }

    #[tokio::test]
    async fn test_submit_appends_to_queue_tail() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Upcoming).await;

        for n in 1..=3 {
            let registration = queue.submit(&visitor(n), exhibition_id, 2).await.unwrap();
            assert_eq!(registration.queue_position, Some(n as i32));
            assert_eq!(registration.status, RegistrationStatus::Pending);
            assert!(!registration.confirmed);
            assert!(registration.visitor_notified);
        }
        assert_consistent(&queue, exhibition_id).await;
    }

    #[tokio::test]
    async fn test_submit_creates_visitor_once() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let second = queue
            .store()
            .add_exhibition("Second", ExhibitionStatus::Ongoing)
            .await;
        let caller = visitor(1);

        queue.submit(&caller, exhibition_id, 1).await.unwrap();
        queue.submit(&caller, second.id, 1).await.unwrap();

        let visitors = queue.store().visitors().await;
        assert_eq!(visitors.len(), 1);
        assert_eq!(visitors[0].name, caller.display_name());
    }

    #[tokio::test]
    async fn test_approve_renumbers_later_positions() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let mut ids = Vec::new();
        for n in 1..=3 {
            ids.push(queue.submit(&visitor(n), exhibition_id, 1).await.unwrap().id);
        }

        let approved = queue.approve(ids[0], &clerk()).await.unwrap();
        assert_eq!(approved.status, RegistrationStatus::Approved);
        assert!(approved.confirmed);
        assert_eq!(approved.queue_position, None);
        assert_eq!(approved.reviewed_by.as_deref(), Some("clerk"));
        assert!(approved.reviewed_at.is_some());
        assert!(!approved.visitor_notified);

        let store = queue.store();
        assert_eq!(store.registration(ids[1]).await.unwrap().queue_position, Some(1));
        assert_eq!(store.registration(ids[2]).await.unwrap().queue_position, Some(2));
        assert_consistent(&queue, exhibition_id).await;
    }

    #[tokio::test]
    async fn test_approve_middle_leaves_earlier_positions() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let mut ids = Vec::new();
        for n in 1..=4 {
            ids.push(queue.submit(&visitor(n), exhibition_id, 1).await.unwrap().id);
        }

        queue.approve(ids[1], &clerk()).await.unwrap();

        let store = queue.store();
        assert_eq!(store.registration(ids[0]).await.unwrap().queue_position, Some(1));
        assert_eq!(store.registration(ids[2]).await.unwrap().queue_position, Some(2));
        assert_eq!(store.registration(ids[3]).await.unwrap().queue_position, Some(3));
        assert_consistent(&queue, exhibition_id).await;
    }

    #[tokio::test]
    async fn test_reject_records_reason_and_renumbers() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let first = queue.submit(&visitor(1), exhibition_id, 1).await.unwrap();
        let second = queue.submit(&visitor(2), exhibition_id, 1).await.unwrap();

        let rejected = queue
            .reject(first.id, &clerk(), Some("Fully booked".to_string()))
            .await
            .unwrap();
        assert_eq!(rejected.status, RegistrationStatus::Rejected);
        assert!(!rejected.confirmed);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Fully booked"));

        let second = queue.store().registration(second.id).await.unwrap();
        assert_eq!(second.queue_position, Some(1));
        assert_consistent(&queue, exhibition_id).await;
    }

    #[tokio::test]
    async fn test_reject_without_reason_stores_empty_string() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let registration = queue.submit(&visitor(1), exhibition_id, 1).await.unwrap();

        let rejected = queue.reject(registration.id, &clerk(), None).await.unwrap();
        assert_eq!(rejected.rejection_reason.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_attendees_out_of_range_creates_nothing() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;

        for count in [0, 11, -3] {
            let err = queue
                .submit(&visitor(1), exhibition_id, count)
                .await
                .unwrap_err();
            assert!(matches!(err, QueueError::InvalidInput(_)));
            assert_eq!(err.kind(), "invalid_input");
        }
        assert!(queue.store().registrations().await.is_empty());
        assert!(queue.store().visitors().await.is_empty());
    }

    #[tokio::test]
    async fn test_configured_attendee_cap() {
        let store = InMemoryQueueStore::new();
        let exhibition = store.add_exhibition("Small Room", ExhibitionStatus::Ongoing).await;
        let queue = RegistrationQueue::with_max_attendees(store, 4);

        let err = queue.submit(&visitor(1), exhibition.id, 5).await.unwrap_err();
        assert_eq!(err.to_string(), "Attendees count must be between 1 and 4");
        assert!(queue.submit(&visitor(1), exhibition.id, 4).await.is_ok());
    }

    #[tokio::test]
    async fn test_completed_exhibition_not_eligible() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Completed).await;

        let err = queue.submit(&visitor(1), exhibition_id, 1).await.unwrap_err();
        assert!(matches!(err, QueueError::NotEligible(_)));
        assert!(queue.store().registrations().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_exhibition_not_found() {
        let (queue, _) = setup(ExhibitionStatus::Ongoing).await;

        let err = queue.submit(&visitor(1), 999, 1).await.unwrap_err();
        assert!(matches!(err, QueueError::NotFound("Exhibition")));
        assert!(queue.store().visitors().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_submission_rejected() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let caller = visitor(1);
        let first = queue.submit(&caller, exhibition_id, 2).await.unwrap();

        let err = queue.submit(&caller, exhibition_id, 3).await.unwrap_err();
        match err {
            QueueError::DuplicateRegistration {
                existing_id,
                status,
            } => {
                assert_eq!(existing_id, Some(first.id));
                assert_eq!(status, Some(RegistrationStatus::Pending));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(queue.store().registrations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_no_reregistration_after_cancel() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let caller = visitor(1);
        let first = queue.submit(&caller, exhibition_id, 1).await.unwrap();
        queue.cancel_as(first.id, &caller).await.unwrap();

        let err = queue.submit(&caller, exhibition_id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            QueueError::DuplicateRegistration {
                status: Some(RegistrationStatus::Cancelled),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_second_transition_is_invalid() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let registration = queue.submit(&visitor(1), exhibition_id, 1).await.unwrap();
        queue.reject(registration.id, &clerk(), None).await.unwrap();

        let err = queue.approve(registration.id, &clerk()).await.unwrap_err();
        assert!(matches!(err, QueueError::InvalidTransition(_)));
        assert_eq!(
            err.to_string(),
            "Cannot approve registration with status: REJECTED"
        );
        assert!(matches!(
            queue.reject(registration.id, &clerk(), None).await,
            Err(QueueError::InvalidTransition(_))
        ));
        assert!(matches!(
            queue.cancel(registration.id).await,
            Err(QueueError::InvalidTransition(_))
        ));

        let stored = queue.store().registration(registration.id).await.unwrap();
        assert_eq!(stored.status, RegistrationStatus::Rejected);
        assert_consistent(&queue, exhibition_id).await;
    }

    #[tokio::test]
    async fn test_visitor_cannot_review() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let caller = visitor(1);
        let registration = queue.submit(&caller, exhibition_id, 1).await.unwrap();

        let err = queue.approve(registration.id, &caller).await.unwrap_err();
        assert!(matches!(err, QueueError::Forbidden(_)));
        let stored = queue.store().registration(registration.id).await.unwrap();
        assert_eq!(stored.status, RegistrationStatus::Pending);
    }

    #[tokio::test]
    async fn test_admin_can_review() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let registration = queue.submit(&visitor(1), exhibition_id, 1).await.unwrap();
        let admin = identity(UserRole::Admin, "director@gallery.test");

        let approved = queue.approve(registration.id, &admin).await.unwrap();
        assert_eq!(approved.reviewed_by.as_deref(), Some("director"));
    }

    #[tokio::test]
    async fn test_unknown_registration_not_found() {
        let (queue, _) = setup(ExhibitionStatus::Ongoing).await;
        assert!(matches!(
            queue.approve(42, &clerk()).await,
            Err(QueueError::NotFound("Registration"))
        ));
        assert!(matches!(
            queue.cancel(42).await,
            Err(QueueError::NotFound("Registration"))
        ));
    }

    #[tokio::test]
    async fn test_visitor_cannot_cancel_someone_elses_registration() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let owner = visitor(1);
        let other = visitor(2);
        let registration = queue.submit(&owner, exhibition_id, 1).await.unwrap();
        queue.submit(&other, exhibition_id, 1).await.unwrap();

        let err = queue.cancel_as(registration.id, &other).await.unwrap_err();
        assert!(matches!(err, QueueError::NotFound("Registration")));

        let cancelled = queue.cancel_as(registration.id, &owner).await.unwrap();
        assert_eq!(cancelled.status, RegistrationStatus::Cancelled);
        assert!(cancelled.reviewed_by.is_none());
        assert_consistent(&queue, exhibition_id).await;
    }

    #[tokio::test]
    async fn test_clerk_can_cancel_any_registration() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let registration = queue.submit(&visitor(1), exhibition_id, 1).await.unwrap();

        let cancelled = queue.cancel_as(registration.id, &clerk()).await.unwrap();
        assert_eq!(cancelled.status, RegistrationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_renumbering_is_scoped_to_exhibition() {
        let (queue, first_id) = setup(ExhibitionStatus::Ongoing).await;
        let second = queue
            .store()
            .add_exhibition("Second Hall", ExhibitionStatus::Upcoming)
            .await;

        let a = queue.submit(&visitor(1), first_id, 1).await.unwrap();
        queue.submit(&visitor(2), first_id, 1).await.unwrap();
        let other = queue.submit(&visitor(3), second.id, 1).await.unwrap();
        queue.submit(&visitor(4), second.id, 1).await.unwrap();

        queue.approve(a.id, &clerk()).await.unwrap();

        assert_eq!(positions(&queue, first_id).await, vec![1]);
        assert_eq!(positions(&queue, second.id).await, vec![1, 2]);
        let other = queue.store().registration(other.id).await.unwrap();
        assert_eq!(other.queue_position, Some(1));
    }

    #[tokio::test]
    async fn test_positions_stay_dense_through_mixed_operations() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let visitors: Vec<UserIdentity> = (1..=6).map(visitor).collect();
        let mut ids = Vec::new();
        for caller in &visitors {
            ids.push(queue.submit(caller, exhibition_id, 1).await.unwrap().id);
        }

        queue.approve(ids[2], &clerk()).await.unwrap();
        assert_consistent(&queue, exhibition_id).await;
        queue.cancel_as(ids[0], &visitors[0]).await.unwrap();
        assert_consistent(&queue, exhibition_id).await;
        queue.reject(ids[5], &clerk(), None).await.unwrap();
        assert_consistent(&queue, exhibition_id).await;

        let late = queue.submit(&visitor(7), exhibition_id, 1).await.unwrap();
        assert_eq!(late.queue_position, Some(4));
        assert_consistent(&queue, exhibition_id).await;

        let store = queue.store();
        for (id, expected) in [(ids[1], 1), (ids[3], 2), (ids[4], 3), (late.id, 4)] {
            let registration = store.registration(id).await.unwrap();
            assert_eq!(registration.queue_position, Some(expected));
        }
    }

    #[tokio::test]
    async fn test_queue_status_orders_by_position() {
        let (queue, first_id) = setup(ExhibitionStatus::Ongoing).await;
        let second = queue
            .store()
            .add_exhibition("Second Hall", ExhibitionStatus::Ongoing)
            .await;
        let caller = visitor(1);

        for n in 2..=4 {
            queue.submit(&visitor(n), first_id, 1).await.unwrap();
        }
        queue.submit(&caller, first_id, 3).await.unwrap();
        queue.submit(&caller, second.id, 2).await.unwrap();

        let status = queue.queue_status(&caller).await.unwrap();
        assert_eq!(status.total_in_queue, 2);
        let entries = &status.pending_registrations;
        assert_eq!(entries[0].exhibition_title, "Second Hall");
        assert_eq!(entries[0].queue_position, 1);
        assert_eq!(entries[0].estimated_wait, "1 day(s)");
        assert_eq!(entries[1].exhibition_title, "Northern Light");
        assert_eq!(entries[1].queue_position, 4);
        assert_eq!(entries[1].attendees_count, 3);
        assert_eq!(entries[1].estimated_wait, "4 day(s)");
    }

    #[tokio::test]
    async fn test_queue_status_excludes_decided_registrations() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let caller = visitor(1);
        let registration = queue.submit(&caller, exhibition_id, 1).await.unwrap();
        queue.approve(registration.id, &clerk()).await.unwrap();

        let status = queue.queue_status(&caller).await.unwrap();
        assert_eq!(status.total_in_queue, 0);
        assert!(status.pending_registrations.is_empty());
    }

    #[tokio::test]
    async fn test_queue_status_for_unknown_visitor_is_empty() {
        let (queue, _) = setup(ExhibitionStatus::Ongoing).await;
        let status = queue.queue_status(&visitor(1)).await.unwrap();
        assert_eq!(status.total_in_queue, 0);
        assert!(queue.store().visitors().await.is_empty());
    }

    #[tokio::test]
    async fn test_closing_exhibition_mid_queue_stops_new_submissions() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;
        let first = queue.submit(&visitor(1), exhibition_id, 1).await.unwrap();
        queue.submit(&visitor(2), exhibition_id, 1).await.unwrap();

        queue
            .store()
            .set_exhibition_status(exhibition_id, ExhibitionStatus::Completed)
            .await;

        let err = queue.submit(&visitor(3), exhibition_id, 1).await.unwrap_err();
        assert!(matches!(err, QueueError::NotEligible(_)));
        assert_eq!(positions(&queue, exhibition_id).await, vec![1, 2]);

        // Registrations already queued can still be decided.
        queue.approve(first.id, &clerk()).await.unwrap();
        assert_eq!(positions(&queue, exhibition_id).await, vec![1]);
        assert_consistent(&queue, exhibition_id).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_and_approvals_keep_queue_dense() {
        let (queue, exhibition_id) = setup(ExhibitionStatus::Ongoing).await;

        let mut handles = Vec::new();
        for n in 1..=20 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                queue.submit(&visitor(n), exhibition_id, 1).await
            }));
        }
        let mut seeded = Vec::new();
        for handle in handles {
            seeded.push(handle.await.unwrap().unwrap());
        }

        let mut tail: Vec<i32> = seeded.iter().filter_map(|r| r.queue_position).collect();
        tail.sort_unstable();
        assert_eq!(tail, (1..=20).collect::<Vec<i32>>());

        let mut approvals = Vec::new();
        let mut submissions = Vec::new();
        for (i, registration) in seeded.iter().take(8).enumerate() {
            let approver = queue.clone();
            let id = registration.id;
            approvals.push(tokio::spawn(async move {
                approver.approve(id, &clerk()).await
            }));

            let submitter = queue.clone();
            submissions.push(tokio::spawn(async move {
                submitter.submit(&visitor(100 + i), exhibition_id, 2).await
            }));
        }
        for handle in approvals {
            let approved = handle.await.unwrap().unwrap();
            assert_eq!(approved.status, RegistrationStatus::Approved);
            assert_eq!(approved.queue_position, None);
        }
        for handle in submissions {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(positions(&queue, exhibition_id).await.len(), 20);
        assert_consistent(&queue, exhibition_id).await;
    }
}
