//! Storage abstraction for the registration queue.
//!
//! Every state-changing queue operation runs inside one [`QueueTransaction`].
//! A transaction that is dropped without [`QueueTransaction::commit`] rolls
//! back. Implementations serialize writers per exhibition: callers lock the
//! exhibition first and only then read or write its registrations.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::{
    Exhibition, ExhibitionStatus, NewRegistration, NewVisitor, Registration, RegistrationStatus,
    Visitor,
};

/// Errors surfaced by a queue store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The backend aborted the unit of work because of a concurrent writer.
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// A pending registration together with its exhibition title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub registration: Registration,
    pub exhibition_title: String,
}

/// Entry point of a queue store.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Opens a unit of work.
    async fn begin(&self) -> Result<Box<dyn QueueTransaction>, StoreError>;

    async fn find_visitor_by_email(&self, email: &str) -> Result<Option<Visitor>, StoreError>;

    /// Pending registrations of a visitor, ordered by queue position.
    async fn pending_queue_for_visitor(
        &self,
        visitor_id: i64,
    ) -> Result<Vec<PendingRegistration>, StoreError>;
}

/// One atomic unit of work against the queue.
#[async_trait]
pub trait QueueTransaction: Send {
    /// Locks an exhibition row for the rest of the transaction.
    async fn lock_exhibition(&mut self, exhibition_id: i64)
        -> Result<Option<Exhibition>, StoreError>;

    /// Finds a visitor by email or creates one.
    ///
    /// An existing visitor with an empty name takes the supplied name.
    async fn get_or_create_visitor(&mut self, visitor: &NewVisitor) -> Result<Visitor, StoreError>;

    /// Reads a registration without locking it.
    async fn find_registration(&mut self, id: i64) -> Result<Option<Registration>, StoreError>;

    /// Reads and locks a registration. Call only after locking its exhibition.
    async fn lock_registration(&mut self, id: i64) -> Result<Option<Registration>, StoreError>;

    /// The registration of a visitor for an exhibition, in any status.
    async fn find_registration_for(
        &mut self,
        visitor_id: i64,
        exhibition_id: i64,
    ) -> Result<Option<Registration>, StoreError>;

    async fn max_pending_position(&mut self, exhibition_id: i64) -> Result<Option<i32>, StoreError>;

    async fn insert_registration(
        &mut self,
        registration: &NewRegistration,
    ) -> Result<Registration, StoreError>;

    async fn update_registration(&mut self, registration: &Registration) -> Result<(), StoreError>;

    /// Decrements every pending position greater than `vacated` in the
    /// exhibition's queue. Returns the number of shifted registrations.
    async fn close_queue_gap(&mut self, exhibition_id: i64, vacated: i32)
        -> Result<u64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    exhibitions: BTreeMap<i64, Exhibition>,
    visitors: BTreeMap<i64, Visitor>,
    registrations: BTreeMap<i64, Registration>,
    next_exhibition_id: i64,
    next_visitor_id: i64,
    next_registration_id: i64,
}

impl MemoryState {
    fn allocate(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Process-local queue store used by tests and local development.
///
/// A single async mutex serializes all units of work. Each transaction
/// edits a working copy that replaces the shared state on commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueueStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exhibition with a fresh id.
    pub async fn add_exhibition(&self, title: &str, status: ExhibitionStatus) -> Exhibition {
        let mut state = self.state.lock().await;
        let id = MemoryState::allocate(&mut state.next_exhibition_id);
        let today = chrono::Utc::now().date_naive();
        let exhibition = Exhibition {
            id,
            title: title.to_string(),
            start_date: today,
            end_date: today + chrono::Duration::days(30),
            status,
        };
        state.exhibitions.insert(id, exhibition.clone());
        exhibition
    }

    pub async fn set_exhibition_status(&self, exhibition_id: i64, status: ExhibitionStatus) {
        let mut state = self.state.lock().await;
        if let Some(exhibition) = state.exhibitions.get_mut(&exhibition_id) {
            exhibition.status = status;
        }
    }

    pub async fn registration(&self, id: i64) -> Option<Registration> {
        self.state.lock().await.registrations.get(&id).cloned()
    }

    /// Snapshot of all registrations ordered by id.
    pub async fn registrations(&self) -> Vec<Registration> {
        self.state.lock().await.registrations.values().cloned().collect()
    }

    pub async fn visitors(&self) -> Vec<Visitor> {
        self.state.lock().await.visitors.values().cloned().collect()
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn begin(&self) -> Result<Box<dyn QueueTransaction>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }

    async fn find_visitor_by_email(&self, email: &str) -> Result<Option<Visitor>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.visitors.values().find(|v| v.email == email).cloned())
    }

    async fn pending_queue_for_visitor(
        &self,
        visitor_id: i64,
    ) -> Result<Vec<PendingRegistration>, StoreError> {
        let state = self.state.lock().await;
        let mut pending: Vec<PendingRegistration> = state
            .registrations
            .values()
            .filter(|r| r.visitor_id == visitor_id && r.status == RegistrationStatus::Pending)
            .map(|r| PendingRegistration {
                registration: r.clone(),
                exhibition_title: state
                    .exhibitions
                    .get(&r.exhibition_id)
                    .map(|e| e.title.clone())
                    .unwrap_or_default(),
            })
            .collect();
        pending.sort_by_key(|p| (p.registration.queue_position, p.registration.submitted_at));
        Ok(pending)
    }
}

/// Unit of work over [`InMemoryQueueStore`].
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl QueueTransaction for InMemoryTransaction {
    async fn lock_exhibition(
        &mut self,
        exhibition_id: i64,
    ) -> Result<Option<Exhibition>, StoreError> {
        Ok(self.working.exhibitions.get(&exhibition_id).cloned())
    }

    async fn get_or_create_visitor(&mut self, visitor: &NewVisitor) -> Result<Visitor, StoreError> {
        if let Some(existing) = self
            .working
            .visitors
            .values_mut()
            .find(|v| v.email == visitor.email)
        {
            if existing.name.is_empty() {
                existing.name = visitor.name.clone();
            }
            return Ok(existing.clone());
        }

        let id = MemoryState::allocate(&mut self.working.next_visitor_id);
        let created = Visitor {
            id,
            name: visitor.name.clone(),
            email: visitor.email.clone(),
            phone: visitor.phone.clone(),
        };
        self.working.visitors.insert(id, created.clone());
        Ok(created)
    }

    async fn find_registration(&mut self, id: i64) -> Result<Option<Registration>, StoreError> {
        Ok(self.working.registrations.get(&id).cloned())
    }

    async fn lock_registration(&mut self, id: i64) -> Result<Option<Registration>, StoreError> {
        Ok(self.working.registrations.get(&id).cloned())
    }

    async fn find_registration_for(
        &mut self,
        visitor_id: i64,
        exhibition_id: i64,
    ) -> Result<Option<Registration>, StoreError> {
        Ok(self
            .working
            .registrations
            .values()
            .find(|r| r.visitor_id == visitor_id && r.exhibition_id == exhibition_id)
            .cloned())
    }

    async fn max_pending_position(
        &mut self,
        exhibition_id: i64,
    ) -> Result<Option<i32>, StoreError> {
        Ok(self
            .working
            .registrations
            .values()
            .filter(|r| r.exhibition_id == exhibition_id && r.status == RegistrationStatus::Pending)
            .filter_map(|r| r.queue_position)
            .max())
    }

    async fn insert_registration(
        &mut self,
        registration: &NewRegistration,
    ) -> Result<Registration, StoreError> {
        let taken = self.working.registrations.values().any(|r| {
            r.visitor_id == registration.visitor_id && r.exhibition_id == registration.exhibition_id
        });
        if taken {
            return Err(StoreError::UniqueViolation(
                "registrations_visitor_exhibition_key".to_string(),
            ));
        }

        let id = MemoryState::allocate(&mut self.working.next_registration_id);
        let created = registration.clone().into_registration(id);
        self.working.registrations.insert(id, created.clone());
        Ok(created)
    }

    async fn update_registration(&mut self, registration: &Registration) -> Result<(), StoreError> {
        match self.working.registrations.get_mut(&registration.id) {
            Some(row) => {
                *row = registration.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "registration {} vanished during update",
                registration.id
            ))),
        }
    }

    async fn close_queue_gap(
        &mut self,
        exhibition_id: i64,
        vacated: i32,
    ) -> Result<u64, StoreError> {
        let mut shifted = 0;
        for registration in self.working.registrations.values_mut() {
            if registration.exhibition_id != exhibition_id
                || registration.status != RegistrationStatus::Pending
            {
                continue;
            }
            if let Some(position) = registration.queue_position.as_mut() {
                if *position > vacated {
                    *position -= 1;
                    shifted += 1;
                }
            }
        }
        Ok(shifted)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_visitor(email: &str, name: &str) -> NewVisitor {
        NewVisitor {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = InMemoryQueueStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.get_or_create_visitor(&new_visitor("ana@gallery.test", "Ana"))
                .await
                .unwrap();
        }
        assert!(store.visitors().await.is_empty());

        let mut tx = store.begin().await.unwrap();
        tx.get_or_create_visitor(&new_visitor("ana@gallery.test", "Ana"))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.visitors().await.len(), 1);
    }

    #[tokio::test]
    async fn test_get_or_create_fills_empty_name() {
        let store = InMemoryQueueStore::new();
        let mut tx = store.begin().await.unwrap();
        let first = tx
            .get_or_create_visitor(&new_visitor("bo@gallery.test", ""))
            .await
            .unwrap();
        let second = tx
            .get_or_create_visitor(&new_visitor("bo@gallery.test", "Bo Lind"))
            .await
            .unwrap();
        let third = tx
            .get_or_create_visitor(&new_visitor("bo@gallery.test", "Someone Else"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Bo Lind");
        assert_eq!(third.name, "Bo Lind");
    }

    #[tokio::test]
    async fn test_insert_enforces_pair_uniqueness() {
        let store = InMemoryQueueStore::new();
        let exhibition = store.add_exhibition("Light", ExhibitionStatus::Ongoing).await;
        let mut tx = store.begin().await.unwrap();
        let new = NewRegistration {
            visitor_id: 1,
            exhibition_id: exhibition.id,
            attendees_count: 1,
            queue_position: 1,
            submitted_at: Utc::now(),
        };
        tx.insert_registration(&new).await.unwrap();
        let err = tx.insert_registration(&new).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_close_queue_gap_only_touches_later_pending_rows() {
        let store = InMemoryQueueStore::new();
        let first = store.add_exhibition("First", ExhibitionStatus::Ongoing).await;
        let other = store.add_exhibition("Other", ExhibitionStatus::Ongoing).await;

        let mut tx = store.begin().await.unwrap();
        for (visitor_id, exhibition_id, position) in
            [(1, first.id, 1), (2, first.id, 2), (3, first.id, 3), (4, other.id, 2)]
        {
            tx.insert_registration(&NewRegistration {
                visitor_id,
                exhibition_id,
                attendees_count: 1,
                queue_position: position,
                submitted_at: Utc::now(),
            })
            .await
            .unwrap();
        }
        let shifted = tx.close_queue_gap(first.id, 1).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(shifted, 2);
        let positions: Vec<_> = store
            .registrations()
            .await
            .iter()
            .map(|r| (r.visitor_id, r.queue_position))
            .collect();
        assert_eq!(
            positions,
            vec![(1, Some(1)), (2, Some(1)), (3, Some(2)), (4, Some(2))]
        );
    }
}
