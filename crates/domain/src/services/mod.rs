//! Domain services for the gallery backend.
//!
//! Services contain business logic that operates on domain models.

pub mod notification;
pub mod queue_store;
pub mod registration_queue;

pub use notification::{
    dispatch_decisions, DispatchSummary, LoggingNotifier, NotificationResult,
    RegistrationDecisionPayload, VisitorNotifier,
};
pub use queue_store::{
    InMemoryQueueStore, InMemoryTransaction, PendingRegistration, QueueStore, QueueTransaction,
    StoreError,
};
pub use registration_queue::{QueueError, RegistrationQueue, ReviewDecision};
