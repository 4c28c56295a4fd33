//! Background job scheduler and job implementations.

mod notification_dispatch;
mod scheduler;

pub use notification_dispatch::NotificationDispatchJob;
pub use scheduler::{Job, JobError, JobScheduler};
