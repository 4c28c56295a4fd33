//! Repository implementations for database operations.

pub mod artist;
pub mod dashboard;
pub mod exhibition;
pub mod queue_store;
pub mod registration;

pub use artist::ArtistRepository;
pub use dashboard::{DashboardRepository, DashboardScope};
pub use exhibition::ExhibitionRepository;
pub use queue_store::{store_error, PgQueueStore, PgQueueTransaction};
pub use registration::{RegistrationFilter, RegistrationRepository};
