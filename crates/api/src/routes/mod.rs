//! HTTP route handlers.

pub mod artists;
pub mod dashboard;
pub mod exhibitions;
pub mod health;
pub mod registrations;
