//! Domain layer for the gallery backend.
//!
//! This crate contains:
//! - Domain models (Exhibition, Visitor, Registration, ...)
//! - The registration queue engine and the store abstraction it runs on
//! - Notification dispatch for review decisions

pub mod models;
pub mod services;
